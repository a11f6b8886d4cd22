//! Site configuration loading from config.toml
//!
//! The configuration file names the church and lists church events used to seed
//! an empty events table on first start. A missing file is not an error: the site
//! then starts with defaults and no seed events.

use crate::core::event::NewEvent;
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn default_church_name() -> String {
    "Mission For Jesus".to_string()
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    /// Display name of the church
    #[serde(default = "default_church_name")]
    pub church_name: String,
    /// Events inserted when the events table is empty
    #[serde(default)]
    pub events: Vec<EventSeed>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            church_name: default_church_name(),
            events: Vec::new(),
        }
    }
}

/// A church event to seed
#[derive(Debug, Deserialize, Clone)]
pub struct EventSeed {
    /// Event title
    pub title: String,
    /// Event description
    #[serde(default)]
    pub description: String,
    /// Day of the event
    pub date: NaiveDate,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
    /// Venue
    pub location: String,
    /// Optional banner image
    pub image_url: Option<String>,
    /// Whether registration is open
    #[serde(default)]
    pub registration_enabled: bool,
    /// Optional attendee cap
    pub max_attendees: Option<i32>,
}

impl From<EventSeed> for NewEvent {
    fn from(seed: EventSeed) -> Self {
        Self {
            title: seed.title,
            description: seed.description,
            date: seed.date,
            start_time: seed.start_time,
            end_time: seed.end_time,
            location: seed.location,
            image_url: seed.image_url,
            registration_enabled: seed.registration_enabled,
            max_attendees: seed.max_attendees,
        }
    }
}

/// Loads the site configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the site configuration from `CHURCH_CONFIG`, or `./config.toml` when unset.
///
/// Returns the default configuration when the file does not exist.
pub fn load_default_config() -> Result<SiteConfig> {
    let path = std::env::var("CHURCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        info!(%path, "No site configuration found, using defaults");
        return Ok(SiteConfig::default());
    }
    load_config(&path)
}
