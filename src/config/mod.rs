/// Database configuration and connection management
pub mod database;

/// HTTP server settings from environment variables
pub mod server;

/// Site configuration loading from config.toml
pub mod site;
