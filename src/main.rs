use church_site::api::{self, AppState};
use church_site::config::{database, server, site};
use church_site::core::event::{self, NewEvent};
use church_site::errors::Result;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file first so RUST_LOG and DATABASE_URL can come from it
    dotenv().ok(); // Non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load the site configuration (church name, seed events)
    let site_config = site::load_default_config()
        .inspect_err(|e| error!("Critical error loading site configuration: {}", e))?;

    // 4. Connect and make sure the tables exist
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed church events on first start
    let seeds: Vec<NewEvent> = site_config.events.into_iter().map(Into::into).collect();
    event::seed_events(&db, seeds)
        .await
        .inspect(|count| info!(count, "Event seeding complete"))
        .inspect_err(|e| error!("Failed to seed events: {}", e))?;

    // 6. Serve the API
    let address = server::bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!(%address, "Failed to bind: {}", e))?;
    info!(%address, church = %site_config.church_name, "Listening");

    let state = AppState::new(db, site_config.church_name);
    axum::serve(listener, api::create_router(state)).await?;

    Ok(())
}
