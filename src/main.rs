//! Binary entry point: wires configuration, database, and the HTTP server.

use databrew::api::{build_router, shutdown_signal, AppState};
use databrew::config::database::{create_connection, create_tables, seed_initial_staff};
use databrew::config::{self, Settings};
use databrew::errors::Result;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings and the shop profile
    let settings = Settings::load()?;
    let shop = config::shop::load_default_profile()?;

    // 4. Initialize the database
    let db = create_connection(&settings.database_url).await?;
    create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed the barista roster on first boot
    seed_initial_staff(&db).await?;

    // 6. Serve
    let listen_addr = settings.listen_addr.clone();
    let state = AppState::new(db, settings, shop)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Server running on {listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down.");
    Ok(())
}
