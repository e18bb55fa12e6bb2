//! IntelliSchedule HTTP Server Binary
//!
//! Main entry point for the timetable scheduling REST API. It initializes
//! the store, the Gemini generation client, the HTTP router, and starts
//! serving requests.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --bin intellischedule-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `STATE_SNAPSHOT`: Path to the JSON state snapshot; omitted means
//!   in-memory only
//! - `GEMINI_API_KEY`: Generation service API key (required)
//! - `GEMINI_MODEL`, `GEMINI_ENDPOINT`: Generation service overrides
//! - `GENERATION_TIMEOUT_SECS`: Upper bound on a generation run (default: 60)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use intellischedule::generator::{GeminiGenerator, GeneratorConfig, TimetableGenerator};
use intellischedule::http::{create_router, AppState};
use intellischedule::store::{FullStore, LocalStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting IntelliSchedule HTTP Server");

    // Initialize the store, loading the snapshot when one is configured
    let store: Arc<dyn FullStore> = match env::var("STATE_SNAPSHOT") {
        Ok(path) => {
            info!(path = %path, "loading state snapshot");
            Arc::new(LocalStore::with_snapshot(path)?)
        }
        Err(_) => Arc::new(LocalStore::new()),
    };

    // Initialize the generation client
    let config = GeneratorConfig::from_env()?;
    let generation_deadline = config.timeout;
    let generator: Arc<dyn TimetableGenerator> = Arc::new(GeminiGenerator::new(config)?);
    info!("Generation client initialized");

    // Create application state and router
    let state = AppState::new(store, generator, generation_deadline);
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
