use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use reseed_cell::ReseedEngine;
use shared_config::AppConfig;
use shared_database::{pool, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pharmacy demo API server");

    let config = Arc::new(AppConfig::from_env());
    let pool = pool::connect(&config)
        .await
        .with_context(|| format!("connecting to {}", config.database_url))?;

    let state = AppState::new(config.clone(), pool);
    let engine = Arc::new(ReseedEngine::new(&state));

    match engine.catalog().load(&state.pool).await {
        Ok(snapshot) if snapshot.tables.is_empty() => {
            warn!("Database is empty; POST /reset_demo to load the demo data")
        }
        Ok(snapshot) => info!("Found {} tables", snapshot.tables.len()),
        Err(err) => warn!("Could not read schema catalog: {}", err),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(state, engine)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
