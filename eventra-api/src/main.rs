//! # Eventra API Server
//!
//! Administration backend for a multi-tenant event-ticketing platform:
//! accounts (password and Google), organizers with role-based memberships,
//! and the ticketing data model behind events, orders, and payouts.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p eventra-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventra_api::{
    app::{build_router, AppState},
    config::Config,
};
use eventra_shared::db::{migrations, pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventra_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Eventra API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    pool::close_pool(db).await;

    Ok(())
}
