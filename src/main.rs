use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transport_pricing::cache::AppCache;
use transport_pricing::config::Config;
use transport_pricing::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transport_pricing=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("running migrations")?;
        info!("Database migrations applied");
    }

    let state = AppState::new(db, AppCache::new(config.rule_cache_ttl), config.preview_base_rate);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("Transport pricing service listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
