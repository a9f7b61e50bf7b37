use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;

use scrape_config::EngineConfig;
use scrape_engine::Engine;
use scrape_persistence::{connect, run_migrations, PgEventSink};

use scrape_api::{routes, AppState};

#[derive(Parser)]
#[command(name = "scrape-api")]
#[command(about = "News scraping engine trigger and admin API")]
struct Args {
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(port = config.port, "starting scrape-api");

    let pool = match connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    let sink = Arc::new(PgEventSink::new(pool.clone()));
    let engine = match Engine::new(pool, sink) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!(error = %e, "failed to build engine");
            std::process::exit(1);
        }
    };

    match engine.recoverer.recover().await {
        Ok(recovered) if recovered > 0 => {
            tracing::warn!(recovered, "recovered stuck jobs from a previous run");
        }
        Ok(_) => {}
        Err(e) => tracing::error!(error = %e, "startup recovery failed"),
    }

    let state = AppState::new(engine);
    let app = routes::build(state).layer(TraceLayer::new_for_http());

    let bind = args.bind.unwrap_or_else(|| format!("0.0.0.0:{}", config.port));
    let addr: SocketAddr = bind.parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");

    axum::serve(listener, app).await.expect("server error");
}
