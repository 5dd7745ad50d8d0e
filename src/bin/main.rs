use std::sync::Arc;

use poem::listener::TcpListener;
use soulmate_api::{
    ai::gemini::GeminiClient, core::db::init_pool, init_openapi_route, settings::get_config,
    AppState,
};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config()?;

    let log_level = Level::DEBUG;
    // Logging to File
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    // Logging to Console
    // tracing_subscriber::fmt().with_max_level(log_level).init();

    tracing::info!(
        "run with env={} prefix={:?} model={}",
        config.env,
        config.prefix,
        config.gemini_model
    );
    if config.gemini_api_key().is_none() {
        tracing::warn!("gemini_api_key is not set, matchmaker replies will fall back");
    }

    // Init Database Connection
    tracing::info!("Init Postgres connection");
    let pool = init_pool(&config).await?;
    // Init Redis Connection
    tracing::info!("Init Redis connection on {}", config.redis_url);
    let client = redis::Client::open(config.redis_url.clone())?;
    let redis_pool = r2d2::Pool::builder().build(client)?;
    // Init App State
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        ai: GeminiClient::new(&config)?,
        config: config.clone(),
    });

    let app = init_openapi_route(app_state.clone(), &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run(app)
    .await?;
    Ok(())
}
