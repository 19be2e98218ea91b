use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::feed_service::FeedService;
use data::dummyjson_upstream::DummyJsonUpstream;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let upstream = DummyJsonUpstream::new(
        settings.upstream_url.clone(),
        Duration::from_secs(settings.upstream_timeout_secs),
        settings.upstream_delay_ms,
    )?;
    info!(
        upstream = %settings.upstream_url,
        delay_ms = ?settings.upstream_delay_ms,
        "upstream configured"
    );

    let state = AppState::new(Arc::new(FeedService::new(upstream)));

    server::run_http(&settings, state).await
}
