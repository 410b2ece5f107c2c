use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uipilot::artifacts::XcapCapture;
use uipilot::config::Config;
use uipilot::provider;
use uipilot::rpc::{serve, Dispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the RPC stream, so diagnostics go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let automation = match provider::create_provider() {
        Ok(p) => Some(Arc::from(p)),
        Err(e) => {
            tracing::warn!("automation provider unavailable: {e}");
            None
        }
    };

    let dispatcher = Dispatcher::new(automation, Arc::new(XcapCapture), config);

    tracing::info!("uipilot serving on stdio");
    serve(&dispatcher).await
}
