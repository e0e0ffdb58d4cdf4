use std::net::SocketAddr;

use anyhow::Context;
use queue_relay_functions::config::HostConfig;
use queue_relay_functions::handlers::router::relay_router;
use queue_relay_functions::host::serve;
use queue_relay_functions::telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HostConfig::from_env().context("invalid relay host configuration")?;
    init_tracing(config.log_format, "info");

    info!(
        port = config.port,
        log_relay_encoding = %config.log_relay_encoding,
        blob_relay_encoding = %config.blob_relay_encoding,
        "starting relay host"
    );

    let router = relay_router(config.log_relay_encoding, config.blob_relay_encoding);
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    serve(addr, router)
        .await
        .with_context(|| format!("relay host failed on {addr}"))
}
