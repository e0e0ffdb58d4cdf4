use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use queue_relay_core::contract::CONNECTION_STRING_ENV;
use queue_relay_functions::adapters::azure_queue::AzureQueueSender;
use queue_relay_functions::producers::json_producer::{
    run_json_producer, JsonProducerRequest, DEFAULT_JSON_QUEUE,
};
use queue_relay_functions::telemetry::{init_tracing, LogFormat};

/// Send JSON messages to an Azure Storage Queue.
#[derive(Parser, Debug)]
#[command(name = "send_json_to_queue")]
struct Cli {
    /// JSON file to send instead of random records.
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_JSON_QUEUE)]
    queue_name: String,

    /// Number of random records to send. Ignored with --file.
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env(), "warn");
    let cli = Cli::parse();

    let request = JsonProducerRequest {
        file: cli.file,
        queue_name: cli.queue_name,
        count: cli.count,
    };
    let connection_string = std::env::var(CONNECTION_STRING_ENV).ok();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_json_producer(
        &request,
        connection_string.as_deref(),
        AzureQueueSender::connect,
        &mut rand::thread_rng(),
        Utc::now,
        &mut out,
    )?;
    Ok(())
}
