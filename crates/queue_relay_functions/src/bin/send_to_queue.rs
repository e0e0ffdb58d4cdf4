use std::path::PathBuf;

use clap::Parser;
use queue_relay_core::contract::CONNECTION_STRING_ENV;
use queue_relay_functions::adapters::azure_queue::AzureQueueSender;
use queue_relay_functions::producers::file_producer::{
    run_file_producer, FileProducerRequest, DEFAULT_FILE_QUEUE,
};
use queue_relay_functions::telemetry::{init_tracing, LogFormat};

/// Send a file's content to an Azure Storage Queue.
#[derive(Parser, Debug)]
#[command(name = "send_to_queue")]
struct Cli {
    /// The path to the file to send.
    file_path: PathBuf,

    #[arg(long, default_value = DEFAULT_FILE_QUEUE)]
    queue_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env(), "warn");
    let cli = Cli::parse();

    let request = FileProducerRequest {
        file_path: cli.file_path,
        queue_name: cli.queue_name,
    };
    let connection_string = std::env::var(CONNECTION_STRING_ENV).ok();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_file_producer(
        &request,
        connection_string.as_deref(),
        AzureQueueSender::connect,
        &mut out,
    )?;
    Ok(())
}
