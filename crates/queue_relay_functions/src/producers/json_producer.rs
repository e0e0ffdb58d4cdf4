use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use queue_relay_core::contract::CONNECTION_STRING_ENV;
use queue_relay_core::fixtures::{generate_record, pretty_json};
use queue_relay_core::storage_keys::BLOB_RELAY_QUEUE;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::queue_sender::QueueSender;
use crate::producers::{
    print_line, send_one, usable_connection_string, ProducerError, ProducerReport,
};

pub const DEFAULT_JSON_QUEUE: &str = BLOB_RELAY_QUEUE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonProducerRequest {
    pub file: Option<PathBuf>,
    pub queue_name: String,
    pub count: usize,
}

impl Default for JsonProducerRequest {
    fn default() -> Self {
        Self {
            file: None,
            queue_name: DEFAULT_JSON_QUEUE.to_string(),
            count: 1,
        }
    }
}

/// Send either one JSON document read from disk or `count` random records.
///
/// Bodies go out as indented JSON text with no transport encoding.
pub fn run_json_producer<S: QueueSender>(
    request: &JsonProducerRequest,
    connection_string: Option<&str>,
    connect: impl FnOnce(&str, &str) -> Result<S, String>,
    rng: &mut impl Rng,
    clock: impl Fn() -> DateTime<Utc>,
    out: &mut impl Write,
) -> io::Result<ProducerReport> {
    let Some(connection_string) = usable_connection_string(connection_string) else {
        print_line(
            out,
            format!("Error: {CONNECTION_STRING_ENV} environment variable not set"),
        )?;
        print_line(
            out,
            format!(
                "Please set it using: export {CONNECTION_STRING_ENV}='your_connection_string'"
            ),
        )?;
        return Ok(ProducerReport::failed(
            ProducerError::MissingConnectionString(CONNECTION_STRING_ENV),
        ));
    };

    if let Some(path) = &request.file {
        let document = match load_json_file(path) {
            Ok(value) => value,
            Err(error) => {
                print_line(out, file_error_line(path, &error))?;
                return Ok(ProducerReport::failed(error));
            }
        };
        info!(path = %path.display(), queue = %request.queue_name, "sending JSON file");

        let sender = match connect(connection_string, &request.queue_name) {
            Ok(sender) => sender,
            Err(message) => {
                print_line(out, format!("Error sending message to queue: {message}"))?;
                return Ok(ProducerReport::failed(ProducerError::Connect(message)));
            }
        };

        let mut report = ProducerReport::default();
        send_and_print(&sender, &request.queue_name, &pretty_json(&document), &mut report, out)?;
        return Ok(report);
    }

    info!(count = request.count, queue = %request.queue_name, "sending random JSON messages");
    let sender = match connect(connection_string, &request.queue_name) {
        Ok(sender) => sender,
        Err(message) => {
            print_line(out, format!("Error sending message to queue: {message}"))?;
            return Ok(ProducerReport::failed(ProducerError::Connect(message)));
        }
    };

    let mut report = ProducerReport::default();
    for index in 0..request.count {
        let record = generate_record(rng, clock());
        debug!(kind = record.kind(), index, "generated sample record");
        send_and_print(&sender, &request.queue_name, &pretty_json(&record), &mut report, out)?;
        if request.count > 1 {
            print_line(
                out,
                format!("--- Message {} of {} ---", index + 1, request.count),
            )?;
        }
    }
    Ok(report)
}

/// Read and parse a JSON document, keeping its key order and exact numbers.
pub fn load_json_file(path: &Path) -> Result<Value, ProducerError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => ProducerError::FileNotFound(display.clone()),
        io::ErrorKind::InvalidData => ProducerError::InvalidJson(display.clone()),
        _ => ProducerError::FileRead {
            path: display.clone(),
            message: error.to_string(),
        },
    })?;

    serde_json::from_str(&text).map_err(|_| ProducerError::InvalidJson(display))
}

fn file_error_line(path: &Path, error: &ProducerError) -> String {
    let path = path.display();
    match error {
        ProducerError::FileNotFound(_) => format!("Error: File '{path}' not found"),
        ProducerError::InvalidJson(_) => format!("Error: Invalid JSON in file '{path}'"),
        ProducerError::FileRead { message, .. } => {
            format!("Error: Could not read file '{path}': {message}")
        }
        other => format!("Error: {other}"),
    }
}

fn send_and_print(
    sender: &impl QueueSender,
    queue_name: &str,
    body: &str,
    report: &mut ProducerReport,
    out: &mut impl Write,
) -> io::Result<()> {
    match send_one(sender, body, report) {
        Ok(()) => {
            print_line(
                out,
                format!("Successfully sent JSON message to queue '{queue_name}':"),
            )?;
            print_line(out, body)
        }
        Err(ProducerError::Send(message)) => {
            print_line(out, format!("Error sending message to queue: {message}"))
        }
        Err(other) => print_line(out, format!("Error sending message to queue: {other}")),
    }
}
