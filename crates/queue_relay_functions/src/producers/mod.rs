//! Console producers that push development messages onto the relay queues.
//!
//! Every failure is reported as a console line and recorded in the returned
//! report; nothing is raised to the caller beyond console write errors.

pub mod file_producer;
pub mod json_producer;

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, warn};

use crate::adapters::queue_sender::QueueSender;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    #[error("{0} is not set")]
    MissingConnectionString(&'static str),

    #[error("file '{0}' not found")]
    FileNotFound(String),

    #[error("invalid JSON in file '{0}'")]
    InvalidJson(String),

    #[error("could not read file '{path}': {message}")]
    FileRead { path: String, message: String },

    #[error("could not connect to queue: {0}")]
    Connect(String),

    #[error("could not send message: {0}")]
    Send(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProducerReport {
    pub sent: usize,
    pub errors: Vec<ProducerError>,
}

impl ProducerReport {
    fn failed(error: ProducerError) -> Self {
        warn!(error = %error, "producer run ended without sending");
        Self {
            sent: 0,
            errors: vec![error],
        }
    }
}

/// Treat a blank connection string the same as an unset one.
fn usable_connection_string(value: Option<&str>) -> Option<&str> {
    value.filter(|candidate| !candidate.trim().is_empty())
}

fn send_one(
    sender: &impl QueueSender,
    body: &str,
    report: &mut ProducerReport,
) -> Result<(), ProducerError> {
    match sender.send_message(body) {
        Ok(()) => {
            report.sent += 1;
            debug!(bytes = body.len(), sent = report.sent, "message sent");
            Ok(())
        }
        Err(message) => {
            let error = ProducerError::Send(message);
            report.errors.push(error.clone());
            Err(error)
        }
    }
}

fn print_line(out: &mut impl Write, line: impl AsRef<str>) -> io::Result<()> {
    writeln!(out, "{}", line.as_ref())
}
