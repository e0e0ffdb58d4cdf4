use std::io::{self, Write};
use std::path::PathBuf;

use queue_relay_core::contract::CONNECTION_STRING_ENV;
use queue_relay_core::encoding::MessageEncoding;
use queue_relay_core::storage_keys::LOG_RELAY_QUEUE;
use tracing::info;

use crate::adapters::queue_sender::QueueSender;
use crate::producers::{
    print_line, send_one, usable_connection_string, ProducerError, ProducerReport,
};

pub const DEFAULT_FILE_QUEUE: &str = LOG_RELAY_QUEUE;

/// Raw file content travels base64 encoded so any text survives the queue.
pub const FILE_MESSAGE_ENCODING: MessageEncoding = MessageEncoding::Base64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProducerRequest {
    pub file_path: PathBuf,
    pub queue_name: String,
}

impl FileProducerRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            queue_name: DEFAULT_FILE_QUEUE.to_string(),
        }
    }
}

pub fn run_file_producer<S: QueueSender>(
    request: &FileProducerRequest,
    connection_string: Option<&str>,
    connect: impl FnOnce(&str, &str) -> Result<S, String>,
    out: &mut impl Write,
) -> io::Result<ProducerReport> {
    let Some(connection_string) = usable_connection_string(connection_string) else {
        print_line(
            out,
            format!("Error: The environment variable {CONNECTION_STRING_ENV} is not set."),
        )?;
        print_line(out, "Please set it to your Azure Storage connection string.")?;
        return Ok(ProducerReport::failed(
            ProducerError::MissingConnectionString(CONNECTION_STRING_ENV),
        ));
    };

    let path = request.file_path.display();
    let sender = match connect(connection_string, &request.queue_name) {
        Ok(sender) => sender,
        Err(message) => {
            print_line(out, format!("An error occurred: {message}"))?;
            return Ok(ProducerReport::failed(ProducerError::Connect(message)));
        }
    };

    let content = match std::fs::read_to_string(&request.file_path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            print_line(out, format!("Error: The file at '{path}' was not found."))?;
            return Ok(ProducerReport::failed(ProducerError::FileNotFound(
                path.to_string(),
            )));
        }
        Err(error) => {
            print_line(out, format!("An error occurred: {error}"))?;
            return Ok(ProducerReport::failed(ProducerError::FileRead {
                path: path.to_string(),
                message: error.to_string(),
            }));
        }
    };

    info!(
        path = %path,
        queue = %request.queue_name,
        characters = content.chars().count(),
        "sending file content"
    );

    let mut report = ProducerReport::default();
    match send_one(&sender, &FILE_MESSAGE_ENCODING.encode(&content), &mut report) {
        Ok(()) => print_line(
            out,
            format!(
                "Successfully sent content of '{path}' to queue '{}'.",
                request.queue_name
            ),
        )?,
        Err(ProducerError::Send(message)) => {
            print_line(out, format!("An error occurred: {message}"))?
        }
        Err(other) => print_line(out, format!("An error occurred: {other}"))?,
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use queue_relay_core::contract::{InvocationRequest, LOG_RELAY_FUNCTION, TRIGGER_BINDING};

    use super::*;
    use crate::handlers::router::relay_router;
    use crate::producers::test_support::{console, RecordingSender};

    fn run(
        request: &FileProducerRequest,
        connection_string: Option<&str>,
        sender: &RecordingSender,
    ) -> (ProducerReport, String) {
        let mut out = Vec::new();
        let report = run_file_producer(request, connection_string, |_, _| Ok(sender), &mut out)
            .expect("console writes succeed");
        (report, console(&out))
    }

    fn temp_file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content).expect("write temp file");
        file
    }

    #[test]
    fn sends_file_content_base64_encoded() {
        let sender = RecordingSender::new();
        let file = temp_file_with("line one\nzweite Zeile: ÄÖÜ ✓\n".as_bytes());
        let request = FileProducerRequest::new(file.path());

        let (report, output) = run(&request, Some("AccountName=dev"), &sender);

        assert_eq!(report.sent, 1);
        let bodies = sender.bodies();
        assert_eq!(bodies.len(), 1);
        let decoded = MessageEncoding::Base64
            .decode(bodies[0].as_bytes())
            .expect("body is base64");
        assert_eq!(
            String::from_utf8(decoded).expect("utf-8"),
            "line one\nzweite Zeile: ÄÖÜ ✓\n"
        );
        assert_eq!(
            output.trim_end(),
            format!(
                "Successfully sent content of '{}' to queue 'copyblobqueue'.",
                file.path().display()
            )
        );
    }

    #[test]
    fn sent_body_is_readable_by_the_log_relay() {
        let sender = RecordingSender::new();
        let file = temp_file_with("hello from a file".as_bytes());
        run(&FileProducerRequest::new(file.path()), Some("x"), &sender);

        let router = relay_router(MessageEncoding::Base64, MessageEncoding::None);
        let request = InvocationRequest::with_binding(TRIGGER_BINDING, sender.bodies()[0].clone());
        let response = router
            .dispatch(LOG_RELAY_FUNCTION, &request)
            .expect("function is registered");

        assert!(response
            .logs
            .iter()
            .any(|line| line == "Message received: hello from a file"));
    }

    #[test]
    fn missing_file_is_reported() {
        let sender = RecordingSender::new();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.txt");
        let request = FileProducerRequest {
            file_path: path.clone(),
            queue_name: "custom".to_string(),
        };

        let (report, output) = run(&request, Some("x"), &sender);

        assert_eq!(report.sent, 0);
        assert!(matches!(report.errors[0], ProducerError::FileNotFound(_)));
        assert_eq!(
            output.trim_end(),
            format!("Error: The file at '{}' was not found.", path.display())
        );
        assert!(sender.bodies().is_empty());
    }

    #[test]
    fn non_utf8_file_is_a_generic_error() {
        let sender = RecordingSender::new();
        let file = temp_file_with(&[0xff, 0xfe, 0x00]);

        let (report, output) = run(&FileProducerRequest::new(file.path()), Some("x"), &sender);

        assert_eq!(report.sent, 0);
        assert!(output.starts_with("An error occurred: "));
        assert!(sender.bodies().is_empty());
    }

    #[test]
    fn missing_connection_string_sends_nothing() {
        let sender = RecordingSender::new();
        let file = temp_file_with(b"content");

        let (report, output) = run(&FileProducerRequest::new(file.path()), None, &sender);

        assert_eq!(report.sent, 0);
        assert!(output.starts_with(
            "Error: The environment variable AZURE_STORAGE_CONNECTION_STRING is not set."
        ));
        assert!(sender.bodies().is_empty());
    }

    #[test]
    fn send_failure_is_printed() {
        let sender = RecordingSender::failing("authorization failure");
        let file = temp_file_with(b"content");

        let (report, output) = run(&FileProducerRequest::new(file.path()), Some("x"), &sender);

        assert_eq!(report.sent, 0);
        assert_eq!(output.trim_end(), "An error occurred: authorization failure");
    }
}
