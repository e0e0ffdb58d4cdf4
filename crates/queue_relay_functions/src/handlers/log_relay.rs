use queue_relay_core::encoding::decode_text;
use queue_relay_core::RelayError;

use crate::adapters::log_sink::RelayLog;
use crate::handlers::{report_dropped, RelayOutcome, TriggerPayload};

pub const LOG_RELAY_RECEIPT: &str = "Queue trigger function processed a queue item";

/// Relay one queue message into the log.
///
/// Every failure is logged and swallowed so the platform acknowledges the
/// message instead of redelivering it.
pub fn handle_log_relay(payload: TriggerPayload, log: &dyn RelayLog) -> RelayOutcome {
    log.info(LOG_RELAY_RECEIPT);

    match payload.and_then(|body| relay_to_log(body, log)) {
        Ok(text) => RelayOutcome::Relayed {
            characters: text.chars().count(),
        },
        Err(error) => report_dropped(log, error),
    }
}

pub fn relay_to_log(body: Vec<u8>, log: &dyn RelayLog) -> Result<String, RelayError> {
    let text = decode_text(body)?;
    log.info(&format!("Message received: {text}"));
    log.echo(&format!("Queue message processed: {text}"));
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::log_sink::LogLevel;
    use crate::handlers::test_support::RecordingLog;
    use crate::handlers::COMPLETED_DESPITE_ERROR;

    #[test]
    fn logs_decoded_text_verbatim() {
        let log = RecordingLog::default();
        let outcome = handle_log_relay(Ok("héllo, wörld".as_bytes().to_vec()), &log);

        assert_eq!(outcome, RelayOutcome::Relayed { characters: 12 });
        assert_eq!(
            log.messages(LogLevel::Info),
            vec![LOG_RELAY_RECEIPT, "Message received: héllo, wörld"]
        );
        assert!(log.messages(LogLevel::Error).is_empty());
        assert_eq!(
            *log.console.borrow(),
            vec!["Queue message processed: héllo, wörld".to_string()]
        );
    }

    #[test]
    fn passes_json_through_without_parsing() {
        let log = RecordingLog::default();
        handle_log_relay(Ok(br#"{"a":1"#.to_vec()), &log);

        assert_eq!(
            log.messages(LogLevel::Info)[1],
            r#"Message received: {"a":1"#
        );
    }

    #[test]
    fn empty_message_is_still_relayed() {
        let log = RecordingLog::default();
        let outcome = handle_log_relay(Ok(Vec::new()), &log);

        assert_eq!(outcome, RelayOutcome::Relayed { characters: 0 });
        assert_eq!(log.messages(LogLevel::Info)[1], "Message received: ");
    }

    #[test]
    fn invalid_utf8_is_logged_and_swallowed() {
        let log = RecordingLog::default();
        let outcome = handle_log_relay(Ok(vec![0xc3, 0x28]), &log);

        let RelayOutcome::Dropped { error } = outcome else {
            panic!("invalid utf-8 should be dropped");
        };
        assert!(matches!(error, RelayError::InvalidUtf8(_)));

        let errors = log.messages(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Error processing message: "));
        assert_eq!(
            log.messages(LogLevel::Info),
            vec![LOG_RELAY_RECEIPT, COMPLETED_DESPITE_ERROR]
        );
        assert!(log.console.borrow().is_empty());
        assert!(log.console_errors.borrow()[0].starts_with("Error processing queue message: "));
    }

    #[test]
    fn extraction_failures_take_the_same_path() {
        let log = RecordingLog::default();
        let outcome = handle_log_relay(Err(RelayError::MissingBinding("msg".to_string())), &log);

        assert!(!outcome.is_relayed());
        assert_eq!(log.messages(LogLevel::Error).len(), 1);
    }
}
