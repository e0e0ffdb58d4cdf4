use queue_relay_core::encoding::decode_text;
use queue_relay_core::RelayError;

use crate::adapters::blob_output::BlobOutput;
use crate::adapters::log_sink::RelayLog;
use crate::handlers::{report_dropped, RelayOutcome, TriggerPayload};

/// Copy the blob named by a queue message to its `-copy` sibling.
///
/// The host resolves both blob paths from the message text and reads the
/// source before the invocation; the handler only moves content from the
/// input binding to the output binding.
pub fn handle_blob_copy(
    queue_item: TriggerPayload,
    source: TriggerPayload,
    output: &mut dyn BlobOutput,
    log: &dyn RelayLog,
) -> RelayOutcome {
    match copy_blob(queue_item, source, output, log) {
        Ok(characters) => RelayOutcome::Relayed { characters },
        Err(error) => report_dropped(log, error),
    }
}

fn copy_blob(
    queue_item: TriggerPayload,
    source: TriggerPayload,
    output: &mut dyn BlobOutput,
    log: &dyn RelayLog,
) -> Result<usize, RelayError> {
    let item = decode_text(queue_item?)?;
    log.info(&format!("Storage queue function processed work item: {item}"));

    let content = decode_text(source?)?;
    let characters = content.chars().count();
    output.write_blob(&content).map_err(RelayError::Output)?;
    log.info(&format!("Copied blob '{item}' ({characters} characters)"));
    Ok(characters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::blob_output::OutputBindingSlot;
    use crate::adapters::log_sink::LogLevel;
    use crate::handlers::test_support::RecordingLog;

    #[test]
    fn copies_source_content_unchanged() {
        let log = RecordingLog::default();
        let mut slot = OutputBindingSlot::new();

        let outcome = handle_blob_copy(
            Ok(b"report.txt".to_vec()),
            Ok("quarterly numbers: 42 €".as_bytes().to_vec()),
            &mut slot,
            &log,
        );

        assert_eq!(outcome, RelayOutcome::Relayed { characters: 23 });
        assert_eq!(slot.content(), Some("quarterly numbers: 42 €"));
        assert_eq!(
            log.messages(LogLevel::Info),
            vec![
                "Storage queue function processed work item: report.txt",
                "Copied blob 'report.txt' (23 characters)",
            ]
        );
    }

    #[test]
    fn missing_source_blob_writes_nothing() {
        let log = RecordingLog::default();
        let mut slot = OutputBindingSlot::new();

        let outcome = handle_blob_copy(
            Ok(b"absent.txt".to_vec()),
            Err(RelayError::MissingBinding("blobInput".to_string())),
            &mut slot,
            &log,
        );

        assert!(!outcome.is_relayed());
        assert_eq!(slot.content(), None);
        assert_eq!(
            log.messages(LogLevel::Info)[0],
            "Storage queue function processed work item: absent.txt"
        );
        assert!(log.messages(LogLevel::Error)[0].contains("binding 'blobInput' is missing"));
    }

    #[test]
    fn undecodable_queue_item_is_swallowed() {
        let log = RecordingLog::default();
        let mut slot = OutputBindingSlot::new();

        let outcome = handle_blob_copy(Ok(vec![0xff]), Ok(b"content".to_vec()), &mut slot, &log);

        assert!(!outcome.is_relayed());
        assert_eq!(slot.content(), None);
        assert_eq!(log.console_errors.borrow().len(), 1);
    }
}
