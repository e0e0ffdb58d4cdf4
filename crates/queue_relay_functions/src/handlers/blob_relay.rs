use queue_relay_core::encoding::decode_text;
use queue_relay_core::RelayError;

use crate::adapters::blob_output::BlobOutput;
use crate::adapters::log_sink::RelayLog;
use crate::handlers::{report_dropped, RelayOutcome, TriggerPayload};

pub const BLOB_RELAY_RECEIPT: &str = "JSON queue trigger function processed a message";

/// Copy one queue message verbatim into the invocation's output blob.
///
/// The body is never parsed, even on the JSON queue; whatever text arrived is
/// what gets stored. Failures leave the blob unwritten and are swallowed.
pub fn handle_blob_relay(
    payload: TriggerPayload,
    output: &mut dyn BlobOutput,
    log: &dyn RelayLog,
) -> RelayOutcome {
    log.info(BLOB_RELAY_RECEIPT);

    match payload.and_then(|body| relay_to_blob(body, output, log)) {
        Ok(characters) => RelayOutcome::Relayed { characters },
        Err(error) => report_dropped(log, error),
    }
}

pub fn relay_to_blob(
    body: Vec<u8>,
    output: &mut dyn BlobOutput,
    log: &dyn RelayLog,
) -> Result<usize, RelayError> {
    let text = decode_text(body)?;
    let characters = text.chars().count();

    output.write_blob(&text).map_err(RelayError::Output)?;
    log.info(&format!(
        "Successfully saved message to blob ({characters} characters)"
    ));
    Ok(characters)
}
