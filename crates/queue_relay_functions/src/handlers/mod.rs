pub mod blob_copy;
pub mod blob_relay;
pub mod log_relay;
pub mod router;

use queue_relay_core::contract::InvocationRequest;
use queue_relay_core::encoding::MessageEncoding;
use queue_relay_core::RelayError;

use crate::adapters::log_sink::RelayLog;

pub const COMPLETED_DESPITE_ERROR: &str = "Message processing completed despite error";

/// Raw message bytes, or the reason they could not be taken from the invocation.
pub type TriggerPayload = Result<Vec<u8>, RelayError>;

/// What happened to one message. Both variants complete the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Relayed { characters: usize },
    Dropped { error: RelayError },
}

impl RelayOutcome {
    pub fn is_relayed(&self) -> bool {
        matches!(self, Self::Relayed { .. })
    }
}

/// Pull a trigger binding out of the envelope and undo its transport encoding.
pub fn trigger_payload(
    request: &InvocationRequest,
    binding: &str,
    encoding: MessageEncoding,
) -> TriggerPayload {
    request
        .binding_bytes(binding)
        .and_then(|raw| encoding.decode(&raw))
}

/// Log a relay failure and turn it into a completed outcome.
///
/// The message is acknowledged either way; nothing is redelivered.
pub fn report_dropped(log: &dyn RelayLog, error: RelayError) -> RelayOutcome {
    log.error(&format!("Error processing message: {error}"));
    log.echo_error(&format!("Error processing queue message: {error}"));
    log.info(COMPLETED_DESPITE_ERROR);
    RelayOutcome::Dropped { error }
}
