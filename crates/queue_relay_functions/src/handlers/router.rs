use std::collections::BTreeMap;
use std::sync::Arc;

use queue_relay_core::contract::{
    InvocationRequest, InvocationResponse, BLOB_COPY_FUNCTION, BLOB_COPY_OUTPUT_BINDING,
    BLOB_INPUT_BINDING, BLOB_OUTPUT_BINDING, BLOB_RELAY_FUNCTION, COPY_TRIGGER_BINDING,
    LOG_RELAY_FUNCTION, TRIGGER_BINDING,
};
use queue_relay_core::encoding::MessageEncoding;
use queue_relay_core::RelayError;
use tracing::debug;

use crate::adapters::blob_output::OutputBindingSlot;
use crate::adapters::log_sink::InvocationLog;
use crate::handlers::blob_copy::handle_blob_copy;
use crate::handlers::blob_relay::handle_blob_relay;
use crate::handlers::log_relay::handle_log_relay;
use crate::handlers::{report_dropped, trigger_payload, RelayOutcome};

/// One function the host can invoke by name.
pub trait FunctionHandler: Send + Sync {
    fn invoke(&self, function: &str, request: &InvocationRequest) -> InvocationResponse;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRelayFunction {
    pub encoding: MessageEncoding,
}

impl FunctionHandler for LogRelayFunction {
    fn invoke(&self, function: &str, request: &InvocationRequest) -> InvocationResponse {
        let log = InvocationLog::new(function, request.metadata_str("Id"));
        let payload = trigger_payload(request, TRIGGER_BINDING, self.encoding);

        let outcome = handle_log_relay(payload, &log);
        trace_outcome(function, &outcome);

        InvocationResponse::completed(log.into_lines())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobRelayFunction {
    pub encoding: MessageEncoding,
}

impl FunctionHandler for BlobRelayFunction {
    fn invoke(&self, function: &str, request: &InvocationRequest) -> InvocationResponse {
        let log = InvocationLog::new(function, request.metadata_str("Id"));
        let payload = trigger_payload(request, TRIGGER_BINDING, self.encoding);
        let mut slot = OutputBindingSlot::new();

        let outcome = handle_blob_relay(payload, &mut slot, &log);
        trace_outcome(function, &outcome);

        let mut response = InvocationResponse::completed(log.into_lines());
        if let Some(content) = slot.into_content() {
            response.set_output(BLOB_OUTPUT_BINDING, content);
        }
        response
    }
}

/// Copies the input blob named by the message into the output blob.
///
/// `encoding` applies to the queue message only; blob content arrives as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobCopyFunction {
    pub encoding: MessageEncoding,
}

impl FunctionHandler for BlobCopyFunction {
    fn invoke(&self, function: &str, request: &InvocationRequest) -> InvocationResponse {
        let log = InvocationLog::new(function, request.metadata_str("Id"));
        let queue_item = trigger_payload(request, COPY_TRIGGER_BINDING, self.encoding);
        let source = request.binding_bytes(BLOB_INPUT_BINDING);
        let mut slot = OutputBindingSlot::new();

        let outcome = handle_blob_copy(queue_item, source, &mut slot, &log);
        trace_outcome(function, &outcome);

        let mut response = InvocationResponse::completed(log.into_lines());
        if let Some(content) = slot.into_content() {
            response.set_output(BLOB_COPY_OUTPUT_BINDING, content);
        }
        response
    }
}

/// Function registry keyed by the name the host routes on.
#[derive(Default, Clone)]
pub struct FunctionRouter {
    handlers: BTreeMap<String, Arc<dyn FunctionHandler>>,
}

impl FunctionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, handler: impl FunctionHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn dispatch(&self, name: &str, request: &InvocationRequest) -> Option<InvocationResponse> {
        self.handlers
            .get(name)
            .map(|handler| handler.invoke(name, request))
    }
}

/// Every function the host can serve.
///
/// The blob copy function shares the log relay's queue and therefore its
/// decoding.
pub fn relay_router(log_encoding: MessageEncoding, blob_encoding: MessageEncoding) -> FunctionRouter {
    let mut router = FunctionRouter::new();
    router.register(
        LOG_RELAY_FUNCTION,
        LogRelayFunction {
            encoding: log_encoding,
        },
    );
    router.register(
        BLOB_RELAY_FUNCTION,
        BlobRelayFunction {
            encoding: blob_encoding,
        },
    );
    router.register(
        BLOB_COPY_FUNCTION,
        BlobCopyFunction {
            encoding: log_encoding,
        },
    );
    router
}

/// Response for an envelope that could not be read at all.
///
/// Still a completed invocation, so the host does not retry it.
pub fn rejected_envelope(function: &str, error: RelayError) -> InvocationResponse {
    let log = InvocationLog::new(function, None);
    let outcome = report_dropped(&log, error);
    trace_outcome(function, &outcome);
    InvocationResponse::completed(log.into_lines())
}

fn trace_outcome(function: &str, outcome: &RelayOutcome) {
    match outcome {
        RelayOutcome::Relayed { characters } => {
            debug!(function, characters, "message relayed");
        }
        RelayOutcome::Dropped { error } => {
            debug!(function, error = %error, "message dropped");
        }
    }
}
