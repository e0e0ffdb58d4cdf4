pub const LOG_RELAY_QUEUE: &str = "copyblobqueue";
pub const BLOB_RELAY_QUEUE: &str = "jsonprocessqueue";

pub const BLOB_CONTAINER: &str = "json-messages";
pub const BLOB_COPY_CONTAINER: &str = "helloworld";

/// Binding expression the Functions host expands to a fresh GUID per invocation.
pub const RANDOM_GUID_EXPRESSION: &str = "{rand-guid}";

/// Binding expression the Functions host replaces with the triggering message text.
pub const QUEUE_TRIGGER_EXPRESSION: &str = "{queueTrigger}";

/// Path template for the blob written by the storage relay.
///
/// The name is chosen by the platform, never by the handler, so two
/// invocations cannot contend for the same object.
pub fn blob_output_path(container: &str) -> String {
    format!(
        "{}/message-{RANDOM_GUID_EXPRESSION}.json",
        container.trim_matches('/')
    )
}

/// Blob named by the queue message, read by the blob copy function.
pub fn blob_copy_source_path(container: &str) -> String {
    format!("{}/{QUEUE_TRIGGER_EXPRESSION}", container.trim_matches('/'))
}

pub fn blob_copy_target_path(container: &str) -> String {
    format!("{}-copy", blob_copy_source_path(container))
}
