//! Function app manifests rendered for the Functions host.
//!
//! `function.json` files describe the queue triggers and the blob output
//! slot; `host.json` points the host at the custom handler executable.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contract::{
    BLOB_COPY_FUNCTION, BLOB_COPY_OUTPUT_BINDING, BLOB_INPUT_BINDING, BLOB_OUTPUT_BINDING,
    BLOB_RELAY_FUNCTION, COPY_TRIGGER_BINDING, LOG_RELAY_FUNCTION, TRIGGER_BINDING,
};
use crate::storage_keys::{
    blob_copy_source_path, blob_copy_target_path, blob_output_path, BLOB_CONTAINER,
    BLOB_COPY_CONTAINER, BLOB_RELAY_QUEUE, LOG_RELAY_QUEUE,
};

pub const STORAGE_CONNECTION_SETTING: &str = "AzureWebJobsStorage";
pub const EXTENSION_BUNDLE_ID: &str = "Microsoft.Azure.Functions.ExtensionBundle";
pub const EXTENSION_BUNDLE_VERSION: &str = "[4.*, 5.0.0)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub name: String,
    #[serde(rename = "type")]
    pub binding_type: String,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    pub connection: String,
}

impl Binding {
    pub fn queue_trigger(name: &str, queue_name: &str) -> Self {
        Self {
            name: name.to_string(),
            binding_type: "queueTrigger".to_string(),
            direction: Direction::In,
            queue_name: Some(queue_name.to_string()),
            path: None,
            data_type: None,
            connection: STORAGE_CONNECTION_SETTING.to_string(),
        }
    }

    pub fn blob_output(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            binding_type: "blob".to_string(),
            direction: Direction::Out,
            queue_name: None,
            path: Some(path),
            data_type: None,
            connection: STORAGE_CONNECTION_SETTING.to_string(),
        }
    }

    /// Blob read before the invocation and handed over as text.
    pub fn blob_input(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            binding_type: "blob".to_string(),
            direction: Direction::In,
            queue_name: None,
            path: Some(path),
            data_type: Some("string".to_string()),
            connection: STORAGE_CONNECTION_SETTING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub bindings: Vec<Binding>,
}

impl FunctionDefinition {
    pub fn trigger_queue(&self) -> Option<&str> {
        self.bindings
            .iter()
            .find(|binding| binding.binding_type == "queueTrigger")
            .and_then(|binding| binding.queue_name.as_deref())
    }
}

/// Every function the relay host serves, keyed by function name.
pub fn function_app_definitions() -> Vec<(&'static str, FunctionDefinition)> {
    vec![
        (
            LOG_RELAY_FUNCTION,
            FunctionDefinition {
                bindings: vec![Binding::queue_trigger(TRIGGER_BINDING, LOG_RELAY_QUEUE)],
            },
        ),
        (
            BLOB_RELAY_FUNCTION,
            FunctionDefinition {
                bindings: vec![
                    Binding::queue_trigger(TRIGGER_BINDING, BLOB_RELAY_QUEUE),
                    Binding::blob_output(BLOB_OUTPUT_BINDING, blob_output_path(BLOB_CONTAINER)),
                ],
            },
        ),
    ]
}

/// Blob copy function, listening on the same queue as the log relay.
///
/// Deployed only on request: two functions on one queue compete for its
/// messages, so each message reaches one of them, not both.
pub fn blob_copy_definition() -> (&'static str, FunctionDefinition) {
    (
        BLOB_COPY_FUNCTION,
        FunctionDefinition {
            bindings: vec![
                Binding::queue_trigger(COPY_TRIGGER_BINDING, LOG_RELAY_QUEUE),
                Binding::blob_input(
                    BLOB_INPUT_BINDING,
                    blob_copy_source_path(BLOB_COPY_CONTAINER),
                ),
                Binding::blob_output(
                    BLOB_COPY_OUTPUT_BINDING,
                    blob_copy_target_path(BLOB_COPY_CONTAINER),
                ),
            ],
        },
    )
}

/// `host.json` for a custom handler deployment.
///
/// Queue bodies reach the handler untouched; transport decoding happens in
/// the handler so both encodings can share one host.
pub fn host_manifest(executable: &str) -> Value {
    json!({
        "version": "2.0",
        "logging": {
            "logLevel": { "default": "Information" }
        },
        "extensionBundle": {
            "id": EXTENSION_BUNDLE_ID,
            "version": EXTENSION_BUNDLE_VERSION,
        },
        "extensions": {
            "queues": { "messageEncoding": "none" }
        },
        "customHandler": {
            "description": {
                "defaultExecutablePath": executable,
                "workingDirectory": "",
                "arguments": []
            },
            "enableForwardingHttpRequest": false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str) -> FunctionDefinition {
        function_app_definitions()
            .into_iter()
            .find(|(function, _)| *function == name)
            .map(|(_, definition)| definition)
            .expect("function should be defined")
    }

    #[test]
    fn log_relay_listens_on_copy_queue() {
        let rendered =
            serde_json::to_value(definition(LOG_RELAY_FUNCTION)).expect("serialize definition");
        assert_eq!(
            rendered,
            json!({
                "bindings": [{
                    "name": "msg",
                    "type": "queueTrigger",
                    "direction": "in",
                    "queueName": "copyblobqueue",
                    "connection": "AzureWebJobsStorage"
                }]
            })
        );
    }

    #[test]
    fn blob_relay_writes_random_blob_names() {
        let definition = definition(BLOB_RELAY_FUNCTION);
        assert_eq!(definition.trigger_queue(), Some("jsonprocessqueue"));

        let rendered = serde_json::to_value(&definition).expect("serialize definition");
        assert_eq!(rendered["bindings"][1]["type"], json!("blob"));
        assert_eq!(rendered["bindings"][1]["direction"], json!("out"));
        assert_eq!(
            rendered["bindings"][1]["path"],
            json!("json-messages/message-{rand-guid}.json")
        );
        assert!(rendered["bindings"][1].get("queueName").is_none());
    }

    #[test]
    fn host_manifest_points_at_executable() {
        let manifest = host_manifest("relay_host");
        assert_eq!(
            manifest["customHandler"]["description"]["defaultExecutablePath"],
            json!("relay_host")
        );
        assert_eq!(
            manifest["extensions"]["queues"]["messageEncoding"],
            json!("none")
        );
    }

    #[test]
    fn blob_copy_reads_and_writes_blobs_named_by_the_message() {
        let (name, definition) = blob_copy_definition();
        assert_eq!(name, "StorageQueueCopyBlob");
        assert_eq!(definition.trigger_queue(), Some("copyblobqueue"));

        let rendered = serde_json::to_value(&definition).expect("serialize definition");
        assert_eq!(
            rendered["bindings"][1],
            json!({
                "name": "blobInput",
                "type": "blob",
                "direction": "in",
                "path": "helloworld/{queueTrigger}",
                "dataType": "string",
                "connection": "AzureWebJobsStorage"
            })
        );
        assert_eq!(
            rendered["bindings"][2]["path"],
            json!("helloworld/{queueTrigger}-copy")
        );
        assert_eq!(rendered["bindings"][2]["direction"], json!("out"));
        assert!(function_app_definitions()
            .iter()
            .all(|(function, _)| *function != BLOB_COPY_FUNCTION));
    }
}
