use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RelayError;

pub const LOG_RELAY_FUNCTION: &str = "QueueTriggerFunction";
pub const BLOB_RELAY_FUNCTION: &str = "JsonQueueToBlobFunction";
pub const BLOB_COPY_FUNCTION: &str = "StorageQueueCopyBlob";

pub const TRIGGER_BINDING: &str = "msg";
pub const BLOB_OUTPUT_BINDING: &str = "outputBlob";
pub const COPY_TRIGGER_BINDING: &str = "queueItem";
pub const BLOB_INPUT_BINDING: &str = "blobInput";
pub const BLOB_COPY_OUTPUT_BINDING: &str = "blobOutput";

pub const CONNECTION_STRING_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";

/// Invocation envelope posted by the Functions host to a custom handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvocationRequest {
    #[serde(rename = "Data", default)]
    pub data: Map<String, Value>,
    #[serde(rename = "Metadata", default)]
    pub metadata: Map<String, Value>,
}

impl InvocationRequest {
    pub fn with_binding(name: &str, value: impl Into<Value>) -> Self {
        let mut data = Map::new();
        data.insert(name.to_string(), value.into());
        Self {
            data,
            metadata: Map::new(),
        }
    }

    /// Raw bytes carried by a trigger binding.
    ///
    /// Strings contribute their bytes verbatim; structured values that the
    /// host already parsed contribute their compact JSON form.
    pub fn binding_bytes(&self, name: &str) -> Result<Vec<u8>, RelayError> {
        match self.data.get(name) {
            None | Some(Value::Null) => Err(RelayError::MissingBinding(name.to_string())),
            Some(Value::String(text)) => Ok(text.clone().into_bytes()),
            Some(other) => Ok(other.to_string().into_bytes()),
        }
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Response returned to the Functions host for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvocationResponse {
    #[serde(rename = "Outputs", default)]
    pub outputs: Map<String, Value>,
    #[serde(rename = "Logs", default)]
    pub logs: Vec<String>,
    #[serde(rename = "ReturnValue", default)]
    pub return_value: Value,
}

impl InvocationResponse {
    pub fn completed(logs: Vec<String>) -> Self {
        Self {
            outputs: Map::new(),
            logs,
            return_value: Value::Null,
        }
    }

    pub fn set_output(&mut self, binding: &str, value: impl Into<Value>) {
        self.outputs.insert(binding.to_string(), value.into());
    }

    pub fn output_str(&self, binding: &str) -> Option<&str> {
        self.outputs.get(binding).and_then(Value::as_str)
    }
}
