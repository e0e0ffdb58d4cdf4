use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Transport encoding applied to a queue message body.
///
/// `Base64` is the text-safe policy: any text survives queue transport and
/// decodes back to the exact original bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageEncoding {
    #[default]
    None,
    Base64,
}

impl MessageEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Base64 => "base64",
        }
    }

    pub fn encode(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Base64 => STANDARD.encode(text.as_bytes()),
        }
    }

    /// Undo the transport encoding, yielding the raw message bytes.
    ///
    /// Surrounding whitespace is ignored for base64 bodies since queue
    /// tooling commonly appends a trailing newline.
    pub fn decode(self, body: &[u8]) -> Result<Vec<u8>, RelayError> {
        match self {
            Self::None => Ok(body.to_vec()),
            Self::Base64 => STANDARD
                .decode(body.trim_ascii())
                .map_err(|error| RelayError::Encoding {
                    encoding: self.as_str(),
                    message: error.to_string(),
                }),
        }
    }
}

impl fmt::Display for MessageEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageEncoding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "base64" => Ok(Self::Base64),
            other => Err(format!(
                "Unsupported message encoding '{other}' (expected none or base64)"
            )),
        }
    }
}

/// Interpret message bytes as UTF-8 text.
pub fn decode_text(body: Vec<u8>) -> Result<String, RelayError> {
    Ok(String::from_utf8(body)?)
}
