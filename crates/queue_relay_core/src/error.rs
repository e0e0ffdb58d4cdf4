use thiserror::Error;

/// Reasons a single queue message could not be relayed.
///
/// None of these ever fail an invocation; handlers log them and complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("invocation envelope is not valid JSON: {0}")]
    Envelope(String),

    #[error("binding '{0}' is missing from the invocation data")]
    MissingBinding(String),

    #[error("message is not valid {encoding} payload: {message}")]
    Encoding {
        encoding: &'static str,
        message: String,
    },

    #[error("'utf-8' codec can't decode message: {0}")]
    InvalidUtf8(String),

    #[error("failed to write output blob: {0}")]
    Output(String),
}

impl From<std::string::FromUtf8Error> for RelayError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::InvalidUtf8(error.utf8_error().to_string())
    }
}
