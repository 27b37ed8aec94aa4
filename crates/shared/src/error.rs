use thiserror::Error;

/// Failure of a console query, whatever the underlying transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("console api returned status {0}")]
    Status(u16),
    #[error("graphql error: {0}")]
    GraphQl(String),
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("console api unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
