use thiserror::Error;
use warmind_core::gateway::RemoteError;

/// Failure of a single HTTP exchange with the game API.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("request could not be sent: {0}")]
    Transport(String),
    #[error("remote answered HTTP {status} without a readable body: {body}")]
    Status { status: u16, body: String },
    #[error("response body could not be decoded: {0}")]
    Decode(String),
    #[error("invalid local address `{0}`")]
    InvalidAddress(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<ClientError> for RemoteError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Decode(message) => Self::Decode(message),
            other => Self::Transport(other.to_string()),
        }
    }
}
