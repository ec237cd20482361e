use thiserror::Error;

/// Failure talking to the manager.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(String),

    #[error("manager rejected call: {0}")]
    Rejected(String),

    #[error("manager reported error: {0}")]
    Manager(String),

    #[error("event stream closed: {0}")]
    Disconnected(String),

    #[error("not registered with the manager")]
    NotRegistered,

    #[error("bad event stream: {0}")]
    Codec(String),
}

impl TransportError {
    /// A rejection concerns one call; everything else means the session is gone.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TransportError::Rejected(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Http(e.to_string())
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Disconnected(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("registration failed: {0}")]
    Registration(TransportError),

    #[error("transport fault: {0}")]
    Transport(#[from] TransportError),
}
