use std::collections::BTreeMap;

use thiserror::Error;

/// Errors surfaced by the data API client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("data API returned {status}: {message}")]
    Status { status: u16, message: String },
    /// A 400 whose body carries a `{field: error_code}` map; the form layer
    /// turns the codes into per-field messages.
    #[error("data API rejected the update")]
    Validation(BTreeMap<String, String>),
}

impl ClientError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Validation(_) => Some(400),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}
