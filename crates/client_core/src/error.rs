use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::Endpoint;

pub type ApiResult<T> = Result<T, ClientError>;

/// How the UI should treat a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete, returned non-2xx, or sent an unreadable body.
    Network,
    /// The server refused a reveal (already revealed or similar); not shown to the user.
    ValidationRejection,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Builder(#[source] reqwest::Error),
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("{endpoint} returned an unreadable body: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },
    #[error("{endpoint} rejected the request{}", detail_suffix(.detail))]
    Rejected {
        endpoint: Endpoint,
        detail: Option<String>,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Rejected { .. } => FailureKind::ValidationRejection,
            _ => FailureKind::Network,
        }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ClientError::Builder(_) => None,
            ClientError::Transport { endpoint, .. }
            | ClientError::Status { endpoint, .. }
            | ClientError::Decode { endpoint, .. }
            | ClientError::Rejected { endpoint, .. } => Some(*endpoint),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Rejected { .. } => Some(StatusCode::BAD_REQUEST),
            ClientError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}
