use std::fmt;

use thiserror::Error;

pub type JobId = u64;
pub type RequestId = u64;

/// An attribute to claim on a permanode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SearchCompleted {
        request_id: RequestId,
        result: Result<Vec<String>, ConnectionError>,
    },
    PermanodeCreated {
        job_id: JobId,
        result: Result<String, ConnectionError>,
    },
    /// One claim of a set job finished; `Ok` carries the claim's blobref.
    ClaimSettled {
        job_id: JobId,
        claim_index: usize,
        result: Result<String, ConnectionError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ConnectionError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConnectionError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    SigningUnavailable,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::SigningUnavailable => write!(f, "server has no signing configured"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
