use std::fmt;

use shared::error::BackendFailure;
use thiserror::Error;

/// The backend endpoint a remote call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    DispatchCommand,
    FetchStatus,
    FetchLog,
    FetchRefreshSignal,
}

impl RemoteOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteOperation::DispatchCommand => "dispatch_command",
            RemoteOperation::FetchStatus => "fetch_status",
            RemoteOperation::FetchLog => "fetch_log",
            RemoteOperation::FetchRefreshSignal => "fetch_refresh_signal",
        }
    }
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RemoteCause {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Decode(String),
    #[error(transparent)]
    Logical(#[from] BackendFailure),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
#[error("{operation} failed: {cause}")]
pub struct RemoteError {
    pub operation: RemoteOperation,
    #[source]
    pub cause: RemoteCause,
}

impl RemoteError {
    pub fn new(operation: RemoteOperation, cause: impl Into<RemoteCause>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }

    pub fn other(operation: RemoteOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RemoteCause::Other(message.into()))
    }

    /// Backend answered but reported failure, as opposed to a broken exchange.
    pub fn is_logical(&self) -> bool {
        matches!(self.cause, RemoteCause::Logical(_))
    }
}
