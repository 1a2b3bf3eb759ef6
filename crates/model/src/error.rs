use std::fmt;

/// The tagged sum of error kinds from §7 of the specification. Kept as a flat
/// enum (not per-crate enums) so the Coordinator's public API can return one
/// error taxonomy regardless of which subsystem raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Duplicate,
    NotFound,
    WrongStatus,
    BundleStale,
    CapacityDenied,
    Cancelled,
    Timeout,
    ConnectFail,
    Revert,
    GasExceeds,
    NonceGap,
    RpcFailed,
    ExportFailed,
    DuplicateRun,
}

/// A structured error: kind, human message, and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<anyhow::Error>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), cause: None }
    }

    pub fn with_cause(kind: ErrorKind, message: impl Into<String>, cause: anyhow::Error) -> Self {
        Self { kind, message: message.into(), cause: Some(cause) }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
