//! Error types for the launcher.
//!
//! Every variant maps onto one of the error kinds reported back to the caller
//! (`argument_error`, `open_error`, `internal_error`, ...), so the dispatcher can
//! forward OS failures without inspecting them.

use crate::encoding::EncodingError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the launcher.
#[derive(Debug, Error)]
pub enum LauncherError {
    // Argument errors
    #[error("No path provided")]
    MissingPath,

    #[error("Invalid argument {key}: {message}")]
    InvalidArgument { key: String, message: String },

    #[error("Unable to determine the file extension of {path}")]
    MissingExtension { path: String },

    // Shell execution errors
    #[error("Failed to open {path}: ShellExecute error code {code}")]
    Open { path: String, code: i32 },

    #[error("Failed to {operation} for {path}: {message}")]
    Internal {
        operation: String,
        path: String,
        message: String,
        /// Native status code (HRESULT, exit code) when the OS reported one.
        code: Option<i32>,
    },

    #[error("No application matching {application} was listed for {path}")]
    ApplicationNotFound { path: String, application: String },

    // Encoding errors
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Platform gaps
    #[error("{operation} is not supported on {platform}")]
    Unsupported {
        operation: &'static str,
        platform: &'static str,
    },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for launcher operations.
pub type Result<T> = std::result::Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(err: std::io::Error) -> Self {
        LauncherError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for LauncherError {
    fn from(err: serde_json::Error) -> Self {
        LauncherError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl LauncherError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        LauncherError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create an internal error for a failed OS call.
    pub fn internal(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        code: Option<i32>,
    ) -> Self {
        LauncherError::Internal {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
            code,
        }
    }

    /// The error kind reported to the caller.
    pub fn kind(&self) -> &'static str {
        match self {
            LauncherError::MissingPath
            | LauncherError::InvalidArgument { .. }
            | LauncherError::MissingExtension { .. } => "argument_error",
            LauncherError::Open { .. } => "open_error",
            LauncherError::ApplicationNotFound { .. } => "application_not_found",
            LauncherError::Encoding(_) => "encoding_error",
            LauncherError::Unsupported { .. } => "not_implemented",
            LauncherError::Internal { .. }
            | LauncherError::Json { .. }
            | LauncherError::Io { .. }
            | LauncherError::Other(_) => "internal_error",
        }
    }

    /// Native status code carried by the error, if any.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            LauncherError::Open { code, .. } => Some(*code),
            LauncherError::Internal { code, .. } => *code,
            LauncherError::Io { source, .. } => source.as_ref().and_then(|e| e.raw_os_error()),
            _ => None,
        }
    }

    /// Whether this error means "unsupported here" rather than "failed".
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, LauncherError::Unsupported { .. })
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Standard JSON-RPC error codes:
    /// - -32601: Method not found
    /// - -32602: Invalid params
    /// - -32603: Internal error
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32001: Shell refused to open the path
    /// - -32002: Requested application was not listed
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            LauncherError::MissingPath
            | LauncherError::InvalidArgument { .. }
            | LauncherError::MissingExtension { .. }
            | LauncherError::Encoding(_) => -32602,

            LauncherError::Open { .. } => -32001,

            LauncherError::ApplicationNotFound { .. } => -32002,

            LauncherError::Unsupported { .. } => -32601,

            // All other errors are internal errors
            _ => -32603,
        }
    }
}
