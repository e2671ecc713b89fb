//! Structured results handed back to the caller.

use crate::error::LauncherError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One application able to open a file, as listed by `getSupportedApplications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedApplication {
    /// Display name.
    pub name: String,
    /// Handler identity, passed back as `applicationPath` to launch with it.
    pub url: String,
    /// Always `None`; icons are not extracted.
    pub icon: Option<String>,
}

/// Error payload of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodError {
    /// Error kind, e.g. `argument_error`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// JSON-RPC error code for transports that need one.
    #[serde(skip)]
    pub rpc_code: i32,
}

/// Result of dispatching one call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodOutcome {
    Success(Value),
    Error(MethodError),
    /// The method is unknown, or the platform cannot perform it.
    NotImplemented,
}

impl MethodOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MethodOutcome::Success(_))
    }

    /// Error kind, if this is an error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodOutcome::Error(e) => Some(&e.code),
            _ => None,
        }
    }
}

impl From<LauncherError> for MethodOutcome {
    fn from(err: LauncherError) -> Self {
        if err.is_not_implemented() {
            return MethodOutcome::NotImplemented;
        }
        let details = match &err {
            LauncherError::Open { path, code } => Some(json!({ "path": path, "code": code })),
            LauncherError::Internal {
                path,
                operation,
                code,
                ..
            } => Some(json!({ "path": path, "operation": operation, "code": code })),
            LauncherError::MissingExtension { path } => Some(json!({ "path": path })),
            LauncherError::ApplicationNotFound { path, application } => {
                Some(json!({ "path": path, "application": application }))
            }
            _ => None,
        };
        MethodOutcome::Error(MethodError {
            code: err.kind().to_string(),
            message: err.to_string(),
            details,
            rpc_code: err.to_rpc_error_code(),
        })
    }
}
