//! Typed requests decoded from a method name and its argument map.

use crate::config::MethodConfig;
use crate::error::{LauncherError, Result};
use serde_json::Value;

/// The fixed set of shell operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RevealInFileManager,
    LaunchFile,
    LaunchFileWithApplication,
    ListAssociatedApplications,
}

/// A validated request. Paths are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    Reveal { file_path: String },
    Launch { file_path: String },
    LaunchWith { file_path: String, application_path: String },
    ListApplications { file_path: String },
}

impl ShellRequest {
    /// Decode a call. Returns `Ok(None)` for method names this launcher does
    /// not implement, whatever the arguments.
    pub fn parse(method: &str, params: &Value) -> Result<Option<Self>> {
        let request = match method {
            MethodConfig::SHOW_IN_FILE_EXPLORER => ShellRequest::Reveal {
                file_path: require_path(params)?,
            },
            MethodConfig::LAUNCH_FILE => {
                let file_path = require_path(params)?;
                let (snake, camel) = MethodConfig::APPLICATION_PATH_KEY;
                match get_str_param(params, snake, camel)? {
                    Some(app) if !app.is_empty() => ShellRequest::LaunchWith {
                        file_path,
                        application_path: app.to_string(),
                    },
                    _ => ShellRequest::Launch { file_path },
                }
            }
            MethodConfig::GET_SUPPORTED_APPLICATIONS => ShellRequest::ListApplications {
                file_path: require_path(params)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(request))
    }

    pub fn command(&self) -> Command {
        match self {
            ShellRequest::Reveal { .. } => Command::RevealInFileManager,
            ShellRequest::Launch { .. } => Command::LaunchFile,
            ShellRequest::LaunchWith { .. } => Command::LaunchFileWithApplication,
            ShellRequest::ListApplications { .. } => Command::ListAssociatedApplications,
        }
    }

    pub fn file_path(&self) -> &str {
        match self {
            ShellRequest::Reveal { file_path }
            | ShellRequest::Launch { file_path }
            | ShellRequest::LaunchWith { file_path, .. }
            | ShellRequest::ListApplications { file_path } => file_path,
        }
    }
}

/// Extract an optional string parameter, supporting both snake_case and camelCase.
///
/// A present value that is not a string (or null) is an argument error.
fn get_str_param<'a>(params: &'a Value, snake: &str, camel: &str) -> Result<Option<&'a str>> {
    let (key, value) = match params.get(snake) {
        Some(v) => (snake, v),
        None => match params.get(camel) {
            Some(v) => (camel, v),
            None => return Ok(None),
        },
    };
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        other => Err(LauncherError::InvalidArgument {
            key: key.to_string(),
            message: format!("expected a string, got {}", other),
        }),
    }
}

fn require_path(params: &Value) -> Result<String> {
    let (snake, camel) = MethodConfig::FILE_PATH_KEY;
    match get_str_param(params, snake, camel)? {
        Some(path) if !path.is_empty() => Ok(path.to_string()),
        _ => Err(LauncherError::MissingPath),
    }
}

/// Extension of the last path component, without the dot.
///
/// Both `/` and `\` separate components so Windows paths behave the same on
/// every host. Names that only start with a dot (`.bashrc`) and names ending
/// in a dot have no extension.
pub fn file_extension(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(&name[dot + 1..])
}
