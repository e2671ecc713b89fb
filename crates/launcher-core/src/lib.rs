//! Launcher Core - reveal, launch and list applications for files through the
//! native OS shell.
//!
//! The crate turns three named method calls into shell operations:
//!
//! - `showFileInNativeFileExplorer` opens the file manager with the file selected
//! - `launchFile` opens the file with its default application, or with one
//!   returned by an earlier listing when `applicationPath` is given
//! - `getSupportedApplications` lists applications registered for the file's
//!   extension
//!
//! It can be used without any RPC layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use launcher_core::{Dispatcher, MethodOutcome, NativeShell};
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::new(NativeShell::new()?);
//! let apps = dispatcher.dispatch("getSupportedApplications", &json!({"filePath": "C:\\notes.txt"}));
//! if let MethodOutcome::Success(list) = apps {
//!     println!("{}", list);
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod encoding;
pub mod error;
pub mod outcome;
pub mod platform;
pub mod registry;
pub mod request;
pub mod worker;

// Re-export commonly used types
pub use config::{DispatcherOptions, LauncherConfig, MethodConfig};
pub use dispatcher::Dispatcher;
pub use encoding::{EncodingError, WideString};
pub use error::{LauncherError, Result};
pub use outcome::{AssociatedApplication, MethodError, MethodOutcome};
#[cfg(any(windows, unix))]
pub use platform::NativeShell;
pub use platform::{current_platform, AssociationHandler, ShellBackend, ShellStatus};
pub use registry::{HandlerLookup, HandlerRegistry};
pub use request::{Command, ShellRequest};
pub use worker::DispatcherWorker;
