//! Platform abstraction layer for the OS shell.
//!
//! All `#[cfg]` blocks for OS-specific behavior live in this module. The
//! dispatcher only sees the [`ShellBackend`] trait; [`NativeShell`] names the
//! backend for the current target.
//!
//! # Supported Platforms
//!
//! - **Windows**: `ShellExecuteW` and COM association handlers
//! - **macOS**: `open` / `open -R`; association listing is not implemented
//! - **Linux and other Unix**: freedesktop D-Bus, `xdg-open` and XDG MIME data

#[cfg(windows)]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod linux;
#[cfg(all(unix, not(target_os = "macos")))]
pub mod xdg;

use crate::config::LauncherConfig;
use crate::encoding::WideString;
use crate::error::Result;
use std::fmt;

#[cfg(windows)]
pub use self::windows::WindowsShell as NativeShell;

#[cfg(target_os = "macos")]
pub use self::macos::MacShell as NativeShell;

#[cfg(all(unix, not(target_os = "macos")))]
pub use self::linux::FreedesktopShell as NativeShell;

/// Return value of a shell-execution call.
///
/// Follows the `ShellExecute` convention: values at or below
/// [`LauncherConfig::STATUS_FAILURE_THRESHOLD`] are error codes, anything
/// larger means the shell accepted the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellStatus(pub i32);

impl ShellStatus {
    /// Unspecified failure (the shell ran out of resources or the helper failed).
    pub const FAILED: ShellStatus = ShellStatus(0);
    pub const FILE_NOT_FOUND: ShellStatus = ShellStatus(2);
    pub const PATH_NOT_FOUND: ShellStatus = ShellStatus(3);
    pub const ACCESS_DENIED: ShellStatus = ShellStatus(5);
    pub const NO_ASSOCIATION: ShellStatus = ShellStatus(31);
    /// Reported by process-spawning backends once the helper succeeded.
    pub const LAUNCHED: ShellStatus = ShellStatus(33);

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 > LauncherConfig::STATUS_FAILURE_THRESHOLD
    }

    /// Map a failure to spawn a helper process onto a status code.
    pub fn from_spawn_error(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ShellStatus::NO_ASSOCIATION,
            std::io::ErrorKind::PermissionDenied => ShellStatus::ACCESS_DENIED,
            _ => ShellStatus::FAILED,
        }
    }
}

impl fmt::Display for ShellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An application the OS lists as able to open a file type.
///
/// Dropping the value releases the underlying OS reference.
pub trait AssociationHandler {
    /// Display name, in native encoding.
    fn display_name(&self) -> Result<WideString>;

    /// Identity used to select this handler again: an executable path on
    /// Windows, a desktop entry path on freedesktop systems.
    fn identity(&self) -> Result<WideString>;
}

/// The OS shell operations the dispatcher needs.
pub trait ShellBackend {
    type Handler: AssociationHandler;

    /// Open the default file manager with `path` selected.
    fn reveal(&self, path: &WideString) -> Result<ShellStatus>;

    /// Open `path` with its registered default application.
    fn open(&self, path: &WideString) -> Result<ShellStatus>;

    /// Applications recommended for files with `extension` (no leading dot).
    fn associated_handlers(&self, extension: &WideString) -> Result<Vec<Self::Handler>>;

    /// Open `path` with a specific handler. Returns once the request is issued.
    fn invoke_handler(&self, handler: &Self::Handler, path: &WideString) -> Result<()>;
}

/// Returns the current platform name.
pub fn current_platform() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        "linux"
    }
    #[cfg(target_os = "windows")]
    {
        "windows"
    }
    #[cfg(target_os = "macos")]
    {
        "macos"
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        "unknown"
    }
}

/// Uninhabited handler for backends that cannot list applications.
#[derive(Debug)]
pub enum NoHandler {}

impl AssociationHandler for NoHandler {
    fn display_name(&self) -> Result<WideString> {
        match *self {}
    }

    fn identity(&self) -> Result<WideString> {
        match *self {}
    }
}
