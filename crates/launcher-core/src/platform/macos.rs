//! macOS shell backend built on `/usr/bin/open`.
//!
//! Finder selection uses `open -R`. Listing the applications registered for a
//! file type is not offered; it reports not-implemented.

use super::{NoHandler, ShellBackend, ShellStatus};
use crate::encoding::WideString;
use crate::error::{LauncherError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Shell operations through LaunchServices' `open` tool.
#[derive(Debug, Default)]
pub struct MacShell;

impl MacShell {
    pub fn new() -> Result<Self> {
        Ok(Self)
    }

    fn run_open(&self, args: &[&str], path: &str) -> ShellStatus {
        let result = Command::new("open")
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => ShellStatus::LAUNCHED,
            Ok(status) => {
                debug!("open {:?} {} exited with {}", args, path, status);
                if Path::new(path).exists() {
                    ShellStatus::NO_ASSOCIATION
                } else {
                    ShellStatus::FILE_NOT_FOUND
                }
            }
            Err(e) => {
                debug!("Failed to run open: {}", e);
                ShellStatus::from_spawn_error(&e)
            }
        }
    }
}

impl ShellBackend for MacShell {
    type Handler = NoHandler;

    fn reveal(&self, path: &WideString) -> Result<ShellStatus> {
        Ok(self.run_open(&["-R"], &path.to_utf8()?))
    }

    fn open(&self, path: &WideString) -> Result<ShellStatus> {
        Ok(self.run_open(&[], &path.to_utf8()?))
    }

    fn associated_handlers(&self, _extension: &WideString) -> Result<Vec<NoHandler>> {
        Err(LauncherError::Unsupported {
            operation: "listing associated applications",
            platform: "macos",
        })
    }

    fn invoke_handler(&self, handler: &NoHandler, _path: &WideString) -> Result<()> {
        match *handler {}
    }
}
