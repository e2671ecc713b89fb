//! freedesktop.org shell backend.
//!
//! Reveal asks the session's `org.freedesktop.FileManager1` service to select
//! the file and falls back to opening the parent directory. Launch goes
//! through `xdg-open`. Associations come from the XDG MIME database.

use super::xdg::{self, DesktopEntry, XdgDirs};
use super::{AssociationHandler, ShellBackend, ShellStatus};
use crate::config::XdgConfig;
use crate::encoding::WideString;
use crate::error::{LauncherError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Shell operations through D-Bus, `xdg-open` and desktop entries.
#[derive(Debug, Clone)]
pub struct FreedesktopShell {
    dirs: XdgDirs,
}

impl FreedesktopShell {
    pub fn new() -> Result<Self> {
        Ok(Self::with_dirs(XdgDirs::from_env()))
    }

    pub fn with_dirs(dirs: XdgDirs) -> Self {
        Self { dirs }
    }

    fn show_items(&self, path: &str) -> bool {
        let Ok(uri) = url::Url::from_file_path(path) else {
            return false;
        };
        let result = Command::new("dbus-send")
            .arg("--session")
            .arg(format!("--dest={}", XdgConfig::FILE_MANAGER_BUS_NAME))
            .arg("--type=method_call")
            .arg(XdgConfig::FILE_MANAGER_OBJECT_PATH)
            .arg(format!("{}.ShowItems", XdgConfig::FILE_MANAGER_BUS_NAME))
            .arg(format!("array:string:{}", uri))
            .arg("string:")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) if status.success() => true,
            Ok(status) => {
                debug!("FileManager1.ShowItems exited with {}", status);
                false
            }
            Err(e) => {
                debug!("dbus-send failed: {}", e);
                false
            }
        }
    }
}

/// Run `xdg-open` and translate its documented exit codes.
fn xdg_open(target: &str) -> ShellStatus {
    let result = Command::new("xdg-open")
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(status) => {
            let status = status_from_xdg_open(status.code());
            if !status.is_success() {
                debug!("xdg-open {} failed with status {}", target, status);
            }
            status
        }
        Err(e) => {
            debug!("Failed to run xdg-open: {}", e);
            ShellStatus::from_spawn_error(&e)
        }
    }
}

fn status_from_xdg_open(code: Option<i32>) -> ShellStatus {
    match code {
        Some(0) => ShellStatus::LAUNCHED,
        Some(2) => ShellStatus::FILE_NOT_FOUND,
        Some(3) => ShellStatus::NO_ASSOCIATION,
        _ => ShellStatus::FAILED,
    }
}

impl ShellBackend for FreedesktopShell {
    type Handler = DesktopApplication;

    fn reveal(&self, path: &WideString) -> Result<ShellStatus> {
        let path = path.to_utf8()?;
        let target = Path::new(&path);
        if !target.exists() {
            return Ok(ShellStatus::FILE_NOT_FOUND);
        }
        if self.show_items(&path) {
            return Ok(ShellStatus::LAUNCHED);
        }
        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Ok(xdg_open(&parent.to_string_lossy()))
    }

    fn open(&self, path: &WideString) -> Result<ShellStatus> {
        Ok(xdg_open(&path.to_utf8()?))
    }

    fn associated_handlers(&self, extension: &WideString) -> Result<Vec<DesktopApplication>> {
        let extension = extension.to_utf8()?;
        let handlers: Vec<DesktopApplication> =
            xdg::applications_for_extension(&self.dirs, &extension)
                .into_iter()
                .map(DesktopApplication)
                .collect();
        debug!("{} desktop entries for .{}", handlers.len(), extension);
        Ok(handlers)
    }

    fn invoke_handler(&self, handler: &DesktopApplication, path: &WideString) -> Result<()> {
        let file = path.to_utf8()?;
        let args = handler.0.command_line(&file)?;
        let (program, rest) = args.split_first().ok_or_else(|| {
            LauncherError::internal("launch application", file.clone(), "empty command line", None)
        })?;

        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                LauncherError::internal(
                    "launch application",
                    file.clone(),
                    format!("{}: {}", program, e),
                    e.raw_os_error(),
                )
            })?;

        // Don't wait for the application - it should run independently
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// A desktop entry returned by a listing. Its identity is the desktop file
/// path.
#[derive(Debug, Clone)]
pub struct DesktopApplication(DesktopEntry);

impl DesktopApplication {
    pub fn entry(&self) -> &DesktopEntry {
        &self.0
    }
}

impl AssociationHandler for DesktopApplication {
    fn display_name(&self) -> Result<WideString> {
        Ok(WideString::from_utf8(&self.0.name)?)
    }

    fn identity(&self) -> Result<WideString> {
        Ok(WideString::from_utf8(&self.0.path.to_string_lossy())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_xdg_open_exit_codes() {
        assert_eq!(status_from_xdg_open(Some(0)), ShellStatus::LAUNCHED);
        assert_eq!(status_from_xdg_open(Some(2)), ShellStatus::FILE_NOT_FOUND);
        assert_eq!(status_from_xdg_open(Some(3)), ShellStatus::NO_ASSOCIATION);
        assert_eq!(status_from_xdg_open(Some(4)), ShellStatus::FAILED);
        assert_eq!(status_from_xdg_open(None), ShellStatus::FAILED);
    }

    #[test]
    fn test_reveal_missing_file() {
        let shell = FreedesktopShell::with_dirs(XdgDirs::default());
        let path = WideString::from_utf8("/nonexistent/dir/report.pdf").unwrap();
        assert_eq!(shell.reveal(&path).unwrap(), ShellStatus::FILE_NOT_FOUND);
    }

    #[test]
    fn test_handlers_report_desktop_file_identity() {
        let temp = TempDir::new().unwrap();
        let data = temp.path();
        fs::create_dir_all(data.join("mime")).unwrap();
        fs::create_dir_all(data.join("applications")).unwrap();
        fs::write(data.join("mime/globs2"), "50:text/markdown:*.md\n").unwrap();
        fs::write(
            data.join("applications/mimeinfo.cache"),
            "[MIME Cache]\ntext/markdown=writer.desktop;\n",
        )
        .unwrap();
        let desktop = data.join("applications/writer.desktop");
        fs::write(&desktop, "[Desktop Entry]\nName=Writer\nExec=writer %f\n").unwrap();

        let shell = FreedesktopShell::with_dirs(XdgDirs::new(None, vec![data.to_path_buf()]));
        let handlers = shell
            .associated_handlers(&WideString::from_utf8("md").unwrap())
            .unwrap();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].display_name().unwrap().to_utf8().unwrap(), "Writer");
        assert_eq!(
            handlers[0].identity().unwrap().to_utf8().unwrap(),
            desktop.to_string_lossy()
        );
    }

    #[test]
    fn test_invoke_missing_program_is_internal_error() {
        let shell = FreedesktopShell::with_dirs(XdgDirs::default());
        let handler = DesktopApplication(DesktopEntry {
            path: "/tmp/missing.desktop".into(),
            name: "Missing".to_string(),
            exec: "/nonexistent/bin/launcher-test-app %f".to_string(),
            icon: None,
        });
        let err = shell
            .invoke_handler(&handler, &WideString::from_utf8("/tmp/a.txt").unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), "internal_error");
    }
}
