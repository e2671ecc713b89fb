//! Centralized configuration for the launcher.
//!
//! Fixed names and thresholds live here as associated constants; runtime
//! switches live in [`DispatcherOptions`].

/// Application-level configuration.
pub struct LauncherConfig;

impl LauncherConfig {
    pub const APP_NAME: &'static str = "Native File Launcher";
    /// Channel name the host framework registers the methods under.
    pub const CHANNEL_NAME: &'static str = "native_file_explorer_launcher";
    /// Name of the OS thread that owns the dispatcher.
    pub const WORKER_THREAD_NAME: &'static str = "shell-dispatcher";
    /// Shell status codes at or below this value are failures.
    pub const STATUS_FAILURE_THRESHOLD: i32 = 32;
}

/// Method names and argument keys of the call surface.
pub struct MethodConfig;

impl MethodConfig {
    pub const SHOW_IN_FILE_EXPLORER: &'static str = "showFileInNativeFileExplorer";
    pub const LAUNCH_FILE: &'static str = "launchFile";
    pub const GET_SUPPORTED_APPLICATIONS: &'static str = "getSupportedApplications";

    pub const FILE_PATH_KEY: (&'static str, &'static str) = ("file_path", "filePath");
    pub const APPLICATION_PATH_KEY: (&'static str, &'static str) =
        ("application_path", "applicationPath");
}

/// freedesktop.org lookup locations.
pub struct XdgConfig;

impl XdgConfig {
    pub const DEFAULT_DATA_DIRS: &'static str = "/usr/local/share:/usr/share";
    pub const MIME_GLOBS_FILE: &'static str = "mime/globs2";
    pub const MIME_CACHE_FILE: &'static str = "applications/mimeinfo.cache";
    pub const MIMEAPPS_LIST_FILE: &'static str = "mimeapps.list";
    pub const APPLICATIONS_DIR: &'static str = "applications";
    pub const FILE_MANAGER_BUS_NAME: &'static str = "org.freedesktop.FileManager1";
    pub const FILE_MANAGER_OBJECT_PATH: &'static str = "/org/freedesktop/FileManager1";
}

/// Runtime options for a [`crate::Dispatcher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherOptions {
    /// Report `application_not_found` when `launchFile` names an application
    /// that was not in the latest listing, instead of succeeding without
    /// launching anything.
    pub strict_application_match: bool,
}
