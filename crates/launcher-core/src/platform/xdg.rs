//! freedesktop.org MIME and desktop entry lookup.
//!
//! Resolves a file extension to MIME types through `mime/globs2`, then MIME
//! types to desktop entries through `mimeapps.list` and
//! `applications/mimeinfo.cache`. Everything here reads plain files from
//! explicit directories so it can be exercised against fixture trees.

use crate::config::XdgConfig;
use crate::error::{LauncherError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directories searched for MIME and application data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XdgDirs {
    /// `$XDG_CONFIG_HOME`, holding the user's `mimeapps.list`.
    pub config_home: Option<PathBuf>,
    /// `$XDG_DATA_HOME` followed by `$XDG_DATA_DIRS`, most important first.
    pub data_dirs: Vec<PathBuf>,
}

impl XdgDirs {
    pub fn new(config_home: Option<PathBuf>, data_dirs: Vec<PathBuf>) -> Self {
        Self {
            config_home,
            data_dirs,
        }
    }

    /// Read the directories from the environment.
    pub fn from_env() -> Self {
        let mut data_dirs: Vec<PathBuf> = dirs::data_dir().into_iter().collect();
        let system = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| XdgConfig::DEFAULT_DATA_DIRS.to_string());
        data_dirs.extend(
            system
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        );
        Self::new(dirs::config_dir(), data_dirs)
    }

    fn mimeapps_lists(&self) -> Vec<PathBuf> {
        let mut lists: Vec<PathBuf> = self
            .config_home
            .iter()
            .map(|dir| dir.join(XdgConfig::MIMEAPPS_LIST_FILE))
            .collect();
        lists.extend(self.data_dirs.iter().map(|dir| {
            dir.join(XdgConfig::APPLICATIONS_DIR)
                .join(XdgConfig::MIMEAPPS_LIST_FILE)
        }));
        lists
    }
}

/// MIME types whose glob is `*.<extension>`, highest weight first.
pub fn mime_types_for_extension(dirs: &XdgDirs, extension: &str) -> Vec<String> {
    let mut matches: Vec<(u32, String)> = Vec::new();
    for dir in &dirs.data_dirs {
        let Ok(content) = fs::read_to_string(dir.join(XdgConfig::MIME_GLOBS_FILE)) else {
            continue;
        };
        for (weight, mime) in parse_globs2(&content, extension) {
            if !matches.iter().any(|(_, known)| *known == mime) {
                matches.push((weight, mime));
            }
        }
    }
    // Stable sort keeps directory order for equal weights.
    matches.sort_by(|a, b| b.0.cmp(&a.0));
    matches.into_iter().map(|(_, mime)| mime).collect()
}

fn parse_globs2(content: &str, extension: &str) -> Vec<(u32, String)> {
    let mut found = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split(':');
        let (Some(weight), Some(mime), Some(glob)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let case_sensitive = fields
            .next()
            .is_some_and(|flags| flags.split(',').any(|flag| flag == "cs"));
        let Some(suffix) = glob.strip_prefix("*.") else {
            continue;
        };
        let matched = if case_sensitive {
            suffix == extension
        } else {
            suffix.eq_ignore_ascii_case(extension)
        };
        if matched {
            found.push((weight.parse().unwrap_or(50), mime.to_string()));
        }
    }
    found
}

#[derive(Debug, Default)]
struct MimeApps {
    defaults: Vec<String>,
    added: Vec<String>,
    removed: Vec<String>,
}

fn parse_mimeapps(content: &str, mime: &str) -> MimeApps {
    let mut apps = MimeApps::default();
    let mut section = String::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.to_string();
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != mime {
            continue;
        }
        let target = match section.as_str() {
            "Default Applications" => &mut apps.defaults,
            "Added Associations" => &mut apps.added,
            "Removed Associations" => &mut apps.removed,
            _ => continue,
        };
        target.extend(desktop_id_list(value));
    }
    apps
}

fn parse_mime_cache(content: &str, mime: &str) -> Vec<String> {
    let mut in_cache = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_cache = line == "[MIME Cache]";
            continue;
        }
        if !in_cache {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == mime {
                return desktop_id_list(value);
            }
        }
    }
    Vec::new()
}

fn desktop_id_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Desktop file ids registered for `mime`: defaults, then added
/// associations, then the system cache. Removed associations are dropped.
pub fn desktop_ids_for_mime(dirs: &XdgDirs, mime: &str) -> Vec<String> {
    let mut defaults = Vec::new();
    let mut added = Vec::new();
    let mut removed = HashSet::new();
    for list in dirs.mimeapps_lists() {
        let Ok(content) = fs::read_to_string(&list) else {
            continue;
        };
        let apps = parse_mimeapps(&content, mime);
        defaults.extend(apps.defaults);
        added.extend(apps.added);
        removed.extend(apps.removed);
    }

    let mut cached = Vec::new();
    for dir in &dirs.data_dirs {
        if let Ok(content) = fs::read_to_string(dir.join(XdgConfig::MIME_CACHE_FILE)) {
            cached.extend(parse_mime_cache(&content, mime));
        }
    }

    let mut seen = HashSet::new();
    defaults
        .into_iter()
        .chain(added)
        .chain(cached)
        .filter(|id| !removed.contains(id) && seen.insert(id.clone()))
        .collect()
}

/// Locate a desktop file by id. Ids with dashes may refer to subdirectories
/// (`kde-foo.desktop` for `applications/kde/foo.desktop`).
pub fn find_desktop_file(dirs: &XdgDirs, id: &str) -> Option<PathBuf> {
    for dir in &dirs.data_dirs {
        let applications = dir.join(XdgConfig::APPLICATIONS_DIR);
        let direct = applications.join(id);
        if direct.is_file() {
            return Some(direct);
        }
        if id.contains('-') {
            let nested = applications.join(id.replace('-', "/"));
            if nested.is_file() {
                return Some(nested);
            }
        }
    }
    None
}

/// The parts of a `[Desktop Entry]` group needed to list and launch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    pub path: PathBuf,
    pub name: String,
    pub exec: String,
    pub icon: Option<String>,
}

impl DesktopEntry {
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content =
            fs::read_to_string(path).map_err(|e| LauncherError::io_with_path(e, path))?;
        Ok(Self::parse(path, &content))
    }

    /// Parse a desktop file. Returns `None` for entries that cannot launch a
    /// file: hidden, not an application, or missing `Name`/`Exec`.
    pub fn parse(path: &Path, content: &str) -> Option<Self> {
        let mut in_entry = false;
        let mut name = None;
        let mut exec = None;
        let mut icon = None;
        let mut hidden = false;
        let mut is_application = true;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_entry = line == "[Desktop Entry]";
                continue;
            }
            if !in_entry {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim() {
                "Name" => name = Some(value),
                "Exec" => exec = Some(value),
                "Icon" if !value.is_empty() => icon = Some(value),
                "Hidden" => hidden = value == "true",
                "Type" => is_application = value == "Application",
                _ => {}
            }
        }

        if hidden || !is_application {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            name: name.filter(|n| !n.is_empty())?,
            exec: exec.filter(|e| !e.is_empty())?,
            icon,
        })
    }

    /// Expand `Exec` for one file. The file is appended when the command
    /// line has no file or URL field code.
    pub fn command_line(&self, file: &str) -> Result<Vec<String>> {
        let tokens = shlex::split(&self.exec).ok_or_else(|| {
            LauncherError::internal(
                "parse desktop entry Exec",
                self.path.display().to_string(),
                format!("unbalanced quoting in {:?}", self.exec),
                None,
            )
        })?;

        let uri = url::Url::from_file_path(file)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| file.to_string());
        let mut used_file = false;
        let mut args = Vec::new();

        for token in tokens {
            if token == "%i" {
                if let Some(icon) = &self.icon {
                    args.push("--icon".to_string());
                    args.push(icon.clone());
                }
                continue;
            }
            let (expanded, had_codes) = self.expand_token(&token, file, &uri, &mut used_file);
            if !expanded.is_empty() || !had_codes {
                args.push(expanded);
            }
        }
        if !used_file {
            args.push(file.to_string());
        }
        if args.first().map_or(true, |program| program.is_empty()) {
            return Err(LauncherError::internal(
                "parse desktop entry Exec",
                self.path.display().to_string(),
                "empty command line",
                None,
            ));
        }
        Ok(args)
    }

    fn expand_token(
        &self,
        token: &str,
        file: &str,
        uri: &str,
        used_file: &mut bool,
    ) -> (String, bool) {
        let mut out = String::with_capacity(token.len());
        let mut had_codes = false;
        let mut chars = token.chars();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let Some(code) = chars.next() else {
                break;
            };
            match code {
                '%' => out.push('%'),
                'f' | 'F' => {
                    out.push_str(file);
                    *used_file = true;
                }
                'u' | 'U' => {
                    out.push_str(uri);
                    *used_file = true;
                }
                'c' => out.push_str(&self.name),
                'k' => out.push_str(&self.path.to_string_lossy()),
                // Deprecated and unknown codes are removed.
                _ => {}
            }
            had_codes = true;
        }
        (out, had_codes)
    }
}

/// Launchable desktop entries registered for files with `extension`.
pub fn applications_for_extension(dirs: &XdgDirs, extension: &str) -> Vec<DesktopEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for mime in mime_types_for_extension(dirs, extension) {
        for id in desktop_ids_for_mime(dirs, &mime) {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(path) = find_desktop_file(dirs, &id) else {
                debug!("Desktop entry {} for {} not installed", id, mime);
                continue;
            };
            match DesktopEntry::load(&path) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => debug!("Skipping non-launchable entry {}", path.display()),
                Err(e) => warn!("Failed to read {}: {}", path.display(), e),
            }
        }
    }
    entries
}
