//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rounddrop/rounddrop.toml`
//! 3. Environment variables: `ROUNDDROP_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DropPolicy;

/// Running-application probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunningConfig {
    /// Program listing running applications
    pub probe_bin: String,
    /// Arguments passed to the probe
    pub probe_args: Vec<String>,
    /// Poll interval for `running --watch`
    pub poll_interval_ms: u64,
}

impl Default for RunningConfig {
    fn default() -> Self {
        Self {
            probe_bin: "/usr/bin/lsappinfo".into(),
            probe_args: vec!["list".into()],
            poll_interval_ms: 2000,
        }
    }
}

/// Raw running config for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRunningConfig {
    pub probe_bin: Option<String>,
    pub probe_args: Option<Vec<String>>,
    pub poll_interval_ms: Option<u64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub editor: Option<String>,
    pub opener: Option<String>,
    pub drop_policy: Option<DropPolicy>,
    pub bundle_extensions: Option<Vec<String>>,
    pub running: RawRunningConfig,
}

/// Unified configuration for rounddrop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for the command document and icons (default: ~/.rounddrop)
    pub base_dir: PathBuf,
    /// Editor command (default: $EDITOR or "vim")
    pub editor: String,
    /// Program used to launch command targets
    pub opener: String,
    /// What a move onto a vanished target does with the dragged node
    pub drop_policy: DropPolicy,
    /// Launch-target extensions eligible for identity resolution
    pub bundle_extensions: Vec<String>,
    /// Running-application probe
    pub running: RunningConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Try $EDITOR, fall back to vim
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".into());

        Self {
            base_dir: dirs_default_base_dir(),
            editor,
            opener: default_opener().into(),
            drop_policy: DropPolicy::default(),
            bundle_extensions: vec!["app".into()],
            running: RunningConfig::default(),
        }
    }
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Get the default base directory (~/.rounddrop).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".rounddrop"))
        .unwrap_or_else(|| PathBuf::from("~/.rounddrop"))
}

/// Get the XDG config directory for rounddrop.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rounddrop").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rounddrop.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand environment variables and `~` in a path-like string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Path of the persisted command document.
    pub fn document_path(&self) -> PathBuf {
        self.base_dir.join("commands.toml")
    }

    /// Directory holding extracted icons.
    pub fn images_dir(&self) -> PathBuf {
        self.base_dir.join("images")
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.base_dir.to_string_lossy().as_ref());
        self.base_dir = PathBuf::from(expanded);

        self.editor = expand_env_vars(&self.editor);
        self.running.probe_bin = expand_env_vars(&self.running.probe_bin);
    }

    /// Apply a config file onto self: specified values replace, unspecified keep.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            base_dir: global
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            editor: global.editor.clone().unwrap_or_else(|| self.editor.clone()),
            opener: global.opener.clone().unwrap_or_else(|| self.opener.clone()),
            drop_policy: global.drop_policy.unwrap_or(self.drop_policy),
            bundle_extensions: global
                .bundle_extensions
                .clone()
                .unwrap_or_else(|| self.bundle_extensions.clone()),
            running: RunningConfig {
                probe_bin: global
                    .running
                    .probe_bin
                    .clone()
                    .unwrap_or_else(|| self.running.probe_bin.clone()),
                probe_args: global
                    .running
                    .probe_args
                    .clone()
                    .unwrap_or_else(|| self.running.probe_args.clone()),
                poll_interval_ms: global
                    .running
                    .poll_interval_ms
                    .unwrap_or(self.running.poll_interval_ms),
            },
        }
    }

    /// Load settings with layered precedence from the global config location.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `config_file` as the global layer.
    ///
    /// A missing file is not an error; the defaults stand in for it.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.apply_global(&raw);
            }
        }

        // 3. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        // Expand ~ and $VAR in path-like fields
        current.expand_paths();

        Ok(current)
    }

    /// Apply ROUNDDROP_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("ROUNDDROP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("bundle_extensions")
                .with_list_parse_key("running.probe_args")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("editor") {
            settings.editor = val;
        }
        if let Ok(val) = config.get_string("opener") {
            settings.opener = val;
        }
        if let Ok(val) = config.get_string("drop_policy") {
            settings.drop_policy = parse_drop_policy(&val)?;
        }
        if let Ok(val) = config.get::<Vec<String>>("bundle_extensions") {
            settings.bundle_extensions = val;
        }
        if let Ok(val) = config.get_string("running.probe_bin") {
            settings.running.probe_bin = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("running.probe_args") {
            settings.running.probe_args = val;
        }
        if let Ok(val) = config.get::<u64>("running.poll_interval_ms") {
            settings.running.poll_interval_ms = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rounddrop configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rounddrop/rounddrop.toml
#   Env:    ROUNDDROP_* environment variables (nested keys use "__",
#           e.g. ROUNDDROP_RUNNING__POLL_INTERVAL_MS=500)

# Base directory (command document: base_dir/commands.toml, icons: base_dir/images)
# base_dir = "~/.rounddrop"

# Editor for editing this file
# editor = "vim"

# Program used to launch commands ("open" on macOS, "xdg-open" on Linux)
# opener = "open"

# Dropping onto a command that no longer exists:
#   "discard" drops the moved command, "restore" puts it back where it was
# drop_policy = "discard"

# Launch-target extensions whose bundle identifier is resolved
# bundle_extensions = ["app"]

[running]
# Program listing running applications and its arguments
# probe_bin = "/usr/bin/lsappinfo"
# probe_args = ["list"]

# Poll interval for `rounddrop running --watch`
# poll_interval_ms = 2000
"#
        .to_string()
    }
}

fn parse_drop_policy(value: &str) -> Result<DropPolicy, ApplicationError> {
    match value.trim().to_lowercase().as_str() {
        "discard" => Ok(DropPolicy::Discard),
        "restore" => Ok(DropPolicy::Restore),
        other => Err(ApplicationError::Config {
            message: format!("invalid drop_policy '{other}' (expected discard|restore)"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
