//! Renderer configuration and `.formtheme.toml` discovery.
//!
//! Checks two locations in precedence order:
//! 1. `./.formtheme.toml` (project-local)
//! 2. `~/.config/formtheme.toml` (user-global)

use std::path::{Path, PathBuf};

use serde::Deserialize;

const CONFIG_FILENAME: &str = ".formtheme.toml";
const GLOBAL_CONFIG_DIR: &str = ".config";
const GLOBAL_CONFIG_FILENAME: &str = "formtheme.toml";

fn default_themes() -> Vec<String> {
    vec!["form_div_layout".to_string()]
}

fn default_max_depth() -> usize {
    64
}

/// Settings shared by every render pass.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RendererConfig {
    /// Themes consulted after the ones set on a node, later entries first.
    /// Default: `["form_div_layout"]`.
    #[serde(default = "default_themes")]
    pub default_themes: Vec<String>,

    /// Directories holding `<id>.toml` theme files, searched in order.
    #[serde(default)]
    pub theme_paths: Vec<String>,

    /// Maximum nesting of block renders (delegates and parts). Default: 64.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default_themes: default_themes(),
            theme_paths: Vec::new(),
            max_depth: default_max_depth(),
        }
    }
}

impl RendererConfig {
    /// Read a config file, failing on unreadable or malformed files.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Theme directories with `~` expanded.
    pub fn theme_dirs(&self) -> Vec<PathBuf> {
        self.theme_paths.iter().map(|p| expand_path(p)).collect()
    }
}

/// Load the renderer config from the first discovered location, or return
/// defaults.
pub fn load_config() -> RendererConfig {
    if let Some(path) = find_config_file() {
        match RendererConfig::from_path(&path) {
            Ok(config) => {
                tracing::debug!(?path, "Loaded renderer config");
                return config;
            }
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to load renderer config, using defaults");
            }
        }
    }
    RendererConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }

    if let Some(home) = home_dir() {
        let global = home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME);
        if global.is_file() {
            return Some(global);
        }
    }

    None
}

/// Expand a configured path, resolving `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
