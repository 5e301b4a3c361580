//! Load theme sources by identifier.
//!
//! Loaders map an identifier such as `form_table_layout` to a parsed
//! [`ThemeSource`]. The built-in layouts ship inside the crate; application
//! themes are read from `<dir>/<id>.toml` in an ordered list of directories.

use std::fmt;
use std::path::{Path, PathBuf};

use super::source::ThemeSource;

const THEME_EXTENSION: &str = "toml";

const FORM_DIV_LAYOUT: &str = include_str!("../../themes/form_div_layout.toml");
const FORM_TABLE_LAYOUT: &str = include_str!("../../themes/form_table_layout.toml");

/// Resolves theme identifiers to theme sources.
pub trait ThemeLoader: fmt::Debug {
    /// Load the theme named `id`. Return [`LoadError::NotFound`] when this
    /// loader does not know it, so chained loaders can keep looking.
    fn load(&self, id: &str) -> Result<ThemeSource, LoadError>;
}

/// The layouts bundled with the crate: `form_div_layout` and
/// `form_table_layout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinThemes;

impl BuiltinThemes {
    pub const IDS: [&'static str; 2] = ["form_div_layout", "form_table_layout"];
}

impl ThemeLoader for BuiltinThemes {
    fn load(&self, id: &str) -> Result<ThemeSource, LoadError> {
        let contents = match id {
            "form_div_layout" => FORM_DIV_LAYOUT,
            "form_table_layout" => FORM_TABLE_LAYOUT,
            _ => return Err(LoadError::NotFound { id: id.to_string() }),
        };
        parse(id, contents, PathBuf::from(format!("<builtin>/{id}.toml")))
    }
}

/// Reads `<dir>/<id>.toml` from the first directory that has it.
#[derive(Debug, Clone, Default)]
pub struct FilesystemLoader {
    paths: Vec<PathBuf>,
}

impl FilesystemLoader {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Directories searched, in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Theme ids present in the search directories, deduplicated and sorted.
    /// Missing directories are skipped.
    pub fn available(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .paths
            .iter()
            .filter_map(|dir| std::fs::read_dir(dir).ok())
            .flatten()
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == THEME_EXTENSION)
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    fn find(&self, id: &str) -> Option<PathBuf> {
        self.paths
            .iter()
            .map(|dir| dir.join(format!("{id}.{THEME_EXTENSION}")))
            .find(|candidate| candidate.is_file())
    }
}

impl ThemeLoader for FilesystemLoader {
    fn load(&self, id: &str) -> Result<ThemeSource, LoadError> {
        if !is_valid_id(id) {
            return Err(LoadError::NotFound { id: id.to_string() });
        }
        let path = self
            .find(id)
            .ok_or_else(|| LoadError::NotFound { id: id.to_string() })?;
        let contents = std::fs::read_to_string(&path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(id, ?path, "Loaded theme from disk");
        parse(id, &contents, path)
    }
}

/// Tries each loader in order; the first one that knows the id wins.
#[derive(Debug, Default)]
pub struct ChainLoader {
    loaders: Vec<Box<dyn ThemeLoader>>,
}

impl ChainLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loader with lower priority than the ones already added.
    pub fn with(mut self, loader: impl ThemeLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }
}

impl ThemeLoader for ChainLoader {
    fn load(&self, id: &str) -> Result<ThemeSource, LoadError> {
        for loader in &self.loaders {
            match loader.load(id) {
                Err(LoadError::NotFound { .. }) => continue,
                other => return other,
            }
        }
        Err(LoadError::NotFound { id: id.to_string() })
    }
}

/// Identifiers are plain file stems: no separators, no parent references.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && Path::new(id).components().count() == 1
}

fn parse(id: &str, contents: &str, path: PathBuf) -> Result<ThemeSource, LoadError> {
    let mut source =
        ThemeSource::from_toml_str(contents).map_err(|e| LoadError::Parse { path, source: e })?;
    source.name = id.to_string();
    Ok(source)
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("theme not found: {id}")]
    NotFound { id: String },
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
    #[error("invalid block '{block}' in theme '{theme}': {reason}")]
    InvalidBlock {
        theme: String,
        block: String,
        reason: String,
    },
    #[error("theme '{theme}' extends itself (chain: {chain})")]
    CyclicExtends { theme: String, chain: String },
    #[error("failed to compile block '{block}' of theme '{theme}': {source}")]
    Compile {
        theme: String,
        block: String,
        source: tera::Error,
    },
}
