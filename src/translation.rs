//! Message translation behind a small trait seam.
//!
//! The renderer never owns a localisation backend. It hands every
//! translatable string to a [`Translator`] together with its `%placeholder%`
//! parameters and falls back to the substituted message when the lookup
//! fails. Parameters are applied exactly once: either by the translator on
//! the translated text, or by the fallback on the original message.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Domain used when a translation call does not name one.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Placeholder substitutions, keyed by the literal token (e.g. `%company%`).
pub type Parameters = BTreeMap<String, String>;

/// Translates message identifiers into localised text.
pub trait Translator: Send + Sync + fmt::Debug {
    /// Translate `id` in `domain` (the default domain when `None`), applying
    /// `parameters` to the result.
    fn trans(
        &self,
        id: &str,
        parameters: &Parameters,
        domain: Option<&str>,
    ) -> Result<String, TranslationError>;
}

/// Replace every parameter key found in `message` with its value.
///
/// Works left to right in a single pass and prefers the longest key at each
/// position. Inserted values are never scanned again, so a value that itself
/// looks like a placeholder stays literal.
pub fn substitute(message: &str, parameters: &Parameters) -> String {
    if parameters.is_empty() {
        return message.to_string();
    }

    let mut keys: Vec<(&str, &str)> = parameters
        .iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    'scan: while !rest.is_empty() {
        for (key, value) in &keys {
            if let Some(tail) = rest.strip_prefix(key) {
                out.push_str(value);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }
    out
}

/// Translate through `translator`, degrading to the substituted message.
pub fn translate_or_fallback(
    translator: &dyn Translator,
    message: &str,
    parameters: &Parameters,
    domain: Option<&str>,
) -> String {
    match translator.trans(message, parameters, domain) {
        Ok(translated) => translated,
        Err(e) => {
            tracing::debug!(message, error = %e, "Translation failed, using message as-is");
            substitute(message, parameters)
        }
    }
}

/// Translator that wraps every message in `[trans]...[/trans]`.
///
/// Handy in tests: the markers prove a string went through translation
/// without needing a catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubTranslator;

impl Translator for StubTranslator {
    fn trans(
        &self,
        id: &str,
        parameters: &Parameters,
        _domain: Option<&str>,
    ) -> Result<String, TranslationError> {
        Ok(format!("[trans]{}[/trans]", substitute(id, parameters)))
    }
}

/// Translator backed by in-memory catalogues, one per domain.
///
/// Catalogue files are TOML with one table per domain:
///
/// ```toml
/// [messages]
/// "Submit to %company%" = "Envoyer à %company%"
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl CatalogTranslator {
    /// Create an empty translator. Every lookup misses until messages are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a single message in `domain`.
    pub fn insert(
        &mut self,
        domain: impl Into<String>,
        id: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.catalogs
            .entry(domain.into())
            .or_default()
            .insert(id.into(), translation.into());
    }

    /// Parse catalogues from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, TranslationError> {
        let parsed: BTreeMap<String, BTreeMap<String, String>> =
            toml::from_str(contents).map_err(|e| TranslationError::Parse {
                path: None,
                source: e,
            })?;
        let mut translator = Self::new();
        for (domain, messages) in parsed {
            for (id, translation) in messages {
                translator.insert(domain.clone(), id, translation);
            }
        }
        Ok(translator)
    }

    /// Load catalogues from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TranslationError> {
        let contents = std::fs::read_to_string(path).map_err(|e| TranslationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            TranslationError::Parse { source, .. } => TranslationError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Number of messages across all domains.
    pub fn len(&self) -> usize {
        self.catalogs.values().map(HashMap::len).sum()
    }

    /// Whether no messages are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Translator for CatalogTranslator {
    fn trans(
        &self,
        id: &str,
        parameters: &Parameters,
        domain: Option<&str>,
    ) -> Result<String, TranslationError> {
        let domain = domain.unwrap_or(DEFAULT_DOMAIN);
        let missing = || TranslationError::Missing {
            id: id.to_string(),
            domain: domain.to_string(),
        };
        let catalog = self.catalogs.get(domain).ok_or_else(missing)?;

        if let Some(translation) = catalog.get(id) {
            return Ok(substitute(translation, parameters));
        }
        // Catalogues may also be keyed by the already substituted message.
        let substituted = substitute(id, parameters);
        catalog.get(&substituted).cloned().ok_or_else(missing)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("no translation for '{id}' in domain '{domain}'")]
    Missing { id: String, domain: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse translation catalogue{}: {source}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}
