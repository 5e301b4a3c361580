//! Themes and block resolution.
//!
//! A theme is a [`ThemeSource`] of named blocks. Sources are loaded through a
//! [`ThemeLoader`], compiled into a [`ThemeRegistry`], and searched by the
//! [`ThemeResolver`] whenever a block is rendered for a view node.

mod loader;
mod registry;
mod source;

pub use loader::{BuiltinThemes, ChainLoader, FilesystemLoader, LoadError, ThemeLoader};
pub use registry::ThemeRegistry;
pub use source::{BlockBody, BlockDef, PartKind, PartSpec, ThemeSource};

pub(crate) use registry::template_name;

use crate::view::{ThemeAssignment, ViewNode};

/// A block found by the resolver.
#[derive(Debug, Clone)]
pub struct ResolvedBlock<'a> {
    /// Theme from the candidate list that matched.
    pub theme: String,
    /// Theme source that defines the block; differs from `theme` when the
    /// block is inherited through `extends`.
    pub source: &'a str,
    /// Block name.
    pub name: String,
    pub def: &'a BlockDef,
}

impl ResolvedBlock<'_> {
    /// Name of the compiled Tera template for a template block.
    pub fn template_name(&self) -> String {
        template_name(self.source, &self.name)
    }
}

/// Decides which theme owns a block for a given node.
#[derive(Debug)]
pub struct ThemeResolver {
    registry: ThemeRegistry,
    default_themes: Vec<String>,
}

impl ThemeResolver {
    pub fn new(registry: ThemeRegistry, default_themes: Vec<String>) -> Self {
        for theme in &default_themes {
            if !registry.contains(theme) {
                tracing::warn!(theme = %theme, "Default theme is not registered");
            }
        }
        Self {
            registry,
            default_themes,
        }
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ThemeRegistry {
        &mut self.registry
    }

    /// Process-wide default themes in registration order.
    pub fn default_themes(&self) -> &[String] {
        &self.default_themes
    }

    /// Attach themes to `node` and, unless they set their own, its
    /// descendants. Later entries take precedence over earlier ones.
    ///
    /// An empty list keeps the default themes regardless of
    /// `use_default_themes`.
    pub fn set_theme<I, S>(&self, node: &ViewNode, themes: I, use_default_themes: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let themes: Vec<String> = themes.into_iter().map(Into::into).collect();
        let use_default_themes = if themes.is_empty() {
            if !use_default_themes {
                tracing::debug!(node = node.name(), "Empty theme list, keeping default themes");
            }
            true
        } else {
            use_default_themes
        };
        for theme in &themes {
            if !self.registry.contains(theme) {
                tracing::warn!(node = node.name(), theme = %theme, "Theme is not registered and will be skipped");
            }
        }
        node.assign_theme(ThemeAssignment {
            themes,
            use_default_themes,
        });
    }

    /// Themes consulted for `node`, highest priority first.
    ///
    /// The node's own themes come first, then each ancestor's (nearest
    /// first), then the defaults unless the nearest assignment turned them
    /// off. Each list is read last entry first; duplicates keep their
    /// highest-priority position.
    pub fn candidate_themes(&self, node: &ViewNode) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        let mut use_defaults: Option<bool> = None;

        let mut visit = |node: &ViewNode| {
            if let Some(assignment) = node.theme().as_ref() {
                order.extend(assignment.themes.iter().rev().cloned());
                use_defaults.get_or_insert(assignment.use_default_themes);
            }
        };
        visit(node);
        let mut ancestor = node.parent();
        while let Some(current) = ancestor {
            visit(&current);
            ancestor = current.parent();
        }

        if use_defaults.unwrap_or(true) {
            order.extend(self.default_themes.iter().rev().cloned());
        }

        let mut seen = std::collections::HashSet::new();
        order.retain(|theme| seen.insert(theme.clone()));
        order
    }

    /// Find the theme that owns `block` for `node`.
    pub fn resolve_block(&self, node: &ViewNode, block: &str) -> Option<ResolvedBlock<'_>> {
        for theme in self.candidate_themes(node) {
            if !self.registry.contains(&theme) {
                tracing::debug!(theme = %theme, block, "Skipping unregistered theme");
                continue;
            }
            if let Some((source, def)) = self.registry.find_block(&theme, block) {
                tracing::trace!(theme = %theme, source = %source.name, block, "Resolved block");
                return Some(ResolvedBlock {
                    theme,
                    source: &source.name,
                    name: block.to_string(),
                    def,
                });
            }
        }
        None
    }
}
