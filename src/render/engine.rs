//! Block rendering on top of the theme resolver and Tera.

use std::sync::Arc;

use serde_json::{json, Value};
use tera::Context;

use super::escape::escape_html;
use super::filters;
use crate::config::RendererConfig;
use crate::theme::{
    BlockBody, BuiltinThemes, ChainLoader, FilesystemLoader, LoadError, PartKind, PartSpec,
    ResolvedBlock, ThemeRegistry, ThemeResolver,
};
use crate::translation::Translator;
use crate::view::{is_truthy, Vars, ViewNode};

/// Base blocks that render at most once per node.
const RENDER_ONCE: [&str; 2] = ["row", "widget"];

/// Variables every block can rely on, overridden by node and call vars.
fn default_scope() -> Vars {
    let defaults = json!({
        "attr": {},
        "attr_translation_parameters": {},
        "label": null,
        "label_attr": {},
        "label_format": null,
        "label_translation_parameters": {},
        "help": null,
        "help_attr": {},
        "help_html": false,
        "help_translation_parameters": {},
        "translation_domain": null,
        "errors": [],
        "name": "",
        "id": "",
        "full_name": "",
        "value": "",
        "checked": false,
        "disabled": false,
        "required": false,
        "compound": false,
        "root": false,
        "choices": [],
        "expanded": false,
        "multiple": false,
        "placeholder": null,
        "choice_translation_domain": null,
        "method": "POST",
        "action": "",
        "multipart": false,
        "render_rest": true,
    });
    match defaults {
        Value::Object(map) => map,
        _ => Vars::new(),
    }
}

/// Renders blocks for view nodes.
///
/// Every call resolves its block through the [`ThemeResolver`]; nothing is
/// cached between calls. The only state changed while rendering lives on
/// the nodes themselves (the rendered flag).
#[derive(Debug)]
pub struct FormRenderer {
    resolver: ThemeResolver,
    defaults: Vars,
    max_depth: usize,
}

impl FormRenderer {
    /// Build a renderer over an already loaded registry.
    pub fn new(
        mut registry: ThemeRegistry,
        config: &RendererConfig,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let tera = registry.tera_mut();
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(escape_html);
        filters::register(tera, translator);

        Self {
            resolver: ThemeResolver::new(registry, config.default_themes.clone()),
            defaults: default_scope(),
            max_depth: config.max_depth,
        }
    }

    /// Build a renderer with the built-in themes, every theme found in the
    /// configured theme directories, and the configured defaults.
    pub fn from_config(
        config: &RendererConfig,
        translator: Arc<dyn Translator>,
    ) -> Result<Self, LoadError> {
        let disk = FilesystemLoader::new(config.theme_dirs());
        let discovered = disk.available();
        let loader = ChainLoader::new().with(disk).with(BuiltinThemes);

        let mut registry = ThemeRegistry::new();
        registry.load_all(&loader, BuiltinThemes::IDS)?;
        registry.load_all(&loader, &discovered)?;
        registry.load_all(&loader, &config.default_themes)?;
        tracing::debug!(
            themes = registry.len(),
            defaults = ?config.default_themes,
            "Theme registry ready"
        );

        Ok(Self::new(registry, config, translator))
    }

    pub fn resolver(&self) -> &ThemeResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &ThemeRegistry {
        self.resolver.registry()
    }

    /// Attach themes to a node. See [`ThemeResolver::set_theme`].
    pub fn set_theme<I, S>(&self, node: &ViewNode, themes: I, use_default_themes: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolver.set_theme(node, themes, use_default_themes);
    }

    /// Find the theme that owns `block` for `node`.
    pub fn resolve_block(&self, node: &ViewNode, block: &str) -> Option<ResolvedBlock<'_>> {
        self.resolver.resolve_block(node, block)
    }

    /// Render the block named `block` for `node`.
    ///
    /// A block no theme defines renders as an empty string.
    pub fn render_block(
        &self,
        node: &ViewNode,
        block: &str,
        vars: &Vars,
    ) -> Result<String, RenderError> {
        self.render_named(node, block, vars, 0)
    }

    /// Render the most specific `<prefix>_<base>` block for `node`, walking
    /// its block prefixes from the per-field prefix down to the root type.
    ///
    /// `row` and `widget` render once per node; later calls return an empty
    /// string.
    pub fn search_and_render_block(
        &self,
        node: &ViewNode,
        base: &str,
        vars: &Vars,
    ) -> Result<String, RenderError> {
        self.search_at(node, base, vars, 0)
    }

    fn check_depth(&self, block: &str, depth: usize) -> Result<(), RenderError> {
        if depth > self.max_depth {
            return Err(RenderError::RecursionLimit {
                block: block.to_string(),
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn render_named(
        &self,
        node: &ViewNode,
        block: &str,
        vars: &Vars,
        depth: usize,
    ) -> Result<String, RenderError> {
        self.check_depth(block, depth)?;
        match self.resolver.resolve_block(node, block) {
            Some(resolved) => self.render_resolved(node, &resolved, vars, depth),
            None => {
                tracing::warn!(node = node.name(), block, "No theme defines block");
                Ok(String::new())
            }
        }
    }

    fn search_at(
        &self,
        node: &ViewNode,
        base: &str,
        vars: &Vars,
        depth: usize,
    ) -> Result<String, RenderError> {
        let once = RENDER_ONCE.contains(&base);
        if once && node.is_rendered() {
            tracing::trace!(node = node.name(), base, "Already rendered");
            return Ok(String::new());
        }

        for prefix in node.block_prefixes().iter().rev() {
            let block = format!("{prefix}_{base}");
            if let Some(resolved) = self.resolver.resolve_block(node, &block) {
                self.check_depth(&block, depth)?;
                let html = self.render_resolved(node, &resolved, vars, depth)?;
                if once {
                    node.set_rendered();
                }
                return Ok(html);
            }
        }

        tracing::warn!(
            node = node.name(),
            base,
            prefixes = ?node.block_prefixes(),
            "No block found for any prefix"
        );
        Ok(String::new())
    }

    fn render_resolved(
        &self,
        node: &ViewNode,
        resolved: &ResolvedBlock<'_>,
        vars: &Vars,
        depth: usize,
    ) -> Result<String, RenderError> {
        tracing::debug!(
            node = node.name(),
            block = %resolved.name,
            theme = %resolved.theme,
            depth,
            "Rendering block"
        );
        match &resolved.def.body {
            BlockBody::Delegate {
                block,
                vars: extra,
            } => {
                let mut merged = vars.clone();
                merged.extend(extra.clone());
                self.render_named(node, block, &merged, depth + 1)
            }
            BlockBody::Template(_) => {
                let mut scope = self.scope(node, vars);
                let parts = self.render_parts(node, &resolved.def.parts, &scope, vars, depth)?;
                scope.insert("parts".to_string(), Value::Object(parts));

                let template = resolved.template_name();
                let template_error = |source: tera::Error| RenderError::Template {
                    theme: resolved.source.to_string(),
                    block: resolved.name.clone(),
                    source,
                };
                let context = Context::from_serialize(&scope).map_err(template_error)?;
                self.resolver
                    .registry()
                    .tera()
                    .render(&template, &context)
                    .map_err(template_error)
            }
        }
    }

    /// Defaults, then node vars, then call vars.
    fn scope(&self, node: &ViewNode, vars: &Vars) -> Vars {
        let mut scope = self.defaults.clone();
        scope.extend(node.vars().clone());
        scope.extend(vars.clone());
        scope
    }

    fn render_parts(
        &self,
        node: &ViewNode,
        parts: &[PartSpec],
        scope: &Vars,
        vars: &Vars,
        depth: usize,
    ) -> Result<Vars, RenderError> {
        let mut rendered = Vars::new();
        for part in parts {
            let active = part
                .when
                .as_deref()
                .map_or(true, |key| is_truthy(scope.get(key)))
                && part
                    .unless
                    .as_deref()
                    .map_or(true, |key| !is_truthy(scope.get(key)));

            let value = match &part.kind {
                PartKind::Children(_) if !active => Value::Array(Vec::new()),
                _ if !active => Value::String(String::new()),
                PartKind::Search(base) => Value::String(self.search_at(node, base, vars, depth + 1)?),
                PartKind::Block(block) => {
                    Value::String(self.render_named(node, block, vars, depth + 1)?)
                }
                PartKind::Children(bases) => {
                    let child_vars = Vars::new();
                    let mut items = Vec::with_capacity(node.children().len());
                    for child in node.children() {
                        let mut html = String::new();
                        for base in bases {
                            html.push_str(&self.search_at(child, base, &child_vars, depth + 1)?);
                        }
                        items.push(Value::String(html));
                    }
                    Value::Array(items)
                }
            };
            rendered.insert(part.name.clone(), value);
        }
        Ok(rendered)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to render block '{block}' of theme '{theme}': {source}")]
    Template {
        theme: String,
        block: String,
        source: tera::Error,
    },
    #[error("block '{block}' exceeds the maximum render depth of {limit}")]
    RecursionLimit { block: String, limit: usize },
}
