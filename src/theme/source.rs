//! Theme source files (`<id>.toml`).
//!
//! A theme is a set of named blocks. A block either carries a Tera
//! `template` (optionally preceded by `parts`, sub-renderings exposed to the
//! template as `parts.<name>`) or `delegate`s to another block with extra
//! variables:
//!
//! ```toml
//! name = "form_table_layout"
//! extends = "form_div_layout"
//!
//! [blocks.form_row]
//! template = '<tr><td>{{ parts.label | safe }}</td><td>{{ parts.widget | safe }}</td></tr>'
//! parts = [
//!     { name = "label", search = "label" },
//!     { name = "widget", search = "widget" },
//! ]
//!
//! [blocks.email_widget]
//! delegate = "form_widget_simple"
//! vars = { type = "email" }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::view::Vars;

/// A parsed theme source.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSource {
    /// Theme identifier. Loaders overwrite it with the id they were asked for.
    #[serde(default)]
    pub name: String,

    /// Human-readable description.
    pub description: Option<String>,

    /// Parent theme whose blocks are inherited unless shadowed here.
    pub extends: Option<String>,

    /// Blocks defined by this theme.
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockDef>,
}

/// A block definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct BlockDef {
    pub body: BlockBody,
    pub parts: Vec<PartSpec>,
}

/// What a block renders.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBody {
    /// Tera template source.
    Template(String),
    /// Render another block with these variables layered over the call's.
    Delegate { block: String, vars: Vars },
}

/// A sub-rendering evaluated before the block template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPart")]
pub struct PartSpec {
    /// Key under `parts` in the template context.
    pub name: String,
    pub kind: PartKind,
    /// Only render when this variable is truthy.
    pub when: Option<String>,
    /// Only render when this variable is falsy or missing.
    pub unless: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartKind {
    /// Search-and-render a base block (`widget`, `label`...) on the same node.
    Search(String),
    /// Render a named block on the same node.
    Block(String),
    /// For each child, the concatenation of these searched base blocks.
    Children(Vec<String>),
}

impl BlockDef {
    /// Template source, when the block is not a delegate.
    pub fn template(&self) -> Option<&str> {
        match &self.body {
            BlockBody::Template(source) => Some(source),
            BlockBody::Delegate { .. } => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBlock {
    template: Option<String>,
    delegate: Option<String>,
    #[serde(default)]
    vars: Vars,
    #[serde(default)]
    parts: Vec<PartSpec>,
}

impl TryFrom<RawBlock> for BlockDef {
    type Error = String;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let body = match (raw.template, raw.delegate) {
            (Some(template), None) => {
                if !raw.vars.is_empty() {
                    return Err("`vars` only applies to delegate blocks".to_string());
                }
                BlockBody::Template(template)
            }
            (None, Some(block)) => {
                if !raw.parts.is_empty() {
                    return Err("delegate blocks cannot declare parts".to_string());
                }
                BlockBody::Delegate {
                    block,
                    vars: raw.vars,
                }
            }
            (Some(_), Some(_)) => {
                return Err("a block has either `template` or `delegate`, not both".to_string())
            }
            (None, None) => return Err("a block needs `template` or `delegate`".to_string()),
        };

        let mut seen = std::collections::HashSet::new();
        for part in &raw.parts {
            if !seen.insert(part.name.as_str()) {
                return Err(format!("duplicate part '{}'", part.name));
            }
        }

        Ok(Self {
            body,
            parts: raw.parts,
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPart {
    name: String,
    search: Option<String>,
    block: Option<String>,
    children: Option<Vec<String>>,
    when: Option<String>,
    unless: Option<String>,
}

impl TryFrom<RawPart> for PartSpec {
    type Error = String;

    fn try_from(raw: RawPart) -> Result<Self, Self::Error> {
        let kind = match (raw.search, raw.block, raw.children) {
            (Some(base), None, None) => PartKind::Search(base),
            (None, Some(block), None) => PartKind::Block(block),
            (None, None, Some(bases)) if !bases.is_empty() => PartKind::Children(bases),
            (None, None, Some(_)) => {
                return Err(format!("part '{}' lists no child blocks", raw.name))
            }
            _ => {
                return Err(format!(
                    "part '{}' needs exactly one of `search`, `block` or `children`",
                    raw.name
                ))
            }
        };
        Ok(Self {
            name: raw.name,
            kind,
            when: raw.when,
            unless: raw.unless,
        })
    }
}

impl ThemeSource {
    /// Parse a theme from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
