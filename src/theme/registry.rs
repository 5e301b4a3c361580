//! Compiled theme sources.
//!
//! Every template block is compiled into a shared Tera instance under the
//! name `<theme>/<block>.html`, so escaping rules keyed on the `.html`
//! suffix apply to all of them.

use std::collections::BTreeMap;

use tera::Tera;

use super::loader::{LoadError, ThemeLoader};
use super::source::{BlockBody, BlockDef, ThemeSource};

/// Tera template name of a block owned by `theme`.
pub(crate) fn template_name(theme: &str, block: &str) -> String {
    format!("{theme}/{block}.html")
}

/// Loaded and compiled themes, keyed by identifier.
#[derive(Debug, Default)]
pub struct ThemeRegistry {
    tera: Tera,
    sources: BTreeMap<String, ThemeSource>,
}

impl ThemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `id` and, before it, every theme along its `extends` chain.
    /// Themes that are already registered are not loaded again.
    pub fn load(&mut self, loader: &dyn ThemeLoader, id: &str) -> Result<(), LoadError> {
        let mut pending = Vec::new();
        let mut next = Some(id.to_string());
        while let Some(current) = next.take() {
            if self.sources.contains_key(&current) {
                break;
            }
            if let Some(pos) = pending.iter().position(|s: &ThemeSource| s.name == current) {
                let mut chain: Vec<&str> = pending[pos..].iter().map(|s| s.name.as_str()).collect();
                chain.push(&current);
                return Err(LoadError::CyclicExtends {
                    theme: current.clone(),
                    chain: chain.join(" -> "),
                });
            }
            let source = loader.load(&current)?;
            next = source.extends.clone();
            pending.push(source);
        }

        // Parents first so every source is added on top of what it extends.
        for source in pending.into_iter().rev() {
            self.add_source(source)?;
        }
        Ok(())
    }

    /// Load every id in order.
    pub fn load_all<I, S>(&mut self, loader: &dyn ThemeLoader, ids: I) -> Result<(), LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.load(loader, id.as_ref())?;
        }
        Ok(())
    }

    /// Register an already parsed source, replacing any theme with the same
    /// name, and compile its template blocks.
    pub fn add_source(&mut self, source: ThemeSource) -> Result<(), LoadError> {
        if source.name.is_empty() {
            return Err(LoadError::InvalidBlock {
                theme: String::new(),
                block: String::new(),
                reason: "theme has no name".to_string(),
            });
        }
        self.check_extends(&source)?;

        for (block, def) in &source.blocks {
            if let BlockBody::Delegate { block: target, .. } = &def.body {
                if target == block {
                    return Err(LoadError::InvalidBlock {
                        theme: source.name.clone(),
                        block: block.clone(),
                        reason: "block delegates to itself".to_string(),
                    });
                }
            }
        }

        let templates: Vec<(String, &str)> = source
            .blocks
            .iter()
            .filter_map(|(block, def)| {
                def.template()
                    .map(|body| (template_name(&source.name, block), body))
            })
            .collect();
        // Compile each block on its own first so the error names the block.
        for (name, body) in &templates {
            Tera::default()
                .add_raw_template(name, body)
                .map_err(|e| LoadError::Compile {
                    theme: source.name.clone(),
                    block: block_of(name).to_string(),
                    source: e,
                })?;
        }
        self.tera
            .add_raw_templates(templates)
            .map_err(|e| LoadError::Compile {
                theme: source.name.clone(),
                block: String::new(),
                source: e,
            })?;

        tracing::debug!(
            theme = %source.name,
            extends = ?source.extends,
            blocks = source.blocks.len(),
            "Registered theme"
        );
        self.sources.insert(source.name.clone(), source);
        Ok(())
    }

    /// Reject a source whose `extends` chain leads back to itself.
    fn check_extends(&self, source: &ThemeSource) -> Result<(), LoadError> {
        let mut chain = vec![source.name.as_str()];
        let mut parent = source.extends.as_deref();
        while let Some(name) = parent {
            let seen = chain.contains(&name);
            chain.push(name);
            if seen {
                return Err(LoadError::CyclicExtends {
                    theme: source.name.clone(),
                    chain: chain.join(" -> "),
                });
            }
            parent = self.sources.get(name).and_then(|s| s.extends.as_deref());
        }
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    pub fn source(&self, id: &str) -> Option<&ThemeSource> {
        self.sources.get(id)
    }

    /// Registered theme ids, sorted.
    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Look `block` up in `theme` and then along its `extends` chain.
    ///
    /// Returns the source that defines the block together with the
    /// definition. Parents that are not registered end the walk.
    pub fn find_block(&self, theme: &str, block: &str) -> Option<(&ThemeSource, &BlockDef)> {
        self.extends_chain(theme)
            .into_iter()
            .find_map(|source| source.blocks.get(block).map(|def| (source, def)))
    }

    /// `theme` followed by its registered ancestors, nearest first.
    pub fn extends_chain(&self, theme: &str) -> Vec<&ThemeSource> {
        let mut chain: Vec<&ThemeSource> = Vec::new();
        let mut next = Some(theme);
        while let Some(name) = next {
            let Some(source) = self.sources.get(name) else {
                if name != theme {
                    tracing::debug!(theme, parent = name, "Parent theme is not registered");
                }
                break;
            };
            if chain.iter().any(|s| s.name == source.name) {
                break;
            }
            chain.push(source);
            next = source.extends.as_deref();
        }
        chain
    }

    /// Every block visible through `theme`, with the theme that owns it.
    pub fn visible_blocks(&self, theme: &str) -> BTreeMap<&str, &str> {
        let mut blocks = BTreeMap::new();
        for source in self.extends_chain(theme) {
            for name in source.blocks.keys() {
                blocks.entry(name.as_str()).or_insert(source.name.as_str());
            }
        }
        blocks
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }
}

fn block_of(template: &str) -> &str {
    template
        .rsplit_once('/')
        .map_or(template, |(_, block)| block)
        .trim_end_matches(".html")
}
