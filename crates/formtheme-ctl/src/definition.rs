//! Form definition files.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context};
use formtheme::{FormDefinition, ViewNode};

/// Parse a definition, picking the format from the file extension.
pub(crate) fn load_definition(path: &Path) -> anyhow::Result<FormDefinition> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read definition {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let definition: FormDefinition = match extension {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
        "toml" => toml::from_str(&contents)
            .with_context(|| format!("invalid TOML in {}", path.display()))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        other => bail!(
            "unsupported definition format '{other}' for {} (expected yaml, yml, toml or json)",
            path.display()
        ),
    };
    Ok(definition)
}

/// Load a definition and build its view tree.
pub(crate) fn load_view(path: &Path) -> anyhow::Result<Rc<ViewNode>> {
    let definition = load_definition(path)?;
    definition
        .create_view()
        .with_context(|| format!("invalid form definition {}", path.display()))
}
