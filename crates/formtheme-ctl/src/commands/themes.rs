//! `themes`: list, show and check theme sources.

use std::sync::Arc;

use anyhow::Context;
use formtheme::{
    BuiltinThemes, ChainLoader, FilesystemLoader, FormRenderer, RendererConfig, StubTranslator,
    ThemeRegistry,
};

use crate::output;
use crate::ThemeCommands;

pub(crate) fn handle_themes_command(
    cmd: ThemeCommands,
    config: &RendererConfig,
) -> anyhow::Result<()> {
    match cmd {
        ThemeCommands::List => list_themes(config),
        ThemeCommands::Show { id } => show_theme(config, &id),
        ThemeCommands::Check => check_themes(config),
    }
}

fn renderer(config: &RendererConfig) -> anyhow::Result<FormRenderer> {
    FormRenderer::from_config(config, Arc::new(StubTranslator)).context("failed to load themes")
}

fn list_themes(config: &RendererConfig) -> anyhow::Result<()> {
    let renderer = renderer(config)?;
    let registry = renderer.registry();
    let defaults = renderer.resolver().default_themes();

    output::header(format!("Themes ({}):", registry.len()));
    for name in registry.theme_names() {
        let Some(source) = registry.source(name) else {
            continue;
        };
        let mut line = name.to_string();
        if let Some(parent) = &source.extends {
            line.push_str(&format!(" (extends {parent})"));
        }
        if defaults.iter().any(|d| d == name) {
            line.push_str(" [default]");
        }
        output::item(line);
        if let Some(description) = &source.description {
            output::dim(format!("      {description}"));
        }
    }
    Ok(())
}

fn show_theme(config: &RendererConfig, id: &str) -> anyhow::Result<()> {
    let renderer = renderer(config)?;
    let registry = renderer.registry();

    let Some(source) = registry.source(id) else {
        output::error(format!("Theme '{id}' not found"));
        output::hint("  Run `formtheme-ctl themes list` to see available themes.");
        std::process::exit(1);
    };

    output::header(id);
    if let Some(description) = &source.description {
        output::label("Description", description);
    }
    let chain: Vec<&str> = registry
        .extends_chain(id)
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    output::label("Chain", chain.join(" -> "));
    output::blank();

    let blocks = registry.visible_blocks(id);
    output::header(format!("Blocks ({}):", blocks.len()));
    for (block, owner) in blocks {
        if owner == id {
            output::item(block);
        } else {
            output::item(format!("{block} (from {owner})"));
        }
    }
    Ok(())
}

/// Each theme is loaded into a fresh registry so one broken file does not
/// hide the others.
fn check_themes(config: &RendererConfig) -> anyhow::Result<()> {
    let dirs = config.theme_dirs();
    let ids = FilesystemLoader::new(dirs.clone()).available();
    if ids.is_empty() {
        output::dim("No themes found in the configured theme paths.");
        return Ok(());
    }

    output::header(format!("Checking {} theme(s):", ids.len()));
    let mut failures = 0usize;
    for id in &ids {
        let loader = ChainLoader::new()
            .with(FilesystemLoader::new(dirs.clone()))
            .with(BuiltinThemes);
        let mut registry = ThemeRegistry::new();
        match registry.load(&loader, id) {
            Ok(()) => output::status_icon(true, id),
            Err(e) => {
                failures += 1;
                output::status_icon(false, format!("{id}: {e}"));
            }
        }
    }

    if failures > 0 {
        output::error(format!("{failures} theme(s) failed to load"));
        std::process::exit(1);
    }
    Ok(())
}
