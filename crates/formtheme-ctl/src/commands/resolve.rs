//! `resolve`: explain which theme supplies a block.

use std::sync::Arc;

use anyhow::Context;
use formtheme::theme::BlockBody;
use formtheme::{FormRenderer, RendererConfig, ResolvedBlock, StubTranslator, ViewNode};

use super::{apply_themes, select_node};
use crate::definition::load_view;
use crate::output;
use crate::ResolveArgs;

pub(crate) fn handle_resolve_command(
    args: ResolveArgs,
    config: &RendererConfig,
) -> anyhow::Result<()> {
    let renderer = FormRenderer::from_config(config, Arc::new(StubTranslator))
        .context("failed to load themes")?;

    let view = load_view(&args.target.definition)?;
    apply_themes(&renderer, &view, &args.target);
    let node = select_node(&view, args.target.field.as_deref())?;
    let candidates = renderer.resolver().candidate_themes(&node);

    let found = if args.search {
        search(&renderer, &node, &args.block)
    } else {
        renderer.resolve_block(&node, &args.block)
    };

    let Some(resolved) = found else {
        output::error(format!(
            "No theme defines '{}' for '{}'",
            args.block,
            node.name()
        ));
        output::hint(format!("  Themes searched: {}", candidates.join(", ")));
        if args.search {
            output::hint(format!(
                "  Prefixes searched: {}",
                node.block_prefixes().join(", ")
            ));
        }
        std::process::exit(1);
    };

    output::header(format!("{} for {}", resolved.name, node.name()));
    output::label("Theme", &resolved.theme);
    output::label("Defined in", resolved.source);
    match &resolved.def.body {
        BlockBody::Template(_) => output::label("Kind", "template"),
        BlockBody::Delegate { block, .. } => {
            output::label("Kind", format!("delegates to {block}"))
        }
    }
    output::dim(format!("  Themes searched: {}", candidates.join(", ")));
    Ok(())
}

/// The first `<prefix>_<base>` block found, most specific prefix first.
fn search<'r>(
    renderer: &'r FormRenderer,
    node: &ViewNode,
    base: &str,
) -> Option<ResolvedBlock<'r>> {
    node.block_prefixes()
        .iter()
        .rev()
        .find_map(|prefix| renderer.resolve_block(node, &format!("{prefix}_{base}")))
}
