//! `render`: print the HTML of one block.

use std::sync::Arc;

use anyhow::Context;
use formtheme::{
    CatalogTranslator, FormRenderer, RendererConfig, StubTranslator, Translator, Vars,
};

use super::{apply_themes, select_node};
use crate::definition::load_view;
use crate::output;
use crate::RenderArgs;

pub(crate) fn handle_render_command(
    args: RenderArgs,
    config: &RendererConfig,
) -> anyhow::Result<()> {
    let translator = translator(&args)?;
    let renderer = FormRenderer::from_config(config, translator).context("failed to load themes")?;

    let view = load_view(&args.target.definition)?;
    apply_themes(&renderer, &view, &args.target);
    let node = select_node(&view, args.target.field.as_deref())?;
    let vars = parse_vars(args.vars.as_deref())?;

    let html = if args.search {
        renderer.search_and_render_block(&node, &args.block, &vars)?
    } else {
        renderer.render_block(&node, &args.block, &vars)?
    };
    tracing::debug!(block = %args.block, node = node.name(), bytes = html.len(), "Rendered");
    output::plain(html);
    Ok(())
}

/// Without a catalogue, messages pass through with parameters substituted.
fn translator(args: &RenderArgs) -> anyhow::Result<Arc<dyn Translator>> {
    if args.stub_translator {
        return Ok(Arc::new(StubTranslator));
    }
    match &args.translations {
        Some(path) => {
            let catalog = CatalogTranslator::load(path)?;
            tracing::debug!(path = %path.display(), messages = catalog.len(), "Catalogue loaded");
            Ok(Arc::new(catalog))
        }
        None => Ok(Arc::new(CatalogTranslator::new())),
    }
}

fn parse_vars(raw: Option<&str>) -> anyhow::Result<Vars> {
    match raw {
        None => Ok(Vars::new()),
        Some(json) => serde_json::from_str(json).context("--vars must be a JSON object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vars_object() {
        let vars = parse_vars(Some(r#"{"attr": {"class": "wide"}}"#)).unwrap();
        assert_eq!(vars["attr"]["class"], "wide");
    }

    #[test]
    fn test_parse_vars_missing_is_empty() {
        assert!(parse_vars(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_vars_rejects_non_object() {
        let err = parse_vars(Some("[1, 2]")).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }
}
