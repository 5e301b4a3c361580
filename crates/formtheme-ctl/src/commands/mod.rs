//! Command handlers.

pub(crate) mod render;
pub(crate) mod resolve;
pub(crate) mod themes;

pub(crate) use render::handle_render_command;
pub(crate) use resolve::handle_resolve_command;
pub(crate) use themes::handle_themes_command;

use std::rc::Rc;

use anyhow::anyhow;
use formtheme::{FormRenderer, ViewNode};

use crate::TargetArgs;

/// Assign `--theme` values to the form root. Nothing is assigned when no
/// theme was given and defaults stay on.
fn apply_themes(renderer: &FormRenderer, root: &ViewNode, target: &TargetArgs) {
    if target.themes.is_empty() && !target.no_default_themes {
        return;
    }
    renderer.set_theme(root, &target.themes, !target.no_default_themes);
}

/// The root itself, or the descendant named by `--field`.
fn select_node(root: &Rc<ViewNode>, field: Option<&str>) -> anyhow::Result<Rc<ViewNode>> {
    match field {
        None => Ok(Rc::clone(root)),
        Some(path) => root
            .find(path)
            .ok_or_else(|| anyhow!("form '{}' has no field '{path}'", root.name())),
    }
}
