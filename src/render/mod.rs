//! The block renderer and the Tera filters theme blocks use.

mod engine;
mod escape;
mod filters;

pub use engine::{FormRenderer, RenderError};
pub use escape::escape_html;
