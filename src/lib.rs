//! Themed, block-based HTML form rendering.
//!
//! A form is turned into a tree of [`ViewNode`]s, each carrying its element
//! type and render-time variables. Rendering looks up named blocks (for
//! example `text_widget` or `form_row`) in an ordered list of themes, renders
//! the winning block with Tera and substitutes attributes and translated
//! strings along the way.
//!
//! # Modules
//!
//! - [`config`]: renderer configuration (default themes, theme search paths)
//! - [`render`]: the block renderer and its Tera filters
//! - [`theme`]: theme sources, loaders, the compiled registry and the resolver
//! - [`translation`]: the translator seam, parameter substitution and catalogues
//! - [`view`]: view nodes, the form type hierarchy and the view factory
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use formtheme::{FormDefinition, FormRenderer, FormType, RendererConfig, StubTranslator, Vars};
//!
//! let config = RendererConfig::default();
//! let renderer = FormRenderer::from_config(&config, Arc::new(StubTranslator))?;
//! let view = FormDefinition::new("contact", FormType::Form)
//!     .child(FormDefinition::new("email", FormType::Email))
//!     .create_view()?;
//! let html = renderer.render_block(&view, "form", &Vars::new())?;
//! ```

pub mod config;
pub mod render;
pub mod theme;
pub mod translation;
pub mod view;

pub use config::{load_config, ConfigError, RendererConfig};
pub use render::{FormRenderer, RenderError};
pub use theme::{
    BuiltinThemes, ChainLoader, FilesystemLoader, LoadError, ResolvedBlock, ThemeLoader,
    ThemeRegistry, ThemeResolver, ThemeSource,
};
pub use translation::{
    substitute, CatalogTranslator, Parameters, StubTranslator, TranslationError, Translator,
};
pub use view::{
    ChoiceDef, FormDefinition, FormError, FormOptions, FormType, ThemeAssignment, Vars, ViewNode,
};
