//! View nodes: the render-time tree of form elements.
//!
//! A view tree is built bottom-up (children first) and shared through `Rc`.
//! Each node keeps a non-owning `Weak` link to its parent so theme lookups
//! can fall back to ancestors. The only state that changes during a render
//! pass is the node's theme assignment and its "rendered" flag, both behind
//! interior mutability.

mod factory;
mod form_type;

pub use factory::{ChoiceDef, FormDefinition, FormError, FormOptions};
pub use form_type::FormType;

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use serde_json::Value;

/// Render-time variables of a node or a render call.
pub type Vars = serde_json::Map<String, Value>;

/// Themes attached to a node with [`ThemeResolver::set_theme`](crate::ThemeResolver::set_theme).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeAssignment {
    /// Theme identifiers in registration order; later entries win.
    pub themes: Vec<String>,
    /// Whether the configured default themes are consulted after these.
    pub use_default_themes: bool,
}

/// One form element prepared for rendering.
#[derive(Debug)]
pub struct ViewNode {
    name: String,
    form_type: FormType,
    vars: Vars,
    block_prefixes: Vec<String>,
    children: Vec<Rc<ViewNode>>,
    parent: RefCell<Weak<ViewNode>>,
    theme: RefCell<Option<ThemeAssignment>>,
    rendered: Cell<bool>,
}

impl ViewNode {
    /// Create a node and adopt `children`.
    ///
    /// Block prefixes are the type hierarchy plus the node's
    /// `unique_block_prefix` variable when present; they are mirrored into
    /// the `block_prefixes` variable so themes can inspect them.
    pub fn new(
        name: impl Into<String>,
        form_type: FormType,
        mut vars: Vars,
        children: Vec<Rc<ViewNode>>,
    ) -> Rc<Self> {
        let mut block_prefixes: Vec<String> = form_type
            .hierarchy()
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(Value::String(unique)) = vars.get("unique_block_prefix") {
            if !unique.is_empty() {
                block_prefixes.push(unique.clone());
            }
        }
        vars.insert(
            "block_prefixes".to_string(),
            Value::Array(block_prefixes.iter().cloned().map(Value::String).collect()),
        );

        Rc::new_cyclic(|me| {
            for child in &children {
                *child.parent.borrow_mut() = me.clone();
            }
            Self {
                name: name.into(),
                form_type,
                vars,
                block_prefixes,
                children,
                parent: RefCell::new(Weak::new()),
                theme: RefCell::new(None),
                rendered: Cell::new(false),
            }
        })
    }

    /// Node name, unique among its siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn form_type(&self) -> FormType {
        self.form_type
    }

    /// Variables attached when the view was built.
    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Block prefixes from least to most specific.
    pub fn block_prefixes(&self) -> &[String] {
        &self.block_prefixes
    }

    pub fn children(&self) -> &[Rc<ViewNode>] {
        &self.children
    }

    /// Child by name.
    pub fn child(&self, name: &str) -> Option<&Rc<ViewNode>> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Descendant by dotted path (`address.street`).
    pub fn find(&self, path: &str) -> Option<Rc<ViewNode>> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = Rc::clone(self.child(first)?);
        for segment in segments {
            let next = Rc::clone(current.child(segment)?);
            current = next;
        }
        Some(current)
    }

    /// Parent node, if this node has one and it is still alive.
    pub fn parent(&self) -> Option<Rc<ViewNode>> {
        self.parent.borrow().upgrade()
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Theme assignment made directly on this node.
    pub fn theme(&self) -> Ref<'_, Option<ThemeAssignment>> {
        self.theme.borrow()
    }

    pub(crate) fn assign_theme(&self, assignment: ThemeAssignment) {
        *self.theme.borrow_mut() = Some(assignment);
    }

    /// Whether the node's row or widget has already been rendered.
    pub fn is_rendered(&self) -> bool {
        self.rendered.get()
    }

    pub fn set_rendered(&self) {
        self.rendered.set(true);
    }
}

/// Truthiness of a template variable, matching how Tera evaluates `{% if %}`.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
