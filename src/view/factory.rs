//! Declarative form definitions and the view factory.
//!
//! A [`FormDefinition`] describes a form the way an application declares it
//! (name, type, options, children). [`FormDefinition::create_view`] turns it
//! into a [`ViewNode`] tree with every variable the built-in themes expect:
//! ids, full names, block prefixes, inherited `required` / `disabled` /
//! `translation_domain`, choice lists and so on.

use std::collections::HashSet;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{FormType, Vars, ViewNode};

/// A form element definition, possibly with children.
#[derive(Debug, Clone, Deserialize)]
pub struct FormDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub form_type: FormType,
    #[serde(default)]
    pub options: FormOptions,
    #[serde(default)]
    pub children: Vec<FormDefinition>,
}

/// Options accepted by every form type.
///
/// Unset options fall back to the type's defaults when the view is created.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    /// Label text, or `false` to suppress the label.
    pub label: Option<Value>,
    pub label_attr: Vars,
    /// Pattern used when no label is given (`form.%name%`).
    pub label_format: Option<String>,
    pub label_translation_parameters: Vars,
    pub help: Option<String>,
    pub help_attr: Vars,
    /// Render help without escaping.
    pub help_html: bool,
    pub help_translation_parameters: Vars,
    pub attr: Vars,
    pub attr_translation_parameters: Vars,
    /// Translation domain, or `false` to disable translation.
    pub translation_domain: Option<Value>,
    pub required: Option<bool>,
    pub disabled: bool,
    pub method: Option<String>,
    pub action: Option<String>,
    pub multipart: bool,
    /// Initial data: a scalar for fields, a bool for checkboxes, a list for
    /// multiple choices.
    pub data: Option<Value>,
    pub errors: Vec<String>,
    pub choices: Vec<ChoiceDef>,
    pub expanded: bool,
    pub multiple: bool,
    pub placeholder: Option<String>,
}

/// One entry of a choice list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChoiceDef {
    pub label: String,
    pub value: String,
}

impl ChoiceDef {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl FormDefinition {
    pub fn new(name: impl Into<String>, form_type: FormType) -> Self {
        Self {
            name: name.into(),
            form_type,
            options: FormOptions::default(),
            children: Vec::new(),
        }
    }

    /// Replace the options.
    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a child definition.
    pub fn child(mut self, child: FormDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Build the view tree for this definition.
    pub fn create_view(&self) -> Result<Rc<ViewNode>, FormError> {
        build(self, None, &Vars::new())
    }
}

/// Values a child inherits from its parent view.
struct ParentScope<'a> {
    id: &'a str,
    full_name: &'a str,
    unique_block_prefix: &'a str,
    required: bool,
    disabled: bool,
    translation_domain: &'a Value,
}

fn build(
    def: &FormDefinition,
    parent: Option<&ParentScope<'_>>,
    overrides: &Vars,
) -> Result<Rc<ViewNode>, FormError> {
    if parent.is_some() && def.name.is_empty() {
        return Err(FormError::EmptyName);
    }

    let opts = &def.options;
    let ty = def.form_type;
    let is_button = ty.is_button();

    let (id, mut full_name, unique_block_prefix) = match parent {
        Some(p) => (
            format!("{}_{}", p.id, def.name),
            format!("{}[{}]", p.full_name, def.name),
            format!("{}_{}", p.unique_block_prefix, def.name),
        ),
        None => (def.name.clone(), def.name.clone(), format!("_{}", def.name)),
    };

    let translation_domain = match (&opts.translation_domain, parent) {
        (Some(domain), _) => domain.clone(),
        (None, Some(p)) => p.translation_domain.clone(),
        (None, None) => Value::Null,
    };
    let disabled = opts.disabled || parent.is_some_and(|p| p.disabled);
    // Hidden fields are optional unless asked otherwise.
    let required = !is_button
        && opts.required.unwrap_or(ty != FormType::Hidden)
        && parent.map_or(true, |p| p.required);
    let compound = ty.is_compound() || (ty == FormType::Choice && opts.expanded);

    let mut vars = Vars::new();
    vars.insert("name".into(), json!(def.name));
    vars.insert("id".into(), json!(id));
    vars.insert("unique_block_prefix".into(), json!(unique_block_prefix));
    vars.insert("root".into(), json!(parent.is_none()));
    vars.insert("compound".into(), json!(compound));
    vars.insert("disabled".into(), json!(disabled));
    vars.insert("required".into(), json!(required));
    vars.insert(
        "label".into(),
        opts.label.clone().unwrap_or(Value::Null),
    );
    vars.insert("label_attr".into(), Value::Object(opts.label_attr.clone()));
    vars.insert(
        "label_format".into(),
        opts.label_format.clone().map_or(Value::Null, Value::String),
    );
    vars.insert(
        "label_translation_parameters".into(),
        Value::Object(opts.label_translation_parameters.clone()),
    );
    vars.insert("attr".into(), Value::Object(opts.attr.clone()));
    vars.insert(
        "attr_translation_parameters".into(),
        Value::Object(opts.attr_translation_parameters.clone()),
    );
    vars.insert("translation_domain".into(), translation_domain.clone());

    if !is_button {
        vars.insert(
            "help".into(),
            opts.help.clone().map_or(Value::Null, Value::String),
        );
        vars.insert("help_attr".into(), Value::Object(opts.help_attr.clone()));
        vars.insert("help_html".into(), json!(opts.help_html));
        vars.insert(
            "help_translation_parameters".into(),
            Value::Object(opts.help_translation_parameters.clone()),
        );
        vars.insert("errors".into(), json!(opts.errors));
        vars.insert(
            "method".into(),
            json!(opts.method.as_deref().unwrap_or("POST")),
        );
        vars.insert("action".into(), json!(opts.action.as_deref().unwrap_or("")));
        vars.insert("multipart".into(), json!(opts.multipart));
        vars.insert("render_rest".into(), json!(true));
    }

    match ty {
        FormType::Checkbox | FormType::Radio => {
            vars.insert("value".into(), json!("1"));
            vars.insert(
                "checked".into(),
                json!(matches!(opts.data, Some(Value::Bool(true)))),
            );
        }
        FormType::Password => {
            vars.insert("value".into(), json!(""));
        }
        FormType::Choice => {
            let selected = selected_values(opts.data.as_ref());
            let choices: Vec<Value> = opts
                .choices
                .iter()
                .map(|c| {
                    json!({
                        "label": c.label,
                        "value": c.value,
                        "selected": selected.contains(&c.value),
                    })
                })
                .collect();
            vars.insert("choices".into(), Value::Array(choices));
            vars.insert("expanded".into(), json!(opts.expanded));
            vars.insert("multiple".into(), json!(opts.multiple));
            vars.insert(
                "placeholder".into(),
                opts.placeholder.clone().map_or(Value::Null, Value::String),
            );
            vars.insert("choice_translation_domain".into(), translation_domain.clone());
            vars.insert("value".into(), opts.data.clone().unwrap_or(Value::Null));
            if opts.multiple && !opts.expanded {
                full_name.push_str("[]");
            }
        }
        _ if !is_button && !compound => {
            vars.insert("value".into(), scalar(opts.data.as_ref()));
        }
        _ => {}
    }
    vars.insert("full_name".into(), json!(full_name));
    vars.extend(overrides.clone());

    let scope = ParentScope {
        id: &id,
        full_name: &full_name,
        unique_block_prefix: &unique_block_prefix,
        required,
        disabled,
        translation_domain: &translation_domain,
    };

    let mut children = Vec::new();
    let mut seen = HashSet::new();
    let definitions = if ty == FormType::Choice && opts.expanded {
        expanded_choices(opts, &full_name)
    } else {
        def.children
            .iter()
            .map(|child| (child.clone(), Vars::new()))
            .collect()
    };
    for (child, child_overrides) in &definitions {
        if !seen.insert(child.name.clone()) {
            return Err(FormError::DuplicateChild {
                parent: def.name.clone(),
                name: child.name.clone(),
            });
        }
        children.push(build(child, Some(&scope), child_overrides)?);
    }

    tracing::trace!(name = %def.name, form_type = %ty, children = children.len(), "Built view node");
    Ok(ViewNode::new(def.name.clone(), ty, vars, children))
}

/// One radio (single) or checkbox (multiple) per choice, named by index.
///
/// The inputs share the choice field's submitted name and carry the choice
/// value instead of the checkbox default.
fn expanded_choices(opts: &FormOptions, full_name: &str) -> Vec<(FormDefinition, Vars)> {
    let selected = selected_values(opts.data.as_ref());
    let (ty, shared_name) = if opts.multiple {
        (FormType::Checkbox, format!("{full_name}[]"))
    } else {
        (FormType::Radio, full_name.to_string())
    };
    opts.choices
        .iter()
        .enumerate()
        .map(|(index, choice)| {
            let def = FormDefinition::new(index.to_string(), ty).options(FormOptions {
                label: Some(json!(choice.label)),
                data: Some(json!(selected.contains(&choice.value))),
                required: Some(false),
                ..FormOptions::default()
            });
            let mut overrides = Vars::new();
            overrides.insert("value".into(), json!(choice.value));
            overrides.insert("full_name".into(), json!(shared_name));
            (def, overrides)
        })
        .collect()
}

fn selected_values(data: Option<&Value>) -> Vec<String> {
    match data {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| scalar(Some(v)))
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => scalar(Some(other))
            .as_str()
            .map(|s| vec![s.to_string()])
            .unwrap_or_default(),
    }
}

/// Normalise field data to the string a widget displays.
fn scalar(data: Option<&Value>) -> Value {
    match data {
        None | Some(Value::Null) => json!(""),
        Some(Value::String(s)) => json!(s),
        Some(Value::Bool(b)) => json!(if *b { "1" } else { "" }),
        Some(other) => json!(other.to_string()),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("duplicate child '{name}' in '{parent}'")]
    DuplicateChild { parent: String, name: String },
    #[error("child forms must have a non-empty name")]
    EmptyName,
}
