//! Built-in form element types and their parent table.

use std::fmt;

use serde::Deserialize;

/// Element type of a view node.
///
/// Each type names its block prefix (`text` in `text_widget`) and its parent
/// type. Block lookup walks from the most specific prefix to the root of the
/// hierarchy, so a theme only has to define `form_widget` to cover every type
/// that does not need special markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    #[default]
    Form,
    Text,
    Textarea,
    Email,
    Password,
    Search,
    Url,
    Tel,
    Integer,
    Number,
    Hidden,
    Checkbox,
    Radio,
    Choice,
    Button,
    Submit,
    Reset,
}

impl FormType {
    /// Every built-in type, in declaration order.
    pub const ALL: [FormType; 17] = [
        FormType::Form,
        FormType::Text,
        FormType::Textarea,
        FormType::Email,
        FormType::Password,
        FormType::Search,
        FormType::Url,
        FormType::Tel,
        FormType::Integer,
        FormType::Number,
        FormType::Hidden,
        FormType::Checkbox,
        FormType::Radio,
        FormType::Choice,
        FormType::Button,
        FormType::Submit,
        FormType::Reset,
    ];

    /// Prefix used to build block names for this type.
    pub fn block_prefix(self) -> &'static str {
        match self {
            FormType::Form => "form",
            FormType::Text => "text",
            FormType::Textarea => "textarea",
            FormType::Email => "email",
            FormType::Password => "password",
            FormType::Search => "search",
            FormType::Url => "url",
            FormType::Tel => "tel",
            FormType::Integer => "integer",
            FormType::Number => "number",
            FormType::Hidden => "hidden",
            FormType::Checkbox => "checkbox",
            FormType::Radio => "radio",
            FormType::Choice => "choice",
            FormType::Button => "button",
            FormType::Submit => "submit",
            FormType::Reset => "reset",
        }
    }

    /// Parent type, or `None` at the root of a hierarchy.
    ///
    /// Buttons form their own hierarchy: they are not data fields and never
    /// fall back to `form_*` blocks.
    pub fn parent(self) -> Option<FormType> {
        match self {
            FormType::Form | FormType::Button => None,
            FormType::Textarea
            | FormType::Email
            | FormType::Password
            | FormType::Search
            | FormType::Url
            | FormType::Tel => Some(FormType::Text),
            FormType::Radio => Some(FormType::Checkbox),
            FormType::Submit | FormType::Reset => Some(FormType::Button),
            FormType::Text
            | FormType::Integer
            | FormType::Number
            | FormType::Hidden
            | FormType::Checkbox
            | FormType::Choice => Some(FormType::Form),
        }
    }

    /// Block prefixes from the root of the hierarchy down to this type.
    pub fn hierarchy(self) -> Vec<&'static str> {
        let mut prefixes = vec![self.block_prefix()];
        let mut current = self.parent();
        while let Some(ty) = current {
            prefixes.push(ty.block_prefix());
            current = ty.parent();
        }
        prefixes.reverse();
        prefixes
    }

    /// Whether this type is a button (no value, label rendered inside the widget).
    pub fn is_button(self) -> bool {
        self.hierarchy().first() == Some(&"button")
    }

    /// Whether nodes of this type hold children by default.
    pub fn is_compound(self) -> bool {
        matches!(self, FormType::Form)
    }

    /// Look a type up by its block prefix.
    pub fn from_prefix(prefix: &str) -> Option<FormType> {
        FormType::ALL
            .into_iter()
            .find(|ty| ty.block_prefix() == prefix)
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.block_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_root_first() {
        assert_eq!(FormType::Email.hierarchy(), vec!["form", "text", "email"]);
        assert_eq!(FormType::Form.hierarchy(), vec!["form"]);
        assert_eq!(FormType::Radio.hierarchy(), vec!["form", "checkbox", "radio"]);
    }

    #[test]
    fn test_buttons_have_their_own_root() {
        assert_eq!(FormType::Submit.hierarchy(), vec!["button", "submit"]);
        assert!(FormType::Reset.is_button());
        assert!(!FormType::Text.is_button());
    }

    #[test]
    fn test_every_type_reaches_a_root() {
        for ty in FormType::ALL {
            let root = ty.hierarchy()[0];
            assert!(root == "form" || root == "button", "{ty} has root {root}");
        }
    }

    #[test]
    fn test_from_prefix_round_trips() {
        for ty in FormType::ALL {
            assert_eq!(FormType::from_prefix(ty.block_prefix()), Some(ty));
        }
        assert_eq!(FormType::from_prefix("nope"), None);
    }

    #[test]
    fn test_deserialize_snake_case() {
        let ty: FormType = serde_json::from_str("\"textarea\"").unwrap();
        assert_eq!(ty, FormType::Textarea);
    }
}
