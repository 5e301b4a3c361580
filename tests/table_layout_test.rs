//! Rendering with the table layout as the default theme.
//!
//! Mirrors an application setup: `form_table_layout` plus a project theme
//! (`custom_widgets`) as defaults, translated through the `[trans]` stub so
//! every translated string is visible in the output.

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use formtheme::{
    BuiltinThemes, ChainLoader, ChoiceDef, FilesystemLoader, FormDefinition, FormOptions,
    FormRenderer, FormType, RendererConfig, StubTranslator, ThemeRegistry, Vars, ViewNode,
};
use serde_json::{json, Value};

fn fixture_themes() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/themes")
}

fn renderer() -> FormRenderer {
    let loader = ChainLoader::new()
        .with(FilesystemLoader::new([fixture_themes()]))
        .with(BuiltinThemes);
    let mut registry = ThemeRegistry::new();
    registry
        .load_all(&loader, ["form_table_layout", "custom_widgets"])
        .unwrap();
    let config = RendererConfig {
        default_themes: vec!["form_table_layout".into(), "custom_widgets".into()],
        ..Default::default()
    };
    FormRenderer::new(registry, &config, Arc::new(StubTranslator))
}

fn vars(value: Value) -> Vars {
    match value {
        Value::Object(map) => map,
        _ => Vars::new(),
    }
}

fn options(value: Value) -> FormOptions {
    serde_json::from_value(value).unwrap()
}

fn named(name: &str, form_type: FormType, opts: Value) -> Rc<ViewNode> {
    FormDefinition::new(name, form_type)
        .options(options(opts))
        .create_view()
        .unwrap()
}

fn render_help(renderer: &FormRenderer, view: &ViewNode) -> String {
    renderer
        .search_and_render_block(view, "help", &Vars::new())
        .unwrap()
}

#[test]
fn test_start_tag_has_no_action_attribute_when_action_is_empty() {
    let view = named("form", FormType::Form, json!({ "method": "get", "action": "" }));
    let html = renderer()
        .render_block(&view, "form_start", &Vars::new())
        .unwrap();
    assert_eq!(html, r#"<form name="form" method="get">"#);
}

#[test]
fn test_start_tag_has_action_attribute_when_action_is_zero() {
    let view = named("form", FormType::Form, json!({ "method": "get", "action": "0" }));
    let html = renderer()
        .render_block(&view, "form_start", &Vars::new())
        .unwrap();
    assert_eq!(html, r#"<form name="form" method="get" action="0">"#);
}

#[test]
fn test_start_tag_overrides_unsupported_methods() {
    let view = named(
        "form",
        FormType::Form,
        json!({ "method": "put", "action": "/contact", "multipart": true }),
    );
    let html = renderer()
        .render_block(&view, "form_start", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        r#"<form name="form" method="post" action="/contact" enctype="multipart/form-data"><input type="hidden" name="_method" value="PUT" />"#
    );
}

#[test]
fn test_help_attr() {
    let view = named(
        "name",
        FormType::Text,
        json!({ "help": "Help text test!", "help_attr": { "class": "class-test" } }),
    );
    assert_eq!(
        render_help(&renderer(), &view),
        r#"<p id="name_help" class="class-test help-text">[trans]Help text test![/trans]</p>"#
    );
}

#[test]
fn test_help_html_default_is_false() {
    let view = named("name", FormType::Text, json!({ "help": "Help <b>text</b> test!" }));
    assert_eq!(
        render_help(&renderer(), &view),
        r#"<p id="name_help" class="help-text">[trans]Help &lt;b&gt;text&lt;/b&gt; test![/trans]</p>"#
    );
}

#[test]
fn test_help_html_is_false() {
    let view = named(
        "name",
        FormType::Text,
        json!({ "help": "Help <b>text</b> test!", "help_html": false }),
    );
    let html = render_help(&renderer(), &view);
    assert!(html.contains("&lt;b&gt;text&lt;/b&gt;"));
    assert!(!html.contains("<b>"));
}

#[test]
fn test_help_html_is_true() {
    let view = named(
        "name",
        FormType::Text,
        json!({ "help": "Help <b>text</b> test!", "help_html": true }),
    );
    assert_eq!(
        render_help(&renderer(), &view),
        r#"<p id="name_help" class="help-text">[trans]Help <b>text</b> test![/trans]</p>"#
    );
}

#[test]
fn test_help_is_omitted_when_empty() {
    let view = named("name", FormType::Text, json!({}));
    assert_eq!(render_help(&renderer(), &view), "");
}

#[test]
fn test_label_with_translation_parameters() {
    let view = named("name", FormType::Text, json!({}));
    let html = renderer()
        .search_and_render_block(
            &view,
            "label",
            &vars(json!({
                "label": "Address is %address%",
                "label_translation_parameters": { "%address%": "Paris, rue de la Paix" },
            })),
        )
        .unwrap();
    assert_eq!(
        html,
        r#"<label for="name" class="required">[trans]Address is Paris, rue de la Paix[/trans]</label>"#
    );
}

#[test]
fn test_help_with_translation_parameters() {
    let view = named(
        "name",
        FormType::Text,
        json!({
            "help": "for company %company%",
            "help_translation_parameters": { "%company%": "ACME Ltd." },
        }),
    );
    assert_eq!(
        render_help(&renderer(), &view),
        r#"<p id="name_help" class="help-text">[trans]for company ACME Ltd.[/trans]</p>"#
    );
}

#[test]
fn test_attributes_with_translation_parameters() {
    let view = named(
        "name",
        FormType::Text,
        json!({
            "attr": {
                "title": "Message to %company%",
                "placeholder": "Enter a message to %company%",
            },
            "attr_translation_parameters": { "%company%": "ACME Ltd." },
        }),
    );
    let html = renderer()
        .search_and_render_block(&view, "widget", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        r#"<input type="text" id="name" name="name" required="required" title="[trans]Message to ACME Ltd.[/trans]" placeholder="[trans]Enter a message to ACME Ltd.[/trans]" />"#
    );
}

#[test]
fn test_button_with_translation_parameters() {
    let form = FormDefinition::new("myform", FormType::Form)
        .child(
            FormDefinition::new("mybutton", FormType::Button).options(options(json!({
                "label": "Submit to %company%",
                "label_translation_parameters": { "%company%": "ACME Ltd." },
            }))),
        )
        .create_view()
        .unwrap();
    let button = form.child("mybutton").unwrap();
    let html = renderer()
        .search_and_render_block(button, "widget", &vars(json!({ "label_format": "form.%name%" })))
        .unwrap();
    assert_eq!(
        html,
        r#"<button type="button" id="myform_mybutton" name="myform[mybutton]">[trans]Submit to ACME Ltd.[/trans]</button>"#
    );
}

#[test]
fn test_button_label_format_applies_without_label() {
    let form = FormDefinition::new("myform", FormType::Form)
        .child(FormDefinition::new("mybutton", FormType::Submit))
        .create_view()
        .unwrap();
    let button = form.child("mybutton").unwrap();
    let html = renderer()
        .search_and_render_block(button, "widget", &vars(json!({ "label_format": "form.%name%" })))
        .unwrap();
    assert_eq!(
        html,
        r#"<button type="submit" id="myform_mybutton" name="myform[mybutton]">[trans]form.mybutton[/trans]</button>"#
    );
}

#[test]
fn test_row() {
    let view = named("name", FormType::Text, json!({}));
    let html = renderer()
        .search_and_render_block(&view, "row", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<tr><td><label for="name" class="required">[trans]Name[/trans]</label></td>"#,
            r#"<td><input type="text" id="name" name="name" required="required" /></td></tr>"#,
        )
    );
}

#[test]
fn test_row_with_errors_and_help() {
    let view = named(
        "name",
        FormType::Text,
        json!({ "errors": ["Too short"], "help": "Your full name", "required": false }),
    );
    let html = renderer()
        .search_and_render_block(&view, "row", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<tr><td><label for="name">[trans]Name[/trans]</label></td>"#,
            r#"<td><ul><li>Too short</li></ul><input type="text" id="name" name="name" />"#,
            r#"<p id="name_help" class="help-text">[trans]Your full name[/trans]</p></td></tr>"#,
        )
    );
}

#[test]
fn test_button_row() {
    let form = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("save", FormType::Submit))
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(form.child("save").unwrap(), "row", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        r#"<tr><td></td><td><button type="submit" id="form_save" name="form[save]">[trans]Save[/trans]</button></td></tr>"#
    );
}

#[test]
fn test_hidden_row() {
    let form = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("token", FormType::Hidden).options(options(json!({ "data": "abc" }))))
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(form.child("token").unwrap(), "row", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        r#"<tr style="display: none"><td colspan="2"><input type="hidden" id="form_token" name="form[token]" value="abc" /></td></tr>"#
    );
}

#[test]
fn test_form() {
    let view = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("name", FormType::Text))
        .child(FormDefinition::new("save", FormType::Submit))
        .create_view()
        .unwrap();
    let html = renderer().render_block(&view, "form", &Vars::new()).unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<form name="form" method="post"><table id="form">"#,
            r#"<tr><td><label for="form_name" class="required">[trans]Name[/trans]</label></td>"#,
            r#"<td><input type="text" id="form_name" name="form[name]" required="required" /></td></tr>"#,
            r#"<tr><td></td><td><button type="submit" id="form_save" name="form[save]">[trans]Save[/trans]</button></td></tr>"#,
            r#"</table></form>"#,
        )
    );
}

#[test]
fn test_root_errors_render_in_a_full_width_row() {
    let view = FormDefinition::new("form", FormType::Form)
        .options(options(json!({ "errors": ["Session expired"] })))
        .child(FormDefinition::new("name", FormType::Text))
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(&view, "widget", &Vars::new())
        .unwrap();
    assert!(html.starts_with(
        r#"<table id="form"><tr><td colspan="2"><ul><li>Session expired</li></ul></td></tr><tr>"#
    ));
}

#[test]
fn test_rows_render_once() {
    let view = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("first", FormType::Text))
        .child(FormDefinition::new("second", FormType::Text))
        .create_view()
        .unwrap();
    let renderer = renderer();
    let first = renderer
        .search_and_render_block(view.child("first").unwrap(), "row", &Vars::new())
        .unwrap();
    assert!(first.contains(r#"id="form_first""#));

    let rest = renderer
        .search_and_render_block(&view, "rest", &Vars::new())
        .unwrap();
    assert!(!rest.contains("form_first"));
    assert!(rest.contains(r#"id="form_second""#));

    let again = renderer
        .search_and_render_block(view.child("second").unwrap(), "row", &Vars::new())
        .unwrap();
    assert_eq!(again, "");
}

#[test]
fn test_end_renders_rest() {
    let view = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("name", FormType::Text))
        .create_view()
        .unwrap();
    let html = renderer()
        .render_block(&view, "form_end", &Vars::new())
        .unwrap();
    assert!(html.starts_with(r#"<tr><td><label for="form_name""#));
    assert!(html.ends_with("</form>"));
}

#[test]
fn test_end_without_rest() {
    let view = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("name", FormType::Text))
        .create_view()
        .unwrap();
    let html = renderer()
        .render_block(&view, "form_end", &vars(json!({ "render_rest": false })))
        .unwrap();
    assert_eq!(html, "</form>");
}

#[test]
fn test_nested_compound_renders_as_table() {
    let view = FormDefinition::new("form", FormType::Form)
        .child(
            FormDefinition::new("address", FormType::Form)
                .child(FormDefinition::new("street", FormType::Text)),
        )
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(view.child("address").unwrap(), "row", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<tr><td><label class="required">[trans]Address[/trans]</label></td><td>"#,
            r#"<table id="form_address"><tr><td><label for="form_address_street" class="required">[trans]Street[/trans]</label></td>"#,
            r#"<td><input type="text" id="form_address_street" name="form[address][street]" required="required" /></td></tr></table>"#,
            r#"</td></tr>"#,
        )
    );
}

#[test]
fn test_custom_widget_from_project_theme() {
    let view = named("text_id", FormType::Text, json!({}));
    let html = renderer()
        .search_and_render_block(&view, "widget", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        r#"<div id="container"><input type="text" id="text_id" name="text_id" required="required" /></div>"#
    );
}

#[test]
fn test_custom_label_from_project_theme() {
    let view = named("name_entry", FormType::Text, json!({ "label": "Entry" }));
    let html = renderer()
        .search_and_render_block(&view, "label", &Vars::new())
        .unwrap();
    assert_eq!(html, "<label>Custom label: [trans]Entry[/trans]</label>");
}

#[test]
fn test_label_is_omitted_when_false() {
    let view = named("name", FormType::Text, json!({ "label": false }));
    let html = renderer()
        .search_and_render_block(&view, "label", &Vars::new())
        .unwrap();
    assert_eq!(html, "");
}

#[test]
fn test_label_without_translation() {
    let view = named(
        "name",
        FormType::Text,
        json!({ "label": "Plain %x%", "translation_domain": false, "required": false }),
    );
    let html = renderer()
        .search_and_render_block(&view, "label", &Vars::new())
        .unwrap();
    assert_eq!(html, r#"<label for="name">Plain %x%</label>"#);
}

#[test]
fn test_label_format_uses_name_and_id() {
    let form = FormDefinition::new("form", FormType::Form)
        .child(FormDefinition::new("city", FormType::Text))
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(
            form.child("city").unwrap(),
            "label",
            &vars(json!({ "label_format": "%id%.%name%" })),
        )
        .unwrap();
    assert_eq!(
        html,
        r#"<label for="form_city" class="required">[trans]form_city.city[/trans]</label>"#
    );
}

#[test]
fn test_collapsed_choice_with_placeholder() {
    let view = FormDefinition::new("color", FormType::Choice)
        .options(FormOptions {
            choices: vec![ChoiceDef::new("Red", "r"), ChoiceDef::new("Blue", "b")],
            placeholder: Some("Pick one".into()),
            ..Default::default()
        })
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(&view, "widget", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<select id="color" name="color" required="required">"#,
            r#"<option value="" selected="selected">[trans]Pick one[/trans]</option>"#,
            r#"<option value="r">[trans]Red[/trans]</option>"#,
            r#"<option value="b">[trans]Blue[/trans]</option></select>"#,
        )
    );
}

#[test]
fn test_collapsed_choice_without_placeholder_is_not_required() {
    let view = FormDefinition::new("color", FormType::Choice)
        .options(FormOptions {
            choices: vec![ChoiceDef::new("Red", "r"), ChoiceDef::new("Blue", "b")],
            data: Some(json!("b")),
            ..Default::default()
        })
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(&view, "widget", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<select id="color" name="color">"#,
            r#"<option value="r">[trans]Red[/trans]</option>"#,
            r#"<option value="b" selected="selected">[trans]Blue[/trans]</option></select>"#,
        )
    );
}

#[test]
fn test_expanded_choice() {
    let view = FormDefinition::new("color", FormType::Choice)
        .options(FormOptions {
            expanded: true,
            choices: vec![ChoiceDef::new("Red", "r"), ChoiceDef::new("Blue", "b")],
            data: Some(json!("r")),
            ..Default::default()
        })
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(&view, "widget", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        concat!(
            r#"<div id="color">"#,
            r#"<input type="radio" id="color_0" name="color" value="r" checked="checked" />"#,
            r#"<label for="color_0">[trans]Red[/trans]</label>"#,
            r#"<input type="radio" id="color_1" name="color" value="b" />"#,
            r#"<label for="color_1">[trans]Blue[/trans]</label>"#,
            r#"</div>"#,
        )
    );
}

#[test]
fn test_simple_input_types() {
    let renderer = renderer();
    for (form_type, expected) in [
        (FormType::Email, "email"),
        (FormType::Password, "password"),
        (FormType::Search, "search"),
        (FormType::Url, "url"),
        (FormType::Tel, "tel"),
        (FormType::Integer, "number"),
        (FormType::Number, "text"),
    ] {
        let view = named("field", form_type, json!({}));
        let html = renderer
            .search_and_render_block(&view, "widget", &Vars::new())
            .unwrap();
        assert_eq!(
            html,
            format!(r#"<input type="{expected}" id="field" name="field" required="required" />"#),
            "{form_type}"
        );
    }
}

#[test]
fn test_textarea_and_checkbox() {
    let renderer = renderer();
    let textarea = named("bio", FormType::Textarea, json!({ "data": "a < b" }));
    assert_eq!(
        renderer
            .search_and_render_block(&textarea, "widget", &Vars::new())
            .unwrap(),
        r#"<textarea id="bio" name="bio" required="required">a &lt; b</textarea>"#
    );

    let checkbox = named("agree", FormType::Checkbox, json!({ "data": true, "required": false }));
    assert_eq!(
        renderer
            .search_and_render_block(&checkbox, "widget", &Vars::new())
            .unwrap(),
        r#"<input type="checkbox" id="agree" name="agree" value="1" checked="checked" />"#
    );
}

#[test]
fn test_disabled_inherits_into_widgets() {
    let form = FormDefinition::new("form", FormType::Form)
        .options(options(json!({ "disabled": true, "required": false })))
        .child(FormDefinition::new("name", FormType::Text))
        .create_view()
        .unwrap();
    let html = renderer()
        .search_and_render_block(form.child("name").unwrap(), "widget", &Vars::new())
        .unwrap();
    assert_eq!(
        html,
        r#"<input type="text" id="form_name" name="form[name]" disabled="disabled" />"#
    );
}
