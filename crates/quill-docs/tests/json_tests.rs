#![cfg(feature = "json")]

use std::path::PathBuf;

use quill_docs::generators::json::render_json;
use quill_docs::{DocsConfig, Extractor};

fn render(source: &str) -> serde_json::Value {
    let documentation = Extractor::new(DocsConfig::default())
        .extract_sources(vec![(PathBuf::from("src/Panel.js"), source.to_string())])
        .expect("extraction should succeed");
    let json = render_json(&documentation).expect("should serialize");
    serde_json::from_str(&json).expect("valid json")
}

#[test]
fn groups_members_and_statics_by_kind() {
    let value = render(
        r#"
        /**
         * @class Panel
         * A panel.
         */
        /** @cfg {String} title The title. */
        /** @property {Number} count */
        /**
         * @method create
         * @static
         */
        "#,
    );

    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    assert!(value["generated_at"].is_string());

    let panel = &value["classes"][0];
    assert_eq!(panel["name"], "Panel");
    assert_eq!(panel["doc"], "A panel.");
    assert_eq!(panel["members"]["cfg"][0]["name"], "title");
    assert_eq!(panel["members"]["cfg"][0]["type"], "String");
    assert_eq!(panel["members"]["property"][0]["id"], "property-count");
    assert!(panel["members"].get("method").is_none());
    assert_eq!(panel["statics"]["method"][0]["id"], "static-method-create");
    assert_eq!(panel["statics"]["method"][0]["static"], true);
}

#[test]
fn omits_empty_fields() {
    let value = render("/** @class Bare */\n");

    let bare = &value["classes"][0];
    assert_eq!(bare["name"], "Bare");
    assert!(bare.get("extends").is_none());
    assert!(bare.get("mixins").is_none());
    assert_eq!(bare["members"], serde_json::json!({}));
    assert_eq!(bare["statics"], serde_json::json!({}));
}

#[test]
fn location_is_reported() {
    let value = render("\n/** @class Located */\n");

    let location = &value["classes"][0]["location"];
    assert_eq!(location["path"], "src/Panel.js");
    assert_eq!(location["line"], 2);
}
