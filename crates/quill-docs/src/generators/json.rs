use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Result,
    extractor::Documentation,
    model::{Class, Member, Tagname},
};

/// Pretty-printed JSON of the resolved classes, members grouped by kind and
/// statics grouped separately.
pub fn render_json(doc: &Documentation) -> Result<String> {
    let classes = doc
        .relations
        .classes()
        .iter()
        .map(render_class)
        .collect::<Result<Vec<_>>>()?;
    let payload = JsonPayload {
        version: env!("CARGO_PKG_VERSION"),
        generated_at: Utc::now().to_rfc3339(),
        classes,
    };
    Ok(serde_json::to_string_pretty(&payload)?)
}

#[derive(Serialize)]
struct JsonPayload {
    version: &'static str,
    generated_at: String,
    classes: Vec<Value>,
}

fn render_class(class: &Class) -> Result<Value> {
    let mut value = serde_json::to_value(class)?;
    if let Value::Object(map) = &mut value {
        map.insert("members".to_string(), serde_json::to_value(grouped(class, false))?);
        map.insert("statics".to_string(), serde_json::to_value(grouped(class, true))?);
    }
    Ok(value)
}

fn grouped(class: &Class, statics: bool) -> IndexMap<&'static str, Vec<&Member>> {
    let mut groups = IndexMap::new();
    for tagname in Tagname::MEMBER_KINDS {
        let members: Vec<&Member> = if statics {
            class.statics_of(tagname).collect()
        } else {
            class.members_of(tagname).collect()
        };
        if !members.is_empty() {
            groups.insert(tagname.as_str(), members);
        }
    }
    groups
}
