//! `@since` / `@new` from historical API snapshots.
//!
//! Snapshot files are read before any pass runs; a missing or malformed file
//! fails the run. Three layouts are accepted:
//! `{version, classes: {ClassName: {memberId: true | [paramName, ...]}}}`,
//! the bare class map on its own, and the JSON this crate renders itself.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Pass, PassContext};
use crate::config::{ImportSpec, PassOptions};
use crate::error::{DocsError, Result};
use crate::model::{Member, Tagname};
use crate::relations::Relations;

/// What a snapshot knows about one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotEntry {
    Present(bool),
    /// Method parameter names at that version.
    Params(Vec<String>),
}

impl SnapshotEntry {
    fn has_param(&self, index: usize) -> bool {
        match self {
            SnapshotEntry::Present(present) => *present,
            SnapshotEntry::Params(names) => index < names.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version: String,
    pub classes: IndexMap<String, IndexMap<String, SnapshotEntry>>,
}

impl VersionSnapshot {
    fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    fn entry(&self, class: &str, member_id: &str) -> Option<&SnapshotEntry> {
        self.classes
            .get(class)?
            .get(member_id)
            .filter(|entry| **entry != SnapshotEntry::Present(false))
    }
}

/// Load every import, oldest first.
pub fn load_snapshots(imports: &[ImportSpec]) -> Result<Vec<VersionSnapshot>> {
    imports
        .iter()
        .map(|import| load_snapshot(&import.version, &import.path))
        .collect()
}

fn load_snapshot(version: &str, path: &Path) -> Result<VersionSnapshot> {
    let import_error = |message: String| DocsError::VersionImport {
        path: path.to_path_buf(),
        message,
    };
    let text = fs::read_to_string(path).map_err(|error| import_error(error.to_string()))?;
    let value: Value = serde_json::from_str(&text).map_err(|error| import_error(error.to_string()))?;

    let classes = match value.get("classes") {
        Some(Value::Array(rendered)) => from_rendered(rendered),
        Some(classes @ Value::Object(_)) => {
            serde_json::from_value(classes.clone()).map_err(|error| import_error(error.to_string()))?
        }
        Some(_) => return Err(import_error("`classes` must be an object or an array".to_string())),
        None => serde_json::from_value(value).map_err(|error| import_error(error.to_string()))?,
    };
    tracing::debug!(version, path = %path.display(), "imported version snapshot");
    Ok(VersionSnapshot {
        version: version.to_string(),
        classes,
    })
}

/// Member ids (and method params) out of previously rendered output.
fn from_rendered(classes: &[Value]) -> IndexMap<String, IndexMap<String, SnapshotEntry>> {
    let mut out = IndexMap::new();
    for class in classes {
        let Some(name) = class.get("name").and_then(Value::as_str) else {
            continue;
        };
        let mut members = IndexMap::new();
        let groups = ["members", "statics"]
            .into_iter()
            .filter_map(|key| class.get(key).and_then(Value::as_object));
        for group in groups {
            for member in group.values().filter_map(Value::as_array).flatten() {
                let Some(id) = member.get("id").and_then(Value::as_str) else {
                    continue;
                };
                let params = member.get("params").and_then(Value::as_array);
                let entry = match params {
                    Some(params) => SnapshotEntry::Params(
                        params
                            .iter()
                            .filter_map(|p| p.get("name").and_then(Value::as_str))
                            .map(str::to_string)
                            .collect(),
                    ),
                    None if id.contains("method-") => SnapshotEntry::Params(Vec::new()),
                    None => SnapshotEntry::Present(true),
                };
                members.insert(id.to_string(), entry);
            }
        }
        out.insert(name.to_string(), members);
    }
    out
}

pub struct Versions;

impl Pass for Versions {
    fn name(&self) -> &'static str {
        "versions"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.versions
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let snapshots = ctx.snapshots;
        if snapshots.is_empty() {
            tracing::debug!("no version snapshots imported");
            return Ok(0);
        }
        let current = ctx.config.current_version.as_str();
        let mut touched = 0;
        for class in relations.classes_mut() {
            let first = snapshots.iter().find(|s| s.has_class(&class.name));
            if class.since.is_none() {
                class.since = Some(first.map_or(current, |s| s.version.as_str()).to_string());
                touched += 1;
            }
            if first.is_none() && !class.new {
                class.new = true;
            }
            for member in &mut class.members {
                touched += usize::from(tag_member(member, &class.name, snapshots, current));
            }
        }
        Ok(touched)
    }
}

fn tag_member(member: &mut Member, class: &str, snapshots: &[VersionSnapshot], current: &str) -> bool {
    let entries: Vec<(&str, &SnapshotEntry)> = snapshots
        .iter()
        .filter_map(|s| s.entry(class, &member.id).map(|entry| (s.version.as_str(), entry)))
        .collect();
    if member.since.is_some() {
        return false;
    }
    let since = entries.first().map_or(current, |(version, _)| *version).to_string();
    if entries.is_empty() {
        member.new = true;
    }

    if member.tagname == Tagname::Method || member.tagname == Tagname::Event {
        for (index, param) in member.params.iter_mut().enumerate() {
            if param.since.is_some() {
                continue;
            }
            let first = entries.iter().find(|(_, entry)| entry.has_param(index));
            let param_since = first.map_or(current, |(version, _)| *version);
            if param_since != since {
                param.since = Some(param_since.to_string());
                param.new = first.is_none();
            }
        }
    }
    member.since = Some(since);
    true
}
