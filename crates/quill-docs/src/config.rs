//! Run configuration.
//!
//! Everything that used to be ambient state (warning rules, meta tags, the
//! framework namespaces) is carried here and threaded through the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One historical API snapshot to import for the versions pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub version: String,
    pub path: PathBuf,
}

impl ImportSpec {
    /// Parse `VERSION:PATH`.
    pub fn parse(spec: &str) -> Option<Self> {
        let (version, path) = spec.split_once(':')?;
        if version.is_empty() || path.is_empty() {
            return None;
        }
        Some(Self {
            version: version.to_string(),
            path: PathBuf::from(path),
        })
    }
}

/// Per-pass switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassOptions {
    pub accessors: bool,
    pub aliases: bool,
    pub overrides: bool,
    pub inherit_doc: bool,
    pub enums: bool,
    pub ext4_events: bool,
    pub fires: bool,
    pub versions: bool,
    pub type_check: bool,
    pub references: bool,
    pub defaults: bool,
    pub nodoc: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            accessors: true,
            aliases: true,
            overrides: true,
            inherit_doc: true,
            enums: true,
            ext4_events: true,
            fires: true,
            versions: true,
            type_check: true,
            references: true,
            defaults: true,
            nodoc: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Namespaces whose `define`/`extend`/`ClassManager.create` calls declare classes.
    pub ext_namespaces: Vec<String>,
    /// Force the implicit `eOpts` event parameter on or off for every class.
    /// Unset means framework-declared classes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext4_events: Option<bool>,
    /// Drop members that resolve to no class instead of collecting them in `global`.
    pub ignore_global: bool,
    /// Tags whose text is stored verbatim in `meta`.
    pub meta_tags: Vec<String>,
    /// Type names accepted by the type checker without a matching class.
    pub external_classes: Vec<String>,
    /// Warning rules, `[+|-]kind[:path-prefix]`.
    pub warnings: Vec<String>,
    /// Historical snapshots, oldest first.
    pub imports: Vec<ImportSpec>,
    /// Name of the version being generated.
    pub current_version: String,
    pub passes: PassOptions,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            ext_namespaces: vec!["Ext".to_string()],
            ext4_events: None,
            ignore_global: false,
            meta_tags: vec![
                "author".to_string(),
                "docauthor".to_string(),
                "see".to_string(),
            ],
            external_classes: Vec::new(),
            warnings: Vec::new(),
            imports: Vec::new(),
            current_version: "current".to_string(),
            passes: PassOptions::default(),
        }
    }
}
