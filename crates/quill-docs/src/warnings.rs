//! Suppressible, categorised warnings.
//!
//! Warnings are collected per run. Each one is checked against an ordered list
//! of `[+|-]kind[:path-prefix]` rules where the last matching rule wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DocsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnKind {
    Tag,
    Nodoc,
    Global,
    Link,
    TypeSyntax,
    TypeName,
    Inheritdoc,
    Alias,
    Subproperty,
    NameMissing,
    DupMember,
    MemberClass,
    Parse,
    Extend,
    Enum,
}

impl WarnKind {
    pub const ALL: [WarnKind; 15] = [
        WarnKind::Tag,
        WarnKind::Nodoc,
        WarnKind::Global,
        WarnKind::Link,
        WarnKind::TypeSyntax,
        WarnKind::TypeName,
        WarnKind::Inheritdoc,
        WarnKind::Alias,
        WarnKind::Subproperty,
        WarnKind::NameMissing,
        WarnKind::DupMember,
        WarnKind::MemberClass,
        WarnKind::Parse,
        WarnKind::Extend,
        WarnKind::Enum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WarnKind::Tag => "tag",
            WarnKind::Nodoc => "nodoc",
            WarnKind::Global => "global",
            WarnKind::Link => "link",
            WarnKind::TypeSyntax => "type_syntax",
            WarnKind::TypeName => "type_name",
            WarnKind::Inheritdoc => "inheritdoc",
            WarnKind::Alias => "alias",
            WarnKind::Subproperty => "subproperty",
            WarnKind::NameMissing => "name_missing",
            WarnKind::DupMember => "dup_member",
            WarnKind::MemberClass => "member_class",
            WarnKind::Parse => "parse",
            WarnKind::Extend => "extend",
            WarnKind::Enum => "enum",
        }
    }
}

impl fmt::Display for WarnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarnKind {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WarnKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DocsError::Config {
                message: format!("unknown warning type '{s}'"),
            })
    }
}

/// One emitted warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarnKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, self.line) {
            (Some(path), Some(line)) => write!(f, "{path}:{line}: {}: {}", self.kind, self.message),
            (Some(path), None) => write!(f, "{path}: {}: {}", self.kind, self.message),
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Parsed `[+|-]kind[:path-prefix]` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarnRule {
    pub enable: bool,
    /// `None` means every kind.
    pub kind: Option<WarnKind>,
    pub path_prefix: Option<String>,
}

impl WarnRule {
    fn matches(&self, kind: WarnKind, path: Option<&str>) -> bool {
        if self.kind.is_some_and(|k| k != kind) {
            return false;
        }
        match (&self.path_prefix, path) {
            (None, _) => true,
            (Some(prefix), Some(path)) => path.starts_with(prefix.as_str()),
            (Some(_), None) => false,
        }
    }
}

impl FromStr for WarnRule {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (enable, rest) = match s.as_bytes().first() {
            Some(b'+') => (true, &s[1..]),
            Some(b'-') => (false, &s[1..]),
            _ => (true, s),
        };
        let (name, path_prefix) = match rest.split_once(':') {
            Some((name, path)) if !path.is_empty() => (name, Some(path.to_string())),
            Some((name, _)) => (name, None),
            None => (rest, None),
        };
        let kind = match name {
            "all" => None,
            other => Some(other.parse()?),
        };
        Ok(WarnRule {
            enable,
            kind,
            path_prefix,
        })
    }
}

/// Warning sink threaded through one run.
#[derive(Debug, Clone)]
pub struct Warnings {
    rules: Vec<WarnRule>,
    emitted: Vec<Warning>,
}

impl Default for Warnings {
    fn default() -> Self {
        Self {
            rules: vec![WarnRule {
                enable: false,
                kind: Some(WarnKind::Nodoc),
                path_prefix: None,
            }],
            emitted: Vec::new(),
        }
    }
}

impl Warnings {
    /// Default rules followed by the given rule strings.
    pub fn with_rules<I, S>(rules: I) -> Result<Self, DocsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut warnings = Warnings::default();
        for rule in rules {
            warnings.rules.push(rule.as_ref().parse()?);
        }
        Ok(warnings)
    }

    pub fn is_enabled(&self, kind: WarnKind, path: Option<&str>) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(kind, path))
            .is_none_or(|rule| rule.enable)
    }

    pub fn warn(&mut self, kind: WarnKind, message: impl Into<String>) {
        self.push(Warning {
            kind,
            message: message.into(),
            path: None,
            line: None,
        });
    }

    pub fn warn_at(&mut self, kind: WarnKind, message: impl Into<String>, path: &str, line: u32) {
        self.push(Warning {
            kind,
            message: message.into(),
            path: Some(path.to_string()),
            line: Some(line),
        });
    }

    pub fn push(&mut self, warning: Warning) {
        if !self.is_enabled(warning.kind, warning.path.as_deref()) {
            return;
        }
        tracing::warn!("{}", warning);
        self.emitted.push(warning);
    }

    /// Append warnings collected (and already logged) by a forked sink.
    pub fn extend(&mut self, other: Vec<Warning>) {
        let enabled: Vec<Warning> = other
            .into_iter()
            .filter(|w| self.is_enabled(w.kind, w.path.as_deref()))
            .collect();
        self.emitted.extend(enabled);
    }

    /// Fresh sink with the same rules and nothing emitted.
    pub fn fork(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            emitted: Vec::new(),
        }
    }

    pub fn emitted(&self) -> &[Warning] {
        &self.emitted
    }

    pub fn into_emitted(self) -> Vec<Warning> {
        self.emitted
    }

    pub fn count(&self, kind: WarnKind) -> usize {
        self.emitted.iter().filter(|w| w.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodoc_is_off_by_default() {
        let mut warnings = Warnings::default();
        warnings.warn(WarnKind::Nodoc, "missing");
        warnings.warn(WarnKind::Tag, "unknown tag");
        assert_eq!(warnings.emitted().len(), 1);
        assert_eq!(warnings.emitted()[0].kind, WarnKind::Tag);
    }

    #[test]
    fn last_matching_rule_wins() {
        let warnings = Warnings::with_rules(["-all", "+tag:src/app"]).unwrap();
        assert!(warnings.is_enabled(WarnKind::Tag, Some("src/app/Foo.js")));
        assert!(!warnings.is_enabled(WarnKind::Tag, Some("src/lib/Foo.js")));
        assert!(!warnings.is_enabled(WarnKind::Link, Some("src/app/Foo.js")));
    }

    #[test]
    fn rejects_unknown_kinds() {
        assert!(Warnings::with_rules(["-bogus"]).is_err());
    }

    #[test]
    fn path_scoped_rule_ignores_pathless_warnings() {
        let mut warnings = Warnings::with_rules(["-global:vendor/"]).unwrap();
        warnings.warn(WarnKind::Global, "no path");
        warnings.warn_at(WarnKind::Global, "in vendor", "vendor/x.js", 3);
        assert_eq!(warnings.count(WarnKind::Global), 1);
        assert_eq!(warnings.emitted()[0].path, None);
    }
}
