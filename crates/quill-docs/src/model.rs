use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::code::BodyFacts;

/// Kind of a documented entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tagname {
    Class,
    Method,
    Property,
    Event,
    Cfg,
    CssVar,
    CssMixin,
}

impl Tagname {
    /// Member kinds in the order exporters list them.
    pub const MEMBER_KINDS: [Tagname; 6] = [
        Tagname::Cfg,
        Tagname::Property,
        Tagname::Method,
        Tagname::Event,
        Tagname::CssVar,
        Tagname::CssMixin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tagname::Class => "class",
            Tagname::Method => "method",
            Tagname::Property => "property",
            Tagname::Event => "event",
            Tagname::Cfg => "cfg",
            Tagname::CssVar => "css_var",
            Tagname::CssMixin => "css_mixin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "class" => Some(Tagname::Class),
            "method" => Some(Tagname::Method),
            "property" => Some(Tagname::Property),
            "event" => Some(Tagname::Event),
            "cfg" => Some(Tagname::Cfg),
            "css_var" => Some(Tagname::CssVar),
            "css_mixin" => Some(Tagname::CssMixin),
            _ => None,
        }
    }
}

impl fmt::Display for Tagname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File-system path (or virtual path) of the file.
    pub path: String,
    /// One-based line index.
    pub line: u32,
}

impl SourceLocation {
    pub fn new(path: impl Into<String>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// A method/event parameter, or a nested sub-property of a cfg/param/return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub doc: String,
    #[serde(skip_serializing_if = "is_false", default)]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub properties: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub new: bool,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when the param carries anything beyond what code alone can tell.
    pub fn is_documented(&self) -> bool {
        !self.doc.is_empty() || self.type_.is_some() || !self.properties.is_empty()
    }
}

/// Documented return value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Return {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub doc: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub properties: Vec<Param>,
}

/// Documented exception.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Throws {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub doc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deprecated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
}

/// Reference to a member written as `Class#[static-][kind-]name`.
///
/// Every part is optional: `#foo` points into the current class, `Foo` alone
/// points at the same-named member of class `Foo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagname: Option<Tagname>,
    #[serde(rename = "static", skip_serializing_if = "is_false", default)]
    pub static_: bool,
}

impl MemberLink {
    /// Parse `Class#static-method-name`. An empty string yields an empty link.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (class, member) = match text.split_once('#') {
            Some((class, member)) => (class, Some(member)),
            None => (text, None),
        };
        let mut link = MemberLink {
            class: (!class.is_empty()).then(|| class.to_string()),
            ..MemberLink::default()
        };
        let Some(mut member) = member else {
            return link;
        };
        if let Some(rest) = member.strip_prefix("static-") {
            link.static_ = true;
            member = rest;
        }
        if let Some((kind, rest)) = member.split_once('-') {
            if let Some(tagname) = Tagname::parse(kind) {
                link.tagname = Some(tagname);
                member = rest;
            }
        }
        if !member.is_empty() {
            link.member = Some(member.to_string());
        }
        link
    }
}

/// A member of another class that this member shadows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverrideRef {
    pub owner: String,
    pub id: String,
}

/// Canonical member record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub tagname: Tagname,
    pub id: String,
    pub name: String,
    pub owner: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub doc: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub params: Vec<Param>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_: Option<Return>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub throws: Vec<Throws>,
    /// Sub-properties of a cfg or property.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub properties: Vec<Param>,
    #[serde(rename = "static", skip_serializing_if = "is_false", default)]
    pub static_: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub inheritable: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub private: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub protected: bool,
    #[serde(rename = "abstract", skip_serializing_if = "is_false", default)]
    pub abstract_: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub readonly: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub writeonly: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub template: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub chainable: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub preventable: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub hide: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub accessor: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub autodetected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localdoc: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub meta: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritdoc: Option<MemberLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<MemberLink>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fires: Vec<String>,
    #[serde(skip)]
    pub explicit_fires: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub method_calls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub overrides: Vec<OverrideRef>,
    /// Facts scanned from the method body, consumed by the fires pass.
    #[serde(skip)]
    pub body: Option<BodyFacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Member {
    pub fn new(tagname: Tagname, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            tagname,
            id: member_id(tagname, &name, false),
            name,
            owner: String::new(),
            doc: String::new(),
            type_: None,
            default: None,
            params: Vec::new(),
            return_: None,
            throws: Vec::new(),
            properties: Vec::new(),
            static_: false,
            inheritable: false,
            private: false,
            protected: false,
            abstract_: false,
            readonly: false,
            writeonly: false,
            template: false,
            chainable: false,
            required: false,
            preventable: false,
            hide: false,
            accessor: false,
            autodetected: false,
            deprecated: None,
            localdoc: None,
            meta: IndexMap::new(),
            since: None,
            new: false,
            inheritdoc: None,
            alias: None,
            fires: Vec::new(),
            explicit_fires: false,
            method_calls: Vec::new(),
            overrides: Vec::new(),
            body: None,
            location: None,
        }
    }

    /// Recompute `id` after `tagname`, `name` or `static_` changed.
    pub fn refresh_id(&mut self) {
        self.id = member_id(self.tagname, &self.name, self.static_);
    }

    pub fn is_public(&self) -> bool {
        !self.private && !self.hide
    }
}

/// `static-` prefix (for statics) + tagname + `-` + name.
pub fn member_id(tagname: Tagname, name: &str, static_: bool) -> String {
    if static_ {
        format!("static-{}-{}", tagname, name)
    } else {
        format!("{}-{}", tagname, name)
    }
}

/// Index of a class inside the [`crate::relations::Relations`] arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Aggregated class entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Handle into the owning relations arena; assigned when indexed.
    #[serde(skip)]
    pub id: ClassId,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub doc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub mixins: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternate_class_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub uses: Vec<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub singleton: bool,
    #[serde(skip_serializing_if = "is_false", default)]
    pub private: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_: Option<EnumInfo>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub component: bool,
    /// Declared through a framework factory call (`Ext.define` and friends).
    #[serde(skip_serializing_if = "is_false", default)]
    pub framework: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub meta: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub new: bool,
    /// Set by `@ignore`; the aggregator drops such classes.
    #[serde(skip)]
    pub ignore: bool,
    pub members: Vec<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Instance members of one kind, in declaration order.
    pub fn members_of(&self, tagname: Tagname) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(move |m| m.tagname == tagname && !m.static_)
    }

    /// Static members of one kind, in declaration order.
    pub fn statics_of(&self, tagname: Tagname) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(move |m| m.tagname == tagname && m.static_)
    }

    pub fn find_local(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.members.iter().position(|m| m.id == id)
    }

    /// All names this class answers to.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alternate_class_names.iter().map(String::as_str))
    }
}

/// Append `value` unless already present, keeping first-seen order.
pub(crate) fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !list.contains(&value) {
        list.push(value);
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_ids_carry_static_prefix() {
        assert_eq!(member_id(Tagname::Method, "foo", false), "method-foo");
        assert_eq!(member_id(Tagname::Cfg, "bar", true), "static-cfg-bar");
        assert_eq!(member_id(Tagname::CssVar, "$x", false), "css_var-$x");
    }

    #[test]
    fn parses_member_links() {
        let link = MemberLink::parse("Foo.Bar#static-method-baz");
        assert_eq!(link.class.as_deref(), Some("Foo.Bar"));
        assert_eq!(link.member.as_deref(), Some("baz"));
        assert_eq!(link.tagname, Some(Tagname::Method));
        assert!(link.static_);

        let link = MemberLink::parse("#on-click");
        assert_eq!(link.class, None);
        assert_eq!(link.member.as_deref(), Some("on-click"));
        assert_eq!(link.tagname, None);

        let link = MemberLink::parse("Foo");
        assert_eq!(link.class.as_deref(), Some("Foo"));
        assert_eq!(link.member, None);
    }
}
