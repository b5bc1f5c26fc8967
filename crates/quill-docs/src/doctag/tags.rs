//! The table of recognised `@tags` and the argument shape each one takes.

/// Which parts the standard sub-parser looks for after the tag name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StdShape {
    pub type_: bool,
    pub name: bool,
    /// `[name]` brackets and `(optional)` / `(required)` markers.
    pub optional: bool,
    pub default: bool,
}

impl StdShape {
    const fn new(type_: bool, name: bool, optional: bool, default: bool) -> Self {
        Self {
            type_,
            name,
            optional,
            default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// Flag tag; the rest of the line becomes its doc.
    None,
    Standard(StdShape),
    /// One whitespace-delimited reference token (class name, `Class#member`, alias).
    Ref,
    /// Whitespace or comma separated names up to the end of the line.
    Names,
    /// Optional leading version number.
    Version,
    /// `@constructor`: a method named `constructor`.
    Constructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDef {
    /// Spelling after `@`.
    pub name: &'static str,
    /// Name recorded on the tag record.
    pub canonical: &'static str,
    pub arg: Arg,
    /// Capture text up to the next tag instead of the rest of the line.
    pub multiline: bool,
}

const fn def(name: &'static str, canonical: &'static str, arg: Arg, multiline: bool) -> TagDef {
    TagDef {
        name,
        canonical,
        arg,
        multiline,
    }
}

const NAME: Arg = Arg::Standard(StdShape::new(false, true, false, false));
const TYPE: Arg = Arg::Standard(StdShape::new(true, false, false, false));
const TYPE_NAME: Arg = Arg::Standard(StdShape::new(true, true, false, false));
const FULL: Arg = Arg::Standard(StdShape::new(true, true, true, true));

pub const TAGS: &[TagDef] = &[
    // class level
    def("class", "class", Arg::Ref, true),
    def("extends", "extends", Arg::Ref, false),
    def("extend", "extends", Arg::Ref, false),
    def("mixins", "mixins", Arg::Names, false),
    def("alternateClassNames", "alternateClassNames", Arg::Names, false),
    def("alternateClassName", "alternateClassNames", Arg::Names, false),
    def("requires", "requires", Arg::Names, false),
    def("uses", "uses", Arg::Names, false),
    def("singleton", "singleton", Arg::None, false),
    def("xtype", "xtype", Arg::Ref, false),
    def("enum", "enum", TYPE_NAME, true),
    // members
    def("method", "method", NAME, true),
    def("function", "method", NAME, true),
    def("constructor", "method", Arg::Constructor, true),
    def("event", "event", NAME, true),
    def("cfg", "cfg", FULL, true),
    def("property", "property", FULL, true),
    def("type", "type", TYPE, false),
    def("param", "param", FULL, true),
    def("return", "return", TYPE, true),
    def("returns", "return", TYPE, true),
    def("throws", "throws", TYPE, true),
    def("fires", "fires", Arg::Names, false),
    // css
    def("var", "var", Arg::Standard(StdShape::new(true, true, true, true)), true),
    def("mixin", "mixin", NAME, true),
    // modifiers
    def("static", "static", Arg::None, false),
    def("inheritable", "inheritable", Arg::None, false),
    def("private", "private", Arg::None, false),
    def("protected", "protected", Arg::None, false),
    def("abstract", "abstract", Arg::None, false),
    def("readonly", "readonly", Arg::None, false),
    def("writeonly", "writeonly", Arg::None, false),
    def("template", "template", Arg::None, false),
    def("chainable", "chainable", Arg::None, false),
    def("new", "new", Arg::None, false),
    def("accessor", "accessor", Arg::None, false),
    def("preventable", "preventable", Arg::None, false),
    def("hide", "hide", Arg::None, false),
    def("ignore", "ignore", Arg::None, false),
    def("localdoc", "localdoc", Arg::None, true),
    def("deprecated", "deprecated", Arg::Version, true),
    def("since", "since", Arg::Version, false),
    // references
    def("alias", "alias", Arg::Ref, false),
    def("inheritdoc", "inheritdoc", Arg::Ref, false),
    def("inheritDoc", "inheritdoc", Arg::Ref, false),
    def("member", "member", Arg::Ref, false),
];

/// Tags that make the doc-comment describe a class.
pub const CLASS_TAGS: &[&str] = &[
    "class",
    "extends",
    "mixins",
    "alternateClassNames",
    "singleton",
    "requires",
    "uses",
    "xtype",
    "enum",
];

/// Tags whose text is kept verbatim in the `meta` map.
#[derive(Debug, Clone, Default)]
pub struct MetaTagRegistry {
    names: Vec<String>,
}

impl MetaTagRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Built-in definition for a spelling.
pub fn lookup(name: &str) -> Option<&'static TagDef> {
    TAGS.iter().find(|tag| tag.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_canonical_names() {
        assert_eq!(lookup("function").map(|t| t.canonical), Some("method"));
        assert_eq!(lookup("returns").map(|t| t.canonical), Some("return"));
        assert_eq!(lookup("extend").map(|t| t.canonical), Some("extends"));
        assert!(lookup("bogus").is_none());
    }

    #[test]
    fn spellings_are_unique() {
        for (i, tag) in TAGS.iter().enumerate() {
            assert!(
                TAGS[i + 1..].iter().all(|other| other.name != tag.name),
                "duplicate tag spelling @{}",
                tag.name
            );
        }
    }
}
