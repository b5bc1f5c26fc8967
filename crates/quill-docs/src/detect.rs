//! Code-shape detection.
//!
//! [`Detector::detect`] runs an ordered table of matchers over the code node
//! following a doc-comment. The first matcher that recognises the node wins;
//! anything unrecognised becomes an unnamed property.

use crate::associate::css;
use crate::code::{BodyFacts, CodeNode, Literal, LiteralKind, PropertyNode, Section, innermost, strip_this};
use crate::model::{Tagname, push_unique};

/// Facts about a class declared in code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassShape {
    pub name: Option<String>,
    pub extends: Option<String>,
    pub mixins: Vec<String>,
    pub requires: Vec<String>,
    pub uses: Vec<String>,
    pub alternate_class_names: Vec<String>,
    pub aliases: Vec<String>,
    pub singleton: bool,
    /// Declared through a factory call such as `Ext.define`.
    pub framework: bool,
    /// Members found in the class body without their own doc-comment.
    pub members: Vec<MemberShape>,
}

/// Facts about a member-like construct.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
    pub tagname: Tagname,
    pub name: Option<String>,
    /// Dotted chain the name was taken from, before normalisation.
    pub chain: Option<String>,
    pub params: Vec<MemberParam>,
    pub type_: Option<String>,
    pub default: Option<String>,
    pub static_: bool,
    pub inheritable: bool,
    pub accessor: bool,
    pub chainable: bool,
    pub body: Option<BodyFacts>,
    /// Own properties of an object-literal value, for enums.
    pub values: Vec<MemberShape>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberParam {
    pub name: String,
    pub default: Option<String>,
}

impl MemberShape {
    pub fn new(tagname: Tagname, name: Option<String>) -> Self {
        Self {
            tagname,
            name,
            chain: None,
            params: Vec::new(),
            type_: None,
            default: None,
            static_: false,
            inheritable: false,
            accessor: false,
            chainable: false,
            body: None,
            values: Vec::new(),
        }
    }

    fn in_section(mut self, section: Section) -> Self {
        match section {
            Section::Plain => {}
            Section::Config => {
                if self.tagname == Tagname::Property {
                    self.tagname = Tagname::Cfg;
                    self.accessor = true;
                }
            }
            Section::Statics => self.static_ = true,
            Section::InheritableStatics => {
                self.static_ = true;
                self.inheritable = true;
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeShape {
    Class(ClassShape),
    Member(MemberShape),
}

impl CodeShape {
    pub fn tagname(&self) -> Tagname {
        match self {
            CodeShape::Class(_) => Tagname::Class,
            CodeShape::Member(member) => member.tagname,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CodeShape::Class(class) => class.name.as_deref(),
            CodeShape::Member(member) => member.name.as_deref(),
        }
    }

    fn unnamed() -> Self {
        CodeShape::Member(MemberShape::new(Tagname::Property, None))
    }
}

type Matcher = fn(&Detector, &CodeNode) -> Option<CodeShape>;

/// Priority order; first match wins.
const MATCHERS: &[Matcher] = &[
    Detector::factory_class,
    Detector::function,
    Detector::method_property,
    Detector::literal_value,
    Detector::event,
    Detector::css,
    Detector::named,
];

/// Shape detector for one run.
#[derive(Debug, Clone)]
pub struct Detector {
    /// Namespaces whose `define`/`extend`/`ClassManager.create` declare classes.
    namespaces: Vec<String>,
}

impl Detector {
    pub fn new(namespaces: &[String]) -> Self {
        Self {
            namespaces: namespaces.to_vec(),
        }
    }

    pub fn detect(&self, code: Option<&CodeNode>) -> CodeShape {
        let Some(code) = code else {
            return CodeShape::unnamed();
        };
        MATCHERS
            .iter()
            .find_map(|matcher| matcher(self, code))
            .unwrap_or_else(CodeShape::unnamed)
    }

    fn is_factory(&self, callee: &str, method: &str) -> bool {
        self.namespaces.iter().any(|ns| {
            callee
                .strip_prefix(ns.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|rest| rest == method)
        })
    }

    fn is_empty_fn(&self, chain: &str) -> bool {
        self.is_factory(chain, "emptyFn")
    }

    fn factory_class(&self, node: &CodeNode) -> Option<CodeShape> {
        let (bound, call) = match node {
            CodeNode::Assignment { target, value } => (Some(strip_this(target)), value.as_ref()),
            CodeNode::Declaration { name, value: Some(value) } => (Some(name.as_str()), value.as_ref()),
            other => (None, other),
        };
        let CodeNode::Call { callee: Some(callee), args } = call else {
            return None;
        };

        let mut shape = ClassShape {
            framework: true,
            ..ClassShape::default()
        };
        let body = if self.is_factory(callee, "define") || self.is_factory(callee, "ClassManager.create") {
            shape.name = args
                .first()
                .and_then(CodeNode::string_value)
                .map(str::to_string)
                .or_else(|| bound.map(str::to_string));
            args.get(1)
        } else if self.is_factory(callee, "extend") {
            match bound {
                // Foo = Ext.extend(Parent, {...})
                Some(name) => {
                    shape.name = Some(name.to_string());
                    shape.extends = args.first().and_then(class_ref);
                    args.get(1)
                }
                // Ext.extend(Foo, Parent, {...})
                None => {
                    shape.name = args.first().and_then(class_ref);
                    shape.extends = args.get(1).and_then(class_ref);
                    args.get(2)
                }
            }
        } else {
            return None;
        };

        if let Some(CodeNode::Object { props, .. }) = body {
            self.read_class_body(&mut shape, props);
        }
        Some(CodeShape::Class(shape))
    }

    fn read_class_body(&self, shape: &mut ClassShape, props: &[PropertyNode]) {
        for prop in props {
            match prop.key.as_str() {
                "extend" => {
                    if shape.extends.is_none() {
                        shape.extends = prop.value.string_value().map(str::to_string);
                    }
                }
                "mixins" => match &prop.value {
                    CodeNode::Object { props: entries, .. } => {
                        for entry in entries {
                            if let Some(mixin) = entry.value.string_value() {
                                push_unique(&mut shape.mixins, mixin);
                            }
                        }
                    }
                    other => string_list(other, &mut shape.mixins),
                },
                "singleton" => shape.singleton = prop.value.is_true(),
                "requires" => string_list(&prop.value, &mut shape.requires),
                "uses" => string_list(&prop.value, &mut shape.uses),
                "alternateClassName" => string_list(&prop.value, &mut shape.alternate_class_names),
                "alias" => string_list(&prop.value, &mut shape.aliases),
                "xtype" => {
                    let mut xtypes = Vec::new();
                    string_list(&prop.value, &mut xtypes);
                    for xtype in xtypes {
                        push_unique(&mut shape.aliases, format!("widget.{xtype}"));
                    }
                }
                key => {
                    if let (Some(section), CodeNode::Object { props: entries, .. }) =
                        (Section::from_key(key), &prop.value)
                    {
                        for entry in entries {
                            if let Some(member) = self.section_member(entry, section) {
                                shape.members.push(member);
                            }
                        }
                    } else {
                        let node = CodeNode::Property(Box::new(prop.clone()));
                        if let Some(CodeShape::Member(member)) = self.method_property(&node) {
                            shape.members.push(member);
                        }
                    }
                }
            }
        }
    }

    fn section_member(&self, entry: &PropertyNode, section: Section) -> Option<MemberShape> {
        let node = CodeNode::Property(Box::new(PropertyNode {
            section,
            ..entry.clone()
        }));
        let shape = self
            .method_property(&node)
            .or_else(|| self.literal_value(&node))
            .or_else(|| (section == Section::Config).then(|| self.named(&node)).flatten())?;
        match shape {
            CodeShape::Member(member) => Some(member),
            CodeShape::Class(_) => None,
        }
    }

    fn function(&self, node: &CodeNode) -> Option<CodeShape> {
        let (chain, func) = match node {
            CodeNode::Function(func) => (func.name.clone()?, func),
            CodeNode::Assignment { target, value } => match value.as_ref() {
                CodeNode::Function(func) => (strip_this(target).to_string(), func),
                _ => return None,
            },
            CodeNode::Declaration { name, value: Some(value) } => match value.as_ref() {
                CodeNode::Function(func) => (name.clone(), func),
                _ => return None,
            },
            _ => return None,
        };
        let short = innermost(&chain);
        if short.chars().next().is_some_and(char::is_uppercase) {
            return Some(CodeShape::Class(ClassShape {
                name: Some(chain),
                ..ClassShape::default()
            }));
        }
        let mut member = MemberShape::new(Tagname::Method, Some(short.to_string()));
        member.params = plain_params(&func.params);
        member.chainable = func.body.returns_this;
        member.body = Some(func.body.clone());
        member.chain = Some(chain);
        Some(CodeShape::Member(member))
    }

    fn method_property(&self, node: &CodeNode) -> Option<CodeShape> {
        let CodeNode::Property(prop) = node else {
            return None;
        };
        let mut member = MemberShape::new(Tagname::Method, Some(prop.key.clone()));
        match &prop.value {
            CodeNode::Function(func) => {
                member.params = plain_params(&func.params);
                member.chainable = func.body.returns_this;
                member.body = Some(func.body.clone());
            }
            CodeNode::Identifier(chain) if self.is_empty_fn(chain) => {
                member.body = Some(BodyFacts::default());
            }
            _ => return None,
        }
        Some(CodeShape::Member(member.in_section(prop.section)))
    }

    fn literal_value(&self, node: &CodeNode) -> Option<CodeShape> {
        let (name, chain, value, section) = match node {
            CodeNode::Property(prop) => (prop.key.clone(), prop.key.clone(), &prop.value, prop.section),
            CodeNode::Assignment { target, value } => {
                let chain = strip_this(target);
                (innermost(chain).to_string(), chain.to_string(), value.as_ref(), Section::Plain)
            }
            CodeNode::Declaration { name, value: Some(value) } => {
                (name.clone(), name.clone(), value.as_ref(), Section::Plain)
            }
            _ => return None,
        };
        let (type_, default) = literal_facts(value)?;
        let mut member = MemberShape::new(Tagname::Property, Some(name));
        member.type_ = type_;
        member.default = Some(default);
        member.chain = Some(chain);
        if let CodeNode::Object { props, .. } = value {
            member.values = props
                .iter()
                .filter_map(|prop| match literal_facts(&prop.value) {
                    Some((type_, default)) => {
                        let mut value = MemberShape::new(Tagname::Property, Some(prop.key.clone()));
                        value.type_ = type_;
                        value.default = Some(default);
                        Some(value)
                    }
                    None => None,
                })
                .collect();
        }
        Some(CodeShape::Member(member.in_section(section)))
    }

    fn event(&self, node: &CodeNode) -> Option<CodeShape> {
        let name = match node {
            CodeNode::Literal(Literal {
                kind: LiteralKind::String,
                value,
                ..
            }) => value.clone(),
            CodeNode::Identifier(chain) => innermost(strip_this(chain)).to_string(),
            _ => return None,
        };
        Some(CodeShape::Member(MemberShape::new(Tagname::Event, Some(name))))
    }

    fn css(&self, node: &CodeNode) -> Option<CodeShape> {
        match node {
            CodeNode::CssVariable { name, value } => {
                let mut member = MemberShape::new(Tagname::CssVar, Some(name.clone()));
                member.type_ = css::guess_type(value).map(str::to_string);
                member.default = (!value.is_empty()).then(|| value.clone());
                Some(CodeShape::Member(member))
            }
            CodeNode::CssMixin { name, params } => {
                let mut member = MemberShape::new(Tagname::CssMixin, Some(name.clone()));
                member.params = params
                    .iter()
                    .map(|(name, default)| MemberParam {
                        name: name.clone(),
                        default: default.clone(),
                    })
                    .collect();
                Some(CodeShape::Member(member))
            }
            _ => None,
        }
    }

    /// Something with a name but no recognisable value.
    fn named(&self, node: &CodeNode) -> Option<CodeShape> {
        let (name, section) = match node {
            CodeNode::Property(prop) => (prop.key.clone(), prop.section),
            CodeNode::Assignment { target, .. } => (innermost(strip_this(target)).to_string(), Section::Plain),
            CodeNode::Declaration { name, .. } => (name.clone(), Section::Plain),
            _ => return None,
        };
        Some(CodeShape::Member(
            MemberShape::new(Tagname::Property, Some(name)).in_section(section),
        ))
    }
}

fn plain_params(names: &[String]) -> Vec<MemberParam> {
    names
        .iter()
        .map(|name| MemberParam {
            name: name.clone(),
            default: None,
        })
        .collect()
}

/// Class name from a string literal or identifier argument.
fn class_ref(node: &CodeNode) -> Option<String> {
    match node {
        CodeNode::Identifier(chain) => Some(chain.clone()),
        other => other.string_value().map(str::to_string),
    }
}

/// String or array of strings; anything else is dropped.
fn string_list(node: &CodeNode, out: &mut Vec<String>) {
    match node {
        CodeNode::Array { items, .. } => {
            for value in items.iter().filter_map(CodeNode::string_value) {
                push_unique(out, value);
            }
        }
        other => {
            if let Some(value) = other.string_value() {
                push_unique(out, value);
            }
        }
    }
}

/// Type name and exact source text of a literal value.
fn literal_facts(node: &CodeNode) -> Option<(Option<String>, String)> {
    match node {
        CodeNode::Literal(lit) => {
            let type_ = match lit.kind {
                LiteralKind::Number => Some("Number"),
                LiteralKind::String => Some("String"),
                LiteralKind::Boolean => Some("Boolean"),
                LiteralKind::Regex => Some("RegExp"),
                LiteralKind::Null => None,
            };
            Some((type_.map(str::to_string), lit.raw.clone()))
        }
        CodeNode::Array { raw, .. } => Some((Some("Array".to_string()), raw.clone())),
        CodeNode::Object { raw, .. } => Some((Some("Object".to_string()), raw.clone())),
        _ => None,
    }
}
