//! Normalized code-node shape handed from the parser adapters to the detector.
//!
//! Adapters lower whatever follows a doc comment into these owned nodes so the
//! detector never depends on a particular parser's AST or its arena lifetime.

use serde::{Deserialize, Serialize};

/// Syntactic kind of a scalar literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    Null,
    Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Decoded value (string contents without quotes, number text, ...).
    pub value: String,
    /// Exact source text.
    pub raw: String,
}

/// Which class-body block an object property sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Plain,
    /// `config`, `cachedConfig` or `eventedConfig`.
    Config,
    Statics,
    InheritableStatics,
}

impl Section {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "config" | "cachedConfig" | "eventedConfig" => Some(Section::Config),
            "statics" => Some(Section::Statics),
            "inheritableStatics" => Some(Section::InheritableStatics),
            _ => None,
        }
    }
}

/// Facts statically scanned from a function body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFacts {
    /// Event names passed to `this.fireEvent('x')`, de-duplicated, in order.
    pub fires: Vec<String>,
    /// Names of `this.foo()` calls, de-duplicated, in order.
    pub method_calls: Vec<String>,
    /// The body ends with `return this;`.
    pub returns_this: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: BodyFacts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub key: String,
    pub value: CodeNode,
    pub section: Section,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeNode {
    Call {
        /// Dotted callee chain, when the callee is one.
        callee: Option<String>,
        args: Vec<CodeNode>,
    },
    Function(FunctionNode),
    Assignment {
        /// Dotted left-hand chain, e.g. `this.foo` or `Foo.Bar`.
        target: String,
        value: Box<CodeNode>,
    },
    Declaration {
        name: String,
        value: Option<Box<CodeNode>>,
    },
    Property(Box<PropertyNode>),
    Object {
        props: Vec<PropertyNode>,
        raw: String,
    },
    Array {
        items: Vec<CodeNode>,
        raw: String,
    },
    Literal(Literal),
    /// Identifier or dotted member chain.
    Identifier(String),
    /// CSS `$name: value;` declaration.
    CssVariable {
        name: String,
        value: String,
    },
    /// CSS `@mixin name(...)` declaration.
    CssMixin {
        name: String,
        params: Vec<(String, Option<String>)>,
    },
    Other,
}

impl CodeNode {
    pub fn string_value(&self) -> Option<&str> {
        match self {
            CodeNode::Literal(Literal {
                kind: LiteralKind::String,
                value,
                ..
            }) => Some(value),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(
            self,
            CodeNode::Literal(Literal {
                kind: LiteralKind::Boolean,
                value,
                ..
            }) if value == "true"
        )
    }
}

/// Last segment of a dotted chain: `this.foo.bar` → `bar`.
pub fn innermost(chain: &str) -> &str {
    chain.rsplit('.').next().unwrap_or(chain)
}

/// Drop a leading `this.` from a chain.
pub fn strip_this(chain: &str) -> &str {
    chain.strip_prefix("this.").unwrap_or(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_helpers() {
        assert_eq!(innermost("Foo.bar.baz"), "baz");
        assert_eq!(innermost("baz"), "baz");
        assert_eq!(strip_this("this.foo"), "foo");
        assert_eq!(strip_this("Foo.this"), "Foo.this");
    }
}
