//! Closure-compiler style type expressions as written inside `{...}` of doc tags.
//!
//! The parser is a plain recursive descent over the input. It both validates
//! the expression and builds an annotated copy where every recognised type name
//! is passed through a [`LinkResolver`]. Whitespace and punctuation are copied
//! verbatim.

use rustc_hash::FxHashSet;

/// Resolves a type name to a URL. Unresolved names render unlinked.
pub trait LinkResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> LinkResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

const BUILTIN_CLASSES: &[&str] = &[
    "Object",
    "String",
    "Number",
    "Boolean",
    "Array",
    "Function",
    "RegExp",
    "Date",
    "Error",
    "TypeError",
    "RangeError",
    "SyntaxError",
    "Arguments",
    "Math",
    "JSON",
    "Mixed",
    "HTMLElement",
    "Element",
    "Node",
    "NodeList",
    "TextNode",
    "Event",
    "XMLElement",
    "Window",
    "Document",
    "CSSStyleSheet",
    "CSSStyleRule",
    // SCSS value types
    "color",
    "length",
    "percentage",
    "list",
];

const PRIMITIVES: &[&str] = &["boolean", "number", "string", "null", "undefined", "void"];

/// Set of type names accepted by the parser.
#[derive(Debug, Clone)]
pub struct KnownTypes {
    names: FxHashSet<String>,
}

impl Default for KnownTypes {
    fn default() -> Self {
        Self {
            names: BUILTIN_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl KnownTypes {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known = Self::default();
        known.extend(names);
        known
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Outcome of parsing one type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMatch {
    pub matched: bool,
    /// Annotated rendering; the input verbatim when not matched.
    pub annotated: String,
    /// First identifier that failed the registry lookup, if that caused the failure.
    pub unknown_name: Option<String>,
}

pub struct TypeParser<'r> {
    known: &'r KnownTypes,
    resolver: Option<&'r dyn LinkResolver>,
}

impl<'r> TypeParser<'r> {
    pub fn new(known: &'r KnownTypes) -> Self {
        Self {
            known,
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: &'r dyn LinkResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn parse(&self, input: &str) -> TypeMatch {
        let mut scan = Scan {
            input,
            pos: 0,
            out: String::with_capacity(input.len()),
            known: self.known,
            resolver: self.resolver,
            unknown_name: None,
        };
        let matched = !input.trim().is_empty() && scan.top();
        TypeMatch {
            matched,
            annotated: if matched {
                scan.out
            } else {
                input.to_string()
            },
            unknown_name: if matched { None } else { scan.unknown_name },
        }
    }

    /// Shorthand for `parse(input).matched`.
    pub fn is_valid(&self, input: &str) -> bool {
        self.parse(input).matched
    }
}

struct Scan<'a, 'r> {
    input: &'a str,
    pos: usize,
    out: String,
    known: &'r KnownTypes,
    resolver: Option<&'r dyn LinkResolver>,
    unknown_name: Option<String>,
}

impl Scan<'_, '_> {
    fn top(&mut self) -> bool {
        self.ws();
        if !self.union() {
            return false;
        }
        self.ws();
        if self.peek() == Some('=') {
            self.bump();
            self.ws();
        }
        self.pos == self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn looking_at(&self, text: &str) -> bool {
        self.input[self.pos..].starts_with(text)
    }

    /// Copy the next char to the output.
    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.out.push(c);
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.looking_at(text) {
            self.out.push_str(text);
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    fn ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn union(&mut self) -> bool {
        if !self.varargs() {
            return false;
        }
        loop {
            self.ws();
            match self.peek() {
                Some('/') | Some('|') => {
                    self.bump();
                    self.ws();
                    if !self.varargs() {
                        return false;
                    }
                }
                _ => return true,
            }
        }
    }

    /// `...Type` or `Type...`, never both.
    fn varargs(&mut self) -> bool {
        let prefix = self.eat("...");
        if !self.nullable() {
            return false;
        }
        if self.looking_at("...") {
            if prefix {
                return false;
            }
            self.eat("...");
        }
        true
    }

    fn nullable(&mut self) -> bool {
        if matches!(self.peek(), Some('?') | Some('!')) {
            self.bump();
            if matches!(self.peek(), Some('?') | Some('!')) {
                return false;
            }
        }
        if !self.atom() {
            return false;
        }
        while self.eat("[]") {}
        true
    }

    fn atom(&mut self) -> bool {
        match self.peek() {
            Some('*') => {
                self.bump();
                true
            }
            Some('(') => {
                self.bump();
                self.ws();
                if !self.union() {
                    return false;
                }
                self.ws();
                self.eat(")")
            }
            Some('{') => self.record(),
            Some(q @ ('\'' | '"')) => self.string_literal(q),
            Some(c) if c.is_ascii_digit() || c == '-' => self.number_literal(),
            Some(c) if is_ident_start(c) => {
                if self.looking_at("function") && self.function_follows() {
                    self.function_type()
                } else {
                    self.name()
                }
            }
            _ => false,
        }
    }

    fn function_follows(&self) -> bool {
        self.input[self.pos + "function".len()..]
            .trim_start()
            .starts_with('(')
    }

    fn string_literal(&mut self, quote: char) -> bool {
        self.bump();
        loop {
            match self.peek() {
                None => return false,
                Some('\\') => {
                    self.bump();
                    if self.peek().is_none() {
                        return false;
                    }
                    self.bump();
                }
                Some(c) if c == quote => {
                    self.bump();
                    return true;
                }
                Some(_) => self.bump(),
            }
        }
    }

    fn number_literal(&mut self) -> bool {
        if self.peek() == Some('-') {
            self.bump();
        }
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.bump();
        }
        self.pos > start
    }

    fn ident(&mut self) -> Option<&str> {
        let start = self.pos;
        let rest = &self.input[self.pos..];
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if is_ident_start(c) => {}
            _ => return None,
        }
        let len = chars
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        Some(&self.input[start..start + len])
    }

    /// Dotted name, optionally followed by `.<Args>`.
    fn name(&mut self) -> bool {
        let start = self.pos;
        if self.ident().is_none() {
            return false;
        }
        while self.looking_at(".") && !self.looking_at(".<") {
            self.pos += 1;
            if self.ident().is_none() {
                return false;
            }
        }
        let input = self.input;
        let name = &input[start..self.pos];
        let rendered = if PRIMITIVES.contains(&name) {
            let builtin = capitalize(name);
            self.link(name, &builtin)
        } else if self.known.contains(name) {
            self.link(name, name)
        } else {
            self.unknown_name.get_or_insert_with(|| name.to_string());
            return false;
        };
        self.out.push_str(&rendered);

        if self.eat(".<") {
            self.ws();
            if self.peek() == Some('>') {
                return false;
            }
            loop {
                if !self.union() {
                    return false;
                }
                self.ws();
                if !self.eat(",") {
                    break;
                }
                self.ws();
            }
            return self.eat(">");
        }
        true
    }

    fn link(&self, text: &str, target: &str) -> String {
        match self.resolver.and_then(|r| r.resolve(target)) {
            Some(url) => format!("<a href=\"{url}\">{text}</a>"),
            None => text.to_string(),
        }
    }

    /// `function([this:T|new:T,] args...):Ret`
    fn function_type(&mut self) -> bool {
        self.eat("function");
        self.ws();
        if !self.eat("(") {
            return false;
        }
        self.ws();
        if !self.looking_at(")") {
            if self.eat("this:") || self.eat("new:") {
                self.ws();
                if !self.union() {
                    return false;
                }
                self.ws();
                if self.eat(",") {
                    self.ws();
                    if !self.function_params() {
                        return false;
                    }
                }
            } else if !self.function_params() {
                return false;
            }
        }
        self.ws();
        if !self.eat(")") {
            return false;
        }
        let (save_pos, save_len) = (self.pos, self.out.len());
        self.ws();
        if self.eat(":") {
            self.ws();
            return self.union();
        }
        self.pos = save_pos;
        self.out.truncate(save_len);
        true
    }

    fn function_params(&mut self) -> bool {
        loop {
            if !self.varargs() {
                return false;
            }
            self.eat("=");
            self.ws();
            if !self.eat(",") {
                return true;
            }
            self.ws();
        }
    }

    /// `{key[:Type], ...}`
    fn record(&mut self) -> bool {
        self.eat("{");
        loop {
            self.ws();
            let Some(key) = self.ident().map(str::to_string) else {
                return false;
            };
            self.out.push_str(&key);
            self.ws();
            if self.eat(":") {
                self.ws();
                if !self.union() {
                    return false;
                }
                self.ws();
            }
            if !self.eat(",") {
                break;
            }
        }
        self.eat("}")
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
