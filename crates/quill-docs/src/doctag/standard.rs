//! Shared sub-parser for `{Type} [name=Default] (required)` tag arguments.

use super::default_value::scan_default;
use super::tags::StdShape;

/// Character cursor over purified comment text.
pub(super) struct Input<'t> {
    text: &'t str,
    pub pos: usize,
}

impl<'t> Input<'t> {
    pub fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    pub fn slice(&self, start: usize) -> &'t str {
        &self.text[start..self.pos]
    }

    /// At line start or right after whitespace.
    pub fn at_word_start(&self) -> bool {
        self.text[..self.pos]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace)
    }

    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'t str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.slice(start)
    }

    /// Skip spaces and tabs, never a newline.
    pub fn skip_hspace(&mut self) {
        self.take_while(|c| c == ' ' || c == '\t');
    }

    /// Advance past the next `close` on the current line, or to the line end.
    fn skip_past_on_line(&mut self, close: char) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }
            self.bump();
            if c == close {
                return;
            }
        }
    }
}

/// Pieces recognised by the standard sub-parser.
#[derive(Debug, Default, PartialEq)]
pub(super) struct StdParts {
    pub type_: Option<String>,
    pub name: Option<String>,
    pub optional: Option<bool>,
    pub required: bool,
    pub default: Option<String>,
}

pub(super) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-')
}

pub(super) fn parse_standard(input: &mut Input<'_>, shape: StdShape) -> StdParts {
    let mut parts = StdParts::default();
    input.skip_hspace();
    if shape.type_ {
        parts.type_ = braced(input);
        input.skip_hspace();
    }
    if !shape.name {
        return parts;
    }

    if shape.optional && input.peek() == Some('[') {
        input.bump();
        input.skip_hspace();
        parts.optional = Some(true);
        parts.name = name(input);
        input.skip_hspace();
        if input.eat("=") {
            input.skip_hspace();
            parts.default = default_value(input);
        }
        // Anything after a valid default up to the bracket is ignored.
        input.skip_past_on_line(']');
    } else {
        parts.name = name(input);
        if shape.default && input.eat("=") {
            parts.default = default_value(input);
            if parts.default.is_none() {
                input.take_while(|c| !c.is_whitespace());
            }
        }
    }

    if shape.optional {
        let save = input.pos;
        input.skip_hspace();
        if input.eat("(required)") {
            parts.required = true;
            parts.optional = Some(false);
        } else if input.eat("(optional)") || input.eat("(Optional)") {
            parts.optional = Some(true);
        } else {
            input.pos = save;
        }
    }
    parts
}

fn name(input: &mut Input<'_>) -> Option<String> {
    let name = input.take_while(is_name_char);
    (!name.is_empty()).then(|| name.to_string())
}

fn default_value(input: &mut Input<'_>) -> Option<String> {
    let rest = input.rest();
    let line = rest.split('\n').next().unwrap_or(rest);
    let len = scan_default(line)?;
    input.pos += len;
    Some(line[..len].to_string())
}

/// `{...}` with nested braces. Unbalanced braces leave the input untouched.
fn braced(input: &mut Input<'_>) -> Option<String> {
    if input.peek() != Some('{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in input.rest().char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let inner = input.rest()[1..i].trim().to_string();
                    input.pos += i + 1;
                    return Some(inner);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: StdShape = StdShape {
        type_: true,
        name: true,
        optional: true,
        default: true,
    };

    fn parse(text: &str) -> (StdParts, String) {
        let mut input = Input::new(text);
        let parts = parse_standard(&mut input, FULL);
        (parts, input.rest().to_string())
    }

    #[test]
    fn type_name_and_doc() {
        let (parts, rest) = parse(" {String} foo The foo.");
        assert_eq!(parts.type_.as_deref(), Some("String"));
        assert_eq!(parts.name.as_deref(), Some("foo"));
        assert_eq!(parts.optional, None);
        assert_eq!(rest, " The foo.");
    }

    #[test]
    fn bracketed_optional_with_default() {
        let (parts, rest) = parse(" {Object} [cfg={a: [1, 2]}] Config.");
        assert_eq!(parts.name.as_deref(), Some("cfg"));
        assert_eq!(parts.optional, Some(true));
        assert_eq!(parts.default.as_deref(), Some("{a: [1, 2]}"));
        assert_eq!(rest, " Config.");
    }

    #[test]
    fn malformed_default_is_dropped() {
        let (parts, _) = parse(" {Object} [cfg={a: [1}] Config.");
        assert_eq!(parts.name.as_deref(), Some("cfg"));
        assert_eq!(parts.optional, Some(true));
        assert_eq!(parts.default, None);
    }

    #[test]
    fn trailing_text_after_default_is_ignored() {
        let (parts, rest) = parse(" [size=10 px] Size.");
        assert_eq!(parts.default.as_deref(), Some("10"));
        assert_eq!(rest, " Size.");
    }

    #[test]
    fn plain_name_with_default() {
        let (parts, _) = parse(" {Number} width=100 Width.");
        assert_eq!(parts.default.as_deref(), Some("100"));
        assert_eq!(parts.optional, None);
    }

    #[test]
    fn required_marker_only_right_after_name() {
        let (parts, rest) = parse(" {String} title (required) The title.");
        assert!(parts.required);
        assert_eq!(parts.optional, Some(false));
        assert_eq!(rest, " The title.");

        let (parts, rest) = parse(" {String} title The (required) title.");
        assert!(!parts.required);
        assert_eq!(rest, " The (required) title.");
    }

    #[test]
    fn record_types_keep_nested_braces() {
        let (parts, _) = parse(" {{a: Number, b: {c: String}}} rec");
        assert_eq!(parts.type_.as_deref(), Some("{a: Number, b: {c: String}}"));
        assert_eq!(parts.name.as_deref(), Some("rec"));
    }

    #[test]
    fn unbalanced_type_braces_are_not_a_type() {
        let (parts, _) = parse(" {String foo");
        assert_eq!(parts.type_, None);
        assert_eq!(parts.name, None);
    }
}
