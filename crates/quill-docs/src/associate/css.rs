//! CSS / SCSS side of the associator.
//!
//! Only two constructs are documentable: `$name: value [!default];` variables
//! and `@mixin name(...)` declarations. A small lexer is enough to find both.

use super::{Associator, Docset, LineIndex, RawComment};
use crate::code::CodeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// `#fff`, `#main`
    Hash,
    Number,
    /// `10px`, `1.5em`
    Dimension,
    Percentage,
    String,
    /// `@mixin`, `@include`
    AtKeyword,
    /// `$name`
    Var,
    Delim,
    DocComment,
    PlainComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub start: u32,
    pub end: u32,
    pub line: u32,
}

impl Token<'_> {
    fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::DocComment | TokenKind::PlainComment)
    }

    fn is_delim(&self, c: &str) -> bool {
        self.kind == TokenKind::Delim && self.text == c
    }
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c >= 0x80
}

fn is_ident_start(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' || *b >= 0x80 => true,
        Some(b'-') => bytes
            .get(i + 1)
            .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'-' || *b == b'_'),
        _ => false,
    }
}

/// Split CSS/SCSS source into tokens. Whitespace is dropped.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1u32;

    while i < bytes.len() {
        let start = i;
        let start_line = line;
        let b = bytes[i];
        let kind = match b {
            b'\n' => {
                line += 1;
                i += 1;
                continue;
            }
            _ if b.is_ascii_whitespace() => {
                i += 1;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = source[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
                let doc = bytes.get(i + 2) == Some(&b'*') && end - i > 4;
                i = end;
                if doc {
                    TokenKind::DocComment
                } else {
                    TokenKind::PlainComment
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = source[i..].find('\n').map_or(bytes.len(), |p| i + p);
                TokenKind::PlainComment
            }
            b'"' | b'\'' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i = (i + 1).min(bytes.len());
                TokenKind::String
            }
            b'#' if bytes.get(i + 1).is_some_and(|c| is_ident_char(*c)) => {
                i += 1;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                TokenKind::Hash
            }
            b'@' if is_ident_start(bytes, i + 1) => {
                i += 1;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                TokenKind::AtKeyword
            }
            b'$' if is_ident_start(bytes, i + 1) => {
                i += 1;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                TokenKind::Var
            }
            _ if starts_number(bytes, i) => {
                if matches!(b, b'-' | b'+') {
                    i += 1;
                }
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                if bytes.get(i) == Some(&b'%') {
                    i += 1;
                    TokenKind::Percentage
                } else if is_ident_start(bytes, i) {
                    while i < bytes.len() && is_ident_char(bytes[i]) {
                        i += 1;
                    }
                    TokenKind::Dimension
                } else {
                    TokenKind::Number
                }
            }
            _ if is_ident_start(bytes, i) => {
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                // url(...) may hold `//`, keep it whole.
                if source[start..i].eq_ignore_ascii_case("url") && bytes.get(i) == Some(&b'(') {
                    i = source[i..].find(')').map_or(bytes.len(), |p| i + p + 1);
                }
                TokenKind::Ident
            }
            _ => {
                i += source[i..].chars().next().map_or(1, char::len_utf8);
                TokenKind::Delim
            }
        };
        let text = &source[start..i];
        line += text.matches('\n').count() as u32;
        tokens.push(Token {
            kind,
            text,
            start: start as u32,
            end: i as u32,
            line: start_line,
        });
    }
    tokens
}

fn starts_number(bytes: &[u8], i: usize) -> bool {
    let digit_at = |j: usize| bytes.get(j).is_some_and(u8::is_ascii_digit);
    match bytes[i] {
        b'0'..=b'9' => true,
        b'.' => digit_at(i + 1),
        b'-' | b'+' => digit_at(i + 1) || (bytes.get(i + 1) == Some(&b'.') && digit_at(i + 2)),
        _ => false,
    }
}

/// Type guessed from the first token of a variable value.
pub fn guess_type(value: &str) -> Option<&'static str> {
    let tokens = tokenize(value);
    let first = tokens.first()?;
    match first.kind {
        TokenKind::Hash => Some("color"),
        TokenKind::Ident
            if ["rgb", "rgba", "hsl", "hsla"].contains(&first.text)
                && tokens.get(1).is_some_and(|t| t.is_delim("(")) =>
        {
            Some("color")
        }
        TokenKind::Ident if first.text == "true" || first.text == "false" => Some("boolean"),
        TokenKind::Dimension => Some("length"),
        TokenKind::Percentage => Some("percentage"),
        TokenKind::Number => Some("number"),
        TokenKind::String => Some("string"),
        _ => None,
    }
}

/// Pair each comment with the variable or mixin declaration following it.
pub fn associate(source: &str) -> Vec<Docset> {
    let tokens = tokenize(source);
    let index = LineIndex::new(source);
    let comments = tokens
        .iter()
        .filter(|t| t.is_comment())
        .map(|t| {
            let line_comment = t.text.starts_with("//");
            let content = if line_comment {
                &t.text[2..]
            } else {
                let inner = t.text.strip_prefix("/*").unwrap_or(t.text);
                inner.strip_suffix("*/").unwrap_or(inner)
            };
            RawComment {
                start: t.start,
                end: t.end,
                line_comment,
                doc: t.kind == TokenKind::DocComment,
                content: content.to_string(),
            }
        })
        .collect();
    let mut assoc = Associator::new(source, comments, &index);

    let code: Vec<Token<'_>> = tokens.into_iter().filter(|t| !t.is_comment()).collect();
    let mut at_statement_start = true;
    for (i, token) in code.iter().enumerate() {
        let construct = match token.kind {
            TokenKind::Var if at_statement_start => variable(source, &code, i),
            TokenKind::AtKeyword if token.text == "@mixin" => mixin(source, &code, i),
            _ => None,
        };
        if let Some(node) = construct {
            if let Some(idx) = assoc.claimable(token.start) {
                assoc.attach(idx, node);
            }
        }
        at_statement_start = token.kind == TokenKind::Delim && matches!(token.text, ";" | "{" | "}");
    }
    assoc.into_docsets()
}

/// `$name: value [!default];`
fn variable(source: &str, code: &[Token<'_>], i: usize) -> Option<CodeNode> {
    if !code.get(i + 1)?.is_delim(":") {
        return None;
    }
    let mut value_tokens = value_until(code, i + 2, &[";", "}"]);
    // Drop trailing `!default` / `!global` flags.
    while let [.., bang, flag] = value_tokens {
        if bang.is_delim("!") && flag.kind == TokenKind::Ident {
            value_tokens = &value_tokens[..value_tokens.len() - 2];
        } else {
            break;
        }
    }
    let value = span_text(source, value_tokens);
    Some(CodeNode::CssVariable {
        name: code[i].text.to_string(),
        value,
    })
}

/// `@mixin name($a, $b: default)`
fn mixin(source: &str, code: &[Token<'_>], i: usize) -> Option<CodeNode> {
    let name = code.get(i + 1).filter(|t| t.kind == TokenKind::Ident)?;
    let mut params = Vec::new();
    if code.get(i + 2).is_some_and(|t| t.is_delim("(")) {
        let mut j = i + 3;
        while let Some(token) = code.get(j) {
            if token.is_delim(")") {
                break;
            }
            if token.kind == TokenKind::Var {
                let default = if code.get(j + 1).is_some_and(|t| t.is_delim(":")) {
                    let tokens = value_until(code, j + 2, &[",", ")"]);
                    j += 2 + tokens.len();
                    Some(span_text(source, tokens))
                } else {
                    j += 1;
                    None
                };
                params.push((token.text.to_string(), default));
                continue;
            }
            j += 1;
        }
    }
    Some(CodeNode::CssMixin {
        name: name.text.to_string(),
        params,
    })
}

/// Tokens from `from` up to a terminator at paren depth zero.
fn value_until<'t, 's>(code: &'t [Token<'s>], from: usize, stops: &[&str]) -> &'t [Token<'s>] {
    let mut depth = 0usize;
    let rest = code.get(from..).unwrap_or_default();
    for (offset, token) in rest.iter().enumerate() {
        if token.kind == TokenKind::Delim {
            match token.text {
                "(" => depth += 1,
                ")" if depth > 0 => depth -= 1,
                t if depth == 0 && stops.contains(&t) => return &rest[..offset],
                _ => {}
            }
        }
    }
    rest
}

fn span_text(source: &str, tokens: &[Token<'_>]) -> String {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => source[first.start as usize..last.end as usize].trim().to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kinds() {
        let kinds: Vec<_> = tokenize("$a: 10px 50% 3 #fff 'x' @mixin foo;")
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Var,
                TokenKind::Delim,
                TokenKind::Dimension,
                TokenKind::Percentage,
                TokenKind::Number,
                TokenKind::Hash,
                TokenKind::String,
                TokenKind::AtKeyword,
                TokenKind::Ident,
                TokenKind::Delim,
            ]
        );
    }

    #[test]
    fn url_keeps_double_slash() {
        let tokens = tokenize("background: url(http://x/y.png);");
        assert!(tokens.iter().all(|t| !t.is_comment()));
    }

    #[test]
    fn guesses_types_from_first_token() {
        assert_eq!(guess_type("#ff0000"), Some("color"));
        assert_eq!(guess_type("rgba(0, 0, 0, .5)"), Some("color"));
        assert_eq!(guess_type("12px"), Some("length"));
        assert_eq!(guess_type("50%"), Some("percentage"));
        assert_eq!(guess_type("1.5"), Some("number"));
        assert_eq!(guess_type("'Helvetica'"), Some("string"));
        assert_eq!(guess_type("true"), Some("boolean"));
        assert_eq!(guess_type("$other"), None);
    }

    #[test]
    fn documents_variables_and_mixins() {
        let source = "/**\n * Base color.\n */\n$base-color: #333 !default;\n\n// plain\n$x: 1;\n\n/** A mixin */\n@mixin button($size, $color: $base-color) {\n  color: $color;\n}\n";
        let sets = associate(source);
        let docs: Vec<_> = sets.iter().filter(|s| s.is_doc()).collect();
        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs[0].code,
            Some(CodeNode::CssVariable {
                name: "$base-color".to_string(),
                value: "#333".to_string(),
            })
        );
        assert_eq!(docs[0].line, 1);
        assert_eq!(
            docs[1].code,
            Some(CodeNode::CssMixin {
                name: "button".to_string(),
                params: vec![
                    ("$size".to_string(), None),
                    ("$color".to_string(), Some("$base-color".to_string())),
                ],
            })
        );
        assert_eq!(docs[1].line, 9);
    }

    #[test]
    fn variable_use_inside_rule_is_not_a_declaration() {
        let sets = associate("a {\n  /** not a var */\n  color: $x;\n}\n");
        assert!(sets[0].code.is_none());
    }
}
