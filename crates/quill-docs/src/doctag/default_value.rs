//! Bracket/quote balanced scanner for `[name=Default]` values.
//!
//! Every function returns the byte length of a complete value at the start of
//! the input, or `None`. A value whose nesting never balances yields `None`
//! even if a prefix of it looked fine.

/// Length of the default value at the start of `text`.
pub fn scan_default(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    match *bytes.first()? {
        b'\'' | b'"' => scan_string(text),
        b'[' | b'{' | b'(' => scan_balanced(text),
        b'/' => scan_regex(text),
        b'0'..=b'9' | b'.' => scan_number(text),
        b'-' | b'+' if bytes.get(1).is_some_and(|b| b.is_ascii_digit() || *b == b'.') => {
            scan_number(text)
        }
        b if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => scan_identifier(text),
        _ => None,
    }
}

/// Parse a default and return it as an owned string.
pub fn parse_default(text: &str) -> Option<String> {
    scan_default(text).map(|len| text[..len].to_string())
}

fn scan_string(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, quote) = chars.next()?;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next()?;
            }
            '\n' => return None,
            c if c == quote => return Some(i + c.len_utf8()),
            _ => {}
        }
    }
    None
}

fn scan_balanced(text: &str) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' | b'(' => stack.push(bytes[i]),
            close @ (b']' | b'}' | b')') => {
                let open = stack.pop()?;
                if !pairs(open, close) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i + 1);
                }
            }
            b'\'' | b'"' => {
                let len = scan_string(&text[i..])?;
                i += len;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn pairs(open: u8, close: u8) -> bool {
    matches!((open, close), (b'[', b']') | (b'{', b'}') | (b'(', b')'))
}

fn scan_regex(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                if i == 1 {
                    return None;
                }
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn scan_number(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'%') {
        i += 1;
    }
    (i > digits_start).then_some(i)
}

fn scan_identifier(text: &str) -> Option<usize> {
    let len = text
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '.')))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let ident = text[..len].trim_end_matches('.');
    (!ident.is_empty()).then_some(ident.len())
}
