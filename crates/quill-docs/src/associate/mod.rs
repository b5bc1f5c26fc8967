//! Comment/code association.
//!
//! Each file is turned into a list of [`Docset`]s: one per comment group, with
//! the code node that immediately follows it when nothing else intervenes.

pub mod body;
pub mod css;
pub mod js;

use std::path::Path;

use crate::code::CodeNode;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `/** ... */`
    Doc,
    Plain,
}

/// One comment plus the code it annotates.
#[derive(Debug, Clone, PartialEq)]
pub struct Docset {
    /// Comment contents without the outer `/*` `*/` or `//` delimiters.
    pub comment: String,
    pub kind: CommentKind,
    pub code: Option<CodeNode>,
    /// One-based line of the comment start.
    pub line: u32,
    /// No comment in the source; stands in for an undocumented class definition.
    pub implicit: bool,
}

impl Docset {
    pub fn is_doc(&self) -> bool {
        self.kind == CommentKind::Doc
    }
}

/// Source language, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    Css,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("css" | "scss") => Language::Css,
            _ => Language::JavaScript,
        }
    }
}

/// Associate every comment in `source` with the code following it.
///
/// `namespaces` are the framework namespaces whose undocumented `define`
/// calls still get an implicit docset.
pub fn associate(path: &Path, source: &str, namespaces: &[String]) -> Result<Vec<Docset>> {
    match Language::from_path(path) {
        Language::JavaScript => js::associate(path, source, namespaces),
        Language::Css => Ok(css::associate(source)),
    }
}

/// Byte offset → line lookup.
pub(crate) struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(128);
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((idx + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// One-based line and column of `offset`.
    pub fn location(&self, offset: u32) -> (u32, u32) {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let column = offset - self.line_starts[idx] + 1;
        (idx as u32 + 1, column)
    }

    pub fn line(&self, offset: u32) -> u32 {
        self.location(offset).0
    }
}

/// A comment as reported by a lexer.
#[derive(Debug, Clone)]
pub(crate) struct RawComment {
    pub start: u32,
    pub end: u32,
    /// `//` comment.
    pub line_comment: bool,
    pub doc: bool,
    pub content: String,
}

/// Merged comment with its claim slot.
#[derive(Debug)]
struct Group {
    end: u32,
    kind: CommentKind,
    text: String,
    line: u32,
    code: Option<CodeNode>,
    implicit: bool,
}

/// Collects comment groups and hands each one at most one following node.
pub(crate) struct Associator<'s> {
    source: &'s str,
    groups: Vec<Group>,
}

impl<'s> Associator<'s> {
    /// `comments` must be in source order.
    pub fn new(source: &'s str, comments: Vec<RawComment>, index: &LineIndex) -> Self {
        let mut groups: Vec<Group> = Vec::with_capacity(comments.len());
        let mut previous_line_comment = false;
        for comment in comments {
            if comment.line_comment && previous_line_comment {
                if let Some(last) = groups.last_mut() {
                    let gap = &source[last.end as usize..comment.start as usize];
                    if gap.trim().is_empty() && gap.matches('\n').count() <= 1 {
                        last.end = comment.end;
                        last.text.push('\n');
                        last.text.push_str(&comment.content);
                        continue;
                    }
                }
            }
            previous_line_comment = comment.line_comment;
            groups.push(Group {
                end: comment.end,
                kind: if comment.doc {
                    CommentKind::Doc
                } else {
                    CommentKind::Plain
                },
                text: comment.content,
                line: index.line(comment.start),
                code: None,
                implicit: false,
            });
        }
        Self { source, groups }
    }

    /// Group that may claim a node starting at `start`: the last comment
    /// ending before it, still unclaimed, separated only by blank text.
    pub fn claimable(&self, start: u32) -> Option<usize> {
        let idx = self.groups.partition_point(|g| g.end <= start).checked_sub(1)?;
        let group = &self.groups[idx];
        if group.code.is_some() || group.kind == CommentKind::Plain {
            return None;
        }
        let gap = self.source.get(group.end as usize..start as usize)?;
        gap.chars()
            .all(|c| c.is_whitespace() || c == ',' || c == ';')
            .then_some(idx)
    }

    pub fn attach(&mut self, idx: usize, node: CodeNode) {
        if let Some(group) = self.groups.get_mut(idx) {
            group.code = Some(node);
        }
    }

    /// Record an empty doc group for a node at `start` that no comment claims.
    pub fn implicit(&mut self, start: u32, line: u32, node: CodeNode) {
        let idx = self.groups.partition_point(|g| g.end <= start);
        self.groups.insert(
            idx,
            Group {
                end: start,
                kind: CommentKind::Doc,
                text: String::new(),
                line,
                code: Some(node),
                implicit: true,
            },
        );
    }

    pub fn into_docsets(self) -> Vec<Docset> {
        self.groups
            .into_iter()
            .map(|group| Docset {
                comment: group.text,
                kind: group.kind,
                code: group.code,
                line: group.line,
                implicit: group.implicit,
            })
            .collect()
    }

    #[cfg(test)]
    fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_comment(source: &str, needle: &str) -> RawComment {
        let start = source.find(needle).unwrap() as u32;
        RawComment {
            start,
            end: start + needle.len() as u32,
            line_comment: true,
            doc: false,
            content: needle[2..].to_string(),
        }
    }

    #[test]
    fn line_index_locations() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.location(0), (1, 1));
        assert_eq!(index.location(4), (2, 2));
        assert_eq!(index.location(7), (4, 1));
    }

    #[test]
    fn contiguous_line_comments_merge_until_blank_line() {
        let source = "// one\n// two\n\n// three\n";
        let comments = vec![
            line_comment(source, "// one"),
            line_comment(source, "// two"),
            line_comment(source, "// three"),
        ];
        let index = LineIndex::new(source);
        let assoc = Associator::new(source, comments, &index);
        assert_eq!(assoc.group_count(), 2);
        let docsets = assoc.into_docsets();
        assert_eq!(docsets[0].comment, " one\n two");
        assert_eq!(docsets[0].line, 1);
        assert_eq!(docsets[1].line, 4);
        assert!(!docsets[0].is_doc());
    }

    #[test]
    fn language_by_extension() {
        assert_eq!(Language::from_path(Path::new("a/b.scss")), Language::Css);
        assert_eq!(Language::from_path(Path::new("a/b.css")), Language::Css);
        assert_eq!(Language::from_path(Path::new("a/b.js")), Language::JavaScript);
    }
}
