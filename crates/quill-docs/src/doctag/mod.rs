//! Doc-comment `@tag` parser.
//!
//! Text is scanned once with a cursor pointing at the tag that currently
//! receives prose. Anything that is not a recognised tag is appended verbatim
//! to that tag's `doc`, so inline markup such as `{@link Foo}` survives as is.

pub mod default_value;
mod standard;
pub mod tags;

use serde::Serialize;

pub use tags::MetaTagRegistry;

use crate::warnings::WarnKind;
use standard::{Input, StdParts, is_name_char, parse_standard};
use tags::{Arg, TagDef};

/// Tagname of the implicit record holding prose outside any tag.
pub const DEFAULT_TAG: &str = "default";

/// One recognised `@tag`, or the implicit default record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TagRecord {
    pub tagname: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub doc: String,
    pub optional: Option<bool>,
    pub required: bool,
    pub default: Option<String>,
    pub version: Option<String>,
    /// Dotted sub-entries (`@param opts.name`).
    pub properties: Vec<TagRecord>,
    /// Stored verbatim in `meta`.
    pub meta: bool,
}

impl TagRecord {
    fn new(tagname: &str) -> Self {
        Self {
            tagname: tagname.to_string(),
            ..Self::default()
        }
    }

    fn from_parts(tagname: &str, parts: StdParts) -> Self {
        Self {
            tagname: tagname.to_string(),
            name: parts.name,
            type_: parts.type_,
            optional: parts.optional,
            required: parts.required,
            default: parts.default,
            ..Self::default()
        }
    }

    fn finish(&mut self) {
        let trimmed = self.doc.trim();
        if trimmed.len() != self.doc.len() {
            self.doc = trimmed.to_string();
        }
        self.properties.iter_mut().for_each(TagRecord::finish);
    }
}

/// Parsed doc-comment. `tags[0]` is always the default record.
#[derive(Debug, Clone, PartialEq)]
pub struct DocComment {
    pub tags: Vec<TagRecord>,
    /// Non-fatal problems found while scanning, without location.
    pub problems: Vec<(WarnKind, String)>,
}

impl DocComment {
    pub fn default_doc(&self) -> &str {
        self.tags.first().map_or("", |tag| tag.doc.as_str())
    }

    pub fn first(&self, tagname: &str) -> Option<&TagRecord> {
        self.tags.iter().find(|tag| tag.tagname == tagname)
    }

    pub fn all<'a>(&'a self, tagname: &'a str) -> impl Iterator<Item = &'a TagRecord> + 'a {
        self.tags.iter().filter(move |tag| tag.tagname == tagname)
    }

    pub fn has(&self, tagname: &str) -> bool {
        self.first(tagname).is_some()
    }

    /// Names of every occurrence of a repeatable tag.
    pub fn names(&self, tagname: &str) -> Vec<String> {
        self.all(tagname).filter_map(|tag| tag.name.clone()).collect()
    }
}

/// Strip comment decoration: leading whitespace, one `*`, one space.
pub fn purify(comment: &str) -> String {
    comment
        .lines()
        .map(|line| {
            let line = line.trim_start();
            match line.strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_version(word: &str) -> bool {
    !word.is_empty()
        && word
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

enum Target {
    /// Index path: top-level tag, then nested `properties`.
    Tag(Vec<usize>),
    /// Text of a dropped sub-property goes nowhere.
    Discard,
}

struct State {
    tags: Vec<TagRecord>,
    target: Target,
    /// The current tag ends at the next newline.
    until_eol: bool,
    problems: Vec<(WarnKind, String)>,
}

impl State {
    fn new() -> Self {
        Self {
            tags: vec![TagRecord::new(DEFAULT_TAG)],
            target: Target::Tag(vec![0]),
            until_eol: false,
            problems: Vec::new(),
        }
    }

    fn current(&mut self) -> Option<&mut TagRecord> {
        let Target::Tag(path) = &self.target else {
            return None;
        };
        let (first, rest) = path.split_first()?;
        let mut record = self.tags.get_mut(*first)?;
        for &index in rest {
            record = record.properties.get_mut(index)?;
        }
        Some(record)
    }

    fn push_str(&mut self, text: &str) {
        if let Some(record) = self.current() {
            record.doc.push_str(text);
        }
    }

    fn push_char(&mut self, c: char) {
        if let Some(record) = self.current() {
            record.doc.push(c);
        }
    }

    fn reset(&mut self) {
        self.target = Target::Tag(vec![0]);
        self.until_eol = false;
    }

    fn open(&mut self, record: TagRecord, def: &TagDef) {
        self.tags.push(record);
        self.target = Target::Tag(vec![self.tags.len() - 1]);
        self.until_eol = !def.multiline;
    }

    /// Nest `foo.bar` under the most recent same-kind tag named `foo`.
    fn open_nested(&mut self, mut record: TagRecord, def: &TagDef) {
        let Some(full) = record.name.clone() else {
            return self.open(record, def);
        };
        let segments: Vec<&str> = full.split('.').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return self.open(record, def);
        };

        let mut path = Vec::with_capacity(segments.len());
        let found = self
            .tags
            .iter()
            .rposition(|tag| tag.tagname == record.tagname && tag.name.as_deref() == Some(parents[0]));
        if let Some(top) = found {
            path.push(top);
            let mut node = &self.tags[top];
            for segment in &parents[1..] {
                match node
                    .properties
                    .iter()
                    .rposition(|p| p.name.as_deref() == Some(*segment))
                {
                    Some(index) => {
                        path.push(index);
                        node = &node.properties[index];
                    }
                    None => {
                        path.clear();
                        break;
                    }
                }
            }
        }

        if path.is_empty() {
            self.problems.push((
                WarnKind::Subproperty,
                format!("@{} {full} has no parent {}", record.tagname, parents.join(".")),
            ));
            self.target = Target::Discard;
            self.until_eol = !def.multiline;
            return;
        }

        record.name = Some(leaf.to_string());
        self.target = Target::Tag(path);
        let Some(parent) = self.current() else {
            return;
        };
        parent.properties.push(record);
        let index = parent.properties.len() - 1;
        if let Target::Tag(path) = &mut self.target {
            path.push(index);
        }
        self.until_eol = !def.multiline;
    }
}

/// Tags whose dotted names denote sub-properties.
const NESTING_TAGS: &[&str] = &["param", "cfg", "property"];

/// Parser configured with the run's meta tags.
#[derive(Debug, Clone, Copy)]
pub struct DocTagParser<'m> {
    meta: &'m MetaTagRegistry,
}

impl<'m> DocTagParser<'m> {
    pub fn new(meta: &'m MetaTagRegistry) -> Self {
        Self { meta }
    }

    /// Parse raw comment contents (between `/*` and `*/`).
    pub fn parse(&self, comment: &str) -> DocComment {
        let text = purify(comment);
        let mut input = Input::new(&text);
        let mut state = State::new();

        while let Some(c) = input.peek() {
            if c == '@' && input.at_word_start() {
                let start = input.pos;
                input.bump();
                let word = input.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                if let Some(def) = tags::lookup(word) {
                    self.start_tag(&mut state, def, &mut input);
                    continue;
                }
                if self.meta.contains(word) {
                    self.start_meta(&mut state, word, &mut input);
                    continue;
                }
                if !word.is_empty() {
                    state
                        .problems
                        .push((WarnKind::Tag, format!("unsupported tag @{word}")));
                }
                state.push_str(input.slice(start));
                continue;
            }
            input.bump();
            if c == '\n' && state.until_eol {
                state.reset();
                continue;
            }
            state.push_char(c);
        }

        let mut tags = state.tags;
        tags.iter_mut().for_each(TagRecord::finish);
        DocComment {
            tags,
            problems: state.problems,
        }
    }

    fn start_tag(&self, state: &mut State, def: &TagDef, input: &mut Input<'_>) {
        let tagname = def.canonical;
        match def.arg {
            Arg::None => state.open(TagRecord::new(tagname), def),
            Arg::Standard(shape) => {
                let record = TagRecord::from_parts(tagname, parse_standard(input, shape));
                let dotted = record.name.as_deref().is_some_and(|name| name.contains('.'));
                if dotted && NESTING_TAGS.contains(&tagname) {
                    state.open_nested(record, def);
                } else {
                    state.open(record, def);
                }
            }
            Arg::Ref => {
                input.skip_hspace();
                let token = input.take_while(|c| !c.is_whitespace());
                let mut record = TagRecord::new(tagname);
                record.name = (!token.is_empty()).then(|| token.to_string());
                state.open(record, def);
            }
            Arg::Names => {
                let mut opened = false;
                loop {
                    input.take_while(|c| c == ' ' || c == '\t' || c == ',');
                    if input.peek().is_none_or(|c| c == '\n' || c == '@') {
                        break;
                    }
                    let token = input.take_while(|c| !c.is_whitespace() && c != ',');
                    let mut record = TagRecord::new(tagname);
                    record.name = Some(token.to_string());
                    state.open(record, def);
                    opened = true;
                }
                if !opened {
                    state.open(TagRecord::new(tagname), def);
                }
            }
            Arg::Version => {
                input.skip_hspace();
                let save = input.pos;
                let word = input.take_while(|c| !c.is_whitespace());
                let mut record = TagRecord::new(tagname);
                if is_version(word) {
                    record.version = Some(word.to_string());
                } else {
                    input.pos = save;
                }
                state.open(record, def);
            }
            Arg::Constructor => {
                let mut record = TagRecord::new(tagname);
                record.name = Some("constructor".to_string());
                state.open(record, def);
            }
        }
        input.skip_hspace();
    }

    fn start_meta(&self, state: &mut State, word: &str, input: &mut Input<'_>) {
        let mut record = TagRecord::new(word);
        record.meta = true;
        input.skip_hspace();
        state.tags.push(record);
        state.target = Target::Tag(vec![state.tags.len() - 1]);
        state.until_eol = true;
    }
}

/// Whether a token looks like a member or class name.
pub fn is_plain_name(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_name_char)
}
