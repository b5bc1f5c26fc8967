//! Folds merged fragments from every file into class entities.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::merger::{DocFragment, MemberFragment};
use crate::model::{Class, Member, push_unique};
use crate::warnings::{WarnKind, Warnings};

/// Name of the synthetic class collecting members that belong nowhere.
pub const GLOBAL_CLASS: &str = "global";

/// Which class members of the file being folded attach to.
enum Current {
    None,
    Class(String),
    /// The last class fragment was `@ignore`d; its members go with it.
    Ignored,
}

pub struct Aggregator<'w> {
    classes: IndexMap<String, Class>,
    /// Members whose `@member` target is not declared yet, in stream order.
    /// Drained when the target is declared; leftovers go to `global` in `finish`.
    pending: Vec<(String, Member)>,
    ignored: FxHashSet<String>,
    ignore_global: bool,
    warnings: &'w mut Warnings,
}

impl<'w> Aggregator<'w> {
    pub fn new(ignore_global: bool, warnings: &'w mut Warnings) -> Self {
        Self {
            classes: IndexMap::new(),
            pending: Vec::new(),
            ignored: FxHashSet::default(),
            ignore_global,
            warnings,
        }
    }

    /// Fold the fragments of one file, in declaration order.
    pub fn aggregate_file(&mut self, fragments: Vec<DocFragment>) {
        let mut current = Current::None;
        for fragment in fragments {
            match fragment {
                DocFragment::Class(class) if class.ignore => {
                    self.ignored.insert(class.name.clone());
                    current = Current::Ignored;
                }
                DocFragment::Class(class) => {
                    current = Current::Class(class.name.clone());
                    self.add_class(class);
                }
                DocFragment::Member(fragment) => self.add_fragment(fragment, &current),
            }
        }
    }

    fn add_fragment(&mut self, fragment: MemberFragment, current: &Current) {
        let MemberFragment { member, target, ignore } = fragment;
        if ignore {
            return;
        }
        let owner = match (target, current) {
            (Some(target), _) => target,
            (None, Current::Class(name)) => name.clone(),
            (None, Current::Ignored) => return,
            (None, Current::None) => {
                self.add_global(member);
                return;
            }
        };
        if self.ignored.contains(&owner) {
            return;
        }
        match self.classes.get_mut(&owner) {
            Some(class) => add_member(class, member, self.warnings),
            None => self.pending.push((owner, member)),
        }
    }

    fn add_global(&mut self, member: Member) {
        if self.ignore_global {
            return;
        }
        if let Some(location) = &member.location {
            self.warnings.warn_at(
                WarnKind::Global,
                format!("{} {} has no class", member.tagname, member.name),
                &location.path,
                location.line,
            );
        } else {
            self.warnings
                .warn(WarnKind::Global, format!("{} {} has no class", member.tagname, member.name));
        }
        let global = self
            .classes
            .entry(GLOBAL_CLASS.to_string())
            .or_insert_with(|| Class::new(GLOBAL_CLASS));
        add_member(global, member, self.warnings);
    }

    fn add_class(&mut self, mut class: Class) {
        match self.classes.get_mut(&class.name) {
            Some(existing) => merge_class(existing, class, self.warnings),
            None => {
                let members = std::mem::take(&mut class.members);
                let name = class.name.clone();
                self.classes.insert(name.clone(), class);

                // Members that named this class before it was declared come first.
                let (waiting, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
                    .into_iter()
                    .partition(|(owner, _)| *owner == name);
                self.pending = rest;
                let Some(class) = self.classes.get_mut(&name) else {
                    return;
                };
                for (_, member) in waiting {
                    add_member(class, member, self.warnings);
                }
                for member in members {
                    add_member(class, member, self.warnings);
                }
            }
        }
    }

    /// Place unresolved `@member` references and return classes in first-seen order.
    pub fn finish(mut self) -> Vec<Class> {
        for (owner, member) in std::mem::take(&mut self.pending) {
            if self.ignored.contains(&owner) {
                continue;
            }
            match self.classes.get_mut(&owner) {
                Some(class) => add_member(class, member, self.warnings),
                None => self.add_global(member),
            }
        }
        for name in &self.ignored {
            self.classes.shift_remove(name);
        }
        self.classes
            .into_values()
            .map(|mut class| {
                class.component = class.aliases.iter().any(|alias| alias.starts_with("widget."));
                class
            })
            .collect()
    }
}

/// Fold a second fragment of an already known class.
fn merge_class(existing: &mut Class, other: Class, warnings: &mut Warnings) {
    if existing.doc.is_empty() {
        existing.doc = other.doc;
    }
    if existing.extends.is_none() {
        existing.extends = other.extends;
    }
    existing.singleton |= other.singleton;
    existing.private |= other.private;
    existing.framework |= other.framework;
    existing.new |= other.new;
    for mixin in other.mixins {
        push_unique(&mut existing.mixins, mixin);
    }
    for name in other.alternate_class_names {
        push_unique(&mut existing.alternate_class_names, name);
    }
    for alias in other.aliases {
        push_unique(&mut existing.aliases, alias);
    }
    for name in other.requires {
        push_unique(&mut existing.requires, name);
    }
    for name in other.uses {
        push_unique(&mut existing.uses, name);
    }
    if existing.enum_.is_none() {
        existing.enum_ = other.enum_;
    }
    if existing.deprecated.is_none() {
        existing.deprecated = other.deprecated;
    }
    if existing.since.is_none() {
        existing.since = other.since;
    }
    for (key, value) in other.meta {
        existing.meta.entry(key).or_insert(value);
    }
    if existing.location.is_none() {
        existing.location = other.location;
    }
    for member in other.members {
        add_member(existing, member, warnings);
    }
}

/// Attach a member, replacing a same-id member in place.
///
/// A documented member also replaces an autodetected one with the same name
/// and static-ness, whatever its kind; an autodetected member never replaces
/// a documented one.
fn add_member(class: &mut Class, mut member: Member, warnings: &mut Warnings) {
    member.owner = class.name.clone();
    let documented_twin = |m: &Member| m.name == member.name && m.static_ == member.static_;

    if member.autodetected {
        if class.members.iter().any(|m| documented_twin(m) && !m.autodetected) {
            return;
        }
    } else if let Some(pos) = class
        .members
        .iter()
        .position(|m| m.autodetected && documented_twin(m))
    {
        class.members[pos] = member;
        return;
    }

    match class.position_of(&member.id) {
        Some(pos) => {
            if !member.autodetected && !class.members[pos].autodetected {
                if let Some(location) = &member.location {
                    warnings.warn_at(
                        WarnKind::DupMember,
                        format!("{} {}#{} documented twice", member.tagname, class.name, member.name),
                        &location.path,
                        location.line,
                    );
                }
            }
            class.members[pos] = member;
        }
        None => class.members.push(member),
    }
}
