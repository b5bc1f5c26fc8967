//! `@inheritdoc` and implicit documentation inheritance.
//!
//! Members tagged `@inheritdoc`, and autodetected members without docs, take
//! whatever they leave unset from a parent member. Parents that are
//! themselves inheriting are followed until one with its own docs is found.
//! Privacy is never inherited.

use rustc_hash::FxHashSet;

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{ClassId, Member, Param, Return, Tagname, Throws};
use crate::relations::{MemberFilter, MemberHandle, Relations};
use crate::warnings::WarnKind;

pub struct InheritDoc;

#[derive(Default)]
struct Inherited {
    doc: Option<String>,
    type_: Option<String>,
    params: Option<Vec<Param>>,
    return_: Option<Return>,
    throws: Option<Vec<Throws>>,
    /// Autodetected property that turned out to be a parent's cfg.
    retag: Option<Tagname>,
}

impl Pass for InheritDoc {
    fn name(&self) -> &'static str {
        "inherit_doc"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.inherit_doc
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut updates = Vec::new();
        for id in class_ids(relations) {
            for handle in relations.local_handles(id) {
                let member = relations.member(handle);
                let explicit = member.inheritdoc.is_some();
                if !explicit && !(member.autodetected && member.doc.is_empty()) {
                    continue;
                }
                let mut visited = FxHashSet::default();
                visited.insert(handle);
                match resolve(relations, handle, &mut visited) {
                    Some(source) => updates.push((handle, inherit(member, relations.member(source)))),
                    None if explicit => {
                        let message = format!("@inheritdoc on {}#{} found nothing to inherit", member.owner, member.name);
                        match &member.location {
                            Some(location) => ctx.warnings.warn_at(
                                WarnKind::Inheritdoc,
                                message,
                                &location.path,
                                location.line,
                            ),
                            None => ctx.warnings.warn(WarnKind::Inheritdoc, message),
                        }
                    }
                    None => {}
                }
            }
        }

        let mut touched = 0;
        let mut retagged = false;
        for (handle, inherited) in updates {
            let member = relations.member_mut(handle);
            let mut changed = false;
            if let Some(doc) = inherited.doc {
                member.doc = doc;
                changed = true;
            }
            if let Some(type_) = inherited.type_ {
                member.type_ = Some(type_);
                changed = true;
            }
            if let Some(params) = inherited.params {
                member.params = params;
                changed = true;
            }
            if let Some(return_) = inherited.return_ {
                member.return_ = Some(return_);
                changed = true;
            }
            if let Some(throws) = inherited.throws {
                member.throws = throws;
                changed = true;
            }
            if let Some(tagname) = inherited.retag {
                member.tagname = tagname;
                member.refresh_id();
                retagged = true;
                changed = true;
            }
            touched += usize::from(changed);
        }
        if retagged {
            relations.invalidate();
        }
        Ok(touched)
    }
}

/// Follow parents until one carries its own docs.
fn resolve(relations: &Relations, handle: MemberHandle, visited: &mut FxHashSet<MemberHandle>) -> Option<MemberHandle> {
    let parent = find_parent(relations, handle)?;
    if !visited.insert(parent) {
        return None;
    }
    let member = relations.member(parent);
    let inheriting = member.doc.is_empty() && (member.inheritdoc.is_some() || member.autodetected);
    if inheriting {
        resolve(relations, parent, visited).or(Some(parent))
    } else {
        Some(parent)
    }
}

fn find_parent(relations: &Relations, handle: MemberHandle) -> Option<MemberHandle> {
    let member = relations.member(handle);
    let owner = handle.class;
    let Some(link) = &member.inheritdoc else {
        // Autodetected: same name and static-ness, any kind.
        let filter = MemberFilter::named(&member.name).static_(member.static_);
        return first_in_ancestors(relations, owner, handle, filter);
    };

    let name = link.member.as_deref().unwrap_or(&member.name);
    let mut filter = MemberFilter::named(name).static_(link.static_ || (link.member.is_none() && member.static_));
    match (link.tagname, link.member.is_some()) {
        (Some(tagname), _) => filter = filter.tagname(tagname),
        (None, false) => filter = filter.tagname(member.tagname),
        (None, true) => {}
    }
    match link.class.as_deref() {
        Some(class) => {
            let id = relations.id_of(class)?;
            relations
                .find_handles(id, filter)
                .into_iter()
                .find(|candidate| *candidate != handle)
        }
        None if link.member.is_some() => relations
            .find_handles(owner, filter)
            .into_iter()
            .find(|candidate| *candidate != handle),
        None => first_in_ancestors(relations, owner, handle, filter),
    }
}

/// Nearest match among mixins, then the superclass.
fn first_in_ancestors(
    relations: &Relations,
    owner: ClassId,
    handle: MemberHandle,
    filter: MemberFilter<'_>,
) -> Option<MemberHandle> {
    relations
        .mixins(owner)
        .into_iter()
        .chain(relations.parent(owner))
        .filter(|source| *source != owner)
        .find_map(|source| {
            relations
                .find_handles(source, filter)
                .into_iter()
                .find(|candidate| *candidate != handle)
        })
}

fn inherit(member: &Member, source: &Member) -> Inherited {
    let mut out = Inherited::default();
    if member.doc.is_empty() && !source.doc.is_empty() {
        out.doc = Some(source.doc.clone());
    }
    if member.type_.is_none() {
        out.type_ = source.type_.clone();
    }
    let own_params_documented = member.params.iter().any(Param::is_documented);
    if !own_params_documented && !source.params.is_empty() && member.params != source.params {
        out.params = Some(source.params.clone());
    }
    if member.return_.is_none() {
        out.return_ = source.return_.clone();
    }
    if member.throws.is_empty() && !source.throws.is_empty() {
        out.throws = Some(source.throws.clone());
    }
    if member.autodetected && member.tagname == Tagname::Property && source.tagname == Tagname::Cfg {
        out.retag = Some(Tagname::Cfg);
    }
    out
}
