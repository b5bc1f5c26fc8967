//! `@alias Class#member` resolution.

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{Member, MemberLink, Param, Return, Tagname};
use crate::relations::{MemberFilter, MemberHandle, Relations};
use crate::warnings::{WarnKind, Warnings};

pub struct Aliases;

struct AliasCopy {
    target: MemberHandle,
    doc: String,
    params: Option<Vec<Param>>,
    return_: Option<Return>,
}

impl Pass for Aliases {
    fn name(&self) -> &'static str {
        "aliases"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.aliases
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut copies = Vec::new();
        for id in class_ids(relations) {
            for handle in relations.local_handles(id) {
                let member = relations.member(handle);
                let Some(link) = &member.alias else {
                    continue;
                };
                if let Some(copy) = plan(relations, handle, member, link, ctx.warnings) {
                    copies.push(copy);
                }
            }
        }
        let touched = copies.len();
        for copy in copies {
            let alias = relations.member_mut(copy.target);
            alias.doc = copy.doc;
            if let Some(params) = copy.params {
                alias.params = params;
            }
            if copy.return_.is_some() {
                alias.return_ = copy.return_;
            }
        }
        Ok(touched)
    }
}

fn plan(
    relations: &Relations,
    handle: MemberHandle,
    alias: &Member,
    link: &MemberLink,
    warnings: &mut Warnings,
) -> Option<AliasCopy> {
    let Some(original) = resolve(relations, alias, link) else {
        warn(warnings, alias, format!("{}#{} alias target not found", alias.owner, alias.name));
        return None;
    };
    if !matches!(original.tagname, Tagname::Method | Tagname::Event) {
        warn(
            warnings,
            alias,
            format!("{}#{} aliases a {}, only methods and events can be aliased", alias.owner, alias.name, original.tagname),
        );
        return None;
    }

    let doc = combined_doc(&alias.doc, &original.doc);
    let params = (alias.params.is_empty() && !original.params.is_empty()).then(|| original.params.clone());
    let return_ = if alias.return_.is_none() {
        original.return_.clone()
    } else {
        None
    };
    Some(AliasCopy {
        target: handle,
        doc,
        params,
        return_,
    })
}

/// `aliasDoc\n\noriginalDoc`, applied once.
fn combined_doc(own: &str, original: &str) -> String {
    if original.is_empty() || own == original || own.ends_with(&format!("\n\n{original}")) {
        own.to_string()
    } else if own.is_empty() {
        original.to_string()
    } else {
        format!("{own}\n\n{original}")
    }
}

fn resolve<'r>(relations: &'r Relations, alias: &Member, link: &MemberLink) -> Option<&'r Member> {
    let class = link.class.as_deref().unwrap_or(&alias.owner);
    let id = relations.id_of(class)?;
    let name = link.member.as_deref().unwrap_or(&alias.name);
    let mut filter = MemberFilter::named(name).static_(link.static_);
    if let Some(tagname) = link.tagname {
        filter = filter.tagname(tagname);
    }
    relations
        .find_members(id, filter)
        .into_iter()
        .find(|m| !(m.owner == alias.owner && m.id == alias.id))
}

fn warn(warnings: &mut Warnings, member: &Member, message: String) {
    match &member.location {
        Some(location) => warnings.warn_at(WarnKind::Alias, message, &location.path, location.line),
        None => warnings.warn(WarnKind::Alias, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::model::Class;

    fn class(name: &str, members: Vec<Member>) -> Class {
        let mut class = Class::new(name);
        class.members = members
            .into_iter()
            .map(|mut m| {
                m.owner = name.to_string();
                m
            })
            .collect();
        class
    }

    fn run(relations: &mut Relations) -> Warnings {
        let config = DocsConfig::default();
        let mut warnings = Warnings::default();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        Aliases.run(relations, &mut ctx).unwrap();
        warnings
    }

    fn original() -> Member {
        let mut bar = Member::new(Tagname::Method, "bar");
        bar.doc = "Original comment.".to_string();
        bar.params = vec![Param::new("x")];
        bar
    }

    fn alias_of(link: &str) -> Member {
        let mut foobar = Member::new(Tagname::Method, "foobar");
        foobar.alias = Some(MemberLink::parse(link));
        foobar
    }

    #[test]
    fn copies_doc_and_params() {
        let mut relations = Relations::new(vec![
            class("Foo", vec![original()]),
            class("Core", vec![alias_of("Foo#bar")]),
        ]);
        run(&mut relations);
        let foobar = relations.get("Core").unwrap().find_local("method-foobar").unwrap();
        assert_eq!(foobar.doc, "Original comment.");
        assert_eq!(foobar.params[0].name, "x");
    }

    #[test]
    fn own_doc_is_prepended_once() {
        let mut alias = alias_of("Foo#bar");
        alias.doc = "Alias note.".to_string();
        let mut relations = Relations::new(vec![class("Foo", vec![original()]), class("Core", vec![alias])]);
        run(&mut relations);
        run(&mut relations);
        let foobar = relations.get("Core").unwrap().find_local("method-foobar").unwrap();
        assert_eq!(foobar.doc, "Alias note.\n\nOriginal comment.");
    }

    #[test]
    fn cfg_targets_are_refused() {
        let mut relations = Relations::new(vec![
            class("Foo", vec![Member::new(Tagname::Cfg, "bar")]),
            class("Core", vec![alias_of("Foo#bar")]),
        ]);
        let warnings = run(&mut relations);
        assert_eq!(warnings.count(WarnKind::Alias), 1);
        let foobar = relations.get("Core").unwrap().find_local("method-foobar").unwrap();
        assert!(foobar.doc.is_empty());
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let mut relations = Relations::new(vec![class("Core", vec![alias_of("Nope#bar")])]);
        let warnings = run(&mut relations);
        assert_eq!(warnings.count(WarnKind::Alias), 1);
    }
}
