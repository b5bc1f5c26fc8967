//! Report class references that lead nowhere: unknown parents and mixins,
//! inheritance cycles and `{@link}` targets that name no class or member.

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{MemberLink, SourceLocation};
use crate::relations::{MemberFilter, Relations};
use crate::type_expr::KnownTypes;
use crate::warnings::{WarnKind, Warnings};

pub struct References;

impl Pass for References {
    fn name(&self) -> &'static str {
        "references"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.references
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut known = KnownTypes::new(ctx.config.external_classes.iter().cloned());
        for class in relations.classes() {
            known.extend(class.all_names());
        }

        let mut checked = 0;
        for id in class_ids(relations) {
            let class = relations.class(id);
            let location = class.location.as_ref();
            for parent in class.extends.iter().chain(&class.mixins) {
                checked += 1;
                if !known.contains(parent) {
                    report(
                        ctx.warnings,
                        WarnKind::Extend,
                        format!("class {} extends or mixes in unknown class {parent}", class.name),
                        location,
                    );
                }
            }
            if relations.has_extends_cycle(id) {
                report(
                    ctx.warnings,
                    WarnKind::Extend,
                    format!("class {} is its own ancestor", class.name),
                    location,
                );
            }

            for target in link_targets(&class.doc) {
                checked += 1;
                if !resolves(relations, &known, target, &class.name) {
                    report(
                        ctx.warnings,
                        WarnKind::Link,
                        format!("link to unknown {target} in {}", class.name),
                        location,
                    );
                }
            }
            for member in &class.members {
                for target in link_targets(&member.doc) {
                    checked += 1;
                    if !resolves(relations, &known, target, &member.owner) {
                        report(
                            ctx.warnings,
                            WarnKind::Link,
                            format!("link to unknown {target} in {}#{}", member.owner, member.name),
                            member.location.as_ref(),
                        );
                    }
                }
            }
        }
        Ok(checked)
    }
}

/// Targets of every `{@link target text}` in `doc`.
fn link_targets(doc: &str) -> impl Iterator<Item = &str> {
    doc.match_indices("{@link").filter_map(move |(start, tag)| {
        let rest = doc[start + tag.len()..].trim_start();
        let end = rest.find(|c: char| c.is_whitespace() || c == '}')?;
        Some(&rest[..end]).filter(|target| !target.is_empty())
    })
}

/// A bare `#member` target refers to `owner`. Members of external classes
/// cannot be checked and are trusted.
fn resolves(relations: &Relations, known: &KnownTypes, target: &str, owner: &str) -> bool {
    let link = MemberLink::parse(target);
    let class = link.class.as_deref().unwrap_or(owner);
    let Some(id) = relations.id_of(class) else {
        return known.contains(class);
    };
    let Some(name) = link.member.as_deref() else {
        return true;
    };
    let mut filter = MemberFilter::named(name);
    if let Some(tagname) = link.tagname {
        filter = filter.tagname(tagname);
    }
    if link.static_ {
        filter = filter.static_(true);
    }
    !relations.find_members(id, filter).is_empty()
}

fn report(warnings: &mut Warnings, kind: WarnKind, message: String, location: Option<&SourceLocation>) {
    match location {
        Some(location) => warnings.warn_at(kind, message, &location.path, location.line),
        None => warnings.warn(kind, message),
    }
}
