//! `@enum` classes: values become public properties typed by the enum.

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{Class, Tagname};
use crate::relations::Relations;
use crate::warnings::WarnKind;

pub struct Enums;

impl Pass for Enums {
    fn name(&self) -> &'static str {
        "enums"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.enums
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut touched = 0;
        let mut retagged = false;
        for id in class_ids(relations) {
            let class = relations.class_mut(id);
            if class.enum_.is_none() {
                continue;
            }
            retagged |= expand(class);
            touched += 1;

            let untyped = class.enum_.as_ref().is_some_and(|info| info.type_.is_none());
            if class.members.is_empty() || untyped {
                let problem = if class.members.is_empty() { "has no values" } else { "has no type" };
                let message = format!("enum {} {problem}", class.name);
                match &class.location {
                    Some(location) => ctx.warnings.warn_at(WarnKind::Enum, message, &location.path, location.line),
                    None => ctx.warnings.warn(WarnKind::Enum, message),
                }
            }
        }
        if retagged {
            relations.invalidate();
        }
        Ok(touched)
    }
}

/// Returns true when a member changed kind.
fn expand(class: &mut Class) -> bool {
    let mut retagged = false;
    for member in &mut class.members {
        if member.tagname == Tagname::Cfg {
            member.tagname = Tagname::Property;
            member.refresh_id();
            retagged = true;
        }
    }

    let Some(info) = class.enum_.as_mut() else {
        return retagged;
    };
    if info.type_.is_none() {
        // A single literal kind across all values names the enum type.
        let mut kinds = class.members.iter().filter_map(|m| m.type_.as_deref());
        if let Some(first) = kinds.next() {
            if kinds.all(|kind| kind == first) {
                info.type_ = Some(first.to_string());
            }
        }
    }
    for member in &mut class.members {
        if member.tagname == Tagname::Property && member.type_.is_none() {
            member.type_ = info.type_.clone();
        }
    }
    let values: Vec<String> = class
        .members
        .iter()
        .filter(|m| m.tagname == Tagname::Property && !m.static_)
        .map(|m| format!("{}.{}", class.name, m.name))
        .collect();
    info.default = (!values.is_empty()).then(|| format!("One of {}", values.join(", ")));
    retagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::model::{EnumInfo, Member};
    use crate::warnings::Warnings;

    fn run(relations: &mut Relations) -> Warnings {
        let config = DocsConfig::default();
        let mut warnings = Warnings::default();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        Enums.run(relations, &mut ctx).unwrap();
        warnings
    }

    fn value(name: &str, type_: Option<&str>, default: &str) -> Member {
        let mut member = Member::new(Tagname::Property, name);
        member.owner = "My.Color".to_string();
        member.type_ = type_.map(str::to_string);
        member.default = Some(default.to_string());
        member.autodetected = true;
        member
    }

    #[test]
    fn values_take_enum_type_and_default_lists_them() {
        let mut class = Class::new("My.Color");
        class.enum_ = Some(EnumInfo {
            type_: Some("String".to_string()),
            default: None,
        });
        class.members = vec![value("RED", None, "'red'"), value("BLUE", None, "'blue'")];
        let mut relations = Relations::new(vec![class]);
        let warnings = run(&mut relations);
        assert!(warnings.emitted().is_empty());

        let class = &relations.classes()[0];
        assert!(class.members.iter().all(|m| m.type_.as_deref() == Some("String")));
        assert_eq!(
            class.enum_.as_ref().unwrap().default.as_deref(),
            Some("One of My.Color.RED, My.Color.BLUE")
        );
    }

    #[test]
    fn type_is_inferred_from_uniform_literals() {
        let mut class = Class::new("My.Size");
        class.enum_ = Some(EnumInfo::default());
        let mut cfg = value("SMALL", Some("Number"), "1");
        cfg.tagname = Tagname::Cfg;
        cfg.refresh_id();
        class.members = vec![cfg, value("LARGE", Some("Number"), "3")];
        let mut relations = Relations::new(vec![class]);
        run(&mut relations);
        let class = &relations.classes()[0];
        assert_eq!(class.enum_.as_ref().unwrap().type_.as_deref(), Some("Number"));
        assert_eq!(class.members[0].id, "property-SMALL");
    }

    #[test]
    fn empty_enum_warns() {
        let mut class = Class::new("Empty");
        class.enum_ = Some(EnumInfo {
            type_: Some("String".to_string()),
            default: None,
        });
        let mut relations = Relations::new(vec![class]);
        assert_eq!(run(&mut relations).count(WarnKind::Enum), 1);
    }
}
