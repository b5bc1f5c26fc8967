//! Validate every type string against the known classes.

use super::{Pass, PassContext};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{Member, Param};
use crate::relations::Relations;
use crate::type_expr::{KnownTypes, TypeParser};
use crate::warnings::{WarnKind, Warnings};

pub struct TypeCheck;

impl Pass for TypeCheck {
    fn name(&self) -> &'static str {
        "type_check"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.type_check
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut known = KnownTypes::new(ctx.config.external_classes.iter().cloned());
        for class in relations.classes() {
            known.extend(class.all_names());
        }
        let parser = TypeParser::new(&known);

        let mut checked = 0;
        for class in relations.classes() {
            for member in &class.members {
                for type_ in member_types(member) {
                    checked += 1;
                    check(&parser, type_, member, ctx.warnings);
                }
            }
        }
        Ok(checked)
    }
}

fn member_types(member: &Member) -> Vec<&str> {
    let mut types = Vec::new();
    types.extend(member.type_.as_deref());
    collect_params(&member.params, &mut types);
    collect_params(&member.properties, &mut types);
    if let Some(return_) = &member.return_ {
        types.extend(return_.type_.as_deref());
        collect_params(&return_.properties, &mut types);
    }
    types.extend(member.throws.iter().filter_map(|t| t.type_.as_deref()));
    types
}

fn collect_params<'m>(params: &'m [Param], out: &mut Vec<&'m str>) {
    for param in params {
        out.extend(param.type_.as_deref());
        collect_params(&param.properties, out);
    }
}

fn check(parser: &TypeParser<'_>, type_: &str, member: &Member, warnings: &mut Warnings) {
    let result = parser.parse(type_);
    if result.matched {
        return;
    }
    let (kind, message) = match result.unknown_name {
        Some(name) => (
            WarnKind::TypeName,
            format!("unknown type {name} in {{{type_}}} of {}#{}", member.owner, member.name),
        ),
        None => (
            WarnKind::TypeSyntax,
            format!("invalid type syntax {{{type_}}} in {}#{}", member.owner, member.name),
        ),
    };
    match &member.location {
        Some(location) => warnings.warn_at(kind, message, &location.path, location.line),
        None => warnings.warn(kind, message),
    }
}
