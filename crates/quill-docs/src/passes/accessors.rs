//! Getter/setter synthesis for `accessor` cfgs.

use super::{Pass, PassContext, capitalize, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{Class, Member, Param, Return, Tagname};
use crate::relations::Relations;

pub struct Accessors;

impl Pass for Accessors {
    fn name(&self) -> &'static str {
        "accessors"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.accessors
    }

    fn run(&self, relations: &mut Relations, _ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut added = 0;
        for id in class_ids(relations) {
            let class = relations.class_mut(id);
            let synthesized = synthesize(class);
            added += synthesized.len();
            class.members.extend(synthesized);
        }
        if added > 0 {
            relations.invalidate();
        }
        Ok(added)
    }
}

fn has_method(class: &Class, name: &str) -> bool {
    class
        .members
        .iter()
        .any(|m| m.tagname == Tagname::Method && !m.static_ && m.name == name)
}

fn synthesize(class: &Class) -> Vec<Member> {
    let mut out = Vec::new();
    let cfgs = class
        .members
        .iter()
        .filter(|m| m.tagname == Tagname::Cfg && m.accessor && !m.static_);
    for cfg in cfgs {
        let suffix = capitalize(&cfg.name);

        let getter_name = format!("get{suffix}");
        if !has_method(class, &getter_name) {
            let mut getter = accessor_method(cfg, getter_name);
            getter.doc = format!("Returns the value of {{@link #cfg-{}}}.", cfg.name);
            getter.return_ = Some(Return {
                type_: cfg.type_.clone(),
                ..Return::default()
            });
            out.push(getter);
        }

        let setter_name = format!("set{suffix}");
        if !has_method(class, &setter_name) {
            let mut setter = accessor_method(cfg, setter_name);
            setter.doc = format!("Sets the value of {{@link #cfg-{}}}.", cfg.name);
            setter.params = vec![Param {
                type_: cfg.type_.clone(),
                doc: "The new value.".to_string(),
                ..Param::new(cfg.name.clone())
            }];
            out.push(setter);
        }
    }
    out
}

fn accessor_method(cfg: &Member, name: String) -> Member {
    let mut method = Member::new(Tagname::Method, name);
    method.owner = cfg.owner.clone();
    method.private = cfg.private;
    method.protected = cfg.protected;
    method.deprecated = cfg.deprecated.clone();
    method.since = cfg.since.clone();
    method.location = cfg.location.clone();
    method
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::warnings::Warnings;

    fn run(relations: &mut Relations) -> usize {
        let config = DocsConfig::default();
        let mut warnings = Warnings::default();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        Accessors.run(relations, &mut ctx).unwrap()
    }

    fn class_with(members: Vec<Member>) -> Relations {
        let mut class = Class::new("Foo");
        class.members = members
            .into_iter()
            .map(|mut m| {
                m.owner = "Foo".to_string();
                m
            })
            .collect();
        Relations::new(vec![class])
    }

    #[test]
    fn synthesizes_getter_and_setter() {
        let mut cfg = Member::new(Tagname::Cfg, "title");
        cfg.accessor = true;
        cfg.type_ = Some("String".to_string());
        let mut relations = class_with(vec![cfg]);
        assert_eq!(run(&mut relations), 2);

        let class = &relations.classes()[0];
        let getter = class.find_local("method-getTitle").unwrap();
        assert_eq!(getter.doc, "Returns the value of {@link #cfg-title}.");
        assert_eq!(getter.return_.as_ref().unwrap().type_.as_deref(), Some("String"));
        let setter = class.find_local("method-setTitle").unwrap();
        assert_eq!(setter.params[0].name, "title");
        assert_eq!(setter.owner, "Foo");
    }

    #[test]
    fn keeps_existing_methods_and_is_idempotent() {
        let mut cfg = Member::new(Tagname::Cfg, "title");
        cfg.accessor = true;
        let mut own = Member::new(Tagname::Method, "getTitle");
        own.doc = "Custom.".to_string();
        let mut relations = class_with(vec![cfg, own]);
        assert_eq!(run(&mut relations), 1);
        assert_eq!(run(&mut relations), 0);
        let class = &relations.classes()[0];
        assert_eq!(class.find_local("method-getTitle").unwrap().doc, "Custom.");
        assert_eq!(class.members.len(), 3);
    }

    #[test]
    fn plain_cfgs_get_nothing() {
        let mut relations = class_with(vec![Member::new(Tagname::Cfg, "plain")]);
        assert_eq!(run(&mut relations), 0);
    }
}
