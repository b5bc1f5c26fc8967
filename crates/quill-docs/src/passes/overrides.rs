//! Materialise the lazily computed override links onto members.

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::relations::Relations;

pub struct Overrides;

impl Pass for Overrides {
    fn name(&self) -> &'static str {
        "overrides"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.overrides
    }

    fn run(&self, relations: &mut Relations, _ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut updates = Vec::new();
        for id in class_ids(relations) {
            for handle in relations.local_handles(id) {
                let links = relations.overrides_of(id, &relations.member(handle).id);
                if relations.member(handle).overrides != links {
                    updates.push((handle, links));
                }
            }
        }
        let touched = updates.len();
        for (handle, links) in updates {
            relations.member_mut(handle).overrides = links;
        }
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::model::{Class, Member, OverrideRef, Tagname};
    use crate::warnings::Warnings;

    #[test]
    fn links_shadowed_parent_members() {
        let mut parent = Class::new("Base");
        let mut base_run = Member::new(Tagname::Method, "run");
        base_run.owner = "Base".to_string();
        parent.members = vec![base_run];
        let mut child = Class::new("Child");
        child.extends = Some("Base".to_string());
        let mut run = Member::new(Tagname::Method, "run");
        run.owner = "Child".to_string();
        let mut own = Member::new(Tagname::Method, "own");
        own.owner = "Child".to_string();
        child.members = vec![run, own];
        let mut relations = Relations::new(vec![parent, child]);

        let config = DocsConfig::default();
        let mut warnings = Warnings::default();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        assert_eq!(Overrides.run(&mut relations, &mut ctx).unwrap(), 1);
        assert_eq!(Overrides.run(&mut relations, &mut ctx).unwrap(), 0);

        let child = relations.get("Child").unwrap();
        assert_eq!(
            child.members[0].overrides,
            vec![OverrideRef {
                owner: "Base".to_string(),
                id: "method-run".to_string(),
            }]
        );
        assert!(child.members[1].overrides.is_empty());
        assert!(relations.get("Base").unwrap().members[0].overrides.is_empty());
    }
}
