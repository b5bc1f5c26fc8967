//! `Object` for anything still untyped once inheritance is done.

use super::{Pass, PassContext};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{Param, Tagname};
use crate::relations::Relations;

pub struct Defaults;

const DEFAULT_TYPE: &str = "Object";

impl Pass for Defaults {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.defaults
    }

    fn run(&self, relations: &mut Relations, _ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut filled = 0;
        for class in relations.classes_mut() {
            for member in &mut class.members {
                if matches!(member.tagname, Tagname::Cfg | Tagname::Property) && member.type_.is_none() {
                    member.type_ = Some(DEFAULT_TYPE.to_string());
                    filled += 1;
                }
                filled += fill(&mut member.params);
                filled += fill(&mut member.properties);
                if let Some(return_) = &mut member.return_ {
                    filled += fill(&mut return_.properties);
                }
            }
        }
        Ok(filled)
    }
}

fn fill(params: &mut [Param]) -> usize {
    let mut filled = 0;
    for param in params {
        if param.type_.is_none() {
            param.type_ = Some(DEFAULT_TYPE.to_string());
            filled += 1;
        }
        filled += fill(&mut param.properties);
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::model::{Class, Member};
    use crate::warnings::Warnings;

    #[test]
    fn fills_untyped_params_cfgs_and_sub_properties() {
        let mut class = Class::new("Foo");
        let mut method = Member::new(Tagname::Method, "foo");
        method.params = vec![
            Param::new("x"),
            Param {
                type_: Some("String".to_string()),
                properties: vec![Param::new("nested")],
                ..Param::new("y")
            },
        ];
        let mut event = Member::new(Tagname::Event, "done");
        event.params = vec![Param::new("result")];
        class.members = vec![method, Member::new(Tagname::Cfg, "size"), event];
        let mut relations = Relations::new(vec![class]);

        let config = DocsConfig::default();
        let mut warnings = Warnings::default();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        assert_eq!(Defaults.run(&mut relations, &mut ctx).unwrap(), 4);
        assert_eq!(Defaults.run(&mut relations, &mut ctx).unwrap(), 0);

        let members = &relations.classes()[0].members;
        assert_eq!(members[0].params[0].type_.as_deref(), Some("Object"));
        assert_eq!(members[0].params[1].type_.as_deref(), Some("String"));
        assert_eq!(members[0].params[1].properties[0].type_.as_deref(), Some("Object"));
        assert_eq!(members[1].type_.as_deref(), Some("Object"));
        assert_eq!(members[2].type_, None);
    }
}
