//! Report public classes and members left without documentation.

use super::{Pass, PassContext};
use crate::config::PassOptions;
use crate::error::Result;
use crate::relations::Relations;
use crate::warnings::WarnKind;

pub struct Nodoc;

impl Pass for Nodoc {
    fn name(&self) -> &'static str {
        "nodoc"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.nodoc
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut reported = 0;
        for class in relations.classes() {
            if !class.private && class.doc.is_empty() {
                let message = format!("no documentation for class {}", class.name);
                match &class.location {
                    Some(location) => ctx.warnings.warn_at(WarnKind::Nodoc, message, &location.path, location.line),
                    None => ctx.warnings.warn(WarnKind::Nodoc, message),
                }
                reported += 1;
            }
            let undocumented = class.members.iter().filter(|m| m.is_public() && m.doc.is_empty());
            for member in undocumented {
                let message = format!("no documentation for {} {}#{}", member.tagname, class.name, member.name);
                match &member.location {
                    Some(location) => ctx.warnings.warn_at(WarnKind::Nodoc, message, &location.path, location.line),
                    None => ctx.warnings.warn(WarnKind::Nodoc, message),
                }
                reported += 1;
            }
        }
        Ok(reported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsConfig;
    use crate::model::{Class, Member, Tagname};
    use crate::warnings::Warnings;

    #[test]
    fn reports_public_undocumented_entities_when_enabled() {
        let mut class = Class::new("Foo");
        let mut documented = Member::new(Tagname::Method, "documented");
        documented.doc = "Does things.".to_string();
        let mut private = Member::new(Tagname::Method, "hidden");
        private.private = true;
        class.members = vec![documented, private, Member::new(Tagname::Cfg, "bare")];
        let mut relations = Relations::new(vec![class]);

        let config = DocsConfig::default();
        let mut warnings = Warnings::with_rules(["+nodoc"]).unwrap();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        assert_eq!(Nodoc.run(&mut relations, &mut ctx).unwrap(), 2);
        let messages: Vec<_> = warnings.emitted().iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["no documentation for class Foo", "no documentation for cfg Foo#bare"]
        );
    }
}
