//! Implicit trailing `eOpts` parameter on framework events.

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{Param, Tagname};
use crate::relations::Relations;

pub struct Ext4Events;

const EOPTS: &str = "eOpts";
const EOPTS_DOC: &str = "The options object passed to {@link Ext.util.Observable#addListener}.";

impl Pass for Ext4Events {
    fn name(&self) -> &'static str {
        "ext4_events"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.ext4_events
    }

    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize> {
        let forced = ctx.config.ext4_events;
        let mut touched = 0;
        for id in class_ids(relations) {
            let class = relations.class_mut(id);
            if !forced.unwrap_or(class.framework) {
                continue;
            }
            let events = class.members.iter_mut().filter(|m| m.tagname == Tagname::Event);
            for event in events {
                if event.params.last().is_some_and(|p| p.name == EOPTS) {
                    continue;
                }
                event.params.push(Param {
                    type_: Some("Object".to_string()),
                    doc: EOPTS_DOC.to_string(),
                    ..Param::new(EOPTS)
                });
                touched += 1;
            }
        }
        Ok(touched)
    }
}
