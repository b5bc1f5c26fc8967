//! Enrichment passes over the finished class graph.
//!
//! Passes run one after another in a fixed order because later passes read
//! what earlier ones produced (aliases read synthesized accessors, inheritdoc
//! reads resolved aliases, defaults must come after inheritance).

pub mod accessors;
pub mod aliases;
pub mod defaults;
pub mod enums;
pub mod ext4_events;
pub mod fires;
pub mod inherit_doc;
pub mod nodoc;
pub mod overrides;
pub mod references;
pub mod type_check;
pub mod versions;

use std::time::Instant;

use crate::config::{DocsConfig, PassOptions};
use crate::error::Result;
use crate::model::ClassId;
use crate::relations::Relations;
use crate::warnings::Warnings;

pub use versions::{SnapshotEntry, VersionSnapshot, load_snapshots};

/// Shared state handed to every pass.
pub struct PassContext<'a> {
    pub config: &'a DocsConfig,
    pub snapshots: &'a [VersionSnapshot],
    pub warnings: &'a mut Warnings,
}

pub trait Pass {
    fn name(&self) -> &'static str;

    fn enabled(&self, options: &PassOptions) -> bool;

    /// Returns how many entities the pass touched, for the run summary.
    fn run(&self, relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<usize>;
}

/// Every pass, in execution order.
pub fn all_passes() -> Vec<Box<dyn Pass>> {
    vec![
        Box::new(accessors::Accessors),
        Box::new(aliases::Aliases),
        Box::new(overrides::Overrides),
        Box::new(inherit_doc::InheritDoc),
        Box::new(enums::Enums),
        Box::new(ext4_events::Ext4Events),
        Box::new(fires::Fires),
        Box::new(versions::Versions),
        Box::new(type_check::TypeCheck),
        Box::new(references::References),
        Box::new(defaults::Defaults),
        Box::new(nodoc::Nodoc),
    ]
}

/// Run every pass enabled in `ctx.config.passes`.
pub fn run_passes(relations: &mut Relations, ctx: &mut PassContext<'_>) -> Result<()> {
    for pass in all_passes() {
        if !pass.enabled(&ctx.config.passes) {
            tracing::debug!(pass = pass.name(), "pass disabled");
            continue;
        }
        let started = Instant::now();
        let touched = pass.run(relations, ctx)?;
        tracing::info!(
            pass = pass.name(),
            touched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pass finished"
        );
    }
    Ok(())
}

/// Arena ids of every class, in order.
pub(crate) fn class_ids(relations: &Relations) -> impl Iterator<Item = ClassId> + use<> {
    (0..relations.len()).map(|index| ClassId(index as u32))
}

/// `foo` → `Foo`.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
