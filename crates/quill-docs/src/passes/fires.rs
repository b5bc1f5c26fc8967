//! Fired events and called methods, closed over the call graph.
//!
//! A method fires what its own body fires plus whatever every method it calls
//! on `this` fires, recursively. Each query walks the graph depth first with
//! its own visited set, so recursion and mutual recursion stop at the first
//! repeat. A method with an explicit `@fires` is never recomputed and stops
//! propagation: callers see its declared events only.

use rustc_hash::FxHashSet;

use super::{Pass, PassContext, class_ids};
use crate::config::PassOptions;
use crate::error::Result;
use crate::model::{ClassId, Tagname, push_unique};
use crate::relations::{MemberFilter, MemberHandle, Relations};

pub struct Fires;

impl Pass for Fires {
    fn name(&self) -> &'static str {
        "fires"
    }

    fn enabled(&self, options: &PassOptions) -> bool {
        options.fires
    }

    fn run(&self, relations: &mut Relations, _ctx: &mut PassContext<'_>) -> Result<usize> {
        let mut updates = Vec::new();
        for id in class_ids(relations) {
            for handle in relations.local_handles(id) {
                let member = relations.member(handle);
                if member.tagname != Tagname::Method || member.explicit_fires {
                    continue;
                }
                let Some(body) = &member.body else {
                    continue;
                };
                let fires = fired_events(relations, id, handle);
                let calls = body.method_calls.clone();
                if member.fires != fires || member.method_calls != calls {
                    updates.push((handle, fires, calls));
                }
            }
        }
        let touched = updates.len();
        for (handle, fires, calls) in updates {
            let member = relations.member_mut(handle);
            member.fires = fires;
            member.method_calls = calls;
        }
        Ok(touched)
    }
}

/// Events `method` can cause to fire, in first-discovery order. `class` is
/// the class `this` refers to when resolving calls.
pub fn fired_events(relations: &Relations, class: ClassId, method: MemberHandle) -> Vec<String> {
    let static_ = relations.member(method).static_;
    let mut visited = FxHashSet::default();
    let mut out = Vec::new();
    collect(relations, class, static_, method, &mut visited, &mut out);
    out
}

fn collect(
    relations: &Relations,
    class: ClassId,
    static_: bool,
    handle: MemberHandle,
    visited: &mut FxHashSet<MemberHandle>,
    out: &mut Vec<String>,
) {
    if !visited.insert(handle) {
        return;
    }
    let member = relations.member(handle);
    let body = match &member.body {
        Some(body) if !member.explicit_fires => body,
        _ => {
            for event in &member.fires {
                push_unique(out, event.as_str());
            }
            return;
        }
    };
    for event in &body.fires {
        push_unique(out, event.as_str());
    }
    for call in &body.method_calls {
        let filter = MemberFilter::named(call).tagname(Tagname::Method).static_(static_);
        if let Some(callee) = relations.find_handles(class, filter).into_iter().next() {
            collect(relations, class, static_, callee, visited, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::code::BodyFacts;
    use crate::config::DocsConfig;
    use crate::model::{Class, Member};
    use crate::warnings::Warnings;

    fn method(name: &str, fires: &[&str], calls: &[&str]) -> Member {
        let mut member = Member::new(Tagname::Method, name);
        member.body = Some(BodyFacts {
            fires: fires.iter().map(|s| s.to_string()).collect(),
            method_calls: calls.iter().map(|s| s.to_string()).collect(),
            returns_this: false,
        });
        member
    }

    fn run(relations: &mut Relations) -> usize {
        let config = DocsConfig::default();
        let mut warnings = Warnings::default();
        let mut ctx = PassContext {
            config: &config,
            snapshots: &[],
            warnings: &mut warnings,
        };
        Fires.run(relations, &mut ctx).unwrap()
    }

    fn fires_of<'r>(relations: &'r Relations, class: &str, name: &str) -> &'r [String] {
        let id = format!("method-{name}");
        &relations.get(class).unwrap().find_local(&id).unwrap().fires
    }

    #[test]
    fn closes_over_calls_including_inherited_methods() {
        let mut parent = Class::new("Base");
        parent.members = vec![method("save", &["beforesave", "save"], &["sync"])];
        let mut child = Class::new("Form");
        child.extends = Some("Base".to_string());
        child.members = vec![
            method("submit", &["submit"], &["validate", "save", "unknown"]),
            method("validate", &["validate", "submit"], &[]),
            method("sync", &["sync"], &[]),
        ];
        let mut relations = Relations::new(vec![parent, child]);
        run(&mut relations);
        assert_eq!(
            fires_of(&relations, "Form", "submit"),
            ["submit", "validate", "beforesave", "save", "sync"]
        );
        let calls = &relations.get("Form").unwrap().members[0].method_calls;
        assert_eq!(calls, &["validate", "save", "unknown"]);
    }

    #[test]
    fn recursion_terminates_with_direct_events() {
        let mut class = Class::new("Loop");
        class.members = vec![
            method("a", &["a"], &["a", "b"]),
            method("b", &["b"], &["a"]),
        ];
        let mut relations = Relations::new(vec![class]);
        run(&mut relations);
        assert_eq!(fires_of(&relations, "Loop", "a"), ["a", "b"]);
        assert_eq!(fires_of(&relations, "Loop", "b"), ["b", "a"]);
        assert_eq!(run(&mut relations), 0);
    }

    #[test]
    fn explicit_fires_block_propagation() {
        let mut declared = method("declared", &["hidden"], &["deep"]);
        declared.fires = vec!["declared".to_string()];
        declared.explicit_fires = true;
        let mut class = Class::new("Foo");
        class.members = vec![
            method("caller", &[], &["declared"]),
            declared,
            method("deep", &["deep"], &[]),
        ];
        let mut relations = Relations::new(vec![class]);
        run(&mut relations);
        assert_eq!(fires_of(&relations, "Foo", "caller"), ["declared"]);
        assert_eq!(fires_of(&relations, "Foo", "declared"), ["declared"]);
    }

    /// Reference closure over plain indices.
    fn reference(graph: &[(Vec<usize>, Vec<usize>)], start: usize) -> Vec<String> {
        fn walk(graph: &[(Vec<usize>, Vec<usize>)], node: usize, seen: &mut Vec<usize>, out: &mut Vec<String>) {
            if seen.contains(&node) {
                return;
            }
            seen.push(node);
            for event in &graph[node].0 {
                let event = format!("e{event}");
                if !out.contains(&event) {
                    out.push(event);
                }
            }
            for callee in &graph[node].1 {
                walk(graph, *callee, seen, out);
            }
        }
        let mut out = Vec::new();
        walk(graph, start, &mut Vec::new(), &mut out);
        out
    }

    fn graph_strategy() -> impl Strategy<Value = Vec<(Vec<usize>, Vec<usize>)>> {
        (1usize..8).prop_flat_map(|size| {
            prop::collection::vec(
                (
                    prop::collection::vec(0usize..5, 0..3),
                    prop::collection::vec(0..size, 0..4),
                ),
                size,
            )
        })
    }

    proptest! {
        #[test]
        fn closure_terminates_and_matches_reachable_events(graph in graph_strategy()) {
            let mut class = Class::new("G");
            class.members = graph
                .iter()
                .enumerate()
                .map(|(index, (fires, calls))| {
                    let fires: Vec<String> = fires.iter().map(|e| format!("e{e}")).collect();
                    let calls: Vec<String> = calls.iter().map(|c| format!("m{c}")).collect();
                    let fires: Vec<&str> = fires.iter().map(String::as_str).collect();
                    let calls: Vec<&str> = calls.iter().map(String::as_str).collect();
                    method(&format!("m{index}"), &fires, &calls)
                })
                .collect();
            let mut relations = Relations::new(vec![class]);
            run(&mut relations);

            for index in 0..graph.len() {
                let fires = fires_of(&relations, "G", &format!("m{index}"));
                prop_assert_eq!(fires.to_vec(), reference(&graph, index));
            }
        }
    }
}
