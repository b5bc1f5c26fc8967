//! Indexed class graph with inheritance-aware member lookup.
//!
//! Classes live in one arena and refer to each other by name only. Member
//! views are computed on first query and memoised per class; any pass that
//! adds, removes or re-keys members must call [`Relations::invalidate`].

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{Class, ClassId, Member, OverrideRef, Tagname};

/// Position of a member inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberHandle {
    pub class: ClassId,
    pub index: usize,
}

/// Criteria for [`Relations::find_members`]. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberFilter<'a> {
    pub name: Option<&'a str>,
    pub tagname: Option<Tagname>,
    pub static_: Option<bool>,
}

impl<'a> MemberFilter<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn tagname(mut self, tagname: Tagname) -> Self {
        self.tagname = Some(tagname);
        self
    }

    pub fn static_(mut self, static_: bool) -> Self {
        self.static_ = Some(static_);
        self
    }

    fn matches(&self, member: &Member) -> bool {
        self.name.is_none_or(|name| member.name == name)
            && self.tagname.is_none_or(|tagname| member.tagname == tagname)
            && self.static_.is_none_or(|static_| member.static_ == static_)
    }
}

#[derive(Debug, Default)]
struct Memo {
    /// Full member view per class: local first, then mixins, then parent.
    views: FxHashMap<ClassId, Rc<Vec<MemberHandle>>>,
    /// Local member id -> members it shadows, per class.
    overrides: FxHashMap<ClassId, FxHashMap<String, Vec<OverrideRef>>>,
}

#[derive(Debug)]
pub struct Relations {
    classes: Vec<Class>,
    names: FxHashMap<String, ClassId>,
    memo: RefCell<Memo>,
}

impl Relations {
    pub fn new(classes: Vec<Class>) -> Self {
        let mut relations = Self {
            classes,
            names: FxHashMap::default(),
            memo: RefCell::new(Memo::default()),
        };
        relations.reindex();
        relations
    }

    fn reindex(&mut self) {
        self.names.clear();
        for (index, class) in self.classes.iter_mut().enumerate() {
            class.id = ClassId(index as u32);
        }
        // Primary names are registered after alternates so they always win.
        for class in &self.classes {
            for alt in &class.alternate_class_names {
                self.names.entry(alt.clone()).or_insert(class.id);
            }
        }
        for class in &self.classes {
            self.names.insert(class.name.clone(), class.id);
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    /// Mutable access to every class. Callers changing member sets must
    /// invalidate afterwards.
    pub fn classes_mut(&mut self) -> &mut [Class] {
        &mut self.classes
    }

    pub fn into_classes(self) -> Vec<Class> {
        self.classes
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.names.get(name).copied()
    }

    /// Look a class up by its name or any alternate name.
    pub fn get(&self, name: &str) -> Option<&Class> {
        self.id_of(name).map(|id| self.class(id))
    }

    pub fn member(&self, handle: MemberHandle) -> &Member {
        &self.class(handle.class).members[handle.index]
    }

    pub fn member_mut(&mut self, handle: MemberHandle) -> &mut Member {
        &mut self.class_mut(handle.class).members[handle.index]
    }

    /// Handles of a class's own members, in declaration order.
    pub fn local_handles(&self, id: ClassId) -> impl Iterator<Item = MemberHandle> + '_ {
        (0..self.class(id).members.len()).map(move |index| MemberHandle { class: id, index })
    }

    pub fn parent(&self, id: ClassId) -> Option<ClassId> {
        self.class(id).extends.as_deref().and_then(|name| self.id_of(name))
    }

    pub fn mixins(&self, id: ClassId) -> Vec<ClassId> {
        self.class(id)
            .mixins
            .iter()
            .filter_map(|name| self.id_of(name))
            .collect()
    }

    /// Superclass chain, nearest first. Stops at the first repeated class.
    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.parent(parent);
        }
        chain
    }

    /// True when following `extends` from `id` comes back to a class already seen.
    pub fn has_extends_cycle(&self, id: ClassId) -> bool {
        let mut seen = FxHashSet::default();
        seen.insert(id);
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Members visible in a class: its own, then those inherited from
    /// mixins in declaration order, then from the superclass chain.
    ///
    /// Inherited members never include `@hide`d ones or non-inheritable
    /// statics, and a local member shadows every inherited one with the same id.
    pub fn find_members(&self, id: ClassId, filter: MemberFilter<'_>) -> Vec<&Member> {
        self.view(id)
            .iter()
            .map(|handle| self.member(*handle))
            .filter(|member| filter.matches(member))
            .collect()
    }

    /// Handles form of [`Relations::find_members`].
    pub fn find_handles(&self, id: ClassId, filter: MemberFilter<'_>) -> Vec<MemberHandle> {
        self.view(id)
            .iter()
            .copied()
            .filter(|handle| filter.matches(self.member(*handle)))
            .collect()
    }

    /// Members of other classes that the local member `member_id` shadows.
    pub fn overrides_of(&self, id: ClassId, member_id: &str) -> Vec<OverrideRef> {
        self.view(id);
        self.memo
            .borrow()
            .overrides
            .get(&id)
            .and_then(|by_member| by_member.get(member_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every memoised view.
    pub fn invalidate(&self) {
        let mut memo = self.memo.borrow_mut();
        memo.views.clear();
        memo.overrides.clear();
    }

    fn view(&self, id: ClassId) -> Rc<Vec<MemberHandle>> {
        let mut visiting = FxHashSet::default();
        let mut cut = Vec::new();
        self.view_inner(id, &mut visiting, &mut cut)
    }

    /// `cut` collects the classes whose back edge was dropped below this call.
    /// A view that lost a back edge to some other class is partial and is not
    /// memoised.
    fn view_inner(
        &self,
        id: ClassId,
        visiting: &mut FxHashSet<ClassId>,
        cut: &mut Vec<ClassId>,
    ) -> Rc<Vec<MemberHandle>> {
        if let Some(view) = self.memo.borrow().views.get(&id) {
            return Rc::clone(view);
        }
        if !visiting.insert(id) {
            // Cycle through extends/mixins: contribute nothing on the back edge.
            cut.push(id);
            return Rc::new(Vec::new());
        }
        let mark = cut.len();

        let class = self.class(id);
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut handles: Vec<MemberHandle> = Vec::with_capacity(class.members.len());
        for handle in self.local_handles(id) {
            if seen.insert(self.member(handle).id.as_str()) {
                handles.push(handle);
            }
        }

        let mut overrides: FxHashMap<String, Vec<OverrideRef>> = FxHashMap::default();
        let sources = self.mixins(id).into_iter().chain(self.parent(id));
        for source in sources {
            let inherited = self.view_inner(source, visiting, cut);
            for handle in inherited.iter().copied() {
                let member = self.member(handle);
                if !is_inheritable(member) {
                    continue;
                }
                if seen.insert(member.id.as_str()) {
                    handles.push(handle);
                } else if handle.class != id && class.find_local(&member.id).is_some() {
                    let shadowed = overrides.entry(member.id.clone()).or_default();
                    let link = OverrideRef {
                        owner: member.owner.clone(),
                        id: member.id.clone(),
                    };
                    if !shadowed.contains(&link) {
                        shadowed.push(link);
                    }
                }
            }
        }

        visiting.remove(&id);
        let below = cut.split_off(mark);
        cut.extend(below.into_iter().filter(|class| *class != id));
        let view = Rc::new(handles);
        if cut.len() == mark {
            let mut memo = self.memo.borrow_mut();
            memo.views.insert(id, Rc::clone(&view));
            memo.overrides.insert(id, overrides);
        }
        view
    }
}

fn is_inheritable(member: &Member) -> bool {
    !member.hide && (!member.static_ || member.inheritable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, extends: Option<&str>, mixins: &[&str], members: Vec<Member>) -> Class {
        let mut class = Class::new(name);
        class.extends = extends.map(str::to_string);
        class.mixins = mixins.iter().map(|m| m.to_string()).collect();
        class.members = members
            .into_iter()
            .map(|mut m| {
                m.owner = name.to_string();
                m
            })
            .collect();
        class
    }

    fn method(name: &str) -> Member {
        Member::new(Tagname::Method, name)
    }

    #[test]
    fn local_member_wins_over_mixin_and_parent() {
        let relations = Relations::new(vec![
            class("P", None, &[], vec![method("x")]),
            class("M", None, &[], vec![method("x")]),
            class("C", Some("P"), &["M"], vec![method("x")]),
        ]);
        let c = relations.id_of("C").unwrap();
        let found = relations.find_members(c, MemberFilter::named("x"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner, "C");
        let overrides = relations.overrides_of(c, "method-x");
        let owners: Vec<_> = overrides.iter().map(|o| o.owner.as_str()).collect();
        assert_eq!(owners, vec!["M", "P"]);
    }

    #[test]
    fn mixins_come_before_parent() {
        let relations = Relations::new(vec![
            class("P", None, &[], vec![method("x")]),
            class("M", None, &[], vec![method("x"), method("y")]),
            class("C", Some("P"), &["M"], vec![]),
        ]);
        let c = relations.id_of("C").unwrap();
        let found = relations.find_members(c, MemberFilter::default());
        let owners: Vec<_> = found.iter().map(|m| (m.owner.as_str(), m.name.as_str())).collect();
        assert_eq!(owners, vec![("M", "x"), ("M", "y")]);
    }

    #[test]
    fn hidden_and_static_members_are_not_inherited() {
        let mut hidden = method("secret");
        hidden.hide = true;
        let mut stat = method("make");
        stat.static_ = true;
        stat.refresh_id();
        let mut inheritable = method("create");
        inheritable.static_ = true;
        inheritable.inheritable = true;
        inheritable.refresh_id();
        let relations = Relations::new(vec![
            class("P", None, &[], vec![hidden, stat, inheritable]),
            class("C", Some("P"), &[], vec![]),
        ]);
        let p = relations.id_of("P").unwrap();
        let c = relations.id_of("C").unwrap();
        assert_eq!(relations.find_members(p, MemberFilter::default()).len(), 3);
        let inherited = relations.find_members(c, MemberFilter::default());
        assert_eq!(inherited.len(), 1);
        assert_eq!(inherited[0].id, "static-method-create");
        assert!(relations
            .find_members(c, MemberFilter::default().static_(false))
            .is_empty());
    }

    #[test]
    fn alternate_names_resolve() {
        let mut foo = class("Foo", None, &[], vec![]);
        foo.alternate_class_names = vec!["OldFoo".to_string()];
        let relations = Relations::new(vec![foo, class("Bar", Some("OldFoo"), &[], vec![])]);
        assert_eq!(relations.get("OldFoo").unwrap().name, "Foo");
        let bar = relations.id_of("Bar").unwrap();
        assert_eq!(relations.parent(bar), relations.id_of("Foo"));
    }

    #[test]
    fn cycles_terminate() {
        let relations = Relations::new(vec![
            class("A", Some("B"), &["A"], vec![method("a")]),
            class("B", Some("A"), &[], vec![method("b")]),
        ]);
        let a = relations.id_of("A").unwrap();
        let names: Vec<_> = relations
            .find_members(a, MemberFilter::default())
            .iter()
            .map(|m| m.name.clone())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(relations.has_extends_cycle(a));
        assert_eq!(relations.ancestors(a), vec![relations.id_of("B").unwrap()]);
    }

    #[test]
    fn cycle_views_do_not_depend_on_query_order() {
        let relations = Relations::new(vec![
            class("A", Some("B"), &[], vec![method("a")]),
            class("B", Some("A"), &[], vec![method("b")]),
        ]);
        let a = relations.id_of("A").unwrap();
        let b = relations.id_of("B").unwrap();
        let names = |id| -> Vec<String> {
            relations
                .find_members(id, MemberFilter::default())
                .iter()
                .map(|m| m.name.clone())
                .collect()
        };
        assert_eq!(names(b), vec!["b", "a"]);
        assert_eq!(names(a), vec!["a", "b"]);
        assert_eq!(names(b), vec!["b", "a"]);
    }

    #[test]
    fn invalidate_picks_up_new_members() {
        let mut relations = Relations::new(vec![
            class("P", None, &[], vec![]),
            class("C", Some("P"), &[], vec![]),
        ]);
        let p = relations.id_of("P").unwrap();
        let c = relations.id_of("C").unwrap();
        assert!(relations.find_members(c, MemberFilter::default()).is_empty());
        relations.class_mut(p).members.push(method("late"));
        assert!(relations.find_members(c, MemberFilter::default()).is_empty());
        relations.invalidate();
        assert_eq!(relations.find_members(c, MemberFilter::named("late")).len(), 1);
    }
}
