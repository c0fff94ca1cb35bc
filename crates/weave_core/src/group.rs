//! Checkbox group reducer
//!
//! A parent checkbox summarizes its members with a tri-state [`Aggregate`].
//! The aggregate is never stored independently: it is always recomputed from
//! the member flags, so it cannot drift. The parent can only be driven to
//! `All` or `None` (via [`GroupSet::set_parent`]); `Partial` is reachable only
//! through mixed members.

use crate::error::{Result, WeaveError};
use crate::events::ControlId;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

/// Tri-state summary of a group's members
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Aggregate {
    #[default]
    None,
    Partial,
    All,
}

impl Aggregate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::All => "all",
        }
    }

    /// The parent's checked flag
    pub fn is_checked(self) -> bool {
        self == Self::All
    }

    /// The parent's indeterminate flag
    pub fn is_indeterminate(self) -> bool {
        self == Self::Partial
    }
}

/// Reduce member flags to an aggregate.
///
/// An empty member list reduces to [`Aggregate::None`].
pub fn reduce<I>(members: I) -> Aggregate
where
    I: IntoIterator<Item = bool>,
{
    let mut total = 0usize;
    let mut checked = 0usize;
    for member in members {
        total += 1;
        if member {
            checked += 1;
        }
    }
    match checked {
        0 => Aggregate::None,
        n if n == total => Aggregate::All,
        _ => Aggregate::Partial,
    }
}

/// Result of a group mutation, ready to be rendered and published
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupChange {
    pub parent: ControlId,
    pub aggregate: Aggregate,
    pub checked_count: usize,
    pub total_count: usize,
    /// Members whose flag must be (re)applied to their visual mirror
    pub members: SmallVec<[(ControlId, bool); 8]>,
}

/// A parent checkbox and its ordered members
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckboxGroup {
    parent: ControlId,
    members: IndexMap<ControlId, bool>,
}

impl CheckboxGroup {
    fn new(parent: ControlId) -> Self {
        Self {
            parent,
            members: IndexMap::new(),
        }
    }

    pub fn parent(&self) -> &ControlId {
        &self.parent
    }

    pub fn aggregate(&self) -> Aggregate {
        reduce(self.members.values().copied())
    }

    pub fn checked_count(&self) -> usize {
        self.members.values().filter(|checked| **checked).count()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member flag, `None` if the id is not a member
    pub fn is_checked(&self, member: &str) -> Option<bool> {
        self.members.get(member).copied()
    }

    pub fn members(&self) -> impl Iterator<Item = (&ControlId, bool)> {
        self.members.iter().map(|(id, checked)| (id, *checked))
    }

    fn change(&self, members: SmallVec<[(ControlId, bool); 8]>) -> GroupChange {
        GroupChange {
            parent: self.parent.clone(),
            aggregate: self.aggregate(),
            checked_count: self.checked_count(),
            total_count: self.len(),
            members,
        }
    }

    /// Snapshot including every member, used for initial application
    pub fn snapshot(&self) -> GroupChange {
        self.change(
            self.members
                .iter()
                .map(|(id, checked)| (id.clone(), *checked))
                .collect(),
        )
    }
}

/// All checkbox groups of one page scope
#[derive(Debug, Default)]
pub struct GroupSet {
    groups: IndexMap<ControlId, CheckboxGroup>,
    /// member -> parent
    parents: FxHashMap<ControlId, ControlId>,
}

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `member` as belonging to `parent`, creating the group on first use.
    ///
    /// A member belongs to at most one group; redeclaring moves it.
    pub fn declare(
        &mut self,
        parent: impl Into<ControlId>,
        member: impl Into<ControlId>,
        checked: bool,
    ) {
        let parent = parent.into();
        let member = member.into();

        if let Some(previous) = self.parents.get(&member).cloned() {
            if previous != parent {
                self.remove_member(member.as_str());
            }
        }

        self.groups
            .entry(parent.clone())
            .or_insert_with(|| CheckboxGroup::new(parent.clone()))
            .members
            .insert(member.clone(), checked);
        self.parents.insert(member, parent);
    }

    pub fn group(&self, parent: &str) -> Option<&CheckboxGroup> {
        self.groups.get(parent)
    }

    pub fn groups(&self) -> impl Iterator<Item = &CheckboxGroup> {
        self.groups.values()
    }

    pub fn is_parent(&self, id: &str) -> bool {
        self.groups.contains_key(id)
    }

    pub fn parent_of(&self, member: &str) -> Option<&ControlId> {
        self.parents.get(member)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Change one member and recompute its group
    pub fn set_member(&mut self, member: &str, checked: bool) -> Result<GroupChange> {
        let parent = self
            .parents
            .get(member)
            .ok_or_else(|| WeaveError::missing_target(member))?;
        let group = self
            .groups
            .get_mut(parent.as_str())
            .ok_or_else(|| WeaveError::missing_target(parent.as_str()))?;

        let (_, id, flag) = group
            .members
            .get_full_mut(member)
            .ok_or_else(|| WeaveError::missing_target(member))?;
        *flag = checked;
        let id = id.clone();

        let change = group.change(smallvec![(id, checked)]);
        tracing::debug!(
            "GroupSet::set_member - {} -> {} ({} now {})",
            member,
            checked,
            change.parent,
            change.aggregate.as_str()
        );
        Ok(change)
    }

    /// Drive the parent: `true` checks every member, `false` unchecks every member
    pub fn set_parent(&mut self, parent: &str, checked: bool) -> Result<GroupChange> {
        let group = self
            .groups
            .get_mut(parent)
            .ok_or_else(|| WeaveError::missing_target(parent))?;

        for flag in group.members.values_mut() {
            *flag = checked;
        }

        tracing::debug!("GroupSet::set_parent - {} -> {}", parent, checked);
        Ok(group.snapshot())
    }

    /// Unregister a member. Returns the recomputed group, or `None` when the
    /// group became empty and was dropped (or the member was unknown).
    pub fn remove_member(&mut self, member: &str) -> Option<GroupChange> {
        let parent = self.parents.remove(member)?;
        let group = self.groups.get_mut(parent.as_str())?;
        group.members.shift_remove(member);

        if group.is_empty() {
            self.groups.shift_remove(parent.as_str());
            tracing::debug!("GroupSet::remove_member - group {} dropped", parent);
            return None;
        }
        Some(group.change(SmallVec::new()))
    }
}
