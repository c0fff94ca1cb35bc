//! Item selection within lists, tab strips and dropdown menus
//!
//! A [`Selection`] owns an ordered set of items, each with a value, a display
//! label and a selected flag. In [`SelectionMode::Single`] choosing an item makes
//! it the only selected one; in [`SelectionMode::Multi`] it toggles that item.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use weave_core::{ControlId, Result, WeaveError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// An option inside a selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    /// The value reported when chosen
    pub value: String,
    /// The display label
    pub label: String,
    pub selected: bool,
}

/// Item flags to re-render after a selection, in item order
pub type SelectionChanges = SmallVec<[(ControlId, bool); 4]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    id: ControlId,
    mode: SelectionMode,
    items: IndexMap<ControlId, Choice>,
}

impl Selection {
    pub fn new(id: impl Into<ControlId>, mode: SelectionMode) -> Self {
        Self {
            id: id.into(),
            mode,
            items: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &ControlId {
        &self.id
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Add an item. In single mode a second preselected item is ignored.
    pub fn push(
        &mut self,
        item: impl Into<ControlId>,
        value: impl Into<String>,
        label: impl Into<String>,
        selected: bool,
    ) {
        let selected =
            selected && (self.mode == SelectionMode::Multi || self.selected().next().is_none());
        self.items.insert(
            item.into(),
            Choice {
                value: value.into(),
                label: label.into(),
                selected,
            },
        );
    }

    pub fn choice(&self, item: &str) -> Option<&Choice> {
        self.items.get(item)
    }

    pub fn items(&self) -> impl Iterator<Item = (&ControlId, &Choice)> {
        self.items.iter()
    }

    pub fn selected(&self) -> impl Iterator<Item = (&ControlId, &Choice)> {
        self.items.iter().filter(|(_, choice)| choice.selected)
    }

    /// Item carrying the given value
    pub fn find_value(&self, value: &str) -> Option<&ControlId> {
        self.items
            .iter()
            .find(|(_, choice)| choice.value == value)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Choose an item. The chosen item is always reported, other items only
    /// when their flag changed.
    pub fn select(&mut self, item: &str) -> Result<SelectionChanges> {
        let index = self
            .items
            .get_index_of(item)
            .ok_or_else(|| WeaveError::missing_target(item))?;

        let mut changes = SelectionChanges::new();
        for (i, (id, choice)) in self.items.iter_mut().enumerate() {
            let selected = if i == index {
                match self.mode {
                    SelectionMode::Single => true,
                    SelectionMode::Multi => !choice.selected,
                }
            } else if self.mode == SelectionMode::Single {
                false
            } else {
                continue;
            };

            if i == index || choice.selected != selected {
                choice.selected = selected;
                changes.push((id.clone(), selected));
            }
        }
        Ok(changes)
    }

    /// Make the item carrying `value` the selected one, without reporting an
    /// unchanged selection.
    pub fn select_value(&mut self, value: &str) -> SelectionChanges {
        let Some(item) = self.find_value(value).cloned() else {
            return SelectionChanges::new();
        };
        if self.items.get(&item).map_or(false, |choice| choice.selected) {
            return SelectionChanges::new();
        }
        self.select(item.as_str()).unwrap_or_default()
    }
}
