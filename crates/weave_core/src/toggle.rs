//! Open/closed controllers for dropdowns, accordions, and collapsible sections
//!
//! Every control runs the same two-state machine. Controls may share an
//! exclusivity class, in which case opening one closes the others first.
//! Dropdowns are also closed by outside clicks and by Escape; accordions and
//! sections only change on their own activation.
//!
//! The set never renders or publishes anything itself. Each operation returns
//! the ordered list of [`ToggleTransition`]s it performed so the caller can
//! mirror and announce them in that order.

use crate::error::{Result, WeaveError};
use crate::events::{ControlId, KeyCode};
use crate::fsm::StateMachine;
use indexmap::IndexMap;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToggleKind {
    Dropdown,
    Accordion,
    /// Collapsible section header
    Section,
}

impl ToggleKind {
    /// Whether outside clicks and Escape close this kind of control
    pub fn is_dismissable(self) -> bool {
        self == Self::Dropdown
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToggleState {
    Closed,
    Open,
}

impl ToggleState {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToggleTrigger {
    /// Click, Enter or Space
    Activate,
    Open,
    Close,
    /// Sibling opened, outside click, or Escape
    Dismiss,
}

fn toggle_machine(initial: ToggleState) -> StateMachine<ToggleState, ToggleTrigger> {
    use ToggleState::{Closed, Open};

    StateMachine::builder(initial)
        .on(Closed, ToggleTrigger::Activate, Open)
        .on(Open, ToggleTrigger::Activate, Closed)
        .on(Closed, ToggleTrigger::Open, Open)
        .on(Open, ToggleTrigger::Close, Closed)
        .on(Open, ToggleTrigger::Dismiss, Closed)
        .build()
}

/// Declaration of a control found during the initialization scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleSpec {
    pub id: ControlId,
    pub kind: ToggleKind,
    pub exclusivity: Option<ControlId>,
    /// The representation already carried an open/expanded indicator
    pub initially_open: bool,
    /// Header or button text, reported with accordion events
    pub label: String,
}

impl ToggleSpec {
    pub fn new(id: impl Into<ControlId>, kind: ToggleKind) -> Self {
        Self {
            id: id.into(),
            kind,
            exclusivity: None,
            initially_open: false,
            label: String::new(),
        }
    }

    pub fn exclusive_in(mut self, class: impl Into<ControlId>) -> Self {
        self.exclusivity = Some(class.into());
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.initially_open = open;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A single toggle control
#[derive(Clone, Debug)]
pub struct ToggleControl {
    id: ControlId,
    kind: ToggleKind,
    exclusivity: Option<ControlId>,
    label: String,
    machine: StateMachine<ToggleState, ToggleTrigger>,
}

impl ToggleControl {
    pub fn id(&self) -> &ControlId {
        &self.id
    }

    pub fn kind(&self) -> ToggleKind {
        self.kind
    }

    pub fn exclusivity(&self) -> Option<&ControlId> {
        self.exclusivity.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> ToggleState {
        self.machine.current_state()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Transitions taken so far
    pub fn history(&self) -> &[(ToggleState, ToggleTrigger, ToggleState)] {
        self.machine.history()
    }

    fn fire(&mut self, trigger: ToggleTrigger) -> Option<ToggleTransition> {
        let to = self.machine.send(trigger)?;
        tracing::debug!("{:?} {} -> {:?} via {:?}", self.kind, self.id, to, trigger);
        Some(self.transition())
    }

    fn transition(&self) -> ToggleTransition {
        ToggleTransition {
            control: self.id.clone(),
            kind: self.kind,
            open: self.is_open(),
            label: self.label.clone(),
        }
    }
}

/// A state change that must be mirrored and announced
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleTransition {
    pub control: ControlId,
    pub kind: ToggleKind,
    pub open: bool,
    pub label: String,
}

pub type Transitions = SmallVec<[ToggleTransition; 2]>;

/// All toggle controls of one page scope, in scan order
#[derive(Debug, Default)]
pub struct ToggleSet {
    controls: IndexMap<ControlId, ToggleControl>,
}

impl ToggleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control. Returns its initial state for the first render.
    ///
    /// An initially open control whose exclusivity class already has an open
    /// member starts closed, so the class never holds two open controls.
    pub fn register(&mut self, spec: ToggleSpec) -> ToggleTransition {
        let mut initial = if spec.initially_open {
            ToggleState::Open
        } else {
            ToggleState::Closed
        };
        if initial.is_open() {
            if let Some(class) = &spec.exclusivity {
                if self.open_in_class(class).next().is_some() {
                    tracing::debug!(
                        "ToggleSet::register - {} starts closed, {} already has an open control",
                        spec.id,
                        class
                    );
                    initial = ToggleState::Closed;
                }
            }
        }

        let control = ToggleControl {
            id: spec.id.clone(),
            kind: spec.kind,
            exclusivity: spec.exclusivity,
            label: spec.label,
            machine: toggle_machine(initial),
        };
        let transition = control.transition();
        self.controls.insert(spec.id, control);
        transition
    }

    /// Forget a control
    pub fn remove(&mut self, id: &str) -> Option<ToggleControl> {
        self.controls.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&ToggleControl> {
        self.controls.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.controls.contains_key(id)
    }

    pub fn is_open(&self, id: &str) -> Option<bool> {
        self.get(id).map(ToggleControl::is_open)
    }

    pub fn controls(&self) -> impl Iterator<Item = &ToggleControl> {
        self.controls.values()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    fn open_in_class<'a>(&'a self, class: &'a ControlId) -> impl Iterator<Item = &'a ControlId> {
        self.controls
            .values()
            .filter(move |c| c.is_open() && c.exclusivity.as_ref() == Some(class))
            .map(|c| &c.id)
    }

    fn control_mut(&mut self, id: &str) -> Result<&mut ToggleControl> {
        self.controls
            .get_mut(id)
            .ok_or_else(|| WeaveError::missing_target(id))
    }

    /// Primary activation: opens a closed control (closing its siblings first)
    /// or closes an open one.
    pub fn activate(&mut self, id: &str) -> Result<Transitions> {
        let control = self.get(id).ok_or_else(|| WeaveError::missing_target(id))?;
        if control.is_open() {
            self.run(id, ToggleTrigger::Activate)
        } else {
            self.open_exclusive(id, ToggleTrigger::Activate)
        }
    }

    /// Keyboard input on a focused control. Enter and Space go through
    /// [`ToggleSet::activate`]; Escape dismisses every dismissable control.
    pub fn key(&mut self, id: &str, key: KeyCode) -> Result<Transitions> {
        if key.is_activation() {
            self.activate(id)
        } else if key == KeyCode::ESCAPE {
            Ok(self.dismiss_all())
        } else {
            Ok(Transitions::new())
        }
    }

    /// Open if closed; no-op if already open
    pub fn open(&mut self, id: &str) -> Result<Transitions> {
        let control = self.get(id).ok_or_else(|| WeaveError::missing_target(id))?;
        if control.is_open() {
            return Ok(Transitions::new());
        }
        self.open_exclusive(id, ToggleTrigger::Open)
    }

    /// Close if open; no-op if already closed
    pub fn close(&mut self, id: &str) -> Result<Transitions> {
        self.run(id, ToggleTrigger::Close)
    }

    /// Same as activation
    pub fn toggle(&mut self, id: &str) -> Result<Transitions> {
        self.activate(id)
    }

    /// Close every open dismissable control (outside click, Escape)
    pub fn dismiss_all(&mut self) -> Transitions {
        self.controls
            .values_mut()
            .filter(|c| c.kind.is_dismissable())
            .filter_map(|c| c.fire(ToggleTrigger::Dismiss))
            .collect()
    }

    fn run(&mut self, id: &str, trigger: ToggleTrigger) -> Result<Transitions> {
        Ok(self.control_mut(id)?.fire(trigger).into_iter().collect())
    }

    fn open_exclusive(&mut self, id: &str, trigger: ToggleTrigger) -> Result<Transitions> {
        let class = self.control_mut(id)?.exclusivity.clone();

        let mut transitions = Transitions::new();
        if let Some(class) = class {
            for sibling in self.controls.values_mut() {
                if sibling.id.as_str() != id && sibling.exclusivity.as_ref() == Some(&class) {
                    transitions.extend(sibling.fire(ToggleTrigger::Dismiss));
                }
            }
        }
        transitions.extend(self.control_mut(id)?.fire(trigger));
        Ok(transitions)
    }
}
