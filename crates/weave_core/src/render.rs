//! Renderer collaborator
//!
//! Controllers never touch the rendering substrate. They describe the full
//! visual state of a target and hand it to a [`Renderer`], which replaces
//! whatever the target showed before. Because every call carries complete
//! state (never a delta), re-applying the same state is a no-op.

use crate::events::ControlId;
use indexmap::IndexMap;

/// Complete visual state of one rendered target
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisualState {
    /// Root surface theme/density classes
    Surface { theme: String, density: String },
    /// Radio-style selector with exactly one checked option
    Selector { value: String },
    /// Text content (dropdown button caption, title)
    Label { text: String },
    /// Open/expanded flag of a toggle control, including its icon and ARIA mirrors
    Toggle { open: bool },
    Checkbox { checked: bool, indeterminate: bool },
    /// Active/selected flag (tab, list item, dropdown item)
    Active { active: bool },
}

/// Consumer of visual state instructions
pub trait Renderer {
    fn apply_visual_state(&mut self, target: &ControlId, state: &VisualState);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn apply_visual_state(&mut self, target: &ControlId, state: &VisualState) {
        (**self).apply_visual_state(target, state);
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn apply_visual_state(&mut self, target: &ControlId, state: &VisualState) {
        (**self).apply_visual_state(target, state);
    }
}

/// Renderer that keeps the current state of every target in memory
///
/// Used by tests and by headless drivers that report state instead of drawing it.
#[derive(Clone, Debug, Default)]
pub struct MemoryRenderer {
    states: IndexMap<ControlId, VisualState>,
    calls: Vec<(ControlId, VisualState)>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a target
    pub fn state(&self, target: &str) -> Option<&VisualState> {
        self.states.get(target)
    }

    pub fn states(&self) -> impl Iterator<Item = (&ControlId, &VisualState)> {
        self.states.iter()
    }

    /// Every instruction received, in order
    pub fn calls(&self) -> &[(ControlId, VisualState)] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Text of a [`VisualState::Label`] target
    pub fn label(&self, target: &str) -> Option<&str> {
        match self.state(target)? {
            VisualState::Label { text } => Some(text),
            _ => None,
        }
    }

    /// Open flag of a [`VisualState::Toggle`] target
    pub fn is_open(&self, target: &str) -> Option<bool> {
        match self.state(target)? {
            VisualState::Toggle { open } => Some(*open),
            _ => None,
        }
    }
}

impl Renderer for MemoryRenderer {
    fn apply_visual_state(&mut self, target: &ControlId, state: &VisualState) {
        self.states.insert(target.clone(), state.clone());
        self.calls.push((target.clone(), state.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_state_wins() {
        let mut renderer = MemoryRenderer::new();
        let target = ControlId::from("theme-dropdown");

        renderer.apply_visual_state(
            &target,
            &VisualState::Label {
                text: "Light Gray".into(),
            },
        );
        renderer.apply_visual_state(
            &target,
            &VisualState::Label {
                text: "Dark Blue".into(),
            },
        );

        assert_eq!(renderer.label("theme-dropdown"), Some("Dark Blue"));
        assert_eq!(renderer.calls().len(), 2);
        assert_eq!(renderer.is_open("theme-dropdown"), None);
    }
}
