//! Headless renderer for the command line

use weave_core::{ControlId, MemoryRenderer, Renderer, VisualState};

/// Keeps the latest state of every target and traces each instruction
#[derive(Debug, Default)]
pub struct LogRenderer {
    inner: MemoryRenderer,
}

impl LogRenderer {
    pub fn states(&self) -> impl Iterator<Item = (&ControlId, &VisualState)> {
        self.inner.states()
    }
}

impl Renderer for LogRenderer {
    fn apply_visual_state(&mut self, target: &ControlId, state: &VisualState) {
        tracing::debug!("render {} <- {:?}", target, state);
        self.inner.apply_visual_state(target, state);
    }
}
