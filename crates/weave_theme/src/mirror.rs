//! Visual mirrors of the preference pair
//!
//! The same theme/density is shown in several places at once: the root
//! surface classes, the radio selectors, the caption of every theme or density
//! dropdown (main and demo copies), and the page title. [`Mirrors`] lists
//! those targets and renders the full pair to all of them in one pass.

use crate::preference::Preferences;
use weave_core::{ControlId, Renderer, VisualState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mirrors {
    /// Root surface carrying the theme/density classes
    pub surface: Option<ControlId>,
    pub theme_selector: Option<ControlId>,
    pub density_selector: Option<ControlId>,
    /// Dropdowns whose caption shows the theme name
    pub theme_dropdowns: Vec<ControlId>,
    /// Dropdowns whose caption shows the density name
    pub density_dropdowns: Vec<ControlId>,
    pub title: Option<ControlId>,
    pub title_prefix: String,
}

impl Default for Mirrors {
    fn default() -> Self {
        Self {
            surface: Some("surface".into()),
            theme_selector: Some("weave-theme".into()),
            density_selector: Some("weave-density".into()),
            theme_dropdowns: vec!["theme-dropdown".into(), "demo-theme-dropdown".into()],
            density_dropdowns: vec!["density-dropdown".into(), "demo-density-dropdown".into()],
            title: Some("demo-title".into()),
            title_prefix: "Weave UI".to_string(),
        }
    }
}

impl Mirrors {
    /// No mirrors at all
    pub fn none() -> Self {
        Self {
            surface: None,
            theme_selector: None,
            density_selector: None,
            theme_dropdowns: Vec::new(),
            density_dropdowns: Vec::new(),
            title: None,
            title_prefix: String::new(),
        }
    }

    /// Caption target of a dropdown button
    pub fn caption(dropdown: &ControlId) -> ControlId {
        dropdown.part("label")
    }

    pub fn title_text(&self, prefs: &Preferences) -> String {
        format!("{} - {} Theme", self.title_prefix, prefs.theme.display_name())
    }

    /// Every target this set renders to
    pub fn targets(&self) -> Vec<ControlId> {
        let mut targets = Vec::new();
        targets.extend(self.surface.clone());
        targets.extend(self.theme_selector.clone());
        targets.extend(self.density_selector.clone());
        targets.extend(self.theme_dropdowns.iter().map(Self::caption));
        targets.extend(self.density_dropdowns.iter().map(Self::caption));
        targets.extend(self.title.clone());
        targets
    }

    /// Render the pair to every mirror. With `include_surface == false` the
    /// root surface is left as it is (metadata-only sync).
    pub fn render(&self, prefs: &Preferences, renderer: &mut dyn Renderer, include_surface: bool) {
        if include_surface {
            if let Some(surface) = &self.surface {
                renderer.apply_visual_state(
                    surface,
                    &VisualState::Surface {
                        theme: prefs.theme.id().to_string(),
                        density: prefs.density.id().to_string(),
                    },
                );
            }
        }

        if let Some(selector) = &self.theme_selector {
            renderer.apply_visual_state(
                selector,
                &VisualState::Selector {
                    value: prefs.theme.id().to_string(),
                },
            );
        }
        if let Some(selector) = &self.density_selector {
            renderer.apply_visual_state(
                selector,
                &VisualState::Selector {
                    value: prefs.density.id().to_string(),
                },
            );
        }

        let theme_caption = VisualState::Label {
            text: prefs.theme.display_name().to_string(),
        };
        for dropdown in &self.theme_dropdowns {
            renderer.apply_visual_state(&Self::caption(dropdown), &theme_caption);
        }
        let density_caption = VisualState::Label {
            text: prefs.density.display_name().to_string(),
        };
        for dropdown in &self.density_dropdowns {
            renderer.apply_visual_state(&Self::caption(dropdown), &density_caption);
        }

        if let Some(title) = &self.title {
            renderer.apply_visual_state(
                title,
                &VisualState::Label {
                    text: self.title_text(prefs),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::{Density, Theme};
    use weave_core::MemoryRenderer;

    #[test]
    fn test_render_reaches_every_mirror() {
        let mirrors = Mirrors::default();
        let mut renderer = MemoryRenderer::new();
        let prefs = Preferences::new(Theme::DarkBlue, Density::Medium);

        mirrors.render(&prefs, &mut renderer, true);

        for target in mirrors.targets() {
            assert!(renderer.state(target.as_str()).is_some(), "{target} not rendered");
        }
        assert_eq!(renderer.label("theme-dropdown/label"), Some("Dark Blue"));
        assert_eq!(renderer.label("demo-theme-dropdown/label"), Some("Dark Blue"));
        assert_eq!(
            renderer.label("demo-density-dropdown/label"),
            Some("Medium Density")
        );
        assert_eq!(renderer.label("demo-title"), Some("Weave UI - Dark Blue Theme"));
    }

    #[test]
    fn test_metadata_only_leaves_surface() {
        let mut renderer = MemoryRenderer::new();
        Mirrors::default().render(&Preferences::default(), &mut renderer, false);
        assert!(renderer.state("surface").is_none());
        assert!(renderer.state("weave-theme").is_some());
    }
}
