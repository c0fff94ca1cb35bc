//! Initial state detection
//!
//! A page may arrive with a theme or density already encoded in its markup.
//! The surface reports that through a [`StateInspector`] once at startup.

use crate::preference::{Density, Preferences, Theme};

/// Preferences found in the initial markup, if any
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DetectedPreferences {
    pub theme: Option<Theme>,
    pub density: Option<Density>,
}

impl DetectedPreferences {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn complete(prefs: Preferences) -> Self {
        Self {
            theme: Some(prefs.theme),
            density: Some(prefs.density),
        }
    }

    /// Scan surface class names (`theme-dark-gray`, `density-medium`, ...).
    /// The first recognized class of each kind wins; unknown classes are ignored.
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        let mut detected = Self::none();
        for class in classes {
            if let Some(id) = class.strip_prefix("theme-") {
                if detected.theme.is_none() {
                    detected.theme = id.parse().ok();
                }
            } else if let Some(id) = class.strip_prefix("density-") {
                if detected.density.is_none() {
                    detected.density = id.parse().ok();
                }
            }
        }
        detected
    }

    pub fn is_complete(&self) -> bool {
        self.theme.is_some() && self.density.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.density.is_none()
    }

    /// Fill the gaps from `fallback`
    pub fn resolve(&self, fallback: Preferences) -> Preferences {
        Preferences {
            theme: self.theme.unwrap_or(fallback.theme),
            density: self.density.unwrap_or(fallback.density),
        }
    }
}

/// Surface collaborator that reports pre-existing state
pub trait StateInspector {
    fn detect_initial_state(&self) -> DetectedPreferences;
}

impl StateInspector for DetectedPreferences {
    fn detect_initial_state(&self) -> DetectedPreferences {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_classes() {
        let detected =
            DetectedPreferences::from_classes(["app", "theme-dark-blue", "density-medium"]);
        assert_eq!(detected.theme, Some(Theme::DarkBlue));
        assert_eq!(detected.density, Some(Density::Medium));
        assert!(detected.is_complete());
    }

    #[test]
    fn test_unknown_classes_ignored() {
        let detected = DetectedPreferences::from_classes(["theme-neon", "density-high"]);
        assert_eq!(detected.theme, None);
        assert_eq!(detected.density, Some(Density::High));
    }

    #[test]
    fn test_resolve_prefers_detected() {
        let detected = DetectedPreferences {
            theme: Some(Theme::DarkGray),
            density: None,
        };
        let resolved = detected.resolve(Preferences::new(Theme::DarkBlue, Density::Medium));
        assert_eq!(resolved, Preferences::new(Theme::DarkGray, Density::Medium));
    }
}
