//! Theme and density preferences

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use weave_core::WeaveError;

/// Color theme of the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    LightGray,
    DarkGray,
    DarkBlue,
}

impl Theme {
    /// Stable id for storage and messages
    pub fn id(self) -> &'static str {
        match self {
            Self::LightGray => "light-gray",
            Self::DarkGray => "dark-gray",
            Self::DarkBlue => "dark-blue",
        }
    }

    /// User-facing display name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::LightGray => "Light Gray",
            Self::DarkGray => "Dark Gray",
            Self::DarkBlue => "Dark Blue",
        }
    }

    pub fn all() -> &'static [Theme] {
        const THEMES: [Theme; 3] = [Theme::LightGray, Theme::DarkGray, Theme::DarkBlue];
        &THEMES
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Theme {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|theme| theme.id() == s)
            .ok_or_else(|| WeaveError::invalid_value(PreferenceKey::Theme.storage_key(), s))
    }
}

/// Spacing density of the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Density {
    #[default]
    High,
    Medium,
}

impl Density {
    pub fn id(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::High => "High Density",
            Self::Medium => "Medium Density",
        }
    }

    pub fn all() -> &'static [Density] {
        const DENSITIES: [Density; 2] = [Density::High, Density::Medium];
        &DENSITIES
    }
}

impl Display for Density {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Density {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|density| density.id() == s)
            .ok_or_else(|| WeaveError::invalid_value(PreferenceKey::Density.storage_key(), s))
    }
}

/// Named, persisted preference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreferenceKey {
    Theme,
    Density,
}

impl PreferenceKey {
    /// Key under which the value is persisted
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Theme => "weave-ui-theme",
            Self::Density => "weave-ui-density",
        }
    }

    pub fn valid_values(self) -> Vec<&'static str> {
        match self {
            Self::Theme => Theme::all().iter().map(|t| t.id()).collect(),
            Self::Density => Density::all().iter().map(|d| d.id()).collect(),
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            Self::Theme => Theme::default().id(),
            Self::Density => Density::default().id(),
        }
    }

    pub fn is_valid(self, value: &str) -> bool {
        match self {
            Self::Theme => value.parse::<Theme>().is_ok(),
            Self::Density => value.parse::<Density>().is_ok(),
        }
    }

    pub fn all() -> &'static [PreferenceKey] {
        &[PreferenceKey::Theme, PreferenceKey::Density]
    }
}

impl Display for PreferenceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// The resolved theme/density pair applied to every mirror
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub density: Density,
}

impl Preferences {
    pub fn new(theme: Theme, density: Density) -> Self {
        Self { theme, density }
    }

    /// Root surface classes, stale ones replaced rather than appended
    pub fn surface_classes(&self) -> [String; 2] {
        [
            format!("theme-{}", self.theme.id()),
            format!("density-{}", self.density.id()),
        ]
    }
}
