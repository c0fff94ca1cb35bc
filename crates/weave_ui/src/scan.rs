//! Declarative page scan
//!
//! Everything the controller learns about a page at initialization: which
//! controls exist, how they relate, and which of them the markup already shows
//! as open, checked or active. A host that renders real markup produces this
//! by walking its tree; tests and the CLI load it from TOML:
//!
//! ```toml
//! surface_classes = ["theme-dark-blue"]
//!
//! [[dropdowns]]
//! id = "theme-dropdown"
//! binding = "theme"
//! items = [{ value = "light-gray", text = "Light Gray" }, { value = "dark-blue", text = "Dark Blue" }]
//!
//! [[checkbox_groups]]
//! parent = "select-all"
//! members = [{ id = "layer-1", checked = true }, { id = "layer-2" }]
//! ```

use crate::selection::SelectionMode;
use serde::{Deserialize, Serialize};
use weave_core::ControlId;
use weave_theme::{DetectedPreferences, PreferenceKey, StateInspector};

/// Exclusivity class shared by every dropdown of a page
pub const DROPDOWN_CLASS: &str = "dropdowns";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageScan {
    /// Classes found on the root surface
    pub surface_classes: Vec<String>,
    pub dropdowns: Vec<DropdownScan>,
    pub accordions: Vec<AccordionScan>,
    pub sections: Vec<SectionScan>,
    pub checkbox_groups: Vec<CheckboxGroupScan>,
    pub lists: Vec<ListScan>,
    pub tab_strips: Vec<TabStripScan>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DropdownScan {
    pub id: ControlId,
    #[serde(default)]
    pub open: bool,
    /// Choosing an item applies this preference
    #[serde(default)]
    pub binding: Option<PreferenceKey>,
    #[serde(default)]
    pub items: Vec<ItemScan>,
}

/// A dropdown item or list entry
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ItemScan {
    /// Defaults to `<container>/item/<value>`, clear of the `<container>/label` caption
    #[serde(default)]
    pub id: Option<String>,
    /// Defaults to the text
    #[serde(default)]
    pub value: Option<String>,
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

impl ItemScan {
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.text)
    }

    pub fn id_in(&self, container: &str) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("{}/item/{}", container, self.value()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccordionScan {
    pub id: ControlId,
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub open: bool,
    /// Accordions sharing a class behave like a single-open accordion set
    #[serde(default)]
    pub exclusive_in: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SectionScan {
    pub id: ControlId,
    #[serde(default)]
    pub collapsed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckboxGroupScan {
    pub parent: ControlId,
    pub members: Vec<MemberScan>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemberScan {
    pub id: ControlId,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListScan {
    pub id: ControlId,
    #[serde(default)]
    pub mode: SelectionMode,
    #[serde(default)]
    pub items: Vec<ItemScan>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TabStripScan {
    pub id: ControlId,
    #[serde(default)]
    pub tabs: Vec<ItemScan>,
}

impl PageScan {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl StateInspector for PageScan {
    fn detect_initial_state(&self) -> DetectedPreferences {
        DetectedPreferences::from_classes(self.surface_classes.iter().map(String::as_str))
    }
}
