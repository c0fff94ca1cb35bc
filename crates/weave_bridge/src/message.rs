//! Cross-frame message envelope
//!
//! ```json
//! { "type": "weave-ui-theme-change", "payload": { "theme": "dark-blue", "density": "medium" } }
//! ```
//!
//! Either payload field may be missing or `null`, meaning "keep the current value".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use weave_core::{Result, WeaveError};
use weave_theme::Preferences;

/// Envelope type of theme change messages
pub const THEME_CHANGE: &str = "weave-ui-theme-change";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeChangePayload {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub density: Option<String>,
}

/// A recognized host message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostMessage {
    ThemeChange(ThemeChangePayload),
}

#[derive(Serialize)]
struct Envelope<'a, P> {
    #[serde(rename = "type")]
    kind: &'a str,
    payload: P,
}

impl HostMessage {
    /// Decode a raw JSON string.
    ///
    /// `Ok(None)` means well-formed but not addressed to us.
    pub fn decode(raw: &str) -> Result<Option<Self>> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| WeaveError::MalformedMessage(err.to_string()))?;
        Self::decode_value(value)
    }

    /// Decode an already parsed value. A JSON string is parsed once more,
    /// since hosts post either objects or serialized objects.
    pub fn decode_value(value: Value) -> Result<Option<Self>> {
        let mut object = match value {
            Value::String(raw) => return Self::decode(&raw),
            Value::Object(object) => object,
            other => {
                return Err(WeaveError::MalformedMessage(format!(
                    "expected an object, got {other}"
                )))
            }
        };

        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            _ => return Ok(None),
        };
        if kind != THEME_CHANGE {
            tracing::debug!("ignoring host message of type {:?}", kind);
            return Ok(None);
        }

        let payload = object
            .remove("payload")
            .ok_or_else(|| WeaveError::MalformedMessage("missing payload".to_string()))?;
        let payload: ThemeChangePayload = serde_json::from_value(payload)
            .map_err(|err| WeaveError::MalformedMessage(err.to_string()))?;
        Ok(Some(Self::ThemeChange(payload)))
    }

    pub fn theme_change(theme: Option<&str>, density: Option<&str>) -> Self {
        Self::ThemeChange(ThemeChangePayload {
            theme: theme.map(str::to_string),
            density: density.map(str::to_string),
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::ThemeChange(payload) => serde_json::json!({
                "type": THEME_CHANGE,
                "payload": payload,
            }),
        }
    }
}

/// Serialize a preference pair as an outbound theme change message
pub fn encode_preferences(prefs: &Preferences) -> String {
    encode_pair(prefs.theme.id(), prefs.density.id())
}

pub(crate) fn encode_pair(theme: &str, density: &str) -> String {
    #[derive(Serialize)]
    struct Pair<'a> {
        theme: &'a str,
        density: &'a str,
    }

    let envelope = Envelope {
        kind: THEME_CHANGE,
        payload: Pair { theme, density },
    };
    // Only string fields: serialization cannot fail.
    serde_json::to_string(&envelope).unwrap_or_default()
}
