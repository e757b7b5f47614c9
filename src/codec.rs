//! Saved layout documents.
//!
//! Writing goes through serde with PascalCase keys. Reading goes through a
//! `serde_json::Value` first so that one malformed entry drops only itself:
//! a terminal without a usable `SessionRestoreId`, a splitter without a
//! `Widgets` array or a pane that is not an object is skipped and its
//! siblings are still read.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::layout::Orientation;

/// One terminal leaf.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TerminalDoc {
    pub session_restore_id: i32,
    /// Zero means unknown.
    pub columns: u16,
    pub lines: u16,
    pub working_directory: String,
    /// Kept for old readers; always written empty.
    pub command: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WidgetDoc {
    Terminal(TerminalDoc),
    Splitter(SplitterDoc),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SplitterDoc {
    pub orientation: Orientation,
    pub widgets: Vec<WidgetDoc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaneDoc {
    pub tabs: Vec<SplitterDoc>,
    pub active: i64,
}

/// A whole window. `panes`, `active_pane` and `orientation` form the
/// multi-pane layout; `tabs`/`active` repeat the first pane for readers that
/// only know the single-pane form; `sessions` is the oldest form, a flat
/// list of restore ids with a 1-based `active`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionDocument {
    pub panes: Vec<PaneDoc>,
    pub active_pane: i64,
    pub orientation: Orientation,
    pub tabs: Vec<SplitterDoc>,
    pub active: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sessions: Vec<i32>,
}

impl Default for SessionDocument {
    fn default() -> Self {
        Self {
            panes: Vec::new(),
            active_pane: 0,
            orientation: Orientation::Horizontal,
            tabs: Vec::new(),
            active: 0,
            sessions: Vec::new(),
        }
    }
}

impl TerminalDoc {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let restore_id = i32::try_from(obj.get("SessionRestoreId")?.as_i64()?).ok()?;
        Some(Self {
            session_restore_id: restore_id,
            columns: small_int(obj, "Columns"),
            lines: small_int(obj, "Lines"),
            working_directory: string(obj, "WorkingDirectory"),
            command: string(obj, "Command"),
        })
    }
}

impl WidgetDoc {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.contains_key("Widgets") {
            SplitterDoc::from_value(value).map(WidgetDoc::Splitter)
        } else {
            TerminalDoc::from_value(value).map(WidgetDoc::Terminal)
        }
    }
}

impl SplitterDoc {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            widgets: Vec::new(),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let widgets = obj.get("Widgets")?.as_array()?;
        let orientation = obj
            .get("Orientation")
            .and_then(Value::as_str)
            .map_or(Orientation::Vertical, Orientation::from_label);
        Some(Self {
            orientation,
            widgets: widgets.iter().filter_map(WidgetDoc::from_value).collect(),
        })
    }

    /// Terminal leaves, depth first.
    pub fn terminals(&self) -> Vec<&TerminalDoc> {
        let mut out = Vec::new();
        for widget in &self.widgets {
            match widget {
                WidgetDoc::Terminal(terminal) => out.push(terminal),
                WidgetDoc::Splitter(splitter) => out.extend(splitter.terminals()),
            }
        }
        out
    }
}

impl PaneDoc {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            tabs: splitters(obj, "Tabs"),
            active: obj.get("Active").and_then(Value::as_i64).unwrap_or(0),
        })
    }
}

impl SessionDocument {
    /// Decode whatever can be salvaged. Only a non-object top level is
    /// rejected outright.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        // The multi-pane layout either sits at the top level or under
        // "PaneLayout", as an object or as embedded JSON text.
        let nested = match obj.get("PaneLayout") {
            Some(Value::Object(layout)) => Some(layout.clone()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(text)
                .ok()
                .and_then(|v| v.as_object().cloned()),
            _ => None,
        };
        let layout = nested.as_ref().unwrap_or(obj);

        let panes = layout
            .get("Panes")
            .and_then(Value::as_array)
            .map(|panes| panes.iter().filter_map(PaneDoc::from_value).collect())
            .unwrap_or_default();
        let sessions = obj
            .get("Sessions")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_i64)
                    .filter_map(|id| i32::try_from(id).ok())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            panes,
            active_pane: layout.get("ActivePane").and_then(Value::as_i64).unwrap_or(0),
            orientation: layout
                .get("Orientation")
                .and_then(Value::as_str)
                .map_or(Orientation::Vertical, Orientation::from_label),
            tabs: splitters(obj, "Tabs"),
            active: obj.get("Active").and_then(Value::as_i64).unwrap_or(0),
            sessions,
        })
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// True when no form carries anything to restore.
    pub fn is_empty(&self) -> bool {
        self.panes.iter().all(|pane| pane.tabs.is_empty())
            && self.tabs.is_empty()
            && self.sessions.is_empty()
    }
}

impl<'de> Deserialize<'de> for SplitterDoc {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| de::Error::custom("expected a splitter with Widgets"))
    }
}

impl<'de> Deserialize<'de> for SessionDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| de::Error::custom("expected a layout object"))
    }
}

fn splitters(obj: &Map<String, Value>, key: &str) -> Vec<SplitterDoc> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(SplitterDoc::from_value).collect())
        .unwrap_or_default()
}

fn small_int(obj: &Map<String, Value>, key: &str) -> u16 {
    obj.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u16::try_from(v).ok())
        .unwrap_or(0)
}

fn string(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
