use std::path::{Path, PathBuf};

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Behavior {
    /// Profile used for sessions that have no active session to inherit from.
    pub default_profile: String,
    /// New split sessions start in the working directory of the active session.
    pub start_in_current_session_dir: bool,
    /// New split sessions run in the same container as the active session.
    pub inherit_container_context: bool,
    /// Extent units added or taken by expand/shrink of a pane.
    pub resize_step: u32,
    /// Cells outside a pane's edge probed by directional focus.
    pub probe_offset: u16,
    pub default_columns: u16,
    pub default_lines: u16,
    /// Height of a cell relative to its width, used when picking an auto split.
    pub cell_aspect: u16,
    /// Overrides the default session document location.
    pub layout_file: Option<PathBuf>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            default_profile: "Default".to_string(),
            start_in_current_session_dir: true,
            inherit_container_context: true,
            resize_step: 10,
            probe_offset: 1,
            default_columns: 80,
            default_lines: 24,
            cell_aspect: 2,
            layout_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub behavior: Behavior,
}

impl Config {
    pub fn load() -> Self {
        let path = dirs::config_dir()
            .map(|d| d.join("paneview").join("config.toml"))
            .unwrap_or_default();
        Self::load_from(&path)
    }

    /// Read a config file, falling back to defaults when it is missing or
    /// does not parse.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("invalid config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        if let Some(b) = raw.behavior {
            if let Some(v) = b.default_profile {
                config.behavior.default_profile = v;
            }
            if let Some(v) = b.start_in_current_session_dir {
                config.behavior.start_in_current_session_dir = v;
            }
            if let Some(v) = b.inherit_container_context {
                config.behavior.inherit_container_context = v;
            }
            if let Some(v) = b.resize_step {
                config.behavior.resize_step = v.max(1);
            }
            if let Some(v) = b.probe_offset {
                config.behavior.probe_offset = v.max(1);
            }
            if let Some(v) = b.default_columns {
                config.behavior.default_columns = v.max(1);
            }
            if let Some(v) = b.default_lines {
                config.behavior.default_lines = v.max(1);
            }
            if let Some(v) = b.cell_aspect {
                config.behavior.cell_aspect = v.max(1);
            }
            if let Some(v) = b.layout_file {
                config.behavior.layout_file = Some(v);
            }
        }

        config
    }
}

// ---------------------------------------------------------------------------
// Raw TOML structs (all-optional for merge)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawConfig {
    behavior: Option<RawBehavior>,
}

#[derive(Deserialize, Default)]
struct RawBehavior {
    default_profile: Option<String>,
    start_in_current_session_dir: Option<bool>,
    inherit_container_context: Option<bool>,
    resize_step: Option<u32>,
    probe_offset: Option<u16>,
    default_columns: Option<u16>,
    default_lines: Option<u16>,
    cell_aspect: Option<u16>,
    layout_file: Option<PathBuf>,
}
