//! Local settings file: store connection plus UI preferences.

use crate::calendar::grid::ViewMode;
use crate::i18n::Language;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "TEACHERMATE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "teachermate.config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
    /// Directory holding the collections database. `None` runs on the in-memory store.
    pub workspace_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppearanceConfig {
    pub theme: Theme,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarConfig {
    pub default_view: ViewMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalConfig {
    pub connection: ConnectionConfig,
    pub appearance: AppearanceConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSection {
    Appearance,
    Calendar,
}

impl PreferenceSection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "appearance" => Some(Self::Appearance),
            "calendar" => Some(Self::Calendar),
            _ => None,
        }
    }
}

/// `$TEACHERMATE_CONFIG`, else `teachermate.config.json` in the working directory.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn parse_str<'a>(v: &'a Value, key: &str) -> Result<&'a str, String> {
    v.as_str().ok_or_else(|| format!("{} must be string", key))
}

impl LocalConfig {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.to_string_lossy()))
    }

    /// Like [`LocalConfig::load`] but falls back to defaults on a broken file.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(error = %reason, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.to_string_lossy()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
        Ok(())
    }

    /// Applies a partial preference update. Nothing changes if any field is invalid.
    pub fn apply_patch(
        &mut self,
        section: PreferenceSection,
        patch: &Map<String, Value>,
    ) -> Result<(), String> {
        let mut next = self.clone();
        for (k, v) in patch {
            match section {
                PreferenceSection::Appearance => match k.as_str() {
                    "theme" => {
                        next.appearance.theme = Theme::parse(parse_str(v, k)?)
                            .ok_or("theme must be one of: light, dark")?;
                    }
                    "language" => {
                        next.appearance.language = Language::parse(parse_str(v, k)?)
                            .ok_or("language must be one of: es, eu")?;
                    }
                    _ => return Err(format!("unknown appearance field: {}", k)),
                },
                PreferenceSection::Calendar => match k.as_str() {
                    "defaultView" => {
                        next.calendar.default_view = ViewMode::parse(parse_str(v, k)?)
                            .ok_or("defaultView must be one of: month, week")?;
                    }
                    _ => return Err(format!("unknown calendar field: {}", k)),
                },
            }
        }
        *self = next;
        Ok(())
    }
}
