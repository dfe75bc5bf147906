use relgraph_graph::{FillRule, ForceConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no configuration directory on this platform")]
    NoConfigDir,
    #[error("failed to access settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Maximum nodes handed to the layout.
    pub node_limit: usize,
    pub forces: ForceConfig,
    pub officer_flag_threshold: u32,
    pub recenter_duration_ms: u64,
    pub recenter_min_zoom: f32,
    pub zoom_step: f32,
    pub zoom_transition_ms: u64,
    /// Screen pixels a pointer may travel before a press becomes a drag.
    pub drag_threshold: f32,
    /// Padding, in pixels, around the graph on zoom-to-fit.
    pub fit_padding: f32,
    pub history_capacity: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            node_limit: 200,
            forces: ForceConfig::default(),
            officer_flag_threshold: 3,
            recenter_duration_ms: 1000,
            recenter_min_zoom: 1.5,
            zoom_step: 1.3,
            zoom_transition_ms: 300,
            drag_threshold: 3.0,
            fit_padding: 40.0,
            history_capacity: 50,
        }
    }
}

impl ViewSettings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("relgraph").join("settings.json"))
    }

    /// Load from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::info!("No config directory, using default settings");
            return Self::default();
        };
        if !path.exists() {
            tracing::info!("Settings file not found, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        tracing::info!("Loading settings from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn fill_rule(&self) -> FillRule {
        FillRule::new(self.officer_flag_threshold)
    }

    pub fn recenter_duration(&self) -> Duration {
        Duration::from_millis(self.recenter_duration_ms)
    }

    pub fn zoom_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_transition_ms)
    }
}
