use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::{DisplayState, PipelineConfig};

pub const DEFAULT_API_HOST: &str = "simple.ai.qweatherapi.com";

const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 5.0;

/// Persisted record. Keys are camelCase on disk.
///
/// Example TOML:
/// apiKey = "..."
/// apiHost = "simple.ai.qweatherapi.com"
/// customCity = ""
/// lastLocation = "Beijing"
/// lastTemperature = "23°C"
/// lastIconGlyph = "☀"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api_key: String,
    pub api_host: String,
    /// Empty means "locate me by IP".
    pub custom_city: String,

    pub last_location: String,
    pub last_temperature: String,
    pub last_icon_glyph: String,

    // Window state, owned by the UI side; carried through untouched.
    pub locked: bool,
    pub scale_factor: f64,
    pub win_x: f64,
    pub win_y: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_host: DEFAULT_API_HOST.to_string(),
            custom_city: String::new(),
            last_location: "Location".to_string(),
            last_temperature: "--°C".to_string(),
            last_icon_glyph: crate::icon::CLEAR.to_string(),
            locked: false,
            scale_factor: 1.0,
            win_x: 100.0,
            win_y: 100.0,
        }
    }
}

impl Config {
    /// Snapshot of the fields a pipeline run reads.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let host = self.api_host.trim();
        PipelineConfig {
            api_key: self.api_key.trim().to_string(),
            api_host: if host.is_empty() { DEFAULT_API_HOST.to_string() } else { host.to_string() },
            custom_city: self.custom_city.trim().to_string(),
        }
    }

    /// Apply values from the settings form, trimmed; an empty host falls back to the default.
    pub fn apply_settings(&mut self, api_key: &str, api_host: &str, custom_city: &str) {
        self.api_key = api_key.trim().to_string();
        let host = api_host.trim();
        self.api_host = if host.is_empty() { DEFAULT_API_HOST.to_string() } else { host.to_string() };
        self.custom_city = custom_city.trim().to_string();
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            location_label: self.last_location.clone(),
            temperature_text: self.last_temperature.clone(),
            icon_glyph: self.last_icon_glyph.clone(),
        }
    }

    pub fn set_display_state(&mut self, state: &DisplayState) {
        self.last_location = state.location_label.clone();
        self.last_temperature = state.temperature_text.clone();
        self.last_icon_glyph = state.icon_glyph.clone();
    }

    pub fn set_scale_factor(&mut self, scale: f64) {
        self.scale_factor = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherclock", "weatherclock")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Owner of the on-disk record. Writers are serialised; reads are not.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Store at the platform default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::config_file_path()?))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Load the record, or the default one if the file is missing or corrupt.
    pub fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }

        match self.read() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "using default config: {err:#}");
                Config::default()
            }
        }
    }

    fn read(&self) -> Result<Config> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file: {}", self.path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.path.display()))
    }

    /// Overwrite the record, creating parent directories as needed.
    pub fn save(&self, cfg: &Config) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write(cfg)
    }

    /// Read-modify-write under the write lock. Returns the record as saved.
    pub fn update<F>(&self, f: F) -> Result<Config>
    where
        F: FnOnce(&mut Config),
    {
        let _guard = self.write_lock.lock();
        let mut cfg = self.load();
        f(&mut cfg);
        self.write(&cfg)?;
        Ok(cfg)
    }

    fn write(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(cfg).context("Failed to serialize configuration to TOML")?;

        // Readers take no lock, so replace the file in one rename.
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, toml)
            .with_context(|| format!("Failed to write config file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace config file: {}", self.path.display()))?;

        Ok(())
    }
}
