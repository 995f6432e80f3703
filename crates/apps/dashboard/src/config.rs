use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dataset::GeneratorConfig;
use foundation::LatLon;
use serde::{Deserialize, Serialize};
use tracing::warn;
use viewport::CameraState;

pub const CONFIG_PATH_ENV: &str = "FLOAT_ATLAS_CONFIG";
pub const SEED_ENV: &str = "FLOAT_ATLAS_SEED";
pub const COUNT_ENV: &str = "FLOAT_ATLAS_COUNT";
pub const TOKEN_ENV: &str = "FLOAT_ATLAS_TOKEN";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "read {path:?}: {message}"),
            ConfigError::Parse { path, message } => write!(f, "parse {path:?}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    #[serde(default)]
    pub pitch_deg: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            lat: 20.0,
            lon: 65.0,
            zoom: 4.0,
            pitch_deg: 0.0,
        }
    }
}

/// Session settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub float_count: usize,
    pub seed: u64,
    pub platform_offset: u32,
    pub depth_ceiling_m: u32,
    pub reference_date: NaiveDate,
    pub initial_camera: CameraConfig,
    pub fly_duration_ms: u32,
    /// Click hit-test radius on the ground.
    pub click_tolerance_m: f64,
    /// Tile provider access token; the map is unavailable without one.
    pub map_token: Option<String>,
    /// JSON file with region overrides.
    pub regions_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            float_count: 200,
            seed: 42,
            platform_offset: 2_900_000,
            depth_ceiling_m: 2000,
            reference_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            initial_camera: CameraConfig::default(),
            fly_duration_ms: 2000,
            click_tolerance_m: 25_000.0,
            map_token: None,
            regions_path: None,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Defaults, or the file named by `FLOAT_ATLAS_CONFIG` / `path`, with
    /// environment overrides applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(p) => Self::from_json_file(&p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `FLOAT_ATLAS_*` overrides. Unparsable values are ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = parsed(&lookup, SEED_ENV) {
            self.seed = seed;
        }
        if let Some(count) = parsed(&lookup, COUNT_ENV) {
            self.float_count = count;
        }
        if let Some(token) = lookup(TOKEN_ENV) {
            self.map_token = Some(token);
        }
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            count: self.float_count,
            seed: self.seed,
            platform_offset: self.platform_offset,
            reference_date: self.reference_date,
            ..GeneratorConfig::default()
        }
    }

    pub fn camera(&self) -> CameraState {
        let c = self.initial_camera;
        CameraState::new(LatLon::new(c.lat, c.lon), c.zoom, c.pitch_deg)
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{COUNT_ENV, DashboardConfig, SEED_ENV, TOKEN_ENV};
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{"seed": 7, "initial_camera": {"lat": 0.0, "lon": 75.0, "zoom": 3.0}}"#;
        let config: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.float_count, 200);
        assert_eq!(config.fly_duration_ms, 2000);
        assert_eq!(config.camera().zoom, 3.0);
        assert_eq!(config.camera().pitch_deg, 0.0);
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let mut config = DashboardConfig::default();
        config.apply_env(|key| match key {
            k if k == SEED_ENV => Some("99".to_string()),
            k if k == COUNT_ENV => Some("lots".to_string()),
            k if k == TOKEN_ENV => Some("pk.env".to_string()),
            _ => None,
        });
        assert_eq!(config.seed, 99);
        assert_eq!(config.float_count, 200);
        assert_eq!(config.map_token.as_deref(), Some("pk.env"));
    }

    #[test]
    fn generator_config_follows_session_settings() {
        let config = DashboardConfig {
            float_count: 12,
            seed: 3,
            ..DashboardConfig::default()
        };
        let g = config.generator_config();
        assert_eq!((g.count, g.seed, g.platform_offset), (12, 3, 2_900_000));
    }
}
