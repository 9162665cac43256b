use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::{domain::LngLat, protocol::FieldNames};
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "venue_map.toml";
pub const CONFIG_PATH_ENV: &str = "VENUE_MAP_CONFIG";
const MAX_ZOOM: f64 = 22.0;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Firestore,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub page_size: u32,
    pub fields: FieldNames,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Firestore,
            base_url: "https://firestore.googleapis.com/v1".into(),
            project_id: String::new(),
            database: "(default)".into(),
            collection: "venues".into(),
            api_key: None,
            bearer_token: None,
            page_size: 300,
            fields: FieldNames::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub default_center: LngLat,
    pub default_zoom: f64,
    pub focus_zoom: f64,
    pub style: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: LngLat::new(21.62601, 47.53184),
            default_zoom: 14.01,
            focus_zoom: 16.0,
            style: "light".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub map: MapSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.store.backend == StoreBackend::Firestore {
            if self.store.project_id.trim().is_empty() {
                return Err(SettingsError::Invalid(
                    "store.project_id is required for the firestore backend".into(),
                ));
            }
            Url::parse(&self.store.base_url).map_err(|err| {
                SettingsError::Invalid(format!(
                    "store.base_url '{}' is not a valid url: {err}",
                    self.store.base_url
                ))
            })?;
        }
        if self.store.collection.trim().is_empty() {
            return Err(SettingsError::Invalid("store.collection must not be empty".into()));
        }
        if self.store.page_size == 0 {
            return Err(SettingsError::Invalid("store.page_size must be positive".into()));
        }
        for (key, zoom) in [
            ("map.default_zoom", self.map.default_zoom),
            ("map.focus_zoom", self.map.focus_zoom),
        ] {
            if !(0.0..=MAX_ZOOM).contains(&zoom) {
                return Err(SettingsError::Invalid(format!(
                    "{key} must be within 0..={MAX_ZOOM}, got {zoom}"
                )));
            }
        }
        Ok(())
    }
}

/// Loads settings from `path`, else from `$VENUE_MAP_CONFIG`, else from
/// `venue_map.toml` in the working directory when present. Environment
/// variables are applied on top.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut settings = match explicit {
        Some(path) => read_settings_file(&path)?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                read_settings_file(fallback)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

pub fn parse_settings(raw: &str, path: &Path) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&raw, path)
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(v) = non_empty("VENUE_MAP__BACKEND") {
        match v.trim().to_ascii_lowercase().as_str() {
            "firestore" => settings.store.backend = StoreBackend::Firestore,
            "memory" => settings.store.backend = StoreBackend::Memory,
            other => tracing::warn!(backend = other, "config: ignoring unknown store backend"),
        }
    }
    if let Some(v) = non_empty("VENUE_MAP__PROJECT_ID") {
        settings.store.project_id = v;
    }
    if let Some(v) = non_empty("VENUE_MAP__COLLECTION") {
        settings.store.collection = v;
    }
    if let Some(v) = non_empty("VENUE_MAP__API_KEY") {
        settings.store.api_key = Some(v);
    }
    if let Some(v) = non_empty("VENUE_MAP__BEARER_TOKEN") {
        settings.store.bearer_token = Some(v);
    }
    if let Some(v) = non_empty("VENUE_MAP__BASE_URL") {
        settings.store.base_url = v;
    }
    // Same variable the Firestore SDKs honour; wins over an explicit base url.
    if let Some(host) = non_empty("FIRESTORE_EMULATOR_HOST") {
        settings.store.base_url = format!("http://{}/v1", host.trim());
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
