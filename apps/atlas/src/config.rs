use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use client_core::{
    ServiceEndpoints, DEFAULT_COUNTRIES_BASE_URL, DEFAULT_GEOCODE_BASE_URL, DEFAULT_USER_AGENT,
};
use serde::Deserialize;
use shared::domain::Coordinate;

use crate::ui::{LoadingPolicy, MapView};

pub const DEFAULT_CONFIG_FILE: &str = "atlas.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub geocode_base_url: String,
    pub countries_base_url: String,
    pub user_agent: String,
    pub loading_policy: LoadingPolicy,
    pub log_filter: String,
    /// `[latitude, longitude]` of the initial map view.
    pub map_center: [f64; 2],
    pub map_zoom: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.into(),
            countries_base_url: DEFAULT_COUNTRIES_BASE_URL.into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            loading_policy: LoadingPolicy::default(),
            log_filter: "info".into(),
            map_center: [20.0, 0.0],
            map_zoom: 2,
        }
    }
}

impl Settings {
    pub fn endpoints(&self) -> ServiceEndpoints {
        ServiceEndpoints {
            geocode_base_url: self.geocode_base_url.clone(),
            countries_base_url: self.countries_base_url.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn map_view(&self) -> Result<MapView> {
        let [latitude, longitude] = self.map_center;
        let center = Coordinate::new(latitude, longitude).context("invalid map_center")?;
        Ok(MapView {
            center,
            zoom: self.map_zoom,
        })
    }
}

/// Defaults, then the config file, then `APP__*` environment variables.
///
/// An explicit `path` must exist; the default `atlas.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))
}

pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("APP__GEOCODE_BASE_URL") {
        settings.geocode_base_url = v;
    }
    if let Some(v) = lookup("APP__COUNTRIES_BASE_URL") {
        settings.countries_base_url = v;
    }
    if let Some(v) = lookup("APP__USER_AGENT") {
        settings.user_agent = v;
    }
    if let Some(v) = lookup("APP__LOADING_POLICY") {
        settings.loading_policy = v.parse().context("invalid APP__LOADING_POLICY")?;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
