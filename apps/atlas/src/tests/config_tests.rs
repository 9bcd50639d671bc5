use super::{apply_env_overrides, load_settings, Settings};
use crate::ui::LoadingPolicy;

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_config(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("atlas_config_test_{suffix}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn defaults_target_public_services_with_counted_loading() {
    let settings = Settings::default();
    assert_eq!(settings.geocode_base_url, "https://nominatim.openstreetmap.org");
    assert_eq!(settings.countries_base_url, "https://restcountries.com/v3.1");
    assert_eq!(settings.loading_policy, LoadingPolicy::Counted);

    let view = settings.map_view().expect("view");
    assert_eq!(view.center.latitude, 20.0);
    assert_eq!(view.center.longitude, 0.0);
    assert_eq!(view.zoom, 2);
}

#[test]
fn file_values_override_defaults_and_keep_the_rest() {
    let path = temp_config(
        r#"
countries_base_url = "http://127.0.0.1:9000/v3.1"
loading_policy = "unconditional"
"#,
    );

    let settings = load_settings(Some(&path)).expect("load");
    fs::remove_file(&path).expect("cleanup");

    assert_eq!(settings.countries_base_url, "http://127.0.0.1:9000/v3.1");
    assert_eq!(settings.loading_policy, LoadingPolicy::Unconditional);
    assert_eq!(settings.geocode_base_url, Settings::default().geocode_base_url);
}

#[test]
fn unknown_keys_are_rejected() {
    let path = temp_config("tile_url = \"https://tile.openstreetmap.org\"\n");
    let err = load_settings(Some(&path)).expect_err("unknown key");
    fs::remove_file(&path).expect("cleanup");

    assert!(format!("{err:#}").contains("tile_url"), "unexpected error: {err:#}");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let path = env::temp_dir().join("atlas_config_test_definitely_missing.toml");
    let err = load_settings(Some(&path)).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn env_overrides_win_over_file_values() {
    let vars = HashMap::from([
        ("APP__GEOCODE_BASE_URL", "http://127.0.0.1:9001"),
        ("APP__LOADING_POLICY", "Unconditional"),
        ("APP__LOG_FILTER", "atlas=debug"),
    ]);
    let mut settings = Settings::default();

    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()))
        .expect("overrides");

    assert_eq!(settings.geocode_base_url, "http://127.0.0.1:9001");
    assert_eq!(settings.loading_policy, LoadingPolicy::Unconditional);
    assert_eq!(settings.log_filter, "atlas=debug");
    assert_eq!(settings.user_agent, Settings::default().user_agent);
}

#[test]
fn invalid_policy_override_is_reported() {
    let mut settings = Settings::default();
    let err = apply_env_overrides(&mut settings, |key| {
        (key == "APP__LOADING_POLICY").then(|| "sometimes".to_string())
    })
    .expect_err("bad policy");

    assert!(format!("{err:#}").contains("sometimes"));
}

#[test]
fn invalid_map_center_is_rejected() {
    let settings = Settings {
        map_center: [120.0, 0.0],
        ..Settings::default()
    };
    assert!(settings.map_view().is_err());
}
