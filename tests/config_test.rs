//! Integration tests for layered Settings loading.
//!
//! Precedence (lowest to highest): compiled defaults, config file,
//! ROUNDDROP_* environment variables.

use std::fs;

use tempfile::TempDir;

use rounddrop::config::Settings;
use rounddrop::domain::DropPolicy;

#[test]
fn given_config_file_when_loading_then_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rounddrop.toml");
    fs::write(
        &path,
        r#"
opener = "my-open"
drop_policy = "restore"

[running]
poll_interval_ms = 500
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Some(&path)).expect("load settings");

    assert_eq!(settings.opener, "my-open");
    assert_eq!(settings.drop_policy, DropPolicy::Restore);
    assert_eq!(settings.running.poll_interval_ms, 500);
    // Untouched keys keep their defaults
    assert_eq!(settings.running.probe_args, vec!["list".to_string()]);
}

#[test]
fn given_base_dir_with_tilde_when_loading_then_paths_derive_from_expanded_dir() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rounddrop.toml");
    fs::write(&path, "base_dir = \"~/launcher\"\n").unwrap();

    let settings = Settings::load_from(Some(&path)).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert!(settings.base_dir.starts_with(&home));
    assert!(settings.base_dir.ends_with("launcher"));
    assert_eq!(settings.document_path(), settings.base_dir.join("commands.toml"));
    assert_eq!(settings.images_dir(), settings.base_dir.join("images"));
}

#[test]
fn given_missing_config_file_when_loading_then_defaults_apply() {
    let temp = TempDir::new().unwrap();

    let settings =
        Settings::load_from(Some(&temp.path().join("absent.toml"))).expect("load settings");

    assert_eq!(settings.running.probe_bin, Settings::default().running.probe_bin);
}

#[test]
fn given_malformed_config_file_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rounddrop.toml");
    fs::write(&path, "drop_policy = [").unwrap();

    let err = Settings::load_from(Some(&path)).unwrap_err();

    assert!(err.to_string().starts_with("config error"), "{err}");
}

// Only this test touches the environment; the keys it sets are not
// asserted anywhere else in this file.
#[test]
fn given_env_vars_when_loading_then_env_wins_over_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rounddrop.toml");
    fs::write(
        &path,
        "bundle_extensions = [\"app\"]\n\n[running]\nprobe_bin = \"/from/file\"\n",
    )
    .unwrap();
    std::env::set_var("ROUNDDROP_RUNNING__PROBE_BIN", "/from/env");
    std::env::set_var("ROUNDDROP_BUNDLE_EXTENSIONS", "app,prefPane");

    let settings = Settings::load_from(Some(&path));

    std::env::remove_var("ROUNDDROP_RUNNING__PROBE_BIN");
    std::env::remove_var("ROUNDDROP_BUNDLE_EXTENSIONS");

    let settings = settings.expect("load settings");
    assert_eq!(settings.running.probe_bin, "/from/env");
    assert_eq!(
        settings.bundle_extensions,
        vec!["app".to_string(), "prefPane".to_string()]
    );
}

#[test]
fn given_effective_settings_when_rendered_then_round_trips_through_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rounddrop.toml");
    let original = Settings {
        base_dir: temp.path().join("data"),
        opener: "xdg-open".into(),
        drop_policy: DropPolicy::Restore,
        ..Settings::default()
    };
    fs::write(&path, original.to_toml().unwrap()).unwrap();

    let loaded = Settings::load_from(Some(&path)).expect("load settings");

    assert_eq!(loaded.base_dir, original.base_dir);
    assert_eq!(loaded.opener, original.opener);
    assert_eq!(loaded.drop_policy, original.drop_policy);
}
