use super::{build_settings, normalize_api_base, Settings};

use std::{collections::HashMap, path::PathBuf};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = build_settings(None, env_from(&[])).expect("settings");
    assert_eq!(settings.api_base, "http://localhost:8000");
    assert_eq!(settings.auth_timeout_secs, 10);
    assert_eq!(settings.export_dir, PathBuf::from("."));
    assert!(settings.color);
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
api_base = "https://legal.example.com/api/"
auth_timeout_secs = 30
export_dir = "out"
color = false
"#;
    let settings = build_settings(Some(raw), env_from(&[])).expect("settings");
    assert_eq!(settings.api_base, "https://legal.example.com/api");
    assert_eq!(settings.auth_timeout_secs, 30);
    assert_eq!(settings.export_dir, PathBuf::from("out"));
    assert!(!settings.color);
}

#[test]
fn environment_overrides_file() {
    let raw = r#"api_base = "http://file.example.com""#;
    let settings = build_settings(
        Some(raw),
        env_from(&[
            ("SIMPLIFIER_API_BASE", "http://short.example.com"),
            ("SIMPLIFIER_SESSION_FILE", "/tmp/session.json"),
            ("SIMPLIFIER_AUTH_TIMEOUT_SECS", "5"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.api_base, "http://short.example.com");
    assert_eq!(settings.session_file, Some(PathBuf::from("/tmp/session.json")));
    assert_eq!(settings.auth_timeout(), std::time::Duration::from_secs(5));
}

#[test]
fn app_prefixed_variables_win() {
    let settings = build_settings(
        None,
        env_from(&[
            ("SIMPLIFIER_API_BASE", "http://short.example.com"),
            ("APP__API_BASE", "http://app.example.com:9000/"),
            ("APP__EXPORT_DIR", "exports"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.api_base, "http://app.example.com:9000");
    assert_eq!(settings.export_dir, PathBuf::from("exports"));
}

#[test]
fn no_color_disables_styling() {
    let settings = build_settings(None, env_from(&[("NO_COLOR", "1")])).expect("settings");
    assert!(!settings.color);

    let settings = build_settings(None, env_from(&[("NO_COLOR", "")])).expect("settings");
    assert!(settings.color);
}

#[test]
fn rejects_bad_values() {
    assert!(build_settings(Some("api_base = 12"), env_from(&[])).is_err());
    assert!(build_settings(None, env_from(&[("APP__AUTH_TIMEOUT_SECS", "soon")])).is_err());
    assert!(build_settings(None, env_from(&[("APP__AUTH_TIMEOUT_SECS", "0")])).is_err());
    assert!(build_settings(None, env_from(&[("APP__API_BASE", "ftp://files")])).is_err());
}

#[test]
fn normalizes_api_base() {
    assert_eq!(
        normalize_api_base(" http://localhost:8000/ ").expect("url"),
        "http://localhost:8000"
    );
    assert!(normalize_api_base("localhost:8000").is_err());
}

#[test]
fn cli_flags_take_precedence() {
    let mut settings = Settings::default();
    settings
        .apply_cli(
            Some("https://cli.example.com/"),
            Some(std::path::Path::new("cli-session.json")),
            true,
        )
        .expect("apply");
    assert_eq!(settings.api_base, "https://cli.example.com");
    assert_eq!(settings.session_file, Some(PathBuf::from("cli-session.json")));
    assert!(!settings.color);
}
