use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{SessionStore, DEFAULT_API_BASE, DEFAULT_AUTH_TIMEOUT};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "legal-simplifier.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub session_file: Option<PathBuf>,
    pub auth_timeout_secs: u64,
    pub export_dir: PathBuf,
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            session_file: SessionStore::default_path(),
            auth_timeout_secs: DEFAULT_AUTH_TIMEOUT.as_secs(),
            export_dir: PathBuf::from("."),
            color: true,
        }
    }
}

impl Settings {
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    /// Applies command-line flags, the highest-priority layer.
    pub fn apply_cli(
        &mut self,
        api_base: Option<&str>,
        session_file: Option<&Path>,
        no_color: bool,
    ) -> anyhow::Result<()> {
        if let Some(v) = api_base {
            self.api_base = normalize_api_base(v)?;
        }
        if let Some(v) = session_file {
            self.session_file = Some(v.to_path_buf());
        }
        if no_color {
            self.color = false;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_base: Option<String>,
    session_file: Option<PathBuf>,
    auth_timeout_secs: Option<u64>,
    export_dir: Option<PathBuf>,
    color: Option<bool>,
}

/// Defaults, then the config file, then the environment. An explicit
/// `config_path` must exist; the default file in the working directory is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let raw = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    build_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

pub fn build_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid config file")?;
        if let Some(v) = file_cfg.api_base {
            settings.api_base = v;
        }
        if let Some(v) = file_cfg.session_file {
            settings.session_file = Some(v);
        }
        if let Some(v) = file_cfg.auth_timeout_secs {
            settings.auth_timeout_secs = v;
        }
        if let Some(v) = file_cfg.export_dir {
            settings.export_dir = v;
        }
        if let Some(v) = file_cfg.color {
            settings.color = v;
        }
    }

    if let Some(v) = layered_env(&env, "SIMPLIFIER_API_BASE", "APP__API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = layered_env(&env, "SIMPLIFIER_SESSION_FILE", "APP__SESSION_FILE") {
        settings.session_file = Some(PathBuf::from(v));
    }
    if let Some(v) = layered_env(&env, "SIMPLIFIER_AUTH_TIMEOUT_SECS", "APP__AUTH_TIMEOUT_SECS") {
        settings.auth_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("invalid auth timeout '{v}'"))?;
    }
    if let Some(v) = layered_env(&env, "SIMPLIFIER_EXPORT_DIR", "APP__EXPORT_DIR") {
        settings.export_dir = PathBuf::from(v);
    }
    if env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        settings.color = false;
    }

    if settings.auth_timeout_secs == 0 {
        bail!("auth timeout must be at least one second");
    }
    settings.api_base = normalize_api_base(&settings.api_base)?;
    Ok(settings)
}

/// The `APP__` spelling wins over the short one when both are set.
fn layered_env(env: &impl Fn(&str) -> Option<String>, short: &str, app: &str) -> Option<String> {
    env(app).or_else(|| env(short)).filter(|v| !v.trim().is_empty())
}

pub fn normalize_api_base(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid API base URL '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("API base URL must use http or https, got '{}'", url.scheme());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
