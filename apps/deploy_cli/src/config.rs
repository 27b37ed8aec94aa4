use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use cloudfront_step::{ErrorDisplay, StepConfig};
use console_client::ConsoleClientOptions;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub distribution_page: u32,
    pub distribution_count: u32,
    pub show_load_errors: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:4000/graphql".into(),
            api_token: None,
            request_timeout_secs: 30,
            distribution_page: 1,
            distribution_count: 10,
            show_load_errors: true,
        }
    }
}

impl Settings {
    pub fn client_options(&self) -> ConsoleClientOptions {
        ConsoleClientOptions {
            api_url: self.api_url.clone(),
            api_token: self.api_token.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn step_config(&self) -> StepConfig {
        StepConfig {
            distribution_page: self.distribution_page,
            distribution_count: self.distribution_count,
            error_display: if self.show_load_errors {
                ErrorDisplay::Visible
            } else {
                ErrorDisplay::Silent
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    api_token: Option<String>,
    request_timeout_secs: Option<u64>,
    distribution_page: Option<u32>,
    distribution_count: Option<u32>,
    show_load_errors: Option<bool>,
}

/// Defaults, then `path` if it exists, then `DEPLOY_*` environment variables.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.api_token {
        settings.api_token = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.distribution_page {
        settings.distribution_page = v;
    }
    if let Some(v) = file_cfg.distribution_count {
        settings.distribution_count = v;
    }
    if let Some(v) = file_cfg.show_load_errors {
        settings.show_load_errors = v;
    }
    Ok(())
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(v) = lookup("DEPLOY_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("DEPLOY_API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = lookup("DEPLOY_REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("DEPLOY_REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
    }
    if let Some(v) = lookup("DEPLOY_SHOW_LOAD_ERRORS") {
        settings.show_load_errors = parse_flag(&v)
            .with_context(|| format!("DEPLOY_SHOW_LOAD_ERRORS is not a boolean: '{v}'"))?;
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
