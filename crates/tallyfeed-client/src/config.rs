use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ClientError, ClientResult};

pub const DEFAULT_PROVIDER: &str = "Starling";
pub const DEFAULT_LIMIT: u32 = 10_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_HOME: &str = "TALLYFEED_HOME";
pub const ENV_BASE_URL: &str = "TALLYFEED_BASE_URL";
pub const ENV_PROVIDER: &str = "TALLYFEED_PROVIDER";
pub const ENV_LIMIT: &str = "TALLYFEED_LIMIT";
pub const ENV_TIMEOUT_SECS: &str = "TALLYFEED_TIMEOUT_SECS";
pub const ENV_OUTPUT_DIR: &str = "TALLYFEED_OUTPUT_DIR";

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub provider: String,
    pub limit: u32,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    pub config_path: PathBuf,
    pub config_loaded: bool,
}

/// Values given on the command line; each one beats every other source.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides<'a> {
    pub base_url: Option<String>,
    pub provider: Option<String>,
    pub limit: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    provider: Option<String>,
    limit: Option<u32>,
    timeout_secs: Option<u64>,
    output_dir: Option<String>,
}

pub fn resolve_settings(overrides: &SettingsOverrides<'_>) -> ClientResult<Settings> {
    resolve_settings_with_env(overrides, |key| std::env::var(key).ok())
}

pub fn resolve_settings_with_env<F>(
    overrides: &SettingsOverrides<'_>,
    env: F,
) -> ClientResult<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let config_home = resolve_config_home(overrides.home_override, &env)?;
    let config_path = config_home.join(CONFIG_FILE_NAME);
    let (file, config_loaded) = read_config_file(&config_path)?;
    let env_value = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let base_url = overrides
        .base_url
        .clone()
        .or_else(|| env_value(ENV_BASE_URL))
        .or(file.base_url)
        .map(|value| value.trim().to_string())
        .ok_or_else(|| {
            ClientError::config_invalid(
                "No base URL configured for the transactions endpoint.",
                "base_url",
            )
        })?;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ClientError::config_invalid(
            &format!("Base URL `{base_url}` must start with http:// or https://."),
            "base_url",
        ));
    }

    let provider = overrides
        .provider
        .clone()
        .or_else(|| env_value(ENV_PROVIDER))
        .or(file.provider)
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    if provider.trim().is_empty() {
        return Err(ClientError::config_invalid(
            "Provider must not be empty.",
            "provider",
        ));
    }

    let limit = match overrides.limit {
        Some(value) => value,
        None => match env_value(ENV_LIMIT) {
            Some(raw) => parse_env_number::<u32>(ENV_LIMIT, &raw)?,
            None => file.limit.unwrap_or(DEFAULT_LIMIT),
        },
    };
    if limit == 0 {
        return Err(ClientError::config_invalid(
            "Limit must be greater than zero.",
            "limit",
        ));
    }

    let timeout_secs = match overrides.timeout_secs {
        Some(value) => value,
        None => match env_value(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_env_number::<u64>(ENV_TIMEOUT_SECS, &raw)?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        },
    };
    if timeout_secs == 0 {
        return Err(ClientError::config_invalid(
            "Timeout must be at least one second.",
            "timeout_secs",
        ));
    }

    let output_dir = overrides
        .output_dir
        .clone()
        .or_else(|| env_value(ENV_OUTPUT_DIR))
        .or(file.output_dir)
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    Ok(Settings {
        base_url,
        provider,
        limit,
        timeout_secs,
        output_dir: PathBuf::from(output_dir),
        config_path,
        config_loaded,
    })
}

pub fn resolve_config_home<F>(home_override: Option<&Path>, env: &F) -> ClientResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let candidate = match home_override {
        Some(path) => path.to_path_buf(),
        None => {
            if let Some(override_path) = env(ENV_HOME).filter(|value| !value.is_empty()) {
                PathBuf::from(override_path)
            } else if let Some(home_path) = home::home_dir() {
                home_path.join(".tallyfeed")
            } else {
                return Err(ClientError::config_invalid(
                    "Could not resolve a home directory for configuration.",
                    "home",
                ));
            }
        }
    };

    absolutize(&candidate)
}

fn read_config_file(path: &Path) -> ClientResult<(FileSettings, bool)> {
    let body = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok((FileSettings::default(), false));
        }
        Err(error) => {
            return Err(ClientError::config_invalid(
                &format!("Could not read `{}`: {error}", path.display()),
                "config_file",
            ));
        }
    };

    serde_json::from_str::<FileSettings>(&body)
        .map(|settings| (settings, true))
        .map_err(|error| {
            ClientError::config_invalid(
                &format!("Config file `{}` is invalid: {error}", path.display()),
                "config_file",
            )
        })
}

fn parse_env_number<T>(key: &str, raw: &str) -> ClientResult<T>
where
    T: std::str::FromStr,
{
    raw.trim().parse::<T>().map_err(|_| {
        ClientError::config_invalid(
            &format!("Environment variable {key} must be a positive whole number, got `{raw}`."),
            key,
        )
    })
}

fn absolutize(path: &Path) -> ClientResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|error| ClientError::config_invalid(&error.to_string(), "home"))
}
