use std::path::Path;

use crate::ClientResult;
use crate::config::{SettingsOverrides, resolve_settings};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ConfigData;
use crate::feed::fetch::transactions_endpoint;

#[derive(Debug, Default)]
pub struct ConfigRunOptions<'a> {
    pub base_url: Option<String>,
    pub provider: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(base_url: Option<String>, provider: Option<String>) -> ClientResult<SuccessEnvelope> {
    run_with_options(ConfigRunOptions {
        base_url,
        provider,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ConfigRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let settings = resolve_settings(&SettingsOverrides {
        base_url: options.base_url,
        provider: options.provider,
        home_override: options.home_override,
        ..SettingsOverrides::default()
    })?;

    let data = ConfigData {
        config_path: settings.config_path.display().to_string(),
        config_loaded: settings.config_loaded,
        endpoint: transactions_endpoint(&settings.base_url),
        base_url: settings.base_url,
        provider: settings.provider,
        limit: settings.limit,
        timeout_secs: settings.timeout_secs,
        output_dir: settings.output_dir.display().to_string(),
    };
    success("config", data)
}
