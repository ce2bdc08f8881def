use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const EXPORT_HELP_COMMAND: &str = "tallyfeed export --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `tallyfeed {cmd} --help` for usage."),
            None => "Run `tallyfeed --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn config_invalid(message: &str, source: &str) -> Self {
        Self::new(
            "config_invalid",
            message,
            vec![
                "Pass the value as a flag, e.g. `--base-url https://example.com`.".to_string(),
                "Or set the matching TALLYFEED_* environment variable.".to_string(),
                format!("Run `{EXPORT_HELP_COMMAND}` to review configuration sources."),
            ],
        )
        .with_data(json!({
            "config_source": source,
        }))
    }

    pub fn fetch_failed(url: &str, detail: &str) -> Self {
        Self::new(
            "fetch_failed",
            &format!("Could not reach the transactions endpoint `{url}`: {detail}"),
            vec![
                "Check network connectivity and the configured base URL.".to_string(),
                "Rerun the export; nothing was written.".to_string(),
            ],
        )
        .with_data(json!({
            "url": url,
        }))
    }

    pub fn fetch_http_status(url: &str, status: u16) -> Self {
        Self::new(
            "fetch_http_status",
            &format!("Transactions endpoint `{url}` answered with HTTP {status}."),
            vec![
                "Verify the base URL points at the ledger service.".to_string(),
                "Rerun the export once the service is healthy; nothing was written.".to_string(),
            ],
        )
        .with_data(json!({
            "url": url,
            "status": status,
        }))
    }

    pub fn response_malformed(detail: &str) -> Self {
        Self::new(
            "response_malformed",
            &format!("Transactions response could not be parsed: {detail}"),
            vec![
                "Confirm the endpoint returns `{\"ok\": true, \"data\": [...]}`.".to_string(),
                "Rerun the export; nothing was written.".to_string(),
            ],
        )
    }

    pub fn response_rejected(message: &str) -> Self {
        Self::new(
            "response_rejected",
            &format!("Transactions endpoint reported a failure: {message}"),
            vec!["Rerun the export once the service is healthy; nothing was written.".to_string()],
        )
    }

    pub fn output_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "output_write_failed",
            &format!("Could not write export file `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or pass `--output-dir` with a writable directory."
            )],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
