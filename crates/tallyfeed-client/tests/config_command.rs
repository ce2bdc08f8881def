use std::fs;

use tallyfeed_client::commands::config::{self, ConfigRunOptions};
use tempfile::tempdir;

#[test]
fn config_reports_file_values_and_endpoint() {
    let home = tempdir();
    assert!(home.is_ok());
    let Ok(home) = home else {
        return;
    };
    let written = fs::write(
        home.path().join("config.json"),
        r#"{"base_url": "https://ledger.example.com/", "timeout_secs": 12}"#,
    );
    assert!(written.is_ok());

    let result = config::run_with_options(ConfigRunOptions {
        provider: Some("Starling".to_string()),
        home_override: Some(home.path()),
        ..ConfigRunOptions::default()
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert_eq!(envelope.command, "config");
        assert_eq!(envelope.data["config_loaded"], true);
        assert_eq!(
            envelope.data["endpoint"],
            "https://ledger.example.com/api/transactions"
        );
        assert_eq!(envelope.data["timeout_secs"], 12);
        assert_eq!(envelope.data["provider"], "Starling");
    }
}

#[test]
fn config_without_base_url_points_at_recovery() {
    let home = tempdir();
    assert!(home.is_ok());
    let Ok(home) = home else {
        return;
    };

    let result = config::run_with_options(ConfigRunOptions {
        home_override: Some(home.path()),
        ..ConfigRunOptions::default()
    });
    if let Err(error) = result {
        assert_eq!(error.code, "config_invalid");
        assert!(!error.recovery_steps.is_empty());
    }
}
