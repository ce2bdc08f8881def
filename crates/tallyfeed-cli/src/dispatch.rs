use tallyfeed_client::commands;
use tallyfeed_client::commands::config::ConfigRunOptions;
use tallyfeed_client::commands::export::ExportRunOptions;
use tallyfeed_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Export {
            layout,
            base_url,
            provider,
            limit,
            timeout_secs,
            output_dir,
            from,
            to,
            dry_run,
            keep_api_collisions,
            json: _,
        } => commands::export::run_with_options(ExportRunOptions {
            layout: layout.clone(),
            base_url: base_url.clone(),
            provider: provider.clone(),
            limit: *limit,
            timeout_secs: *timeout_secs,
            output_dir: output_dir.clone(),
            from: from.as_ref().map(|value| value.as_str().to_string()),
            to: to.as_ref().map(|value| value.as_str().to_string()),
            keep_api_collisions: *keep_api_collisions,
            dry_run: *dry_run,
            home_override: None,
        }),
        Commands::Layouts { .. } => commands::layouts::run(),
        Commands::Config {
            base_url, provider, ..
        } => commands::config::run_with_options(ConfigRunOptions {
            base_url: base_url.clone(),
            provider: provider.clone(),
            home_override: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::parse_from;

    use super::dispatch;

    #[test]
    fn layouts_dispatches_to_layouts_command() {
        let parsed = parse_from(["tallyfeed", "layouts"]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let response = dispatch(&cli);
            assert!(response.is_ok());
            if let Ok(success) = response {
                assert_eq!(success.command, "layouts");
            }
        }
    }

    #[test]
    fn export_rejects_inverted_window_before_fetching() {
        let parsed = parse_from([
            "tallyfeed",
            "export",
            "--base-url",
            "http://127.0.0.1:9",
            "--from",
            "2024-03-01",
            "--to",
            "2024-01-01",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            let response = dispatch(&cli);
            assert!(response.is_err());
            if let Err(error) = response {
                assert_eq!(error.code, "invalid_argument");
            }
        }
    }
}
