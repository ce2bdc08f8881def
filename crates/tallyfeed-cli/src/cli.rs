use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && [0usize, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|index| bytes[*index].is_ascii_digit());
    if !shaped {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_layout(value: &str) -> Result<String, String> {
    match value {
        "all" | "api-only" | "with-direction" | "complete" | "deduplicated" => {
            Ok(value.to_string())
        }
        _ => Err(
            "layout must be one of: all, api-only, with-direction, complete, deduplicated"
                .to_string(),
        ),
    }
}

/// Extended help shown after `tallyfeed export --help`.
pub const EXPORT_AFTER_HELP: &str = "\
How export works:
  1. One GET to <base-url>/api/transactions?provider=<provider>&limit=<limit>.
  2. Records from other providers are dropped (exact, case-sensitive match).
  3. Each record gets a direction (provider value, then metadata, then amount sign).
  4. The layout picks records and columns, and the CSV lands in --output-dir as
     <provider>_<layout>_<YYYYMMDD_HHMMSS>.csv.

Layouts:
  all             every record, service order
  api-only        live provider records only
  with-direction  live provider records, direction first
  complete        every record, newest first, with direction and data source
  deduplicated    live records plus imported history, restatements removed (default)

Deduplication:
  An imported record is dropped when a live record has the same amount,
  the same calendar date, and the same counterparty name (trimmed, case-insensitive).
  Live records sharing that key collapse to the last one seen unless
  --keep-api-collisions is set; every collision is listed in the report.

Configuration (first match wins):
  flag > TALLYFEED_* environment variable > $TALLYFEED_HOME/config.json
  (default ~/.tallyfeed/config.json) > built-in default.
  Run `tallyfeed config` to see the resolved values.

Logging:
  Set TALLYFEED_LOG (e.g. `info`, `tallyfeed_client=debug`) for diagnostics on stderr.
";

#[derive(Debug, Parser)]
#[command(
    name = "tallyfeed",
    version,
    about = "bank transaction export and deduplication",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch transactions and write one CSV layout
    #[command(after_long_help = EXPORT_AFTER_HELP)]
    Export {
        /// Column layout to write (default: deduplicated)
        #[arg(value_parser = parse_layout)]
        layout: Option<String>,
        /// Ledger service base URL, e.g. https://ledger.example.com
        #[arg(long)]
        base_url: Option<String>,
        /// Provider to keep (exact match)
        #[arg(long)]
        provider: Option<String>,
        /// Maximum records requested from the service
        #[arg(long)]
        limit: Option<u32>,
        /// Whole-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Directory the CSV is written to
        #[arg(long)]
        output_dir: Option<String>,
        /// Earliest transaction date to write (YYYY-MM-DD, inclusive)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// Latest transaction date to write (YYYY-MM-DD, inclusive)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Report what would be written without creating a file
        #[arg(long)]
        dry_run: bool,
        /// Keep live records that share a dedupe key when their ids differ
        #[arg(long)]
        keep_api_collisions: bool,
        /// Emit structured JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// List available CSV layouts and their columns
    Layouts {
        /// Emit structured JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved configuration
    Config {
        /// Ledger service base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Provider to keep
        #[arg(long)]
        provider: Option<String>,
        /// Emit structured JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn wants_json(&self) -> bool {
        match self {
            Self::Export { json, .. } | Self::Layouts { json } | Self::Config { json, .. } => *json,
        }
    }
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
