use std::time::Duration;

use tracing::info;
use ureq::Agent;

use crate::config::Settings;
use crate::feed::parse::parse_response;
use crate::feed::record::RawTransaction;
use crate::{ClientError, ClientResult};

const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub(crate) struct FetchedBatch {
    pub(crate) url: String,
    pub(crate) records: Vec<RawTransaction>,
}

pub(crate) fn transactions_endpoint(base_url: &str) -> String {
    format!("{}/api/transactions", base_url.trim_end_matches('/'))
}

/// One GET against the ledger service. Any transport, status, or parse
/// failure ends the run; there is no retry.
pub(crate) fn fetch_transactions(settings: &Settings) -> ClientResult<FetchedBatch> {
    let url = transactions_endpoint(&settings.base_url);
    let limit = settings.limit.to_string();
    info!(
        url = url.as_str(),
        provider = settings.provider.as_str(),
        limit = settings.limit,
        "fetching transactions"
    );

    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
        .build()
        .into();

    let response = agent
        .get(&url)
        .header("Accept", "application/json")
        .query("provider", &settings.provider)
        .query("limit", &limit)
        .call()
        .map_err(|error| match error {
            ureq::Error::StatusCode(status) => ClientError::fetch_http_status(&url, status),
            other => ClientError::fetch_failed(&url, &other.to_string()),
        })?;

    let body = response
        .into_body()
        .with_config()
        .limit(MAX_RESPONSE_BYTES)
        .read_to_string()
        .map_err(|error| ClientError::fetch_failed(&url, &error.to_string()))?;

    let records = parse_response(&body)?;
    info!(count = records.len(), "received transactions");

    Ok(FetchedBatch { url, records })
}
