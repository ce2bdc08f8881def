pub mod classify;
pub mod dedupe;
pub(crate) mod fetch;
pub mod layout;
pub mod normalize;
pub(crate) mod parse;
pub mod record;
pub mod signature;
pub(crate) mod summary;
pub(crate) mod write;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::info;
use ulid::Ulid;

use crate::config::Settings;
use crate::contracts::types::{
    CollisionRow, DuplicateRow, DuplicatesPreview, ExportOutput, ExportSummary, ExportWindow,
};
use crate::feed::classify::{DataSource, data_source_of, in_scope};
use crate::feed::dedupe::{
    AuthoritativeCollision, CollisionPolicy, DuplicateMatch, deduplicate, sort_newest_first,
};
use crate::feed::layout::{Layout, RecordSelection};
use crate::feed::normalize::{NormalizedTransaction, normalize};
use crate::feed::record::RawTransaction;
use crate::feed::signature::counterparty_name;
use crate::{ClientError, ClientResult};

pub(crate) const DUPLICATES_PREVIEW_LIMIT: usize = 50;

/// Inclusive calendar-date bounds on `occurred_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ClientResult<Self> {
        if let (Some(start), Some(end)) = (from, to)
            && start > end
        {
            return Err(ClientError::invalid_argument_for_command(
                &format!("`--from {start}` is after `--to {end}`."),
                Some("export"),
            ));
        }
        Ok(Self { from, to })
    }

    pub fn parse(from: Option<&str>, to: Option<&str>) -> ClientResult<Self> {
        let parsed_from = from.map(|value| parse_window_date(value, "from")).transpose()?;
        let parsed_to = to.map(|value| parse_window_date(value, "to")).transpose()?;
        Self::new(parsed_from, parsed_to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Records whose date portion does not parse fall outside any bounded window.
    pub fn contains(&self, record: &RawTransaction) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Ok(date) = NaiveDate::parse_from_str(record.occurred_date(), "%Y-%m-%d") else {
            return false;
        };
        self.from.is_none_or(|start| date >= start) && self.to.is_none_or(|end| date <= end)
    }
}

fn parse_window_date(value: &str, flag: &str) -> ClientResult<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() != 10 {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`--{flag}` must use YYYY-MM-DD format, got `{value}`."),
            Some("export"),
        ));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        ClientError::invalid_argument_for_command(
            &format!("`--{flag}` must be a real calendar date, got `{value}`."),
            Some("export"),
        )
    })
}

#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub layout: Option<Layout>,
    pub policy: CollisionPolicy,
    pub window: DateWindow,
    pub dry_run: bool,
}

impl ExportRequest {
    pub fn layout(&self) -> Layout {
        self.layout.unwrap_or(Layout::Deduplicated)
    }
}

/// In-memory result of selecting, deduplicating, and windowing one fetch.
#[derive(Debug, Clone, Default)]
pub struct ExportPlan {
    pub rows: Vec<RawTransaction>,
    pub fetched: usize,
    pub in_scope: usize,
    pub api_records: usize,
    pub imported_records: usize,
    pub outside_window: usize,
    pub duplicates: Vec<DuplicateMatch>,
    pub collisions: Vec<AuthoritativeCollision>,
}

/// Pure half of an export: everything between the HTTP response and the CSV file.
pub fn plan_export(
    records: Vec<RawTransaction>,
    provider: &str,
    layout: Layout,
    policy: CollisionPolicy,
    window: DateWindow,
) -> ExportPlan {
    let fetched = records.len();
    let scoped = records
        .into_iter()
        .filter(|record| in_scope(record, provider))
        .collect::<Vec<RawTransaction>>();
    let in_scope_count = scoped.len();
    let api_records = scoped
        .iter()
        .filter(|record| data_source_of(record) == DataSource::Api)
        .count();

    let mut duplicates = Vec::new();
    let mut collisions = Vec::new();
    let mut selected = match layout.selection() {
        RecordSelection::Everything => scoped,
        RecordSelection::ApiOnly => scoped
            .into_iter()
            .filter(|record| data_source_of(record).is_authoritative())
            .collect(),
        RecordSelection::Deduplicated => {
            let outcome = deduplicate(scoped, policy);
            duplicates = outcome.duplicates;
            collisions = outcome.collisions;
            outcome.records
        }
    };
    if layout.sorts_newest_first() {
        sort_newest_first(&mut selected);
    }

    let before_window = selected.len();
    selected.retain(|record| window.contains(record));

    ExportPlan {
        outside_window: before_window - selected.len(),
        rows: selected,
        fetched,
        in_scope: in_scope_count,
        api_records,
        imported_records: in_scope_count - api_records,
        duplicates,
        collisions,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ExportExecutionResult {
    pub run_id: String,
    pub layout: Layout,
    pub source_url: String,
    pub message: String,
    pub window: ExportWindow,
    pub summary: ExportSummary,
    pub output: Option<ExportOutput>,
    pub plan: ExportPlan,
}

impl ExportExecutionResult {
    pub(crate) fn normalized_rows(&self) -> Vec<NormalizedTransaction<'_>> {
        self.plan.rows.iter().map(normalize).collect()
    }
}

pub(crate) fn execute(
    settings: &Settings,
    request: &ExportRequest,
) -> ClientResult<ExportExecutionResult> {
    let layout = request.layout();
    let run_id = format!("run_{}", Ulid::new());
    let batch = fetch::fetch_transactions(settings)?;
    let plan = plan_export(
        batch.records,
        &settings.provider,
        layout,
        request.policy,
        request.window,
    );
    info!(
        run_id = run_id.as_str(),
        layout = layout.slug(),
        in_scope = plan.in_scope,
        rows = plan.rows.len(),
        "export planned"
    );

    let output = if request.dry_run {
        None
    } else {
        let file_name =
            write::output_file_name(&settings.provider, layout, Local::now().naive_local());
        let path: PathBuf = settings.output_dir.join(&file_name);
        let normalized = plan.rows.iter().map(normalize).collect::<Vec<_>>();
        let written = write::write_csv(&path, layout, &normalized)?;
        Some(ExportOutput {
            path: written.path.display().to_string(),
            file_name,
            bytes: written.bytes,
        })
    };

    let message = match &output {
        Some(file) => format!("Wrote {} rows to {}.", plan.rows.len(), file.path),
        None => format!(
            "Dry run: {} rows would be written. No file was created.",
            plan.rows.len()
        ),
    };

    Ok(ExportExecutionResult {
        run_id,
        layout,
        source_url: batch.url,
        message,
        window: ExportWindow {
            from: request.window.from.map(|date| date.to_string()),
            to: request.window.to.map(|date| date.to_string()),
        },
        summary: build_summary(&plan),
        output,
        plan,
    })
}

fn build_summary(plan: &ExportPlan) -> ExportSummary {
    ExportSummary {
        fetched: plan.fetched as i64,
        in_scope: plan.in_scope as i64,
        api_records: plan.api_records as i64,
        imported_records: plan.imported_records as i64,
        duplicates_removed: plan.duplicates.len() as i64,
        api_collisions: plan.collisions.len() as i64,
        outside_window: plan.outside_window as i64,
        rows_written: plan.rows.len() as i64,
    }
}

pub(crate) fn build_duplicates_preview(duplicates: &[DuplicateMatch]) -> DuplicatesPreview {
    let rows = duplicates
        .iter()
        .take(DUPLICATES_PREVIEW_LIMIT)
        .map(|duplicate| DuplicateRow {
            source_row_index: duplicate.source_row_index,
            id: duplicate.dropped.id.clone(),
            occurred_at: duplicate.dropped.occurred_at.clone(),
            amount_minor: duplicate.dropped.amount_minor,
            counterparty: counterparty_name(&duplicate.dropped).trim().to_string(),
            source_file: Some(duplicate.dropped.source_file.clone())
                .filter(|value| !value.is_empty()),
            matched_id: duplicate.matched_id.clone(),
        })
        .collect::<Vec<DuplicateRow>>();

    DuplicatesPreview {
        returned: rows.len() as i64,
        truncated: duplicates.len() > DUPLICATES_PREVIEW_LIMIT,
        rows,
    }
}

pub(crate) fn collision_rows(collisions: &[AuthoritativeCollision]) -> Vec<CollisionRow> {
    collisions
        .iter()
        .map(|collision| CollisionRow {
            amount_minor: collision.signature.amount_minor,
            occurred_on: collision.signature.date.clone(),
            counterparty: collision.signature.name.clone(),
            earlier_id: collision.earlier_id.clone(),
            later_id: collision.later_id.clone(),
            resolution: collision.resolution.as_str().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::{DateWindow, build_duplicates_preview, plan_export};
    use crate::feed::dedupe::{CollisionPolicy, DuplicateMatch};
    use crate::feed::layout::Layout;
    use crate::feed::record::RawTransaction;
    use crate::feed::signature::Signature;

    fn api(id: &str, provider: &str, amount_minor: i64, occurred_at: &str) -> RawTransaction {
        RawTransaction {
            id: id.to_string(),
            provider: provider.to_string(),
            amount_minor,
            occurred_at: occurred_at.to_string(),
            raw: json!({"feedItemUid": format!("fi_{id}"), "counterPartyName": "Acme"})
                .as_object()
                .cloned(),
            ..RawTransaction::default()
        }
    }

    fn imported(id: &str, amount_minor: i64, occurred_at: &str) -> RawTransaction {
        RawTransaction {
            id: id.to_string(),
            provider: "Starling".to_string(),
            amount_minor,
            occurred_at: occurred_at.to_string(),
            person_name: "ACME".to_string(),
            ..RawTransaction::default()
        }
    }

    fn fixture() -> Vec<RawTransaction> {
        vec![
            api("a1", "Starling", -500, "2024-01-05T10:00:00Z"),
            imported("c1", -500, "2024-01-05T08:00:00Z"),
            imported("c2", 900, "2024-03-01T08:00:00Z"),
            api("m1", "Monzo", -500, "2024-02-01T10:00:00Z"),
            api("a2", "Starling", 1_200, "2023-12-24T10:00:00Z"),
        ]
    }

    fn date(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
    }

    fn ids(records: &[RawTransaction]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn other_providers_are_dropped_before_selection() {
        let plan = plan_export(
            fixture(),
            "Starling",
            Layout::All,
            CollisionPolicy::LastWins,
            DateWindow::default(),
        );
        assert_eq!(plan.fetched, 5);
        assert_eq!(plan.in_scope, 4);
        assert_eq!(plan.api_records, 2);
        assert_eq!(plan.imported_records, 2);
        assert_eq!(ids(&plan.rows), vec!["a1", "c1", "c2", "a2"]);
    }

    #[test]
    fn provider_match_is_case_sensitive() {
        let plan = plan_export(
            fixture(),
            "starling",
            Layout::All,
            CollisionPolicy::LastWins,
            DateWindow::default(),
        );
        assert!(plan.rows.is_empty());
    }

    #[test]
    fn api_layouts_keep_service_order() {
        let plan = plan_export(
            fixture(),
            "Starling",
            Layout::ApiOnly,
            CollisionPolicy::LastWins,
            DateWindow::default(),
        );
        assert_eq!(ids(&plan.rows), vec!["a1", "a2"]);
    }

    #[test]
    fn complete_layout_sorts_newest_first_without_dedupe() {
        let plan = plan_export(
            fixture(),
            "Starling",
            Layout::Complete,
            CollisionPolicy::LastWins,
            DateWindow::default(),
        );
        assert_eq!(ids(&plan.rows), vec!["c2", "a1", "c1", "a2"]);
        assert!(plan.duplicates.is_empty());
    }

    #[test]
    fn deduplicated_layout_removes_restatements() {
        let plan = plan_export(
            fixture(),
            "Starling",
            Layout::Deduplicated,
            CollisionPolicy::LastWins,
            DateWindow::default(),
        );
        assert_eq!(ids(&plan.rows), vec!["c2", "a1", "a2"]);
        assert_eq!(plan.duplicates.len(), 1);
        assert_eq!(plan.duplicates[0].matched_id, "a1");
    }

    #[test]
    fn window_applies_after_dedupe() {
        let window = DateWindow::new(date("2024-01-01"), date("2024-01-31"));
        assert!(window.is_ok());
        if let Ok(window) = window {
            let plan = plan_export(
                fixture(),
                "Starling",
                Layout::Deduplicated,
                CollisionPolicy::LastWins,
                window,
            );
            assert_eq!(ids(&plan.rows), vec!["a1"]);
            assert_eq!(plan.duplicates.len(), 1);
            assert_eq!(plan.outside_window, 2);
        }
    }

    #[test]
    fn inverted_window_is_rejected() {
        let window = DateWindow::new(date("2024-02-01"), date("2024-01-01"));
        assert!(window.is_err());
        if let Err(error) = window {
            assert_eq!(error.code, "invalid_argument");
        }
    }

    #[test]
    fn window_flags_require_real_iso_dates() {
        let parsed = DateWindow::parse(Some("2024-01-01"), None);
        assert!(parsed.is_ok());
        if let Ok(window) = parsed {
            assert_eq!(window.from, date("2024-01-01"));
            assert_eq!(window.to, None);
        }
        assert!(DateWindow::parse(Some("2024-1-1"), None).is_err());
        assert!(DateWindow::parse(None, Some("2024-02-30")).is_err());
    }

    #[test]
    fn bounded_window_excludes_unparsable_dates() {
        let window = DateWindow {
            from: date("2024-01-01"),
            to: None,
        };
        let record = RawTransaction {
            occurred_at: "yesterday".to_string(),
            ..RawTransaction::default()
        };
        assert!(!window.contains(&record));
        assert!(DateWindow::default().contains(&record));
    }

    #[test]
    fn duplicates_preview_truncates() {
        let duplicates = (0..60)
            .map(|index| {
                let dropped = imported(&format!("c{index}"), -500, "2024-01-05T08:00:00Z");
                DuplicateMatch {
                    signature: Signature::of(&dropped),
                    dropped,
                    source_row_index: index + 1,
                    matched_id: "a1".to_string(),
                }
            })
            .collect::<Vec<DuplicateMatch>>();
        let preview = build_duplicates_preview(&duplicates);
        assert_eq!(preview.returned, 50);
        assert!(preview.truncated);
        assert_eq!(preview.rows[0].counterparty, "ACME");
        assert_eq!(preview.rows[0].source_file, None);
    }
}
