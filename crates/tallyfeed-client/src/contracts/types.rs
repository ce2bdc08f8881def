use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    pub run_id: String,
    pub dry_run: bool,
    pub layout: String,
    pub provider: String,
    pub source_url: String,
    pub message: String,
    pub window: ExportWindow,
    pub summary: ExportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<ExportOutput>,
    pub direction_breakdown: Vec<DirectionCount>,
    pub source_breakdown: Vec<SourceCount>,
    pub date_range: DateRange,
    pub sample: Vec<SampleRow>,
    pub collisions: Vec<CollisionRow>,
    pub duplicates_preview: DuplicatesPreview,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportWindow {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub fetched: i64,
    pub in_scope: i64,
    pub api_records: i64,
    pub imported_records: i64,
    pub duplicates_removed: i64,
    pub api_collisions: i64,
    pub outside_window: i64,
    pub rows_written: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportOutput {
    pub path: String,
    pub file_name: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectionCount {
    pub direction: String,
    pub count: i64,
    pub explicit: i64,
    pub inferred: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub data_source: String,
    pub count: i64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
    pub occurred_on: String,
    pub direction: String,
    pub amount: String,
    pub counterparty: String,
    pub data_source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollisionRow {
    pub amount_minor: i64,
    pub occurred_on: String,
    pub counterparty: String,
    pub earlier_id: String,
    pub later_id: String,
    pub resolution: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateRow {
    pub source_row_index: i64,
    pub id: String,
    pub occurred_at: String,
    pub amount_minor: i64,
    pub counterparty: String,
    pub source_file: Option<String>,
    pub matched_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicatesPreview {
    pub returned: i64,
    pub truncated: bool,
    pub rows: Vec<DuplicateRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutsData {
    pub default_layout: String,
    pub layouts: Vec<LayoutInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub name: String,
    pub description: String,
    pub records: String,
    pub newest_first: bool,
    pub file_stem: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub config_path: String,
    pub config_loaded: bool,
    pub base_url: String,
    pub endpoint: String,
    pub provider: String,
    pub limit: u32,
    pub timeout_secs: u64,
    pub output_dir: String,
}
