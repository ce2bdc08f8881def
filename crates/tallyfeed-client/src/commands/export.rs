use std::path::Path;

use crate::ClientResult;
use crate::config::{SettingsOverrides, resolve_settings};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ExportData;
use crate::feed::dedupe::CollisionPolicy;
use crate::feed::layout::Layout;
use crate::feed::summary::{date_range, direction_breakdown, newest_sample, source_breakdown};
use crate::feed::{self, DateWindow, ExportRequest, build_duplicates_preview, collision_rows};

#[derive(Debug, Default)]
pub struct ExportRunOptions<'a> {
    pub layout: Option<String>,
    pub base_url: Option<String>,
    pub provider: Option<String>,
    pub limit: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub output_dir: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub keep_api_collisions: bool,
    pub dry_run: bool,
    pub home_override: Option<&'a Path>,
}

pub fn run(layout: Option<String>, dry_run: bool) -> ClientResult<SuccessEnvelope> {
    run_with_options(ExportRunOptions {
        layout,
        dry_run,
        ..ExportRunOptions::default()
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ExportRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let layout = options.layout.as_deref().map(Layout::parse).transpose()?;
    let window = DateWindow::parse(options.from.as_deref(), options.to.as_deref())?;
    let settings = resolve_settings(&SettingsOverrides {
        base_url: options.base_url,
        provider: options.provider,
        limit: options.limit,
        timeout_secs: options.timeout_secs,
        output_dir: options.output_dir,
        home_override: options.home_override,
    })?;
    let policy = if options.keep_api_collisions {
        CollisionPolicy::KeepDistinctIds
    } else {
        CollisionPolicy::LastWins
    };

    let request = ExportRequest {
        layout,
        policy,
        window,
        dry_run: options.dry_run,
    };
    let execution = feed::execute(&settings, &request)?;
    let rows = execution.normalized_rows();

    let data = ExportData {
        run_id: execution.run_id.clone(),
        dry_run: request.dry_run,
        layout: execution.layout.slug().to_string(),
        provider: settings.provider.clone(),
        source_url: execution.source_url.clone(),
        message: execution.message.clone(),
        window: execution.window.clone(),
        summary: execution.summary.clone(),
        output: execution.output.clone(),
        direction_breakdown: direction_breakdown(&rows),
        source_breakdown: source_breakdown(&rows),
        date_range: date_range(&rows),
        sample: newest_sample(&rows),
        collisions: collision_rows(&execution.plan.collisions),
        duplicates_preview: build_duplicates_preview(&execution.plan.duplicates),
    };
    success("export", data)
}
