use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

use crate::feed::layout::{Layout, row};
use crate::feed::normalize::NormalizedTransaction;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct WrittenFile {
    pub(crate) path: PathBuf,
    pub(crate) bytes: u64,
}

pub(crate) fn output_file_name(provider: &str, layout: Layout, now: NaiveDateTime) -> String {
    let provider_slug = provider
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect::<String>();
    let provider_slug = if provider_slug.is_empty() {
        "transactions".to_string()
    } else {
        provider_slug
    };

    format!(
        "{provider_slug}_{}_{}.csv",
        layout.file_stem(),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Rows are staged in a hidden sibling file and renamed into place, so a
/// failed write leaves nothing at `path`.
pub(crate) fn write_csv(
    path: &Path,
    layout: Layout,
    rows: &[NormalizedTransaction<'_>],
) -> ClientResult<WrittenFile> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|error| ClientError::output_write_failed(path, &error.to_string()))?;
    }

    let staging = staging_path(path);
    let staged = write_rows(&staging, path, layout, rows).and_then(|()| {
        fs::rename(&staging, path)
            .map_err(|error| ClientError::output_write_failed(path, &error.to_string()))
    });
    if let Err(error) = staged {
        let _ = fs::remove_file(&staging);
        return Err(error);
    }

    let bytes = fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|error| ClientError::output_write_failed(path, &error.to_string()))?;
    info!(
        path = %path.display(),
        rows = rows.len(),
        bytes,
        "wrote export file"
    );

    Ok(WrittenFile {
        path: path.to_path_buf(),
        bytes,
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

fn write_rows(
    staging: &Path,
    target: &Path,
    layout: Layout,
    rows: &[NormalizedTransaction<'_>],
) -> ClientResult<()> {
    let failed = |error: csv::Error| ClientError::output_write_failed(target, &error.to_string());
    let mut writer = csv::Writer::from_path(staging).map_err(failed)?;
    writer.write_record(layout.columns()).map_err(failed)?;
    for normalized in rows {
        writer.write_record(row(layout, normalized)).map_err(failed)?;
    }
    writer
        .flush()
        .map_err(|error| ClientError::output_write_failed(target, &error.to_string()))
}
