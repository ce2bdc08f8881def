use std::io;

use serde_json::{Map, Value};

use super::format::{self, Align, Column};

pub fn render_export(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("export output requires summary"))?;
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut lines = vec![
        if dry_run {
            "Dry run completed. No file was written.".to_string()
        } else {
            "Export completed.".to_string()
        },
        String::new(),
        "Summary:".to_string(),
    ];

    let mut entries = vec![
        ("Run ID:", get_str(data, "run_id").to_string()),
        ("Layout:", get_str(data, "layout").to_string()),
        ("Provider:", get_str(data, "provider").to_string()),
        ("Fetched:", get_i64(summary, "fetched").to_string()),
        ("In scope:", get_i64(summary, "in_scope").to_string()),
        ("API records:", get_i64(summary, "api_records").to_string()),
        (
            "Imported records:",
            get_i64(summary, "imported_records").to_string(),
        ),
        (
            "Duplicates removed:",
            get_i64(summary, "duplicates_removed").to_string(),
        ),
    ];
    let outside_window = get_i64(summary, "outside_window");
    if outside_window > 0 {
        entries.push(("Outside window:", outside_window.to_string()));
    }
    entries.push(("Rows written:", get_i64(summary, "rows_written").to_string()));
    if let Some(output) = data.get("output").and_then(Value::as_object) {
        entries.push((
            "File:",
            output
                .get("path")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
        ));
        let bytes = output.get("bytes").and_then(Value::as_u64).unwrap_or(0);
        entries.push(("File size:", format!("{:.2} KB", bytes as f64 / 1024.0)));
    }
    lines.extend(format::key_value_rows(&entries, 2));

    lines.push(String::new());
    lines.push("Date range:".to_string());
    let range = data.get("date_range").cloned().unwrap_or(Value::Null);
    lines.extend(format::key_value_rows(
        &[
            ("Earliest:", range_value(&range, "earliest")),
            ("Latest:", range_value(&range, "latest")),
        ],
        2,
    ));

    lines.push(String::new());
    lines.extend(render_direction_breakdown(data));
    lines.push(String::new());
    lines.extend(render_source_breakdown(data));

    let collisions = render_collisions(data);
    if !collisions.is_empty() {
        lines.push(String::new());
        lines.extend(collisions);
    }

    let duplicates = render_duplicates_preview(data);
    if !duplicates.is_empty() {
        lines.push(String::new());
        lines.extend(duplicates);
    }

    lines.push(String::new());
    lines.extend(render_sample(data));

    Ok(lines.join("\n"))
}

fn render_direction_breakdown(data: &Value) -> Vec<String> {
    let rows = array(data, "direction_breakdown")
        .iter()
        .map(|entry| {
            vec![
                get_str(entry, "direction").to_string(),
                value_i64(entry, "count").to_string(),
                value_i64(entry, "explicit").to_string(),
                value_i64(entry, "inferred").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Direction breakdown:".to_string()];
    if rows.is_empty() {
        lines.push("  No rows.".to_string());
        return lines;
    }
    let columns = [
        Column {
            name: "Direction",
            align: Align::Left,
        },
        Column {
            name: "Count",
            align: Align::Right,
        },
        Column {
            name: "Explicit",
            align: Align::Right,
        },
        Column {
            name: "Inferred",
            align: Align::Right,
        },
    ];
    lines.extend(format::render_table(&columns, &rows));
    lines
}

fn render_source_breakdown(data: &Value) -> Vec<String> {
    let entries = array(data, "source_breakdown")
        .iter()
        .map(|entry| {
            let percent = entry.get("percent").and_then(Value::as_f64).unwrap_or(0.0);
            (
                get_str(entry, "data_source"),
                format!("{} ({percent:.1}%)", value_i64(entry, "count")),
            )
        })
        .collect::<Vec<(&str, String)>>();

    let mut lines = vec!["Data sources:".to_string()];
    lines.extend(format::key_value_rows(&entries, 2));
    lines
}

fn render_collisions(data: &Value) -> Vec<String> {
    let collisions = array(data, "collisions");
    if collisions.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "API records sharing a dedupe key ({}):",
        collisions.len()
    )];
    let rows = collisions
        .iter()
        .map(|entry| {
            vec![
                get_str(entry, "occurred_on").to_string(),
                value_i64(entry, "amount_minor").to_string(),
                get_str(entry, "counterparty").to_string(),
                get_str(entry, "earlier_id").to_string(),
                get_str(entry, "later_id").to_string(),
                get_str(entry, "resolution").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    let columns = [
        Column {
            name: "Date",
            align: Align::Left,
        },
        Column {
            name: "Minor",
            align: Align::Right,
        },
        Column {
            name: "Counterparty",
            align: Align::Left,
        },
        Column {
            name: "Earlier",
            align: Align::Left,
        },
        Column {
            name: "Later",
            align: Align::Left,
        },
        Column {
            name: "Resolution",
            align: Align::Left,
        },
    ];
    lines.extend(format::render_table(&columns, &rows));
    lines
}

fn render_duplicates_preview(data: &Value) -> Vec<String> {
    let preview = data
        .get("duplicates_preview")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let rows = preview
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if rows.is_empty() {
        return Vec::new();
    }

    let truncated = preview
        .get("truncated")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut lines = vec![if truncated {
        format!("Removed duplicates (first {}):", rows.len())
    } else {
        "Removed duplicates:".to_string()
    }];
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                value_i64(row, "source_row_index").to_string(),
                get_str(row, "occurred_at").to_string(),
                value_i64(row, "amount_minor").to_string(),
                get_str(row, "counterparty").to_string(),
                get_str(row, "matched_id").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    let columns = [
        Column {
            name: "Row",
            align: Align::Right,
        },
        Column {
            name: "Occurred at",
            align: Align::Left,
        },
        Column {
            name: "Minor",
            align: Align::Right,
        },
        Column {
            name: "Counterparty",
            align: Align::Left,
        },
        Column {
            name: "Matched",
            align: Align::Left,
        },
    ];
    lines.extend(format::render_table(&columns, &table_rows));
    lines
}

fn render_sample(data: &Value) -> Vec<String> {
    let sample = array(data, "sample");
    let mut lines = vec!["Most recent rows:".to_string()];
    if sample.is_empty() {
        lines.push("  No rows.".to_string());
        return lines;
    }

    let rows = sample
        .iter()
        .map(|row| {
            vec![
                get_str(row, "occurred_on").to_string(),
                get_str(row, "direction").to_string(),
                get_str(row, "amount").to_string(),
                get_str(row, "counterparty").to_string(),
                get_str(row, "data_source").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    let columns = [
        Column {
            name: "Date",
            align: Align::Left,
        },
        Column {
            name: "Dir",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Counterparty",
            align: Align::Left,
        },
        Column {
            name: "Source",
            align: Align::Left,
        },
    ];
    lines.extend(format::render_table(&columns, &rows));
    lines
}

pub fn render_layouts(data: &Value) -> io::Result<String> {
    let layouts = data
        .get("layouts")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("layouts output requires layouts"))?;
    let default_layout = get_str(data, "default_layout");

    let mut lines = vec!["Available layouts:".to_string(), String::new()];
    let rows = layouts
        .iter()
        .map(|layout| {
            let name = get_str(layout, "name");
            let marker = if name == default_layout { " *" } else { "" };
            vec![
                format!("{name}{marker}"),
                layout
                    .get("columns")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len)
                    .to_string(),
                get_str(layout, "description").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    let columns = [
        Column {
            name: "Layout",
            align: Align::Left,
        },
        Column {
            name: "Columns",
            align: Align::Right,
        },
        Column {
            name: "Description",
            align: Align::Left,
        },
    ];
    lines.extend(format::render_table(&columns, &rows));
    lines.push(String::new());
    lines.push("* default. Run `tallyfeed layouts --json` for full column lists.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_config(data: &Value) -> io::Result<String> {
    let loaded = data
        .get("config_loaded")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let config_file = if loaded {
        get_str(data, "config_path").to_string()
    } else {
        format!("{} (not found)", get_str(data, "config_path"))
    };

    let mut lines = vec!["Resolved configuration:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            ("Config file:", config_file),
            ("Endpoint:", get_str(data, "endpoint").to_string()),
            ("Provider:", get_str(data, "provider").to_string()),
            ("Limit:", value_i64(data, "limit").to_string()),
            ("Timeout:", format!("{}s", value_i64(data, "timeout_secs"))),
            ("Output dir:", get_str(data, "output_dir").to_string()),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn range_value(range: &Value, key: &str) -> String {
    range
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("n/a")
        .to_string()
}

fn get_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn value_i64(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn get_i64(map: &Map<String, Value>, key: &str) -> i64 {
    map.get(key).and_then(Value::as_i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_config, render_export, render_layouts};

    fn export_payload(dry_run: bool) -> serde_json::Value {
        let output = if dry_run {
            serde_json::Value::Null
        } else {
            json!({
                "path": "/tmp/out/starling_deduplicated_final_20240105_100000.csv",
                "file_name": "starling_deduplicated_final_20240105_100000.csv",
                "bytes": 2048
            })
        };
        json!({
            "run_id": "run_01J0000000000000000000000",
            "dry_run": dry_run,
            "layout": "deduplicated",
            "provider": "Starling",
            "summary": {
                "fetched": 5,
                "in_scope": 4,
                "api_records": 2,
                "imported_records": 2,
                "duplicates_removed": 1,
                "api_collisions": 1,
                "outside_window": 0,
                "rows_written": 3
            },
            "output": output,
            "date_range": {"earliest": "2024-01-05", "latest": "2024-02-10"},
            "direction_breakdown": [
                {"direction": "IN", "count": 1, "explicit": 0, "inferred": 1},
                {"direction": "OUT", "count": 2, "explicit": 1, "inferred": 1}
            ],
            "source_breakdown": [
                {"data_source": "api", "count": 2, "percent": 66.7},
                {"data_source": "csv_import", "count": 1, "percent": 33.3}
            ],
            "collisions": [{
                "amount_minor": 1000,
                "occurred_on": "2024-01-05",
                "counterparty": "JANE",
                "earlier_id": "a1",
                "later_id": "a2",
                "resolution": "replaced"
            }],
            "duplicates_preview": {
                "returned": 1,
                "truncated": false,
                "rows": [{
                    "source_row_index": 2,
                    "id": "c1",
                    "occurred_at": "2024-01-05T00:00:00Z",
                    "amount_minor": -500,
                    "counterparty": "acme ltd",
                    "source_file": null,
                    "matched_id": "a1"
                }]
            },
            "sample": [{
                "occurred_on": "2024-02-10",
                "direction": "IN",
                "amount": "25.00",
                "counterparty": "Jane Doe",
                "data_source": "api"
            }]
        })
    }

    #[test]
    fn export_text_covers_every_section() {
        let rendered = render_export(&export_payload(false));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Export completed."));
            assert!(text.contains("Rows written:"));
            assert!(text.contains("File size:           2.00 KB"));
            assert!(text.contains("Earliest:  2024-01-05"));
            assert!(text.contains("Direction breakdown:"));
            assert!(text.contains("api         2 (66.7%)"));
            assert!(text.contains("API records sharing a dedupe key (1):"));
            assert!(text.contains("Removed duplicates:"));
            assert!(text.contains("Most recent rows:"));
            assert!(text.contains("Jane Doe"));
        }
    }

    #[test]
    fn dry_run_text_omits_file_lines() {
        let rendered = render_export(&export_payload(true));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Dry run completed."));
            assert!(!text.contains("File size:"));
        }
    }

    #[test]
    fn export_text_requires_summary() {
        assert!(render_export(&json!({})).is_err());
    }

    #[test]
    fn layouts_text_marks_default() {
        let rendered = render_layouts(&json!({
            "default_layout": "deduplicated",
            "layouts": [
                {"name": "all", "description": "Every record", "columns": ["id", "provider"]},
                {"name": "deduplicated", "description": "Restatements removed", "columns": ["direction"]}
            ]
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("deduplicated *"));
            assert!(text.contains("Every record"));
        }
    }

    #[test]
    fn config_text_flags_missing_file() {
        let rendered = render_config(&json!({
            "config_path": "/home/me/.tallyfeed/config.json",
            "config_loaded": false,
            "endpoint": "https://ledger.example.com/api/transactions",
            "provider": "Starling",
            "limit": 10000,
            "timeout_secs": 30,
            "output_dir": "."
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("config.json (not found)"));
            assert!(text.contains("Timeout:      30s"));
        }
    }
}
