use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use serde_json::Value as JSValue;
use std::fs;
use text_diff::print_diff;

use roster_core::mapper::ColumnMapping;

use crate::roster::io_excel::Sheet;
use crate::roster::*;

/// Number of data rows shown by the preview.
pub const PREVIEW_ROWS: usize = 10;

fn mapping_js(pairs: &[(String, FieldId)]) -> Vec<JSValue> {
    pairs
        .iter()
        .map(|(header, field)| json!({"column": header, "field": field.name()}))
        .collect()
}

fn cell_js(cell: &Cell) -> JSValue {
    match cell {
        Cell::Empty => JSValue::Null,
        Cell::Text(s) => json!(s),
        Cell::Int(i) => json!(i),
        Cell::Float(f) => json!(f),
        Cell::Bool(b) => json!(b),
    }
}

pub fn build_summary_js(source: &str, summary: &ImportSummary) -> JSValue {
    let rejected: Vec<JSValue> = summary
        .rejected
        .iter()
        .map(|r| json!({"row": r.row, "reason": r.reason}))
        .collect();
    json!({
        "source": source,
        "totalRows": summary.total_rows,
        "added": summary.added,
        "skippedDuplicates": summary.skipped_duplicates.len(),
        "skippedIds": summary.skipped_duplicates,
        "rejected": rejected,
        "mapping": mapping_js(&summary.mapping),
    })
}

pub fn build_preview_js(sheet: &Sheet, mapping: &ColumnMapping) -> JSValue {
    let fallbacks: Vec<(String, FieldId)> = mapping
        .fallbacks()
        .iter()
        .map(|mc| (mc.header.clone(), mc.field))
        .collect();
    let sample: Vec<JSValue> = sheet
        .rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|(_, row)| JSValue::Array(row.iter().map(cell_js).collect()))
        .collect();
    json!({
        "columns": sheet.headers,
        "mapping": mapping_js(&mapping.pairs()),
        "fallbacks": mapping_js(&fallbacks),
        "hasIdentifier": mapping.has_identifier(),
        "sampleRows": sample,
        "totalRows": sheet.rows.len(),
    })
}

pub fn pretty<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).context(SerializingJsonSnafu {})
}

/// Prints to the standard output, or writes to `out` unless it is `stdout`.
pub fn write_output(content: &str, out: Option<&str>) -> AppResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", content);
            Ok(())
        }
        Some(path) => {
            info!("write_output: writing summary to {}", path);
            fs::write(path, content).context(WritingFileSnafu { path })
        }
    }
}

pub fn read_summary(path: &str) -> AppResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

/// Compares a summary with a reference file. Differences are printed and
/// reported as an error.
pub fn check_reference(pretty_js_summary: &str, reference_path: &str) -> AppResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref = pretty(&summary_ref)?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_summary, "\n");
        whatever!("Difference detected between the import summary and the reference summary")
    }
    Ok(())
}
