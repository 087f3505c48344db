//! CSV export of participations.
//!
//! The header is seven fixed columns followed by every `form_data` key seen
//! across the rows, in first-seen order. Cells are quoted per RFC 4180 when
//! they contain a comma, a double quote or a line break.

use std::borrow::Cow;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

use crate::store::Participation;

pub const FIXED_COLUMNS: [&str; 7] =
    ["Date", "Email", "IP", "User Agent", "UTM Source", "UTM Medium", "UTM Campaign"];

const LINE_END: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    /// Header first, then one record per participation. Each ends in CRLF.
    pub records: Vec<String>,
    /// Data rows, excluding the header.
    pub rows: usize,
}

impl CsvExport {
    /// The whole document.
    #[must_use]
    pub fn body(&self) -> String {
        self.records.concat()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("nothing to export")]
    NothingToExport,
}

impl crate::error::ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NothingToExport => "E_NOTHING_TO_EXPORT",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::NOT_FOUND
    }
}

/// Export rows as CSV, dated today (UTC).
///
/// # Errors
///
/// Returns `ExportError::NothingToExport` when `rows` is empty.
pub fn export_csv(rows: &[Participation], campaign_label: &str) -> Result<CsvExport, ExportError> {
    build_csv(rows, campaign_label, OffsetDateTime::now_utc().date())
}

pub(crate) fn build_csv(rows: &[Participation], campaign_label: &str, today: Date) -> Result<CsvExport, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let dynamic = dynamic_columns(rows);
    let mut records = Vec::with_capacity(rows.len() + 1);

    let header = FIXED_COLUMNS.iter().copied().chain(dynamic.iter().map(String::as_str));
    records.push(record(header.map(Cow::Borrowed)));

    for row in rows {
        let fixed = [
            format_date(row.created_at),
            row.user_email.clone().unwrap_or_default(),
            row.ip_address.clone().unwrap_or_default(),
            row.user_agent.clone().unwrap_or_default(),
            row.utm_source.clone().unwrap_or_default(),
            row.utm_medium.clone().unwrap_or_default(),
            row.utm_campaign.clone().unwrap_or_default(),
        ];
        let form = dynamic.iter().map(|key| row.form_data.get(key).map(cell_text).unwrap_or_default());
        records.push(record(fixed.into_iter().chain(form).map(Cow::Owned)));
    }

    Ok(CsvExport { filename: filename(campaign_label, today), records, rows: rows.len() })
}

/// Union of `form_data` keys in the order they first appear.
fn dynamic_columns(rows: &[Participation]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in rows.iter().flat_map(|row| row.form_data.keys()) {
        if !columns.iter().any(|c| c == key) {
            columns.push(key.clone());
        }
    }
    columns
}

fn record<'a>(fields: impl Iterator<Item = Cow<'a, str>>) -> String {
    let mut out = String::new();
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(&field));
    }
    out.push_str(LINE_END);
    out
}

pub(crate) fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_date(created_at_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(created_at_ms) * 1_000_000)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| created_at_ms.to_string())
}

fn filename(label: &str, today: Date) -> String {
    format!(
        "participations-{}-{:04}-{:02}-{:02}.csv",
        slug(label),
        today.year(),
        u8::from(today.month()),
        today.day()
    )
}

/// Lowercase ASCII slug. Runs of anything else collapse to one `-`.
pub(crate) fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() { "campaign".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
