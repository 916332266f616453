//! Record Transformer
//!
//! Pure functions turning a decoded [`HttpLogRecord`] into the single-line
//! JSON row the bulk-insert endpoint expects (`JSONEachRow`).

use contracts::{HttpLogRecord, RenderedRow};
use serde::Serialize;

use crate::error::{IngestionError, Result};

/// Placeholder written over the last IPv4 octet
const MASKED_OCTET: &str = "X";

/// Row layout; field order is the column order of the insert
#[derive(Serialize)]
struct RowView<'a> {
    timestamp: u64,
    resource_id: u64,
    bytes_sent: u64,
    request_time_milli: u64,
    response_status: u16,
    cache_status: &'a str,
    method: &'a str,
    remote_addr: &'a str,
    url: &'a str,
}

/// Replace everything after the last `.` with `X`
///
/// Strings without a dot are returned unchanged.
///
/// ```
/// assert_eq!(ingestion::anonymize_ip("1.2.3.4"), "1.2.3.X");
/// assert_eq!(ingestion::anonymize_ip("not-an-ip"), "not-an-ip");
/// ```
pub fn anonymize_ip(addr: &str) -> String {
    match addr.rfind('.') {
        Some(dot) => format!("{}.{MASKED_OCTET}", &addr[..dot]),
        None => addr.to_string(),
    }
}

/// Escape `s` for use inside a JSON string literal, without the quotes
///
/// Quote and backslash are escaped, control characters use their short
/// form (`\n`, `\t`, `\r`, `\b`, `\f`) or `\u00XX`.
pub fn escape_json(s: &str) -> String {
    let quoted = serde_json::Value::from(s).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Render one record as a JSON object on a single line
///
/// `timestamp` is truncated to epoch seconds and `remote_addr` is
/// anonymized.
pub fn render_row(record: &HttpLogRecord) -> Result<RenderedRow> {
    let remote_addr = anonymize_ip(&record.remote_addr);
    let view = RowView {
        timestamp: record.timestamp_epoch_milli / 1000,
        resource_id: record.resource_id,
        bytes_sent: record.bytes_sent,
        request_time_milli: record.request_time_milli,
        response_status: record.response_status,
        cache_status: &record.cache_status,
        method: &record.method,
        remote_addr: &remote_addr,
        url: &record.url,
    };

    serde_json::to_string(&view).map_err(|e| IngestionError::Render {
        message: e.to_string(),
    })
}

/// Build a request body: every row followed by a newline
pub fn join_rows(rows: &[RenderedRow]) -> String {
    let mut body = String::with_capacity(rows.iter().map(|r| r.len() + 1).sum());
    for row in rows {
        body.push_str(row);
        body.push('\n');
    }
    body
}
