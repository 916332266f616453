//! ClickHouseSink - HTTP bulk insert, one POST per batch
//!
//! The insert statement lives in the URL query string
//! (`INSERT INTO ... FORMAT JSONEachRow`); the body is newline-delimited rows.

use contracts::{BulkSink, RenderedRow, SendError, SinkConfig};
use ingestion::join_rows;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, instrument};

/// Longest response body kept in an error
const MAX_ERROR_BODY: usize = 1024;

/// Only 503 means "slow down": the batch waits for the next flush window.
/// Every other non-2xx status takes the fixed retry delay.
fn is_overload_status(status: StatusCode) -> bool {
    status == StatusCode::SERVICE_UNAVAILABLE
}

/// HTTP bulk-insert sink
pub struct ClickHouseSink {
    name: String,
    url: String,
    client: Client,
}

impl ClickHouseSink {
    /// Build the HTTP client with the configured timeouts
    ///
    /// # Errors
    /// TLS backend or client builder failure.
    pub fn new(name: impl Into<String>, config: &SinkConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .use_rustls_tls()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            name: name.into(),
            url: config.url.clone(),
            client,
        })
    }
}

impl BulkSink for ClickHouseSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "clickhouse_sink_send",
        skip(self, rows),
        fields(sink = %self.name, rows = rows.len())
    )]
    async fn send(&mut self, rows: &[RenderedRow]) -> Result<(), SendError> {
        let body = join_rows(rows);
        let bytes = body.len();

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(sink = %self.name, status = status.as_u16(), bytes, "Insert accepted");
            return Ok(());
        }

        let mut body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        let body = body.trim().to_string();

        if is_overload_status(status) {
            Err(SendError::Overload {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
