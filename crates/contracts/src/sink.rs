//! BulkSink trait - output side of the forwarder

use crate::{RenderedRow, SendError};

/// Downstream bulk-insert endpoint
///
/// One call is one all-or-nothing insert attempt: either every row is
/// accepted or none is. Partial acceptance must be reported as a failure.
#[trait_variant::make(BulkSink: Send)]
pub trait LocalBulkSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one batch of rendered rows
    ///
    /// # Errors
    /// [`SendError::Overload`] when the downstream asks the sender to slow
    /// down, any other variant for everything else.
    async fn send(&mut self, rows: &[RenderedRow]) -> Result<(), SendError>;
}
