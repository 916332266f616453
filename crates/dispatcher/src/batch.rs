//! Batch buffer - ordered rendered rows plus the triggers that make them due

use std::collections::BTreeMap;

use contracts::{FlushPolicy, RenderedRow, SourcePosition};
use tokio::time::Instant;

/// Offsets held by the current batch, per partition (first, last)
///
/// Committed together once the batch is accepted downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetSpan {
    ranges: BTreeMap<i32, (i64, i64)>,
}

impl OffsetSpan {
    fn include(&mut self, position: SourcePosition) {
        self.ranges
            .entry(position.partition)
            .and_modify(|(first, last)| {
                *first = (*first).min(position.offset);
                *last = (*last).max(position.offset);
            })
            .or_insert((position.offset, position.offset));
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn partitions(&self) -> usize {
        self.ranges.len()
    }

    /// `(first, last)` offsets for `partition`
    pub fn range(&self, partition: i32) -> Option<(i64, i64)> {
        self.ranges.get(&partition).copied()
    }
}

impl std::fmt::Display for OffsetSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (partition, (from, to)) in &self.ranges {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{partition}:{from}..={to}")?;
            first = false;
        }
        Ok(())
    }
}

/// In-memory batch owned by the flush coordinator
///
/// Cleared, never dropped, and only after the downstream accepted it.
#[derive(Debug, Default)]
pub struct Batch {
    rows: Vec<RenderedRow>,
    created_at: Option<Instant>,
    span: OffsetSpan,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Add one row; the first row since the last clear starts the age clock
    pub fn append(&mut self, row: RenderedRow, position: Option<SourcePosition>, now: Instant) {
        if self.rows.is_empty() {
            self.created_at = Some(now);
        }
        if let Some(position) = position {
            self.span.include(position);
        }
        self.rows.push(row);
    }

    /// Size trigger or age trigger on a non-empty batch
    pub fn should_flush(&self, now: Instant, policy: &FlushPolicy) -> bool {
        let Some(created_at) = self.created_at else {
            return false;
        };
        if self.rows.is_empty() {
            return false;
        }
        self.is_full(policy) || now.saturating_duration_since(created_at) >= policy.min_flush_interval
    }

    /// Reached the row-count threshold
    pub fn is_full(&self, policy: &FlushPolicy) -> bool {
        self.rows.len() >= policy.max_batch_size
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.created_at = None;
        self.span = OffsetSpan::default();
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn created_at(&self) -> Option<Instant> {
        self.created_at
    }

    pub fn span(&self) -> &OffsetSpan {
        &self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn policy(max: usize) -> FlushPolicy {
        FlushPolicy::new(max, Duration::from_secs(60))
    }

    #[test]
    fn test_empty_batch_never_flushes() {
        let batch = Batch::new();
        let now = Instant::now();
        assert!(!batch.should_flush(now + Duration::from_secs(3600), &policy(1)));
    }

    #[test]
    fn test_size_trigger_at_exact_max() {
        let mut batch = Batch::new();
        let t0 = Instant::now();
        let policy = policy(3);

        batch.append("a".into(), None, t0);
        batch.append("b".into(), None, t0);
        assert!(!batch.should_flush(t0, &policy));

        batch.append("c".into(), None, t0);
        assert!(batch.should_flush(t0, &policy));
        assert!(batch.is_full(&policy));
    }

    #[test]
    fn test_time_trigger_boundary() {
        let mut batch = Batch::new();
        let t0 = Instant::now();
        let policy = policy(50_000);
        batch.append("only".into(), None, t0);

        assert!(!batch.should_flush(t0 + Duration::from_millis(59_999), &policy));
        assert!(batch.should_flush(t0 + Duration::from_secs(60), &policy));
    }

    #[test]
    fn test_created_at_is_first_append() {
        let mut batch = Batch::new();
        let t0 = Instant::now();
        batch.append("a".into(), None, t0);
        batch.append("b".into(), None, t0 + Duration::from_secs(30));
        assert_eq!(batch.created_at(), Some(t0));

        // age counts from the first row, not the latest
        assert!(batch.should_flush(t0 + Duration::from_secs(60), &policy(10)));
    }

    #[test]
    fn test_clear_resets_age_and_span() {
        let mut batch = Batch::new();
        let t0 = Instant::now();
        batch.append("a".into(), Some(SourcePosition::new(0, 7)), t0);
        batch.clear();

        assert!(batch.is_empty());
        assert_eq!(batch.created_at(), None);
        assert!(batch.span().is_empty());

        let t1 = t0 + Duration::from_secs(100);
        batch.append("b".into(), None, t1);
        assert_eq!(batch.created_at(), Some(t1));
        assert!(!batch.should_flush(t1 + Duration::from_secs(59), &policy(10)));
    }

    #[test]
    fn test_offset_span() {
        let mut batch = Batch::new();
        let now = Instant::now();
        for (p, o) in [(0, 5), (1, 2), (0, 6), (0, 4)] {
            batch.append("r".into(), Some(SourcePosition::new(p, o)), now);
        }
        assert_eq!(batch.span().range(0), Some((4, 6)));
        assert_eq!(batch.span().range(1), Some((2, 2)));
        assert_eq!(batch.span().partitions(), 2);
        assert_eq!(batch.span().to_string(), "0:4..=6,1:2..=2");
    }
}
