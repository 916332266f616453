//! Backoff state - when the next send may be attempted

use std::time::Duration;

use tokio::time::Instant;

/// Send gate set by failed attempts
///
/// Expired deadlines are equivalent to [`Backoff::Clear`]; evaluation never
/// needs to reset them explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// No restriction
    #[default]
    Clear,

    /// Downstream signalled overload; no send before `until`
    CoolingDown { until: Instant },

    /// Fixed delay after any other failure
    RetryDelay { until: Instant },
}

impl Backoff {
    /// Cooldown after an overload: the next flush slot after the last
    /// successful flush, or a full interval from now when that slot has
    /// already passed (or there was no flush yet).
    pub fn after_overload(last_flush: Option<Instant>, now: Instant, interval: Duration) -> Self {
        let until = match last_flush.map(|t| t + interval) {
            Some(slot) if slot > now => slot,
            _ => now + interval,
        };
        Self::CoolingDown { until }
    }

    pub fn after_failure(now: Instant, delay: Duration) -> Self {
        Self::RetryDelay {
            until: now + delay,
        }
    }

    /// Deadline still in force at `now`
    pub fn blocked_until(&self, now: Instant) -> Option<Instant> {
        match *self {
            Self::Clear => None,
            Self::CoolingDown { until } | Self::RetryDelay { until } => {
                (now < until).then_some(until)
            }
        }
    }

    /// Active overload cooldown deadline at `now`
    pub fn cooldown_until(&self, now: Instant) -> Option<Instant> {
        match *self {
            Self::CoolingDown { until } if now < until => Some(until),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_overload_uses_next_slot_after_last_flush() {
        let t0 = Instant::now();
        let now = t0 + Duration::from_secs(20);
        assert_eq!(
            Backoff::after_overload(Some(t0), now, MINUTE),
            Backoff::CoolingDown { until: t0 + MINUTE }
        );
    }

    #[test]
    fn test_overload_with_passed_slot_waits_full_interval() {
        let t0 = Instant::now();
        let now = t0 + Duration::from_secs(75);
        assert_eq!(
            Backoff::after_overload(Some(t0), now, MINUTE),
            Backoff::CoolingDown { until: now + MINUTE }
        );

        // slot exactly at now counts as passed
        let now = t0 + MINUTE;
        assert_eq!(
            Backoff::after_overload(Some(t0), now, MINUTE),
            Backoff::CoolingDown { until: now + MINUTE }
        );
    }

    #[test]
    fn test_overload_without_previous_flush() {
        let now = Instant::now();
        assert_eq!(
            Backoff::after_overload(None, now, MINUTE),
            Backoff::CoolingDown { until: now + MINUTE }
        );
    }

    #[test]
    fn test_deadlines_expire() {
        let now = Instant::now();
        let backoff = Backoff::after_failure(now, Duration::from_secs(5));

        assert_eq!(backoff.blocked_until(now), Some(now + Duration::from_secs(5)));
        assert_eq!(backoff.cooldown_until(now), None);
        assert_eq!(backoff.blocked_until(now + Duration::from_secs(5)), None);
        assert_eq!(Backoff::Clear.blocked_until(now), None);
    }
}
