//! Adaptive retry policy (§4.D). Given an error kind, response code,
//! attempt count and observed availability, decides whether to retry and
//! computes the delay. Ported from the original's `AdaptiveBackoffStrategy`
//! / `RetryManager` pair, kept as one policy object since both halves
//! share the same rolling success-rate window.

use crate::model::{Attempt, Availability, ErrorKind, Priority};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Attempt budget before a target is marked permanently failed.
pub const MAX_RETRIES: u32 = 10;

const SUCCESS_RATE_WINDOW: Duration = Duration::from_secs(300);
const RETENTION_WINDOW: Duration = Duration::from_secs(600);

fn base_multiplier(kind: ErrorKind) -> f64 {
    match kind {
        ErrorKind::RateLimit => 2.0,
        ErrorKind::AuthRequired => 1.5,
        ErrorKind::PermissionDenied => 1.0,
        ErrorKind::HeaderIssue => 0.5,
        ErrorKind::UnknownForbidden => 2.5,
        ErrorKind::AntiBot => 3.0,
        ErrorKind::AccountRestricted => 3.0,
        ErrorKind::IpBlocked => 4.0,
        _ => 1.0,
    }
}

fn clamp_bounds(kind: ErrorKind) -> (f64, f64) {
    let min = if kind == ErrorKind::HeaderIssue { 5.0 } else { 10.0 };
    let max = if matches!(kind, ErrorKind::AccountRestricted | ErrorKind::IpBlocked) { 1800.0 } else { 600.0 };
    (min, max)
}

/// Whether this error kind is ever retryable, independent of attempt count.
pub fn is_retryable_kind(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::RateLimit
            | ErrorKind::AuthRequired
            | ErrorKind::PermissionDenied
            | ErrorKind::HeaderIssue
            | ErrorKind::UnknownForbidden
            | ErrorKind::AntiBot
            | ErrorKind::ServerError
            | ErrorKind::Timeout
    )
}

/// Rolling window of recent attempts, used to compute a per-kind success
/// rate that modifies the backoff delay. Kept in memory only; the policy
/// accepts a cold window after a process restart.
#[derive(Default)]
pub struct SuccessRateTracker {
    history: VecDeque<(Instant, Attempt)>,
}

impl SuccessRateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: ErrorKind, success: bool) {
        let now = Instant::now();
        self.history.push_back((now, Attempt { kind, success }));
        self.trim(now);
    }

    fn trim(&mut self, now: Instant) {
        while let Some((t, _)) = self.history.front() {
            if now.duration_since(*t) > RETENTION_WINDOW {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Success rate for `kind` within the 5-minute decision window, or
    /// `None` if there is no data (policy applies no modifier in that case).
    pub fn recent_success_rate(&self, kind: ErrorKind) -> Option<f64> {
        let now = Instant::now();
        let relevant: Vec<&Attempt> = self
            .history
            .iter()
            .filter(|(t, a)| now.duration_since(*t) <= SUCCESS_RATE_WINDOW && a.kind == kind)
            .map(|(_, a)| a)
            .collect();

        if relevant.is_empty() {
            return None;
        }
        let successes = relevant.iter().filter(|a| a.success).count();
        Some(successes as f64 / relevant.len() as f64)
    }
}

fn success_rate_modifier(rate: Option<f64>) -> f64 {
    match rate {
        Some(r) if r < 0.3 => 2.0,
        Some(r) if r < 0.5 => 1.5,
        Some(r) if r > 0.8 => 0.8,
        _ => 1.0,
    }
}

pub struct RetryDecision {
    pub retry: bool,
    pub delay_secs: f64,
}

/// Adaptive retry/backoff policy.
pub struct RetryPolicy;

impl RetryPolicy {
    /// §4.D rules, first match wins.
    pub fn should_retry(attempt_count: u32, availability: Option<Availability>, kind: ErrorKind, priority: Priority) -> bool {
        if attempt_count >= MAX_RETRIES {
            return false;
        }
        if let Some(a) = availability {
            if a.is_permanent() {
                return false;
            }
            if a == Availability::Unavailable {
                return true;
            }
        }
        if matches!(kind, ErrorKind::AccountRestricted | ErrorKind::IpBlocked) && priority == Priority::Severe {
            return false;
        }
        is_retryable_kind(kind)
    }

    /// Computes the delay for a retryable decision. `rate_limit_reset_in`
    /// is the server-provided seconds-until-reset, when present.
    pub fn delay_seconds(
        kind: ErrorKind,
        attempt_count: u32,
        tracker: &SuccessRateTracker,
        rate_limit_reset_in: Option<i64>,
    ) -> f64 {
        let exponential = 2f64.powi(attempt_count as i32).min(8.0);
        let modifier = success_rate_modifier(tracker.recent_success_rate(kind));
        let base = base_multiplier(kind) * exponential * modifier * 30.0;

        let (min, max) = clamp_bounds(kind);
        let clamped = base.clamp(min, max);

        if kind == ErrorKind::RateLimit {
            if let Some(reset_in) = rate_limit_reset_in {
                let override_delay = (reset_in + 10).max(0) as f64;
                if override_delay > clamped {
                    return override_delay.clamp(60.0, 900.0);
                }
            }
        }

        clamped
    }

    pub fn decide(
        attempt_count: u32,
        availability: Option<Availability>,
        kind: ErrorKind,
        priority: Priority,
        tracker: &SuccessRateTracker,
        rate_limit_reset_in: Option<i64>,
    ) -> RetryDecision {
        let retry = Self::should_retry(attempt_count, availability, kind, priority);
        let delay_secs = if retry {
            Self::delay_seconds(kind, attempt_count, tracker, rate_limit_reset_in)
        } else {
            0.0
        };
        RetryDecision { retry, delay_secs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_ten_is_final_retry_boundary() {
        assert!(RetryPolicy::should_retry(9, None, ErrorKind::ServerError, Priority::Correctable));
        assert!(!RetryPolicy::should_retry(10, None, ErrorKind::ServerError, Priority::Correctable));
    }

    #[test]
    fn permanent_availability_blocks_retry_regardless_of_kind() {
        assert!(!RetryPolicy::should_retry(0, Some(Availability::NotFound), ErrorKind::ServerError, Priority::Correctable));
        assert!(!RetryPolicy::should_retry(0, Some(Availability::Suspended), ErrorKind::RateLimit, Priority::Correctable));
    }

    #[test]
    fn unavailable_always_retries() {
        assert!(RetryPolicy::should_retry(0, Some(Availability::Unavailable), ErrorKind::None, Priority::Correctable));
    }

    #[test]
    fn severe_account_restricted_or_ip_blocked_never_retries() {
        assert!(!RetryPolicy::should_retry(0, None, ErrorKind::AccountRestricted, Priority::Severe));
        assert!(!RetryPolicy::should_retry(0, None, ErrorKind::IpBlocked, Priority::Severe));
    }

    #[test]
    fn retryable_kinds_retry_by_default() {
        for kind in [
            ErrorKind::RateLimit,
            ErrorKind::AuthRequired,
            ErrorKind::PermissionDenied,
            ErrorKind::HeaderIssue,
            ErrorKind::UnknownForbidden,
            ErrorKind::AntiBot,
            ErrorKind::ServerError,
            ErrorKind::Timeout,
        ] {
            assert!(RetryPolicy::should_retry(0, None, kind, Priority::Correctable), "{:?} should retry", kind);
        }
    }

    #[test]
    fn non_retryable_kinds_never_retry() {
        for kind in [ErrorKind::NotFound, ErrorKind::FollowConflict, ErrorKind::AlreadyBlocked, ErrorKind::None] {
            assert!(!RetryPolicy::should_retry(0, None, kind, Priority::Correctable));
        }
    }

    #[test]
    fn delay_respects_min_and_max_clamps() {
        let tracker = SuccessRateTracker::new();
        let header_delay = RetryPolicy::delay_seconds(ErrorKind::HeaderIssue, 0, &tracker, None);
        assert!(header_delay >= 5.0);

        let ip_delay = RetryPolicy::delay_seconds(ErrorKind::IpBlocked, 10, &tracker, None);
        assert!(ip_delay <= 1800.0);
    }

    #[test]
    fn exponential_component_is_capped_at_eight() {
        let tracker = SuccessRateTracker::new();
        let at_cap = RetryPolicy::delay_seconds(ErrorKind::PermissionDenied, 3, &tracker, None);
        let beyond_cap = RetryPolicy::delay_seconds(ErrorKind::PermissionDenied, 9, &tracker, None);
        assert_eq!(at_cap, beyond_cap);
    }

    #[test]
    fn low_success_rate_doubles_delay() {
        let mut tracker = SuccessRateTracker::new();
        for _ in 0..8 {
            tracker.record(ErrorKind::ServerError, false);
        }
        tracker.record(ErrorKind::ServerError, true);

        let low_rate_delay = RetryPolicy::delay_seconds(ErrorKind::ServerError, 0, &tracker, None);

        let fresh = SuccessRateTracker::new();
        let neutral_delay = RetryPolicy::delay_seconds(ErrorKind::ServerError, 0, &fresh, None);

        assert!(low_rate_delay > neutral_delay);
    }

    #[test]
    fn rate_limit_reset_override_clamped_to_60_900() {
        let tracker = SuccessRateTracker::new();
        // Reset far in the past: override would be negative/small, clamp to 60.
        let delay = RetryPolicy::delay_seconds(ErrorKind::RateLimit, 0, &tracker, Some(-1000));
        assert_eq!(delay, 60.0);

        // Reset far in the future: override clamps to 900.
        let delay = RetryPolicy::delay_seconds(ErrorKind::RateLimit, 0, &tracker, Some(10_000));
        assert_eq!(delay, 900.0);
    }
}
