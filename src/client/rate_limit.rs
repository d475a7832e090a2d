//! Per-endpoint-family request pacing.
//!
//! Discord rate limits are tracked per route bucket. The client keeps one
//! pacing bucket per logical endpoint family: before dispatching, a caller
//! reserves the next permissible slot (at least the family's minimum gap
//! after the previous dispatch) and sleeps until it; after each response the
//! `X-RateLimit-Remaining` / `X-RateLimit-Reset-After` / `Retry-After`
//! headers push the next slot further out. Bookkeeping is local to one client
//! instance; a single writer per tenant is assumed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Logical endpoint family sharing one pacing bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointFamily {
    /// Role add/remove on a member (mutating).
    RoleModify,
    /// Member PATCH: bulk role replace, nickname (mutating).
    MemberModify,
    /// Auto-join PUT (mutating).
    GuildMemberAdd,
    /// Guild metadata reads.
    GuildInfo,
    /// Single-member reads.
    MemberGet,
    /// Guild role list reads.
    RolesGet,
    /// Bot identity reads.
    BotUser,
}

impl EndpointFamily {
    /// Whether requests in this family mutate guild state.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::RoleModify | Self::MemberModify | Self::GuildMemberAdd
        )
    }

    /// Minimum gap between consecutive dispatches in this family.
    ///
    /// Mutating endpoints are held to at least one second; reads get a small
    /// gap that smooths bursts without throttling member enumeration.
    pub fn min_gap(self) -> Duration {
        if self.is_mutating() {
            Duration::from_secs(1)
        } else {
            Duration::from_millis(100)
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Bucket {
    next_allowed: Instant,
}

/// Pacing state for one Discord client instance.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<EndpointFamily, Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Reserves the next dispatch slot for the family and sleeps until it.
    ///
    /// Concurrent callers on the same family queue behind each other: each
    /// reservation pushes the bucket's next slot out by the minimum gap, so
    /// dispatches are separated by at least that gap regardless of how many
    /// tasks race on the family.
    pub async fn acquire(&self, family: EndpointFamily) {
        let slot = {
            let mut buckets = self.buckets.lock().expect("rate limiter lock poisoned");
            let now = Instant::now();

            let bucket = buckets.entry(family).or_insert(Bucket { next_allowed: now });
            let slot = bucket.next_allowed.max(now);
            bucket.next_allowed = slot + family.min_gap();

            slot
        };

        tokio::time::sleep_until(slot).await;
    }

    /// Applies rate-limit header feedback from a completed response.
    ///
    /// A `Retry-After` value (sent with 429s) always defers the next slot by
    /// exactly that many seconds. Otherwise, an exhausted bucket
    /// (`X-RateLimit-Remaining: 0`) defers by `X-RateLimit-Reset-After`.
    pub fn record_headers(
        &self,
        family: EndpointFamily,
        remaining: Option<u64>,
        reset_after: Option<f64>,
        retry_after: Option<f64>,
    ) {
        let defer = if let Some(seconds) = retry_after {
            Some(seconds)
        } else if remaining == Some(0) {
            reset_after
        } else {
            None
        };

        let Some(seconds) = defer else {
            return;
        };
        if !(seconds.is_finite() && seconds > 0.0) {
            return;
        }

        let mut buckets = self.buckets.lock().expect("rate limiter lock poisoned");
        let now = Instant::now();
        let deferred = now + Duration::from_secs_f64(seconds);

        let bucket = buckets.entry(family).or_insert(Bucket { next_allowed: now });
        if deferred > bucket.next_allowed {
            bucket.next_allowed = deferred;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expect consecutive mutating dispatches to be separated by the minimum gap
    #[tokio::test(start_paused = true)]
    async fn separates_mutating_calls_by_min_gap() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        limiter.acquire(EndpointFamily::RoleModify).await;
        limiter.acquire(EndpointFamily::RoleModify).await;
        limiter.acquire(EndpointFamily::RoleModify).await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    /// Expect distinct families to pace independently
    #[tokio::test(start_paused = true)]
    async fn families_do_not_share_buckets() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        limiter.acquire(EndpointFamily::RoleModify).await;
        limiter.acquire(EndpointFamily::MemberGet).await;

        // The member read did not wait on the role bucket's one-second gap.
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    /// Expect a Retry-After header to defer the next dispatch by that amount
    #[tokio::test(start_paused = true)]
    async fn honors_retry_after() {
        let limiter = RateLimiter::new();

        limiter.acquire(EndpointFamily::MemberGet).await;
        limiter.record_headers(EndpointFamily::MemberGet, None, None, Some(5.0));

        let start = Instant::now();
        limiter.acquire(EndpointFamily::MemberGet).await;

        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    /// Expect an exhausted bucket to defer by X-RateLimit-Reset-After
    #[tokio::test(start_paused = true)]
    async fn honors_exhausted_bucket_reset() {
        let limiter = RateLimiter::new();

        limiter.acquire(EndpointFamily::RolesGet).await;
        limiter.record_headers(EndpointFamily::RolesGet, Some(0), Some(2.0), None);

        let start = Instant::now();
        limiter.acquire(EndpointFamily::RolesGet).await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    /// Expect a healthy bucket (remaining > 0) to leave pacing unchanged
    #[tokio::test(start_paused = true)]
    async fn ignores_reset_when_requests_remain() {
        let limiter = RateLimiter::new();

        limiter.acquire(EndpointFamily::MemberGet).await;
        limiter.record_headers(EndpointFamily::MemberGet, Some(4), Some(30.0), None);

        let start = Instant::now();
        limiter.acquire(EndpointFamily::MemberGet).await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
