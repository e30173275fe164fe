//! Inbound message rate limiting

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Max inbound messages per second on one connection
pub const INPUT_RATE_LIMIT: u32 = 120;

/// Per-connection limiter for inbound text frames
pub struct SessionRateLimiter {
    limiter: Limiter,
}

impl SessionRateLimiter {
    pub fn new() -> Self {
        Self::per_second(INPUT_RATE_LIMIT)
    }

    pub fn per_second(messages: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(messages).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Whether one more message fits in the current window
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for SessionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_beyond_quota_is_rejected() {
        let limiter = SessionRateLimiter::per_second(3);
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn zero_quota_still_admits_one() {
        let limiter = SessionRateLimiter::per_second(0);
        assert!(limiter.check());
    }
}
