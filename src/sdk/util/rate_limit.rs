use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

pub type Limiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DIRECTIONS_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Client-side throttle for the directions endpoint.
pub fn directions_limiter() -> Limiter {
    Arc::new(RateLimiter::direct(Quota::per_second(DIRECTIONS_PER_SECOND)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_limiter_admits_a_request() {
        let limiter = directions_limiter();
        assert!(limiter.check().is_ok());
    }
}
