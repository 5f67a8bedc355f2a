//! Exponential backoff with jitter for reconnect attempts.

use std::time::Duration;

use rand::Rng;

use crate::config::ReconnectConfig;

/// Delay before reconnect attempt number `attempt` (1-based).
pub fn reconnect_delay(attempt: u32, config: &ReconnectConfig) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = config
        .base_delay_ms
        .saturating_mul(factor)
        .min(config.max_delay_ms);

    // Up to 10% jitter so restarted gateways do not reconnect in lockstep.
    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
