//! Interrupt poll interval policy.

/// Clamp an advertised `bInterval` to at least `min_interval`.
#[inline]
pub fn clamp_poll_interval(advertised: u8, min_interval: u8) -> u8 {
    advertised.max(min_interval)
}
