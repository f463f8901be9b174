//! Monotonic time source for the input pipeline.
//!
//! Sleeping goes through `embedded_hal_async::delay::DelayNs`; reading the
//! clock goes through [`Clock`]. On target both are backed by
//! `embassy-time`, in tests by a manual clock.

/// Monotonic microsecond clock.
///
/// The value is a wrapping 32-bit word (≈71 minutes per period), so
/// intervals must be computed with `wrapping_sub`. Reading it must be
/// safe from interrupt context.
pub trait Clock {
    fn now_us(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

/// Microseconds elapsed from `earlier` to `later`, tolerant of one wrap.
#[inline]
pub fn elapsed_us(earlier: u32, later: u32) -> u32 {
    later.wrapping_sub(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_handles_wraparound() {
        assert_eq!(elapsed_us(100, 350), 250);
        assert_eq!(elapsed_us(u32::MAX - 9, 10), 20);
    }
}
