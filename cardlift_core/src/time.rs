// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time and timebase conversion.
//!
//! [`HostTime`] represents a point in time as platform-native monotonic ticks
//! (e.g. `mach_absolute_time` on macOS, `QueryPerformanceCounter` on
//! Windows). [`Timebase`] carries the rational conversion factor from ticks
//! to nanoseconds, matching the `mach_timebase_info` pattern. [`Duration`]
//! is a span in the same tick units as [`HostTime`].
//!
//! Spring profiles are specified in seconds, so durations additionally
//! convert to and from `f64` seconds. All integer arithmetic uses `u128`
//! intermediates to avoid overflow.

use core::fmt;
use core::ops::{Add, Sub};

/// A point in time expressed as platform-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Duration) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
///
/// The correct instance for a given platform comes from the host's tick
/// source; tests and the harness use [`Timebase::NANOS`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in platform-native ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Creates a duration from a (non-negative, finite) second value.
    ///
    /// Negative or non-finite inputs clamp to zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is clamped non-negative before the cast"
    )]
    pub fn from_secs_f64(secs: f64, timebase: Timebase) -> Self {
        if !(secs > 0.0) {
            return Self::ZERO;
        }
        let nanos = (secs * 1e9) as u64;
        Self(timebase.nanos_to_ticks(nanos))
    }

    /// Converts this duration to `f64` seconds.
    #[inline]
    #[must_use]
    pub fn to_secs_f64(self, timebase: Timebase) -> f64 {
        timebase.ticks_to_nanos(self.0) as f64 * 1e-9
    }

    /// Scales this duration by a non-negative factor.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "f64 mantissa covers any realistic animation tick count"
    )]
    pub fn mul_f64(self, factor: f64) -> Self {
        if !(factor > 0.0) {
            return Self::ZERO;
        }
        Self((self.0 as f64 * factor) as u64)
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_round_trip_identity_timebase() {
        let tb = Timebase::NANOS;
        assert_eq!(tb.ticks_to_nanos(1_000_000_000), 1_000_000_000);
        assert_eq!(tb.nanos_to_ticks(1_000_000_000), 1_000_000_000);
    }

    #[test]
    fn secs_round_trip() {
        let tb = Timebase::NANOS;
        let d = Duration::from_secs_f64(0.75, tb);
        assert_eq!(d.ticks(), 750_000_000);
        assert!((d.to_secs_f64(tb) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn secs_conversion_macos_style() {
        // Typical ARM Mac: 125/3 (ticks run at 24 MHz).
        let tb = Timebase::new(125, 3);
        let d = Duration::from_secs_f64(1.0, tb);
        assert_eq!(d.ticks(), 24_000_000, "24 MHz ticks in 1s");
    }

    #[test]
    fn negative_and_nan_secs_clamp_to_zero() {
        let tb = Timebase::NANOS;
        assert_eq!(Duration::from_secs_f64(-0.5, tb), Duration::ZERO);
        assert_eq!(Duration::from_secs_f64(f64::NAN, tb), Duration::ZERO);
    }

    #[test]
    fn mul_f64_scales() {
        let d = Duration(1_000);
        assert_eq!(d.mul_f64(0.6), Duration(600));
        assert_eq!(d.mul_f64(0.0), Duration::ZERO);
    }

    #[test]
    fn host_time_duration_ops() {
        let t = HostTime(1000);
        let d = Duration(200);
        assert_eq!((t + d).ticks(), 1200);
        assert_eq!((t - d).ticks(), 800);
        assert_eq!(t.saturating_duration_since(HostTime(1500)), Duration::ZERO);
        assert_eq!(t.saturating_duration_since(HostTime(400)), Duration(600));
    }
}
