// Copyright 2026 the Cardlift Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spring timing: travel-derived profiles and the unit progress curve.
//!
//! A [`SpringProfile`] is the (damping ratio, duration) pair derived from how
//! far the card has to travel: cards near their resting position feel
//! snappier (less bounce, shorter travel), cards further away get visible
//! overshoot and more time. [`SpringTiming`] evaluates the damped harmonic
//! oscillator in closed form, producing a unit progress curve the timeline
//! samples at arbitrary times:
//!
//! - damping ratio < 1 (underdamped): oscillates past the target before
//!   settling — progress briefly exceeds 1.
//! - damping ratio = 1 (critically damped): fastest convergence, no
//!   overshoot.
//!
//! The angular frequency is chosen so the decay envelope reaches a settle
//! threshold exactly at the requested duration, which is what lets a spring
//! be specified by (damping, duration) instead of (stiffness, mass).

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::timeline::Curve;

/// Residual envelope amplitude treated as settled.
const SETTLE_EPS: f64 = 1e-3;

/// Spread between the snappiest (1.0) and bounciest (0.7) damping ratio.
const DAMPING_INTERVAL: f64 = 0.3;

/// Shortest presentation spring, in seconds (no travel).
const BASELINE_DURATION: f64 = 0.5;

/// Longest presentation spring, in seconds (full-screen travel).
const MAX_DURATION: f64 = 0.9;

/// Damping and duration for one transition, derived once at driver
/// construction and immutable thereafter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringProfile {
    /// Damping ratio in `[0.7, 1.0]`.
    pub damping: f64,
    /// Spring duration in seconds, in `[0.5, 0.9]` for presentation.
    pub duration: f64,
    /// Initial velocity in unit-progress per second.
    pub initial_velocity: f64,
}

impl SpringProfile {
    /// Derives the presentation profile from the card's vertical travel.
    ///
    /// `start_y` is the rendered frame's top edge in screen coordinates;
    /// `source_height` the card's height; `screen_height` the screen extent.
    /// Damping falls linearly from 1.0 and duration grows linearly from
    /// 0.5 s as the travel distance grows relative to the relevant extent.
    #[must_use]
    pub fn compute(start_y: f64, source_height: f64, screen_height: f64) -> Self {
        let distance = start_y.abs();
        // Cards scrolled above the screen bounce relative to their own
        // height; cards below relative to the screen.
        let extent = if start_y < 0.0 {
            source_height
        } else {
            screen_height
        };
        let damping = 1.0 - DAMPING_INTERVAL * ratio(distance, extent);
        let duration =
            BASELINE_DURATION + (MAX_DURATION - BASELINE_DURATION) * ratio(distance, screen_height);
        Self {
            damping,
            duration,
            initial_velocity: 0.0,
        }
    }

    /// Fixed soft profile for the collapse: the dismiss motion is shorter
    /// and less dramatic, so it uses a constant 0.9 damping ratio and no
    /// initial velocity.
    #[must_use]
    pub const fn dismissal(duration: f64) -> Self {
        Self {
            damping: 0.9,
            duration,
            initial_velocity: 0.0,
        }
    }

    /// The timeline curve for this profile.
    #[must_use]
    pub const fn curve(&self) -> Curve {
        Curve::Spring(SpringTiming {
            damping_ratio: self.damping,
            initial_velocity: self.initial_velocity,
        })
    }
}

fn ratio(distance: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    (distance / extent).clamp(0.0, 1.0)
}

/// Closed-form damped harmonic oscillator evaluated as a unit progress
/// curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringTiming {
    /// Damping ratio; clamped to `[0.05, 1.0]` at evaluation.
    pub damping_ratio: f64,
    /// Initial velocity in unit-progress per second.
    pub initial_velocity: f64,
}

impl SpringTiming {
    /// Progress at `t` seconds into a spring of `duration` seconds.
    ///
    /// `progress(0) == 0`; `progress(t >= duration) == 1`; underdamped
    /// springs exceed 1.0 mid-flight.
    #[must_use]
    pub fn progress(&self, t: f64, duration: f64) -> f64 {
        if duration <= 0.0 || t >= duration {
            return 1.0;
        }
        if t <= 0.0 {
            return 0.0;
        }
        let zeta = self.damping_ratio.clamp(0.05, 1.0);
        let v0 = self.initial_velocity;
        // Envelope decays to SETTLE_EPS at `duration`.
        let omega = (1.0 / SETTLE_EPS).ln() / (zeta * duration);
        let displacement = if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let envelope = libm::exp(-zeta * omega * t);
            let b = (zeta * omega - v0) / omega_d;
            envelope * ((omega_d * t).cos() + b * (omega_d * t).sin())
        } else {
            // Critically damped.
            libm::exp(-omega * t) * (1.0 + (omega - v0) * t)
        };
        1.0 - displacement
    }
}
