//! Per-point pulse and wobble.
//!
//! Both are pure functions of the clock and the point's fixed phase, so any
//! tick can be recomputed from scratch without knowing the previous frame.

use std::f64::consts::TAU;

use crate::config::PulseParams;
use crate::geo::LngLat;

#[inline]
fn wave(t_secs: f64, phase: f64, pulse: &PulseParams) -> f64 {
    (TAU * pulse.speed_hz * t_secs + phase).sin()
}

/// Intensity multiplier in `[1 - amount, 1]`, centered on `1 - amount/2`.
#[inline]
pub fn pulse_multiplier(t_secs: f64, phase: f64, pulse: &PulseParams) -> f64 {
    let half = pulse.amount / 2.0;
    1.0 - half + wave(t_secs, phase, pulse) * half
}

/// `base` displaced by up to `radius` along `angle`, oscillating with the pulse.
#[inline]
pub fn wobble_position(
    base: LngLat,
    angle: f64,
    radius: f64,
    t_secs: f64,
    phase: f64,
    pulse: &PulseParams,
) -> LngLat {
    let offset = radius * wave(t_secs, phase, pulse);
    [base[0] + offset * angle.cos(), base[1] + offset * angle.sin()]
}
