//! Owned animation state and the pure per-tick update.

use std::time::Duration;

use crate::config::PulseParams;
use crate::density::{DensityFields, DensityPoint};

use super::pulse::{pulse_multiplier, wobble_position};

/// Everything the animation loop owns. A new simulation result replaces the
/// whole value, so the node and line fields always belong to the same build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationState {
    pub running: bool,
    /// Clock time of the last applied tick.
    pub last_tick: Option<Duration>,
    pub fields: DensityFields,
}

impl AnimationState {
    pub fn running(fields: DensityFields) -> Self {
        Self {
            running: true,
            last_tick: None,
            fields,
        }
    }

    pub fn stopped() -> Self {
        Self::default()
    }
}

fn animate(points: &mut [DensityPoint], t_secs: f64, pulse: &PulseParams) {
    for p in points {
        p.pulse_multiplier = pulse_multiplier(t_secs, p.phase, pulse);
        p.position = wobble_position(p.base, p.wobble_angle, p.wobble_radius, t_secs, p.phase, pulse);
    }
}

/// Advance every point to clock time `now`.
pub fn tick(mut state: AnimationState, now: Duration, pulse: &PulseParams) -> AnimationState {
    let t = now.as_secs_f64();
    animate(&mut state.fields.nodes, t, pulse);
    animate(&mut state.fields.lines, t, pulse);
    state.last_tick = Some(now);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::SourceKind;
    use crate::overlay_rng::OverlayRng;

    fn fields() -> DensityFields {
        let mut rng = OverlayRng::default();
        let nodes = (0..4)
            .map(|i| DensityPoint::new([i as f64, 0.0], SourceKind::Node, None, 1.0, 0.00008, &mut rng.0))
            .collect();
        let lines = (0..8)
            .map(|i| DensityPoint::new([0.0, i as f64], SourceKind::Line, None, 0.4, 0.00008, &mut rng.0))
            .collect();
        DensityFields { nodes, lines }
    }

    #[test]
    fn test_tick_rewrites_only_render_fields() {
        let before = AnimationState::running(fields());
        let after = tick(before.clone(), Duration::from_millis(1234), &PulseParams::default());
        assert_eq!(after.last_tick, Some(Duration::from_millis(1234)));
        assert!(after.running);
        for (a, b) in before
            .fields
            .nodes
            .iter()
            .chain(&before.fields.lines)
            .zip(after.fields.nodes.iter().chain(&after.fields.lines))
        {
            assert_eq!(a.base, b.base);
            assert_eq!(a.phase, b.phase);
            assert_eq!(a.wobble_angle, b.wobble_angle);
            assert_eq!(a.wobble_radius, b.wobble_radius);
            assert!((0.65 - 1e-12..=1.0 + 1e-12).contains(&b.pulse_multiplier));
        }
    }

    #[test]
    fn test_tick_is_a_function_of_time() {
        let pulse = PulseParams::default();
        let state = AnimationState::running(fields());
        let once = tick(state.clone(), Duration::from_secs(3), &pulse);
        let twice = tick(
            tick(state, Duration::from_secs(1), &pulse),
            Duration::from_secs(3),
            &pulse,
        );
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stopped_state_is_empty() {
        let state = AnimationState::stopped();
        assert!(!state.running);
        assert!(state.fields.is_empty());
        assert!(state.last_tick.is_none());
    }
}
