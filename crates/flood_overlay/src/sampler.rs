//! Line sampler.
//!
//! Spreads density points along a colored segment so pipes read as a soft
//! glow in the heatmap. Samples sit at evenly spaced fractions of the arc
//! length and never on the segment's own endpoints, which already carry a
//! node point.

use rand::Rng;

use crate::classifier::{node_weight_for, sample_multiplier_for, RiskCategory};
use crate::config::OverlayConfig;
use crate::density::{DensityPoint, SourceKind};
use crate::geo::{cumulative_lengths, point_along, LngLat};
use crate::gradient::ColoredSegment;

/// Line points carry this fraction of the node weight for their category.
pub const LINE_POINT_WEIGHT_SCALE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub samples_per_reference: f64,
    pub reference_length: f64,
    pub max_wobble_radius: f64,
}

impl SamplingParams {
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            samples_per_reference: config.samples_per_reference,
            reference_length: config.sample_reference_length_deg,
            max_wobble_radius: config.max_wobble_radius_deg,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

/// Floor on the per-segment base count. Two is the smallest base at which
/// every step up in category multiplier adds at least one sample.
pub const MIN_BASE_SAMPLES: usize = 2;

/// `ceil(base × multiplier)` with `base = max(2, round(length / reference ×
/// density))`. Zero only for degenerate input, so any segment with length
/// gets strictly more samples the higher its category.
pub fn sample_count(length: f64, category: Option<RiskCategory>, params: &SamplingParams) -> usize {
    if !(length > 0.0) || !(params.reference_length > 0.0) || !(params.samples_per_reference > 0.0) {
        return 0;
    }
    let raw = length / params.reference_length * params.samples_per_reference;
    if !raw.is_finite() {
        return 0;
    }
    let base = (raw.round() as usize).max(MIN_BASE_SAMPLES);
    (base as f64 * sample_multiplier_for(category)).ceil() as usize
}

/// Lazy sample sequence for one segment. Each point's jitter is drawn when
/// the point is yielded.
pub struct LineSamples<'a, R: Rng + ?Sized> {
    vertices: &'a [LngLat],
    cumulative: Vec<f64>,
    category: Option<RiskCategory>,
    weight: f64,
    max_wobble_radius: f64,
    count: usize,
    next: usize,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Iterator for LineSamples<'_, R> {
    type Item = DensityPoint;

    fn next(&mut self) -> Option<DensityPoint> {
        if self.next >= self.count {
            return None;
        }
        self.next += 1;
        let t = self.next as f64 / (self.count + 1) as f64;
        let base = point_along(self.vertices, &self.cumulative, t);
        Some(DensityPoint::new(
            base,
            SourceKind::Line,
            self.category,
            self.weight,
            self.max_wobble_radius,
            self.rng,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl<R: Rng + ?Sized> ExactSizeIterator for LineSamples<'_, R> {}

pub fn sample_segment<'a, R: Rng + ?Sized>(
    segment: &'a ColoredSegment,
    params: &SamplingParams,
    rng: &'a mut R,
) -> LineSamples<'a, R> {
    let cumulative = cumulative_lengths(&segment.vertices);
    let length = cumulative.last().copied().unwrap_or(0.0);
    let count = if segment.vertices.len() < 2 {
        0
    } else {
        sample_count(length, segment.category, params)
    };
    LineSamples {
        vertices: &segment.vertices,
        cumulative,
        category: segment.category,
        weight: node_weight_for(segment.category) * LINE_POINT_WEIGHT_SCALE,
        max_wobble_radius: params.max_wobble_radius,
        count,
        next: 0,
        rng,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fill_for;
    use crate::geo::distance;
    use crate::overlay_rng::OverlayRng;

    fn segment(category: RiskCategory, vertices: Vec<LngLat>) -> ColoredSegment {
        ColoredSegment::new(fill_for(Some(category)), Some(category), 10.0, vertices)
    }

    #[test]
    fn test_sample_count_scales_with_length_and_category() {
        let params = SamplingParams::default();
        let reference = params.reference_length;
        assert_eq!(sample_count(reference, Some(RiskCategory::NoRisk), &params), 3);
        assert_eq!(sample_count(reference, Some(RiskCategory::High), &params), 9);
        assert_eq!(sample_count(reference * 2.0, Some(RiskCategory::Medium), &params), 12);
        assert_eq!(sample_count(0.0, Some(RiskCategory::High), &params), 0);
        assert_eq!(sample_count(f64::NAN, Some(RiskCategory::High), &params), 0);
    }

    #[test]
    fn test_sample_count_strictly_increases_with_category_at_any_length() {
        let params = SamplingParams::default();
        let order = [
            RiskCategory::NoRisk,
            RiskCategory::Low,
            RiskCategory::Medium,
            RiskCategory::High,
        ];
        for length in [1e-9, 1e-5, 0.0001, 0.00025, 0.0005, 0.0013, 0.01] {
            let counts: Vec<usize> = order
                .iter()
                .map(|c| sample_count(length, Some(*c), &params))
                .collect();
            assert!(counts[0] >= 1, "length {length}: {counts:?}");
            assert!(
                counts.windows(2).all(|w| w[0] < w[1]),
                "length {length}: {counts:?}"
            );
        }
        assert_eq!(sample_count(1e-9, Some(RiskCategory::Low), &params), 3);
    }

    #[test]
    fn test_high_risk_segment_gets_more_samples() {
        let params = SamplingParams::default();
        let mut rng = OverlayRng::default();
        // A pipe-length segment and one about a metre long.
        for end in [0.0004, 0.00001] {
            let vertices = vec![[0.0, 0.0], [0.0, end]];
            let high = segment(RiskCategory::High, vertices.clone());
            let low = segment(RiskCategory::Low, vertices);
            let n_high = sample_segment(&high, &params, &mut rng.0).count();
            let n_low = sample_segment(&low, &params, &mut rng.0).count();
            assert!(n_low > 0, "length {end}: no samples");
            assert!(n_high > n_low, "length {end}: high {n_high} vs low {n_low}");
        }
    }

    #[test]
    fn test_samples_exclude_endpoints_and_stay_on_line() {
        let params = SamplingParams::default();
        let mut rng = OverlayRng::default();
        let seg = segment(
            RiskCategory::Medium,
            vec![[0.0, 0.0], [0.001, 0.0], [0.001, 0.001]],
        );
        let samples = sample_segment(&seg, &params, &mut rng.0);
        assert_eq!(samples.len(), 24);
        let points: Vec<DensityPoint> = samples.collect();
        let first = seg.vertices[0];
        let last = seg.vertices[2];
        for p in &points {
            assert!(distance(p.base, first) > 1e-9);
            assert!(distance(p.base, last) > 1e-9);
            let on_first_edge = p.base[1].abs() < 1e-12;
            let on_second_edge = (p.base[0] - 0.001).abs() < 1e-12;
            assert!(on_first_edge || on_second_edge, "{:?} off the polyline", p.base);
            assert_eq!(p.source_kind, SourceKind::Line);
            assert_eq!(p.category, Some(RiskCategory::Medium));
            assert!((p.weight - 1.5 * LINE_POINT_WEIGHT_SCALE).abs() < 1e-12);
        }
        // Evenly spaced: the midpoint sample lands on the corner vertex.
        assert!(distance(points[11].base, [0.001, 0.0]) < 1e-4);
    }

    #[test]
    fn test_samples_are_lazy_and_sized() {
        let params = SamplingParams::default();
        let mut rng = OverlayRng::default();
        let seg = segment(RiskCategory::High, vec![[0.0, 0.0], [0.0005, 0.0]]);
        let mut samples = sample_segment(&seg, &params, &mut rng.0);
        assert_eq!(samples.len(), 9);
        samples.next();
        assert_eq!(samples.len(), 8);
    }

    #[test]
    fn test_degenerate_segment_yields_nothing() {
        let params = SamplingParams::default();
        let mut rng = OverlayRng::default();
        let single = segment(RiskCategory::High, vec![[0.0, 0.0]]);
        assert_eq!(sample_segment(&single, &params, &mut rng.0).count(), 0);
        let zero = segment(RiskCategory::High, vec![[0.0, 0.0], [0.0, 0.0]]);
        assert_eq!(sample_segment(&zero, &params, &mut rng.0).count(), 0);
    }
}
