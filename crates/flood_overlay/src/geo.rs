//! Coordinate helpers shared by the matcher, sampler and density assembler.
//!
//! Positions are `[lng, lat]` pairs in degrees and distances are Euclidean in
//! coordinate space, the same space the thresholds in [`crate::config`] use.

/// A `[lng, lat]` position.
pub type LngLat = [f64; 2];

#[inline]
pub fn distance(a: LngLat, b: LngLat) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}

#[inline]
pub fn lerp_point(a: LngLat, b: LngLat, t: f64) -> LngLat {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

/// Arc length at each vertex: `0.0` first, the total length last.
pub fn cumulative_lengths(vertices: &[LngLat]) -> Vec<f64> {
    let mut out = Vec::with_capacity(vertices.len());
    let mut total = 0.0;
    for (i, &v) in vertices.iter().enumerate() {
        if i > 0 {
            total += distance(vertices[i - 1], v);
        }
        out.push(total);
    }
    out
}

/// Position at fractional arc length `t` (clamped to `[0, 1]`) along a
/// polyline whose cumulative lengths were computed by [`cumulative_lengths`].
pub fn point_along(vertices: &[LngLat], cumulative: &[f64], t: f64) -> LngLat {
    let n = vertices.len().min(cumulative.len());
    match n {
        0 => return [0.0, 0.0],
        1 => return vertices[0],
        _ => {}
    }
    let total = cumulative[n - 1];
    if total <= 0.0 {
        return vertices[0];
    }
    let target = t.clamp(0.0, 1.0) * total;
    // First vertex at or beyond the target closes the bounding edge.
    let hi = cumulative[..n]
        .partition_point(|&c| c < target)
        .clamp(1, n - 1);
    let lo = hi - 1;
    let edge = cumulative[hi] - cumulative[lo];
    let frac = if edge > 0.0 {
        (target - cumulative[lo]) / edge
    } else {
        0.0
    };
    lerp_point(vertices[lo], vertices[hi], frac)
}
