//! Bucketed point lookup for fixed-radius proximity queries.

use std::collections::HashMap;

use crate::geo::{distance, LngLat};

/// Uniform bucket grid over coordinate space for radius queries.
///
/// Buckets are keyed by integer cell coordinates, so the index has no fixed
/// extent and works for any lng/lat range.
#[derive(Debug, Clone)]
pub struct PointIndex {
    bucket_size: f64,
    buckets: HashMap<(i64, i64), Vec<LngLat>>,
}

impl PointIndex {
    /// Non-positive bucket sizes fall back to one degree.
    pub fn new(bucket_size: f64) -> Self {
        let bucket_size = if bucket_size > 0.0 && bucket_size.is_finite() {
            bucket_size
        } else {
            1.0
        };
        Self {
            bucket_size,
            buckets: HashMap::new(),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = LngLat>, bucket_size: f64) -> Self {
        let mut index = Self::new(bucket_size);
        for p in points {
            index.insert(p);
        }
        index
    }

    #[inline]
    fn bucket_of(&self, p: LngLat) -> (i64, i64) {
        (
            (p[0] / self.bucket_size).floor() as i64,
            (p[1] / self.bucket_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, p: LngLat) {
        let key = self.bucket_of(p);
        self.buckets.entry(key).or_default().push(p);
    }

    /// True if any indexed point lies strictly closer than `radius` to `p`.
    pub fn any_within(&self, p: LngLat, radius: f64) -> bool {
        if radius <= 0.0 || self.buckets.is_empty() {
            return false;
        }
        let reach = (radius / self.bucket_size).ceil() as i64;
        let (bx, by) = self.bucket_of(p);
        for y in (by - reach)..=(by + reach) {
            for x in (bx - reach)..=(bx + reach) {
                if let Some(bucket) = self.buckets.get(&(x, y)) {
                    if bucket.iter().any(|&q| distance(p, q) < radius) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
