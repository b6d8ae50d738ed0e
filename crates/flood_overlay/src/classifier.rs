//! Risk classification and the canonical color palette.
//!
//! Simulation output labels nodes with free-text category strings ("High
//! Risk", "medium", "NO RISK", ...). [`RiskCategory::from_label`] maps them
//! to one of four categories by case-insensitive substring match in fixed
//! priority order (high, medium, low, no), then by an exact-match table of
//! synonyms. [`classify`] is total: any string yields a color pair, with a
//! neutral gray for labels that match nothing.
//!
//! Colors are sRGB bytes; gradients interpolate linearly in sRGB space.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear sRGB interpolation towards `other`, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Euclidean distance in RGB byte space.
    pub fn distance(self, other: Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

/// Formats as a CSS color string, e.g. `rgb(239, 68, 68)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskColors {
    pub fill: Rgb,
    pub stroke: Rgb,
}

/// Red family.
pub const HIGH_COLORS: RiskColors = RiskColors {
    fill: Rgb::new(239, 68, 68),
    stroke: Rgb::new(185, 28, 28),
};
/// Amber family.
pub const MEDIUM_COLORS: RiskColors = RiskColors {
    fill: Rgb::new(245, 158, 11),
    stroke: Rgb::new(180, 83, 9),
};
/// Yellow family.
pub const LOW_COLORS: RiskColors = RiskColors {
    fill: Rgb::new(250, 204, 21),
    stroke: Rgb::new(202, 138, 4),
};
/// Green family.
pub const NO_RISK_COLORS: RiskColors = RiskColors {
    fill: Rgb::new(34, 197, 94),
    stroke: Rgb::new(21, 128, 61),
};
/// Neutral gray for labels that match no category.
pub const DEFAULT_COLORS: RiskColors = RiskColors {
    fill: Rgb::new(156, 163, 175),
    stroke: Rgb::new(107, 114, 128),
};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    NoRisk,
    Low,
    Medium,
    High,
}

/// Substring tests in priority order. "high" must win over "no" so that
/// e.g. "not high" still reads as high risk.
const SUBSTRING_PRIORITY: [(&str, RiskCategory); 4] = [
    ("high", RiskCategory::High),
    ("medium", RiskCategory::Medium),
    ("low", RiskCategory::Low),
    ("no", RiskCategory::NoRisk),
];

/// Exact-match synonyms consulted when no substring matches.
const CANONICAL_LABELS: [(&str, RiskCategory); 9] = [
    ("severe", RiskCategory::High),
    ("critical", RiskCategory::High),
    ("extreme", RiskCategory::High),
    ("moderate", RiskCategory::Medium),
    ("elevated", RiskCategory::Medium),
    ("minor", RiskCategory::Low),
    ("minimal", RiskCategory::Low),
    ("safe", RiskCategory::NoRisk),
    ("clear", RiskCategory::NoRisk),
];

/// Label used for density points whose category could not be determined.
pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

/// Node weights in the density field.
pub const HIGH_NODE_WEIGHT: f64 = 5.0;
pub const MEDIUM_NODE_WEIGHT: f64 = 1.5;
pub const LOW_NODE_WEIGHT: f64 = 0.6;
pub const NO_RISK_NODE_WEIGHT: f64 = 0.2;

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::NoRisk,
        RiskCategory::Low,
        RiskCategory::Medium,
        RiskCategory::High,
    ];

    /// Classify a free-text label. `None` means nothing matched.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        SUBSTRING_PRIORITY
            .iter()
            .find(|(needle, _)| normalized.contains(needle))
            .or_else(|| {
                CANONICAL_LABELS
                    .iter()
                    .find(|(key, _)| *key == normalized)
            })
            .map(|&(_, category)| category)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoRisk => "No Risk",
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    pub fn colors(self) -> RiskColors {
        match self {
            Self::NoRisk => NO_RISK_COLORS,
            Self::Low => LOW_COLORS,
            Self::Medium => MEDIUM_COLORS,
            Self::High => HIGH_COLORS,
        }
    }

    pub fn node_weight(self) -> f64 {
        match self {
            Self::NoRisk => NO_RISK_NODE_WEIGHT,
            Self::Low => LOW_NODE_WEIGHT,
            Self::Medium => MEDIUM_NODE_WEIGHT,
            Self::High => HIGH_NODE_WEIGHT,
        }
    }

    /// Line sampling density multiplier.
    pub fn sample_multiplier(self) -> f64 {
        match self {
            Self::NoRisk => 1.0,
            Self::Low => 1.5,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }
}

/// Color pair for any label. Never fails.
pub fn classify(label: &str) -> RiskColors {
    RiskCategory::from_label(label).map_or(DEFAULT_COLORS, RiskCategory::colors)
}

/// Fill color for an optional category (gray when unclassified).
pub fn fill_for(category: Option<RiskCategory>) -> Rgb {
    category.map_or(DEFAULT_COLORS, RiskCategory::colors).fill
}

pub fn label_for(category: Option<RiskCategory>) -> &'static str {
    category.map_or(UNCLASSIFIED_LABEL, RiskCategory::label)
}

/// Unclassified nodes weigh like no-risk nodes.
pub fn node_weight_for(category: Option<RiskCategory>) -> f64 {
    category.map_or(NO_RISK_NODE_WEIGHT, RiskCategory::node_weight)
}

pub fn sample_multiplier_for(category: Option<RiskCategory>) -> f64 {
    category.map_or(1.0, RiskCategory::sample_multiplier)
}
