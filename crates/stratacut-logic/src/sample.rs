//! Layered-sample data model and invariant validation.
//!
//! A [`LayeredSample`] is a composite geological core: an ordered stack of
//! strata plus a total height. Samples are transient — they exist only for
//! the duration of one cutting session and are either destroyed, handed
//! back, or consumed by decomposition.

use serde::{Deserialize, Serialize};

/// RGB color, each channel in [0.0, 1.0].
pub type Rgb = [f32; 3];

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One geological stratum within a composite sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Stratum name (e.g. "Sandstone", "青葉山層"). Layers with empty
    /// names are skipped by the analyzer.
    pub name: String,
    /// Depth of the layer's top edge from the top of the sample, in meters.
    pub start_depth: f32,
    /// Layer thickness in meters. The analyzer recomputes this from
    /// adjacent start depths; the stored value is the surveyed estimate.
    pub thickness: f32,
    /// Explicit display color. `None` means derive one from the name.
    pub color: Option<Rgb>,
}

impl Layer {
    pub fn new(name: impl Into<String>, start_depth: f32, thickness: f32) -> Self {
        Self {
            name: name.into(),
            start_depth,
            thickness,
            color: None,
        }
    }
}

/// A composite multi-layer core sample.
///
/// Invariant: layers are contiguous and non-overlapping, and thicknesses
/// sum to `total_height` within [`THICKNESS_TOLERANCE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeredSample {
    /// Sample identifier, carried through to artifact provenance.
    pub id: String,
    /// Strata ordered by `start_depth`.
    pub layers: Vec<Layer>,
    /// Total sample height in meters.
    pub total_height: f32,
}

/// Allowed mismatch between summed thicknesses and `total_height`.
pub const THICKNESS_TOLERANCE: f32 = 1e-3;

/// An invariant violation found by [`validate_sample`].
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    /// `total_height` is zero or negative.
    NonPositiveHeight(f32),
    /// A layer has zero or negative thickness.
    NonPositiveThickness { layer: usize, thickness: f32 },
    /// A layer has negative start depth.
    NegativeStartDepth { layer: usize, start_depth: f32 },
    /// Adjacent layers (in depth order) leave a gap or overlap.
    NotContiguous { layer: usize, gap: f32 },
    /// Thicknesses don't sum to the total height.
    HeightMismatch { sum: f32, total_height: f32 },
}

/// Check the structural invariants of a sample.
///
/// Returns every violation found. An empty vec means the sample is
/// well-formed. Validation tolerates unsorted input: layers are checked
/// in depth order regardless of their position in the vec.
pub fn validate_sample(sample: &LayeredSample) -> Vec<SampleError> {
    let mut errors = Vec::new();

    if sample.total_height <= 0.0 {
        errors.push(SampleError::NonPositiveHeight(sample.total_height));
    }

    for (i, layer) in sample.layers.iter().enumerate() {
        if layer.thickness <= 0.0 {
            errors.push(SampleError::NonPositiveThickness {
                layer: i,
                thickness: layer.thickness,
            });
        }
        if layer.start_depth < 0.0 {
            errors.push(SampleError::NegativeStartDepth {
                layer: i,
                start_depth: layer.start_depth,
            });
        }
    }

    // Contiguity in depth order
    let mut order: Vec<usize> = (0..sample.layers.len()).collect();
    order.sort_by(|&a, &b| {
        sample.layers[a]
            .start_depth
            .partial_cmp(&sample.layers[b].start_depth)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for pair in order.windows(2) {
        let (a, b) = (&sample.layers[pair[0]], &sample.layers[pair[1]]);
        let gap = b.start_depth - (a.start_depth + a.thickness);
        if gap.abs() > THICKNESS_TOLERANCE {
            errors.push(SampleError::NotContiguous {
                layer: pair[1],
                gap,
            });
        }
    }

    let sum: f32 = sample.layers.iter().map(|l| l.thickness).sum();
    if (sum - sample.total_height).abs() > THICKNESS_TOLERANCE {
        errors.push(SampleError::HeightMismatch {
            sum,
            total_height: sample.total_height,
        });
    }

    errors
}
