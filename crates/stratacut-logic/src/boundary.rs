//! Layer boundary analysis — positions, cut tolerances, layer colors.
//!
//! Turns an unordered layer list into the sorted, recomputed view a
//! cutting session works from: one [`CutBoundary`] per internal layer
//! interface, with a normalized position and a timing tolerance derived
//! from the layer count. Pure and deterministic — the same sample always
//! produces the same analysis.

use crate::sample::{Layer, LayeredSample, Rgb};
use serde::{Deserialize, Serialize};

/// Minimum recomputed layer thickness in meters. Degenerate zero-thickness
/// layers would collapse adjacent boundaries onto the same position.
pub const MIN_LAYER_THICKNESS: f32 = 0.01;

/// An internal interface between two adjacent layers where a cut must land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutBoundary {
    /// Normalized boundary position along the sample, in (0, 1).
    /// 0 is the top of the sample, 1 the bottom.
    pub position: f32,
    /// Half-width of the success zone around `position`, normalized.
    pub tolerance_half_width: f32,
    /// Index of the layer above this boundary, into the analyzed layers.
    pub layer_index: usize,
}

/// A layer as the analyzer sees it: sorted, thickness recomputed from
/// adjacent start depths, color resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedLayer {
    pub name: String,
    /// Depth of the layer's top edge, in meters.
    pub start_depth: f32,
    /// Recomputed thickness: distance to the next layer's top edge
    /// (last layer: to the bottom of the sample), floored at
    /// [`MIN_LAYER_THICKNESS`].
    pub thickness: f32,
    pub color: Rgb,
}

/// Full analysis of a cuttable sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAnalysis {
    /// Valid layers sorted by start depth.
    pub layers: Vec<AnalyzedLayer>,
    /// One boundary per internal layer interface; `layers.len() - 1`
    /// entries, positions strictly increasing.
    pub boundaries: Vec<CutBoundary>,
    /// Total sample height in meters.
    pub total_height: f32,
}

/// The sample cannot be cut: fewer than two layers with non-empty names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotCuttable {
    /// How many valid (named) layers the sample actually had.
    pub valid_layers: usize,
}

/// Success-zone full width in centimeters, by valid layer count.
///
/// More layers mean tighter cuts. Counts not covered by the table fall
/// back to 20 cm; with fewer than two layers rejected up front, that
/// branch is defensive rather than reachable.
pub fn success_zone_cm(layer_count: usize) -> f32 {
    match layer_count {
        2 => 40.0,
        3 => 20.0,
        4 => 10.0,
        n if n >= 5 => 10.0,
        _ => 20.0,
    }
}

/// Analyze a sample's layer structure into cut boundaries.
///
/// Layers with empty or whitespace-only names are discarded. At least two
/// valid layers must remain or the sample is [`NotCuttable`] and no
/// session may be started for it.
pub fn analyze(sample: &LayeredSample) -> Result<SampleAnalysis, NotCuttable> {
    let mut valid: Vec<&Layer> = sample
        .layers
        .iter()
        .filter(|l| !l.name.trim().is_empty())
        .collect();

    if valid.len() < 2 {
        return Err(NotCuttable {
            valid_layers: valid.len(),
        });
    }

    valid.sort_by(|a, b| {
        a.start_depth
            .partial_cmp(&b.start_depth)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Recompute thicknesses from adjacent start depths; the stored values
    // are survey estimates and may not tile the sample exactly.
    let n = valid.len();
    let mut layers = Vec::with_capacity(n);
    for i in 0..n {
        let raw = if i + 1 < n {
            valid[i + 1].start_depth - valid[i].start_depth
        } else {
            sample.total_height - valid[i].start_depth
        };
        layers.push(AnalyzedLayer {
            name: valid[i].name.clone(),
            start_depth: valid[i].start_depth,
            thickness: raw.max(MIN_LAYER_THICKNESS),
            color: valid[i]
                .color
                .unwrap_or_else(|| derive_layer_color(&valid[i].name)),
        });
    }

    let half_width = tolerance_half_width(n, sample.total_height);

    let mut boundaries = Vec::with_capacity(n - 1);
    let mut cumulative_depth = 0.0;
    for (i, layer) in layers.iter().take(n - 1).enumerate() {
        cumulative_depth += layer.thickness;
        boundaries.push(CutBoundary {
            position: cumulative_depth / sample.total_height,
            tolerance_half_width: half_width,
            layer_index: i,
        });
    }

    Ok(SampleAnalysis {
        layers,
        boundaries,
        total_height: sample.total_height,
    })
}

/// Normalized success-zone half-width for a given layer count and sample
/// height in meters.
pub fn tolerance_half_width(layer_count: usize, total_height: f32) -> f32 {
    let zone_cm = success_zone_cm(layer_count);
    let total_cm = total_height * 100.0;
    (zone_cm / total_cm) / 2.0
}

/// Derive a stable display color from a layer name.
///
/// FNV-1a over the name bytes, split into RGB channels, each mapped into
/// [0.2, 1.0] so dark hashes stay visible. Empty names get neutral gray.
pub fn derive_layer_color(name: &str) -> Rgb {
    if name.is_empty() {
        return [0.5, 0.5, 0.5];
    }

    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }

    let r = ((hash >> 16) & 0xFF) as f32 / 255.0;
    let g = ((hash >> 8) & 0xFF) as f32 / 255.0;
    let b = (hash & 0xFF) as f32 / 255.0;

    [
        (r * 0.8 + 0.2).clamp(0.2, 1.0),
        (g * 0.8 + 0.2).clamp(0.2, 1.0),
        (b * 0.8 + 0.2).clamp(0.2, 1.0),
    ]
}
