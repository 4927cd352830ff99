//! Sample decomposition — turning a fully cut sample into artifacts.
//!
//! On full session success the original composite sample is consumed and
//! one [`SingleLayerArtifact`] is produced per analyzed layer, carrying
//! derived physical properties, mineral composition from the injected
//! lookup table, and a ring placement around the workstation reference
//! point. Artifacts are handed to the [`ArtifactCollector`] one at a
//! time, in layer order.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use stratacut_logic::boundary::SampleAnalysis;
use stratacut_logic::decompose::{
    ring_placement, segment_mass, segment_volume, MAX_ANGLE_JITTER, ROCK_DENSITY, SAMPLE_RADIUS,
};
use stratacut_logic::minerals::{MineralComposition, MineralLookupTable};
use stratacut_logic::sample::{Point3, Rgb};

/// A single-layer specimen cut out of a composite sample.
///
/// Plain data; ownership transfers to the collection collaborator as soon
/// as the decomposer emits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleLayerArtifact {
    /// Unique artifact id, `cut_<layer>_<sample>_<seq>`.
    pub id: String,
    pub layer_name: String,
    /// Id of the composite sample this artifact was cut from.
    pub source_sample_id: String,
    /// Depth range the layer occupied in the original sample, in meters.
    pub start_depth: f32,
    pub end_depth: f32,
    /// Recomputed layer thickness in meters.
    pub thickness: f32,
    /// Cylinder volume at the drill-core radius, in m³.
    pub volume: f32,
    /// Estimated mass in kg.
    pub mass: f32,
    pub color: Rgb,
    /// Composition from the mineral lookup (may be a fallback bucket).
    pub minerals: Vec<MineralComposition>,
    /// Where the artifact lands around the workstation.
    pub placement: Point3,
}

impl SingleLayerArtifact {
    /// The mineral with the highest share, if any composition data exists.
    pub fn primary_mineral(&self) -> Option<&MineralComposition> {
        self.minerals.iter().max_by(|a, b| {
            a.percentage
                .partial_cmp(&b.percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Receives artifacts as they are produced. Implemented by the inventory
/// collaborator; a plain `Vec` works for headless runs and tests.
pub trait ArtifactCollector {
    fn collect(&mut self, artifact: SingleLayerArtifact);
}

impl ArtifactCollector for Vec<SingleLayerArtifact> {
    fn collect(&mut self, artifact: SingleLayerArtifact) {
        self.push(artifact);
    }
}

/// Fixed parameters of the decomposition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecomposeConfig {
    /// Drill-core radius in meters.
    pub sample_radius: f32,
    /// Assumed rock density in kg/m³.
    pub rock_density: f32,
    /// Center of the artifact ring (the workstation surface).
    pub reference_point: Point3,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            sample_radius: SAMPLE_RADIUS,
            rock_density: ROCK_DENSITY,
            reference_point: Point3::default(),
        }
    }
}

/// Process-wide artifact sequence counter. Wall-clock timestamps can
/// collide within one granule; a monotonic counter cannot.
static ARTIFACT_SEQ: AtomicU64 = AtomicU64::new(1);

fn next_artifact_seq() -> u64 {
    ARTIFACT_SEQ.fetch_add(1, Ordering::Relaxed)
}

fn artifact_id(layer_name: &str, sample_id: &str) -> String {
    let clean: String = layer_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("cut_{}_{}_{:04}", clean, sample_id, next_artifact_seq())
}

/// Decomposes completed samples into single-layer artifacts.
///
/// The mineral table is injected at construction — the decomposer never
/// reaches into any global registry.
#[derive(Debug, Clone)]
pub struct SampleDecomposer {
    lookup: MineralLookupTable,
    config: DecomposeConfig,
}

impl SampleDecomposer {
    pub fn new(lookup: MineralLookupTable) -> Self {
        Self::with_config(lookup, DecomposeConfig::default())
    }

    pub fn with_config(lookup: MineralLookupTable, config: DecomposeConfig) -> Self {
        Self { lookup, config }
    }

    pub fn lookup(&self) -> &MineralLookupTable {
        &self.lookup
    }

    /// Decompose an analyzed sample into one artifact per layer.
    ///
    /// Output order matches the analyzed layer order and the length always
    /// equals the layer count. Placement jitter comes from the thread rng.
    pub fn decompose(&self, sample_id: &str, analysis: &SampleAnalysis) -> Vec<SingleLayerArtifact> {
        self.decompose_with_rng(sample_id, analysis, &mut rand::thread_rng())
    }

    /// [`Self::decompose`] with an explicit rng for deterministic layouts.
    pub fn decompose_with_rng(
        &self,
        sample_id: &str,
        analysis: &SampleAnalysis,
        rng: &mut impl Rng,
    ) -> Vec<SingleLayerArtifact> {
        let count = analysis.layers.len();
        let mut artifacts = Vec::with_capacity(count);

        for (i, layer) in analysis.layers.iter().enumerate() {
            let volume = segment_volume(layer.thickness, self.config.sample_radius);
            let jitter = rng.gen_range(-MAX_ANGLE_JITTER..=MAX_ANGLE_JITTER);
            artifacts.push(SingleLayerArtifact {
                id: artifact_id(&layer.name, sample_id),
                layer_name: layer.name.clone(),
                source_sample_id: sample_id.to_string(),
                start_depth: layer.start_depth,
                end_depth: layer.start_depth + layer.thickness,
                thickness: layer.thickness,
                volume,
                mass: segment_mass(volume, self.config.rock_density),
                color: layer.color,
                minerals: self.lookup.lookup(&layer.name),
                placement: ring_placement(self.config.reference_point, i, count, jitter),
            });
        }

        log::info!(
            "Decomposed sample '{}' into {} artifacts",
            sample_id,
            artifacts.len()
        );
        artifacts
    }
}
