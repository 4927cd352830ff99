//! Outbound session events.
//!
//! The presentation layer and the inventory collaborator observe cutting
//! sessions exclusively through these events, drained from the station
//! after each tick. Expected gameplay outcomes (miss, completion) travel
//! here as data, never as errors.

use crate::decomposer::SingleLayerArtifact;
use serde::{Deserialize, Serialize};

/// Something observable happened in the active cutting session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A boundary was hit; `index` is the boundary just cut.
    BoundaryAdvanced { index: usize },
    /// A cut missed its success zone. The source sample is destroyed and
    /// no artifacts are produced, including for boundaries already hit.
    SessionFailed { sample_id: String },
    /// Every boundary was hit and the sample was decomposed. The artifact
    /// list mirrors what the collector received, in the same order.
    SessionCompleted {
        sample_id: String,
        artifacts: Vec<SingleLayerArtifact>,
    },
}
