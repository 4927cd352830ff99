//! Cutting-station engine for StrataCut.
//!
//! Builds the interactive cutting procedure on top of the pure logic in
//! `stratacut-logic`: a cooperative per-tick session state machine, the
//! decomposition of fully cut samples into single-layer artifacts, and
//! loading of the mineral reference feed.
//!
//! The engine owns no I/O besides parsing the feed it is handed, and no
//! threads: everything advances through [`station::CuttingStation::update`]
//! on the host's tick loop. Collaborators are injected — the mineral table
//! into the decomposer, the artifact collector into the cut trigger — and
//! the presentation layer observes sessions purely through drained
//! [`events::SessionEvent`]s.

pub mod database;
pub mod decomposer;
pub mod events;
pub mod station;

pub use decomposer::{ArtifactCollector, DecomposeConfig, SampleDecomposer, SingleLayerArtifact};
pub use events::SessionEvent;
pub use station::{CuttingRecord, CuttingStation, SessionConfig, SessionState, StartError};
