//! Mineral reference-data loading.
//!
//! The feed is a versioned JSON envelope produced by the external data
//! layer. Loading is the one fallible I/O boundary in this subsystem and
//! it fails fast: a bad feed degrades to an empty lookup table, which
//! answers every query from the keyword fallback buckets. Callers treat
//! an empty composition list as "no data", never as an error.

use serde::Deserialize;
use stratacut_logic::minerals::{LayerRecord, MineralLookupTable};
use thiserror::Error;

/// Top-level envelope of the mineral database feed.
#[derive(Debug, Deserialize)]
pub struct MineralDatabaseFile {
    pub version: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub layers: Vec<LayerRecord>,
}

/// The mineral database could not be loaded.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("mineral database parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mineral database contains no layer records")]
    Empty,
}

/// Parse the feed into layer records.
pub fn load_records(json: &str) -> Result<Vec<LayerRecord>, DatabaseError> {
    let file: MineralDatabaseFile = serde_json::from_str(json)?;
    if file.layers.is_empty() {
        return Err(DatabaseError::Empty);
    }
    log::info!(
        "Loaded mineral database v{}: {} layer records",
        file.version,
        file.layers.len()
    );
    Ok(file.layers)
}

/// Build a lookup table from the feed, degrading on failure.
///
/// A load error is logged and answered with [`MineralLookupTable::empty`]
/// so every lookup falls back to the keyword buckets — the database being
/// unavailable is non-fatal by design.
pub fn table_from_json(json: &str) -> MineralLookupTable {
    match load_records(json) {
        Ok(records) => MineralLookupTable::from_records(records),
        Err(e) => {
            log::warn!("Mineral database unavailable, using fallback buckets: {}", e);
            MineralLookupTable::empty()
        }
    }
}
