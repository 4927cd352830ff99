//! Integration tests for the full cutting pipeline.
//!
//! Exercises: LayeredSample → boundary analysis → CuttingStation session
//! → SampleDecomposer → artifact collection, against the bundled mineral
//! database. All tests are pure logic — no rendering, no real input
//! devices, no wall clock.

use stratacut_core::database::table_from_json;
use stratacut_core::{
    CuttingStation, SampleDecomposer, SessionConfig, SessionEvent, SessionState,
    SingleLayerArtifact,
};
use stratacut_logic::sample::{Layer, LayeredSample};

const DATABASE_JSON: &str = include_str!("../../../data/mineral_database.json");

// ── Helpers ────────────────────────────────────────────────────────────

fn sendai_sample() -> LayeredSample {
    LayeredSample {
        id: "core-007".into(),
        layers: vec![
            Layer::new("Aobayama Formation", 0.0, 0.6),
            Layer::new("Dainenji Formation", 0.6, 0.7),
            Layer::new("Tatsunokuchi Formation", 1.3, 0.7),
        ],
        total_height: 2.0,
    }
}

fn instant_config() -> SessionConfig {
    SessionConfig {
        marker_speed: 0.5,
        prepare_delay: 0.0,
        success_pause: 0.0,
    }
}

fn station_with_database() -> CuttingStation {
    let table = table_from_json(DATABASE_JSON);
    CuttingStation::with_config(SampleDecomposer::new(table), instant_config())
}

/// Sweep the marker into the current boundary's zone and trigger.
fn cut_current_boundary(station: &mut CuttingStation, sink: &mut Vec<SingleLayerArtifact>) {
    assert_eq!(station.state(), SessionState::Cutting);
    let boundary = station.analysis().unwrap().boundaries[station.current_boundary()];
    for _ in 0..20_000 {
        if (station.marker_position() - boundary.position).abs() <= boundary.tolerance_half_width {
            station.trigger_cut(sink);
            return;
        }
        station.update(0.001);
    }
    panic!("marker never reached boundary at {}", boundary.position);
}

// ── Pipeline coherence ─────────────────────────────────────────────────

#[test]
fn full_session_produces_artifacts_with_database_minerals() {
    let mut station = station_with_database();
    let mut sink: Vec<SingleLayerArtifact> = Vec::new();

    station.start(sendai_sample()).unwrap();
    cut_current_boundary(&mut station, &mut sink);
    cut_current_boundary(&mut station, &mut sink);

    assert_eq!(station.state(), SessionState::Completed);
    assert_eq!(sink.len(), 3);

    // Compositions come from the database, not the fallback buckets
    assert!(sink[0].minerals.iter().any(|m| m.id == "quartz_001"));
    assert!(sink[1].minerals.iter().any(|m| m.id == "clay_minerals_001"));
    assert!(sink[2].minerals.iter().any(|m| m.id == "calcite_001"));

    // Thickness conservation across the decomposition
    let total: f32 = sink.iter().map(|a| a.thickness).sum();
    assert!((total - 2.0).abs() < 1e-3);

    // Provenance and unique ids
    let mut ids: Vec<&str> = sink.iter().map(|a| a.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(sink.iter().all(|a| a.source_sample_id == "core-007"));
}

#[test]
fn events_match_collector_output() {
    let mut station = station_with_database();
    let mut sink: Vec<SingleLayerArtifact> = Vec::new();

    station.start(sendai_sample()).unwrap();
    cut_current_boundary(&mut station, &mut sink);
    cut_current_boundary(&mut station, &mut sink);

    let events = station.drain_events();
    assert_eq!(events[0], SessionEvent::BoundaryAdvanced { index: 0 });
    assert_eq!(events[1], SessionEvent::BoundaryAdvanced { index: 1 });
    match &events[2] {
        SessionEvent::SessionCompleted {
            sample_id,
            artifacts,
        } => {
            assert_eq!(sample_id, "core-007");
            assert_eq!(artifacts.as_slice(), sink.as_slice());
        }
        other => panic!("expected SessionCompleted, got {:?}", other),
    }
}

#[test]
fn miss_destroys_sample_and_keeps_station_reusable() {
    let mut station = station_with_database();
    let mut sink: Vec<SingleLayerArtifact> = Vec::new();

    station.start(sendai_sample()).unwrap();
    // Trigger immediately at marker 0, far outside the first zone
    station.trigger_cut(&mut sink);

    assert_eq!(station.state(), SessionState::Failed);
    assert!(sink.is_empty());
    assert!(matches!(
        station.drain_events().as_slice(),
        [SessionEvent::SessionFailed { sample_id }] if sample_id == "core-007"
    ));

    // The station accepts a fresh sample afterwards
    station.start(sendai_sample()).unwrap();
    cut_current_boundary(&mut station, &mut sink);
    cut_current_boundary(&mut station, &mut sink);
    assert_eq!(sink.len(), 3);
}

#[test]
fn degraded_database_still_completes_sessions() {
    // Feed fails to parse → empty table → fallback buckets
    let table = table_from_json("definitely not json");
    let mut station =
        CuttingStation::with_config(SampleDecomposer::new(table), instant_config());
    let mut sink: Vec<SingleLayerArtifact> = Vec::new();

    let sample = LayeredSample {
        id: "core-008".into(),
        layers: vec![
            Layer::new("Sandstone", 0.0, 1.0),
            Layer::new("Limestone", 1.0, 1.0),
        ],
        total_height: 2.0,
    };
    station.start(sample).unwrap();
    cut_current_boundary(&mut station, &mut sink);

    assert_eq!(sink.len(), 2);
    assert_eq!(sink[0].minerals[0].id, "quartz_default");
    assert_eq!(sink[1].minerals[0].id, "calcite_default");
}

#[test]
fn stopped_session_preserves_sample_for_later() {
    let mut station = station_with_database();
    let mut sink: Vec<SingleLayerArtifact> = Vec::new();

    station.start(sendai_sample()).unwrap();
    cut_current_boundary(&mut station, &mut sink);
    sink.clear();

    // Player walks away mid-session: progress is lost, the sample isn't
    let sample = station.stop().expect("sample handed back");
    assert_eq!(sample.id, "core-007");
    assert_eq!(sample.layers.len(), 3);

    // Restarting with the same sample begins from the first boundary
    station.start(sample).unwrap();
    assert_eq!(station.current_boundary(), 0);
    cut_current_boundary(&mut station, &mut sink);
    cut_current_boundary(&mut station, &mut sink);
    assert_eq!(sink.len(), 3);
}
