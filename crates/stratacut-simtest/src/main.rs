//! StrataCut Headless Validation Harness
//!
//! Validates the cutting pipeline and the bundled mineral database
//! without any engine. Runs entirely in-process — no rendering, no input
//! devices, no wall clock.
//!
//! Usage:
//!   cargo run -p stratacut-simtest
//!   cargo run -p stratacut-simtest -- --verbose

use stratacut_core::database::load_records;
use stratacut_core::{
    CuttingStation, SampleDecomposer, SessionConfig, SessionState, SingleLayerArtifact,
};
use stratacut_logic::boundary::{analyze, tolerance_half_width};
use stratacut_logic::minerals::MineralLookupTable;
use stratacut_logic::sample::{validate_sample, Layer, LayeredSample};

// ── Mineral database (same JSON the game ships) ─────────────────────────
const DATABASE_JSON: &str = include_str!("../../../data/mineral_database.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== StrataCut Validation Harness ===\n");

    let mut results = Vec::new();

    // 1. Mineral database feed
    results.extend(validate_mineral_database());

    // 2. Boundary analysis sweep
    results.extend(validate_boundary_analysis());

    // 3. Lookup policy against the loaded table
    results.extend(validate_lookup_policy());

    // 4. Scripted cutting sessions
    results.extend(validate_cutting_sessions());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn even_sample(n: usize, total_height: f32) -> LayeredSample {
    let thickness = total_height / n as f32;
    LayeredSample {
        id: format!("sim-{}", n),
        layers: (0..n)
            .map(|i| Layer::new(format!("Stratum {}", i), i as f32 * thickness, thickness))
            .collect(),
        total_height,
    }
}

fn instant_config() -> SessionConfig {
    SessionConfig {
        marker_speed: 0.5,
        prepare_delay: 0.0,
        success_pause: 0.0,
    }
}

/// Sweep the marker into the current zone and trigger; false on timeout.
fn cut_current_boundary(station: &mut CuttingStation, sink: &mut Vec<SingleLayerArtifact>) -> bool {
    if station.state() != SessionState::Cutting {
        return false;
    }
    let Some(analysis) = station.analysis() else {
        return false;
    };
    let Some(boundary) = analysis.boundaries.get(station.current_boundary()).copied() else {
        return false;
    };
    for _ in 0..50_000 {
        if (station.marker_position() - boundary.position).abs() <= boundary.tolerance_half_width {
            station.trigger_cut(sink);
            return true;
        }
        station.update(0.001);
    }
    false
}

// ── 1. Mineral database ─────────────────────────────────────────────────

fn validate_mineral_database() -> Vec<TestResult> {
    println!("--- Mineral Database ---");
    let mut results = Vec::new();

    let records = match load_records(DATABASE_JSON) {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult::new(
                "database_parse",
                false,
                format!("load error: {}", e),
            ));
            return results;
        }
    };

    results.push(TestResult::new(
        "database_not_empty",
        records.len() >= 4,
        format!("{} layer records loaded", records.len()),
    ));

    let bad_pct = records
        .iter()
        .flat_map(|r| &r.minerals)
        .filter(|m| !(0.0..=1.0).contains(&m.percentage))
        .count();
    results.push(TestResult::new(
        "mineral_percentages_in_range",
        bad_pct == 0,
        format!("{} minerals with out-of-range percentage", bad_pct),
    ));

    let unnamed = records.iter().filter(|r| r.name.trim().is_empty()).count();
    results.push(TestResult::new(
        "layers_named",
        unnamed == 0,
        format!("{} unnamed layer records", unnamed),
    ));

    results
}

// ── 2. Boundary analysis ────────────────────────────────────────────────

fn validate_boundary_analysis() -> Vec<TestResult> {
    println!("--- Boundary Analysis ---");
    let mut results = Vec::new();

    // N-1 boundaries, strictly increasing, in (0,1), for N = 2..9
    let mut sweep_ok = true;
    let mut detail = String::new();
    for n in 2..=9 {
        match analyze(&even_sample(n, 2.0)) {
            Ok(a) => {
                let count_ok = a.boundaries.len() == n - 1;
                let increasing = a
                    .boundaries
                    .windows(2)
                    .all(|p| p[0].position < p[1].position);
                let in_range = a
                    .boundaries
                    .iter()
                    .all(|b| b.position > 0.0 && b.position < 1.0);
                if !(count_ok && increasing && in_range) {
                    sweep_ok = false;
                    detail = format!("n={} violated boundary invariants", n);
                }
            }
            Err(_) => {
                sweep_ok = false;
                detail = format!("n={} unexpectedly not cuttable", n);
            }
        }
    }
    results.push(TestResult::new(
        "boundary_sweep",
        sweep_ok,
        if sweep_ok {
            "N=2..9: N-1 boundaries, strictly increasing, in (0,1)".to_string()
        } else {
            detail
        },
    ));

    // Tolerance table at 2m: 0.10 / 0.05 / 0.025 / 0.025
    let expected = [(2, 0.10), (3, 0.05), (4, 0.025), (5, 0.025), (8, 0.025)];
    let table_ok = expected
        .iter()
        .all(|&(n, hw)| (tolerance_half_width(n, 2.0) - hw).abs() < 1e-6);
    results.push(TestResult::new(
        "tolerance_table",
        table_ok,
        "40/20/10/10cm table halved and normalized at 2m",
    ));

    // Single layer is not cuttable
    let solo = LayeredSample {
        id: "solo".into(),
        layers: vec![Layer::new("Granite", 0.0, 2.0)],
        total_height: 2.0,
    };
    results.push(TestResult::new(
        "single_layer_rejected",
        analyze(&solo).is_err(),
        "1 layer → NotCuttable",
    ));

    // Determinism
    let sample = even_sample(5, 2.0);
    let deterministic = analyze(&sample) == analyze(&sample);
    results.push(TestResult::new(
        "analysis_deterministic",
        deterministic,
        "identical input yields identical analysis",
    ));

    // Sample invariants hold for the sweep inputs
    let invariants_ok = (2..=9).all(|n| validate_sample(&even_sample(n, 2.0)).is_empty());
    results.push(TestResult::new(
        "sample_invariants",
        invariants_ok,
        "sweep samples contiguous with conserved height",
    ));

    results
}

// ── 3. Lookup policy ────────────────────────────────────────────────────

fn validate_lookup_policy() -> Vec<TestResult> {
    println!("--- Mineral Lookup ---");
    let mut results = Vec::new();

    let table = match load_records(DATABASE_JSON) {
        Ok(records) => MineralLookupTable::from_records(records),
        Err(_) => MineralLookupTable::empty(),
    };

    let exact = table.lookup("Aobayama Formation");
    results.push(TestResult::new(
        "exact_variant_match",
        exact.iter().any(|m| m.id == "quartz_001"),
        format!("'Aobayama Formation' → {} minerals", exact.len()),
    ));

    let normalized = table.lookup("aobayama");
    results.push(TestResult::new(
        "normalized_match",
        normalized.iter().any(|m| m.id == "quartz_001"),
        "suffix-stripped alias resolves",
    ));

    let empty = table.lookup("");
    results.push(TestResult::new(
        "empty_label",
        empty.is_empty(),
        "empty label → empty composition list",
    ));

    let unknown = table.lookup("totally-unknown-layer-xyz");
    results.push(TestResult::new(
        "unknown_label_fallback",
        unknown.len() == 1 && unknown[0].id == "mixed_default",
        "unknown label → mixed-minerals bucket",
    ));

    let sandy = table.lookup("weathered sandstone bed");
    results.push(TestResult::new(
        "sand_keyword_bucket",
        sandy.len() == 1 && sandy[0].id == "quartz_default",
        "sand token → quartz-dominant bucket",
    ));

    results
}

// ── 4. Cutting sessions ─────────────────────────────────────────────────

fn validate_cutting_sessions() -> Vec<TestResult> {
    println!("--- Cutting Sessions ---");
    let mut results = Vec::new();

    let table = match load_records(DATABASE_JSON) {
        Ok(records) => MineralLookupTable::from_records(records),
        Err(_) => MineralLookupTable::empty(),
    };

    // Full success for N = 2..6: N artifacts, thickness conserved
    let mut success_ok = true;
    let mut detail = String::new();
    for n in 2..=6 {
        let mut station =
            CuttingStation::with_config(SampleDecomposer::new(table.clone()), instant_config());
        let mut sink: Vec<SingleLayerArtifact> = Vec::new();
        if station.start(even_sample(n, 2.0)).is_err() {
            success_ok = false;
            detail = format!("n={}: start rejected", n);
            break;
        }
        for _ in 0..n - 1 {
            if !cut_current_boundary(&mut station, &mut sink) {
                success_ok = false;
                detail = format!("n={}: boundary sweep failed", n);
            }
        }
        let total: f32 = sink.iter().map(|a| a.thickness).sum();
        if sink.len() != n || (total - 2.0).abs() > 1e-3 {
            success_ok = false;
            detail = format!("n={}: {} artifacts, total {:.4}", n, sink.len(), total);
        }
    }
    results.push(TestResult::new(
        "full_success_sessions",
        success_ok,
        if success_ok {
            "N=2..6: N artifacts, thickness conserved".to_string()
        } else {
            detail
        },
    ));

    // A miss fails the session and produces nothing
    let mut station = CuttingStation::with_config(
        SampleDecomposer::new(MineralLookupTable::empty()),
        instant_config(),
    );
    let mut sink: Vec<SingleLayerArtifact> = Vec::new();
    let _ = station.start(even_sample(3, 2.0));
    station.trigger_cut(&mut sink); // marker at 0, a guaranteed miss
    results.push(TestResult::new(
        "miss_fails_session",
        station.state() == SessionState::Failed && sink.is_empty(),
        "immediate trigger → Failed, zero artifacts",
    ));

    // Busy rejection while a session is live
    let mut station = CuttingStation::with_config(
        SampleDecomposer::new(MineralLookupTable::empty()),
        instant_config(),
    );
    let _ = station.start(even_sample(3, 2.0));
    let busy = station.start(even_sample(2, 2.0)).is_err();
    results.push(TestResult::new(
        "busy_rejection",
        busy && station.state() == SessionState::Cutting,
        "second start rejected, session untouched",
    ));

    // Stop hands the sample back intact
    let stopped = station.stop();
    results.push(TestResult::new(
        "stop_preserves_sample",
        stopped.map(|s| s.layers.len()) == Some(3) && station.state() == SessionState::Idle,
        "stop → Idle with sample returned",
    ));

    results
}
