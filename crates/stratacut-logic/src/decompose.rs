//! Physical properties and placement for single-layer cut artifacts.
//!
//! Pure math only: cylinder volume/mass at the fixed drill-core radius,
//! and the even ring layout used to arrange artifacts around the cutting
//! workstation. Randomized jitter is injected by the caller so everything
//! here stays deterministic.

use crate::sample::Point3;
use std::f32::consts::PI;

/// Drill-core sample radius in meters (10 cm).
pub const SAMPLE_RADIUS: f32 = 0.1;

/// Assumed rock density in kg/m³ (2.5 g/cm³).
pub const ROCK_DENSITY: f32 = 2500.0;

/// How far artifacts float above the reference point, in meters.
pub const PLACEMENT_HEIGHT_OFFSET: f32 = 0.2;

/// Maximum magnitude of the per-artifact angular jitter, in radians.
pub const MAX_ANGLE_JITTER: f32 = 0.1;

/// Volume of a cylindrical core segment of the given thickness, in m³.
pub fn segment_volume(thickness: f32, radius: f32) -> f32 {
    PI * radius * radius * thickness
}

/// Mass of a segment from its volume, in kg.
pub fn segment_mass(volume: f32, density: f32) -> f32 {
    volume * density
}

/// Ring radius for laying out `count` artifacts, in meters.
///
/// Step table, not a continuous function: small batches sit close in,
/// larger ones get pushed out to avoid overlap.
pub fn ring_radius(count: usize) -> f32 {
    if count > 8 {
        1.2
    } else if count > 4 {
        1.0
    } else {
        0.8
    }
}

/// Base angle of artifact `index` out of `count`, evenly spaced.
pub fn ring_angle(index: usize, count: usize) -> f32 {
    debug_assert!(count > 0);
    index as f32 * 2.0 * PI / count as f32
}

/// Place artifact `index` of `count` on the ring around `center`.
///
/// `jitter` is an angular offset in radians, expected within
/// ±[`MAX_ANGLE_JITTER`]; pass 0.0 for a deterministic layout.
pub fn ring_placement(center: Point3, index: usize, count: usize, jitter: f32) -> Point3 {
    let angle = ring_angle(index, count) + jitter;
    let radius = ring_radius(count);
    Point3 {
        x: center.x + angle.cos() * radius,
        y: center.y + PLACEMENT_HEIGHT_OFFSET,
        z: center.z + angle.sin() * radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_volume() {
        // π · 0.1² · 1.0 ≈ 0.0314159 m³
        let v = segment_volume(1.0, SAMPLE_RADIUS);
        assert!((v - 0.031_415_9).abs() < 1e-5);
    }

    #[test]
    fn test_segment_mass() {
        let v = segment_volume(1.0, SAMPLE_RADIUS);
        let m = segment_mass(v, ROCK_DENSITY);
        // ~78.5 kg for a 1m core segment
        assert!((m - 78.539_8).abs() < 1e-2);
    }

    #[test]
    fn test_ring_radius_steps() {
        assert_eq!(ring_radius(1), 0.8);
        assert_eq!(ring_radius(4), 0.8);
        assert_eq!(ring_radius(5), 1.0);
        assert_eq!(ring_radius(8), 1.0);
        assert_eq!(ring_radius(9), 1.2);
        assert_eq!(ring_radius(20), 1.2);
    }

    #[test]
    fn test_ring_angles_evenly_spaced() {
        let n = 6;
        for i in 0..n {
            let expected = i as f32 * PI / 3.0;
            assert!((ring_angle(i, n) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ring_placement_on_circle() {
        let center = Point3::new(1.0, 2.0, 3.0);
        for i in 0..4 {
            let p = ring_placement(center, i, 4, 0.0);
            let dx = p.x - center.x;
            let dz = p.z - center.z;
            let dist = (dx * dx + dz * dz).sqrt();
            assert!((dist - 0.8).abs() < 1e-5);
            assert!((p.y - (center.y + PLACEMENT_HEIGHT_OFFSET)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_placement_deterministic_without_jitter() {
        let center = Point3::default();
        assert_eq!(
            ring_placement(center, 2, 5, 0.0),
            ring_placement(center, 2, 5, 0.0)
        );
    }
}
