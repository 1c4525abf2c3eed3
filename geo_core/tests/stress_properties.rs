//! Physical properties of the solvers checked through the public API.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use geo_core::calculations::bearing::ultimate_bearing_capacity;
use geo_core::calculations::stress::{compute_bulb, compute_stress, Point};
use geo_core::equations::influence::{boussinesq_point_load, rectangle_influence};
use geo_core::models::{AnalysisGrid, FootingShape, FoundationGeometry, LoadCondition, SoilInput, SoilProfile};
use geo_core::{analyze, AnalysisRequest, Settings, SoilDatabase};

fn footing(l: f64, b: f64) -> FoundationGeometry {
    FoundationGeometry::new(l, b).unwrap()
}

fn pressure(q: f64) -> LoadCondition {
    LoadCondition::new(q).unwrap()
}

fn stress(x: f64, y: f64, z: f64, f: &FoundationGeometry, q: &LoadCondition) -> f64 {
    compute_stress(Point::new(x, y, z), f, q).unwrap()
}

#[test]
fn stress_stays_between_zero_and_q_in_the_bulb() {
    let f = footing(3.0, 2.0);
    let q = pressure(250.0);
    let grid = AnalysisGrid::new(0.05, 8.0, 9).unwrap();
    let bulb = compute_bulb(&grid, &f, &q);

    assert_eq!(bulb.statistics().invalid, 0);
    for sample in bulb.samples() {
        let s = sample.delta_sigma_z.unwrap();
        assert!(s >= 0.0 && s <= 250.0, "Δσz = {} at ({}, {}, {})", s, sample.x, sample.y, sample.z);
        if f.contains(sample.x, sample.y) {
            assert!(s > 0.0);
        }
    }
}

#[test]
fn stress_is_symmetric_about_both_axes() {
    let f = footing(3.0, 1.5);
    let q = pressure(180.0);
    for &(x, y, z) in &[(0.4, 0.2, 0.5), (1.2, 0.9, 2.0), (2.5, 1.7, 4.0)] {
        let s = stress(x, y, z, &f, &q);
        assert_relative_eq!(s, stress(-x, y, z, &f, &q), max_relative = 1e-10);
        assert_relative_eq!(s, stress(x, -y, z, &f, &q), max_relative = 1e-10);
        assert_relative_eq!(s, stress(-x, -y, z, &f, &q), max_relative = 1e-10);
    }
}

#[test]
fn centre_stress_decreases_with_depth() {
    let f = footing(2.0, 2.0);
    let q = pressure(100.0);
    let mut previous = f64::INFINITY;
    for step in 1..=60 {
        let z = 0.1 * step as f64;
        let s = stress(0.0, 0.0, z, &f, &q);
        assert!(s < previous, "not decreasing at z = {}", z);
        previous = s;
    }
}

fn assert_halves_superpose(x: f64, y: f64, z: f64) {
    let whole = rectangle_influence(x, y, z, -2.0, 2.0, -1.0, 1.0);
    let left = rectangle_influence(x, y, z, -2.0, 0.0, -1.0, 1.0);
    let right = rectangle_influence(x, y, z, 0.0, 2.0, -1.0, 1.0);
    assert_relative_eq!(whole, left + right, max_relative = 1e-12);
}

#[test]
fn halves_superpose_to_whole_rectangle() {
    assert_halves_superpose(0.7, 0.3, 1.5);
}

#[test]
fn halves_superpose_on_their_shared_edge() {
    // x = 0 is a side of both halves, so each corner sum has zero-width terms.
    for &(x, y, z) in &[(0.0, 0.3, 1.5), (0.0, 0.0, 0.5), (0.0, 1.0, 2.0), (0.0, 0.5, 1e-4)] {
        assert_halves_superpose(x, y, z);
    }
    // Near the surface the two halves meeting at x = 0 add back to the interior value.
    let near_surface = rectangle_influence(0.0, 0.5, 1e-4, -2.0, 2.0, -1.0, 1.0);
    assert_abs_diff_eq!(near_surface, 1.0, epsilon = 1e-3);
}

#[test]
fn square_centre_matches_tabulated_value() {
    let s = stress(0.0, 0.0, 2.0, &footing(2.0, 2.0), &pressure(100.0));
    assert_abs_diff_eq!(s, 33.61, epsilon = 0.01);
}

#[test]
fn surface_values_follow_contact_limits() {
    let f = footing(2.0, 2.0);
    let q = pressure(100.0);
    assert_abs_diff_eq!(stress(0.0, 0.0, 0.0, &f, &q), 100.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stress(1.0, 0.0, 0.0, &f, &q), 50.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stress(1.0, 1.0, 0.0, &f, &q), 25.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stress(3.0, 0.0, 0.0, &f, &q), 0.0, epsilon = 1e-12);

    let err = compute_stress(Point::new(0.0, 0.0, -0.1), &f, &q).unwrap_err();
    assert_eq!(err.error_code(), "DOMAIN_ERROR");
}

#[test]
fn far_field_approaches_point_load() {
    let f = footing(1.0, 1.0);
    let q = pressure(100.0);
    let z = 20.0;
    let rect = stress(0.0, 0.0, z, &f, &q);
    let point = boussinesq_point_load(100.0 * f.area_m2(), 0.0, 0.0, z);
    assert_relative_eq!(rect, point, max_relative = 5e-3);
}

#[test]
fn undrained_strip_bearing_capacity() {
    let clay = SoilProfile::new(
        SoilInput {
            name: "clay".to_string(),
            unit_weight: 18.0,
            friction_angle: 0.0,
            cohesion: 50.0,
            elastic_modulus: 10_000.0,
            poisson_ratio: None,
        },
        0.3,
    )
    .unwrap();
    let qu = ultimate_bearing_capacity(&clay, &footing(10.0, 1.0), 1.0, FootingShape::Strip).unwrap();
    assert_abs_diff_eq!(qu, 303.62, epsilon = 0.01);
}

#[test]
fn negative_friction_angle_is_rejected_before_solving() {
    let mut request = AnalysisRequest::example();
    request.soil.friction_angle = -5.0;
    let err = analyze(&request, &Settings::default()).unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert!(err.violations().iter().any(|v| v.field == "soil.friction_angle"));
}

#[test]
fn catalog_soil_runs_end_to_end() {
    let db = SoilDatabase::builtin().unwrap();
    let entry = db.lookup("  areia média ").unwrap();
    assert_eq!(entry.name, "Areia Média");

    let mut request = AnalysisRequest::for_catalog_soil(entry, 2.0, 2.0, 150.0);
    request.grid.resolution = 4;
    let outcome = analyze(&request, &Settings::default()).unwrap();
    assert_eq!(outcome.bulb.samples().len(), 64);
    assert!(outcome.settlement.settlement_m > 0.0);

    assert_eq!(db.lookup("Turfa").unwrap_err().error_code(), "NOT_FOUND");
}
