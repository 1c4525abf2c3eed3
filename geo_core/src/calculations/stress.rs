//! # Stress Bulb
//!
//! Vertical stress increase Δσz beneath a uniformly loaded rectangular
//! footing (Love's solution evaluated by corner superposition), sampled over
//! a 3D grid to produce the "stress bulb".
//!
//! ## Assumptions
//!
//! - Homogeneous, isotropic, linear-elastic half-space
//! - Flexible footing, uniform contact pressure q
//! - Δσz does not depend on the soil's elastic constants
//!
//! ## Surface (z = 0)
//!
//! The contact-surface limit is returned: q inside the footprint, q/2 on an
//! edge, q/4 at a corner and 0 outside. Negative depths are rejected.
//!
//! ## Example
//!
//! ```rust
//! use geo_core::calculations::stress::{compute_stress, Point};
//! use geo_core::models::{FoundationGeometry, LoadCondition};
//!
//! let footing = FoundationGeometry::new(2.0, 2.0).unwrap();
//! let load = LoadCondition::new(100.0).unwrap();
//!
//! let centre = compute_stress(Point::new(0.0, 0.0, 2.0), &footing, &load).unwrap();
//! assert!((centre - 33.61).abs() < 0.01);
//! ```

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::equations::influence::rectangle_influence;
use crate::errors::{GeoError, GeoResult};
use crate::models::{AnalysisGrid, FoundationGeometry, LoadCondition};

/// Grids with more points than this are evaluated on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// A location in the half-space (m), z positive downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point { x, y, z }
    }
}

/// Δσz at one grid point.
///
/// `delta_sigma_z` is `None` when the point could not be evaluated; `error`
/// then says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Vertical stress increase (kPa)
    pub delta_sigma_z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<GeoError>,
}

impl StressSample {
    fn from_result(point: Point, result: GeoResult<f64>) -> Self {
        let (delta_sigma_z, error) = match result {
            Ok(value) => (Some(value), None),
            Err(err) => (None, Some(err)),
        };
        StressSample {
            x: point.x,
            y: point.y,
            z: point.z,
            delta_sigma_z,
            error,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.delta_sigma_z.is_some()
    }

    /// Δσz as a percentage of the applied pressure
    pub fn influence_pct(&self, applied_pressure: f64) -> Option<f64> {
        self.delta_sigma_z.map(|s| 100.0 * s / applied_pressure)
    }
}

/// Summary over the valid samples of a bulb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulbStatistics {
    pub valid: usize,
    pub invalid: usize,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub mean: Option<f64>,
}

// ============================================================================
// Single point
// ============================================================================

fn check_coordinate(name: &str, value: f64) -> GeoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeoError::domain(name, value, "Coordinate must be finite"))
    }
}

/// Δσz (kPa) at `point` below the loaded footprint.
///
/// # Errors
/// - `Domain` for non-finite coordinates or z < 0
/// - `NumericInstability` if the superposition produces a non-finite value
pub fn compute_stress(point: Point, foundation: &FoundationGeometry, load: &LoadCondition) -> GeoResult<f64> {
    check_coordinate("x", point.x)?;
    check_coordinate("y", point.y)?;
    check_coordinate("z", point.z)?;
    if point.z < 0.0 {
        return Err(GeoError::domain("z", point.z, "Depth cannot be above the ground surface"));
    }

    let (x1, x2, y1, y2) = foundation.bounds();
    let influence = rectangle_influence(point.x, point.y, point.z, x1, x2, y1, y2);
    if !influence.is_finite() {
        return Err(GeoError::numeric_instability(
            point.x,
            point.y,
            point.z,
            "Influence factor is not finite",
        ));
    }

    // Clamp round-off from the signed superposition far from the footprint
    Ok(load.applied_pressure().0 * influence.clamp(0.0, 1.0))
}

// ============================================================================
// Grid evaluation
// ============================================================================

/// Points of `grid` in canonical order: x outermost, then y, then z.
pub fn grid_points(grid: &AnalysisGrid, foundation: &FoundationGeometry) -> Vec<Point> {
    let offsets = grid.lateral_offsets(foundation);
    let depths = grid.depths();
    let mut points = Vec::with_capacity(offsets.len() * offsets.len() * depths.len());
    for &x in &offsets {
        for &y in &offsets {
            for &z in &depths {
                points.push(Point::new(x, y, z));
            }
        }
    }
    points
}

/// Evaluate `eval` at every point, in parallel above `parallel_threshold`.
///
/// Output order matches `points`. A failing point becomes an invalid sample
/// and evaluation continues.
pub(crate) fn evaluate_points<F>(points: &[Point], parallel_threshold: usize, eval: F) -> Vec<StressSample>
where
    F: Fn(Point) -> GeoResult<f64> + Sync,
{
    if points.len() > parallel_threshold {
        points
            .par_iter()
            .map(|&p| StressSample::from_result(p, eval(p)))
            .collect()
    } else {
        points
            .iter()
            .map(|&p| StressSample::from_result(p, eval(p)))
            .collect()
    }
}

/// Evaluate the stress bulb over `grid`.
pub fn compute_bulb(grid: &AnalysisGrid, foundation: &FoundationGeometry, load: &LoadCondition) -> BulbResult {
    compute_bulb_with_threshold(grid, foundation, load, DEFAULT_PARALLEL_THRESHOLD)
}

/// [`compute_bulb`] with an explicit parallelism threshold
pub fn compute_bulb_with_threshold(
    grid: &AnalysisGrid,
    foundation: &FoundationGeometry,
    load: &LoadCondition,
    parallel_threshold: usize,
) -> BulbResult {
    let started = Instant::now();
    let points = grid_points(grid, foundation);
    let parallel = points.len() > parallel_threshold;

    let samples = evaluate_points(&points, parallel_threshold, |p| compute_stress(p, foundation, load));

    let invalid = samples.iter().filter(|s| !s.is_valid()).count();
    if invalid > 0 {
        log::warn!("{} of {} bulb samples could not be evaluated", invalid, samples.len());
    }
    log::debug!(
        "Evaluated {} bulb points ({}) in {:?}",
        samples.len(),
        if parallel { "parallel" } else { "sequential" },
        started.elapsed()
    );

    BulbResult {
        samples,
        offsets: grid.lateral_offsets(foundation),
        depths: grid.depths(),
        applied_pressure: load.applied_pressure().0,
        foundation: *foundation,
        grid: *grid,
    }
}

/// Δσz against depth at a fixed lateral location, over the grid depths.
pub fn profile_at(
    x: f64,
    y: f64,
    grid: &AnalysisGrid,
    foundation: &FoundationGeometry,
    load: &LoadCondition,
) -> GeoResult<Vec<(f64, f64)>> {
    grid.depths()
        .into_iter()
        .map(|z| compute_stress(Point::new(x, y, z), foundation, load).map(|s| (z, s)))
        .collect()
}

/// Depth below the footing centre at which Δσz/q falls to `fraction`.
///
/// The centre profile decreases monotonically from 1 at the surface, so the
/// root is bracketed by doubling and refined by bisection.
pub fn influence_depth(foundation: &FoundationGeometry, fraction: f64) -> GeoResult<f64> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(GeoError::domain("fraction", fraction, "Fraction must be in (0, 1)"));
    }
    let (x1, x2, y1, y2) = foundation.bounds();
    let centre = |z: f64| rectangle_influence(0.0, 0.0, z, x1, x2, y1, y2);

    let mut lo = 0.0;
    let mut hi = foundation.greatest_dimension();
    let mut expansions = 0;
    while centre(hi) > fraction {
        lo = hi;
        hi *= 2.0;
        expansions += 1;
        if expansions > 60 {
            return Err(GeoError::numeric_instability(0.0, 0.0, hi, "Could not bracket influence depth"));
        }
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if centre(mid) > fraction {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-9 {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}

// ============================================================================
// Result
// ============================================================================

/// Evaluated stress bulb.
///
/// Samples are stored in canonical order; sample `(i, j, k)` is at
/// x = `offsets[i]`, y = `offsets[j]`, z = `depths[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulbResult {
    samples: Vec<StressSample>,
    offsets: Vec<f64>,
    depths: Vec<f64>,
    applied_pressure: f64,
    foundation: FoundationGeometry,
    grid: AnalysisGrid,
}

impl BulbResult {
    pub fn samples(&self) -> &[StressSample] {
        &self.samples
    }

    /// Lateral offsets shared by the x and y axes
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// q (kPa)
    pub fn applied_pressure(&self) -> f64 {
        self.applied_pressure
    }

    pub fn foundation(&self) -> &FoundationGeometry {
        &self.foundation
    }

    pub fn grid(&self) -> &AnalysisGrid {
        &self.grid
    }

    /// Sample at grid indices (i, j, k)
    pub fn sample(&self, i: usize, j: usize, k: usize) -> Option<&StressSample> {
        let n = self.offsets.len();
        let nz = self.depths.len();
        if i >= n || j >= n || k >= nz {
            return None;
        }
        self.samples.get((i * n + j) * nz + k)
    }

    /// Counts and extrema over valid samples
    pub fn statistics(&self) -> BulbStatistics {
        let values: Vec<f64> = self.samples.iter().filter_map(|s| s.delta_sigma_z).collect();
        let valid = values.len();
        let (max, min, mean) = if values.is_empty() {
            (None, None, None)
        } else {
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let mean = values.iter().sum::<f64>() / valid as f64;
            (Some(max), Some(min), Some(mean))
        };
        BulbStatistics {
            valid,
            invalid: self.samples.len() - valid,
            max,
            min,
            mean,
        }
    }

    /// Depth profile of the grid column closest to (x, y)
    pub fn profile_nearest(&self, x: f64, y: f64) -> Vec<(f64, Option<f64>)> {
        let (Some(i), Some(j)) = (nearest_index(&self.offsets, x), nearest_index(&self.offsets, y)) else {
            return Vec::new();
        };
        (0..self.depths.len())
            .filter_map(|k| self.sample(i, j, k))
            .map(|s| (s.z, s.delta_sigma_z))
            .collect()
    }
}

fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::influence::boussinesq_point_load;
    use approx::assert_relative_eq;

    fn square() -> (FoundationGeometry, LoadCondition) {
        (FoundationGeometry::new(2.0, 2.0).unwrap(), LoadCondition::new(100.0).unwrap())
    }

    #[test]
    fn test_centre_reference() {
        let (f, q) = square();
        let s = compute_stress(Point::new(0.0, 0.0, 2.0), &f, &q).unwrap();
        assert_relative_eq!(s, 33.61, epsilon = 0.01);
    }

    #[test]
    fn test_corner_reference() {
        let (f, q) = square();
        let s = compute_stress(Point::new(1.0, 1.0, 2.0), &f, &q).unwrap();
        assert_relative_eq!(s, 17.52, epsilon = 0.01);
    }

    #[test]
    fn test_surface_policy() {
        let (f, q) = square();
        assert_eq!(compute_stress(Point::new(0.0, 0.0, 0.0), &f, &q).unwrap(), 100.0);
        assert_eq!(compute_stress(Point::new(1.0, 0.0, 0.0), &f, &q).unwrap(), 50.0);
        assert_eq!(compute_stress(Point::new(1.0, 1.0, 0.0), &f, &q).unwrap(), 25.0);
        assert_eq!(compute_stress(Point::new(3.0, 0.0, 0.0), &f, &q).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_depth_rejected() {
        let (f, q) = square();
        let err = compute_stress(Point::new(0.0, 0.0, -0.5), &f, &q).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let (f, q) = square();
        assert!(compute_stress(Point::new(f64::NAN, 0.0, 1.0), &f, &q).is_err());
        assert!(compute_stress(Point::new(0.0, 0.0, f64::INFINITY), &f, &q).is_err());
    }

    #[test]
    fn test_far_field_matches_point_load() {
        let f = FoundationGeometry::new(1.0, 1.0).unwrap();
        let q = LoadCondition::new(100.0).unwrap();
        let z = 20.0;
        let rect = compute_stress(Point::new(0.0, 0.0, z), &f, &q).unwrap();
        let point = boussinesq_point_load(q.total_load(&f).0, 0.0, 0.0, z);
        assert_relative_eq!(rect, point, max_relative = 0.01);
    }

    #[test]
    fn test_bulb_canonical_order() {
        let (f, q) = square();
        let grid = AnalysisGrid::new(0.5, 3.0, 3).unwrap();
        let bulb = compute_bulb(&grid, &f, &q);
        let s = bulb.samples();
        assert_eq!(s.len(), 27);
        // x outermost, z innermost
        assert_eq!((s[0].x, s[0].y, s[0].z), (-4.0, -4.0, 0.5));
        assert_eq!((s[1].x, s[1].y, s[1].z), (-4.0, -4.0, 1.75));
        assert_eq!((s[3].x, s[3].y, s[3].z), (-4.0, 0.0, 0.5));
        assert_eq!((s[9].x, s[9].y, s[9].z), (0.0, -4.0, 0.5));
        assert_eq!(bulb.sample(1, 1, 2).unwrap().z, 3.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (f, q) = square();
        let grid = AnalysisGrid::new(0.1, 5.0, 12).unwrap();
        let sequential = compute_bulb_with_threshold(&grid, &f, &q, usize::MAX);
        let parallel = compute_bulb_with_threshold(&grid, &f, &q, 0);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_point_error_marks_sample_invalid() {
        let points = vec![Point::new(0.0, 0.0, 1.0), Point::new(0.0, 0.0, 2.0), Point::new(0.0, 0.0, 3.0)];
        let samples = evaluate_points(&points, usize::MAX, |p| {
            if p.z == 2.0 {
                Err(GeoError::numeric_instability(p.x, p.y, p.z, "NaN"))
            } else {
                Ok(p.z)
            }
        });
        assert_eq!(samples.len(), 3);
        assert!(samples[0].is_valid());
        assert_eq!(samples[1].delta_sigma_z, None);
        assert_eq!(samples[1].error.as_ref().map(|e| e.error_code()), Some("NUMERIC_INSTABILITY"));
        assert_eq!(samples[2].delta_sigma_z, Some(3.0));
    }

    #[test]
    fn test_statistics_skip_invalid() {
        let points = vec![Point::new(0.0, 0.0, 1.0), Point::new(0.0, 0.0, 2.0)];
        let samples = evaluate_points(&points, 0, |p| {
            if p.z > 1.5 {
                Err(GeoError::numeric_instability(p.x, p.y, p.z, "overflow"))
            } else {
                Ok(40.0)
            }
        });
        let (f, _) = square();
        let bulb = BulbResult {
            samples,
            offsets: vec![0.0],
            depths: vec![1.0, 2.0],
            applied_pressure: 100.0,
            foundation: f,
            grid: AnalysisGrid::new(1.0, 2.0, 2).unwrap(),
        };
        let stats = bulb.statistics();
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.mean, Some(40.0));
    }

    #[test]
    fn test_profile_at_matches_bulb_column() {
        let (f, q) = square();
        let grid = AnalysisGrid::new(0.2, 4.0, 5).unwrap();
        let bulb = compute_bulb(&grid, &f, &q);
        let profile = profile_at(0.0, 0.0, &grid, &f, &q).unwrap();
        let column = bulb.profile_nearest(0.1, -0.1);
        assert_eq!(profile.len(), column.len());
        for ((z1, s1), (z2, s2)) in profile.iter().zip(column.iter()) {
            assert_eq!(z1, z2);
            assert_eq!(Some(*s1), *s2);
        }
    }

    #[test]
    fn test_influence_depth() {
        let (f, _) = square();
        let z10 = influence_depth(&f, 0.10).unwrap();
        let (x1, x2, y1, y2) = f.bounds();
        assert_relative_eq!(rectangle_influence(0.0, 0.0, z10, x1, x2, y1, y2), 0.10, epsilon = 1e-6);
        let z20 = influence_depth(&f, 0.20).unwrap();
        assert!(z20 < z10);
        assert!(influence_depth(&f, 1.0).is_err());
    }
}
