//! WGS84 / GCJ02 / BD09 conversions.
//!
//! GCJ02 is WGS84 plus an empirical polynomial distortion, applied
//! only inside mainland China's bounding box. BD09 is GCJ02 plus a
//! further polar offset. Only the WGS84 → GCJ02 and GCJ02 → BD09
//! directions have closed forms; the reverse directions are solved
//! with [`solve::invert`](crate::solve).
//!
//! # References
//!
//! 1. [eviltransform](https://github.com/googollee/eviltransform)

use crate::{
    ellipsoid::Ellipsoid,
    point::{CoordinateSystem, Point},
    solve::{self, Estimate},
};
use std::f64::consts::PI;

const X_PI: f64 = PI * 3000.0 / 180.0;

/// Longitude/latitude offsets between BD09 and GCJ02 origins.
const BD_OFFSET: (f64, f64) = (0.0065, 0.006);

/// Tolerance, in degrees, of GCJ02 → WGS84 inversion.
pub const GCJ02_TOLERANCE: f64 = 1e-7;

/// Tolerance, in degrees of (longitude, latitude), of BD09 → GCJ02
/// inversion.
pub const BD09_TOLERANCE: (f64, f64) = (1e-9, 1e-10);

/// Default iteration cap of the fixed-point inversions.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Margin in degrees around China's bounding box beyond which no
/// GCJ02 image of a point inside the box can land.
const WARP_MARGIN: f64 = 0.1;

/// Returns `true` if (`lon`, `lat`) is within the region GCJ02
/// distorts.
pub fn in_china(lon: f64, lat: f64) -> bool {
    near_china(lon, lat, 0.0)
}

/// WGS84 → GCJ02. The identity outside China.
pub fn wgs84_to_gcj02(point: &Point) -> Point {
    let (lon, lat) = warp(point.longitude(), point.latitude());
    Point::at(lon, lat, point.altitude(), CoordinateSystem::Gcj02)
}

/// GCJ02 → WGS84, inverting [`wgs84_to_gcj02`].
///
/// The polynomial warp is inverted without the bounding box guard.
/// Only a solution outside the box makes the point its own preimage.
pub fn gcj02_to_wgs84(point: &Point, max_iterations: usize) -> Estimate<Point> {
    let target = (point.longitude(), point.latitude());
    let to_wgs84 = |(lon, lat): (f64, f64)| Point::at(lon, lat, point.altitude(), CoordinateSystem::Wgs84);
    if !near_china(target.0, target.1, WARP_MARGIN) {
        return Estimate::exact(to_wgs84(target));
    }
    let est = solve::invert(
        polynomial_warp,
        target,
        target,
        (GCJ02_TOLERANCE, GCJ02_TOLERANCE),
        max_iterations,
    );
    let (lon, lat) = est.value;
    if near_china(lon, lat, GCJ02_TOLERANCE) {
        est.map(to_wgs84)
    } else {
        Estimate::exact(to_wgs84(target))
    }
}

/// GCJ02 → BD09.
pub fn gcj02_to_bd09(point: &Point) -> Point {
    let (lon, lat) = to_bd09(point.longitude(), point.latitude());
    Point::at(lon, lat, point.altitude(), CoordinateSystem::Bd09)
}

/// BD09 → GCJ02, inverting [`gcj02_to_bd09`].
///
/// The customary closed-form approximation seeds the iteration.
pub fn bd09_to_gcj02(point: &Point, max_iterations: usize) -> Estimate<Point> {
    let target = (point.longitude(), point.latitude());
    solve::invert(
        to_bd09,
        target,
        from_bd09_approx(target.0, target.1),
        BD09_TOLERANCE,
        max_iterations,
    )
    .map(|(lon, lat)| Point::at(lon, lat, point.altitude(), CoordinateSystem::Gcj02))
}

/// China's bounding box grown by `margin` degrees on every side.
fn near_china(lon: f64, lat: f64, margin: f64) -> bool {
    (72.004 - margin..=137.8347 + margin).contains(&lon)
        && (0.8293 - margin..=55.8271 + margin).contains(&lat)
}

fn warp(lon: f64, lat: f64) -> (f64, f64) {
    if in_china(lon, lat) {
        polynomial_warp(lon, lat)
    } else {
        (lon, lat)
    }
}

fn polynomial_warp(lon: f64, lat: f64) -> (f64, f64) {
    let ell = Ellipsoid::KRASOVSKY;
    let (x, y) = (lon - 105.0, lat - 35.0);
    let rad_lat = lat.to_radians();
    let d_lon = (warp_lon(x, y) / (ell.prime_vertical_radius(rad_lat) * rad_lat.cos())).to_degrees();
    let d_lat = (warp_lat(x, y) / ell.meridian_radius(rad_lat)).to_degrees();
    (lon + d_lon, lat + d_lat)
}

fn warp_lon(x: f64, y: f64) -> f64 {
    300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt()
        + harmonic(20.0, 6.0 * x, 20.0, 2.0 * x)
        + harmonic(20.0, x, 40.0, x / 3.0)
        + harmonic(150.0, x / 12.0, 300.0, x / 30.0)
}

fn warp_lat(x: f64, y: f64) -> f64 {
    -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt()
        + harmonic(20.0, 6.0 * x, 20.0, 2.0 * x)
        + harmonic(20.0, y, 40.0, y / 3.0)
        + harmonic(160.0, y / 12.0, 320.0, y / 30.0)
}

/// `2/3 (a sin(pπ) + b sin(qπ))`
fn harmonic(a: f64, p: f64, b: f64, q: f64) -> f64 {
    2.0 * (a * (p * PI).sin() + b * (q * PI).sin()) / 3.0
}

fn to_bd09(lon: f64, lat: f64) -> (f64, f64) {
    let z = lon.hypot(lat) + 0.00002 * (lat * X_PI).sin();
    let theta = lat.atan2(lon) + 0.000_003 * (lon * X_PI).cos();
    (z * theta.cos() + BD_OFFSET.0, z * theta.sin() + BD_OFFSET.1)
}

fn from_bd09_approx(lon: f64, lat: f64) -> (f64, f64) {
    let (x, y) = (lon - BD_OFFSET.0, lat - BD_OFFSET.1);
    let z = x.hypot(y) - 0.00002 * (y * X_PI).sin();
    let theta = y.atan2(x) - 0.000_003 * (x * X_PI).cos();
    (z * theta.cos(), z * theta.sin())
}
