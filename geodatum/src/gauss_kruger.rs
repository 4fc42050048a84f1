//! Gauss-Krüger (zoned transverse Mercator) projection on the
//! CGCS2000 ellipsoid.
//!
//! Uses the classic series expansions in the longitude difference
//! from the zone's central meridian, which are sub-millimeter
//! accurate within a 3° or 6° zone.
//!
//! # References
//!
//! 1. GB/T 17278-2009, Specifications for 1:5000 and 1:10000 topographic maps
//! 1. 孔祥元, 郭际明. 控制测量学 (下册). 武汉大学出版社, 2006.

use crate::{
    ellipsoid::{Ellipsoid, LATITUDE_MAX_ITERATIONS, LATITUDE_TOLERANCE},
    error::GeoError,
    point::{CoordinateSystem, Point, Zone, ZoneWidth},
    solve::Estimate,
};

/// False easting in meters.
pub const FALSE_EASTING: f64 = 500_000.0;

const ELLIPSOID: Ellipsoid = Ellipsoid::CGCS2000;

/// Coefficients of the meridian arc series.
struct ArcSeries {
    a0: f64,
    a2: f64,
    a4: f64,
    a6: f64,
    a8: f64,
    /// `a (1 - e²)`
    scale: f64,
}

impl ArcSeries {
    fn new(ell: &Ellipsoid) -> Self {
        let e2 = ell.e2();
        let (e4, e6, e8) = (e2 * e2, e2.powi(3), e2.powi(4));
        Self {
            a0: 1.0 + 3.0 / 4.0 * e2 + 45.0 / 64.0 * e4 + 175.0 / 256.0 * e6
                + 11025.0 / 16384.0 * e8,
            a2: 3.0 / 4.0 * e2 + 15.0 / 16.0 * e4 + 525.0 / 512.0 * e6 + 2205.0 / 2048.0 * e8,
            a4: 15.0 / 64.0 * e4 + 105.0 / 256.0 * e6 + 2205.0 / 4096.0 * e8,
            a6: 35.0 / 512.0 * e6 + 315.0 / 2048.0 * e8,
            a8: 315.0 / 16384.0 * e8,
            scale: ell.a * (1.0 - e2),
        }
    }

    /// Meridian arc length from the equator to latitude `b`
    /// (radians).
    fn length(&self, b: f64) -> f64 {
        self.scale
            * (self.a0 * b - self.a2 / 2.0 * (2.0 * b).sin() + self.a4 / 4.0 * (4.0 * b).sin()
                - self.a6 / 6.0 * (6.0 * b).sin()
                + self.a8 / 8.0 * (8.0 * b).sin())
    }

    /// Latitude whose meridian arc length is `x`.
    fn footpoint(&self, ell: &Ellipsoid, x: f64) -> Estimate<f64> {
        let mut b = x / (self.scale * self.a0);
        let mut residual = f64::INFINITY;
        for iteration in 1..=LATITUDE_MAX_ITERATIONS {
            let step = (x - self.length(b)) / ell.meridian_radius(b);
            b += step;
            residual = step.abs();
            if residual < LATITUDE_TOLERANCE {
                return Estimate::converged(b, iteration, residual);
            }
        }
        Estimate::exhausted(b, LATITUDE_MAX_ITERATIONS, residual)
    }
}

/// Projects a CGCS2000 point into the `width` zone enclosing it.
pub fn project(point: &Point, width: ZoneWidth) -> Result<Point, GeoError> {
    project_onto(point, Zone::containing(point.longitude(), width))
}

/// Projects a CGCS2000 point onto `zone`.
///
/// `zone` need not contain the point, but accuracy degrades with
/// distance from its central meridian.
pub fn project_onto(point: &Point, zone: Zone) -> Result<Point, GeoError> {
    let to = CoordinateSystem::GaussKruger(zone);
    if point.system() != CoordinateSystem::Cgcs2000 {
        return Err(GeoError::UnsupportedConversion {
            from: point.system(),
            to,
        });
    }

    let ell = ELLIPSOID;
    let b = point.latitude().to_radians();
    let l = longitude_difference(point.longitude(), zone.central_meridian()).to_radians();

    let (sin_b, cos_b) = b.sin_cos();
    let t = sin_b / cos_b;
    let t2 = t * t;
    let eta2 = ell.ep2() * cos_b * cos_b;
    let n = ell.prime_vertical_radius(b);
    let lc = l * cos_b;
    let lc2 = lc * lc;

    let northing = ArcSeries::new(&ell).length(b)
        + n * t * lc2 / 2.0
            * (1.0
                + lc2 / 12.0 * (5.0 - t2 + 9.0 * eta2 + 4.0 * eta2 * eta2)
                + lc2 * lc2 / 360.0 * (61.0 - 58.0 * t2 + t2 * t2));
    let easting = n
        * lc
        * (1.0
            + lc2 / 6.0 * (1.0 - t2 + eta2)
            + lc2 * lc2 / 120.0 * (5.0 - 18.0 * t2 + t2 * t2 + 14.0 * eta2 - 58.0 * eta2 * t2));

    Ok(Point::at(
        easting + FALSE_EASTING,
        northing,
        point.altitude(),
        to,
    ))
}

/// Recovers the CGCS2000 point of a Gauss-Krüger point.
pub fn unproject(point: &Point) -> Result<Estimate<Point>, GeoError> {
    let zone = point.zone().ok_or(GeoError::UnsupportedConversion {
        from: point.system(),
        to: CoordinateSystem::Cgcs2000,
    })?;

    let ell = ELLIPSOID;
    let y = point.easting() - FALSE_EASTING;
    let footpoint = ArcSeries::new(&ell).footpoint(&ell, point.northing());

    Ok(footpoint.map(|bf| {
        let (sin_bf, cos_bf) = bf.sin_cos();
        let t = sin_bf / cos_bf;
        let t2 = t * t;
        let eta2 = ell.ep2() * cos_bf * cos_bf;
        let n = ell.prime_vertical_radius(bf);
        let m = ell.meridian_radius(bf);
        let yn = y / n;
        let yn2 = yn * yn;

        let lat = bf
            - t * y * yn / (2.0 * m)
                * (1.0
                    - yn2 / 12.0 * (5.0 + 3.0 * t2 + eta2 - 9.0 * eta2 * t2)
                    + yn2 * yn2 / 360.0 * (61.0 + 90.0 * t2 + 45.0 * t2 * t2));
        let l = yn / cos_bf
            * (1.0 - yn2 / 6.0 * (1.0 + 2.0 * t2 + eta2)
                + yn2 * yn2 / 120.0
                    * (5.0 + 28.0 * t2 + 24.0 * t2 * t2 + 6.0 * eta2 + 8.0 * eta2 * t2));

        Point::at(
            zone.central_meridian() + l.to_degrees(),
            lat.to_degrees(),
            point.altitude(),
            CoordinateSystem::Cgcs2000,
        )
    }))
}

/// `lon - central`, wrapped into `[-180, 180)`.
fn longitude_difference(lon: f64, central: f64) -> f64 {
    (lon - central + 540.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cgcs2000(lon: f64, lat: f64) -> Point {
        Point::new(lon, lat, CoordinateSystem::Cgcs2000).unwrap()
    }

    #[test]
    fn test_meridian_arc() {
        let arc = ArcSeries::new(&Ellipsoid::CGCS2000);
        assert_eq!(arc.length(0.0), 0.0);
        assert_relative_eq!(arc.length(45f64.to_radians()), 4_984_944.378, epsilon = 1e-3);
    }

    #[test]
    fn test_forward_beijing() {
        let gk = project(&cgcs2000(116.404, 39.915), ZoneWidth::Three).unwrap();
        let zone = gk.zone().unwrap();
        assert_eq!(zone.number(), 39);
        assert_eq!(zone.central_meridian(), 117.0);
        assert_relative_eq!(gk.easting(), 449_042.047, epsilon = 1e-3);
        assert_relative_eq!(gk.northing(), 4_420_261.220, epsilon = 1e-3);
    }

    #[test]
    fn test_central_meridian_has_false_easting() {
        let gk = project(&cgcs2000(117.0, 39.0), ZoneWidth::Six).unwrap();
        assert_eq!(gk.zone().unwrap().number(), 20);
        assert_eq!(gk.easting(), FALSE_EASTING);
        let gk = project(&cgcs2000(117.0, 0.0), ZoneWidth::Three).unwrap();
        assert_eq!((gk.easting(), gk.northing()), (FALSE_EASTING, 0.0));
    }

    #[test]
    fn test_roundtrip() {
        for (lon, lat, width) in [
            (116.404, 39.915, ZoneWidth::Three),
            (118.4, 30.0, ZoneWidth::Three),
            (115.6, 50.0, ZoneWidth::Three),
            (111.0, -30.0, ZoneWidth::Six),
            (-77.0, 38.9, ZoneWidth::Six),
        ] {
            let gk = project(&cgcs2000(lon, lat), width).unwrap();
            let est = unproject(&gk).unwrap();
            assert!(est.converged);
            assert!(est.iterations <= LATITUDE_MAX_ITERATIONS);
            assert_eq!(est.value.system(), CoordinateSystem::Cgcs2000);
            assert_relative_eq!(est.value.longitude(), lon, epsilon = 1e-9);
            assert_relative_eq!(est.value.latitude(), lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_altitude_passes_through() {
        let p = Point::with_altitude(116.0, 40.0, 42.5, CoordinateSystem::Cgcs2000).unwrap();
        let gk = project(&p, ZoneWidth::Six).unwrap();
        assert_eq!(gk.altitude(), 42.5);
        assert_eq!(unproject(&gk).unwrap().value.altitude(), 42.5);
    }

    #[test]
    fn test_rejects_wrong_system() {
        let wgs = Point::wgs84(116.0, 40.0).unwrap();
        assert!(matches!(
            project(&wgs, ZoneWidth::Three),
            Err(GeoError::UnsupportedConversion { .. })
        ));
        assert!(matches!(
            unproject(&wgs),
            Err(GeoError::UnsupportedConversion { .. })
        ));
    }

    #[test]
    fn test_longitude_difference_wraps() {
        assert_eq!(longitude_difference(-179.0, 180.0), 1.0);
        assert_eq!(longitude_difference(179.0, -180.0), -1.0);
        assert_eq!(longitude_difference(116.0, 117.0), -1.0);
    }
}
