//! Spherical measurement over [`Point`]s.
//!
//! Everything here treats the Earth as a sphere of caller supplied
//! radius.

use crate::{
    point::Point,
    shape::{LineString, Polygon, RangePoint},
};
use std::f64::consts::PI;

/// WGS84 semi-major axis, used as a spherical radius.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Spherical radius used by Baidu's map APIs.
pub const BD_EARTH_RADIUS: f64 = 6_370_996.81;

/// IUGG mean Earth radius.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Cardinal direction for [`point_panning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Corner of a [`RangePoint`] for [`point_location_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

/// Great-circle (haversine) distance in meters.
///
/// Differing altitudes are combined with the surface distance in
/// quadrature.
pub fn distance(p1: &Point, p2: &Point, radius: f64) -> f64 {
    let (lat1, lat2) = (p1.latitude().to_radians(), p2.latitude().to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (p2.longitude() - p1.longitude()).to_radians();
    let h = ((1.0 - d_lat.cos() + (1.0 - d_lon.cos()) * lat1.cos() * lat2.cos()) / 2.0).clamp(0.0, 1.0);
    let surface = 2.0 * radius * h.sqrt().asin();
    let d_alt = p2.altitude() - p1.altitude();
    if d_alt == 0.0 {
        surface
    } else {
        surface.hypot(d_alt)
    }
}

/// Initial bearing from `p1` to `p2` in degrees, in `[0, 360)`.
pub fn bearing(p1: &Point, p2: &Point) -> f64 {
    let (lat1, lat2) = (p1.latitude().to_radians(), p2.latitude().to_radians());
    let d_lon = (p2.longitude() - p1.longitude()).to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let bearing = y.atan2(x).to_degrees();
    if bearing < 0.0 {
        // Guard against -0.0 + 360.0 rounding up to 360.
        (bearing + 360.0) % 360.0
    } else {
        bearing
    }
}

/// Returns the point on segment `a`-`b` closest to `point`.
///
/// (longitude, latitude, altitude) is treated as a flat orthonormal
/// space, which only holds locally. The result keeps `point`'s
/// coordinate system.
pub fn closest_on_segment(point: &Point, a: &Point, b: &Point) -> Point {
    let d = [
        b.longitude() - a.longitude(),
        b.latitude() - a.latitude(),
        b.altitude() - a.altitude(),
    ];
    let v = [
        point.longitude() - a.longitude(),
        point.latitude() - a.latitude(),
        point.altitude() - a.altitude(),
    ];
    let len2 = dot(d, d);
    let t = if len2 == 0.0 { 0.0 } else { dot(d, v) / len2 };
    if t <= 0.0 {
        point.derive(a.longitude(), a.latitude(), a.altitude())
    } else if t >= 1.0 {
        point.derive(b.longitude(), b.latitude(), b.altitude())
    } else {
        point.derive(
            a.longitude() + t * d[0],
            a.latitude() + t * d[1],
            a.altitude() + t * d[2],
        )
    }
}

/// Returns the point on `line` closest to `point`, or `None` if
/// `line` has no segments.
///
/// Candidates are ranked by [`distance`] on a sphere of `radius`,
/// so the result agrees with [`distance_to_line`].
pub fn closest_on_line(point: &Point, line: &LineString, radius: f64) -> Option<Point> {
    line.segments()
        .map(|(a, b)| closest_on_segment(point, a, b))
        .map(|closest| (distance(point, &closest, radius), closest))
        .min_by(|(d1, _), (d2, _)| d1.total_cmp(d2))
        .map(|(_, closest)| closest)
}

/// Distance in meters from `point` to the nearest segment of `line`,
/// or `None` if `line` has no segments.
pub fn distance_to_line(point: &Point, line: &LineString, radius: f64) -> Option<f64> {
    line.segments()
        .map(|(a, b)| distance(point, &closest_on_segment(point, a, b), radius))
        .min_by(f64::total_cmp)
}

/// Total length in meters of `line`.
pub fn line_distance(line: &LineString, radius: f64) -> f64 {
    line.segments().map(|(a, b)| distance(a, b, radius)).sum()
}

/// Approximate area in square meters enclosed by `polygon`.
///
/// Vertices are scaled to meters with a per-vertex `cos(lat)`
/// longitude factor and summed with the shoelace formula. Only
/// suitable for small rings that do not cross the antimeridian.
pub fn ring_area(polygon: &Polygon, radius: f64) -> f64 {
    let k = radius * PI / 180.0;
    let sum: f64 = polygon
        .edges()
        .map(|(p, q)| {
            let (x1, y1) = (p.longitude() * k * p.latitude().to_radians().cos(), p.latitude() * k);
            let (x2, y2) = (q.longitude() * k * q.latitude().to_radians().cos(), q.latitude() * k);
            x1 * y2 - x2 * y1
        })
        .sum();
    0.5 * sum.abs()
}

/// Returns the bounds of a box centered on `point` extending `dist`
/// meters in each direction.
pub fn point_range(point: &Point, dist: f64, radius: f64) -> RangePoint {
    let (d_lon, d_lat) = angular_offsets(point, dist, radius);
    RangePoint {
        max_longitude: point.longitude() + d_lon,
        max_latitude: point.latitude() + d_lat,
        min_longitude: point.longitude() - d_lon,
        min_latitude: point.latitude() - d_lat,
        altitude: point.altitude(),
    }
}

/// Returns the bounds of a `dist` meter square with `point` at its
/// `location` corner.
pub fn point_location_range(point: &Point, dist: f64, location: Location, radius: f64) -> RangePoint {
    let (d_lon, d_lat) = angular_offsets(point, dist, radius);
    let (lon, lat) = (point.longitude(), point.latitude());
    let (west, east) = match location {
        Location::NorthWest | Location::SouthWest => (lon, lon + d_lon),
        Location::NorthEast | Location::SouthEast => (lon - d_lon, lon),
    };
    let (south, north) = match location {
        Location::NorthWest | Location::NorthEast => (lat - d_lat, lat),
        Location::SouthEast | Location::SouthWest => (lat, lat + d_lat),
    };
    RangePoint {
        max_longitude: east,
        max_latitude: north,
        min_longitude: west,
        min_latitude: south,
        altitude: point.altitude(),
    }
}

/// Moves `point` `dist` meters toward `direction`.
///
/// The result is re-normalized, so panning across the antimeridian
/// wraps longitude into `[-180, 180]`.
pub fn point_panning(point: &Point, dist: f64, direction: Direction, radius: f64) -> Point {
    let (d_lon, d_lat) = angular_offsets(point, dist, radius);
    let (lon, lat) = (point.longitude(), point.latitude());
    let (lon, lat) = match direction {
        Direction::Left => (lon - d_lon, lat),
        Direction::Right => (lon + d_lon, lat),
        Direction::Up => (lon, lat + d_lat),
        Direction::Down => (lon, lat - d_lat),
    };
    point.derive(lon, lat, point.altitude())
}

/// Returns the destination `dist` meters from `point` along the great
/// circle with initial `bearing` degrees.
pub fn move_point(point: &Point, dist: f64, bearing: f64, radius: f64) -> Point {
    let delta = dist / radius;
    let lat1 = point.latitude().to_radians();
    let theta = (bearing % 360.0).to_radians();
    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let d_lon = (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
    let lon2 = (point.longitude() + d_lon.to_degrees() + 540.0) % 360.0 - 180.0;
    point.derive(lon2, lat2.to_degrees(), point.altitude())
}

/// Alias of [`move_point`].
pub fn panning(point: &Point, dist: f64, bearing: f64, radius: f64) -> Point {
    move_point(point, dist, bearing, radius)
}

/// Degrees of (longitude, latitude) spanned by `dist` meters at
/// `point`.
fn angular_offsets(point: &Point, dist: f64, radius: f64) -> (f64, f64) {
    let range = 180.0 / PI * dist / radius;
    (range / point.latitude().to_radians().cos(), range)
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::CoordinateSystem;
    use approx::assert_relative_eq;
    use geo::HaversineDistance;

    fn pt(lon: f64, lat: f64) -> Point {
        Point::wgs84(lon, lat).unwrap()
    }

    #[test]
    fn test_distance_one_degree() {
        let (a, b) = (pt(0.0, 0.0), pt(0.0, 1.0));
        assert_relative_eq!(distance(&a, &b, BD_EARTH_RADIUS), 111_194.9, epsilon = 1.0);
        assert_relative_eq!(distance(&a, &b, EARTH_RADIUS), 111_319.49, epsilon = 1e-2);
    }

    #[test]
    fn test_distance_matches_geo_haversine() {
        let (a, b) = (pt(116.404, 39.915), pt(121.47, 31.23));
        let ours = distance(&a, &b, MEAN_EARTH_RADIUS);
        let theirs = geo::Point::from(a).haversine_distance(&geo::Point::from(b));
        assert_relative_eq!(ours, theirs, max_relative = 1e-9);
    }

    #[test]
    fn test_distance_symmetric_and_3d() {
        let a = Point::with_altitude(116.0, 40.0, 0.0, CoordinateSystem::Wgs84).unwrap();
        let b = Point::with_altitude(116.001, 40.0, 100.0, CoordinateSystem::Wgs84).unwrap();
        assert_eq!(distance(&a, &b, EARTH_RADIUS), distance(&b, &a, EARTH_RADIUS));
        let flat = distance(&pt(116.0, 40.0), &pt(116.001, 40.0), EARTH_RADIUS);
        assert_relative_eq!(distance(&a, &b, EARTH_RADIUS), flat.hypot(100.0), epsilon = 1e-9);
    }

    #[test]
    fn test_bearing() {
        let o = pt(0.0, 0.0);
        assert_relative_eq!(bearing(&o, &pt(0.0, 1.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(bearing(&o, &pt(1.0, 0.0)), 90.0, epsilon = 1e-12);
        assert_relative_eq!(bearing(&o, &pt(0.0, -1.0)), 180.0, epsilon = 1e-12);
        assert_relative_eq!(bearing(&o, &pt(-1.0, 0.0)), 270.0, epsilon = 1e-12);
        for (lon, lat) in [(-0.000_001, 10.0), (170.0, -80.0), (-179.0, 0.1)] {
            let b = bearing(&o, &pt(lon, lat));
            assert!((0.0..360.0).contains(&b), "{b}");
        }
    }

    #[test]
    fn test_move_then_distance() {
        let p = pt(116.404, 39.915);
        for (dist, brg) in [(1_000.0, 10.0), (25_000.0, 47.0), (500.0, 200.0), (120_000.0, 359.0)] {
            let q = move_point(&p, dist, brg, EARTH_RADIUS);
            assert_relative_eq!(distance(&p, &q, EARTH_RADIUS), dist, max_relative = 1e-3);
            assert_relative_eq!(bearing(&p, &q), brg, epsilon = 1e-6);
        }
        assert_eq!(panning(&p, 10.0, 90.0, EARTH_RADIUS), move_point(&p, 10.0, 90.0, EARTH_RADIUS));
    }

    #[test]
    fn test_move_wraps_antimeridian() {
        let q = move_point(&pt(179.99, 0.0), 10_000.0, 90.0, EARTH_RADIUS);
        assert!(q.longitude() < -179.0);
    }

    #[test]
    fn test_point_panning_wraps_antimeridian() {
        let p = pt(179.999, 10.0);
        let right = point_panning(&p, 1000.0, Direction::Right, EARTH_RADIUS);
        assert_relative_eq!(right.longitude(), -179.991_878_267_546_44, epsilon = 1e-9);
        assert_eq!(right.latitude(), p.latitude());
        // Still an eastward move of the requested length.
        let east = (right.longitude() - p.longitude() + 540.0) % 360.0 - 180.0;
        assert!(east > 0.0);
        assert_relative_eq!(distance(&p, &right, EARTH_RADIUS), 1000.0, max_relative = 1e-3);

        let left = point_panning(&pt(-179.999, 10.0), 1000.0, Direction::Left, EARTH_RADIUS);
        assert_relative_eq!(left.longitude(), 179.991_878_267_546_44, epsilon = 1e-9);
    }

    #[test]
    fn test_point_panning() {
        let p = Point::with_altitude(116.0, 40.0, 12.0, CoordinateSystem::Gcj02).unwrap();
        let right = point_panning(&p, 1000.0, Direction::Right, EARTH_RADIUS);
        assert!(right.longitude() > p.longitude());
        assert_eq!(right.latitude(), p.latitude());
        assert_eq!(right.altitude(), p.altitude());
        assert_eq!(right.system(), CoordinateSystem::Gcj02);
        assert_relative_eq!(distance(&p, &right, EARTH_RADIUS), 1000.0, max_relative = 1e-3);

        let up = point_panning(&p, 1000.0, Direction::Up, EARTH_RADIUS);
        assert_eq!(up.longitude(), p.longitude());
        assert_relative_eq!(distance(&p, &up, EARTH_RADIUS), 1000.0, max_relative = 1e-9);

        assert!(point_panning(&p, 1000.0, Direction::Left, EARTH_RADIUS).longitude() < p.longitude());
        assert!(point_panning(&p, 1000.0, Direction::Down, EARTH_RADIUS).latitude() < p.latitude());
    }

    #[test]
    fn test_point_range() {
        let p = pt(116.0, 40.0);
        let range = point_range(&p, 1000.0, EARTH_RADIUS);
        assert!(range.contains(&p));
        assert_relative_eq!(
            range.max_latitude - p.latitude(),
            p.latitude() - range.min_latitude,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            (range.max_longitude - range.min_longitude) / (range.max_latitude - range.min_latitude),
            1.0 / 40f64.to_radians().cos(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_point_location_range() {
        let p = pt(116.0, 40.0);
        let nw = point_location_range(&p, 1000.0, Location::NorthWest, EARTH_RADIUS);
        assert_eq!((nw.min_longitude, nw.max_latitude), (116.0, 40.0));
        let ne = point_location_range(&p, 1000.0, Location::NorthEast, EARTH_RADIUS);
        assert_eq!((ne.max_longitude, ne.max_latitude), (116.0, 40.0));
        let se = point_location_range(&p, 1000.0, Location::SouthEast, EARTH_RADIUS);
        assert_eq!((se.max_longitude, se.min_latitude), (116.0, 40.0));
        let sw = point_location_range(&p, 1000.0, Location::SouthWest, EARTH_RADIUS);
        assert_eq!((sw.min_longitude, sw.min_latitude), (116.0, 40.0));
        let side = distance(&pt(sw.min_longitude, sw.min_latitude), &pt(sw.min_longitude, sw.max_latitude), EARTH_RADIUS);
        assert_relative_eq!(side, 1000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_closest_on_segment() {
        let (a, b) = (pt(0.0, 0.0), pt(2.0, 0.0));
        let c = closest_on_segment(&pt(1.0, 1.0), &a, &b);
        assert_eq!((c.longitude(), c.latitude()), (1.0, 0.0));
        let c = closest_on_segment(&pt(-1.0, 1.0), &a, &b);
        assert_eq!((c.longitude(), c.latitude()), (0.0, 0.0));
        let c = closest_on_segment(&pt(3.0, -1.0), &a, &b);
        assert_eq!((c.longitude(), c.latitude()), (2.0, 0.0));
        // Zero length segment.
        let c = closest_on_segment(&pt(3.0, -1.0), &b, &b);
        assert_eq!((c.longitude(), c.latitude()), (2.0, 0.0));
    }

    #[test]
    fn test_closest_on_segment_interpolates_altitude() {
        let a = Point::with_altitude(0.0, 0.0, 0.0, CoordinateSystem::Wgs84).unwrap();
        let b = Point::with_altitude(2.0, 0.0, 10.0, CoordinateSystem::Wgs84).unwrap();
        let p = Point::with_altitude(1.0, 0.0, 5.0, CoordinateSystem::Bd09).unwrap();
        let c = closest_on_segment(&p, &a, &b);
        assert_relative_eq!(c.altitude(), 5.0, epsilon = 1e-9);
        assert_eq!(c.system(), CoordinateSystem::Bd09);
    }

    #[test]
    fn test_closest_on_line_and_distance() {
        let line: LineString = [pt(0.0, 0.0), pt(0.0, 1.0), pt(1.0, 1.0)].into_iter().collect();
        let p = pt(0.5, 1.2);
        let c = closest_on_line(&p, &line, EARTH_RADIUS).unwrap();
        assert_relative_eq!(c.longitude(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(c.latitude(), 1.0, epsilon = 1e-12);
        let d = distance_to_line(&p, &line, EARTH_RADIUS).unwrap();
        assert_relative_eq!(d, distance(&p, &c, EARTH_RADIUS), epsilon = 1e-9);

        let single: LineString = [pt(0.0, 0.0)].into_iter().collect();
        assert_eq!(closest_on_line(&p, &single, EARTH_RADIUS), None);
        assert_eq!(distance_to_line(&p, &single, EARTH_RADIUS), None);
    }

    #[test]
    fn test_closest_on_line_depends_on_radius() {
        let at = |lon, lat, alt| Point::with_altitude(lon, lat, alt, CoordinateSystem::Wgs84).unwrap();
        // A ground level segment 1° north, and a raised one 0.5° south.
        let line = LineString::new(vec![
            at(-1.0, 1.0, 0.0),
            at(1.0, 1.0, 0.0),
            at(1.0, -0.5, 1000.0),
            at(-1.0, -0.5, 1000.0),
        ]);
        let p = pt(0.0, 0.0);
        for (radius, lat) in [(EARTH_RADIUS, -0.5), (1000.0, 1.0)] {
            let c = closest_on_line(&p, &line, radius).unwrap();
            assert_relative_eq!(c.longitude(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(c.latitude(), lat, epsilon = 1e-12);
            assert_relative_eq!(
                distance_to_line(&p, &line, radius).unwrap(),
                distance(&p, &c, radius),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_line_distance() {
        let line: LineString = [pt(0.0, 0.0), pt(0.0, 1.0), pt(0.0, 2.0)].into_iter().collect();
        assert_relative_eq!(
            line_distance(&line, EARTH_RADIUS),
            2.0 * EARTH_RADIUS * PI / 180.0,
            max_relative = 1e-9
        );
        assert_eq!(line_distance(&LineString::default(), EARTH_RADIUS), 0.0);
    }

    #[test]
    fn test_ring_area() {
        let square = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
        let k = EARTH_RADIUS * PI / 180.0;
        let closed = Polygon::new(square.clone()).unwrap();
        assert_relative_eq!(ring_area(&closed, EARTH_RADIUS), k * k, max_relative = 1e-3);
        // Orientation and closure policy don't matter.
        let mut reversed = square.clone();
        reversed.reverse();
        let trimmed = Polygon::with_closure(reversed, crate::shape::RingClosure::Trim).unwrap();
        assert_relative_eq!(
            ring_area(&trimmed, EARTH_RADIUS),
            ring_area(&closed, EARTH_RADIUS),
            max_relative = 1e-12
        );
    }
}
