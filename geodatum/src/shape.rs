use crate::{error::GeoError, point::Point};
use geo::{
    geometry::{Coord, LineString as GeoLineString, Polygon as GeoPolygon},
    polygon,
};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineString(Vec<Point>);

impl LineString {
    /// Returns a line through `points`, in order.
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn push(&mut self, point: Point) {
        self.0.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&Point, &Point)> + '_ {
        self.0.iter().tuple_windows()
    }
}

impl From<Vec<Point>> for LineString {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for LineString {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&LineString> for GeoLineString<f64> {
    fn from(line: &LineString) -> Self {
        line.0.iter().copied().map(Coord::from).collect()
    }
}

/// How [`Polygon`] normalizes its ring at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RingClosure {
    /// Append the first point to an open ring.
    #[default]
    Close,
    /// Drop a duplicate closing point.
    Trim,
}

/// A single ring of at least three distinct points.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<Point>,
}

impl Polygon {
    /// Returns a closed polygon.
    pub fn new(points: Vec<Point>) -> Result<Self, GeoError> {
        Self::with_closure(points, RingClosure::Close)
    }

    /// Returns a polygon, closing or trimming `ring` per `closure`.
    ///
    /// Fails with [`GeoError::RingTooShort`] for fewer than three
    /// distinct points.
    pub fn with_closure(mut ring: Vec<Point>, closure: RingClosure) -> Result<Self, GeoError> {
        let closed = ring.len() > 1 && ring.first() == ring.last();
        let distinct = if closed { ring.len() - 1 } else { ring.len() };
        if distinct < 3 {
            return Err(GeoError::RingTooShort(distinct));
        }
        match (closure, closed) {
            (RingClosure::Close, false) => {
                let first = ring[0];
                ring.push(first);
            }
            (RingClosure::Trim, true) => {
                ring.pop();
            }
            _ => (),
        }
        Ok(Self { ring })
    }

    /// The ring as stored, including the closing point if any.
    pub fn points(&self) -> &[Point] {
        &self.ring
    }

    pub fn is_closed(&self) -> bool {
        self.ring.first() == self.ring.last()
    }

    /// Returns every edge of the ring, including the closing edge of
    /// a trimmed ring.
    pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> + '_ {
        let closing = if self.is_closed() {
            None
        } else {
            self.ring.last().zip(self.ring.first())
        };
        self.ring.iter().tuple_windows().chain(closing)
    }
}

impl From<&Polygon> for GeoPolygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let exterior = polygon.ring.iter().copied().map(Coord::from).collect();
        GeoPolygon::new(exterior, vec![])
    }
}

/// Longitude/latitude bounds around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangePoint {
    pub max_longitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub altitude: f64,
}

impl RangePoint {
    /// Returns `true` if `point` lies within these bounds, edges
    /// included.
    pub fn contains(&self, point: &Point) -> bool {
        (self.min_longitude..=self.max_longitude).contains(&point.longitude())
            && (self.min_latitude..=self.max_latitude).contains(&point.latitude())
    }

    /// Returns these bounds as a closed rectangle.
    pub fn polygon(&self) -> GeoPolygon<f64> {
        let (w, s, e, n) = (
            self.min_longitude,
            self.min_latitude,
            self.max_longitude,
            self.max_latitude,
        );
        polygon![
            (x: w, y: s),
            (x: e, y: s),
            (x: e, y: n),
            (x: w, y: n),
            (x: w, y: s),
        ]
    }
}
