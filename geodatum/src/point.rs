use crate::error::GeoError;
use geo::geometry::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference system a [`Point`]'s coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoordinateSystem {
    /// GPS world geodetic system.
    Wgs84,
    /// China's obfuscated "Mars" coordinates.
    Gcj02,
    /// Baidu coordinates, layered on top of GCJ02.
    Bd09,
    /// China Geodetic Coordinate System 2000.
    Cgcs2000,
    /// Gauss-Krüger plane coordinates on the CGCS2000 ellipsoid.
    GaussKruger(Zone),
}

impl CoordinateSystem {
    /// Returns `true` for systems whose coordinates are degrees of
    /// longitude/latitude.
    pub fn is_geodetic(&self) -> bool {
        !matches!(self, Self::GaussKruger(_))
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wgs84 => f.write_str("WGS84"),
            Self::Gcj02 => f.write_str("GCJ02"),
            Self::Bd09 => f.write_str("BD09"),
            Self::Cgcs2000 => f.write_str("CGCS2000"),
            Self::GaussKruger(zone) => write!(f, "GK({zone})"),
        }
    }
}

/// Gauss-Krüger zone width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ZoneWidth {
    Three,
    Six,
}

impl ZoneWidth {
    /// Width in degrees of longitude.
    pub fn degrees(self) -> f64 {
        match self {
            Self::Three => 3.0,
            Self::Six => 6.0,
        }
    }

    fn max_zone(self) -> u16 {
        match self {
            Self::Three => 120,
            Self::Six => 60,
        }
    }
}

impl fmt::Display for ZoneWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Three => f.write_str("3°"),
            Self::Six => f.write_str("6°"),
        }
    }
}

/// A numbered Gauss-Krüger zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zone {
    number: u16,
    width: ZoneWidth,
}

impl Zone {
    /// Returns zone `number` of `width`, which must be in `1..=120`
    /// for 3° zones and `1..=60` for 6° zones.
    ///
    /// ```
    /// use geodatum::{Zone, ZoneWidth};
    ///
    /// let zone = Zone::new(39, ZoneWidth::Three).unwrap();
    /// assert_eq!(zone.central_meridian(), 117.0);
    /// assert!(Zone::new(61, ZoneWidth::Six).is_err());
    /// ```
    pub fn new(number: u16, width: ZoneWidth) -> Result<Self, GeoError> {
        if (1..=width.max_zone()).contains(&number) {
            Ok(Self { number, width })
        } else {
            Err(GeoError::InvalidZone {
                zone: f64::from(number),
                width,
            })
        }
    }

    /// Returns the zone of `width` enclosing `longitude`.
    ///
    /// 3° zones are centered on multiples of 3°, 6° zones start at
    /// the prime meridian.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn containing(longitude: f64, width: ZoneWidth) -> Self {
        let lon = longitude.rem_euclid(360.0);
        let number = match width {
            ZoneWidth::Three => match (lon / 3.0).round() as u16 {
                0 => 120,
                n => n,
            },
            ZoneWidth::Six => ((lon / 6.0).floor() as u16 + 1).min(60),
        };
        Self { number, width }
    }

    /// 1-based zone number.
    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn width(&self) -> ZoneWidth {
        self.width
    }

    /// Central meridian of this zone in degrees, in `(-180, 180]`.
    pub fn central_meridian(&self) -> f64 {
        let cm = match self.width {
            ZoneWidth::Three => 3.0 * f64::from(self.number),
            ZoneWidth::Six => 6.0 * f64::from(self.number) - 3.0,
        };
        if cm > 180.0 {
            cm - 360.0
        } else {
            cm
        }
    }

    fn from_f64(zone: f64, width: ZoneWidth) -> Result<Self, GeoError> {
        let invalid = || GeoError::InvalidZone { zone, width };
        if zone.fract() != 0.0 || zone < 1.0 || zone > f64::from(width.max_zone()) {
            return Err(invalid());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let number = zone as u16;
        Self::new(number, width)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} zone {}", self.width, self.number)
    }
}

/// A position tagged with its coordinate system.
///
/// For geodetic systems `longitude`/`latitude` are degrees. For
/// [`CoordinateSystem::GaussKruger`] they hold easting/northing in
/// meters, the easting including the 500 km false easting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    longitude: f64,
    latitude: f64,
    altitude: f64,
    system: CoordinateSystem,
}

impl Point {
    /// Returns a validated point with zero altitude.
    ///
    /// Geodetic coordinates are normalized: longitude is wrapped into
    /// `[-180, 180]` and latitude clamped to `[-90, 90]`.
    pub fn new(longitude: f64, latitude: f64, system: CoordinateSystem) -> Result<Self, GeoError> {
        Self::builder(longitude, latitude).system(system).build()
    }

    /// Like [`Point::new`], with an altitude in meters.
    pub fn with_altitude(
        longitude: f64,
        latitude: f64,
        altitude: f64,
        system: CoordinateSystem,
    ) -> Result<Self, GeoError> {
        Self::builder(longitude, latitude)
            .altitude(altitude)
            .system(system)
            .build()
    }

    /// Shorthand for a WGS84 [`Point::new`].
    pub fn wgs84(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        Self::new(longitude, latitude, CoordinateSystem::Wgs84)
    }

    /// Returns a builder for a zero altitude WGS84 point with
    /// autofix enabled.
    ///
    /// ```
    /// use geodatum::{CoordinateSystem, Point};
    ///
    /// let p = Point::builder(190.0, 30.0)
    ///     .altitude(12.5)
    ///     .system(CoordinateSystem::Gcj02)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(p.longitude(), -170.0);
    /// assert_eq!(p.altitude(), 12.5);
    ///
    /// let raw = Point::builder(190.0, 30.0).no_autofix().build().unwrap();
    /// assert_eq!(raw.longitude(), 190.0);
    /// ```
    pub fn builder(longitude: f64, latitude: f64) -> PointBuilder {
        PointBuilder {
            longitude,
            latitude,
            altitude: 0.0,
            system: CoordinateSystem::Wgs84,
            autofix: true,
        }
    }

    /// Returns a Gauss-Krüger point from `[easting, northing, zone]`
    /// with an optional fourth altitude element.
    pub fn gauss_kruger(position: &[f64], width: ZoneWidth) -> Result<Self, GeoError> {
        let (easting, northing, zone) = match position {
            [e, n, z, ..] => (*e, *n, *z),
            _ => {
                return Err(GeoError::PositionTooShort {
                    required: 3,
                    got: position.len(),
                })
            }
        };
        let zone = Zone::from_f64(zone, width)?;
        Self::builder(easting, northing)
            .altitude(position.get(3).copied().unwrap_or(0.0))
            .system(CoordinateSystem::GaussKruger(zone))
            .build()
    }

    /// Longitude in degrees, or easting for Gauss-Krüger points.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees, or northing for Gauss-Krüger points.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Height in meters.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn system(&self) -> CoordinateSystem {
        self.system
    }

    /// Gauss-Krüger easting; the raw longitude slot otherwise.
    pub fn easting(&self) -> f64 {
        self.longitude
    }

    /// Gauss-Krüger northing; the raw latitude slot otherwise.
    pub fn northing(&self) -> f64 {
        self.latitude
    }

    /// Zone of a Gauss-Krüger point.
    pub fn zone(&self) -> Option<Zone> {
        match self.system {
            CoordinateSystem::GaussKruger(zone) => Some(zone),
            _ => None,
        }
    }

    /// Returns a point in `system`, normalizing geodetic coordinates.
    ///
    /// Inputs are expected to be finite; this is only called with
    /// values computed from already validated points.
    pub(crate) fn at(longitude: f64, latitude: f64, altitude: f64, system: CoordinateSystem) -> Self {
        let (longitude, latitude) = if system.is_geodetic() {
            (normalize_longitude(longitude), latitude.clamp(-90.0, 90.0))
        } else {
            (longitude, latitude)
        };
        Self {
            longitude,
            latitude,
            altitude,
            system,
        }
    }

    /// Returns a new point in this point's system.
    pub(crate) fn derive(&self, longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self::at(longitude, latitude, altitude, self.system)
    }
}

impl From<Point> for Coord<f64> {
    fn from(point: Point) -> Self {
        Coord {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        geo::Point(point.into())
    }
}

/// Builder returned by [`Point::builder`].
#[derive(Debug, Clone, Copy)]
pub struct PointBuilder {
    longitude: f64,
    latitude: f64,
    altitude: f64,
    system: CoordinateSystem,
    autofix: bool,
}

impl PointBuilder {
    #[must_use]
    pub fn altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    #[must_use]
    pub fn system(mut self, system: CoordinateSystem) -> Self {
        self.system = system;
        self
    }

    /// Keep longitude/latitude exactly as given.
    #[must_use]
    pub fn no_autofix(mut self) -> Self {
        self.autofix = false;
        self
    }

    /// Validates that every value is finite, then normalizes
    /// geodetic coordinates unless [`no_autofix`](Self::no_autofix)
    /// was called.
    pub fn build(self) -> Result<Point, GeoError> {
        let Self {
            longitude,
            latitude,
            altitude,
            system,
            autofix,
        } = self;
        for (axis, value) in [
            ("longitude", longitude),
            ("latitude", latitude),
            ("altitude", altitude),
        ] {
            if !value.is_finite() {
                return Err(GeoError::NonFinite { axis, value });
            }
        }
        if autofix {
            Ok(Point::at(longitude, latitude, altitude, system))
        } else {
            Ok(Point {
                longitude,
                latitude,
                altitude,
                system,
            })
        }
    }
}

/// Wraps longitude into `[-180, 180]`, keeping `180` as is.
pub(crate) fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0) % 360.0 + if lon < -180.0 || lon == 180.0 { 180.0 } else { -180.0 }
}
