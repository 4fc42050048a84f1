use crate::{
    datum::{self, DEFAULT_MAX_ITERATIONS},
    ellipsoid::Ellipsoid,
    error::GeoError,
    gauss_kruger,
    helmert::{self, HelmertParams},
    point::{CoordinateSystem, Point},
};
use log::trace;

/// Converts points between coordinate systems.
///
/// Supported pairs, in both directions:
///
/// - BD09 ↔ GCJ02
/// - BD09 ↔ WGS84 (through GCJ02)
/// - GCJ02 ↔ WGS84
/// - WGS84 ↔ CGCS2000
/// - CGCS2000 ↔ Gauss-Krüger
///
/// ```
/// use geodatum::{CoordinateSystem, Point, Transformer};
///
/// let bd09 = Transformer::default()
///     .transform(&Point::wgs84(116.404, 39.915)?, CoordinateSystem::Bd09)?;
/// assert_eq!(bd09.system(), CoordinateSystem::Bd09);
/// # Ok::<(), geodatum::GeoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformer {
    helmert: HelmertParams,
    strict: bool,
    max_iterations: usize,
}

impl Default for Transformer {
    fn default() -> Self {
        Self {
            helmert: HelmertParams::WGS84_TO_CGCS2000,
            strict: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Transformer {
    /// Sets the WGS84 → CGCS2000 Helmert parameters.
    #[must_use]
    pub fn with_helmert(mut self, helmert: HelmertParams) -> Self {
        self.helmert = helmert;
        self
    }

    /// Fail with [`GeoError::NotConverged`] instead of returning an
    /// unconverged best estimate.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Caps the datum inversions' iterations.
    #[must_use]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Converts `point` to `to`.
    ///
    /// Same-system conversions return `point` unchanged. Pairs other
    /// than those listed on [`Transformer`] fail with
    /// [`GeoError::UnsupportedConversion`].
    pub fn transform(&self, point: &Point, to: CoordinateSystem) -> Result<Point, GeoError> {
        use CoordinateSystem::{Bd09, Cgcs2000, Gcj02, GaussKruger, Wgs84};
        let from = point.system();
        trace!("{from} -> {to}");
        match (from, to) {
            _ if from == to => Ok(*point),
            (Bd09, Gcj02) => self.bd09_to_gcj02(point),
            (Gcj02, Bd09) => Ok(datum::gcj02_to_bd09(point)),
            (Bd09, Wgs84) => self.gcj02_to_wgs84(&self.bd09_to_gcj02(point)?),
            (Wgs84, Bd09) => Ok(datum::gcj02_to_bd09(&datum::wgs84_to_gcj02(point))),
            (Gcj02, Wgs84) => self.gcj02_to_wgs84(point),
            (Wgs84, Gcj02) => Ok(datum::wgs84_to_gcj02(point)),
            (Wgs84, Cgcs2000) => helmert::transform(
                point,
                &Ellipsoid::WGS84,
                &Ellipsoid::CGCS2000,
                &self.helmert,
                Cgcs2000,
            )
            .accept("ecef_to_geodetic", self.strict),
            (Cgcs2000, Wgs84) => helmert::transform(
                point,
                &Ellipsoid::CGCS2000,
                &Ellipsoid::WGS84,
                &self.helmert.inverse(),
                Wgs84,
            )
            .accept("ecef_to_geodetic", self.strict),
            (Cgcs2000, GaussKruger(zone)) => gauss_kruger::project_onto(point, zone),
            (GaussKruger(_), Cgcs2000) => {
                gauss_kruger::unproject(point)?.accept("gauss_kruger_footpoint", self.strict)
            }
            _ => Err(GeoError::UnsupportedConversion { from, to }),
        }
    }
}

/// Private API
impl Transformer {
    fn bd09_to_gcj02(&self, point: &Point) -> Result<Point, GeoError> {
        datum::bd09_to_gcj02(point, self.max_iterations).accept("bd09_to_gcj02", self.strict)
    }

    fn gcj02_to_wgs84(&self, point: &Point) -> Result<Point, GeoError> {
        datum::gcj02_to_wgs84(point, self.max_iterations).accept("gcj02_to_wgs84", self.strict)
    }
}

/// Converts `point` to `to` with default settings.
pub fn transform(point: &Point, to: CoordinateSystem) -> Result<Point, GeoError> {
    Transformer::default().transform(point, to)
}

impl Point {
    /// Shorthand for [`transform`].
    pub fn transform(&self, to: CoordinateSystem) -> Result<Point, GeoError> {
        transform(self, to)
    }
}
