//! Seven-parameter Helmert similarity transform.

use crate::{
    ellipsoid::Ellipsoid,
    point::{CoordinateSystem, Point},
    solve::Estimate,
};

const ARCSEC: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Helmert parameters in the position vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmertParams {
    /// Translation along X in meters.
    pub tx: f64,
    /// Translation along Y in meters.
    pub ty: f64,
    /// Translation along Z in meters.
    pub tz: f64,
    /// Scale difference in parts per million.
    pub scale_ppm: f64,
    /// Rotation about X in arc-seconds.
    pub rx: f64,
    /// Rotation about Y in arc-seconds.
    pub ry: f64,
    /// Rotation about Z in arc-seconds.
    pub rz: f64,
}

impl HelmertParams {
    /// No shift, rotation or scale.
    pub const IDENTITY: Self = Self {
        tx: 0.0,
        ty: 0.0,
        tz: 0.0,
        scale_ppm: 0.0,
        rx: 0.0,
        ry: 0.0,
        rz: 0.0,
    };

    /// WGS84 (G1762) to CGCS2000.
    ///
    /// Both frames are realizations of ITRF and agree to a few
    /// centimeters, so only the ellipsoid changes.
    pub const WGS84_TO_CGCS2000: Self = Self::IDENTITY;

    /// Returns the small-angle reverse transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            tx: -self.tx,
            ty: -self.ty,
            tz: -self.tz,
            scale_ppm: -self.scale_ppm,
            rx: -self.rx,
            ry: -self.ry,
            rz: -self.rz,
        }
    }

    /// Applies this transform to an ECEF position.
    pub fn apply(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let s = 1.0 + self.scale_ppm * 1e-6;
        let (rx, ry, rz) = (self.rx * ARCSEC, self.ry * ARCSEC, self.rz * ARCSEC);
        [
            self.tx + s * (x - rz * y + ry * z),
            self.ty + s * (rz * x + y - rx * z),
            self.tz + s * (-ry * x + rx * y + z),
        ]
    }
}

impl Default for HelmertParams {
    fn default() -> Self {
        Self::WGS84_TO_CGCS2000
    }
}

/// Moves `point` from the `from` ellipsoid's frame to the `to`
/// ellipsoid's frame, tagging the result with `system`.
pub fn transform(
    point: &Point,
    from: &Ellipsoid,
    to: &Ellipsoid,
    params: &HelmertParams,
    system: CoordinateSystem,
) -> Estimate<Point> {
    let ecef = from.to_ecef(
        point.latitude().to_radians(),
        point.longitude().to_radians(),
        point.altitude(),
    );
    to.from_ecef(params.apply(ecef))
        .map(|(lat, lon, h)| Point::at(lon.to_degrees(), lat.to_degrees(), h, system))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_is_noop() {
        let xyz = [-2_178_000.0, 4_388_000.0, 4_070_000.0];
        assert_eq!(HelmertParams::IDENTITY.apply(xyz), xyz);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let params = HelmertParams {
            tx: -0.991,
            ty: 1.9072,
            tz: 0.5129,
            scale_ppm: 0.0,
            rx: 0.025_79,
            ry: 0.009_65,
            rz: 0.011_66,
        };
        let xyz = [-2_178_000.0, 4_388_000.0, 4_070_000.0];
        let back = params.inverse().apply(params.apply(xyz));
        // Small-angle inverse; error is second order in the rotation.
        for (a, b) in back.iter().zip(xyz) {
            assert_relative_eq!(*a, b, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_translation_and_scale() {
        let params = HelmertParams {
            tx: 1.0,
            ty: -2.0,
            tz: 3.0,
            scale_ppm: 1.0,
            ..HelmertParams::IDENTITY
        };
        let [x, y, z] = params.apply([1e6, 0.0, 0.0]);
        assert_relative_eq!(x, 1e6 + 1.0 + 1.0, epsilon = 1e-9);
        assert_relative_eq!(y, -2.0, epsilon = 1e-9);
        assert_relative_eq!(z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wgs84_to_cgcs2000() {
        let p = Point::with_altitude(116.404, 39.915, 50.0, CoordinateSystem::Wgs84).unwrap();
        let est = transform(
            &p,
            &Ellipsoid::WGS84,
            &Ellipsoid::CGCS2000,
            &HelmertParams::WGS84_TO_CGCS2000,
            CoordinateSystem::Cgcs2000,
        );
        assert!(est.converged);
        let q = est.value;
        assert_eq!(q.system(), CoordinateSystem::Cgcs2000);
        assert_relative_eq!(q.longitude(), p.longitude(), epsilon = 1e-12);
        assert_relative_eq!(q.latitude(), p.latitude(), epsilon = 1e-8);
        assert_relative_eq!(q.altitude(), p.altitude(), epsilon = 1e-3);
    }
}
