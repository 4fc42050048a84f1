use crate::solve::Estimate;

/// Tolerance, in radians, of iterative latitude solutions.
pub(crate) const LATITUDE_TOLERANCE: f64 = 1e-12;

/// Iteration cap for iterative latitude solutions.
pub(crate) const LATITUDE_MAX_ITERATIONS: usize = 10;

/// A reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis in meters.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// Same semi-major axis as WGS84, slightly different flattening.
    pub const CGCS2000: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// Krasovsky 1940, the ellipsoid behind the GCJ02 warp.
    pub const KRASOVSKY: Self = Self {
        a: 6_378_245.0,
        f: 1.0 / 298.3,
    };

    /// Semi-minor axis.
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Second eccentricity squared.
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1.0 - e2)
    }

    /// Prime vertical radius of curvature at geodetic latitude `lat`
    /// (radians).
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.a / (1.0 - self.e2() * lat.sin().powi(2)).sqrt()
    }

    /// Meridional radius of curvature at geodetic latitude `lat`
    /// (radians).
    pub fn meridian_radius(&self, lat: f64) -> f64 {
        let e2 = self.e2();
        self.a * (1.0 - e2) / (1.0 - e2 * lat.sin().powi(2)).powf(1.5)
    }

    /// Returns ECEF `[x, y, z]` in meters for geodetic `lat`/`lon`
    /// (radians) and ellipsoidal height `h` (meters).
    pub fn to_ecef(&self, lat: f64, lon: f64, h: f64) -> [f64; 3] {
        let n = self.prime_vertical_radius(lat);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        [
            (n + h) * cos_lat * cos_lon,
            (n + h) * cos_lat * sin_lon,
            ((1.0 - self.e2()) * n + h) * sin_lat,
        ]
    }

    /// Returns geodetic `(lat, lon, h)` (radians, radians, meters)
    /// for an ECEF position.
    pub fn from_ecef(&self, [x, y, z]: [f64; 3]) -> Estimate<(f64, f64, f64)> {
        let lon = y.atan2(x);
        let p = x.hypot(y);
        if p == 0.0 {
            // On the polar axis, latitude is exact.
            let lat = std::f64::consts::FRAC_PI_2.copysign(z);
            return Estimate::exact((lat, lon, z.abs() - self.b()));
        }

        let e2 = self.e2();
        let mut lat = z.atan2(p * (1.0 - e2));
        let mut h = 0.0;
        let mut residual = f64::INFINITY;
        for iteration in 1..=LATITUDE_MAX_ITERATIONS {
            let n = self.prime_vertical_radius(lat);
            h = p / lat.cos() - n;
            let next = z.atan2(p * (1.0 - e2 * n / (n + h)));
            residual = (next - lat).abs();
            lat = next;
            if residual < LATITUDE_TOLERANCE {
                return Estimate::converged((lat, lon, h), iteration, residual);
            }
        }
        Estimate::exhausted((lat, lon, h), LATITUDE_MAX_ITERATIONS, residual)
    }
}
