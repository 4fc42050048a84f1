use crate::point::{CoordinateSystem, ZoneWidth};
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum GeoError {
    #[error("{axis} must be a finite value, got {value}")]
    NonFinite { axis: &'static str, value: f64 },

    #[error("position requires at least {required} elements, got {got}")]
    PositionTooShort { required: usize, got: usize },

    #[error("invalid {width} Gauss-Krüger zone {zone}")]
    InvalidZone { zone: f64, width: ZoneWidth },

    #[error("polygon requires at least three points, got {0}")]
    RingTooShort(usize),

    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion {
        from: CoordinateSystem,
        to: CoordinateSystem,
    },

    #[error("{solver} did not converge after {iterations} iterations (residual {residual:e})")]
    NotConverged {
        solver: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid EGM96 grid length {0} for {1:?}")]
    GridLen(u64, PathBuf),

    #[error("EGM96 grid requires {expected} samples, got {got}")]
    SampleCount { expected: usize, got: usize },

    #[error("EGM96 grid index ({row}, {col}) out of bounds")]
    GridIndex { row: i64, col: i64 },

    #[error("latitude {0} rad is outside ±π")]
    LatitudeRange(f64),
}
