// #![deny(missing_docs)]

//! Geodetic datum conversion, Gauss-Krüger projection, spherical
//! measurement and EGM96 geoid heights.
//!
//! Coordinates are [`Point`]s tagged with the [`CoordinateSystem`]
//! they are expressed in. [`transform`] moves a point between
//! systems:
//!
//! ```text
//!   BD09 ── GCJ02 ── WGS84 ── CGCS2000 ── Gauss-Krüger(zone)
//!     └───────────────┘
//! ```
//!
//! # References
//!
//! 1. [GCJ-02 (Wikipedia)](https://en.wikipedia.org/wiki/Restrictions_on_geographic_data_in_China)
//! 1. [CGCS2000](https://www.ngcc.cn/)
//! 1. [Transverse Mercator: Redfearn series](https://en.wikipedia.org/wiki/Transverse_Mercator:_Redfearn_series)
//! 1. [EGM96](https://earth-info.nga.mil/index.php?dir=wgs84&action=wgs84#tab_egm96)

pub mod datum;
mod ellipsoid;
mod error;
pub mod gauss_kruger;
pub mod geoid;
pub mod helmert;
pub mod measure;
mod point;
mod shape;
mod solve;
mod transform;

pub use crate::{
    ellipsoid::Ellipsoid,
    error::GeoError,
    geoid::Egm96,
    helmert::HelmertParams,
    point::{CoordinateSystem, Point, PointBuilder, Zone, ZoneWidth},
    shape::{LineString, Polygon, RangePoint, RingClosure},
    solve::Estimate,
    transform::{transform, Transformer},
};
