use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use geodatum::{
    gauss_kruger,
    measure::{self, EARTH_RADIUS},
    CoordinateSystem, Egm96, Point, Transformer, ZoneWidth,
};
use log::debug;
use serde::Serialize;
use std::fmt::Display;

/// A datum conversion and projection multitool.
#[derive(Debug, Parser)]
struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: SubCmd,
}

#[derive(Clone, Debug, Subcommand)]
enum SubCmd {
    /// Convert a point between geodetic datums.
    Transform(TransformArgs),
    /// Project a CGCS2000 point to Gauss-Krüger plane coordinates.
    Project(ProjectArgs),
    /// Recover the CGCS2000 point of Gauss-Krüger plane coordinates.
    Unproject(UnprojectArgs),
    /// Great-circle distance between two points.
    Distance(DistanceArgs),
    /// EGM96 geoid height at a WGS84 point.
    Geoid(GeoidArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Datum {
    Wgs84,
    Gcj02,
    Bd09,
    Cgcs2000,
}

impl From<Datum> for CoordinateSystem {
    fn from(datum: Datum) -> Self {
        match datum {
            Datum::Wgs84 => Self::Wgs84,
            Datum::Gcj02 => Self::Gcj02,
            Datum::Bd09 => Self::Bd09,
            Datum::Cgcs2000 => Self::Cgcs2000,
        }
    }
}

#[derive(Args, Clone, Debug)]
struct TransformArgs {
    #[arg(allow_negative_numbers = true)]
    lon: f64,

    #[arg(allow_negative_numbers = true)]
    lat: f64,

    /// Source datum.
    #[arg(long, value_enum)]
    from: Datum,

    /// Target datum.
    #[arg(long, value_enum)]
    to: Datum,

    /// Ellipsoidal height in meters.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    altitude: f64,

    /// Fail if an iterative inversion does not converge.
    #[arg(long)]
    strict: bool,

    /// Iteration cap for the GCJ02/BD09 inversions.
    #[arg(long)]
    max_iterations: Option<usize>,
}

#[derive(Args, Clone, Debug)]
struct ProjectArgs {
    #[arg(allow_negative_numbers = true)]
    lon: f64,

    #[arg(allow_negative_numbers = true)]
    lat: f64,

    /// Zone width in degrees.
    #[arg(long, value_parser = parse_width, default_value = "3")]
    width: ZoneWidth,
}

#[derive(Args, Clone, Debug)]
struct UnprojectArgs {
    /// Easting in meters, including the 500 km false easting.
    easting: f64,

    /// Northing in meters.
    #[arg(allow_negative_numbers = true)]
    northing: f64,

    /// Zone number.
    zone: u16,

    /// Zone width in degrees.
    #[arg(long, value_parser = parse_width, default_value = "3")]
    width: ZoneWidth,
}

#[derive(Args, Clone, Debug)]
struct DistanceArgs {
    #[arg(allow_negative_numbers = true)]
    lon1: f64,

    #[arg(allow_negative_numbers = true)]
    lat1: f64,

    #[arg(allow_negative_numbers = true)]
    lon2: f64,

    #[arg(allow_negative_numbers = true)]
    lat2: f64,

    /// Sphere radius in meters.
    #[arg(long, default_value_t = EARTH_RADIUS)]
    radius: f64,
}

#[derive(Args, Clone, Debug)]
struct GeoidArgs {
    #[arg(allow_negative_numbers = true)]
    lon: f64,

    #[arg(allow_negative_numbers = true)]
    lat: f64,

    /// WGS84 ellipsoidal height in meters.
    #[arg(long, allow_negative_numbers = true)]
    altitude: Option<f64>,

    /// EGM96 '.bin' grid file.
    #[arg(long, env = "GEODATUM_EGM96")]
    grid: Utf8PathBuf,
}

#[derive(Debug, Serialize)]
struct GeoidHeight {
    undulation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    orthometric_height: Option<f64>,
}

fn parse_width(s: &str) -> Result<ZoneWidth, String> {
    match s {
        "3" => Ok(ZoneWidth::Three),
        "6" => Ok(ZoneWidth::Six),
        other => Err(format!("zone width must be 3 or 6, got {other}")),
    }
}

fn transform(
    TransformArgs {
        lon,
        lat,
        from,
        to,
        altitude,
        strict,
        max_iterations,
    }: TransformArgs,
) -> Result<Point> {
    let point = Point::with_altitude(lon, lat, altitude, from.into())?;
    let mut transformer = Transformer::default().strict(strict);
    if let Some(max_iterations) = max_iterations {
        transformer = transformer.max_iterations(max_iterations);
    }
    Ok(transformer.transform(&point, to.into())?)
}

fn project(ProjectArgs { lon, lat, width }: ProjectArgs) -> Result<Point> {
    let point = Point::new(lon, lat, CoordinateSystem::Cgcs2000)?;
    Ok(gauss_kruger::project(&point, width)?)
}

fn unproject(
    UnprojectArgs {
        easting,
        northing,
        zone,
        width,
    }: UnprojectArgs,
) -> Result<Point> {
    let point = Point::gauss_kruger(&[easting, northing, f64::from(zone)], width)?;
    let estimate = gauss_kruger::unproject(&point)?;
    debug!(
        "footpoint latitude after {} iterations, residual {:e}",
        estimate.iterations, estimate.residual
    );
    Ok(estimate.accept("gauss_kruger_footpoint", true)?)
}

fn distance(
    DistanceArgs {
        lon1,
        lat1,
        lon2,
        lat2,
        radius,
    }: DistanceArgs,
) -> Result<f64> {
    let p1 = Point::wgs84(lon1, lat1)?;
    let p2 = Point::wgs84(lon2, lat2)?;
    Ok(measure::distance(&p1, &p2, radius))
}

fn geoid(
    GeoidArgs {
        lon,
        lat,
        altitude,
        grid,
    }: GeoidArgs,
) -> Result<GeoidHeight> {
    let model = Egm96::memmap(&grid).with_context(|| format!("opening {grid}"))?;
    let point = Point::with_altitude(lon, lat, altitude.unwrap_or_default(), CoordinateSystem::Wgs84)?;
    let undulation = model.mean_sea_level(&point)?;
    let orthometric_height = altitude
        .map(|_| model.ellipsoid_to_egm96(&point))
        .transpose()?;
    Ok(GeoidHeight {
        undulation,
        orthometric_height,
    })
}

fn emit<T: Serialize>(value: &T, text: impl Display, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}

fn point_text(p: &Point) -> String {
    match p.zone() {
        Some(zone) => format!(
            "{:.4} {:.4} {:.4} ({zone})",
            p.easting(),
            p.northing(),
            p.altitude()
        ),
        None => format!(
            "{:.9} {:.9} {:.4} ({})",
            p.longitude(),
            p.latitude(),
            p.altitude(),
            p.system()
        ),
    }
}

impl Display for GeoidHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.undulation)?;
        if let Some(h) = self.orthometric_height {
            write!(f, " {h:.4}")?;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let Cli { json, command } = Cli::parse();
    debug!("{command:?}");
    match command {
        SubCmd::Transform(args) => {
            let p = transform(args)?;
            emit(&p, point_text(&p), json)
        }
        SubCmd::Project(args) => {
            let p = project(args)?;
            emit(&p, point_text(&p), json)
        }
        SubCmd::Unproject(args) => {
            let p = unproject(args)?;
            emit(&p, point_text(&p), json)
        }
        SubCmd::Distance(args) => {
            let meters = distance(args)?;
            emit(&meters, format!("{meters:.4}"), json)
        }
        SubCmd::Geoid(args) => {
            let height = geoid(args)?;
            emit(&height, &height, json)
        }
    }
}
