//! EGM96 geoid undulation (`.bin`) grid.
//!
//! The grid file holds one header byte followed by 721 rows × 1440
//! columns of little-endian `i16` undulations in centimeters. Rows
//! run from 90°N to 90°S and columns from 0°E eastward, both at 15
//! arc-minute spacing.
//!
//! # References
//!
//! 1. [EGM96](https://earth-info.nga.mil/index.php?dir=wgs84&action=wgs84#tab_egm96)
//! 1. [NOAA's Android geoid grid](https://github.com/googlearchive/science-journal/tree/master/OpenScienceJournal)

use crate::{error::GeoError, point::Point};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::debug;
use memmap2::Mmap;
use std::{
    f64::consts::{FRAC_PI_2, PI, TAU},
    fs::File,
    io::{BufReader, Read},
    mem::size_of,
    path::Path,
};

/// Bit representation of undulation samples, in centimeters.
pub type Undulation = i16;

/// Rows from 90°N to 90°S inclusive.
pub const NUM_ROWS: usize = 721;
/// Columns from 0°E eastward.
pub const NUM_COLS: usize = 1440;

/// Grid spacing in radians.
const INTERVAL: f64 = 15.0 / 60.0 * PI / 180.0;

const HEADER_LEN: usize = 1;

const FILE_LEN: u64 = (HEADER_LEN + NUM_ROWS * NUM_COLS * size_of::<Undulation>()) as u64;

/// An EGM96 geoid model.
///
/// All storage is immutable after construction, so `&Egm96` can be
/// shared between threads without synchronization.
pub struct Egm96 {
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[Undulation]>),
    /// Raw file, header included.
    MemMap(Mmap),
}

impl SampleStore {
    fn get_linear_unchecked(&self, index: usize) -> Undulation {
        match self {
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = HEADER_LEN + index * size_of::<Undulation>();
                let end = start + size_of::<Undulation>();
                LittleEndian::read_i16(&raw[start..end])
            }
        }
    }
}

impl Egm96 {
    /// Returns a model read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeoError> {
        check_len(&path)?;
        debug!("loading EGM96 grid {:?}", path.as_ref());
        let mut file = BufReader::new(File::open(&path)?);
        let mut header = [0u8; HEADER_LEN];
        file.read_exact(&mut header)?;

        let mut samples = Vec::with_capacity(NUM_ROWS * NUM_COLS);
        for _ in 0..(NUM_ROWS * NUM_COLS) {
            samples.push(file.read_i16::<LittleEndian>()?);
        }

        Ok(Self {
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Returns a model using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, GeoError> {
        check_len(&path)?;
        debug!("mapping EGM96 grid {:?}", path.as_ref());
        let file = File::open(path)?;
        // The grid is a read-only asset; nothing else writes to it
        // while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            samples: SampleStore::MemMap(mmap),
        })
    }

    /// Returns a model backed by `samples`, in file order.
    pub fn from_samples(samples: Vec<Undulation>) -> Result<Self, GeoError> {
        if samples.len() != NUM_ROWS * NUM_COLS {
            return Err(GeoError::SampleCount {
                expected: NUM_ROWS * NUM_COLS,
                got: samples.len(),
            });
        }
        Ok(Self {
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Returns the grid's (rows, columns).
    pub fn dimensions(&self) -> (usize, usize) {
        (NUM_ROWS, NUM_COLS)
    }

    /// Returns the undulation in meters at grid node (`row`, `col`).
    pub fn get(&self, (row, col): (usize, usize)) -> Option<f64> {
        if row < NUM_ROWS && col < NUM_COLS {
            Some(self.node(row, col))
        } else {
            None
        }
    }

    /// Returns the geoid height above the WGS84 ellipsoid, in meters,
    /// at `point`.
    pub fn mean_sea_level(&self, point: &Point) -> Result<f64, GeoError> {
        let lat = point.latitude().to_radians();
        if !(-PI..=PI).contains(&lat) {
            return Err(GeoError::LatitudeRange(lat));
        }
        let lon = normalize_radians(point.longitude().to_radians(), 0.0);

        #[allow(clippy::cast_possible_truncation)]
        let mut top_row = ((FRAC_PI_2 - lat) / INTERVAL).floor() as i64;
        if top_row == NUM_ROWS as i64 - 1 {
            top_row -= 1;
        }
        let bottom_row = top_row + 1;

        #[allow(clippy::cast_possible_truncation)]
        let left_col = (normalize_radians(lon, PI) / INTERVAL).floor() as i64;
        let right_col = (left_col + 1) % NUM_COLS as i64;

        let top_left = self.checked_node(top_row, left_col)?;
        let bottom_left = self.checked_node(bottom_row, left_col)?;
        let bottom_right = self.checked_node(bottom_row, right_col)?;
        let top_right = self.checked_node(top_row, right_col)?;

        #[allow(clippy::cast_precision_loss)]
        let lon_left = normalize_radians(left_col as f64 * INTERVAL, 0.0);
        #[allow(clippy::cast_precision_loss)]
        let lat_top = FRAC_PI_2 - top_row as f64 * INTERVAL;

        let left_prop = (lon - lon_left) / INTERVAL;
        let top_prop = (lat_top - lat) / INTERVAL;

        let top = lerp(top_left, top_right, left_prop);
        let bottom = lerp(bottom_left, bottom_right, left_prop);
        Ok(lerp(top, bottom, top_prop))
    }

    /// Converts `point`'s WGS84 ellipsoidal height to EGM96
    /// orthometric height.
    pub fn ellipsoid_to_egm96(&self, point: &Point) -> Result<f64, GeoError> {
        Ok(point.altitude() - self.mean_sea_level(point)?)
    }

    /// Converts `point`'s EGM96 orthometric height to WGS84
    /// ellipsoidal height.
    pub fn egm96_to_ellipsoid(&self, point: &Point) -> Result<f64, GeoError> {
        Ok(point.altitude() + self.mean_sea_level(point)?)
    }
}

/// Private API
impl Egm96 {
    fn node(&self, row: usize, col: usize) -> f64 {
        f64::from(self.samples.get_linear_unchecked(row * NUM_COLS + col)) / 100.0
    }

    fn checked_node(&self, row: i64, col: i64) -> Result<f64, GeoError> {
        if (0..NUM_ROWS as i64).contains(&row) && (0..NUM_COLS as i64).contains(&col) {
            Ok(self.node(row as usize, col as usize))
        } else {
            Err(GeoError::GridIndex { row, col })
        }
    }
}

fn check_len<P: AsRef<Path>>(path: P) -> Result<(), GeoError> {
    match path.as_ref().metadata().map(|m| m.len())? {
        FILE_LEN => Ok(()),
        invalid_len => Err(GeoError::GridLen(invalid_len, path.as_ref().to_path_buf())),
    }
}

/// Wraps `rads` into `[center - π, center + π)`.
fn normalize_radians(rads: f64, center: f64) -> f64 {
    rads - TAU * ((rads + PI - center) / TAU).floor()
}

fn lerp(a: f64, b: f64, prop: f64) -> f64 {
    a + (b - a) * prop
}
