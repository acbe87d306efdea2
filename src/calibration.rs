use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::transform::ReportingStyle;
use crate::{Error, Result};

/// Pixels per millimetre of the reference digitizer
pub const REFERENCE_DPI: f64 = 16.61;

/// Contact sizes recorded on the reference digitizer as `(physical, reported)` pairs
const REFERENCE_MEASUREMENTS: [(f64, f64); 6] = [
    (4.85, 6.),
    (6.9, 8.),
    (8.85, 11.),
    (11., 14.),
    (13.91, 18.),
    (21.91, 28.),
];

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Measurement<E> {
    /// The physical size of the touch in mm
    pub physical: E,
    /// The reported size of the touch as a unit-less metric, as produced by the digitizer driver
    /// for the major axis of the contact
    pub reported: E,
}

/// The set of measurements a calibration is fitted to
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationData<E> {
    measurements: Vec<Measurement<E>>,
}

impl<E> CalibrationData<E> {
    #[must_use]
    pub fn new(measurements: Vec<Measurement<E>>) -> Self {
        Self { measurements }
    }

    #[must_use]
    pub fn measurements(&self) -> &[Measurement<E>] {
        &self.measurements
    }
}

impl CalibrationData<f64> {
    /// The measurements taken on the reference digitizer
    #[must_use]
    pub fn reference() -> Self {
        Self::new(
            REFERENCE_MEASUREMENTS
                .iter()
                .map(|&(physical, reported)| Measurement { physical, reported })
                .collect(),
        )
    }
}

#[derive(Deserialize)]
struct Row<E>(E, E);

impl<E: Copy + DeserializeOwned> CalibrationData<E> {
    /// Create a `CalibrationData` from an on-disk representation
    ///
    /// The file is a csv with a header row, followed by one row per measurement holding the
    /// physical size then the reported size.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a row cannot be parsed.
    pub fn from_file(filepath: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(filepath)?;

        let mut measurements = vec![];
        for result in rdr.deserialize() {
            let record: Row<E> = result?;
            measurements.push(Measurement {
                physical: record.0,
                reported: record.1,
            });
        }
        tracing::debug!(
            "read {} measurements from {}",
            measurements.len(),
            filepath.display()
        );

        Ok(Self::new(measurements))
    }
}

fn default_styles() -> Vec<ReportingStyle> {
    ReportingStyle::ALL.to_vec()
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Config<E> {
    /// Factor converting millimetres into the units of the device configuration
    pub dpi: E,
    /// Reporting styles to evaluate. Earlier styles win ties.
    #[serde(default = "default_styles")]
    pub styles: Vec<ReportingStyle>,
}

impl Default for Config<f64> {
    fn default() -> Self {
        Self {
            dpi: REFERENCE_DPI,
            styles: default_styles(),
        }
    }
}

impl<E: DeserializeOwned> Config<E> {
    /// Read a toml configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it lists no styles.
    pub fn from_file(filepath: &Path) -> Result<Self> {
        let config = fs::read_to_string(filepath)?;
        let config: Self = toml::from_str(&config)?;
        if config.styles.is_empty() {
            return Err(Error::EmptyStyleList);
        }
        Ok(config)
    }
}
