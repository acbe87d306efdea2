use std::fmt;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::calibration::Measurement;
use crate::{Error, Result};

/// How the digitizer's reported size relates to the physical contact
///
/// Each style maps a raw [`Measurement`] onto one in which the reported value is expected to be
/// linear in the physical diameter, so every style can be scored by the same straight line fit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingStyle {
    /// The reported size is proportional to the diameter of the contact
    Diameter,
    /// The reported size is proportional to the area of the contact
    ///
    /// The square root of an area scales with a length, so the reported value is replaced by its
    /// square root before fitting.
    Area,
}

impl ReportingStyle {
    /// Every style, in the order they are evaluated by default
    pub const ALL: [Self; 2] = [Self::Diameter, Self::Area];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Diameter => "diameter",
            Self::Area => "area",
        }
    }

    /// Map a measurement into the linear frame of this style
    ///
    /// # Errors
    ///
    /// [`ReportingStyle::Area`] returns [`Error::NegativeReportedValue`] when the reported value
    /// is negative.
    pub fn apply<E: Float>(self, measurement: &Measurement<E>) -> Result<Measurement<E>> {
        match self {
            Self::Diameter => Ok(*measurement),
            Self::Area => {
                if measurement.reported < E::zero() {
                    return Err(Error::NegativeReportedValue {
                        value: measurement.reported.to_f64().unwrap_or(f64::NAN),
                    });
                }
                Ok(Measurement {
                    physical: measurement.physical,
                    reported: measurement.reported.sqrt(),
                })
            }
        }
    }

    /// Apply the style to each of `measurements`, preserving their order
    ///
    /// # Errors
    ///
    /// Fails on the first measurement [`ReportingStyle::apply`] rejects.
    pub fn apply_all<E: Float>(
        self,
        measurements: &[Measurement<E>],
    ) -> Result<Vec<Measurement<E>>> {
        measurements
            .iter()
            .map(|measurement| self.apply(measurement))
            .collect()
    }
}

impl fmt::Display for ReportingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
