use std::fmt;

use crate::transform::ReportingStyle;

/// The quantity of a [`Measurement`](crate::calibration::Measurement) an error refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variable {
    Reported,
    Physical,
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reported => write!(f, "reported"),
            Self::Physical => write!(f, "physical"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("at least {required} measurements are required, found {found}")]
    InsufficientSamples { required: usize, found: usize },
    #[error("{variable} values have no usable spread, the line fit is undefined")]
    DegenerateVariance { variable: Variable },
    #[error("{variable} value {value} is not finite")]
    NonFiniteValue { variable: Variable, value: f64 },
    #[error("fit residual {value} is not finite")]
    NonFiniteResidual { value: f64 },
    #[error("reported value {value} is negative and has no square root")]
    NegativeReportedValue { value: f64 },
    #[error("no reporting style produced a valid fit ({} rejected)", failures.len())]
    NoValidCandidate {
        failures: Vec<(ReportingStyle, Error)>,
    },
    #[error("at least one reporting style must be evaluated")]
    EmptyStyleList,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
