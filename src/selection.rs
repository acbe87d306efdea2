use std::fmt;

use itertools::{Either, Itertools};
use num_traits::{Float, FromPrimitive};

use crate::calibration::{CalibrationData, Config, Measurement};
use crate::linear::fit;
use crate::transform::ReportingStyle;
use crate::{Error, Result};

/// The best line found for a single reporting style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptimizationResult<E> {
    pub label: ReportingStyle,
    pub scale: E,
    pub bias: E,
    /// Root mean square residual of the fit, in mm
    pub error: E,
}

impl<E: Float> OptimizationResult<E> {
    /// Convert the scale and bias into device units
    pub fn device_parameters(&self, dpi: E) -> DeviceParameters<E> {
        DeviceParameters {
            bias: dpi * self.bias,
            scale: dpi * self.scale,
        }
    }
}

impl<E: fmt::Display> fmt::Display for OptimizationResult<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OptimizationResult{{Type={}, Scale={:.6}, Bias={:.6}, Error={:.6}}}",
            self.label, self.scale, self.bias, self.error
        )
    }
}

/// Scale and bias of the selected fit in device units, ready for the device configuration file
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceParameters<E> {
    pub bias: E,
    pub scale: E,
}

impl<E: fmt::Display> fmt::Display for DeviceParameters<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bias={:.6}, Scale={:.6}", self.bias, self.scale)
    }
}

/// Every valid candidate, in evaluation order, and the index of the best one
#[derive(Clone, Debug)]
pub struct Selection<E> {
    candidates: Vec<OptimizationResult<E>>,
    winner: usize,
}

impl<E> Selection<E> {
    #[must_use]
    pub fn candidates(&self) -> &[OptimizationResult<E>] {
        &self.candidates
    }

    #[must_use]
    pub fn winner(&self) -> &OptimizationResult<E> {
        &self.candidates[self.winner]
    }
}

/// The outcome of a full calibration run
#[derive(Clone, Debug)]
pub struct Calibration<E> {
    pub selection: Selection<E>,
    pub device: DeviceParameters<E>,
}

/// Fit a line to `samples` after mapping them through `style`
///
/// # Errors
/// Fails if `style` rejects any sample or the transformed samples cannot be fitted.
pub fn evaluate<E: Float + FromPrimitive + fmt::Debug>(
    style: ReportingStyle,
    samples: &[Measurement<E>],
) -> Result<OptimizationResult<E>> {
    let transformed = style.apply_all(samples)?;
    let line = fit(&transformed)?;
    let error = line.rms_error(&transformed)?;
    tracing::debug!(
        %style,
        slope = ?line.slope,
        intercept = ?line.intercept,
        error = ?error,
        "fitted candidate"
    );

    Ok(OptimizationResult {
        label: style,
        scale: line.slope,
        bias: line.intercept,
        error,
    })
}

/// Index of the candidate with the lowest error
///
/// Candidates whose error is not finite are never chosen. When errors are equal the earlier
/// candidate is kept.
fn best_index<E: Float>(candidates: &[OptimizationResult<E>]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.error.is_finite())
        .fold(None, |best: Option<(usize, E)>, (ii, candidate)| match best {
            Some((_, lowest)) if lowest <= candidate.error => best,
            _ => Some((ii, candidate.error)),
        })
        .map(|(ii, _)| ii)
}

/// The candidate with the lowest error, preferring the earliest on ties
#[must_use]
pub fn select<E: Float>(candidates: &[OptimizationResult<E>]) -> Option<&OptimizationResult<E>> {
    best_index(candidates).map(|ii| &candidates[ii])
}

type Failures = Vec<(ReportingStyle, Error)>;

/// Split evaluated styles into the candidate pool and the reasons the rest were excluded
///
/// A candidate which fitted but whose residual is not finite cannot be ranked, so it is excluded
/// along with the styles which failed to fit.
fn gather_candidates<E: Float>(
    outcomes: Vec<(ReportingStyle, Result<OptimizationResult<E>>)>,
) -> (Vec<OptimizationResult<E>>, Failures) {
    outcomes
        .into_iter()
        .partition_map(|(style, outcome)| match outcome.and_then(ensure_finite_error) {
            Ok(candidate) => Either::Left(candidate),
            Err(e) => {
                tracing::warn!(%style, "excluding reporting style: {e}");
                Either::Right((style, e))
            }
        })
}

fn ensure_finite_error<E: Float>(
    candidate: OptimizationResult<E>,
) -> Result<OptimizationResult<E>> {
    if candidate.error.is_finite() {
        Ok(candidate)
    } else {
        Err(Error::NonFiniteResidual {
            value: candidate.error.to_f64().unwrap_or(f64::NAN),
        })
    }
}

/// Evaluate each of `styles` in order and select the best fit
///
/// Styles which fail to produce a fit, or whose residual is not finite, are logged and left out of
/// the candidate pool.
///
/// # Errors
///
/// - [`Error::EmptyStyleList`] if `styles` is empty
/// - [`Error::NoValidCandidate`] if no style produces a usable fit
pub fn optimise<E: Float + FromPrimitive + fmt::Debug>(
    samples: &[Measurement<E>],
    styles: &[ReportingStyle],
) -> Result<Selection<E>> {
    if styles.is_empty() {
        return Err(Error::EmptyStyleList);
    }

    let outcomes = styles
        .iter()
        .map(|&style| (style, evaluate(style, samples)))
        .collect();
    let (candidates, failures) = gather_candidates(outcomes);

    let Some(winner) = best_index(&candidates) else {
        return Err(Error::NoValidCandidate { failures });
    };
    tracing::info!(
        style = %candidates[winner].label,
        error = ?candidates[winner].error,
        "selected reporting style"
    );

    Ok(Selection { candidates, winner })
}

/// Run the full calibration of `data` and scale the winning fit into device units
///
/// # Errors
/// See [`optimise`].
pub fn calibrate<E: Float + FromPrimitive + fmt::Debug>(
    data: &CalibrationData<E>,
    config: &Config<E>,
) -> Result<Calibration<E>> {
    let selection = optimise(data.measurements(), &config.styles)?;
    let device = selection.winner().device_parameters(config.dpi);
    Ok(Calibration { selection, device })
}
