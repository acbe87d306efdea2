use ndarray::Array1;
use num_traits::{Float, FromPrimitive};

use crate::calibration::Measurement;
use crate::math::{mean, stddev};
use crate::{Error, Result, Variable};

/// A straight line mapping reported size onto physical size
///
/// $$
///     \mathrm{physical} \approx \mathrm{slope} \times \mathrm{reported} + \mathrm{intercept}
/// $$
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult<E> {
    pub slope: E,
    pub intercept: E,
}

impl<E: Float> FitResult<E> {
    /// The physical size the line predicts for `reported`
    pub fn estimate(&self, reported: E) -> E {
        reported * self.slope + self.intercept
    }
}

impl<E: Float + FromPrimitive> FitResult<E> {
    /// Root mean square residual of the line against `samples`
    ///
    /// # Errors
    /// Returns [`Error::InsufficientSamples`] if `samples` is empty.
    pub fn rms_error(&self, samples: &[Measurement<E>]) -> Result<E> {
        rms_error(samples, self.slope, self.intercept)
    }
}

/// Fit a least squares line of physical size against reported size
///
/// The slope is found from the Pearson correlation coefficient $r$ of the two variables
/// $$
///     \beta = r \frac{\sigma_y}{\sigma_x}, \quad
///     r = \frac{\langle xy \rangle - \langle x \rangle \langle y \rangle}
///         {\sqrt{\left(\langle x^2 \rangle - \langle x \rangle^2\right)
///         \left(\langle y^2 \rangle - \langle y \rangle^2\right)}}
/// $$
/// and the intercept is $\alpha = \langle y \rangle - \beta \langle x \rangle$, where $x$ is the
/// reported and $y$ the physical size.
///
/// # Errors
///
/// - [`Error::InsufficientSamples`] for fewer than two samples
/// - [`Error::NonFiniteValue`] when a sample holds a NaN or infinite value
/// - [`Error::DegenerateVariance`] when either variable is constant across the samples, or its
///   spread is lost to rounding, in which case the correlation is undefined
pub fn fit<E: Float + FromPrimitive>(samples: &[Measurement<E>]) -> Result<FitResult<E>> {
    if samples.len() < 2 {
        return Err(Error::InsufficientSamples {
            required: 2,
            found: samples.len(),
        });
    }

    let x: Array1<E> = samples.iter().map(|m| m.reported).collect();
    let y: Array1<E> = samples.iter().map(|m| m.physical).collect();
    ensure_finite(&x, Variable::Reported)?;
    ensure_finite(&y, Variable::Physical)?;
    ensure_spread(&x, Variable::Reported)?;
    ensure_spread(&y, Variable::Physical)?;

    let mean_x = mean(&x)?;
    let mean_y = mean(&y)?;
    let mean_x2 = mean(&(&x * &x))?;
    let mean_y2 = mean(&(&y * &y))?;
    let mean_xy = mean(&(&x * &y))?;

    let std_x = stddev(&x, mean_x)?;
    let std_y = stddev(&y, mean_y)?;

    let covariance_numerator = mean_xy - mean_x * mean_y;
    let variance_x = mean_x2 - mean_x * mean_x;
    let variance_y = mean_y2 - mean_y * mean_y;
    ensure_consistent_variance(variance_x, std_x, Variable::Reported)?;
    ensure_consistent_variance(variance_y, std_y, Variable::Physical)?;

    let correlation_denominator = (variance_x * variance_y).sqrt();
    let correlation = covariance_numerator / correlation_denominator;

    let slope = correlation * (std_y / std_x);
    let intercept = mean_y - slope * mean_x;

    if !(slope.is_finite() && intercept.is_finite()) {
        return Err(Error::DegenerateVariance {
            variable: Variable::Reported,
        });
    }

    Ok(FitResult { slope, intercept })
}

/// Root mean square of the residuals `physical - (reported * slope + intercept)`
///
/// # Errors
/// Returns [`Error::InsufficientSamples`] if `samples` is empty.
pub fn rms_error<E: Float + FromPrimitive>(
    samples: &[Measurement<E>],
    slope: E,
    intercept: E,
) -> Result<E> {
    let squared_residuals: Array1<E> = samples
        .iter()
        .map(|m| (m.physical - (m.reported * slope + intercept)).powi(2))
        .collect();

    Ok(mean(&squared_residuals)?.sqrt())
}

fn ensure_finite<E: Float>(values: &Array1<E>, variable: Variable) -> Result<()> {
    match values.iter().find(|value| !value.is_finite()) {
        Some(value) => Err(Error::NonFiniteValue {
            variable,
            value: value.to_f64().unwrap_or(f64::NAN),
        }),
        None => Ok(()),
    }
}

/// The variance from raw moments, `<x^2> - <x>^2`, must agree with the variance about the mean
/// to half the working precision. Cancellation between the moments of values with a large
/// offset and a tiny spread breaks this, and the correlation built on them is meaningless.
fn ensure_consistent_variance<E: Float>(
    raw_moments: E,
    standard_deviation: E,
    variable: Variable,
) -> Result<()> {
    let about_mean = standard_deviation * standard_deviation;
    let tolerance = E::epsilon().sqrt() * raw_moments.abs().max(about_mean);
    if raw_moments > E::zero()
        && about_mean > E::zero()
        && (raw_moments - about_mean).abs() <= tolerance
    {
        Ok(())
    } else {
        Err(Error::DegenerateVariance { variable })
    }
}

fn ensure_spread<E: Float>(values: &Array1<E>, variable: Variable) -> Result<()> {
    let first = values[0];
    if values.iter().all(|&value| value == first) {
        return Err(Error::DegenerateVariance { variable });
    }
    Ok(())
}
