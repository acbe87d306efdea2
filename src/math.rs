use ndarray::Array1;
use num_traits::{Float, FromPrimitive};

use crate::{Error, Result};

/// Compute the arithmetic mean of `values`
///
/// # Errors
///
/// The mean of an empty sequence is undefined, so an empty array returns
/// [`Error::InsufficientSamples`].
///
/// # Examples
///
/// ```
/// use touch_size::math::mean;
/// use ndarray::arr1;
///
/// let values = arr1(&[1., 2., 3., 6.]);
/// assert_eq!(mean(&values).unwrap(), 3.);
/// ```
pub fn mean<E: Float + FromPrimitive>(values: &Array1<E>) -> Result<E> {
    values.mean().ok_or(Error::InsufficientSamples {
        required: 1,
        found: 0,
    })
}

/// Compute the population standard deviation of `values` about `mean`
///
/// The deviations are taken from the `mean` passed in, which is not recomputed from `values`. This
/// lets callers reuse a mean they already hold
/// $$
///     \sigma = \sqrt{\frac{1}{n} \sum_i \left(x_i - \mu\right)^2}
/// $$
///
/// # Errors
///
/// Returns [`Error::InsufficientSamples`] if `values` is empty.
///
/// # Examples
///
/// ```
/// use touch_size::math::stddev;
/// use ndarray::arr1;
///
/// let values = arr1(&[2., 4., 4., 4., 5., 5., 7., 9.]);
/// assert_eq!(stddev(&values, 5.).unwrap(), 2.);
/// ```
pub fn stddev<E: Float + FromPrimitive>(values: &Array1<E>, mean: E) -> Result<E> {
    let squared_deviations = values.mapv(|value| (value - mean).powi(2));
    Ok(self::mean(&squared_deviations)?.sqrt())
}
