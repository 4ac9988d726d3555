//! Quality metrics of emulator predictions

use crate::errors::{Result, TrainError};
use crate::traits::Prediction;
use linfa::Float;
use ndarray::{ArrayView2, Axis, Zip};

/// A score of a prediction against true values
pub trait Metric<F: Float> {
    /// Name of the metric used in reports
    fn name(&self) -> &str;

    /// Computes the metric of `prediction` given the true values `y_true`
    fn evaluate(&self, y_true: &ArrayView2<F>, prediction: &Prediction<F>) -> Result<F>;
}

fn check_shapes<F: Float>(y_true: &ArrayView2<F>, prediction: &Prediction<F>) -> Result<()> {
    if y_true.dim() != prediction.mean.dim() || y_true.dim() != prediction.std.dim() {
        return Err(TrainError::DataShapeError(format!(
            "true values {:?} and prediction {:?} shapes differ",
            y_true.dim(),
            prediction.mean.dim()
        )));
    }
    if y_true.is_empty() {
        return Err(TrainError::DataShapeError(
            "cannot score an empty prediction".to_string(),
        ));
    }
    Ok(())
}

/// Coefficient of determination, averaged over outputs
#[derive(Clone, Copy, Debug, Default)]
pub struct R2Score;

impl<F: Float> Metric<F> for R2Score {
    fn name(&self) -> &str {
        "R2Score"
    }

    fn evaluate(&self, y_true: &ArrayView2<F>, prediction: &Prediction<F>) -> Result<F> {
        check_shapes(y_true, prediction)?;
        let n_outputs = y_true.ncols();
        let r2 = y_true
            .axis_iter(Axis(1))
            .zip(prediction.mean.axis_iter(Axis(1)))
            .map(|(yt, yp)| {
                let mean = yt.sum() / F::cast(yt.len());
                let ss_res = Zip::from(&yt)
                    .and(&yp)
                    .fold(F::zero(), |acc, &t, &p| acc + (t - p) * (t - p));
                let ss_tot = yt.fold(F::zero(), |acc, &t| acc + (t - mean) * (t - mean));
                if ss_tot > F::zero() {
                    F::one() - ss_res / ss_tot
                } else if ss_res == F::zero() {
                    F::one()
                } else {
                    F::zero()
                }
            })
            .fold(F::zero(), |acc, v| acc + v);
        Ok(r2 / F::cast(n_outputs))
    }
}

/// Mean squared error
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquaredError;

impl<F: Float> Metric<F> for MeanSquaredError {
    fn name(&self) -> &str {
        "MeanSquaredError"
    }

    fn evaluate(&self, y_true: &ArrayView2<F>, prediction: &Prediction<F>) -> Result<F> {
        check_shapes(y_true, prediction)?;
        let sse = Zip::from(y_true)
            .and(&prediction.mean)
            .fold(F::zero(), |acc, &t, &p| acc + (t - p) * (t - p));
        Ok(sse / F::cast(y_true.len()))
    }
}

/// Percentage of true values lying within two predicted standard deviations of the mean
#[derive(Clone, Copy, Debug, Default)]
pub struct IndependentStandardError;

impl<F: Float> Metric<F> for IndependentStandardError {
    fn name(&self) -> &str {
        "ISE"
    }

    fn evaluate(&self, y_true: &ArrayView2<F>, prediction: &Prediction<F>) -> Result<F> {
        check_shapes(y_true, prediction)?;
        let two = F::cast(2.);
        let inside = Zip::from(y_true)
            .and(&prediction.mean)
            .and(&prediction.std)
            .fold(0usize, |acc, &t, &m, &s| {
                let lower = m - two * s;
                let upper = m + two * s;
                acc + usize::from(lower <= t && t <= upper)
            });
        Ok(F::cast(100.) * F::cast(inside) / F::cast(y_true.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn prediction(mean: Array2<f64>, std: f64) -> Prediction<f64> {
        let std = Array2::from_elem(mean.dim(), std);
        Prediction { mean, std }
    }

    #[test]
    fn test_r2_score() {
        let y = array![[1.], [2.], [3.], [4.]];
        let perfect = prediction(y.clone(), 0.1);
        assert_abs_diff_eq!(R2Score.evaluate(&y.view(), &perfect).unwrap(), 1.);
        let mean_only = prediction(Array2::from_elem((4, 1), 2.5), 0.1);
        assert_abs_diff_eq!(R2Score.evaluate(&y.view(), &mean_only).unwrap(), 0.);
        let shifted = prediction(&y + 1., 0.1);
        // ss_res = 4, ss_tot = 5
        assert_abs_diff_eq!(R2Score.evaluate(&y.view(), &shifted).unwrap(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_mse() {
        let y = array![[1.], [2.], [3.], [4.]];
        let pred = prediction(array![[1.], [2.], [5.], [2.]], 0.1);
        assert_abs_diff_eq!(MeanSquaredError.evaluate(&y.view(), &pred).unwrap(), 2.);
        assert_eq!(Metric::<f64>::name(&MeanSquaredError), "MeanSquaredError");
    }

    #[test]
    fn test_ise() {
        let y = array![[0.], [1.], [2.], [3.]];
        let pred = prediction(array![[0.], [0.], [0.], [0.]], 1.);
        // within [-2, 2]: 0, 1 and 2
        assert_abs_diff_eq!(
            IndependentStandardError.evaluate(&y.view(), &pred).unwrap(),
            75.
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let y = array![[1.], [2.]];
        let pred = prediction(array![[1.], [2.], [3.]], 0.1);
        assert!(matches!(
            R2Score.evaluate(&y.view(), &pred),
            Err(TrainError::DataShapeError(_))
        ));
    }
}
