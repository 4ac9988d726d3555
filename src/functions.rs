//! Analytical test functions taking `(n, d)` inputs and returning `(n, 1)` outputs

use ndarray::{Array2, ArrayView2, Axis, Zip};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Forrester function over `[0, 1]`
pub fn forrester(x: &ArrayView2<f64>) -> Array2<f64> {
    x.column(0)
        .mapv(|xi| (6. * xi - 2.).powi(2) * (12. * xi - 4.).sin())
        .insert_axis(Axis(1))
}

/// `x.sin(x)` like function over `[0, 25]`
pub fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
    x.column(0)
        .mapv(|xi| (xi - 3.5) * ((xi - 3.5) / PI).sin())
        .insert_axis(Axis(1))
}

/// Branin function over `[-5, 10] x [0, 15]`
pub fn branin(x: &ArrayView2<f64>) -> Array2<f64> {
    let (b, c, t) = (5.1 / (4. * PI * PI), 5. / PI, 1. / (8. * PI));
    let mut y = Array2::zeros((x.nrows(), 1));
    Zip::from(y.rows_mut()).and(x.rows()).for_each(|mut y, x| {
        let (x1, x2) = (x[0], x[1]);
        y[0] = (x2 - b * x1 * x1 + c * x1 - 6.).powi(2) + 10. * (1. - t) * x1.cos() + 10.;
    });
    y
}

/// Available test functions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestFunction {
    /// [`forrester`]
    Forrester,
    /// [`xsinx`]
    Xsinx,
    /// [`branin`]
    Branin,
}

impl TestFunction {
    /// Input dimension of the function
    pub fn dim(&self) -> usize {
        match self {
            TestFunction::Forrester | TestFunction::Xsinx => 1,
            TestFunction::Branin => 2,
        }
    }

    /// Usual `(lower, upper)` bounds of the function inputs
    pub fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        match self {
            TestFunction::Forrester => (vec![0.], vec![1.]),
            TestFunction::Xsinx => (vec![0.], vec![25.]),
            TestFunction::Branin => (vec![-5., 0.], vec![10., 15.]),
        }
    }

    /// Evaluates the function
    pub fn eval(&self, x: &ArrayView2<f64>) -> Array2<f64> {
        match self {
            TestFunction::Forrester => forrester(x),
            TestFunction::Xsinx => xsinx(x),
            TestFunction::Branin => branin(x),
        }
    }
}

impl FromStr for TestFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forrester" => Ok(TestFunction::Forrester),
            "xsinx" => Ok(TestFunction::Xsinx),
            "branin" => Ok(TestFunction::Branin),
            _ => Err(format!(
                "'{s}' is not a valid test function! Choose between 'forrester', 'xsinx', 'branin'"
            )),
        }
    }
}

impl fmt::Display for TestFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestFunction::Forrester => "forrester",
            TestFunction::Xsinx => "xsinx",
            TestFunction::Branin => "branin",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_forrester() {
        let y = forrester(&array![[0.], [1.]].view());
        assert_abs_diff_eq!(y[[0, 0]], 4. * (-4f64).sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(y[[1, 0]], 15.829731945974109, epsilon = 1e-9);
    }

    #[test]
    fn test_branin_minima() {
        let x = array![[-PI, 12.275], [PI, 2.275], [9.42478, 2.475]];
        let y = branin(&x.view());
        for v in y.iter() {
            assert_abs_diff_eq!(*v, 0.397887, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_xsinx_shape() {
        let y = xsinx(&array![[3.5], [10.]].view());
        assert_eq!(y.dim(), (2, 1));
        assert_abs_diff_eq!(y[[0, 0]], 0.);
    }

    #[test]
    fn test_from_str() {
        for f in [TestFunction::Forrester, TestFunction::Xsinx, TestFunction::Branin] {
            assert_eq!(f.to_string().parse::<TestFunction>().unwrap(), f);
            let (lower, upper) = f.bounds();
            assert_eq!(lower.len(), f.dim());
            assert_eq!(upper.len(), f.dim());
        }
        assert!("xyz".parse::<TestFunction>().is_err());
    }
}
