//! Training, validation and test splits of an emulated function

use crate::errors::{Result, TrainError};
use gpemu_doe::{xlimits_from_bounds, Design, DesignKind, SamplingMethod};
use linfa::{Float, ParamGuard};
use log::debug;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use ndarray_npy::{read_npy, write_npy, ReadableElement, WritableElement};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default label of the output variable
pub const DEFAULT_Y_LABEL: &str = "Output";

const LABELS_FILE: &str = "labels.json";

/// Train/validation/test splits used to fit and assess an emulator.
///
/// Inputs are `(n, input_size)` matrices, outputs are `(n, n_outputs)` matrices.
/// `input_size` is set once from the training inputs and every other split is checked against it.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset<F: Float> {
    x_train: Array2<F>,
    y_train: Array2<F>,
    x_val: Option<Array2<F>>,
    y_val: Option<Array2<F>>,
    x_test: Option<Array2<F>>,
    y_test: Option<Array2<F>>,
    input_size: usize,
    x_labels: Vec<String>,
    y_label: String,
}

#[derive(Serialize, Deserialize)]
struct Labels {
    x_labels: Vec<String>,
    y_label: String,
}

fn default_x_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("p{i}")).collect()
}

fn check_split<F: Float>(
    name: &str,
    input_size: usize,
    x: &Array2<F>,
    y: &Array2<F>,
) -> Result<()> {
    if x.ncols() != input_size {
        return Err(TrainError::DataShapeError(format!(
            "{name} inputs should have {input_size} columns, got {}",
            x.ncols()
        )));
    }
    if x.nrows() != y.nrows() {
        return Err(TrainError::DataShapeError(format!(
            "{name} inputs and outputs row counts differ ({} != {})",
            x.nrows(),
            y.nrows()
        )));
    }
    Ok(())
}

impl<F: Float> Dataset<F> {
    /// Constructor from training inputs `(n, d)` and outputs `(n, m)`
    pub fn new(x_train: Array2<F>, y_train: Array2<F>) -> Result<Self> {
        let input_size = x_train.ncols();
        if input_size == 0 {
            return Err(TrainError::DataShapeError(
                "training inputs should have at least one column".to_string(),
            ));
        }
        check_split("training", input_size, &x_train, &y_train)?;
        Ok(Dataset {
            x_train,
            y_train,
            x_val: None,
            y_val: None,
            x_test: None,
            y_test: None,
            input_size,
            x_labels: default_x_labels(input_size),
            y_label: DEFAULT_Y_LABEL.to_string(),
        })
    }

    /// Constructor from one dimensional training inputs and outputs,
    /// each viewed as a single column
    pub fn from_1d(x_train: Array1<F>, y_train: Array1<F>) -> Result<Self> {
        Self::new(x_train.insert_axis(Axis(1)), y_train.insert_axis(Axis(1)))
    }

    /// Sets the validation split
    pub fn with_val_split(mut self, x_val: Array2<F>, y_val: Array2<F>) -> Result<Self> {
        check_split("validation", self.input_size, &x_val, &y_val)?;
        self.x_val = Some(x_val);
        self.y_val = Some(y_val);
        Ok(self)
    }

    /// Sets the test split
    pub fn with_test_split(mut self, x_test: Array2<F>, y_test: Array2<F>) -> Result<Self> {
        check_split("test", self.input_size, &x_test, &y_test)?;
        self.x_test = Some(x_test);
        self.y_test = Some(y_test);
        Ok(self)
    }

    /// Sets input labels, one per input column
    pub fn with_x_labels(mut self, x_labels: Vec<String>) -> Result<Self> {
        if x_labels.len() != self.input_size {
            return Err(TrainError::DataShapeError(format!(
                "expected {} input labels, got {}",
                self.input_size,
                x_labels.len()
            )));
        }
        self.x_labels = x_labels;
        Ok(self)
    }

    /// Sets output label
    pub fn with_y_label(mut self, y_label: impl Into<String>) -> Self {
        self.y_label = y_label.into();
        self
    }

    /// Builds a dataset by sampling `f` over a design of experiments.
    ///
    /// Training, validation and test inputs are drawn in that order from one sampler
    /// so that the splits do not overlap. A split with zero requested points is left absent.
    ///
    /// ```
    /// use gpemu_train::{Dataset, SplitParams};
    /// use linfa::ParamGuard;
    /// use ndarray::{Array2, ArrayView2, Axis};
    ///
    /// fn f(x: &ArrayView2<f64>) -> Array2<f64> {
    ///     x.map_axis(Axis(1), |r| r.sum()).insert_axis(Axis(1))
    /// }
    ///
    /// let params = SplitParams::new(2, 20).n_val(5).seed(42).check().unwrap();
    /// let dataset = Dataset::build_from_function(f, &params).unwrap();
    /// assert!(dataset.with_val());
    /// ```
    pub fn build_from_function(
        f: impl Fn(&ArrayView2<F>) -> Array2<F>,
        params: &SplitValidParams<F>,
    ) -> Result<Self> {
        let mut doe = Design::new(params.kind, params.dim, params.seed)?;
        if let Some((lower, upper)) = &params.bounds {
            doe = doe.with_bounds(lower, upper)?;
        }
        debug!(
            "Sample {} design of dim {} ({} train, {} val, {} test)",
            params.kind, params.dim, params.n_train, params.n_val, params.n_test
        );

        let mut split = |n: usize| -> Option<(Array2<F>, Array2<F>)> {
            (n > 0).then(|| {
                let x = doe.sample(n);
                let y = f(&x.view());
                (x, y)
            })
        };
        let train = split(params.n_train);
        let val = split(params.n_val);
        let test = split(params.n_test);

        let (x_train, y_train) = train.ok_or_else(|| {
            TrainError::InvalidConfiguration("training split should not be empty".to_string())
        })?;
        let mut dataset = Dataset::new(x_train, y_train)?;
        if let Some((x, y)) = val {
            dataset = dataset.with_val_split(x, y)?;
        }
        if let Some((x, y)) = test {
            dataset = dataset.with_test_split(x, y)?;
        }
        Ok(dataset)
    }

    /// Training inputs
    pub fn x_train(&self) -> &Array2<F> {
        &self.x_train
    }
    /// Training outputs
    pub fn y_train(&self) -> &Array2<F> {
        &self.y_train
    }
    /// Validation inputs if any
    pub fn x_val(&self) -> Option<&Array2<F>> {
        self.x_val.as_ref()
    }
    /// Validation outputs if any
    pub fn y_val(&self) -> Option<&Array2<F>> {
        self.y_val.as_ref()
    }
    /// Test inputs if any
    pub fn x_test(&self) -> Option<&Array2<F>> {
        self.x_test.as_ref()
    }
    /// Test outputs if any
    pub fn y_test(&self) -> Option<&Array2<F>> {
        self.y_test.as_ref()
    }

    /// Validation split when both inputs and outputs are present
    pub fn val_split(&self) -> Option<(&Array2<F>, &Array2<F>)> {
        self.x_val.as_ref().zip(self.y_val.as_ref())
    }

    /// Test split when both inputs and outputs are present
    pub fn test_split(&self) -> Option<(&Array2<F>, &Array2<F>)> {
        self.x_test.as_ref().zip(self.y_test.as_ref())
    }

    /// Whether a validation split is available
    pub fn with_val(&self) -> bool {
        self.val_split().is_some()
    }

    /// Number of training points
    pub fn sample_size(&self) -> usize {
        self.x_train.nrows()
    }

    /// Input dimension
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Input labels
    pub fn x_labels(&self) -> &[String] {
        &self.x_labels
    }

    /// Output label
    pub fn y_label(&self) -> &str {
        &self.y_label
    }
}

impl<F: Float + WritableElement + ReadableElement> Dataset<F> {
    /// Writes splits as `.npy` files in `dir` (`x_train.npy`, `y_train.npy`, ...)
    /// and labels as `labels.json`
    pub fn write_npy(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        write_npy(dir.join("x_train.npy"), &self.x_train)?;
        write_npy(dir.join("y_train.npy"), &self.y_train)?;
        if let Some((x, y)) = self.val_split() {
            write_npy(dir.join("x_val.npy"), x)?;
            write_npy(dir.join("y_val.npy"), y)?;
        }
        if let Some((x, y)) = self.test_split() {
            write_npy(dir.join("x_test.npy"), x)?;
            write_npy(dir.join("y_test.npy"), y)?;
        }
        let labels = Labels {
            x_labels: self.x_labels.clone(),
            y_label: self.y_label.clone(),
        };
        fs::write(dir.join(LABELS_FILE), serde_json::to_string_pretty(&labels)?)?;
        Ok(())
    }

    /// Reads a dataset written by [`Dataset::write_npy`].
    ///
    /// Validation and test splits are optional, labels default when `labels.json` is missing.
    pub fn read_npy(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let x_train: Array2<F> = read_npy(dir.join("x_train.npy"))?;
        let y_train: Array2<F> = read_npy(dir.join("y_train.npy"))?;
        let mut dataset = Dataset::new(x_train, y_train)?;
        if dir.join("x_val.npy").exists() {
            let x_val: Array2<F> = read_npy(dir.join("x_val.npy"))?;
            let y_val: Array2<F> = read_npy(dir.join("y_val.npy"))?;
            dataset = dataset.with_val_split(x_val, y_val)?;
        }
        if dir.join("x_test.npy").exists() {
            let x_test: Array2<F> = read_npy(dir.join("x_test.npy"))?;
            let y_test: Array2<F> = read_npy(dir.join("y_test.npy"))?;
            dataset = dataset.with_test_split(x_test, y_test)?;
        }
        let labels_path = dir.join(LABELS_FILE);
        if labels_path.exists() {
            let labels: Labels = serde_json::from_str(&fs::read_to_string(labels_path)?)?;
            dataset = dataset
                .with_x_labels(labels.x_labels)?
                .with_y_label(labels.y_label);
        }
        Ok(dataset)
    }
}

/// A set of validated dataset sampling parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitValidParams<F: Float> {
    pub(crate) dim: usize,
    pub(crate) n_train: usize,
    pub(crate) n_val: usize,
    pub(crate) n_test: usize,
    pub(crate) kind: DesignKind,
    pub(crate) seed: Option<u64>,
    pub(crate) bounds: Option<(Array1<F>, Array1<F>)>,
}

impl<F: Float> SplitValidParams<F> {
    /// Input dimension
    pub fn dim(&self) -> usize {
        self.dim
    }
    /// Number of training points
    pub fn n_train(&self) -> usize {
        self.n_train
    }
    /// Number of validation points
    pub fn n_val(&self) -> usize {
        self.n_val
    }
    /// Number of test points
    pub fn n_test(&self) -> usize {
        self.n_test
    }
    /// Sampling strategy
    pub fn kind(&self) -> DesignKind {
        self.kind
    }
    /// Sampler seed
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
    /// Sample space bounds as (lower, upper)
    pub fn bounds(&self) -> Option<&(Array1<F>, Array1<F>)> {
        self.bounds.as_ref()
    }
}

/// Parameters of [`Dataset::build_from_function`]
#[derive(Clone, Debug)]
pub struct SplitParams<F: Float>(SplitValidParams<F>);

impl<F: Float> SplitParams<F> {
    /// Constructor given input dimension and number of training points.
    /// Defaults to no validation nor test points, classic LHS unseeded, unit hypercube.
    pub fn new(dim: usize, n_train: usize) -> Self {
        Self(SplitValidParams {
            dim,
            n_train,
            n_val: 0,
            n_test: 0,
            kind: DesignKind::default(),
            seed: None,
            bounds: None,
        })
    }

    /// Set the number of validation points
    pub fn n_val(mut self, n_val: usize) -> Self {
        self.0.n_val = n_val;
        self
    }

    /// Set the number of test points
    pub fn n_test(mut self, n_test: usize) -> Self {
        self.0.n_test = n_test;
        self
    }

    /// Set the sampling strategy
    pub fn kind(mut self, kind: DesignKind) -> Self {
        self.0.kind = kind;
        self
    }

    /// Set the sampler seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = Some(seed);
        self
    }

    /// Set the sample space bounds
    pub fn bounds(mut self, lower: Array1<F>, upper: Array1<F>) -> Self {
        self.0.bounds = Some((lower, upper));
        self
    }
}

impl<F: Float> ParamGuard for SplitParams<F> {
    type Checked = SplitValidParams<F>;
    type Error = TrainError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.dim == 0 {
            return Err(TrainError::InvalidConfiguration(
                "input dimension should be strictly positive".to_string(),
            ));
        }
        if self.0.n_train == 0 {
            return Err(TrainError::InvalidConfiguration(
                "number of training points should be strictly positive".to_string(),
            ));
        }
        if let Some((lower, upper)) = &self.0.bounds {
            if lower.len() != self.0.dim || upper.len() != self.0.dim {
                return Err(TrainError::InvalidConfiguration(format!(
                    "bounds should have {} components, got {} lower and {} upper",
                    self.0.dim,
                    lower.len(),
                    upper.len()
                )));
            }
            xlimits_from_bounds(lower, upper)?;
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gpemu_doe::LhsKind;
    use ndarray::{array, concatenate};

    fn sum_rows(x: &ArrayView2<f64>) -> Array2<f64> {
        x.map_axis(Axis(1), |r| r.sum()).insert_axis(Axis(1))
    }

    #[test]
    fn test_default_labels() {
        let dataset = Dataset::new(Array2::<f64>::zeros((4, 3)), Array2::zeros((4, 1))).unwrap();
        assert_eq!(dataset.x_labels(), &["p1", "p2", "p3"]);
        assert_eq!(dataset.y_label(), "Output");
        assert_eq!(dataset.sample_size(), 4);
        assert_eq!(dataset.input_size(), 3);
        assert!(!dataset.with_val());
    }

    #[test]
    fn test_flat_input_is_one_column() {
        let dataset = Dataset::from_1d(array![0., 0.5, 1.], array![1., 2., 3.]).unwrap();
        assert_eq!(dataset.input_size(), 1);
        assert_eq!(dataset.x_labels(), &["p1"]);
        assert_eq!(dataset.x_train().dim(), (3, 1));
    }

    #[test]
    fn test_shape_errors() {
        let dataset = Dataset::new(Array2::<f64>::zeros((4, 2)), Array2::zeros((4, 1))).unwrap();
        let res = dataset
            .clone()
            .with_val_split(Array2::zeros((3, 3)), Array2::zeros((3, 1)));
        assert!(matches!(res, Err(TrainError::DataShapeError(_))));
        let res = dataset
            .clone()
            .with_test_split(Array2::zeros((3, 2)), Array2::zeros((2, 1)));
        assert!(matches!(res, Err(TrainError::DataShapeError(_))));
        let res = dataset.with_x_labels(vec!["a".to_string()]);
        assert!(matches!(res, Err(TrainError::DataShapeError(_))));
        let res = Dataset::new(Array2::<f64>::zeros((4, 2)), Array2::zeros((3, 1)));
        assert!(matches!(res, Err(TrainError::DataShapeError(_))));
    }

    #[test]
    fn test_build_from_function() {
        let params = SplitParams::new(2, 20)
            .n_val(5)
            .n_test(7)
            .seed(42)
            .bounds(array![-1., 10.], array![1., 20.])
            .check()
            .unwrap();
        let dataset = Dataset::build_from_function(sum_rows, &params).unwrap();
        assert!(dataset.with_val());
        assert_eq!(dataset.sample_size(), 20);
        assert_eq!(dataset.x_val().unwrap().nrows(), 5);
        assert_eq!(dataset.x_test().unwrap().nrows(), 7);
        let (x_val, y_val) = dataset.val_split().unwrap();
        assert_abs_diff_eq!(*y_val, sum_rows(&x_val.view()), epsilon = 1e-12);
        for x in [dataset.x_train(), x_val, dataset.x_test().unwrap()] {
            assert!(x.column(0).iter().all(|v| (-1. ..=1.).contains(v)));
            assert!(x.column(1).iter().all(|v| (10. ..=20.).contains(v)));
        }
    }

    #[test]
    fn test_build_draws_splits_from_one_stream() {
        let params = SplitParams::new(3, 5)
            .n_val(3)
            .n_test(2)
            .kind(DesignKind::SimpleRandom)
            .seed(7)
            .check()
            .unwrap();
        let dataset = Dataset::build_from_function(sum_rows, &params).unwrap();
        let all = Design::<f64>::new(DesignKind::SimpleRandom, 3, Some(7))
            .unwrap()
            .sample(10);
        let splits = concatenate(
            Axis(0),
            &[
                dataset.x_train().view(),
                dataset.x_val().unwrap().view(),
                dataset.x_test().unwrap().view(),
            ],
        )
        .unwrap();
        assert_abs_diff_eq!(all, splits, epsilon = 1e-12);
    }

    #[test]
    fn test_build_lhs_is_reproducible() {
        let params = SplitParams::new(2, 6)
            .n_val(4)
            .kind(DesignKind::LatinHypercube(LhsKind::Classic))
            .seed(3)
            .check()
            .unwrap();
        let d1 = Dataset::build_from_function(sum_rows, &params).unwrap();
        let d2 = Dataset::build_from_function(sum_rows, &params).unwrap();
        assert_eq!(d1, d2);
        let other = Design::<f64>::new(DesignKind::LatinHypercube(LhsKind::Classic), 2, Some(3))
            .unwrap()
            .sample(4);
        assert_ne!(d1.x_val().unwrap(), &other);
    }

    #[test]
    fn test_zero_sized_splits_are_absent() {
        let params = SplitParams::new(1, 4).seed(0).check().unwrap();
        let dataset = Dataset::build_from_function(sum_rows, &params).unwrap();
        assert!(!dataset.with_val());
        assert!(dataset.test_split().is_none());
    }

    #[test]
    fn test_invalid_params() {
        assert!(matches!(
            SplitParams::<f64>::new(2, 0).check(),
            Err(TrainError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SplitParams::<f64>::new(0, 5).check(),
            Err(TrainError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SplitParams::new(2, 5)
                .bounds(array![0.], array![1.])
                .check(),
            Err(TrainError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SplitParams::new(2, 5)
                .bounds(array![0., 0.], array![1.])
                .check(),
            Err(TrainError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SplitParams::new(1, 5)
                .bounds(array![1.], array![0.])
                .check(),
            Err(TrainError::DoeError(_))
        ));
    }

    #[test]
    fn test_npy_roundtrip() {
        let params = SplitParams::new(2, 8).n_test(3).seed(1).check().unwrap();
        let dataset = Dataset::build_from_function(sum_rows, &params)
            .unwrap()
            .with_x_labels(vec!["a".to_string(), "b".to_string()])
            .unwrap()
            .with_y_label("f");
        let dir = "target/tests/dataset_npy";
        dataset.write_npy(dir).unwrap();
        let loaded = Dataset::<f64>::read_npy(dir).unwrap();
        assert_eq!(dataset, loaded);
        assert!(!loaded.with_val());
    }
}
