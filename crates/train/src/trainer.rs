use crate::dataset::Dataset;
use crate::early_stopping::{EarlyStoppingCriterion, EarlyStoppingStatus};
use crate::errors::{Result, TrainError};
use crate::metrics::{MeanSquaredError, Metric, R2Score};
use crate::parameters::{RestartFailurePolicy, TrainerValidParams};
use crate::traits::{GpModel, Optimizer, Prediction};

use env_logger::{Builder, Env};
use linfa::Float;
use log::{debug, info, warn};
use ndarray::{ArrayBase, Data, Ix2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one training restart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestartSummary<F> {
    /// Restart index, starting from 0
    pub restart: usize,
    /// Epoch of lowest validation loss
    pub best_epoch: usize,
    /// Lowest validation loss
    pub best_val_loss: F,
    /// Last trained epoch
    pub last_epoch: usize,
    /// Criterion status at the end of the restart
    pub status: EarlyStoppingStatus,
}

/// A restart discarded under [`RestartFailurePolicy::SkipRestart`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRestart {
    /// Restart index, starting from 0
    pub restart: usize,
    /// Error message
    pub error: String,
}

/// A named metric value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricValue<F> {
    /// Metric name
    pub name: String,
    /// Metric value
    pub value: F,
}

/// Split used to compute final metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoredSplit {
    /// Validation split
    Validation,
    /// Training split, used when no validation split is available
    Training,
}

/// Report of a multi-restart training
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary<F> {
    /// Successful restarts in training order
    pub restarts: Vec<RestartSummary<F>>,
    /// Skipped restarts
    pub failed_restarts: Vec<FailedRestart>,
    /// Index of the selected restart
    pub best_restart: usize,
    /// Selected epoch within the best restart
    pub best_epoch: usize,
    /// Validation loss of the selected state
    pub best_val_loss: F,
    /// Checkpoint the selected state was restored from
    pub checkpoint: PathBuf,
    /// Split used to compute `metrics`
    pub scored_on: ScoredSplit,
    /// Final metrics of the selected state
    pub metrics: Vec<MetricValue<F>>,
}

impl<F: Float + for<'de> Deserialize<'de>> TrainingSummary<F> {
    /// Reads a summary saved as json
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TrainError::persistence(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl<F: Float + Serialize> TrainingSummary<F> {
    /// Writes the summary as json, creating missing directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TrainError::persistence(path, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| TrainError::persistence(path, e))
    }
}

impl<F: Float> fmt::Display for TrainingSummary<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "restart  best_epoch  best_val_loss  last_epoch  status")?;
        for r in self.restarts.iter() {
            writeln!(
                f,
                "{:>7}  {:>10}  {:>13.6e}  {:>10}  {:?}",
                r.restart, r.best_epoch, r.best_val_loss, r.last_epoch, r.status
            )?;
        }
        for failed in self.failed_restarts.iter() {
            writeln!(f, "{:>7}  skipped: {}", failed.restart, failed.error)?;
        }
        writeln!(
            f,
            "Best restart {} at epoch {} (val loss {:e}) restored from {}",
            self.best_restart,
            self.best_epoch,
            self.best_val_loss,
            self.checkpoint.display()
        )?;
        let split = match self.scored_on {
            ScoredSplit::Validation => "validation",
            ScoredSplit::Training => "training",
        };
        for m in self.metrics.iter() {
            writeln!(f, "{} ({split}) = {}", m.name, m.value)?;
        }
        Ok(())
    }
}

/// Multi-restart trainer of a [`GpModel`].
///
/// Each restart draws initial hyperparameters from the trainer generator, then runs
/// optimizer steps until the early stopping criterion stops or exhausts. Model states are
/// checkpointed along the way and the state with the lowest validation loss over all
/// restarts is finally restored.
pub struct Trainer<F: Float> {
    dataset: Dataset<F>,
    params: TrainerValidParams,
    seed: u64,
    metrics: Vec<Box<dyn Metric<F>>>,
}

impl<F: Float + Serialize> Trainer<F> {
    /// Constructor computing [`R2Score`] and [`MeanSquaredError`] as final metrics
    pub fn new(dataset: Dataset<F>, params: TrainerValidParams) -> Result<Self> {
        let env = Env::new().filter_or("GPEMU_LOG", "info");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        if dataset.sample_size() == 0 {
            return Err(TrainError::DataShapeError(
                "training split should not be empty".to_string(),
            ));
        }
        let seed = params.seed.unwrap_or_else(ndarray_rand::rand::random);
        let metrics: Vec<Box<dyn Metric<F>>> = vec![Box::new(R2Score), Box::new(MeanSquaredError)];
        Ok(Trainer {
            dataset,
            params,
            seed,
            metrics,
        })
    }

    /// Sets the metrics computed on the restored model
    pub fn metrics(mut self, metrics: Vec<Box<dyn Metric<F>>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Training data
    pub fn dataset(&self) -> &Dataset<F> {
        &self.dataset
    }

    /// Trainer parameters
    pub fn params(&self) -> &TrainerValidParams {
        &self.params
    }

    /// Trains `model` and returns it restored to its best checkpointed state
    pub fn train<M, O, C>(
        &self,
        mut model: M,
        optimizer: &mut O,
        criterion: &mut C,
    ) -> Result<TrainedEmulator<F, M>>
    where
        M: GpModel<F>,
        O: Optimizer<F>,
        C: EarlyStoppingCriterion<F>,
    {
        let n_restarts = self.params.n_restarts;
        let mut rng = Xoshiro256Plus::seed_from_u64(self.seed);
        let mut restarts = Vec::with_capacity(n_restarts);
        let mut failed_restarts = vec![];
        let mut last_error = None;

        for restart in 0..n_restarts {
            info!("Training restart {}/{}", restart + 1, n_restarts);
            match self.train_restart(restart, &mut model, optimizer, criterion, &mut rng) {
                Ok(summary) => {
                    info!(
                        "Restart {} ended at epoch {} ({:?}), best val loss {} at epoch {}",
                        restart,
                        summary.last_epoch,
                        summary.status,
                        summary.best_val_loss,
                        summary.best_epoch
                    );
                    restarts.push(summary);
                }
                Err(err) => match (self.params.on_failure, &err) {
                    (
                        RestartFailurePolicy::SkipRestart,
                        TrainError::NumericFailure(_) | TrainError::ModelError(_),
                    ) => {
                        warn!("Restart {restart} skipped: {err}");
                        failed_restarts.push(FailedRestart {
                            restart,
                            error: err.to_string(),
                        });
                        last_error = Some(err);
                    }
                    _ => return Err(err),
                },
            }
        }

        let best = select_best(&restarts).ok_or_else(|| {
            last_error.unwrap_or_else(|| {
                TrainError::InvalidState("no restart completed".to_string())
            })
        })?;
        let (best_restart, best_epoch, best_val_loss) =
            (best.restart, best.best_epoch, best.best_val_loss);

        let checkpoint = self.params.snapshot.path(best_restart, best_epoch);
        let state = self.params.snapshot.load(best_restart, best_epoch)?;
        model.load_state(&state)?;
        info!(
            "Best model from restart {best_restart} epoch {best_epoch} restored from {checkpoint:?}"
        );

        let (x, y, scored_on) = match self.dataset.val_split() {
            Some((x, y)) => (x, y, ScoredSplit::Validation),
            None => (
                self.dataset.x_train(),
                self.dataset.y_train(),
                ScoredSplit::Training,
            ),
        };
        let prediction = model.predict(&x.view())?;
        let metrics = evaluate(&self.metrics, &y.view(), &prediction)?;
        for m in metrics.iter() {
            info!("{} = {}", m.name, m.value);
        }

        let summary = TrainingSummary {
            restarts,
            failed_restarts,
            best_restart,
            best_epoch,
            best_val_loss,
            checkpoint,
            scored_on,
            metrics,
        };
        if let Some(path) = self.params.summary_file.as_ref() {
            summary.save(path)?;
            debug!("Training summary written in {path:?}");
        }

        Ok(TrainedEmulator {
            model,
            input_size: self.dataset.input_size(),
            summary,
        })
    }

    fn train_restart<M, O, C>(
        &self,
        restart: usize,
        model: &mut M,
        optimizer: &mut O,
        criterion: &mut C,
        rng: &mut Xoshiro256Plus,
    ) -> Result<RestartSummary<F>>
    where
        M: GpModel<F>,
        O: Optimizer<F>,
        C: EarlyStoppingCriterion<F>,
    {
        model.reset_parameters(rng)?;
        optimizer.reset();
        criterion.reset();

        let x_train = self.dataset.x_train().view();
        let y_train = self.dataset.y_train().view();
        let snapshot = &self.params.snapshot;
        loop {
            let (train_loss, grad) = model.loss_and_gradient(&x_train, &y_train)?;
            let mut params = model.parameters();
            optimizer.step(&mut params, &grad.view())?;
            if params.iter().any(|v| !v.is_finite()) {
                return Err(TrainError::NumericFailure(format!(
                    "non finite hyperparameters after optimizer step at epoch {}",
                    criterion.epoch() + 1
                )));
            }
            model.set_parameters(params)?;

            let val_loss = match self.dataset.val_split() {
                Some((x_val, y_val)) => model.loss(&x_val.view(), &y_val.view())?,
                None => model.loss(&x_train, &y_train)?,
            };
            if !train_loss.is_finite() || !val_loss.is_finite() {
                let epoch = criterion.epoch() + 1;
                return Err(TrainError::NumericFailure(format!(
                    "restart {restart} epoch {epoch}: train loss {train_loss}, val loss {val_loss}"
                )));
            }

            let status = criterion.update(train_loss, val_loss)?;
            if snapshot.should_save(criterion.is_new_best()) {
                snapshot.save(restart, criterion.epoch(), &model.save_state()?)?;
            }
            if status.is_terminal() {
                break;
            }
        }

        let best = criterion.best().ok_or_else(|| {
            TrainError::InvalidState(format!("restart {restart} ended without any epoch"))
        })?;
        Ok(RestartSummary {
            restart,
            best_epoch: best.epoch,
            best_val_loss: best.val_loss,
            last_epoch: criterion.epoch(),
            status: criterion.status(),
        })
    }
}

/// Restart with the lowest best validation loss, the first one on ties
fn select_best<F: Float>(restarts: &[RestartSummary<F>]) -> Option<&RestartSummary<F>> {
    restarts.iter().fold(None, |best, r| match best {
        Some(b) if b.best_val_loss <= r.best_val_loss => Some(b),
        _ => Some(r),
    })
}

fn evaluate<F: Float>(
    metrics: &[Box<dyn Metric<F>>],
    y: &ndarray::ArrayView2<F>,
    prediction: &Prediction<F>,
) -> Result<Vec<MetricValue<F>>> {
    metrics
        .iter()
        .map(|m| {
            Ok(MetricValue {
                name: m.name().to_string(),
                value: m.evaluate(y, prediction)?,
            })
        })
        .collect()
}

/// A trained model restored to its best state
pub struct TrainedEmulator<F: Float, M: GpModel<F>> {
    model: M,
    input_size: usize,
    summary: TrainingSummary<F>,
}

impl<F: Float, M: GpModel<F>> TrainedEmulator<F, M> {
    /// Predictive mean and standard deviation at `x` of shape `(n, input_size)`
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Prediction<F>> {
        if x.ncols() != self.input_size {
            return Err(TrainError::DataShapeError(format!(
                "emulator expects {} input columns, got {}",
                self.input_size,
                x.ncols()
            )));
        }
        Ok(self.model.predict(&x.view())?)
    }

    /// Computes `metrics` of predictions at `x` against true values `y`
    pub fn score(
        &self,
        metrics: &[Box<dyn Metric<F>>],
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Vec<MetricValue<F>>> {
        let prediction = self.predict(x)?;
        evaluate(metrics, &y.view(), &prediction)
    }

    /// The trained model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consumes the emulator and returns the trained model
    pub fn into_model(self) -> M {
        self.model
    }

    /// Training report
    pub fn summary(&self) -> &TrainingSummary<F> {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SplitParams;
    use crate::early_stopping::{NoEarlyStopping, PkEarlyStopping};
    use crate::parameters::TrainerParams;
    use crate::snapshot::{SnapshotPolicy, SnapshottingCriterion};
    use crate::traits::ModelResult;
    use approx::assert_abs_diff_eq;
    use linfa::ParamGuard;
    use ndarray::{array, Array1, Array2, ArrayView1, ArrayView2, Axis};
    use ndarray_rand::rand::Rng;

    /// `loss = floor[restart] + theta^2` where restart is counted by parameter resets.
    /// `nan_on` restart gives non finite losses, `fail_on` restart gives model errors.
    #[derive(Clone, Debug, Default)]
    struct ToyModel {
        floors: Vec<f64>,
        theta: f64,
        restart: usize,
        resets: usize,
        nan_on: Option<usize>,
        fail_on: Option<usize>,
    }

    impl ToyModel {
        fn new(floors: Vec<f64>) -> Self {
            ToyModel {
                floors,
                ..Default::default()
            }
        }

        fn floor(&self) -> f64 {
            if self.nan_on == Some(self.restart) {
                f64::NAN
            } else {
                self.floors[self.restart % self.floors.len()]
            }
        }
    }

    impl GpModel<f64> for ToyModel {
        fn reset_parameters(&mut self, rng: &mut Xoshiro256Plus) -> ModelResult<()> {
            self.restart = self.resets;
            self.resets += 1;
            self.theta = rng.gen_range(1.0..2.0);
            Ok(())
        }

        fn parameters(&self) -> Array1<f64> {
            array![self.theta]
        }

        fn set_parameters(&mut self, params: Array1<f64>) -> ModelResult<()> {
            self.theta = params[0];
            Ok(())
        }

        fn loss(&self, _x: &ArrayView2<f64>, _y: &ArrayView2<f64>) -> ModelResult<f64> {
            Ok(self.floor() + self.theta * self.theta)
        }

        fn loss_and_gradient(
            &self,
            x: &ArrayView2<f64>,
            y: &ArrayView2<f64>,
        ) -> ModelResult<(f64, Array1<f64>)> {
            if self.fail_on == Some(self.restart) {
                return Err("cholesky decomposition failed".into());
            }
            Ok((self.loss(x, y)?, array![2. * self.theta]))
        }

        fn predict(&self, x: &ArrayView2<f64>) -> ModelResult<Prediction<f64>> {
            let mean = x.sum_axis(Axis(1)).insert_axis(Axis(1)) + self.theta;
            let std = Array2::ones(mean.dim());
            Ok(Prediction { mean, std })
        }

        fn save_state(&self) -> ModelResult<Vec<u8>> {
            Ok(serde_json::to_vec(&(self.theta, self.restart))?)
        }

        fn load_state(&mut self, state: &[u8]) -> ModelResult<()> {
            let (theta, restart): (f64, usize) = serde_json::from_slice(state)?;
            self.theta = theta;
            self.restart = restart;
            Ok(())
        }
    }

    #[derive(Default)]
    struct GradientDescent {
        steps: usize,
    }

    impl Optimizer<f64> for GradientDescent {
        fn reset(&mut self) {
            self.steps = 0;
        }

        fn step(&mut self, params: &mut Array1<f64>, grad: &ArrayView1<f64>) -> ModelResult<()> {
            params.scaled_add(-0.1, grad);
            self.steps += 1;
            Ok(())
        }
    }

    fn identity(x: &ArrayView2<f64>) -> Array2<f64> {
        x.to_owned()
    }

    fn dataset(n_val: usize) -> Dataset<f64> {
        let params = SplitParams::new(1, 10).n_val(n_val).seed(42).check().unwrap();
        Dataset::build_from_function(identity, &params).unwrap()
    }

    fn params(dir: &str, n_restarts: usize) -> TrainerParams {
        let template = format!("target/tests/{dir}/{{restart}}/epoch_{{epoch}}.ckpt");
        let snapshot = SnapshottingCriterion::new(SnapshotPolicy::OnBest, template).unwrap();
        TrainerParams::new(snapshot).n_restarts(n_restarts).seed(42)
    }

    #[test]
    fn test_best_restart_selected() {
        let params = params("trainer_best", 3).check().unwrap();
        let trainer = Trainer::new(dataset(5), params).unwrap();
        let mut criterion = NoEarlyStopping::new(50).unwrap();
        let emulator = trainer
            .train(
                ToyModel::new(vec![0.30, 0.12, 0.5]),
                &mut GradientDescent::default(),
                &mut criterion,
            )
            .unwrap();
        let summary = emulator.summary();
        assert_eq!(summary.restarts.len(), 3);
        assert_eq!(summary.best_restart, 1);
        assert_eq!(summary.best_epoch, 50);
        assert_abs_diff_eq!(summary.best_val_loss, 0.12, epsilon = 1e-6);
        assert_abs_diff_eq!(summary.restarts[0].best_val_loss, 0.30, epsilon = 1e-6);
        assert_eq!(summary.scored_on, ScoredSplit::Validation);
        assert_eq!(summary.metrics.len(), 2);
        assert_eq!(
            summary.checkpoint,
            PathBuf::from("target/tests/trainer_best/1/epoch_50.ckpt")
        );
        // restored state is the one of the best restart
        assert_eq!(emulator.model().restart, 1);
        assert!(emulator.model().theta.abs() < 1e-3);
    }

    #[test]
    fn test_restarts_draw_distinct_initial_parameters() {
        let params = params("trainer_inits", 2).check().unwrap();
        let trainer = Trainer::new(dataset(0), params).unwrap();
        let mut model = ToyModel::new(vec![0.1]);
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        model.reset_parameters(&mut rng).unwrap();
        let first = model.theta;
        model.reset_parameters(&mut rng).unwrap();
        assert_ne!(first, model.theta);

        // same seed gives the same training
        let mut criterion = NoEarlyStopping::new(5).unwrap();
        let s1 = trainer
            .train(
                ToyModel::new(vec![0.1]),
                &mut GradientDescent::default(),
                &mut criterion,
            )
            .unwrap()
            .summary()
            .clone();
        let s2 = trainer
            .train(
                ToyModel::new(vec![0.1]),
                &mut GradientDescent::default(),
                &mut criterion,
            )
            .unwrap()
            .summary()
            .clone();
        assert_eq!(s1, s2);
        assert_ne!(s1.restarts[0].best_val_loss, s1.restarts[1].best_val_loss);
    }

    #[test]
    fn test_training_split_scored_without_validation() {
        let params = params("trainer_no_val", 1).check().unwrap();
        let trainer = Trainer::new(dataset(0), params).unwrap();
        let mut criterion = PkEarlyStopping::new(200).unwrap();
        let emulator = trainer
            .train(
                ToyModel::new(vec![0.2]),
                &mut GradientDescent::default(),
                &mut criterion,
            )
            .unwrap();
        assert_eq!(emulator.summary().scored_on, ScoredSplit::Training);
        assert!(emulator.summary().restarts[0].last_epoch <= 200);
    }

    #[test]
    fn test_predict_checks_input_size() {
        let params = params("trainer_predict", 1).check().unwrap();
        let trainer = Trainer::new(dataset(5), params).unwrap();
        let mut criterion = NoEarlyStopping::new(10).unwrap();
        let emulator = trainer
            .train(
                ToyModel::new(vec![0.2]),
                &mut GradientDescent::default(),
                &mut criterion,
            )
            .unwrap();
        assert!(matches!(
            emulator.predict(&Array2::<f64>::zeros((3, 2))),
            Err(TrainError::DataShapeError(_))
        ));
        let pred = emulator.predict(&Array2::<f64>::zeros((3, 1))).unwrap();
        assert_eq!(pred.mean.dim(), (3, 1));

        let metrics: Vec<Box<dyn Metric<f64>>> = vec![Box::new(MeanSquaredError)];
        let x = array![[0.5], [1.]];
        let theta = emulator.model().theta;
        let scores = emulator.score(&metrics, &x, &(&x + theta)).unwrap();
        assert_abs_diff_eq!(scores[0].value, 0.);
        let model = emulator.into_model();
        assert_eq!(model.restart, 0);
    }

    #[test]
    fn test_fail_fast() {
        let params = params("trainer_fail_fast", 3).check().unwrap();
        let trainer = Trainer::new(dataset(5), params).unwrap();
        let mut model = ToyModel::new(vec![0.2]);
        model.nan_on = Some(1);
        let mut criterion = NoEarlyStopping::new(10).unwrap();
        let res = trainer.train(model, &mut GradientDescent::default(), &mut criterion);
        assert!(matches!(res, Err(TrainError::NumericFailure(_))));
    }

    #[test]
    fn test_skip_failing_restarts() {
        let trainer = Trainer::new(
            dataset(5),
            params("trainer_skip", 3)
                .on_failure(RestartFailurePolicy::SkipRestart)
                .check()
                .unwrap(),
        )
        .unwrap();
        let mut model = ToyModel::new(vec![0.2, 0.1, 0.3]);
        model.nan_on = Some(1);
        model.fail_on = Some(2);
        let mut criterion = NoEarlyStopping::new(10).unwrap();
        let emulator = trainer
            .train(model, &mut GradientDescent::default(), &mut criterion)
            .unwrap();
        let summary = emulator.summary();
        assert_eq!(summary.restarts.len(), 1);
        assert_eq!(summary.best_restart, 0);
        let skipped: Vec<usize> = summary.failed_restarts.iter().map(|f| f.restart).collect();
        assert_eq!(skipped, vec![1, 2]);
    }

    #[test]
    fn test_all_restarts_failing_returns_last_error() {
        let trainer = Trainer::new(
            dataset(5),
            params("trainer_all_fail", 2)
                .on_failure(RestartFailurePolicy::SkipRestart)
                .check()
                .unwrap(),
        )
        .unwrap();
        let mut model = ToyModel::new(vec![0.2]);
        model.nan_on = Some(0);
        model.fail_on = Some(1);
        let mut criterion = NoEarlyStopping::new(10).unwrap();
        let res = trainer.train(model, &mut GradientDescent::default(), &mut criterion);
        assert!(matches!(res, Err(TrainError::ModelError(_))));
    }

    #[test]
    fn test_persistence_errors_are_fatal() {
        fs::create_dir_all("target/tests").unwrap();
        fs::write("target/tests/trainer_blocked", b"not a directory").unwrap();
        let snapshot = SnapshottingCriterion::new(
            SnapshotPolicy::Always,
            "target/tests/trainer_blocked/{restart}/{epoch}.ckpt",
        )
        .unwrap();
        let params = TrainerParams::new(snapshot)
            .n_restarts(2)
            .on_failure(RestartFailurePolicy::SkipRestart)
            .check()
            .unwrap();
        let trainer = Trainer::new(dataset(5), params).unwrap();
        let mut criterion = NoEarlyStopping::new(10).unwrap();
        let res = trainer.train(
            ToyModel::new(vec![0.2]),
            &mut GradientDescent::default(),
            &mut criterion,
        );
        assert!(matches!(res, Err(TrainError::PersistenceError { .. })));
    }

    #[test]
    fn test_summary_file() {
        let path = "target/tests/trainer_summary/summary.json";
        let params = params("trainer_summary", 2).summary_file(path).check().unwrap();
        let trainer = Trainer::new(dataset(5), params).unwrap();
        let mut criterion = NoEarlyStopping::new(10).unwrap();
        let emulator = trainer
            .train(
                ToyModel::new(vec![0.3, 0.2]),
                &mut GradientDescent::default(),
                &mut criterion,
            )
            .unwrap();
        let loaded = TrainingSummary::<f64>::from_file(path).unwrap();
        let summary = emulator.summary();
        assert_eq!(loaded.best_restart, 1);
        assert_eq!(loaded.best_epoch, summary.best_epoch);
        assert_eq!(loaded.restarts.len(), 2);
        assert_eq!(loaded.checkpoint, summary.checkpoint);
        assert_abs_diff_eq!(loaded.best_val_loss, summary.best_val_loss, epsilon = 1e-12);
        assert!(loaded.to_string().contains("Best restart 1"));
    }

    #[test]
    fn test_select_best_first_on_ties() {
        let summary = |restart, best_val_loss| RestartSummary {
            restart,
            best_epoch: 1,
            best_val_loss,
            last_epoch: 1,
            status: EarlyStoppingStatus::Exhausted,
        };
        let restarts = vec![summary(0, 0.3), summary(1, 0.12), summary(2, 0.12)];
        assert_eq!(select_best(&restarts).unwrap().restart, 1);
        assert!(select_best::<f64>(&[]).is_none());
    }
}
