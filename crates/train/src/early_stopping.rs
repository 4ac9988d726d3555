//! Early stopping criteria deciding when an emulator training restart should end.
//!
//! Criteria are fed one `(training_loss, validation_loss)` pair per epoch and track the
//! loss trajectory as well as the best epoch (lowest validation loss) of the current restart.
//! The progress quotient rule [`PkEarlyStopping`] follows:
//! Prechelt, Lutz. "Early stopping - but when?" Neural Networks: Tricks of the trade (1998).

use crate::errors::{Result, TrainError};
use linfa::Float;
use log::debug;
use serde::{Deserialize, Serialize};

/// Default generalization loss over training progress threshold of [`PkEarlyStopping`]
pub const PK_DEFAULT_ALPHA: f64 = 1.0;
/// Default number of strips without improvement tolerated by [`PkEarlyStopping`]
pub const PK_DEFAULT_PATIENCE: usize = 8;
/// Default number of epochs per strip of [`PkEarlyStopping`]
pub const PK_DEFAULT_STRIP_LENGTH: usize = 5;

/// Reason why a criterion stopped the training
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Generalization loss over training progress exceeded its threshold
    ProgressQuotient,
    /// Generalization loss exceeded its threshold for too many epochs
    GeneralizationLoss,
    /// Validation loss did not improve for too long
    NoImprovement,
}

/// Status of an early stopping criterion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarlyStoppingStatus {
    /// Training should go on
    #[default]
    Running,
    /// Training should stop
    Stopped(StopReason),
    /// Maximum number of epochs reached without stop signal
    Exhausted,
}

impl EarlyStoppingStatus {
    /// Whether no more update is expected
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EarlyStoppingStatus::Running)
    }
}

/// Epoch with the lowest validation loss seen so far
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestEpoch<F> {
    /// Epoch number, starting from 1
    pub epoch: usize,
    /// Validation loss at that epoch
    pub val_loss: F,
}

/// Losses of one epoch
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LossRecord<F> {
    /// Epoch number, starting from 1
    pub epoch: usize,
    /// Training loss
    pub train_loss: F,
    /// Validation loss
    pub val_loss: F,
}

/// A criterion fed with epoch losses which tells when training should stop
pub trait EarlyStoppingCriterion<F: Float> {
    /// Maximum number of epochs of one restart
    fn max_epochs(&self) -> usize;

    /// Rewinds the criterion: epoch 0, empty trajectory, no best epoch, `Running` status
    fn reset(&mut self);

    /// Records losses of the next epoch and returns the updated status.
    ///
    /// Fails with [`TrainError::InvalidState`] once a terminal status is reached
    /// and with [`TrainError::NumericFailure`] when a loss is not finite.
    fn update(&mut self, train_loss: F, val_loss: F) -> Result<EarlyStoppingStatus>;

    /// Current status
    fn status(&self) -> EarlyStoppingStatus;

    /// Number of recorded epochs
    fn epoch(&self) -> usize;

    /// Best epoch so far if any
    fn best(&self) -> Option<BestEpoch<F>>;

    /// Whether the last update reached a new best validation loss
    fn is_new_best(&self) -> bool;

    /// Recorded losses in epoch order
    fn trajectory(&self) -> &[LossRecord<F>];
}

/// Relative increase of `value` over `reference`, infinite when reference is zero.
fn relative_increase<F: Float>(value: F, reference: F) -> F {
    if value == reference {
        F::zero()
    } else if reference == F::zero() {
        F::infinity()
    } else {
        let scale = if reference < F::zero() {
            -reference
        } else {
            reference
        };
        (value - reference) / scale
    }
}

fn check_max_epochs(max_epochs: usize) -> Result<()> {
    if max_epochs == 0 {
        return Err(TrainError::InvalidConfiguration(
            "max_epochs should be strictly positive".to_string(),
        ));
    }
    Ok(())
}

fn check_patience(patience: usize) -> Result<()> {
    if patience == 0 {
        return Err(TrainError::InvalidConfiguration(
            "patience should be strictly positive".to_string(),
        ));
    }
    Ok(())
}

fn check_threshold<F: Float>(name: &str, value: F) -> Result<()> {
    if !value.is_finite() || value < F::zero() {
        return Err(TrainError::InvalidConfiguration(format!(
            "{name} should be a finite non negative value"
        )));
    }
    Ok(())
}

/// Bookkeeping shared by all criteria
#[derive(Clone, Debug)]
struct LossTracker<F: Float> {
    max_epochs: usize,
    trajectory: Vec<LossRecord<F>>,
    best: Option<BestEpoch<F>>,
    new_best: bool,
    status: EarlyStoppingStatus,
}

impl<F: Float> LossTracker<F> {
    fn new(max_epochs: usize) -> Result<Self> {
        check_max_epochs(max_epochs)?;
        Ok(LossTracker {
            max_epochs,
            trajectory: Vec::with_capacity(max_epochs.min(1024)),
            best: None,
            new_best: false,
            status: EarlyStoppingStatus::Running,
        })
    }

    fn reset(&mut self) {
        self.trajectory.clear();
        self.best = None;
        self.new_best = false;
        self.status = EarlyStoppingStatus::Running;
    }

    fn epoch(&self) -> usize {
        self.trajectory.len()
    }

    /// Appends the epoch losses and updates the running best
    fn record(&mut self, train_loss: F, val_loss: F) -> Result<()> {
        if self.status.is_terminal() {
            return Err(TrainError::InvalidState(format!(
                "criterion already terminated ({:?}) at epoch {}, reset it before updating",
                self.status,
                self.epoch()
            )));
        }
        if !train_loss.is_finite() || !val_loss.is_finite() {
            return Err(TrainError::NumericFailure(format!(
                "non finite loss at epoch {} (train: {train_loss}, val: {val_loss})",
                self.epoch() + 1
            )));
        }
        let epoch = self.epoch() + 1;
        self.trajectory.push(LossRecord {
            epoch,
            train_loss,
            val_loss,
        });
        self.new_best = self.best.map_or(true, |best| val_loss < best.val_loss);
        if self.new_best {
            self.best = Some(BestEpoch { epoch, val_loss });
        }
        Ok(())
    }

    /// Sets the status given the criterion decision for the last recorded epoch
    fn conclude(&mut self, stop: Option<StopReason>) -> EarlyStoppingStatus {
        self.status = match stop {
            Some(reason) => EarlyStoppingStatus::Stopped(reason),
            None if self.epoch() >= self.max_epochs => EarlyStoppingStatus::Exhausted,
            None => EarlyStoppingStatus::Running,
        };
        self.status
    }

    /// Generalization loss (in percent) of the last epoch
    fn generalization_loss(&self) -> F {
        match (self.trajectory.last(), self.best) {
            (Some(last), Some(best)) => {
                F::cast(100.) * relative_increase(last.val_loss, best.val_loss)
            }
            _ => F::zero(),
        }
    }
}

macro_rules! delegate_tracker {
    () => {
        fn max_epochs(&self) -> usize {
            self.tracker.max_epochs
        }

        fn status(&self) -> EarlyStoppingStatus {
            self.tracker.status
        }

        fn epoch(&self) -> usize {
            self.tracker.epoch()
        }

        fn best(&self) -> Option<BestEpoch<F>> {
            self.tracker.best
        }

        fn is_new_best(&self) -> bool {
            self.tracker.new_best
        }

        fn trajectory(&self) -> &[LossRecord<F>] {
            &self.tracker.trajectory
        }
    };
}

/// Progress quotient criterion.
///
/// Epochs are grouped in strips of `strip_length` epochs. At the end of each strip, with
/// `E_opt` the lowest validation loss so far and `E_va` the last one:
/// * generalization loss `GL = 100 * (E_va - E_opt) / |E_opt|`
/// * training progress `P_k = 1000 * (mean - min) / |min|` over the strip training losses
///
/// Training stops when `GL / P_k > alpha` (no training progress at all counts as an unbounded
/// quotient) or when `patience` successive strips did not improve `E_opt`. A strip which does not
/// improve `E_opt` while its validation losses stay flat is a plateau and stops training as well.
#[derive(Clone, Debug)]
pub struct PkEarlyStopping<F: Float> {
    alpha: F,
    patience: usize,
    strip_length: usize,
    strips_without_improvement: usize,
    tracker: LossTracker<F>,
}

impl<F: Float> PkEarlyStopping<F> {
    /// Constructor with default alpha, patience and strip length
    pub fn new(max_epochs: usize) -> Result<Self> {
        Self::with_params(
            max_epochs,
            F::cast(PK_DEFAULT_ALPHA),
            PK_DEFAULT_PATIENCE,
            PK_DEFAULT_STRIP_LENGTH,
        )
    }

    /// Constructor given all parameters
    pub fn with_params(
        max_epochs: usize,
        alpha: F,
        patience: usize,
        strip_length: usize,
    ) -> Result<Self> {
        check_threshold("alpha", alpha)?;
        check_patience(patience)?;
        if strip_length == 0 {
            return Err(TrainError::InvalidConfiguration(
                "strip_length should be strictly positive".to_string(),
            ));
        }
        Ok(PkEarlyStopping {
            alpha,
            patience,
            strip_length,
            strips_without_improvement: 0,
            tracker: LossTracker::new(max_epochs)?,
        })
    }

    /// Quotient threshold
    pub fn alpha(&self) -> F {
        self.alpha
    }

    /// Number of strips without improvement before stopping
    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Number of epochs per strip
    pub fn strip_length(&self) -> usize {
        self.strip_length
    }

    fn last_strip(&self) -> &[LossRecord<F>] {
        let start = self.tracker.epoch() - self.strip_length;
        &self.tracker.trajectory[start..]
    }

    /// Training progress (per thousand) over the last strip
    fn training_progress(&self) -> F {
        let strip = self.last_strip();
        let n = F::cast(strip.len());
        let (sum, min) = strip
            .iter()
            .fold((F::zero(), F::infinity()), |(sum, min), r| {
                (sum + r.train_loss, min.min(r.train_loss))
            });
        F::cast(1000.) * relative_increase(sum / n, min)
    }

    /// Whether validation losses of the last strip are all equal up to rounding
    fn validation_plateau(&self) -> bool {
        let (min, max) = self
            .last_strip()
            .iter()
            .fold((F::infinity(), F::neg_infinity()), |(min, max), r| {
                (min.min(r.val_loss), max.max(r.val_loss))
            });
        relative_increase(max, min) <= F::epsilon()
    }

    fn end_of_strip(&mut self) -> Option<StopReason> {
        let epoch = self.tracker.epoch();
        let gl = self.tracker.generalization_loss();
        let pk = self.training_progress();
        let pq = if pk > F::zero() {
            gl / pk
        } else {
            F::infinity()
        };
        debug!("Strip end at epoch {epoch}: GL={gl}, Pk={pk}, PQ={pq}");
        if pq > self.alpha {
            return Some(StopReason::ProgressQuotient);
        }
        let improved = self
            .tracker
            .best
            .is_some_and(|best| best.epoch + self.strip_length > epoch);
        if improved {
            self.strips_without_improvement = 0;
        } else {
            self.strips_without_improvement += 1;
            if self.validation_plateau() {
                debug!("Validation loss plateau over the strip ending at epoch {epoch}");
                return Some(StopReason::NoImprovement);
            }
        }
        (self.strips_without_improvement >= self.patience).then_some(StopReason::NoImprovement)
    }
}

impl<F: Float> EarlyStoppingCriterion<F> for PkEarlyStopping<F> {
    delegate_tracker!();

    fn reset(&mut self) {
        self.strips_without_improvement = 0;
        self.tracker.reset();
    }

    fn update(&mut self, train_loss: F, val_loss: F) -> Result<EarlyStoppingStatus> {
        self.tracker.record(train_loss, val_loss)?;
        let stop = if self.tracker.epoch() % self.strip_length == 0 {
            self.end_of_strip()
        } else {
            None
        };
        Ok(self.tracker.conclude(stop))
    }
}

/// Generalization loss criterion: stops when `GL > alpha` for `patience` successive epochs
#[derive(Clone, Debug)]
pub struct GlEarlyStopping<F: Float> {
    alpha: F,
    patience: usize,
    epochs_over_threshold: usize,
    tracker: LossTracker<F>,
}

impl<F: Float> GlEarlyStopping<F> {
    /// Constructor
    pub fn new(max_epochs: usize, alpha: F, patience: usize) -> Result<Self> {
        check_threshold("alpha", alpha)?;
        check_patience(patience)?;
        Ok(GlEarlyStopping {
            alpha,
            patience,
            epochs_over_threshold: 0,
            tracker: LossTracker::new(max_epochs)?,
        })
    }
}

impl<F: Float> EarlyStoppingCriterion<F> for GlEarlyStopping<F> {
    delegate_tracker!();

    fn reset(&mut self) {
        self.epochs_over_threshold = 0;
        self.tracker.reset();
    }

    fn update(&mut self, train_loss: F, val_loss: F) -> Result<EarlyStoppingStatus> {
        self.tracker.record(train_loss, val_loss)?;
        if self.tracker.generalization_loss() > self.alpha {
            self.epochs_over_threshold += 1;
        } else {
            self.epochs_over_threshold = 0;
        }
        let stop = (self.epochs_over_threshold >= self.patience)
            .then_some(StopReason::GeneralizationLoss);
        Ok(self.tracker.conclude(stop))
    }
}

/// Patience criterion: stops when validation loss did not decrease by more than `min_delta`
/// during `patience` epochs
#[derive(Clone, Debug)]
pub struct SimpleEarlyStopping<F: Float> {
    patience: usize,
    min_delta: F,
    reference: Option<F>,
    wait: usize,
    tracker: LossTracker<F>,
}

impl<F: Float> SimpleEarlyStopping<F> {
    /// Constructor
    pub fn new(max_epochs: usize, patience: usize, min_delta: F) -> Result<Self> {
        check_patience(patience)?;
        check_threshold("min_delta", min_delta)?;
        Ok(SimpleEarlyStopping {
            patience,
            min_delta,
            reference: None,
            wait: 0,
            tracker: LossTracker::new(max_epochs)?,
        })
    }
}

impl<F: Float> EarlyStoppingCriterion<F> for SimpleEarlyStopping<F> {
    delegate_tracker!();

    fn reset(&mut self) {
        self.reference = None;
        self.wait = 0;
        self.tracker.reset();
    }

    fn update(&mut self, train_loss: F, val_loss: F) -> Result<EarlyStoppingStatus> {
        self.tracker.record(train_loss, val_loss)?;
        match self.reference {
            Some(reference) if val_loss >= reference - self.min_delta => self.wait += 1,
            _ => {
                self.reference = Some(val_loss);
                self.wait = 0;
            }
        }
        let stop = (self.wait >= self.patience).then_some(StopReason::NoImprovement);
        Ok(self.tracker.conclude(stop))
    }
}

/// Criterion which never stops before `max_epochs`
#[derive(Clone, Debug)]
pub struct NoEarlyStopping<F: Float> {
    tracker: LossTracker<F>,
}

impl<F: Float> NoEarlyStopping<F> {
    /// Constructor
    pub fn new(max_epochs: usize) -> Result<Self> {
        Ok(NoEarlyStopping {
            tracker: LossTracker::new(max_epochs)?,
        })
    }
}

impl<F: Float> EarlyStoppingCriterion<F> for NoEarlyStopping<F> {
    delegate_tracker!();

    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn update(&mut self, train_loss: F, val_loss: F) -> Result<EarlyStoppingStatus> {
        self.tracker.record(train_loss, val_loss)?;
        Ok(self.tracker.conclude(None))
    }
}
