use crate::errors::{Result, TrainError};
use crate::snapshot::{SnapshotPolicy, SnapshottingCriterion};
use linfa::ParamGuard;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of training restarts
pub const DEFAULT_N_RESTARTS: usize = 10;

/// What happens when one training restart fails on a numeric or model error
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartFailurePolicy {
    /// The whole training is aborted
    #[default]
    FailFast,
    /// The failing restart is discarded and training goes on with the next one
    SkipRestart,
}

/// A set of validated trainer parameters.
///
/// Deserialized parameters go through the same checks as [`TrainerParams`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTrainerParams")]
pub struct TrainerValidParams {
    pub(crate) n_restarts: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) on_failure: RestartFailurePolicy,
    pub(crate) snapshot: SnapshottingCriterion,
    pub(crate) summary_file: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawTrainerParams {
    n_restarts: usize,
    seed: Option<u64>,
    on_failure: RestartFailurePolicy,
    snapshot: SnapshottingCriterion,
    summary_file: Option<PathBuf>,
}

impl TryFrom<RawTrainerParams> for TrainerValidParams {
    type Error = TrainError;

    fn try_from(raw: RawTrainerParams) -> Result<Self> {
        TrainerParams(TrainerValidParams {
            n_restarts: raw.n_restarts,
            seed: raw.seed,
            on_failure: raw.on_failure,
            snapshot: raw.snapshot,
            summary_file: raw.summary_file,
        })
        .check()
    }
}

impl TrainerValidParams {
    /// Number of training restarts
    pub fn n_restarts(&self) -> usize {
        self.n_restarts
    }

    /// Seed of the restart generator
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Restart failure handling
    pub fn on_failure(&self) -> RestartFailurePolicy {
        self.on_failure
    }

    /// Checkpointing of model states
    pub fn snapshot(&self) -> &SnapshottingCriterion {
        &self.snapshot
    }

    /// File where the training summary is written as json
    pub fn summary_file(&self) -> Option<&PathBuf> {
        self.summary_file.as_ref()
    }
}

#[derive(Clone, Debug)]
/// The set of parameters that can be specified for the execution of
/// the [training](crate::Trainer::train) of an emulator.
pub struct TrainerParams(TrainerValidParams);

impl TrainerParams {
    /// A constructor given the checkpointing criterion
    pub fn new(snapshot: SnapshottingCriterion) -> TrainerParams {
        Self(TrainerValidParams {
            n_restarts: DEFAULT_N_RESTARTS,
            seed: None,
            on_failure: RestartFailurePolicy::default(),
            snapshot,
            summary_file: None,
        })
    }

    /// Set the number of training restarts
    pub fn n_restarts(mut self, n_restarts: usize) -> Self {
        self.0.n_restarts = n_restarts;
        self
    }

    /// Set the seed of the generator drawing initial hyperparameters of each restart
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = Some(seed);
        self
    }

    /// Set restart failure handling
    pub fn on_failure(mut self, on_failure: RestartFailurePolicy) -> Self {
        self.0.on_failure = on_failure;
        self
    }

    /// Set the file where the training summary is written
    pub fn summary_file(mut self, summary_file: impl Into<PathBuf>) -> Self {
        self.0.summary_file = Some(summary_file.into());
        self
    }
}

impl From<TrainerValidParams> for TrainerParams {
    fn from(valid: TrainerValidParams) -> Self {
        TrainerParams(valid)
    }
}

impl ParamGuard for TrainerParams {
    type Checked = TrainerValidParams;
    type Error = TrainError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_restarts == 0 {
            return Err(TrainError::InvalidConfiguration(
                "`n_restarts` should be strictly positive".to_string(),
            ));
        }
        if self.0.snapshot.policy() == SnapshotPolicy::Never {
            return Err(TrainError::InvalidConfiguration(
                "best model cannot be restored without snapshots, choose 'always' or 'on_best' policy"
                    .to_string(),
            ));
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
