//! Checkpointing of model states during training

use crate::errors::{Result, TrainError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Restart placeholder of a checkpoint path template
pub const RESTART_PLACEHOLDER: &str = "{restart}";
/// Epoch placeholder of a checkpoint path template
pub const EPOCH_PLACEHOLDER: &str = "{epoch}";

/// When model states are saved during training
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Save at every epoch
    Always,
    /// Never save
    Never,
    /// Save each time a new best validation loss is reached
    #[default]
    OnBest,
}

impl FromStr for SnapshotPolicy {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "always" => Ok(SnapshotPolicy::Always),
            "never" => Ok(SnapshotPolicy::Never),
            "on_best" => Ok(SnapshotPolicy::OnBest),
            _ => Err(TrainError::InvalidConfiguration(format!(
                "'{s}' is not a valid snapshot policy! Choose between 'always', 'never', 'on_best'"
            ))),
        }
    }
}

impl fmt::Display for SnapshotPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotPolicy::Always => "always",
            SnapshotPolicy::Never => "never",
            SnapshotPolicy::OnBest => "on_best",
        };
        write!(f, "{name}")
    }
}

/// Decides which epochs are checkpointed and where checkpoints are stored.
///
/// The `template` path contains `{restart}` and `{epoch}` placeholders, for instance
/// `"run/{restart}/epoch_{epoch}.ckpt"`, so that each `(restart, epoch)` gets its own file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshottingCriterion")]
pub struct SnapshottingCriterion {
    policy: SnapshotPolicy,
    template: String,
}

#[derive(Deserialize)]
struct RawSnapshottingCriterion {
    policy: SnapshotPolicy,
    template: String,
}

impl TryFrom<RawSnapshottingCriterion> for SnapshottingCriterion {
    type Error = TrainError;

    fn try_from(raw: RawSnapshottingCriterion) -> Result<Self> {
        SnapshottingCriterion::new(raw.policy, raw.template)
    }
}

impl SnapshottingCriterion {
    /// Constructor.
    ///
    /// Fails when the policy may save and the template misses one of the placeholders.
    pub fn new(policy: SnapshotPolicy, template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if policy != SnapshotPolicy::Never {
            for placeholder in [RESTART_PLACEHOLDER, EPOCH_PLACEHOLDER] {
                if !template.contains(placeholder) {
                    return Err(TrainError::InvalidConfiguration(format!(
                        "snapshot path template '{template}' should contain '{placeholder}'"
                    )));
                }
            }
        }
        Ok(SnapshottingCriterion { policy, template })
    }

    /// Snapshot policy
    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    /// Checkpoint path template
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Checkpoint path of the given restart and epoch
    ///
    /// ```
    /// use gpemu_train::{SnapshotPolicy, SnapshottingCriterion};
    /// use std::path::PathBuf;
    ///
    /// let snapshot =
    ///     SnapshottingCriterion::new(SnapshotPolicy::OnBest, "run/{restart}/epoch_{epoch}.ckpt")
    ///         .unwrap();
    /// assert_eq!(snapshot.path(2, 17), PathBuf::from("run/2/epoch_17.ckpt"));
    /// ```
    pub fn path(&self, restart: usize, epoch: usize) -> PathBuf {
        PathBuf::from(
            self.template
                .replace(RESTART_PLACEHOLDER, &restart.to_string())
                .replace(EPOCH_PLACEHOLDER, &epoch.to_string()),
        )
    }

    /// Whether current epoch has to be saved
    pub fn should_save(&self, is_new_best: bool) -> bool {
        match self.policy {
            SnapshotPolicy::Always => true,
            SnapshotPolicy::Never => false,
            SnapshotPolicy::OnBest => is_new_best,
        }
    }

    /// Writes the model state of the given restart and epoch, creating missing directories
    pub fn save(&self, restart: usize, epoch: usize, state: &[u8]) -> Result<PathBuf> {
        let path = self.path(restart, epoch);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TrainError::persistence(&path, e))?;
        }
        fs::write(&path, state).map_err(|e| TrainError::persistence(&path, e))?;
        debug!("Snapshot restart {restart} epoch {epoch} saved in {path:?}");
        Ok(path)
    }

    /// Reads back the model state of the given restart and epoch
    pub fn load(&self, restart: usize, epoch: usize) -> Result<Vec<u8>> {
        let path = self.path(restart, epoch);
        fs::read(&path).map_err(|e| TrainError::persistence(&path, e))
    }
}
