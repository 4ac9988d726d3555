/*!
`gpemu` is a toolbox to build and train gaussian process emulators a.k.a. surrogate models
of expensive functions.

It gathers:
* [`doe`]: space-filling designs of experiments (simple random, Latin hypercube, Sobol),
* [`train`]: datasets, early stopping, snapshotting and the multi-restart trainer,
* [`functions`]: analytical test functions used to try emulators out.

The `gpemu` binary builds datasets from the test functions and prints training summaries.
*/
#![warn(missing_docs)]
pub mod functions;

pub use gpemu_doe as doe;
pub use gpemu_train as train;

pub use gpemu_doe::{Design, DesignKind, LhsKind, SamplingMethod};
pub use gpemu_train::{
    Dataset, EarlyStoppingCriterion, GpModel, Optimizer, PkEarlyStopping, SnapshotPolicy,
    SnapshottingCriterion, SplitParams, Trainer, TrainerParams, TrainingSummary,
};
