/*!
This library implements the multi-restart training of gaussian process emulators:

* building [train/validation/test splits](crate::Dataset) of a function sampled over a
  design of experiments (see `gpemu-doe`),
* [early stopping criteria](crate::EarlyStoppingCriterion) fed with epoch losses,
  the default one being the progress quotient rule [`PkEarlyStopping`],
* [snapshotting](crate::SnapshottingCriterion) of model states during training,
* the [trainer](crate::Trainer) which runs several restarts from random initial hyperparameters
  and restores the best state found.

The gaussian process itself and its hyperparameter optimizer are external: they are plugged in
through the [`GpModel`] and [`Optimizer`] traits.

Example:
```no_run
use gpemu_train::{
    Dataset, GpModel, Optimizer, PkEarlyStopping, SnapshotPolicy, SnapshottingCriterion,
    SplitParams, Trainer, TrainerParams,
};
use linfa::ParamGuard;
use ndarray::{Array2, ArrayView2};

fn forrester(x: &ArrayView2<f64>) -> Array2<f64> {
    x.mapv(|xi| (6. * xi - 2.).powi(2) * (12. * xi - 4.).sin())
}

fn train(model: impl GpModel<f64>, optimizer: &mut impl Optimizer<f64>) {
    let split = SplitParams::new(1, 20).n_val(5).seed(42).check().unwrap();
    let dataset = Dataset::build_from_function(forrester, &split).unwrap();

    let snapshot =
        SnapshottingCriterion::new(SnapshotPolicy::OnBest, "run/{restart}/epoch_{epoch}.ckpt")
            .unwrap();
    let params = TrainerParams::new(snapshot).n_restarts(5).seed(42).check().unwrap();
    let mut criterion = PkEarlyStopping::new(1000).unwrap();

    let emulator = Trainer::new(dataset, params)
        .unwrap()
        .train(model, optimizer, &mut criterion)
        .unwrap();
    println!("{}", emulator.summary());
}
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod dataset;
mod early_stopping;
mod errors;
mod metrics;
mod parameters;
mod snapshot;
mod trainer;
mod traits;

pub use dataset::*;
pub use early_stopping::*;
pub use errors::*;
pub use metrics::*;
pub use parameters::*;
pub use snapshot::*;
pub use trainer::*;
pub use traits::*;
