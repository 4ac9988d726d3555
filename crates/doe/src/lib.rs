/*!
This library implements space-filling Design of Experiments (DoE) methods a.k.a. sampling methods
used to build training, validation and test sets of surrogate models:
[simple random sampling](crate::Random), [Latin Hypercube sampling](crate::Lhs)
and [Sobol sequences](crate::Sobol).

A DoE method is a way to generate a set of points (i.e. a DoE) within a design (or sample) space `xlimits`.
The design space is defined as a 2D ndarray `(nx, 2)`, specifying lower bound and upper bound
of each `nx` components of the samples `x`. By default the design space is the unit hypercube.

Samplers own their seeded random generator: successive calls continue the same stream, so that
drawing the training set then the validation set from one sampler gives disjoint draws.

Example:
```
use gpemu_doe::{Design, DesignKind, Lhs, LhsKind, Random, SamplingMethod, Sobol};
use ndarray::{arr2};

// Design space is defined as [5., 10.] x [0., 1.], samples are 2-dimensional.
let xlimits = arr2(&[[5., 10.], [0., 1.]]);
// We generate five samples using centered Latin Hypercube sampling.
let samples = Lhs::new(&xlimits).kind(LhsKind::Centered).sample(5);
// or else randomly with a seed for reproducibility
let samples = Random::new_with_seed(&xlimits, 42).sample(5);
// or else with a scrambled Sobol sequence
let samples = Sobol::new_with_seed(&xlimits, 42).unwrap().sample(8);
// or choosing the strategy by name
let mut doe = Design::<f64>::new("lhs".parse().unwrap(), 2, Some(42)).unwrap();
let samples = doe.sample(5);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod design;
mod errors;
mod lhs;
mod random;
mod sobol;
mod traits;
mod utils;

pub use design::*;
pub use errors::*;
pub use lhs::*;
pub use random::*;
pub use sobol::*;
pub use traits::*;
pub use utils::{scale, unit_hypercube, xlimits_from_bounds};
