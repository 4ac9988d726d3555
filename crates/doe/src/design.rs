use crate::errors::{DoeError, Result};
use crate::utils::{unit_hypercube, xlimits_from_bounds};
use crate::{Lhs, LhsKind, Random, SamplingMethod, Sobol};
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Available space-filling design strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum DesignKind {
    /// Simple random sampling ("srs")
    SimpleRandom,
    /// Latin hypercube sampling ("lhs")
    LatinHypercube(LhsKind),
    /// Sobol low-discrepancy sequence ("sobol")
    Sobol {
        /// whether the sequence is scrambled
        scramble: bool,
    },
}

impl Default for DesignKind {
    fn default() -> Self {
        DesignKind::LatinHypercube(LhsKind::Classic)
    }
}

impl FromStr for DesignKind {
    type Err = DoeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "srs" => Ok(DesignKind::SimpleRandom),
            "lhs" => Ok(DesignKind::LatinHypercube(LhsKind::Classic)),
            "sobol" => Ok(DesignKind::Sobol { scramble: true }),
            _ => Err(DoeError::InvalidConfiguration(format!(
                "'{s}' is not a valid sampling design! Choose between 'srs', 'lhs', 'sobol'"
            ))),
        }
    }
}

impl fmt::Display for DesignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DesignKind::SimpleRandom => "srs",
            DesignKind::LatinHypercube(_) => "lhs",
            DesignKind::Sobol { .. } => "sobol",
        };
        write!(f, "{name}")
    }
}

/// A design sampler chosen at construction among the available strategies.
///
/// ```
/// use gpemu_doe::{Design, DesignKind, SamplingMethod};
/// use ndarray::array;
///
/// let mut doe = Design::<f64>::new("sobol".parse().unwrap(), 2, Some(42))
///     .unwrap()
///     .with_bounds(&array![0., -5.], &array![1., 5.])
///     .unwrap();
/// let train = doe.sample(8);
/// let valid = doe.sample(4);
/// ```
#[derive(Clone, Debug)]
pub enum Design<F: Float> {
    /// Simple random sampling
    SimpleRandom(Random<F>),
    /// Latin hypercube sampling
    LatinHypercube(Lhs<F>),
    /// Sobol sequence
    Sobol(Sobol<F>),
}

impl<F: Float> Design<F> {
    /// Builds a sampler of the given kind over `[0, 1]^dim`
    ///
    /// When `seed` is `None` a seed is drawn from entropy.
    pub fn new(kind: DesignKind, dim: usize, seed: Option<u64>) -> Result<Self> {
        if dim == 0 {
            return Err(DoeError::InvalidConfiguration(
                "design dimension should be strictly positive".to_string(),
            ));
        }
        let seed = seed.unwrap_or_else(ndarray_rand::rand::random);
        let xlimits = unit_hypercube::<F>(dim);
        let design = match kind {
            DesignKind::SimpleRandom => Design::SimpleRandom(Random::new_with_seed(&xlimits, seed)),
            DesignKind::LatinHypercube(lhs_kind) => {
                Design::LatinHypercube(Lhs::new_with_seed(&xlimits, seed).kind(lhs_kind))
            }
            DesignKind::Sobol { scramble } => {
                Design::Sobol(Sobol::new_with_seed(&xlimits, seed)?.scramble(scramble))
            }
        };
        Ok(design)
    }

    /// Sets the sample space bounds used by [`SamplingMethod::sample`].
    ///
    /// Fails if bounds lengths differ from the design dimension or if `lower < upper`
    /// does not hold elementwise.
    pub fn with_bounds(
        self,
        lower: &ArrayBase<impl Data<Elem = F>, Ix1>,
        upper: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<Self> {
        let dim = self.dim();
        if lower.len() != dim || upper.len() != dim {
            return Err(DoeError::InvalidConfiguration(format!(
                "bounds should have design dimension length {dim}, got {} and {}",
                lower.len(),
                upper.len()
            )));
        }
        let xlimits = xlimits_from_bounds(lower, upper)?;
        Ok(self.with_xlimits(xlimits))
    }

    fn with_xlimits(self, xlimits: Array2<F>) -> Self {
        match self {
            Design::SimpleRandom(doe) => {
                Design::SimpleRandom(Random::new_with_seed(&xlimits, doe.seed()))
            }
            Design::LatinHypercube(doe) => {
                let kind = doe.lhs_kind();
                Design::LatinHypercube(Lhs::new_with_seed(&xlimits, doe.seed()).kind(kind))
            }
            Design::Sobol(doe) => Design::Sobol(doe.with_xlimits(xlimits)),
        }
    }

    /// The kind of this design
    pub fn kind(&self) -> DesignKind {
        match self {
            Design::SimpleRandom(_) => DesignKind::SimpleRandom,
            Design::LatinHypercube(doe) => DesignKind::LatinHypercube(doe.lhs_kind()),
            Design::Sobol(doe) => DesignKind::Sobol {
                scramble: doe.is_scrambled(),
            },
        }
    }

    fn sampler(&self) -> &dyn SamplingMethod<F> {
        match self {
            Design::SimpleRandom(doe) => doe,
            Design::LatinHypercube(doe) => doe,
            Design::Sobol(doe) => doe,
        }
    }

    fn sampler_mut(&mut self) -> &mut dyn SamplingMethod<F> {
        match self {
            Design::SimpleRandom(doe) => doe,
            Design::LatinHypercube(doe) => doe,
            Design::Sobol(doe) => doe,
        }
    }
}

impl<F: Float> SamplingMethod<F> for Design<F> {
    fn sampling_space(&self) -> &Array2<F> {
        self.sampler().sampling_space()
    }

    fn normalized_sample(&mut self, ns: usize) -> Array2<F> {
        self.sampler_mut().normalized_sample(ns)
    }

    fn reset(&mut self) {
        self.sampler_mut().reset()
    }

    fn fast_forward(&mut self, ns: usize) {
        self.sampler_mut().fast_forward(ns)
    }

    fn num_generated(&self) -> usize {
        self.sampler().num_generated()
    }
}
