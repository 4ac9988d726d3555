use crate::utils::unit_hypercube;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{s, Array, Array2, ArrayBase, Data, Ix2, ShapeBuilder};
use ndarray_rand::{
    rand::seq::SliceRandom, rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt,
};
use rand_xoshiro::Xoshiro256Plus;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Kinds of Latin Hypercube Design
#[derive(Clone, Debug, Default, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// sample is choosen randomly within its latin hypercube intervals
    #[default]
    Classic,
    /// sample is the middle of its latin hypercube intervals
    Centered,
}

/// The LHS design is built as follows: each dimension space is divided into ns sections
/// where ns is the number of sampling points, and one point in selected in each section.
/// Sections are permuted independently along each dimension.
///
/// Each call to [`SamplingMethod::normalized_sample`] builds a new stratified design
/// drawing from the same seeded generator stream.
#[derive(Clone, Debug)]
pub struct Lhs<F: Float, R: Rng + SeedableRng = Xoshiro256Plus> {
    /// Sampling space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<F>,
    /// The requested kind of LHS
    kind: LhsKind,
    /// Seed of the random generator, used to rewind the stream
    seed: u64,
    /// Random generator used for point placement and section permutations
    rng: R,
    /// Number of samples drawn since last reset
    num_generated: usize,
}

/// LHS with default random generator
impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    /// with a seed drawn from entropy
    ///
    /// ```
    /// use gpemu_doe::Lhs;
    /// use ndarray::arr2;
    ///
    /// let doe = Lhs::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_seed(xlimits, ndarray_rand::rand::random())
    }

    /// Constructor with given design space and seed.
    /// * `xlimits`: (nx, 2) matrix where nx is the dimension of the samples and the ith row
    ///   is the definition interval of the ith component of x.
    /// * `seed`: seed of the random generator
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new_with_seed(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, seed: u64) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Lhs {
            xlimits: xlimits.to_owned(),
            kind: LhsKind::default(),
            seed,
            rng: Xoshiro256Plus::seed_from_u64(seed),
            num_generated: 0,
        }
    }

    /// Constructor of a design over the `[0, 1]^nx` hypercube
    pub fn unit(nx: usize, seed: u64) -> Self {
        Self::new_with_seed(&unit_hypercube::<F>(nx), seed)
    }
}

impl<F: Float, R: Rng + SeedableRng> Lhs<F, R> {
    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Switches to another random generator type seeded with the same seed.
    /// The stream is restarted.
    pub fn with_rng<R2: Rng + SeedableRng>(self) -> Lhs<F, R2> {
        Lhs {
            xlimits: self.xlimits,
            kind: self.kind,
            seed: self.seed,
            rng: R2::seed_from_u64(self.seed),
            num_generated: 0,
        }
    }

    /// Seed of the sampler stream
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The kind of LHS
    pub fn lhs_kind(&self) -> LhsKind {
        self.kind
    }

    fn classic_lhs(&mut self, ns: usize) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let cut = Array::linspace(0., 1., ns + 1);

        let rnd = Array::random_using((ns, nx).f(), Uniform::new(0., 1.), &mut self.rng);
        let a = cut.slice(s![..ns]).to_owned();
        let b = cut.slice(s![1..(ns + 1)]);
        let c = &b - &a;
        let mut lhs = Array::zeros((ns, nx).f());
        for j in 0..nx {
            let mut colj = rnd.column(j).to_owned() * &c + &a;
            if let Some(values) = colj.as_slice_mut() {
                values.shuffle(&mut self.rng);
            }
            lhs.column_mut(j).assign(&colj);
        }
        lhs.mapv(F::cast)
    }

    fn centered_lhs(&mut self, ns: usize) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let cut = Array::linspace(0., 1., ns + 1);

        let a = cut.slice(s![..ns]).to_owned();
        let b = cut.slice(s![1..(ns + 1)]);
        let mut c = (a + b) / 2.;
        let mut lhs = Array::zeros((ns, nx).f());

        for j in 0..nx {
            if let Some(values) = c.as_slice_mut() {
                values.shuffle(&mut self.rng);
            }
            lhs.column_mut(j).assign(&c);
        }
        lhs.mapv(F::cast)
    }
}

impl<F: Float, R: Rng + SeedableRng> SamplingMethod<F> for Lhs<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&mut self, ns: usize) -> Array2<F> {
        self.num_generated += ns;
        match self.kind {
            LhsKind::Classic => self.classic_lhs(ns),
            LhsKind::Centered => self.centered_lhs(ns),
        }
    }

    fn reset(&mut self) {
        self.rng = R::seed_from_u64(self.seed);
        self.num_generated = 0;
    }

    fn num_generated(&self) -> usize {
        self.num_generated
    }
}
