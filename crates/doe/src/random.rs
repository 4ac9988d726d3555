use crate::utils::unit_hypercube;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{rand::Rng, rand::SeedableRng, rand_distr::Uniform, RandomExt};
use rand_xoshiro::Xoshiro256Plus;

/// The Random design consists in drawing samples randomly (simple random sampling).
///
/// Successive calls draw from one seeded generator stream which can be rewound with
/// [`SamplingMethod::reset`].
#[derive(Clone, Debug)]
pub struct Random<F: Float, R: Rng + SeedableRng = Xoshiro256Plus> {
    /// Sampling space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<F>,
    /// Seed of the random generator, used to rewind the stream
    seed: u64,
    /// Random generator used for reproducibility
    rng: R,
    /// Number of samples drawn since last reset
    num_generated: usize,
}

impl<F: Float> Random<F, Xoshiro256Plus> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    /// with a seed drawn from entropy
    ///
    /// ```
    /// use gpemu_doe::Random;
    /// use ndarray::arr2;
    ///
    /// let doe = Random::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_seed(xlimits, ndarray_rand::rand::random())
    }

    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    /// and a seed for reproducibility
    ///
    /// **Panics** if xlimits number of columns is different from 2.
    pub fn new_with_seed(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, seed: u64) -> Self {
        if xlimits.ncols() != 2 {
            panic!("xlimits must have 2 columns (lower, upper)");
        }
        Random {
            xlimits: xlimits.to_owned(),
            seed,
            rng: Xoshiro256Plus::seed_from_u64(seed),
            num_generated: 0,
        }
    }

    /// Constructor of a sampler over the `[0, 1]^nx` hypercube
    pub fn unit(nx: usize, seed: u64) -> Self {
        Self::new_with_seed(&unit_hypercube::<F>(nx), seed)
    }
}

impl<F: Float, R: Rng + SeedableRng> Random<F, R> {
    /// Switches to another random generator type seeded with the same seed.
    /// The stream is restarted.
    pub fn with_rng<R2: Rng + SeedableRng>(self) -> Random<F, R2> {
        Random {
            xlimits: self.xlimits,
            seed: self.seed,
            rng: R2::seed_from_u64(self.seed),
            num_generated: 0,
        }
    }

    /// Seed of the sampler stream
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl<F: Float, R: Rng + SeedableRng> SamplingMethod<F> for Random<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&mut self, ns: usize) -> Array2<F> {
        let nx = self.xlimits.nrows();
        self.num_generated += ns;
        Array::random_using((ns, nx), Uniform::new(0., 1.), &mut self.rng).mapv(|v| F::cast(v))
    }

    fn reset(&mut self) {
        self.rng = R::seed_from_u64(self.seed);
        self.num_generated = 0;
    }

    fn num_generated(&self) -> usize {
        self.num_generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_abs_diff_ne};
    use ndarray::{arr2, array, concatenate, s, Axis};

    #[test]
    fn test_random() {
        let xlimits = arr2(&[[5., 10.], [0., 1.]]);
        let expected = array![
            [5.4287779764773045, 0.31041139572710486],
            [5.31284890781607, 0.306461322653673],
            [5.0002147942961885, 0.3030653113049855],
            [5.438048037018622, 0.2270337387265695],
            [9.31397733563812, 0.5232539513550647],
            [6.0549173955055435, 0.8198009346946455],
            [8.303444344933911, 0.8588635290560207],
            [5.721154177502889, 0.3516459308028457],
            [5.457086177138239, 0.11691074717669259]
        ];
        let actual = Random::new_with_seed(&xlimits, 42).sample(9);
        assert_abs_diff_eq!(expected, actual, epsilon = 1e-6);
    }

    #[test]
    fn test_random_stream_is_continuous() {
        let mut doe = Random::<f64>::unit(3, 7);
        let a = doe.normalized_sample(5);
        let b = doe.normalized_sample(3);
        let c = doe.normalized_sample(2);
        assert_eq!(doe.num_generated(), 10);

        let whole = Random::<f64>::unit(3, 7).normalized_sample(10);
        let parts = concatenate(Axis(0), &[a.view(), b.view(), c.view()]).unwrap();
        assert_eq!(whole, parts);
    }

    #[test]
    fn test_random_reset_and_fast_forward() {
        let mut doe = Random::<f64>::unit(2, 42);
        let first = doe.normalized_sample(6);
        assert_abs_diff_ne!(first, doe.normalized_sample(6));

        doe.reset();
        assert_eq!(doe.num_generated(), 0);
        assert_eq!(first, doe.normalized_sample(6));

        doe.reset();
        doe.fast_forward(4);
        assert_eq!(first.slice(s![4.., ..]), doe.normalized_sample(2));
    }

    #[test]
    fn test_random_in_unit_cube() {
        let samples = Random::<f64>::unit(4, 0).normalized_sample(100);
        assert_eq!(samples.dim(), (100, 4));
        assert!(samples.iter().all(|v| (0. ..1.).contains(v)));
    }
}
