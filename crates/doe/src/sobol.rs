use crate::errors::{DoeError, Result};
use crate::utils::unit_hypercube;
use crate::SamplingMethod;
use linfa::Float;
use log::warn;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Number of bits of the sequence state, at most 2^32 points can be generated.
const BITS: usize = 32;

/// Maximum dimension supported by the embedded direction numbers
pub const SOBOL_MAX_DIM: usize = 21;

/// Primitive polynomial degree `s`, coefficients `a` and initial direction numbers `m`
/// from Joe and Kuo (2008) `new-joe-kuo-6.21201`, dimensions 2 to 21.
/// The first dimension is the van der Corput sequence.
const JOE_KUO: [(u32, u32, &[u32]); SOBOL_MAX_DIM - 1] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
    (6, 19, &[1, 1, 1, 15, 7, 5]),
    (6, 22, &[1, 3, 1, 15, 13, 25]),
    (6, 25, &[1, 1, 5, 5, 19, 61]),
    (7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    (7, 4, &[1, 3, 7, 13, 13, 15, 69]),
];

/// The Sobol design is a low-discrepancy sequence built from direction numbers.
///
/// When scrambled (the default), direction numbers go through a random linear matrix
/// scramble and a random digital shift is applied, which keeps the net properties of the
/// sequence while making it a randomized design.
///
/// Successive calls continue the sequence: drawing 5 then 3 points gives the same points
/// as drawing 8 points at once.
#[derive(Clone, Debug)]
pub struct Sobol<F: Float> {
    /// Sampling space definition as a (nx, 2) matrix
    /// The ith row is the [lower_bound, upper_bound] of xi, the ith component of x
    xlimits: Array2<F>,
    /// Whether direction numbers are scrambled
    scramble: bool,
    /// Seed of the scrambling
    seed: u64,
    /// Direction numbers, one row of `BITS` integers by dimension
    directions: Vec<[u32; BITS]>,
    /// Digital shift by dimension (zero when not scrambled)
    shift: Vec<u32>,
    /// Current point of the sequence as integers
    state: Vec<u32>,
    /// Index of the current point
    num_generated: usize,
}

impl<F: Float> Sobol<F> {
    /// Constructor given a design space given a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    /// with a scrambling seed drawn from entropy
    ///
    /// ```
    /// use gpemu_doe::Sobol;
    /// use ndarray::arr2;
    ///
    /// let doe = Sobol::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]])).expect("valid dimension");
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Self> {
        Self::new_with_seed(xlimits, ndarray_rand::rand::random())
    }

    /// Constructor given a design space and a seed used to scramble the sequence
    ///
    /// Fails if xlimits number of columns is different from 2 or if the dimension is zero
    /// or greater than [`SOBOL_MAX_DIM`].
    pub fn new_with_seed(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, seed: u64) -> Result<Self> {
        if xlimits.ncols() != 2 {
            return Err(DoeError::InvalidConfiguration(format!(
                "xlimits must have 2 columns (lower, upper), got {}",
                xlimits.ncols()
            )));
        }
        let nx = xlimits.nrows();
        if nx == 0 || nx > SOBOL_MAX_DIM {
            return Err(DoeError::InvalidConfiguration(format!(
                "Sobol sequence dimension should be in [1, {SOBOL_MAX_DIM}], got {nx}"
            )));
        }
        let mut sobol = Sobol {
            xlimits: xlimits.to_owned(),
            scramble: true,
            seed,
            directions: direction_numbers(nx),
            shift: vec![0; nx],
            state: vec![0; nx],
            num_generated: 0,
        };
        sobol.init_scrambling();
        Ok(sobol)
    }

    /// Constructor of a design over the `[0, 1]^nx` hypercube
    pub fn unit(nx: usize, seed: u64) -> Result<Self> {
        Self::new_with_seed(&unit_hypercube::<F>(nx), seed)
    }

    /// Enables or disables scrambling, the sequence is restarted
    pub fn scramble(mut self, scramble: bool) -> Self {
        self.scramble = scramble;
        self.init_scrambling();
        self
    }

    /// Seed of the scrambling
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether the sequence is scrambled
    pub fn is_scrambled(&self) -> bool {
        self.scramble
    }

    /// Replaces the sample space, the sequence is restarted
    pub(crate) fn with_xlimits(mut self, xlimits: Array2<F>) -> Self {
        self.xlimits = xlimits;
        self.reset();
        self
    }

    fn init_scrambling(&mut self) {
        let nx = self.directions.len();
        self.directions = direction_numbers(nx);
        if self.scramble {
            let mut rng = Xoshiro256Plus::seed_from_u64(self.seed);
            for dirs in self.directions.iter_mut() {
                linear_matrix_scramble(dirs, &mut rng);
            }
            self.shift = (0..nx).map(|_| rng.gen::<u32>()).collect();
        } else {
            self.shift = vec![0; nx];
        }
        self.state = self.shift.clone();
        self.num_generated = 0;
    }

    /// Sets the state to the point of given index using its Gray code
    fn jump_to(&mut self, index: usize) {
        let gray = index ^ (index >> 1);
        for (k, state) in self.state.iter_mut().enumerate() {
            *state = self.shift[k];
            for (bit, dir) in self.directions[k].iter().enumerate() {
                if (gray >> bit) & 1 == 1 {
                    *state ^= dir;
                }
            }
        }
        self.num_generated = index;
    }

    fn advance(&mut self) {
        let c = (self.num_generated.trailing_ones() as usize).min(BITS - 1);
        for (state, dirs) in self.state.iter_mut().zip(self.directions.iter()) {
            *state ^= dirs[c];
        }
        self.num_generated += 1;
    }
}

impl<F: Float> SamplingMethod<F> for Sobol<F> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&mut self, ns: usize) -> Array2<F> {
        if ns > 0 && !ns.is_power_of_two() {
            warn!("Sobol balance properties require a power of two number of points, got {ns}");
        }
        let nx = self.xlimits.nrows();
        let norm = (1u64 << BITS) as f64;
        let mut doe = Array2::zeros((ns, nx));
        for mut row in doe.rows_mut() {
            for (v, s) in row.iter_mut().zip(self.state.iter()) {
                *v = F::cast(*s as f64 / norm);
            }
            self.advance();
        }
        doe
    }

    fn reset(&mut self) {
        self.state = self.shift.clone();
        self.num_generated = 0;
    }

    fn fast_forward(&mut self, ns: usize) {
        self.jump_to(self.num_generated + ns);
    }

    fn num_generated(&self) -> usize {
        self.num_generated
    }
}

/// Builds unscrambled direction numbers for the first `nx` dimensions
fn direction_numbers(nx: usize) -> Vec<[u32; BITS]> {
    let mut directions = Vec::with_capacity(nx);
    let mut first = [0u32; BITS];
    for (j, v) in first.iter_mut().enumerate() {
        *v = 1 << (BITS - 1 - j);
    }
    directions.push(first);

    for &(s, a, m) in JOE_KUO.iter().take(nx.saturating_sub(1)) {
        let s = s as usize;
        let mut v = [0u32; BITS];
        for j in 0..s {
            v[j] = m[j] << (BITS - 1 - j);
        }
        for j in s..BITS {
            v[j] = v[j - s] ^ (v[j - s] >> s);
            for l in 1..s {
                if (a >> (s - 1 - l)) & 1 == 1 {
                    v[j] ^= v[j - l];
                }
            }
        }
        directions.push(v);
    }
    directions
}

/// Left-multiplies direction numbers by a random lower triangular binary matrix
/// with unit diagonal. Digit 0 is the most significant bit.
fn linear_matrix_scramble<R: Rng>(dirs: &mut [u32; BITS], rng: &mut R) {
    let masks: Vec<u32> = (0..BITS)
        .map(|i| {
            let diagonal = 1u32 << (BITS - 1 - i);
            let lower = if i == 0 {
                0
            } else {
                rng.gen::<u32>() & (u32::MAX << (BITS - i))
            };
            diagonal | lower
        })
        .collect();
    for dir in dirs.iter_mut() {
        let mut scrambled = 0u32;
        for (i, mask) in masks.iter().enumerate() {
            if (*dir & mask).count_ones() % 2 == 1 {
                scrambled |= 1 << (BITS - 1 - i);
            }
        }
        *dir = scrambled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, concatenate, s, Axis};

    #[test]
    fn test_unscrambled_sobol() {
        let expected = array![
            [0., 0.],
            [0.5, 0.5],
            [0.75, 0.25],
            [0.25, 0.75],
            [0.375, 0.375],
            [0.875, 0.875],
            [0.625, 0.125],
            [0.125, 0.625]
        ];
        let actual = Sobol::<f64>::unit(2, 0)
            .unwrap()
            .scramble(false)
            .normalized_sample(8);
        assert_abs_diff_eq!(expected, actual, epsilon = 1e-12);
    }

    #[test]
    fn test_scrambled_sobol_is_stratified() {
        let ns = 16;
        let doe = Sobol::<f64>::unit(SOBOL_MAX_DIM, 42)
            .unwrap()
            .normalized_sample(ns);
        for col in doe.columns() {
            let mut strata: Vec<usize> = col
                .iter()
                .map(|v| (v * ns as f64).floor() as usize)
                .collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..ns).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_sobol_stream_is_continuous() {
        let mut doe = Sobol::<f64>::unit(3, 5).unwrap();
        let a = doe.normalized_sample(5);
        let b = doe.normalized_sample(3);
        let c = doe.normalized_sample(2);
        let whole = Sobol::<f64>::unit(3, 5).unwrap().normalized_sample(10);
        let parts = concatenate(Axis(0), &[a.view(), b.view(), c.view()]).unwrap();
        assert_eq!(whole, parts);
    }

    #[test]
    fn test_sobol_reset_and_fast_forward() {
        let mut doe = Sobol::<f64>::unit(4, 1).unwrap();
        let first = doe.normalized_sample(12);
        doe.reset();
        assert_eq!(first, doe.normalized_sample(12));

        doe.reset();
        doe.fast_forward(7);
        assert_eq!(doe.num_generated(), 7);
        assert_eq!(first.slice(s![7.., ..]), doe.normalized_sample(5));
    }

    #[test]
    fn test_sobol_seed_changes_scrambling() {
        let s1 = Sobol::<f64>::unit(2, 1).unwrap().normalized_sample(4);
        let s2 = Sobol::<f64>::unit(2, 2).unwrap().normalized_sample(4);
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_sobol_bad_dimension() {
        assert!(Sobol::<f64>::unit(0, 0).is_err());
        assert!(Sobol::<f64>::unit(SOBOL_MAX_DIM + 1, 0).is_err());
    }

    #[test]
    fn test_sobol_bad_xlimits() {
        assert!(matches!(
            Sobol::new_with_seed(&array![[0., 1., 2.]], 0),
            Err(DoeError::InvalidConfiguration(_))
        ));
    }
}
