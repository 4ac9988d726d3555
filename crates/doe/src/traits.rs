use linfa::Float;
use ndarray::Array2;

use crate::utils::scale;

/// Sampling method allowing to generate a DoE in a given sample space
///
/// A sampling method generates sets of samples in a sample space defined by
/// `[lower_bound_xi, upper_bound_xi]^nx` within `R^nx` where `nx` is the dimension of the
/// sample space: x = (x_i) with i in [1, nx].
///
/// Samplers are streams: each call to [`SamplingMethod::normalized_sample`] continues from
/// where the previous call stopped, so consecutive calls on one instance give disjoint draws
/// of a single sequence. [`SamplingMethod::reset`] rewinds the stream to its seeded start.
pub trait SamplingMethod<F: Float> {
    /// Returns the bounds of the sample space
    ///
    /// # Returns
    ///
    /// * A (nx, 2) matrix where the ith row is the interval of the ith components of a sample.
    fn sampling_space(&self) -> &Array2<F>;

    /// Dimension `nx` of the sample space
    fn dim(&self) -> usize {
        self.sampling_space().nrows()
    }

    /// Generates a (ns, nx)-shaped array of samples belonging to `[0., 1.]^nx`
    /// and advances the sampler stream by `ns` points.
    fn normalized_sample(&mut self, ns: usize) -> Array2<F>;

    /// Generates a (ns, nx)-shaped array of samples belonging to `[lower_bound_xi, upper_bound_xi]^nx`
    /// where bounds are defined as returned values of `sampling_space` function.
    fn sample(&mut self, ns: usize) -> Array2<F> {
        let doe = self.normalized_sample(ns);
        scale(&doe, self.sampling_space())
    }

    /// Rewinds the sampler to its initial seeded state
    fn reset(&mut self);

    /// Discards the next `ns` samples of the stream
    fn fast_forward(&mut self, ns: usize) {
        let _ = self.normalized_sample(ns);
    }

    /// Number of samples generated since construction or last reset
    fn num_generated(&self) -> usize;
}
