use linfa::Float;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand_xoshiro::Xoshiro256Plus;

/// Error type of external model and optimizer implementations
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of external model and optimizer implementations
pub type ModelResult<T> = std::result::Result<T, BoxedError>;

/// Predictive distribution of an emulator at given inputs
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction<F: Float> {
    /// Predicted mean `(n, n_outputs)`
    pub mean: Array2<F>,
    /// Predicted standard deviation `(n, n_outputs)`
    pub std: Array2<F>,
}

/// A gaussian process model trained by gradient descent on its hyperparameters.
///
/// The model owns its hyperparameters (mean, kernel and likelihood parameters) as a flat vector.
pub trait GpModel<F: Float> {
    /// Draws new hyperparameters from `rng`
    fn reset_parameters(&mut self, rng: &mut Xoshiro256Plus) -> ModelResult<()>;

    /// Current hyperparameters
    fn parameters(&self) -> Array1<F>;

    /// Sets hyperparameters
    fn set_parameters(&mut self, params: Array1<F>) -> ModelResult<()>;

    /// Negative marginal log likelihood of `(x, y)` for current hyperparameters
    fn loss(&self, x: &ArrayView2<F>, y: &ArrayView2<F>) -> ModelResult<F>;

    /// Loss and its gradient with respect to hyperparameters
    fn loss_and_gradient(&self, x: &ArrayView2<F>, y: &ArrayView2<F>)
        -> ModelResult<(F, Array1<F>)>;

    /// Predictive mean and standard deviation at `x`
    fn predict(&self, x: &ArrayView2<F>) -> ModelResult<Prediction<F>>;

    /// Serializes the model state
    fn save_state(&self) -> ModelResult<Vec<u8>>;

    /// Restores a state produced by [`GpModel::save_state`]
    fn load_state(&mut self, state: &[u8]) -> ModelResult<()>;
}

/// A gradient based optimizer of model hyperparameters
pub trait Optimizer<F: Float> {
    /// Clears internal state (moment estimates, step counters, ...)
    fn reset(&mut self);

    /// Updates `params` in place given the loss gradient
    fn step(&mut self, params: &mut Array1<F>, grad: &ArrayView1<F>) -> ModelResult<()>;
}
