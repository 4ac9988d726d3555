use crate::errors::{DoeError, Result};
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2, Zip};

/// Returns the `[0, 1]^nx` sample space as a (nx, 2) matrix
pub fn unit_hypercube<F: Float>(nx: usize) -> Array2<F> {
    let mut xlimits = Array2::zeros((nx, 2));
    xlimits.column_mut(1).fill(F::one());
    xlimits
}

/// Builds a (nx, 2) sample space matrix from lower and upper bound vectors
///
/// Bounds must be finite, have the same length and verify `lower < upper` elementwise.
pub fn xlimits_from_bounds<F: Float>(
    lower: &ArrayBase<impl Data<Elem = F>, Ix1>,
    upper: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<Array2<F>> {
    if lower.len() != upper.len() {
        return Err(DoeError::InvalidConfiguration(format!(
            "lower and upper bounds should have the same length, got {} and {}",
            lower.len(),
            upper.len()
        )));
    }
    let mut xlimits = Array2::zeros((lower.len(), 2));
    for (i, (lo, up)) in lower.iter().zip(upper.iter()).enumerate() {
        if !lo.is_finite() || !up.is_finite() || lo >= up {
            return Err(DoeError::InvalidConfiguration(format!(
                "bounds of component {i} should be finite and verify lower < upper, got [{lo}, {up}]"
            )));
        }
        xlimits[[i, 0]] = *lo;
        xlimits[[i, 1]] = *up;
    }
    Ok(xlimits)
}

/// Maps a `[0, 1]^nx` design onto the sample space given as a (nx, 2) matrix
///
/// **Panics** if the number of columns of `doe` differs from the number of rows of `xlimits`.
pub fn scale<F: Float>(
    doe: &ArrayBase<impl Data<Elem = F>, Ix2>,
    xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Array2<F> {
    assert_eq!(
        doe.ncols(),
        xlimits.nrows(),
        "scale: doe dimension should match sample space dimension"
    );
    let mut scaled = doe.to_owned();
    Zip::from(scaled.columns_mut())
        .and(xlimits.rows())
        .for_each(|mut col, lim| {
            let (lower, width) = (lim[0], lim[1] - lim[0]);
            col.mapv_inplace(|v| v * width + lower)
        });
    scaled
}
