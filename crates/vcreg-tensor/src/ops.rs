//! Element and matrix helpers used by the regularizer.

use ndarray::ArrayView2;

use crate::{TensorError, TensorResult};

/// Applies the ReLU (Rectified Linear Unit) function.
///
/// ReLU(x) = max(0, x). NaN is returned unchanged.
///
/// # Examples
///
/// ```
/// use vcreg_tensor::ops::relu;
///
/// assert_eq!(relu(-1.5), 0.0);
/// assert_eq!(relu(0.25), 0.25);
/// assert!(relu(f64::NAN).is_nan());
/// ```
pub fn relu(x: f64) -> f64 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// Collects every off-diagonal entry of a square matrix in row-major order.
///
/// For an `n x n` matrix this returns `n * (n - 1)` values: all entries whose
/// row index differs from the column index.
///
/// # Errors
///
/// Returns [`TensorError::NotSquare`] if the matrix is not square.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use vcreg_tensor::ops::off_diagonal;
///
/// let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
/// assert_eq!(off_diagonal(&m.view()).unwrap(), vec![2.0, 3.0, 4.0, 6.0, 7.0, 8.0]);
/// ```
pub fn off_diagonal(matrix: &ArrayView2<'_, f64>) -> TensorResult<Vec<f64>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(TensorError::NotSquare { rows, cols });
    }

    Ok(matrix
        .indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, &value)| value)
        .collect())
}
