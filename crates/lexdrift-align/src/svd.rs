//! One-sided Jacobi singular value decomposition for small dense matrices.
//!
//! The Procrustes fit only decomposes a `dim x dim` cross-covariance
//! matrix, so a dependency-free cyclic Jacobi sweep is sufficient. Runs in
//! f64 regardless of the model precision.

use ndarray::Array2;

/// Relative convergence threshold for column orthogonality.
const TOLERANCE: f64 = 1e-12;

/// Upper bound on full sweeps; Jacobi converges quadratically and real
/// inputs settle in well under this.
const MAX_SWEEPS: usize = 60;

/// Compute `a = u * diag(s) * v^T` for a square matrix.
///
/// `u` and `v` are orthogonal; singular values come back unsorted, which is
/// fine for the polar-factor product `u * v^T`. Rank-deficient inputs get
/// their null-space columns of `u` completed to an orthonormal basis.
pub fn svd_jacobi(a: &Array2<f64>) -> (Array2<f64>, Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "jacobi svd expects a square matrix");

    let mut u = a.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                let (alpha, beta, gamma) = column_products(&u, p, q);
                if gamma.abs() <= TOLERANCE * (alpha * beta).sqrt() || gamma == 0.0 {
                    continue;
                }
                rotated = true;
                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = c * t;
                rotate_columns(&mut u, p, q, c, s);
                rotate_columns(&mut v, p, q, c, s);
            }
        }
        if !rotated {
            break;
        }
    }

    // Column norms are the singular values; normalize to get U.
    let mut singular = vec![0.0; n];
    for j in 0..n {
        let norm: f64 = (0..n).map(|i| u[[i, j]] * u[[i, j]]).sum::<f64>().sqrt();
        singular[j] = norm;
        if norm > TOLERANCE {
            for i in 0..n {
                u[[i, j]] /= norm;
            }
        }
    }
    complete_null_columns(&mut u, &singular);

    (u, singular, v.t().to_owned())
}

/// `(|col_p|^2, |col_q|^2, col_p . col_q)`.
fn column_products(m: &Array2<f64>, p: usize, q: usize) -> (f64, f64, f64) {
    let mut alpha = 0.0;
    let mut beta = 0.0;
    let mut gamma = 0.0;
    for i in 0..m.nrows() {
        alpha += m[[i, p]] * m[[i, p]];
        beta += m[[i, q]] * m[[i, q]];
        gamma += m[[i, p]] * m[[i, q]];
    }
    (alpha, beta, gamma)
}

/// Apply the plane rotation `(c, s)` to columns `p` and `q`.
fn rotate_columns(m: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    for i in 0..m.nrows() {
        let mp = m[[i, p]];
        let mq = m[[i, q]];
        m[[i, p]] = c * mp - s * mq;
        m[[i, q]] = s * mp + c * mq;
    }
}

/// Replace zero-norm columns of `u` (null space of a rank-deficient input)
/// with unit vectors orthogonal to the existing columns, so `u` is always a
/// full orthonormal basis and the polar factor stays a proper rotation.
fn complete_null_columns(u: &mut Array2<f64>, singular: &[f64]) {
    let n = u.nrows();
    for j in 0..n {
        if singular[j] > TOLERANCE {
            continue;
        }
        // Gram-Schmidt a standard basis vector against the non-null columns.
        'basis: for b in 0..n {
            let mut candidate = vec![0.0; n];
            candidate[b] = 1.0;
            for k in 0..n {
                if k == j {
                    continue;
                }
                // Null columns after j have no direction to project out yet.
                if k > j && singular[k] <= TOLERANCE {
                    continue;
                }
                let dot: f64 = (0..n).map(|i| candidate[i] * u[[i, k]]).sum();
                for (i, c) in candidate.iter_mut().enumerate() {
                    *c -= dot * u[[i, k]];
                }
            }
            let norm: f64 = candidate.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 1e-6 {
                for (i, c) in candidate.iter().enumerate() {
                    u[[i, j]] = c / norm;
                }
                break 'basis;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    fn reconstruct(u: &Array2<f64>, s: &[f64], vt: &Array2<f64>) -> Array2<f64> {
        let n = s.len();
        let mut sigma = Array2::<f64>::zeros((n, n));
        for (i, &sv) in s.iter().enumerate() {
            sigma[[i, i]] = sv;
        }
        u.dot(&sigma).dot(vt)
    }

    fn assert_orthogonal(m: &Array2<f64>) {
        let eye = m.t().dot(m);
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (eye[[i, j]] - expected).abs() < 1e-8,
                    "not orthogonal at ({i},{j}): {}",
                    eye[[i, j]]
                );
            }
        }
    }

    #[test]
    fn identity_decomposes_to_unit_singular_values() {
        let a = Array2::<f64>::eye(3);
        let (u, s, vt) = svd_jacobi(&a);
        assert!(s.iter().all(|&sv| approx(sv, 1.0)));
        assert_orthogonal(&u);
        assert_orthogonal(&vt);
    }

    #[test]
    fn diagonal_matrix_singular_values() {
        let a = array![[3.0, 0.0], [0.0, 2.0]];
        let (_, mut s, _) = svd_jacobi(&a);
        s.sort_by(|x, y| y.partial_cmp(x).unwrap());
        assert!(approx(s[0], 3.0));
        assert!(approx(s[1], 2.0));
    }

    #[test]
    fn reconstruction_matches_input() {
        let a = array![
            [1.0, 2.0, 0.5],
            [-0.5, 1.5, 3.0],
            [2.0, -1.0, 1.0]
        ];
        let (u, s, vt) = svd_jacobi(&a);
        let back = reconstruct(&u, &s, &vt);
        for i in 0..3 {
            for j in 0..3 {
                assert!(
                    (a[[i, j]] - back[[i, j]]).abs() < 1e-7,
                    "mismatch at ({i},{j})"
                );
            }
        }
    }

    #[test]
    fn factors_are_orthogonal() {
        let a = array![[0.2, 1.7], [-3.0, 0.4]];
        let (u, _, vt) = svd_jacobi(&a);
        assert_orthogonal(&u);
        assert_orthogonal(&vt);
    }

    #[test]
    fn rank_deficient_still_yields_orthogonal_u() {
        // Second row is a multiple of the first: rank 1.
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let (u, s, vt) = svd_jacobi(&a);
        assert!(s.iter().any(|&sv| sv < 1e-9), "one singular value is zero");
        assert_orthogonal(&u);
        let back = reconstruct(&u, &s, &vt);
        for i in 0..2 {
            for j in 0..2 {
                assert!((a[[i, j]] - back[[i, j]]).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn singular_values_non_negative() {
        let a = array![[-5.0, 1.0], [2.0, -3.0]];
        let (_, s, _) = svd_jacobi(&a);
        assert!(s.iter().all(|&sv| sv >= 0.0));
    }
}
