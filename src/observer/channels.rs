//! PCA channel learning.
//!
//! Channels are the leading principal directions of a pool of vectorized
//! patches. They compress a q-pixel patch to k ≪ q channel responses before
//! the Hotelling template is fitted, which keeps the k×k covariance
//! estimable from a modest number of samples.

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ChannelOptions;
use crate::constants::WHITEN_FLOOR;
use crate::error::{Error, Result};
use crate::types::{ChannelMatrix, PatchMatrix};

use super::{center_columns, column_means, ensure_finite};

/// A q×k channel basis.
///
/// Columns are ordered by decreasing explained variance. The basis is
/// immutable once learned and is shared by reference by every projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBasis {
    matrix: DMatrix<f64>,
    singular_values: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
    requested: usize,
    whitened: bool,
}

impl ChannelBasis {
    /// Identity channels: one channel per pixel (k = q).
    pub fn identity(pixels: usize) -> Self {
        Self {
            matrix: DMatrix::identity(pixels, pixels),
            singular_values: Vec::new(),
            explained_variance_ratio: Vec::new(),
            requested: pixels,
            whitened: false,
        }
    }

    /// Wrap an externally designed q×k channel matrix (e.g. Gabor or
    /// Laguerre–Gauss channels).
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self> {
        if matrix.nrows() == 0 || matrix.ncols() == 0 {
            return Err(Error::DegenerateInput("channel matrix is empty"));
        }
        ensure_finite(&matrix, "channel matrix")?;
        let requested = matrix.ncols();
        Ok(Self {
            matrix,
            singular_values: Vec::new(),
            explained_variance_ratio: Vec::new(),
            requested,
            whitened: false,
        })
    }

    /// The q×k channel matrix U.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Patch length q.
    pub fn pixels(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of channels k.
    pub fn channels(&self) -> usize {
        self.matrix.ncols()
    }

    /// Channel count originally requested (may exceed `channels()` after truncation).
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Whether the channels were divided by their singular values.
    pub fn is_whitened(&self) -> bool {
        self.whitened
    }

    /// Singular values of the retained directions (empty unless learned).
    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// Fraction of pool variance carried by each retained direction.
    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    /// Project N×q patches to N×k channel responses.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the patch length differs from q.
    pub fn project(&self, patches: &PatchMatrix) -> Result<ChannelMatrix> {
        if patches.ncols() != self.pixels() {
            return Err(Error::dimension("patch length", self.pixels(), patches.ncols()));
        }
        Ok(patches * &self.matrix)
    }
}

/// Learn a channel basis from a pool of patches via PCA.
///
/// The pool (N×q, mixed classes) is centered by its column means and
/// decomposed with an economy SVD; the top-k right singular vectors become the
/// channels. Each channel is sign-normalized so its largest-magnitude entry is
/// positive, which makes the basis reproducible across platforms.
///
/// Requests for more channels than the pool's rank `min(N, q)` are truncated
/// to that rank (with a warning) rather than rejected.
///
/// With `options.whiten` each channel is divided by its singular value plus
/// [`WHITEN_FLOOR`]; with `options.reorthonormalize` the channels are then
/// re-orthonormalized with a QR decomposition, keeping their order and sign.
/// PCA directions are already orthogonal, so combining the two options gives
/// back the unwhitened basis and the result reports `is_whitened() == false`.
///
/// `seed` only matters when `options.max_pool` caps the pool size: the
/// retained subset is drawn with a generator seeded from it.
///
/// # Errors
///
/// - [`Error::DegenerateInput`] for an empty pool or `k` of zero
/// - [`Error::InvalidParameter`] if `options.max_pool` is zero
/// - [`Error::NonFinite`] if the pool contains NaN or infinite entries
pub fn learn_channels(
    pool: &PatchMatrix,
    k: usize,
    options: ChannelOptions,
    seed: u64,
) -> Result<ChannelBasis> {
    if pool.nrows() == 0 || pool.ncols() == 0 {
        return Err(Error::DegenerateInput("patch pool is empty"));
    }
    if k == 0 {
        return Err(Error::DegenerateInput("channel count must be positive"));
    }
    ensure_finite(pool, "patch pool")?;

    let subset;
    let pool = match options.max_pool {
        Some(0) => {
            return Err(Error::InvalidParameter("max_pool must be positive".into()));
        }
        Some(max) if pool.nrows() > max => {
            subset = subsample_rows(pool, max, seed);
            &subset
        }
        _ => pool,
    };

    let (n, q) = pool.shape();
    let rank = n.min(q);
    let k_used = if k > rank {
        warn!(
            requested = k,
            rank, "channel count exceeds pool rank; truncating"
        );
        rank
    } else {
        k
    };

    let means = column_means(pool);
    let centered = center_columns(pool, means.as_slice());

    let svd = centered.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or(Error::DegenerateInput("singular value decomposition produced no basis"))?;
    let singular = svd.singular_values;

    // Order directions by decreasing singular value
    let mut order: Vec<usize> = (0..singular.len()).collect();
    order.sort_by(|&a, &b| singular[b].total_cmp(&singular[a]));

    let mut matrix = DMatrix::from_fn(q, k_used, |i, j| v_t[(order[j], i)]);
    for mut column in matrix.column_iter_mut() {
        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            column.neg_mut();
        }
    }

    let kept: Vec<f64> = order[..k_used].iter().map(|&j| singular[j]).collect();
    let total_variance: f64 = singular.iter().map(|s| s * s).sum();
    let explained_variance_ratio = kept
        .iter()
        .map(|s| {
            if total_variance > 0.0 {
                s * s / total_variance
            } else {
                0.0
            }
        })
        .collect();

    if options.whiten {
        for (mut column, s) in matrix.column_iter_mut().zip(&kept) {
            column /= s + WHITEN_FLOOR;
        }
    }

    if options.reorthonormalize {
        matrix = reorthonormalize(&matrix);
    }

    debug!(
        pool = n,
        pixels = q,
        channels = k_used,
        whiten = options.whiten,
        "learned PCA channels"
    );

    Ok(ChannelBasis {
        matrix,
        singular_values: kept,
        explained_variance_ratio,
        requested: k,
        // QR restores unit column norms, undoing the whitening scale
        whitened: options.whiten && !options.reorthonormalize,
    })
}

/// Seeded subset of `count` rows, kept in their original order.
fn subsample_rows(pool: &PatchMatrix, count: usize, seed: u64) -> PatchMatrix {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut rows = rand::seq::index::sample(&mut rng, pool.nrows(), count).into_vec();
    rows.sort_unstable();
    pool.select_rows(rows.iter())
}

/// QR re-orthonormalization that keeps each column pointing the same way.
fn reorthonormalize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let mut q = matrix.clone().qr().q();
    for (mut column, original) in q.column_iter_mut().zip(matrix.column_iter()) {
        if column.dot(&original) < 0.0 {
            column.neg_mut();
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured_pool(n: usize, q: usize) -> PatchMatrix {
        // Deterministic pool with a few dominant spatial modes plus small texture
        DMatrix::from_fn(n, q, |i, j| {
            let a = ((i * 7 + 3) % 11) as f64 - 5.0;
            let b = ((i * 5 + 1) % 13) as f64 - 6.0;
            let x = j as f64 / q as f64;
            a * (std::f64::consts::PI * x).sin()
                + 0.5 * b * (3.0 * std::f64::consts::PI * x).cos()
                + 0.01 * (((i * 31 + j * 17) % 29) as f64)
        })
    }

    fn assert_orthonormal(u: &DMatrix<f64>, tol: f64) {
        let gram = u.transpose() * u;
        let k = u.ncols();
        for i in 0..k {
            for j in 0..k {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (gram[(i, j)] - expected).abs() < tol,
                    "gram[{}, {}] = {}",
                    i,
                    j,
                    gram[(i, j)]
                );
            }
        }
    }

    #[test]
    fn test_shape_and_orthonormality() {
        let pool = structured_pool(50, 81);
        let basis = learn_channels(&pool, 4, ChannelOptions::default(), 0).unwrap();
        assert_eq!(basis.matrix().shape(), (81, 4));
        assert_orthonormal(basis.matrix(), 1e-9);
    }

    #[test]
    fn test_variance_ordering() {
        let pool = structured_pool(40, 30);
        let basis = learn_channels(&pool, 5, ChannelOptions::default(), 0).unwrap();
        let s = basis.singular_values();
        assert!(s.windows(2).all(|w| w[0] >= w[1]));
        let ratios = basis.explained_variance_ratio();
        assert!(ratios.iter().sum::<f64>() <= 1.0 + 1e-12);
    }

    #[test]
    fn test_truncates_to_rank() {
        let pool = structured_pool(6, 20);
        let basis = learn_channels(&pool, 10, ChannelOptions::default(), 0).unwrap();
        assert_eq!(basis.channels(), 6);
        assert_eq!(basis.requested(), 10);
    }

    #[test]
    fn test_whitened_reorthonormalized() {
        let pool = structured_pool(50, 25);
        let options = ChannelOptions {
            whiten: true,
            reorthonormalize: true,
            max_pool: None,
        };
        let basis = learn_channels(&pool, 3, options, 0).unwrap();
        assert!(!basis.is_whitened());
        assert_orthonormal(basis.matrix(), 1e-9);

        let plain = learn_channels(&pool, 3, ChannelOptions::default(), 0).unwrap();
        assert!((basis.matrix() - plain.matrix()).amax() < 1e-9);
    }

    #[test]
    fn test_whitened_scales_columns() {
        let pool = structured_pool(50, 25);
        let options = ChannelOptions {
            whiten: true,
            ..ChannelOptions::default()
        };
        let basis = learn_channels(&pool, 2, options, 0).unwrap();
        let s = basis.singular_values()[0];
        let norm = basis.matrix().column(0).norm();
        assert!((norm - 1.0 / (s + WHITEN_FLOOR)).abs() < 1e-9);
    }

    #[test]
    fn test_max_pool_seeded() {
        let pool = structured_pool(60, 16);
        let options = ChannelOptions {
            max_pool: Some(20),
            ..ChannelOptions::default()
        };
        let a = learn_channels(&pool, 3, options, 7).unwrap();
        let b = learn_channels(&pool, 3, options, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_project_dimension_mismatch() {
        let basis = ChannelBasis::identity(9);
        let patches = DMatrix::<f64>::zeros(3, 8);
        assert_eq!(
            basis.project(&patches),
            Err(Error::dimension("patch length", 9, 8))
        );
    }

    #[test]
    fn test_empty_pool_and_zero_channels() {
        let empty = DMatrix::<f64>::zeros(0, 9);
        assert!(matches!(
            learn_channels(&empty, 2, ChannelOptions::default(), 0),
            Err(Error::DegenerateInput(_))
        ));
        let pool = structured_pool(10, 9);
        assert!(matches!(
            learn_channels(&pool, 0, ChannelOptions::default(), 0),
            Err(Error::DegenerateInput(_))
        ));
        let options = ChannelOptions {
            max_pool: Some(0),
            ..ChannelOptions::default()
        };
        assert!(matches!(
            learn_channels(&pool, 2, options, 0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
