use crate::traits::SampleOps;

use nalgebra::{DMatrix, DVector};

type Mat = DMatrix<f32>;
type Vec = DVector<f32>;

/// Randomized truncated SVD
///
/// Range finding by a Gaussian sketch followed by QR-renormalized
/// subspace iteration and a small deterministic SVD (Alg 4.4 of Halko
/// et al. 2009).
pub struct RandomizedSvd {
    rank: usize,
    n_iter: usize,
}

pub const DEFAULT_RSVD_ITER: usize = 5;

pub trait Rsvd {
    fn rsvd(&self, rank: usize) -> anyhow::Result<(Mat, Vec, Mat)>;
}

impl Rsvd for Mat {
    fn rsvd(&self, rank: usize) -> anyhow::Result<(Mat, Vec, Mat)> {
        RandomizedSvd::new(rank, DEFAULT_RSVD_ITER).compute(self)
    }
}

impl RandomizedSvd {
    pub fn new(rank: usize, n_iter: usize) -> Self {
        Self { rank, n_iter }
    }

    /// Factorize `xx` into `(U, S, V)` with at most `rank` components.
    ///
    /// * `U` is `nrows x rank`, `V` is `ncols x rank`, `S` has `rank`
    ///   singular values in non-increasing order.
    pub fn compute(&self, xx: &Mat) -> anyhow::Result<(Mat, Vec, Mat)> {
        let nr = xx.nrows();
        let nc = xx.ncols();

        if nr == 0 || nc == 0 {
            anyhow::bail!("empty {} x {} matrix in rsvd", nr, nc);
        }

        let full = nr.min(nc);
        let (rank, oversample) = if self.rank > 0 && self.rank < full {
            (self.rank, 5.min(full - self.rank))
        } else {
            (full, 0)
        };

        let sketch = Mat::rnorm(nc, rank + oversample);
        let mut qq = (xx * sketch).qr().q();

        for _ in 0..self.n_iter {
            let ww = (xx.transpose() * &qq).qr().q();
            qq = (xx * ww).qr().q();
        }

        let bb = qq.transpose() * xx;
        let svd = bb.svd(true, true);

        if let (Some(svd_u), Some(svd_vt)) = (svd.u, svd.v_t) {
            let rank = rank.min(svd.singular_values.len());
            let uu = &qq * svd_u.columns(0, rank).into_owned();
            let vv = svd_vt.transpose().columns(0, rank).into_owned();
            let ss = svd.singular_values.rows(0, rank).into_owned();
            Ok((uu, ss, vv))
        } else {
            anyhow::bail!("SVD failed on the sketched {} x {} matrix", nr, nc)
        }
    }
}
