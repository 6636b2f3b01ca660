use crate::traits::*;

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;

impl MatOps for DMatrix<f32> {
    type Mat = Self;

    fn profile_columns(&self) -> Self::Mat {
        let mut ret = self.clone();
        ret.profile_columns_inplace();
        ret
    }

    fn profile_columns_inplace(&mut self) {
        for mut x_j in self.column_iter_mut() {
            let denom: f32 = x_j.sum();
            if denom > 0.0 {
                x_j /= denom;
            }
        }
    }
}

impl MatOps for CscMatrix<f32> {
    type Mat = Self;

    fn profile_columns(&self) -> Self::Mat {
        let mut ret = self.clone();
        ret.profile_columns_inplace();
        ret
    }

    fn profile_columns_inplace(&mut self) {
        self.col_iter_mut().for_each(|mut x_j| {
            let denom: f32 = x_j.values().iter().sum();
            if denom > 0.0 {
                x_j.values_mut().iter_mut().for_each(|x_ij| {
                    *x_ij /= denom;
                });
            }
        });
    }
}

impl MatTriplets for CscMatrix<f32> {
    type Mat = Self;
    type Scalar = f32;

    fn from_nonzero_triplets(
        nrow: usize,
        ncol: usize,
        triplets: Vec<(usize, usize, f32)>,
    ) -> anyhow::Result<Self::Mat> {
        let mut coo = CooMatrix::new(nrow, ncol);
        for (ii, jj, x_ij) in triplets {
            if ii >= nrow || jj >= ncol {
                anyhow::bail!(
                    "triplet ({}, {}) out of bounds for a {} x {} matrix",
                    ii,
                    jj,
                    nrow,
                    ncol
                );
            }
            if x_ij != 0.0 {
                coo.push(ii, jj, x_ij);
            }
        }
        Ok(CscMatrix::from(&coo))
    }

    fn to_nonzero_triplets(&self) -> (usize, usize, Vec<(usize, usize, f32)>) {
        let triplets = self
            .triplet_iter()
            .map(|(ii, jj, &x_ij)| (ii, jj, x_ij))
            .collect();
        (self.nrows(), self.ncols(), triplets)
    }
}

impl SampleOps for DMatrix<f32> {
    type Mat = Self;

    fn rnorm(dd: usize, nn: usize) -> Self::Mat {
        let rvec: Vec<f32> = (0..(dd * nn))
            .into_par_iter()
            .map_init(rand::rng, |rng, _| rng.sample(StandardNormal))
            .collect();

        DMatrix::<f32>::from_vec(dd, nn, rvec)
    }
}
