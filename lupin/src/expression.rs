use crate::model::Component;

use matrix_kit::traits::{MatOps, MatTriplets};
use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;

/// Raw gene x component count matrix: column `c` holds component `c`'s
/// `composition_counts`, zero-padded up to `n_genes` rows.
pub fn count_matrix(components: &[&Component], n_genes: usize) -> anyhow::Result<CscMatrix<f32>> {
    let triplets = components
        .iter()
        .enumerate()
        .flat_map(|(cc, component)| {
            component
                .composition_counts
                .iter()
                .enumerate()
                .filter(|(_, &x)| x > 0.0)
                .map(move |(gg, &x)| (gg, cc, x))
        })
        .collect::<Vec<_>>();

    CscMatrix::from_nonzero_triplets(n_genes, components.len(), triplets)
}

/// Densified count matrix with each column scaled into an expression
/// profile (sums to one). An all-zero column stays all-zero instead of
/// turning into NaN. Pure function of its inputs.
pub fn profile_matrix(components: &[&Component], n_genes: usize) -> anyhow::Result<DMatrix<f32>> {
    let counts = count_matrix(components, n_genes)?;
    let mut profiles = nalgebra_sparse::convert::serial::convert_csc_dense(&counts);
    profiles.profile_columns_inplace();
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn component(counts: Vec<f32>) -> Component {
        let n_molecules = counts.iter().sum::<f32>() as usize;
        Component::new(DVector::from_vec(counts), DVector::zeros(2), n_molecules).unwrap()
    }

    #[test]
    fn columns_are_zero_padded_profiles() -> anyhow::Result<()> {
        // second component's count vector is shorter than the vocabulary
        let aa = component(vec![1.0, 0.0, 3.0, 0.0]);
        let bb = component(vec![2.0, 2.0]);

        let profiles = profile_matrix(&[&aa, &bb], 4)?;
        assert_eq!(profiles.shape(), (4, 2));

        approx::assert_abs_diff_eq!(profiles[(0, 0)], 0.25, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(profiles[(2, 0)], 0.75, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(profiles[(0, 1)], 0.5, epsilon = 1e-6);
        assert_eq!(profiles[(2, 1)], 0.0);
        assert_eq!(profiles[(3, 1)], 0.0);

        for jj in 0..2 {
            approx::assert_abs_diff_eq!(profiles.column(jj).sum(), 1.0, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn all_zero_component_stays_zero() -> anyhow::Result<()> {
        let aa = component(vec![1.0, 1.0]);
        let empty = component(vec![0.0, 0.0]);

        let profiles = profile_matrix(&[&aa, &empty], 2)?;
        assert_eq!(profiles.column(1).sum(), 0.0);
        assert!(profiles.iter().all(|x| x.is_finite()));
        Ok(())
    }

    #[test]
    fn no_components_yields_empty_matrix() -> anyhow::Result<()> {
        let profiles = profile_matrix(&[], 3)?;
        assert_eq!(profiles.shape(), (3, 0));
        Ok(())
    }
}
