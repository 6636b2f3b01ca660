use matrix_kit::traits::MatOps;

use log::warn;
use nalgebra::DMatrix;
use nalgebra_sparse::CscMatrix;

/// Gene-gene co-occurrence probability table.
///
/// For a raw gene x component count matrix and per-component molecule
/// totals `n`, computes `P[i, k] = Pr(gene i present | one observed
/// transcript is of type k)`: the count matrix is scaled into per-cell
/// relative frequencies, cells are weighted by the empirical size prior
/// `n[c] / sum(n)`, and gene `i`'s relative frequency is marginalized
/// over the posterior over cells given one transcript of type `k`.
///
/// Fallback convention: a transcript type `k` with zero total joint
/// mass (never observed in any weighted cell) yields an all-zero column
/// `P[:, k]` rather than NaN. All entries lie in `[0, 1]`.
pub fn gene_cooccurrence_probs(
    counts: &CscMatrix<f32>,
    n_molecules: &[f32],
) -> anyhow::Result<DMatrix<f32>> {
    let n_genes = counts.nrows();
    let nn = counts.ncols();

    if nn != n_molecules.len() {
        anyhow::bail!(
            "{} columns vs. {} molecule totals in the co-occurrence estimate",
            nn,
            n_molecules.len()
        );
    }

    let total: f32 = n_molecules.iter().sum();
    if total <= 0.0 {
        warn!("no molecules assigned anywhere; emitting an all-zero co-occurrence table");
        return Ok(DMatrix::zeros(n_genes, n_genes));
    }

    let mut profiles = nalgebra_sparse::convert::serial::convert_csc_dense(counts);
    profiles.profile_columns_inplace();

    // joint[k, c] = Pr(transcript type k, cell c)
    let mut joint = profiles.clone();
    for (cc, mut joint_c) in joint.column_iter_mut().enumerate() {
        joint_c *= n_molecules[cc] / total;
    }

    let mut probs = &profiles * joint.transpose();

    for kk in 0..n_genes {
        let denom: f32 = joint.row(kk).sum();
        let mut probs_k = probs.column_mut(kk);
        if denom > 0.0 {
            probs_k /= denom;
        } else {
            probs_k.fill(0.0);
        }
    }

    Ok(probs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_kit::traits::MatTriplets;

    fn counts_2x2() -> CscMatrix<f32> {
        // cell 0 = [2, 0], cell 1 = [1, 1]
        CscMatrix::from_nonzero_triplets(2, 2, vec![(0, 0, 2.0), (0, 1, 1.0), (1, 1, 1.0)])
            .unwrap()
    }

    #[test]
    fn hand_computed_two_gene_case() -> anyhow::Result<()> {
        let probs = gene_cooccurrence_probs(&counts_2x2(), &[2.0, 2.0])?;

        // profiles: cell 0 = [1, 0], cell 1 = [.5, .5]; cell prior = [.5, .5]
        // joint[0,:] = [.5, .25], joint[1,:] = [0, .25]
        approx::assert_abs_diff_eq!(probs[(0, 0)], 0.625 / 0.75, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(probs[(1, 0)], 0.125 / 0.75, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(probs[(0, 1)], 0.5, epsilon = 1e-6);
        approx::assert_abs_diff_eq!(probs[(1, 1)], 0.5, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn entries_are_probabilities() -> anyhow::Result<()> {
        let counts = CscMatrix::from_nonzero_triplets(
            3,
            4,
            vec![
                (0, 0, 5.0),
                (1, 0, 1.0),
                (1, 1, 3.0),
                (2, 2, 2.0),
                (0, 3, 1.0),
                (2, 3, 4.0),
            ],
        )?;
        let probs = gene_cooccurrence_probs(&counts, &[6.0, 3.0, 2.0, 5.0])?;

        assert_eq!(probs.shape(), (3, 3));
        for &p in probs.iter() {
            assert!((0.0..=1.0).contains(&p), "entry {} out of [0,1]", p);
        }
        Ok(())
    }

    #[test]
    fn unobserved_transcript_type_gives_zero_column() -> anyhow::Result<()> {
        // gene 2 never appears in any cell
        let counts =
            CscMatrix::from_nonzero_triplets(3, 2, vec![(0, 0, 2.0), (1, 1, 3.0)])?;
        let probs = gene_cooccurrence_probs(&counts, &[2.0, 3.0])?;

        assert_eq!(probs.column(2).sum(), 0.0);
        assert!(probs.iter().all(|p| p.is_finite()));
        Ok(())
    }

    #[test]
    fn zero_total_molecules_is_all_zero() -> anyhow::Result<()> {
        let probs = gene_cooccurrence_probs(&counts_2x2(), &[0.0, 0.0])?;
        assert_eq!(probs.sum(), 0.0);
        Ok(())
    }

    #[test]
    fn mismatched_totals_are_an_error() {
        assert!(gene_cooccurrence_probs(&counts_2x2(), &[1.0]).is_err());
    }
}
