use crate::model::Component;
use crate::neighborhood::ExpressionNeighborhood;

use matrix_kit::stat::trimmed_mean_inplace;
use nalgebra::DVector;

/// New gene-count priors: for each component, the element-wise sum of
/// its neighbours' raw counts, zero-padded to `n_genes`. Stateless;
/// each cycle overwrites the previous prior entirely.
pub fn smoothed_gene_count_priors(
    neighborhood: &ExpressionNeighborhood,
    components: &[&Component],
    n_genes: usize,
) -> Vec<DVector<f32>> {
    (0..components.len())
        .map(|ii| {
            let mut prior = DVector::zeros(n_genes);
            for &jj in neighborhood.neighbors(ii) {
                let counts = &components[jj].composition_counts;
                let mut padded = prior.rows_mut(0, counts.len());
                padded += counts;
            }
            prior
        })
        .collect()
}

/// New shape priors: per eigen-dimension trimmed mean over the
/// neighbour set's observed shape eigenvalues, discarding
/// `trim_fraction` from each tail to blunt outlier-shaped neighbours.
/// A component with no neighbours keeps its current prior.
pub fn smoothed_shape_priors(
    neighborhood: &ExpressionNeighborhood,
    components: &[&Component],
    trim_fraction: f32,
) -> Vec<DVector<f32>> {
    (0..components.len())
        .map(|ii| {
            let shapes = neighborhood
                .neighbors(ii)
                .iter()
                .map(|&jj| &components[jj].shape_eigen_values)
                .collect::<Vec<_>>();

            if shapes.is_empty() {
                return components[ii].shape_prior.clone();
            }

            let dd = shapes[0].len();
            DVector::from_fn(dd, |d, _| {
                let mut values = shapes.iter().map(|s| s[d]).collect::<Vec<_>>();
                trimmed_mean_inplace(&mut values, trim_fraction)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(counts: Vec<f32>, shape: Vec<f32>) -> Component {
        let n_molecules = counts.iter().sum::<f32>() as usize;
        Component::new(
            DVector::from_vec(counts),
            DVector::from_vec(shape),
            n_molecules,
        )
        .unwrap()
    }

    #[test]
    fn gene_count_priors_sum_padded_neighbour_counts() {
        // vocabulary of 4 genes; the first count vector is shorter
        let c0 = component(vec![1.0, 0.0, 2.0], vec![1.0, 1.0]);
        let c1 = component(vec![0.0, 1.0, 0.0, 3.0], vec![1.0, 1.0]);
        let c2 = component(vec![2.0, 2.0, 0.0, 0.0], vec![1.0, 1.0]);
        let components = [&c0, &c1, &c2];

        let neighborhood = ExpressionNeighborhood {
            neighbors: vec![vec![1, 2], vec![0], vec![2]],
        };

        let priors = smoothed_gene_count_priors(&neighborhood, &components, 4);

        assert_eq!(priors[0], DVector::from_vec(vec![2.0, 3.0, 0.0, 3.0]));
        assert_eq!(priors[1], DVector::from_vec(vec![1.0, 0.0, 2.0, 0.0]));
        assert_eq!(priors[2], DVector::from_vec(vec![2.0, 2.0, 0.0, 0.0]));
    }

    #[test]
    fn shape_priors_use_the_trimmed_mean_per_dimension() {
        let c0 = component(vec![1.0], vec![1.0, 10.0]);
        let c1 = component(vec![1.0], vec![2.0, 20.0]);
        let c2 = component(vec![1.0], vec![3.0, 30.0]);
        let c3 = component(vec![1.0], vec![4.0, 40.0]);
        let c4 = component(vec![1.0], vec![100.0, -500.0]);
        let components = [&c0, &c1, &c2, &c3, &c4];

        let neighborhood = ExpressionNeighborhood {
            neighbors: vec![vec![0, 1, 2, 3, 4]; 5],
        };

        // cut = floor(5 * 0.2) = 1 from each tail:
        // dim 0 keeps [2, 3, 4], dim 1 keeps [10, 20, 30]
        let priors = smoothed_shape_priors(&neighborhood, &components, 0.2);
        for prior in &priors {
            assert_eq!(*prior, DVector::from_vec(vec![3.0, 20.0]));
        }
    }

    #[test]
    fn no_neighbours_keeps_the_current_shape() {
        let c0 = component(vec![1.0], vec![7.0, 8.0]);
        let components = [&c0];

        let neighborhood = ExpressionNeighborhood {
            neighbors: vec![vec![]],
        };

        let priors = smoothed_shape_priors(&neighborhood, &components, 0.2);
        assert_eq!(priors[0], DVector::from_vec(vec![7.0, 8.0]));
    }
}
