use crate::model::Dataset;

use log::warn;
use matrix_kit::stat::column_median;
use nalgebra::DVector;

/// Share of the molecule-count range clipped off each extreme when
/// selecting components for the pooled prior
const BAND_FRACTION: f32 = 0.01;

/// Robust shape prior pooled across all datasets.
///
/// Every component's observed shape eigenvalues enter, weighted by
/// nothing but a band filter on its molecule count: with
/// `t = 0.01 * (n_max - n_min)` only components with
/// `n_min + t <= n <= n_max - t` are retained, so the very smallest and
/// very largest components cannot drag the estimate. The prior is the
/// coordinate-wise median of the retained shape vectors. When the band
/// retains nothing, the unfiltered pool is used instead (with a
/// warning). `None` when there are no components.
pub fn pooled_shape_prior(datasets: &[Dataset]) -> Option<DVector<f32>> {
    let pooled = datasets
        .iter()
        .flat_map(|dataset| {
            dataset
                .components
                .iter()
                .map(|component| (&component.shape_eigen_values, component.n_molecules))
        })
        .collect::<Vec<_>>();

    if pooled.is_empty() {
        return None;
    }

    let n_min = pooled.iter().map(|&(_, n)| n).min()? as f32;
    let n_max = pooled.iter().map(|&(_, n)| n).max()? as f32;
    let threshold = BAND_FRACTION * (n_max - n_min);

    let lb = n_min + threshold;
    let ub = n_max - threshold;

    let mut retained = pooled
        .iter()
        .filter(|&&(_, n)| (n as f32) >= lb && (n as f32) <= ub)
        .map(|&(shape, _)| shape)
        .collect::<Vec<_>>();

    if retained.is_empty() {
        warn!(
            "molecule-count band [{:.1}, {:.1}] retained no components; using all {}",
            lb,
            ub,
            pooled.len()
        );
        retained = pooled.iter().map(|&(shape, _)| shape).collect();
    }

    Some(column_median(&retained))
}

/// Commit the pooled prior: it becomes every dataset's default shape
/// prior; with `set_individual_priors` every component's own shape
/// prior is replaced as well, otherwise only empty components
/// (`n_molecules == 0`) are bootstrapped with it.
pub fn apply_global_shape_prior(
    datasets: &mut [Dataset],
    prior: &DVector<f32>,
    set_individual_priors: bool,
) {
    for dataset in datasets.iter_mut() {
        dataset.default_shape_prior = prior.clone();

        for component in dataset.components.iter_mut() {
            if set_individual_priors || component.n_molecules == 0 {
                component.shape_prior = prior.clone();
            }
        }
    }
}
