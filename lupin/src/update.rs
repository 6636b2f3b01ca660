use crate::cooccurrence::gene_cooccurrence_probs;
use crate::expression;
use crate::global_prior::{apply_global_shape_prior, pooled_shape_prior};
use crate::model::{vocabulary_size, Component, Dataset};
use crate::neighborhood::{ExpressionNeighborhood, NeighborhoodArgs};
use crate::smoothing::{smoothed_gene_count_priors, smoothed_shape_priors};

use log::warn;
use nalgebra::DVector;

/// Policy flags and tunables for one prior update cycle
#[derive(Debug, Clone)]
pub struct PriorUpdateArgs {
    /// Replace each component's gene-count prior with its
    /// neighbourhood's pooled counts
    pub smooth_expression: bool,
    /// Replace each component's shape prior with its neighbourhood's
    /// trimmed-mean shape
    pub use_cell_type_size_prior: bool,
    /// Overwrite every individual shape prior with the pooled global
    /// one (only honoured when per-cell-type smoothing is off)
    pub use_global_size_prior: bool,
    /// Reference-set filter for the neighbour search
    pub min_molecules_per_cell: usize,
    /// Principal components for the neighbour search; `0` disables the
    /// reduction
    pub n_prin_comps: usize,
    /// Neighbours per component
    pub knn: usize,
    /// Tail fraction discarded by the shape trimmed mean
    pub shape_trim_fraction: f32,
    /// Block size for parallel neighbour queries
    pub block_size: usize,
}

impl Default for PriorUpdateArgs {
    fn default() -> Self {
        Self {
            smooth_expression: false,
            use_cell_type_size_prior: false,
            use_global_size_prior: false,
            min_molecules_per_cell: 1,
            n_prin_comps: 0,
            knn: 15,
            shape_trim_fraction: 0.2,
            block_size: 1000,
        }
    }
}

/// One prior update pass over a batch of datasets.
///
/// Components with no assigned molecules are excluded from the
/// expression matrix and the neighbour graph but remain eligible for
/// the global shape-prior bootstrap. All new values are computed from a
/// consistent read of the batch and committed afterwards, so a caller
/// never observes a partially updated state. The co-occurrence table is
/// recomputed unconditionally and broadcast identically to every
/// dataset; the pooled shape prior is likewise always refreshed.
pub fn update_priors(datasets: &mut [Dataset], args: &PriorUpdateArgs) -> anyhow::Result<()> {
    let n_genes = vocabulary_size(datasets);

    // handles of the components that carry molecules
    let occupied = datasets
        .iter()
        .enumerate()
        .flat_map(|(dd, dataset)| {
            dataset
                .components
                .iter()
                .enumerate()
                .filter(|(_, component)| component.n_molecules > 0)
                .map(move |(jj, _)| (dd, jj))
        })
        .collect::<Vec<_>>();

    if occupied.is_empty() {
        warn!("no components with assigned molecules; skipping expression-based updates");
    } else {
        // compute phase: read-only against the batch
        let (new_gene_priors, new_shape_priors, cooc) = {
            let components = occupied
                .iter()
                .map(|&(dd, jj)| &datasets[dd].components[jj])
                .collect::<Vec<&Component>>();

            let n_molecules = components
                .iter()
                .map(|component| component.n_molecules)
                .collect::<Vec<_>>();

            let mut new_gene_priors: Option<Vec<DVector<f32>>> = None;
            let mut new_shape_priors: Option<Vec<DVector<f32>>> = None;

            if args.smooth_expression || args.use_cell_type_size_prior {
                let profiles = expression::profile_matrix(&components, n_genes)?;

                let nb_args = NeighborhoodArgs {
                    knn: args.knn,
                    min_molecules: args.min_molecules_per_cell,
                    n_prin_comps: args.n_prin_comps,
                    block_size: args.block_size,
                };
                let neighborhood =
                    ExpressionNeighborhood::build(&profiles, &n_molecules, &nb_args)?;

                if args.smooth_expression {
                    new_gene_priors = Some(smoothed_gene_count_priors(
                        &neighborhood,
                        &components,
                        n_genes,
                    ));
                }

                if args.use_cell_type_size_prior {
                    new_shape_priors = Some(smoothed_shape_priors(
                        &neighborhood,
                        &components,
                        args.shape_trim_fraction,
                    ));
                }
            }

            let counts = expression::count_matrix(&components, n_genes)?;
            let totals = n_molecules.iter().map(|&n| n as f32).collect::<Vec<_>>();
            let cooc = gene_cooccurrence_probs(&counts, &totals)?;

            (new_gene_priors, new_shape_priors, cooc)
        };

        // commit phase: single writer, applied after every read
        if let Some(new_priors) = new_gene_priors {
            for (&(dd, jj), prior) in occupied.iter().zip(new_priors) {
                datasets[dd].components[jj].gene_count_prior = prior;
            }
        }

        if let Some(new_priors) = new_shape_priors {
            for (&(dd, jj), prior) in occupied.iter().zip(new_priors) {
                datasets[dd].components[jj].shape_prior = prior;
            }
        }

        for dataset in datasets.iter_mut() {
            dataset.gene_cooccurrence = cooc.clone();
        }
    }

    // the pooled shape prior is refreshed on every pass; a full
    // per-component overwrite only happens when global smoothing was
    // requested without per-cell-type smoothing
    let set_individual = !args.use_cell_type_size_prior && args.use_global_size_prior;
    if let Some(prior) = pooled_shape_prior(datasets) {
        apply_global_shape_prior(datasets, &prior, set_individual);
    }

    Ok(())
}
