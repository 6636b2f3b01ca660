use matrix_kit::knn::ColumnIndex;
use matrix_kit::rsvd::RandomizedSvd;
use matrix_kit::traits::MatOps;
use matrix_kit::utils::create_jobs;

use dashmap::DashMap;
use indicatif::ParallelProgressIterator;
use log::{info, warn};
use nalgebra::DMatrix;
use rayon::prelude::*;

const RSVD_ITER: usize = 5;

/// Parameters for the expression-space neighbourhood
#[derive(Debug, Clone)]
pub struct NeighborhoodArgs {
    /// Number of nearest reference components per component
    pub knn: usize,
    /// Minimum molecules for a component to act as a reference point
    pub min_molecules: usize,
    /// Project to this many principal components before the neighbour
    /// search; `0` searches in the full profile space
    pub n_prin_comps: usize,
    /// Block size for parallel neighbour queries
    pub block_size: usize,
}

impl Default for NeighborhoodArgs {
    fn default() -> Self {
        Self {
            knn: 15,
            min_molecules: 1,
            n_prin_comps: 0,
            block_size: 1000,
        }
    }
}

/// For each of the `C` components, the absolute indices of its nearest
/// reference components in expression space. Ephemeral: rebuilt from
/// scratch every update cycle, never stored on the entities.
pub struct ExpressionNeighborhood {
    pub neighbors: Vec<Vec<usize>>,
}

impl ExpressionNeighborhood {
    pub fn neighbors(&self, component: usize) -> &[usize] {
        &self.neighbors[component]
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Build the neighbour assignment from a gene x component
    /// expression matrix. Columns are profiled (scaled to sum to one)
    /// before any distance is taken, so raw counts and already
    /// normalized profiles give the same answer.
    ///
    /// Every component (reference or not) queries its `knn` nearest
    /// points among the reference subset; self-inclusion is allowed and
    /// ties follow the index's native deterministic order. Queries are
    /// independent and run block-parallel against the shared immutable
    /// index, then are gathered back in original component order.
    ///
    /// * `profiles` - column-profiled expression matrix (genes x components)
    /// * `n_molecules` - per-component molecule counts, length = ncols
    pub fn build(
        profiles: &DMatrix<f32>,
        n_molecules: &[usize],
        args: &NeighborhoodArgs,
    ) -> anyhow::Result<Self> {
        let nn = profiles.ncols();

        if nn != n_molecules.len() {
            anyhow::bail!(
                "{} profile columns vs. {} molecule counts",
                nn,
                n_molecules.len()
            );
        }

        if nn == 0 {
            return Ok(Self { neighbors: vec![] });
        }

        let profiles = profiles.profile_columns();

        let query_space = if args.n_prin_comps > 0 && args.n_prin_comps < profiles.nrows() {
            project_principal(&profiles, args.n_prin_comps)?
        } else {
            profiles
        };

        let reference = reference_columns(n_molecules, args.min_molecules)?;

        let knn = if args.knn > reference.len() {
            warn!(
                "only {} reference components for {} requested neighbours",
                reference.len(),
                args.knn
            );
            reference.len()
        } else {
            args.knn
        };

        let reference_cols = reference
            .iter()
            .map(|&cc| query_space.column(cc))
            .collect::<Vec<_>>();

        let index = ColumnIndex::from_columns(reference_cols, reference.clone())?;

        info!(
            "expression neighbourhood: {} components, {} references, k = {}, {} dims",
            nn,
            reference.len(),
            knn,
            query_space.nrows()
        );

        let jobs = create_jobs(nn, args.block_size);
        let njobs = jobs.len() as u64;

        let hits: DashMap<usize, Vec<usize>> = DashMap::new();

        jobs.into_par_iter()
            .progress_count(njobs)
            .for_each(|(lb, ub)| {
                for ii in lb..ub {
                    let (found, _distances) = index.nearest(query_space.column(ii), knn);
                    hits.insert(ii, found);
                }
            });

        let neighbors = (0..nn)
            .map(|ii| hits.remove(&ii).map(|(_, found)| found).unwrap_or_default())
            .collect();

        Ok(Self { neighbors })
    }
}

/// Components trusted as neighbour-query targets. An over-strict
/// molecule threshold is relaxed to 1 instead of producing an empty
/// index; only a batch with no assigned molecules at all is an error.
fn reference_columns(n_molecules: &[usize], min_molecules: usize) -> anyhow::Result<Vec<usize>> {
    let passing = |threshold: usize| -> Vec<usize> {
        n_molecules
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n >= threshold)
            .map(|(cc, _)| cc)
            .collect()
    };

    let threshold = min_molecules.max(1);
    let mut reference = passing(threshold);

    if reference.is_empty() && threshold > 1 {
        warn!(
            "no components with {} molecules or more; relaxing the reference threshold to 1",
            threshold
        );
        reference = passing(1);
    }

    if reference.is_empty() {
        anyhow::bail!("no components with any assigned molecules");
    }

    Ok(reference)
}

/// Distance space for the neighbour queries: centre each gene across
/// components, then project onto the top left singular vectors.
fn project_principal(profiles: &DMatrix<f32>, n_prin_comps: usize) -> anyhow::Result<DMatrix<f32>> {
    let mut centred = profiles.clone();
    let gene_means = profiles.column_mean();
    for mut col in centred.column_iter_mut() {
        col -= &gene_means;
    }

    let (uu, _, _) = RandomizedSvd::new(n_prin_comps, RSVD_ITER).compute(&centred)?;
    Ok(uu.transpose() * centred)
}
