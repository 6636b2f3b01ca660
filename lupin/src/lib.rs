//! Empirical-Bayes prior adaptation for Bayesian mixture-model
//! segmentation of imaging-based spatial transcriptomics data.
//!
//! A segmentation sampler assigns detected molecules to spatial
//! components ("cells"). Between sampling iterations, each component's
//! priors are refreshed by borrowing strength from components with
//! similar expression profiles: a k-nearest-neighbour graph is built in
//! (optionally PCA-reduced) expression space, gene-count priors are
//! pooled over each neighbourhood, shape priors are smoothed by a
//! per-dimension trimmed mean, and a robust global shape prior is
//! computed across replicates as a default and a bootstrap for empty
//! components. A gene-gene co-occurrence table is re-estimated from the
//! current per-cell profiles and shared across all replicates.
//!
//! The sampler itself (assignments, likelihoods, molecule parsing) is
//! an external collaborator; this crate only consumes sufficient
//! statistics and mutates priors.
//!
//! # References
//!
//! Petukhov et al. (2021). "Cell segmentation in imaging-based spatial
//! transcriptomics." Nature Biotechnology 40:345-354.

/// Component and dataset records (sufficient statistics and priors)
pub mod model;

/// Gene x component count and profile matrices
pub mod expression;

/// Gene-gene co-occurrence probability table
pub mod cooccurrence;

/// Expression-space k-nearest-neighbour assignment
pub mod neighborhood;

/// Neighbourhood smoothing of gene-count and shape priors
pub mod smoothing;

/// Pooled robust shape prior across datasets
pub mod global_prior;

/// One-pass orchestration of a prior update cycle
pub mod update;

pub use model::{Component, Dataset};
pub use neighborhood::{ExpressionNeighborhood, NeighborhoodArgs};
pub use update::{update_priors, PriorUpdateArgs};
