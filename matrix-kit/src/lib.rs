//! Dense and sparse matrix helpers shared across the workspace:
//! column-profile normalization, triplet-built sparse matrices,
//! randomized SVD, HNSW nearest-neighbour lookup over column vectors,
//! and robust scalar statistics.

pub mod dmatrix_util;
pub mod knn;
pub mod rsvd;
pub mod stat;
pub mod traits;
pub mod utils;
