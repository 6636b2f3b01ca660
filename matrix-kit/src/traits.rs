/// Normalize columns into probability profiles
pub trait MatOps {
    type Mat;

    /// Divide each column by its sum so that it sums to one.
    /// All-zero columns are left all-zero.
    fn profile_columns(&self) -> Self::Mat;

    /// In-place version of [`MatOps::profile_columns`]
    fn profile_columns_inplace(&mut self);
}

/// Convert to and from the vector of triplets
pub trait MatTriplets {
    type Mat;
    type Scalar;

    /// Build a matrix from `(row, column, value)` triplets.
    /// Duplicate entries accumulate; out-of-bound indices are an error.
    fn from_nonzero_triplets(
        nrow: usize,
        ncol: usize,
        triplets: Vec<(usize, usize, Self::Scalar)>,
    ) -> anyhow::Result<Self::Mat>;

    fn to_nonzero_triplets(&self) -> (usize, usize, Vec<(usize, usize, Self::Scalar)>);
}

/// Sample random matrices
pub trait SampleOps {
    type Mat;

    /// Sample a `dd x nn` matrix from a normal distribution `N(0,1)`
    fn rnorm(dd: usize, nn: usize) -> Self::Mat;
}
