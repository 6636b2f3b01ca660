use nalgebra::{DMatrix, DVector};

/// One mixture component ("cell" or empty/background cluster).
///
/// `composition_counts` and `n_molecules` are sufficient statistics
/// produced by the sampling loop and are read-only here;
/// `gene_count_prior` and `shape_prior` are the only fields a prior
/// update mutates. The count vector may be shorter than the gene
/// vocabulary; it is zero-padded wherever it is consumed.
#[derive(Debug, Clone)]
pub struct Component {
    /// Per-gene molecule counts currently assigned to this component
    pub composition_counts: DVector<f32>,
    /// Eigenvalue summary of the component's observed spatial spread
    pub shape_eigen_values: DVector<f32>,
    /// Pseudo-count prior over the gene vocabulary, overwritten by
    /// expression smoothing
    pub gene_count_prior: DVector<f32>,
    /// Shape prior used by the sampler, overwritten by the shape
    /// smoothers; starts out at the observed eigenvalues
    pub shape_prior: DVector<f32>,
    /// Number of molecules currently assigned; `0` marks an empty or
    /// newly spawned component
    pub n_molecules: usize,
}

impl Component {
    pub fn new(
        composition_counts: DVector<f32>,
        shape_eigen_values: DVector<f32>,
        n_molecules: usize,
    ) -> anyhow::Result<Self> {
        if composition_counts.iter().any(|&x| x < 0.0) {
            anyhow::bail!("negative composition counts");
        }

        let gene_count_prior = DVector::zeros(composition_counts.len());
        let shape_prior = shape_eigen_values.clone();

        Ok(Self {
            composition_counts,
            shape_eigen_values,
            gene_count_prior,
            shape_prior,
            n_molecules,
        })
    }
}

/// One replicate / field of view: an ordered set of components plus the
/// dataset-level mutable state written by a prior update. The
/// co-occurrence matrix and the default shape prior are explicit fields
/// here, owned by the dataset and written by exactly one call path.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub components: Vec<Component>,
    /// Gene-identity column of the molecule table; consulted only for
    /// the maximum gene index
    pub molecule_genes: Vec<usize>,
    /// `Pr(gene i present | one observed transcript of type k)`,
    /// overwritten wholesale each update and identical across all
    /// datasets updated together
    pub gene_cooccurrence: DMatrix<f32>,
    /// Dataset-level default shape prior (sampler fallback), set to the
    /// pooled global prior each update
    pub default_shape_prior: DVector<f32>,
}

impl Dataset {
    pub fn new(components: Vec<Component>, molecule_genes: Vec<usize>) -> Self {
        Self {
            components,
            molecule_genes,
            gene_cooccurrence: DMatrix::zeros(0, 0),
            default_shape_prior: DVector::zeros(0),
        }
    }

    /// `1 + max` gene index seen in this dataset's molecule table
    pub fn vocabulary_size(&self) -> usize {
        self.molecule_genes.iter().max().map(|&g| g + 1).unwrap_or(0)
    }
}

/// Gene vocabulary size across all datasets: derived from the molecule
/// tables, widened to cover the longest count vector so that dimension
/// mismatches pad instead of erroring.
pub fn vocabulary_size(datasets: &[Dataset]) -> usize {
    let from_molecules = datasets
        .iter()
        .map(|dataset| dataset.vocabulary_size())
        .max()
        .unwrap_or(0);

    let from_counts = datasets
        .iter()
        .flat_map(|dataset| {
            dataset
                .components
                .iter()
                .map(|component| component.composition_counts.len())
        })
        .max()
        .unwrap_or(0);

    from_molecules.max(from_counts)
}
