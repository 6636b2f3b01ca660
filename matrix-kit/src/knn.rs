use instant_distance::{Builder, Search};
use nalgebra::DVectorView;

/// a wrapper for `Vec<f32>` implementing `instant_distance::Point`
#[derive(Clone, Debug)]
pub struct VecPoint {
    pub data: Vec<f32>,
}

impl instant_distance::Point for VecPoint {
    fn distance(&self, other: &Self) -> f32 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }
}

/// An HNSW dictionary for fast nearest-neighbour look-up over a set of
/// column vectors, each tagged with a caller-supplied `usize` label.
pub struct ColumnIndex {
    dict: instant_distance::HnswMap<VecPoint, usize>,
    n_points: usize,
}

impl ColumnIndex {
    pub fn from_columns(data: Vec<DVectorView<f32>>, labels: Vec<usize>) -> anyhow::Result<Self> {
        if data.is_empty() {
            anyhow::bail!("refusing to build an empty column index");
        }
        if data.len() != labels.len() {
            anyhow::bail!(
                "{} columns vs. {} labels in the column index",
                data.len(),
                labels.len()
            );
        }

        let n_points = data.len();
        let points = data
            .iter()
            .map(|x_j| VecPoint {
                data: x_j.iter().cloned().collect(),
            })
            .collect();

        let dict = Builder::default().build(points, labels);

        Ok(Self { dict, n_points })
    }

    pub fn len(&self) -> usize {
        self.n_points
    }

    pub fn is_empty(&self) -> bool {
        self.n_points == 0
    }

    /// Labels and Euclidean distances of up to `knn` points nearest to
    /// `query`, in the index's native order. A query point that was
    /// itself indexed is allowed to match itself.
    pub fn nearest(&self, query: DVectorView<f32>, knn: usize) -> (Vec<usize>, Vec<f32>) {
        let nquery = knn.min(self.n_points);

        let query = VecPoint {
            data: query.iter().cloned().collect(),
        };

        let mut search = Search::default();
        let mut labels = Vec::with_capacity(nquery);
        let mut distances = Vec::with_capacity(nquery);

        for found in self.dict.search(&query, &mut search).take(nquery) {
            labels.push(*found.value);
            distances.push(found.distance);
        }

        (labels, distances)
    }
}
