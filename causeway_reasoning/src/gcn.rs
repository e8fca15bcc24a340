//! Graph-convolutional embedding model.
//!
//! A small stacked GCN evaluated in inference mode only: each layer computes
//! `A_hat · X · W + b` over the symmetric-normalized adjacency (with self
//! loops), followed by row-wise layer normalization and, for all but the
//! last layer, a ReLU nonlinearity (dropout is the identity at inference).
//! Residual addition applies between consecutive layers whenever their
//! dimensions match.
//!
//! Weights are initialized from a seeded RNG, so embeddings are fully
//! deterministic for a given configuration.

use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Model shape and determinism knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GcnConfig {
    /// Input feature dimensionality.
    pub input_dim: usize,
    /// Hidden layer dimensionality.
    pub hidden_dim: usize,
    /// Output embedding dimensionality.
    pub output_dim: usize,
    /// Number of stacked graph-convolution layers (>= 2).
    pub num_layers: usize,
    /// Dropout rate; identity at inference, kept for configuration parity.
    pub dropout: f32,
    /// RNG seed for weight initialization.
    pub seed: u64,
}

impl Default for GcnConfig {
    fn default() -> Self {
        Self {
            input_dim: 10,
            hidden_dim: 64,
            output_dim: 32,
            num_layers: 3,
            dropout: 0.2,
            seed: 42,
        }
    }
}

/// One graph-convolution layer.
#[derive(Debug, Clone)]
struct GcnLayer {
    weight: Array2<f32>,
    bias: Array1<f32>,
}

impl GcnLayer {
    /// Glorot-uniform initialization from the shared seeded RNG.
    fn init(rng: &mut ChaCha8Rng, in_dim: usize, out_dim: usize) -> Self {
        let bound = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let dist = Uniform::new(-bound, bound);
        let weight =
            Array2::from_shape_fn((in_dim, out_dim), |_| dist.sample(rng));
        Self {
            weight,
            bias: Array1::zeros(out_dim),
        }
    }
}

/// The stacked GCN embedding model, evaluated in inference mode only.
#[derive(Debug, Clone)]
pub struct GcnModel {
    layers: Vec<GcnLayer>,
    config: GcnConfig,
}

impl GcnModel {
    /// Builds the model with deterministically initialized weights.
    pub fn new(config: GcnConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let num_layers = config.num_layers.max(2);

        let mut dims = Vec::with_capacity(num_layers + 1);
        dims.push(config.input_dim);
        for _ in 0..num_layers - 1 {
            dims.push(config.hidden_dim);
        }
        dims.push(config.output_dim);

        let layers = dims
            .windows(2)
            .map(|pair| GcnLayer::init(&mut rng, pair[0], pair[1]))
            .collect();

        Self { layers, config }
    }

    /// The model configuration.
    pub fn config(&self) -> &GcnConfig {
        &self.config
    }

    /// Computes node embeddings for a feature matrix over a normalized
    /// adjacency (see [`normalized_adjacency`]).
    ///
    /// Returns one `output_dim` row per node.
    pub fn embed(&self, features: &Array2<f32>, adjacency: &Array2<f32>) -> Array2<f32> {
        let mut x = features.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            let mut next = adjacency.dot(&x).dot(&layer.weight) + &layer.bias;
            layer_normalize(&mut next);

            let is_last = i == self.layers.len() - 1;
            if !is_last {
                next.mapv_inplace(|v| v.max(0.0));
                // Dropout would apply here during training; inference is identity.
            }

            // Residual addition when consecutive dimensions match.
            if i > 0 && x.ncols() == next.ncols() {
                x = x + next;
            } else {
                x = next;
            }
        }
        x
    }

    /// Mean-pools the embeddings of the given node rows into one scalar,
    /// clamped into [0, 1].
    pub fn pool_path_score(&self, embeddings: &Array2<f32>, path: &[usize]) -> f32 {
        if path.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0f32;
        let mut count = 0usize;
        for &idx in path {
            if idx >= embeddings.nrows() {
                continue;
            }
            let row = embeddings.row(idx);
            sum += row.sum();
            count += row.len();
        }
        if count == 0 {
            return 0.0;
        }
        (sum / count as f32).clamp(0.0, 1.0)
    }
}

/// Row-wise layer normalization (zero mean, unit variance per node).
fn layer_normalize(x: &mut Array2<f32>) {
    for mut row in x.axis_iter_mut(Axis(0)) {
        let n = row.len() as f32;
        if n == 0.0 {
            continue;
        }
        let mean = row.sum() / n;
        let variance = row.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        let denom = (variance + 1e-5).sqrt();
        row.mapv_inplace(|v| (v - mean) / denom);
    }
}

/// Builds the symmetric-normalized adjacency with self loops:
/// `D^{-1/2} (A + I) D^{-1/2}`, with `A` taken from the directed edge list.
pub fn normalized_adjacency(num_nodes: usize, edges: &[(usize, usize)]) -> Array2<f32> {
    let mut adjacency = Array2::<f32>::eye(num_nodes);
    for &(source, target) in edges {
        if source < num_nodes && target < num_nodes {
            adjacency[[source, target]] = 1.0;
        }
    }

    let degrees: Vec<f32> = adjacency
        .axis_iter(Axis(0))
        .map(|row| row.sum())
        .collect();

    for i in 0..num_nodes {
        for j in 0..num_nodes {
            if adjacency[[i, j]] != 0.0 {
                adjacency[[i, j]] /= (degrees[i] * degrees[j]).sqrt().max(1e-6);
            }
        }
    }
    adjacency
}
