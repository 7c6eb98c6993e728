use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

/// Seeded isolation forest over row-major feature matrices. Scores follow the
/// usual convention: lower (more negative) means more anomalous.
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

enum Node {
    Internal {
        feature: usize,
        split: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Expected average path length of an unsuccessful BST search over n points;
/// normalizes raw path lengths.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        n => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_MASCHERONI) - 2.0 * (n - 1.0) / n
        }
    }
}

fn build_tree(
    data: &[Vec<f64>],
    indices: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if indices.len() <= 1 || depth >= max_depth {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let columns = data[0].len();
    // Pick a random split dimension among those that still vary here.
    let splittable: Vec<usize> = (0..columns)
        .filter(|&col| {
            let first = data[indices[0]][col];
            indices.iter().any(|&row| data[row][col] != first)
        })
        .collect();
    if splittable.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let feature = splittable[rng.gen_range(0..splittable.len())];
    let min = indices
        .iter()
        .map(|&row| data[row][feature])
        .fold(f64::INFINITY, f64::min);
    let max = indices
        .iter()
        .map(|&row| data[row][feature])
        .fold(f64::NEG_INFINITY, f64::max);
    let split = rng.gen_range(min..max);

    let (left, right): (Vec<usize>, Vec<usize>) =
        indices.into_iter().partition(|&row| data[row][feature] < split);

    Node::Internal {
        feature,
        split,
        left: Box::new(build_tree(data, left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(data, right, depth + 1, max_depth, rng)),
    }
}

fn path_length(node: &Node, row: &[f64], depth: f64) -> f64 {
    match node {
        Node::Leaf { size } => depth + average_path_length(*size),
        Node::Internal {
            feature,
            split,
            left,
            right,
        } => {
            if row[*feature] < *split {
                path_length(left, row, depth + 1.0)
            } else {
                path_length(right, row, depth + 1.0)
            }
        }
    }
}

impl IsolationForest {
    pub const DEFAULT_TREES: usize = 100;
    pub const MAX_SAMPLE_SIZE: usize = 256;

    /// Fits `n_trees` trees on random subsamples of `data`. The same seed
    /// always yields the same forest.
    pub fn fit(data: &[Vec<f64>], n_trees: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let sample_size = data.len().min(Self::MAX_SAMPLE_SIZE);
        let max_depth = (sample_size as f64).log2().ceil() as usize;

        let trees = (0..n_trees)
            .map(|_| {
                let sample = rand::seq::index::sample(&mut rng, data.len(), sample_size).into_vec();
                build_tree(data, sample, 0, max_depth.max(1), &mut rng)
            })
            .collect();

        IsolationForest { trees, sample_size }
    }

    /// Per-row anomaly score `-(2 ^ (-E[h(x)] / c(n)))`; lower is more
    /// anomalous.
    pub fn score_samples(&self, data: &[Vec<f64>]) -> Vec<f64> {
        let normalizer = average_path_length(self.sample_size);
        data.iter()
            .map(|row| {
                let avg_path: f64 = self
                    .trees
                    .iter()
                    .map(|tree| path_length(tree, row, 0.0))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                if normalizer == 0.0 {
                    -1.0
                } else {
                    -(2.0_f64.powf(-avg_path / normalizer))
                }
            })
            .collect()
    }
}
