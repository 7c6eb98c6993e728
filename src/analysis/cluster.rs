use log::info;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::FlowRecord;

use super::stats::{mean, standardize, CountEntry, Counter};

/// Sentinel cluster id for records in no dense neighborhood.
pub const NOISE: i32 = -1;

/// DBSCAN configuration: neighborhood radius and the minimum neighborhood
/// size (including the point itself) for a core point.
#[derive(Clone, Copy, Debug)]
pub struct ClusterConfig {
    pub eps: f64,
    pub min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            eps: 0.5,
            min_samples: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: i32,
    pub size: usize,
    pub avg_duration: f64,
    pub avg_bytes: f64,
    pub dominant_protocol: String,
    pub label_distribution: Vec<CountEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClusteringOutcome {
    /// Per-record cluster assignment, index-aligned with the dataset;
    /// [`NOISE`] marks unclustered records.
    pub assignments: Vec<i32>,
    pub clusters: Vec<ClusterSummary>,
}

fn feature_row(record: &FlowRecord) -> Vec<f64> {
    let finite = |value: f64| if value.is_finite() { value } else { 0.0 };
    vec![
        finite(record.duration),
        record.tot_pkts as f64,
        record.tot_bytes as f64,
        record.src_bytes as f64,
        finite(record.pkt_size),
    ]
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn region_query(matrix: &[Vec<f64>], point: usize, eps: f64) -> Vec<usize> {
    (0..matrix.len())
        .filter(|&other| euclidean(&matrix[point], &matrix[other]) <= eps)
        .collect()
}

/// Density-based clustering (DBSCAN). Cluster count is not chosen in
/// advance; sparse records end up labeled [`NOISE`].
fn dbscan(matrix: &[Vec<f64>], config: ClusterConfig) -> Vec<i32> {
    let mut labels = vec![NOISE; matrix.len()];
    let mut visited = vec![false; matrix.len()];
    let mut next_cluster = 0;

    for point in 0..matrix.len() {
        if visited[point] {
            continue;
        }
        visited[point] = true;

        let neighbors = region_query(matrix, point, config.eps);
        if neighbors.len() < config.min_samples {
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[point] = cluster;

        let mut queue = neighbors;
        let mut cursor = 0;
        while cursor < queue.len() {
            let candidate = queue[cursor];
            cursor += 1;

            if !visited[candidate] {
                visited[candidate] = true;
                let candidate_neighbors = region_query(matrix, candidate, config.eps);
                if candidate_neighbors.len() >= config.min_samples {
                    queue.extend(candidate_neighbors);
                }
            }
            if labels[candidate] == NOISE {
                labels[candidate] = cluster;
            }
        }
    }

    labels
}

/// Groups flows by behavioral similarity over standardized volume/timing
/// features and summarizes each dense cluster. Noise records are excluded
/// from the per-cluster statistics.
pub fn cluster_network_behavior(dataset: &Dataset, config: ClusterConfig) -> ClusteringOutcome {
    info!("Clustering network behavior...");

    let mut matrix: Vec<Vec<f64>> = dataset.records().iter().map(feature_row).collect();
    standardize(&mut matrix);

    let assignments = dbscan(&matrix, config);

    let cluster_count = assignments.iter().copied().max().map_or(0, |max| max + 1);
    let mut clusters = Vec::new();
    for cluster_id in 0..cluster_count {
        let members: Vec<&FlowRecord> = dataset
            .records()
            .iter()
            .zip(&assignments)
            .filter(|(_, &label)| label == cluster_id)
            .map(|(record, _)| record)
            .collect();
        if members.is_empty() {
            continue;
        }

        let durations: Vec<f64> = members.iter().map(|r| r.duration).collect();
        let bytes: Vec<f64> = members.iter().map(|r| r.tot_bytes as f64).collect();

        let mut protocols = Counter::new();
        let mut labels = Counter::new();
        for record in &members {
            protocols.add(record.proto_category);
            labels.add(record.label_category);
        }

        clusters.push(ClusterSummary {
            cluster_id,
            size: members.len(),
            avg_duration: mean(&durations),
            avg_bytes: mean(&bytes),
            dominant_protocol: protocols
                .mode()
                .map_or_else(|| "Unknown".to_string(), |proto| proto.to_string()),
            label_distribution: labels.sorted_desc(),
        });
    }

    ClusteringOutcome {
        assignments,
        clusters,
    }
}
