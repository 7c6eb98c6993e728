use log::info;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::FlowRecord;

use super::isolation_forest::IsolationForest;
use super::stats::{standardize, CountEntry, Counter};

pub const DEFAULT_CONTAMINATION: f64 = 0.1;
pub const DEFAULT_SEED: u64 = 42;

const TOP_ANOMALOUS_IPS: usize = 10;

/// Per-record anomaly annotation; a materialized augmentation of the dataset,
/// index-aligned with its records.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FlowAnomaly {
    pub is_outlier: bool,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnomalyReport {
    pub total_anomalies: usize,
    pub anomaly_percentage: f64,
    pub anomaly_by_label: Vec<CountEntry>,
    pub anomaly_protocols: Vec<CountEntry>,
    pub top_anomalous_sources: Vec<CountEntry>,
    pub top_anomalous_destinations: Vec<CountEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnomalyOutcome {
    pub flags: Vec<FlowAnomaly>,
    pub report: AnomalyReport,
}

fn feature_row(record: &FlowRecord) -> Vec<f64> {
    let finite = |value: f64| if value.is_finite() { value } else { 0.0 };
    vec![
        finite(record.duration),
        record.tot_pkts as f64,
        record.tot_bytes as f64,
        record.src_bytes as f64,
        record.dst_bytes as f64,
        finite(record.pkt_size),
        record.src_port as f64,
        record.dst_port as f64,
    ]
}

fn empty_report() -> AnomalyReport {
    AnomalyReport {
        total_anomalies: 0,
        anomaly_percentage: 0.0,
        anomaly_by_label: Vec::new(),
        anomaly_protocols: Vec::new(),
        top_anomalous_sources: Vec::new(),
        top_anomalous_destinations: Vec::new(),
    }
}

/// Isolation-forest outlier scoring over the standardized numeric flow
/// features. Approximately `contamination * N` records get the outlier flag:
/// exactly the lowest `round(contamination * N)` scores, deterministically
/// for a fixed seed. Datasets of zero or one record yield a degenerate
/// outcome rather than a failure.
pub fn detect_anomalies(dataset: &Dataset, contamination: f64, seed: u64) -> AnomalyOutcome {
    info!("Detecting anomalies...");

    if dataset.len() <= 1 {
        return AnomalyOutcome {
            flags: dataset
                .records()
                .iter()
                .map(|_| FlowAnomaly {
                    is_outlier: false,
                    score: 0.0,
                })
                .collect(),
            report: empty_report(),
        };
    }

    let mut matrix: Vec<Vec<f64>> = dataset.records().iter().map(feature_row).collect();
    standardize(&mut matrix);

    let forest = IsolationForest::fit(&matrix, IsolationForest::DEFAULT_TREES, seed);
    let scores = forest.score_samples(&matrix);

    // Rank by score ascending (stable), flag the lowest round(c * N).
    let outlier_count = (contamination * dataset.len() as f64).round() as usize;
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut flags: Vec<FlowAnomaly> = scores
        .iter()
        .map(|&score| FlowAnomaly {
            is_outlier: false,
            score,
        })
        .collect();
    for &index in order.iter().take(outlier_count) {
        flags[index].is_outlier = true;
    }

    let mut by_label = Counter::new();
    let mut by_protocol = Counter::new();
    let mut sources = Counter::new();
    let mut destinations = Counter::new();
    for (record, flag) in dataset.records().iter().zip(&flags) {
        if !flag.is_outlier {
            continue;
        }
        by_label.add(record.label_category);
        by_protocol.add(record.proto_category);
        sources.add(record.src_addr.clone());
        destinations.add(record.dst_addr.clone());
    }

    let total_anomalies = flags.iter().filter(|f| f.is_outlier).count();
    let report = AnomalyReport {
        total_anomalies,
        anomaly_percentage: total_anomalies as f64 / dataset.len() as f64 * 100.0,
        anomaly_by_label: by_label.sorted_desc(),
        anomaly_protocols: by_protocol.sorted_desc(),
        top_anomalous_sources: sources.top_n(TOP_ANOMALOUS_IPS),
        top_anomalous_destinations: destinations.top_n(TOP_ANOMALOUS_IPS),
    };

    AnomalyOutcome { flags, report }
}
