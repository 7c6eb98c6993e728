use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::stats::{mean, CountEntry, Counter};
use crate::record::FlowRecord;

/// A flat ordered collection of enriched flow records. Order is file order;
/// no chronological ordering is guaranteed.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<FlowRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub duration_hours: f64,
}

/// Descriptive statistics over a dataset. Recomputed from scratch on every
/// request, never cached.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_flows: usize,
    pub time_range: TimeRange,
    pub label_distribution: Vec<CountEntry>,
    pub protocol_distribution: Vec<CountEntry>,
    pub unique_src_ips: usize,
    pub unique_dst_ips: usize,
    pub total_bytes: i64,
    pub total_packets: i64,
    pub avg_flow_duration: f64,
    pub avg_packet_size: f64,
}

impl Dataset {
    pub fn new(records: Vec<FlowRecord>) -> Self {
        Dataset { records }
    }

    pub fn records(&self) -> &[FlowRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> DatasetSummary {
        let timestamps: Vec<DateTime<Utc>> =
            self.records.iter().filter_map(|r| r.start_time).collect();
        let start = timestamps.iter().min().copied();
        let end = timestamps.iter().max().copied();
        let duration_hours = match (start, end) {
            (Some(start), Some(end)) => (end - start).num_seconds() as f64 / 3600.0,
            _ => 0.0,
        };

        let mut labels = Counter::new();
        let mut protocols = Counter::new();
        let mut src_ips = HashSet::new();
        let mut dst_ips = HashSet::new();
        for record in &self.records {
            labels.add(record.label_category.to_string());
            protocols.add(record.proto_category.to_string());
            src_ips.insert(record.src_addr.as_str());
            dst_ips.insert(record.dst_addr.as_str());
        }

        let durations: Vec<f64> = self.records.iter().map(|r| r.duration).collect();
        let pkt_sizes: Vec<f64> = self.records.iter().map(|r| r.pkt_size).collect();

        DatasetSummary {
            total_flows: self.records.len(),
            time_range: TimeRange {
                start,
                end,
                duration_hours,
            },
            label_distribution: labels.sorted_desc(),
            protocol_distribution: protocols.sorted_desc(),
            unique_src_ips: src_ips.len(),
            unique_dst_ips: dst_ips.len(),
            total_bytes: self.records.iter().map(|r| r.tot_bytes).sum(),
            total_packets: self.records.iter().map(|r| r.tot_pkts).sum(),
            avg_flow_duration: mean(&durations),
            avg_packet_size: mean(&pkt_sizes),
        }
    }
}
