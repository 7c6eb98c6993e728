use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use log::info;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::{FlowRecord, LabelCategory};

use super::stats::{describe, group_by, mean, nlargest, CountEntry, Counter, DistributionSummary, SumEntry};

const TOP_MALICIOUS: usize = 20;
const TOP_PAIRS: usize = 10;

#[derive(Clone, Debug, Serialize)]
pub struct MaliciousIps {
    pub malicious_sources: Vec<CountEntry>,
    pub malicious_destinations: Vec<CountEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SuspiciousPorts {
    pub malicious_dst_ports: Vec<CountEntry>,
    pub malicious_src_ports: Vec<CountEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineBucket {
    /// Hour bucket, stringified for report serialization.
    pub hour: String,
    pub attack_count: usize,
    pub attack_bytes: i64,
    pub unique_attackers: usize,
}

/// Hourly activity of labeled malicious flows; the no-attacks case is an
/// explicit marker, not an empty list.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum AttackTimeline {
    NoAttacks { no_attacks_detected: bool },
    Buckets(Vec<TimelineBucket>),
}

#[derive(Clone, Debug, Serialize)]
pub struct CommunicationPatterns {
    pub most_active_pairs: Vec<CountEntry>,
    pub communication_matrix: BTreeMap<String, BTreeMap<String, u64>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PayloadAnalysis {
    pub avg_payload_by_label: Vec<SumEntry>,
    pub payload_size_distribution: BTreeMap<String, DistributionSummary>,
    pub packet_size_patterns: Vec<SumEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ThreatIntelligence {
    pub malicious_ips: MaliciousIps,
    pub suspicious_ports: SuspiciousPorts,
    pub attack_timeline: AttackTimeline,
    pub communication_patterns: CommunicationPatterns,
    pub payload_analysis: PayloadAnalysis,
}

fn is_malicious(record: &FlowRecord) -> bool {
    matches!(
        record.label_category,
        LabelCategory::Botnet | LabelCategory::CAndC
    )
}

pub fn generate_threat_intelligence(dataset: &Dataset) -> ThreatIntelligence {
    info!("Generating threat intelligence...");

    let malicious: Vec<&FlowRecord> = dataset.records().iter().filter(|r| is_malicious(r)).collect();

    ThreatIntelligence {
        malicious_ips: malicious_ips(&malicious),
        suspicious_ports: suspicious_ports(&malicious),
        attack_timeline: attack_timeline(&malicious),
        communication_patterns: communication_patterns(dataset),
        payload_analysis: payload_analysis(dataset),
    }
}

fn malicious_ips(malicious: &[&FlowRecord]) -> MaliciousIps {
    let mut sources = Counter::new();
    let mut destinations = Counter::new();
    for record in malicious {
        sources.add(record.src_addr.clone());
        destinations.add(record.dst_addr.clone());
    }

    MaliciousIps {
        malicious_sources: sources.top_n(TOP_MALICIOUS),
        malicious_destinations: destinations.top_n(TOP_MALICIOUS),
    }
}

fn suspicious_ports(malicious: &[&FlowRecord]) -> SuspiciousPorts {
    let mut dst_ports = Counter::new();
    let mut src_ports = Counter::new();
    for record in malicious {
        dst_ports.add(record.dst_port);
        src_ports.add(record.src_port);
    }

    SuspiciousPorts {
        malicious_dst_ports: dst_ports.top_n(TOP_MALICIOUS),
        malicious_src_ports: src_ports.top_n(TOP_MALICIOUS),
    }
}

fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

fn attack_timeline(malicious: &[&FlowRecord]) -> AttackTimeline {
    if malicious.is_empty() {
        return AttackTimeline::NoAttacks {
            no_attacks_detected: true,
        };
    }

    let timestamped: Vec<(DateTime<Utc>, &FlowRecord)> = malicious
        .iter()
        .filter_map(|r| r.start_time.map(|t| (floor_to_hour(t), *r)))
        .collect();

    let mut buckets: Vec<TimelineBucket> = group_by(&timestamped, |(hour, _)| *hour)
        .into_iter()
        .map(|(hour, flows)| TimelineBucket {
            hour: hour.format("%Y-%m-%d %H:%M:%S").to_string(),
            attack_count: flows.len(),
            attack_bytes: flows.iter().map(|(_, r)| r.tot_bytes).sum(),
            unique_attackers: flows
                .iter()
                .map(|(_, r)| r.src_addr.as_str())
                .collect::<std::collections::HashSet<_>>()
                .len(),
        })
        .collect();
    buckets.sort_by(|a, b| a.hour.cmp(&b.hour));

    AttackTimeline::Buckets(buckets)
}

fn communication_patterns(dataset: &Dataset) -> CommunicationPatterns {
    let mut pairs = Counter::new();
    let mut matrix: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for record in dataset.records() {
        pairs.add(format!("{}->{}", record.src_addr, record.dst_addr));
        *matrix
            .entry(record.label_category.to_string())
            .or_default()
            .entry(record.proto_category.to_string())
            .or_insert(0) += 1;
    }

    CommunicationPatterns {
        most_active_pairs: pairs.top_n(TOP_PAIRS),
        communication_matrix: matrix,
    }
}

fn payload_analysis(dataset: &Dataset) -> PayloadAnalysis {
    let by_label = group_by(dataset.records(), |r| r.label_category);

    let mut avg_payload = Vec::new();
    let mut distributions = BTreeMap::new();
    let mut packet_sizes = Vec::new();
    for (label, flows) in by_label {
        let bytes: Vec<f64> = flows.iter().map(|r| r.tot_bytes as f64).collect();
        let sizes: Vec<f64> = flows.iter().map(|r| r.pkt_size).collect();
        avg_payload.push(SumEntry {
            key: label.to_string(),
            total: mean(&bytes),
        });
        distributions.insert(label.to_string(), describe(&bytes));
        packet_sizes.push(SumEntry {
            key: label.to_string(),
            total: mean(&sizes),
        });
    }

    PayloadAnalysis {
        avg_payload_by_label: nlargest(avg_payload, usize::MAX),
        payload_size_distribution: distributions,
        packet_size_patterns: packet_sizes,
    }
}
