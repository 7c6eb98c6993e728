use std::collections::{BTreeMap, HashSet};

use chrono::Timelike;
use log::info;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::LabelCategory;

use super::stats::{
    describe, group_by, mean, nlargest, quantile, CountEntry, Counter, DistributionSummary,
    SumEntry,
};

/// Destination ports considered ordinary; everything else ranks as unusual.
const WELL_KNOWN_PORTS: [u16; 10] = [80, 443, 22, 21, 25, 53, 110, 143, 993, 995];

const TOP_PORTS: usize = 10;
const TOP_TALKERS: usize = 10;
const PEAK_HOURS: usize = 3;
/// Flows above this duration/byte quantile count as long/large.
const TAIL_QUANTILE: f64 = 0.95;

#[derive(Clone, Debug, Serialize)]
pub struct TemporalPatterns {
    pub hourly_distribution: BTreeMap<u32, u64>,
    pub daily_distribution: BTreeMap<u32, u64>,
    pub peak_hours: Vec<SumEntry>,
    pub traffic_by_label_hour: BTreeMap<String, BTreeMap<u32, u64>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProtocolAnalysis {
    pub protocol_distribution: Vec<CountEntry>,
    pub bytes_by_protocol: Vec<SumEntry>,
    pub malicious_protocols: Vec<CountEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PortAnalysis {
    pub top_src_ports: Vec<CountEntry>,
    pub top_dst_ports: Vec<CountEntry>,
    pub malicious_dst_ports: Vec<CountEntry>,
    pub unusual_ports: Vec<CountEntry>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PrivateVsPublic {
    pub src_private: u64,
    pub dst_private: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct IpAnalysis {
    pub unique_src_ips: usize,
    pub unique_dst_ips: usize,
    pub top_talkers: Vec<SumEntry>,
    pub top_destinations: Vec<SumEntry>,
    pub private_vs_public: PrivateVsPublic,
}

#[derive(Clone, Debug, Serialize)]
pub struct FlowCharacteristics {
    pub avg_flow_duration: f64,
    pub avg_packet_size: f64,
    pub flow_size_distribution: DistributionSummary,
    pub long_flows: usize,
    pub large_flows: usize,
}

/// The five descriptive views over an enriched dataset.
#[derive(Clone, Debug, Serialize)]
pub struct TrafficPatterns {
    pub temporal_patterns: TemporalPatterns,
    pub protocol_analysis: ProtocolAnalysis,
    pub port_analysis: PortAnalysis,
    pub ip_analysis: IpAnalysis,
    pub flow_characteristics: FlowCharacteristics,
}

pub fn analyze_traffic_patterns(dataset: &Dataset) -> TrafficPatterns {
    info!("Analyzing traffic patterns...");

    TrafficPatterns {
        temporal_patterns: temporal_patterns(dataset),
        protocol_analysis: protocol_analysis(dataset),
        port_analysis: port_analysis(dataset),
        ip_analysis: ip_analysis(dataset),
        flow_characteristics: flow_characteristics(dataset),
    }
}

/// Records without a parsed timestamp drop out of the temporal view.
fn temporal_patterns(dataset: &Dataset) -> TemporalPatterns {
    let mut hourly: BTreeMap<u32, u64> = BTreeMap::new();
    let mut daily: BTreeMap<u32, u64> = BTreeMap::new();
    let mut bytes_per_hour: BTreeMap<u32, i64> = BTreeMap::new();
    let mut by_label_hour: BTreeMap<String, BTreeMap<u32, u64>> = BTreeMap::new();

    for record in dataset.records() {
        let Some(start) = record.start_time else {
            continue;
        };
        let hour = start.hour();
        let day = chrono::Datelike::weekday(&start).num_days_from_monday();

        *hourly.entry(hour).or_insert(0) += 1;
        *daily.entry(day).or_insert(0) += 1;
        *bytes_per_hour.entry(hour).or_insert(0) += record.tot_bytes;
        *by_label_hour
            .entry(record.label_category.to_string())
            .or_default()
            .entry(hour)
            .or_insert(0) += 1;
    }

    let peak_hours = nlargest(
        bytes_per_hour
            .iter()
            .map(|(hour, bytes)| SumEntry {
                key: hour.to_string(),
                total: *bytes as f64,
            })
            .collect(),
        PEAK_HOURS,
    );

    TemporalPatterns {
        hourly_distribution: hourly,
        daily_distribution: daily,
        peak_hours,
        traffic_by_label_hour: by_label_hour,
    }
}

fn protocol_analysis(dataset: &Dataset) -> ProtocolAnalysis {
    let mut distribution = Counter::new();
    let mut malicious = Counter::new();
    for record in dataset.records() {
        distribution.add(record.proto_category);
        if record.label_category == LabelCategory::Botnet {
            malicious.add(record.proto_category);
        }
    }

    let bytes_by_protocol = group_by(dataset.records(), |r| r.proto_category)
        .into_iter()
        .map(|(proto, flows)| SumEntry {
            key: proto.to_string(),
            total: flows.iter().map(|r| r.tot_bytes).sum::<i64>() as f64,
        })
        .collect();

    ProtocolAnalysis {
        protocol_distribution: distribution.sorted_desc(),
        bytes_by_protocol,
        malicious_protocols: malicious.sorted_desc(),
    }
}

fn port_analysis(dataset: &Dataset) -> PortAnalysis {
    let mut src_ports = Counter::new();
    let mut dst_ports = Counter::new();
    let mut malicious_dst = Counter::new();
    let mut unusual = Counter::new();

    for record in dataset.records() {
        src_ports.add(record.src_port);
        dst_ports.add(record.dst_port);
        if record.label_category == LabelCategory::Botnet {
            malicious_dst.add(record.dst_port);
        }
        if !WELL_KNOWN_PORTS.contains(&record.dst_port) {
            unusual.add(record.dst_port);
        }
    }

    PortAnalysis {
        top_src_ports: src_ports.top_n(TOP_PORTS),
        top_dst_ports: dst_ports.top_n(TOP_PORTS),
        malicious_dst_ports: malicious_dst.top_n(TOP_PORTS),
        unusual_ports: unusual.top_n(TOP_PORTS),
    }
}

fn ip_analysis(dataset: &Dataset) -> IpAnalysis {
    let src_ips: HashSet<&str> = dataset.records().iter().map(|r| r.src_addr.as_str()).collect();
    let dst_ips: HashSet<&str> = dataset.records().iter().map(|r| r.dst_addr.as_str()).collect();

    let top_talkers = nlargest(
        group_by(dataset.records(), |r| r.src_addr.clone())
            .into_iter()
            .map(|(addr, flows)| SumEntry {
                key: addr,
                total: flows.iter().map(|r| r.tot_bytes).sum::<i64>() as f64,
            })
            .collect(),
        TOP_TALKERS,
    );
    let top_destinations = nlargest(
        group_by(dataset.records(), |r| r.dst_addr.clone())
            .into_iter()
            .map(|(addr, flows)| SumEntry {
                key: addr,
                total: flows.iter().map(|r| r.tot_bytes).sum::<i64>() as f64,
            })
            .collect(),
        TOP_TALKERS,
    );

    IpAnalysis {
        unique_src_ips: src_ips.len(),
        unique_dst_ips: dst_ips.len(),
        top_talkers,
        top_destinations,
        private_vs_public: PrivateVsPublic {
            src_private: dataset.records().iter().filter(|r| r.src_ip_private).count() as u64,
            dst_private: dataset.records().iter().filter(|r| r.dst_ip_private).count() as u64,
        },
    }
}

fn flow_characteristics(dataset: &Dataset) -> FlowCharacteristics {
    let durations: Vec<f64> = dataset.records().iter().map(|r| r.duration).collect();
    let sizes: Vec<f64> = dataset.records().iter().map(|r| r.tot_bytes as f64).collect();
    let pkt_sizes: Vec<f64> = dataset.records().iter().map(|r| r.pkt_size).collect();

    let long_threshold = quantile(&durations, TAIL_QUANTILE);
    let large_threshold = quantile(&sizes, TAIL_QUANTILE);

    FlowCharacteristics {
        avg_flow_duration: mean(&durations),
        avg_packet_size: mean(&pkt_sizes),
        flow_size_distribution: describe(&sizes),
        long_flows: durations.iter().filter(|d| **d > long_threshold).count(),
        large_flows: sizes.iter().filter(|s| **s > large_threshold).count(),
    }
}
