use std::collections::HashSet;

use log::info;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::record::FlowRecord;

use super::stats::{group_by, mean, quantile, std_pop};

// Empirically chosen heuristics carried over from field use of this dataset;
// do not re-tune without domain validation.
const C2_MAX_FLOW_BYTES: i64 = 1000;
const C2_MIN_FREQUENCY: usize = 10;
const C2_MAX_AVG_BYTES: f64 = 500.0;
const BEACON_MIN_COMMUNICATIONS: usize = 5;
const BEACON_JITTER_RATIO: f64 = 0.3;
const SCAN_MIN_UNIQUE_PORTS: usize = 10;
const SCAN_MIN_CONNECTIONS: usize = 20;
const EXFIL_QUANTILE: f64 = 0.95;
const EXFIL_TOP_N: usize = 10;
const DNS_PORT: u16 = 53;
const DNS_SUSPICIOUS_AVG_BYTES: f64 = 100.0;
const DNS_SUSPICIOUS_QUERY_COUNT: usize = 1000;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct C2Suspect {
    pub dst_addr: String,
    pub frequency: usize,
    pub avg_bytes: f64,
    pub avg_duration: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct C2Report {
    pub potential_c2_servers: Vec<C2Suspect>,
    pub total_suspects: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeaconingPair {
    pub src: String,
    pub dst: String,
    pub avg_interval_secs: f64,
    pub communications: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeaconingReport {
    pub beaconing_pairs: Vec<BeaconingPair>,
    pub total_beaconing: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortScanActivity {
    pub src: String,
    pub dst: String,
    pub unique_ports: usize,
    pub total_connections: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortScanReport {
    pub port_scan_activities: Vec<PortScanActivity>,
    pub total_scanners: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExfiltrationCandidate {
    pub src_addr: String,
    pub total_src_bytes: i64,
    pub unique_destinations: usize,
    pub sessions: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExfiltrationReport {
    pub potential_exfiltration: Vec<ExfiltrationCandidate>,
    pub total_large_transfers: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DnsClient {
    pub src_addr: String,
    pub total_bytes: i64,
    pub avg_bytes: f64,
    pub query_count: usize,
}

/// Absence of DNS traffic is not the same as absence of tunneling evidence,
/// so a dataset with no port-53 flows yields the explicit NotApplicable
/// variant instead of an empty client list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DnsTunnelingReport {
    NotApplicable { dns_traffic_present: bool },
    Findings {
        suspicious_dns_clients: Vec<DnsClient>,
        total_suspicious: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BotnetIndicators {
    pub c2_communication: C2Report,
    pub periodic_beaconing: BeaconingReport,
    pub port_scanning: PortScanReport,
    pub data_exfiltration: ExfiltrationReport,
    pub dns_tunneling: DnsTunnelingReport,
}

/// Runs the five independent behavior detectors. None of them mutates the
/// dataset; each is a pure function over the enriched records.
pub fn detect_botnet_behavior(dataset: &Dataset) -> BotnetIndicators {
    info!("Analyzing botnet behavior patterns...");

    BotnetIndicators {
        c2_communication: detect_c2_communication(dataset),
        periodic_beaconing: detect_periodic_beaconing(dataset),
        port_scanning: detect_port_scanning(dataset),
        data_exfiltration: detect_data_exfiltration(dataset),
        dns_tunneling: detect_dns_tunneling(dataset),
    }
}

/// Regular small communications to external destinations: groups by
/// non-private destination over sub-1000-byte flows, keeps destinations seen
/// more than 10 times with a mean below 500 bytes.
pub fn detect_c2_communication(dataset: &Dataset) -> C2Report {
    let external_small: Vec<&FlowRecord> = dataset
        .records()
        .iter()
        .filter(|r| !r.dst_ip_private && r.tot_bytes < C2_MAX_FLOW_BYTES)
        .collect();

    let mut suspects = Vec::new();
    for (dst_addr, flows) in group_by(&external_small, |r| r.dst_addr.clone()) {
        let bytes: Vec<f64> = flows.iter().map(|r| r.tot_bytes as f64).collect();
        let durations: Vec<f64> = flows.iter().map(|r| r.duration).collect();
        let avg_bytes = mean(&bytes);

        if flows.len() > C2_MIN_FREQUENCY && avg_bytes < C2_MAX_AVG_BYTES {
            suspects.push(C2Suspect {
                dst_addr,
                frequency: flows.len(),
                avg_bytes,
                avg_duration: mean(&durations),
            });
        }
    }

    C2Report {
        total_suspects: suspects.len(),
        potential_c2_servers: suspects,
    }
}

/// Low-jitter periodic check-ins: a (src, dst) pair beacons when the standard
/// deviation of its inter-arrival intervals is below 30% of the mean
/// interval. Records without a parsed timestamp are skipped.
pub fn detect_periodic_beaconing(dataset: &Dataset) -> BeaconingReport {
    let mut beaconing_pairs = Vec::new();

    for ((src, dst), flows) in group_by(dataset.records(), |r| {
        (r.src_addr.clone(), r.dst_addr.clone())
    }) {
        let mut timestamps: Vec<i64> = flows
            .iter()
            .filter_map(|r| r.start_time.map(|t| t.timestamp_micros()))
            .collect();
        if timestamps.len() <= BEACON_MIN_COMMUNICATIONS {
            continue;
        }
        timestamps.sort_unstable();

        let intervals: Vec<f64> = timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) as f64 / 1_000_000.0)
            .collect();
        if intervals.len() < 2 {
            continue;
        }

        let interval_mean = mean(&intervals);
        let interval_std = std_pop(&intervals);
        if interval_std < interval_mean * BEACON_JITTER_RATIO {
            beaconing_pairs.push(BeaconingPair {
                src,
                dst,
                avg_interval_secs: interval_mean,
                communications: timestamps.len(),
            });
        }
    }

    BeaconingReport {
        total_beaconing: beaconing_pairs.len(),
        beaconing_pairs,
    }
}

pub fn detect_port_scanning(dataset: &Dataset) -> PortScanReport {
    let mut activities = Vec::new();

    for ((src, dst), flows) in group_by(dataset.records(), |r| {
        (r.src_addr.clone(), r.dst_addr.clone())
    }) {
        let unique_ports: HashSet<u16> = flows.iter().map(|r| r.dst_port).collect();
        if unique_ports.len() > SCAN_MIN_UNIQUE_PORTS && flows.len() > SCAN_MIN_CONNECTIONS {
            activities.push(PortScanActivity {
                src,
                dst,
                unique_ports: unique_ports.len(),
                total_connections: flows.len(),
            });
        }
    }

    PortScanReport {
        total_scanners: activities.len(),
        port_scan_activities: activities,
    }
}

/// Large outbound transfers: source-byte counts above the 95th percentile of
/// traffic toward non-private destinations, grouped by source and ranked by
/// total bytes sent.
pub fn detect_data_exfiltration(dataset: &Dataset) -> ExfiltrationReport {
    let outbound: Vec<&FlowRecord> = dataset
        .records()
        .iter()
        .filter(|r| !r.dst_ip_private)
        .collect();

    let src_bytes: Vec<f64> = outbound.iter().map(|r| r.src_bytes as f64).collect();
    let threshold = quantile(&src_bytes, EXFIL_QUANTILE);

    let large_transfers: Vec<&FlowRecord> = outbound
        .iter()
        .filter(|r| r.src_bytes as f64 > threshold)
        .copied()
        .collect();

    let mut candidates: Vec<ExfiltrationCandidate> =
        group_by(&large_transfers, |r| r.src_addr.clone())
            .into_iter()
            .map(|(src_addr, flows)| ExfiltrationCandidate {
                src_addr,
                total_src_bytes: flows.iter().map(|r| r.src_bytes).sum(),
                unique_destinations: flows
                    .iter()
                    .map(|r| r.dst_addr.as_str())
                    .collect::<HashSet<_>>()
                    .len(),
                sessions: flows.len(),
            })
            .collect();

    candidates.sort_by(|a, b| b.total_src_bytes.cmp(&a.total_src_bytes));
    candidates.truncate(EXFIL_TOP_N);

    ExfiltrationReport {
        potential_exfiltration: candidates,
        total_large_transfers: large_transfers.len(),
    }
}

pub fn detect_dns_tunneling(dataset: &Dataset) -> DnsTunnelingReport {
    let dns_traffic: Vec<&FlowRecord> = dataset
        .records()
        .iter()
        .filter(|r| r.dst_port == DNS_PORT)
        .collect();

    if dns_traffic.is_empty() {
        return DnsTunnelingReport::NotApplicable {
            dns_traffic_present: false,
        };
    }

    let suspicious: Vec<DnsClient> = group_by(&dns_traffic, |r| r.src_addr.clone())
        .into_iter()
        .filter_map(|(src_addr, flows)| {
            let bytes: Vec<f64> = flows.iter().map(|r| r.tot_bytes as f64).collect();
            let avg_bytes = mean(&bytes);
            let query_count = flows.len();

            if avg_bytes > DNS_SUSPICIOUS_AVG_BYTES || query_count > DNS_SUSPICIOUS_QUERY_COUNT {
                Some(DnsClient {
                    src_addr,
                    total_bytes: flows.iter().map(|r| r.tot_bytes).sum(),
                    avg_bytes,
                    query_count,
                })
            } else {
                None
            }
        })
        .collect();

    DnsTunnelingReport::Findings {
        total_suspicious: suspicious.len(),
        suspicious_dns_clients: suspicious,
    }
}
