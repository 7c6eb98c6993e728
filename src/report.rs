//! Plain-text rendering of computed analysis results. Presentation only;
//! nothing here recomputes or mutates analysis output.

use std::fmt::Write;

use crate::analysis::anomaly::AnomalyReport;
use crate::analysis::botnet::{BotnetIndicators, DnsTunnelingReport};
use crate::analysis::cluster::ClusteringOutcome;
use crate::dataset::DatasetSummary;

pub fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.2} seconds")
    } else if seconds < 3600.0 {
        format!("{:.2} minutes", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.2} hours", seconds / 3600.0)
    } else {
        format!("{:.2} days", seconds / 86400.0)
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
}

pub fn render_summary(summary: &DatasetSummary) -> String {
    let mut out = String::new();
    section(&mut out, "Dataset Summary");
    let _ = writeln!(out, "Total flows:      {}", summary.total_flows);
    if let (Some(start), Some(end)) = (summary.time_range.start, summary.time_range.end) {
        let _ = writeln!(out, "Time range:       {start} .. {end}");
        let _ = writeln!(
            out,
            "Capture duration: {}",
            format_duration(summary.time_range.duration_hours * 3600.0)
        );
    }
    let _ = writeln!(
        out,
        "Total volume:     {} in {} packets",
        format_bytes(summary.total_bytes as f64),
        summary.total_packets
    );
    let _ = writeln!(out, "Unique src IPs:   {}", summary.unique_src_ips);
    let _ = writeln!(out, "Unique dst IPs:   {}", summary.unique_dst_ips);

    let _ = writeln!(out, "\nLabel distribution:");
    for entry in &summary.label_distribution {
        let _ = writeln!(out, "  {:<12} {}", entry.key, entry.count);
    }
    let _ = writeln!(out, "\nProtocol distribution:");
    for entry in &summary.protocol_distribution {
        let _ = writeln!(out, "  {:<12} {}", entry.key, entry.count);
    }
    out
}

pub fn render_anomalies(report: &AnomalyReport) -> String {
    let mut out = String::new();
    section(&mut out, "Anomaly Detection");
    let _ = writeln!(
        out,
        "Flagged {} flows ({:.2}%)",
        report.total_anomalies, report.anomaly_percentage
    );

    let _ = writeln!(out, "\nAnomalies by label:");
    for entry in &report.anomaly_by_label {
        let _ = writeln!(out, "  {:<12} {}", entry.key, entry.count);
    }
    let _ = writeln!(out, "\nTop anomalous sources:");
    for entry in &report.top_anomalous_sources {
        let _ = writeln!(out, "  {:<18} {}", entry.key, entry.count);
    }
    let _ = writeln!(out, "\nTop anomalous destinations:");
    for entry in &report.top_anomalous_destinations {
        let _ = writeln!(out, "  {:<18} {}", entry.key, entry.count);
    }
    out
}

pub fn render_botnet(indicators: &BotnetIndicators) -> String {
    let mut out = String::new();
    section(&mut out, "Botnet Behavior Indicators");

    let _ = writeln!(
        out,
        "Potential C2 servers:   {}",
        indicators.c2_communication.total_suspects
    );
    for suspect in &indicators.c2_communication.potential_c2_servers {
        let _ = writeln!(
            out,
            "  {:<18} {} flows, avg {}",
            suspect.dst_addr,
            suspect.frequency,
            format_bytes(suspect.avg_bytes)
        );
    }

    let _ = writeln!(
        out,
        "Beaconing pairs:        {}",
        indicators.periodic_beaconing.total_beaconing
    );
    for pair in &indicators.periodic_beaconing.beaconing_pairs {
        let _ = writeln!(
            out,
            "  {} -> {} every {}",
            pair.src,
            pair.dst,
            format_duration(pair.avg_interval_secs)
        );
    }

    let _ = writeln!(
        out,
        "Port scanners:          {}",
        indicators.port_scanning.total_scanners
    );
    for scan in &indicators.port_scanning.port_scan_activities {
        let _ = writeln!(
            out,
            "  {} -> {} ({} ports, {} connections)",
            scan.src, scan.dst, scan.unique_ports, scan.total_connections
        );
    }

    let _ = writeln!(
        out,
        "Large outbound sources: {}",
        indicators.data_exfiltration.potential_exfiltration.len()
    );
    for candidate in &indicators.data_exfiltration.potential_exfiltration {
        let _ = writeln!(
            out,
            "  {:<18} {} across {} destinations",
            candidate.src_addr,
            format_bytes(candidate.total_src_bytes as f64),
            candidate.unique_destinations
        );
    }

    match &indicators.dns_tunneling {
        DnsTunnelingReport::NotApplicable { .. } => {
            let _ = writeln!(out, "DNS tunneling:          no DNS traffic observed");
        }
        DnsTunnelingReport::Findings {
            suspicious_dns_clients,
            total_suspicious,
        } => {
            let _ = writeln!(out, "Suspicious DNS clients: {total_suspicious}");
            for client in suspicious_dns_clients {
                let _ = writeln!(
                    out,
                    "  {:<18} {} queries, avg {}",
                    client.src_addr,
                    client.query_count,
                    format_bytes(client.avg_bytes)
                );
            }
        }
    }
    out
}

pub fn render_clusters(outcome: &ClusteringOutcome) -> String {
    let mut out = String::new();
    section(&mut out, "Behavioral Clusters");
    let noise = outcome
        .assignments
        .iter()
        .filter(|&&label| label == crate::analysis::cluster::NOISE)
        .count();
    let _ = writeln!(
        out,
        "{} clusters, {} noise flows",
        outcome.clusters.len(),
        noise
    );
    for cluster in &outcome.clusters {
        let _ = writeln!(
            out,
            "  cluster {}: {} flows, avg {} over {}, mostly {}",
            cluster.cluster_id,
            cluster.size,
            format_bytes(cluster.avg_bytes),
            format_duration(cluster.avg_duration),
            cluster.dominant_protocol
        );
    }
    out
}
