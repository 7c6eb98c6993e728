use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized ground-truth label category for a flow.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum LabelCategory {
    Normal,
    Botnet,
    #[serde(rename = "C&C")]
    CAndC,
    Background,
    Other,
    Unknown,
}

impl fmt::Display for LabelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelCategory::Normal => write!(f, "Normal"),
            LabelCategory::Botnet => write!(f, "Botnet"),
            LabelCategory::CAndC => write!(f, "C&C"),
            LabelCategory::Background => write!(f, "Background"),
            LabelCategory::Other => write!(f, "Other"),
            LabelCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Coarse protocol category derived from the textual protocol field.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ProtoCategory {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
    #[serde(rename = "ICMP")]
    Icmp,
    Other,
}

impl fmt::Display for ProtoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtoCategory::Tcp => write!(f, "TCP"),
            ProtoCategory::Udp => write!(f, "UDP"),
            ProtoCategory::Icmp => write!(f, "ICMP"),
            ProtoCategory::Other => write!(f, "Other"),
        }
    }
}

/// The raw positional fields of one binetflow line, before enrichment.
#[derive(Clone, Debug)]
pub struct RawFlow {
    pub start_time: String,
    pub duration: f64,
    pub protocol: String,
    pub src_addr: String,
    pub sport: String,
    pub direction: String,
    pub dst_addr: String,
    pub dport: String,
    pub state: String,
    pub s_tos: String,
    pub d_tos: String,
    pub tot_pkts: i64,
    pub tot_bytes: i64,
    pub src_bytes: i64,
    pub label: String,
}

/// A single enriched NetFlow record. Immutable once built from a [`RawFlow`];
/// the serde renames match the processed-CSV column set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "StartTime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "Dur")]
    pub duration: f64,
    #[serde(rename = "Proto")]
    pub protocol: String,
    #[serde(rename = "SrcAddr")]
    pub src_addr: String,
    #[serde(rename = "Sport")]
    pub sport: String,
    #[serde(rename = "Dir")]
    pub direction: String,
    #[serde(rename = "DstAddr")]
    pub dst_addr: String,
    #[serde(rename = "Dport")]
    pub dport: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "sTos")]
    pub s_tos: String,
    #[serde(rename = "dTos")]
    pub d_tos: String,
    #[serde(rename = "TotPkts")]
    pub tot_pkts: i64,
    #[serde(rename = "TotBytes")]
    pub tot_bytes: i64,
    #[serde(rename = "SrcBytes")]
    pub src_bytes: i64,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "SrcPort")]
    pub src_port: u16,
    #[serde(rename = "DstPort")]
    pub dst_port: u16,
    /// May be negative when source bytes exceed total bytes; the dataset
    /// contains such inconsistencies and they are passed through unclamped.
    #[serde(rename = "DstBytes")]
    pub dst_bytes: i64,
    #[serde(rename = "PktSize")]
    pub pkt_size: f64,
    #[serde(rename = "LabelCategory")]
    pub label_category: LabelCategory,
    #[serde(rename = "SrcIP_Private")]
    pub src_ip_private: bool,
    #[serde(rename = "DstIP_Private")]
    pub dst_ip_private: bool,
    #[serde(rename = "ProtoCategory")]
    pub proto_category: ProtoCategory,
}

impl FlowRecord {
    /// Builds the enriched record from its raw fields: timestamp parse,
    /// port resolution, derived byte/size features and categorization.
    pub fn enrich(raw: RawFlow) -> Self {
        let start_time = parse_timestamp(&raw.start_time);
        let src_port = resolve_port(&raw.sport);
        let dst_port = resolve_port(&raw.dport);
        let dst_bytes = raw.tot_bytes - raw.src_bytes;
        let pkt_size = raw.tot_bytes as f64 / raw.tot_pkts.max(1) as f64;
        let label_category = categorize_label(&raw.label);
        let proto_category = categorize_protocol(&raw.protocol);
        let src_ip_private = is_private_ip(&raw.src_addr);
        let dst_ip_private = is_private_ip(&raw.dst_addr);

        FlowRecord {
            start_time,
            duration: raw.duration,
            protocol: raw.protocol,
            src_addr: raw.src_addr,
            sport: raw.sport,
            direction: raw.direction,
            dst_addr: raw.dst_addr,
            dport: raw.dport,
            state: raw.state,
            s_tos: raw.s_tos,
            d_tos: raw.d_tos,
            tot_pkts: raw.tot_pkts,
            tot_bytes: raw.tot_bytes,
            src_bytes: raw.src_bytes,
            label: raw.label,
            src_port,
            dst_port,
            dst_bytes,
            pkt_size,
            label_category,
            src_ip_private,
            dst_ip_private,
            proto_category,
        }
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parses a free-form capture timestamp. The dataset carries no timezone, so
/// parsed values are taken as UTC. Unparsable text yields None and the record
/// is kept.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// Resolves a port field that may hold a number or a symbolic service name.
/// Unrecognized tokens (including the `*` wildcard) map to 0.
pub fn resolve_port(port: &str) -> u16 {
    if let Ok(numeric) = port.parse::<u16>() {
        return numeric;
    }

    match port.to_lowercase().as_str() {
        "http" => 80,
        "https" => 443,
        "ftp" => 21,
        "ssh" => 22,
        "telnet" => 23,
        "smtp" => 25,
        "dns" => 53,
        "pop3" => 110,
        "imap" => 143,
        "snmp" => 161,
        _ => 0,
    }
}

/// Case-insensitive substring categorization, checked in priority order so a
/// label containing "botnet" wins even when it also contains "normal".
pub fn categorize_label(label: &str) -> LabelCategory {
    if label == "Unknown" {
        return LabelCategory::Unknown;
    }

    let lower = label.to_lowercase();
    if lower.contains("botnet") {
        LabelCategory::Botnet
    } else if lower.contains("c&c") || lower.contains("cc") {
        LabelCategory::CAndC
    } else if lower.contains("normal") {
        LabelCategory::Normal
    } else if lower.contains("background") {
        LabelCategory::Background
    } else {
        LabelCategory::Other
    }
}

pub fn categorize_protocol(protocol: &str) -> ProtoCategory {
    match protocol.to_lowercase().as_str() {
        "tcp" => ProtoCategory::Tcp,
        "udp" => ProtoCategory::Udp,
        "icmp" => ProtoCategory::Icmp,
        _ => ProtoCategory::Other,
    }
}

/// RFC1918 test on the textual address. Malformed addresses are treated as
/// non-private rather than an error.
pub fn is_private_ip(addr: &str) -> bool {
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private(),
        Ok(IpAddr::V6(_)) => false,
        Err(_) => false,
    }
}
