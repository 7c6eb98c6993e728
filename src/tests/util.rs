use chrono::{TimeZone, Utc};

use crate::record::{FlowRecord, RawFlow};

/// A plausible raw TCP flow to customize per test.
pub fn base_raw() -> RawFlow {
    RawFlow {
        start_time: "2011/08/10 09:46:53.047277".to_string(),
        duration: 1.0,
        protocol: "tcp".to_string(),
        src_addr: "147.32.84.165".to_string(),
        sport: "1024".to_string(),
        direction: "<->".to_string(),
        dst_addr: "8.8.8.8".to_string(),
        dport: "80".to_string(),
        state: "SF".to_string(),
        s_tos: "0".to_string(),
        d_tos: "0".to_string(),
        tot_pkts: 10,
        tot_bytes: 1000,
        src_bytes: 500,
        label: "Normal".to_string(),
    }
}

/// Builds an enriched record from the base flow with per-test tweaks.
pub fn flow<F: FnOnce(&mut RawFlow)>(customize: F) -> FlowRecord {
    let mut raw = base_raw();
    customize(&mut raw);
    FlowRecord::enrich(raw)
}

/// Capture-day timestamp text at an offset in seconds from 09:00:00 UTC.
pub fn timestamp(offset_secs: i64) -> String {
    let base = Utc
        .with_ymd_and_hms(2011, 8, 10, 9, 0, 0)
        .single()
        .expect("valid fixed timestamp");
    (base + chrono::Duration::seconds(offset_secs))
        .format("%Y/%m/%d %H:%M:%S")
        .to_string()
}
