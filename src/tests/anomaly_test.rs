#[cfg(test)]
mod tests {
    use crate::analysis::anomaly::{detect_anomalies, DEFAULT_CONTAMINATION, DEFAULT_SEED};
    use crate::dataset::Dataset;
    use crate::tests::util::flow;

    /// 45 ordinary flows with mild variation plus 5 extreme ones at the end.
    fn dataset_with_extremes() -> Dataset {
        let mut records = Vec::new();
        for i in 0..45i64 {
            records.push(flow(|raw| {
                raw.duration = 1.0 + (i % 5) as f64 * 0.1;
                raw.tot_pkts = 10 + i % 3;
                raw.tot_bytes = 1000 + i * 4;
                raw.src_bytes = 500 + i * 2;
            }));
        }
        for i in 0..5i64 {
            records.push(flow(|raw| {
                raw.duration = 3600.0;
                raw.tot_pkts = 1_000_000;
                raw.tot_bytes = 500_000_000 + i;
                raw.src_bytes = 400_000_000;
                raw.dport = "65000".to_string();
            }));
        }
        Dataset::new(records)
    }

    #[test]
    fn flags_contamination_share_of_records() {
        let dataset = dataset_with_extremes();
        let outcome = detect_anomalies(&dataset, DEFAULT_CONTAMINATION, DEFAULT_SEED);

        assert_eq!(outcome.flags.len(), 50);
        assert_eq!(outcome.report.total_anomalies, 5);
        assert_eq!(outcome.report.anomaly_percentage, 10.0);

        // The extreme tail records carry the lowest scores.
        for flag in &outcome.flags[45..] {
            assert!(flag.is_outlier);
        }
        for flag in &outcome.flags[..45] {
            assert!(!flag.is_outlier);
        }
    }

    #[test]
    fn report_attributes_anomalies() {
        let dataset = dataset_with_extremes();
        let outcome = detect_anomalies(&dataset, DEFAULT_CONTAMINATION, DEFAULT_SEED);

        assert_eq!(outcome.report.top_anomalous_sources.len(), 1);
        assert_eq!(outcome.report.top_anomalous_sources[0].count, 5);
        assert_eq!(outcome.report.anomaly_by_label[0].key, "Normal");
        assert_eq!(outcome.report.anomaly_protocols[0].key, "TCP");
    }

    #[test]
    fn same_seed_reproduces_scores() {
        let dataset = dataset_with_extremes();
        let first = detect_anomalies(&dataset, DEFAULT_CONTAMINATION, DEFAULT_SEED);
        let second = detect_anomalies(&dataset, DEFAULT_CONTAMINATION, DEFAULT_SEED);
        assert_eq!(first.flags, second.flags);
    }

    #[test]
    fn empty_dataset_is_degenerate() {
        let outcome = detect_anomalies(&Dataset::new(Vec::new()), DEFAULT_CONTAMINATION, DEFAULT_SEED);
        assert!(outcome.flags.is_empty());
        assert_eq!(outcome.report.total_anomalies, 0);
        assert_eq!(outcome.report.anomaly_percentage, 0.0);
    }

    #[test]
    fn single_record_is_never_an_outlier() {
        let dataset = Dataset::new(vec![flow(|_| {})]);
        let outcome = detect_anomalies(&dataset, DEFAULT_CONTAMINATION, DEFAULT_SEED);
        assert_eq!(outcome.flags.len(), 1);
        assert!(!outcome.flags[0].is_outlier);
    }

    #[test]
    fn zero_contamination_flags_nothing() {
        let dataset = dataset_with_extremes();
        let outcome = detect_anomalies(&dataset, 0.0, DEFAULT_SEED);
        assert_eq!(outcome.report.total_anomalies, 0);
        assert!(outcome.flags.iter().all(|flag| !flag.is_outlier));
    }
}
