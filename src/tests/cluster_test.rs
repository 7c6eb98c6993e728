#[cfg(test)]
mod tests {
    use crate::analysis::cluster::{cluster_network_behavior, ClusterConfig, NOISE};
    use crate::dataset::Dataset;
    use crate::record::FlowRecord;
    use crate::tests::util::flow;

    #[test]
    fn dense_group_forms_one_cluster_and_outlier_is_noise() {
        let mut records: Vec<FlowRecord> = (0..20).map(|_| flow(|_| {})).collect();
        records.push(flow(|raw| {
            raw.duration = 5000.0;
            raw.tot_pkts = 1_000_000;
            raw.tot_bytes = 900_000_000;
            raw.src_bytes = 800_000_000;
        }));

        let outcome = cluster_network_behavior(&Dataset::new(records), ClusterConfig::default());

        assert_eq!(outcome.assignments.len(), 21);
        assert!(outcome.assignments[..20].iter().all(|&label| label == 0));
        assert_eq!(outcome.assignments[20], NOISE);

        assert_eq!(outcome.clusters.len(), 1);
        let cluster = &outcome.clusters[0];
        assert_eq!(cluster.cluster_id, 0);
        assert_eq!(cluster.size, 20);
        assert_eq!(cluster.avg_bytes, 1000.0);
        assert_eq!(cluster.avg_duration, 1.0);
        assert_eq!(cluster.dominant_protocol, "TCP");
        assert_eq!(cluster.label_distribution[0].key, "Normal");
        assert_eq!(cluster.label_distribution[0].count, 20);
    }

    #[test]
    fn distinct_profiles_form_distinct_clusters() {
        let mut records: Vec<FlowRecord> = (0..10).map(|_| flow(|_| {})).collect();
        records.extend((0..10).map(|_| {
            flow(|raw| {
                raw.protocol = "udp".to_string();
                raw.duration = 300.0;
                raw.tot_pkts = 10_000;
                raw.tot_bytes = 5_000_000;
                raw.src_bytes = 2_500_000;
            })
        }));

        let outcome = cluster_network_behavior(&Dataset::new(records), ClusterConfig::default());

        assert_eq!(outcome.clusters.len(), 2);
        assert!(outcome.assignments.iter().all(|&label| label != NOISE));
        assert_ne!(outcome.assignments[0], outcome.assignments[10]);
        assert_eq!(outcome.clusters[0].dominant_protocol, "TCP");
        assert_eq!(outcome.clusters[1].dominant_protocol, "UDP");
    }

    #[test]
    fn sparse_records_are_all_noise() {
        // Three widely separated records can never reach min_samples.
        let records = vec![
            flow(|_| {}),
            flow(|raw| raw.tot_bytes = 1_000_000),
            flow(|raw| raw.duration = 9999.0),
        ];

        let outcome = cluster_network_behavior(&Dataset::new(records), ClusterConfig::default());
        assert!(outcome.assignments.iter().all(|&label| label == NOISE));
        assert!(outcome.clusters.is_empty());
    }

    #[test]
    fn empty_dataset_yields_no_clusters() {
        let outcome =
            cluster_network_behavior(&Dataset::new(Vec::new()), ClusterConfig::default());
        assert!(outcome.assignments.is_empty());
        assert!(outcome.clusters.is_empty());
    }
}
