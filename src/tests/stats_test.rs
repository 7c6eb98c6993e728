#[cfg(test)]
mod tests {
    use crate::analysis::stats::{
        describe, group_by, mean, nlargest, quantile, standardize, std_pop, std_sample, Counter,
        SumEntry,
    };

    #[test]
    fn mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(std_pop(&values), 2.0);
        assert!(std_sample(&values) > std_pop(&values));

        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_pop(&[]), 0.0);
        assert_eq!(std_sample(&[3.0]), 0.0);
    }

    #[test]
    fn quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 0.5), 2.5);
        assert_eq!(quantile(&values, 1.0), 4.0);
        assert_eq!(quantile(&[10.0], 0.95), 10.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn counter_ranking_is_stable_on_ties() {
        let mut counter = Counter::new();
        for key in ["a", "a", "b", "b", "c", "c", "c"] {
            counter.add(key.to_string());
        }
        let ranked = counter.sorted_desc();
        assert_eq!(ranked[0].key, "c");
        // a and b tie at 2; first-seen order wins.
        assert_eq!(ranked[1].key, "a");
        assert_eq!(ranked[2].key, "b");

        assert_eq!(counter.top_n(2).len(), 2);
    }

    #[test]
    fn mode_breaks_ties_by_first_seen() {
        let mut counter = Counter::new();
        for key in ["udp", "tcp", "tcp", "udp"] {
            counter.add(key.to_string());
        }
        assert_eq!(counter.mode(), Some(&"udp".to_string()));

        let empty: Counter<String> = Counter::new();
        assert_eq!(empty.mode(), None);
    }

    #[test]
    fn nlargest_keeps_input_order_on_ties() {
        let entries = vec![
            SumEntry { key: "x".into(), total: 5.0 },
            SumEntry { key: "y".into(), total: 9.0 },
            SumEntry { key: "z".into(), total: 5.0 },
        ];
        let top = nlargest(entries, 2);
        assert_eq!(top[0].key, "y");
        assert_eq!(top[1].key, "x");
    }

    #[test]
    fn describe_summary() {
        let summary = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.mean, 3.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.max, 5.0);

        assert_eq!(describe(&[]).count, 0);
    }

    #[test]
    fn group_by_preserves_first_seen_order() {
        let items = ["b", "a", "b", "c", "a"];
        let groups = group_by(&items, |item| item.to_string());
        let keys: Vec<&str> = groups.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn standardize_centers_and_scales() {
        let mut matrix = vec![vec![1.0, 7.0], vec![3.0, 7.0], vec![5.0, 7.0]];
        standardize(&mut matrix);

        let column: Vec<f64> = matrix.iter().map(|row| row[0]).collect();
        assert!(mean(&column).abs() < 1e-12);
        assert!((std_pop(&column) - 1.0).abs() < 1e-12);

        // Constant column maps to zeros, not NaN.
        assert!(matrix.iter().all(|row| row[1] == 0.0));
    }
}
