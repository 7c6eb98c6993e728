#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::dataset::Dataset;
    use crate::output::{load_processed, save_processed, write_json_report, ReadError};
    use crate::tests::util::{flow, timestamp};

    fn temp_path(name: &str, extension: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "ctu13_{name}_{}.{extension}",
            std::process::id()
        ))
    }

    #[test]
    fn processed_csv_round_trip() {
        let original = Dataset::new(vec![
            flow(|raw| {
                raw.start_time = timestamp(0);
                raw.tot_bytes = 1234;
            }),
            flow(|raw| {
                raw.start_time = "garbage".to_string();
                raw.protocol = "udp".to_string();
                raw.src_addr = "192.168.1.9".to_string();
                raw.label = "flow=From-Botnet-V42".to_string();
            }),
        ]);

        let path = temp_path("roundtrip", "csv");
        save_processed(&original, &path).expect("save processed");
        let reloaded = load_processed(&path).expect("load processed");
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.records(), original.records());
        // Enriched fields survive the trip, including the absent timestamp.
        assert!(reloaded.records()[1].start_time.is_none());
        assert!(reloaded.records()[1].src_ip_private);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = load_processed(std::path::Path::new("/nonexistent/flows.csv"));
        assert!(matches!(result, Err(ReadError::Io(_))));
    }

    #[test]
    fn load_malformed_rows_is_csv_error() {
        let path = temp_path("malformed", "csv");
        std::fs::write(&path, "StartTime,Dur,Proto\nnot,really,a_flow\n").expect("write fixture");
        let result = load_processed(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ReadError::Csv(_))));
    }

    #[test]
    fn json_report_is_written_pretty() {
        let dataset = Dataset::new(vec![flow(|raw| raw.start_time = timestamp(0))]);
        let summary = dataset.summary();

        let path = temp_path("report", "json");
        write_json_report(&summary, &path).expect("write report");
        let text = std::fs::read_to_string(&path).expect("read report");
        std::fs::remove_file(&path).ok();

        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["total_flows"], 1);
        assert!(text.contains('\n'));
    }
}
