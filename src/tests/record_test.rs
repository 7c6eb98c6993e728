#[cfg(test)]
mod tests {
    use crate::record::{
        categorize_label, categorize_protocol, is_private_ip, parse_timestamp, resolve_port,
        LabelCategory, ProtoCategory,
    };
    use crate::tests::util::flow;

    #[test]
    fn resolve_port_numeric_and_symbolic() {
        assert_eq!(resolve_port("80"), 80);
        assert_eq!(resolve_port("http"), 80);
        assert_eq!(resolve_port("HTTPS"), 443);
        assert_eq!(resolve_port("ssh"), 22);
        assert_eq!(resolve_port("unknown"), 0);
        assert_eq!(resolve_port("*"), 0);
    }

    #[test]
    fn categorize_label_priority_order() {
        assert_eq!(categorize_label("Normal"), LabelCategory::Normal);
        assert_eq!(categorize_label("flow=From-Botnet-V42"), LabelCategory::Botnet);
        assert_eq!(categorize_label("C&C"), LabelCategory::CAndC);
        assert_eq!(categorize_label("Background"), LabelCategory::Background);
        assert_eq!(categorize_label("Unknown"), LabelCategory::Unknown);
        assert_eq!(categorize_label("SomeOtherLabel"), LabelCategory::Other);

        // Botnet wins even when the label also contains "normal".
        assert_eq!(categorize_label("botnet-masquerading-as-normal"), LabelCategory::Botnet);
        // Case-insensitive substring match.
        assert_eq!(categorize_label("FLOW=BOTNET-TCP"), LabelCategory::Botnet);
    }

    #[test]
    fn private_address_classification() {
        assert!(is_private_ip("192.168.1.1"));
        assert!(is_private_ip("10.0.0.1"));
        assert!(is_private_ip("172.16.0.1"));
        assert!(!is_private_ip("172.32.0.1"));
        assert!(!is_private_ip("8.8.8.8"));
        assert!(!is_private_ip("147.32.84.165"));
        assert!(!is_private_ip("invalid_ip"));
        assert!(!is_private_ip(""));
    }

    #[test]
    fn protocol_categorization() {
        assert_eq!(categorize_protocol("tcp"), ProtoCategory::Tcp);
        assert_eq!(categorize_protocol("UDP"), ProtoCategory::Udp);
        assert_eq!(categorize_protocol("icmp"), ProtoCategory::Icmp);
        assert_eq!(categorize_protocol("arp"), ProtoCategory::Other);
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2011/08/10 09:46:53.047277").is_some());
        assert!(parse_timestamp("2011-08-10 09:46:53").is_some());
        assert!(parse_timestamp("2011-08-10T09:46:53.047277").is_some());
        assert!(parse_timestamp("not a timestamp").is_none());
    }

    #[test]
    fn enrichment_derived_fields() {
        let record = flow(|raw| {
            raw.tot_pkts = 4;
            raw.tot_bytes = 120;
            raw.src_bytes = 80;
        });
        assert_eq!(record.dst_bytes, 40);
        assert_eq!(record.pkt_size, 30.0);
        assert_eq!(record.src_port, 1024);
        assert_eq!(record.dst_port, 80);
        assert!(!record.src_ip_private);
        assert!(!record.dst_ip_private);
    }

    #[test]
    fn packet_size_with_zero_packets() {
        let record = flow(|raw| {
            raw.tot_pkts = 0;
            raw.tot_bytes = 120;
        });
        // Divisor clamps to one instead of dividing by zero.
        assert_eq!(record.pkt_size, 120.0);
    }

    #[test]
    fn negative_destination_bytes_pass_through() {
        let record = flow(|raw| {
            raw.tot_bytes = 100;
            raw.src_bytes = 150;
        });
        assert_eq!(record.dst_bytes, -50);
    }

    #[test]
    fn unparsable_timestamp_keeps_record() {
        let record = flow(|raw| {
            raw.start_time = "garbage".to_string();
        });
        assert!(record.start_time.is_none());
        assert_eq!(record.tot_bytes, 1000);
    }
}
