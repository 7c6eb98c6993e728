use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(author, version, about = "CTU-13 botnet dataset analysis tool")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download CTU-13 scenario capture files
    Download {
        /// Scenario numbers to download (1-13); default: all
        #[clap(long, num_args = 1.., value_parser = clap::value_parser!(u8).range(1..=13))]
        scenarios: Vec<u8>,

        /// Directory to store downloaded data
        #[clap(long, default_value = "data/raw")]
        data_dir: PathBuf,
    },

    /// Parse raw binetflow files into enriched CSV datasets
    Parse {
        /// Directory containing .binetflow files
        #[clap(long, default_value = "data/raw")]
        input_dir: PathBuf,

        /// Directory to store processed data
        #[clap(long, default_value = "data/processed")]
        output_dir: PathBuf,

        /// Parse a single scenario only (1-13)
        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=13))]
        scenario: Option<u8>,
    },

    /// Run the full analysis suite over processed datasets
    Analyze {
        /// Directory containing processed CSV datasets
        #[clap(long, default_value = "data/processed")]
        input_dir: PathBuf,

        /// Directory to store JSON analysis reports
        #[clap(long, default_value = "data/reports")]
        output_dir: PathBuf,

        /// Analyze a single scenario only (1-13)
        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=13))]
        scenario: Option<u8>,

        /// Analyze every processed scenario found
        #[clap(long, action = clap::ArgAction::SetTrue)]
        all: bool,

        /// Contamination fraction for anomaly detection
        #[clap(long, default_value_t = 0.1)]
        anomaly_threshold: f64,
    },

    /// Render text reports over processed datasets
    Visualize {
        /// Directory containing processed CSV datasets
        #[clap(long, default_value = "data/processed")]
        input_dir: PathBuf,

        /// Directory to store rendered reports
        #[clap(long, default_value = "data/reports")]
        output_dir: PathBuf,

        /// Render a single scenario only (1-13)
        #[clap(long, value_parser = clap::value_parser!(u8).range(1..=13))]
        scenario: Option<u8>,
    },

    /// Run download, parse, analyze and optionally visualize end to end
    Pipeline {
        /// Scenario numbers to process (1-13); default: all
        #[clap(long, num_args = 1.., value_parser = clap::value_parser!(u8).range(1..=13))]
        scenarios: Vec<u8>,

        /// Skip the download step
        #[clap(long, action = clap::ArgAction::SetTrue)]
        skip_download: bool,

        /// Render text reports after analysis
        #[clap(long, action = clap::ArgAction::SetTrue)]
        visualize: bool,

        /// Contamination fraction for anomaly detection
        #[clap(long, default_value_t = 0.1)]
        anomaly_threshold: f64,
    },

    /// Show dataset information
    Info {
        /// Show the scenario table
        #[clap(long, action = clap::ArgAction::SetTrue)]
        scenarios: bool,

        /// List downloaded files
        #[clap(long, action = clap::ArgAction::SetTrue)]
        files: bool,

        /// Directory holding downloaded data
        #[clap(long, default_value = "data/raw")]
        data_dir: PathBuf,
    },
}
