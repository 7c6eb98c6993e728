mod analysis;
mod args;
mod dataset;
mod downloader;
mod output;
mod parser;
mod record;
mod report;
mod tests;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;

use analysis::anomaly::{self, AnomalyReport};
use analysis::botnet::{self, BotnetIndicators};
use analysis::cluster::{self, ClusterConfig, ClusterSummary};
use analysis::patterns::{self, TrafficPatterns};
use analysis::threat::{self, ThreatIntelligence};
use args::{Cli, Commands};
use dataset::{Dataset, DatasetSummary};
use downloader::Downloader;

/// Everything computed for one scenario, serialized verbatim as its JSON
/// report.
#[derive(Serialize)]
struct ScenarioReport {
    scenario: String,
    summary: DatasetSummary,
    traffic_patterns: TrafficPatterns,
    anomaly_analysis: AnomalyReport,
    botnet_indicators: BotnetIndicators,
    cluster_analysis: Vec<ClusterSummary>,
    threat_intelligence: ThreatIntelligence,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let success = run(cli.command).await;
    std::process::exit(if success { 0 } else { 1 });
}

async fn run(command: Commands) -> bool {
    match command {
        Commands::Download {
            scenarios,
            data_dir,
        } => handle_download(&scenarios, &data_dir).await,
        Commands::Parse {
            input_dir,
            output_dir,
            scenario,
        } => handle_parse(&input_dir, &output_dir, scenario),
        Commands::Analyze {
            input_dir,
            output_dir,
            scenario,
            all,
            anomaly_threshold,
        } => handle_analyze(&input_dir, &output_dir, scenario, all, anomaly_threshold),
        Commands::Visualize {
            input_dir,
            output_dir,
            scenario,
        } => handle_visualize(&input_dir, &output_dir, scenario),
        Commands::Pipeline {
            scenarios,
            skip_download,
            visualize,
            anomaly_threshold,
        } => handle_pipeline(&scenarios, skip_download, visualize, anomaly_threshold).await,
        Commands::Info {
            scenarios,
            files,
            data_dir,
        } => handle_info(scenarios, files, &data_dir),
    }
}

async fn handle_download(scenarios: &[u8], data_dir: &Path) -> bool {
    info!("Starting download process...");

    let scenarios: Vec<u8> = if scenarios.is_empty() {
        (1..=13).collect()
    } else {
        scenarios.to_vec()
    };

    let downloader = Downloader::new(data_dir);
    let successes = downloader.download_scenarios(&scenarios).await;

    if successes == scenarios.len() {
        info!("Download completed successfully!");
        true
    } else {
        error!("Download failed for {} scenarios", scenarios.len() - successes);
        false
    }
}

fn handle_parse(input_dir: &Path, output_dir: &Path, scenario: Option<u8>) -> bool {
    info!("Starting parsing process...");

    if let Err(err) = std::fs::create_dir_all(output_dir) {
        error!("Cannot create {}: {err}", output_dir.display());
        return false;
    }

    let parsed: Vec<(String, Dataset)> = match scenario {
        Some(scenario) => {
            let path = input_dir.join(downloader::scenario_file_name(scenario));
            if !path.exists() {
                error!("Scenario file not found: {}", path.display());
                return false;
            }
            match parser::parse_binetflow_file(&path) {
                Ok(dataset) => vec![(format!("scenario_{scenario:02}_capture"), dataset)],
                Err(err) => {
                    error!("Parsing failed: {err}");
                    return false;
                }
            }
        }
        None => match parser::parse_all_scenarios(input_dir) {
            Ok(parsed) if !parsed.is_empty() => parsed,
            Ok(_) => {
                error!("No data files found to parse!");
                return false;
            }
            Err(err) => {
                error!("Cannot read {}: {err}", input_dir.display());
                return false;
            }
        },
    };

    let mut summaries: BTreeMap<String, DatasetSummary> = BTreeMap::new();
    for (name, dataset) in &parsed {
        let csv_path = output_dir.join(format!("{name}_processed.csv"));
        if let Err(err) = output::save_processed(dataset, &csv_path) {
            error!("Failed to save {}: {err}", csv_path.display());
            return false;
        }
        summaries.insert(name.clone(), dataset.summary());
    }

    let summary_path = output_dir.join("dataset_summary.json");
    if let Err(err) = output::write_json_report(&summaries, &summary_path) {
        error!("Failed to save summary: {err:#}");
        return false;
    }

    info!("Parsing completed successfully!");
    true
}

/// Processed CSV files present in a directory, optionally narrowed to one
/// scenario.
fn processed_files(input_dir: &Path, scenario: Option<u8>) -> std::io::Result<Vec<PathBuf>> {
    if let Some(scenario) = scenario {
        let file = format!("scenario_{scenario:02}_capture_processed.csv");
        return Ok(vec![input_dir.join(file)]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with("_processed.csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn scenario_key(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
        .trim_end_matches("_processed")
        .to_string()
}

fn analyze_dataset(name: &str, dataset: &Dataset, contamination: f64) -> ScenarioReport {
    let traffic = patterns::analyze_traffic_patterns(dataset);
    let anomalies = anomaly::detect_anomalies(dataset, contamination, anomaly::DEFAULT_SEED);
    let indicators = botnet::detect_botnet_behavior(dataset);
    let clusters = cluster::cluster_network_behavior(dataset, ClusterConfig::default());
    let intel = threat::generate_threat_intelligence(dataset);

    ScenarioReport {
        scenario: name.to_string(),
        summary: dataset.summary(),
        traffic_patterns: traffic,
        anomaly_analysis: anomalies.report,
        botnet_indicators: indicators,
        cluster_analysis: clusters.clusters,
        threat_intelligence: intel,
    }
}

fn handle_analyze(
    input_dir: &Path,
    output_dir: &Path,
    scenario: Option<u8>,
    all: bool,
    anomaly_threshold: f64,
) -> bool {
    info!("Starting analysis process...");

    if scenario.is_none() && !all {
        error!("Please specify --scenario N or --all");
        return false;
    }
    if let Err(err) = std::fs::create_dir_all(output_dir) {
        error!("Cannot create {}: {err}", output_dir.display());
        return false;
    }

    let files = match processed_files(input_dir, scenario) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            error!("No processed data files found!");
            return false;
        }
        Err(err) => {
            error!("Cannot read {}: {err}", input_dir.display());
            return false;
        }
    };

    let mut combined: BTreeMap<String, serde_json::Value> = BTreeMap::new();
    let mut analyzed = 0;
    for path in &files {
        let name = scenario_key(path);
        info!("Analyzing {name}...");

        let result = load_and_analyze(path, &name, anomaly_threshold, output_dir);
        match result {
            Ok(report) => {
                combined.insert(name.clone(), report);
                analyzed += 1;
                info!("{name} analysis completed");
            }
            Err(err) => {
                // Batch analysis keeps going across other scenarios.
                error!("Error analyzing {name}: {err:#}");
            }
        }
    }

    if analyzed == 0 {
        error!("Analysis produced no results");
        return false;
    }

    let combined_path = output_dir.join("complete_analysis.json");
    if let Err(err) = output::write_json_report(&combined, &combined_path) {
        error!("Failed to save combined report: {err:#}");
        return false;
    }

    info!("Analysis completed successfully!");
    true
}

fn load_and_analyze(
    path: &Path,
    name: &str,
    anomaly_threshold: f64,
    output_dir: &Path,
) -> anyhow::Result<serde_json::Value> {
    let dataset = output::load_processed(path)
        .with_context(|| format!("loading {}", path.display()))?;

    let report = analyze_dataset(name, &dataset, anomaly_threshold);

    let report_path = output_dir.join(format!("{name}_analysis.json"));
    output::write_json_report(&report, &report_path)?;

    Ok(serde_json::to_value(&report)?)
}

fn handle_visualize(input_dir: &Path, output_dir: &Path, scenario: Option<u8>) -> bool {
    info!("Starting visualization process...");

    if let Err(err) = std::fs::create_dir_all(output_dir) {
        error!("Cannot create {}: {err}", output_dir.display());
        return false;
    }

    let files = match processed_files(input_dir, scenario) {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            error!("No processed data files found!");
            return false;
        }
        Err(err) => {
            error!("Cannot read {}: {err}", input_dir.display());
            return false;
        }
    };

    for path in &files {
        let name = scenario_key(path);
        let dataset = match output::load_processed(path) {
            Ok(dataset) => dataset,
            Err(err) => {
                error!("Error loading {name}: {err}");
                continue;
            }
        };

        let summary = dataset.summary();
        let anomalies =
            anomaly::detect_anomalies(&dataset, anomaly::DEFAULT_CONTAMINATION, anomaly::DEFAULT_SEED);
        let indicators = botnet::detect_botnet_behavior(&dataset);
        let clusters = cluster::cluster_network_behavior(&dataset, ClusterConfig::default());

        let mut rendered = String::new();
        rendered.push_str(&report::render_summary(&summary));
        rendered.push_str(&report::render_anomalies(&anomalies.report));
        rendered.push_str(&report::render_botnet(&indicators));
        rendered.push_str(&report::render_clusters(&clusters));

        println!("{rendered}");

        let report_path = output_dir.join(format!("{name}_report.txt"));
        if let Err(err) = std::fs::write(&report_path, &rendered) {
            error!("Failed to write {}: {err}", report_path.display());
            continue;
        }
        info!("Report for {name} written to {}", report_path.display());
    }

    info!("Visualization process completed!");
    true
}

async fn handle_pipeline(
    scenarios: &[u8],
    skip_download: bool,
    visualize: bool,
    anomaly_threshold: f64,
) -> bool {
    info!("Starting complete analysis pipeline...");

    let raw_dir = PathBuf::from("data/raw");
    let processed_dir = PathBuf::from("data/processed");
    let reports_dir = PathBuf::from("data/reports");

    if !skip_download {
        info!("Step 1: Downloading data...");
        if !handle_download(scenarios, &raw_dir).await {
            warn!("Continuing with whatever data is available locally");
        }
    }

    info!("Step 2: Parsing data...");
    if !handle_parse(&raw_dir, &processed_dir, None) {
        return false;
    }

    info!("Step 3: Analyzing data...");
    if !handle_analyze(&processed_dir, &reports_dir, None, true, anomaly_threshold) {
        return false;
    }

    if visualize {
        info!("Step 4: Rendering reports...");
        if !handle_visualize(&processed_dir, &reports_dir, None) {
            return false;
        }
    }

    info!("Complete pipeline finished successfully!");
    true
}

fn handle_info(scenarios: bool, files: bool, data_dir: &Path) -> bool {
    if scenarios {
        println!("\nCTU-13 Dataset Scenarios:");
        println!("{}", "=".repeat(50));
        for scenario in 1..=13u8 {
            if let Some(name) = downloader::scenario_name(scenario) {
                println!("  {scenario:2}: {name}");
            }
        }
    }

    if files {
        println!("\nAvailable Files:");
        println!("{}", "=".repeat(30));
        let downloader = Downloader::new(data_dir);
        match downloader.list_available_files() {
            Ok(paths) => {
                for path in paths {
                    println!("  {}", path.display());
                }
            }
            Err(err) => {
                error!("Cannot list {}: {err}", data_dir.display());
                return false;
            }
        }
    }

    true
}
