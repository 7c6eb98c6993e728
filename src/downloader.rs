use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::{error, info};

const BASE_URL: &str = "https://mcfp.felk.cvut.cz/publicDatasets";

/// The thirteen CTU-13 malware capture scenarios.
const SCENARIOS: [&str; 13] = [
    "CTU-Malware-Capture-Botnet-42",
    "CTU-Malware-Capture-Botnet-43",
    "CTU-Malware-Capture-Botnet-44",
    "CTU-Malware-Capture-Botnet-45",
    "CTU-Malware-Capture-Botnet-46",
    "CTU-Malware-Capture-Botnet-47",
    "CTU-Malware-Capture-Botnet-48",
    "CTU-Malware-Capture-Botnet-49",
    "CTU-Malware-Capture-Botnet-50",
    "CTU-Malware-Capture-Botnet-51",
    "CTU-Malware-Capture-Botnet-52",
    "CTU-Malware-Capture-Botnet-53",
    "CTU-Malware-Capture-Botnet-54",
];

pub fn scenario_name(scenario: u8) -> Option<&'static str> {
    if (1..=13).contains(&scenario) {
        Some(SCENARIOS[scenario as usize - 1])
    } else {
        None
    }
}

/// Local file name the parser and analyzer expect for a scenario.
pub fn scenario_file_name(scenario: u8) -> String {
    format!("scenario_{scenario:02}_capture.binetflow")
}

pub struct Downloader {
    data_dir: PathBuf,
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(data_dir: &Path) -> Self {
        Downloader {
            data_dir: data_dir.to_path_buf(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetches the bidirectional flow file for one scenario into the data
    /// directory.
    pub async fn download_scenario(&self, scenario: u8) -> anyhow::Result<PathBuf> {
        let Some(name) = scenario_name(scenario) else {
            bail!("invalid scenario number: {scenario}");
        };

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("creating {}", self.data_dir.display()))?;

        let url = format!("{BASE_URL}/{name}/capture20110810.binetflow");
        info!("Downloading scenario {scenario}: {name}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?;
        let body = response.bytes().await?;

        let target = self.data_dir.join(scenario_file_name(scenario));
        tokio::fs::write(&target, &body)
            .await
            .with_context(|| format!("writing {}", target.display()))?;

        info!("Successfully downloaded {}", target.display());
        Ok(target)
    }

    /// Downloads several scenarios, continuing past individual failures.
    /// Returns the number of successful downloads.
    pub async fn download_scenarios(&self, scenarios: &[u8]) -> usize {
        let mut successes = 0;
        for &scenario in scenarios {
            match self.download_scenario(scenario).await {
                Ok(_) => successes += 1,
                Err(err) => error!("Failed to download scenario {scenario}: {err:#}"),
            }
        }
        info!(
            "Successfully downloaded {successes}/{} scenarios",
            scenarios.len()
        );
        successes
    }

    pub fn list_available_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.data_dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }
}
