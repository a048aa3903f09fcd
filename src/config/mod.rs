use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Magnitude cutoff for the pair scan, in (0, 1].
    pub correlation_threshold: f64,
    /// Sliding-window length in observations.
    pub rolling_window: usize,
    /// Number of k-means clusters.
    pub cluster_count: usize,
    /// How many top pairs feed the rolling analysis.
    pub top_pairs: usize,
    /// Seed for k-means centroid initialization.
    pub kmeans_seed: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.8,
            rolling_window: 60,
            cluster_count: 5,
            top_pairs: 5,
            kmeans_seed: 42,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: String,
    /// Correlate period returns instead of raw price levels.
    pub use_returns: bool,
    pub analysis: AnalysisSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: "data/fund_prices.csv".to_string(),
            use_returns: false,
            analysis: AnalysisSettings::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads the file if present, otherwise falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
