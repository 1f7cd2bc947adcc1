use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use blsplit::{
    config::{DealerConfig, Participant},
    Threshold,
};
use serde::Deserialize;

/// Contents of the configuration file
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub threshold: Threshold,
    pub output_dir: PathBuf,
    pub wallet_name: String,
    pub participants: Vec<Participant>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::read(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Self = serde_json::from_slice(&file)
            .with_context(|| format!("parse config file {}", path.display()))?;

        ensure!(
            config.participants.len() >= 2,
            "at least 2 participants are required, {} given",
            config.participants.len()
        );
        ensure!(!config.wallet_name.is_empty(), "wallet name is empty");
        config.dealer_config().validate().context("invalid config")?;

        Ok(config)
    }

    pub fn dealer_config(&self) -> DealerConfig {
        DealerConfig {
            threshold: self.threshold,
            participants: self.participants.clone(),
        }
    }
}
