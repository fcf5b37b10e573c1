use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Node configuration read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub me: MeConfig,
    pub network: NetworkConfig,
    pub nearest_neighbours: Vec<NeighbourConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeConfig {
    pub name: String,
    pub protocol: String,
    pub url: String,
    pub port: String,
    pub api_port: String,
    pub datastore_path: PathBuf,
}

impl Default for MeConfig {
    fn default() -> Self {
        Self {
            name: "node1".into(),
            protocol: "http".into(),
            url: "localhost".into(),
            port: "7000".into(),
            api_port: "7001".into(),
            datastore_path: PathBuf::from("data/revstore.redb"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub consensus_threshold: u32,
    pub consensus: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: 1,
            consensus: "majority".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighbourConfig {
    pub name: String,
    pub protocol: String,
    pub url: String,
    pub port: String,
    pub identity: IdentityConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub public_key: String,
}

impl NodeConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}
