use std::{
    fmt,
    path::{Path, PathBuf},
};

use ethers::types::Address;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

const CONFIG_PATH_ENV_VAR: &str = "LINK_DEMO_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("`contract_address` is required when `deploy_contract` is false")]
    MissingContractAddress,

    #[error("`contract_artifact` is required when `deploy_contract` is true")]
    MissingContractArtifact,
}

#[derive(Clone, Deserialize)]
pub struct DemoConfig {
    pub http_url: String,
    pub chain_id: u64,
    pub owner_address: Address,
    pub owner_private_key: String,
    pub receiver_address: Address,
    pub receiver_private_key: String,
    #[serde(default)]
    pub deploy_contract: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub contract_address: Option<Address>,
    /// Compiled contract (abi + bytecode) used when deploying.
    #[serde(default)]
    pub contract_artifact: Option<PathBuf>,
    #[serde(default)]
    pub mint: bool,
}

impl DemoConfig {
    /// Load from the path given as first argument, else `LINK_DEMO_CONFIG`,
    /// else `./config.json`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let path = resolve_path(
            std::env::args().nth(1),
            std::env::var(CONFIG_PATH_ENV_VAR).ok(),
        );
        Self::from_path(path)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.deploy_contract {
            if self.contract_artifact.is_none() {
                return Err(ConfigError::MissingContractArtifact);
            }
        } else if self.contract_address.is_none() {
            return Err(ConfigError::MissingContractAddress);
        }

        Ok(self)
    }
}

// keys stay out of logs and panics
impl fmt::Debug for DemoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoConfig")
            .field("http_url", &self.http_url)
            .field("chain_id", &self.chain_id)
            .field("owner_address", &self.owner_address)
            .field("receiver_address", &self.receiver_address)
            .field("deploy_contract", &self.deploy_contract)
            .field("contract_address", &self.contract_address)
            .field("contract_artifact", &self.contract_artifact)
            .field("mint", &self.mint)
            .finish_non_exhaustive()
    }
}

fn resolve_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned())
        .into()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(address) => address.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
