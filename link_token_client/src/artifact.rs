use std::path::Path;

use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

use crate::error::{TokenError, TokenResult};

/// ABI and creation code of a compiled contract.
#[derive(Debug, Clone)]
pub struct DeployArtifact {
    pub abi: Abi,
    pub bytecode: Bytes,
}

// hardhat writes `bytecode` as a hex string, foundry as `{ "object": "0x.." }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: Abi,
    bytecode: RawBytecode,
}

impl DeployArtifact {
    pub fn from_path(path: impl AsRef<Path>) -> TokenResult<Self> {
        let path = path.as_ref();
        let artifact_err = |message: String| TokenError::Artifact {
            path: path.to_path_buf(),
            message,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| artifact_err(e.to_string()))?;
        let raw: RawArtifact =
            serde_json::from_str(&contents).map_err(|e| artifact_err(e.to_string()))?;

        let bytecode = match raw.bytecode {
            RawBytecode::Hex(bytes) => bytes,
            RawBytecode::Object { object } => object,
        };
        if bytecode.is_empty() {
            return Err(artifact_err(
                "bytecode is empty, is this an interface or abstract contract?".to_owned(),
            ));
        }

        Ok(Self {
            abi: raw.abi,
            bytecode,
        })
    }
}
