use std::path::PathBuf;

use ethers::types::{TxHash, U64};
use thiserror::Error;

/// Failure to turn a raw hex scalar into a secp256k1 signing key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("private key is empty")]
    Empty,

    #[error("private key is not valid hex: {0}")]
    InvalidHex(String),

    #[error("private key scalar is {0} bytes wide, at most 32 are allowed")]
    TooWide(usize),

    #[error("private key scalar is zero")]
    Zero,

    #[error("private key scalar is not below the secp256k1 curve order")]
    OutOfRange,
}

/// Errors surfaced while talking to the token contract.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The node could not be reached or rejected the request.
    #[error("rpc failure during {step}: {message}")]
    Transport { step: &'static str, message: String },

    /// The transaction left the mempool without a receipt.
    #[error("{step} transaction {tx_hash:?} was dropped before it was mined")]
    Dropped { step: &'static str, tx_hash: TxHash },

    /// The transaction was mined but execution reverted.
    #[error("{step} transaction {tx_hash:?} failed with receipt status {status}")]
    Reverted {
        step: &'static str,
        tx_hash: TxHash,
        status: U64,
    },

    #[error("contract deployment failed: {0}")]
    Deployment(String),

    #[error("contract artifact {path:?}: {message}")]
    Artifact { path: PathBuf, message: String },
}

impl TokenError {
    pub(crate) fn transport(step: &'static str, err: impl ToString) -> Self {
        Self::Transport {
            step,
            message: err.to_string(),
        }
    }
}

pub type TokenResult<T> = Result<T, TokenError>;
