use ethers::{
    core::k256::ecdsa::SigningKey,
    signers::{LocalWallet, Signer},
};

use crate::error::KeyError;

const SCALAR_BYTES: usize = 32;

/// Builds a secp256k1 signing key from a raw hex scalar.
///
/// The input is the private scalar itself (optionally `0x` prefixed, surrounding
/// whitespace ignored), read as a big-endian integer. Zero and values outside
/// the curve order are rejected rather than yielding a degenerate keypair.
pub fn signing_key_from_hex(raw: &str) -> Result<SigningKey, KeyError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() {
        return Err(KeyError::Empty);
    }

    let bytes = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    }
    .map_err(|e| KeyError::InvalidHex(e.to_string()))?;

    let first_set = bytes.iter().position(|b| *b != 0);
    let Some(first_set) = first_set else {
        return Err(KeyError::Zero);
    };
    let scalar = &bytes[first_set..];
    if scalar.len() > SCALAR_BYTES {
        return Err(KeyError::TooWide(scalar.len()));
    }

    let mut padded = [0u8; SCALAR_BYTES];
    padded[SCALAR_BYTES - scalar.len()..].copy_from_slice(scalar);

    SigningKey::from_slice(&padded).map_err(|_| KeyError::OutOfRange)
}

/// A chain-bound wallet for the given raw hex scalar.
pub fn wallet_from_hex(raw: &str, chain_id: u64) -> Result<LocalWallet, KeyError> {
    let key = signing_key_from_hex(raw)?;
    Ok(LocalWallet::from(key).with_chain_id(chain_id))
}
