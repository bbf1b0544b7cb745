use std::sync::Arc;

use anyhow::Context;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::Signer,
    types::Address,
};
use link_token_client::{contracts::HttpTokenSigner, keys::wallet_from_hex};
use tracing::{info, warn};

use crate::config::DemoConfig;

pub type EtherSigner = HttpTokenSigner;

/// The single RPC connection both identities share.
pub fn connect(config: &DemoConfig) -> anyhow::Result<Provider<Http>> {
    Provider::<Http>::try_from(config.http_url.as_str())
        .with_context(|| format!("invalid rpc url {}", config.http_url))
}

/// Wraps `provider` with a chain-bound signer for the raw hex scalar `private_key`.
pub fn get_writer_ethers_client(
    provider: Provider<Http>,
    role: &str,
    private_key: &str,
    expected_address: Address,
    chain_id: u64,
) -> anyhow::Result<Arc<EtherSigner>> {
    let wallet = wallet_from_hex(private_key, chain_id)
        .with_context(|| format!("invalid {role} private key"))?;

    let address = wallet.address();
    if address != expected_address {
        warn!(
            role,
            configured = ?expected_address,
            derived = ?address,
            "private key does not belong to the configured address"
        );
    }
    info!(role, ?address, chain_id, "signer ready");

    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}
