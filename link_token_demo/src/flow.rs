use std::sync::Arc;

use anyhow::Context;
use ethers::{
    providers::Middleware,
    types::{Address, U256},
    utils::to_checksum,
};
use link_token_client::{
    artifact::DeployArtifact, contracts::TokenSigner, LinkTokenContract, MintRole,
};
use tracing::info;

use crate::config::DemoConfig;

/// 0.1 LINK
pub const MINT_AMOUNT: u64 = 100_000_000_000_000_000;
pub const ALLOWANCE: u64 = 10;
pub const TRANSFER_AMOUNT: u64 = 6;

/// Deploy or attach, optionally mint, then approve and transfer-from between
/// owner and receiver. Stops at the first failing step.
pub async fn run<M: Middleware>(
    config: &DemoConfig,
    owner: Arc<TokenSigner<M>>,
    receiver: Arc<TokenSigner<M>>,
) -> anyhow::Result<()> {
    let token = deploy_or_attach(config, owner.clone()).await?;

    if config.mint {
        mint_to_owner(&token, owner.clone(), config.owner_address).await?;
    }

    println!();
    println!("balance and approve");
    print_balance(&token, owner.clone(), config.owner_address).await?;
    approve(
        &token,
        owner.clone(),
        config.owner_address,
        config.receiver_address,
    )
    .await?;
    println!();

    println!("balance and receive");
    print_balance(&token, receiver.clone(), config.receiver_address).await?;
    receive(&token, receiver, config.owner_address, config.receiver_address).await?;
    println!();

    println!("balances after");
    print_balance(&token, owner.clone(), config.owner_address).await?;
    print_balance(&token, owner, config.receiver_address).await?;

    Ok(())
}

pub async fn deploy_or_attach<M: Middleware>(
    config: &DemoConfig,
    owner: Arc<TokenSigner<M>>,
) -> anyhow::Result<LinkTokenContract> {
    if !config.deploy_contract {
        let address = config
            .contract_address
            .context("no contract address configured")?;
        info!(?address, "attaching to token contract");
        return Ok(LinkTokenContract::attach(address));
    }

    let artifact_path = config
        .contract_artifact
        .as_ref()
        .context("no contract artifact configured")?;
    let artifact = DeployArtifact::from_path(artifact_path)?;

    let (token, _) = LinkTokenContract::deploy(owner, &artifact)
        .await
        .context("failed to deploy token contract")?;
    println!("contract address: {}", to_checksum(&token.address(), None));

    Ok(token)
}

async fn mint_to_owner<M: Middleware>(
    token: &LinkTokenContract,
    owner: Arc<TokenSigner<M>>,
    owner_address: Address,
) -> anyhow::Result<()> {
    match token
        .ensure_minting_role(owner.clone(), owner_address)
        .await
        .context("failed to ensure minting role")?
    {
        MintRole::AlreadyMinter => {}
        MintRole::Granted(receipt) => {
            info!(tx_hash = ?receipt.transaction_hash, "owner granted minting role")
        }
    }

    let receipt = token
        .mint(owner, owner_address, U256::from(MINT_AMOUNT))
        .await
        .context("failed to mint")?;
    info!(tx_hash = ?receipt.transaction_hash, amount = MINT_AMOUNT, "minted to owner");

    Ok(())
}

async fn print_balance<M: Middleware>(
    token: &LinkTokenContract,
    client: Arc<M>,
    address: Address,
) -> anyhow::Result<()> {
    let balance = token
        .balance_of(client, address)
        .await
        .with_context(|| format!("failed to read balance of {address:?}"))?;
    println!("{}", balance_line(address, balance));

    Ok(())
}

async fn approve<M: Middleware>(
    token: &LinkTokenContract,
    owner: Arc<TokenSigner<M>>,
    from: Address,
    to: Address,
) -> anyhow::Result<()> {
    token
        .approve(owner.clone(), to, U256::from(ALLOWANCE))
        .await
        .context("failed to approve")?;

    let allowed = token
        .allowance(owner, from, to)
        .await
        .context("failed to read allowance after approve")?;
    println!("{}", allowance_line(allowed, from, to));

    Ok(())
}

async fn receive<M: Middleware>(
    token: &LinkTokenContract,
    receiver: Arc<TokenSigner<M>>,
    from: Address,
    to: Address,
) -> anyhow::Result<()> {
    token
        .transfer_from(receiver.clone(), from, to, U256::from(TRANSFER_AMOUNT))
        .await
        .context("failed to transfer from owner")?;

    let allowed = token
        .allowance(receiver, from, to)
        .await
        .context("failed to read allowance after transfer")?;
    println!("{}", allowance_line(allowed, from, to));

    Ok(())
}

fn balance_line(address: Address, balance: U256) -> String {
    format!("{} balance: {balance} juels", to_checksum(&address, None))
}

fn allowance_line(allowed: U256, from: Address, to: Address) -> String {
    format!(
        "{allowed} juels allowed from {} to {}",
        to_checksum(&from, None),
        to_checksum(&to, None)
    )
}
