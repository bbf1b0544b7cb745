mod config;
mod ethers_client;
mod flow;
mod logging;

use tracing::info;

use crate::{
    config::DemoConfig,
    ethers_client::{connect, get_writer_ethers_client},
};

#[tokio::main]
async fn main() {
    logging::init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = DemoConfig::load()?;
    info!(
        rpc_url = %config.http_url,
        chain_id = config.chain_id,
        deploy = config.deploy_contract,
        mint = config.mint,
        "loaded config"
    );

    let provider = connect(&config)?;
    let owner = get_writer_ethers_client(
        provider.clone(),
        "owner",
        &config.owner_private_key,
        config.owner_address,
        config.chain_id,
    )?;
    let receiver = get_writer_ethers_client(
        provider,
        "receiver",
        &config.receiver_private_key,
        config.receiver_address,
        config.chain_id,
    )?;

    flow::run(&config, owner, receiver).await
}
