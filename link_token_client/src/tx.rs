use std::borrow::Borrow;

use ethers::{
    abi::Detokenize,
    contract::FunctionCall,
    middleware::SignerMiddleware,
    providers::Middleware,
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockNumber, TransactionReceipt, TxHash,
        U256,
    },
};
use tracing::debug;

use crate::error::{TokenError, TokenResult};

/// Per-transaction parameters, fetched fresh before every submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOptions {
    pub nonce: U256,
    pub gas_price: U256,
    /// No native currency accompanies token calls.
    pub value: U256,
    pub chain_id: u64,
}

impl TxOptions {
    /// Fetches the pending nonce of `from` and the node's suggested gas price.
    ///
    /// The two lookups are independent so they are issued together; both must
    /// succeed before anything is signed. Gas limit is left unset for the
    /// middleware to estimate.
    pub async fn build<M: Middleware>(client: &M, from: Address, chain_id: u64) -> TokenResult<Self> {
        let nonce = async {
            client
                .get_transaction_count(from, Some(BlockNumber::Pending.into()))
                .await
                .map_err(|e| TokenError::transport("nonce lookup", e))
        };
        let gas_price = async {
            client
                .get_gas_price()
                .await
                .map_err(|e| TokenError::transport("gas price lookup", e))
        };
        let (nonce, gas_price) = tokio::try_join!(nonce, gas_price)?;

        debug!(?from, %nonce, %gas_price, chain_id, "built transaction options");

        Ok(Self {
            nonce,
            gas_price,
            value: U256::zero(),
            chain_id,
        })
    }

    pub async fn for_signer<M: Middleware>(
        signer: &SignerMiddleware<M, LocalWallet>,
    ) -> TokenResult<Self> {
        Self::build(signer, signer.address(), signer.signer().chain_id()).await
    }

    /// Pins these options onto a raw transaction request.
    pub fn apply_to(&self, tx: &mut TypedTransaction) {
        tx.set_nonce(self.nonce);
        tx.set_gas_price(self.gas_price);
        tx.set_value(self.value);
        tx.set_chain_id(self.chain_id);
    }

    /// Turns a contract call into a legacy transaction carrying these options.
    pub fn apply<B, M, D>(&self, call: FunctionCall<B, M, D>) -> FunctionCall<B, M, D>
    where
        B: Borrow<M>,
        M: Middleware,
        D: Detokenize,
    {
        let mut call = call.legacy();
        self.apply_to(&mut call.tx);
        call
    }
}

/// Distinguishes a mined-but-reverted transaction from a successful one.
///
/// The RPC round trips may all succeed while execution fails on chain, so a
/// receipt with status `0` is an error. A missing receipt means the
/// transaction was dropped.
pub fn ensure_success(
    step: &'static str,
    tx_hash: TxHash,
    receipt: Option<TransactionReceipt>,
) -> TokenResult<TransactionReceipt> {
    let receipt = receipt.ok_or(TokenError::Dropped { step, tx_hash })?;

    match receipt.status {
        Some(status) if status.is_zero() => Err(TokenError::Reverted {
            step,
            tx_hash,
            status,
        }),
        _ => Ok(receipt),
    }
}

/// Submits a prepared call and blocks until it is mined with a successful status.
pub(crate) async fn send_and_confirm<B, M, D>(
    step: &'static str,
    call: FunctionCall<B, M, D>,
) -> TokenResult<TransactionReceipt>
where
    B: Borrow<M>,
    M: Middleware,
    D: Detokenize,
{
    let pending = call
        .send()
        .await
        .map_err(|e| TokenError::transport(step, e))?;
    let tx_hash = pending.tx_hash();
    debug!(step, ?tx_hash, "transaction submitted, waiting to be mined");

    let receipt = pending
        .await
        .map_err(|e| TokenError::transport(step, e))?;

    ensure_success(step, tx_hash, receipt)
}
