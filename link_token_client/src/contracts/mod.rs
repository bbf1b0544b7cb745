use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::LocalWallet,
};

pub mod link_token;

/// A middleware stack that signs with a single local key.
pub type TokenSigner<M> = SignerMiddleware<M, LocalWallet>;

pub type HttpTokenSigner = TokenSigner<Provider<Http>>;
