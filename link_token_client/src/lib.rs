pub mod artifact;
pub mod contracts;
pub mod error;
pub mod keys;
pub mod tx;

pub use contracts::link_token::{LinkTokenContract, MintRole};
pub use error::{KeyError, TokenError, TokenResult};
