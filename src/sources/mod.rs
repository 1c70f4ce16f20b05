pub mod chain;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

pub use chain::ChainReader;

/// Read-only view of a staking contract.
#[async_trait]
pub trait StakingSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whole-percent APY as reported by `fixedAPY()`, unscaled.
    async fn read_fixed_apy(&self, staking: Address) -> Result<u8, SourceError>;

    /// Raw `totalAmountStaked()`; the caller normalizes decimals.
    async fn read_total_staked(&self, staking: Address) -> Result<U256, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The node answered but the call could not be encoded or decoded.
    #[error("contract call failed: {0}")]
    Contract(alloy::contract::Error),
    /// Transport failure or an error response from the node, reverts included.
    #[error("rpc error: {0}")]
    Rpc(String),
}

impl From<alloy::contract::Error> for SourceError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) => SourceError::Rpc(e.to_string()),
            other => SourceError::Contract(other),
        }
    }
}
