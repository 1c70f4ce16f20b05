use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{SourceError, StakingSource};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IStakingPool {
        function fixedAPY() external view returns (uint8);
        function totalAmountStaked() external view returns (uint256);
    }
}

/// JSON-RPC backed reader for the tracked staking contracts.
///
/// Holds one HTTP provider for the lifetime of the process; clones share it.
#[derive(Clone)]
pub struct ChainReader {
    provider: DynProvider,
}

impl ChainReader {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect_http(rpc_url.parse().with_context(|| format!("invalid RPC url {rpc_url}"))?)
            .erased();
        Ok(Self { provider })
    }
}

#[async_trait]
impl StakingSource for ChainReader {
    fn name(&self) -> &'static str {
        "json-rpc"
    }

    async fn read_fixed_apy(&self, staking: Address) -> Result<u8, SourceError> {
        let pool = IStakingPool::new(staking, &self.provider);
        Ok(pool.fixedAPY().call().await?)
    }

    async fn read_total_staked(&self, staking: Address) -> Result<U256, SourceError> {
        let pool = IStakingPool::new(staking, &self.provider);
        Ok(pool.totalAmountStaked().call().await?)
    }
}
