pub mod staking;

pub use staking::{NewStakingRecord, StakingRecord};
