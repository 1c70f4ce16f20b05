pub mod refresh;
pub mod storage;

pub use refresh::{RefreshError, RefreshReport, StakingRefresher, TokenOutcome};
pub use storage::{StakingStore, StoreError};
