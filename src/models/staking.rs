use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::{self, TokenEntry, CHAIN_NAME};

/// Cached staking metrics for one token, as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingRecord {
    pub id: i64,
    pub id_protocol: String,
    pub address_token: String,
    pub address_staking: String,
    pub name_token: String,
    pub name_project: String,
    pub chain: String,
    pub apy: u32,
    pub tvl: f64,
    pub stablecoin: bool,
    pub categories: Vec<String>,
    pub logo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row written by a refresh.
///
/// Every field is used when the token is seen for the first time. For an
/// existing token only `apy`, `tvl` and `updated_at` are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStakingRecord {
    pub id_protocol: String,
    pub address_token: String,
    pub address_staking: String,
    pub name_token: String,
    pub name_project: String,
    pub chain: String,
    pub apy: u32,
    pub tvl: f64,
    pub stablecoin: bool,
    pub categories: Vec<String>,
    pub logo: String,
    pub updated_at: DateTime<Utc>,
}

impl NewStakingRecord {
    pub fn new(entry: &TokenEntry, apy: u32, tvl: f64) -> Self {
        Self {
            id_protocol: entry.protocol_id(),
            address_token: entry.token.to_checksum(None),
            address_staking: entry.staking.to_checksum(None),
            name_token: entry.symbol.to_string(),
            name_project: entry.project.to_string(),
            chain: CHAIN_NAME.to_string(),
            apy,
            tvl,
            stablecoin: entry.symbol.is_stablecoin(),
            categories: entry.symbol.categories(),
            logo: registry::logo_for(&entry.token).to_string(),
            updated_at: Utc::now(),
        }
    }
}
