use std::sync::Arc;

use alloy::primitives::utils::{format_units, UnitsError};
use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;

use crate::models::{NewStakingRecord, StakingRecord};
use crate::registry::{self, TokenEntry, TokenSymbol, STAKED_DECIMALS};
use crate::sources::{SourceError, StakingSource};
use super::storage::{StakingStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("normalizing total staked: {0}")]
    Units(#[from] UnitsError),
    #[error("parsing normalized amount: {0}")]
    Parse(#[from] std::num::ParseFloatError),
    #[error("refresh task aborted: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenOutcome {
    pub symbol: TokenSymbol,
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What one batch refresh did, token by token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub finished_at: DateTime<Utc>,
    pub updated: usize,
    pub failed: usize,
    pub results: Vec<TokenOutcome>,
}

/// Scales a raw on-chain amount down by `10^decimals`.
pub fn normalize_units(raw: U256, decimals: u8) -> Result<f64, RefreshError> {
    let formatted = format_units(raw, decimals)?;
    Ok(formatted.parse::<f64>()?)
}

pub struct StakingRefresher {
    source: Arc<dyn StakingSource>,
    store: StakingStore,
    last_report: RwLock<Option<RefreshReport>>,
}

impl StakingRefresher {
    pub fn new(source: Arc<dyn StakingSource>, store: StakingStore) -> Self {
        Self {
            source,
            store,
            last_report: RwLock::new(None),
        }
    }

    /// Read live APY and total staked for one token and upsert its record.
    pub async fn refresh_token(&self, entry: &TokenEntry) -> Result<StakingRecord, RefreshError> {
        let (apy, raw_staked) = tokio::try_join!(
            self.source.read_fixed_apy(entry.staking),
            self.source.read_total_staked(entry.staking),
        )?;

        let tvl = normalize_units(raw_staked, STAKED_DECIMALS)?;
        let record = self
            .store
            .upsert(&NewStakingRecord::new(entry, u32::from(apy), tvl))
            .await?;

        Ok(record)
    }

    /// Refresh every registry token in its own task and wait for all of them.
    ///
    /// A failing token is logged and reported; it never stops the others.
    pub async fn refresh_all(self: &Arc<Self>) -> RefreshReport {
        let (symbols, handles): (Vec<_>, Vec<_>) = registry::entries()
            .map(|entry| {
                let this = Arc::clone(self);
                let handle = tokio::spawn(async move { this.refresh_token(&entry).await });
                (entry.symbol, handle)
            })
            .unzip();

        let joined = join_all(handles).await;

        let results: Vec<TokenOutcome> = symbols
            .into_iter()
            .zip(joined)
            .map(|(symbol, joined)| {
                let outcome = joined
                    .map_err(|e| RefreshError::Task(e.to_string()))
                    .and_then(|res| res);
                match outcome {
                    Ok(record) => {
                        tracing::info!(
                            "✓ Updated staking data for {} (apy={}, tvl={})",
                            symbol,
                            record.apy,
                            record.tvl
                        );
                        TokenOutcome {
                            symbol,
                            updated: true,
                            error: None,
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error updating staking data for {}: {}", symbol, e);
                        TokenOutcome {
                            symbol,
                            updated: false,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        let updated = results.iter().filter(|r| r.updated).count();
        let report = RefreshReport {
            finished_at: Utc::now(),
            updated,
            failed: results.len() - updated,
            results,
        };

        *self.last_report.write() = Some(report.clone());
        report
    }

    pub fn last_report(&self) -> Option<RefreshReport> {
        self.last_report.read().clone()
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }
}
