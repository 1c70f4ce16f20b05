#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use staking_cache::api::{create_rest_router, AppState};
use staking_cache::services::{StakingRefresher, StakingStore};
use staking_cache::sources::{SourceError, StakingSource};

// ── Scripted chain ───────────────────────────────────────────────────

/// Answers every staking contract with the same values, except the ones
/// marked as failing.
pub struct ScriptedSource {
    apy: Mutex<u8>,
    staked: Mutex<U256>,
    failing: Mutex<HashSet<Address>>,
}

impl ScriptedSource {
    pub fn new(apy: u8, staked: u64) -> Arc<Self> {
        Arc::new(Self {
            apy: Mutex::new(apy),
            staked: Mutex::new(U256::from(staked)),
            failing: Mutex::new(HashSet::new()),
        })
    }

    pub fn set(&self, apy: u8, staked: u64) {
        *self.apy.lock() = apy;
        *self.staked.lock() = U256::from(staked);
    }

    pub fn fail(&self, staking: Address) {
        self.failing.lock().insert(staking);
    }
}

#[async_trait]
impl StakingSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn read_fixed_apy(&self, staking: Address) -> Result<u8, SourceError> {
        if self.failing.lock().contains(&staking) {
            return Err(SourceError::Rpc(format!("timeout reading {staking}")));
        }
        Ok(*self.apy.lock())
    }

    async fn read_total_staked(&self, _staking: Address) -> Result<U256, SourceError> {
        Ok(*self.staked.lock())
    }
}

// ── App harness ──────────────────────────────────────────────────────

pub fn test_app(source: Arc<ScriptedSource>) -> (Router, StakingStore) {
    let store = StakingStore::open_in_memory().unwrap();
    let refresher = Arc::new(StakingRefresher::new(source, store.clone()));
    let state = Arc::new(AppState {
        store: store.clone(),
        refresher,
    });
    (create_rest_router(state), store)
}

/// Fire one request; non-JSON bodies come back as a JSON string.
pub async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
