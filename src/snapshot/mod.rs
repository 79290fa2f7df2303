// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Balance snapshots
//!
//! A snapshot maps `(ticker, network, token, address)` to the rounded amount
//! fetched for it. Snapshots are saved as versioned JSON and compared with
//! [`diff`] to see what moved between two runs.
//!
//! ```json
//! {
//!   "version": 1,
//!   "saved_at": "2026-01-31T12:00:00Z",
//!   "balances": [
//!     { "ticker": "ETH", "network": "ethereum", "token": null, "address": "0x...", "amount": "1.5" }
//!   ]
//! }
//! ```
//!
//! Amounts are written as decimal strings so reading a file back reproduces
//! the exact values.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::SnapshotError;
use crate::result::AggregatedResult;
use crate::types::network::Network;

mod diff;

pub use diff::{diff, DiffEntry};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Identity of one balance across snapshots.
///
/// Ordering is lexicographic over the fields, which gives diffs a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub ticker: String,
    pub network: Network,
    /// Token reference; `None` for the native coin
    pub token: Option<String>,
    pub address: String,
}

impl SnapshotKey {
    pub fn new(
        ticker: impl Into<String>,
        network: Network,
        token: Option<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            network,
            token,
            address: address.into(),
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.ticker,
            self.network,
            self.token.as_deref().unwrap_or("native"),
            self.address
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    ticker: String,
    network: Network,
    token: Option<String>,
    address: String,
    amount: BigDecimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    saved_at: DateTime<Utc>,
    balances: Vec<SnapshotEntry>,
}

/// Point-in-time balances, keyed by [`SnapshotKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct BalancesSnapshot {
    saved_at: DateTime<Utc>,
    balances: BTreeMap<SnapshotKey, BigDecimal>,
}

impl Default for BalancesSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl BalancesSnapshot {
    pub fn new() -> Self {
        Self {
            saved_at: Utc::now(),
            balances: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = saved_at;
        self
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    /// Insert an amount; an existing key keeps its first value.
    ///
    /// Returns `false` when the key was already present.
    pub fn insert(&mut self, key: SnapshotKey, amount: BigDecimal) -> bool {
        if let Some(existing) = self.balances.get(&key) {
            warn!(%key, %existing, ignored = %amount, "Duplicate snapshot key");
            return false;
        }
        self.balances.insert(key, amount);
        true
    }

    pub fn get(&self, key: &SnapshotKey) -> Option<&BigDecimal> {
        self.balances.get(key)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SnapshotKey, &BigDecimal)> {
        self.balances.iter()
    }

    /// Every successfully fetched address amount of a run.
    ///
    /// Unavailable addresses are left out rather than recorded as zero.
    pub fn from_result(result: &AggregatedResult) -> Self {
        let mut snapshot = Self::new();
        for group in &result.groups {
            for outcome in &group.outcomes {
                if let Some(amount) = outcome.amount() {
                    let task = &outcome.task;
                    snapshot.insert(
                        SnapshotKey::new(
                            task.ticker.clone(),
                            task.network,
                            task.token.clone(),
                            task.address.clone(),
                        ),
                        amount.clone(),
                    );
                }
            }
        }
        snapshot
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            saved_at: self.saved_at,
            balances: self
                .balances
                .iter()
                .map(|(key, amount)| SnapshotEntry {
                    ticker: key.ticker.clone(),
                    network: key.network,
                    token: key.token.clone(),
                    address: key.address.clone(),
                    amount: amount.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Parse a snapshot document.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::UnsupportedVersion`] for other format versions,
    /// [`SnapshotError::Json`] for malformed documents.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        if file.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: file.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let mut snapshot = Self::new().with_saved_at(file.saved_at);
        for entry in file.balances {
            let key = SnapshotKey::new(entry.ticker, entry.network, entry.token, entry.address);
            snapshot.insert(key, entry.amount);
        }
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing it atomically.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let io_error = |source: std::io::Error| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
            }
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(io_error)?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(io_error)?;

        debug!(path = %path.display(), entries = self.len(), "Saved balances snapshot");
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot = Self::from_json(&json)?;
        info!(path = %path.display(), entries = snapshot.len(), "Loaded balances snapshot");
        Ok(snapshot)
    }
}

impl FromIterator<(SnapshotKey, BigDecimal)> for BalancesSnapshot {
    fn from_iter<I: IntoIterator<Item = (SnapshotKey, BigDecimal)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (key, amount) in iter {
            snapshot.insert(key, amount);
        }
        snapshot
    }
}
