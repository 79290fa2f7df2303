// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Units of work and their results for the balance worker pool

use bigdecimal::BigDecimal;

use crate::errors::RpcError;
use crate::types::group::{Group, TokenKey};
use crate::types::network::Network;

/// Marker rendered instead of an amount when a balance could not be fetched.
pub const UNAVAILABLE: &str = "N/A";

/// One address of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTask {
    /// Position of the group in declaration order
    pub group_index: usize,
    pub ticker: String,
    pub network: Network,
    pub token: Option<String>,
    pub address: String,
}

impl BalanceTask {
    /// One task per address, groups in declaration order, addresses in list order.
    pub fn expand(groups: &[Group]) -> Vec<BalanceTask> {
        groups
            .iter()
            .enumerate()
            .flat_map(|(group_index, group)| {
                group.addresses.iter().map(move |address| BalanceTask {
                    group_index,
                    ticker: group.ticker.clone(),
                    network: group.network,
                    token: group.token.clone(),
                    address: address.clone(),
                })
            })
            .collect()
    }

    pub fn token_key(&self) -> TokenKey {
        TokenKey::new(self.network, self.token.clone())
    }
}

/// Result of one [`BalanceTask`]: a rounded amount, or the error left after
/// every retry failed.
#[derive(Debug, Clone)]
pub struct BalanceOutcome {
    pub task: BalanceTask,
    pub result: Result<BigDecimal, RpcError>,
}

impl BalanceOutcome {
    pub fn amount(&self) -> Option<&BigDecimal> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RpcError> {
        self.result.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The amount, or [`UNAVAILABLE`] when the fetch failed.
    ///
    /// A failed fetch never renders as zero, so an empty wallet and an
    /// unreachable node stay distinguishable.
    pub fn display_amount(&self) -> String {
        match &self.result {
            Ok(amount) => amount.to_string(),
            Err(_) => UNAVAILABLE.to_string(),
        }
    }
}
