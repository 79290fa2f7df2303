// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw on-chain amount type

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::decimals::TokenDecimals;
use crate::amount::scale_and_round;

/// Raw balance as reported by a node, in the token's smallest unit
/// (wei, lamports, satoshis, octas).
///
/// U256 covers every supported network: EVM balances are 256-bit, the others
/// fit in 64 bits.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use balancescan::{RawAmount, TokenDecimals};
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// // 1.5 ETH in wei (18 decimals)
/// let amount = RawAmount::new(U256::from(1_500_000_000_000_000_000u64));
/// let value = amount.normalize(TokenDecimals::EVM_NATIVE, 4);
/// assert_eq!(value, BigDecimal::from_str("1.5").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAmount(U256);

impl RawAmount {
    /// Zero raw amount
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn new(amount: U256) -> Self {
        Self(amount)
    }

    /// Get the inner U256 value
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Scale by `10^decimals` and round to `round_digits` (half-to-even).
    pub fn normalize(&self, decimals: TokenDecimals, round_digits: u32) -> BigDecimal {
        scale_and_round(self.0, decimals, round_digits)
    }
}

impl From<u64> for RawAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for RawAmount {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for RawAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RawAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_normalize_usdc() {
        let raw = RawAmount::from(100_250_000u64);
        assert_eq!(
            raw.normalize(TokenDecimals::USDC, 2),
            BigDecimal::from_str("100.25").unwrap()
        );
    }

    #[test]
    fn test_zero() {
        assert!(RawAmount::ZERO.is_zero());
        assert_eq!(
            RawAmount::ZERO.normalize(TokenDecimals::EVM_NATIVE, 4),
            BigDecimal::from(0)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RawAmount::from(12345u64).to_string(), "12345");
    }
}
