//! Decimals of a network coin or token

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of fractional digits between a token's smallest unit and one whole
/// token.
///
/// EVM coins use 18, SOL 9, BTC and APT 8. Tokens report their own value,
/// which is usually 6 or 18 but can exceed 30 for exotic contracts.
///
/// ```
/// use balancescan::{Network, TokenDecimals};
///
/// assert_eq!(Network::Solana.native_decimals(), TokenDecimals::SOLANA_NATIVE);
/// assert_eq!(TokenDecimals::new(6).to_string(), "6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDecimals(u8);

impl TokenDecimals {
    pub const EVM_NATIVE: Self = Self(18);
    /// Lamports per SOL
    pub const SOLANA_NATIVE: Self = Self(9);
    /// Satoshis per BTC
    pub const BITCOIN_NATIVE: Self = Self(8);
    /// Octas per APT
    pub const APTOS_NATIVE: Self = Self(8);
    pub const USDC: Self = Self(6);

    pub const fn new(decimals: u8) -> Self {
        Self(decimals)
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl From<u8> for TokenDecimals {
    fn from(decimals: u8) -> Self {
        Self::new(decimals)
    }
}

impl fmt::Display for TokenDecimals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
