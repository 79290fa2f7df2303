//! Price lookup
//!
//! Balancescan never discovers prices itself. Fiat values are computed from a
//! [`PriceLookup`] supplied by the caller, keyed by ticker.
//!
//! # Example: Implementing PriceLookup
//!
//! ```rust
//! use balancescan::PriceLookup;
//! use bigdecimal::BigDecimal;
//!
//! struct StablecoinsOnly;
//!
//! impl PriceLookup for StablecoinsOnly {
//!     fn price_of(&self, ticker: &str) -> Option<BigDecimal> {
//!         matches!(ticker, "USDT" | "USDC").then(|| BigDecimal::from(1))
//!     }
//! }
//!
//! assert_eq!(StablecoinsOnly.price_of("USDC"), Some(BigDecimal::from(1)));
//! assert_eq!(StablecoinsOnly.price_of("ETH"), None);
//! ```

use std::collections::BTreeMap;

use bigdecimal::BigDecimal;

/// Source of fiat prices per ticker.
///
/// The trait is object-safe and synchronous: implementations are expected to
/// have their prices ready before a run, so aggregation never waits on I/O.
/// An absent price is not an error; the group is simply left unpriced.
pub trait PriceLookup: Send + Sync {
    /// Price of one unit of `ticker` (upper-case), if known.
    fn price_of(&self, ticker: &str) -> Option<BigDecimal>;
}

/// Fixed price table, typically the `[prices]` section of the configuration.
///
/// Tickers are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticPrices {
    prices: BTreeMap<String, BigDecimal>,
}

impl StaticPrices {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_price(mut self, ticker: &str, price: BigDecimal) -> Self {
        self.prices.insert(ticker.trim().to_uppercase(), price);
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl From<BTreeMap<String, BigDecimal>> for StaticPrices {
    fn from(prices: BTreeMap<String, BigDecimal>) -> Self {
        prices
            .into_iter()
            .fold(Self::new(), |table, (ticker, price)| table.with_price(&ticker, price))
    }
}

impl PriceLookup for StaticPrices {
    fn price_of(&self, ticker: &str) -> Option<BigDecimal> {
        self.prices.get(&ticker.trim().to_uppercase()).cloned()
    }
}
