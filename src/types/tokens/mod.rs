//! Strong types for token-related values
//!
//! ```text
//! RawAmount (U256, smallest unit)
//!     |
//!     | normalize(TokenDecimals, round digits)
//!     ↓
//! BigDecimal (exact, human-readable)
//! ```

mod amount;
mod decimals;

pub use amount::RawAmount;
pub use decimals::TokenDecimals;
