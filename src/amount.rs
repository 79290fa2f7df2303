// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Conversion of raw on-chain integers into rounded decimal amounts.
//!
//! All arithmetic is exact: the raw integer becomes the unscaled value of a
//! [`BigDecimal`] whose scale is the token's decimals, so no binary floating
//! point is involved and decimals well above 30 cannot overflow. Rounding uses
//! round-half-to-even, the default of standard decimal libraries.

use alloy_primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, RoundingMode, Zero};

use crate::types::tokens::TokenDecimals;

/// Convert a raw amount to a human-readable decimal rounded to `round_digits`.
///
/// A zero raw amount always yields an exact zero.
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use balancescan::{scale_and_round, TokenDecimals};
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
///
/// // 1.25 rounds to 1.2 under round-half-to-even
/// let value = scale_and_round(U256::from(125u64), TokenDecimals::new(2), 1);
/// assert_eq!(value, BigDecimal::from_str("1.2").unwrap());
/// ```
pub fn scale_and_round(raw: U256, decimals: TokenDecimals, round_digits: u32) -> BigDecimal {
    if raw.is_zero() {
        return BigDecimal::zero();
    }
    let exact = BigDecimal::new(u256_to_bigint(raw), i64::from(decimals.as_u8()));
    round_decimal(&exact, round_digits)
}

/// Round a decimal to `round_digits` fractional digits (half-to-even).
///
/// Trailing fractional zeros are dropped so `1.5000` and `1.5` render the same.
/// Zero stays an exact zero.
pub fn round_decimal(value: &BigDecimal, round_digits: u32) -> BigDecimal {
    if value.is_zero() {
        return BigDecimal::zero();
    }
    let rounded = value.with_scale_round(i64::from(round_digits), RoundingMode::HalfEven);
    trim_fraction(rounded)
}

fn trim_fraction(value: BigDecimal) -> BigDecimal {
    if value.is_zero() {
        return BigDecimal::zero();
    }
    let normalized = value.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale < 0 {
        normalized.with_scale(0)
    } else {
        normalized
    }
}

fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes_vec())
}
