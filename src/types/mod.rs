// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across balancescan.
//!
//! This module provides the domain vocabulary shared by every stage:
//! - Networks and their native-coin properties
//! - Groups (configured ticker/network/token rows) and token keys
//! - Raw amounts and token decimals

pub mod group;
pub mod network;
pub mod tokens;

// Note: Public types are re-exported from lib.rs, not here
