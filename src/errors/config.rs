// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for configuration loading and resolution.

use std::path::PathBuf;

use super::ShareExpressionError;
use crate::types::network::UnknownNetwork;

/// Configuration could not be loaded or resolved.
///
/// All variants are raised before any network activity starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {}", path.display())]
    Read {
        /// Path of the configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The TOML document is malformed or has unknown fields.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two address groups share a name.
    #[error("There are non-unique address group names: {names}")]
    DuplicateAddressGroups {
        /// Comma separated duplicated names
        names: String,
    },

    /// A `group:` reference names an address group that does not exist.
    #[error("Address group not found: {name}")]
    UnknownAddressGroup {
        /// The missing group name
        name: String,
    },

    /// A `file:` reference points to a missing file.
    #[error("File with addresses not found: {}", path.display())]
    AddressFileNotFound {
        /// The missing path (after `~` expansion)
        path: PathBuf,
    },

    /// A group has no addresses after expansion.
    #[error("Group {group} has no addresses")]
    EmptyAddresses {
        /// Display name of the group
        group: String,
    },

    /// A group's share expression does not parse.
    #[error("Invalid share for group {group}")]
    InvalidShare {
        /// Display name of the group
        group: String,
        /// The parse failure
        #[source]
        source: ShareExpressionError,
    },

    /// A `[nodes]` or `[workers]` key is not a supported network.
    #[error(transparent)]
    UnknownNetwork(#[from] UnknownNetwork),

    /// A `[prices]` value is not a decimal number.
    #[error("Invalid price for {ticker}: {reason}")]
    InvalidPrice {
        /// Upper-case ticker
        ticker: String,
        /// Parser message
        reason: String,
    },

    /// A worker count is zero.
    #[error("Worker count for {network} must be at least 1")]
    InvalidWorkers {
        /// Network name as written in the config
        network: String,
    },
}
