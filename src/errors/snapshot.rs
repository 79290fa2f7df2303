// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for balance snapshot files.

use std::path::PathBuf;

/// A balances snapshot could not be written or read.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("Snapshot I/O failed for {}", path.display())]
    Io {
        /// Path of the snapshot file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot document.
    #[error("Invalid snapshot document: {0}")]
    Json(#[from] serde_json::Error),

    /// The file was written by an incompatible format version.
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },
}
