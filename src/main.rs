// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use balancescan::bootstrap::run;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = run().await {
        tracing::error!("Balance run error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
