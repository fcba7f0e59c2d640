// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk: core types, error definitions and configuration shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod status;
pub mod types;

pub use config::SpoolConfig;
pub use error::{ErrorKind, SpoolError};
pub use types::*;
