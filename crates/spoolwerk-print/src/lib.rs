// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk Print: printer sessions and raw print jobs.
//
// A `PrinterSession` owns one spooler handle and enforces the
// document/page nesting; a `PrintJob` drives a session through one complete
// document and guarantees every started transaction is ended.

pub mod job;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use job::{DocumentSource, FileSource, JobReport, PrintJob};
pub use session::{DEFAULT_STATUS_TEXT_LIMIT, PrinterSession};
