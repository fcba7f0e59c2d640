// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the terminal.
//
// Every error is mapped to plain English with a clear suggestion. The severity
// tells the caller whether trying again could help.

use crate::error::SpoolError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Printer busy or offline; the same command may work later.
    Transient,
    /// User must do something (fix the printer name, the file, the config).
    ActionRequired,
    /// A bug in the caller or a driver that cannot handle the job.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether running the same command again could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `SpoolError` into a `HumanError`.
pub fn humanize_error(err: &SpoolError) -> HumanError {
    match err {
        SpoolError::PrinterUnavailable(detail) => humanize_open_error(detail),

        SpoolError::DocumentStartFailed(detail) => HumanError {
            message: "The printer would not accept a new job.".into(),
            suggestion: format!(
                "Check the printer is online and its queue is not paused or full. ({detail})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },

        SpoolError::PageStartFailed(detail)
        | SpoolError::PageEndFailed(detail)
        | SpoolError::DocumentEndFailed(detail) => HumanError {
            message: "The print spooler stopped part way through the job.".into(),
            suggestion: format!("Check the print queue for a stuck job and try again. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        SpoolError::WriteFailed(detail) => HumanError {
            message: "Not all of the document reached the printer.".into(),
            suggestion: format!(
                "The printer may have gone offline. Cancel the partial job in the queue, then print again. ({detail})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },

        SpoolError::SourceReadFailed { path, source } => HumanError {
            message: "We couldn't read the file to print.".into(),
            suggestion: format!("Check that {} exists and is readable. ({source})", path.display()),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolError::StatusQueryFailed(detail) => HumanError {
            message: "We couldn't find out what happened to the job.".into(),
            suggestion: format!(
                "The job may already have finished and left the queue. ({detail})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },

        SpoolError::SessionCloseFailed(detail) => HumanError {
            message: "The printer connection did not close cleanly.".into(),
            suggestion: format!("The job was still sent. If printing hangs, restart the print spooler. ({detail})"),
            retriable: false,
            severity: Severity::Transient,
        },

        SpoolError::Usage(detail) => HumanError {
            message: "Spoolwerk was used the wrong way.".into(),
            suggestion: format!("This is a bug in the calling program. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SpoolError::Config(detail) => HumanError {
            message: "The configuration file has a problem.".into(),
            suggestion: format!("Fix or remove the configuration file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SpoolError::ConfigParse(detail) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: format!("Fix the syntax error and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

fn humanize_open_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("access is denied") || lower.contains("permission") {
        HumanError {
            message: "You don't have permission to use this printer.".into(),
            suggestion: "Ask an administrator to give your account print access.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("not available on this platform") {
        HumanError {
            message: "This computer has no print spooler Spoolwerk can use.".into(),
            suggestion: "Run Spoolwerk on Windows.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else if lower.contains("spooler") || lower.contains("rpc server") {
        HumanError {
            message: "The print spooler service is not running.".into(),
            suggestion: "Start the Print Spooler service, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else {
        HumanError {
            message: "We couldn't find that printer.".into(),
            suggestion: format!(
                "Check the printer name matches one in your printer list exactly. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    }
}
