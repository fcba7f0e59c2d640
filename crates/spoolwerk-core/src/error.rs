// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Spoolwerk.
//
// Every native spooler failure is converted into one of these variants at the
// point of the call, carrying the text the spooler reported.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Top-level error type for all Spoolwerk operations.
#[derive(Debug, Error)]
pub enum SpoolError {
    // -- Session errors --
    #[error("printer unavailable: {0}")]
    PrinterUnavailable(String),

    #[error("session close failed: {0}")]
    SessionCloseFailed(String),

    // -- Transaction errors --
    #[error("document start failed: {0}")]
    DocumentStartFailed(String),

    #[error("page start failed: {0}")]
    PageStartFailed(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("page end failed: {0}")]
    PageEndFailed(String),

    #[error("document end failed: {0}")]
    DocumentEndFailed(String),

    // -- Status --
    #[error("job status query failed: {0}")]
    StatusQueryFailed(String),

    // -- Data source --
    #[error("could not read {}: {source}", path.display())]
    SourceReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -- Caller mistakes --
    #[error("usage error: {0}")]
    Usage(String),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SpoolError {
    /// Shorthand for a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PrinterUnavailable(_) => ErrorKind::PrinterUnavailable,
            Self::SessionCloseFailed(_) => ErrorKind::SessionCloseFailed,
            Self::DocumentStartFailed(_) => ErrorKind::DocumentStartFailed,
            Self::PageStartFailed(_) => ErrorKind::PageStartFailed,
            Self::WriteFailed(_) => ErrorKind::WriteFailed,
            Self::PageEndFailed(_) => ErrorKind::PageEndFailed,
            Self::DocumentEndFailed(_) => ErrorKind::DocumentEndFailed,
            Self::StatusQueryFailed(_) => ErrorKind::StatusQueryFailed,
            Self::SourceReadFailed { .. } => ErrorKind::SourceReadFailed,
            Self::Usage(_) => ErrorKind::Usage,
            Self::Config(_) | Self::ConfigParse(_) => ErrorKind::Config,
        }
    }
}

/// Error kinds, independent of the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    PrinterUnavailable,
    DocumentStartFailed,
    PageStartFailed,
    SourceReadFailed,
    WriteFailed,
    PageEndFailed,
    DocumentEndFailed,
    StatusQueryFailed,
    SessionCloseFailed,
    Usage,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrinterUnavailable => "PrinterUnavailable",
            Self::DocumentStartFailed => "DocumentStartFailed",
            Self::PageStartFailed => "PageStartFailed",
            Self::SourceReadFailed => "SourceReadFailed",
            Self::WriteFailed => "WriteFailed",
            Self::PageEndFailed => "PageEndFailed",
            Self::DocumentEndFailed => "DocumentEndFailed",
            Self::StatusQueryFailed => "StatusQueryFailed",
            Self::SessionCloseFailed => "SessionCloseFailed",
            Self::Usage => "UsageError",
            Self::Config => "ConfigError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolError>;
