// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolError};

/// Settings read from an optional JSON file. Command-line flags win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolConfig {
    /// Printer queue name used when none is given on the command line.
    pub printer_name: Option<String>,
    /// Document title used when none is given on the command line.
    pub default_title: Option<String>,
    /// Query the job status once the job has been submitted.
    pub query_status: bool,
    /// Maximum number of characters kept from the spooler's status text.
    pub status_text_limit: usize,
    /// Fallback `tracing` filter when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            printer_name: None,
            default_title: None,
            query_status: true,
            status_text_limit: 256,
            log_filter: "info".into(),
        }
    }
}

impl SpoolConfig {
    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SpoolError::Config(format!("read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if one is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.status_text_limit == 0 {
            return Err(SpoolError::Config(
                "status_text_limit must be greater than zero".into(),
            ));
        }
        if matches!(self.printer_name.as_deref(), Some("")) {
            return Err(SpoolError::Config("printer_name must not be empty".into()));
        }
        Ok(())
    }
}
