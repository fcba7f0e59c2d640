// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Spoolwerk.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data type handed to the spooler when a document starts. Bytes are passed
/// to the driver without interpretation.
pub const RAW_DATATYPE: &str = "RAW";

/// Spooler-assigned job identifier.
///
/// Opaque: callers must not rely on ordering or range beyond "non-zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(NonZeroU32);

impl JobId {
    /// Wrap a raw spooler id. Zero is the spooler's failure value and yields `None`.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bitmask of spooler job condition codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusFlags(pub u32);

impl StatusFlags {
    pub const PAUSED: u32 = 0x0000_0001;
    pub const ERROR: u32 = 0x0000_0002;
    pub const DELETING: u32 = 0x0000_0004;
    pub const SPOOLING: u32 = 0x0000_0008;
    pub const PRINTING: u32 = 0x0000_0010;
    pub const OFFLINE: u32 = 0x0000_0020;
    pub const PAPEROUT: u32 = 0x0000_0040;
    pub const PRINTED: u32 = 0x0000_0080;
    pub const DELETED: u32 = 0x0000_0100;
    pub const BLOCKED_DEVQ: u32 = 0x0000_0200;
    pub const USER_INTERVENTION: u32 = 0x0000_0400;
    pub const RESTART: u32 = 0x0000_0800;
    pub const COMPLETE: u32 = 0x0000_1000;
    pub const RETAINED: u32 = 0x0000_2000;
    pub const RENDERING_LOCALLY: u32 = 0x0000_4000;

    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit of `flag` is set.
    pub fn contains(&self, flag: u32) -> bool {
        flag != 0 && self.0 & flag == flag
    }
}

impl std::fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Point-in-time status of one spooler job.
///
/// Built fresh by every status query; nothing here is cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatusSnapshot {
    pub job_id: JobId,
    /// Raw success signal of the retrieval call (non-zero on success).
    pub return_code: u32,
    /// Most recent native failure seen while querying, if any.
    pub last_error_message: Option<String>,
    /// Free-text status set by the spooler or port monitor.
    pub status_text: Option<String>,
    pub status_flags: StatusFlags,
    /// Human-readable descriptions of `status_flags`.
    pub conditions: Vec<String>,
    pub document: Option<String>,
    pub datatype: Option<String>,
    pub printer_name: Option<String>,
    pub machine_name: Option<String>,
    pub user_name: Option<String>,
    pub priority: u32,
    /// Position of the job in the print queue.
    pub position: u32,
    pub total_pages: u32,
    pub pages_printed: u32,
    pub submitted: Option<DateTime<Utc>>,
}

impl JobStatusSnapshot {
    /// Whether the spooler reports the job as delivered to the printer.
    pub fn is_delivered(&self) -> bool {
        self.status_flags.contains(StatusFlags::COMPLETE)
            || self.status_flags.contains(StatusFlags::PRINTED)
    }
}
