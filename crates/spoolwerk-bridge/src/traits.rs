// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic spooler contract.
//
// Method names follow the native call each one wraps. Implementations report
// failures as `NativeError` and leave the translation into domain errors to
// the printer session.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Win32 `ERROR_INSUFFICIENT_BUFFER`: the expected outcome of a size probe.
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;

/// A failure reported by the native spooler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (os error {code})")]
pub struct NativeError {
    /// Platform error code (`GetLastError` on Windows).
    pub code: u32,
    /// Platform-provided description of `code`.
    pub message: String,
}

impl NativeError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Whether the call failed only because the caller's buffer was too small.
    pub fn is_insufficient_buffer(&self) -> bool {
        self.code == ERROR_INSUFFICIENT_BUFFER
    }
}

pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Parameters for starting a document (DOC_INFO_1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocInfo<'a> {
    pub doc_name: &'a str,
    /// Redirect output to a file instead of the printer port.
    pub output_file: Option<&'a str>,
    pub datatype: &'a str,
}

/// Decoded job record (JOB_INFO_1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawJobInfo {
    pub job_id: u32,
    pub printer_name: Option<String>,
    pub machine_name: Option<String>,
    pub user_name: Option<String>,
    pub document: Option<String>,
    pub datatype: Option<String>,
    /// Free-text status. Already bounded to the retrieval buffer.
    pub status_text: Option<String>,
    pub status: u32,
    pub priority: u32,
    pub position: u32,
    pub total_pages: u32,
    pub pages_printed: u32,
    pub submitted: Option<DateTime<Utc>>,
}

/// Outcome of one `get_job` round trip.
///
/// A size probe normally comes back with `return_code == 0`, the required
/// size in `bytes_needed` and an insufficient-buffer `last_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetJobReply {
    /// Raw BOOL returned by the call.
    pub return_code: u32,
    /// Buffer size the spooler needs for the record.
    pub bytes_needed: u32,
    /// Error reported when `return_code` is zero.
    pub last_error: Option<NativeError>,
    /// The record, present only when the call succeeded.
    pub info: Option<RawJobInfo>,
}

impl GetJobReply {
    pub fn succeeded(&self) -> bool {
        self.return_code != 0
    }
}

/// Handle-based access to the operating system's print spooler.
///
/// `Handle` is deliberately not `Clone`: `open_printer` hands out exactly one
/// owner and `close_printer` takes it back by value.
pub trait Spooler {
    type Handle;

    /// Human-readable platform name (e.g. "Windows winspool").
    fn platform_name(&self) -> &str;

    /// OpenPrinter.
    fn open_printer(&mut self, name: &str) -> NativeResult<Self::Handle>;

    /// StartDocPrinter. Returns the spooler job id (non-zero on success).
    fn start_doc(&mut self, handle: &Self::Handle, doc: &DocInfo<'_>) -> NativeResult<u32>;

    /// StartPagePrinter.
    fn start_page(&mut self, handle: &Self::Handle) -> NativeResult<()>;

    /// WritePrinter. Returns the byte count the spooler accepted.
    fn write(&mut self, handle: &Self::Handle, data: &[u8]) -> NativeResult<u32>;

    /// EndPagePrinter.
    fn end_page(&mut self, handle: &Self::Handle) -> NativeResult<()>;

    /// EndDocPrinter.
    fn end_doc(&mut self, handle: &Self::Handle) -> NativeResult<()>;

    /// GetJob (level 1) into `buffer`. Both success and failure come back as
    /// a reply so the caller can run the size-discovery protocol.
    fn get_job(&mut self, handle: &Self::Handle, job_id: u32, buffer: &mut [u8]) -> GetJobReply;

    /// ClosePrinter.
    fn close_printer(&mut self, handle: Self::Handle) -> NativeResult<()>;
}

/// Convert the fields of a SYSTEMTIME into a UTC timestamp.
///
/// Returns `None` for the all-zero value and for out-of-range fields.
pub fn system_time_to_utc(
    year: u16,
    month: u16,
    day: u16,
    hour: u16,
    minute: u16,
    second: u16,
    millis: u16,
) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))?
        .and_hms_milli_opt(
            u32::from(hour),
            u32::from(minute),
            u32::from(second),
            u32::from(millis),
        )
        .map(|naive| naive.and_utc())
}

/// Decode a NUL-terminated UTF-16 string that must lie inside `units`.
///
/// `offset` is in UTF-16 units from the start of `units`. Reading stops at the
/// first NUL or at the end of the slice, whichever comes first.
pub fn decode_wide_bounded(units: &[u16], offset: usize) -> Option<String> {
    let tail = units.get(offset..)?;
    let end = tail.iter().position(|&u| u == 0).unwrap_or(tail.len());
    Some(String::from_utf16_lossy(&tail[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_error_is_recognised() {
        let err = NativeError::new(ERROR_INSUFFICIENT_BUFFER, "The data area passed to a system call is too small.");
        assert!(err.is_insufficient_buffer());
        assert!(!NativeError::new(5, "Access is denied.").is_insufficient_buffer());
    }

    #[test]
    fn native_error_display_has_code() {
        let err = NativeError::new(1801, "The printer name is invalid.");
        assert_eq!(err.to_string(), "The printer name is invalid. (os error 1801)");
    }

    #[test]
    fn system_time_converts() {
        let ts = system_time_to_utc(2024, 3, 9, 14, 5, 59, 250).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-09T14:05:59.250+00:00");
    }

    #[test]
    fn zeroed_system_time_is_none() {
        assert!(system_time_to_utc(0, 0, 0, 0, 0, 0, 0).is_none());
        assert!(system_time_to_utc(2024, 13, 1, 0, 0, 0, 0).is_none());
    }

    #[test]
    fn wide_string_stops_at_nul() {
        let units: Vec<u16> = "Printing\0junk".encode_utf16().collect();
        assert_eq!(decode_wide_bounded(&units, 0).as_deref(), Some("Printing"));
    }

    #[test]
    fn wide_string_without_nul_is_bounded() {
        let units: Vec<u16> = "Offline".encode_utf16().collect();
        assert_eq!(decode_wide_bounded(&units, 3).as_deref(), Some("line"));
        assert_eq!(decode_wide_bounded(&units, 99), None);
    }
}
