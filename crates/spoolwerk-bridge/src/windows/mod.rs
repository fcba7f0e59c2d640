// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows spooler bound to winspool.drv through `windows-sys`.
//
// Every call is a thin unsafe wrapper: arguments are marshalled into
// NUL-terminated UTF-16, the BOOL result is checked, and failures pick up
// `GetLastError` with its system message.

use std::ffi::c_void;
use std::mem::size_of;
use std::ptr;

use tracing::{debug, trace};
use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, GetJobW, JOB_INFO_1W,
    OpenPrinterW, PRINTER_HANDLE, StartDocPrinterW, StartPagePrinter, WritePrinter,
};

use crate::traits::*;

/// GetJob information level carrying status text and flags.
const JOB_INFO_LEVEL: u32 = 1;

/// An open winspool printer handle.
#[derive(Debug)]
pub struct WinHandle(PRINTER_HANDLE);

// The spooler handle is a process-wide kernel object reference; winspool
// allows it to be used from any thread as long as calls are not concurrent,
// which `&mut` access on the session already guarantees.
unsafe impl Send for WinHandle {}

/// Spooler backed by winspool.drv.
#[derive(Debug, Default)]
pub struct WinSpooler;

impl WinSpooler {
    pub fn new() -> Self {
        Self
    }
}

impl Spooler for WinSpooler {
    type Handle = WinHandle;

    fn platform_name(&self) -> &str {
        "Windows winspool"
    }

    fn open_printer(&mut self, name: &str) -> NativeResult<Self::Handle> {
        let wide_name = to_wide(name);
        let mut raw: PRINTER_HANDLE = ptr::null_mut();
        // SAFETY: `wide_name` is NUL-terminated and outlives the call; `raw`
        // is a valid out-pointer; a null PRINTER_DEFAULTS requests defaults.
        let ok = unsafe { OpenPrinterW(wide_name.as_ptr(), &mut raw, ptr::null()) };
        if ok == 0 || raw.is_null() {
            return Err(last_error());
        }
        trace!(printer = name, "OpenPrinterW succeeded");
        Ok(WinHandle(raw))
    }

    fn start_doc(&mut self, handle: &Self::Handle, doc: &DocInfo<'_>) -> NativeResult<u32> {
        let mut doc_name = to_wide(doc.doc_name);
        let mut datatype = to_wide(doc.datatype);
        let mut output_file = doc.output_file.map(to_wide);
        let info = DOC_INFO_1W {
            pDocName: doc_name.as_mut_ptr(),
            pOutputFile: output_file
                .as_mut()
                .map_or(ptr::null_mut(), |file| file.as_mut_ptr()),
            pDatatype: datatype.as_mut_ptr(),
        };
        // SAFETY: every string in `info` is NUL-terminated and alive for the
        // duration of the call.
        let job_id = unsafe { StartDocPrinterW(handle.0, 1, &info) };
        if job_id == 0 {
            return Err(last_error());
        }
        Ok(job_id)
    }

    fn start_page(&mut self, handle: &Self::Handle) -> NativeResult<()> {
        // SAFETY: the handle came from OpenPrinterW and has not been closed.
        check(unsafe { StartPagePrinter(handle.0) })
    }

    fn write(&mut self, handle: &Self::Handle, data: &[u8]) -> NativeResult<u32> {
        let len = u32::try_from(data.len())
            .map_err(|_| NativeError::new(0, "write larger than 4 GiB"))?;
        let mut written: u32 = 0;
        // SAFETY: `data` is valid for `len` bytes; `written` is a valid out-pointer.
        let ok = unsafe {
            WritePrinter(handle.0, data.as_ptr() as *const c_void, len, &mut written)
        };
        if ok == 0 {
            return Err(last_error());
        }
        debug!(requested = len, written, "WritePrinter returned");
        Ok(written)
    }

    fn end_page(&mut self, handle: &Self::Handle) -> NativeResult<()> {
        // SAFETY: see `start_page`.
        check(unsafe { EndPagePrinter(handle.0) })
    }

    fn end_doc(&mut self, handle: &Self::Handle) -> NativeResult<()> {
        // SAFETY: see `start_page`.
        check(unsafe { EndDocPrinter(handle.0) })
    }

    fn get_job(&mut self, handle: &Self::Handle, job_id: u32, buffer: &mut [u8]) -> GetJobReply {
        let len = u32::try_from(buffer.len()).unwrap_or(u32::MAX);
        let out = if buffer.is_empty() {
            ptr::null_mut()
        } else {
            buffer.as_mut_ptr()
        };
        let mut needed: u32 = 0;
        // SAFETY: `out` is either null with a zero length or valid for `len`
        // bytes; `needed` is a valid out-pointer.
        let ok = unsafe { GetJobW(handle.0, job_id, JOB_INFO_LEVEL, out, len, &mut needed) };
        if ok == 0 {
            return GetJobReply {
                return_code: 0,
                bytes_needed: needed,
                last_error: Some(last_error()),
                info: None,
            };
        }
        GetJobReply {
            return_code: ok as u32,
            bytes_needed: needed,
            last_error: None,
            info: decode_job_info(buffer),
        }
    }

    fn close_printer(&mut self, handle: Self::Handle) -> NativeResult<()> {
        // SAFETY: the handle is consumed, so it cannot be used after this call.
        check(unsafe { ClosePrinter(handle.0) })
    }
}

/// Decode a JOB_INFO_1W written at the start of `buffer`.
///
/// String pointers are only followed when they land inside `buffer`, and the
/// text is cut at the end of the buffer if the spooler left it unterminated.
fn decode_job_info(buffer: &[u8]) -> Option<RawJobInfo> {
    if buffer.len() < size_of::<JOB_INFO_1W>() {
        return None;
    }
    // SAFETY: the buffer holds at least one JOB_INFO_1W; the read is unaligned-safe.
    let info: JOB_INFO_1W = unsafe { ptr::read_unaligned(buffer.as_ptr() as *const JOB_INFO_1W) };

    let units: Vec<u16> = buffer
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect();
    let base = buffer.as_ptr() as usize;
    let string_at = |p: *mut u16| -> Option<String> {
        if p.is_null() {
            return None;
        }
        let offset = (p as usize).checked_sub(base)?;
        if offset % 2 != 0 {
            return None;
        }
        decode_wide_bounded(&units, offset / 2)
    };

    let submitted = &info.Submitted;
    Some(RawJobInfo {
        job_id: info.JobId,
        printer_name: string_at(info.pPrinterName),
        machine_name: string_at(info.pMachineName),
        user_name: string_at(info.pUserName),
        document: string_at(info.pDocument),
        datatype: string_at(info.pDatatype),
        status_text: string_at(info.pStatus),
        status: info.Status,
        priority: info.Priority,
        position: info.Position,
        total_pages: info.TotalPages,
        pages_printed: info.PagesPrinted,
        submitted: system_time_to_utc(
            submitted.wYear,
            submitted.wMonth,
            submitted.wDay,
            submitted.wHour,
            submitted.wMinute,
            submitted.wSecond,
            submitted.wMilliseconds,
        ),
    })
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn check(ok: i32) -> NativeResult<()> {
    if ok == 0 { Err(last_error()) } else { Ok(()) }
}

fn last_error() -> NativeError {
    // SAFETY: GetLastError has no preconditions.
    let code = unsafe { GetLastError() };
    let text = std::io::Error::from_raw_os_error(code as i32).to_string();
    let suffix = format!(" (os error {code})");
    let message = text.strip_suffix(&suffix).unwrap_or(&text).to_owned();
    NativeError::new(code, message)
}
