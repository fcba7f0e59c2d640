// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted spooler double for session and job tests.

use std::sync::{Arc, Mutex};

use spoolwerk_bridge::{
    DocInfo, ERROR_INSUFFICIENT_BUFFER, GetJobReply, NativeError, NativeResult, RawJobInfo,
    Spooler,
};

/// One native call observed by the double.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    StartDoc { name: String, datatype: String },
    StartPage,
    Write(usize),
    EndPage,
    EndDoc,
    GetJob { job_id: u32, buffer_len: usize },
    Close,
}

/// What the double should answer.
#[derive(Debug, Clone)]
pub struct Script {
    pub printers: Vec<String>,
    pub job_id: u32,
    pub fail_start_doc: bool,
    pub fail_start_page: bool,
    pub fail_write: bool,
    /// Report this many bytes written instead of the full length.
    pub accept_bytes: Option<u32>,
    pub fail_end_page: bool,
    pub fail_end_doc: bool,
    pub fail_close: bool,
    pub status_size: u32,
    pub status_flags: u32,
    pub status_text: Option<String>,
    pub fail_probe: bool,
    pub fail_fetch: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            printers: vec!["Valid-Printer".into()],
            job_id: 7,
            fail_start_doc: false,
            fail_start_page: false,
            fail_write: false,
            accept_bytes: None,
            fail_end_page: false,
            fail_end_doc: false,
            fail_close: false,
            status_size: 128,
            status_flags: 0,
            status_text: None,
            fail_probe: false,
            fail_fetch: false,
        }
    }
}

/// Shared view of the calls a `ScriptedSpooler` received.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().expect("call log poisoned").clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn push(&self, call: Call) {
        self.0.lock().expect("call log poisoned").push(call);
    }
}

#[derive(Debug)]
pub struct ScriptedHandle(#[allow(dead_code)] u32);

#[derive(Debug, Default)]
pub struct ScriptedSpooler {
    script: Script,
    log: CallLog,
    next_handle: u32,
}

impl ScriptedSpooler {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            log: CallLog::default(),
            next_handle: 1,
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

fn refused(what: &str) -> NativeError {
    NativeError::new(31, format!("{what}: A device attached to the system is not functioning."))
}

impl Spooler for ScriptedSpooler {
    type Handle = ScriptedHandle;

    fn platform_name(&self) -> &str {
        "scripted"
    }

    fn open_printer(&mut self, name: &str) -> NativeResult<Self::Handle> {
        self.log.push(Call::Open(name.to_owned()));
        if !self.script.printers.iter().any(|p| p == name) {
            return Err(NativeError::new(1801, "The printer name is invalid."));
        }
        self.next_handle += 1;
        Ok(ScriptedHandle(self.next_handle))
    }

    fn start_doc(&mut self, _handle: &Self::Handle, doc: &DocInfo<'_>) -> NativeResult<u32> {
        self.log.push(Call::StartDoc {
            name: doc.doc_name.to_owned(),
            datatype: doc.datatype.to_owned(),
        });
        if self.script.fail_start_doc {
            return Err(refused("StartDocPrinter"));
        }
        Ok(self.script.job_id)
    }

    fn start_page(&mut self, _handle: &Self::Handle) -> NativeResult<()> {
        self.log.push(Call::StartPage);
        if self.script.fail_start_page {
            return Err(refused("StartPagePrinter"));
        }
        Ok(())
    }

    fn write(&mut self, _handle: &Self::Handle, data: &[u8]) -> NativeResult<u32> {
        self.log.push(Call::Write(data.len()));
        if self.script.fail_write {
            return Err(refused("WritePrinter"));
        }
        Ok(self.script.accept_bytes.unwrap_or(data.len() as u32))
    }

    fn end_page(&mut self, _handle: &Self::Handle) -> NativeResult<()> {
        self.log.push(Call::EndPage);
        if self.script.fail_end_page {
            return Err(refused("EndPagePrinter"));
        }
        Ok(())
    }

    fn end_doc(&mut self, _handle: &Self::Handle) -> NativeResult<()> {
        self.log.push(Call::EndDoc);
        if self.script.fail_end_doc {
            return Err(refused("EndDocPrinter"));
        }
        Ok(())
    }

    fn get_job(&mut self, _handle: &Self::Handle, job_id: u32, buffer: &mut [u8]) -> GetJobReply {
        self.log.push(Call::GetJob {
            job_id,
            buffer_len: buffer.len(),
        });
        let size = self.script.status_size;
        if buffer.len() < size as usize {
            let last_error = if self.script.fail_probe {
                NativeError::new(87, "The parameter is incorrect.")
            } else {
                NativeError::new(
                    ERROR_INSUFFICIENT_BUFFER,
                    "The data area passed to a system call is too small.",
                )
            };
            return GetJobReply {
                return_code: 0,
                bytes_needed: if self.script.fail_probe { 0 } else { size },
                last_error: Some(last_error),
                info: None,
            };
        }
        if self.script.fail_fetch {
            return GetJobReply {
                return_code: 0,
                bytes_needed: size,
                last_error: Some(NativeError::new(5, "Access is denied.")),
                info: None,
            };
        }
        GetJobReply {
            return_code: 1,
            bytes_needed: size,
            last_error: None,
            info: Some(RawJobInfo {
                job_id,
                printer_name: Some("Valid-Printer".into()),
                document: Some("Report".into()),
                datatype: Some("RAW".into()),
                status_text: self.script.status_text.clone(),
                status: self.script.status_flags,
                total_pages: 1,
                pages_printed: 1,
                ..RawJobInfo::default()
            }),
        }
    }

    fn close_printer(&mut self, _handle: Self::Handle) -> NativeResult<()> {
        self.log.push(Call::Close);
        if self.script.fail_close {
            return Err(NativeError::new(6, "The handle is invalid."));
        }
        Ok(())
    }
}
