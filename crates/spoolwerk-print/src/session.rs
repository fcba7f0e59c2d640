// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer session: one owned spooler handle plus the document/page state
// machine layered on top of it.
//
// Preconditions are checked before any native call is made, so a misuse never
// reaches the spooler. Native failures are translated into the matching
// `SpoolError` variant with the spooler's own message.

use spoolwerk_bridge::{DocInfo, NativeError, RawJobInfo, Spooler};
use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::status;
use spoolwerk_core::types::{JobId, JobStatusSnapshot, RAW_DATATYPE, StatusFlags};
use tracing::{debug, info, instrument, warn};

/// Default maximum length, in characters, of a job's status text.
pub const DEFAULT_STATUS_TEXT_LIMIT: usize = 256;

/// Transaction nesting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transaction {
    Idle,
    Document(JobId),
    Page(JobId),
}

impl Transaction {
    fn job(&self) -> Option<JobId> {
        match *self {
            Transaction::Idle => None,
            Transaction::Document(job) | Transaction::Page(job) => Some(job),
        }
    }
}

/// An open connection to one named printer through the OS spooler.
///
/// The native handle never leaves the session. Dropping an open session
/// ends any open page and document and closes the handle, logging a warning;
/// call [`PrinterSession::close`] to observe close failures.
pub struct PrinterSession<S: Spooler> {
    spooler: S,
    handle: Option<S::Handle>,
    printer_name: String,
    transaction: Transaction,
    status_text_limit: usize,
}

impl<S: Spooler> std::fmt::Debug for PrinterSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterSession")
            .field("printer_name", &self.printer_name)
            .field("open", &self.handle.is_some())
            .field("transaction", &self.transaction)
            .finish()
    }
}

impl<S: Spooler> PrinterSession<S> {
    /// Open `name` on `spooler`.
    ///
    /// Fails with `PrinterUnavailable` if the spooler cannot open the printer;
    /// no session exists in that case.
    #[instrument(skip(spooler, name), fields(printer = %name.as_ref()))]
    pub fn open(mut spooler: S, name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(SpoolError::usage("printer name must not be empty"));
        }
        info!(platform = spooler.platform_name(), "opening printer");
        let handle = spooler
            .open_printer(name)
            .map_err(|e| SpoolError::PrinterUnavailable(format!("{name}: {e}")))?;
        Ok(Self {
            spooler,
            handle: Some(handle),
            printer_name: name.to_owned(),
            transaction: Transaction::Idle,
            status_text_limit: DEFAULT_STATUS_TEXT_LIMIT,
        })
    }

    /// Cap the status text kept in snapshots at `limit` characters.
    pub fn with_status_text_limit(mut self, limit: usize) -> Self {
        self.status_text_limit = limit;
        self
    }

    pub fn printer_name(&self) -> &str {
        &self.printer_name
    }

    pub fn platform_name(&self) -> &str {
        self.spooler.platform_name()
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Job id of the open document transaction, if any.
    pub fn active_job(&self) -> Option<JobId> {
        self.transaction.job()
    }

    pub fn page_open(&self) -> bool {
        matches!(self.transaction, Transaction::Page(_))
    }

    // -- Document transaction ------------------------------------------------

    /// Start a RAW document titled `title` and return the spooler's job id.
    pub fn begin_document(&mut self, title: &str) -> Result<JobId> {
        self.begin_document_with(title, None)
    }

    /// Start a RAW document, optionally redirecting spooler output to a file.
    #[instrument(skip(self), fields(printer = %self.printer_name))]
    pub fn begin_document_with(&mut self, title: &str, output_file: Option<&str>) -> Result<JobId> {
        let handle = require_open(&self.handle, "begin_document")?;
        if let Some(job) = self.transaction.job() {
            return Err(SpoolError::usage(format!(
                "document for job {job} is still open"
            )));
        }
        if title.is_empty() {
            return Err(SpoolError::usage("document title must not be empty"));
        }

        let doc = DocInfo {
            doc_name: title,
            output_file,
            datatype: RAW_DATATYPE,
        };
        let raw = self
            .spooler
            .start_doc(handle, &doc)
            .map_err(|e| SpoolError::DocumentStartFailed(e.to_string()))?;
        let job_id = JobId::new(raw).ok_or_else(|| {
            SpoolError::DocumentStartFailed("spooler returned job id 0".into())
        })?;

        self.transaction = Transaction::Document(job_id);
        info!(%job_id, "document started");
        Ok(job_id)
    }

    /// End the open document. The document counts as closed afterwards even
    /// if the spooler reports a failure.
    #[instrument(skip(self), fields(printer = %self.printer_name))]
    pub fn end_document(&mut self) -> Result<()> {
        let handle = require_open(&self.handle, "end_document")?;
        let job_id = match self.transaction {
            Transaction::Idle => return Err(SpoolError::usage("no document is open")),
            Transaction::Page(job) => {
                return Err(SpoolError::usage(format!(
                    "page of job {job} is still open; end the page first"
                )));
            }
            Transaction::Document(job) => job,
        };

        let result = self.spooler.end_doc(handle);
        self.transaction = Transaction::Idle;
        result.map_err(|e| SpoolError::DocumentEndFailed(e.to_string()))?;
        info!(%job_id, "document ended");
        Ok(())
    }

    // -- Page transaction ----------------------------------------------------

    #[instrument(skip(self), fields(printer = %self.printer_name))]
    pub fn begin_page(&mut self) -> Result<()> {
        let handle = require_open(&self.handle, "begin_page")?;
        let job_id = match self.transaction {
            Transaction::Idle => return Err(SpoolError::usage("no document is open")),
            Transaction::Page(_) => return Err(SpoolError::usage("a page is already open")),
            Transaction::Document(job) => job,
        };

        self.spooler
            .start_page(handle)
            .map_err(|e| SpoolError::PageStartFailed(e.to_string()))?;
        self.transaction = Transaction::Page(job_id);
        debug!(%job_id, "page started");
        Ok(())
    }

    /// End the open page. The page counts as closed afterwards even if the
    /// spooler reports a failure, so the document can still be ended.
    #[instrument(skip(self), fields(printer = %self.printer_name))]
    pub fn end_page(&mut self) -> Result<()> {
        let handle = require_open(&self.handle, "end_page")?;
        let Transaction::Page(job_id) = self.transaction else {
            return Err(SpoolError::usage("no page is open"));
        };

        let result = self.spooler.end_page(handle);
        self.transaction = Transaction::Document(job_id);
        result.map_err(|e| SpoolError::PageEndFailed(e.to_string()))?;
        debug!(%job_id, "page ended");
        Ok(())
    }

    /// Send `bytes` to the printer in one transfer.
    ///
    /// Returns the number of bytes the spooler accepted, which is always the
    /// full length; a short count is reported as `WriteFailed`.
    #[instrument(skip(self, bytes), fields(printer = %self.printer_name, len = bytes.len()))]
    pub fn write_data(&mut self, bytes: &[u8]) -> Result<usize> {
        let handle = require_open(&self.handle, "write_data")?;
        if !matches!(self.transaction, Transaction::Page(_)) {
            return Err(SpoolError::usage("no page is open"));
        }
        if bytes.is_empty() {
            return Err(SpoolError::usage("nothing to write"));
        }
        if u32::try_from(bytes.len()).is_err() {
            return Err(SpoolError::usage(format!(
                "{} bytes exceed the spooler's single-write limit",
                bytes.len()
            )));
        }

        let written = self
            .spooler
            .write(handle, bytes)
            .map_err(|e| SpoolError::WriteFailed(e.to_string()))?;
        debug!(written, "bytes accepted by spooler");
        if written as usize != bytes.len() {
            return Err(SpoolError::WriteFailed(format!(
                "spooler accepted {written} of {} bytes",
                bytes.len()
            )));
        }
        Ok(bytes.len())
    }

    // -- Status --------------------------------------------------------------

    /// Fetch a fresh status snapshot for `job_id`.
    ///
    /// The status record is variable-length: a first call with an empty
    /// buffer learns its size, a second call with a buffer of exactly that
    /// size retrieves it.
    #[instrument(skip(self), fields(printer = %self.printer_name))]
    pub fn query_job_status(&mut self, job_id: JobId) -> Result<JobStatusSnapshot> {
        let handle = require_open(&self.handle, "query_job_status")?;

        let probe = self.spooler.get_job(handle, job_id.get(), &mut []);
        if !probe.succeeded() {
            match &probe.last_error {
                Some(e) if e.is_insufficient_buffer() => {}
                Some(e) => {
                    return Err(SpoolError::StatusQueryFailed(format!("size probe: {e}")));
                }
                None => {
                    return Err(SpoolError::StatusQueryFailed(
                        "size probe failed without an error code".into(),
                    ));
                }
            }
        }
        let size = probe.bytes_needed as usize;
        if size == 0 {
            return Err(SpoolError::StatusQueryFailed(
                "spooler reported an empty status record".into(),
            ));
        }
        debug!(size, "status record size discovered");

        let mut buffer = vec![0u8; size];
        let reply = self.spooler.get_job(handle, job_id.get(), &mut buffer);
        if !reply.succeeded() {
            let detail = reply
                .last_error
                .as_ref()
                .map_or_else(|| "no error code".to_owned(), NativeError::to_string);
            return Err(SpoolError::StatusQueryFailed(detail));
        }
        let record = reply.info.ok_or_else(|| {
            SpoolError::StatusQueryFailed("spooler returned no status record".into())
        })?;

        let last_error_message = reply.last_error.or(probe.last_error).map(|e| e.message);
        let snapshot = build_snapshot(
            job_id,
            reply.return_code,
            last_error_message,
            record,
            self.status_text_limit,
        );
        info!(flags = %snapshot.status_flags, "job status retrieved");
        Ok(snapshot)
    }

    // -- Teardown ------------------------------------------------------------

    /// Release the printer handle. Must be called exactly once, with no
    /// document open.
    #[instrument(skip(self), fields(printer = %self.printer_name))]
    pub fn close(&mut self) -> Result<()> {
        if let Some(job) = self.transaction.job() {
            return Err(SpoolError::usage(format!(
                "document for job {job} is still open; end it before closing"
            )));
        }
        let Some(handle) = self.handle.take() else {
            return Err(SpoolError::usage("session is already closed"));
        };

        self.spooler
            .close_printer(handle)
            .map_err(|e| SpoolError::SessionCloseFailed(e.to_string()))?;
        info!("printer closed");
        Ok(())
    }
}

impl<S: Spooler> Drop for PrinterSession<S> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        warn!(
            printer = %self.printer_name,
            transaction = ?self.transaction,
            "printer session dropped while open, unwinding"
        );
        if matches!(self.transaction, Transaction::Page(_)) {
            if let Err(e) = self.spooler.end_page(&handle) {
                warn!(error = %e, "end page during unwind failed");
            }
        }
        if self.transaction.job().is_some() {
            if let Err(e) = self.spooler.end_doc(&handle) {
                warn!(error = %e, "end document during unwind failed");
            }
        }
        self.transaction = Transaction::Idle;
        if let Err(e) = self.spooler.close_printer(handle) {
            warn!(error = %e, "close during unwind failed");
        }
    }
}

fn require_open<'a, H>(handle: &'a Option<H>, operation: &str) -> Result<&'a H> {
    handle
        .as_ref()
        .ok_or_else(|| SpoolError::usage(format!("{operation} on a closed session")))
}

fn build_snapshot(
    job_id: JobId,
    return_code: u32,
    last_error_message: Option<String>,
    record: RawJobInfo,
    text_limit: usize,
) -> JobStatusSnapshot {
    let conditions = status::describe(record.status)
        .into_iter()
        .map(str::to_owned)
        .collect();
    JobStatusSnapshot {
        job_id,
        return_code,
        last_error_message,
        status_text: record
            .status_text
            .as_deref()
            .and_then(|text| bound_text(text, text_limit)),
        status_flags: StatusFlags(record.status),
        conditions,
        document: record.document,
        datatype: record.datatype,
        printer_name: record.printer_name,
        machine_name: record.machine_name,
        user_name: record.user_name,
        priority: record.priority,
        position: record.position,
        total_pages: record.total_pages,
        pages_printed: record.pages_printed,
        submitted: record.submitted,
    }
}

/// Strip control characters, trim, and cap at `limit` characters.
fn bound_text(text: &str, limit: usize) -> Option<String> {
    let cleaned: String = text.chars().filter(|c| !c.is_control()).collect();
    let bounded: String = cleaned.trim().chars().take(limit).collect();
    (!bounded.is_empty()).then_some(bounded)
}
