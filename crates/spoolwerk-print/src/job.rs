// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A print job: one data source sent through one document transaction.
//
// Execution is strictly ordered (document, page, read, write, end page, end
// document) and every transaction that was started is ended again, whatever
// failed in between. The first failure is the job's outcome; anything that
// fails afterwards during cleanup is logged and kept alongside it.

use std::io;
use std::path::{Path, PathBuf};

use spoolwerk_bridge::Spooler;
use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::types::JobId;
use tracing::{info, instrument, warn};

use crate::session::PrinterSession;

/// Supplies the full content of a document, addressed by path.
pub trait DocumentSource {
    fn read_document(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads documents from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl DocumentSource for FileSource {
    fn read_document(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// One document to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    source: PathBuf,
    title: String,
    output_file: Option<String>,
}

/// What happened when a job ran.
#[derive(Debug)]
pub struct JobReport {
    /// Spooler job id; valid for status queries even if the job failed.
    pub job_id: JobId,
    /// Bytes the spooler accepted.
    pub bytes_written: usize,
    /// First failure after the document started, if any.
    pub error: Option<SpoolError>,
    /// Failures that happened after `error`, during cleanup.
    pub cleanup_errors: Vec<SpoolError>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The job id on success, the primary failure otherwise.
    pub fn into_result(self) -> Result<JobId> {
        match self.error {
            None => Ok(self.job_id),
            Some(err) => Err(err),
        }
    }
}

impl PrintJob {
    pub fn new(source: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            output_file: None,
        }
    }

    /// A job titled after its own path.
    pub fn from_path(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let title = source.display().to_string();
        Self {
            source,
            title,
            output_file: None,
        }
    }

    /// Have the spooler write the job to `path` instead of the printer port.
    pub fn with_output_file(mut self, path: impl Into<String>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Run the job, reading the source from disk.
    pub fn execute<S: Spooler>(&self, session: &mut PrinterSession<S>) -> Result<JobReport> {
        self.execute_with(session, &FileSource)
    }

    /// Run the job against `session` with content from `reader`.
    ///
    /// Returns `Err` only when the document could not be started; every later
    /// failure is reported in the `JobReport` together with the job id.
    #[instrument(skip_all, fields(printer = %session.printer_name(), source = %self.source.display()))]
    pub fn execute_with<S: Spooler>(
        &self,
        session: &mut PrinterSession<S>,
        reader: &dyn DocumentSource,
    ) -> Result<JobReport> {
        let job_id = session.begin_document_with(&self.title, self.output_file.as_deref())?;
        let mut failures = Failures::default();
        let mut bytes_written = 0;

        match session.begin_page() {
            Ok(()) => {
                match self.read_source(reader) {
                    Ok(bytes) => match session.write_data(&bytes) {
                        Ok(n) => bytes_written = n,
                        Err(e) => failures.record("write", e),
                    },
                    Err(e) => failures.record("read source", e),
                }
                if let Err(e) = session.end_page() {
                    failures.record("end page", e);
                }
            }
            Err(e) => failures.record("begin page", e),
        }

        if let Err(e) = session.end_document() {
            failures.record("end document", e);
        }

        match &failures.first {
            None => info!(%job_id, bytes_written, "job spooled"),
            Some(e) => warn!(%job_id, error = %e, "job failed"),
        }
        Ok(JobReport {
            job_id,
            bytes_written,
            error: failures.first,
            cleanup_errors: failures.later,
        })
    }

    fn read_source(&self, reader: &dyn DocumentSource) -> Result<Vec<u8>> {
        let bytes = reader
            .read_document(&self.source)
            .map_err(|source| SpoolError::SourceReadFailed {
                path: self.source.clone(),
                source,
            })?;
        if bytes.is_empty() {
            return Err(SpoolError::SourceReadFailed {
                path: self.source.clone(),
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "document is empty"),
            });
        }
        Ok(bytes)
    }
}

/// First-error-wins collector.
#[derive(Default)]
struct Failures {
    first: Option<SpoolError>,
    later: Vec<SpoolError>,
}

impl Failures {
    fn record(&mut self, step: &str, err: SpoolError) {
        if self.first.is_none() {
            warn!(step, error = %err, "job step failed");
            self.first = Some(err);
        } else {
            warn!(step, error = %err, "cleanup failed after an earlier error");
            self.later.push(err);
        }
    }
}
