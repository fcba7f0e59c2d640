// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk: send a file's bytes to a printer through the OS print spooler.
//
// Entry point. Initialises logging, resolves settings from flags and the
// optional config file, runs one print job, reports its status and closes the
// printer.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use spoolwerk_bridge::{Spooler, platform_spooler};
use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::human_errors::{Severity, humanize_error};
use spoolwerk_core::types::JobStatusSnapshot;
use spoolwerk_core::SpoolConfig;
use spoolwerk_print::{JobReport, PrintJob, PrinterSession};
use tracing::{info, warn};

/// Command-line flags.
#[derive(Debug, Parser)]
#[command(
    name = "spoolwerk",
    version,
    about = "Send a file to a printer as a RAW spooler job"
)]
struct Args {
    /// Printer queue name (overrides `printer_name` in the config file).
    #[arg(short, long)]
    printer: Option<String>,

    /// File whose bytes are sent to the printer unchanged.
    #[arg(short, long)]
    file: PathBuf,

    /// Document title shown in the print queue. Defaults to the file path.
    #[arg(short, long)]
    title: Option<String>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Have the spooler write the job to this file instead of the printer port.
    #[arg(long)]
    output_file: Option<String>,

    /// Skip the job status query after printing.
    #[arg(long)]
    no_status: bool,

    /// Print the job status as JSON.
    #[arg(long)]
    json: bool,
}

/// Effective settings after merging flags over the config file.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
    printer: String,
    title: String,
    query_status: bool,
    status_text_limit: usize,
}

impl Settings {
    fn resolve(args: &Args, config: &SpoolConfig) -> Result<Self> {
        let printer = args
            .printer
            .clone()
            .or_else(|| config.printer_name.clone())
            .ok_or_else(|| {
                SpoolError::Config(
                    "no printer given; pass --printer or set printer_name in the config file".into(),
                )
            })?;
        let title = args
            .title
            .clone()
            .or_else(|| config.default_title.clone())
            .unwrap_or_else(|| args.file.display().to_string());
        Ok(Self {
            printer,
            title,
            query_status: config.query_status && !args.no_status,
            status_text_limit: config.status_text_limit,
        })
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match SpoolConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&SpoolConfig::default().log_filter);
            report_error(&e);
            return ExitCode::from(2);
        }
    };
    init_logging(&config.log_filter);
    info!("Spoolwerk starting");

    match run(&args, &config) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            if let Some(e) = &report.error {
                report_error(e);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(fallback_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_filter)),
        )
        .init();
}

fn run(args: &Args, config: &SpoolConfig) -> Result<JobReport> {
    let settings = Settings::resolve(args, config)?;
    let session = PrinterSession::open(platform_spooler(), &settings.printer)?
        .with_status_text_limit(settings.status_text_limit);
    let mut job = PrintJob::new(&args.file, &settings.title);
    if let Some(path) = &args.output_file {
        job = job.with_output_file(path);
    }
    print_with(session, &job, &settings, args.json)
}

/// Run `job`, query its status if asked, and close the session.
///
/// A job that failed after the spooler assigned an id is still queried, so
/// the user can see what the spooler made of it.
fn print_with<S: Spooler>(
    mut session: PrinterSession<S>,
    job: &PrintJob,
    settings: &Settings,
    json: bool,
) -> Result<JobReport> {
    let report = match job.execute(&mut session) {
        Ok(report) => report,
        Err(e) => {
            if let Err(close_err) = session.close() {
                warn!(error = %close_err, "close after failed job start");
            }
            return Err(e);
        }
    };
    println!(
        "job {} on {}: {} bytes sent",
        report.job_id,
        session.printer_name(),
        report.bytes_written
    );

    if settings.query_status {
        match session.query_job_status(report.job_id) {
            Ok(snapshot) => {
                if let Err(e) = print_status(&snapshot, json) {
                    warn!(error = %e, "could not encode job status");
                }
            }
            Err(e) => warn!(error = %e, "status query failed"),
        }
    }

    match session.close() {
        Ok(()) => Ok(report),
        Err(e) if report.is_success() => Err(e),
        Err(e) => {
            warn!(error = %e, "close failed after an earlier error");
            Ok(report)
        }
    }
}

fn print_status(snapshot: &JobStatusSnapshot, json: bool) -> serde_json::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    println!("  return code: {}", snapshot.return_code);
    if let Some(msg) = &snapshot.last_error_message {
        println!("  last error:  {msg}");
    }
    if let Some(text) = &snapshot.status_text {
        println!("  status:      {text}");
    }
    println!("  flags:       {}", snapshot.status_flags);
    for condition in &snapshot.conditions {
        println!("    - {condition}");
    }
    println!(
        "  pages:       {}/{}",
        snapshot.pages_printed, snapshot.total_pages
    );
    Ok(())
}

fn report_error(err: &SpoolError) {
    for line in error_lines(err) {
        eprintln!("{line}");
    }
}

fn error_lines(err: &SpoolError) -> Vec<String> {
    let human = humanize_error(err);
    let mut lines = vec![
        format!("error [{}]: {err}", err.kind()),
        format!("  {}", human.message),
        format!("  {}", human.suggestion),
    ];
    match (human.retriable, human.severity) {
        (true, _) => lines.push("  This is usually temporary; try again later.".into()),
        (false, Severity::Permanent) => {
            lines.push("  Running the same command again will not help.".into())
        }
        (false, _) => {}
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use clap::CommandFactory;

    use super::*;
    use spoolwerk_bridge::{
        DocInfo, ERROR_INSUFFICIENT_BUFFER, GetJobReply, NativeError, NativeResult, RawJobInfo,
    };
    use spoolwerk_core::error::ErrorKind;
    use spoolwerk_core::types::StatusFlags;

    const RECORD_SIZE: u32 = 64;

    /// Spooler that accepts every call except the ones it is told to refuse.
    #[derive(Default)]
    struct FlakySpooler {
        fail_write: bool,
        fail_close: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl FlakySpooler {
        fn record(&self, call: impl Into<String>) {
            self.log.lock().unwrap().push(call.into());
        }

        fn refused(call: &str) -> NativeError {
            NativeError::new(
                31,
                format!("{call}: A device attached to the system is not functioning."),
            )
        }
    }

    impl Spooler for FlakySpooler {
        type Handle = ();

        fn platform_name(&self) -> &str {
            "flaky"
        }

        fn open_printer(&mut self, _name: &str) -> NativeResult<()> {
            self.record("open");
            Ok(())
        }

        fn start_doc(&mut self, _handle: &(), _doc: &DocInfo<'_>) -> NativeResult<u32> {
            self.record("start_doc");
            Ok(42)
        }

        fn start_page(&mut self, _handle: &()) -> NativeResult<()> {
            self.record("start_page");
            Ok(())
        }

        fn write(&mut self, _handle: &(), data: &[u8]) -> NativeResult<u32> {
            self.record("write");
            if self.fail_write {
                return Err(Self::refused("WritePrinter"));
            }
            Ok(data.len() as u32)
        }

        fn end_page(&mut self, _handle: &()) -> NativeResult<()> {
            self.record("end_page");
            Ok(())
        }

        fn end_doc(&mut self, _handle: &()) -> NativeResult<()> {
            self.record("end_doc");
            Ok(())
        }

        fn get_job(&mut self, _handle: &(), job_id: u32, buffer: &mut [u8]) -> GetJobReply {
            self.record(format!("get_job {}", buffer.len()));
            if buffer.len() < RECORD_SIZE as usize {
                return GetJobReply {
                    return_code: 0,
                    bytes_needed: RECORD_SIZE,
                    last_error: Some(NativeError::new(
                        ERROR_INSUFFICIENT_BUFFER,
                        "The data area passed to a system call is too small.",
                    )),
                    info: None,
                };
            }
            GetJobReply {
                return_code: 1,
                bytes_needed: RECORD_SIZE,
                last_error: None,
                info: Some(RawJobInfo {
                    job_id,
                    status: StatusFlags::ERROR,
                    ..RawJobInfo::default()
                }),
            }
        }

        fn close_printer(&mut self, _handle: ()) -> NativeResult<()> {
            self.record("close");
            if self.fail_close {
                return Err(NativeError::new(6, "The handle is invalid."));
            }
            Ok(())
        }
    }

    fn settings(query_status: bool) -> Settings {
        Settings {
            printer: "Valid-Printer".into(),
            title: "Cells".into(),
            query_status,
            status_text_limit: 256,
        }
    }

    /// Run a one-file job through `print_with` and return its outcome and call log.
    fn print_cells(spooler: FlakySpooler, query_status: bool) -> (Result<JobReport>, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cells.ps");
        std::fs::write(&file, b"%!PS\nshowpage\n").unwrap();

        let log = Arc::clone(&spooler.log);
        let session = PrinterSession::open(spooler, "Valid-Printer").unwrap();
        let job = PrintJob::new(&file, "Cells");
        let outcome = print_with(session, &job, &settings(query_status), false);
        let calls = log.lock().unwrap().clone();
        (outcome, calls)
    }

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn file_is_required() {
        assert!(Args::try_parse_from(["spoolwerk", "--printer", "P"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&["spoolwerk", "-p", "EPSON BA-T500 Receipt", "-f", "cells.ps", "-t", "Cells"]);
        let config = SpoolConfig {
            printer_name: Some("Microsoft XPS Document Writer".into()),
            default_title: Some("Default".into()),
            ..SpoolConfig::default()
        };
        let settings = Settings::resolve(&args, &config).unwrap();
        assert_eq!(settings.printer, "EPSON BA-T500 Receipt");
        assert_eq!(settings.title, "Cells");
        assert!(settings.query_status);
    }

    #[test]
    fn config_fills_missing_flags() {
        let args = parse(&["spoolwerk", "--file", "cells.ps", "--no-status"]);
        let config = SpoolConfig {
            printer_name: Some("Foxit Reader PDF Printer".into()),
            status_text_limit: 64,
            ..SpoolConfig::default()
        };
        let settings = Settings::resolve(&args, &config).unwrap();
        assert_eq!(settings.printer, "Foxit Reader PDF Printer");
        assert_eq!(settings.title, "cells.ps");
        assert!(!settings.query_status);
        assert_eq!(settings.status_text_limit, 64);
    }

    #[test]
    fn missing_printer_is_a_config_error() {
        let args = parse(&["spoolwerk", "--file", "cells.ps"]);
        let err = Settings::resolve(&args, &SpoolConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn without_a_spooler_the_printer_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cells.ps");
        std::fs::write(&file, b"%!PS\nshowpage\n").unwrap();
        let file = file.display().to_string();

        let args = parse(&["spoolwerk", "-p", "Valid-Printer", "-f", &file]);
        let err = run(&args, &SpoolConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PrinterUnavailable);
    }

    #[test]
    fn failed_job_is_still_queried_before_close() {
        let spooler = FlakySpooler {
            fail_write: true,
            ..FlakySpooler::default()
        };
        let (outcome, calls) = print_cells(spooler, true);

        let report = outcome.unwrap();
        assert_eq!(report.job_id.get(), 42);
        assert_eq!(report.error.as_ref().map(SpoolError::kind), Some(ErrorKind::WriteFailed));
        assert_eq!(
            calls[calls.len() - 4..],
            ["end_doc", "get_job 0", "get_job 64", "close"]
        );
    }

    #[test]
    fn close_failure_after_failed_job_keeps_first_error() {
        let spooler = FlakySpooler {
            fail_write: true,
            fail_close: true,
            ..FlakySpooler::default()
        };
        let (outcome, calls) = print_cells(spooler, true);

        let report = outcome.unwrap();
        assert_eq!(report.error.as_ref().map(SpoolError::kind), Some(ErrorKind::WriteFailed));
        assert_eq!(calls.last().map(String::as_str), Some("close"));
    }

    #[test]
    fn close_failure_after_successful_job_is_the_error() {
        let spooler = FlakySpooler {
            fail_close: true,
            ..FlakySpooler::default()
        };
        let (outcome, _calls) = print_cells(spooler, true);

        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::SessionCloseFailed);
    }

    #[test]
    fn status_query_can_be_skipped() {
        let (outcome, calls) = print_cells(FlakySpooler::default(), false);

        assert!(outcome.unwrap().is_success());
        assert!(!calls.iter().any(|c| c.starts_with("get_job")));
        assert_eq!(calls.last().map(String::as_str), Some("close"));
    }

    #[test]
    fn transient_errors_suggest_retrying() {
        let lines = error_lines(&SpoolError::WriteFailed("spooler accepted 0 of 14 bytes".into()));
        assert_eq!(lines[0], "error [WriteFailed]: write failed: spooler accepted 0 of 14 bytes");
        assert!(lines.last().unwrap().contains("try again later"));
    }

    #[test]
    fn permanent_errors_say_retrying_will_not_help() {
        let lines = error_lines(&SpoolError::usage("no page is open"));
        assert!(lines.last().unwrap().contains("will not help"));
    }

    #[test]
    fn action_required_errors_add_no_retry_hint() {
        let lines = error_lines(&SpoolError::Config("printer_name must not be empty".into()));
        assert_eq!(lines.len(), 3);
    }
}
