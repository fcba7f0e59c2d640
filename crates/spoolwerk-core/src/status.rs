// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spooler job status codes and their descriptions.

use crate::types::StatusFlags;

/// Known job status bits, in ascending bit order.
pub const JOB_STATUS_TABLE: &[(u32, &str)] = &[
    (StatusFlags::PAUSED, "Job is paused."),
    (StatusFlags::ERROR, "An error is associated with the job."),
    (StatusFlags::DELETING, "Job is being deleted."),
    (StatusFlags::SPOOLING, "Job is spooling."),
    (StatusFlags::PRINTING, "Job is printing."),
    (StatusFlags::OFFLINE, "Printer is offline."),
    (StatusFlags::PAPEROUT, "Printer is out of paper."),
    (StatusFlags::PRINTED, "Job has printed."),
    (StatusFlags::DELETED, "Job has been deleted."),
    (StatusFlags::BLOCKED_DEVQ, "Printer driver cannot print the job."),
    (
        StatusFlags::USER_INTERVENTION,
        "Printer has an error that requires the user to do something.",
    ),
    (StatusFlags::RESTART, "Job has been restarted."),
    (StatusFlags::COMPLETE, "Job has been delivered to the printer."),
    (StatusFlags::RETAINED, "Job has been retained in the print queue."),
    (StatusFlags::RENDERING_LOCALLY, "Job is rendering on the client."),
];

/// Descriptions of every known bit set in `flags`. Unknown bits are skipped.
pub fn describe(flags: u32) -> Vec<&'static str> {
    JOB_STATUS_TABLE
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, text)| *text)
        .collect()
}
