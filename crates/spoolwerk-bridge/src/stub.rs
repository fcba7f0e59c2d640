// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub spooler for platforms without winspool.
//
// `open_printer` always fails, so no handle ever exists and the remaining
// methods are unreachable by construction.

use crate::traits::*;

/// Message reported by every stub call.
pub const UNAVAILABLE: &str = "print spooler is not available on this platform";

/// A handle that can never be created.
#[derive(Debug)]
pub enum StubHandle {}

/// No-op spooler returned on non-Windows platforms.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSpooler;

impl Spooler for StubSpooler {
    type Handle = StubHandle;

    fn platform_name(&self) -> &str {
        "stub (no spooler)"
    }

    fn open_printer(&mut self, name: &str) -> NativeResult<Self::Handle> {
        tracing::warn!(printer = name, "Spooler::open_printer called on stub spooler");
        Err(NativeError::new(0, UNAVAILABLE))
    }

    fn start_doc(&mut self, handle: &Self::Handle, _doc: &DocInfo<'_>) -> NativeResult<u32> {
        match *handle {}
    }

    fn start_page(&mut self, handle: &Self::Handle) -> NativeResult<()> {
        match *handle {}
    }

    fn write(&mut self, handle: &Self::Handle, _data: &[u8]) -> NativeResult<u32> {
        match *handle {}
    }

    fn end_page(&mut self, handle: &Self::Handle) -> NativeResult<()> {
        match *handle {}
    }

    fn end_doc(&mut self, handle: &Self::Handle) -> NativeResult<()> {
        match *handle {}
    }

    fn get_job(&mut self, handle: &Self::Handle, _job_id: u32, _buffer: &mut [u8]) -> GetJobReply {
        match *handle {}
    }

    fn close_printer(&mut self, handle: Self::Handle) -> NativeResult<()> {
        match handle {}
    }
}
