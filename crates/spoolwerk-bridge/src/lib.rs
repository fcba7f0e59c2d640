// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native print spooler bridge.
//
// The `Spooler` trait is the only place Spoolwerk touches the operating
// system's print spooler. Windows binds it to winspool; every other platform
// gets a stub that reports the spooler as unavailable.

pub mod traits;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(target_os = "windows"))]
pub mod stub;

pub use traits::*;

/// Spooler implementation for the target operating system.
#[cfg(target_os = "windows")]
pub type PlatformSpooler = windows::WinSpooler;

/// Spooler implementation for the target operating system.
#[cfg(not(target_os = "windows"))]
pub type PlatformSpooler = stub::StubSpooler;

/// Returns the spooler for the target operating system.
pub fn platform_spooler() -> PlatformSpooler {
    #[cfg(target_os = "windows")]
    {
        windows::WinSpooler::new()
    }
    #[cfg(not(target_os = "windows"))]
    {
        // Desktop/CI without a winspool: every call fails cleanly.
        stub::StubSpooler
    }
}
