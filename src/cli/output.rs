/*
 * Standard Output
 *
 * Everything uioctl prints on stdout goes through here so a failing
 * stdout (closed pipe, full disk) becomes `UioError::Output` instead of a
 * panic. Each call flushes, so interrupt lines appear as they happen.
 */

use core::fmt::Display;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, UioError};

/// Line printed once before the first acknowledge in monitor mode
pub fn waiting_banner(path: &Path) -> String {
    format!("Waiting for interrupts on {}", path.display())
}

/// Write `text` verbatim and flush
pub fn write_text<W: Write>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(UioError::Output)
}

/// Write one line and flush
pub fn write_line<W: Write, T: Display + ?Sized>(out: &mut W, line: &T) -> Result<()> {
    writeln!(out, "{}", line)
        .and_then(|()| out.flush())
        .map_err(UioError::Output)
}
