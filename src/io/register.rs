/*
 * Register Access
 *
 * Word-granular reads and writes against a session's register mapping.
 *
 * Every access is a single volatile 32-bit load or store, so each read
 * re-observes live hardware state and each write reaches the device as one
 * full word. Requests are checked against the mapped length (and word
 * alignment) before the mapping is touched at all.
 */

use core::fmt;
use core::iter::FusedIterator;

use volatile::VolatilePtr;

use super::session::DeviceSession;
use crate::error::{Result, UioError};
use crate::memory::Mapping;

/// Register width in bytes. Fixed; other widths are rejected up front.
pub const WORD_WIDTH: usize = 4;

/// A run of `count` consecutive words starting at byte `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWindow {
    offset: usize,
    count: usize,
}

impl RegisterWindow {
    pub const fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Size of the window in bytes, `None` on overflow
    pub fn byte_len(&self) -> Option<usize> {
        self.count.checked_mul(WORD_WIDTH)
    }

    /// One past the last byte of the window, `None` on overflow
    ///
    /// This is also the smallest mapping length that covers the window.
    pub fn end(&self) -> Option<usize> {
        self.byte_len()?.checked_add(self.offset)
    }

    /// Reject windows that are misaligned or reach past `mapped` bytes
    pub fn check(&self, mapped: usize) -> Result<()> {
        if self.offset % WORD_WIDTH != 0 {
            return Err(UioError::Misaligned { address: self.offset });
        }

        match self.end() {
            Some(end) if end <= mapped => Ok(()),
            _ => Err(UioError::Bounds {
                address: self.offset,
                length: self.byte_len().unwrap_or(usize::MAX),
                mapped,
            }),
        }
    }
}

/// Lazy sequence of `(address, value)` pairs produced by [`read_words`]
///
/// Each call to `next` performs one volatile load; nothing is cached.
#[derive(Debug)]
pub struct RegisterWords<'a> {
    mapping: &'a Mapping,
    next: usize,
    remaining: usize,
}

impl Iterator for RegisterWords<'_> {
    type Item = (usize, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let address = self.next;
        // SAFETY: the whole window was bounds and alignment checked when the
        // iterator was created and the mapping outlives `self`.
        let value = unsafe { read_word(self.mapping, address) };
        log::trace!("read 0x{:08x} -> 0x{:08x}", address, value);

        self.remaining -= 1;
        self.next += WORD_WIDTH;
        Some((address, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RegisterWords<'_> {}

impl FusedIterator for RegisterWords<'_> {}

/// One word as reported in read mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWord {
    pub address: usize,
    pub value: u32,
}

impl From<(usize, u32)> for RegisterWord {
    fn from((address, value): (usize, u32)) -> Self {
        Self { address, value }
    }
}

impl fmt::Display for RegisterWord {
    /// `0x<address>\t<value>`, both zero-padded to a full word of hex digits
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}\t{:08x}", self.address, self.value)
    }
}

/// Read `count` consecutive words starting at `start_address`
///
/// Addresses advance by [`WORD_WIDTH`] per entry. The window is validated
/// against the session's mapping before anything is read.
pub fn read_words(session: &DeviceSession, start_address: usize, count: usize) -> Result<RegisterWords<'_>> {
    let window = RegisterWindow::new(start_address, count);
    let mapping = checked_mapping(session, &window)?;

    Ok(RegisterWords {
        mapping,
        next: start_address,
        remaining: count,
    })
}

/// Write one full word `value` at `address`
pub fn write_word(session: &DeviceSession, address: usize, value: u32) -> Result<()> {
    let window = RegisterWindow::new(address, 1);
    let mapping = checked_mapping(session, &window)?;

    log::trace!("write 0x{:08x} <- 0x{:08x}", address, value);
    // SAFETY: `window` was checked against the mapping above.
    unsafe { write_word_unchecked(mapping, address, value) };
    Ok(())
}

fn checked_mapping<'a>(session: &'a DeviceSession, window: &RegisterWindow) -> Result<&'a Mapping> {
    window.check(session.mapped_len())?;
    // A monitor session has mapped_len 0, so any window with count > 0 has
    // already failed the check above.
    session.mapping().ok_or(UioError::Bounds {
        address: window.offset(),
        length: window.byte_len().unwrap_or(usize::MAX),
        mapped: 0,
    })
}

/// # Safety
/// `address..address + 4` must be inside `mapping` and word aligned.
#[inline]
unsafe fn read_word(mapping: &Mapping, address: usize) -> u32 {
    // SAFETY: forwarded from the caller.
    let ptr = unsafe { VolatilePtr::new(mapping.ptr_at::<u32>(address)) };
    u32::from_le(ptr.read())
}

/// # Safety
/// `address..address + 4` must be inside `mapping` and word aligned.
#[inline]
unsafe fn write_word_unchecked(mapping: &Mapping, address: usize, value: u32) {
    // SAFETY: forwarded from the caller.
    let ptr = unsafe { VolatilePtr::new(mapping.ptr_at::<u32>(address)) };
    ptr.write(value.to_le());
}
