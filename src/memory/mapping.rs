/*
 * Shared Device Mapping
 *
 * Wraps a MAP_SHARED mmap of a device file so that loads and stores through
 * the returned window reach the device's register space directly.
 *
 * The mapping is released with munmap when the value is dropped. It does not
 * own the file descriptor it was created from: the owner (DeviceSession)
 * drops the mapping first and closes the descriptor afterwards.
 */

use core::ptr::{self, NonNull};
use std::io;
use std::os::fd::AsRawFd;

bitflags::bitflags! {
    /// Page protection requested for a mapping
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Protection: libc::c_int {
        const READ = libc::PROT_READ;
        const WRITE = libc::PROT_WRITE;
    }
}

/// A live shared mapping of part of a file
///
/// Never empty: `shared` refuses a zero length.
#[derive(Debug)]
pub struct Mapping {
    base: NonNull<u8>,
    len: usize,
}

#[allow(clippy::len_without_is_empty)]
impl Mapping {
    /// Map `len` bytes of `fd` starting at byte `offset` as a shared mapping.
    ///
    /// # Arguments
    /// * `fd` - Open file (or device file) to map
    /// * `len` - Number of bytes to map, must be non-zero
    /// * `offset` - Byte offset into the file (page aligned)
    /// * `prot` - Access the mapping should allow
    pub fn shared(fd: &impl AsRawFd, len: usize, offset: u64, prot: Protection) -> io::Result<Self> {
        if len == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot map an empty window",
            ));
        }
        let offset = libc::off_t::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "mapping offset too large"))?;

        // SAFETY: we pass a null hint and let the kernel pick the address, so
        // no existing mapping of ours can be replaced.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                prot.bits(),
                libc::MAP_SHARED,
                fd.as_raw_fd(),
                offset,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let base = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| io::Error::other("mmap returned a null mapping"))?;

        log::trace!("mmap: {} bytes at {:p} (offset 0x{:x})", len, base, offset);

        Ok(Self { base, len })
    }

    /// Length of the mapping in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether `[offset, offset + len)` lies entirely inside the mapping
    pub fn contains(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .is_some_and(|end| end <= self.len)
    }

    /// Pointer to a `T` located `offset` bytes into the mapping.
    ///
    /// # Safety
    /// `offset + size_of::<T>()` must not exceed `len()` and `offset` must be
    /// suitably aligned for `T`.
    pub unsafe fn ptr_at<T>(&self, offset: usize) -> NonNull<T> {
        // SAFETY: the caller keeps `offset` inside the mapping.
        unsafe { self.base.add(offset) }.cast::<T>()
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: base/len describe exactly the region returned by mmap and
        // nothing borrowed from it can outlive `self`.
        let rc = unsafe { libc::munmap(self.base.as_ptr().cast(), self.len) };
        if rc != 0 {
            log::warn!("munmap of {} bytes failed: {}", self.len, io::Error::last_os_error());
        } else {
            log::trace!("munmap: {} bytes at {:p}", self.len, self.base);
        }
    }
}
