/*
 * Device File Abstraction
 *
 * Positioned read/write access to a device file. The UIO driver gives these
 * two calls special meaning (write re-arms the interrupt, read blocks until
 * it fires), so the interrupt monitor is written against this trait rather
 * than a concrete file. That keeps it testable with an in-memory device.
 */

use std::fs::File;
use std::io;
use std::os::unix::fs::FileExt;

/// Device trait for anything that supports pread/pwrite style access
pub trait DeviceFile {
    /// Read up to buf.len() bytes from `offset` into buf
    ///
    /// Returns the number of bytes read, or an error.
    /// May block until data is available (UIO blocks until the next interrupt).
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Write buf.len() bytes from buf at `offset`
    ///
    /// Returns the number of bytes written, or an error.
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;
}

impl DeviceFile for File {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        FileExt::read_at(self, buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        FileExt::write_at(self, buf, offset)
    }
}

impl<D: DeviceFile + ?Sized> DeviceFile for &D {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        (**self).write_at(buf, offset)
    }
}
