/*
 * Device Session
 *
 * Owns one open UIO device file and, for register access, the shared
 * mapping of its region 0. The mapping is created right after the open and
 * both are released together, mapping first, on every exit path.
 *
 * Sessions come in two flavours:
 * - register sessions: file + mapping (read/write mode)
 * - monitor sessions: file only (interrupt mode)
 */

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use super::device::DeviceFile;
use crate::error::{Result, UioError, ValidationError};
use crate::memory::{Mapping, Protection};

/// The only memory region that can be mapped
pub const SUPPORTED_REGION: u32 = 0;

/// One open device file and its optional register mapping
#[derive(Debug)]
pub struct DeviceSession {
    // Dropped in declaration order: unmap before close.
    mapping: Option<Mapping>,
    file: File,
    path: PathBuf,
}

impl DeviceSession {
    /// Open `path` and map `byte_length` bytes of memory region `region`.
    ///
    /// The region is checked before the file is opened. If the mapping fails
    /// the freshly opened file is closed before the error is returned.
    pub fn open_for_registers(path: impl AsRef<Path>, region: u32, byte_length: usize) -> Result<Self> {
        let path = path.as_ref();
        if region != SUPPORTED_REGION {
            return Err(ValidationError::UnsupportedRegion(region.into()).into());
        }

        let file = open_device(path)?;
        let mapping = match Mapping::shared(&file, byte_length, 0, Protection::READ | Protection::WRITE) {
            Ok(mapping) => mapping,
            Err(source) => {
                log::debug!("closing {} after failed mapping", path.display());
                drop(file);
                return Err(UioError::Map {
                    path: path.to_path_buf(),
                    length: byte_length,
                    source,
                });
            }
        };

        log::debug!(
            "opened {} for register access ({} bytes of region {})",
            path.display(),
            mapping.len(),
            region
        );

        Ok(Self {
            mapping: Some(mapping),
            file,
            path: path.to_path_buf(),
        })
    }

    /// Open `path` for the interrupt protocol. Nothing is mapped.
    pub fn open_for_monitor(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_device(path)?;
        log::debug!("opened {} for interrupt monitoring", path.display());

        Ok(Self {
            mapping: None,
            file,
            path: path.to_path_buf(),
        })
    }

    /// Device file this session was opened on
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register mapping, if this is a register session
    pub fn mapping(&self) -> Option<&Mapping> {
        self.mapping.as_ref()
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.is_some()
    }

    /// Mapped length in bytes (0 for monitor sessions)
    pub fn mapped_len(&self) -> usize {
        self.mapping.as_ref().map_or(0, Mapping::len)
    }

    /// Unmap (if mapped) and then close the device file.
    pub fn close(self) {
        drop(self);
    }

    fn release_mapping(&mut self) {
        if let Some(mapping) = self.mapping.take() {
            log::debug!("unmapping {} bytes of {}", mapping.len(), self.path.display());
            drop(mapping);
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.release_mapping();
        log::debug!("closing {}", self.path.display());
        // `file` is closed when the fields drop, after the mapping is gone.
    }
}

impl DeviceFile for DeviceSession {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.file.read_at(buf, offset)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        self.file.write_at(buf, offset)
    }
}

/// Open a device file for synchronous read/write access
fn open_device(path: &Path) -> Result<File> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::MissingDevicePath.into());
    }

    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(path)
        .map_err(|source| UioError::Open {
            path: path.to_path_buf(),
            source,
        })
}
