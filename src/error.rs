/*
 * Error Types
 *
 * Every failure uioctl can report, from argument validation through device
 * open, mapping, register bounds and the interrupt protocol's fixed-size
 * transfers. All of them are terminal to the invocation: the front end
 * prints the message to stderr and exits non-zero.
 */

use core::fmt;
use std::io;
use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, UioError>;

/// Problems detected before any device file is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingDevicePath,
    UnsupportedRegion(u64),
    UnsupportedWidth(u64),
    InvalidNumber { what: &'static str, text: String },
    ZeroCount,
    WindowTooLarge,
    WrongArgumentCount,
    UnexpectedOption(String),
    MissingOptionValue(char),
    ListingNotImplemented,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingDevicePath => write!(f, "no UIO device file given"),
            ValidationError::UnsupportedRegion(region) => {
                write!(f, "region != 0 not yet implemented (got {})", region)
            }
            ValidationError::UnsupportedWidth(width) => {
                write!(f, "width != 4 not yet implemented (got {})", width)
            }
            ValidationError::InvalidNumber { what, text } => {
                write!(f, "invalid {}: '{}'", what, text)
            }
            ValidationError::ZeroCount => write!(f, "word count must be at least 1"),
            ValidationError::WindowTooLarge => {
                write!(f, "address and word count overflow the address space")
            }
            ValidationError::WrongArgumentCount => {
                write!(f, "Wrong number of arguments; try -h")
            }
            ValidationError::UnexpectedOption(opt) => {
                write!(f, "Unexpected argument '{}'; try -h", opt)
            }
            ValidationError::MissingOptionValue(opt) => {
                write!(f, "option -{} requires a value; try -h", opt)
            }
            ValidationError::ListingNotImplemented => write!(f, "listing not yet implemented"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Which half of the interrupt protocol a transfer belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    /// The 4-byte re-arm write.
    Acknowledge,
    /// The blocking 4-byte counter read.
    Wait,
}

impl fmt::Display for DeviceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceOp::Acknowledge => write!(f, "clearing device file"),
            DeviceOp::Wait => write!(f, "reading from device file"),
        }
    }
}

#[derive(Debug)]
pub enum UioError {
    Validation(ValidationError),
    Open { path: PathBuf, source: io::Error },
    Map { path: PathBuf, length: usize, source: io::Error },
    Io { op: DeviceOp, source: io::Error },
    ShortTransfer { op: DeviceOp, expected: usize, actual: usize },
    /// Register access outside the mapped window.
    Bounds { address: usize, length: usize, mapped: usize },
    /// Register address not on a word boundary.
    Misaligned { address: usize },
    /// The interrupt monitor already failed or finished.
    MonitorTerminated,
    /// Writing results to stdout failed.
    Output(io::Error),
}

impl fmt::Display for UioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UioError::Validation(err) => write!(f, "{}", err),
            UioError::Open { path, source } => {
                write!(f, "Couldn't open UIO device file {}: {}", path.display(), source)
            }
            UioError::Map { path, length, source } => write!(
                f,
                "Couldn't map {} bytes of {}: {}",
                length,
                path.display(),
                source
            ),
            UioError::Io { op, source } => write!(f, "Problem {}: {}", op, source),
            UioError::ShortTransfer { op, expected, actual } => write!(
                f,
                "Problem {}: transferred {} of {} bytes",
                op, actual, expected
            ),
            UioError::Bounds { address, length, mapped } => write!(
                f,
                "access of {} bytes at 0x{:08x} is outside the {}-byte mapping",
                length, address, mapped
            ),
            UioError::Misaligned { address } => {
                write!(f, "address 0x{:08x} is not word aligned", address)
            }
            UioError::MonitorTerminated => write!(f, "interrupt monitor already terminated"),
            UioError::Output(source) => write!(f, "Problem writing output: {}", source),
        }
    }
}

impl std::error::Error for UioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UioError::Open { source, .. }
            | UioError::Map { source, .. }
            | UioError::Io { source, .. }
            | UioError::Output(source) => Some(source),
            UioError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for UioError {
    fn from(err: ValidationError) -> Self {
        UioError::Validation(err)
    }
}
