/*
 * uioctl - Userspace I/O Register and Interrupt Access
 *
 * Library core of the uioctl tool. It lets low-level driver developers
 * peek and poke memory-mapped device registers and wait for device
 * interrupts through a Linux UIO device file (/dev/uioN), without writing
 * a kernel driver.
 *
 * Components:
 * - `io::DeviceSession` owns the open device file and, for register access,
 *   the shared mapping of memory region 0
 * - `io::read_words` / `io::write_word` perform 32-bit register accesses
 *   through that mapping, bounds checked against the mapped length
 * - `irq::InterruptMonitor` runs the acknowledge/wait protocol on the
 *   device file itself
 *
 * The front end (`cli`, and the `uioctl` binary) validates arguments and
 * dispatches to exactly one of register access or interrupt monitoring.
 */

pub mod cli;
pub mod error;
pub mod io;
pub mod irq;
pub mod memory;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{DeviceOp, Result, UioError, ValidationError};
pub use io::{
    DeviceFile, DeviceSession, RegisterWindow, RegisterWord, WORD_WIDTH, read_words, write_word,
};
pub use irq::{InterruptEvent, InterruptMonitor, MonitorState, RunMode};
