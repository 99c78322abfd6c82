/*
 * Device I/O
 *
 * Sessions on UIO device files and the two ways of talking to them:
 * register access through the mapped region, and positioned read/write
 * on the file itself (used by the interrupt monitor).
 */

pub mod device;
pub mod register;
pub mod session;

pub use device::DeviceFile;
pub use register::{RegisterWindow, RegisterWord, RegisterWords, WORD_WIDTH, read_words, write_word};
pub use session::{DeviceSession, SUPPORTED_REGION};
