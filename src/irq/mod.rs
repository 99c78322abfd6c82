/*
 * Interrupt Handling
 *
 * Userspace side of UIO interrupt delivery: the acknowledge/wait protocol
 * and the events it produces.
 */

pub mod event;
pub mod monitor;

pub use event::{ACK_TOKEN, InterruptEvent, Timestamp, decode_counter};
pub use monitor::{InterruptMonitor, MonitorState, RunMode};
