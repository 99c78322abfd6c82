/*
 * Memory Mapping
 *
 * Process address space management for device register windows.
 */

pub mod mapping;

pub use mapping::{Mapping, Protection};
