/*
 * Interrupt Events
 *
 * Wire format of the UIO interrupt protocol and the event value reported
 * for each completed wait.
 *
 * - Acknowledge: the 4 bytes [0x00, 0x00, 0x00, 0x01] written at offset 0
 * - Event: 4 bytes read at offset 0, a little-endian u32 interrupt count
 */

use core::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Token written to re-arm the interrupt line
pub const ACK_TOKEN: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Size of one event read
pub const EVENT_LEN: usize = 4;

/// Decode an event read into the driver's interrupt counter
#[inline]
pub fn decode_counter(bytes: [u8; EVENT_LEN]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Wall-clock capture time, second + millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub secs: u64,
    pub millis: u16,
}

impl Timestamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        // A clock before 1970 is reported as the epoch itself.
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from(since_epoch)
    }
}

impl From<Duration> for Timestamp {
    fn from(since_epoch: Duration) -> Self {
        Self {
            secs: since_epoch.as_secs(),
            millis: since_epoch.subsec_millis() as u16,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.secs, self.millis)
    }
}

/// One observed interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptEvent {
    /// Interrupt count reported by the driver
    pub counter: u32,
    /// When the blocking read returned
    pub timestamp: Timestamp,
}

impl fmt::Display for InterruptEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] interrupt: {}", self.timestamp, self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_counter_is_little_endian() {
        assert_eq!(decode_counter([0x02, 0x00, 0x00, 0x00]), 2);
        assert_eq!(decode_counter([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(decode_counter([0xff, 0xff, 0xff, 0xff]), u32::MAX);
    }

    #[test]
    fn test_ack_token_layout() {
        assert_eq!(ACK_TOKEN, [0, 0, 0, 1]);
    }

    #[test]
    fn test_event_line_format() {
        let event = InterruptEvent {
            counter: 42,
            timestamp: Timestamp::from(Duration::from_millis(1_386_201_600_007)),
        };
        assert_eq!(event.to_string(), "[1386201600.007] interrupt: 42");
    }
}
