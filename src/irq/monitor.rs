/*
 * Interrupt Monitor
 *
 * Drives the UIO interrupt protocol on a device file. The same descriptor
 * carries two meanings:
 * 1. write 4 bytes (ACK_TOKEN) at offset 0  -> re-arm the interrupt
 * 2. read 4 bytes at offset 0               -> block until it fires
 *
 * The pair always runs in that order, one syscall each, and is never merged
 * or reordered. The monitor tracks where it is in the cycle:
 *
 * ```
 *   Arming --write ok--> Waiting --read ok--> Arming      (forever)
 *                                  \--------> Terminated  (once)
 *   any I/O failure ----------------------> Terminated
 * ```
 *
 * There is no retry and no timeout: the blocking read is the only
 * suspension point and a failed or short transfer ends the monitor.
 */

use super::event::{ACK_TOKEN, EVENT_LEN, InterruptEvent, Timestamp, decode_counter};
use crate::error::{DeviceOp, Result, UioError};
use crate::io::DeviceFile;

/// Whether to stop after the first interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    Forever,
}

/// Position in the acknowledge/wait cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// About to write the acknowledge token
    Arming,
    /// Blocked (or about to block) on the event read
    Waiting,
    /// Finished or failed; no further I/O is issued
    Terminated,
}

/// Stateful driver for the acknowledge/wait protocol
pub struct InterruptMonitor<D: DeviceFile> {
    device: D,
    state: MonitorState,
    events: u64,
}

impl<D: DeviceFile> InterruptMonitor<D> {
    /// Create a monitor ready to arm `device`
    pub fn new(device: D) -> Self {
        Self {
            device,
            state: MonitorState::Arming,
            events: 0,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Number of interrupts observed so far
    pub fn events_seen(&self) -> u64 {
        self.events
    }

    /// Run one full acknowledge + wait cycle and return the event
    pub fn next_event(&mut self) -> Result<InterruptEvent> {
        self.arm()?;
        self.wait()
    }

    /// Run the protocol, handing each event to `report`
    ///
    /// Returns the number of events observed. In `RunMode::Forever` this only
    /// returns on error; `report` failing also ends the loop.
    pub fn run<F>(&mut self, mode: RunMode, mut report: F) -> Result<u64>
    where
        F: FnMut(&InterruptEvent) -> Result<()>,
    {
        loop {
            let event = self.next_event()?;
            if let Err(err) = report(&event) {
                self.state = MonitorState::Terminated;
                return Err(err);
            }

            if mode == RunMode::Once {
                log::debug!("single interrupt requested, stopping");
                self.state = MonitorState::Terminated;
                return Ok(self.events);
            }
        }
    }

    /// Arming -> Waiting
    fn arm(&mut self) -> Result<()> {
        if self.state != MonitorState::Arming {
            return Err(UioError::MonitorTerminated);
        }

        let written = match self.device.write_at(&ACK_TOKEN, 0) {
            Ok(n) => n,
            Err(source) => return Err(self.fail(UioError::Io { op: DeviceOp::Acknowledge, source })),
        };
        if written != ACK_TOKEN.len() {
            return Err(self.fail(UioError::ShortTransfer {
                op: DeviceOp::Acknowledge,
                expected: ACK_TOKEN.len(),
                actual: written,
            }));
        }

        log::trace!("interrupt re-armed");
        self.state = MonitorState::Waiting;
        Ok(())
    }

    /// Waiting -> Arming
    fn wait(&mut self) -> Result<InterruptEvent> {
        if self.state != MonitorState::Waiting {
            return Err(UioError::MonitorTerminated);
        }

        let mut buf = [0u8; EVENT_LEN];
        let result = self.device.read_at(&mut buf, 0);
        let timestamp = Timestamp::now();

        let read = match result {
            Ok(n) => n,
            Err(source) => return Err(self.fail(UioError::Io { op: DeviceOp::Wait, source })),
        };
        if read != EVENT_LEN {
            return Err(self.fail(UioError::ShortTransfer {
                op: DeviceOp::Wait,
                expected: EVENT_LEN,
                actual: read,
            }));
        }

        let event = InterruptEvent {
            counter: decode_counter(buf),
            timestamp,
        };
        self.events += 1;
        self.state = MonitorState::Arming;
        log::debug!("interrupt #{} (driver count {})", self.events, event.counter);
        Ok(event)
    }

    fn fail(&mut self, err: UioError) -> UioError {
        log::debug!("interrupt monitor terminated: {}", err);
        self.state = MonitorState::Terminated;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Write(Vec<u8>, u64),
        Read(u64),
    }

    /// In-memory UIO device: each read pops the next queued reply
    struct FakeUio {
        ops: RefCell<Vec<Op>>,
        replies: RefCell<VecDeque<io::Result<Vec<u8>>>>,
        write_limit: usize,
    }

    impl FakeUio {
        fn with_counters(counters: &[u32]) -> Self {
            Self::with_replies(counters.iter().map(|c| Ok(c.to_le_bytes().to_vec())).collect())
        }

        fn with_replies(replies: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                ops: RefCell::new(Vec::new()),
                replies: RefCell::new(replies.into()),
                write_limit: usize::MAX,
            }
        }

        fn ops(&self) -> Vec<Op> {
            self.ops.borrow().clone()
        }

        fn pending(&self) -> usize {
            self.replies.borrow().len()
        }
    }

    impl DeviceFile for FakeUio {
        fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
            self.ops.borrow_mut().push(Op::Read(offset));
            let reply = self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::UnexpectedEof)))?;
            let n = reply.len().min(buf.len());
            buf[..n].copy_from_slice(&reply[..n]);
            Ok(n)
        }

        fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
            self.ops.borrow_mut().push(Op::Write(buf.to_vec(), offset));
            Ok(buf.len().min(self.write_limit))
        }
    }

    fn ack() -> Op {
        Op::Write(vec![0, 0, 0, 1], 0)
    }

    #[test]
    fn test_event_framing() {
        let uio = FakeUio::with_replies(vec![Ok(vec![0x02, 0x00, 0x00, 0x00])]);
        let mut monitor = InterruptMonitor::new(&uio);

        let event = monitor.next_event().unwrap();
        assert_eq!(event.counter, 2);
        assert_eq!(uio.ops(), vec![ack(), Op::Read(0)]);
        assert_eq!(monitor.state(), MonitorState::Arming);
    }

    #[test]
    fn test_run_once_stops_after_one_cycle() {
        let uio = FakeUio::with_counters(&[1, 2, 3]);
        let mut monitor = InterruptMonitor::new(&uio);
        let mut seen = Vec::new();

        let count = monitor
            .run(RunMode::Once, |event| {
                seen.push(event.counter);
                Ok(())
            })
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(seen, vec![1]);
        assert_eq!(uio.ops(), vec![ack(), Op::Read(0)]);
        assert_eq!(uio.pending(), 2);
        assert_eq!(monitor.state(), MonitorState::Terminated);
    }

    #[test]
    fn test_forever_acks_before_every_wait() {
        let uio = FakeUio::with_counters(&[5, 6, 7]);
        let mut monitor = InterruptMonitor::new(&uio);
        let mut seen = Vec::new();

        // The fake runs dry after three events, which ends the loop.
        let err = monitor
            .run(RunMode::Forever, |event| {
                seen.push(event.counter);
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, UioError::Io { op: DeviceOp::Wait, .. }));
        assert_eq!(seen, vec![5, 6, 7]);
        assert_eq!(monitor.events_seen(), 3);
        let expected: Vec<Op> = (0..4).flat_map(|_| [ack(), Op::Read(0)]).collect();
        assert_eq!(uio.ops(), expected);
    }

    #[test]
    fn test_short_ack_write_is_fatal() {
        let mut uio = FakeUio::with_counters(&[1]);
        uio.write_limit = 3;
        let mut monitor = InterruptMonitor::new(&uio);

        let err = monitor.next_event().unwrap_err();
        assert!(matches!(
            err,
            UioError::ShortTransfer { op: DeviceOp::Acknowledge, expected: 4, actual: 3 }
        ));
        // No wait after a failed acknowledge.
        assert_eq!(uio.ops().len(), 1);
        assert_eq!(monitor.state(), MonitorState::Terminated);
    }

    #[test]
    fn test_short_event_read_is_fatal() {
        let uio = FakeUio::with_replies(vec![Ok(vec![0x02, 0x00])]);
        let mut monitor = InterruptMonitor::new(&uio);

        let err = monitor.next_event().unwrap_err();
        assert!(matches!(
            err,
            UioError::ShortTransfer { op: DeviceOp::Wait, expected: 4, actual: 2 }
        ));
        assert_eq!(monitor.state(), MonitorState::Terminated);
    }

    #[test]
    fn test_terminated_monitor_does_no_io() {
        let uio = FakeUio::with_replies(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(vec![1, 0, 0, 0]),
        ]);
        let mut monitor = InterruptMonitor::new(&uio);

        assert!(monitor.next_event().is_err());
        let ops_after_failure = uio.ops().len();

        assert!(matches!(
            monitor.next_event().unwrap_err(),
            UioError::MonitorTerminated
        ));
        assert_eq!(uio.ops().len(), ops_after_failure);
    }

    #[test]
    fn test_report_failure_ends_loop() {
        let uio = FakeUio::with_counters(&[1, 2]);
        let mut monitor = InterruptMonitor::new(&uio);

        let err = monitor
            .run(RunMode::Forever, |_| {
                Err(UioError::Output(io::Error::from(io::ErrorKind::BrokenPipe)))
            })
            .unwrap_err();

        assert!(matches!(err, UioError::Output(_)));
        assert_eq!(uio.pending(), 1);
        assert_eq!(monitor.state(), MonitorState::Terminated);
    }
}
