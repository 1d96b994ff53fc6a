// Licensed under the Apache-2.0 license

//! Queue-backed callback bundle.
//!
//! [`BufferedTarget`] is a ready-made [`SlaveTarget`] for applications
//! that prefer buffers over per-byte callbacks: queue a response before
//! the master reads, drain received bytes after it writes. Capacities
//! are fixed at compile time; the queues never allocate.

use crate::common::{ErrorKind, SinkFull, SlaveTarget};
use heapless::Deque;

/// Slave target backed by a `TX`-byte response queue and an `RX`-byte
/// receive queue.
pub struct BufferedTarget<const TX: usize, const RX: usize> {
    tx: Deque<u8, TX>,
    rx: Deque<u8, RX>,
    last_error: Option<ErrorKind>,
}

impl<const TX: usize, const RX: usize> BufferedTarget<TX, RX> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: Deque::new(),
            rx: Deque::new(),
            last_error: None,
        }
    }

    /// Queue response bytes for the next master read.
    ///
    /// # Errors
    ///
    /// When the queue fills up mid-way, returns the number of bytes that
    /// were queued before it did.
    pub fn queue_response(&mut self, data: &[u8]) -> Result<(), usize> {
        for (queued, &byte) in data.iter().enumerate() {
            if self.tx.push_back(byte).is_err() {
                return Err(queued);
            }
        }
        Ok(())
    }

    /// Drain received bytes into `buffer`, returning how many were
    /// copied.
    pub fn read_received(&mut self, buffer: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buffer.iter_mut() {
            match self.rx.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Response bytes still waiting to be transmitted.
    #[must_use]
    pub fn pending_response(&self) -> usize {
        self.tx.len()
    }

    /// Received bytes waiting to be drained.
    #[must_use]
    pub fn received_count(&self) -> usize {
        self.rx.len()
    }

    /// Drop both queues and any latched error.
    pub fn clear(&mut self) {
        self.tx.clear();
        self.rx.clear();
        self.last_error = None;
    }

    /// Most recent error reported by the driver, if any, clearing it.
    pub fn take_error(&mut self) -> Option<ErrorKind> {
        self.last_error.take()
    }
}

impl<const TX: usize, const RX: usize> Default for BufferedTarget<TX, RX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const TX: usize, const RX: usize> SlaveTarget for BufferedTarget<TX, RX> {
    fn next_byte(&mut self) -> Result<u8, ErrorKind> {
        // A dry queue means the master over-read the prepared response.
        self.tx.pop_front().ok_or(ErrorKind::SlaveTxUnderrun)
    }

    fn byte_received(&mut self, byte: u8) -> Result<(), SinkFull> {
        self.rx.push_back(byte).map_err(|_| SinkFull)
    }

    fn on_error(&mut self, kind: ErrorKind) {
        self.last_error = Some(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EMPTY_BYTE;

    #[test]
    fn test_response_bytes_come_out_in_order() {
        let mut target: BufferedTarget<8, 8> = BufferedTarget::new();
        target.queue_response(&[0x11, 0x22, 0x33]).unwrap();
        assert_eq!(target.pending_response(), 3);

        assert_eq!(target.next_byte(), Ok(0x11));
        assert_eq!(target.next_byte(), Ok(0x22));
        assert_eq!(target.next_byte(), Ok(0x33));
        assert_eq!(target.next_byte(), Err(ErrorKind::SlaveTxUnderrun));
    }

    #[test]
    fn test_queue_response_reports_partial_fill() {
        let mut target: BufferedTarget<2, 2> = BufferedTarget::new();
        assert_eq!(target.queue_response(&[1, 2, 3]), Err(2));
        assert_eq!(target.pending_response(), 2);
    }

    #[test]
    fn test_receive_queue_backpressure() {
        let mut target: BufferedTarget<2, 2> = BufferedTarget::new();
        assert_eq!(target.byte_received(0xA0), Ok(()));
        assert_eq!(target.byte_received(0xA1), Ok(()));
        assert_eq!(target.byte_received(0xA2), Err(SinkFull));
        assert_eq!(target.received_count(), 2);

        let mut buffer = [EMPTY_BYTE; 4];
        assert_eq!(target.read_received(&mut buffer), 2);
        assert_eq!(&buffer[..2], &[0xA0, 0xA1]);
    }

    #[test]
    fn test_error_latch_takes_most_recent() {
        let mut target: BufferedTarget<2, 2> = BufferedTarget::new();
        assert_eq!(target.take_error(), None);

        target.on_error(ErrorKind::ArbitrationLost);
        target.on_error(ErrorKind::SlaveRxOverrun);
        assert_eq!(target.take_error(), Some(ErrorKind::SlaveRxOverrun));
        assert_eq!(target.take_error(), None);
    }

    #[test]
    fn test_clear_resets_queues_and_error() {
        let mut target: BufferedTarget<4, 4> = BufferedTarget::new();
        target.queue_response(&[1, 2]).unwrap();
        target.byte_received(3).unwrap();
        target.on_error(ErrorKind::SlaveTxUnderrun);

        target.clear();

        assert_eq!(target.pending_response(), 0);
        assert_eq!(target.received_count(), 0);
        assert_eq!(target.take_error(), None);
    }
}
