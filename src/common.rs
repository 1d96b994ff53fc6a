// Licensed under the Apache-2.0 license

//! Common types for the I2C slave driver.
//!
//! This module provides shared definitions for error handling, the
//! application callback bundle, and per-interrupt event classification
//! used across the slave driver implementation.

use embedded_hal::i2c::SevenBitAddress;

/// Byte transmitted when no response data is available.
pub const EMPTY_BYTE: u8 = 0x00;

/// Transfer direction of the slave data stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Slave drives the data line (master read).
    Transmit,
    /// Slave samples the data line (master write).
    Receive,
}

/// Error classifications surfaced to the application through
/// [`SlaveTarget::on_error`].
///
/// Errors are informational: the driver always completes the register
/// sequence needed to keep the bus moving before reporting one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The device lost bus arbitration while not being addressed.
    ArbitrationLost,
    /// The registered sink could not accept a received byte in time.
    SlaveRxOverrun,
    /// The registered source had no byte when the master kept reading.
    SlaveTxUnderrun,
}

impl embedded_hal::i2c::Error for ErrorKind {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            ErrorKind::ArbitrationLost => embedded_hal::i2c::ErrorKind::ArbitrationLoss,
            ErrorKind::SlaveRxOverrun => embedded_hal::i2c::ErrorKind::Overrun,
            ErrorKind::SlaveTxUnderrun => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

/// Backpressure signal returned by [`SlaveTarget::byte_received`] when the
/// sink cannot take another byte. Reported as [`ErrorKind::SlaveRxOverrun`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SinkFull;

/// Application callback bundle for one slave instance.
///
/// Every method has a default implementation so an application only
/// provides the hooks it cares about: an unimplemented `next_byte`
/// produces [`EMPTY_BYTE`], an unimplemented `byte_received` discards the
/// byte, and an unimplemented `on_error` ignores the report. The unit
/// type `()` implements this trait with only the defaults and stands in
/// for "nothing registered".
pub trait SlaveTarget {
    /// Produce the next byte to transmit to the master.
    ///
    /// # Errors
    ///
    /// Returning an error makes the driver transmit [`EMPTY_BYTE`] in its
    /// place and report the kind through [`SlaveTarget::on_error`].
    fn next_byte(&mut self) -> Result<u8, ErrorKind> {
        Ok(EMPTY_BYTE)
    }

    /// Consume one byte received from the master.
    ///
    /// # Errors
    ///
    /// Returning [`SinkFull`] classifies the cycle as
    /// [`ErrorKind::SlaveRxOverrun`]; the byte is dropped.
    fn byte_received(&mut self, byte: u8) -> Result<(), SinkFull> {
        let _ = byte;
        Ok(())
    }

    /// Notification of an error classified during one interrupt cycle.
    ///
    /// Called at most once per cycle, after all data register accesses.
    fn on_error(&mut self, kind: ErrorKind) {
        let _ = kind;
    }
}

impl SlaveTarget for () {}

/// Per-instance registration handed to
/// [`init`](crate::driver::I2cSlaveDriver::init).
///
/// Stored wholesale by the driver; a re-`init` replaces the previous
/// registration with no merge.
pub struct SlaveRegistration<T> {
    /// 7-bit address this instance answers to.
    pub address: SevenBitAddress,
    /// Run the slave baud independent of the master baud setting.
    pub independent_baud: bool,
    /// Callback bundle invoked from interrupt context.
    pub target: T,
}

impl<T: SlaveTarget> SlaveRegistration<T> {
    /// Registration with the default hardware knobs (independent slave
    /// baud enabled).
    #[must_use]
    pub fn new(address: SevenBitAddress, target: T) -> Self {
        debug_assert!(address <= 0x7F, "address must be 7-bit");
        Self {
            address,
            independent_baud: true,
            target,
        }
    }

    #[must_use]
    pub fn independent_baud(mut self, enabled: bool) -> Self {
        self.independent_baud = enabled;
        self
    }
}

/// Snapshot of the status bits one interrupt cycle is classified from.
///
/// Read from hardware at entry to `handle_event`; never retained across
/// calls.
#[derive(Copy, Clone, Debug)]
pub struct EventStatus {
    /// Arbitration-lost flag (already cleared in hardware by the read).
    pub arbitration_lost: bool,
    /// Address-match: a master selected this instance's address.
    pub addressed: bool,
    /// Direction the master requested on address match.
    pub requested_direction: Direction,
    /// Direction the data path is currently configured for.
    pub direction: Direction,
    /// Whether the receiver acknowledged the last transmitted byte.
    pub receive_ack: bool,
}

/// Classification of one bus event, derived fresh on every interrupt.
///
/// Exactly one variant applies per cycle; the driver dispatches over it
/// exhaustively.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlaveEvent {
    /// Lost arbitration while not addressed; no data moves this cycle.
    ArbitrationLost,
    /// Address match, master reads from this slave.
    AddressedTransmit,
    /// Address match, master writes to this slave.
    AddressedReceive,
    /// Ongoing master read, last byte was acked; transmit another.
    TransmitContinue,
    /// Ongoing master read, last byte was nacked; transfer is over.
    TransmitEnd,
    /// Ongoing master write; one byte waits in the data register.
    ReceivedByte,
}

impl SlaveEvent {
    /// Classify a status snapshot into the single event it represents.
    ///
    /// The address-match bit takes precedence over the direction bits: it
    /// starts a fresh transaction and invalidates leftover direction
    /// state from the previous one.
    #[must_use]
    pub fn classify(status: EventStatus) -> Self {
        if status.arbitration_lost && !status.addressed {
            SlaveEvent::ArbitrationLost
        } else if status.addressed {
            match status.requested_direction {
                Direction::Transmit => SlaveEvent::AddressedTransmit,
                Direction::Receive => SlaveEvent::AddressedReceive,
            }
        } else {
            match status.direction {
                Direction::Transmit => {
                    if status.receive_ack {
                        SlaveEvent::TransmitContinue
                    } else {
                        SlaveEvent::TransmitEnd
                    }
                }
                Direction::Receive => SlaveEvent::ReceivedByte,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error;

    fn status() -> EventStatus {
        EventStatus {
            arbitration_lost: false,
            addressed: false,
            requested_direction: Direction::Receive,
            direction: Direction::Receive,
            receive_ack: false,
        }
    }

    #[test]
    fn test_classify_arbitration_lost() {
        let event = SlaveEvent::classify(EventStatus {
            arbitration_lost: true,
            ..status()
        });
        assert_eq!(event, SlaveEvent::ArbitrationLost);
    }

    #[test]
    fn test_classify_addressed_beats_arbitration_lost() {
        // A lost-then-readdressed cycle starts a normal transaction.
        let event = SlaveEvent::classify(EventStatus {
            arbitration_lost: true,
            addressed: true,
            requested_direction: Direction::Transmit,
            ..status()
        });
        assert_eq!(event, SlaveEvent::AddressedTransmit);
    }

    #[test]
    fn test_classify_addressed_receive() {
        let event = SlaveEvent::classify(EventStatus {
            addressed: true,
            requested_direction: Direction::Receive,
            // Stale direction state from a prior transaction must not matter.
            direction: Direction::Transmit,
            ..status()
        });
        assert_eq!(event, SlaveEvent::AddressedReceive);
    }

    #[test]
    fn test_classify_transmit_continue_on_ack() {
        let event = SlaveEvent::classify(EventStatus {
            direction: Direction::Transmit,
            receive_ack: true,
            ..status()
        });
        assert_eq!(event, SlaveEvent::TransmitContinue);
    }

    #[test]
    fn test_classify_transmit_end_on_nack() {
        let event = SlaveEvent::classify(EventStatus {
            direction: Direction::Transmit,
            receive_ack: false,
            ..status()
        });
        assert_eq!(event, SlaveEvent::TransmitEnd);
    }

    #[test]
    fn test_classify_received_byte() {
        assert_eq!(SlaveEvent::classify(status()), SlaveEvent::ReceivedByte);
    }

    #[test]
    fn test_error_kind_maps_to_embedded_hal() {
        assert_eq!(
            ErrorKind::ArbitrationLost.kind(),
            embedded_hal::i2c::ErrorKind::ArbitrationLoss
        );
        assert_eq!(
            ErrorKind::SlaveRxOverrun.kind(),
            embedded_hal::i2c::ErrorKind::Overrun
        );
        assert_eq!(
            ErrorKind::SlaveTxUnderrun.kind(),
            embedded_hal::i2c::ErrorKind::Other
        );
    }

    #[test]
    fn test_default_target_produces_empty_byte() {
        let mut target = ();
        assert_eq!(target.next_byte(), Ok(EMPTY_BYTE));
        assert_eq!(target.byte_received(0xA5), Ok(()));
        target.on_error(ErrorKind::ArbitrationLost);
    }

    #[test]
    fn test_registration_defaults() {
        let reg = SlaveRegistration::new(0x2A, ());
        assert_eq!(reg.address, 0x2A);
        assert!(reg.independent_baud);

        let reg = SlaveRegistration::new(0x2A, ()).independent_baud(false);
        assert!(!reg.independent_baud);
    }
}
