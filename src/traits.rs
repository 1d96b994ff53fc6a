// Licensed under the Apache-2.0 license

//! # Hardware Abstraction Traits for the I2C Slave Driver
//!
//! This module defines the seams between the protocol engine and the
//! platform. Each trait has a single responsibility and is substitutable
//! in host tests:
//!
//! ```text
//! SlaveRegisters   (peripheral register file, per instance)
//! SystemControl    (clock gating + interrupt-controller lines)
//! IrqDispatcher    (shared-vector registration hook)
//! ```
//!
//! All methods take an `instance` index selecting one physical
//! peripheral; every operation is a single atomic register access with no
//! internal retry logic.

use crate::common::Direction;
use embedded_hal::i2c::SevenBitAddress;

/// Register-level access to one I2C peripheral in slave mode.
///
/// Implementations wrap the memory-mapped register file; none of these
/// methods may block or loop.
pub trait SlaveRegisters {
    /// Clear the pending interrupt status for `instance`.
    fn clear_interrupt(&mut self, instance: usize);

    /// Read the arbitration-lost flag, clearing it if set.
    fn take_arbitration_lost(&mut self, instance: usize) -> bool;

    /// Whether a master has addressed this instance's slave address.
    fn is_addressed_as_slave(&self, instance: usize) -> bool;

    /// Whether the peripheral is currently configured as a bus master.
    fn is_master(&self, instance: usize) -> bool;

    /// Direction the master requested on the address-match cycle.
    fn requested_direction(&self, instance: usize) -> Direction;

    /// Direction the data path is currently configured for.
    fn direction(&self, instance: usize) -> Direction;

    /// Configure the data path direction.
    fn set_direction(&mut self, instance: usize, direction: Direction);

    /// Acknowledge bit latched for the last transmitted byte.
    fn receive_ack(&self, instance: usize) -> bool;

    /// Read the data register.
    ///
    /// Also used as the dummy read that releases hardware latches after
    /// an address match in receive direction and after a nacked transmit;
    /// the returned byte carries no payload in those cases.
    fn read_data(&mut self, instance: usize) -> u8;

    /// Write one byte to the data register for transmission.
    fn write_data(&mut self, instance: usize, byte: u8);

    /// Program the 7-bit slave address.
    fn set_slave_address(&mut self, instance: usize, address: SevenBitAddress);

    /// Run the slave baud independent of the programmed master baud.
    fn set_independent_baud(&mut self, instance: usize, enabled: bool);

    /// Enable interrupt generation at the peripheral.
    fn enable_interrupt(&mut self, instance: usize);

    /// Disable interrupt generation at the peripheral.
    fn disable_interrupt(&mut self, instance: usize);

    /// Enable peripheral operation.
    fn enable(&mut self, instance: usize);

    /// Disable peripheral operation.
    fn disable(&mut self, instance: usize);
}

/// System-level control consumed by instance lifecycle: the clock gate of
/// the peripheral's clock domain and its line in the system interrupt
/// controller.
pub trait SystemControl {
    fn enable_clock(&mut self, instance: usize);
    fn disable_clock(&mut self, instance: usize);
    fn enable_irq(&mut self, instance: usize);
    fn disable_irq(&mut self, instance: usize);
}

/// Registration hook for a cross-peripheral interrupt dispatcher.
///
/// Platforms that route several I2C instances through one vector need to
/// know which instances run slave mode so events reach
/// [`handle_event`](crate::driver::I2cSlaveDriver::handle_event). The
/// driver calls this during `init`, before enabling the interrupt.
pub trait IrqDispatcher {
    /// Mark `instance` as slave-mode for subsequent event routing.
    fn register_slave(&mut self, instance: usize);
}
