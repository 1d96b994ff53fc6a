// Licensed under the Apache-2.0 license

//! I2C slave driver: instance registry, lifecycle, and the interrupt
//! protocol engine.
//!
//! [`I2cSlaveDriver`] owns the registrations for up to `N` peripheral
//! instances and drives the slave side of the bus protocol from
//! [`handle_event`](I2cSlaveDriver::handle_event), which the platform's
//! interrupt dispatch invokes once per hardware event. The engine keeps
//! no transaction state between calls: every invocation reconstructs the
//! bus situation from the status bits read at entry, classifies it into
//! one [`SlaveEvent`], and performs that event's register accesses and
//! callbacks.
//!
//! # Sharing between contexts
//!
//! `handle_event` runs at interrupt priority and never blocks; events for
//! one instance arrive strictly ordered, one fully processed before the
//! next. The driver itself carries no locking. An embedder that calls
//! `init`/`shutdown` from thread context while interrupts deliver events
//! places the driver behind `critical_section::Mutex<RefCell<_>>` (or an
//! equivalent), and the `init`/`shutdown` sequences keep the interrupt
//! source disabled while the registration is mutated, so no concurrent
//! read/write window exists.

use crate::common::{
    Direction, ErrorKind, EventStatus, SlaveEvent, SlaveRegistration, SlaveTarget, EMPTY_BYTE,
};
use crate::logger::{Logger, NoOpLogger};
use crate::traits::{IrqDispatcher, SlaveRegisters, SystemControl};
use embedded_hal::i2c::SevenBitAddress;

struct SlaveInstance<T> {
    address: SevenBitAddress,
    target: T,
}

/// Driver for the slave mode of up to `N` I2C peripheral instances.
///
/// The registry is an explicit field of this object; there is no global
/// instance table. `N` defaults to the two instances the reference
/// hardware provides.
pub struct I2cSlaveDriver<H, S, D, T, L = NoOpLogger, const N: usize = 2> {
    pub hardware: H,
    pub system: S,
    pub dispatcher: D,
    pub logger: L,
    instances: [Option<SlaveInstance<T>>; N],
}

impl<H, S, D, T, L, const N: usize> I2cSlaveDriver<H, S, D, T, L, N>
where
    H: SlaveRegisters,
    S: SystemControl,
    D: IrqDispatcher,
    T: SlaveTarget,
    L: Logger,
{
    pub fn new(hardware: H, system: S, dispatcher: D, logger: L) -> Self {
        Self {
            hardware,
            system,
            dispatcher,
            logger,
            instances: [const { None }; N],
        }
    }

    /// Initialize `instance` for slave operation with `registration`.
    ///
    /// Stores the registration wholesale (replacing any prior one), then
    /// brings the instance up: clock gate on, slave baud and address
    /// programmed, peripheral interrupt disabled and cleared before the
    /// controller line is enabled (the disable-before-enable ordering
    /// guards against spurious triggering on stale state), dispatcher
    /// informed, interrupts enabled, peripheral enabled.
    ///
    /// # Panics
    ///
    /// Debug builds panic when `instance >= N`; that is a contract
    /// violation, not a runtime error. Release builds ignore the call.
    pub fn init(&mut self, instance: usize, registration: SlaveRegistration<T>) {
        debug_assert!(instance < N, "i2c instance out of range");
        let Some(slot) = self.instances.get_mut(instance) else {
            return;
        };
        let address = registration.address;
        *slot = Some(SlaveInstance {
            address,
            target: registration.target,
        });

        self.system.enable_clock(instance);
        self.hardware
            .set_independent_baud(instance, registration.independent_baud);
        self.hardware.set_slave_address(instance, address);

        // Disable and clear at the peripheral before the controller line
        // goes live.
        self.hardware.disable_interrupt(instance);
        self.hardware.clear_interrupt(instance);

        self.dispatcher.register_slave(instance);
        self.system.enable_irq(instance);
        self.hardware.enable_interrupt(instance);
        self.hardware.enable(instance);

        self.logger.log(format_args!(
            "i2c{instance}: slave enabled at 0x{address:02x}"
        ));
    }

    /// Shut `instance` down: peripheral off, interrupt line off, clock
    /// gate off.
    ///
    /// The stored registration is left in place; the instance is inert
    /// and a re-`init` overwrites it. Safe to repeat on an already-down
    /// instance.
    ///
    /// # Panics
    ///
    /// Debug builds panic when `instance >= N`.
    pub fn shutdown(&mut self, instance: usize) {
        debug_assert!(instance < N, "i2c instance out of range");
        if instance >= N {
            return;
        }
        self.hardware.disable(instance);
        self.system.disable_irq(instance);
        self.system.disable_clock(instance);
        self.logger.log(format_args!("i2c{instance}: slave shut down"));
    }

    /// Whether `instance` has a stored registration.
    #[must_use]
    pub fn is_initialized(&self, instance: usize) -> bool {
        self.instances
            .get(instance)
            .is_some_and(|slot| slot.is_some())
    }

    /// Address `instance` answers to, if it was initialized.
    #[must_use]
    pub fn slave_address(&self, instance: usize) -> Option<SevenBitAddress> {
        self.instances
            .get(instance)?
            .as_ref()
            .map(|slot| slot.address)
    }

    /// Access the registered callback bundle, e.g. to queue response data
    /// on a [`BufferedTarget`](crate::buffered::BufferedTarget).
    ///
    /// Callers sharing the driver with interrupt context must hold the
    /// same critical section here that guards `handle_event`.
    pub fn target_mut(&mut self, instance: usize) -> Option<&mut T> {
        self.instances
            .get_mut(instance)?
            .as_mut()
            .map(|slot| &mut slot.target)
    }

    /// Process one hardware event for `instance`.
    ///
    /// Called from interrupt context, exactly once per qualifying event.
    /// Runs to completion without blocking. Failures never propagate to
    /// the caller (an interrupt dispatcher cannot act on them); they are
    /// reported through the target's `on_error`, once, after the data
    /// register accesses that keep the bus moving.
    pub fn handle_event(&mut self, instance: usize) {
        let Self {
            hardware,
            logger,
            instances,
            ..
        } = self;

        // Clearing the pending status first prevents a missed or
        // re-entered trigger for this event.
        hardware.clear_interrupt(instance);

        let arbitration_lost = hardware.take_arbitration_lost(instance);
        let addressed = hardware.is_addressed_as_slave(instance);

        // A master-mode report on a slave-only driver means a shared
        // vector fired for someone else's transfer.
        if hardware.is_master(instance) {
            return;
        }

        let Some(slot) = instances.get_mut(instance).and_then(Option::as_mut) else {
            return;
        };
        let target = &mut slot.target;

        let event = SlaveEvent::classify(EventStatus {
            arbitration_lost,
            addressed,
            requested_direction: hardware.requested_direction(instance),
            direction: hardware.direction(instance),
            receive_ack: hardware.receive_ack(instance),
        });
        logger.log(format_args!("i2c{instance}: event {event:?}"));

        let mut pending_error = None;
        let mut do_transmit = false;

        match event {
            SlaveEvent::ArbitrationLost => {
                pending_error = Some(ErrorKind::ArbitrationLost);
            }
            SlaveEvent::AddressedTransmit => {
                hardware.set_direction(instance, Direction::Transmit);
                do_transmit = true;
            }
            SlaveEvent::AddressedReceive => {
                hardware.set_direction(instance, Direction::Receive);
                // Dummy read; the address-match cycle carries no payload.
                let _ = hardware.read_data(instance);
            }
            SlaveEvent::TransmitEnd => {
                // Nacked: the master is done reading. The dummy read
                // releases the data line after the direction switch.
                hardware.set_direction(instance, Direction::Receive);
                let _ = hardware.read_data(instance);
            }
            SlaveEvent::TransmitContinue => {
                do_transmit = true;
            }
            SlaveEvent::ReceivedByte => {
                let byte = hardware.read_data(instance);
                if target.byte_received(byte).is_err() {
                    pending_error = Some(ErrorKind::SlaveRxOverrun);
                }
            }
        }

        if do_transmit {
            let byte = match target.next_byte() {
                Ok(byte) => byte,
                Err(kind) => {
                    // The source status overrides any earlier
                    // classification for this cycle.
                    pending_error = Some(kind);
                    EMPTY_BYTE
                }
            };
            hardware.write_data(instance, byte);
        }

        if let Some(kind) = pending_error {
            logger.log(format_args!("i2c{instance}: error {kind:?}"));
            target.on_error(kind);
        }
    }
}
