#![cfg_attr(not(test), no_std)]

//! This is an `embedded-hal` driver for the [AD9910](https://www.analog.com/en/products/ad9910.html)
//! 1 GSPS direct digital synthesizer.
//!
//! The driver talks to the board through the [`Transport`] capability. Boards built on
//! `embedded-hal` 0.2 can use [`HalBoard`] directly.
//!
//! ```ignore
//! let mut dds = Ad9910::new(board, pin_map, DdsContext::default(), BusConfig::default());
//! dds.init()?;
//! dds.set_frequency(0, 10_000_000, 0)?;
//! dds.sweep(1_000_000, 2_000_000, SweepDuration::millis(1), true)?;
//! ```
//!
//! # Not yet implemented
//! * RAM playback
//! * Output shift keying
//! * Parallel data port
mod api;
pub mod bitfield;
pub mod clock;
pub mod convert;
mod error;
pub mod hal;
mod init;
#[cfg(test)]
mod mock;
pub mod pins;
pub mod ramp;
pub mod registers;
mod spi;
pub mod transport;

pub use clock::{ClockPlan, DacCurrent, DdsContext, VcoBand};
pub use error::{ConfigError, Error};
pub use hal::HalBoard;
pub use init::InitState;
pub use pins::{DdsPin, PinMap, PIN_COUNT};
pub use ramp::{SweepDuration, SweepPlan, TimeUnit};
pub use registers::{ProfileWord, RegisterAddr};
pub use transport::{BusConfig, Level, PinDescriptor, Transport, TransportError};

use pins::SequenceStep;

/// Number of single tone profiles
pub const PROFILE_COUNT: u8 = 8;

pub struct Ad9910<T> {
    transport: T,
    ctx: DdsContext,
    bus: BusConfig,
    pins: PinMap,
    setup: &'static [SequenceStep],
    indices: [Option<u8>; PIN_COUNT],
    state: InitState,
    plan: Option<ClockPlan>,
    // last committed CFR2 image, read by `ramp_enabled`
    cfr2: registers::cfr2::Value,
}

impl<T> Ad9910<T> {
    /// Creates an uninitialized driver. Nothing touches the bus until [`init`](Self::init).
    pub fn new(transport: T, pins: PinMap, ctx: DdsContext, bus: BusConfig) -> Self {
        Ad9910 {
            transport,
            ctx,
            bus,
            pins,
            setup: &pins::SETUP_SEQUENCE,
            indices: [None; PIN_COUNT],
            state: InitState::Uninitialized,
            plan: None,
            cfr2: registers::cfr2::defaults(),
        }
    }

    /// Replaces the power-up pin sequence run during initialization
    pub fn with_setup_sequence(mut self, setup: &'static [SequenceStep]) -> Self {
        self.setup = setup;
        self
    }

    pub fn context(&self) -> &DdsContext {
        &self.ctx
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InitState::Ready
    }

    /// Clock plan derived during initialization
    pub fn clock_plan(&self) -> Option<&ClockPlan> {
        self.plan.as_ref()
    }

    /// Gives the transport back
    pub fn release(self) -> T {
        self.transport
    }
}
