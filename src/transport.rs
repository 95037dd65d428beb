//! Capability interface to the board that carries the DDS
//!
//! The driver never touches GPIO or SPI peripherals directly. A board support
//! layer implements [`Transport`] and hands it to the driver by value.

use bitflags::bitflags;

/// Failure reported by a [`Transport`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    Generic,
    InvalidPin,
    InvalidArgument,
    Timeout,
    NotInitialized,
}

/// Logic level of a pin
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    Input,
    Output,
    /// Alternate (peripheral) function
    Alternate,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    Low,
    Medium,
    High,
}

/// Functional role of a pin
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinFunction {
    None,
    Clock,
    Data,
    Reset,
    Sync,
    ChipSelect,
}

/// Peripheral a pin belongs to
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    None,
    Spi,
    I2c,
    Uart,
    Gpio,
    Dds,
}

bitflags! {
    /// Which fields of a [`PinDescriptor`] carry meaning
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct PinValid: u8 {
        const PORT = 1 << 0;
        const PIN = 1 << 1;
        const MODE = 1 << 2;
        const PULL = 1 << 3;
        const DRIVE = 1 << 4;
        const FUNCTION = 1 << 5;
        const PERIPHERAL = 1 << 6;
    }
}

/// Board pin description. Fields are only reachable through accessors that
/// check the matching [`PinValid`] bit first.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PinDescriptor {
    valid: PinValid,
    port: u8,
    pin: u8,
    mode: PinMode,
    pull: Pull,
    drive: Drive,
    function: PinFunction,
    peripheral: Peripheral,
}

impl PinDescriptor {
    /// Descriptor with no valid field; the pin can't be attached
    pub const UNMAPPED: PinDescriptor = PinDescriptor {
        valid: PinValid::empty(),
        port: 0,
        pin: 0,
        mode: PinMode::Input,
        pull: Pull::None,
        drive: Drive::Medium,
        function: PinFunction::None,
        peripheral: Peripheral::None,
    };

    /// Fully specified pin with no pull, medium drive and no particular role
    pub const fn new(port: u8, pin: u8, mode: PinMode) -> Self {
        PinDescriptor {
            valid: PinValid::all(),
            port,
            pin,
            mode,
            ..Self::UNMAPPED
        }
    }

    pub const fn output(port: u8, pin: u8) -> Self {
        Self::new(port, pin, PinMode::Output)
    }

    pub const fn input(port: u8, pin: u8) -> Self {
        Self::new(port, pin, PinMode::Input)
    }

    pub const fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }

    pub const fn with_drive(mut self, drive: Drive) -> Self {
        self.drive = drive;
        self
    }

    pub const fn with_role(mut self, function: PinFunction, peripheral: Peripheral) -> Self {
        self.function = function;
        self.peripheral = peripheral;
        self
    }

    pub const fn valid(&self) -> PinValid {
        self.valid
    }

    pub fn port(&self) -> Option<u8> {
        self.valid.contains(PinValid::PORT).then_some(self.port)
    }

    pub fn pin(&self) -> Option<u8> {
        self.valid.contains(PinValid::PIN).then_some(self.pin)
    }

    pub fn mode(&self) -> Option<PinMode> {
        self.valid.contains(PinValid::MODE).then_some(self.mode)
    }

    pub fn pull(&self) -> Option<Pull> {
        self.valid.contains(PinValid::PULL).then_some(self.pull)
    }

    pub fn drive(&self) -> Option<Drive> {
        self.valid.contains(PinValid::DRIVE).then_some(self.drive)
    }

    pub fn function(&self) -> Option<PinFunction> {
        self.valid.contains(PinValid::FUNCTION).then_some(self.function)
    }

    pub fn peripheral(&self) -> Option<Peripheral> {
        self.valid
            .contains(PinValid::PERIPHERAL)
            .then_some(self.peripheral)
    }
}

/// Serial bus settings passed to [`Transport::bus_init`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub clock_hz: u32,
    pub lsb_first: bool,
    /// SPI mode 0..=3
    pub mode: u8,
    /// Byte clocked out while reading
    pub read_dummy: u8,
}

impl Default for BusConfig {
    /// 2 MHz, MSB first, mode 0
    fn default() -> Self {
        BusConfig {
            clock_hz: 2_000_000,
            lsb_first: false,
            mode: 0,
            read_dummy: 0x00,
        }
    }
}

/// Board capability consumed by the driver. Pins are addressed by the index
/// returned from [`attach`](Transport::attach).
pub trait Transport {
    /// Resolves and reserves a board pin
    fn attach(&mut self, pin: &PinDescriptor) -> Result<u8, TransportError>;
    fn set_direction(&mut self, index: u8, mode: PinMode) -> Result<(), TransportError>;
    fn write(&mut self, index: u8, level: Level) -> Result<(), TransportError>;
    fn read(&mut self, index: u8) -> Result<Level, TransportError>;
    fn toggle(&mut self, index: u8) -> Result<(), TransportError>;

    fn bus_init(&mut self, config: &BusConfig) -> Result<(), TransportError>;
    fn bus_write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    fn bus_read(&mut self, buffer: &mut [u8]) -> Result<(), TransportError>;
    fn bus_reset(&mut self) -> Result<(), TransportError>;

    fn delay_us(&mut self, us: u32);
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn attach(&mut self, pin: &PinDescriptor) -> Result<u8, TransportError> {
        (**self).attach(pin)
    }

    fn set_direction(&mut self, index: u8, mode: PinMode) -> Result<(), TransportError> {
        (**self).set_direction(index, mode)
    }

    fn write(&mut self, index: u8, level: Level) -> Result<(), TransportError> {
        (**self).write(index, level)
    }

    fn read(&mut self, index: u8) -> Result<Level, TransportError> {
        (**self).read(index)
    }

    fn toggle(&mut self, index: u8) -> Result<(), TransportError> {
        (**self).toggle(index)
    }

    fn bus_init(&mut self, config: &BusConfig) -> Result<(), TransportError> {
        (**self).bus_init(config)
    }

    fn bus_write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).bus_write(bytes)
    }

    fn bus_read(&mut self, buffer: &mut [u8]) -> Result<(), TransportError> {
        (**self).bus_read(buffer)
    }

    fn bus_reset(&mut self) -> Result<(), TransportError> {
        (**self).bus_reset()
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

// Tests
