//! [`Transport`] over `embedded-hal` 0.2 traits
//!
//! Board pins are held in a fixed array and a descriptor's pin number is its
//! position in that array; the port is ignored. Pin direction and bus timing
//! are fixed when the HAL objects are built, so `set_direction` and
//! `bus_init` only check that the request matches what the HAL can do.

use embedded_hal as hal;
use hal::blocking::delay::{DelayMs, DelayUs};
use hal::blocking::spi::{Transfer, Write};
use hal::digital::v2::{InputPin, OutputPin};

use crate::transport::{BusConfig, Level, PinDescriptor, PinMode, Transport, TransportError};

pub struct HalBoard<SPI, P, D, const N: usize> {
    spi: SPI,
    pins: [P; N],
    delay: D,
    levels: [Level; N],
    read_dummy: u8,
    bus_ready: bool,
}

impl<SPI, P, D, const N: usize> HalBoard<SPI, P, D, N> {
    /// Wraps a SPI bus, the board pins and a delay.
    ///
    /// Every pin has the same type `P`, which must be both an output and an
    /// input. Most HALs give each pin its own type, so use their erased (or
    /// dynamic) pin type, e.g. `ErasedPin<Dynamic>` or `Flex`, to fill the array.
    /// Pin `i` of the array is the board pin a [`PinDescriptor`] with pin
    /// number `i` resolves to.
    pub fn new(spi: SPI, pins: [P; N], delay: D) -> Self {
        HalBoard {
            spi,
            pins,
            delay,
            levels: [Level::Low; N],
            read_dummy: 0,
            bus_ready: false,
        }
    }

    /// Gives back the SPI bus, the pins and the delay
    pub fn release(self) -> (SPI, [P; N], D) {
        (self.spi, self.pins, self.delay)
    }

    fn slot(index: u8) -> Result<usize, TransportError> {
        let slot = index as usize;
        if slot < N {
            Ok(slot)
        } else {
            Err(TransportError::InvalidPin)
        }
    }
}

impl<SPI, P, D, const N: usize> Transport for HalBoard<SPI, P, D, N>
where
    SPI: Write<u8> + Transfer<u8>,
    P: OutputPin + InputPin,
    D: DelayUs<u32> + DelayMs<u32>,
{
    fn attach(&mut self, pin: &PinDescriptor) -> Result<u8, TransportError> {
        let index = pin.pin().ok_or(TransportError::InvalidPin)?;
        Self::slot(index)?;
        Ok(index)
    }

    fn set_direction(&mut self, index: u8, mode: PinMode) -> Result<(), TransportError> {
        Self::slot(index)?;
        match mode {
            PinMode::Input | PinMode::Output => Ok(()),
            PinMode::Alternate => Err(TransportError::InvalidArgument),
        }
    }

    fn write(&mut self, index: u8, level: Level) -> Result<(), TransportError> {
        let slot = Self::slot(index)?;
        let pin = &mut self.pins[slot];
        let result = match level {
            Level::High => pin.set_high(),
            Level::Low => pin.set_low(),
        };
        result.map_err(|_| TransportError::Generic)?;
        self.levels[slot] = level;
        Ok(())
    }

    fn read(&mut self, index: u8) -> Result<Level, TransportError> {
        let slot = Self::slot(index)?;
        let high = self.pins[slot]
            .is_high()
            .map_err(|_| TransportError::Generic)?;
        Ok(Level::from(high))
    }

    fn toggle(&mut self, index: u8) -> Result<(), TransportError> {
        let slot = Self::slot(index)?;
        self.write(index, !self.levels[slot])
    }

    fn bus_init(&mut self, config: &BusConfig) -> Result<(), TransportError> {
        if config.mode > 3 || config.lsb_first {
            return Err(TransportError::InvalidArgument);
        }
        self.read_dummy = config.read_dummy;
        self.bus_ready = true;
        Ok(())
    }

    fn bus_write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.bus_ready {
            return Err(TransportError::NotInitialized);
        }
        self.spi.write(bytes).map_err(|_| TransportError::Generic)
    }

    fn bus_read(&mut self, buffer: &mut [u8]) -> Result<(), TransportError> {
        if !self.bus_ready {
            return Err(TransportError::NotInitialized);
        }
        buffer.fill(self.read_dummy);
        self.spi
            .transfer(buffer)
            .map_err(|_| TransportError::Generic)?;
        Ok(())
    }

    fn bus_reset(&mut self) -> Result<(), TransportError> {
        if !self.bus_ready {
            return Err(TransportError::NotInitialized);
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

// Tests
