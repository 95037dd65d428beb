use crate::bitfield::RegisterValue;
use crate::error::Error;
use crate::pins::{DdsPin, PIN_COUNT};
use crate::registers::RegisterAddr;
use crate::transport::{Level, Transport, TransportError};
use crate::Ad9910;

/// Settling time around each IO_UPDATE edge
pub(crate) const IO_UPDATE_SETTLE_US: u32 = 10;

enum Payload<'a> {
    Write(&'a [u8]),
    Read(&'a mut [u8]),
}

impl<T> Ad9910<T>
where
    T: Transport,
{
    /// Drives the pin at position `pin` of the pin map
    pub(crate) fn pin_write_index(&mut self, pin: u8, level: Level) -> Result<(), Error> {
        if pin as usize >= PIN_COUNT {
            return Err(Error::InvalidParameter);
        }
        let index = self.indices[pin as usize].ok_or(Error::Hardware(TransportError::InvalidPin))?;
        Ok(self.transport.write(index, level)?)
    }

    pub(crate) fn pin_write(&mut self, pin: DdsPin, level: Level) -> Result<(), Error> {
        self.pin_write_index(pin as u8, level)
    }

    pub(crate) fn pin_read(&mut self, pin: DdsPin) -> Result<Level, Error> {
        let index = self.indices[pin.index()].ok_or(Error::Hardware(TransportError::InvalidPin))?;
        Ok(self.transport.read(index)?)
    }

    /// One register transaction: CS low, instruction byte, payload, CS high.
    /// CS is released even when the transaction fails.
    fn operate(&mut self, addr: RegisterAddr, payload: Payload<'_>) -> Result<(), Error> {
        let len = match &payload {
            Payload::Write(data) => data.len(),
            Payload::Read(buf) => buf.len(),
        };
        if len != addr.len() {
            return Err(Error::InvalidParameter);
        }

        let result = self
            .pin_write(DdsPin::SpiCs, Level::Low)
            .and_then(|()| self.exchange(addr, payload));

        match result {
            Ok(()) => self.pin_write(DdsPin::SpiCs, Level::High),
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("transaction on {} failed: {}", addr, e);
                let _ = self.pin_write(DdsPin::SpiCs, Level::High);
                Err(e)
            }
        }
    }

    fn exchange(&mut self, addr: RegisterAddr, payload: Payload<'_>) -> Result<(), Error> {
        match payload {
            Payload::Write(data) => {
                self.transport.bus_write(&[addr.write_header()])?;
                self.transport.bus_write(data)?;
            }
            Payload::Read(buf) => {
                self.transport.bus_write(&[addr.read_header()])?;
                self.transport.bus_read(buf)?;
            }
        }
        Ok(())
    }

    pub(crate) fn write_bytes(&mut self, addr: RegisterAddr, data: &[u8]) -> Result<(), Error> {
        self.operate(addr, Payload::Write(data))
    }

    pub(crate) fn read_bytes(&mut self, addr: RegisterAddr, buf: &mut [u8]) -> Result<(), Error> {
        self.operate(addr, Payload::Read(buf))
    }

    pub(crate) fn write_reg<const N: usize>(
        &mut self,
        addr: RegisterAddr,
        value: &RegisterValue<N>,
    ) -> Result<(), Error> {
        self.write_bytes(addr, &value.to_bytes())
    }

    pub(crate) fn read_reg<const N: usize>(
        &mut self,
        addr: RegisterAddr,
    ) -> Result<RegisterValue<N>, Error> {
        let mut buf = [0u8; N];
        self.read_bytes(addr, &mut buf)?;
        Ok(RegisterValue::from_be_bytes(&buf))
    }

    /// Pulses IO_UPDATE low, high, low, committing buffered register writes.
    /// On failure the line is driven low again before the error is returned.
    pub(crate) fn io_update(&mut self) -> Result<(), Error> {
        let result = self.io_update_edges();
        if result.is_err() {
            let _ = self.pin_write(DdsPin::IoUpdate, Level::Low);
        }
        result
    }

    fn io_update_edges(&mut self) -> Result<(), Error> {
        self.pin_write(DdsPin::IoUpdate, Level::Low)?;
        self.transport.delay_us(IO_UPDATE_SETTLE_US);
        self.pin_write(DdsPin::IoUpdate, Level::High)?;
        self.transport.delay_us(IO_UPDATE_SETTLE_US);
        self.pin_write(DdsPin::IoUpdate, Level::Low)
    }

    /// Writes a register then commits it
    pub(crate) fn write_reg_applied<const N: usize>(
        &mut self,
        addr: RegisterAddr,
        value: &RegisterValue<N>,
    ) -> Result<(), Error> {
        self.write_reg(addr, value)?;
        self.io_update()
    }
}

// Tests
