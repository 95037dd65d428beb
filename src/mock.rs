//! Recording board that behaves like an AD9910 behind a `Transport`
//!
//! Register frames land in a shadow bank when CS rises and move to the active
//! bank on the rising edge of IO_UPDATE, like the real chip.
use std::collections::BTreeMap;

use crate::pins::{DdsPin, PinMap, PIN_COUNT};
use crate::registers::{RegisterAddr, READ_FLAG};
use crate::transport::{BusConfig, Level, PinDescriptor, PinMode, Transport, TransportError};
use crate::{Ad9910, DdsContext};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Event {
    Attach(DdsPin),
    Direction(DdsPin, PinMode),
    Pin(DdsPin, Level),
    Toggle(DdsPin),
    BusInit,
    BusWrite(Vec<u8>),
    BusRead(usize),
    BusReset,
    DelayUs(u32),
    DelayMs(u32),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Op {
    Attach,
    PinWrite,
    BusInit,
    BusWrite,
    BusRead,
}

#[derive(Default)]
pub struct MockBoard {
    events: Vec<Event>,
    levels: [Option<Level>; PIN_COUNT],
    frame: Vec<u8>,
    shadow: BTreeMap<u8, u64>,
    active: BTreeMap<u8, u64>,
    frames: Vec<(u8, Vec<u8>)>,
    bus_ready: bool,
    fault: Option<(Op, usize, TransportError)>,
}

impl MockBoard {
    /// Pin map where logical pin `i` is board pin `i` on port 0
    pub fn pin_map() -> PinMap {
        let mut map = [PinDescriptor::UNMAPPED; PIN_COUNT];
        for pin in DdsPin::ALL {
            let mode = match pin {
                DdsPin::SpiSdo
                | DdsPin::Pdclk
                | DdsPin::DrOver
                | DdsPin::SyncClk
                | DdsPin::RamSwpOvr
                | DdsPin::PllLock => PinMode::Input,
                _ => PinMode::Output,
            };
            map[pin.index()] = PinDescriptor::new(0, pin as u8, mode);
        }
        map
    }

    pub fn driver() -> Ad9910<MockBoard> {
        Self::driver_with(DdsContext::default())
    }

    pub fn driver_with(ctx: DdsContext) -> Ad9910<MockBoard> {
        Ad9910::new(
            MockBoard::default(),
            Self::pin_map(),
            ctx,
            BusConfig::default(),
        )
    }

    /// Driver with resolved pins and an initialized bus, but no register programmed
    pub fn attached_driver() -> Ad9910<MockBoard> {
        let mut dds = Self::driver();
        for pin in DdsPin::ALL {
            dds.indices[pin.index()] = Some(pin as u8);
        }
        dds.transport.bus_ready = true;
        dds
    }

    /// Initialized driver with an empty event log
    pub fn ready_driver() -> Ad9910<MockBoard> {
        let mut dds = Self::driver();
        dds.init().unwrap();
        dds.transport.take_events();
        dds
    }

    /// Makes the `nth` (1-based) next call of `op` fail with `error`
    pub fn fail_on(&mut self, op: Op, nth: usize, error: TransportError) {
        self.fault = Some((op, nth, error));
    }

    fn check(&mut self, op: Op) -> Result<(), TransportError> {
        if let Some((fault_op, remaining, error)) = self.fault {
            if fault_op == op {
                if remaining <= 1 {
                    self.fault = None;
                    return Err(error);
                }
                self.fault = Some((fault_op, remaining - 1, error));
            }
        }
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn bus_writes(&self) -> Vec<Vec<u8>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::BusWrite(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Completed write frames as (address, payload), oldest first
    pub fn frames(&self) -> &[(u8, Vec<u8>)] {
        &self.frames
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    pub fn level(&self, pin: DdsPin) -> Option<Level> {
        self.levels[pin.index()]
    }

    pub fn shadow(&self, addr: RegisterAddr) -> Option<u64> {
        self.shadow.get(&(addr as u8)).copied()
    }

    pub fn active(&self, addr: RegisterAddr) -> Option<u64> {
        self.active.get(&(addr as u8)).copied()
    }

    /// Sets the level an input pin reads back, as if driven by the chip
    pub fn drive(&mut self, pin: DdsPin, level: Level) {
        self.levels[pin.index()] = Some(level);
    }

    pub fn preload(&mut self, addr: RegisterAddr, raw: u64) {
        self.shadow.insert(addr as u8, raw);
        self.active.insert(addr as u8, raw);
    }

    fn pin(index: u8) -> Result<DdsPin, TransportError> {
        DdsPin::ALL
            .get(index as usize)
            .copied()
            .ok_or(TransportError::InvalidPin)
    }

    fn end_frame(&mut self) {
        let frame = std::mem::take(&mut self.frame);
        if let Some((&header, payload)) = frame.split_first() {
            if header & READ_FLAG == 0 && !payload.is_empty() {
                let raw = payload.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
                self.shadow.insert(header, raw);
                self.frames.push((header, payload.to_vec()));
            }
        }
    }

    fn commit(&mut self) {
        for (addr, raw) in &self.shadow {
            self.active.insert(*addr, *raw);
        }
    }
}

impl Transport for MockBoard {
    fn attach(&mut self, pin: &PinDescriptor) -> Result<u8, TransportError> {
        self.check(Op::Attach)?;
        let index = pin.pin().ok_or(TransportError::InvalidPin)?;
        let role = Self::pin(index)?;
        self.events.push(Event::Attach(role));
        Ok(index)
    }

    fn set_direction(&mut self, index: u8, mode: PinMode) -> Result<(), TransportError> {
        let pin = Self::pin(index)?;
        self.events.push(Event::Direction(pin, mode));
        Ok(())
    }

    fn write(&mut self, index: u8, level: Level) -> Result<(), TransportError> {
        self.check(Op::PinWrite)?;
        let pin = Self::pin(index)?;
        let previous = self.levels[pin.index()];
        self.levels[pin.index()] = Some(level);
        self.events.push(Event::Pin(pin, level));
        match (pin, previous, level) {
            (DdsPin::SpiCs, Some(Level::Low), Level::High) => self.end_frame(),
            (DdsPin::SpiCs, _, Level::Low) => self.frame.clear(),
            (DdsPin::IoUpdate, Some(Level::Low), Level::High) => self.commit(),
            _ => {}
        }
        Ok(())
    }

    fn read(&mut self, index: u8) -> Result<Level, TransportError> {
        let pin = Self::pin(index)?;
        Ok(self.levels[pin.index()].unwrap_or(Level::Low))
    }

    fn toggle(&mut self, index: u8) -> Result<(), TransportError> {
        let pin = Self::pin(index)?;
        let level = !self.levels[pin.index()].unwrap_or(Level::Low);
        self.levels[pin.index()] = Some(level);
        self.events.push(Event::Toggle(pin));
        Ok(())
    }

    fn bus_init(&mut self, _config: &BusConfig) -> Result<(), TransportError> {
        self.check(Op::BusInit)?;
        self.bus_ready = true;
        self.events.push(Event::BusInit);
        Ok(())
    }

    fn bus_write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.bus_ready {
            return Err(TransportError::NotInitialized);
        }
        self.check(Op::BusWrite)?;
        self.events.push(Event::BusWrite(bytes.to_vec()));
        if self.levels[DdsPin::SpiCs.index()] == Some(Level::Low) {
            self.frame.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn bus_read(&mut self, buffer: &mut [u8]) -> Result<(), TransportError> {
        if !self.bus_ready {
            return Err(TransportError::NotInitialized);
        }
        self.check(Op::BusRead)?;
        self.events.push(Event::BusRead(buffer.len()));
        let raw = self
            .frame
            .first()
            .and_then(|header| self.active.get(&(header & !READ_FLAG)))
            .copied()
            .unwrap_or(0);
        let bytes = raw.to_be_bytes();
        let start = bytes.len().saturating_sub(buffer.len());
        buffer.copy_from_slice(&bytes[start..]);
        Ok(())
    }

    fn bus_reset(&mut self) -> Result<(), TransportError> {
        self.frame.clear();
        self.events.push(Event::BusReset);
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(Event::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::DelayMs(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock() {
        let mut board = MockBoard::default();
        board.bus_ready = true;
        let cs = DdsPin::SpiCs as u8;
        let update = DdsPin::IoUpdate as u8;
        board.write(update, Level::Low).unwrap();
        board.write(cs, Level::Low).unwrap();
        board.bus_write(&[0x03]).unwrap();
        board.bus_write(&[0x00, 0x00, 0x00, 0x7F]).unwrap();
        board.write(cs, Level::High).unwrap();
        assert_eq!(board.shadow(RegisterAddr::AuxDac), Some(0x7F));
        assert_eq!(board.active(RegisterAddr::AuxDac), None);
        board.write(update, Level::High).unwrap();
        assert_eq!(board.active(RegisterAddr::AuxDac), Some(0x7F));

        let mut read = [0u8; 4];
        board.write(cs, Level::Low).unwrap();
        board.bus_write(&[0x83]).unwrap();
        board.bus_read(&mut read).unwrap();
        board.write(cs, Level::High).unwrap();
        assert_eq!(u32::from_be_bytes(read), 0x7F);
        assert_eq!(board.frames().len(), 1);
    }

    #[test]
    fn faults_fire_once() {
        let mut board = MockBoard::default();
        board.fail_on(Op::BusInit, 2, TransportError::Timeout);
        assert!(board.bus_init(&BusConfig::default()).is_ok());
        assert_eq!(
            board.bus_init(&BusConfig::default()),
            Err(TransportError::Timeout)
        );
        assert!(board.bus_init(&BusConfig::default()).is_ok());
    }
}
