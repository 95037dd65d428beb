//! Logical pins of the AD9910 and its power-up pin sequence

use crate::transport::{Level, PinDescriptor};

/// Logical pin roles of the AD9910
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DdsPin {
    SpiSclk,
    SpiSdio,
    SpiSdo,
    SpiCs,
    IoUpdate,
    IoReset,
    MasterReset,
    Profile0,
    Profile1,
    Profile2,
    Osk,
    Pdclk,
    TxEnable,
    F0,
    F1,
    DrHold,
    PwrDwn,
    DrCtl,
    DrOver,
    SyncClk,
    RamSwpOvr,
    PllLock,
}

/// Number of logical pins
pub const PIN_COUNT: usize = DdsPin::PllLock as usize + 1;

impl DdsPin {
    pub const ALL: [DdsPin; PIN_COUNT] = [
        DdsPin::SpiSclk,
        DdsPin::SpiSdio,
        DdsPin::SpiSdo,
        DdsPin::SpiCs,
        DdsPin::IoUpdate,
        DdsPin::IoReset,
        DdsPin::MasterReset,
        DdsPin::Profile0,
        DdsPin::Profile1,
        DdsPin::Profile2,
        DdsPin::Osk,
        DdsPin::Pdclk,
        DdsPin::TxEnable,
        DdsPin::F0,
        DdsPin::F1,
        DdsPin::DrHold,
        DdsPin::PwrDwn,
        DdsPin::DrCtl,
        DdsPin::DrOver,
        DdsPin::SyncClk,
        DdsPin::RamSwpOvr,
        DdsPin::PllLock,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Board pin for every logical role, indexed by [`DdsPin::index`]
pub type PinMap = [PinDescriptor; PIN_COUNT];

/// One step of a pin sequence: drive `pin` to `level`, then wait `delay_us`
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SequenceStep {
    pub pin: u8,
    pub level: Level,
    pub delay_us: u16,
}

const fn step(pin: DdsPin, level: Level, delay_us: u16) -> SequenceStep {
    SequenceStep {
        pin: pin as u8,
        level,
        delay_us,
    }
}

/// Idle state followed by a master reset pulse, run before any register write
pub const SETUP_SEQUENCE: [SequenceStep; 19] = [
    step(DdsPin::IoUpdate, Level::Low, 50),
    step(DdsPin::MasterReset, Level::Low, 50),
    step(DdsPin::IoReset, Level::Low, 50),
    step(DdsPin::SpiCs, Level::Low, 50),
    step(DdsPin::Osk, Level::Low, 50),
    step(DdsPin::Profile0, Level::Low, 0),
    step(DdsPin::Profile1, Level::Low, 0),
    step(DdsPin::Profile2, Level::Low, 0),
    step(DdsPin::DrHold, Level::Low, 0),
    step(DdsPin::DrCtl, Level::Low, 0),
    step(DdsPin::PwrDwn, Level::Low, 50),
    // reset pulse
    step(DdsPin::MasterReset, Level::High, 10),
    step(DdsPin::MasterReset, Level::Low, 0),
    step(DdsPin::IoUpdate, Level::Low, 0),
    step(DdsPin::SpiCs, Level::High, 0),
    step(DdsPin::Osk, Level::High, 0),
    step(DdsPin::Profile0, Level::Low, 0),
    step(DdsPin::Profile1, Level::Low, 0),
    step(DdsPin::Profile2, Level::Low, 0),
];
