//! AD9910 register map
//!
//! Each register is a module holding its address, its value type and one
//! [`Field`] constant per bit field, plus builders for the images the driver
//! programs. Multi-byte words are split into byte-local fields, least
//! significant first, and written with [`RegisterValue::insert_wide`].

use crate::bitfield::{Field, RegisterValue};
use crate::clock::{ClockPlan, DacCurrent, VcoBand};

/// Read flag of the instruction byte
pub const READ_FLAG: u8 = 0x80;

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAddr {
    // Control function register 1
    Cfr1 = 0x00,
    // Control function register 2
    Cfr2 = 0x01,
    // Control function register 3, PLL and REFCLK path
    Cfr3 = 0x02,
    // Auxiliary DAC full-scale current
    AuxDac = 0x03,
    IoUpdateRate = 0x04,
    Ftw = 0x07,
    Pow = 0x08,
    Asf = 0x09,
    MultichipSync = 0x0A,
    // Digital ramp limits, step sizes and rates
    DrLimit = 0x0B,
    DrStep = 0x0C,
    DrRate = 0x0D,
    // Single tone profiles
    Profile0 = 0x0E,
    Profile1 = 0x0F,
    Profile2 = 0x10,
    Profile3 = 0x11,
    Profile4 = 0x12,
    Profile5 = 0x13,
    Profile6 = 0x14,
    Profile7 = 0x15,
}

impl RegisterAddr {
    /// Payload length on the wire, in bytes
    pub const fn len(self) -> usize {
        match self {
            RegisterAddr::Pow => 2,
            RegisterAddr::DrLimit
            | RegisterAddr::DrStep
            | RegisterAddr::Profile0
            | RegisterAddr::Profile1
            | RegisterAddr::Profile2
            | RegisterAddr::Profile3
            | RegisterAddr::Profile4
            | RegisterAddr::Profile5
            | RegisterAddr::Profile6
            | RegisterAddr::Profile7 => 8,
            _ => 4,
        }
    }

    /// Single tone profile register for `index` (0..=7)
    pub const fn profile(index: u8) -> Option<RegisterAddr> {
        Some(match index {
            0 => RegisterAddr::Profile0,
            1 => RegisterAddr::Profile1,
            2 => RegisterAddr::Profile2,
            3 => RegisterAddr::Profile3,
            4 => RegisterAddr::Profile4,
            5 => RegisterAddr::Profile5,
            6 => RegisterAddr::Profile6,
            7 => RegisterAddr::Profile7,
            _ => return None,
        })
    }

    /// Instruction byte for a write
    pub const fn write_header(self) -> u8 {
        self as u8 & !READ_FLAG
    }

    /// Instruction byte for a read
    pub const fn read_header(self) -> u8 {
        self as u8 | READ_FLAG
    }
}

macro_rules! register {
    ($(#[$doc:meta])*
     $module:ident: $addr:ident, $len:literal,
     fields:
     {
         $($field:ident: ($start:literal, $width:literal),)*
     }
     $($item:item)*) => {
        $(#[$doc])*
        pub mod $module {
            #[allow(unused_imports)]
            use super::*;

            pub const ADDR: RegisterAddr = RegisterAddr::$addr;
            pub type Value = RegisterValue<$len>;

            const _: () = assert!(ADDR.len() == $len, "register length mismatch");

            $(pub const $field: Field = Field::new($start, $width);)*

            $($item)*
        }
    };
}

register!(
    /// Control function register 1
    cfr1: Cfr1, 4,
    fields:
    {
        RAM_ENABLE: (31, 1),
        RAM_DEST: (29, 2),
        MANUAL_OSK: (23, 1),
        INV_SINC: (22, 1),
        INT_PROFILE: (17, 4),
        DDS_SINE: (16, 1),
        LOAD_LRR: (15, 1),
        AUTOCLR_DRG_ACC: (14, 1),
        AUTOCLR_PHASE_ACC: (13, 1),
        CLR_DRG_ACC: (12, 1),
        CLR_PHASE_ACC: (11, 1),
        LOAD_ARR: (10, 1),
        OSK_ENABLE: (9, 1),
        AUTO_OSK: (8, 1),
        PD_DIGITAL: (7, 1),
        PD_DAC: (6, 1),
        PD_REFCLK: (5, 1),
        PD_AUX_DAC: (4, 1),
        EXT_PD_MODE: (3, 1),
        SDIO_INPUT_ONLY: (1, 1),
        LSB_FIRST: (0, 1),
    }

    /// Power-up image: three-wire SPI with SDIO as input only
    pub fn defaults() -> Value {
        let mut v = Value::zero();
        v.set(SDIO_INPUT_ONLY, true);
        v
    }

    /// Image used while a frequency ramp runs
    pub fn ramp_setup() -> Value {
        let mut v = defaults();
        v.set(AUTOCLR_DRG_ACC, true);
        v
    }
);

register!(
    /// Control function register 2
    cfr2: Cfr2, 4,
    fields:
    {
        AMP_SCALE_PROFILE: (24, 1),
        INT_IO_UPDATE: (23, 1),
        SYNC_CLK_ENABLE: (22, 1),
        DR_DEST: (20, 2),
        DR_ENABLE: (19, 1),
        DR_NODWELL_HIGH: (18, 1),
        DR_NODWELL_LOW: (17, 1),
        READ_EFFECTIVE_FTW: (16, 1),
        IO_UPDATE_RATE: (14, 2),
        PDCLK_ENABLE: (11, 1),
        PDCLK_INVERT: (10, 1),
        TXENABLE_INVERT: (9, 1),
        MATCHED_LATENCY: (7, 1),
        HOLD_LAST_VALUE: (6, 1),
        SYNC_VAL_DISABLE: (5, 1),
        PAR_DATA_ENABLE: (4, 1),
        FM_GAIN: (0, 4),
    }

    /// Ramp destination code for frequency
    pub const DR_DEST_FREQUENCY: u8 = 0;

    /// Power-up image: amplitude taken from the active profile
    pub fn defaults() -> Value {
        let mut v = Value::zero();
        v.set(AMP_SCALE_PROFILE, true).set(SYNC_VAL_DISABLE, true);
        v
    }

    /// Defaults plus the ramp generator driving frequency. No-dwell on both
    /// ends makes the ramp free-run between its limits.
    pub fn ramp_enabled(continuous: bool) -> Value {
        let mut v = defaults();
        v.set(DR_ENABLE, true)
            .insert(DR_DEST, DR_DEST_FREQUENCY)
            .set(DR_NODWELL_HIGH, continuous)
            .set(DR_NODWELL_LOW, continuous);
        v
    }
);

register!(
    /// Control function register 3
    cfr3: Cfr3, 4,
    fields:
    {
        DRV0: (28, 2),
        VCO_SEL: (24, 3),
        ICP: (19, 3),
        REF_DIV_BYPASS: (15, 1),
        REF_DIV_RESETB: (14, 1),
        PFD_RESET: (10, 1),
        PLL_ENABLE: (8, 1),
        N: (1, 7),
    }

    /// Charge pump current 387 uA
    pub const ICP_MAX: u8 = 0b111;

    /// Image for a validated clock plan. `multiplier` is ignored in bypass.
    pub fn from_plan(plan: &ClockPlan, multiplier: u8) -> Value {
        let mut v = Value::zero();
        v.set(REF_DIV_RESETB, true)
            .set(REF_DIV_BYPASS, !plan.ref_div2)
            .insert(VCO_SEL, plan.vco as u8);
        if plan.vco != VcoBand::Bypass {
            v.set(PLL_ENABLE, true)
                .insert(ICP, ICP_MAX)
                .insert(N, multiplier);
        }
        v
    }
);

register!(
    /// Auxiliary DAC, full-scale output current
    aux_dac: AuxDac, 4,
    fields:
    {
        FSC: (0, 8),
    }

    pub fn defaults(current: DacCurrent) -> Value {
        let mut v = Value::zero();
        v.insert(FSC, current.fsc_code());
        v
    }
);

register!(
    /// Digital ramp upper and lower limits
    dr_limit: DrLimit, 8,
    fields:
    {
        LOWER0: (0, 8),
        LOWER1: (8, 8),
        LOWER2: (16, 8),
        LOWER3: (24, 8),
        UPPER0: (32, 8),
        UPPER1: (40, 8),
        UPPER2: (48, 8),
        UPPER3: (56, 8),
    }

    pub const LOWER: [Field; 4] = [LOWER0, LOWER1, LOWER2, LOWER3];
    pub const UPPER: [Field; 4] = [UPPER0, UPPER1, UPPER2, UPPER3];

    pub fn limits(lower: u32, upper: u32) -> Value {
        let mut v = Value::zero();
        v.insert_wide(&LOWER, lower as u64)
            .insert_wide(&UPPER, upper as u64);
        v
    }
);

register!(
    /// Digital ramp increment and decrement step sizes
    dr_step: DrStep, 8,
    fields:
    {
        INC0: (0, 8),
        INC1: (8, 8),
        INC2: (16, 8),
        INC3: (24, 8),
        DEC0: (32, 8),
        DEC1: (40, 8),
        DEC2: (48, 8),
        DEC3: (56, 8),
    }

    pub const INCREMENT: [Field; 4] = [INC0, INC1, INC2, INC3];
    pub const DECREMENT: [Field; 4] = [DEC0, DEC1, DEC2, DEC3];

    pub fn steps(increment: u32, decrement: u32) -> Value {
        let mut v = Value::zero();
        v.insert_wide(&INCREMENT, increment as u64)
            .insert_wide(&DECREMENT, decrement as u64);
        v
    }
);

register!(
    /// Digital ramp positive and negative slope rates
    dr_rate: DrRate, 4,
    fields:
    {
        POS0: (0, 8),
        POS1: (8, 8),
        NEG0: (16, 8),
        NEG1: (24, 8),
    }

    pub const POSITIVE: [Field; 2] = [POS0, POS1];
    pub const NEGATIVE: [Field; 2] = [NEG0, NEG1];

    pub fn rates(positive: u16, negative: u16) -> Value {
        let mut v = Value::zero();
        v.insert_wide(&POSITIVE, positive as u64)
            .insert_wide(&NEGATIVE, negative as u64);
        v
    }
);

register!(
    /// Single tone profile layout, shared by the eight profile registers
    profile: Profile0, 8,
    fields:
    {
        FTW0: (0, 8),
        FTW1: (8, 8),
        FTW2: (16, 8),
        FTW3: (24, 8),
        POW0: (32, 8),
        POW1: (40, 8),
        ASF0: (48, 8),
        ASF1: (56, 6),
    }

    pub const FTW: [Field; 4] = [FTW0, FTW1, FTW2, FTW3];
    pub const POW: [Field; 2] = [POW0, POW1];
    pub const ASF: [Field; 2] = [ASF0, ASF1];
);

/// Contents of a single tone profile register
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileWord {
    /// Frequency tuning word
    pub ftw: u32,
    /// Phase offset word
    pub pow: u16,
    /// Amplitude scale factor, 14 bits
    pub asf: u16,
}

impl ProfileWord {
    pub fn encode(&self) -> profile::Value {
        let mut v = profile::Value::zero();
        v.insert_wide(&profile::FTW, self.ftw as u64)
            .insert_wide(&profile::POW, self.pow as u64)
            .insert_wide(&profile::ASF, self.asf as u64);
        v
    }

    pub fn decode(value: &profile::Value) -> Self {
        ProfileWord {
            ftw: value.extract_wide(&profile::FTW) as u32,
            pow: value.extract_wide(&profile::POW) as u16,
            asf: value.extract_wide(&profile::ASF) as u16,
        }
    }
}

// Tests
