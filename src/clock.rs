//! Reference clock validation and system clock derivation

use crate::error::ConfigError;

/// Datasheet system clock rating
pub const SYSCLK_MAX_HZ: u64 = 1_000_000_000;
/// Lowest PLL input frequency
pub const PLL_INPUT_MIN_HZ: u64 = 3_200_000;
/// Highest PLL input frequency
pub const PLL_INPUT_MAX_HZ: u64 = 60_000_000;
pub const PLL_MULTIPLIER_MIN: u8 = 12;
pub const PLL_MULTIPLIER_MAX: u8 = 127;

/// Full-scale DAC current selected through the auxiliary DAC
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacCurrent {
    /// FSC code 0x7F
    #[default]
    Normal,
    /// FSC code 0xFF
    High,
}

impl DacCurrent {
    pub const fn fsc_code(self) -> u8 {
        match self {
            DacCurrent::Normal => 0x7F,
            DacCurrent::High => 0xFF,
        }
    }
}

/// User supplied oscillator configuration
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DdsContext {
    /// Frequency applied on REFCLK in Hz
    pub ref_clk_hz: u64,
    pub pll_enable: bool,
    /// PLL feedback divider N, programmed as-is into CFR3
    pub pll_multiplier: u8,
    pub dac_current: DacCurrent,
    /// Lift the 1 GHz system clock cap up to the top of the VCO table
    pub allow_overclock: bool,
}

impl Default for DdsContext {
    /// 100 MHz reference, PLL on with N = 20, normal DAC current
    fn default() -> Self {
        DdsContext {
            ref_clk_hz: 100_000_000,
            pll_enable: true,
            pll_multiplier: 20,
            dac_current: DacCurrent::Normal,
            allow_overclock: false,
        }
    }
}

/// VCO range selected in CFR3
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VcoBand {
    /// 370 to 510 MHz
    Vco0 = 0,
    /// 420 to 590 MHz
    Vco1 = 1,
    /// 500 to 700 MHz
    Vco2 = 2,
    /// 600 to 880 MHz
    Vco3 = 3,
    /// 700 to 950 MHz
    Vco4 = 4,
    /// 820 to 1150 MHz
    Vco5 = 5,
    /// PLL bypassed
    Bypass = 6,
}

const VCO_TABLE: [(VcoBand, u64, u64); 6] = [
    (VcoBand::Vco0, 370_000_000, 510_000_000),
    (VcoBand::Vco1, 420_000_000, 590_000_000),
    (VcoBand::Vco2, 500_000_000, 700_000_000),
    (VcoBand::Vco3, 600_000_000, 880_000_000),
    (VcoBand::Vco4, 700_000_000, 950_000_000),
    (VcoBand::Vco5, 820_000_000, 1_150_000_000),
];

impl VcoBand {
    /// First band, lowest to highest, containing `sysclk_hz`
    pub fn select(sysclk_hz: u64) -> Option<VcoBand> {
        VCO_TABLE
            .iter()
            .find(|(_, lo, hi)| (*lo..=*hi).contains(&sysclk_hz))
            .map(|(band, _, _)| *band)
    }
}

/// Clock configuration derived from a validated [`DdsContext`]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Operating (system) clock in Hz
    pub sysclk_hz: u64,
    /// REFCLK input divider engaged
    pub ref_div2: bool,
    pub vco: VcoBand,
}

impl ClockPlan {
    /// Validates `ctx` and derives the system clock, divider flag and VCO band
    pub fn derive(ctx: &DdsContext) -> Result<ClockPlan, ConfigError> {
        let reference = ctx.ref_clk_hz;

        if !ctx.pll_enable {
            if reference == 0 || reference > SYSCLK_MAX_HZ {
                return Err(ConfigError::ReferenceOutOfRange);
            }
            return Ok(ClockPlan {
                sysclk_hz: reference,
                ref_div2: false,
                vco: VcoBand::Bypass,
            });
        }

        let window = PLL_INPUT_MIN_HZ..=PLL_INPUT_MAX_HZ;
        let (pll_in, ref_div2) = if window.contains(&reference) {
            (reference, false)
        } else {
            (reference / 2, true)
        };
        if !window.contains(&pll_in) {
            return Err(ConfigError::PllInputOutOfRange);
        }

        if !(PLL_MULTIPLIER_MIN..=PLL_MULTIPLIER_MAX).contains(&ctx.pll_multiplier) {
            return Err(ConfigError::MultiplierOutOfRange);
        }

        let sysclk_hz = pll_in * ctx.pll_multiplier as u64;
        if !ctx.allow_overclock && sysclk_hz > SYSCLK_MAX_HZ {
            return Err(ConfigError::Overclocked);
        }
        let vco = VcoBand::select(sysclk_hz).ok_or(ConfigError::NoVcoBand)?;

        Ok(ClockPlan {
            sysclk_hz,
            ref_div2,
            vco,
        })
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn pll(ref_clk_hz: u64, pll_multiplier: u8) -> DdsContext {
        DdsContext {
            ref_clk_hz,
            pll_multiplier,
            ..Default::default()
        }
    }

    #[test]
    fn documented_example() {
        let plan = ClockPlan::derive(&DdsContext::default()).unwrap();
        assert_eq!(plan.sysclk_hz, 1_000_000_000);
        assert!(plan.ref_div2);
        assert_eq!(plan.vco, VcoBand::Vco5);
    }

    #[test]
    fn direct_pll_input() {
        let plan = ClockPlan::derive(&pll(50_000_000, 20)).unwrap();
        assert_eq!(plan.sysclk_hz, 1_000_000_000);
        assert!(!plan.ref_div2);
    }

    #[test]
    fn bypass() {
        let ctx = DdsContext {
            ref_clk_hz: 50_000_000,
            pll_enable: false,
            ..Default::default()
        };
        let plan = ClockPlan::derive(&ctx).unwrap();
        assert_eq!(plan.sysclk_hz, 50_000_000);
        assert!(!plan.ref_div2);
        assert_eq!(plan.vco, VcoBand::Bypass);

        let zero = DdsContext { ref_clk_hz: 0, ..ctx };
        assert_eq!(ClockPlan::derive(&zero), Err(ConfigError::ReferenceOutOfRange));
        let fast = DdsContext {
            ref_clk_hz: 1_000_000_001,
            ..ctx
        };
        assert_eq!(ClockPlan::derive(&fast), Err(ConfigError::ReferenceOutOfRange));
    }

    #[test]
    fn slow_reference_fails_after_halving() {
        assert_eq!(
            ClockPlan::derive(&pll(2_000_000, 20)),
            Err(ConfigError::PllInputOutOfRange)
        );
        assert_eq!(
            ClockPlan::derive(&pll(200_000_000, 20)),
            Err(ConfigError::PllInputOutOfRange)
        );
    }

    #[test]
    fn multiplier_range() {
        assert_eq!(
            ClockPlan::derive(&pll(25_000_000, 11)),
            Err(ConfigError::MultiplierOutOfRange)
        );
        assert_eq!(
            ClockPlan::derive(&pll(4_000_000, 128)),
            Err(ConfigError::MultiplierOutOfRange)
        );
    }

    #[test]
    fn overclock() {
        let ctx = pll(50_000_000, 22);
        assert_eq!(ClockPlan::derive(&ctx), Err(ConfigError::Overclocked));
        let plan = ClockPlan::derive(&DdsContext {
            allow_overclock: true,
            ..ctx
        })
        .unwrap();
        assert_eq!(plan.sysclk_hz, 1_100_000_000);
        assert_eq!(plan.vco, VcoBand::Vco5);
        let too_fast = DdsContext {
            allow_overclock: true,
            ..pll(60_000_000, 20)
        };
        assert_eq!(ClockPlan::derive(&too_fast), Err(ConfigError::NoVcoBand));
    }

    #[test]
    fn below_vco_table() {
        assert_eq!(
            ClockPlan::derive(&pll(20_000_000, 12)),
            Err(ConfigError::NoVcoBand)
        );
    }

    #[test]
    fn overlapping_bands_pick_lowest() {
        assert_eq!(VcoBand::select(370_000_000), Some(VcoBand::Vco0));
        assert_eq!(VcoBand::select(450_000_000), Some(VcoBand::Vco0));
        assert_eq!(VcoBand::select(510_000_001), Some(VcoBand::Vco1));
        assert_eq!(VcoBand::select(600_000_000), Some(VcoBand::Vco2));
        assert_eq!(VcoBand::select(900_000_000), Some(VcoBand::Vco4));
        assert_eq!(VcoBand::select(960_000_000), Some(VcoBand::Vco5));
        assert_eq!(VcoBand::select(369_999_999), None);
        assert_eq!(VcoBand::select(1_150_000_001), None);
    }
}
