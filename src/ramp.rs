//! Digital ramp generator planning
//!
//! The ramp accumulator advances by `step_size` every `step_rate` ramp clocks,
//! and one ramp clock is four system clocks. Planning picks the pair whose
//! traverse time from start to end is nearest to the requested duration.

use crate::convert::frequency_to_ftw;
use crate::error::Error;

/// System clock cycles per ramp clock
pub const CYCLES_PER_STEP: u64 = 4;
pub const STEP_RATE_MAX: u16 = u16::MAX;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl TimeUnit {
    pub const fn nanos(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Nanoseconds => 1,
        }
    }
}

/// Sweep duration as given by the caller. Zero, negative or overflowing
/// values are rejected when the sweep is planned.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepDuration {
    pub value: i64,
    pub unit: TimeUnit,
}

impl SweepDuration {
    pub const fn new(value: i64, unit: TimeUnit) -> Self {
        SweepDuration { value, unit }
    }

    pub const fn secs(value: i64) -> Self {
        Self::new(value, TimeUnit::Seconds)
    }

    pub const fn millis(value: i64) -> Self {
        Self::new(value, TimeUnit::Milliseconds)
    }

    pub const fn micros(value: i64) -> Self {
        Self::new(value, TimeUnit::Microseconds)
    }

    pub const fn nanos(value: i64) -> Self {
        Self::new(value, TimeUnit::Nanoseconds)
    }

    pub fn to_nanos(&self) -> Result<u64, Error> {
        if self.value <= 0 {
            return Err(Error::InvalidParameter);
        }
        let ns = self
            .value
            .checked_mul(self.unit.nanos())
            .ok_or(Error::InvalidParameter)?;
        Ok(ns as u64)
    }
}

/// Resolved ramp parameters
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepPlan {
    pub start_ftw: u32,
    pub end_ftw: u32,
    pub step_size: u32,
    pub step_rate: u16,
    pub continuous: bool,
}

fn div_round(num: u128, den: u128) -> u128 {
    (num + den / 2) / den
}

impl SweepPlan {
    pub fn plan(
        start_hz: u64,
        stop_hz: u64,
        duration: SweepDuration,
        continuous: bool,
        sysclk_hz: u64,
    ) -> Result<SweepPlan, Error> {
        if start_hz == 0 || stop_hz <= start_hz || sysclk_hz == 0 {
            return Err(Error::InvalidParameter);
        }
        let desired_ns = duration.to_nanos()?;

        let start_ftw = frequency_to_ftw(start_hz, sysclk_hz);
        let end_ftw = frequency_to_ftw(stop_hz, sysclk_hz);
        let delta = end_ftw.saturating_sub(start_ftw);
        if delta == 0 {
            return Err(Error::InvalidParameter);
        }

        // base_ns = 4 * delta * 1e9 / sysclk; compare both sides scaled by sysclk
        let base = CYCLES_PER_STEP as u128 * NANOS_PER_SECOND * delta as u128;
        let desired = desired_ns as u128 * sysclk_hz as u128;

        let mut step_size = 1u32;
        let mut step_rate = 1u16;
        if base < desired {
            step_rate = div_round(desired, base).clamp(1, STEP_RATE_MAX as u128) as u16;
        } else if base > desired {
            step_size = div_round(base, desired).clamp(1, delta as u128) as u32;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "sweep {=u32:#x}..{=u32:#x}: step {=u32} every {=u16}",
            start_ftw,
            end_ftw,
            step_size,
            step_rate
        );

        Ok(SweepPlan {
            start_ftw,
            end_ftw,
            step_size,
            step_rate,
            continuous,
        })
    }

    /// Time for one pass from start to end at `sysclk_hz`, in nanoseconds
    pub fn traverse_ns(&self, sysclk_hz: u64) -> u64 {
        if sysclk_hz == 0 || self.step_size == 0 {
            return 0;
        }
        let delta = self.end_ftw.saturating_sub(self.start_ftw) as u128;
        let steps = (delta + self.step_size as u128 - 1) / self.step_size as u128;
        let cycles = steps * self.step_rate as u128 * CYCLES_PER_STEP as u128;
        div_round(cycles * NANOS_PER_SECOND, sysclk_hz as u128) as u64
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GHZ: u64 = 1_000_000_000;

    fn distance(plan: &SweepPlan, desired_ns: u64) -> u64 {
        plan.traverse_ns(GHZ).abs_diff(desired_ns)
    }

    #[test]
    fn fast_sweep_grows_step_size() {
        let plan =
            SweepPlan::plan(1_000_000, 2_000_000, SweepDuration::millis(1), false, GHZ).unwrap();
        assert_eq!(plan.start_ftw, frequency_to_ftw(1_000_000, GHZ));
        assert_eq!(plan.end_ftw, frequency_to_ftw(2_000_000, GHZ));
        assert_eq!(plan.step_rate, 1);
        assert_eq!(plan.step_size, 17);
        // no neighbouring step size lands closer to 1 ms
        for size in [16, 18] {
            let other = SweepPlan {
                step_size: size,
                ..plan
            };
            assert!(distance(&plan, 1_000_000) < distance(&other, 1_000_000));
        }
    }

    #[test]
    fn slow_sweep_grows_step_rate() {
        let plan = SweepPlan::plan(1_000_000, 2_000_000, SweepDuration::secs(1), true, GHZ).unwrap();
        assert_eq!(plan.step_size, 1);
        assert_eq!(plan.step_rate, 58);
        assert!(plan.continuous);
        let error = distance(&plan, GHZ);
        for rate in [57, 59] {
            let other = SweepPlan {
                step_rate: rate,
                ..plan
            };
            assert!(error < distance(&other, GHZ));
        }
    }

    #[test]
    fn rate_clamps() {
        let plan = SweepPlan::plan(1, 2, SweepDuration::secs(100), false, GHZ).unwrap();
        assert_eq!(plan.step_rate, STEP_RATE_MAX);
        assert_eq!(plan.step_size, 1);
    }

    #[test]
    fn size_clamps_to_range() {
        let plan = SweepPlan::plan(1, 2, SweepDuration::nanos(1), false, GHZ).unwrap();
        assert_eq!(plan.step_size, plan.end_ftw - plan.start_ftw);
        assert_eq!(plan.step_rate, 1);
    }

    #[test]
    fn units() {
        assert_eq!(SweepDuration::millis(3).to_nanos(), Ok(3_000_000));
        assert_eq!(SweepDuration::micros(3).to_nanos(), Ok(3_000));
        assert_eq!(SweepDuration::secs(2).to_nanos(), Ok(2_000_000_000));
        assert_eq!(SweepDuration::nanos(7).to_nanos(), Ok(7));
    }

    #[test]
    fn bad_durations() {
        assert_eq!(SweepDuration::millis(0).to_nanos(), Err(Error::InvalidParameter));
        assert_eq!(SweepDuration::secs(-1).to_nanos(), Err(Error::InvalidParameter));
        assert_eq!(
            SweepDuration::secs(i64::MAX).to_nanos(),
            Err(Error::InvalidParameter)
        );
        assert!(SweepDuration::nanos(i64::MAX).to_nanos().is_ok());
    }

    #[test]
    fn bad_ranges() {
        let d = SweepDuration::millis(1);
        assert_eq!(
            SweepPlan::plan(2_000_000, 1_000_000, d, false, GHZ),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            SweepPlan::plan(1_000_000, 1_000_000, d, false, GHZ),
            Err(Error::InvalidParameter)
        );
        assert_eq!(SweepPlan::plan(0, 1_000_000, d, false, GHZ), Err(Error::InvalidParameter));
        // both ends saturate to the same word
        assert_eq!(
            SweepPlan::plan(GHZ, GHZ + 1, d, false, GHZ),
            Err(Error::InvalidParameter)
        );
    }

    proptest! {
        #[test]
        fn plans_stay_in_range(
            start in 1u64..400_000_000,
            span in 1_000u64..100_000_000,
            ns in 1i64..10_000_000_000,
        ) {
            let plan = SweepPlan::plan(start, start + span, SweepDuration::nanos(ns), false, GHZ).unwrap();
            let delta = plan.end_ftw - plan.start_ftw;
            prop_assert!(plan.step_size >= 1 && plan.step_size <= delta);
            prop_assert!(plan.step_rate >= 1);
            prop_assert!(plan.step_size == 1 || plan.step_rate == 1);
        }
    }
}
