use crate::convert::{amplitude_to_asf, frequency_to_ftw, phase_to_pow, ASF_MAX};
use crate::error::Error;
use crate::pins::DdsPin;
use crate::ramp::{SweepDuration, SweepPlan};
use crate::registers::{self, ProfileWord, RegisterAddr};
use crate::transport::{Level, Transport};
use crate::{Ad9910, PROFILE_COUNT};

impl<T> Ad9910<T>
where
    T: Transport,
{
    fn ensure_ready(&self) -> Result<(), Error> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn profile_addr(profile: u8) -> Result<RegisterAddr, Error> {
        RegisterAddr::profile(profile).ok_or(Error::InvalidParameter)
    }

    /// System clock of the initialized chip in Hz
    pub fn system_clock_hz(&self) -> Result<u64, Error> {
        self.ensure_ready()?;
        self.plan
            .map(|plan| plan.sysclk_hz)
            .ok_or(Error::NotInitialized)
    }

    /// Frequency tuning word for `freq_hz` at the current system clock
    pub fn frequency_ftw(&self, freq_hz: u64) -> Result<u32, Error> {
        Ok(frequency_to_ftw(freq_hz, self.system_clock_hz()?))
    }

    /// Outputs a single tone from `profile`.
    ///
    /// `amplitude_db` is relative to full scale: 0 is full scale and anything
    /// at or below -85 dB mutes the output. The profile is written, committed,
    /// then selected on the profile pins.
    pub fn set_frequency(&mut self, profile: u8, freq_hz: u64, amplitude_db: i16) -> Result<(), Error> {
        let word = ProfileWord {
            ftw: self.frequency_ftw(freq_hz)?,
            pow: 0,
            asf: amplitude_to_asf(amplitude_db),
        };
        self.program_profile(profile, &word)?;
        self.select_profile(profile)
    }

    /// Writes and commits a profile without selecting it
    pub fn program_profile(&mut self, profile: u8, word: &ProfileWord) -> Result<(), Error> {
        self.ensure_ready()?;
        let addr = Self::profile_addr(profile)?;
        self.write_reg_applied(addr, &word.encode())
    }

    /// Reads a profile back from the chip
    pub fn read_profile(&mut self, profile: u8) -> Result<ProfileWord, Error> {
        self.ensure_ready()?;
        let addr = Self::profile_addr(profile)?;
        let value: registers::profile::Value = self.read_reg(addr)?;
        Ok(ProfileWord::decode(&value))
    }

    /// Changes the phase offset of a profile, keeping its frequency and amplitude
    pub fn set_phase_offset(&mut self, profile: u8, degrees: f32) -> Result<(), Error> {
        let mut word = self.read_profile(profile)?;
        word.pow = phase_to_pow(degrees);
        self.program_profile(profile, &word)
    }

    /// Drives the three profile select pins
    pub fn select_profile(&mut self, profile: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        if profile >= PROFILE_COUNT {
            return Err(Error::InvalidParameter);
        }
        let lines = [DdsPin::Profile0, DdsPin::Profile1, DdsPin::Profile2];
        for (bit, pin) in lines.into_iter().enumerate() {
            self.pin_write(pin, Level::from(profile & (1 << bit) != 0))?;
        }
        Ok(())
    }

    /// Sweeps the output frequency from `start_hz` to `stop_hz` over `duration`.
    ///
    /// In continuous mode the ramp free-runs between the two limits, otherwise
    /// it stops at `stop_hz`. Returns the plan that was programmed.
    pub fn sweep(
        &mut self,
        start_hz: u64,
        stop_hz: u64,
        duration: SweepDuration,
        continuous: bool,
    ) -> Result<SweepPlan, Error> {
        let sysclk = self.system_clock_hz()?;
        let plan = SweepPlan::plan(start_hz, stop_hz, duration, continuous, sysclk)?;
        self.program_ramp(&plan)?;
        Ok(plan)
    }

    fn program_ramp(&mut self, plan: &SweepPlan) -> Result<(), Error> {
        // the ramp takes its amplitude from profile 0
        let carrier = ProfileWord {
            ftw: plan.start_ftw,
            pow: 0,
            asf: ASF_MAX,
        };
        self.write_reg(RegisterAddr::Profile0, &carrier.encode())?;
        self.write_reg(RegisterAddr::Cfr1, &registers::cfr1::ramp_setup())?;
        self.write_reg(
            RegisterAddr::DrLimit,
            &registers::dr_limit::limits(plan.start_ftw, plan.end_ftw),
        )?;
        self.write_reg(
            RegisterAddr::DrStep,
            &registers::dr_step::steps(plan.step_size, plan.step_size),
        )?;
        self.write_reg(
            RegisterAddr::DrRate,
            &registers::dr_rate::rates(plan.step_rate, plan.step_rate),
        )?;
        let cfr2 = registers::cfr2::ramp_enabled(plan.continuous);
        self.write_reg(RegisterAddr::Cfr2, &cfr2)?;

        self.select_profile(0)?;
        self.pin_write(DdsPin::DrCtl, Level::High)?;
        self.io_update()?;
        self.cfr2 = cfr2;
        Ok(())
    }

    /// Turns a free-running ramp into a single pass. Limits, step and rate
    /// stay as programmed.
    pub fn restart_ramp(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        let cfr2 = registers::cfr2::ramp_enabled(false);
        self.write_reg_applied(RegisterAddr::Cfr2, &cfr2)?;
        self.cfr2 = cfr2;
        Ok(())
    }

    /// Freezes (`true`) or resumes (`false`) the ramp at its current value
    pub fn hold_ramp(&mut self, hold: bool) -> Result<(), Error> {
        self.ensure_ready()?;
        self.pin_write(DdsPin::DrHold, Level::from(hold))
    }

    /// Disables the ramp generator and returns to single tone output
    pub fn stop_ramp(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        self.pin_write(DdsPin::DrCtl, Level::Low)?;
        self.pin_write(DdsPin::DrHold, Level::Low)?;
        let cfr2 = registers::cfr2::defaults();
        self.write_reg_applied(RegisterAddr::Cfr2, &cfr2)?;
        self.cfr2 = cfr2;
        Ok(())
    }

    /// True while the ramp generator is enabled
    pub fn ramp_enabled(&self) -> bool {
        self.cfr2.is_set(registers::cfr2::DR_ENABLE)
    }

    /// Writes raw register bytes. The write takes effect on the next [`apply`](Self::apply).
    pub fn write_register(&mut self, addr: RegisterAddr, data: &[u8]) -> Result<(), Error> {
        self.ensure_ready()?;
        self.write_bytes(addr, data)
    }

    /// Reads raw register bytes into `buf`, which must be the register's length
    pub fn read_register(&mut self, addr: RegisterAddr, buf: &mut [u8]) -> Result<(), Error> {
        self.ensure_ready()?;
        self.read_bytes(addr, buf)
    }

    /// Commits buffered register writes with an IO_UPDATE pulse
    pub fn apply(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        self.io_update()
    }

    /// State of the PLL lock output. Always false in PLL bypass.
    pub fn pll_locked(&mut self) -> Result<bool, Error> {
        self.ensure_ready()?;
        if !self.ctx.pll_enable {
            return Ok(false);
        }
        Ok(self.pin_read(DdsPin::PllLock)? == Level::High)
    }
}

// Tests
