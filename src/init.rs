use crate::clock::ClockPlan;
use crate::error::Error;
use crate::pins::{DdsPin, PIN_COUNT};
use crate::registers::{self, RegisterAddr};
use crate::transport::Transport;
use crate::Ad9910;

/// Initialization progress. Steps run in declaration order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitState {
    Uninitialized,
    ContextValidated,
    PinsAttached,
    PinsSequenced,
    BusReady,
    RegistersProgrammed,
    Ready,
}

impl<T> Ad9910<T>
where
    T: Transport,
{
    /// Brings the chip from reset to a programmed, ready state.
    ///
    /// Every step runs again from the start on each call; a failure leaves the
    /// driver `Uninitialized` with nothing cached. Calling this on a ready
    /// driver does nothing.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.state == InitState::Ready {
            return Ok(());
        }
        self.reset_state();
        match self.run_init() {
            Ok(()) => {
                self.state = InitState::Ready;
                #[cfg(feature = "defmt")]
                defmt::debug!("AD9910 ready, sysclk {=u64} Hz", self.plan.map_or(0, |p| p.sysclk_hz));
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("initialization failed after {}: {}", self.state, e);
                self.reset_state();
                Err(e)
            }
        }
    }

    fn reset_state(&mut self) {
        self.state = InitState::Uninitialized;
        self.plan = None;
        self.indices = [None; PIN_COUNT];
        self.cfr2 = registers::cfr2::defaults();
    }

    fn run_init(&mut self) -> Result<(), Error> {
        let plan = ClockPlan::derive(&self.ctx)?;
        self.plan = Some(plan);
        self.state = InitState::ContextValidated;

        self.attach_pins()?;
        self.state = InitState::PinsAttached;

        self.run_sequence()?;
        self.state = InitState::PinsSequenced;

        self.transport.bus_init(&self.bus)?;
        self.state = InitState::BusReady;

        self.program_defaults(&plan)?;
        self.state = InitState::RegistersProgrammed;
        Ok(())
    }

    /// Resolves every logical pin. Any transport failure is a hardware error.
    fn attach_pins(&mut self) -> Result<(), Error> {
        for pin in DdsPin::ALL {
            let descriptor = self.pins[pin.index()];
            let index = self
                .transport
                .attach(&descriptor)
                .map_err(Error::Hardware)?;
            if let Some(mode) = descriptor.mode() {
                self.transport
                    .set_direction(index, mode)
                    .map_err(Error::Hardware)?;
            }
            self.indices[pin.index()] = Some(index);
        }
        Ok(())
    }

    fn run_sequence(&mut self) -> Result<(), Error> {
        let setup = self.setup;
        for step in setup {
            self.pin_write_index(step.pin, step.level)?;
            if step.delay_us > 0 {
                self.transport.delay_us(step.delay_us as u32);
            }
        }
        Ok(())
    }

    fn program_defaults(&mut self, plan: &ClockPlan) -> Result<(), Error> {
        self.write_reg_applied(RegisterAddr::Cfr1, &registers::cfr1::defaults())?;
        let cfr2 = registers::cfr2::defaults();
        self.write_reg_applied(RegisterAddr::Cfr2, &cfr2)?;
        self.cfr2 = cfr2;
        let cfr3 = registers::cfr3::from_plan(plan, self.ctx.pll_multiplier);
        self.write_reg_applied(RegisterAddr::Cfr3, &cfr3)?;
        let aux = registers::aux_dac::defaults(self.ctx.dac_current);
        self.write_reg_applied(RegisterAddr::AuxDac, &aux)
    }
}
