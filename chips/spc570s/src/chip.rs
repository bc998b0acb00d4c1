// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip level initialisation and the system counter.

use core::cell::Cell;
use core::fmt;

use crate::clocks::{ClockError, ClockTree, IRC_CLK};
use crate::config::HalConfig;
use crate::mc_cgm::{self, Cgm, CgmSettings};
use crate::mc_me::{self, ModeEntry, ModeError, RunMode, SystemClock};
use crate::plldig::{self, PllDig};
use crate::sscm::{self, Sscm};
use crate::swt::{self, Swt};
use crate::xosc::{self, Xosc};

/// Reasons [`Spc570s::init`] can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    Clock(ClockError),
    Mode(ModeError),
}

impl From<ClockError> for InitError {
    fn from(error: ClockError) -> Self {
        InitError::Clock(error)
    }
}

impl From<ModeError> for InitError {
    fn from(error: ModeError) -> Self {
        InitError::Mode(error)
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InitError::Clock(e) => write!(f, "clock configuration: {}", e),
            InitError::Mode(e) => write!(f, "mode transition: {:?}", e),
        }
    }
}

/// The system control modules touched during initialisation.
pub struct Spc570s {
    pub me: ModeEntry,
    pub cgm: Cgm,
    pub plldig: PllDig,
    pub xosc: Xosc,
    pub sscm: Sscm,
    pub swt: Swt,
    clock_tree: Cell<Option<ClockTree>>,
}

impl Spc570s {
    pub const fn new() -> Spc570s {
        Spc570s::from_parts(
            ModeEntry::new(mc_me::ME_BASE),
            Cgm::new(mc_cgm::CGM_BASE),
            PllDig::new(plldig::PLLDIG_BASE),
            Xosc::new(xosc::XOSC_BASE),
            Sscm::new(sscm::SSCM_BASE),
            Swt::new(swt::SWT_BASE),
        )
    }

    pub const fn from_parts(
        me: ModeEntry,
        cgm: Cgm,
        plldig: PllDig,
        xosc: Xosc,
        sscm: Sscm,
        swt: Swt,
    ) -> Spc570s {
        Spc570s {
            me,
            cgm,
            plldig,
            xosc,
            sscm,
            swt,
            clock_tree: Cell::new(None),
        }
    }

    /// Low level platform initialisation.
    ///
    /// Configures the SSCM bus error responses, stops the watchdog and,
    /// unless `no_init` is set, brings up the clock tree with
    /// [`Spc570s::program_clocks`] followed by a re-entry into DRUN, so that
    /// the new DRUN configuration with both PLLs takes effect, and a switch
    /// to RUN0.
    ///
    /// The clock configuration is checked before any clock register is
    /// written, so an invalid configuration leaves the clocks untouched.
    pub fn init(&self, config: &HalConfig) -> Result<ClockTree, InitError> {
        self.sscm
            .set_error_config(config.sscm_peripheral_abort, config.sscm_register_abort);

        if config.disable_watchdog {
            self.swt.disable();
        }

        let tree = config.clocks.validate().map_err(|error| {
            log::warn!("SPC570S: rejected clock configuration: {}", error);
            error
        })?;

        if config.no_init {
            log::debug!("SPC570S: clock initialisation skipped");
        } else {
            self.program_clocks(config)?;
            self.me.set_run_mode(RunMode::Drun)?;
            self.me.set_run_mode(RunMode::Run0)?;
            log::debug!(
                "SPC570S: running at {}Hz, PLL0 PHI {}Hz",
                tree.pll1_phi_hz,
                tree.pll0_phi_hz
            );
        }

        self.clock_tree.set(Some(tree));
        Ok(tree)
    }

    /// Program MC_ME, XOSC, PLLDIG and MC_CGM for `config` without changing
    /// mode. Nothing takes effect until the next mode transition.
    pub fn program_clocks(&self, config: &HalConfig) -> Result<(), InitError> {
        // Encode before touching MC_ME so a bad divider fails early.
        let cgm_settings = CgmSettings::from_config(&config.clocks)?;

        self.me.enable_modes(config.enabled_modes);
        for (mode, mode_config) in config.mode_configs() {
            self.me.configure_mode(mode, mode_config);
        }
        for (index, bits) in config.run_pc.iter().enumerate() {
            self.me.configure_run_pc(index, *bits)?;
        }
        for (index, bits) in config.lp_pc.iter().enumerate() {
            self.me.configure_lp_pc(index, *bits)?;
        }

        self.xosc.set_bypass(config.clocks.xosc_bypass);
        self.plldig.configure(&config.clocks);
        self.cgm.apply(&cgm_settings);
        Ok(())
    }

    /// Clock tree computed by the last successful [`Spc570s::init`].
    pub fn clock_tree(&self) -> Option<ClockTree> {
        self.clock_tree.get()
    }

    /// Current SYSCLK frequency, from the source reported by `ME_GS`.
    ///
    /// Before [`Spc570s::init`] only the IRC frequency is known.
    pub fn system_clock(&self) -> u32 {
        let source = self.me.system_clock_source();
        match (self.clock_tree.get(), source) {
            (Some(tree), Some(sysclk)) => tree.system_clock(sysclk),
            (None, Some(SystemClock::Irc)) => IRC_CLK,
            _ => 0,
        }
    }

    /// Frequency of [`counter_value`].
    pub fn counter_frequency(&self) -> u32 {
        self.system_clock()
    }
}

/// Lower word of the e200z0 time base (SPR 284), incremented at the system
/// clock rate.
#[cfg(target_arch = "powerpc")]
pub fn counter_value() -> u32 {
    let value: u32;
    unsafe {
        core::arch::asm!(
            "mfspr {0}, 284",
            out(reg) value,
            options(nomem, nostack, preserves_flags)
        );
    }
    value
}

#[cfg(not(target_arch = "powerpc"))]
pub fn counter_value() -> u32 {
    unimplemented!()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clocks::ClockConfig;
    use crate::config::CONFIG;
    use crate::mc_cgm::CgmRegisters;
    use crate::mc_me::tests::FakeMe;
    use crate::mc_me::ModeConfig;
    use crate::plldig::PllDigRegisters;
    use crate::sscm::SscmRegisters;
    use crate::static_ref::StaticRef;
    use crate::swt::SwtRegisters;
    use crate::xosc::XoscRegisters;
    use tock_registers::interfaces::{Readable, Writeable};

    /// Zeroed register blocks for every module `init` touches.
    struct FakeChip {
        me: FakeMe,
        cgm: Box<CgmRegisters>,
        plldig: Box<PllDigRegisters>,
        xosc: Box<XoscRegisters>,
        sscm: Box<SscmRegisters>,
        swt: Box<SwtRegisters>,
    }

    impl FakeChip {
        fn new() -> FakeChip {
            unsafe {
                FakeChip {
                    me: FakeMe::new(),
                    cgm: Box::new(core::mem::zeroed()),
                    plldig: Box::new(core::mem::zeroed()),
                    xosc: Box::new(core::mem::zeroed()),
                    sscm: Box::new(core::mem::zeroed()),
                    swt: Box::new(core::mem::zeroed()),
                }
            }
        }

        fn chip(&self) -> Spc570s {
            unsafe {
                Spc570s::from_parts(
                    ModeEntry::new(self.me.registers()),
                    Cgm::new(StaticRef::new(&*self.cgm as *const CgmRegisters)),
                    PllDig::new(StaticRef::new(&*self.plldig as *const PllDigRegisters)),
                    Xosc::new(StaticRef::new(&*self.xosc as *const XoscRegisters)),
                    Sscm::new(StaticRef::new(&*self.sscm as *const SscmRegisters)),
                    Swt::new(StaticRef::new(&*self.swt as *const SwtRegisters)),
                )
            }
        }
    }

    fn host_config() -> HalConfig {
        HalConfig {
            no_init: false,
            disable_watchdog: true,
            ..CONFIG
        }
    }

    #[test]
    fn program_clocks_writes_every_module() {
        let fake = FakeChip::new();
        let chip = fake.chip();

        assert_eq!(chip.program_clocks(&host_config()), Ok(()));

        let me = fake.me.registers();
        assert_eq!(me.me.get(), 0x5E0);
        assert_eq!(me.drun_mc.get(), ModeConfig::RUN.bits());
        assert_eq!(me.safe_mc.get(), ModeConfig::SAFE.bits());
        assert_eq!(me.run_pc[1].get(), 0xFC);
        assert_eq!(me.lp_pc[3].get(), 0x400);
        assert_eq!(fake.plldig.pll0dv.get(), 0x3001_2014);
        assert_eq!(fake.cgm.sc_dc[0].get(), 0x8001_0000);
        assert_eq!(fake.cgm.ac0_sc.get(), 0x0200_0000);
        assert_eq!(fake.xosc.ctl.get(), 0);
    }

    #[test]
    fn init_switches_through_drun() {
        let fake = FakeChip::new();
        let chip = fake.chip();
        fake.swt.cr.set(1);
        // Plain memory cannot follow the transition: ME_GS stays in DRUN,
        // so DRUN re-entry succeeds and the RUN0 request is refused.
        fake.me.set_status(RunMode::Drun as u32, 0, false);

        assert_eq!(
            chip.init(&host_config()),
            Err(InitError::Mode(ModeError::Refused))
        );
        assert_eq!(fake.sscm.error.get(), 0x3);
        assert_eq!(fake.swt.cr.get() & 1, 0);
        assert_eq!(fake.me.registers().mctl.get(), 0x4000_A50F);
        assert_eq!(chip.clock_tree(), None);
    }

    #[test]
    fn invalid_clocks_leave_hardware_untouched() {
        let fake = FakeChip::new();
        let chip = fake.chip();
        let config = HalConfig {
            clocks: ClockConfig {
                pll0_mfd: 127,
                ..ClockConfig::DEFAULT
            },
            ..host_config()
        };

        assert_eq!(
            chip.init(&config),
            Err(InitError::Clock(ClockError::Pll0VcoOutOfRange))
        );
        assert_eq!(fake.me.registers().me.get(), 0);
        assert_eq!(fake.plldig.pll0dv.get(), 0);
        assert_eq!(chip.clock_tree(), None);
    }

    #[test]
    fn no_init_only_touches_sscm_and_watchdog() {
        let fake = FakeChip::new();
        let chip = fake.chip();
        let config = HalConfig {
            no_init: true,
            ..host_config()
        };

        let tree = chip.init(&config).unwrap();
        assert_eq!(fake.sscm.error.get(), 0x3);
        assert_eq!(fake.me.registers().me.get(), 0);
        assert_eq!(fake.cgm.ac0_sc.get(), 0);
        assert_eq!(chip.clock_tree(), Some(tree));

        // ME_GS reads zero: IRC selected.
        assert_eq!(chip.system_clock(), IRC_CLK);
        fake.me
            .set_status(RunMode::Run0 as u32, SystemClock::Pll1Phi as u32, false);
        assert_eq!(chip.system_clock(), 200_000_000);
        assert_eq!(chip.counter_frequency(), 200_000_000);
    }

    #[test]
    fn system_clock_before_init() {
        let fake = FakeChip::new();
        let chip = fake.chip();
        assert_eq!(chip.system_clock(), IRC_CLK);
        fake.me.set_status(RunMode::Drun as u32, SystemClock::Xosc as u32, false);
        assert_eq!(chip.system_clock(), 0);
    }
}
