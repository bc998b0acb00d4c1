// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Mode Entry module (MC_ME).
//!
//! MC_ME owns the chip operating modes. Each mode has a configuration
//! register selecting the system clock and which oscillators, PLLs and
//! regulators stay powered, and every peripheral has a `PCTL` byte selecting
//! one of eight run and eight low power peripheral configurations. Changing
//! mode is a two-write key sequence on `ME_MCTL` followed by a hardware
//! transition.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

/// Number of `ME_PCTLn` registers.
pub const PCTL_COUNT: usize = 128;

/// Number of polls of `ME_GS.S_MTRANS` before a mode transition is
/// considered stuck.
pub const MODE_TRANSITION_TIMEOUT: usize = 100_000;

pub const MCTL_KEY: u32 = 0x5AF0;
pub const MCTL_KEY_INV: u32 = 0xA50F;

register_structs! {
    pub MeRegisters {
        /// Global status
        (0x000 => pub gs: ReadOnly<u32, GS::Register>),
        /// Mode control
        (0x004 => pub mctl: ReadWrite<u32, MCTL::Register>),
        /// Mode enable
        (0x008 => pub me: ReadWrite<u32, ME::Register>),
        /// Interrupt status
        (0x00C => pub is: ReadWrite<u32, IS::Register>),
        /// Interrupt mask
        (0x010 => pub im: ReadWrite<u32, IS::Register>),
        /// Invalid mode transition status
        (0x014 => pub imts: ReadWrite<u32, IMTS::Register>),
        /// Debug mode transition status
        (0x018 => pub dmts: ReadOnly<u32>),
        (0x01C => _reserved0),
        (0x020 => pub reset_mc: ReadOnly<u32, MC::Register>),
        (0x024 => pub test_mc: ReadWrite<u32, MC::Register>),
        (0x028 => pub safe_mc: ReadWrite<u32, MC::Register>),
        (0x02C => pub drun_mc: ReadWrite<u32, MC::Register>),
        /// RUN0..RUN3 mode configurations
        (0x030 => pub run_mc: [ReadWrite<u32, MC::Register>; 4]),
        (0x040 => pub halt0_mc: ReadWrite<u32, MC::Register>),
        (0x044 => _reserved1),
        (0x048 => pub stop0_mc: ReadWrite<u32, MC::Register>),
        (0x04C => _reserved2),
        /// Peripheral status
        (0x060 => pub ps: [ReadOnly<u32>; 4]),
        (0x070 => _reserved3),
        /// Run peripheral configurations
        (0x080 => pub run_pc: [ReadWrite<u32, RUN_PC::Register>; 8]),
        /// Low power peripheral configurations
        (0x0A0 => pub lp_pc: [ReadWrite<u32, LP_PC::Register>; 8]),
        /// Peripheral control
        (0x0C0 => pub pctl: [ReadWrite<u8, PCTL::Register>; PCTL_COUNT]),
        (0x140 => _reserved4),
        /// Core status
        (0x1C0 => pub cs: ReadOnly<u32>),
        /// Core control
        (0x1C4 => pub cctl: [ReadWrite<u16>; 2]),
        (0x1C8 => _reserved5),
        /// Core boot address
        (0x1E0 => pub caddr: [ReadWrite<u32>; 2]),
        (0x1E8 => @END),
    }
}

register_bitfields![u32,
    pub GS [
        /// Current device mode
        S_CURRENT_MODE OFFSET(28) NUMBITS(4) [],
        /// Mode transition in progress
        S_MTRANS OFFSET(27) NUMBITS(1) [],
        /// Output power-down status
        S_PDO OFFSET(23) NUMBITS(1) [],
        /// Main voltage regulator status
        S_MVR OFFSET(20) NUMBITS(1) [],
        /// Flash availability status
        S_FLA OFFSET(16) NUMBITS(2) [],
        S_PLL1 OFFSET(7) NUMBITS(1) [],
        S_PLL0 OFFSET(6) NUMBITS(1) [],
        S_XOSC OFFSET(5) NUMBITS(1) [],
        S_IRC OFFSET(4) NUMBITS(1) [],
        /// System clock switch status
        S_SYSCLK OFFSET(0) NUMBITS(4) []
    ],
    pub MCTL [
        TARGET_MODE OFFSET(28) NUMBITS(4) [],
        KEY OFFSET(0) NUMBITS(16) []
    ],
    pub ME [
        STOP0 OFFSET(10) NUMBITS(1) [],
        HALT0 OFFSET(8) NUMBITS(1) [],
        RUN3 OFFSET(7) NUMBITS(1) [],
        RUN2 OFFSET(6) NUMBITS(1) [],
        RUN1 OFFSET(5) NUMBITS(1) [],
        RUN0 OFFSET(4) NUMBITS(1) [],
        DRUN OFFSET(3) NUMBITS(1) [],
        SAFE OFFSET(2) NUMBITS(1) [],
        TEST OFFSET(1) NUMBITS(1) [],
        RESET OFFSET(0) NUMBITS(1) []
    ],
    pub IS [
        /// Invalid mode configuration
        I_ICONF OFFSET(3) NUMBITS(1) [],
        /// Invalid mode
        I_IMODE OFFSET(2) NUMBITS(1) [],
        /// SAFE mode entered
        I_SAFE OFFSET(1) NUMBITS(1) [],
        /// Mode transition complete
        I_MTC OFFSET(0) NUMBITS(1) []
    ],
    pub IMTS [
        S_MTI OFFSET(5) NUMBITS(1) [],
        S_MRI OFFSET(4) NUMBITS(1) [],
        S_DMA OFFSET(3) NUMBITS(1) [],
        S_NMA OFFSET(2) NUMBITS(1) [],
        S_SEA OFFSET(1) NUMBITS(1) []
    ],
    pub MC [
        PWRLVL OFFSET(28) NUMBITS(3) [],
        PDO OFFSET(23) NUMBITS(1) [],
        MVRON OFFSET(20) NUMBITS(1) [],
        FLAON OFFSET(16) NUMBITS(2) [
            PowerDown = 1,
            LowPower = 2,
            Normal = 3
        ],
        PLL1ON OFFSET(7) NUMBITS(1) [],
        PLL0ON OFFSET(6) NUMBITS(1) [],
        XOSCON OFFSET(5) NUMBITS(1) [],
        IRCON OFFSET(4) NUMBITS(1) [],
        SYSCLK OFFSET(0) NUMBITS(4) [
            Irc = 0,
            Xosc = 1,
            Pll0Phi = 2,
            Pll1Phi = 4,
            Disabled = 15
        ]
    ],
    pub RUN_PC [
        RUN3 OFFSET(7) NUMBITS(1) [],
        RUN2 OFFSET(6) NUMBITS(1) [],
        RUN1 OFFSET(5) NUMBITS(1) [],
        RUN0 OFFSET(4) NUMBITS(1) [],
        DRUN OFFSET(3) NUMBITS(1) [],
        SAFE OFFSET(2) NUMBITS(1) []
    ],
    pub LP_PC [
        STOP0 OFFSET(10) NUMBITS(1) [],
        HALT0 OFFSET(8) NUMBITS(1) []
    ]
];

register_bitfields![u8,
    pub PCTL [
        DBG_F OFFSET(6) NUMBITS(1) [],
        LP_CFG OFFSET(3) NUMBITS(3) [],
        RUN_CFG OFFSET(0) NUMBITS(3) []
    ]
];

pub const ME_BASE: StaticRef<MeRegisters> =
    unsafe { StaticRef::new(memory_map::MC_ME_BASE as *const MeRegisters) };

/// `ME_PCTLn` index of each peripheral.
pub mod pctl_index {
    pub const DSPI_0: usize = 99;
    pub const DSPI_1: usize = 98;
    pub const DSPI_2: usize = 97;
    pub const DSPI_3: usize = 96;
    pub const LINFLEXD_0: usize = 91;
    pub const LINFLEXD_1: usize = 90;
    pub const FLEXRAY_0: usize = 84;
    pub const FLEXCAN_0: usize = 79;
    pub const M_TTCAN_0: usize = 77;
    pub const M_CAN_1: usize = 76;
    pub const SRX_0: usize = 68;
    pub const PSI5_0: usize = 66;
    pub const SARADC_0: usize = 126;
    pub const SARADC_1: usize = 127;
    pub const DMAMUX_0: usize = 36;
    pub const PIT_0: usize = 30;
}

/// Operating modes that software can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RunMode {
    Safe = 2,
    Drun = 3,
    Run0 = 4,
    Run1 = 5,
    Run2 = 6,
    Run3 = 7,
    Halt0 = 8,
    Stop0 = 10,
}

impl RunMode {
    pub fn from_mode_number(value: u32) -> Option<RunMode> {
        match value {
            2 => Some(RunMode::Safe),
            3 => Some(RunMode::Drun),
            4 => Some(RunMode::Run0),
            5 => Some(RunMode::Run1),
            6 => Some(RunMode::Run2),
            7 => Some(RunMode::Run3),
            8 => Some(RunMode::Halt0),
            10 => Some(RunMode::Stop0),
            _ => None,
        }
    }

    /// Bit of this mode in `ME_ME`, `ME_RUN_PCn` and `ME_LP_PCn`.
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Build an `ME_ME`/`ME_RUN_PCn`/`ME_LP_PCn` value from a list of modes.
pub const fn mode_mask(modes: &[RunMode]) -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < modes.len() {
        mask |= modes[i].bit();
        i += 1;
    }
    mask
}

/// Build a `ME_PCTLn` value selecting run configuration `run` and low power
/// configuration `lp`.
pub const fn pctl(run: u8, lp: u8) -> u8 {
    (run & 0x7) | ((lp & 0x7) << 3)
}

/// System clock selection of a mode, encoded as in `ME_<mode>_MC.SYSCLK`
/// and `ME_GS.S_SYSCLK`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SystemClock {
    Irc = 0,
    Xosc = 1,
    Pll0Phi = 2,
    Pll1Phi = 4,
    Disabled = 15,
}

impl SystemClock {
    pub fn from_bits(value: u32) -> Option<SystemClock> {
        match value {
            0 => Some(SystemClock::Irc),
            1 => Some(SystemClock::Xosc),
            2 => Some(SystemClock::Pll0Phi),
            4 => Some(SystemClock::Pll1Phi),
            15 => Some(SystemClock::Disabled),
            _ => None,
        }
    }
}

/// Flash power state of a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum FlashMode {
    PowerDown = 1,
    LowPower = 2,
    Normal = 3,
}

/// Typed content of a `ME_<mode>_MC` register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeConfig {
    pub sysclk: SystemClock,
    pub irc_on: bool,
    pub xosc_on: bool,
    pub pll0_on: bool,
    pub pll1_on: bool,
    /// `None` leaves the FLAON field at zero.
    pub flash: Option<FlashMode>,
    pub mvr_on: bool,
    /// Pads in power-down.
    pub pdo: bool,
    pub power_level: u8,
}

impl ModeConfig {
    /// Everything off, outputs in power-down.
    pub const SAFE: ModeConfig = ModeConfig {
        sysclk: SystemClock::Irc,
        irc_on: false,
        xosc_on: false,
        pll0_on: false,
        pll1_on: false,
        flash: None,
        mvr_on: false,
        pdo: true,
        power_level: 0,
    };

    /// System clock on PLL1 PHI with every oscillator, both PLLs, the flash
    /// and the main regulator on.
    pub const RUN: ModeConfig = ModeConfig {
        sysclk: SystemClock::Pll1Phi,
        irc_on: true,
        xosc_on: true,
        pll0_on: true,
        pll1_on: true,
        flash: Some(FlashMode::Normal),
        mvr_on: true,
        pdo: false,
        power_level: 0,
    };

    pub const fn bits(&self) -> u32 {
        let flash = match self.flash {
            Some(mode) => mode as u32,
            None => 0,
        };
        ((self.power_level as u32 & 0x7) << 28)
            | ((self.pdo as u32) << 23)
            | ((self.mvr_on as u32) << 20)
            | (flash << 16)
            | ((self.pll1_on as u32) << 7)
            | ((self.pll0_on as u32) << 6)
            | ((self.xosc_on as u32) << 5)
            | ((self.irc_on as u32) << 4)
            | (self.sysclk as u32)
    }
}

/// Errors reported by [`ModeEntry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeError {
    /// `S_MTRANS` never cleared.
    Timeout,
    /// The transition completed but the chip is not in the requested mode.
    Refused,
    /// No `ME_PCTLn` register with that index.
    InvalidPeripheral,
    /// Peripheral configuration index outside 0..8.
    InvalidConfiguration,
}

pub struct ModeEntry {
    registers: StaticRef<MeRegisters>,
}

impl ModeEntry {
    pub const fn new(registers: StaticRef<MeRegisters>) -> ModeEntry {
        ModeEntry { registers }
    }

    pub fn current_mode(&self) -> Option<RunMode> {
        RunMode::from_mode_number(self.registers.gs.read(GS::S_CURRENT_MODE))
    }

    /// Clock currently driving SYSCLK according to `ME_GS`.
    pub fn system_clock_source(&self) -> Option<SystemClock> {
        SystemClock::from_bits(self.registers.gs.read(GS::S_SYSCLK))
    }

    pub fn in_transition(&self) -> bool {
        self.registers.gs.is_set(GS::S_MTRANS)
    }

    /// Write `ME_ME`. RESET, SAFE, DRUN and RUN0 are always enabled by the
    /// hardware whatever the mask says.
    pub fn enable_modes(&self, modes: u32) {
        self.registers.me.set(modes);
    }

    pub fn configure_mode(&self, mode: RunMode, config: ModeConfig) {
        let regs = &*self.registers;
        let register = match mode {
            RunMode::Safe => &regs.safe_mc,
            RunMode::Drun => &regs.drun_mc,
            RunMode::Run0 => &regs.run_mc[0],
            RunMode::Run1 => &regs.run_mc[1],
            RunMode::Run2 => &regs.run_mc[2],
            RunMode::Run3 => &regs.run_mc[3],
            RunMode::Halt0 => &regs.halt0_mc,
            RunMode::Stop0 => &regs.stop0_mc,
        };
        register.set(config.bits());
    }

    pub fn configure_run_pc(&self, index: usize, modes: u32) -> Result<(), ModeError> {
        self.registers
            .run_pc
            .get(index)
            .ok_or(ModeError::InvalidConfiguration)?
            .set(modes);
        Ok(())
    }

    pub fn configure_lp_pc(&self, index: usize, modes: u32) -> Result<(), ModeError> {
        self.registers
            .lp_pc
            .get(index)
            .ok_or(ModeError::InvalidConfiguration)?
            .set(modes);
        Ok(())
    }

    /// Select the run and low power configurations of a peripheral. The
    /// value only takes effect on the next mode transition.
    pub fn set_peripheral_clock_mode(&self, peripheral: usize, pctl: u8) -> Result<(), ModeError> {
        self.registers
            .pctl
            .get(peripheral)
            .ok_or(ModeError::InvalidPeripheral)?
            .set(pctl);
        Ok(())
    }

    /// Request a mode change and wait for it to complete.
    pub fn set_run_mode(&self, mode: RunMode) -> Result<(), ModeError> {
        let regs = &*self.registers;

        regs.mctl
            .write(MCTL::TARGET_MODE.val(mode as u32) + MCTL::KEY.val(MCTL_KEY));
        regs.mctl
            .write(MCTL::TARGET_MODE.val(mode as u32) + MCTL::KEY.val(MCTL_KEY_INV));

        let mut settled = false;
        for _ in 0..MODE_TRANSITION_TIMEOUT {
            if !self.in_transition() {
                settled = true;
                break;
            }
        }
        if !settled {
            log::warn!("MC_ME: transition to {:?} timed out", mode);
            return Err(ModeError::Timeout);
        }

        if regs.is.is_set(IS::I_MTC) {
            regs.is.write(IS::I_MTC::SET);
        }

        match self.current_mode() {
            Some(current) if current == mode => Ok(()),
            current => {
                log::warn!("MC_ME: requested {:?}, running {:?}", mode, current);
                Err(ModeError::Refused)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    /// A zeroed MC_ME register file in host memory.
    pub(crate) struct FakeMe {
        raw: *mut MeRegisters,
    }

    impl FakeMe {
        pub(crate) fn new() -> FakeMe {
            let block: Box<MeRegisters> = Box::new(unsafe { core::mem::zeroed() });
            FakeMe {
                raw: Box::into_raw(block),
            }
        }

        pub(crate) fn registers(&self) -> StaticRef<MeRegisters> {
            unsafe { StaticRef::new(self.raw) }
        }

        /// Emulate the hardware updating `ME_GS`.
        pub(crate) fn set_status(&self, mode: u32, sysclk: u32, in_transition: bool) {
            let value = (mode << 28) | ((in_transition as u32) << 27) | sysclk;
            unsafe { (self.raw as *mut u32).write_volatile(value) };
        }
    }

    impl Drop for FakeMe {
        fn drop(&mut self) {
            drop(unsafe { Box::from_raw(self.raw) });
        }
    }

    #[test]
    fn layout() {
        assert_eq!(size_of::<MeRegisters>(), 0x1E8);
        assert_eq!(offset_of!(MeRegisters, drun_mc), 0x02C);
        assert_eq!(offset_of!(MeRegisters, run_mc), 0x030);
        assert_eq!(offset_of!(MeRegisters, stop0_mc), 0x048);
        assert_eq!(offset_of!(MeRegisters, run_pc), 0x080);
        assert_eq!(offset_of!(MeRegisters, lp_pc), 0x0A0);
        assert_eq!(offset_of!(MeRegisters, pctl), 0x0C0);
        assert_eq!(offset_of!(MeRegisters, cs), 0x1C0);
        assert_eq!(ME_BASE.address(), 0xFFFB_8000);
    }

    #[test]
    fn mode_bits_match_hardware() {
        assert_eq!(RunMode::Safe.bit(), 1 << 2);
        assert_eq!(RunMode::Stop0.bit(), 1 << 10);
        assert_eq!(
            mode_mask(&[
                RunMode::Run1,
                RunMode::Run2,
                RunMode::Run3,
                RunMode::Halt0,
                RunMode::Stop0
            ]),
            0x5E0
        );
        assert_eq!(RunMode::from_mode_number(9), None);
        assert_eq!(RunMode::from_mode_number(10), Some(RunMode::Stop0));
    }

    #[test]
    fn mode_config_encoding() {
        assert_eq!(ModeConfig::SAFE.bits(), 0x0080_0000);
        assert_eq!(ModeConfig::RUN.bits(), 0x0013_00F4);
        let low_power = ModeConfig {
            flash: Some(FlashMode::LowPower),
            power_level: 3,
            ..ModeConfig::RUN
        };
        assert_eq!(low_power.bits(), 0x3012_00F4);
    }

    #[test]
    fn pctl_encoding() {
        assert_eq!(pctl(1, 2), 0x11);
        assert_eq!(pctl(7, 7), 0x3F);
        assert_eq!(pctl(9, 0), 0x01);
    }

    #[test]
    fn run_mode_key_sequence() {
        let fake = FakeMe::new();
        let me = ModeEntry::new(fake.registers());
        fake.set_status(RunMode::Run0 as u32, 4, false);

        assert_eq!(me.set_run_mode(RunMode::Run0), Ok(()));
        // The last write left the inverted key in place.
        assert_eq!(fake.registers().mctl.get(), 0x4000_A50F);
        assert_eq!(me.current_mode(), Some(RunMode::Run0));
        assert_eq!(me.system_clock_source(), Some(SystemClock::Pll1Phi));
    }

    #[test]
    fn run_mode_refused() {
        let fake = FakeMe::new();
        let me = ModeEntry::new(fake.registers());
        fake.set_status(RunMode::Drun as u32, 0, false);
        assert_eq!(me.set_run_mode(RunMode::Run1), Err(ModeError::Refused));
    }

    #[test]
    fn run_mode_timeout() {
        let fake = FakeMe::new();
        let me = ModeEntry::new(fake.registers());
        fake.set_status(RunMode::Drun as u32, 0, true);
        assert_eq!(me.set_run_mode(RunMode::Run0), Err(ModeError::Timeout));
    }

    #[test]
    fn peripheral_clock_mode() {
        let fake = FakeMe::new();
        let me = ModeEntry::new(fake.registers());
        assert_eq!(
            me.set_peripheral_clock_mode(pctl_index::DSPI_0, pctl(2, 1)),
            Ok(())
        );
        assert_eq!(fake.registers().pctl[pctl_index::DSPI_0].get(), 0x0A);
        assert_eq!(
            me.set_peripheral_clock_mode(PCTL_COUNT, 0),
            Err(ModeError::InvalidPeripheral)
        );
    }

    #[test]
    fn peripheral_configuration_sets() {
        let fake = FakeMe::new();
        let me = ModeEntry::new(fake.registers());
        assert_eq!(me.configure_run_pc(1, 0xFC), Ok(()));
        assert_eq!(me.configure_lp_pc(7, 0x500), Ok(()));
        assert_eq!(
            me.configure_run_pc(8, 0),
            Err(ModeError::InvalidConfiguration)
        );
        assert_eq!(fake.registers().run_pc[1].get(), 0xFC);
        assert_eq!(fake.registers().lp_pc[7].get(), 0x500);

        me.configure_mode(RunMode::Run2, ModeConfig::RUN);
        assert_eq!(fake.registers().run_mc[2].get(), ModeConfig::RUN.bits());
    }
}
