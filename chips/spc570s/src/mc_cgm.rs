// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock Generation Module (MC_CGM).
//!
//! The register block shares its 4KiB page with IRCOSC, XOSC and PLLDIG, so
//! the first 0x700 bytes are left to those modules.

use crate::clocks::{self, ClockConfig, ClockError, ClockSource, Divider};
use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub CgmRegisters {
        (0x000 => _reserved0),
        /// PCS switch duration
        (0x700 => pub pcs_sdur: ReadWrite<u8>),
        (0x701 => _reserved1),
        /// PCS divider change registers for PLL0 and PLL1
        (0x704 => pub pcs_divc1: ReadWrite<u32, PCS_DIVC::Register>),
        (0x708 => pub pcs_dive1: ReadWrite<u32>),
        (0x70C => pub pcs_divs1: ReadWrite<u32>),
        (0x710 => pub pcs_divc2: ReadWrite<u32, PCS_DIVC::Register>),
        (0x714 => pub pcs_dive2: ReadWrite<u32>),
        (0x718 => pub pcs_divs2: ReadWrite<u32>),
        (0x71C => _reserved2),
        /// System clock select status
        (0x7E4 => pub sc_ss: ReadOnly<u32, SS::Register>),
        /// System clock dividers
        (0x7E8 => pub sc_dc: [ReadWrite<u32, DC::Register>; 3]),
        (0x7F4 => _reserved3),
        /// Auxiliary clock 0 (peripheral clocks)
        (0x800 => pub ac0_sc: ReadWrite<u32, SC::Register>),
        (0x804 => pub ac0_ss: ReadOnly<u32, SS::Register>),
        (0x808 => pub ac0_dc: [ReadWrite<u32, DC::Register>; 6]),
        (0x820 => pub ac1_sc: ReadWrite<u32, SC::Register>),
        (0x824 => pub ac1_ss: ReadOnly<u32, SS::Register>),
        (0x828 => pub ac1_dc0: ReadWrite<u32, DC::Register>),
        (0x82C => _reserved4),
        /// PLL0 reference selector
        (0x840 => pub ac2_sc: ReadWrite<u32, SC::Register>),
        (0x844 => pub ac2_ss: ReadOnly<u32, SS::Register>),
        (0x848 => _reserved5),
        /// PLL1 reference selector
        (0x860 => pub ac3_sc: ReadWrite<u32, SC::Register>),
        (0x864 => pub ac3_ss: ReadOnly<u32, SS::Register>),
        (0x868 => @END),
    }
}

register_bitfields![u32,
    pub PCS_DIVC [
        INIT OFFSET(16) NUMBITS(16) [],
        RATE OFFSET(0) NUMBITS(8) []
    ],
    pub SC [
        SELCTL OFFSET(24) NUMBITS(4) []
    ],
    pub SS [
        SELSTAT OFFSET(24) NUMBITS(4) []
    ],
    pub DC [
        /// Divider enable
        DE OFFSET(31) NUMBITS(1) [],
        /// Division factor minus one
        DIV OFFSET(16) NUMBITS(8) []
    ]
];

pub const CGM_BASE: StaticRef<CgmRegisters> =
    unsafe { StaticRef::new(memory_map::MC_CGM_BASE as *const CgmRegisters) };

/// Auxiliary clock selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxClock {
    Aux0,
    Aux1,
    Pll0Reference,
    Pll1Reference,
}

/// Every value programmed into MC_CGM for one [`ClockConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CgmSettings {
    pub sc_dc: [u32; 3],
    pub ac0_sc: u32,
    pub ac0_dc: [u32; 6],
    pub ac1_sc: u32,
    pub ac1_dc0: u32,
    pub ac2_sc: u32,
    pub ac3_sc: u32,
}

impl CgmSettings {
    /// Encode all selectors and dividers. Nothing is returned unless every
    /// divider is in range.
    pub fn from_config(config: &ClockConfig) -> Result<CgmSettings, ClockError> {
        const SC_DIVIDERS: [Divider; 3] = [Divider::ScDc0, Divider::ScDc1, Divider::ScDc2];
        const AC0_DIVIDERS: [Divider; 6] = [
            Divider::Ac0Dc0,
            Divider::Ac0Dc1,
            Divider::Ac0Dc2,
            Divider::Ac0Dc3,
            Divider::Ac0Dc4,
            Divider::Ac0Dc5,
        ];

        let mut sc_dc = [0; 3];
        for (bits, (divider, value)) in sc_dc
            .iter_mut()
            .zip(SC_DIVIDERS.iter().zip(config.sc_dividers.iter()))
        {
            *bits = clocks::divider_bits(*divider, *value)?;
        }
        let mut ac0_dc = [0; 6];
        for (bits, (divider, value)) in ac0_dc
            .iter_mut()
            .zip(AC0_DIVIDERS.iter().zip(config.ac0_dividers.iter()))
        {
            *bits = clocks::divider_bits(*divider, *value)?;
        }

        Ok(CgmSettings {
            sc_dc,
            ac0_sc: selector_bits(config.ac0_source),
            ac0_dc,
            ac1_sc: selector_bits(config.ac1_source),
            ac1_dc0: clocks::divider_bits(Divider::Ac1Dc0, config.ac1_divider)?,
            ac2_sc: selector_bits(config.ac2_source),
            ac3_sc: selector_bits(config.ac3_source),
        })
    }
}

fn selector_bits(source: ClockSource) -> u32 {
    source.selector() << 24
}

pub struct Cgm {
    registers: StaticRef<CgmRegisters>,
}

impl Cgm {
    pub const fn new(registers: StaticRef<CgmRegisters>) -> Cgm {
        Cgm { registers }
    }

    /// Program the selectors and dividers. The new values take effect on
    /// the next mode transition for the system dividers, immediately for
    /// the auxiliary ones.
    pub fn apply(&self, settings: &CgmSettings) {
        let regs = &*self.registers;

        regs.ac2_sc.set(settings.ac2_sc);
        regs.ac3_sc.set(settings.ac3_sc);

        for (register, value) in regs.sc_dc.iter().zip(settings.sc_dc.iter()) {
            register.set(*value);
        }

        regs.ac0_sc.set(settings.ac0_sc);
        for (register, value) in regs.ac0_dc.iter().zip(settings.ac0_dc.iter()) {
            register.set(*value);
        }

        regs.ac1_sc.set(settings.ac1_sc);
        regs.ac1_dc0.set(settings.ac1_dc0);
    }

    /// Source currently selected for an auxiliary clock.
    pub fn selected_source(&self, clock: AuxClock) -> Option<ClockSource> {
        let regs = &*self.registers;
        let status = match clock {
            AuxClock::Aux0 => &regs.ac0_ss,
            AuxClock::Aux1 => &regs.ac1_ss,
            AuxClock::Pll0Reference => &regs.ac2_ss,
            AuxClock::Pll1Reference => &regs.ac3_ss,
        };
        ClockSource::from_selector(status.read(SS::SELSTAT))
    }

    /// Source currently driving the system clock dividers.
    pub fn system_source(&self) -> Option<ClockSource> {
        ClockSource::from_selector(self.registers.sc_ss.read(SS::SELSTAT))
    }

    /// Division factor of a system clock divider, `None` when disabled.
    pub fn system_divider(&self, index: usize) -> Option<u32> {
        let register = self.registers.sc_dc.get(index)?;
        if register.is_set(DC::DE) {
            Some(register.read(DC::DIV) + 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<CgmRegisters>(), 0x868);
        assert_eq!(offset_of!(CgmRegisters, pcs_sdur), 0x700);
        assert_eq!(offset_of!(CgmRegisters, sc_ss), 0x7E4);
        assert_eq!(offset_of!(CgmRegisters, sc_dc), 0x7E8);
        assert_eq!(offset_of!(CgmRegisters, ac0_dc), 0x808);
        assert_eq!(offset_of!(CgmRegisters, ac1_dc0), 0x828);
        assert_eq!(offset_of!(CgmRegisters, ac3_ss), 0x864);
    }

    #[test]
    fn default_settings() {
        let settings = CgmSettings::from_config(&ClockConfig::DEFAULT).unwrap();
        assert_eq!(settings.sc_dc, [0x8001_0000, 0x8003_0000, 0x8007_0000]);
        assert_eq!(settings.ac0_sc, 0x0200_0000);
        assert_eq!(settings.ac0_dc[1], 0x8027_0000);
        assert_eq!(settings.ac1_sc, 0x0100_0000);
        assert_eq!(settings.ac1_dc0, 0x8000_0000);
        assert_eq!(settings.ac2_sc, 0x0100_0000);
        assert_eq!(settings.ac3_sc, 0x0100_0000);
    }

    #[test]
    fn settings_reject_bad_divider() {
        let config = ClockConfig {
            ac0_dividers: [5, 40, 25, 5, 17, 4],
            ..ClockConfig::DEFAULT
        };
        assert_eq!(
            CgmSettings::from_config(&config),
            Err(ClockError::DividerOutOfRange(Divider::Ac0Dc4))
        );
    }

    #[test]
    fn apply_and_read_back() {
        let block: Box<CgmRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let cgm = Cgm::new(unsafe { StaticRef::new(&*block as *const CgmRegisters) });
        let settings = CgmSettings::from_config(&ClockConfig::DEFAULT).unwrap();

        cgm.apply(&settings);

        assert_eq!(block.ac0_sc.read(SC::SELCTL), 2);
        assert_eq!(block.ac0_dc[5].get(), 0x8003_0000);
        assert_eq!(cgm.system_divider(0), Some(2));
        assert_eq!(cgm.system_divider(2), Some(8));
        assert_eq!(cgm.system_divider(3), None);
        // Status registers still read as reset, IRC selected.
        assert_eq!(cgm.system_source(), Some(ClockSource::Irc));
        assert_eq!(cgm.selected_source(AuxClock::Aux1), Some(ClockSource::Irc));
    }
}
