// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PLL Digital Interface (PLLDIG).
//!
//! PLL0 is an integer PLL fed by AC2 (IRC or XOSC) with two outputs, PHI and
//! PHI1. PLL1 is a frequency modulated PLL fed by AC3 (XOSC or PLL0 PHI1).
//! Both PLLs are switched on and off by the `PLLxON` bits of the mode
//! configuration, this module only holds their dividers.

use crate::clocks::ClockConfig;
use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub PllDigRegisters {
        (0x00 => pub pll0cr: ReadWrite<u32, PLLCR::Register>),
        (0x04 => pub pll0sr: ReadWrite<u32, PLLSR::Register>),
        (0x08 => pub pll0dv: ReadWrite<u32, PLL0DV::Register>),
        (0x0C => _reserved0),
        (0x20 => pub pll1cr: ReadWrite<u32, PLLCR::Register>),
        (0x24 => pub pll1sr: ReadWrite<u32, PLLSR::Register>),
        (0x28 => pub pll1dv: ReadWrite<u32, PLL1DV::Register>),
        /// PLL1 frequency modulation
        (0x2C => pub pll1fm: ReadWrite<u32, PLL1FM::Register>),
        /// PLL1 fractional divide
        (0x30 => pub pll1fd: ReadWrite<u32, PLL1FD::Register>),
        (0x34 => @END),
    }
}

register_bitfields![u32,
    pub PLLCR [
        /// Loss-of-lock interrupt enable
        LOLIE OFFSET(3) NUMBITS(1) [],
        EXPDIE OFFSET(7) NUMBITS(1) []
    ],
    pub PLLSR [
        EXTPDF OFFSET(7) NUMBITS(1) [],
        /// Loss-of-lock flag, write one to clear
        LOLF OFFSET(3) NUMBITS(1) [],
        LOCK OFFSET(2) NUMBITS(1) []
    ],
    pub PLL0DV [
        RFDPHI1 OFFSET(27) NUMBITS(4) [],
        RFDPHI OFFSET(16) NUMBITS(6) [],
        PREDIV OFFSET(12) NUMBITS(3) [],
        MFD OFFSET(0) NUMBITS(7) []
    ],
    pub PLL1DV [
        RFDPHI OFFSET(16) NUMBITS(6) [],
        MFD OFFSET(0) NUMBITS(7) []
    ],
    pub PLL1FM [
        MODEN OFFSET(30) NUMBITS(1) [],
        MODSEL OFFSET(29) NUMBITS(1) [],
        MODPRD OFFSET(16) NUMBITS(13) [],
        INCSTP OFFSET(0) NUMBITS(15) []
    ],
    pub PLL1FD [
        FDEN OFFSET(30) NUMBITS(1) [],
        DTHDIS OFFSET(16) NUMBITS(2) [],
        FRCDIV OFFSET(0) NUMBITS(12) []
    ]
];

pub const PLLDIG_BASE: StaticRef<PllDigRegisters> =
    unsafe { StaticRef::new(memory_map::PLLDIG_BASE as *const PllDigRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pll {
    Pll0,
    Pll1,
}

/// `PLLDIG_PLL0DV` value for a configuration.
pub const fn pll0_dv(config: &ClockConfig) -> u32 {
    ((config.pll0_rfdphi1 & 0xF) << 27)
        | ((config.pll0_rfdphi & 0x3F) << 16)
        | ((config.pll0_prediv & 0x7) << 12)
        | (config.pll0_mfd & 0x7F)
}

/// `PLLDIG_PLL1DV` value for a configuration.
pub const fn pll1_dv(config: &ClockConfig) -> u32 {
    ((config.pll1_rfdphi & 0x3F) << 16) | (config.pll1_mfd & 0x7F)
}

pub struct PllDig {
    registers: StaticRef<PllDigRegisters>,
}

impl PllDig {
    pub const fn new(registers: StaticRef<PllDigRegisters>) -> PllDig {
        PllDig { registers }
    }

    /// Load the dividers of both PLLs. Only meaningful while the PLLs are
    /// off, they are started by the next mode transition.
    pub fn configure(&self, config: &ClockConfig) {
        self.registers.pll0dv.set(pll0_dv(config));
        self.registers.pll1dv.set(pll1_dv(config));
    }

    pub fn is_locked(&self, pll: Pll) -> bool {
        match pll {
            Pll::Pll0 => self.registers.pll0sr.is_set(PLLSR::LOCK),
            Pll::Pll1 => self.registers.pll1sr.is_set(PLLSR::LOCK),
        }
    }

    /// Report and clear a loss of lock.
    pub fn take_loss_of_lock(&self, pll: Pll) -> bool {
        let status = match pll {
            Pll::Pll0 => &self.registers.pll0sr,
            Pll::Pll1 => &self.registers.pll1sr,
        };
        if status.is_set(PLLSR::LOLF) {
            status.write(PLLSR::LOLF::SET);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<PllDigRegisters>(), 0x34);
        assert_eq!(offset_of!(PllDigRegisters, pll1cr), 0x20);
        assert_eq!(offset_of!(PllDigRegisters, pll1fd), 0x30);
        assert_eq!(PLLDIG_BASE.address(), 0xFFFB_0100);
    }

    #[test]
    fn divider_words() {
        let config = ClockConfig::DEFAULT;
        // RFDPHI1 6, RFDPHI 1, PREDIV 2, MFD 20
        assert_eq!(pll0_dv(&config), 0x3001_2014);
        // RFDPHI 2, MFD 20
        assert_eq!(pll1_dv(&config), 0x0002_0014);
    }

    #[test]
    fn configure_writes_both_plls() {
        let block: Box<PllDigRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let plldig = PllDig::new(unsafe { StaticRef::new(&*block as *const PllDigRegisters) });

        plldig.configure(&ClockConfig::DEFAULT);

        assert_eq!(block.pll0dv.read(PLL0DV::MFD), 20);
        assert_eq!(block.pll0dv.read(PLL0DV::RFDPHI1), 6);
        assert_eq!(block.pll1dv.read(PLL1DV::RFDPHI), 2);
        assert!(!plldig.is_locked(Pll::Pll0));

        block.pll1sr.write(PLLSR::LOCK::SET + PLLSR::LOLF::SET);
        assert!(plldig.is_locked(Pll::Pll1));
        assert!(plldig.take_loss_of_lock(Pll::Pll1));
        assert!(!plldig.take_loss_of_lock(Pll::Pll0));
    }
}
