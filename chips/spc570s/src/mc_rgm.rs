// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reset Generation Module (MC_RGM).

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RgmRegisters {
        /// Destructive event status
        (0x000 => pub des: ReadWrite<u32, DES::Register>),
        (0x004 => _reserved0),
        /// Destructive event reset disable
        (0x010 => pub derd: ReadWrite<u32>),
        (0x014 => _reserved1),
        /// Functional event status
        (0x300 => pub fes: ReadWrite<u32, FES::Register>),
        (0x304 => _reserved2),
        /// Functional event reset disable
        (0x310 => pub ferd: ReadWrite<u32>),
        (0x314 => _reserved3),
        /// Functional bidirectional reset enable
        (0x318 => pub fbre: ReadWrite<u32>),
        /// Functional reset escalation counter
        (0x31C => pub frec: ReadWrite<u8>),
        (0x31D => _reserved4),
        /// Functional reset escalation threshold
        (0x320 => pub fret: ReadWrite<u8>),
        (0x321 => _reserved5),
        /// Functional event short sequence
        (0x324 => pub fess: ReadWrite<u32>),
        (0x328 => @END),
    }
}

register_bitfields![u32,
    pub DES [
        /// Power-on reset
        F_POR OFFSET(0) NUMBITS(1) [],
        /// Destructive reset escalation
        F_DR_ESC OFFSET(3) NUMBITS(1) [],
        /// Supply voltage monitor destructive events
        F_VOR_DEST OFFSET(4) NUMBITS(1) [],
        F_SUF_DEST OFFSET(10) NUMBITS(1) []
    ],
    pub FES [
        /// External reset
        F_EXR OFFSET(0) NUMBITS(1) [],
        /// Functional reset escalation
        F_FR_ESC OFFSET(1) NUMBITS(1) [],
        /// Software functional reset
        F_SOFT_FUNC OFFSET(2) NUMBITS(1) [],
        /// Software watchdog timer
        F_SWT OFFSET(9) NUMBITS(1) [],
        F_JTAG OFFSET(15) NUMBITS(1) []
    ]
];

pub const RGM_BASE: StaticRef<RgmRegisters> =
    unsafe { StaticRef::new(memory_map::MC_RGM_BASE as *const RgmRegisters) };

/// Raw reset event flags captured at boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetCauses {
    pub destructive: u32,
    pub functional: u32,
}

impl ResetCauses {
    pub fn power_on(&self) -> bool {
        self.destructive & 1 != 0
    }

    pub fn external(&self) -> bool {
        self.functional & 1 != 0
    }

    pub fn watchdog(&self) -> bool {
        self.functional & (1 << 9) != 0
    }

    pub fn software(&self) -> bool {
        self.functional & (1 << 2) != 0
    }
}

pub struct Rgm {
    registers: StaticRef<RgmRegisters>,
}

impl Rgm {
    pub const fn new(registers: StaticRef<RgmRegisters>) -> Rgm {
        Rgm { registers }
    }

    pub fn reset_causes(&self) -> ResetCauses {
        ResetCauses {
            destructive: self.registers.des.get(),
            functional: self.registers.fes.get(),
        }
    }

    /// Clear the recorded events. Both status registers are write one to
    /// clear.
    pub fn clear_reset_causes(&self, causes: ResetCauses) {
        self.registers.des.set(causes.destructive);
        self.registers.fes.set(causes.functional);
    }
}
