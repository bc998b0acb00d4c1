// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Power Management Controller (PMCDIG).

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

/// Number of voltage detector configuration registers.
pub const VOLTAGE_DETECTORS: usize = 16;

register_structs! {
    pub PmcRegisters {
        /// Global status
        (0x00 => pub gr_s: ReadOnly<u32, GR_S::Register>),
        /// Global configuration
        (0x04 => pub gr_c: ReadWrite<u32>),
        (0x08 => _reserved0),
        /// Voltage detect user mode enable
        (0x10 => pub vd_ue: ReadWrite<u32>),
        /// Voltage detect interrupt enable
        (0x14 => pub vd_ie: ReadWrite<u32>),
        (0x18 => _reserved1),
        (0x100 => pub vd: [ReadWrite<u32, VD::Register>; VOLTAGE_DETECTORS]),
        (0x140 => @END),
    }
}

register_bitfields![u32,
    pub GR_S [
        /// Voltage detector event pending
        VD_EVT OFFSET(30) NUMBITS(1) []
    ],
    pub VD [
        /// Reset event enable
        REE OFFSET(7) NUMBITS(1) [],
        /// Function event enable
        FEE OFFSET(6) NUMBITS(1) [],
        /// Lock
        LKO OFFSET(31) NUMBITS(1) []
    ]
];

pub const PMC_BASE: StaticRef<PmcRegisters> =
    unsafe { StaticRef::new(memory_map::PMCDIG_BASE as *const PmcRegisters) };

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<PmcRegisters>(), 0x140);
        assert_eq!(offset_of!(PmcRegisters, vd_ie), 0x14);
        assert_eq!(offset_of!(PmcRegisters, vd), 0x100);
        assert_eq!(PMC_BASE.address(), 0xFFFA_0400);
    }
}
