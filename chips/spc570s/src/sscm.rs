// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System Status and Configuration Module (SSCM).

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub SscmRegisters {
        (0x00 => pub status: ReadOnly<u16, STATUS::Register>),
        (0x02 => pub memconfig: ReadOnly<u16>),
        (0x04 => _reserved0),
        /// Bus error response configuration
        (0x06 => pub error: ReadWrite<u16, ERROR::Register>),
        (0x08 => pub debugport: ReadWrite<u16>),
        (0x0A => _reserved1),
        /// Password comparison, high and low words
        (0x0C => pub pwcmph: ReadWrite<u32>),
        (0x10 => pub pwcmpl: ReadWrite<u32>),
        (0x14 => _reserved2),
        /// User option status
        (0x18 => pub uops: ReadOnly<u32>),
        (0x1C => @END),
    }
}

register_bitfields![u16,
    pub STATUS [
        /// Nexus enabled
        NXEN OFFSET(15) NUMBITS(1) [],
        /// Public serial access
        PUB OFFSET(14) NUMBITS(1) [],
        /// Security status
        SEC OFFSET(13) NUMBITS(1) [],
        BMODE OFFSET(3) NUMBITS(3) [],
        VLE OFFSET(2) NUMBITS(1) []
    ],
    pub ERROR [
        /// Peripheral bus abort enable
        PAE OFFSET(1) NUMBITS(1) [],
        /// Register bus abort enable
        RAE OFFSET(0) NUMBITS(1) []
    ]
];

pub const SSCM_BASE: StaticRef<SscmRegisters> =
    unsafe { StaticRef::new(memory_map::SSCM_BASE as *const SscmRegisters) };

pub struct Sscm {
    registers: StaticRef<SscmRegisters>,
}

impl Sscm {
    pub const fn new(registers: StaticRef<SscmRegisters>) -> Sscm {
        Sscm { registers }
    }

    /// Select whether illegal peripheral and register accesses abort.
    pub fn set_error_config(&self, peripheral_abort: bool, register_abort: bool) {
        self.registers.error.write(
            ERROR::PAE.val(peripheral_abort as u16) + ERROR::RAE.val(register_abort as u16),
        );
    }

    pub fn boot_mode(&self) -> u16 {
        self.registers.status.read(STATUS::BMODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<SscmRegisters>(), 0x1C);
        assert_eq!(offset_of!(SscmRegisters, error), 0x06);
        assert_eq!(offset_of!(SscmRegisters, pwcmph), 0x0C);
        assert_eq!(offset_of!(SscmRegisters, uops), 0x18);
    }

    #[test]
    fn error_config() {
        let block: Box<SscmRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let sscm = Sscm::new(unsafe { StaticRef::new(&*block as *const SscmRegisters) });

        sscm.set_error_config(true, true);
        assert_eq!(block.error.get(), 0x3);
        sscm.set_error_config(false, true);
        assert_eq!(block.error.get(), 0x1);
        assert_eq!(sscm.boot_mode(), 0);
    }
}
