// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Crystal (XOSC) and internal RC (IRCOSC) oscillator control.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub XoscRegisters {
        (0x00 => pub ctl: ReadWrite<u32, XOSC_CTL::Register>),
        (0x04 => @END),
    }
}

register_structs! {
    pub IrcoscRegisters {
        (0x00 => pub ctl: ReadWrite<u32, IRCOSC_CTL::Register>),
        (0x04 => @END),
    }
}

register_bitfields![u32,
    pub XOSC_CTL [
        /// Oscillator bypass, EXTAL driven by an external clock
        OSCBYP OFFSET(31) NUMBITS(1) [],
        /// End of count value
        EOCV OFFSET(16) NUMBITS(8) [],
        /// Clock interrupt mask
        M_OSC OFFSET(7) NUMBITS(1) [],
        /// Clock interrupt flag
        I_OSC OFFSET(0) NUMBITS(1) []
    ],
    pub IRCOSC_CTL [
        USER_TRIM OFFSET(8) NUMBITS(5) [],
        /// Oscillator stable
        S_IRC OFFSET(4) NUMBITS(1) []
    ]
];

pub const XOSC_BASE: StaticRef<XoscRegisters> =
    unsafe { StaticRef::new(memory_map::XOSC_BASE as *const XoscRegisters) };

pub const IRCOSC_BASE: StaticRef<IrcoscRegisters> =
    unsafe { StaticRef::new(memory_map::IRCOSC_BASE as *const IrcoscRegisters) };

pub struct Xosc {
    registers: StaticRef<XoscRegisters>,
}

impl Xosc {
    pub const fn new(registers: StaticRef<XoscRegisters>) -> Xosc {
        Xosc { registers }
    }

    /// Select crystal or external clock input. Must be done before XOSC is
    /// switched on by a mode transition.
    pub fn set_bypass(&self, bypass: bool) {
        if bypass {
            self.registers.ctl.modify(XOSC_CTL::OSCBYP::SET);
        } else {
            self.registers.ctl.modify(XOSC_CTL::OSCBYP::CLEAR);
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.registers.ctl.is_set(XOSC_CTL::OSCBYP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bases() {
        assert_eq!(XOSC_BASE.address(), 0xFFFB_0080);
        assert_eq!(IRCOSC_BASE.address(), 0xFFFB_0000);
    }

    #[test]
    fn bypass_keeps_other_fields() {
        let block: Box<XoscRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let xosc = Xosc::new(unsafe { StaticRef::new(&*block as *const XoscRegisters) });
        block.ctl.modify(XOSC_CTL::EOCV.val(0x80));

        xosc.set_bypass(true);
        assert!(xosc.is_bypassed());
        assert_eq!(block.ctl.read(XOSC_CTL::EOCV), 0x80);

        xosc.set_bypass(false);
        assert!(!xosc.is_bypassed());
    }
}
