// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System Timer Module (STM).

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub StmChannel {
        /// Channel control
        (0x00 => pub ccr: ReadWrite<u32, CCR::Register>),
        /// Channel interrupt
        (0x04 => pub cir: ReadWrite<u32, CIR::Register>),
        /// Channel compare
        (0x08 => pub cmp: ReadWrite<u32>),
        (0x0C => _reserved0),
        (0x10 => @END),
    }
}

register_structs! {
    pub StmRegisters {
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        (0x04 => pub cnt: ReadWrite<u32>),
        (0x08 => _reserved0),
        (0x10 => pub channels: [StmChannel; 4]),
        (0x50 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Counter prescaler, the counter runs at f / (CPS + 1)
        CPS OFFSET(8) NUMBITS(8) [],
        FRZ OFFSET(1) NUMBITS(1) [],
        /// Timer enable
        TEN OFFSET(0) NUMBITS(1) []
    ],
    pub CCR [
        CEN OFFSET(0) NUMBITS(1) []
    ],
    pub CIR [
        CIF OFFSET(0) NUMBITS(1) []
    ]
];

pub const STM_BASE: StaticRef<StmRegisters> =
    unsafe { StaticRef::new(memory_map::STM_0_BASE as *const StmRegisters) };

pub struct Stm {
    registers: StaticRef<StmRegisters>,
}

impl Stm {
    pub const fn new(registers: StaticRef<StmRegisters>) -> Stm {
        Stm { registers }
    }

    /// Start the free running counter with a prescaler of 1 to 256.
    pub fn start(&self, prescaler: u32) {
        let cps = prescaler.clamp(1, 256) - 1;
        self.registers
            .cr
            .write(CR::CPS.val(cps) + CR::FRZ::SET + CR::TEN::SET);
    }

    pub fn now(&self) -> u32 {
        self.registers.cnt.get()
    }

    pub fn is_running(&self) -> bool {
        self.registers.cr.is_set(CR::TEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<StmChannel>(), 0x10);
        assert_eq!(size_of::<StmRegisters>(), 0x50);
        assert_eq!(offset_of!(StmRegisters, channels), 0x10);
        assert_eq!(STM_BASE.address(), 0xFC06_8000);
    }

    #[test]
    fn prescaler_encoding() {
        let block: Box<StmRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let stm = Stm::new(unsafe { StaticRef::new(&*block as *const StmRegisters) });

        stm.start(4);
        assert!(stm.is_running());
        assert_eq!(block.cr.read(CR::CPS), 3);

        stm.start(1000);
        assert_eq!(block.cr.read(CR::CPS), 255);

        stm.start(0);
        assert_eq!(block.cr.read(CR::CPS), 0);
    }

    #[test]
    fn counter_read() {
        let block: Box<StmRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let stm = Stm::new(unsafe { StaticRef::new(&*block as *const StmRegisters) });

        assert_eq!(stm.now(), 0);
        block.cnt.set(0xDEAD_0001);
        assert_eq!(stm.now(), 0xDEAD_0001);
        assert!(!stm.is_running());
    }
}
