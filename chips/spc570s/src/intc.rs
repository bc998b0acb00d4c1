// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interrupt Controller (INTC).
//!
//! Every interrupt vector has a 16-bit priority select register routing it
//! to a core and giving it a priority. Priority 0 masks the source.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::Writeable;
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

/// Number of interrupt vectors with a priority select register.
pub const INTC_VECTORS: usize = 512;

/// Highest interrupt priority.
pub const MAX_PRIORITY: u8 = 15;

register_structs! {
    pub IntcRegisters {
        /// Block configuration
        (0x000 => pub bcr: ReadWrite<u32, BCR::Register>),
        /// Master protection
        (0x004 => pub mprot: ReadWrite<u32>),
        (0x008 => _reserved0),
        /// Current priority, core 0
        (0x010 => pub cpr0: ReadWrite<u32, CPR::Register>),
        (0x014 => _reserved1),
        /// Interrupt acknowledge, core 0
        (0x020 => pub iackr0: ReadOnly<u32>),
        (0x024 => _reserved2),
        /// End of interrupt, core 0
        (0x030 => pub eoir0: ReadWrite<u32>),
        (0x034 => _reserved3),
        /// Software set/clear interrupt
        (0x040 => pub sscir: [ReadWrite<u8, SSCIR::Register>; 16]),
        (0x050 => _reserved4),
        /// Priority select
        (0x060 => pub psr: [ReadWrite<u16, PSR::Register>; INTC_VECTORS]),
        (0x460 => @END),
    }
}

register_bitfields![u32,
    pub BCR [
        /// Hardware vector enable, core 0
        HVEN0 OFFSET(0) NUMBITS(1) []
    ],
    pub CPR [
        PRI OFFSET(0) NUMBITS(4) []
    ]
];

register_bitfields![u16,
    pub PSR [
        /// Route to core 0
        PRC_SELN0 OFFSET(15) NUMBITS(1) [],
        /// Interrupt priority
        PRIN OFFSET(0) NUMBITS(4) []
    ]
];

register_bitfields![u8,
    pub SSCIR [
        SET OFFSET(1) NUMBITS(1) [],
        CLR OFFSET(0) NUMBITS(1) []
    ]
];

pub const INTC_BASE: StaticRef<IntcRegisters> =
    unsafe { StaticRef::new(memory_map::INTC_0_BASE as *const IntcRegisters) };

/// Routing and priority of one interrupt source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriorityConfig {
    pub core0: bool,
    pub priority: u8,
}

impl PriorityConfig {
    pub const fn psr_value(&self) -> u16 {
        ((self.core0 as u16) << 15) | (self.priority & 0xF) as u16
    }
}

/// The system tick interrupt runs on core 0 at priority 4.
pub const SYSTEM_TICK_PRIORITY: PriorityConfig = PriorityConfig {
    core0: true,
    priority: 4,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntcError {
    InvalidVector,
    InvalidPriority,
}

pub struct Intc {
    registers: StaticRef<IntcRegisters>,
}

impl Intc {
    pub const fn new(registers: StaticRef<IntcRegisters>) -> Intc {
        Intc { registers }
    }

    pub fn set_priority(&self, vector: usize, config: PriorityConfig) -> Result<(), IntcError> {
        if config.priority > MAX_PRIORITY {
            return Err(IntcError::InvalidPriority);
        }
        self.registers
            .psr
            .get(vector)
            .ok_or(IntcError::InvalidVector)?
            .set(config.psr_value());
        Ok(())
    }

    /// Mask every interrupt below `priority` on core 0.
    pub fn set_current_priority(&self, priority: u8) {
        self.registers
            .cpr0
            .write(CPR::PRI.val((priority & 0xF) as u32));
    }

    pub fn end_of_interrupt(&self) {
        self.registers.eoir0.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};
    use tock_registers::interfaces::Readable;

    #[test]
    fn layout() {
        assert_eq!(size_of::<IntcRegisters>(), 0x460);
        assert_eq!(offset_of!(IntcRegisters, cpr0), 0x10);
        assert_eq!(offset_of!(IntcRegisters, iackr0), 0x20);
        assert_eq!(offset_of!(IntcRegisters, sscir), 0x40);
        assert_eq!(offset_of!(IntcRegisters, psr), 0x60);
    }

    #[test]
    fn psr_encoding() {
        assert_eq!(SYSTEM_TICK_PRIORITY.psr_value(), 0x8004);
        let masked = PriorityConfig {
            core0: false,
            priority: 0,
        };
        assert_eq!(masked.psr_value(), 0);
    }

    #[test]
    fn set_priority_bounds() {
        let block: Box<IntcRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let intc = Intc::new(unsafe { StaticRef::new(&*block as *const IntcRegisters) });

        assert_eq!(intc.set_priority(226, SYSTEM_TICK_PRIORITY), Ok(()));
        assert_eq!(block.psr[226].get(), 0x8004);
        assert_eq!(
            intc.set_priority(INTC_VECTORS, SYSTEM_TICK_PRIORITY),
            Err(IntcError::InvalidVector)
        );
        let too_high = PriorityConfig {
            core0: true,
            priority: 16,
        };
        assert_eq!(intc.set_priority(0, too_high), Err(IntcError::InvalidPriority));

        intc.set_current_priority(3);
        assert_eq!(block.cpr0.read(CPR::PRI), 3);
    }

    #[test]
    fn end_of_interrupt_writes_eoir() {
        let block: Box<IntcRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let intc = Intc::new(unsafe { StaticRef::new(&*block as *const IntcRegisters) });
        block.eoir0.set(0xFFFF_FFFF);

        intc.end_of_interrupt();

        assert_eq!(block.eoir0.get(), 0);
        assert_eq!(block.cpr0.get(), 0);
    }
}
