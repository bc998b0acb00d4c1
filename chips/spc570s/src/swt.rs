// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Software Watchdog Timer (SWT).

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// First and second word of the service/unlock key sequence.
pub const UNLOCK_KEY_0: u32 = 0xC520;
pub const UNLOCK_KEY_1: u32 = 0xD928;
/// Fixed service sequence.
pub const SERVICE_KEY_0: u32 = 0xA602;
pub const SERVICE_KEY_1: u32 = 0xB480;

register_structs! {
    pub SwtRegisters {
        (0x00 => pub cr: ReadWrite<u32, CR::Register>),
        /// Interrupt
        (0x04 => pub ir: ReadWrite<u32, IR::Register>),
        /// Timeout
        (0x08 => pub to: ReadWrite<u32>),
        /// Window
        (0x0C => pub wn: ReadWrite<u32>),
        /// Service
        (0x10 => pub sr: ReadWrite<u32>),
        /// Counter output
        (0x14 => pub co: ReadWrite<u32>),
        /// Service key
        (0x18 => pub sk: ReadWrite<u32>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Master access protection
        MAP OFFSET(24) NUMBITS(8) [],
        /// Reset on invalid access
        RIA OFFSET(8) NUMBITS(1) [],
        /// Window mode
        WND OFFSET(7) NUMBITS(1) [],
        /// Interrupt then reset
        ITR OFFSET(6) NUMBITS(1) [],
        /// Hard lock
        HLK OFFSET(5) NUMBITS(1) [],
        /// Soft lock
        SLK OFFSET(4) NUMBITS(1) [],
        /// Stop mode control
        STP OFFSET(2) NUMBITS(1) [],
        /// Debug mode control
        FRZ OFFSET(1) NUMBITS(1) [],
        /// Watchdog enable
        WEN OFFSET(0) NUMBITS(1) []
    ],
    pub IR [
        TIF OFFSET(0) NUMBITS(1) []
    ]
];

pub const SWT_BASE: StaticRef<SwtRegisters> =
    unsafe { StaticRef::new(memory_map::SWT_0_BASE as *const SwtRegisters) };

pub struct Swt {
    registers: StaticRef<SwtRegisters>,
}

impl Swt {
    pub const fn new(registers: StaticRef<SwtRegisters>) -> Swt {
        Swt { registers }
    }

    /// Clear a soft lock with the unlock sequence.
    pub fn unlock(&self) {
        self.registers.sr.set(UNLOCK_KEY_0);
        self.registers.sr.set(UNLOCK_KEY_1);
    }

    /// Stop the watchdog. Has no effect when the watchdog is hard locked.
    pub fn disable(&self) {
        if self.registers.cr.is_set(CR::HLK) {
            log::warn!("SWT: hard locked, watchdog left running");
            return;
        }
        self.unlock();
        self.registers.cr.modify(CR::WEN::CLEAR);
    }

    pub fn service(&self) {
        self.registers.sr.set(SERVICE_KEY_0);
        self.registers.sr.set(SERVICE_KEY_1);
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.cr.is_set(CR::WEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    fn fake() -> (Box<SwtRegisters>, Swt) {
        let block: Box<SwtRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let swt = Swt::new(unsafe { StaticRef::new(&*block as *const SwtRegisters) });
        (block, swt)
    }

    #[test]
    fn layout() {
        assert_eq!(size_of::<SwtRegisters>(), 0x1C);
        assert_eq!(SWT_BASE.address(), 0xFC05_0000);
    }

    #[test]
    fn disable_clears_enable_only() {
        let (block, swt) = fake();
        block.cr.write(CR::MAP.val(0xFF) + CR::RIA::SET + CR::SLK::SET + CR::WEN::SET);

        swt.disable();

        assert!(!swt.is_enabled());
        assert_eq!(block.cr.read(CR::MAP), 0xFF);
        assert!(block.cr.is_set(CR::RIA));
        // The last service register write is the second unlock key.
        assert_eq!(block.sr.get(), UNLOCK_KEY_1);
    }

    #[test]
    fn hard_lock_is_respected() {
        let (block, swt) = fake();
        block.cr.write(CR::HLK::SET + CR::WEN::SET);
        swt.disable();
        assert!(swt.is_enabled());
        assert_eq!(block.sr.get(), 0);
    }

    #[test]
    fn service_sequence() {
        let (block, swt) = fake();
        block.cr.write(CR::WEN::SET);
        assert_eq!((SERVICE_KEY_0, SERVICE_KEY_1), (0xA602, 0xB480));

        swt.service();

        // Only the second key stays visible in memory.
        assert_eq!(block.sr.get(), SERVICE_KEY_1);
        assert!(swt.is_enabled());
    }
}
