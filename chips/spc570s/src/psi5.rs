// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PSI5 receiver, two channels with eight message slots each.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const PSI5_CHANNELS: usize = 2;
pub const PSI5_SLOTS: usize = 8;

register_structs! {
    pub Psi5Message {
        /// PSI5 message receive register, low and high words
        (0x00 => pub pmrrl: ReadOnly<u32>),
        (0x04 => pub pmrrh: ReadOnly<u32>),
        (0x08 => @END),
    }
}

register_structs! {
    pub Psi5Channel {
        /// Channel control
        (0x00 => pub pccr: ReadWrite<u32, PCCR::Register>),
        /// DMA control and status
        (0x04 => pub dcr: ReadWrite<u32>),
        (0x08 => pub dsr: ReadWrite<u32>),
        /// Global interrupt control
        (0x0C => pub gicr: ReadWrite<u32>),
        /// New data, overwrite and error status
        (0x10 => pub ndsr: ReadWrite<u32>),
        (0x14 => pub owsr: ReadWrite<u32>),
        (0x18 => pub edsr: ReadWrite<u32>),
        (0x1C => _reserved0),
        /// DMA buffer base address
        (0x20 => pub dobar: ReadWrite<u32>),
        (0x24 => _reserved1),
        /// Serial frame configuration and status
        (0x30 => pub sfcr: ReadWrite<u32>),
        (0x34 => pub sfr: ReadOnly<u32>),
        (0x38 => _reserved2),
        (0x40 => pub msg: [Psi5Message; PSI5_SLOTS]),
        (0x80 => _reserved3),
        (0x100 => @END),
    }
}

register_structs! {
    pub Psi5Registers {
        /// Module configuration
        (0x000 => pub mcr: ReadWrite<u32, MCR::Register>),
        (0x004 => _reserved0),
        (0x100 => pub channel: [Psi5Channel; PSI5_CHANNELS]),
        (0x300 => @END),
    }
}

register_bitfields![u32,
    pub MCR [
        MDIS OFFSET(0) NUMBITS(1) []
    ],
    pub PCCR [
        /// Channel enable
        CH_EN OFFSET(31) NUMBITS(1) [],
        BIT_RATE OFFSET(16) NUMBITS(1) [
            Kbps125 = 0,
            Kbps189 = 1
        ],
        /// Message buffer mode
        MEM_DEPTH OFFSET(8) NUMBITS(5) []
    ]
];

pub const PSI5_0_BASE: StaticRef<Psi5Registers> =
    unsafe { StaticRef::new(memory_map::PSI5_0_BASE as *const Psi5Registers) };

pub struct Psi5 {
    registers: StaticRef<Psi5Registers>,
}

impl Psi5 {
    pub const fn new(registers: StaticRef<Psi5Registers>) -> Psi5 {
        Psi5 { registers }
    }

    pub fn enable_channel(&self, channel: usize) -> bool {
        match self.registers.channel.get(channel) {
            Some(ch) => {
                self.registers.mcr.modify(MCR::MDIS::CLEAR);
                ch.pccr.modify(PCCR::CH_EN::SET);
                true
            }
            None => false,
        }
    }

    /// Raw 64-bit message of a slot when its new data flag is set.
    pub fn read_slot(&self, channel: usize, slot: usize) -> Option<u64> {
        let ch = self.registers.channel.get(channel)?;
        let msg = ch.msg.get(slot)?;
        if ch.ndsr.get() & (1 << slot) == 0 {
            return None;
        }
        Some(((msg.pmrrh.get() as u64) << 32) | msg.pmrrl.get() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};
    use tock_registers::interfaces::Writeable;

    #[test]
    fn layout() {
        assert_eq!(size_of::<Psi5Channel>(), 0x100);
        assert_eq!(offset_of!(Psi5Channel, dobar), 0x20);
        assert_eq!(offset_of!(Psi5Channel, sfr), 0x34);
        assert_eq!(offset_of!(Psi5Channel, msg), 0x40);
        assert_eq!(size_of::<Psi5Registers>(), 0x300);
        assert_eq!(offset_of!(Psi5Registers, channel), 0x100);
    }

    #[test]
    fn slots() {
        let raw: *mut Psi5Registers =
            Box::into_raw(Box::new(unsafe { core::mem::zeroed::<Psi5Registers>() }));
        let psi5 = Psi5::new(unsafe { StaticRef::new(raw) });
        let block = unsafe { &*raw };

        assert!(psi5.enable_channel(1));
        assert!(!psi5.enable_channel(2));
        assert!(block.channel[1].pccr.is_set(PCCR::CH_EN));

        assert_eq!(psi5.read_slot(1, 3), None);
        block.channel[1].ndsr.set(1 << 3);
        unsafe {
            let slot = (raw as *mut u8).add(0x200 + 0x40 + 3 * 8) as *mut u32;
            slot.write_volatile(0x89AB_CDEF);
            slot.add(1).write_volatile(0x0123_4567);
        }
        assert_eq!(psi5.read_slot(1, 3), Some(0x0123_4567_89AB_CDEF));
        assert_eq!(psi5.read_slot(1, 8), None);

        drop(unsafe { Box::from_raw(raw) });
    }
}
