// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Enhanced Direct Memory Access controller (eDMA), 16 channels.
//!
//! The e200 core is big-endian, so in each transfer control descriptor the
//! 16-bit `ATTR` half-word comes before `SOFF`, and the channel priority
//! bytes are swapped within each word.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::Writeable;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

pub const EDMA_CHANNELS: usize = 16;

register_structs! {
    /// Transfer control descriptor
    pub Tcd {
        (0x00 => pub saddr: ReadWrite<u32>),
        (0x04 => pub attr: ReadWrite<u16, ATTR::Register>),
        (0x06 => pub soff: ReadWrite<u16>),
        /// Minor loop byte count
        (0x08 => pub nbytes: ReadWrite<u32>),
        (0x0C => pub slast: ReadWrite<u32>),
        (0x10 => pub daddr: ReadWrite<u32>),
        /// Current major iteration count
        (0x14 => pub citer: ReadWrite<u16>),
        (0x16 => pub doff: ReadWrite<u16>),
        (0x18 => pub dlastsga: ReadWrite<u32>),
        /// Starting major iteration count
        (0x1C => pub biter: ReadWrite<u16>),
        (0x1E => pub csr: ReadWrite<u16, CSR::Register>),
        (0x20 => @END),
    }
}

register_structs! {
    pub EdmaRegisters {
        (0x000 => pub cr: ReadWrite<u32, CR::Register>),
        /// Error status
        (0x004 => pub es: ReadOnly<u32>),
        (0x008 => _reserved0),
        /// Enable request
        (0x00C => pub erq: ReadWrite<u32>),
        (0x010 => _reserved1),
        /// Enable error interrupt
        (0x014 => pub eei: ReadWrite<u32>),
        /// Clear/set byte registers, big-endian order
        (0x018 => pub serq: WriteOnly<u8>),
        (0x019 => pub cerq: WriteOnly<u8>),
        (0x01A => pub seei: WriteOnly<u8>),
        (0x01B => pub ceei: WriteOnly<u8>),
        (0x01C => pub cint: WriteOnly<u8>),
        (0x01D => pub cerr: WriteOnly<u8>),
        (0x01E => pub ssrt: WriteOnly<u8>),
        (0x01F => pub cdne: WriteOnly<u8>),
        (0x020 => _reserved2),
        (0x024 => pub int: ReadWrite<u32>),
        (0x028 => _reserved3),
        (0x02C => pub err: ReadWrite<u32>),
        (0x030 => _reserved4),
        /// Hardware request status
        (0x034 => pub hrs: ReadOnly<u32>),
        (0x038 => _reserved5),
        /// Channel priority, see [`dchpri_index`]
        (0x100 => pub dchpri: [ReadWrite<u8, DCHPRI::Register>; EDMA_CHANNELS]),
        (0x110 => _reserved6),
        (0x1000 => pub tcd: [Tcd; EDMA_CHANNELS]),
        (0x1200 => @END),
    }
}

register_bitfields![u32,
    pub CR [
        /// Cancel transfer
        CX OFFSET(17) NUMBITS(1) [],
        /// Error cancel transfer
        ECX OFFSET(16) NUMBITS(1) [],
        /// Enable minor loop mapping
        EMLM OFFSET(7) NUMBITS(1) [],
        /// Continuous link mode
        CLM OFFSET(6) NUMBITS(1) [],
        HALT OFFSET(5) NUMBITS(1) [],
        /// Halt on error
        HOE OFFSET(4) NUMBITS(1) [],
        /// Round robin channel arbitration
        ERCA OFFSET(2) NUMBITS(1) [],
        /// Enable debug
        EDBG OFFSET(1) NUMBITS(1) []
    ]
];

register_bitfields![u16,
    pub ATTR [
        SMOD OFFSET(11) NUMBITS(5) [],
        SSIZE OFFSET(8) NUMBITS(3) [
            Byte = 0,
            HalfWord = 1,
            Word = 2,
            DoubleWord = 3,
            ThirtyTwoBytes = 5
        ],
        DMOD OFFSET(3) NUMBITS(5) [],
        DSIZE OFFSET(0) NUMBITS(3) [
            Byte = 0,
            HalfWord = 1,
            Word = 2,
            DoubleWord = 3,
            ThirtyTwoBytes = 5
        ]
    ],
    pub CSR [
        /// Bandwidth control
        BWC OFFSET(14) NUMBITS(2) [],
        MAJORLINKCH OFFSET(8) NUMBITS(4) [],
        DONE OFFSET(7) NUMBITS(1) [],
        ACTIVE OFFSET(6) NUMBITS(1) [],
        MAJORELINK OFFSET(5) NUMBITS(1) [],
        /// Scatter/gather
        ESG OFFSET(4) NUMBITS(1) [],
        /// Disable request at end of major loop
        DREQ OFFSET(3) NUMBITS(1) [],
        INTHALF OFFSET(2) NUMBITS(1) [],
        INTMAJOR OFFSET(1) NUMBITS(1) [],
        START OFFSET(0) NUMBITS(1) []
    ]
];

register_bitfields![u8,
    pub DCHPRI [
        /// Enable channel preemption
        ECP OFFSET(7) NUMBITS(1) [],
        /// Disable preempt ability
        DPA OFFSET(6) NUMBITS(1) [],
        CHPRI OFFSET(0) NUMBITS(4) []
    ]
];

pub const EDMA_BASE: StaticRef<EdmaRegisters> =
    unsafe { StaticRef::new(memory_map::EDMA_0_BASE as *const EdmaRegisters) };

/// Position of the `DCHPRIn` byte of `channel` in
/// [`EdmaRegisters::dchpri`]. Each 32-bit word holds channels `n+3..=n` from
/// the lowest address up.
pub const fn dchpri_index(channel: usize) -> usize {
    channel ^ 3
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdmaError {
    /// Channel number beyond [`EDMA_CHANNELS`]. Set/clear registers read
    /// bit 6 as "all channels", so such values are never written.
    InvalidChannel,
}

pub struct Edma {
    registers: StaticRef<EdmaRegisters>,
}

impl Edma {
    pub const fn new(registers: StaticRef<EdmaRegisters>) -> Edma {
        Edma { registers }
    }

    /// Give every channel a distinct priority equal to its number.
    pub fn init(&self) {
        let regs = &*self.registers;
        regs.cr.write(CR::ERCA::CLEAR + CR::EDBG::SET);
        regs.erq.set(0);
        regs.eei.set(0);
        for channel in 0..EDMA_CHANNELS {
            regs.dchpri[dchpri_index(channel)].write(DCHPRI::CHPRI.val(channel as u8));
        }
    }

    fn channel_byte(channel: usize) -> Result<u8, EdmaError> {
        if channel < EDMA_CHANNELS {
            Ok(channel as u8)
        } else {
            Err(EdmaError::InvalidChannel)
        }
    }

    /// Enable hardware requests of a channel.
    pub fn enable_request(&self, channel: usize) -> Result<(), EdmaError> {
        self.registers.serq.set(Self::channel_byte(channel)?);
        Ok(())
    }

    pub fn disable_request(&self, channel: usize) -> Result<(), EdmaError> {
        self.registers.cerq.set(Self::channel_byte(channel)?);
        Ok(())
    }

    pub fn clear_interrupt(&self, channel: usize) -> Result<(), EdmaError> {
        self.registers.cint.set(Self::channel_byte(channel)?);
        Ok(())
    }

    pub fn tcd(&self, channel: usize) -> Option<&Tcd> {
        self.registers.tcd.get(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};
    use tock_registers::interfaces::Readable;

    #[test]
    fn layout() {
        assert_eq!(size_of::<Tcd>(), 0x20);
        assert_eq!(offset_of!(Tcd, attr), 0x04);
        assert_eq!(offset_of!(Tcd, soff), 0x06);
        assert_eq!(offset_of!(Tcd, csr), 0x1E);
        assert_eq!(size_of::<EdmaRegisters>(), 0x1200);
        assert_eq!(offset_of!(EdmaRegisters, serq), 0x018);
        assert_eq!(offset_of!(EdmaRegisters, cdne), 0x01F);
        assert_eq!(offset_of!(EdmaRegisters, hrs), 0x034);
        assert_eq!(offset_of!(EdmaRegisters, dchpri), 0x100);
        assert_eq!(offset_of!(EdmaRegisters, tcd), 0x1000);
    }

    #[test]
    fn priority_bytes_are_swapped() {
        assert_eq!(dchpri_index(0), 3);
        assert_eq!(dchpri_index(3), 0);
        assert_eq!(dchpri_index(4), 7);
        assert_eq!(dchpri_index(15), 12);

        let block: Box<EdmaRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let edma = Edma::new(unsafe { StaticRef::new(&*block as *const EdmaRegisters) });
        edma.init();
        assert_eq!(block.dchpri[0].read(DCHPRI::CHPRI), 3);
        assert_eq!(block.dchpri[15].read(DCHPRI::CHPRI), 12);
        assert!(edma.tcd(16).is_none());
    }

    #[test]
    fn channel_requests() {
        let raw: *mut EdmaRegisters =
            Box::into_raw(Box::new(unsafe { core::mem::zeroed::<EdmaRegisters>() }));
        let edma = Edma::new(unsafe { StaticRef::new(raw) });
        // The set/clear registers are write-only, read them back as bytes.
        let byte = |offset: usize| unsafe { (raw as *const u8).add(offset).read_volatile() };

        assert_eq!(edma.enable_request(5), Ok(()));
        assert_eq!(byte(0x018), 5);
        assert_eq!(edma.disable_request(15), Ok(()));
        assert_eq!(byte(0x019), 15);
        assert_eq!(edma.clear_interrupt(2), Ok(()));
        assert_eq!(byte(0x01C), 2);

        // 0x40 would address every channel at once.
        assert_eq!(edma.enable_request(0x40), Err(EdmaError::InvalidChannel));
        assert_eq!(edma.disable_request(16), Err(EdmaError::InvalidChannel));
        assert_eq!(edma.clear_interrupt(16), Err(EdmaError::InvalidChannel));
        assert_eq!(byte(0x018), 5);
        assert_eq!(byte(0x019), 15);
        assert_eq!(byte(0x01C), 2);

        drop(unsafe { Box::from_raw(raw) });
    }
}
