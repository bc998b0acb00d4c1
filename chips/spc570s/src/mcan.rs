// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! M_CAN and M_TTCAN controllers and their shared message RAM.
//!
//! `M_TTCAN_0` is an M_CAN core with the time triggered extension appended
//! at offset 0x100, `M_CAN_1` is a plain M_CAN. Filters, FIFOs and buffers
//! of both controllers live in the 16KiB CAN RAM; a [`MessageRamLayout`]
//! places one controller's sections in it.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

/// CAN RAM size in 32-bit words.
pub const CAN_RAM_WORDS: usize = memory_map::CAN_RAM_SIZE / 4;

const INIT_TIMEOUT: usize = 10_000;

register_structs! {
    pub McanRegisters {
        /// Core release
        (0x00 => pub crel: ReadOnly<u32>),
        /// Endian check value, reads 0x87654321
        (0x04 => pub endn: ReadOnly<u32>),
        (0x08 => pub cust: ReadWrite<u32>),
        /// Fast bit timing and prescaler
        (0x0C => pub fbtp: ReadWrite<u32, FBTP::Register>),
        (0x10 => pub test: ReadWrite<u32>),
        /// RAM watchdog
        (0x14 => pub rwd: ReadWrite<u32>),
        /// CC control
        (0x18 => pub cccr: ReadWrite<u32, CCCR::Register>),
        /// Bit timing and prescaler
        (0x1C => pub btp: ReadWrite<u32, BTP::Register>),
        /// Timestamp counter configuration and value
        (0x20 => pub tscc: ReadWrite<u32>),
        (0x24 => pub tscv: ReadWrite<u32>),
        /// Timeout counter configuration and value
        (0x28 => pub tocc: ReadWrite<u32>),
        (0x2C => pub tocv: ReadWrite<u32>),
        (0x30 => _reserved0),
        /// Error counter
        (0x40 => pub ecr: ReadOnly<u32, ECR::Register>),
        /// Protocol status
        (0x44 => pub psr: ReadOnly<u32>),
        (0x48 => _reserved1),
        /// Interrupt flags, enables and line selection
        (0x50 => pub ir: ReadWrite<u32>),
        (0x54 => pub ie: ReadWrite<u32>),
        (0x58 => pub ils: ReadWrite<u32>),
        (0x5C => pub ile: ReadWrite<u32>),
        (0x60 => _reserved2),
        /// Global filter configuration
        (0x80 => pub gfc: ReadWrite<u32>),
        /// Standard ID filter configuration
        (0x84 => pub sidfc: ReadWrite<u32>),
        /// Extended ID filter configuration
        (0x88 => pub xidfc: ReadWrite<u32>),
        (0x8C => _reserved3),
        (0x90 => pub xidam: ReadWrite<u32>),
        /// High priority message status
        (0x94 => pub hpms: ReadOnly<u32>),
        /// New data
        (0x98 => pub ndat1: ReadWrite<u32>),
        (0x9C => pub ndat2: ReadWrite<u32>),
        /// Rx FIFO 0 configuration, status, acknowledge
        (0xA0 => pub rxf0c: ReadWrite<u32>),
        (0xA4 => pub rxf0s: ReadOnly<u32>),
        (0xA8 => pub rxf0a: ReadWrite<u32>),
        /// Rx buffer configuration
        (0xAC => pub rxbc: ReadWrite<u32>),
        (0xB0 => pub rxf1c: ReadWrite<u32>),
        (0xB4 => pub rxf1s: ReadOnly<u32>),
        (0xB8 => pub rxf1a: ReadWrite<u32>),
        /// Rx buffer/FIFO element size
        (0xBC => pub rxesc: ReadWrite<u32>),
        /// Tx buffer configuration
        (0xC0 => pub txbc: ReadWrite<u32>),
        (0xC4 => pub txfqs: ReadOnly<u32>),
        (0xC8 => pub txesc: ReadWrite<u32>),
        /// Tx buffer request pending
        (0xCC => pub txbrp: ReadOnly<u32>),
        /// Tx buffer add request
        (0xD0 => pub txbar: ReadWrite<u32>),
        /// Tx buffer cancellation request
        (0xD4 => pub txbcr: ReadWrite<u32>),
        (0xD8 => pub txbto: ReadOnly<u32>),
        (0xDC => pub txbcf: ReadOnly<u32>),
        (0xE0 => pub txbtie: ReadWrite<u32>),
        (0xE4 => pub txbcie: ReadWrite<u32>),
        (0xE8 => _reserved4),
        /// Tx event FIFO configuration, status, acknowledge
        (0xF0 => pub txefc: ReadWrite<u32>),
        (0xF4 => pub txefs: ReadOnly<u32>),
        (0xF8 => pub txefa: ReadWrite<u32>),
        (0xFC => _reserved5),
        (0x100 => @END),
    }
}

register_structs! {
    pub TtcanRegisters {
        (0x000 => pub can: McanRegisters),
        /// TT trigger memory configuration
        (0x100 => pub tttmc: ReadWrite<u32>),
        /// TT reference message configuration
        (0x104 => pub ttrmc: ReadWrite<u32>),
        /// TT operation configuration
        (0x108 => pub ttocf: ReadWrite<u32>),
        /// TT matrix limits
        (0x10C => pub ttmlm: ReadWrite<u32>),
        /// TUR configuration
        (0x110 => pub turcf: ReadWrite<u32>),
        /// TT operation control
        (0x114 => pub ttocn: ReadWrite<u32>),
        /// TT global time preset
        (0x118 => pub ttgtp: ReadWrite<u32>),
        /// TT time mark
        (0x11C => pub tttmk: ReadWrite<u32>),
        /// TT interrupt register, enable, line select
        (0x120 => pub ttir: ReadWrite<u32>),
        (0x124 => pub ttie: ReadWrite<u32>),
        (0x128 => pub ttils: ReadWrite<u32>),
        /// TT operation status
        (0x12C => pub ttost: ReadOnly<u32>),
        /// TUR numerator actual
        (0x130 => pub turna: ReadOnly<u32>),
        /// TT local and global time
        (0x134 => pub ttlgt: ReadOnly<u32>),
        /// TT cycle time and count
        (0x138 => pub ttctc: ReadOnly<u32>),
        /// TT capture time
        (0x13C => pub ttcpt: ReadOnly<u32>),
        /// TT cycle sync mark
        (0x140 => pub ttcsm: ReadOnly<u32>),
        (0x144 => @END),
    }
}

register_structs! {
    pub CanMessageRam {
        (0x0000 => pub words: [ReadWrite<u32>; CAN_RAM_WORDS]),
        (0x4000 => @END),
    }
}

register_bitfields![u32,
    pub FBTP [
        FBRP OFFSET(16) NUMBITS(5) [],
        FTSEG1 OFFSET(8) NUMBITS(4) [],
        FTSEG2 OFFSET(4) NUMBITS(3) [],
        FSJW OFFSET(0) NUMBITS(2) []
    ],
    pub CCCR [
        /// Test mode enable
        TEST OFFSET(7) NUMBITS(1) [],
        /// Disable automatic retransmission
        DAR OFFSET(6) NUMBITS(1) [],
        /// Bus monitoring mode
        MON OFFSET(5) NUMBITS(1) [],
        CSR OFFSET(4) NUMBITS(1) [],
        CSA OFFSET(3) NUMBITS(1) [],
        ASM OFFSET(2) NUMBITS(1) [],
        /// Configuration change enable
        CCE OFFSET(1) NUMBITS(1) [],
        INIT OFFSET(0) NUMBITS(1) []
    ],
    pub BTP [
        BRP OFFSET(16) NUMBITS(10) [],
        TSEG1 OFFSET(8) NUMBITS(6) [],
        TSEG2 OFFSET(4) NUMBITS(4) [],
        SJW OFFSET(0) NUMBITS(4) []
    ],
    pub ECR [
        CEL OFFSET(16) NUMBITS(8) [],
        RP OFFSET(15) NUMBITS(1) [],
        REC OFFSET(8) NUMBITS(7) [],
        TEC OFFSET(0) NUMBITS(8) []
    ]
];

pub const M_TTCAN_0_BASE: StaticRef<TtcanRegisters> =
    unsafe { StaticRef::new(memory_map::M_TTCAN_0_BASE as *const TtcanRegisters) };

/// The M_CAN core of `M_TTCAN_0`.
pub const M_TTCAN_0_CAN: StaticRef<McanRegisters> =
    unsafe { StaticRef::new(memory_map::M_TTCAN_0_BASE as *const McanRegisters) };

pub const M_CAN_1_BASE: StaticRef<McanRegisters> =
    unsafe { StaticRef::new(memory_map::M_CAN_1_BASE as *const McanRegisters) };

pub const CAN_RAM: StaticRef<CanMessageRam> =
    unsafe { StaticRef::new(memory_map::CAN_RAM_BASE as *const CanMessageRam) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum McanError {
    /// `CCCR.INIT` did not follow the requested value.
    Timeout,
    /// A section has more elements than the controller supports.
    TooManyElements,
    /// The sections do not fit in the CAN RAM.
    MessageRamOverflow,
    InvalidTiming,
}

/// Words per element, classic CAN frames with 8 data bytes.
const STD_FILTER_WORDS: u32 = 1;
const EXT_FILTER_WORDS: u32 = 2;
const RX_ELEMENT_WORDS: u32 = 4;
const TX_EVENT_WORDS: u32 = 2;
const TX_ELEMENT_WORDS: u32 = 4;

/// Element counts of each message RAM section, starting at `offset` bytes
/// into the CAN RAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageRamLayout {
    pub offset: u32,
    pub std_filters: u32,
    pub ext_filters: u32,
    pub rx_fifo0: u32,
    pub rx_fifo1: u32,
    pub rx_buffers: u32,
    pub tx_event_fifo: u32,
    pub tx_buffers: u32,
}

/// Section registers computed from a [`MessageRamLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageRamMap {
    pub sidfc: u32,
    pub xidfc: u32,
    pub rxf0c: u32,
    pub rxf1c: u32,
    pub rxbc: u32,
    pub txefc: u32,
    pub txbc: u32,
    /// First byte after the last section.
    pub end: u32,
}

impl MessageRamLayout {
    pub fn map(&self) -> Result<MessageRamMap, McanError> {
        if self.std_filters > 128
            || self.ext_filters > 64
            || self.rx_fifo0 > 64
            || self.rx_fifo1 > 64
            || self.rx_buffers > 64
            || self.tx_event_fifo > 32
            || self.tx_buffers > 32
        {
            return Err(McanError::TooManyElements);
        }
        // With the element limits above the sections add at most 4864 bytes,
        // so bounding the start keeps the cursor arithmetic in range.
        if self.offset & 0x3 != 0 || self.offset as usize > memory_map::CAN_RAM_SIZE {
            return Err(McanError::MessageRamOverflow);
        }

        let mut cursor = self.offset;
        let mut section = |elements: u32, words: u32| {
            let start = cursor;
            cursor += elements * words * 4;
            start
        };
        let std_start = section(self.std_filters, STD_FILTER_WORDS);
        let ext_start = section(self.ext_filters, EXT_FILTER_WORDS);
        let fifo0_start = section(self.rx_fifo0, RX_ELEMENT_WORDS);
        let fifo1_start = section(self.rx_fifo1, RX_ELEMENT_WORDS);
        let rxbuf_start = section(self.rx_buffers, RX_ELEMENT_WORDS);
        let txev_start = section(self.tx_event_fifo, TX_EVENT_WORDS);
        let txbuf_start = section(self.tx_buffers, TX_ELEMENT_WORDS);

        if cursor as usize > memory_map::CAN_RAM_SIZE {
            return Err(McanError::MessageRamOverflow);
        }

        Ok(MessageRamMap {
            sidfc: (self.std_filters << 16) | std_start,
            xidfc: (self.ext_filters << 16) | ext_start,
            rxf0c: (self.rx_fifo0 << 16) | fifo0_start,
            rxf1c: (self.rx_fifo1 << 16) | fifo1_start,
            rxbc: rxbuf_start,
            txefc: (self.tx_event_fifo << 16) | txev_start,
            txbc: (self.tx_buffers << 16) | txbuf_start,
            end: cursor,
        })
    }
}

/// Nominal bit timing in time quanta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NominalTiming {
    pub prescaler: u32,
    pub seg1: u32,
    pub seg2: u32,
    pub sync_jump_width: u32,
}

pub struct Mcan {
    registers: StaticRef<McanRegisters>,
}

impl Mcan {
    pub const fn new(registers: StaticRef<McanRegisters>) -> Mcan {
        Mcan { registers }
    }

    fn wait_init(&self, set: bool) -> Result<(), McanError> {
        for _ in 0..INIT_TIMEOUT {
            if self.registers.cccr.is_set(CCCR::INIT) == set {
                return Ok(());
            }
        }
        log::warn!("M_CAN: CCCR.INIT stuck");
        Err(McanError::Timeout)
    }

    /// Stop the controller and unlock the protected configuration registers.
    pub fn enter_init(&self) -> Result<(), McanError> {
        self.registers.cccr.modify(CCCR::INIT::SET);
        self.wait_init(true)?;
        self.registers.cccr.modify(CCCR::CCE::SET);
        Ok(())
    }

    pub fn leave_init(&self) -> Result<(), McanError> {
        self.registers.cccr.modify(CCCR::CCE::CLEAR + CCCR::INIT::CLEAR);
        self.wait_init(false)
    }

    pub fn set_nominal_timing(&self, timing: &NominalTiming) -> Result<(), McanError> {
        if !(1..=1024).contains(&timing.prescaler)
            || !(2..=64).contains(&timing.seg1)
            || !(1..=16).contains(&timing.seg2)
            || !(1..=16).contains(&timing.sync_jump_width)
        {
            return Err(McanError::InvalidTiming);
        }
        self.registers.btp.write(
            BTP::BRP.val(timing.prescaler - 1)
                + BTP::TSEG1.val(timing.seg1 - 1)
                + BTP::TSEG2.val(timing.seg2 - 1)
                + BTP::SJW.val(timing.sync_jump_width - 1),
        );
        Ok(())
    }

    pub fn apply_message_ram(&self, map: &MessageRamMap) {
        let regs = &*self.registers;
        regs.sidfc.set(map.sidfc);
        regs.xidfc.set(map.xidfc);
        regs.rxf0c.set(map.rxf0c);
        regs.rxf1c.set(map.rxf1c);
        regs.rxbc.set(map.rxbc);
        regs.txefc.set(map.txefc);
        regs.txbc.set(map.txbc);
    }

    pub fn error_counters(&self) -> (u8, u8) {
        (
            self.registers.ecr.read(ECR::TEC) as u8,
            self.registers.ecr.read(ECR::REC) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    const LAYOUT: MessageRamLayout = MessageRamLayout {
        offset: 0,
        std_filters: 4,
        ext_filters: 2,
        rx_fifo0: 8,
        rx_fifo1: 0,
        rx_buffers: 0,
        tx_event_fifo: 4,
        tx_buffers: 8,
    };

    #[test]
    fn layout() {
        assert_eq!(size_of::<McanRegisters>(), 0x100);
        assert_eq!(offset_of!(McanRegisters, cccr), 0x18);
        assert_eq!(offset_of!(McanRegisters, ecr), 0x40);
        assert_eq!(offset_of!(McanRegisters, gfc), 0x80);
        assert_eq!(offset_of!(McanRegisters, rxesc), 0xBC);
        assert_eq!(offset_of!(McanRegisters, txefa), 0xF8);
        assert_eq!(size_of::<TtcanRegisters>(), 0x144);
        assert_eq!(offset_of!(TtcanRegisters, tttmc), 0x100);
        assert_eq!(offset_of!(TtcanRegisters, ttcsm), 0x140);
        assert_eq!(size_of::<CanMessageRam>(), memory_map::CAN_RAM_SIZE);
    }

    #[test]
    fn message_ram_map() {
        let map = LAYOUT.map().unwrap();
        assert_eq!(map.sidfc, 0x0004_0000);
        assert_eq!(map.xidfc, 0x0002_0010);
        assert_eq!(map.rxf0c, 0x0008_0020);
        assert_eq!(map.rxf1c, 0x0000_00A0);
        assert_eq!(map.rxbc, 0x0000_00A0);
        assert_eq!(map.txefc, 0x0004_00A0);
        assert_eq!(map.txbc, 0x0008_00C0);
        assert_eq!(map.end, 320);
    }

    #[test]
    fn second_controller_follows_first() {
        let first = LAYOUT.map().unwrap();
        let second = MessageRamLayout {
            offset: first.end,
            ..LAYOUT
        };
        let map = second.map().unwrap();
        assert_eq!(map.sidfc & 0xFFFF, 320);
        assert_eq!(map.end, 640);
    }

    #[test]
    fn message_ram_limits() {
        let too_many = MessageRamLayout {
            tx_buffers: 33,
            ..LAYOUT
        };
        assert_eq!(too_many.map(), Err(McanError::TooManyElements));

        let late = MessageRamLayout {
            offset: 0x3F00,
            ..LAYOUT
        };
        assert_eq!(late.map(), Err(McanError::MessageRamOverflow));

        let far = MessageRamLayout {
            offset: 0xFFFF_FF00,
            std_filters: 128,
            ext_filters: 0,
            rx_fifo0: 0,
            rx_fifo1: 0,
            rx_buffers: 0,
            tx_event_fifo: 0,
            tx_buffers: 0,
        };
        assert_eq!(far.map(), Err(McanError::MessageRamOverflow));

        let full = MessageRamLayout {
            offset: memory_map::CAN_RAM_SIZE as u32,
            ..far
        };
        assert_eq!(full.map(), Err(McanError::MessageRamOverflow));

        let empty_at_end = MessageRamLayout {
            std_filters: 0,
            ..full
        };
        assert_eq!(
            empty_at_end.map().map(|map| map.end),
            Ok(memory_map::CAN_RAM_SIZE as u32)
        );
    }

    #[test]
    fn message_ram_registers() {
        let block: Box<McanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Mcan::new(unsafe { StaticRef::new(&*block as *const McanRegisters) });
        let map = LAYOUT.map().unwrap();

        can.apply_message_ram(&map);

        assert_eq!(block.sidfc.get(), 0x0004_0000);
        assert_eq!(block.xidfc.get(), 0x0002_0010);
        assert_eq!(block.rxf0c.get(), 0x0008_0020);
        assert_eq!(block.rxf1c.get(), 0x0000_00A0);
        assert_eq!(block.rxbc.get(), 0x0000_00A0);
        assert_eq!(block.txefc.get(), 0x0004_00A0);
        assert_eq!(block.txbc.get(), 0x0008_00C0);
    }

    #[test]
    fn error_counters() {
        let raw: *mut McanRegisters =
            Box::into_raw(Box::new(unsafe { core::mem::zeroed::<McanRegisters>() }));
        let can = Mcan::new(unsafe { StaticRef::new(raw) });
        assert_eq!(can.error_counters(), (0, 0));

        // REC in bits 14:8, TEC in bits 7:0.
        unsafe {
            let ecr = (raw as *mut u8).add(0x40) as *mut u32;
            ecr.write_volatile((0x7F << 8) | 0x21);
        }
        assert_eq!(can.error_counters(), (0x21, 0x7F));

        drop(unsafe { Box::from_raw(raw) });
    }

    #[test]
    fn nominal_timing_encoding() {
        let block: Box<McanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Mcan::new(unsafe { StaticRef::new(&*block as *const McanRegisters) });
        let timing = NominalTiming {
            prescaler: 5,
            seg1: 13,
            seg2: 2,
            sync_jump_width: 1,
        };
        assert_eq!(can.set_nominal_timing(&timing), Ok(()));
        assert_eq!(block.btp.get(), 0x0004_0C10);

        let bad = NominalTiming { seg1: 1, ..timing };
        assert_eq!(can.set_nominal_timing(&bad), Err(McanError::InvalidTiming));
    }

    #[test]
    fn init_handshake_in_memory() {
        let block: Box<McanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Mcan::new(unsafe { StaticRef::new(&*block as *const McanRegisters) });
        // Plain memory reflects INIT immediately.
        assert_eq!(can.enter_init(), Ok(()));
        assert!(block.cccr.is_set(CCCR::CCE));
        assert_eq!(can.leave_init(), Ok(()));
        assert_eq!(block.cccr.get(), 0);
    }
}
