// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! FlexCAN controller with 64 message buffers.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

pub const FLEXCAN_MESSAGE_BUFFERS: usize = 64;

/// Number of polls of a module state acknowledge bit before giving up.
const ACK_TIMEOUT: usize = 10_000;

register_structs! {
    pub MessageBuffer {
        /// Control and status
        (0x00 => pub cs: ReadWrite<u32, MB_CS::Register>),
        (0x04 => pub id: ReadWrite<u32, MB_ID::Register>),
        (0x08 => pub data: [ReadWrite<u32>; 2]),
        (0x10 => @END),
    }
}

register_structs! {
    pub FlexcanRegisters {
        /// Module configuration
        (0x000 => pub mcr: ReadWrite<u32, MCR::Register>),
        /// Control 1
        (0x004 => pub ctrl1: ReadWrite<u32, CTRL1::Register>),
        /// Free running timer
        (0x008 => pub timer: ReadWrite<u32>),
        (0x00C => _reserved0),
        /// Rx mailboxes global mask
        (0x010 => pub rxmgmask: ReadWrite<u32>),
        (0x014 => pub rx14mask: ReadWrite<u32>),
        (0x018 => pub rx15mask: ReadWrite<u32>),
        /// Error counter
        (0x01C => pub ecr: ReadWrite<u32, ECR::Register>),
        /// Error and status 1
        (0x020 => pub esr1: ReadWrite<u32>),
        (0x024 => pub imask2: ReadWrite<u32>),
        (0x028 => pub imask1: ReadWrite<u32>),
        (0x02C => pub iflag2: ReadWrite<u32>),
        (0x030 => pub iflag1: ReadWrite<u32>),
        /// Control 2
        (0x034 => pub ctrl2: ReadWrite<u32>),
        (0x038 => pub esr2: ReadWrite<u32>),
        (0x03C => _reserved1),
        (0x044 => pub crcr: ReadWrite<u32>),
        /// Rx FIFO global mask
        (0x048 => pub rxfgmask: ReadWrite<u32>),
        /// Rx FIFO information
        (0x04C => pub rxfir: ReadWrite<u32>),
        (0x050 => _reserved2),
        (0x080 => pub mb: [MessageBuffer; FLEXCAN_MESSAGE_BUFFERS]),
        (0x480 => _reserved3),
        /// Rx individual masks
        (0x880 => pub rximr: [ReadWrite<u32>; FLEXCAN_MESSAGE_BUFFERS]),
        (0x980 => @END),
    }
}

register_bitfields![u32,
    pub MCR [
        /// Module disable
        MDIS OFFSET(31) NUMBITS(1) [],
        /// Freeze enable
        FRZ OFFSET(30) NUMBITS(1) [],
        /// Rx FIFO enable
        RFEN OFFSET(29) NUMBITS(1) [],
        /// Halt
        HALT OFFSET(28) NUMBITS(1) [],
        NOTRDY OFFSET(27) NUMBITS(1) [],
        SOFTRST OFFSET(25) NUMBITS(1) [],
        /// Freeze mode acknowledge
        FRZACK OFFSET(24) NUMBITS(1) [],
        SUPV OFFSET(23) NUMBITS(1) [],
        /// Low power mode acknowledge
        LPMACK OFFSET(20) NUMBITS(1) [],
        /// Individual Rx masking
        IRMQ OFFSET(16) NUMBITS(1) [],
        /// Number of the last message buffer
        MAXMB OFFSET(0) NUMBITS(7) []
    ],
    pub CTRL1 [
        PRESDIV OFFSET(24) NUMBITS(8) [],
        RJW OFFSET(22) NUMBITS(2) [],
        PSEG1 OFFSET(19) NUMBITS(3) [],
        PSEG2 OFFSET(16) NUMBITS(3) [],
        BOFFMSK OFFSET(15) NUMBITS(1) [],
        ERRMSK OFFSET(14) NUMBITS(1) [],
        /// Clock source, 1 selects the peripheral clock
        CLKSRC OFFSET(13) NUMBITS(1) [],
        LPB OFFSET(12) NUMBITS(1) [],
        SMP OFFSET(7) NUMBITS(1) [],
        BOFFREC OFFSET(6) NUMBITS(1) [],
        LBUF OFFSET(4) NUMBITS(1) [],
        LOM OFFSET(3) NUMBITS(1) [],
        PROPSEG OFFSET(0) NUMBITS(3) []
    ],
    pub ECR [
        RXERRCNT OFFSET(8) NUMBITS(8) [],
        TXERRCNT OFFSET(0) NUMBITS(8) []
    ],
    pub MB_CS [
        CODE OFFSET(24) NUMBITS(4) [
            RxInactive = 0b0000,
            RxEmpty = 0b0100,
            RxFull = 0b0010,
            TxInactive = 0b1000,
            TxData = 0b1100
        ],
        SRR OFFSET(22) NUMBITS(1) [],
        IDE OFFSET(21) NUMBITS(1) [],
        RTR OFFSET(20) NUMBITS(1) [],
        DLC OFFSET(16) NUMBITS(4) [],
        TIMESTAMP OFFSET(0) NUMBITS(16) []
    ],
    pub MB_ID [
        PRIO OFFSET(29) NUMBITS(3) [],
        STD OFFSET(18) NUMBITS(11) [],
        EXT OFFSET(0) NUMBITS(29) []
    ]
];

pub const FLEXCAN_0_BASE: StaticRef<FlexcanRegisters> =
    unsafe { StaticRef::new(memory_map::FLEXCAN_0_BASE as *const FlexcanRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlexcanError {
    /// Freeze mode was not acknowledged.
    Timeout,
    InvalidMessageBuffer,
    /// A timing field is zero or wider than its `CTRL1` field.
    InvalidTiming,
    /// More than 8 data bytes.
    InvalidLength,
    /// Identifier does not fit in 11 bits.
    InvalidId,
}

/// Bit timing, in time quanta, as written to `CTRL1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitTiming {
    pub prescaler: u32,
    pub prop_seg: u32,
    pub phase_seg1: u32,
    pub phase_seg2: u32,
    pub sync_jump_width: u32,
}

impl BitTiming {
    /// PRESDIV 1..=256, PROPSEG/PSEG1/PSEG2 1..=8, RJW 1..=4.
    pub fn is_valid(&self) -> bool {
        (1..=256).contains(&self.prescaler)
            && (1..=8).contains(&self.prop_seg)
            && (1..=8).contains(&self.phase_seg1)
            && (1..=8).contains(&self.phase_seg2)
            && (1..=4).contains(&self.sync_jump_width)
    }

    /// Bit rate produced from a protocol engine clock of `clock_hz`, `None`
    /// for a timing `CTRL1` cannot hold.
    pub fn bitrate(&self, clock_hz: u32) -> Option<u32> {
        if !self.is_valid() {
            return None;
        }
        let quanta = 1 + self.prop_seg + self.phase_seg1 + self.phase_seg2;
        Some(clock_hz / (self.prescaler * quanta))
    }
}

pub struct Flexcan {
    registers: StaticRef<FlexcanRegisters>,
}

impl Flexcan {
    pub const fn new(registers: StaticRef<FlexcanRegisters>) -> Flexcan {
        Flexcan { registers }
    }

    fn wait_for(&self, field: tock_registers::fields::Field<u32, MCR::Register>, set: bool) -> bool {
        for _ in 0..ACK_TIMEOUT {
            if self.registers.mcr.is_set(field) == set {
                return true;
            }
        }
        false
    }

    /// Enable the module and enter freeze mode so that it can be configured.
    pub fn enter_freeze(&self) -> Result<(), FlexcanError> {
        self.registers
            .mcr
            .modify(MCR::MDIS::CLEAR + MCR::FRZ::SET + MCR::HALT::SET);
        if self.wait_for(MCR::FRZACK, true) {
            Ok(())
        } else {
            log::warn!("FlexCAN: freeze mode not acknowledged");
            Err(FlexcanError::Timeout)
        }
    }

    pub fn exit_freeze(&self) -> Result<(), FlexcanError> {
        self.registers.mcr.modify(MCR::FRZ::CLEAR + MCR::HALT::CLEAR);
        if self.wait_for(MCR::FRZACK, false) {
            Ok(())
        } else {
            Err(FlexcanError::Timeout)
        }
    }

    /// Program the bit timing. Only valid in freeze mode.
    pub fn set_bit_timing(&self, timing: &BitTiming) -> Result<(), FlexcanError> {
        if !timing.is_valid() {
            return Err(FlexcanError::InvalidTiming);
        }
        self.registers.ctrl1.modify(
            CTRL1::PRESDIV.val(timing.prescaler - 1)
                + CTRL1::PROPSEG.val(timing.prop_seg - 1)
                + CTRL1::PSEG1.val(timing.phase_seg1 - 1)
                + CTRL1::PSEG2.val(timing.phase_seg2 - 1)
                + CTRL1::RJW.val(timing.sync_jump_width - 1)
                + CTRL1::CLKSRC::SET,
        );
        Ok(())
    }

    /// Queue a standard frame in a transmit message buffer.
    pub fn transmit(&self, index: usize, id: u16, data: &[u8]) -> Result<(), FlexcanError> {
        let mb = self
            .registers
            .mb
            .get(index)
            .ok_or(FlexcanError::InvalidMessageBuffer)?;
        if data.len() > 8 {
            return Err(FlexcanError::InvalidLength);
        }
        if id > 0x7FF {
            return Err(FlexcanError::InvalidId);
        }
        let len = data.len();
        let mut words = [0u32; 2];
        for (i, byte) in data.iter().enumerate() {
            words[i / 4] |= (*byte as u32) << (24 - 8 * (i % 4));
        }
        mb.cs.write(MB_CS::CODE::TxInactive);
        mb.id.write(MB_ID::STD.val(id as u32));
        mb.data[0].set(words[0]);
        mb.data[1].set(words[1]);
        mb.cs.write(MB_CS::CODE::TxData + MB_CS::DLC.val(len as u32));
        Ok(())
    }

    pub fn error_counters(&self) -> (u8, u8) {
        (
            self.registers.ecr.read(ECR::TXERRCNT) as u8,
            self.registers.ecr.read(ECR::RXERRCNT) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<MessageBuffer>(), 0x10);
        assert_eq!(size_of::<FlexcanRegisters>(), 0x980);
        assert_eq!(offset_of!(FlexcanRegisters, ecr), 0x01C);
        assert_eq!(offset_of!(FlexcanRegisters, crcr), 0x044);
        assert_eq!(offset_of!(FlexcanRegisters, mb), 0x080);
        assert_eq!(offset_of!(FlexcanRegisters, rximr), 0x880);
    }

    #[test]
    fn bitrate() {
        // 80MHz / (8 * 20) = 500kbit/s
        let timing = BitTiming {
            prescaler: 8,
            prop_seg: 7,
            phase_seg1: 8,
            phase_seg2: 4,
            sync_jump_width: 4,
        };
        assert_eq!(timing.bitrate(80_000_000), Some(500_000));
        let no_prescaler = BitTiming {
            prescaler: 0,
            ..timing
        };
        assert_eq!(no_prescaler.bitrate(80_000_000), None);
    }

    #[test]
    fn bit_timing_ranges() {
        let block: Box<FlexcanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Flexcan::new(unsafe { StaticRef::new(&*block as *const FlexcanRegisters) });
        let timing = BitTiming {
            prescaler: 8,
            prop_seg: 7,
            phase_seg1: 8,
            phase_seg2: 4,
            sync_jump_width: 4,
        };

        assert_eq!(can.set_bit_timing(&timing), Ok(()));
        assert_eq!(block.ctrl1.read(CTRL1::PRESDIV), 7);
        assert_eq!(block.ctrl1.read(CTRL1::PROPSEG), 6);
        assert_eq!(block.ctrl1.read(CTRL1::PSEG1), 7);
        assert_eq!(block.ctrl1.read(CTRL1::PSEG2), 3);
        assert_eq!(block.ctrl1.read(CTRL1::RJW), 3);
        assert!(block.ctrl1.is_set(CTRL1::CLKSRC));

        let before = block.ctrl1.get();
        for bad in [
            BitTiming {
                prescaler: 0,
                ..timing
            },
            BitTiming {
                prescaler: 257,
                prop_seg: 9,
                ..timing
            },
            BitTiming {
                phase_seg2: 0,
                ..timing
            },
            BitTiming {
                sync_jump_width: 5,
                ..timing
            },
        ] {
            assert_eq!(can.set_bit_timing(&bad), Err(FlexcanError::InvalidTiming));
        }
        assert_eq!(block.ctrl1.get(), before);

        let widest = BitTiming {
            prescaler: 256,
            prop_seg: 8,
            phase_seg1: 8,
            phase_seg2: 8,
            sync_jump_width: 4,
        };
        assert_eq!(can.set_bit_timing(&widest), Ok(()));
        assert_eq!(block.ctrl1.read(CTRL1::PRESDIV), 255);
    }

    #[test]
    fn transmit_standard_frame() {
        let block: Box<FlexcanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Flexcan::new(unsafe { StaticRef::new(&*block as *const FlexcanRegisters) });

        assert_eq!(can.transmit(8, 0x123, &[1, 2, 3, 4, 5]), Ok(()));
        let mb = &block.mb[8];
        assert_eq!(mb.cs.read(MB_CS::CODE), 0b1100);
        assert_eq!(mb.cs.read(MB_CS::DLC), 5);
        assert_eq!(mb.id.read(MB_ID::STD), 0x123);
        assert_eq!(mb.data[0].get(), 0x0102_0304);
        assert_eq!(mb.data[1].get(), 0x0500_0000);
        assert_eq!(
            can.transmit(64, 0, &[]),
            Err(FlexcanError::InvalidMessageBuffer)
        );
    }

    #[test]
    fn transmit_rejects_oversized_frames() {
        let block: Box<FlexcanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Flexcan::new(unsafe { StaticRef::new(&*block as *const FlexcanRegisters) });

        assert_eq!(
            can.transmit(0, 0x1, &[0u8; 12]),
            Err(FlexcanError::InvalidLength)
        );
        assert_eq!(can.transmit(0, 0x800, &[1]), Err(FlexcanError::InvalidId));
        // Nothing was queued.
        assert_eq!(block.mb[0].cs.get(), 0);

        assert_eq!(can.transmit(0, 0x7FF, &[0xAA; 8]), Ok(()));
        assert_eq!(block.mb[0].cs.read(MB_CS::DLC), 8);
        assert_eq!(block.mb[0].id.read(MB_ID::STD), 0x7FF);
        assert_eq!(block.mb[0].data[1].get(), 0xAAAA_AAAA);
    }

    #[test]
    fn exit_freeze_and_error_counters() {
        let block: Box<FlexcanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Flexcan::new(unsafe { StaticRef::new(&*block as *const FlexcanRegisters) });
        block.mcr.write(MCR::FRZ::SET + MCR::HALT::SET);

        // FRZACK reads clear, so leaving freeze completes at once.
        assert_eq!(can.exit_freeze(), Ok(()));
        assert!(!block.mcr.is_set(MCR::FRZ));
        assert!(!block.mcr.is_set(MCR::HALT));

        block
            .ecr
            .write(ECR::TXERRCNT.val(0x12) + ECR::RXERRCNT.val(0x80));
        assert_eq!(can.error_counters(), (0x12, 0x80));
    }

    #[test]
    fn freeze_timeout() {
        let block: Box<FlexcanRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let can = Flexcan::new(unsafe { StaticRef::new(&*block as *const FlexcanRegisters) });
        // Nothing acknowledges freeze in host memory.
        assert_eq!(can.enter_freeze(), Err(FlexcanError::Timeout));
        assert!(block.mcr.is_set(MCR::HALT));
    }
}
