// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! FlexRay communication controller (FR).
//!
//! All controller registers are 16 bits wide. Message buffer headers and
//! payloads live in system RAM, addressed through `SYMBADHR`/`SYMBADLR`.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const FLEXRAY_MESSAGE_BUFFERS: usize = 128;

const POC_TIMEOUT: usize = 10_000;

register_structs! {
    pub FlexrayMessageBuffer {
        /// Configuration, control, status
        (0x00 => pub mbccsr: ReadWrite<u16>),
        /// Cycle counter filter
        (0x02 => pub mbccfr: ReadWrite<u16>),
        /// Frame ID
        (0x04 => pub mbfidr: ReadWrite<u16>),
        /// Index
        (0x06 => pub mbidxr: ReadWrite<u16>),
        (0x08 => @END),
    }
}

register_structs! {
    pub FlexrayRegisters {
        /// Module version
        (0x000 => pub mvr: ReadOnly<u16>),
        /// Module configuration
        (0x002 => pub mcr: ReadWrite<u16, MCR::Register>),
        /// System memory base address, high and low
        (0x004 => pub symbadhr: ReadWrite<u16>),
        (0x006 => pub symbadlr: ReadWrite<u16>),
        /// Strobe signal control
        (0x008 => pub stbscr: ReadWrite<u16>),
        (0x00A => _reserved0),
        /// Message buffer data size
        (0x00C => pub mbdsr: ReadWrite<u16>),
        /// Message buffer segment size and utilization
        (0x00E => pub mbssutr: ReadWrite<u16>),
        /// PE DRAM access and data
        (0x010 => pub pedrar: ReadWrite<u16>),
        (0x012 => pub pedrdr: ReadWrite<u16>),
        /// Protocol operation control
        (0x014 => pub pocr: ReadWrite<u16, POCR::Register>),
        /// Global interrupt flag and enable
        (0x016 => pub gifer: ReadWrite<u16>),
        /// Protocol interrupt flags and enables
        (0x018 => pub pifr0: ReadWrite<u16>),
        (0x01A => pub pifr1: ReadWrite<u16>),
        (0x01C => pub pier0: ReadWrite<u16>),
        (0x01E => pub pier1: ReadWrite<u16>),
        /// CHI error flags
        (0x020 => pub chierfr: ReadWrite<u16>),
        /// Message buffer interrupt vector
        (0x022 => pub mbivec: ReadOnly<u16>),
        /// Channel A/B status error counters
        (0x024 => pub casercr: ReadOnly<u16>),
        (0x026 => pub cbsercr: ReadOnly<u16>),
        /// Protocol status
        (0x028 => pub psr0: ReadOnly<u16, PSR0::Register>),
        (0x02A => pub psr1: ReadOnly<u16>),
        (0x02C => pub psr2: ReadOnly<u16>),
        (0x02E => pub psr3: ReadWrite<u16>),
        /// Macrotick and cycle counters
        (0x030 => pub mtctr: ReadOnly<u16>),
        (0x032 => pub cyctr: ReadOnly<u16>),
        /// Slot counters, channel A and B
        (0x034 => pub sltctar: ReadOnly<u16>),
        (0x036 => pub sltctbr: ReadOnly<u16>),
        /// Rate and offset correction values
        (0x038 => pub rtcorvr: ReadOnly<u16>),
        (0x03A => pub ofcorvr: ReadOnly<u16>),
        /// Combined interrupt flags
        (0x03C => pub cifr: ReadOnly<u16>),
        (0x03E => pub symator: ReadWrite<u16>),
        /// Sync frame counter and table handling
        (0x040 => pub sfcntr: ReadOnly<u16>),
        (0x042 => pub sftor: ReadWrite<u16>),
        (0x044 => pub sftccsr: ReadWrite<u16>),
        (0x046 => pub sfidrfr: ReadWrite<u16>),
        (0x048 => pub sfidafvr: ReadWrite<u16>),
        (0x04A => pub sfidafmr: ReadWrite<u16>),
        /// Network management vector
        (0x04C => pub nmvr: [ReadOnly<u16>; 6]),
        (0x058 => pub nmvlr: ReadWrite<u16>),
        /// Timer configuration and control
        (0x05A => pub ticcr: ReadWrite<u16>),
        (0x05C => pub ti1cysr: ReadWrite<u16>),
        (0x05E => pub ti1mtor: ReadWrite<u16>),
        (0x060 => pub ti2cr0: ReadWrite<u16>),
        (0x062 => pub ti2cr1: ReadWrite<u16>),
        /// Slot status selection, counter condition, registers
        (0x064 => pub sssr: ReadWrite<u16>),
        (0x066 => pub ssccr: ReadWrite<u16>),
        (0x068 => pub ssr: [ReadOnly<u16>; 8]),
        (0x078 => pub sscr: [ReadOnly<u16>; 4]),
        /// MTS A and B configuration
        (0x080 => pub mtsacfr: ReadWrite<u16>),
        (0x082 => pub mtsbcfr: ReadWrite<u16>),
        /// Receive shadow buffer index
        (0x084 => pub rsbir: ReadWrite<u16>),
        /// Receive FIFO registers
        (0x086 => pub rfwmsr: ReadWrite<u16>),
        (0x088 => pub rfsir: ReadWrite<u16>),
        (0x08A => pub rfdsr: ReadWrite<u16>),
        (0x08C => pub rfarir: ReadOnly<u16>),
        (0x08E => pub rfbrir: ReadOnly<u16>),
        (0x090 => pub rfmidafvr: ReadWrite<u16>),
        (0x092 => pub rfmidafmr: ReadWrite<u16>),
        (0x094 => pub rffidrfvr: ReadWrite<u16>),
        (0x096 => pub rffidrfmr: ReadWrite<u16>),
        (0x098 => pub rfrfcfr: ReadWrite<u16>),
        (0x09A => pub rfrfctr: ReadWrite<u16>),
        /// Last dynamic transmit slot, channel A and B
        (0x09C => pub ldtxslar: ReadOnly<u16>),
        (0x09E => pub ldtxslbr: ReadOnly<u16>),
        /// Protocol configuration
        (0x0A0 => pub pcr: [ReadWrite<u16>; 31]),
        (0x0DE => _reserved1),
        (0x800 => pub mb: [FlexrayMessageBuffer; FLEXRAY_MESSAGE_BUFFERS]),
        (0xC00 => @END),
    }
}

register_bitfields![u16,
    pub MCR [
        /// Module enable
        MEN OFFSET(15) NUMBITS(1) [],
        /// Single channel device mode
        SCM OFFSET(14) NUMBITS(1) [],
        CHB OFFSET(13) NUMBITS(1) [],
        CHA OFFSET(12) NUMBITS(1) [],
        /// Synchronization frame filter enable
        SFFE OFFSET(11) NUMBITS(1) [],
        ECCE OFFSET(10) NUMBITS(1) [],
        /// Protocol engine clock source
        CLKSEL OFFSET(4) NUMBITS(1) [],
        BITRATE OFFSET(1) NUMBITS(3) [
            Rate10M = 0,
            Rate5M = 1,
            Rate2M5 = 2,
            Rate8M = 3
        ]
    ],
    pub POCR [
        /// Write mode external correction
        WME OFFSET(15) NUMBITS(1) [],
        EOC_AP OFFSET(10) NUMBITS(2) [],
        ERC_AP OFFSET(8) NUMBITS(2) [],
        /// Command write busy
        BSY OFFSET(7) NUMBITS(1) [],
        POCCMD OFFSET(0) NUMBITS(4) []
    ],
    pub PSR0 [
        ERRMODE OFFSET(14) NUMBITS(2) [],
        SLOTMODE OFFSET(12) NUMBITS(2) [],
        PROTSTATE OFFSET(8) NUMBITS(3) [],
        STARTUPSTATE OFFSET(4) NUMBITS(4) [],
        WAKEUPSTATE OFFSET(0) NUMBITS(3) []
    ]
];

pub const FLEXRAY_0_BASE: StaticRef<FlexrayRegisters> =
    unsafe { StaticRef::new(memory_map::FLEXRAY_0_BASE as *const FlexrayRegisters) };

/// Protocol control commands written to `POCR.POCCMD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum PocCommand {
    AllowColdstart = 0,
    AllSlots = 1,
    Config = 2,
    Freeze = 3,
    ConfigComplete = 4,
    Run = 5,
    DefaultConfig = 6,
    Halt = 7,
    Wakeup = 8,
}

/// Protocol state reported in `PSR0.PROTSTATE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolState {
    DefaultConfig,
    Config,
    Wakeup,
    Ready,
    NormalPassive,
    NormalActive,
    Halt,
    Startup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlexrayError {
    /// The controller kept `POCR.BSY` set.
    Busy,
    /// System memory base not on a 16-byte boundary.
    Misaligned,
}

pub struct Flexray {
    registers: StaticRef<FlexrayRegisters>,
}

impl Flexray {
    pub const fn new(registers: StaticRef<FlexrayRegisters>) -> Flexray {
        Flexray { registers }
    }

    /// Enable the module on both channels.
    pub fn enable(&self) {
        self.registers
            .mcr
            .modify(MCR::MEN::SET + MCR::CHA::SET + MCR::CHB::SET);
    }

    /// Set the message buffer base in system memory. `SYMBADLR` has no
    /// bits below 4.
    pub fn set_system_memory_base(&self, address: u32) -> Result<(), FlexrayError> {
        if address & 0xF != 0 {
            return Err(FlexrayError::Misaligned);
        }
        self.registers.symbadhr.set((address >> 16) as u16);
        self.registers.symbadlr.set(address as u16);
        Ok(())
    }

    pub fn send_command(&self, command: PocCommand) -> Result<(), FlexrayError> {
        let ready = (0..POC_TIMEOUT).any(|_| !self.registers.pocr.is_set(POCR::BSY));
        if !ready {
            log::warn!("FlexRay: protocol controller busy, {:?} dropped", command);
            return Err(FlexrayError::Busy);
        }
        self.registers
            .pocr
            .write(POCR::WME::SET + POCR::POCCMD.val(command as u16));
        Ok(())
    }

    pub fn protocol_state(&self) -> ProtocolState {
        match self.registers.psr0.read(PSR0::PROTSTATE) {
            0 => ProtocolState::DefaultConfig,
            1 => ProtocolState::Config,
            2 => ProtocolState::Wakeup,
            3 => ProtocolState::Ready,
            4 => ProtocolState::NormalPassive,
            5 => ProtocolState::NormalActive,
            6 => ProtocolState::Halt,
            _ => ProtocolState::Startup,
        }
    }
}
