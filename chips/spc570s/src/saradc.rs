// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Successive approximation ADC (SARADC), two instances with up to 96
//! channels each in three groups of 32.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const SARADC_CHANNELS: usize = 96;

register_structs! {
    pub SaradcRegisters {
        /// Main configuration
        (0x000 => pub mcr: ReadWrite<u32, MCR::Register>),
        /// Main status
        (0x004 => pub msr: ReadOnly<u32, MSR::Register>),
        (0x008 => _reserved0),
        /// Interrupt status
        (0x010 => pub isr: ReadWrite<u32, ISR::Register>),
        /// Channel pending end of conversion flags
        (0x014 => pub ceocfr: [ReadWrite<u32>; 3]),
        (0x020 => pub imr: ReadWrite<u32, ISR::Register>),
        (0x024 => pub cimr: [ReadWrite<u32>; 3]),
        /// Watchdog threshold interrupt status and mask
        (0x030 => pub wtisr: ReadWrite<u32>),
        (0x034 => pub wtimr: ReadWrite<u32>),
        (0x038 => _reserved1),
        (0x040 => pub dmae: ReadWrite<u32>),
        (0x044 => pub dmar: [ReadWrite<u32>; 3]),
        (0x050 => _reserved2),
        /// Watchdog thresholds
        (0x060 => pub thrhlr: [ReadWrite<u32>; 4]),
        (0x070 => _reserved3),
        /// Presampling control and channel selection
        (0x080 => pub pscr: ReadWrite<u32>),
        (0x084 => pub psr: [ReadWrite<u32>; 3]),
        (0x090 => _reserved4),
        /// Conversion timing
        (0x094 => pub ctr: [ReadWrite<u32>; 3]),
        (0x0A0 => _reserved5),
        /// Normal conversion mask
        (0x0A4 => pub ncmr: [ReadWrite<u32>; 3]),
        (0x0B0 => _reserved6),
        /// Injected conversion mask
        (0x0B4 => pub jcmr: [ReadWrite<u32>; 3]),
        (0x0C0 => _reserved7),
        /// Decode signals delay
        (0x0C4 => pub dsdr: ReadWrite<u32>),
        /// Power-down exit delay
        (0x0C8 => pub pdedr: ReadWrite<u32>),
        (0x0CC => _reserved8),
        /// Channel data
        (0x100 => pub cdr: [ReadOnly<u32, CDR::Register>; SARADC_CHANNELS]),
        (0x280 => _reserved9),
        (0x3A0 => pub calbistreg: ReadWrite<u32>),
        (0x3A4 => @END),
    }
}

register_bitfields![u32,
    pub MCR [
        /// Overwrite enable
        OWREN OFFSET(31) NUMBITS(1) [],
        /// Write left aligned
        WLSIDE OFFSET(30) NUMBITS(1) [],
        /// Scan mode
        MODE OFFSET(29) NUMBITS(1) [
            OneShot = 0,
            Scan = 1
        ],
        /// Start normal conversion
        NSTART OFFSET(24) NUMBITS(1) [],
        JTRGEN OFFSET(22) NUMBITS(1) [],
        JEDGE OFFSET(21) NUMBITS(1) [],
        JSTART OFFSET(20) NUMBITS(1) [],
        CTUEN OFFSET(17) NUMBITS(1) [],
        ABORTCHAIN OFFSET(7) NUMBITS(1) [],
        ABORT OFFSET(6) NUMBITS(1) [],
        ACKO OFFSET(5) NUMBITS(1) [],
        /// Power-down
        PWDN OFFSET(0) NUMBITS(1) []
    ],
    pub MSR [
        NSTART OFFSET(24) NUMBITS(1) [],
        JABORT OFFSET(23) NUMBITS(1) [],
        JSTART OFFSET(20) NUMBITS(1) [],
        CTUSTART OFFSET(16) NUMBITS(1) [],
        /// Channel under conversion
        CHADDR OFFSET(9) NUMBITS(7) [],
        ACKO OFFSET(5) NUMBITS(1) [],
        ADCSTATUS OFFSET(0) NUMBITS(3) [
            Idle = 0,
            PowerDown = 1,
            Wait = 2,
            Sample = 4,
            Conversion = 6
        ]
    ],
    pub ISR [
        /// End of injected chain
        JECH OFFSET(3) NUMBITS(1) [],
        JEOC OFFSET(2) NUMBITS(1) [],
        /// End of normal chain
        ECH OFFSET(1) NUMBITS(1) [],
        EOC OFFSET(0) NUMBITS(1) []
    ],
    pub CDR [
        VALID OFFSET(19) NUMBITS(1) [],
        OVERW OFFSET(18) NUMBITS(1) [],
        RESULT OFFSET(16) NUMBITS(2) [
            Normal = 0,
            Injected = 1,
            Ctu = 2
        ],
        CDATA OFFSET(0) NUMBITS(16) []
    ]
];

pub const SARADC_0_BASE: StaticRef<SaradcRegisters> =
    unsafe { StaticRef::new(memory_map::SARADC_0_BASE as *const SaradcRegisters) };
pub const SARADC_1_BASE: StaticRef<SaradcRegisters> =
    unsafe { StaticRef::new(memory_map::SARADC_1_BASE as *const SaradcRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaradcError {
    InvalidChannel,
    /// No conversion result available yet.
    NotReady,
}

pub struct Saradc {
    registers: StaticRef<SaradcRegisters>,
}

impl Saradc {
    pub const fn new(registers: StaticRef<SaradcRegisters>) -> Saradc {
        Saradc { registers }
    }

    /// Leave power-down, one-shot mode with right aligned results.
    pub fn power_up(&self) {
        self.registers
            .mcr
            .modify(MCR::PWDN::CLEAR + MCR::MODE::OneShot + MCR::WLSIDE::CLEAR);
    }

    pub fn power_down(&self) {
        self.registers.mcr.modify(MCR::PWDN::SET);
    }

    /// Add a channel to the normal conversion chain.
    pub fn enable_channel(&self, channel: usize) -> Result<(), SaradcError> {
        if channel >= SARADC_CHANNELS {
            return Err(SaradcError::InvalidChannel);
        }
        let ncmr = &self.registers.ncmr[channel / 32];
        ncmr.set(ncmr.get() | (1 << (channel % 32)));
        Ok(())
    }

    pub fn start_normal(&self) {
        self.registers.mcr.modify(MCR::NSTART::SET);
    }

    /// Latest result of a channel.
    pub fn read_channel(&self, channel: usize) -> Result<u16, SaradcError> {
        let cdr = self
            .registers
            .cdr
            .get(channel)
            .ok_or(SaradcError::InvalidChannel)?;
        let value = cdr.extract();
        if value.is_set(CDR::VALID) {
            Ok(value.read(CDR::CDATA) as u16)
        } else {
            Err(SaradcError::NotReady)
        }
    }

    /// Acknowledge end of chain and conversion flags.
    pub fn clear_end_of_chain(&self) {
        self.registers.isr.write(ISR::ECH::SET + ISR::EOC::SET);
    }
}
