// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Periodic Interrupt Timer (PIT).
//!
//! Four 32-bit down counters clocked by the peripheral clock. Channel 0 is
//! the usual source of the system tick.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const PIT_CHANNELS: usize = 4;

register_structs! {
    pub PitChannel {
        /// Load value
        (0x00 => pub ldval: ReadWrite<u32>),
        /// Current value
        (0x04 => pub cval: ReadOnly<u32>),
        (0x08 => pub tctrl: ReadWrite<u32, TCTRL::Register>),
        (0x0C => pub tflg: ReadWrite<u32, TFLG::Register>),
        (0x10 => @END),
    }
}

register_structs! {
    pub PitRegisters {
        (0x000 => pub mcr: ReadWrite<u32, MCR::Register>),
        (0x004 => _reserved0),
        /// Lifetime timer, upper and lower words
        (0x0E0 => pub ltmr64h: ReadOnly<u32>),
        (0x0E4 => pub ltmr64l: ReadOnly<u32>),
        (0x0E8 => _reserved1),
        (0x100 => pub channels: [PitChannel; PIT_CHANNELS]),
        (0x140 => @END),
    }
}

register_bitfields![u32,
    pub MCR [
        MDIS_RTI OFFSET(2) NUMBITS(1) [],
        /// Module disable
        MDIS OFFSET(1) NUMBITS(1) [],
        /// Freeze in debug mode
        FRZ OFFSET(0) NUMBITS(1) []
    ],
    pub TCTRL [
        /// Chain with the previous channel
        CHN OFFSET(2) NUMBITS(1) [],
        TIE OFFSET(1) NUMBITS(1) [],
        TEN OFFSET(0) NUMBITS(1) []
    ],
    pub TFLG [
        TIF OFFSET(0) NUMBITS(1) []
    ]
];

pub const PIT_BASE: StaticRef<PitRegisters> =
    unsafe { StaticRef::new(memory_map::PIT_0_BASE as *const PitRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PitError {
    InvalidChannel,
    /// A period of zero ticks.
    InvalidPeriod,
}

pub struct Pit {
    registers: StaticRef<PitRegisters>,
}

impl Pit {
    pub const fn new(registers: StaticRef<PitRegisters>) -> Pit {
        Pit { registers }
    }

    fn channel(&self, channel: usize) -> Result<&PitChannel, PitError> {
        self.registers
            .channels
            .get(channel)
            .ok_or(PitError::InvalidChannel)
    }

    /// Start a channel firing an interrupt every `ticks` peripheral clock
    /// cycles.
    pub fn start(&self, channel: usize, ticks: u32) -> Result<(), PitError> {
        if ticks == 0 {
            return Err(PitError::InvalidPeriod);
        }
        let ch = self.channel(channel)?;
        self.registers.mcr.modify(MCR::MDIS::CLEAR + MCR::FRZ::SET);
        ch.tctrl.write(TCTRL::TEN::CLEAR);
        ch.ldval.set(ticks - 1);
        ch.tflg.write(TFLG::TIF::SET);
        ch.tctrl.write(TCTRL::TIE::SET + TCTRL::TEN::SET);
        Ok(())
    }

    pub fn stop(&self, channel: usize) -> Result<(), PitError> {
        self.channel(channel)?.tctrl.write(TCTRL::TEN::CLEAR);
        Ok(())
    }

    /// Acknowledge a channel interrupt. Returns whether the flag was set.
    pub fn clear_flag(&self, channel: usize) -> Result<bool, PitError> {
        let ch = self.channel(channel)?;
        let pending = ch.tflg.is_set(TFLG::TIF);
        ch.tflg.write(TFLG::TIF::SET);
        Ok(pending)
    }
}
