// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! SENT receiver (SRX), four channels.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const SENT_CHANNELS: usize = 4;

register_structs! {
    pub SentChannel {
        /// Clock prescaler and compensation
        (0x00 => pub clk_ctrl: ReadWrite<u32, CLK_CTRL::Register>),
        (0x04 => pub status: ReadWrite<u32>),
        (0x08 => pub config: ReadWrite<u32>),
        (0x0C => @END),
    }
}

register_structs! {
    pub SentFastMessage {
        /// Status/communication and data nibbles
        (0x00 => pub data: ReadOnly<u32>),
        (0x04 => pub crc: ReadOnly<u32>),
        (0x08 => pub ts: ReadOnly<u32>),
        (0x0C => _reserved0),
        (0x10 => @END),
    }
}

register_structs! {
    pub SentSlowMessage {
        (0x00 => pub bit3: ReadOnly<u32>),
        (0x04 => pub bit2: ReadOnly<u32>),
        (0x08 => pub ts: ReadOnly<u32>),
        (0x0C => _reserved0),
        (0x10 => @END),
    }
}

register_structs! {
    pub SentRegisters {
        /// Global control
        (0x000 => pub gbl_ctrl: ReadWrite<u32, GBL_CTRL::Register>),
        /// Channel enable
        (0x004 => pub chnl_en: ReadWrite<u32>),
        (0x008 => pub gbl_status: ReadWrite<u32>),
        /// Fast and slow message ready flags
        (0x00C => pub fmsg_rdy: ReadOnly<u32>),
        (0x010 => pub smsg_rdy: ReadOnly<u32>),
        (0x014 => _reserved0),
        (0x018 => pub data_ctrl1: ReadWrite<u32>),
        (0x01C => _reserved1),
        /// Fast and slow message DMA control
        (0x020 => pub fdma_ctrl: ReadWrite<u32>),
        (0x024 => pub sdma_ctrl: ReadWrite<u32>),
        (0x028 => _reserved2),
        /// Fast and slow message ready interrupt enables
        (0x02C => pub frdy_ie: ReadWrite<u32>),
        (0x030 => pub srdy_ie: ReadWrite<u32>),
        (0x034 => _reserved3),
        /// DMA fast message buffer
        (0x040 => pub dma_fmsg: SentFastMessage),
        /// DMA slow message buffer
        (0x050 => pub dma_smsg: SentSlowMessage),
        (0x060 => pub channels: [SentChannel; SENT_CHANNELS]),
        (0x090 => _reserved4),
        (0x100 => pub fmsg: [SentFastMessage; SENT_CHANNELS]),
        (0x140 => _reserved5),
        (0x200 => pub smsg: [SentSlowMessage; SENT_CHANNELS]),
        (0x240 => @END),
    }
}

register_bitfields![u32,
    pub GBL_CTRL [
        /// Debug freeze
        DBG_FRZ OFFSET(0) NUMBITS(1) [],
        /// Fast message FIFO enable
        FIFO_EN OFFSET(1) NUMBITS(1) []
    ],
    pub CLK_CTRL [
        /// Clock prescaler
        PRSC OFFSET(0) NUMBITS(14) [],
        /// Successive calibration check
        COMP_EN OFFSET(15) NUMBITS(1) []
    ]
];

pub const SRX_0_BASE: StaticRef<SentRegisters> =
    unsafe { StaticRef::new(memory_map::SRX_0_BASE as *const SentRegisters) };

/// A fast channel message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastMessage {
    /// Status and communication nibble
    pub status: u8,
    /// Six data nibbles, first received nibble in the top bits
    pub data: u32,
    pub crc: u8,
    pub timestamp: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentError {
    InvalidChannel,
    /// Prescaler does not fit the 14-bit `PRSC` field.
    InvalidPrescaler,
}

pub struct Sent {
    registers: StaticRef<SentRegisters>,
}

impl Sent {
    pub const fn new(registers: StaticRef<SentRegisters>) -> Sent {
        Sent { registers }
    }

    /// Enable a channel whose clock tick is `prescaler` peripheral clock
    /// cycles.
    pub fn enable_channel(&self, channel: usize, prescaler: u32) -> Result<(), SentError> {
        let ch = self
            .registers
            .channels
            .get(channel)
            .ok_or(SentError::InvalidChannel)?;
        if prescaler == 0 || prescaler > 0x3FFF {
            return Err(SentError::InvalidPrescaler);
        }
        ch.clk_ctrl.modify(CLK_CTRL::PRSC.val(prescaler));
        let enabled = self.registers.chnl_en.get();
        self.registers.chnl_en.set(enabled | (1 << channel));
        Ok(())
    }

    pub fn fast_message_ready(&self, channel: usize) -> bool {
        channel < SENT_CHANNELS && self.registers.fmsg_rdy.get() & (1 << channel) != 0
    }

    /// Read the fast message of a channel, if one is ready.
    pub fn read_fast(&self, channel: usize) -> Option<FastMessage> {
        if !self.fast_message_ready(channel) {
            return None;
        }
        let msg = &self.registers.fmsg[channel];
        let data = msg.data.get();
        let crc = msg.crc.get();
        Some(FastMessage {
            status: ((data >> 24) & 0xF) as u8,
            data: data & 0x00FF_FFFF,
            crc: ((crc >> 16) & 0xF) as u8,
            timestamp: msg.ts.get(),
        })
    }
}
