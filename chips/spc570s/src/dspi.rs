// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Deserial Serial Peripheral Interface (DSPI), four instances.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub DspiRegisters {
        /// Module configuration
        (0x000 => pub mcr: ReadWrite<u32, MCR::Register>),
        (0x004 => _reserved0),
        /// Transfer count
        (0x008 => pub tcr: ReadWrite<u32>),
        /// Clock and transfer attributes
        (0x00C => pub ctar: [ReadWrite<u32, CTAR::Register>; 8]),
        /// Status
        (0x02C => pub sr: ReadWrite<u32, SR::Register>),
        /// DMA/interrupt request select and enable
        (0x030 => pub rser: ReadWrite<u32>),
        /// Push TX FIFO
        (0x034 => pub pushr: ReadWrite<u32, PUSHR::Register>),
        /// Pop RX FIFO
        (0x038 => pub popr: ReadOnly<u32>),
        (0x03C => pub txfr: [ReadOnly<u32>; 4]),
        (0x04C => _reserved1),
        (0x07C => pub rxfr: [ReadOnly<u32>; 4]),
        (0x08C => _reserved2),
        /// DSI configuration 0
        (0x0BC => pub dsicr0: ReadWrite<u32>),
        (0x0C0 => pub sdr0: ReadOnly<u32>),
        (0x0C4 => pub asdr0: ReadWrite<u32>),
        (0x0C8 => pub compr0: ReadOnly<u32>),
        (0x0CC => pub ddr0: ReadOnly<u32>),
        (0x0D0 => pub dsicr1: ReadWrite<u32>),
        (0x0D4 => pub ssr0: ReadWrite<u32>),
        (0x0D8 => pub pisr: [ReadWrite<u32>; 4]),
        (0x0E8 => pub dimr0: ReadWrite<u32>),
        (0x0EC => pub dpir0: ReadWrite<u32>),
        (0x0F0 => _reserved3),
        /// Clock and transfer attributes extended
        (0x11C => pub ctare: [ReadWrite<u32>; 8]),
        (0x13C => pub srex: ReadOnly<u32>),
        (0x140 => @END),
    }
}

register_bitfields![u32,
    pub MCR [
        /// Master mode
        MSTR OFFSET(31) NUMBITS(1) [],
        CONT_SCKE OFFSET(30) NUMBITS(1) [],
        DCONF OFFSET(28) NUMBITS(2) [
            Spi = 0,
            Dsi = 1,
            Csi = 2
        ],
        FRZ OFFSET(27) NUMBITS(1) [],
        MTFE OFFSET(26) NUMBITS(1) [],
        ROOE OFFSET(24) NUMBITS(1) [],
        /// Peripheral chip select inactive levels
        PCSIS OFFSET(16) NUMBITS(8) [],
        MDIS OFFSET(14) NUMBITS(1) [],
        DIS_TXF OFFSET(13) NUMBITS(1) [],
        DIS_RXF OFFSET(12) NUMBITS(1) [],
        CLR_TXF OFFSET(11) NUMBITS(1) [],
        CLR_RXF OFFSET(10) NUMBITS(1) [],
        HALT OFFSET(0) NUMBITS(1) []
    ],
    pub CTAR [
        DBR OFFSET(31) NUMBITS(1) [],
        /// Frame size minus one
        FMSZ OFFSET(27) NUMBITS(4) [],
        CPOL OFFSET(26) NUMBITS(1) [],
        CPHA OFFSET(25) NUMBITS(1) [],
        LSBFE OFFSET(24) NUMBITS(1) [],
        PCSSCK OFFSET(22) NUMBITS(2) [],
        PASC OFFSET(20) NUMBITS(2) [],
        PDT OFFSET(18) NUMBITS(2) [],
        /// Baud rate prescaler 2, 3, 5 or 7
        PBR OFFSET(16) NUMBITS(2) [],
        CSSCK OFFSET(12) NUMBITS(4) [],
        ASC OFFSET(8) NUMBITS(4) [],
        DT OFFSET(4) NUMBITS(4) [],
        /// Baud rate scaler
        BR OFFSET(0) NUMBITS(4) []
    ],
    pub SR [
        TCF OFFSET(31) NUMBITS(1) [],
        TXRXS OFFSET(30) NUMBITS(1) [],
        EOQF OFFSET(28) NUMBITS(1) [],
        TFUF OFFSET(27) NUMBITS(1) [],
        TFFF OFFSET(25) NUMBITS(1) [],
        RFOF OFFSET(19) NUMBITS(1) [],
        RFDF OFFSET(17) NUMBITS(1) [],
        TXCTR OFFSET(12) NUMBITS(4) [],
        RXCTR OFFSET(4) NUMBITS(4) []
    ],
    pub PUSHR [
        CONT OFFSET(31) NUMBITS(1) [],
        CTAS OFFSET(28) NUMBITS(3) [],
        EOQ OFFSET(27) NUMBITS(1) [],
        CTCNT OFFSET(26) NUMBITS(1) [],
        PCS OFFSET(16) NUMBITS(8) [],
        TXDATA OFFSET(0) NUMBITS(16) []
    ]
];

pub const DSPI_0_BASE: StaticRef<DspiRegisters> =
    unsafe { StaticRef::new(memory_map::DSPI_0_BASE as *const DspiRegisters) };
pub const DSPI_1_BASE: StaticRef<DspiRegisters> =
    unsafe { StaticRef::new(memory_map::DSPI_1_BASE as *const DspiRegisters) };
pub const DSPI_2_BASE: StaticRef<DspiRegisters> =
    unsafe { StaticRef::new(memory_map::DSPI_2_BASE as *const DspiRegisters) };
pub const DSPI_3_BASE: StaticRef<DspiRegisters> =
    unsafe { StaticRef::new(memory_map::DSPI_3_BASE as *const DspiRegisters) };

const PBR: [u32; 4] = [2, 3, 5, 7];
const BR: [u32; 16] = [
    2, 4, 6, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
];

/// Pick `PBR` and `BR` for the fastest SCK not above `target_hz`. Returns
/// the field values and the resulting frequency, or `None` when even the
/// largest divider is too fast.
pub fn baud_rate_fields(dspi_hz: u32, target_hz: u32) -> Option<(u32, u32, u32)> {
    let mut best: Option<(u32, u32, u32)> = None;
    for (pbr, prescaler) in PBR.iter().enumerate() {
        for (br, scaler) in BR.iter().enumerate() {
            let sck = dspi_hz / (prescaler * scaler);
            if sck <= target_hz && best.map_or(true, |(_, _, hz)| sck > hz) {
                best = Some((pbr as u32, br as u32, sck));
            }
        }
    }
    best
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DspiError {
    /// Frames must be 4 to 16 bits wide.
    InvalidFrameSize,
    /// Even the largest divider gives an SCK above the target.
    InvalidBaudRate,
}

pub struct Dspi {
    registers: StaticRef<DspiRegisters>,
}

impl Dspi {
    pub const fn new(registers: StaticRef<DspiRegisters>) -> Dspi {
        Dspi { registers }
    }

    /// Master mode with all chip selects idle high, halted.
    pub fn init_master(&self) {
        self.registers.mcr.write(
            MCR::MSTR::SET
                + MCR::PCSIS.val(0xFF)
                + MCR::CLR_TXF::SET
                + MCR::CLR_RXF::SET
                + MCR::HALT::SET,
        );
    }

    /// Configure CTAR0 for `frame_bits` wide frames at up to `target_hz`.
    /// Returns the SCK frequency obtained.
    pub fn configure(
        &self,
        dspi_hz: u32,
        target_hz: u32,
        frame_bits: u32,
        mode: u8,
    ) -> Result<u32, DspiError> {
        if !(4..=16).contains(&frame_bits) {
            return Err(DspiError::InvalidFrameSize);
        }
        let (pbr, br, sck) =
            baud_rate_fields(dspi_hz, target_hz).ok_or(DspiError::InvalidBaudRate)?;
        self.registers.ctar[0].write(
            CTAR::FMSZ.val(frame_bits - 1)
                + CTAR::CPOL.val((mode as u32 >> 1) & 1)
                + CTAR::CPHA.val(mode as u32 & 1)
                + CTAR::PBR.val(pbr)
                + CTAR::BR.val(br),
        );
        Ok(sck)
    }

    pub fn start(&self) {
        self.registers.mcr.modify(MCR::HALT::CLEAR);
    }

    pub fn stop(&self) {
        self.registers.mcr.modify(MCR::HALT::SET);
    }

    pub fn push(&self, pcs: u8, data: u16) {
        self.registers
            .pushr
            .write(PUSHR::PCS.val(pcs as u32) + PUSHR::TXDATA.val(data as u32));
    }

    pub fn tx_fifo_fill(&self) -> u32 {
        self.registers.sr.read(SR::TXCTR)
    }
}
