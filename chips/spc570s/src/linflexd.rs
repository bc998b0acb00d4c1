// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! LIN controller with UART mode (LINFlexD), two instances.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub LinflexdRegisters {
        /// LIN control 1
        (0x00 => pub lincr1: ReadWrite<u32, LINCR1::Register>),
        (0x04 => pub linier: ReadWrite<u32>),
        (0x08 => pub linsr: ReadWrite<u32>),
        (0x0C => pub linesr: ReadWrite<u32>),
        /// UART mode control
        (0x10 => pub uartcr: ReadWrite<u32, UARTCR::Register>),
        /// UART mode status
        (0x14 => pub uartsr: ReadWrite<u32, UARTSR::Register>),
        (0x18 => pub lintcsr: ReadWrite<u32>),
        (0x1C => pub linocr: ReadWrite<u32>),
        (0x20 => pub lintocr: ReadWrite<u32>),
        /// Fractional baud rate
        (0x24 => pub linfbrr: ReadWrite<u32>),
        /// Integer baud rate
        (0x28 => pub linibrr: ReadWrite<u32>),
        (0x2C => pub lincfr: ReadWrite<u32>),
        (0x30 => pub lincr2: ReadWrite<u32>),
        /// Buffer identifier
        (0x34 => pub bidr: ReadWrite<u32>),
        /// Buffer data LSB and MSB
        (0x38 => pub bdrl: ReadWrite<u32>),
        (0x3C => pub bdrm: ReadWrite<u32>),
        /// Identifier filter enable, match index, mode
        (0x40 => pub ifer: ReadWrite<u32>),
        (0x44 => pub ifmi: ReadWrite<u32>),
        (0x48 => pub ifmr: ReadWrite<u32>),
        (0x4C => pub ifcr: [ReadWrite<u32>; 16]),
        /// Global control
        (0x8C => pub gcr: ReadWrite<u32>),
        /// UART preset timeout
        (0x90 => pub uartpto: ReadWrite<u32>),
        /// UART current timeout
        (0x94 => pub uartcto: ReadWrite<u32>),
        /// DMA Tx and Rx enable
        (0x98 => pub dmatxe: ReadWrite<u32>),
        (0x9C => pub dmarxe: ReadWrite<u32>),
        (0xA0 => @END),
    }
}

register_bitfields![u32,
    pub LINCR1 [
        /// Master break length
        MBL OFFSET(8) NUMBITS(4) [],
        BF OFFSET(7) NUMBITS(1) [],
        LBKM OFFSET(5) NUMBITS(1) [],
        MME OFFSET(4) NUMBITS(1) [],
        SLEEP OFFSET(1) NUMBITS(1) [],
        /// Initialization mode request
        INIT OFFSET(0) NUMBITS(1) []
    ],
    pub UARTCR [
        /// Tx data length in FIFO/buffer
        TDFL_TFC OFFSET(13) NUMBITS(3) [],
        RDFL_RFC OFFSET(10) NUMBITS(3) [],
        /// Rx FIFO mode
        RFBM OFFSET(9) NUMBITS(1) [],
        TFBM OFFSET(8) NUMBITS(1) [],
        /// Word length bit 1
        WL1 OFFSET(7) NUMBITS(1) [],
        PC1 OFFSET(6) NUMBITS(1) [],
        RXEN OFFSET(5) NUMBITS(1) [],
        TXEN OFFSET(4) NUMBITS(1) [],
        PC0 OFFSET(3) NUMBITS(1) [],
        /// Parity enable
        PCE OFFSET(2) NUMBITS(1) [],
        WL0 OFFSET(1) NUMBITS(1) [],
        UART OFFSET(0) NUMBITS(1) []
    ],
    pub UARTSR [
        SZF OFFSET(15) NUMBITS(1) [],
        OCF OFFSET(14) NUMBITS(1) [],
        PE OFFSET(10) NUMBITS(4) [],
        RMB OFFSET(9) NUMBITS(1) [],
        FEF OFFSET(8) NUMBITS(1) [],
        BOF OFFSET(7) NUMBITS(1) [],
        RPS OFFSET(6) NUMBITS(1) [],
        WUF OFFSET(5) NUMBITS(1) [],
        TO OFFSET(3) NUMBITS(1) [],
        /// Data reception completed
        DRF_RFE OFFSET(2) NUMBITS(1) [],
        /// Data transmission completed
        DTF_TFF OFFSET(1) NUMBITS(1) [],
        NF OFFSET(0) NUMBITS(1) []
    ]
];

pub const LINFLEXD_0_BASE: StaticRef<LinflexdRegisters> =
    unsafe { StaticRef::new(memory_map::LINFLEXD_0_BASE as *const LinflexdRegisters) };
pub const LINFLEXD_1_BASE: StaticRef<LinflexdRegisters> =
    unsafe { StaticRef::new(memory_map::LINFLEXD_1_BASE as *const LinflexdRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinflexdError {
    /// The baud rate needs a divider outside `LINIBRR`.
    InvalidBaudRate,
}

/// Integer and fractional baud rate divider for `LIN_CLK / (16 * baud)`.
pub fn baud_divider(lin_hz: u32, baud: u32) -> Option<(u32, u32)> {
    if baud == 0 {
        return None;
    }
    // Sixteenths of the divider, rounded to nearest.
    let scaled = (u64::from(lin_hz) + u64::from(baud / 2)) / u64::from(baud);
    let integer = scaled / 16;
    if integer == 0 || integer > 0xF_FFFF {
        return None;
    }
    Some((integer as u32, (scaled % 16) as u32))
}

pub struct Linflexd {
    registers: StaticRef<LinflexdRegisters>,
}

impl Linflexd {
    pub const fn new(registers: StaticRef<LinflexdRegisters>) -> Linflexd {
        Linflexd { registers }
    }

    /// 8N1 buffered UART.
    pub fn configure_uart(&self, lin_hz: u32, baud: u32) -> Result<(), LinflexdError> {
        let (integer, fraction) =
            baud_divider(lin_hz, baud).ok_or(LinflexdError::InvalidBaudRate)?;
        let regs = &*self.registers;
        regs.lincr1.write(LINCR1::INIT::SET);
        regs.uartcr.write(UARTCR::UART::SET);
        regs.uartcr
            .modify(UARTCR::WL0::SET + UARTCR::TXEN::SET + UARTCR::RXEN::SET);
        regs.linibrr.set(integer);
        regs.linfbrr.set(fraction);
        regs.lincr1.modify(LINCR1::INIT::CLEAR);
        Ok(())
    }

    pub fn write_byte(&self, byte: u8) {
        self.registers.bdrl.set(byte as u32);
    }

    pub fn transmit_complete(&self) -> bool {
        self.registers.uartsr.is_set(UARTSR::DTF_TFF)
    }
}
