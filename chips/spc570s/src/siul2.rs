// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System Integration Unit Lite 2 (SIUL2): pad multiplexing, GPIO and
//! external interrupts.
//!
//! Pads are numbered `16 * port + pin`. Each pad has a multiplexed signal
//! configuration register (`MSCR`), a GPIO output byte and a GPIO input
//! byte; the parallel registers access a whole 16-pin port at once.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const SIUL2_PADS: usize = 512;
pub const SIUL2_PORTS: usize = 32;

register_structs! {
    pub Siul2Registers {
        (0x0000 => _reserved0),
        /// MCU ID
        (0x0004 => pub midr1: ReadOnly<u32>),
        (0x0008 => pub midr2: ReadOnly<u32>),
        (0x000C => _reserved1),
        /// DMA/interrupt status flags
        (0x0010 => pub disr0: ReadWrite<u32>),
        (0x0014 => _reserved2),
        /// DMA/interrupt request enable
        (0x0018 => pub direr0: ReadWrite<u32>),
        (0x001C => _reserved3),
        /// DMA/interrupt request select
        (0x0020 => pub dirsr0: ReadWrite<u32>),
        (0x0024 => _reserved4),
        /// Interrupt rising and falling edge enables
        (0x0028 => pub ireer0: ReadWrite<u32>),
        (0x002C => _reserved5),
        (0x0030 => pub ifeer0: ReadWrite<u32>),
        (0x0034 => _reserved6),
        /// Interrupt filter enable
        (0x0038 => pub ifer0: ReadWrite<u32>),
        (0x003C => _reserved7),
        /// Interrupt filter maximum counter
        (0x0040 => pub ifmcr: [ReadWrite<u32>; 32]),
        /// Interrupt filter clock prescaler
        (0x00C0 => pub ifcpr: ReadWrite<u32>),
        (0x00C4 => _reserved8),
        /// Multiplexed signal configuration
        (0x0240 => pub mscr: [ReadWrite<u32, MSCR::Register>; SIUL2_PADS]),
        /// Input multiplexed signal configuration
        (0x0A40 => pub imcr: [ReadWrite<u32, IMCR::Register>; SIUL2_PADS]),
        (0x1240 => _reserved9),
        /// GPIO pad data output
        (0x1300 => pub gpdo: [ReadWrite<u8>; SIUL2_PADS]),
        /// GPIO pad data input
        (0x1500 => pub gpdi: [ReadOnly<u8>; SIUL2_PADS]),
        /// Parallel GPIO pad data output and input
        (0x1700 => pub pgpdo: [ReadWrite<u16>; SIUL2_PORTS]),
        (0x1740 => pub pgpdi: [ReadOnly<u16>; SIUL2_PORTS]),
        /// Masked parallel GPIO pad data output
        (0x1780 => pub mpgpdo: [ReadWrite<u32>; SIUL2_PORTS]),
        (0x1800 => @END),
    }
}

register_bitfields![u32,
    pub MSCR [
        /// Slew rate control
        SRC OFFSET(28) NUMBITS(2) [],
        /// Output buffer enable
        OBE OFFSET(25) NUMBITS(1) [],
        /// Open drain enable
        ODE OFFSET(24) NUMBITS(1) [],
        /// Safe mode control
        SMC OFFSET(23) NUMBITS(1) [],
        /// Analog pad control
        APC OFFSET(22) NUMBITS(1) [],
        /// Input buffer enable
        IBE OFFSET(19) NUMBITS(1) [],
        HYS OFFSET(18) NUMBITS(1) [],
        /// Pull select, 1 is pull-up
        PUS OFFSET(17) NUMBITS(1) [],
        /// Pull enable
        PUE OFFSET(16) NUMBITS(1) [],
        INV OFFSET(15) NUMBITS(1) [],
        /// Source signal select, 0 is GPIO
        SSS OFFSET(0) NUMBITS(4) []
    ],
    pub IMCR [
        SSS OFFSET(0) NUMBITS(4) []
    ]
];

pub const SIUL2_BASE: StaticRef<Siul2Registers> =
    unsafe { StaticRef::new(memory_map::SIUL2_BASE as *const Siul2Registers) };

/// Pad number of `pin` on `port` (port A is 0).
pub const fn pad(port: usize, pin: usize) -> usize {
    port * 16 + pin
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Pad configurations that [`Siul2::configure_pad`] knows how to encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadMode {
    Input(Pull),
    Output { open_drain: bool },
    /// Peripheral output function `n` (1..=15).
    Alternate(u8),
    Analog,
}

impl PadMode {
    pub fn mscr_value(&self) -> u32 {
        let value = match *self {
            PadMode::Input(Pull::None) => MSCR::IBE::SET,
            PadMode::Input(Pull::Up) => MSCR::IBE::SET + MSCR::PUE::SET + MSCR::PUS::SET,
            PadMode::Input(Pull::Down) => MSCR::IBE::SET + MSCR::PUE::SET,
            PadMode::Output { open_drain } => {
                MSCR::OBE::SET + MSCR::IBE::SET + MSCR::ODE.val(open_drain as u32)
            }
            PadMode::Alternate(function) => {
                MSCR::OBE::SET + MSCR::SRC.val(3) + MSCR::SSS.val((function & 0xF) as u32)
            }
            PadMode::Analog => MSCR::APC::SET,
        };
        u32::from(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Siul2Error {
    InvalidPad,
    InvalidPort,
}

pub struct Siul2 {
    registers: StaticRef<Siul2Registers>,
}

impl Siul2 {
    pub const fn new(registers: StaticRef<Siul2Registers>) -> Siul2 {
        Siul2 { registers }
    }

    pub fn configure_pad(&self, pad: usize, mode: PadMode) -> Result<(), Siul2Error> {
        self.registers
            .mscr
            .get(pad)
            .ok_or(Siul2Error::InvalidPad)?
            .set(mode.mscr_value());
        Ok(())
    }

    /// Route pad input signal `source` to peripheral input `input`.
    pub fn select_input(&self, input: usize, source: u32) -> Result<(), Siul2Error> {
        self.registers
            .imcr
            .get(input)
            .ok_or(Siul2Error::InvalidPad)?
            .write(IMCR::SSS.val(source));
        Ok(())
    }

    pub fn set_output(&self, pad: usize, high: bool) -> Result<(), Siul2Error> {
        self.registers
            .gpdo
            .get(pad)
            .ok_or(Siul2Error::InvalidPad)?
            .set(high as u8);
        Ok(())
    }

    pub fn read_input(&self, pad: usize) -> Result<bool, Siul2Error> {
        let gpdi = self.registers.gpdi.get(pad).ok_or(Siul2Error::InvalidPad)?;
        Ok(gpdi.get() & 1 != 0)
    }

    /// Write the pins of `port` selected by `mask`, leaving the others.
    pub fn write_port_masked(&self, port: usize, mask: u16, value: u16) -> Result<(), Siul2Error> {
        self.registers
            .mpgpdo
            .get(port)
            .ok_or(Siul2Error::InvalidPort)?
            .set(((mask as u32) << 16) | value as u32);
        Ok(())
    }

    pub fn read_port(&self, port: usize) -> Result<u16, Siul2Error> {
        let pgpdi = self.registers.pgpdi.get(port).ok_or(Siul2Error::InvalidPort)?;
        Ok(pgpdi.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<Siul2Registers>(), 0x1800);
        assert_eq!(offset_of!(Siul2Registers, midr1), 0x0004);
        assert_eq!(offset_of!(Siul2Registers, ifer0), 0x0038);
        assert_eq!(offset_of!(Siul2Registers, ifcpr), 0x00C0);
        assert_eq!(offset_of!(Siul2Registers, mscr), 0x0240);
        assert_eq!(offset_of!(Siul2Registers, imcr), 0x0A40);
        assert_eq!(offset_of!(Siul2Registers, gpdo), 0x1300);
        assert_eq!(offset_of!(Siul2Registers, gpdi), 0x1500);
        assert_eq!(offset_of!(Siul2Registers, pgpdo), 0x1700);
        assert_eq!(offset_of!(Siul2Registers, mpgpdo), 0x1780);
    }

    #[test]
    fn pad_modes() {
        assert_eq!(pad(2, 5), 37);
        assert_eq!(PadMode::Input(Pull::Up).mscr_value(), 0x0008_0000 | 0x0003_0000);
        assert_eq!(PadMode::Input(Pull::Down).mscr_value(), 0x0009_0000);
        assert_eq!(
            PadMode::Output { open_drain: false }.mscr_value(),
            0x0208_0000
        );
        assert_eq!(
            PadMode::Output { open_drain: true }.mscr_value(),
            0x0308_0000
        );
        assert_eq!(PadMode::Alternate(2).mscr_value(), 0x3200_0002);
        assert_eq!(PadMode::Analog.mscr_value(), 0x0040_0000);
    }

    #[test]
    fn gpio_access() {
        let block: Box<Siul2Registers> = Box::new(unsafe { core::mem::zeroed() });
        let siul2 = Siul2::new(unsafe { StaticRef::new(&*block as *const Siul2Registers) });

        assert_eq!(siul2.configure_pad(pad(0, 3), PadMode::Output { open_drain: false }), Ok(()));
        assert_eq!(block.mscr[3].read(MSCR::OBE), 1);
        assert_eq!(siul2.set_output(3, true), Ok(()));
        assert_eq!(block.gpdo[3].get(), 1);
        assert_eq!(siul2.set_output(SIUL2_PADS, true), Err(Siul2Error::InvalidPad));

        assert_eq!(siul2.write_port_masked(1, 0x00F0, 0x0050), Ok(()));
        assert_eq!(block.mpgpdo[1].get(), 0x00F0_0050);
        assert_eq!(siul2.read_port(32), Err(Siul2Error::InvalidPort));
        assert_eq!(siul2.read_input(5), Ok(false));

        assert_eq!(siul2.select_input(10, 2), Ok(()));
        assert_eq!(block.imcr[10].read(IMCR::SSS), 2);
    }
}
