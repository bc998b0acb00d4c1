// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! DMA channel multiplexer (DMAMUX).

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::Writeable;
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

pub const DMAMUX_CHANNELS: usize = 16;

register_structs! {
    pub DmamuxRegisters {
        (0x00 => pub chcfg: [ReadWrite<u8, CHCFG::Register>; DMAMUX_CHANNELS]),
        (0x10 => @END),
    }
}

register_bitfields![u8,
    pub CHCFG [
        ENBL OFFSET(7) NUMBITS(1) [],
        /// Periodic trigger from the PIT
        TRIG OFFSET(6) NUMBITS(1) [],
        SOURCE OFFSET(0) NUMBITS(6) []
    ]
];

pub const DMAMUX_BASE: StaticRef<DmamuxRegisters> =
    unsafe { StaticRef::new(memory_map::DMAMUX_0_BASE as *const DmamuxRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmamuxError {
    InvalidChannel,
    InvalidSource,
}

pub struct Dmamux {
    registers: StaticRef<DmamuxRegisters>,
}

impl Dmamux {
    pub const fn new(registers: StaticRef<DmamuxRegisters>) -> Dmamux {
        Dmamux { registers }
    }

    /// Route request `source` to `channel`.
    pub fn route(&self, channel: usize, source: u8, triggered: bool) -> Result<(), DmamuxError> {
        if source > 63 {
            return Err(DmamuxError::InvalidSource);
        }
        let chcfg = self
            .registers
            .chcfg
            .get(channel)
            .ok_or(DmamuxError::InvalidChannel)?;
        // The source may only change while the channel is disabled.
        chcfg.set(0);
        chcfg.write(
            CHCFG::ENBL::SET + CHCFG::TRIG.val(triggered as u8) + CHCFG::SOURCE.val(source),
        );
        Ok(())
    }

    pub fn disable(&self, channel: usize) -> Result<(), DmamuxError> {
        self.registers
            .chcfg
            .get(channel)
            .ok_or(DmamuxError::InvalidChannel)?
            .set(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;
    use tock_registers::interfaces::Readable;

    #[test]
    fn route_channel() {
        assert_eq!(size_of::<DmamuxRegisters>(), 0x10);
        let block: Box<DmamuxRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let mux = Dmamux::new(unsafe { StaticRef::new(&*block as *const DmamuxRegisters) });

        assert_eq!(mux.route(2, 12, false), Ok(()));
        assert_eq!(block.chcfg[2].get(), 0x8C);
        assert_eq!(mux.route(2, 64, false), Err(DmamuxError::InvalidSource));
        assert_eq!(mux.route(16, 1, true), Err(DmamuxError::InvalidChannel));
        assert_eq!(mux.disable(2), Ok(()));
        assert_eq!(block.chcfg[2].get(), 0);
    }
}
