// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System Memory Protection Unit (SMPU).
//!
//! Sixteen region descriptors, each giving every bus master one of four
//! access rights over an address range with 16 byte granularity. A region
//! is checked only while its `VLD` bit and the global `GVLD` bit are set.

use crate::memory_map;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

pub const SMPU_REGIONS: usize = 16;

/// Number of bus masters with a permission field in `RGD_WRD2`.
pub const SMPU_MASTERS: usize = 16;

register_structs! {
    pub SmpuErrorCapture {
        /// Error address
        (0x00 => pub ear: ReadOnly<u32>),
        /// Error detail
        (0x04 => pub edr: ReadOnly<u32>),
        (0x08 => @END),
    }
}

register_structs! {
    pub RegionDescriptor {
        /// Start address
        (0x00 => pub wrd0: ReadWrite<u32>),
        /// End address, inclusive
        (0x04 => pub wrd1: ReadWrite<u32>),
        /// Master permissions
        (0x08 => pub wrd2: ReadWrite<u32>),
        (0x0C => pub wrd3: ReadWrite<u32, WRD3::Register>),
        (0x10 => pub wrd4: ReadWrite<u32>),
        (0x14 => pub wrd5: ReadWrite<u32, WRD5::Register>),
        (0x18 => _reserved0),
        (0x20 => @END),
    }
}

register_structs! {
    pub SmpuRegisters {
        (0x000 => pub cesr0: ReadWrite<u32, CESR0::Register>),
        (0x004 => pub cesr1: ReadWrite<u32>),
        (0x008 => _reserved0),
        (0x100 => pub errors: [SmpuErrorCapture; 16]),
        (0x180 => _reserved1),
        (0x400 => pub rgd: [RegionDescriptor; SMPU_REGIONS]),
        (0x600 => @END),
    }
}

register_bitfields![u32,
    pub CESR0 [
        /// Master error flags, one per bus master
        MERR OFFSET(16) NUMBITS(16) [],
        /// Hardware revision
        HRL OFFSET(4) NUMBITS(4) [],
        /// Global valid
        GVLD OFFSET(0) NUMBITS(1) []
    ],
    pub WRD3 [
        /// Permission format
        FMT OFFSET(4) NUMBITS(1) [],
        /// Region is read-only until reset
        RO OFFSET(0) NUMBITS(1) []
    ],
    pub WRD5 [
        /// Lock
        LCK OFFSET(1) NUMBITS(2) [],
        /// Region valid
        VLD OFFSET(0) NUMBITS(1) []
    ]
];

pub const SMPU_BASE: StaticRef<SmpuRegisters> =
    unsafe { StaticRef::new(memory_map::SMPU_0_BASE as *const SmpuRegisters) };

/// Access right of one bus master, as encoded in `RGD_WRD2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Access {
    ReadWrite = 0,
    ReadOnly = 1,
    WriteOnly = 2,
    NoAccess = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmpuError {
    InvalidRegion,
    InvalidMaster,
    /// Start not 16 byte aligned or end not on the last byte of a 16 byte
    /// block.
    Misaligned,
    /// End below start.
    EmptyRange,
    /// The descriptor is locked until reset.
    Locked,
}

/// An address range with per-master access rights. Masters default to no
/// access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmpuRegion {
    start: u32,
    end: u32,
    permissions: u32,
}

impl SmpuRegion {
    /// Range `start..=end`.
    pub fn new(start: u32, end: u32) -> Result<SmpuRegion, SmpuError> {
        if start & 0xF != 0 || end & 0xF != 0xF {
            return Err(SmpuError::Misaligned);
        }
        if end < start {
            return Err(SmpuError::EmptyRange);
        }
        Ok(SmpuRegion {
            start,
            end,
            permissions: u32::MAX,
        })
    }

    pub fn with_access(mut self, master: usize, access: Access) -> Result<SmpuRegion, SmpuError> {
        if master >= SMPU_MASTERS {
            return Err(SmpuError::InvalidMaster);
        }
        let shift = 30 - 2 * master as u32;
        self.permissions = (self.permissions & !(0x3 << shift)) | ((access as u32) << shift);
        Ok(self)
    }

    pub fn access(&self, master: usize) -> Option<Access> {
        if master >= SMPU_MASTERS {
            return None;
        }
        match (self.permissions >> (30 - 2 * master as u32)) & 0x3 {
            0 => Some(Access::ReadWrite),
            1 => Some(Access::ReadOnly),
            2 => Some(Access::WriteOnly),
            _ => Some(Access::NoAccess),
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// `RGD_WRD2` value.
    pub fn permissions(&self) -> u32 {
        self.permissions
    }
}

pub struct Smpu {
    registers: StaticRef<SmpuRegisters>,
}

impl Smpu {
    pub const fn new(registers: StaticRef<SmpuRegisters>) -> Smpu {
        Smpu { registers }
    }

    pub fn set_region(&self, index: usize, region: &SmpuRegion) -> Result<(), SmpuError> {
        let rgd = self
            .registers
            .rgd
            .get(index)
            .ok_or(SmpuError::InvalidRegion)?;
        if rgd.wrd5.read(WRD5::LCK) != 0 {
            return Err(SmpuError::Locked);
        }
        rgd.wrd5.modify(WRD5::VLD::CLEAR);
        rgd.wrd0.set(region.start);
        rgd.wrd1.set(region.end);
        rgd.wrd2.set(region.permissions);
        rgd.wrd3.write(WRD3::FMT::CLEAR);
        rgd.wrd5.modify(WRD5::VLD::SET);
        Ok(())
    }

    pub fn clear_region(&self, index: usize) -> Result<(), SmpuError> {
        let rgd = self
            .registers
            .rgd
            .get(index)
            .ok_or(SmpuError::InvalidRegion)?;
        if rgd.wrd5.read(WRD5::LCK) != 0 {
            return Err(SmpuError::Locked);
        }
        rgd.wrd5.modify(WRD5::VLD::CLEAR);
        Ok(())
    }

    pub fn enable(&self) {
        self.registers.cesr0.modify(CESR0::GVLD::SET);
    }

    pub fn disable(&self) {
        self.registers.cesr0.modify(CESR0::GVLD::CLEAR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<RegionDescriptor>(), 0x20);
        assert_eq!(size_of::<SmpuRegisters>(), 0x600);
        assert_eq!(offset_of!(SmpuRegisters, errors), 0x100);
        assert_eq!(offset_of!(SmpuRegisters, rgd), 0x400);
        assert_eq!(offset_of!(RegionDescriptor, wrd5), 0x14);
    }

    #[test]
    fn region_checks() {
        assert_eq!(SmpuRegion::new(0x4000_0008, 0x4000_FFFF), Err(SmpuError::Misaligned));
        assert_eq!(SmpuRegion::new(0x4000_0000, 0x4000_FFFE), Err(SmpuError::Misaligned));
        assert_eq!(SmpuRegion::new(0x4001_0000, 0x4000_FFFF), Err(SmpuError::EmptyRange));
        let region = SmpuRegion::new(0x4000_0000, 0x4000_000F).unwrap();
        assert_eq!(
            region.with_access(SMPU_MASTERS, Access::ReadOnly),
            Err(SmpuError::InvalidMaster)
        );
    }

    #[test]
    fn permission_packing() {
        let region = SmpuRegion::new(0x4000_0000, 0x4000_FFFF)
            .and_then(|r| r.with_access(0, Access::ReadWrite))
            .and_then(|r| r.with_access(2, Access::ReadOnly))
            .unwrap();
        assert_eq!(region.permissions(), 0x37FF_FFFF);
        assert_eq!(region.access(0), Some(Access::ReadWrite));
        assert_eq!(region.access(1), Some(Access::NoAccess));
        assert_eq!(region.access(2), Some(Access::ReadOnly));
        assert_eq!(region.access(16), None);
    }

    #[test]
    fn program_descriptor() {
        let block: Box<SmpuRegisters> = Box::new(unsafe { core::mem::zeroed() });
        let smpu = Smpu::new(unsafe { StaticRef::new(&*block as *const SmpuRegisters) });
        let region = SmpuRegion::new(0x4000_0000, 0x4000_FFFF)
            .and_then(|r| r.with_access(0, Access::ReadWrite))
            .unwrap();

        assert_eq!(smpu.set_region(3, &region), Ok(()));
        assert_eq!(block.rgd[3].wrd0.get(), 0x4000_0000);
        assert_eq!(block.rgd[3].wrd1.get(), 0x4000_FFFF);
        assert_eq!(block.rgd[3].wrd2.get(), 0x3FFF_FFFF);
        assert!(block.rgd[3].wrd5.is_set(WRD5::VLD));
        assert_eq!(smpu.set_region(SMPU_REGIONS, &region), Err(SmpuError::InvalidRegion));

        block.rgd[4].wrd5.write(WRD5::LCK.val(1));
        assert_eq!(smpu.set_region(4, &region), Err(SmpuError::Locked));

        smpu.enable();
        assert!(block.cesr0.is_set(CESR0::GVLD));
        assert_eq!(smpu.clear_region(3), Ok(()));
        assert!(!block.rgd[3].wrd5.is_set(WRD5::VLD));
    }
}
