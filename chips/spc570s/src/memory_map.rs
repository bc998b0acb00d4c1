// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral base addresses of the SPC570S.
//!
//! The addresses follow the memory map chapter of the SPC570S reference
//! manual. Blocks on peripheral bridge A live in the `0xFC00_0000` window,
//! blocks on peripheral bridge B in the `0xFFE0_0000` window.

// Peripheral bridge A
pub const SMPU_0_BASE: usize = 0xFC01_0000;
pub const INTC_0_BASE: usize = 0xFC04_0000;
pub const SWT_0_BASE: usize = 0xFC05_0000;
pub const STM_0_BASE: usize = 0xFC06_8000;
pub const EDMA_0_BASE: usize = 0xFC0A_0000;

// Peripheral bridge B
pub const SARADC_0_BASE: usize = 0xFFE0_0000;
pub const SARADC_1_BASE: usize = 0xFFE0_4000;
pub const PSI5_0_BASE: usize = 0xFFE4_0000;
pub const FLEXRAY_0_BASE: usize = 0xFFE5_0000;
pub const SRX_0_BASE: usize = 0xFFE5_C000;
pub const DSPI_0_BASE: usize = 0xFFE7_0000;
pub const DSPI_1_BASE: usize = 0xFFE7_4000;
pub const DSPI_2_BASE: usize = 0xFFE7_8000;
pub const DSPI_3_BASE: usize = 0xFFE7_C000;
pub const LINFLEXD_0_BASE: usize = 0xFFE8_C000;
pub const LINFLEXD_1_BASE: usize = 0xFFE9_0000;
pub const FLEXCAN_0_BASE: usize = 0xFFEC_0000;
pub const M_TTCAN_0_BASE: usize = 0xFFED_4000;
pub const CAN_RAM_BASE: usize = 0xFFED_8000;
pub const M_CAN_1_BASE: usize = 0xFFEE_4000;
pub const DMAMUX_0_BASE: usize = 0xFFF6_C000;
pub const PIT_0_BASE: usize = 0xFFF8_4000;
pub const PMCDIG_BASE: usize = 0xFFFA_0400;
pub const MC_RGM_BASE: usize = 0xFFFA_8000;
pub const IRCOSC_BASE: usize = 0xFFFB_0000;
pub const XOSC_BASE: usize = 0xFFFB_0080;
pub const PLLDIG_BASE: usize = 0xFFFB_0100;
/// The CGM register file starts at offset 0x700 from this address, the
/// range below it belongs to the oscillators and the PLLs.
pub const MC_CGM_BASE: usize = 0xFFFB_0000;
pub const MC_ME_BASE: usize = 0xFFFB_8000;
pub const SIUL2_BASE: usize = 0xFFFC_0000;
pub const SSCM_BASE: usize = 0xFFFF_8000;

/// Size of the shared CAN message RAM in bytes.
pub const CAN_RAM_SIZE: usize = 0x4000;

/// Every peripheral instance of the chip with its base address.
///
/// `MC_CGM` is not listed: it shares its base with `IRCOSC`.
pub const PERIPHERALS: &[(&str, usize)] = &[
    ("SMPU_0", SMPU_0_BASE),
    ("INTC_0", INTC_0_BASE),
    ("SWT_0", SWT_0_BASE),
    ("STM_0", STM_0_BASE),
    ("eDMA_0", EDMA_0_BASE),
    ("SARADC_0", SARADC_0_BASE),
    ("SARADC_1", SARADC_1_BASE),
    ("PSI5_0", PSI5_0_BASE),
    ("FlexRay_0", FLEXRAY_0_BASE),
    ("SRX_0", SRX_0_BASE),
    ("DSPI_0", DSPI_0_BASE),
    ("DSPI_1", DSPI_1_BASE),
    ("DSPI_2", DSPI_2_BASE),
    ("DSPI_3", DSPI_3_BASE),
    ("LINFlexD_0", LINFLEXD_0_BASE),
    ("LINFlexD_1", LINFLEXD_1_BASE),
    ("FlexCAN_0", FLEXCAN_0_BASE),
    ("M_TTCAN_0", M_TTCAN_0_BASE),
    ("CAN_RAM", CAN_RAM_BASE),
    ("M_CAN_1", M_CAN_1_BASE),
    ("DMAMUX_0", DMAMUX_0_BASE),
    ("PIT_0", PIT_0_BASE),
    ("PMCDIG", PMCDIG_BASE),
    ("MC_RGM", MC_RGM_BASE),
    ("IRCOSC", IRCOSC_BASE),
    ("XOSC", XOSC_BASE),
    ("PLLDIG", PLLDIG_BASE),
    ("MC_ME", MC_ME_BASE),
    ("SIUL2", SIUL2_BASE),
    ("SSCM", SSCM_BASE),
];

/// Look up the base address of a peripheral instance by name.
pub fn base_address(name: &str) -> Option<usize> {
    PERIPHERALS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, base)| base)
}
