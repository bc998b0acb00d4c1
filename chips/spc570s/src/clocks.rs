// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock tree configuration and checks for the SPC570S.
//!
//! The SPC570S derives all of its clocks from three oscillators (the 16MHz
//! internal RC oscillator, the external crystal oscillator and the two PLLs
//! of PLLDIG) through the selectors and dividers of MC_CGM:
//!
//! ```text
//!                +--------+
//!  IRC/XOSC ---->| PLL0   |--- PHI  ---> AUX0 (PER, SAR, CTU, DSPI, LIN, ETIMER)
//!   (AC2)        |        |--- PHI1 ---> PLL1 input (AC3)
//!                +--------+
//!                +--------+
//!  XOSC/PHI1 --->| PLL1   |--- PHI  ---> SYSCLK (selected by the ME mode)
//!   (AC3)        +--------+
//! ```
//!
//! A [`ClockConfig`] describes every multiplier, divider and selector. It is
//! checked by [`ClockConfig::validate`], which rejects any setting the
//! hardware does not support and returns the resulting [`ClockTree`].
//!
//! # Usage
//!
//! ```rust,ignore
//! const CLOCKS: ClockConfig = ClockConfig {
//!     xosc_hz: 20_000_000,
//!     ..ClockConfig::DEFAULT
//! };
//! let tree = CLOCKS.validate()?;
//! let dspi_clock = tree.dspi_hz;
//! ```

use crate::mc_me::SystemClock;
use core::fmt;

/// Maximum XOSC clock frequency.
pub const XOSC_CLK_MAX: u32 = 40_000_000;
/// Minimum XOSC clock frequency.
pub const XOSC_CLK_MIN: u32 = 8_000_000;
/// Minimum PLL0 input clock frequency.
pub const PLL0_IN_MIN: u32 = 8_000_000;
/// Maximum PLL0 input clock frequency.
pub const PLL0_IN_MAX: u32 = 56_000_000;
/// Minimum PLL1 input clock frequency.
pub const PLL1_IN_MIN: u32 = 38_000_000;
/// Maximum PLL1 input clock frequency.
pub const PLL1_IN_MAX: u32 = 78_000_000;
pub const PLL0_VCO_MIN: u32 = 600_000_000;
pub const PLL0_VCO_MAX: u32 = 1_250_000_000;
pub const PLL1_VCO_MIN: u32 = 600_000_000;
pub const PLL1_VCO_MAX: u32 = 1_250_000_000;
pub const PLL0_CLK_MIN: u32 = 4_762_000;
pub const PLL0_CLK_MAX: u32 = 625_000_000;
pub const PLL1_CLK_MIN: u32 = 4_762_000;
pub const PLL1_CLK_MAX: u32 = 625_000_000;
pub const PER_CLK_MAX: u32 = 80_000_000;
pub const SAR_CLK_MAX: u32 = 12_000_000;
pub const CTU_CLK_MAX: u32 = 16_000_000;
pub const DSPI_CLK_MAX: u32 = 80_000_000;
pub const LIN_CLK_MAX: u32 = 80_000_000;
pub const ETIMER_CLK_MAX: u32 = 100_000_000;

/// Frequency of the internal RC oscillator.
pub const IRC_CLK: u32 = 16_000_000;

/// Divider enable bit, common to all MC_CGM divider registers.
pub const CGM_DC_DE: u32 = 1 << 31;

/// Clock sources as encoded in the MC_CGM selector registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ClockSource {
    Irc = 0,
    Xosc = 1,
    Pll0Phi = 2,
    Pll0Phi1 = 3,
    Pll1Phi = 4,
}

impl ClockSource {
    /// Decode a 4-bit CGM `SELCTL`/`SELSTAT` value.
    pub fn from_selector(value: u32) -> Option<ClockSource> {
        match value {
            0 => Some(ClockSource::Irc),
            1 => Some(ClockSource::Xosc),
            2 => Some(ClockSource::Pll0Phi),
            3 => Some(ClockSource::Pll0Phi1),
            4 => Some(ClockSource::Pll1Phi),
            _ => None,
        }
    }

    /// Value to program into a CGM `SELCTL` field.
    pub fn selector(self) -> u32 {
        self as u32
    }
}

/// The clock dividers of MC_CGM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Divider {
    ScDc0,
    ScDc1,
    ScDc2,
    Ac0Dc0,
    Ac0Dc1,
    Ac0Dc2,
    Ac0Dc3,
    Ac0Dc4,
    Ac0Dc5,
    Ac1Dc0,
}

impl Divider {
    /// Largest division factor accepted by the divider. Zero is always
    /// accepted and means "clock disabled".
    pub fn max(self) -> u32 {
        match self {
            Divider::ScDc0 => 8,
            Divider::ScDc1 => 16,
            Divider::ScDc2 => 256,
            Divider::Ac0Dc0 => 16,
            Divider::Ac0Dc1 | Divider::Ac0Dc2 | Divider::Ac0Dc3 => 128,
            Divider::Ac0Dc4 | Divider::Ac0Dc5 => 16,
            Divider::Ac1Dc0 => 64,
        }
    }
}

/// A clock configuration rejected by [`ClockConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockError {
    XoscOutOfRange,
    Pll0PredivOutOfRange,
    Pll0MfdOutOfRange,
    Pll0RfdphiOutOfRange,
    Pll0Rfdphi1OutOfRange,
    Pll1MfdOutOfRange,
    Pll1RfdphiOutOfRange,
    /// AUX0 only accepts IRC, XOSC or PLL0 PHI.
    InvalidAux0Source,
    /// AUX1 only accepts XOSC or PLL0 PHI.
    InvalidAux1Source,
    /// PLL0 is only fed by IRC or XOSC.
    InvalidPll0Source,
    /// PLL1 is only fed by XOSC or PLL0 PHI1.
    InvalidPll1Source,
    DividerOutOfRange(Divider),
    Pll0VcoOutOfRange,
    Pll0PhiOutOfRange,
    Pll0Phi1OutOfRange,
    Pll1VcoOutOfRange,
    Pll1PhiOutOfRange,
    PerClockTooHigh,
    SarClockTooHigh,
    CtuClockTooHigh,
    DspiClockTooHigh,
    LinClockTooHigh,
    EtimerClockTooHigh,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClockError::XoscOutOfRange => write!(f, "XOSC frequency outside 8..40MHz"),
            ClockError::Pll0PredivOutOfRange => write!(f, "invalid PLL0 PREDIV value"),
            ClockError::Pll0MfdOutOfRange => write!(f, "invalid PLL0 MFD value"),
            ClockError::Pll0RfdphiOutOfRange => write!(f, "invalid PLL0 RFDPHI value"),
            ClockError::Pll0Rfdphi1OutOfRange => write!(f, "invalid PLL0 RFDPHI1 value"),
            ClockError::Pll1MfdOutOfRange => write!(f, "invalid PLL1 MFD value"),
            ClockError::Pll1RfdphiOutOfRange => write!(f, "invalid PLL1 RFDPHI value"),
            ClockError::InvalidAux0Source => write!(f, "invalid AUX0 clock source"),
            ClockError::InvalidAux1Source => write!(f, "invalid AUX1 clock source"),
            ClockError::InvalidPll0Source => write!(f, "invalid PLL0 clock source"),
            ClockError::InvalidPll1Source => write!(f, "invalid PLL1 clock source"),
            ClockError::DividerOutOfRange(d) => write!(f, "invalid {:?} divider value", d),
            ClockError::Pll0VcoOutOfRange => write!(f, "PLL0 VCO outside acceptable range"),
            ClockError::Pll0PhiOutOfRange => write!(f, "PLL0 PHI outside acceptable range"),
            ClockError::Pll0Phi1OutOfRange => write!(f, "PLL0 PHI1 outside acceptable range"),
            ClockError::Pll1VcoOutOfRange => write!(f, "PLL1 VCO outside acceptable range"),
            ClockError::Pll1PhiOutOfRange => write!(f, "PLL1 PHI outside acceptable range"),
            ClockError::PerClockTooHigh => write!(f, "PER_CLK above 80MHz"),
            ClockError::SarClockTooHigh => write!(f, "SAR_CLK above 12MHz"),
            ClockError::CtuClockTooHigh => write!(f, "CTU_CLK above 16MHz"),
            ClockError::DspiClockTooHigh => write!(f, "DSPI_CLK above 80MHz"),
            ClockError::LinClockTooHigh => write!(f, "LIN_CLK above 80MHz"),
            ClockError::EtimerClockTooHigh => write!(f, "ETIMER_CLK above 100MHz"),
        }
    }
}

/// Encode a division factor for an MC_CGM `DCn` register.
///
/// Zero leaves the divider (and the clock behind it) disabled, any other
/// value is stored as `DE | (value - 1) << 16`.
pub fn divider_bits(divider: Divider, value: u32) -> Result<u32, ClockError> {
    if value == 0 {
        Ok(0)
    } else if value <= divider.max() {
        Ok(CGM_DC_DE | ((value - 1) << 16))
    } else {
        Err(ClockError::DividerOutOfRange(divider))
    }
}

/// Complete description of the clock tree settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    /// Frequency of the external crystal, board dependent.
    pub xosc_hz: u32,
    /// The external clock is driven directly instead of a crystal.
    pub xosc_bypass: bool,
    /// Skip the upper/lower limits of the PLL outputs.
    pub allow_overclock: bool,

    pub pll0_prediv: u32,
    pub pll0_mfd: u32,
    pub pll0_rfdphi: u32,
    pub pll0_rfdphi1: u32,
    pub pll1_mfd: u32,
    pub pll1_rfdphi: u32,

    /// System clock dividers SC_DC0..SC_DC2.
    ///
    /// The dividers must be multiples of each other except for the lowest
    /// one, this is not checked.
    pub sc_dividers: [u32; 3],

    /// AUX0 selector and its PER, SAR, CTU, DSPI, LIN and ETIMER dividers.
    pub ac0_source: ClockSource,
    pub ac0_dividers: [u32; 6],
    /// AUX1 selector and divider.
    pub ac1_source: ClockSource,
    pub ac1_divider: u32,
    /// PLL0 reference selector.
    pub ac2_source: ClockSource,
    /// PLL1 reference selector.
    pub ac3_source: ClockSource,
}

impl ClockConfig {
    /// XOSC at 40MHz, PLL0 PHI at 400MHz, PLL0 PHI1 at 66.6MHz and PLL1 PHI
    /// at 200MHz.
    pub const DEFAULT: ClockConfig = ClockConfig {
        xosc_hz: 40_000_000,
        xosc_bypass: false,
        allow_overclock: false,
        pll0_prediv: 2,
        pll0_mfd: 20,
        pll0_rfdphi: 1,
        pll0_rfdphi1: 6,
        pll1_mfd: 20,
        pll1_rfdphi: 2,
        sc_dividers: [2, 4, 8],
        ac0_source: ClockSource::Pll0Phi,
        ac0_dividers: [5, 40, 25, 5, 5, 4],
        ac1_source: ClockSource::Xosc,
        ac1_divider: 1,
        ac2_source: ClockSource::Xosc,
        ac3_source: ClockSource::Xosc,
    };

    /// Check every setting and compute the resulting clock points.
    pub fn validate(&self) -> Result<ClockTree, ClockError> {
        if self.xosc_hz < XOSC_CLK_MIN || self.xosc_hz > XOSC_CLK_MAX {
            return Err(ClockError::XoscOutOfRange);
        }

        // PLL settings. PREDIV 0 is a legal register value but it would
        // divide the VCO formula by zero.
        if self.pll0_prediv < 1 || self.pll0_prediv > 7 {
            return Err(ClockError::Pll0PredivOutOfRange);
        }
        if self.pll0_mfd < 8 || self.pll0_mfd > 127 {
            return Err(ClockError::Pll0MfdOutOfRange);
        }
        if self.pll0_rfdphi < 1 || self.pll0_rfdphi > 63 {
            return Err(ClockError::Pll0RfdphiOutOfRange);
        }
        if self.pll0_rfdphi1 < 4 || self.pll0_rfdphi1 > 15 {
            return Err(ClockError::Pll0Rfdphi1OutOfRange);
        }
        if self.pll1_mfd < 16 || self.pll1_mfd > 34 {
            return Err(ClockError::Pll1MfdOutOfRange);
        }
        if self.pll1_rfdphi < 1 || self.pll1_rfdphi > 63 {
            return Err(ClockError::Pll1RfdphiOutOfRange);
        }

        // Selectors.
        match self.ac0_source {
            ClockSource::Irc | ClockSource::Xosc | ClockSource::Pll0Phi => {}
            _ => return Err(ClockError::InvalidAux0Source),
        }
        match self.ac1_source {
            ClockSource::Xosc | ClockSource::Pll0Phi => {}
            _ => return Err(ClockError::InvalidAux1Source),
        }
        let pll0_in_hz = match self.ac2_source {
            ClockSource::Irc => IRC_CLK,
            ClockSource::Xosc => self.xosc_hz,
            _ => return Err(ClockError::InvalidPll0Source),
        };
        match self.ac3_source {
            ClockSource::Xosc | ClockSource::Pll0Phi1 => {}
            _ => return Err(ClockError::InvalidPll1Source),
        }

        // Dividers.
        let sc = [Divider::ScDc0, Divider::ScDc1, Divider::ScDc2];
        for (divider, value) in sc.iter().zip(self.sc_dividers.iter()) {
            divider_bits(*divider, *value)?;
        }
        for (divider, value) in AC0_DIVIDERS.iter().zip(self.ac0_dividers.iter()) {
            divider_bits(*divider, *value)?;
        }
        divider_bits(Divider::Ac1Dc0, self.ac1_divider)?;

        // Clock points.
        let pll0_vco = u64::from(pll0_in_hz / self.pll0_prediv) * 2 * u64::from(self.pll0_mfd);
        if pll0_vco < u64::from(PLL0_VCO_MIN) || pll0_vco > u64::from(PLL0_VCO_MAX) {
            return Err(ClockError::Pll0VcoOutOfRange);
        }
        let pll0_vco_hz = pll0_vco as u32;

        let pll0_phi_hz = pll0_vco_hz / self.pll0_rfdphi / 2;
        if !self.allow_overclock && (pll0_phi_hz > PLL0_CLK_MAX || pll0_phi_hz < PLL0_CLK_MIN) {
            return Err(ClockError::Pll0PhiOutOfRange);
        }

        let pll0_phi1_hz = pll0_vco_hz / self.pll0_rfdphi1 / 2;
        if !self.allow_overclock && (pll0_phi1_hz > PLL0_CLK_MAX || pll0_phi1_hz < PLL0_CLK_MIN)
        {
            return Err(ClockError::Pll0Phi1OutOfRange);
        }

        let pll1_in_hz = match self.ac3_source {
            ClockSource::Pll0Phi1 => pll0_phi1_hz,
            _ => self.xosc_hz,
        };
        let pll1_vco = u64::from(pll1_in_hz) * u64::from(self.pll1_mfd);
        if pll1_vco < u64::from(PLL1_VCO_MIN) || pll1_vco > u64::from(PLL1_VCO_MAX) {
            return Err(ClockError::Pll1VcoOutOfRange);
        }
        let pll1_vco_hz = pll1_vco as u32;

        let pll1_phi_hz = pll1_vco_hz / self.pll1_rfdphi / 2;
        if !self.allow_overclock && (pll1_phi_hz > PLL1_CLK_MAX || pll1_phi_hz < PLL1_CLK_MIN) {
            return Err(ClockError::Pll1PhiOutOfRange);
        }

        let aux0_hz = match self.ac0_source {
            ClockSource::Irc => IRC_CLK,
            ClockSource::Xosc => self.xosc_hz,
            _ => pll0_phi_hz,
        };
        let aux1_in_hz = match self.ac1_source {
            ClockSource::Xosc => self.xosc_hz,
            _ => pll0_phi_hz,
        };

        let [per, sar, ctu, dspi, lin, etimer] = self.ac0_dividers;
        let tree = ClockTree {
            irc_hz: IRC_CLK,
            xosc_hz: self.xosc_hz,
            pll0_in_hz,
            pll0_vco_hz,
            pll0_phi_hz,
            pll0_phi1_hz,
            pll1_in_hz,
            pll1_vco_hz,
            pll1_phi_hz,
            aux0_hz,
            per_hz: divided(aux0_hz, per),
            sar_hz: divided(aux0_hz, sar),
            ctu_hz: divided(aux0_hz, ctu),
            dspi_hz: divided(aux0_hz, dspi),
            lin_hz: divided(aux0_hz, lin),
            etimer_hz: divided(aux0_hz, etimer),
            aux1_hz: divided(aux1_in_hz, self.ac1_divider),
        };

        if tree.per_hz > PER_CLK_MAX {
            return Err(ClockError::PerClockTooHigh);
        }
        if tree.sar_hz > SAR_CLK_MAX {
            return Err(ClockError::SarClockTooHigh);
        }
        if tree.ctu_hz > CTU_CLK_MAX {
            return Err(ClockError::CtuClockTooHigh);
        }
        if tree.dspi_hz > DSPI_CLK_MAX {
            return Err(ClockError::DspiClockTooHigh);
        }
        if tree.lin_hz > LIN_CLK_MAX {
            return Err(ClockError::LinClockTooHigh);
        }
        if tree.etimer_hz > ETIMER_CLK_MAX {
            return Err(ClockError::EtimerClockTooHigh);
        }

        Ok(tree)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig::DEFAULT
    }
}

const AC0_DIVIDERS: [Divider; 6] = [
    Divider::Ac0Dc0,
    Divider::Ac0Dc1,
    Divider::Ac0Dc2,
    Divider::Ac0Dc3,
    Divider::Ac0Dc4,
    Divider::Ac0Dc5,
];

// A disabled divider gates its clock.
fn divided(input_hz: u32, divider: u32) -> u32 {
    if divider == 0 {
        0
    } else {
        input_hz / divider
    }
}

/// Every clock point of a validated [`ClockConfig`], in Hz.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTree {
    pub irc_hz: u32,
    pub xosc_hz: u32,
    pub pll0_in_hz: u32,
    pub pll0_vco_hz: u32,
    pub pll0_phi_hz: u32,
    pub pll0_phi1_hz: u32,
    pub pll1_in_hz: u32,
    pub pll1_vco_hz: u32,
    pub pll1_phi_hz: u32,
    pub aux0_hz: u32,
    pub per_hz: u32,
    pub sar_hz: u32,
    pub ctu_hz: u32,
    pub dspi_hz: u32,
    pub lin_hz: u32,
    pub etimer_hz: u32,
    pub aux1_hz: u32,
}

impl ClockTree {
    /// Frequency of a clock source within this tree.
    pub fn source_hz(&self, source: ClockSource) -> u32 {
        match source {
            ClockSource::Irc => self.irc_hz,
            ClockSource::Xosc => self.xosc_hz,
            ClockSource::Pll0Phi => self.pll0_phi_hz,
            ClockSource::Pll0Phi1 => self.pll0_phi1_hz,
            ClockSource::Pll1Phi => self.pll1_phi_hz,
        }
    }

    /// Frequency of a SYSCLK selection, 0 when the system clock is off.
    pub fn system_clock(&self, sysclk: SystemClock) -> u32 {
        match sysclk {
            SystemClock::Irc => self.irc_hz,
            SystemClock::Xosc => self.xosc_hz,
            SystemClock::Pll0Phi => self.pll0_phi_hz,
            SystemClock::Pll1Phi => self.pll1_phi_hz,
            SystemClock::Disabled => 0,
        }
    }
}
