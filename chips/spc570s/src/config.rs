// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the chip initialisation.
//!
//! Everything [`Spc570s::init`](crate::chip::Spc570s::init) programs is
//! described by a [`HalConfig`]. Boards normally start from [`CONFIG`] and
//! override what they need:
//!
//! ```rust,ignore
//! const BOARD_CONFIG: HalConfig = HalConfig {
//!     clocks: ClockConfig {
//!         xosc_hz: 20_000_000,
//!         ..CONFIG.clocks
//!     },
//!     ..CONFIG
//! };
//! ```

use crate::clocks::ClockConfig;
use crate::mc_me::{mode_mask, ModeConfig, RunMode};

/// `ME_LP_PCn` value enabling a peripheral in both low power modes.
const LP_PC_HALT0_STOP0: u32 = mode_mask(&[RunMode::Halt0, RunMode::Stop0]);
/// `ME_RUN_PCn` value enabling a peripheral in DRUN and RUN0..3.
const RUN_PC_DRUN_RUN: u32 = mode_mask(&[
    RunMode::Drun,
    RunMode::Run0,
    RunMode::Run1,
    RunMode::Run2,
    RunMode::Run3,
]);

/// Chip initialisation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalConfig {
    pub clocks: ClockConfig,
    /// Leave clocks and modes as the boot code configured them.
    pub no_init: bool,
    pub disable_watchdog: bool,
    /// `SSCM_ERROR.PAE`: abort on illegal peripheral accesses.
    pub sscm_peripheral_abort: bool,
    /// `SSCM_ERROR.RAE`: abort on illegal register accesses.
    pub sscm_register_abort: bool,
    /// `ME_ME` value. RESET, SAFE, DRUN and RUN0 are always enabled.
    pub enabled_modes: u32,
    pub safe_mc: ModeConfig,
    pub drun_mc: ModeConfig,
    /// RUN0..RUN3
    pub run_mc: [ModeConfig; 4],
    pub halt0_mc: ModeConfig,
    pub stop0_mc: ModeConfig,
    pub run_pc: [u32; 8],
    pub lp_pc: [u32; 8],
}

impl HalConfig {
    /// Mode configuration registers in the order they are programmed.
    pub fn mode_configs(&self) -> [(RunMode, ModeConfig); 8] {
        [
            (RunMode::Safe, self.safe_mc),
            (RunMode::Drun, self.drun_mc),
            (RunMode::Run0, self.run_mc[0]),
            (RunMode::Run1, self.run_mc[1]),
            (RunMode::Run2, self.run_mc[2]),
            (RunMode::Run3, self.run_mc[3]),
            (RunMode::Halt0, self.halt0_mc),
            (RunMode::Stop0, self.stop0_mc),
        ]
    }
}

/// Defaults for every board, with the Cargo features folded in. This is the
/// only place where the crate reads Cargo features.
pub const CONFIG: HalConfig = HalConfig {
    clocks: ClockConfig {
        allow_overclock: cfg!(feature = "allow_overclock"),
        ..ClockConfig::DEFAULT
    },
    no_init: cfg!(feature = "no_init"),
    disable_watchdog: !cfg!(feature = "keep_watchdog"),
    sscm_peripheral_abort: true,
    sscm_register_abort: true,
    enabled_modes: mode_mask(&[
        RunMode::Run1,
        RunMode::Run2,
        RunMode::Run3,
        RunMode::Halt0,
        RunMode::Stop0,
    ]),
    safe_mc: ModeConfig::SAFE,
    drun_mc: ModeConfig::RUN,
    run_mc: [ModeConfig::RUN; 4],
    halt0_mc: ModeConfig::RUN,
    stop0_mc: ModeConfig::RUN,
    run_pc: [
        0,
        RUN_PC_DRUN_RUN | RunMode::Safe.bit(),
        RUN_PC_DRUN_RUN,
        RUN_PC_DRUN_RUN,
        RUN_PC_DRUN_RUN,
        RUN_PC_DRUN_RUN,
        RUN_PC_DRUN_RUN,
        RUN_PC_DRUN_RUN,
    ],
    lp_pc: [
        0,
        LP_PC_HALT0_STOP0,
        RunMode::Halt0.bit(),
        RunMode::Stop0.bit(),
        LP_PC_HALT0_STOP0,
        LP_PC_HALT0_STOP0,
        LP_PC_HALT0_STOP0,
        LP_PC_HALT0_STOP0,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_peripheral_sets() {
        assert_eq!(CONFIG.run_pc[0], 0);
        assert_eq!(CONFIG.run_pc[1], 0xFC);
        assert_eq!(CONFIG.run_pc[7], 0xF8);
        assert_eq!(CONFIG.lp_pc[1], 0x500);
        assert_eq!(CONFIG.lp_pc[2], 0x100);
        assert_eq!(CONFIG.lp_pc[3], 0x400);
        assert_eq!(CONFIG.enabled_modes, 0x5E0);
    }

    #[test]
    fn features_fold_into_config() {
        assert_eq!(CONFIG.no_init, cfg!(feature = "no_init"));
        assert_eq!(CONFIG.disable_watchdog, !cfg!(feature = "keep_watchdog"));
        assert_eq!(
            CONFIG.clocks.allow_overclock,
            cfg!(feature = "allow_overclock")
        );
    }

    #[test]
    fn mode_config_order() {
        let configs = CONFIG.mode_configs();
        assert_eq!(configs[0], (RunMode::Safe, ModeConfig::SAFE));
        assert_eq!(configs[7].0, RunMode::Stop0);
        assert!(CONFIG.clocks.validate().is_ok());
    }
}
