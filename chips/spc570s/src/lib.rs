// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register map and low level initialisation for the SPC570S MCU.
//!
//! Every on-chip module gets a `register_structs!` layout, its bitfields and
//! a `StaticRef` to its base address. System control modules (MC_ME, MC_CGM,
//! PLLDIG, SSCM, SWT) also carry the drivers [`chip::Spc570s::init`] uses to
//! bring up the clock tree.
//!
//! SPC570S: <https://www.st.com/en/automotive-microcontrollers/spc570s50e1.html>

#![crate_name = "spc570s"]
#![crate_type = "rlib"]
#![cfg_attr(target_arch = "powerpc", feature(asm_experimental_arch))]
#![cfg_attr(not(test), no_std)]
#![recursion_limit = "256"]

pub mod chip;
pub mod clocks;
pub mod config;
pub mod memory_map;
pub mod static_ref;

// System control
pub mod intc;
pub mod mc_cgm;
pub mod mc_me;
pub mod mc_rgm;
pub mod plldig;
pub mod pmc;
pub mod smpu;
pub mod sscm;
pub mod swt;
pub mod xosc;

// Peripherals
pub mod dmamux;
pub mod dspi;
pub mod edma;
pub mod flexcan;
pub mod flexray;
pub mod linflexd;
pub mod mcan;
pub mod pit;
pub mod psi5;
pub mod saradc;
pub mod sent;
pub mod siul2;
pub mod stm;

pub use chip::{counter_value, InitError, Spc570s};
pub use config::{HalConfig, CONFIG};
