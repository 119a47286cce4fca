//! Host-testable library interface for macropad.
//!
//! The scheduler, battery lookup, key-report and wake-cause logic are pure
//! and hardware-free, so they build and test on the host:
//! `cargo test` (no features needed).
//!
//! The embedded binary (`src/main.rs`, `--features embedded`) consumes
//! these same modules through this crate and adds the nRF52840 board and
//! SoftDevice wiring on top.

#![cfg_attr(not(test), no_std)]

pub mod battery;
pub mod config;
pub mod keys;
pub mod scheduler;
pub mod wake;

// Embedded-only: carries defmt formatting, so it only builds when the
// `defmt` feature (implied by `embedded`) is active.
#[cfg(feature = "defmt")]
pub mod error;
