//! btnhid - five-button BLE HID remote.
//!
//! Host-testable core of the firmware: everything between a GPIO edge and
//! an encoded HID report lives here, with no dependency on the radio
//! stack or the nRF HAL.
//!
//! ```text
//! GPIO edge ─► ButtonSource ─► EventChannel ─► Dispatcher ─► ReportSink
//!              (debounce,       (bounded,        │ (SessionGate,
//!               classify)        drop newest)    │  ActionTable)
//!                                                ▼
//!                                              hid:: encoders
//! ```
//!
//! Usage: `cargo test --lib` on the host; the embedded binary in
//! `main.rs` is built with `--features embedded`.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod actions;
pub mod bonds;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hid;
pub mod input;
pub mod session;
pub mod time;
pub mod transport;

pub use error::Error;

// Host tests link the `std` critical-section implementation.
#[cfg(test)]
use critical_section as _;
