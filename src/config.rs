//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, queue capacities, and BLE/HID identity
//! constants live here so they can be tuned in one place.

// Buttons

/// Number of physical buttons on the remote.
pub const BUTTON_COUNT: usize = 5;

/// Debounce window applied after a release edge (ms).
pub const DEBOUNCE_MS: u32 = 20;

/// Hold time at or above which a press is classified as long (µs).
pub const LONG_PRESS_THRESHOLD_US: u32 = 1_000_000;

/// Capacity of the button → dispatcher event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 10;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button UP      → P0.11  ('u')
//   Button RIGHT   → P0.12  ('r')
//   Button DOWN    → P0.24  ('d')
//   Button LEFT    → P0.25  ('l')
//   Button CENTER  → P0.26  ('c')

// HID report pacing

/// Delay between a key/consumer press report and its release report (ms).
pub const KEY_RELEASE_DELAY_MS: u32 = 20;

/// Delay after each typed character before the next one (ms).
pub const INTER_CHAR_DELAY_MS: u32 = 50;

/// Capacity of the dispatcher → BLE connection outbound report queue.
pub const OUTBOUND_REPORT_CAPACITY: usize = 16;

// BLE

/// GAP device name, also used as the complete local name in advertising.
pub const BLE_DEVICE_NAME: &str = "BtnHID Remote";

/// GAP appearance: HID keyboard (0x03C1).
pub const BLE_APPEARANCE: u16 = 0x03C1;

/// Advertising interval (in 0.625 ms units). 48 = 30 ms.
pub const BLE_ADV_INTERVAL: u32 = 48;

/// Advertising timeout (in 10 ms units). 18000 = 180 s, the HID maximum.
pub const BLE_ADV_TIMEOUT: u16 = 18_000;

/// Maximum number of bonded hosts kept in RAM.
pub const MAX_BONDED_PEERS: usize = 4;

/// Bytes reserved per bond for GATT system attributes (CCCD values).
pub const SYS_ATTRS_CAPACITY: usize = 62;

// HID identity (Device Information / PnP ID)

pub const HID_VENDOR_ID: u16 = 0x16C0;
pub const HID_PRODUCT_ID: u16 = 0x05DF;
pub const HID_VERSION: u16 = 0x0100;
