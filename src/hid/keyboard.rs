//! HID keyboard input report (report id 1) and ASCII → keycode mapping.
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (HID usage codes)
//! ```
//!
//! Typing is always one key at a time, so only byte 2 is ever non-zero.

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

pub const MODIFIER_LEFT_SHIFT: u8 = 0x02;

const KEY_A: u8 = 0x04;
const KEY_1: u8 = 0x1E;
const KEY_0: u8 = 0x27;
const KEY_ENTER: u8 = 0x28;
const KEY_BACKSPACE: u8 = 0x2A;
const KEY_TAB: u8 = 0x2B;
const KEY_SPACE: u8 = 0x2C;
const KEY_MINUS: u8 = 0x2D;
const KEY_EQUAL: u8 = 0x2E;
const KEY_LEFT_BRACKET: u8 = 0x2F;
const KEY_RIGHT_BRACKET: u8 = 0x30;
const KEY_BACKSLASH: u8 = 0x31;
const KEY_SEMICOLON: u8 = 0x33;
const KEY_QUOTE: u8 = 0x34;
const KEY_GRAVE: u8 = 0x35;
const KEY_COMMA: u8 = 0x36;
const KEY_DOT: u8 = 0x37;
const KEY_SLASH: u8 = 0x38;

/// HID keyboard input report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte (always 0x00 per HID 1.11).
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// The all-keys-released report.
    pub const fn release() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// A report with one key held.
    pub const fn single(modifier: u8, keycode: u8) -> Self {
        Self {
            modifier,
            reserved: 0,
            keycodes: [keycode, 0, 0, 0, 0, 0],
        }
    }

    /// Serialise into a byte slice for transmission.
    /// Returns the number of bytes written (8, or 0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Returns `true` if no keys are pressed (release event).
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

/// Map a character to `(modifier, reserved, keycode)` on a US layout.
///
/// Characters without a key map to `(0, 0, 0)`, which encodes as a
/// harmless all-released report.
pub const fn char_to_keyboard_report(c: char) -> (u8, u8, u8) {
    const SHIFT: u8 = MODIFIER_LEFT_SHIFT;
    let (modifier, keycode) = match c {
        'a'..='z' => (0, KEY_A + (c as u8 - b'a')),
        'A'..='Z' => (SHIFT, KEY_A + (c as u8 - b'A')),
        '1'..='9' => (0, KEY_1 + (c as u8 - b'1')),
        '0' => (0, KEY_0),

        ' ' => (0, KEY_SPACE),
        '\n' | '\r' => (0, KEY_ENTER),
        '\t' => (0, KEY_TAB),
        '\u{8}' => (0, KEY_BACKSPACE),

        '.' => (0, KEY_DOT),
        '>' => (SHIFT, KEY_DOT),
        ',' => (0, KEY_COMMA),
        '<' => (SHIFT, KEY_COMMA),
        '/' => (0, KEY_SLASH),
        '?' => (SHIFT, KEY_SLASH),
        '\\' => (0, KEY_BACKSLASH),
        '|' => (SHIFT, KEY_BACKSLASH),
        '-' => (0, KEY_MINUS),
        '_' => (SHIFT, KEY_MINUS),
        '=' => (0, KEY_EQUAL),
        '+' => (SHIFT, KEY_EQUAL),
        ';' => (0, KEY_SEMICOLON),
        ':' => (SHIFT, KEY_SEMICOLON),
        '\'' => (0, KEY_QUOTE),
        '"' => (SHIFT, KEY_QUOTE),
        '[' => (0, KEY_LEFT_BRACKET),
        '{' => (SHIFT, KEY_LEFT_BRACKET),
        ']' => (0, KEY_RIGHT_BRACKET),
        '}' => (SHIFT, KEY_RIGHT_BRACKET),
        '`' => (0, KEY_GRAVE),
        '~' => (SHIFT, KEY_GRAVE),

        // Shifted digit row
        '!' => (SHIFT, KEY_1),
        '@' => (SHIFT, KEY_1 + 1),
        '#' => (SHIFT, KEY_1 + 2),
        '$' => (SHIFT, KEY_1 + 3),
        '%' => (SHIFT, KEY_1 + 4),
        '^' => (SHIFT, KEY_1 + 5),
        '&' => (SHIFT, KEY_1 + 6),
        '*' => (SHIFT, KEY_1 + 7),
        '(' => (SHIFT, KEY_1 + 8),
        ')' => (SHIFT, KEY_0),

        _ => (0, 0),
    };
    (modifier, 0, keycode)
}

/// Press report for `c`. The caller sends [`KeyboardReport::release`]
/// after `KEY_RELEASE_DELAY_MS`.
pub const fn keypress_report(c: char) -> KeyboardReport {
    let (modifier, _, keycode) = char_to_keyboard_report(c);
    KeyboardReport::single(modifier, keycode)
}

/// One typed character: the press report and its matching release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Keystroke {
    pub press: KeyboardReport,
    pub release: KeyboardReport,
}

/// Lazy press/release pairs for a string, in character order.
///
/// Cloning restarts from the current position; the sequence ends after
/// the last character.
#[derive(Clone, Debug)]
pub struct KeypressSequence<'a> {
    chars: core::str::Chars<'a>,
}

impl Iterator for KeypressSequence<'_> {
    type Item = Keystroke;

    fn next(&mut self) -> Option<Keystroke> {
        self.chars.next().map(|c| Keystroke {
            press: keypress_report(c),
            release: KeyboardReport::release(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chars.size_hint()
    }
}

pub fn string_to_keypress_sequence(s: &str) -> KeypressSequence<'_> {
    KeypressSequence { chars: s.chars() }
}
