//! Button input subsystem - edge capture, debounce, press classification.
//!
//! ## Components
//!
//! - **Source**: one [`ButtonSource`] per physical button. The interrupt
//!   side records edges; the capture context debounces the release and
//!   classifies the hold time.
//! - **Channel**: the bounded [`EventChannel`] carrying classified events
//!   to the dispatcher.

pub mod channel;
pub mod source;

pub use channel::EventChannel;
pub use source::ButtonSource;

use crate::config::LONG_PRESS_THRESHOLD_US;

/// Physical buttons on the remote (5-way navigation pad).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Up,
    Right,
    Down,
    Left,
    Center,
}

impl ButtonId {
    /// All buttons, in table order.
    pub const ALL: [ButtonId; 5] = [
        ButtonId::Up,
        ButtonId::Right,
        ButtonId::Down,
        ButtonId::Left,
        ButtonId::Center,
    ];

    /// Position in [`ButtonId::ALL`], used to index per-button tables.
    pub const fn index(self) -> usize {
        match self {
            ButtonId::Up => 0,
            ButtonId::Right => 1,
            ButtonId::Down => 2,
            ButtonId::Left => 3,
            ButtonId::Center => 4,
        }
    }

    /// Single-character identifier used in logs and configuration.
    pub const fn id_char(self) -> char {
        match self {
            ButtonId::Up => 'u',
            ButtonId::Right => 'r',
            ButtonId::Down => 'd',
            ButtonId::Left => 'l',
            ButtonId::Center => 'c',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id_char() == c)
    }
}

/// Hold-time class of a completed press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    Short,
    Long,
}

impl PressKind {
    /// Classify a hold time. Exactly the threshold counts as long.
    pub const fn classify(duration_us: u32) -> Self {
        if duration_us >= LONG_PRESS_THRESHOLD_US {
            PressKind::Long
        } else {
            PressKind::Short
        }
    }

    pub const fn index(self) -> usize {
        match self {
            PressKind::Short => 0,
            PressKind::Long => 1,
        }
    }
}

/// A debounced, classified button actuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassifiedEvent {
    pub button: ButtonId,
    pub kind: PressKind,
}

impl ClassifiedEvent {
    pub const fn new(button: ButtonId, kind: PressKind) -> Self {
        Self { button, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_threshold_is_inclusive() {
        assert_eq!(PressKind::classify(0), PressKind::Short);
        assert_eq!(PressKind::classify(999_999), PressKind::Short);
        assert_eq!(PressKind::classify(1_000_000), PressKind::Long);
        assert_eq!(PressKind::classify(1_000_001), PressKind::Long);
        assert_eq!(PressKind::classify(u32::MAX), PressKind::Long);
    }

    #[test]
    fn button_chars_roundtrip() {
        for button in ButtonId::ALL {
            assert_eq!(ButtonId::from_char(button.id_char()), Some(button));
        }
        assert_eq!(ButtonId::from_char('x'), None);
    }

    #[test]
    fn button_index_matches_table_order() {
        for (i, button) in ButtonId::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }
}
