//! What each classified button event turns into.
//!
//! An [`ActionTable`] maps `(button, press kind)` to an ordered list of
//! [`Action`]s. Tables are plain `const` data so they can live in flash.

use crate::config::BUTTON_COUNT;
use crate::hid::{ConsumerCommand, MouseReport};
use crate::input::{ButtonId, ClassifiedEvent, PressKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Type a string, one keystroke per character.
    Type(&'static str),
    /// Type a single character.
    Key(char),
    /// Press and release a consumer control.
    Consumer(ConsumerCommand),
    /// Send a pointer report; held buttons are released afterwards.
    Pointer(MouseReport),
}

const PRESS_KINDS: usize = 2;

#[derive(Clone, Copy, Debug)]
pub struct ActionTable {
    entries: [[&'static [Action]; PRESS_KINDS]; BUTTON_COUNT],
}

impl ActionTable {
    /// Table with no bindings: every event is consumed silently.
    pub const fn empty() -> Self {
        Self {
            entries: [[&[]; PRESS_KINDS]; BUTTON_COUNT],
        }
    }

    pub const fn with_binding(
        mut self,
        button: ButtonId,
        kind: PressKind,
        actions: &'static [Action],
    ) -> Self {
        self.entries[button.index()][kind.index()] = actions;
        self
    }

    /// Every button types its press kind, then nudges the volume:
    /// long press → `"long_press"` + volume down,
    /// short press → `"short_press"` + volume up.
    pub const fn press_demo() -> Self {
        const LONG: &[Action] = &[
            Action::Type("long_press"),
            Action::Consumer(ConsumerCommand::VolumeDown),
        ];
        const SHORT: &[Action] = &[
            Action::Type("short_press"),
            Action::Consumer(ConsumerCommand::VolumeUp),
        ];
        Self {
            entries: [[SHORT, LONG]; BUTTON_COUNT],
        }
    }

    pub fn lookup(&self, event: ClassifiedEvent) -> &'static [Action] {
        self.entries[event.button.index()][event.kind.index()]
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::press_demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_table_covers_every_button() {
        let table = ActionTable::press_demo();
        for button in ButtonId::ALL {
            assert_eq!(
                table.lookup(ClassifiedEvent::new(button, PressKind::Long)),
                &[
                    Action::Type("long_press"),
                    Action::Consumer(ConsumerCommand::VolumeDown)
                ]
            );
            assert_eq!(
                table.lookup(ClassifiedEvent::new(button, PressKind::Short)),
                &[
                    Action::Type("short_press"),
                    Action::Consumer(ConsumerCommand::VolumeUp)
                ]
            );
        }
    }

    #[test]
    fn binding_replaces_one_entry() {
        const PLAY: &[Action] = &[Action::Consumer(ConsumerCommand::Play)];
        let table = ActionTable::press_demo().with_binding(ButtonId::Center, PressKind::Short, PLAY);

        assert_eq!(
            table.lookup(ClassifiedEvent::new(ButtonId::Center, PressKind::Short)),
            PLAY
        );
        assert_eq!(
            table
                .lookup(ClassifiedEvent::new(ButtonId::Center, PressKind::Long))
                .len(),
            2
        );
        assert_eq!(
            table
                .lookup(ClassifiedEvent::new(ButtonId::Up, PressKind::Short))
                .first(),
            Some(&Action::Type("short_press"))
        );
    }

    #[test]
    fn empty_table_has_no_actions() {
        let table = ActionTable::empty();
        for button in ButtonId::ALL {
            assert!(table
                .lookup(ClassifiedEvent::new(button, PressKind::Long))
                .is_empty());
        }
    }

    #[test]
    fn const_table_builds_at_compile_time() {
        const NAV: ActionTable = ActionTable::empty()
            .with_binding(ButtonId::Up, PressKind::Short, &[Action::Key('w')])
            .with_binding(ButtonId::Down, PressKind::Short, &[Action::Key('s')]);
        assert_eq!(
            NAV.lookup(ClassifiedEvent::new(ButtonId::Down, PressKind::Short)),
            &[Action::Key('s')]
        );
    }
}
