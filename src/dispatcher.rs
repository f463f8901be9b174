//! Single consumer of the event channel: gate check, action lookup and
//! report emission.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::actions::{Action, ActionTable};
use crate::config::{INTER_CHAR_DELAY_MS, KEY_RELEASE_DELAY_MS};
use crate::hid::{
    keypress_report, string_to_keypress_sequence, ConsumerReport, HidReport, KeyboardReport,
    MouseReport,
};
use crate::input::{ClassifiedEvent, EventChannel};
use crate::session::SessionGate;
use crate::transport::ReportSink;

/// Outcome of dispatching one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// The gate was closed; nothing was sent.
    Dropped,
    /// Number of reports handed to the sink.
    Sent(usize),
}

pub struct Dispatcher<'a, M: RawMutex, S: ReportSink, D: DelayNs, const N: usize> {
    events: &'a EventChannel<M, N>,
    gate: &'a SessionGate<M>,
    actions: &'a ActionTable,
    sink: S,
    delay: D,
}

impl<'a, M: RawMutex, S: ReportSink, D: DelayNs, const N: usize> Dispatcher<'a, M, S, D, N> {
    pub fn new(
        events: &'a EventChannel<M, N>,
        gate: &'a SessionGate<M>,
        actions: &'a ActionTable,
        sink: S,
        delay: D,
    ) -> Self {
        Self {
            events,
            gate,
            actions,
            sink,
            delay,
        }
    }

    /// Consume events forever.
    pub async fn run(&mut self) -> ! {
        info!("dispatcher started");
        loop {
            let event = self.events.pop().await;
            self.dispatch(event).await;
        }
    }

    /// Emit every action bound to `event`, or drop it if the link may
    /// not carry reports right now.
    pub async fn dispatch(&mut self, event: ClassifiedEvent) -> Dispatch {
        if !self.gate.may_emit() {
            debug!("dispatch: link not ready, dropping {}", event);
            return Dispatch::Dropped;
        }

        let mut sent = 0;
        for action in self.actions.lookup(event) {
            sent += self.perform(action).await;
        }
        debug!("dispatch: {} -> {} reports", event, sent);
        Dispatch::Sent(sent)
    }

    async fn perform(&mut self, action: &Action) -> usize {
        match *action {
            Action::Type(text) => {
                let mut sent = 0;
                for keystroke in string_to_keypress_sequence(text) {
                    sent += self.tap(keystroke.press.into(), keystroke.release.into()).await;
                    self.delay.delay_ms(INTER_CHAR_DELAY_MS).await;
                }
                sent
            }
            Action::Key(c) => {
                let sent = self
                    .tap(keypress_report(c).into(), KeyboardReport::release().into())
                    .await;
                self.delay.delay_ms(INTER_CHAR_DELAY_MS).await;
                sent
            }
            Action::Consumer(command) => {
                self.tap(
                    ConsumerReport::press(command).into(),
                    ConsumerReport::empty().into(),
                )
                .await
            }
            Action::Pointer(report) => {
                if report.buttons != 0 {
                    self.tap(report.into(), MouseReport::empty().into()).await
                } else {
                    self.sink.send_report(&report.into());
                    1
                }
            }
        }
    }

    /// Press, hold for `KEY_RELEASE_DELAY_MS`, release.
    async fn tap(&mut self, press: HidReport, release: HidReport) -> usize {
        self.sink.send_report(&press);
        self.delay.delay_ms(KEY_RELEASE_DELAY_MS).await;
        self.sink.send_report(&release);
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::{pointer_report, ConsumerCommand};
    use crate::input::{ButtonId, PressKind};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[derive(Default)]
    struct RecordingSink {
        reports: Vec<HidReport>,
    }

    impl ReportSink for RecordingSink {
        fn send_report(&mut self, report: &HidReport) {
            self.reports.push(*report);
        }
    }

    /// Sums requested sleeps instead of sleeping.
    #[derive(Default)]
    struct TallyDelay {
        total_ms: u32,
    }

    impl DelayNs for TallyDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
        }
    }

    fn open_gate() -> SessionGate<NoopRawMutex> {
        let gate = SessionGate::new();
        gate.on_start();
        gate.on_connect();
        gate.on_security_established();
        gate
    }

    fn long(button: ButtonId) -> ClassifiedEvent {
        ClassifiedEvent::new(button, PressKind::Long)
    }

    #[test]
    fn long_press_types_and_lowers_volume() {
        let events: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        let gate = open_gate();
        let table = ActionTable::press_demo();
        let mut sink = RecordingSink::default();
        let mut delay = TallyDelay::default();

        let mut dispatcher = Dispatcher::new(&events, &gate, &table, &mut sink, &mut delay);
        let outcome = block_on(dispatcher.dispatch(long(ButtonId::Center)));
        assert_eq!(outcome, Dispatch::Sent(22));

        let reports = &sink.reports;
        assert_eq!(reports.len(), 22);
        assert_eq!(reports[0], HidReport::Keyboard(keypress_report('l')));
        assert_eq!(reports[1], HidReport::Keyboard(KeyboardReport::release()));
        // "long_press": '_' is shifted minus
        assert_eq!(
            reports[8],
            HidReport::Keyboard(KeyboardReport::single(0x02, 0x2D))
        );
        assert_eq!(reports[20].to_bytes().as_slice(), &[0x80, 0x00]);
        assert_eq!(reports[21].to_bytes().as_slice(), &[0x00, 0x00]);

        // 10 characters × (20 + 50) ms, then one consumer hold
        assert_eq!(delay.total_ms, 10 * 70 + 20);
    }

    #[test]
    fn short_press_raises_volume() {
        let events: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        let gate = open_gate();
        let table = ActionTable::press_demo();
        let mut sink = RecordingSink::default();

        let mut dispatcher =
            Dispatcher::new(&events, &gate, &table, &mut sink, TallyDelay::default());
        let outcome = block_on(dispatcher.dispatch(ClassifiedEvent::new(
            ButtonId::Up,
            PressKind::Short,
        )));
        assert_eq!(outcome, Dispatch::Sent(24));
        assert_eq!(
            sink.reports[22],
            HidReport::Consumer(ConsumerReport::press(ConsumerCommand::VolumeUp))
        );
    }

    #[test]
    fn closed_gate_drops_event() {
        let events: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        let gate: SessionGate<NoopRawMutex> = SessionGate::new();
        gate.on_start();
        gate.on_connect();
        let table = ActionTable::press_demo();
        let mut sink = RecordingSink::default();

        let mut dispatcher =
            Dispatcher::new(&events, &gate, &table, &mut sink, TallyDelay::default());
        assert_eq!(
            block_on(dispatcher.dispatch(long(ButtonId::Left))),
            Dispatch::Dropped
        );
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn unmapped_character_still_sends_noop_press() {
        const TABLE: ActionTable =
            ActionTable::empty().with_binding(ButtonId::Down, PressKind::Long, &[Action::Key('é')]);
        let events: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        let gate = open_gate();
        let mut sink = RecordingSink::default();

        let mut dispatcher =
            Dispatcher::new(&events, &gate, &TABLE, &mut sink, TallyDelay::default());
        assert_eq!(
            block_on(dispatcher.dispatch(long(ButtonId::Down))),
            Dispatch::Sent(2)
        );
        assert!(sink
            .reports
            .iter()
            .all(|r| *r == HidReport::Keyboard(KeyboardReport::release())));
    }

    #[test]
    fn pointer_click_is_released() {
        const TABLE: ActionTable = ActionTable::empty()
            .with_binding(
                ButtonId::Center,
                PressKind::Short,
                &[Action::Pointer(pointer_report(1, 0, 0, 0))],
            )
            .with_binding(
                ButtonId::Right,
                PressKind::Short,
                &[Action::Pointer(pointer_report(0, 10, 0, 0))],
            );
        let events: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        let gate = open_gate();
        let mut sink = RecordingSink::default();

        let mut dispatcher =
            Dispatcher::new(&events, &gate, &TABLE, &mut sink, TallyDelay::default());
        let click = block_on(dispatcher.dispatch(ClassifiedEvent::new(
            ButtonId::Center,
            PressKind::Short,
        )));
        let nudge = block_on(dispatcher.dispatch(ClassifiedEvent::new(
            ButtonId::Right,
            PressKind::Short,
        )));
        assert_eq!(click, Dispatch::Sent(2));
        assert_eq!(nudge, Dispatch::Sent(1));
        assert_eq!(sink.reports[1], HidReport::Mouse(MouseReport::empty()));
        assert_eq!(sink.reports[2], HidReport::Mouse(pointer_report(0, 10, 0, 0)));
    }

    #[test]
    fn unbound_event_sends_nothing() {
        let events: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        let gate = open_gate();
        let table = ActionTable::empty();
        let mut sink = RecordingSink::default();

        let mut dispatcher =
            Dispatcher::new(&events, &gate, &table, &mut sink, TallyDelay::default());
        assert_eq!(
            block_on(dispatcher.dispatch(long(ButtonId::Up))),
            Dispatch::Sent(0)
        );
    }
}
