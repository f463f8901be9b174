//! End-to-end tests: edges in, HID reports out, through the same types the
//! firmware wires together.

use core::cell::Cell;

use btnhid::actions::{Action, ActionTable};
use btnhid::dispatcher::{Dispatch, Dispatcher};
use btnhid::hid::{keypress_report, ConsumerCommand, HidReport, KeyboardReport};
use btnhid::input::{ButtonId, ButtonSource, ClassifiedEvent, EventChannel, PressKind};
use btnhid::session::{LinkState, SessionGate};
use btnhid::time::Clock;
use btnhid::transport::{ControlOp, ReportSink, TransportCommand, TransportEvent};
use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_hal::digital::PinState;
use embedded_hal_async::delay::DelayNs;

use critical_section as _;

type Cs = CriticalSectionRawMutex;

struct ManualClock {
    now: Cell<u32>,
}

impl Clock for ManualClock {
    fn now_us(&self) -> u32 {
        self.now.get()
    }
}

/// Advances the manual clock instead of sleeping.
struct ManualDelay<'a> {
    clock: &'a ManualClock,
}

impl DelayNs for ManualDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.clock.now.set(self.clock.now.get().wrapping_add(ns / 1_000));
    }
}

#[derive(Default)]
struct RecordingSink {
    reports: Vec<HidReport>,
}

impl ReportSink for RecordingSink {
    fn send_report(&mut self, report: &HidReport) {
        self.reports.push(*report);
    }
}

fn connected_gate() -> SessionGate<Cs> {
    let gate = SessionGate::new();
    assert_eq!(
        gate.handle(&TransportEvent::Started),
        Some(TransportCommand::StartAdvertising)
    );
    gate.handle(&TransportEvent::Connected);
    gate.handle(&TransportEvent::SecurityEstablished);
    gate
}

/// Press and release `source`, then run one capture pass into `events`.
fn press(
    source: &ButtonSource<Cs>,
    clock: &ManualClock,
    events: &EventChannel<Cs, 10>,
    down_at: u32,
    up_at: u32,
) {
    let mut delay = ManualDelay { clock };
    clock.now.set(down_at);
    source.on_edge(PinState::Low, down_at);
    clock.now.set(up_at);
    source.on_edge(PinState::High, up_at);

    if let Some(event) = block_on(source.capture(&mut delay, clock)) {
        events.try_push(event);
    }
}

#[test]
fn long_center_press_types_text_and_lowers_volume() {
    let events: EventChannel<Cs, 10> = EventChannel::new();
    let source: ButtonSource<Cs> = ButtonSource::new(ButtonId::Center);
    let clock = ManualClock { now: Cell::new(0) };

    press(&source, &clock, &events, 0, 1_200_000);
    let event = events.try_pop().expect("a classified event");
    assert_eq!(event, ClassifiedEvent::new(ButtonId::Center, PressKind::Long));

    let gate = connected_gate();
    let table = ActionTable::press_demo();
    let mut sink = RecordingSink::default();
    let mut dispatcher = Dispatcher::new(
        &events,
        &gate,
        &table,
        &mut sink,
        ManualDelay { clock: &clock },
    );
    assert_eq!(block_on(dispatcher.dispatch(event)), Dispatch::Sent(22));

    let reports = &sink.reports;
    assert_eq!(reports.len(), 22);
    assert_eq!(reports[0], HidReport::Keyboard(keypress_report('l')));
    assert_eq!(reports[1], HidReport::Keyboard(KeyboardReport::release()));
    assert_eq!(reports[20].to_bytes().as_slice(), &[0x80, 0x00]);
    assert_eq!(reports[21].to_bytes().as_slice(), &[0x00, 0x00]);
}

#[test]
fn short_press_is_dropped_while_disconnected() {
    let events: EventChannel<Cs, 10> = EventChannel::new();
    let source: ButtonSource<Cs> = ButtonSource::new(ButtonId::Up);
    let clock = ManualClock { now: Cell::new(0) };

    press(&source, &clock, &events, 5_000, 300_000);
    let event = events.try_pop().expect("a classified event");
    assert_eq!(event.kind, PressKind::Short);

    let gate: SessionGate<Cs> = SessionGate::new();
    gate.handle(&TransportEvent::Started);
    assert_eq!(gate.state(), LinkState::Advertising);

    let table = ActionTable::press_demo();
    let mut sink = RecordingSink::default();
    let mut dispatcher = Dispatcher::new(
        &events,
        &gate,
        &table,
        &mut sink,
        ManualDelay { clock: &clock },
    );
    assert_eq!(block_on(dispatcher.dispatch(event)), Dispatch::Dropped);
    assert!(sink.reports.is_empty());
}

#[test]
fn suspended_host_gets_nothing_until_resume() {
    const VOLUME_ONLY: &[Action] = &[Action::Consumer(ConsumerCommand::VolumeUp)];
    let table = ActionTable::empty().with_binding(ButtonId::Right, PressKind::Short, VOLUME_ONLY);
    let events: EventChannel<Cs, 10> = EventChannel::new();
    let gate = connected_gate();
    let clock = ManualClock { now: Cell::new(0) };
    let event = ClassifiedEvent::new(ButtonId::Right, PressKind::Short);

    let mut sink = RecordingSink::default();
    let mut dispatcher = Dispatcher::new(
        &events,
        &gate,
        &table,
        &mut sink,
        ManualDelay { clock: &clock },
    );

    gate.handle(&TransportEvent::Control(ControlOp::Suspend));
    assert_eq!(gate.state(), LinkState::SecuredSuspended);
    assert_eq!(block_on(dispatcher.dispatch(event)), Dispatch::Dropped);

    gate.handle(&TransportEvent::Control(ControlOp::Resume));
    assert_eq!(gate.state(), LinkState::SecuredActive);
    assert_eq!(block_on(dispatcher.dispatch(event)), Dispatch::Sent(2));

    assert_eq!(sink.reports.len(), 2);
    assert_eq!(sink.reports[0].to_bytes().as_slice(), &[0x40, 0x00]);
}

#[test]
fn disconnect_closes_gate_and_rearms_advertising() {
    let gate = connected_gate();
    assert!(gate.may_emit());

    let command = gate.handle(&TransportEvent::Disconnected { reason: 0x13 });
    assert_eq!(command, Some(TransportCommand::StartAdvertising));
    assert_eq!(gate.state(), LinkState::Advertising);
    assert!(!gate.may_emit());
}

#[test]
fn burst_beyond_capacity_keeps_oldest_events() {
    let events: EventChannel<Cs, 10> = EventChannel::new();
    let sources: [ButtonSource<Cs>; 5] = ButtonId::ALL.map(ButtonSource::new);
    let clock = ManualClock { now: Cell::new(0) };

    // 12 presses into a 10-slot queue with no consumer running.
    for i in 0..12u32 {
        let source = &sources[i as usize % sources.len()];
        let start = i * 500_000;
        press(source, &clock, &events, start, start + 100_000);
    }
    assert_eq!(events.len(), 10);

    let mut order = Vec::new();
    while let Some(event) = events.try_pop() {
        order.push(event.button);
    }
    let expected: Vec<ButtonId> = (0..10).map(|i| ButtonId::ALL[i % 5]).collect();
    assert_eq!(order, expected);
}
