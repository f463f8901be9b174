//! Per-button edge capture with release debouncing.
//!
//! Buttons are active-low with a pull-up: a falling edge is a press, a
//! rising edge is a release. The interrupt side ([`ButtonSource::on_edge`])
//! only touches atomics and a [`Signal`]; everything that sleeps or logs
//! happens in the capture context ([`ButtonSource::run`]).

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::PinState;
use embedded_hal_async::delay::DelayNs;

use super::{ButtonId, ClassifiedEvent, EventChannel, PressKind};
use crate::config::DEBOUNCE_MS;
use crate::time::{elapsed_us, Clock};

/// Timestamp value meaning "no press recorded since the last release".
const NO_PRESS: u32 = 0;

pub struct ButtonSource<M: RawMutex> {
    id: ButtonId,
    /// Last known line level, `true` = high (released).
    line_high: AtomicBool,
    /// Falling-edge time in µs. Written by the interrupt side, read and
    /// cleared by the capture context.
    pressed_at_us: AtomicU32,
    /// Set by a release edge, cleared once its debounce window has passed.
    /// Falling edges inside that window are contact chatter and leave
    /// `pressed_at_us` alone.
    release_pending: AtomicBool,
    released: Signal<M, ()>,
}

impl<M: RawMutex> ButtonSource<M> {
    pub const fn new(id: ButtonId) -> Self {
        Self {
            id,
            line_high: AtomicBool::new(true),
            pressed_at_us: AtomicU32::new(NO_PRESS),
            release_pending: AtomicBool::new(false),
            released: Signal::new(),
        }
    }

    /// Record a line edge. Safe to call from interrupt context: no
    /// blocking, no allocation, no logging.
    pub fn on_edge(&self, level: PinState, now_us: u32) {
        match level {
            PinState::Low => {
                self.line_high.store(false, Ordering::Relaxed);
                if !self.release_pending.load(Ordering::Relaxed) {
                    self.pressed_at_us
                        .store(now_us.max(NO_PRESS + 1), Ordering::Relaxed);
                }
            }
            PinState::High => {
                self.line_high.store(true, Ordering::Relaxed);
                self.release_pending.store(true, Ordering::Relaxed);
                self.released.signal(());
            }
        }
    }

    /// Current line level as last reported by the interrupt side.
    pub fn level(&self) -> PinState {
        PinState::from(self.line_high.load(Ordering::Relaxed))
    }

    /// Wait for one release, debounce it and classify the press.
    ///
    /// Returns `None` when the line is no longer released after the
    /// debounce window (bounce or glitch), or when no press was recorded.
    /// Chatter inside the window never moves the press timestamp, so the
    /// hold is measured from the first falling edge.
    pub async fn capture<D: DelayNs, C: Clock>(
        &self,
        delay: &mut D,
        clock: &C,
    ) -> Option<ClassifiedEvent> {
        self.released.wait().await;

        delay.delay_ms(DEBOUNCE_MS).await;
        self.release_pending.store(false, Ordering::Relaxed);

        if self.level() != PinState::High {
            debug!("button {}: release bounced, ignoring", self.id.id_char());
            return None;
        }

        let pressed_at = self.pressed_at_us.swap(NO_PRESS, Ordering::Relaxed);
        if pressed_at == NO_PRESS {
            debug!("button {}: release without press", self.id.id_char());
            return None;
        }

        let duration = elapsed_us(pressed_at, clock.now_us());
        let kind = PressKind::classify(duration);
        debug!(
            "button {}: held {} us -> {}",
            self.id.id_char(),
            duration,
            kind
        );
        Some(ClassifiedEvent::new(self.id, kind))
    }

    /// Capture context main loop: debounce, classify and queue forever.
    pub async fn run<D: DelayNs, C: Clock, CM: RawMutex, const N: usize>(
        &self,
        delay: &mut D,
        clock: &C,
        events: &EventChannel<CM, N>,
    ) -> ! {
        info!("button {} capture started", self.id.id_char());
        loop {
            if let Some(event) = self.capture(delay, clock).await {
                events.try_push(event);
            }
        }
    }
}
