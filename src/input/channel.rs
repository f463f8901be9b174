//! Bounded button-event queue between capture contexts and the dispatcher.
//!
//! Many producers (one per button), one consumer. Inserts never block:
//! when the queue is full the newest event is dropped and the producer
//! only learns about it through the returned `bool`.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use super::ClassifiedEvent;

pub struct EventChannel<M: RawMutex, const N: usize> {
    inner: Channel<M, ClassifiedEvent, N>,
}

impl<M: RawMutex, const N: usize> EventChannel<M, N> {
    pub const fn new() -> Self {
        Self {
            inner: Channel::new(),
        }
    }

    /// Queue an event without blocking.
    ///
    /// Returns `false` if the queue was full; the event is discarded and
    /// everything already queued is kept.
    pub fn try_push(&self, event: ClassifiedEvent) -> bool {
        match self.inner.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                debug!("event channel full - dropping {}", event);
                false
            }
        }
    }

    /// Wait for the next event. Only the dispatcher calls this.
    pub async fn pop(&self) -> ClassifiedEvent {
        self.inner.receive().await
    }

    pub fn try_pop(&self) -> Option<ClassifiedEvent> {
        self.inner.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<M: RawMutex, const N: usize> Default for EventChannel<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonId, PressKind};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn ev(button: ButtonId, kind: PressKind) -> ClassifiedEvent {
        ClassifiedEvent::new(button, kind)
    }

    #[test]
    fn overflow_drops_newest() {
        let channel: EventChannel<NoopRawMutex, 3> = EventChannel::new();
        assert!(channel.try_push(ev(ButtonId::Up, PressKind::Short)));
        assert!(channel.try_push(ev(ButtonId::Right, PressKind::Short)));
        assert!(channel.try_push(ev(ButtonId::Down, PressKind::Long)));

        // capacity + 1: rejected, nothing evicted
        assert!(!channel.try_push(ev(ButtonId::Left, PressKind::Long)));
        assert_eq!(channel.len(), channel.capacity());

        assert_eq!(channel.try_pop(), Some(ev(ButtonId::Up, PressKind::Short)));
        assert_eq!(channel.try_pop(), Some(ev(ButtonId::Right, PressKind::Short)));
        assert_eq!(channel.try_pop(), Some(ev(ButtonId::Down, PressKind::Long)));
        assert_eq!(channel.try_pop(), None);
    }

    #[test]
    fn pop_preserves_arrival_order() {
        let channel: EventChannel<NoopRawMutex, 4> = EventChannel::new();
        channel.try_push(ev(ButtonId::Center, PressKind::Long));
        channel.try_push(ev(ButtonId::Up, PressKind::Short));

        let first = embassy_futures::block_on(channel.pop());
        let second = embassy_futures::block_on(channel.pop());
        assert_eq!(first.button, ButtonId::Center);
        assert_eq!(second.button, ButtonId::Up);
        assert!(channel.is_empty());
    }

    #[test]
    fn space_frees_after_pop() {
        let channel: EventChannel<NoopRawMutex, 1> = EventChannel::new();
        assert!(channel.try_push(ev(ButtonId::Up, PressKind::Short)));
        assert!(!channel.try_push(ev(ButtonId::Down, PressKind::Short)));
        channel.try_pop();
        assert!(channel.try_push(ev(ButtonId::Down, PressKind::Short)));
    }
}
