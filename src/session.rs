//! Link session gate: decides whether the dispatcher may send reports.
//!
//! Written only from the BLE connection context (through [`SessionGate::handle`]
//! or the `on_*` methods), read by the dispatcher through
//! [`SessionGate::may_emit`]. The state lives in a `blocking_mutex::Mutex`
//! so both sides can share a `&'static SessionGate`.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::transport::{ControlOp, TransportCommand, TransportEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Advertising,
    ConnectedUnsecured,
    SecuredActive,
    SecuredSuspended,
    Disconnected,
}

impl LinkState {
    pub fn is_connected(self) -> bool {
        matches!(
            self,
            LinkState::ConnectedUnsecured | LinkState::SecuredActive | LinkState::SecuredSuspended
        )
    }
}

/// Snapshot of the link as seen by report producers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionState {
    pub connected: bool,
    /// True after security is established or the host resumes, false
    /// after a suspend or a disconnect.
    pub output_enabled: bool,
}

pub struct SessionGate<M: RawMutex> {
    state: Mutex<M, Cell<LinkState>>,
}

impl<M: RawMutex> SessionGate<M> {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(LinkState::Disconnected)),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state.lock(|s| s.get())
    }

    fn set(&self, next: LinkState) {
        self.state.lock(|s| {
            let prev = s.replace(next);
            if prev != next {
                debug!("session: {} -> {}", prev, next);
            }
        });
    }

    /// Move to `next` only if the current state satisfies `allowed`.
    fn transition(&self, allowed: impl Fn(LinkState) -> bool, next: LinkState) -> bool {
        self.state.lock(|s| {
            let prev = s.get();
            if allowed(prev) {
                s.set(next);
                if prev != next {
                    debug!("session: {} -> {}", prev, next);
                }
                true
            } else {
                false
            }
        })
    }

    /// Reports may be sent only on a secured, non-suspended link.
    pub fn may_emit(&self) -> bool {
        self.state() == LinkState::SecuredActive
    }

    pub fn session_state(&self) -> SessionState {
        let state = self.state();
        SessionState {
            connected: state.is_connected(),
            output_enabled: state == LinkState::SecuredActive,
        }
    }

    pub fn on_start(&self) -> TransportCommand {
        self.set(LinkState::Advertising);
        TransportCommand::StartAdvertising
    }

    /// A late connect notification never downgrades a link that has
    /// already been secured.
    pub fn on_connect(&self) {
        if !self.transition(|s| !s.is_connected(), LinkState::ConnectedUnsecured) {
            debug!("session: connect in {} ignored", self.state());
        }
    }

    /// Security callbacks come from the radio event loop and can overtake
    /// the connect notification, so `Advertising` is accepted too.
    pub fn on_security_established(&self) {
        if !self.transition(
            |s| matches!(s, LinkState::ConnectedUnsecured | LinkState::Advertising),
            LinkState::SecuredActive,
        ) {
            debug!("session: security update in {} ignored", self.state());
        }
    }

    pub fn on_control(&self, op: ControlOp) {
        let applied = match op {
            ControlOp::Suspend => {
                self.transition(|s| s == LinkState::SecuredActive, LinkState::SecuredSuspended)
            }
            ControlOp::Resume => {
                self.transition(|s| s == LinkState::SecuredSuspended, LinkState::SecuredActive)
            }
        };
        if !applied {
            debug!("session: {} in {} ignored", op, self.state());
        }
    }

    /// The link is gone: advertising restarts right away.
    pub fn on_disconnect(&self, reason: u8) -> TransportCommand {
        info!("session: disconnected, reason {=u8:#x}", reason);
        self.set(LinkState::Disconnected);
        self.set(LinkState::Advertising);
        TransportCommand::StartAdvertising
    }

    /// A bonded peer is pairing again. Its old keys are dropped so it can
    /// reconnect, at the cost of trusting the new pairing.
    pub fn on_repeat_pairing(&self) -> TransportCommand {
        warn!("session: repeat pairing, discarding stored bond");
        TransportCommand::DiscardBondAndRetryPairing
    }

    /// Route one transport callback.
    pub fn handle(&self, event: &TransportEvent) -> Option<TransportCommand> {
        match event {
            TransportEvent::Started => Some(self.on_start()),
            TransportEvent::Connected => {
                self.on_connect();
                None
            }
            TransportEvent::Disconnected { reason } => Some(self.on_disconnect(*reason)),
            TransportEvent::SecurityEstablished => {
                self.on_security_established();
                None
            }
            TransportEvent::Control(op) => {
                self.on_control(*op);
                None
            }
            TransportEvent::RepeatPairing => Some(self.on_repeat_pairing()),
            TransportEvent::OutputReport { report_id, data } => {
                debug!("output report {}: {=[u8]:x}", report_id, data.as_slice());
                None
            }
            TransportEvent::FeatureReport { report_id, data } => {
                debug!("feature report {}: {=[u8]:x}", report_id, data.as_slice());
                None
            }
            TransportEvent::ProtocolMode(mode) => {
                info!("protocol mode: {}", mode);
                None
            }
        }
    }
}

impl<M: RawMutex> Default for SessionGate<M> {
    fn default() -> Self {
        Self::new()
    }
}
