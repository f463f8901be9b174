//! Boundary between the HID pipeline and the BLE stack.
//!
//! The BLE connection task translates stack callbacks into
//! [`TransportEvent`]s and feeds them to the
//! [`SessionGate`](crate::session::SessionGate), which answers with an
//! optional [`TransportCommand`]. Reports leave through a [`ReportSink`].

use heapless::Vec;

use crate::hid::{HidReport, MAX_REPORT_SIZE};

/// HID Control Point writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlOp {
    Suspend,
    Resume,
}

impl ControlOp {
    /// Decode a HID Control Point value (0 = suspend, 1 = exit suspend).
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(ControlOp::Suspend),
            1 => Some(ControlOp::Resume),
            _ => None,
        }
    }
}

/// HID Protocol Mode characteristic values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolMode {
    Boot,
    Report,
}

impl ProtocolMode {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(ProtocolMode::Boot),
            1 => Some(ProtocolMode::Report),
            _ => None,
        }
    }
}

/// Lifecycle callbacks from the BLE stack.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportEvent {
    /// Stack is up and ready to advertise.
    Started,
    /// A central connected.
    Connected,
    /// Link lost; `reason` is the HCI status code.
    Disconnected { reason: u8 },
    /// Pairing or bond re-encryption completed.
    SecurityEstablished,
    /// HID Control Point write.
    Control(ControlOp),
    /// Host wrote an output report (e.g. keyboard LEDs).
    OutputReport {
        report_id: u8,
        data: Vec<u8, MAX_REPORT_SIZE>,
    },
    /// Host wrote a feature report.
    FeatureReport {
        report_id: u8,
        data: Vec<u8, MAX_REPORT_SIZE>,
    },
    /// A bonded central asked to pair again.
    RepeatPairing,
    /// Host switched protocol mode.
    ProtocolMode(ProtocolMode),
}

/// What the gate asks the BLE stack to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportCommand {
    StartAdvertising,
    /// Forget the stored bond for this peer and let pairing proceed.
    DiscardBondAndRetryPairing,
}

/// Outbound HID reports. Fire-and-forget: an implementation may drop a
/// report it cannot queue, and never blocks the caller.
pub trait ReportSink {
    fn send_report(&mut self, report: &HidReport);
}

impl<T: ReportSink + ?Sized> ReportSink for &mut T {
    fn send_report(&mut self, report: &HidReport) {
        (**self).send_report(report)
    }
}
