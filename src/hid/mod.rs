//! HID report types, encoders and the Report Map.

pub mod consumer;
pub mod descriptor;
pub mod keyboard;
pub mod mouse;
pub mod schema;

pub use consumer::{consumer_command_report, ConsumerCommand, ConsumerReport};
pub use descriptor::{ReportKind, REPORT_MAP};
pub use keyboard::{
    char_to_keyboard_report, keypress_report, string_to_keypress_sequence, KeyboardReport,
};
pub use mouse::{pointer_report, MouseReport};

/// Largest report payload (keyboard).
pub const MAX_REPORT_SIZE: usize = keyboard::KEYBOARD_REPORT_SIZE;

/// An input report ready for the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    Keyboard(KeyboardReport),
    Mouse(MouseReport),
    Consumer(ConsumerReport),
}

impl HidReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            HidReport::Keyboard(_) => ReportKind::Keyboard,
            HidReport::Mouse(_) => ReportKind::Mouse,
            HidReport::Consumer(_) => ReportKind::Consumer,
        }
    }

    pub fn report_id(&self) -> u8 {
        schema::schema_for(self.kind()).report_id
    }

    /// Payload length in bytes.
    pub fn payload_len(&self) -> usize {
        schema::schema_for(self.kind()).len
    }

    /// Serialise the payload (without report id).
    /// Returns the number of bytes written, or 0 if `buf` is too small.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match self {
            HidReport::Keyboard(r) => r.serialize(buf),
            HidReport::Mouse(r) => r.serialize(buf),
            HidReport::Consumer(r) => r.serialize(buf),
        }
    }

    pub fn to_bytes(&self) -> heapless::Vec<u8, MAX_REPORT_SIZE> {
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let n = self.serialize(&mut buf);
        let mut out = heapless::Vec::new();
        // n <= MAX_REPORT_SIZE, cannot overflow
        let _ = out.extend_from_slice(&buf[..n]);
        out
    }
}

impl From<KeyboardReport> for HidReport {
    fn from(r: KeyboardReport) -> Self {
        HidReport::Keyboard(r)
    }
}

impl From<MouseReport> for HidReport {
    fn from(r: MouseReport) -> Self {
        HidReport::Mouse(r)
    }
}

impl From<ConsumerReport> for HidReport {
    fn from(r: ConsumerReport) -> Self {
        HidReport::Consumer(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_ids_follow_schema() {
        assert_eq!(HidReport::from(KeyboardReport::release()).report_id(), 1);
        assert_eq!(HidReport::from(MouseReport::empty()).report_id(), 2);
        assert_eq!(HidReport::from(ConsumerReport::empty()).report_id(), 3);
    }

    #[test]
    fn to_bytes_length_matches_schema() {
        let reports = [
            HidReport::from(keypress_report('a')),
            HidReport::from(pointer_report(1, 2, 3, 4)),
            HidReport::from(ConsumerReport::press(ConsumerCommand::Mute)),
        ];
        for report in reports {
            assert_eq!(report.to_bytes().len(), report.payload_len());
        }
    }

    #[test]
    fn consumer_to_bytes() {
        let report = HidReport::from(ConsumerReport::press(ConsumerCommand::VolumeDown));
        assert_eq!(report.to_bytes().as_slice(), &[0x80, 0x00]);
    }
}
