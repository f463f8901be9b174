//! Static report schema and the boot-time Report Map check.

use super::descriptor::{HidDescriptor, ReportKind, REPORT_MAP};
use super::{consumer, keyboard, mouse};
use crate::error::ReportMapError;

/// One input report the device sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportSchema {
    pub report_id: u8,
    pub kind: ReportKind,
    /// Payload length in bytes, without the report id.
    pub len: usize,
}

pub const KEYBOARD_REPORT_ID: u8 = 1;
pub const MOUSE_REPORT_ID: u8 = 2;
pub const CONSUMER_REPORT_ID: u8 = 3;

pub const REPORT_SCHEMA: [ReportSchema; 3] = [
    ReportSchema {
        report_id: KEYBOARD_REPORT_ID,
        kind: ReportKind::Keyboard,
        len: keyboard::KEYBOARD_REPORT_SIZE,
    },
    ReportSchema {
        report_id: MOUSE_REPORT_ID,
        kind: ReportKind::Mouse,
        len: mouse::MOUSE_REPORT_SIZE,
    },
    ReportSchema {
        report_id: CONSUMER_REPORT_ID,
        kind: ReportKind::Consumer,
        len: consumer::CONSUMER_REPORT_SIZE,
    },
];

/// Schema entry for a report kind.
pub fn schema_for(kind: ReportKind) -> &'static ReportSchema {
    match kind {
        ReportKind::Keyboard => &REPORT_SCHEMA[0],
        ReportKind::Mouse => &REPORT_SCHEMA[1],
        ReportKind::Consumer => &REPORT_SCHEMA[2],
    }
}

/// Check that [`REPORT_MAP`] declares exactly [`REPORT_SCHEMA`].
pub fn check_report_map() -> Result<(), ReportMapError> {
    check_descriptor(REPORT_MAP)
}

/// Check any descriptor against [`REPORT_SCHEMA`].
pub fn check_descriptor(data: &[u8]) -> Result<(), ReportMapError> {
    let desc = HidDescriptor::parse(data);

    for expected in REPORT_SCHEMA.iter() {
        let found = desc
            .report(expected.report_id)
            .ok_or(ReportMapError::MissingReport(expected.report_id))?;
        if found.kind != expected.kind {
            return Err(ReportMapError::WrongKind(expected.report_id));
        }
        if found.input_bits as usize != expected.len * 8 {
            return Err(ReportMapError::WrongLength {
                report_id: expected.report_id,
                declared: found.input_len(),
            });
        }
    }

    if let Some(extra) = desc
        .reports()
        .iter()
        .find(|r| !REPORT_SCHEMA.iter().any(|s| s.report_id == r.report_id))
    {
        return Err(ReportMapError::UnexpectedReport(extra.report_id));
    }

    Ok(())
}
