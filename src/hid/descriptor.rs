//! HID Report Map served to the host, and a walker that reads it back.
//!
//! The walker decodes short items well enough to answer one question:
//! which input reports does this descriptor declare, what kind of
//! application collection owns each one, and how many bits long is it.
//! [`super::schema`] uses that answer to check `REPORT_MAP` against the
//! report schema at boot.
//!
//! ## Limitations
//!
//! - Nested collections are flattened; only Application collections
//!   decide the report kind
//! - Push/Pop state and long items are not supported
//! - Output and Feature items are skipped (the keyboard LED output
//!   report is not part of the input schema)

use heapless::Vec;

/// Most input reports the walker keeps track of.
pub const MAX_DESCRIBED_REPORTS: usize = 8;

/// Application collection that owns a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Keyboard,
    Mouse,
    Consumer,
}

/// Report Map for interface 0: keyboard (id 1), pointer (id 2) and
/// consumer control (id 3).
pub const REPORT_MAP: &[u8] = &[
    // Keyboard (Report ID 1)
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute) - modifiers
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x01, //   Input (Constant) - reserved
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x91, 0x02, //   Output (Data, Variable, Absolute) - LEDs
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant) - LED padding
    0x75, 0x08, //   Report Size (8)
    0x95, 0x06, //   Report Count (6)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x65, //   Logical Maximum (101)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0x65, //   Usage Maximum (101)
    0x81, 0x00, //   Input (Data, Array) - keycodes
    0xC0, // End Collection
    //
    // Pointer (Report ID 2)
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x02, //   Report ID (2)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x05, //     Usage Maximum (Button 5)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x05, //     Report Count (5)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute) - buttons
    0x95, 0x01, //     Report Count (1)
    0x75, 0x03, //     Report Size (3)
    0x81, 0x01, //     Input (Constant) - padding
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x03, //     Report Count (3)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection
    0xC0, // End Collection
    //
    // Consumer control (Report ID 3)
    0x05, 0x0C, // Usage Page (Consumer)
    0x09, 0x01, // Usage (Consumer Control)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x03, //   Report ID (3)
    0x09, 0x02, //   Usage (Numeric Key Pad)
    0xA1, 0x02, //   Collection (Logical)
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x0A, //     Usage Maximum (Button 10)
    0x15, 0x01, //     Logical Minimum (1)
    0x25, 0x0A, //     Logical Maximum (10)
    0x75, 0x04, //     Report Size (4)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x00, //     Input (Data, Array) - numeric
    0xC0, //   End Collection
    0x05, 0x0C, //   Usage Page (Consumer)
    0x09, 0x86, //   Usage (Channel)
    0x15, 0xFF, //   Logical Minimum (-1)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x02, //   Report Size (2)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x46, //   Input (Data, Variable, Relative, Null) - channel
    0x09, 0xE9, //   Usage (Volume Increment)
    0x09, 0xEA, //   Usage (Volume Decrement)
    0x15, 0x00, //   Logical Minimum (0)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable, Absolute) - volume
    0x09, 0xE2, //   Usage (Mute)
    0x09, 0x30, //   Usage (Power)
    0x09, 0x83, //   Usage (Recall Last)
    0x09, 0x81, //   Usage (Assign Selection)
    0x09, 0xB0, //   Usage (Play)
    0x09, 0xB1, //   Usage (Pause)
    0x09, 0xB2, //   Usage (Record)
    0x09, 0xB3, //   Usage (Fast Forward)
    0x09, 0xB4, //   Usage (Rewind)
    0x09, 0xB5, //   Usage (Scan Next Track)
    0x09, 0xB6, //   Usage (Scan Previous Track)
    0x09, 0xB7, //   Usage (Stop)
    0x15, 0x01, //   Logical Minimum (1)
    0x25, 0x0C, //   Logical Maximum (12)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x00, //   Input (Data, Array) - button
    0x09, 0x80, //   Usage (Selection)
    0xA1, 0x02, //   Collection (Logical)
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x03, //     Usage Maximum (Button 3)
    0x15, 0x01, //     Logical Minimum (1)
    0x25, 0x03, //     Logical Maximum (3)
    0x75, 0x02, //     Report Size (2)
    0x81, 0x00, //     Input (Data, Array) - selection
    0xC0, //   End Collection
    0x81, 0x03, //   Input (Constant) - padding
    0xC0, // End Collection
];

const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;
const USAGE_PAGE_CONSUMER: u16 = 0x0C;

const USAGE_MOUSE: u16 = 0x02;
const USAGE_KEYBOARD: u16 = 0x06;
const USAGE_CONSUMER_CONTROL: u16 = 0x01;

const COLLECTION_APPLICATION: u32 = 0x01;

/// One input report as declared by a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DescribedReport {
    pub report_id: u8,
    pub kind: ReportKind,
    /// Sum of `Report Size × Report Count` over every Input item.
    pub input_bits: u16,
}

impl DescribedReport {
    /// Input length rounded up to whole bytes.
    pub fn input_len(&self) -> u16 {
        self.input_bits.div_ceil(8)
    }
}

/// Input reports declared by a Report Map, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct HidDescriptor {
    reports: Vec<DescribedReport, MAX_DESCRIBED_REPORTS>,
}

impl HidDescriptor {
    pub fn reports(&self) -> &[DescribedReport] {
        &self.reports
    }

    pub fn report(&self, report_id: u8) -> Option<&DescribedReport> {
        self.reports.iter().find(|r| r.report_id == report_id)
    }

    /// Walk a Report Map.
    ///
    /// Input items outside a recognised Application collection are
    /// ignored. Truncated trailing items end the walk.
    pub fn parse(data: &[u8]) -> Self {
        let mut desc = HidDescriptor::default();

        // Global state
        let mut usage_page: u16 = 0;
        let mut report_id: u8 = 0;
        let mut report_size: u16 = 0;
        let mut report_count: u16 = 0;
        // Local state
        let mut usage: u16 = 0;
        // Collection state
        let mut depth: u8 = 0;
        let mut application: Option<ReportKind> = None;

        let mut i = 0;
        while i < data.len() {
            let prefix = data[i];
            let tag = (prefix >> 4) & 0x0F;
            let item_type = (prefix >> 2) & 0x03;
            let size = match prefix & 0x03 {
                0 => 0,
                1 => 1,
                2 => 2,
                _ => 4,
            };

            if i + 1 + size > data.len() {
                debug!("report map: truncated item at offset {}", i);
                break;
            }

            let value: u32 = match size {
                0 => 0,
                1 => data[i + 1] as u32,
                2 => u16::from_le_bytes([data[i + 1], data[i + 2]]) as u32,
                _ => u32::from_le_bytes([data[i + 1], data[i + 2], data[i + 3], data[i + 4]]),
            };

            match item_type {
                // Main items
                0 => {
                    match tag {
                        // Input
                        0x08 => {
                            if let Some(kind) = application {
                                let bits = report_size.saturating_mul(report_count);
                                desc.add_input(report_id, kind, bits);
                            }
                        }
                        // Collection
                        0x0A => {
                            if depth == 0 && value == COLLECTION_APPLICATION {
                                application = application_kind(usage_page, usage);
                            }
                            depth = depth.saturating_add(1);
                        }
                        // End Collection
                        0x0C => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                application = None;
                            }
                        }
                        _ => {}
                    }
                    usage = 0;
                }
                // Global items
                1 => match tag {
                    // Usage Page
                    0x00 => usage_page = value as u16,
                    // Report Size
                    0x07 => report_size = value as u16,
                    // Report ID
                    0x08 => report_id = value as u8,
                    // Report Count
                    0x09 => report_count = value as u16,
                    _ => {}
                },
                // Local items
                2 => {
                    if tag == 0x00 {
                        usage = value as u16;
                    }
                }
                _ => {}
            }

            i += 1 + size;
        }

        desc
    }

    fn add_input(&mut self, report_id: u8, kind: ReportKind, bits: u16) {
        if let Some(existing) = self.reports.iter_mut().find(|r| r.report_id == report_id) {
            existing.input_bits = existing.input_bits.saturating_add(bits);
            return;
        }
        let report = DescribedReport {
            report_id,
            kind,
            input_bits: bits,
        };
        if self.reports.push(report).is_err() {
            warn!("report map: more than {} input reports", MAX_DESCRIBED_REPORTS);
        }
    }
}

fn application_kind(usage_page: u16, usage: u16) -> Option<ReportKind> {
    match (usage_page, usage) {
        (USAGE_PAGE_GENERIC_DESKTOP, USAGE_KEYBOARD) => Some(ReportKind::Keyboard),
        (USAGE_PAGE_GENERIC_DESKTOP, USAGE_MOUSE) => Some(ReportKind::Mouse),
        (USAGE_PAGE_CONSUMER, USAGE_CONSUMER_CONTROL) => Some(ReportKind::Consumer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_map_declares_three_inputs() {
        let desc = HidDescriptor::parse(REPORT_MAP);
        let ids: std::vec::Vec<u8> = desc.reports().iter().map(|r| r.report_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn report_map_lengths() {
        let desc = HidDescriptor::parse(REPORT_MAP);

        let keyboard = desc.report(1).unwrap();
        assert_eq!(keyboard.kind, ReportKind::Keyboard);
        assert_eq!(keyboard.input_bits, 64);

        let mouse = desc.report(2).unwrap();
        assert_eq!(mouse.kind, ReportKind::Mouse);
        assert_eq!(mouse.input_len(), 4);

        let consumer = desc.report(3).unwrap();
        assert_eq!(consumer.kind, ReportKind::Consumer);
        assert_eq!(consumer.input_bits, 16);
    }

    #[test]
    fn boot_mouse_without_report_id() {
        // 3 buttons + 5 padding, X/Y, wheel
        let boot_mouse: &[u8] = &[
            0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, 0x09, 0x01, 0xA1, 0x00, 0x05, 0x09, 0x19, 0x01,
            0x29, 0x03, 0x15, 0x00, 0x25, 0x01, 0x95, 0x03, 0x75, 0x01, 0x81, 0x02, 0x95, 0x01,
            0x75, 0x05, 0x81, 0x01, 0x05, 0x01, 0x09, 0x30, 0x09, 0x31, 0x15, 0x81, 0x25, 0x7F,
            0x75, 0x08, 0x95, 0x02, 0x81, 0x06, 0x09, 0x38, 0x95, 0x01, 0x81, 0x06, 0xC0, 0xC0,
        ];
        let desc = HidDescriptor::parse(boot_mouse);
        let report = desc.report(0).unwrap();
        assert_eq!(report.kind, ReportKind::Mouse);
        assert_eq!(report.input_len(), 4);
    }

    #[test]
    fn output_items_do_not_count_as_input() {
        let keyboard_end = REPORT_MAP.iter().position(|&b| b == 0xC0).unwrap();
        let keyboard = &REPORT_MAP[..=keyboard_end];
        assert!(keyboard.windows(2).any(|w| w == [0x91, 0x02]));
        assert_eq!(HidDescriptor::parse(keyboard).report(1).unwrap().input_bits, 64);
    }

    #[test]
    fn inputs_outside_known_application_are_ignored() {
        // Vendor page application with one 8-bit input.
        let vendor: &[u8] = &[
            0x06, 0x00, 0xFF, 0x09, 0x01, 0xA1, 0x01, 0x85, 0x09, 0x75, 0x08, 0x95, 0x01, 0x81,
            0x02, 0xC0,
        ];
        assert!(HidDescriptor::parse(vendor).reports().is_empty());
    }

    #[test]
    fn truncated_descriptor_stops_walk() {
        let truncated = &REPORT_MAP[..REPORT_MAP.len() - 1];
        let desc = HidDescriptor::parse(&truncated[..8]);
        assert!(desc.reports().is_empty());
        // Dropping only the final End Collection keeps every input.
        assert_eq!(HidDescriptor::parse(truncated).reports().len(), 3);
    }
}
