//! GATT server: Device Information and HID over GATT.

use btnhid::config::{HID_PRODUCT_ID, HID_VENDOR_ID, HID_VERSION};
use btnhid::hid::{HidReport, REPORT_MAP};
use nrf_softdevice::ble::gatt_server::NotifyValueError;
use nrf_softdevice::ble::Connection;

/// PnP ID: vendor id source (0x02 = USB-IF), VID, PID, version, all LE.
const PNP_ID: [u8; 7] = [
    0x02,
    HID_VENDOR_ID as u8,
    (HID_VENDOR_ID >> 8) as u8,
    HID_PRODUCT_ID as u8,
    (HID_PRODUCT_ID >> 8) as u8,
    HID_VERSION as u8,
    (HID_VERSION >> 8) as u8,
];

#[nrf_softdevice::gatt_service(uuid = "180A")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2A50", initial_value = "PNP_ID", read)]
    pub pnp_id: [u8; 7],
}

const NO_DATA: &[u8] = &[];

// Report Reference descriptors: [report id, type (1 = input, 2 = output)]
const KEYBOARD_INPUT_REF: [u8; 2] = [1, 1];
const KEYBOARD_OUTPUT_REF: [u8; 2] = [1, 2];
const MOUSE_INPUT_REF: [u8; 2] = [2, 1];
const CONSUMER_INPUT_REF: [u8; 2] = [3, 1];

const HID_INFORMATION_VALUE: [u8; 4] = [
    BCD_HID as u8,
    (BCD_HID >> 8) as u8,
    COUNTRY_CODE,
    FLAGS,
];
const PROTOCOL_MODE_REPORT: u8 = 1;

const COUNTRY_CODE: u8 = 0;
const HID_INFO_FLAG_REMOTE_WAKE_MSK: u8 = 0x1;
const HID_INFO_FLAG_NORMALLY_CONNECTABLE_MSK: u8 = 0x2;
const FLAGS: u8 = HID_INFO_FLAG_REMOTE_WAKE_MSK | HID_INFO_FLAG_NORMALLY_CONNECTABLE_MSK;
const BCD_HID: u16 = 0x0111;

#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    #[characteristic(uuid = "2A4B", initial_value = "REPORT_MAP", security = "mitm", read)]
    pub report_map: [u8; REPORT_MAP.len()],
    #[characteristic(uuid = "2A4A", initial_value = "HID_INFORMATION_VALUE", security = "mitm", read)]
    pub hid_information: [u8; 4],
    #[characteristic(uuid = "2A4C", security = "mitm", write_without_response)]
    pub control_point: u8,
    #[characteristic(
        uuid = "2A4E",
        initial_value = "PROTOCOL_MODE_REPORT",
        security = "mitm",
        read,
        write_without_response
    )]
    pub protocol_mode: u8,
    #[characteristic(
        uuid = "2A4D",
        initial_value = "NO_DATA",
        security = "mitm",
        read,
        notify,
        descriptor(uuid = "2908", security = "mitm", value = "KEYBOARD_INPUT_REF")
    )]
    pub keyboard_input: [u8; 8],
    #[characteristic(
        uuid = "2A4D",
        initial_value = "NO_DATA",
        security = "mitm",
        read,
        write,
        write_without_response,
        descriptor(uuid = "2908", security = "mitm", value = "KEYBOARD_OUTPUT_REF")
    )]
    pub keyboard_output: u8,
    #[characteristic(
        uuid = "2A4D",
        initial_value = "NO_DATA",
        security = "mitm",
        read,
        notify,
        descriptor(uuid = "2908", security = "mitm", value = "MOUSE_INPUT_REF")
    )]
    pub mouse_input: [u8; 4],
    #[characteristic(
        uuid = "2A4D",
        initial_value = "NO_DATA",
        security = "mitm",
        read,
        notify,
        descriptor(uuid = "2908", security = "mitm", value = "CONSUMER_INPUT_REF")
    )]
    pub consumer_input: [u8; 2],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub device_information: DeviceInformationService,
    pub hid: HidService,
}

impl Server {
    /// Notify the input report characteristic matching `report`.
    pub fn notify_report(&self, conn: &Connection, report: &HidReport) -> Result<(), NotifyValueError> {
        match report {
            HidReport::Keyboard(r) => {
                let mut value = [0u8; 8];
                r.serialize(&mut value);
                self.hid.keyboard_input_notify(conn, &value)
            }
            HidReport::Mouse(r) => {
                let mut value = [0u8; 4];
                r.serialize(&mut value);
                self.hid.mouse_input_notify(conn, &value)
            }
            HidReport::Consumer(r) => {
                let mut value = [0u8; 2];
                r.serialize(&mut value);
                self.hid.consumer_input_notify(conn, &value)
            }
        }
    }
}
