//! Bluetooth Low Energy subsystem.
//!
//! Drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertising** - connectable, pairable advertising as a HID
//!    keyboard until a host connects.
//! 2. **GATT server** - HID over GATT service; host writes (control point,
//!    protocol mode, LED output report) become [`TransportEvent`]s.
//! 3. **Report drain** - input reports queued by the dispatcher are
//!    notified on the matching characteristic while the link is up.
//!
//! Every lifecycle callback goes through the [`SessionGate`], which the
//! dispatcher consults before sending anything.

pub mod bonder;
pub mod server;

use btnhid::config::{
    BLE_ADV_INTERVAL, BLE_ADV_TIMEOUT, BLE_APPEARANCE, BLE_DEVICE_NAME, OUTBOUND_REPORT_CAPACITY,
};
use btnhid::hid::schema::KEYBOARD_REPORT_ID;
use btnhid::hid::HidReport;
use btnhid::session::SessionGate;
use btnhid::transport::{ControlOp, ProtocolMode, ReportSink, TransportEvent};
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
    ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::peripheral::{self, AdvertiseError};
use nrf_softdevice::ble::{gatt_server, Connection};
use nrf_softdevice::Softdevice;

use self::bonder::Bonder;
use self::server::{HidServiceEvent, Server, ServerEvent};

pub type Gate = SessionGate<CriticalSectionRawMutex>;

/// Dispatcher → connection task queue.
pub type OutboundReports = Channel<CriticalSectionRawMutex, HidReport, OUTBOUND_REPORT_CAPACITY>;

/// [`ReportSink`] feeding the outbound queue. Reports that do not fit are
/// dropped.
pub struct OutboundSink {
    queue: &'static OutboundReports,
}

impl OutboundSink {
    pub fn new(queue: &'static OutboundReports) -> Self {
        Self { queue }
    }
}

impl ReportSink for OutboundSink {
    fn send_report(&mut self, report: &HidReport) {
        if self.queue.try_send(*report).is_err() {
            warn!("outbound queue full - dropping report {}", report.report_id());
        }
    }
}

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Incomplete, &[ServiceUuid16::HUMAN_INTERFACE_DEVICE])
    .full_name(BLE_DEVICE_NAME)
    .raw(
        AdvertisementDataType::APPEARANCE,
        &[BLE_APPEARANCE as u8, (BLE_APPEARANCE >> 8) as u8],
    )
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_16(
        ServiceList::Complete,
        &[
            ServiceUuid16::DEVICE_INFORMATION,
            ServiceUuid16::HUMAN_INTERFACE_DEVICE,
        ],
    )
    .build();

/// Advertise, serve one connection, repeat. Never returns.
pub async fn run(
    sd: &'static Softdevice,
    server: &'static Server,
    gate: &'static Gate,
    bonder: &'static Bonder,
    outbound: &'static OutboundReports,
) -> ! {
    gate.handle(&TransportEvent::Started);

    loop {
        let Some(conn) = advertise(sd, bonder).await else {
            continue;
        };
        gate.handle(&TransportEvent::Connected);

        // Reports queued while no host was listening are stale.
        while outbound.try_receive().is_ok() {}

        if let Err(e) = conn.request_security() {
            warn!("security request failed: {}", e);
        }

        let gatt = gatt_server::run(&conn, server, |event| on_server_event(gate, event));
        let drain = drain_reports(&conn, server, outbound);

        match select(gatt, drain).await {
            Either::First(_disconnected) => {}
            Either::Second(never) => never,
        }

        // The SoftDevice wrapper does not surface the HCI reason code.
        // The gate answers every disconnect with StartAdvertising, which
        // is the top of this loop.
        gate.handle(&TransportEvent::Disconnected { reason: 0 });
    }
}

async fn advertise(sd: &'static Softdevice, bonder: &'static Bonder) -> Option<Connection> {
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        timeout: Some(BLE_ADV_TIMEOUT),
        ..Default::default()
    };
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &ADV_DATA,
        scan_data: &SCAN_DATA,
    };

    info!("advertising as \"{}\"", BLE_DEVICE_NAME);
    match peripheral::advertise_pairable(sd, adv, &config, bonder).await {
        Ok(conn) => {
            info!("host connected");
            Some(conn)
        }
        Err(AdvertiseError::Timeout) => {
            debug!("advertising timed out, restarting");
            None
        }
        Err(e) => {
            warn!("advertising failed: {}", e);
            Timer::after(Duration::from_secs(1)).await;
            None
        }
    }
}

fn on_server_event(gate: &Gate, event: ServerEvent) {
    let transport_event = match event {
        ServerEvent::Hid(e) => match e {
            HidServiceEvent::ControlPointWrite(value) => match ControlOp::from_byte(value) {
                Some(op) => TransportEvent::Control(op),
                None => {
                    warn!("unknown control point value {}", value);
                    return;
                }
            },
            HidServiceEvent::ProtocolModeWrite(value) => match ProtocolMode::from_byte(value) {
                Some(mode) => TransportEvent::ProtocolMode(mode),
                None => {
                    warn!("unknown protocol mode {}", value);
                    return;
                }
            },
            HidServiceEvent::KeyboardOutputWrite(leds) => {
                let mut data = heapless::Vec::new();
                let _ = data.push(leds);
                TransportEvent::OutputReport {
                    report_id: KEYBOARD_REPORT_ID,
                    data,
                }
            }
            HidServiceEvent::KeyboardInputCccdWrite { notifications }
            | HidServiceEvent::MouseInputCccdWrite { notifications }
            | HidServiceEvent::ConsumerInputCccdWrite { notifications } => {
                debug!("input report notifications: {}", notifications);
                return;
            }
        },
        #[allow(unreachable_patterns)]
        _ => return,
    };

    gate.handle(&transport_event);
}

async fn drain_reports(conn: &Connection, server: &Server, outbound: &OutboundReports) -> ! {
    loop {
        let report = outbound.receive().await;
        if let Err(e) = server.notify_report(conn, &report) {
            warn!("notify report {} failed: {}", report.report_id(), e);
        }
    }
}
