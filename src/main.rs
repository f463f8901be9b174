//! btnhid firmware entry point (nRF52840 + SoftDevice S140).
//!
//! Task layout:
//!
//! ```text
//! button_task ×5 ──► EVENTS ──► dispatcher_task ──► OUTBOUND ──► ble_task
//!                                     ▲                              │
//!                                     └──────────── GATE ◄───────────┘
//! softdevice_task: SoftDevice event pump
//! ```

#![no_std]
#![no_main]

mod ble;

use core::mem;

use btnhid::actions::ActionTable;
use btnhid::config::{BLE_DEVICE_NAME, BUTTON_COUNT, EVENT_CHANNEL_CAPACITY};
use btnhid::dispatcher::Dispatcher;
use btnhid::error::{Error, TransportError};
use btnhid::hid::schema::check_report_map;
use btnhid::input::{ButtonId, ButtonSource, EventChannel};
use btnhid::time::Clock;
use defmt::info;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Instant};
use embedded_hal::digital::PinState;
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::ble::server::Server;
use crate::ble::{Gate, OutboundReports, OutboundSink};

type Cs = CriticalSectionRawMutex;

static EVENTS: EventChannel<Cs, EVENT_CHANNEL_CAPACITY> = EventChannel::new();
static GATE: Gate = Gate::new();
static OUTBOUND: OutboundReports = Channel::new();
static ACTIONS: ActionTable = ActionTable::press_demo();
static SOURCES: [ButtonSource<Cs>; BUTTON_COUNT] = [
    ButtonSource::new(ButtonId::Up),
    ButtonSource::new(ButtonId::Right),
    ButtonSource::new(ButtonId::Down),
    ButtonSource::new(ButtonId::Left),
    ButtonSource::new(ButtonId::Center),
];

/// Microseconds since boot, truncated to 32 bits.
struct Uptime;

impl Clock for Uptime {
    fn now_us(&self) -> u32 {
        Instant::now().as_micros() as u32
    }
}

#[embassy_executor::task(pool_size = 5)]
async fn button_task(mut pin: Input<'static>, source: &'static ButtonSource<Cs>) -> ! {
    let edges = async {
        loop {
            pin.wait_for_any_edge().await;
            source.on_edge(PinState::from(pin.is_high()), Uptime.now_us());
        }
    };
    let mut delay = Delay;
    let capture = source.run(&mut delay, &Uptime, &EVENTS);

    match select(edges, capture).await {
        Either::First(never) | Either::Second(never) => never,
    }
}

#[embassy_executor::task]
async fn dispatcher_task() -> ! {
    let sink = OutboundSink::new(&OUTBOUND);
    let mut dispatcher = Dispatcher::new(&EVENTS, &GATE, &ACTIONS, sink, Delay);
    dispatcher.run().await
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    let bonder = ble::bonder::bonder(&GATE);
    ble::run(sd, server, &GATE, bonder, &OUTBOUND).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("btnhid starting");

    if let Err(e) = start(spawner) {
        defmt::panic!("startup failed: {}", e);
    }
}

fn start(spawner: Spawner) -> Result<(), Error> {
    check_report_map()?;

    // The SoftDevice reserves interrupt priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    let sd = Softdevice::enable(&softdevice_config());
    static SERVER: StaticCell<Server> = StaticCell::new();
    let server = Server::new(sd).map_err(|_| TransportError::GattRegister)?;
    let server: &'static Server = SERVER.init(server);
    let sd: &'static Softdevice = sd;
    spawner.must_spawn(softdevice_task(sd));

    // Active-low buttons with internal pull-ups, in `ButtonId::ALL` order.
    let pins = [
        Input::new(p.P0_11, Pull::Up),
        Input::new(p.P0_12, Pull::Up),
        Input::new(p.P0_24, Pull::Up),
        Input::new(p.P0_25, Pull::Up),
        Input::new(p.P0_26, Pull::Up),
    ];
    for (pin, source) in pins.into_iter().zip(SOURCES.iter()) {
        spawner.must_spawn(button_task(pin, source));
    }

    spawner.must_spawn(dispatcher_task());
    spawner.must_spawn(ble_task(sd, server));

    info!("btnhid running");
    Ok(())
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 256 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            // SAFETY: all-zero is "no write access", a valid security mode.
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}
