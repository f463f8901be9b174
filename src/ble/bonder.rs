//! In-RAM bond store and pairing policy.

use core::cell::RefCell;

use btnhid::bonds::BondStore;
use btnhid::config::{MAX_BONDED_PEERS, SYS_ATTRS_CAPACITY};
use btnhid::transport::{TransportCommand, TransportEvent};
use defmt::{debug, info, warn};
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use static_cell::StaticCell;

use super::Gate;

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

pub struct Bonder {
    peers: RefCell<BondStore<PeerBond, MAX_BONDED_PEERS>>,
    gate: &'static Gate,
}

impl Bonder {
    fn new(gate: &'static Gate) -> Self {
        Self {
            peers: RefCell::new(BondStore::new()),
            gate,
        }
    }
}

fn is_peer(conn: &Connection) -> impl Fn(&PeerBond) -> bool + '_ {
    move |p| p.peer_id.is_match(conn.peer_address())
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::DisplayOnly
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn display_passkey(&self, passkey: &[u8; 6]) {
        info!("pairing passkey: {=[u8]:a}", passkey.as_slice());
    }

    fn on_bonded(
        &self,
        conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let mut peers = self.peers.borrow_mut();

        if peers.find(is_peer(conn)).is_some() {
            match self.gate.handle(&TransportEvent::RepeatPairing) {
                Some(TransportCommand::DiscardBondAndRetryPairing) => {
                    peers.remove(is_peer(conn));
                }
                _ => {
                    warn!("repeat pairing rejected, keeping stored bond");
                    return;
                }
            }
        }

        peers.add(PeerBond {
            master_id,
            key,
            peer_id,
        });
        info!("bonded, {} peers stored", peers.len());
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peers
            .borrow()
            .find(|p| p.master_id == master_id)
            .map(|r| r.peer.key)
    }

    fn save_sys_attrs(&self, conn: &Connection) {
        let mut buf = [0u8; SYS_ATTRS_CAPACITY];
        match gatt_server::get_sys_attrs(conn, &mut buf) {
            Ok(len) => {
                if self.peers.borrow_mut().save_sys_attrs(is_peer(conn), &buf[..len]) {
                    debug!("saved {} bytes of sys attrs", len);
                }
            }
            Err(e) => warn!("reading sys attrs failed: {}", e),
        }
    }

    fn load_sys_attrs(&self, conn: &Connection) {
        let peers = self.peers.borrow();
        let attrs = peers.find(is_peer(conn)).and_then(|r| r.sys_attrs());
        if let Err(e) = gatt_server::set_sys_attrs(conn, attrs) {
            warn!("restoring sys attrs failed: {}", e);
        }
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
        match mode {
            SecurityMode::NoAccess | SecurityMode::Open => {}
            _ => {
                self.gate.handle(&TransportEvent::SecurityEstablished);
            }
        }
    }
}

pub fn bonder(gate: &'static Gate) -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new(gate))
}
