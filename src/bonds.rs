//! In-RAM store of bonded hosts.
//!
//! Each record pairs the radio stack's bond data with the GATT system
//! attributes (CCCD state) saved for that host, so a reconnecting host gets
//! its notification subscriptions back without rewriting them. The store
//! is generic over the bond data so the policy can be tested on the host.

use heapless::Vec;

use crate::config::SYS_ATTRS_CAPACITY;

pub struct BondRecord<P> {
    pub peer: P,
    sys_attrs: Vec<u8, SYS_ATTRS_CAPACITY>,
}

impl<P> BondRecord<P> {
    /// Saved system attributes, `None` if nothing was saved yet.
    pub fn sys_attrs(&self) -> Option<&[u8]> {
        (!self.sys_attrs.is_empty()).then_some(self.sys_attrs.as_slice())
    }
}

/// Bonded hosts, oldest first.
pub struct BondStore<P, const N: usize> {
    records: Vec<BondRecord<P>, N>,
}

impl<P, const N: usize> BondStore<P, N> {
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store a new bond. When full, the oldest record is evicted.
    pub fn add(&mut self, peer: P) {
        if self.records.is_full() {
            warn!("bond store full - evicting oldest bond");
            self.records.remove(0);
        }
        // Cannot fail: a slot was freed above.
        let _ = self.records.push(BondRecord {
            peer,
            sys_attrs: Vec::new(),
        });
    }

    pub fn find(&self, matches: impl Fn(&P) -> bool) -> Option<&BondRecord<P>> {
        self.records.iter().find(|r| matches(&r.peer))
    }

    /// Drop the first record matching `matches`. Returns `true` if one was
    /// removed.
    pub fn remove(&mut self, matches: impl Fn(&P) -> bool) -> bool {
        match self.records.iter().position(|r| matches(&r.peer)) {
            Some(i) => {
                self.records.remove(i);
                true
            }
            None => false,
        }
    }

    /// Replace the system attributes of the matching record.
    ///
    /// Returns `false` if no record matches or `attrs` does not fit; the
    /// previously saved attributes are then left untouched.
    pub fn save_sys_attrs(&mut self, matches: impl Fn(&P) -> bool, attrs: &[u8]) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| matches(&r.peer)) else {
            return false;
        };
        let mut saved = Vec::new();
        if saved.extend_from_slice(attrs).is_err() {
            warn!("sys attrs too large ({} bytes), not saved", attrs.len());
            return false;
        }
        record.sys_attrs = saved;
        true
    }
}

impl<P, const N: usize> Default for BondStore<P, N> {
    fn default() -> Self {
        Self::new()
    }
}
