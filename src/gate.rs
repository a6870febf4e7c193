//! Shared-secret PIN gate for mutating actions.
//!
//! The PIN is a shared plaintext secret compared as-is, not a hardened
//! authentication mechanism. It is read from the store once at startup and
//! rereads only through the explicit `reload` hook; callers pass the
//! candidate in rather than the gate reading ambient state.

use std::sync::RwLock;

use crate::db::MatchStore;
use crate::error::StoreError;

pub struct PinGate {
    pin: RwLock<String>,
}

impl PinGate {
    pub fn new(pin: String) -> Self {
        PinGate {
            pin: RwLock::new(pin),
        }
    }

    /// Load the PIN from the store, seeding it from `fallback` on first run.
    pub fn load(store: &dyn MatchStore, fallback: &str) -> Result<Self, StoreError> {
        let pin = match store.read_admin_pin()? {
            Some(pin) => pin,
            None => {
                store.write_admin_pin(fallback)?;
                fallback.to_string()
            }
        };
        Ok(PinGate::new(pin))
    }

    pub fn verify(&self, candidate: &str) -> bool {
        *self.pin.read().unwrap() == candidate
    }

    /// Reread the PIN from the store, e.g. after an out-of-band rotation.
    pub fn reload(&self, store: &dyn MatchStore) -> Result<(), StoreError> {
        if let Some(pin) = store.read_admin_pin()? {
            *self.pin.write().unwrap() = pin;
        }
        Ok(())
    }
}
