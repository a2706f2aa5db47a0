//! Observable VPC state published for the host
//!
//! Services publish into a [`PropertySink`]. [`PropertyStore`] is the in-memory sink, it keeps the latest value
//! per key and hands out snapshots.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::FnvIndexMap;

use crate::vpc::Graphics;
use crate::warn;

/// Published property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyKey {
    /// Clamshell mode enabled
    ClamshellMode,
    /// Battery conservation mode enabled
    ConservationMode,
    /// Fn-lock enabled
    FnlockMode,
    /// Raw VPC configuration word
    VpcConfig,
    /// Graphics adapter class
    Graphics,
    /// Bluetooth present
    Bluetooth,
    /// WWAN present
    Wwan,
    /// Wi-Fi present
    Wireless,
    /// Camera present
    Camera,
    /// Event word of the last dispatch pass
    VpcStatus,
}

impl PropertyKey {
    /// Name exposed to the host
    pub const fn name(&self) -> &'static str {
        match self {
            PropertyKey::ClamshellMode => "ClamshellMode",
            PropertyKey::ConservationMode => "ConservationMode",
            PropertyKey::FnlockMode => "FnlockMode",
            PropertyKey::VpcConfig => "VPCconfig",
            PropertyKey::Graphics => "Graphics",
            PropertyKey::Bluetooth => "Bluetooth",
            PropertyKey::Wwan => "3G",
            PropertyKey::Wireless => "Wireless",
            PropertyKey::Camera => "Camera",
            PropertyKey::VpcStatus => "VPCstatus",
        }
    }
}

/// Published value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyValue {
    /// Boolean state
    Bool(bool),
    /// Raw register or word
    U32(u32),
    /// Graphics adapter class
    Graphics(Graphics),
}

/// Receives published properties, the latest write for a key wins
pub trait PropertySink {
    /// Publish `value` under `key`
    fn publish(&self, key: PropertyKey, value: PropertyValue);
}

impl<T: PropertySink + ?Sized> PropertySink for &T {
    fn publish(&self, key: PropertyKey, value: PropertyValue) {
        T::publish(self, key, value)
    }
}

/// Maximum number of distinct properties held by a store
pub const PROPERTY_CAPACITY: usize = 16;

/// In-memory property sink
pub struct PropertyStore<M: RawMutex> {
    properties: Mutex<M, RefCell<FnvIndexMap<PropertyKey, PropertyValue, PROPERTY_CAPACITY>>>,
}

impl<M: RawMutex> PropertyStore<M> {
    /// Create an empty store
    pub const fn new() -> Self {
        Self {
            properties: Mutex::new(RefCell::new(FnvIndexMap::new())),
        }
    }

    /// Latest value published under `key`
    pub fn get(&self, key: PropertyKey) -> Option<PropertyValue> {
        self.properties.lock(|properties| properties.borrow().get(&key).copied())
    }

    /// Latest boolean published under `key`
    pub fn get_bool(&self, key: PropertyKey) -> Option<bool> {
        match self.get(key)? {
            PropertyValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Number of keys published so far
    pub fn len(&self) -> usize {
        self.properties.lock(|properties| properties.borrow().len())
    }

    /// Returns true if nothing has been published
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy all properties into `f` under a single lock
    pub fn for_each(&self, mut f: impl FnMut(PropertyKey, PropertyValue)) {
        self.properties.lock(|properties| {
            for (key, value) in properties.borrow().iter() {
                f(*key, *value);
            }
        });
    }
}

impl<M: RawMutex> Default for PropertyStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> PropertySink for PropertyStore<M> {
    fn publish(&self, key: PropertyKey, value: PropertyValue) {
        self.properties.lock(|properties| {
            if properties.borrow_mut().insert(key, value).is_err() {
                warn!("Property store full, dropping {}", key.name());
            }
        });
    }
}
