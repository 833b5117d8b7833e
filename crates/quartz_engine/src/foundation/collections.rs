//! Specialized collection types

pub use slotmap::{DefaultKey, Key, KeyData, SlotMap};

/// Handle-based map with keys that stay stable across removals
///
/// Backs the device-side resource tables; a destroyed resource's key is
/// never handed out again, so stale handles miss instead of aliasing.
pub type HandleMap<T> = SlotMap<DefaultKey, T>;

/// Pack a slot key into the raw `u64` a device handle carries
#[must_use]
pub fn key_to_raw(key: DefaultKey) -> u64 {
    key.data().as_ffi()
}

/// Rebuild a slot key from a raw device handle
///
/// A `u64` that never came from [`key_to_raw`] produces a key absent
/// from every map, so lookups with garbage handles just miss.
#[must_use]
pub fn key_from_raw(raw: u64) -> DefaultKey {
    KeyData::from_ffi(raw).into()
}
