//! Dispatch ids: CRC-32 of the member key, reinterpreted as `i32`.

/// Stable dispatch id for a member key such as `add(ID)I`.
///
/// The id is baked into generated code as a `lookupswitch` key, so it must
/// not depend on anything but the key text.
pub fn dispatch_id(key: &str) -> i32 {
    crc32fast::hash(key.as_bytes()) as i32
}
