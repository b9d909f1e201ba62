//! Merge semantics for document writes.

use serde_json::Value;

/// Merge `patch` into `target` field by field.
///
/// Object fields merge recursively; any other value (including arrays
/// and `null`) replaces the existing field wholesale. This mirrors the
/// merge-write semantics the chat layer relies on: two participants
/// patching different keys of the same nested map never clobber each
/// other.
pub fn merge_patch(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => {
                        merge_patch(slot, value);
                    }
                    _ => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}
