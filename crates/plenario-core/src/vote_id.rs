//! Vote-event id normalisation and equivalent-key lookup.
//!
//! The Chamber's open-data API identifies a vote event by a numeric id that
//! may carry a dash-suffixed variant qualifier: `"2152544-73"` is a variant
//! ballot within sitting `"2152544"`. The four raw datasets key the same
//! event inconsistently — some by the suffixed id, some by the base id, some
//! by both — so every join between vote-event keyed indices goes through
//! [`resolve_equivalent`].

use std::collections::BTreeMap;

/// Strip the dash-suffixed variant qualifier from a vote-event id.
///
/// Input: `"2152544-73"` → `"2152544"`; `"2168389-2"` → `"2168389"`.
/// Ids without a dash (and the empty string) pass through unchanged.
pub fn normalize(id: &str) -> &str {
    match id.find('-') {
        Some(pos) => &id[..pos],
        None => id,
    }
}

/// Look up `id` in an index, falling back to its normalised base form.
///
/// Exact key wins; the base key is only consulted when it differs from the
/// raw id. Absence is a routine condition given cross-source key drift, not
/// an error.
pub fn resolve_equivalent<'a, V>(index: &'a BTreeMap<String, V>, id: &str) -> Option<&'a V> {
    if let Some(value) = index.get(id) {
        return Some(value);
    }
    let base = normalize(id);
    if base != id { index.get(base) } else { None }
}
