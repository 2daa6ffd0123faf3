//! Role based filtering of CDS responses.
//!
//! Each catalogue item declares the vocabulary of its extended attributes in
//! an embedded `@context`. An item is shown to a role only when that context
//! is on the role's allow-list; items without a context are always dropped.
//!
//! Filtering never touches the caller's value. It works on a copy and
//! covers these response shapes, each only when present:
//!
//! 1. `message.catalogs[]`: items filtered per catalog; a catalog whose items
//!    all get filtered out is removed, one without an item array is kept.
//! 2. `message.items[]`: filtered in place.
//! 3. `message.results[]`: same rule as catalogs.
//! 4. A bare top-level item array: filtered and returned directly.

use serde_json::{Map, Value};

use crate::role::{allowed_contexts, Role};

/// Keys under which a catalog or result entry holds its items.
const ITEM_ARRAY_KEYS: [&str; 2] = ["beckn:items", "items"];
/// Keys under which an item holds its extended attributes.
const ATTRIBUTE_KEYS: [&str; 2] = ["beckn:itemAttributes", "itemAttributes"];
const CONTEXT_KEY: &str = "@context";

/// Returns a copy of `response` holding only the items visible to `role`.
#[must_use]
pub fn filter_response(response: &Value, role: Option<Role>) -> Value {
    let allowed = allowed_contexts(role);

    if let Value::Array(items) = response {
        return Value::Array(filter_items(items, allowed));
    }

    let mut filtered = response.clone();
    let Some(message) = filtered.get_mut("message").and_then(Value::as_object_mut) else {
        return filtered;
    };

    if let Some(Value::Array(catalogs)) = message.get_mut("catalogs") {
        filter_entries(catalogs, allowed);
    }
    if let Some(Value::Array(items)) = message.get_mut("items") {
        let kept = filter_items(items, allowed);
        *items = kept;
    }
    if let Some(Value::Array(results)) = message.get_mut("results") {
        filter_entries(results, allowed);
    }

    filtered
}

/// Whether `item` carries a context on the allow-list.
#[must_use]
pub fn item_is_allowed(item: &Value, allowed: &[&str]) -> bool {
    let Some(context) = item_context(item) else {
        return false;
    };

    match context {
        Value::String(uri) => allowed.contains(&uri.as_str()),
        Value::Array(uris) => uris
            .iter()
            .filter_map(Value::as_str)
            .any(|uri| allowed.contains(&uri)),
        _ => false,
    }
}

/// Flattens the items of every catalog in `message.catalogs`.
#[must_use]
pub fn collect_items(response: &Value) -> Vec<Value> {
    response
        .pointer("/message/catalogs")
        .and_then(Value::as_array)
        .map(|catalogs| {
            catalogs
                .iter()
                .filter_map(|catalog| catalog.as_object().and_then(item_array))
                .flatten()
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn item_context(item: &Value) -> Option<&Value> {
    let attributes = ATTRIBUTE_KEYS
        .iter()
        .find_map(|key| item.get(*key).filter(|value| value.is_object()))?;
    attributes.get(CONTEXT_KEY)
}

fn filter_items(items: &[Value], allowed: &[&str]) -> Vec<Value> {
    items
        .iter()
        .filter(|item| item_is_allowed(item, allowed))
        .cloned()
        .collect()
}

/// Filters the items of each entry, dropping entries whose items all went.
fn filter_entries(entries: &mut Vec<Value>, allowed: &[&str]) {
    entries.retain_mut(|entry| {
        let Some(items) = entry.as_object_mut().and_then(item_array_mut) else {
            return true;
        };
        if items.is_empty() {
            return true;
        }

        let kept = filter_items(items, allowed);
        *items = kept;
        !items.is_empty()
    });
}

fn item_array(entry: &Map<String, Value>) -> Option<&Vec<Value>> {
    ITEM_ARRAY_KEYS
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_array))
}

fn item_array_mut(entry: &mut Map<String, Value>) -> Option<&mut Vec<Value>> {
    let key = ITEM_ARRAY_KEYS
        .iter()
        .find(|key| entry.get(**key).is_some_and(Value::is_array))?;
    entry.get_mut(*key).and_then(Value::as_array_mut)
}
