//! Normalization of the provider's JSON encoding
//!
//! With `format=json` the provider mirrors its XML schema:
//! - collections are objects keyed `"0"`, `"1"`, ... plus a `"count"`,
//!   each item wrapped in a single key (`{"0": {"team": ...}, "count": 1}`)
//! - resources are arrays of single-purpose fragments
//!   (`[{"team_key": ..}, {"name": ..}, {"roster": ..}]`), with the meta
//!   fragments nested in an inner array
//!
//! `flatten` turns collections into arrays. Fragment arrays are merged only
//! where a resource sits: a collection item or an extracted root. Every
//! other array is a real list and stays one, even with a single element.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Recursively normalize a provider payload.
pub fn flatten(value: Value) -> Value {
    match value {
        Value::Object(map) if is_collection(&map) => Value::Array(collection_items(map)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, flatten(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(flatten).collect()),
        other => other,
    }
}

/// Normalize a resource: merge its fragments into one object.
///
/// Nested fragment arrays (the meta block) are merged too and empty
/// placeholder arrays are dropped. Fragments that are not objects, or
/// that repeat a key, leave the resource as a flattened array.
pub fn flatten_resource(value: Value) -> Value {
    let Value::Array(fragments) = value else {
        return flatten(value);
    };

    let parts: Vec<Value> = fragments
        .into_iter()
        .filter(|f| !matches!(f, Value::Array(a) if a.is_empty()))
        .map(|f| match f {
            Value::Array(_) => flatten_resource(f),
            other => flatten(other),
        })
        .collect();

    let mut seen = HashSet::new();
    let mergeable = parts.iter().all(|part| {
        part.as_object()
            .is_some_and(|obj| obj.keys().all(|k| seen.insert(k.clone())))
    });
    if !mergeable {
        return Value::Array(parts);
    }

    let mut merged = Map::new();
    for part in parts {
        if let Value::Object(obj) = part {
            merged.extend(obj);
        }
    }
    Value::Object(merged)
}

/// Take `fantasy_content.<name>` out of a response body and flatten it.
pub fn extract_resource(mut body: Value, name: &str) -> Option<Value> {
    body.pointer_mut(&format!("/fantasy_content/{name}"))
        .map(Value::take)
        .map(flatten_resource)
}

/// Lift roster players into a flat `roster` array on a flattened team.
///
/// The provider nests them as `roster: {coverage_type, "0": {players: [..]}}`.
pub fn lift_roster(mut team: Value) -> Value {
    let players = team
        .get_mut("roster")
        .and_then(|roster| roster.pointer_mut("/0/players"))
        .map(Value::take);
    if let (Some(players), Some(obj)) = (players, team.as_object_mut()) {
        obj.insert("roster".to_string(), players);
    }
    team
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Collections always carry `count`; a lone `"0"` key (the roster's
/// players wrapper) is a plain object.
fn is_collection(map: &Map<String, Value>) -> bool {
    map.contains_key("count") && map.keys().all(|k| k == "count" || is_numeric_key(k))
}

fn collection_items(map: Map<String, Value>) -> Vec<Value> {
    let mut indexed: Vec<(usize, Value)> = map
        .into_iter()
        .filter_map(|(key, value)| key.parse::<usize>().ok().map(|i| (i, value)))
        .collect();
    indexed.sort_by_key(|(i, _)| *i);

    indexed
        .into_iter()
        .map(|(_, item)| match item {
            Value::Object(wrapper) if wrapper.len() == 1 => {
                let inner = wrapper.into_iter().next().map(|(_, v)| v);
                flatten_resource(inner.unwrap_or(Value::Null))
            }
            other => flatten_resource(other),
        })
        .collect()
}
