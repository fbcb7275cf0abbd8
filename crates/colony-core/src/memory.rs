//! The persisted-state record carried across tick boundaries.
//!
//! Only flat, JSON-friendly data lives here. Reservations, per-tick CPU counters
//! and other caches are rebuilt every tick and never persisted.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::{EntityId, Position, RegionId};

static MALFORMED_WARNED: AtomicBool = AtomicBool::new(false);

/// A movement request with its destination flattened to coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub agent: EntityId,
    pub x: i32,
    pub y: i32,
    pub region: RegionId,
    #[serde(default)]
    pub range: u32,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub requested_at: u64,
}

impl MoveRecord {
    pub fn destination(&self) -> Position {
        Position::new(self.region, self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub x: i32,
    pub y: i32,
    pub region: RegionId,
    pub count: f64,
    #[serde(default)]
    pub last_update: u64,
}

impl TrafficRecord {
    pub fn position(&self) -> Position {
        Position::new(self.region, self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyMemory {
    /// Tick at which the state was written.
    pub tick: u64,
    pub movement: Vec<MoveRecord>,
    pub traffic: Vec<TrafficRecord>,
    /// Task queue snapshot, owned and shaped by the task manager.
    pub tasks: Value,
    /// Lists owned by sibling managers; carried through untouched.
    pub production: Vec<Value>,
    pub boosts: Vec<Value>,
    pub resource_requests: Vec<Value>,
}

impl ColonyMemory {
    /// Tolerant load: a missing, empty, or malformed blob yields defaults.
    ///
    /// Each top-level field is decoded independently, so one field of the wrong
    /// shape (schema evolution) does not discard the rest.
    pub fn from_json(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(err) => {
                warn_malformed("state", &err);
                Self::default()
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            warn_malformed("state", &"top-level value is not an object");
            return Self::default();
        };
        Self {
            tick: take_field(&mut map, "tick"),
            movement: take_field(&mut map, "movement"),
            traffic: take_field(&mut map, "traffic"),
            tasks: map.remove("tasks").unwrap_or(Value::Null),
            production: take_field(&mut map, "production"),
            boosts: take_field(&mut map, "boosts"),
            resource_requests: take_field(&mut map, "resource_requests"),
        }
    }

    /// Strict load for tooling that wants to see the error.
    pub fn parse_strict(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn take_field<T>(map: &mut serde_json::Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match map.remove(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            warn_malformed(key, &err);
            T::default()
        }),
    }
}

/// Logged at most once per process.
pub fn warn_malformed(field: &str, err: &dyn std::fmt::Display) {
    if !MALFORMED_WARNED.swap(true, Ordering::Relaxed) {
        tracing::warn!(field, error = %err, "malformed persisted state, using defaults");
    }
}
