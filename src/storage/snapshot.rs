//! Timestamped plan snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::plan::SafetyPlan;
use crate::storage::store::{SnapshotStore, StorageError};

/// Fixed key the plan snapshot is stored under
pub const PLAN_KEY: &str = "safetyPlan";

/// `{ timestamp, data }` record written on every export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub data: SafetyPlan,
}

impl PlanSnapshot {
    pub fn new(timestamp: DateTime<Utc>, data: SafetyPlan) -> Self {
        Self { timestamp, data }
    }
}

/// Serializes and stores a snapshot under [`PLAN_KEY`], replacing any previous one
pub fn save_snapshot(
    store: &mut dyn SnapshotStore,
    snapshot: &PlanSnapshot,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(snapshot)?;
    store.put(PLAN_KEY, &json)
}

/// Loads the stored snapshot, if any
pub fn load_snapshot(store: &dyn SnapshotStore) -> Result<Option<PlanSnapshot>, StorageError> {
    match store.get(PLAN_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
