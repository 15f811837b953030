pub mod csv;

use crate::clustering::{ClusterResult, EventCounts, Weights};
use chrono::{DateTime, Utc};
use serde::de::{Deserialize as DeserializeTrait, Deserializer, Error};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

pub use self::csv::{check_species_filter, results_csv};

/// JSON document for one clustering run.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsExport {
    pub version: String,
    #[serde(serialize_with = "serialize_datetime", deserialize_with = "deserialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,

    pub weights: Weights,
    /// False when no coordinates were available for the spread refinement.
    pub refined: bool,
    pub sequence_count: usize,
    pub groups: Vec<GroupExport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupExport {
    pub id: String,
    pub root: String,
    pub score: f64,
    pub events: EventCounts,
    pub sequences: Vec<String>,
}

impl ResultsExport {
    pub fn new(result: &ClusterResult) -> Self {
        let groups: Vec<GroupExport> = result
            .clusters
            .iter()
            .enumerate()
            .map(|(i, cluster)| GroupExport {
                id: format!("group_{}", i),
                root: cluster.root.clone(),
                score: cluster.score,
                events: cluster.events,
                sequences: cluster.leaves.clone(),
            })
            .collect();

        Self {
            version: "1.0".to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            weights: result.weights,
            refined: result.refined,
            sequence_count: groups.iter().map(|g| g.sequences.len()).sum(),
            groups,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(D::Error::custom)
}
