//! Typed views of the few response fields the exporter relies on.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Response of `GET /api/folders/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderDescriptor {
    /// Internal folder id, the filter for dashboard search.
    #[serde(deserialize_with = "integer_like")]
    pub id: i64,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// One entry of `GET /api/search?folderIds={id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub uid: String,
    pub title: String,
    /// Remaining fields, kept so the summary can be logged as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardSummary {
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            extra: Map::new(),
        }
    }
}

/// Accepts `7`, `7.0` and `"7"`.
fn integer_like<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| D::Error::custom(format!("expected an integer id, got {value}")))
}
