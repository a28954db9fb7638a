use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Department name → opaque metadata. Only the key count is consumed.
pub type DepartmentMap = BTreeMap<String, JsonValue>;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum KpiStatus {
    Good,
    Warning,
    Critical,
    #[default]
    Unknown,
}

impl KpiStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "good" => KpiStatus::Good,
            "warning" => KpiStatus::Warning,
            "critical" => KpiStatus::Critical,
            _ => KpiStatus::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for KpiStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(JsonValue::as_str)
            .map(KpiStatus::parse)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum KpiTrend {
    Up,
    Down,
    #[default]
    Stable,
}

impl KpiTrend {
    /// Unrecognized directions (including the backend's "N/A") read as stable.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => KpiTrend::Up,
            "down" => KpiTrend::Down,
            _ => KpiTrend::Stable,
        }
    }
}

impl<'de> Deserialize<'de> for KpiTrend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(JsonValue::as_str)
            .map(KpiTrend::parse)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    #[serde(deserialize_with = "id_from_scalar")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: KpiStatus,
    #[serde(default)]
    pub trend: KpiTrend,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Kpi {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            department: None,
            category: None,
            actual: None,
            target: None,
            unit: None,
            status: KpiStatus::Unknown,
            trend: KpiTrend::Stable,
            weight: None,
        }
    }

    /// `actual / target * 100`, or `None` whenever the target cannot be divided into.
    pub fn target_ratio_percent(&self) -> Option<f64> {
        let target = self.target.filter(|value| value.is_finite() && *value > 0.0)?;
        let actual = self.actual.filter(|value| value.is_finite())?;
        Some(actual / target * 100.0)
    }

    pub fn sort_weight(&self) -> f64 {
        self.weight.filter(|value| value.is_finite()).unwrap_or(0.0)
    }
}

// The backend emits ids as strings, but older fixtures used numbers.
fn id_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(value) => Ok(value),
        JsonValue::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "kpi id must be a string or number, got {other}"
        ))),
    }
}
