use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
    #[default]
    Info,
}

impl AlertLevel {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => AlertLevel::Critical,
            "warning" => AlertLevel::Warning,
            _ => AlertLevel::Info,
        }
    }
}

impl<'de> Deserialize<'de> for AlertLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(JsonValue::as_str)
            .map(AlertLevel::parse)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
    pub level: AlertLevel,
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
struct AlertWire {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    // Older reasoning route: `{kpi, message}` without a type.
    #[serde(default)]
    kpi: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    level: AlertLevel,
    #[serde(default)]
    timestamp: Option<String>,
}

impl<'de> Deserialize<'de> for Alert {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = AlertWire::deserialize(deserializer)?;
        Ok(Alert {
            kind: wire.kind.or(wire.kpi),
            message: wire.message,
            level: wire.level,
            timestamp: wire.timestamp,
        })
    }
}

/// Severity derived from the free-form priority label by substring containment.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSeverity {
    Critical,
    High,
    Normal,
}

impl RecommendationSeverity {
    pub fn from_priority(priority: Option<&str>) -> Self {
        let label = priority.unwrap_or_default().to_ascii_uppercase();
        if label.contains("CRITICAL") {
            RecommendationSeverity::Critical
        } else if label.contains("HIGH") {
            RecommendationSeverity::High
        } else {
            RecommendationSeverity::Normal
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Option<String>,
    pub action: Option<String>,
    pub owner: Option<String>,
    pub timeline: Option<String>,
}

impl Recommendation {
    pub fn severity(&self) -> RecommendationSeverity {
        RecommendationSeverity::from_priority(self.priority.as_deref())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecommendationWire {
    Detailed {
        #[serde(default)]
        priority: Option<String>,
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        timeline: Option<String>,
    },
    Plain(String),
}

impl<'de> Deserialize<'de> for Recommendation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RecommendationWire::deserialize(deserializer)? {
            RecommendationWire::Detailed {
                priority,
                action,
                owner,
                timeline,
            } => Recommendation {
                priority,
                action,
                owner,
                timeline,
            },
            RecommendationWire::Plain(action) => Recommendation {
                action: Some(action),
                ..Recommendation::default()
            },
        })
    }
}

pub type Insight = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alerts: Vec<Alert>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub insights: Vec<Insight>,
    /// Trace lines some backends attach; kept, never rendered.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub log: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
