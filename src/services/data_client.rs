use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::error::{AppError, AppResult};
use crate::models::kpi::{DepartmentMap, Kpi};
use crate::models::reasoning::ReasoningResult;

pub const KPIS_PATH: &str = "/api/kpis";
pub const DEPARTMENTS_PATH: &str = "/api/departments";
pub const REASONING_PATH: &str = "/api/reasoning";
pub const HEALTH_PATH: &str = "/api/health";
pub const SUMMARY_PATH: &str = "/api/summary";
pub const KPI_DETAIL_PREFIX: &str = "/api/kpi/";

/// RFC 3986 unreserved characters stay literal; everything else, `%` included,
/// is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Navigation target for a KPI detail view. The response is never parsed here.
///
/// Ids made only of dots have no safe single-segment form (`..` and `%2E%2E`
/// both resolve as a parent reference), so they get no link.
pub fn kpi_detail_url(id: &str) -> Option<String> {
    if id.is_empty() || id.bytes().all(|byte| byte == b'.') {
        return None;
    }
    Some(format!(
        "{KPI_DETAIL_PREFIX}{}",
        utf8_percent_encode(id, PATH_SEGMENT)
    ))
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub ontology_loaded: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Backend-computed executive summary from `/api/summary`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ExecutiveSummary {
    pub total_kpis: u32,
    #[serde(default)]
    pub on_target: u32,
    #[serde(default)]
    pub below_target: u32,
    #[serde(default)]
    pub avg_performance_ratio: Option<f64>,
}

/// Backend surface the controller depends on.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_kpis(&self) -> AppResult<Vec<Kpi>>;

    async fn fetch_departments(&self) -> AppResult<DepartmentMap>;

    async fn fetch_reasoning(&self) -> AppResult<ReasoningResult>;

    async fn fetch_health(&self) -> AppResult<HealthStatus>;

    async fn fetch_executive_summary(&self) -> AppResult<ExecutiveSummary>;
}

/// HTTP implementation of [`DashboardApi`]. No retries, no request timeout.
#[derive(Clone)]
pub struct DataClient {
    client: reqwest::Client,
    base_url: String,
}

impl DataClient {
    pub fn new(config: &DashboardConfig) -> AppResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_base.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issues the request; callers decide how a transport failure is classified.
    async fn send(&self, path: &str) -> Result<reqwest::Response, reqwest::Error> {
        let correlation_id = Uuid::new_v4();
        let start = Instant::now();

        debug!(target: "app::client", %correlation_id, path, "issuing GET");

        let response = self.client.get(self.endpoint(path)).send().await?;

        debug!(
            target: "app::client",
            %correlation_id,
            path,
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "response received"
        );

        Ok(response)
    }

    async fn get(&self, path: &str) -> AppResult<reqwest::Response> {
        self.send(path)
            .await
            .map_err(|err| AppError::transport(path, err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.get(path).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http(path, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|err| AppError::transport(path, err.to_string()))?;

        serde_json::from_str(&body).map_err(|err| AppError::parse(path, err.to_string()))
    }
}

#[async_trait]
impl DashboardApi for DataClient {
    async fn fetch_kpis(&self) -> AppResult<Vec<Kpi>> {
        let value: JsonValue = self.get_json(KPIS_PATH).await?;
        if !value.is_array() {
            return Err(AppError::parse(KPIS_PATH, "expected a JSON array of KPIs"));
        }
        serde_json::from_value(value).map_err(|err| AppError::parse(KPIS_PATH, err.to_string()))
    }

    async fn fetch_departments(&self) -> AppResult<DepartmentMap> {
        let value: JsonValue = self.get_json(DEPARTMENTS_PATH).await?;
        match value {
            JsonValue::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(AppError::parse(
                DEPARTMENTS_PATH,
                "expected a JSON object keyed by department",
            )),
        }
    }

    async fn fetch_reasoning(&self) -> AppResult<ReasoningResult> {
        let response = self
            .send(REASONING_PATH)
            .await
            .map_err(|err| AppError::reasoning(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AppError::reasoning(err.to_string()))?;

        if !status.is_success() {
            let text = body.trim();
            let message = if text.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                text.to_string()
            };
            return Err(AppError::reasoning(message));
        }

        let value: JsonValue = serde_json::from_str(&body)
            .map_err(|err| AppError::reasoning(format!("invalid reasoning response: {err}")))?;
        if !value.is_object() {
            return Err(AppError::reasoning(
                "invalid reasoning response: expected a JSON object",
            ));
        }
        serde_json::from_value(value)
            .map_err(|err| AppError::reasoning(format!("invalid reasoning response: {err}")))
    }

    async fn fetch_health(&self) -> AppResult<HealthStatus> {
        self.get_json(HEALTH_PATH).await
    }

    async fn fetch_executive_summary(&self) -> AppResult<ExecutiveSummary> {
        self.get_json(SUMMARY_PATH).await
    }
}
