use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use httpmock::prelude::*;
use kpi_dashboard_lib::commands::controller::{DashboardController, ReasoningOutcome};
use kpi_dashboard_lib::commands::page::{DashboardPage, HtmlPage, MountPoint, NoticeLevel};
use kpi_dashboard_lib::config::DashboardConfig;
use kpi_dashboard_lib::error::{AppError, AppResult};
use kpi_dashboard_lib::models::kpi::{DepartmentMap, Kpi};
use kpi_dashboard_lib::models::reasoning::{ReasoningResult, Recommendation};
use kpi_dashboard_lib::services::dashboard_state::ReasoningPhase;
use kpi_dashboard_lib::services::data_client::{
    DashboardApi, DataClient, ExecutiveSummary, HealthStatus,
};
use serde_json::json;
use tokio::sync::Notify;

#[derive(Default)]
struct GateShared {
    reasoning_calls: AtomicUsize,
    release: Notify,
}

/// Reasoning calls park until the test releases them.
struct GatedApi {
    shared: Arc<GateShared>,
}

#[async_trait]
impl DashboardApi for GatedApi {
    async fn fetch_kpis(&self) -> AppResult<Vec<Kpi>> {
        Ok(Vec::new())
    }

    async fn fetch_departments(&self) -> AppResult<DepartmentMap> {
        Ok(DepartmentMap::new())
    }

    async fn fetch_reasoning(&self) -> AppResult<ReasoningResult> {
        self.shared.reasoning_calls.fetch_add(1, Ordering::SeqCst);
        self.shared.release.notified().await;
        Ok(ReasoningResult {
            recommendations: vec![Recommendation {
                priority: Some("HIGH".into()),
                action: Some("Executive review required".into()),
                owner: Some("CEO/COO".into()),
                timeline: Some("24 hours".into()),
            }],
            ..ReasoningResult::default()
        })
    }

    async fn fetch_health(&self) -> AppResult<HealthStatus> {
        Err(AppError::other("not used"))
    }

    async fn fetch_executive_summary(&self) -> AppResult<ExecutiveSummary> {
        Err(AppError::other("not used"))
    }
}

fn client_for(server: &MockServer) -> DataClient {
    let config = DashboardConfig {
        api_base: server.base_url(),
        ..DashboardConfig::default()
    };
    DataClient::new(&config).expect("client")
}

#[tokio::test]
async fn second_trigger_while_running_is_a_no_op() {
    let shared = Arc::new(GateShared::default());
    let controller = DashboardController::new(
        GatedApi {
            shared: Arc::clone(&shared),
        },
        HtmlPage::complete("KPI"),
    );

    let (first, second) = futures::join!(controller.trigger_reasoning(), async {
        assert_eq!(controller.reasoning_phase(), ReasoningPhase::Running);
        controller.with_page(|page| {
            assert!(!page.trigger().enabled);
            assert!(page
                .content(MountPoint::AlertsPanel)
                .unwrap_or_default()
                .contains("Analyzing"));
        });

        let outcome = controller.trigger_reasoning().await;
        shared.release.notify_one();
        outcome
    });

    assert_eq!(first, ReasoningOutcome::Completed);
    assert_eq!(second, ReasoningOutcome::Skipped);
    assert_eq!(shared.reasoning_calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.reasoning_phase(), ReasoningPhase::Idle);

    controller.with_page(|page| {
        assert!(page.trigger().enabled);
        assert!(page
            .content(MountPoint::RecommendationsPanel)
            .unwrap_or_default()
            .contains("Executive review required"));
        assert!(page
            .content(MountPoint::AlertsPanel)
            .unwrap_or_default()
            .contains("No active alerts"));
        assert!(page
            .content(MountPoint::InsightsPanel)
            .unwrap_or_default()
            .contains("Run Reasoning"));
    });
}

#[tokio::test]
async fn reasoning_failure_is_scoped_to_reasoning_panels() {
    let server = MockServer::start_async().await;
    let reasoning = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/reasoning");
            then.status(500).body("engine offline");
        })
        .await;

    let controller = DashboardController::new(client_for(&server), HtmlPage::complete("KPI"));

    let outcome = controller.trigger_reasoning().await;
    match &outcome {
        ReasoningOutcome::Failed(failure) => {
            assert_eq!(failure.code, "REASONING_ERROR");
            assert_eq!(failure.message, "engine offline");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    reasoning.assert_hits_async(1).await;

    controller.with_page(|page| {
        let alerts = page.content(MountPoint::AlertsPanel).unwrap_or_default();
        assert!(alerts.contains("engine offline"));
        assert!(alerts.contains("alert-danger"));
        assert_eq!(page.content(MountPoint::RecommendationsPanel), Some(""));
        assert_eq!(page.content(MountPoint::InsightsPanel), Some(""));
        assert!(page.trigger().enabled);
        assert!(page.fatal_body().is_none());

        let notice = page.notice().expect("error notice");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("engine offline"));
    });

    assert_eq!(controller.reasoning_phase(), ReasoningPhase::Idle);
    assert!(controller.state_snapshot().reasoning().is_none());

    // Immediate retry is allowed once idle.
    assert!(matches!(
        controller.trigger_reasoning().await,
        ReasoningOutcome::Failed(_)
    ));
    reasoning.assert_hits_async(2).await;
}

#[tokio::test]
async fn missing_mount_aborts_before_any_fetch() {
    let server = MockServer::start_async().await;
    let kpis = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/kpis");
            then.status(200).json_body(json!([]));
        })
        .await;

    let page = HtmlPage::with_mounts(
        "KPI",
        &[
            MountPoint::Loading,
            MountPoint::Content,
            MountPoint::SummaryCards,
            MountPoint::KpiTable,
            MountPoint::ReasoningTrigger,
        ],
    );
    let controller = DashboardController::new(client_for(&server), page);

    let failure = controller.init().await.expect_err("mounts missing");
    assert_eq!(failure.code, "MISSING_MOUNT");
    assert_eq!(
        failure.details,
        Some(json!({ "ids": ["alerts-container", "recommendations-container", "insights-container"] }))
    );
    kpis.assert_hits_async(0).await;

    let page = controller.into_page();
    assert!(page.fatal_body().unwrap_or_default().contains("Reload"));
}

#[tokio::test]
async fn failed_summary_fetch_is_fatal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/kpis");
            then.status(200).json_body(json!([{ "id": "1", "status": "good" }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/departments");
            then.status(500);
        })
        .await;

    let controller = DashboardController::new(client_for(&server), HtmlPage::complete("KPI"));
    let failure = controller.init().await.expect_err("departments failed");
    assert_eq!(failure.code, "HTTP_ERROR");
    assert_eq!(failure.message, "HTTP 500");

    let page = controller.into_page();
    let body = page.fatal_body().expect("fatal view");
    assert!(body.contains("HTTP 500"));
    assert!(!page.is_visible(MountPoint::Content));
}

#[tokio::test]
async fn health_check_passes_through_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/health");
            then.status(200)
                .json_body(json!({ "status": "degraded", "ontology_loaded": false }));
        })
        .await;

    let controller = DashboardController::new(client_for(&server), HtmlPage::complete("KPI"));
    let health = controller.check_health().await.expect("health");
    assert!(!health.is_healthy());
    controller.with_page(|page| assert!(page.has_mount(MountPoint::KpiTable)));
}

#[tokio::test]
async fn init_runs_only_once() {
    let server = MockServer::start_async().await;
    let kpis = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/kpis");
            then.status(200).json_body(json!([{ "id": "1", "status": "good" }]));
        })
        .await;
    let departments = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/departments");
            then.status(200).json_body(json!({ "ER": {} }));
        })
        .await;

    let controller = DashboardController::new(client_for(&server), HtmlPage::complete("KPI"));
    controller.init().await.expect("first init");
    controller.init().await.expect("second init is ignored");

    // The table load and the summary load each fetch the KPI list once.
    kpis.assert_hits_async(2).await;
    departments.assert_hits_async(1).await;
    controller.with_page(|page| assert!(page.is_visible(MountPoint::Content)));
}

#[tokio::test]
async fn executive_summary_is_fetched_on_demand() {
    let server = MockServer::start_async().await;
    let summary = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/summary");
            then.status(200).json_body(json!({
                "total_kpis": 12,
                "on_target": 9,
                "below_target": 3,
                "avg_performance_ratio": 1.04
            }));
        })
        .await;

    let controller = DashboardController::new(client_for(&server), HtmlPage::complete("KPI"));
    let result = controller.executive_summary().await.expect("summary");
    assert_eq!(result.total_kpis, 12);
    assert_eq!(result.below_target, 3);
    assert_eq!(result.avg_performance_ratio, Some(1.04));
    summary.assert_hits_async(1).await;
}
