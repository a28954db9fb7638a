// End-to-end dashboard load against a mocked backend

use httpmock::prelude::*;
use kpi_dashboard_lib::commands::controller::{DashboardController, ReasoningOutcome};
use kpi_dashboard_lib::commands::page::{HtmlPage, MountPoint, NoticeLevel};
use kpi_dashboard_lib::config::DashboardConfig;
use kpi_dashboard_lib::models::view::HealthClass;
use kpi_dashboard_lib::render_dashboard_document;
use kpi_dashboard_lib::services::data_client::DataClient;
use kpi_dashboard_lib::services::render_engine::render_summary_cards;
use serde_json::json;

fn config_for(server: &MockServer) -> DashboardConfig {
    DashboardConfig {
        api_base: server.base_url(),
        ..DashboardConfig::default()
    }
}

async fn mock_single_er_kpi(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/kpis");
            then.status(200).json_body(json!([{
                "id": "1",
                "name": "ER Wait",
                "actual": 45,
                "target": 30,
                "unit": "min",
                "status": "critical",
                "trend": "up",
                "weight": 9
            }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/departments");
            then.status(200).json_body(json!({ "ER": {} }));
        })
        .await;
}

#[tokio::test]
async fn loads_summary_and_table_for_single_kpi() {
    let server = MockServer::start_async().await;
    mock_single_er_kpi(&server).await;

    let controller = DashboardController::new(
        DataClient::new(&config_for(&server)).expect("client"),
        HtmlPage::complete("Hospital KPI"),
    );
    controller.init().await.expect("dashboard loads");

    let state = controller.state_snapshot();
    let kpis = state.kpis().expect("kpis stored");
    let departments = state.departments().expect("departments stored");
    let cards = render_summary_cards(kpis, departments);
    assert_eq!(cards.total, 1);
    assert_eq!(cards.critical, 1);
    assert_eq!(cards.health_score, 0);
    assert_eq!(cards.departments, 1);
    assert_eq!(cards.health, HealthClass::Good);

    let page = controller.into_page();
    assert!(!page.is_visible(MountPoint::Loading));
    assert!(page.is_visible(MountPoint::Content));

    let table = page.content(MountPoint::KpiTable).unwrap_or_default();
    assert_eq!(table.matches("<tr").count(), 1);
    assert!(table.contains("150.0% of target"));
    assert!(table.contains("href=\"/api/kpi/1\""));
    assert!(table.contains("45 min"));

    let summary = page.content(MountPoint::SummaryCards).unwrap_or_default();
    assert!(summary.contains("0%"));
    assert!(page
        .content(MountPoint::DepartmentBreakdown)
        .unwrap_or_default()
        .contains("Unassigned"));
}

#[tokio::test]
async fn reasoning_run_renders_all_panels() {
    let server = MockServer::start_async().await;
    mock_single_er_kpi(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/reasoning");
            then.status(200).json_body(json!({
                "alerts": [{
                    "level": "CRITICAL",
                    "type": "ED Capacity Crisis",
                    "message": "ED wait time >40min + LWBS >3% indicates capacity issues",
                    "timestamp": "2025-03-01T10:15:00Z"
                }],
                "recommendations": [{
                    "priority": "P0-CRITICAL",
                    "action": "Executive review required - multiple critical KPIs detected"
                }],
                "insights": ["ED wait time trending up for three periods"]
            }));
        })
        .await;

    let controller = DashboardController::new(
        DataClient::new(&config_for(&server)).expect("client"),
        HtmlPage::complete("Hospital KPI"),
    );
    controller.init().await.expect("dashboard loads");
    assert_eq!(controller.trigger_reasoning().await, ReasoningOutcome::Completed);

    let state = controller.state_snapshot();
    assert_eq!(state.reasoning().map(|result| result.alerts.len()), Some(1));

    let page = controller.into_page();
    let alerts = page.content(MountPoint::AlertsPanel).unwrap_or_default();
    assert!(alerts.contains("alert-danger"));
    assert!(alerts.contains("2025-03-01 10:15 UTC"));
    assert!(alerts.contains("&gt;40min"));

    let recommendations = page.content(MountPoint::RecommendationsPanel).unwrap_or_default();
    assert!(recommendations.contains("border-danger"));
    assert!(recommendations.contains("Owner: Unassigned"));
    assert!(recommendations.contains("Timeline: TBD"));

    assert!(page
        .content(MountPoint::InsightsPanel)
        .unwrap_or_default()
        .contains("trending up"));
    assert_eq!(
        page.notice().map(|notice| notice.level),
        Some(NoticeLevel::Success)
    );
    assert!(page.trigger().enabled);
}

#[tokio::test]
async fn empty_kpi_list_renders_empty_state_not_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/kpis");
            then.status(200).json_body(json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/departments");
            then.status(200).json_body(json!({}));
        })
        .await;

    let controller = DashboardController::new(
        DataClient::new(&config_for(&server)).expect("client"),
        HtmlPage::complete("Hospital KPI"),
    );
    controller.init().await.expect("empty data is valid");

    let page = controller.into_page();
    assert!(page
        .content(MountPoint::KpiTable)
        .unwrap_or_default()
        .contains("No KPIs reported"));
    assert!(page.fatal_body().is_none());
}

#[tokio::test]
async fn document_snapshot_includes_reasoning_output() {
    let server = MockServer::start_async().await;
    mock_single_er_kpi(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/reasoning");
            then.status(200).json_body(json!({ "alerts": [] }));
        })
        .await;

    let document = render_dashboard_document(&config_for(&server), true)
        .await
        .expect("document");

    assert!(document.starts_with("<!DOCTYPE html>"));
    assert!(document.contains("<div id=\"kpi-table\">"));
    assert!(document.contains("No active alerts"));
    assert!(!document.contains("id=\"loading\">"));
}

#[tokio::test]
async fn document_snapshot_shows_fatal_view_when_backend_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/kpis");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/departments");
            then.status(200).json_body(json!({}));
        })
        .await;

    let document = render_dashboard_document(&config_for(&server), true)
        .await
        .expect("document is still produced");

    assert!(document.contains("Failed to load dashboard"));
    assert!(document.contains("HTTP 500"));
    assert!(!document.contains("kpi-table"));
}
