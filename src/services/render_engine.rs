//! Pure mappings from dashboard data to views. Nothing here touches the
//! network or mutates state, and every function is total over its input.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::trace;

use crate::models::kpi::{DepartmentMap, Kpi, KpiStatus};
use crate::models::reasoning::{Alert, Insight, Recommendation};
use crate::models::view::{
    AlertView, DepartmentBreakdownRow, HealthClass, InsightView, KpiRow, RatioDisplay,
    RecommendationView, StatusBadge, SummaryCards, TrendIcon, NOT_AVAILABLE, UNASSIGNED_OWNER,
    UNKNOWN_TEXT, UNSCHEDULED_TIMELINE,
};
use crate::services::data_client::kpi_detail_url;
use crate::utils::html::format_number;

const CRITICAL_ESCALATION_THRESHOLD: usize = 3;
const WARNING_ESCALATION_THRESHOLD: usize = 5;
const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

pub fn render_kpi_table(kpis: &[Kpi]) -> Vec<KpiRow> {
    let mut ordered: Vec<&Kpi> = kpis.iter().collect();
    // `sort_by` is stable, so equal weights keep their input order.
    ordered.sort_by(|a, b| {
        b.sort_weight()
            .partial_cmp(&a.sort_weight())
            .unwrap_or(Ordering::Equal)
    });

    trace!(target: "app::render", rows = ordered.len(), "rendering kpi table");

    ordered.into_iter().map(kpi_row).collect()
}

fn kpi_row(kpi: &Kpi) -> KpiRow {
    let ratio = match kpi.target_ratio_percent() {
        Some(percent) => RatioDisplay::Percent(percent),
        None => RatioDisplay::NotAvailable,
    };

    KpiRow {
        id: kpi.id.clone(),
        name: text_or_unknown(kpi.name.as_deref()),
        department: text_or_unknown(kpi.department.as_deref()),
        category: text_or_unknown(kpi.category.as_deref()),
        actual: measurement(kpi.actual, kpi.unit.as_deref()),
        target: measurement(kpi.target, kpi.unit.as_deref()),
        ratio,
        status: StatusBadge::for_status(kpi.status),
        trend: TrendIcon::for_trend(kpi.trend),
        detail_url: kpi_detail_url(&kpi.id),
    }
}

fn text_or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNKNOWN_TEXT.to_string(),
    }
}

fn measurement(value: Option<f64>, unit: Option<&str>) -> String {
    match (value.filter(|v| v.is_finite()), unit.map(str::trim)) {
        (Some(value), Some(unit)) if !unit.is_empty() => format!("{} {unit}", format_number(value)),
        (Some(value), _) => format_number(value),
        (None, _) => NOT_AVAILABLE.to_string(),
    }
}

pub fn render_summary_cards(kpis: &[Kpi], departments: &DepartmentMap) -> SummaryCards {
    let total = kpis.len();
    let count = |status: KpiStatus| kpis.iter().filter(|kpi| kpi.status == status).count();
    let critical = count(KpiStatus::Critical);
    let warning = count(KpiStatus::Warning);
    let good = count(KpiStatus::Good);

    let health_score = if total == 0 {
        0
    } else {
        (100.0 * good as f64 / total as f64).round() as u32
    };

    let health = if critical > CRITICAL_ESCALATION_THRESHOLD {
        HealthClass::Critical
    } else if warning > WARNING_ESCALATION_THRESHOLD {
        HealthClass::Warning
    } else {
        HealthClass::Good
    };

    SummaryCards {
        total,
        critical,
        warning,
        good,
        health_score,
        health,
        departments: departments.len(),
    }
}

pub fn render_alerts(alerts: &[Alert]) -> Vec<AlertView> {
    if alerts.is_empty() {
        return vec![AlertView::AllClear];
    }

    alerts
        .iter()
        .map(|alert| AlertView::Alert {
            level: alert.level,
            title: text_or_unknown(alert.kind.as_deref()),
            message: alert.message.clone().unwrap_or_default(),
            timestamp: alert.timestamp.as_deref().map(display_timestamp),
        })
        .collect()
}

// ISO timestamps are shown in a compact UTC form; anything else passes through.
fn display_timestamp(raw: &str) -> String {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&chrono::Utc)
            .format("%Y-%m-%d %H:%M UTC")
            .to_string();
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

pub fn render_recommendations(recommendations: &[Recommendation]) -> Vec<RecommendationView> {
    recommendations
        .iter()
        .map(|recommendation| RecommendationView {
            severity: recommendation.severity(),
            priority: placeholder(recommendation.priority.as_deref(), "NORMAL"),
            action: recommendation.action.clone().unwrap_or_default(),
            owner: placeholder(recommendation.owner.as_deref(), UNASSIGNED_OWNER),
            timeline: placeholder(recommendation.timeline.as_deref(), UNSCHEDULED_TIMELINE),
        })
        .collect()
}

fn placeholder(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn render_insights(insights: &[Insight]) -> Vec<InsightView> {
    if insights.is_empty() {
        return vec![InsightView::RunAnalysisPrompt];
    }
    insights
        .iter()
        .map(|insight| InsightView::Insight(insight.clone()))
        .collect()
}

pub fn render_department_breakdown(kpis: &[Kpi]) -> Vec<DepartmentBreakdownRow> {
    let mut groups: BTreeMap<String, DepartmentBreakdownRow> = BTreeMap::new();

    for kpi in kpis {
        let department = match kpi.department.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => UNASSIGNED_DEPARTMENT.to_string(),
        };
        let row = groups
            .entry(department.clone())
            .or_insert_with(|| DepartmentBreakdownRow {
                department,
                total: 0,
                good: 0,
                warning: 0,
                critical: 0,
            });
        row.total += 1;
        match kpi.status {
            KpiStatus::Good => row.good += 1,
            KpiStatus::Warning => row.warning += 1,
            KpiStatus::Critical => row.critical += 1,
            KpiStatus::Unknown => {}
        }
    }

    groups.into_values().collect()
}
