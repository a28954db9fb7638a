//! Render outputs. Each view is plain data plus an HTML fragment rendering.

use serde::Serialize;

use crate::models::kpi::{KpiStatus, KpiTrend};
use crate::models::reasoning::{AlertLevel, RecommendationSeverity};
use crate::utils::html::escape_html;

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_TEXT: &str = "Unknown";
pub const UNASSIGNED_OWNER: &str = "Unassigned";
pub const UNSCHEDULED_TIMELINE: &str = "TBD";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "camelCase")]
pub enum RatioDisplay {
    Percent(f64),
    NotAvailable,
}

impl RatioDisplay {
    pub fn label(&self) -> String {
        match self {
            RatioDisplay::Percent(value) => format!("{value:.1}% of target"),
            RatioDisplay::NotAvailable => NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBadge {
    pub status: KpiStatus,
    pub css_class: &'static str,
    pub label: &'static str,
}

impl StatusBadge {
    pub fn for_status(status: KpiStatus) -> Self {
        let (css_class, label) = match status {
            KpiStatus::Good => ("bg-success", "Good"),
            KpiStatus::Warning => ("bg-warning", "Warning"),
            KpiStatus::Critical => ("bg-danger", "Critical"),
            KpiStatus::Unknown => ("bg-secondary", "Unknown"),
        };
        Self {
            status,
            css_class,
            label,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendIcon {
    pub trend: KpiTrend,
    pub icon: &'static str,
    pub css_class: &'static str,
}

impl TrendIcon {
    pub fn for_trend(trend: KpiTrend) -> Self {
        let (icon, css_class) = match trend {
            KpiTrend::Up => ("bi-arrow-up", "text-success"),
            KpiTrend::Down => ("bi-arrow-down", "text-danger"),
            KpiTrend::Stable => ("bi-dash", "text-muted"),
        };
        Self {
            trend,
            icon,
            css_class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiRow {
    pub id: String,
    pub name: String,
    pub department: String,
    pub category: String,
    pub actual: String,
    pub target: String,
    pub ratio: RatioDisplay,
    pub status: StatusBadge,
    pub trend: TrendIcon,
    pub detail_url: Option<String>,
}

impl KpiRow {
    pub fn to_html(&self) -> String {
        let name = match &self.detail_url {
            Some(url) => format!(
                "<a href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(&self.name)
            ),
            None => escape_html(&self.name),
        };
        format!(
            "<tr data-kpi-id=\"{id}\"><td>{name}<br><small class=\"text-muted\">{category}</small></td>\
             <td>{department}</td><td>{actual}</td><td>{target}</td><td>{ratio}</td>\
             <td><span class=\"badge {badge_class}\">{badge}</span></td>\
             <td><i class=\"bi {icon} {icon_class}\"></i></td></tr>",
            id = escape_html(&self.id),
            category = escape_html(&self.category),
            department = escape_html(&self.department),
            actual = escape_html(&self.actual),
            target = escape_html(&self.target),
            ratio = escape_html(&self.ratio.label()),
            badge_class = self.status.css_class,
            badge = self.status.label,
            icon = self.trend.icon,
            icon_class = self.trend.css_class,
        )
    }
}

/// Table body for a KPI list. An empty list renders a single empty-state row.
pub fn kpi_table_html(rows: &[KpiRow]) -> String {
    if rows.is_empty() {
        return "<tr><td colspan=\"7\" class=\"text-center text-muted\">No KPIs reported</td></tr>"
            .to_string();
    }
    rows.iter().map(KpiRow::to_html).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthClass {
    Good,
    Warning,
    Critical,
}

impl HealthClass {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthClass::Good => "good",
            HealthClass::Warning => "warning",
            HealthClass::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub good: usize,
    pub health_score: u32,
    pub health: HealthClass,
    pub departments: usize,
}

impl SummaryCards {
    pub fn to_html(&self) -> String {
        let card = |title: &str, value: String, class: &str| {
            format!(
                "<div class=\"card summary-card {class}\"><div class=\"card-body\">\
                 <h6 class=\"card-title\">{title}</h6><p class=\"card-text display-6\">{value}</p></div></div>"
            )
        };

        [
            card("Total KPIs", self.total.to_string(), "border-primary"),
            card("Critical", self.critical.to_string(), "border-danger"),
            card("Warning", self.warning.to_string(), "border-warning"),
            card(
                "Health Score",
                format!("{}%", self.health_score),
                &format!("health-{}", self.health.as_str()),
            ),
            card("Departments", self.departments.to_string(), "border-info"),
        ]
        .concat()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AlertView {
    AllClear,
    Alert {
        level: AlertLevel,
        title: String,
        message: String,
        timestamp: Option<String>,
    },
}

impl AlertView {
    pub fn to_html(&self) -> String {
        match self {
            AlertView::AllClear => "<div class=\"alert alert-success\"><i class=\"bi bi-check-circle\"></i> \
                 No active alerts. All KPIs within acceptable range.</div>"
                .to_string(),
            AlertView::Alert {
                level,
                title,
                message,
                timestamp,
            } => {
                let class = match level {
                    AlertLevel::Critical => "alert-danger",
                    AlertLevel::Warning => "alert-warning",
                    AlertLevel::Info => "alert-info",
                };
                let time = timestamp
                    .as_deref()
                    .map(|value| format!("<small class=\"text-muted\">{}</small>", escape_html(value)))
                    .unwrap_or_default();
                format!(
                    "<div class=\"alert {class}\"><strong>{}</strong> {}{time}</div>",
                    escape_html(title),
                    escape_html(message)
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationView {
    pub severity: RecommendationSeverity,
    pub priority: String,
    pub action: String,
    pub owner: String,
    pub timeline: String,
}

impl RecommendationView {
    pub fn to_html(&self) -> String {
        let class = match self.severity {
            RecommendationSeverity::Critical => "border-danger",
            RecommendationSeverity::High => "border-warning",
            RecommendationSeverity::Normal => "border-secondary",
        };
        format!(
            "<div class=\"recommendation {class}\"><span class=\"badge\">{}</span> {}\
             <div class=\"small text-muted\">Owner: {} | Timeline: {}</div></div>",
            escape_html(&self.priority),
            escape_html(&self.action),
            escape_html(&self.owner),
            escape_html(&self.timeline)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum InsightView {
    RunAnalysisPrompt,
    Insight(String),
}

impl InsightView {
    pub fn to_html(&self) -> String {
        match self {
            InsightView::RunAnalysisPrompt => {
                "<p class=\"text-muted\">Click \"Run Reasoning\" to generate insights.</p>".to_string()
            }
            InsightView::Insight(text) => {
                format!("<p><i class=\"bi bi-lightbulb\"></i> {}</p>", escape_html(text))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentBreakdownRow {
    pub department: String,
    pub total: usize,
    pub good: usize,
    pub warning: usize,
    pub critical: usize,
}

impl DepartmentBreakdownRow {
    pub fn to_html(&self) -> String {
        format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&self.department),
            self.total,
            self.good,
            self.warning,
            self.critical
        )
    }
}
