use std::collections::BTreeMap;

use serde::Serialize;

use crate::utils::html::escape_html;

/// Named display regions. Every region except the department breakdown must
/// exist before the dashboard loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MountPoint {
    Loading,
    Content,
    SummaryCards,
    KpiTable,
    AlertsPanel,
    RecommendationsPanel,
    InsightsPanel,
    ReasoningTrigger,
    DepartmentBreakdown,
}

impl MountPoint {
    pub const REQUIRED: [MountPoint; 8] = [
        MountPoint::Loading,
        MountPoint::Content,
        MountPoint::SummaryCards,
        MountPoint::KpiTable,
        MountPoint::AlertsPanel,
        MountPoint::RecommendationsPanel,
        MountPoint::InsightsPanel,
        MountPoint::ReasoningTrigger,
    ];

    pub const ALL: [MountPoint; 9] = [
        MountPoint::Loading,
        MountPoint::Content,
        MountPoint::SummaryCards,
        MountPoint::KpiTable,
        MountPoint::AlertsPanel,
        MountPoint::RecommendationsPanel,
        MountPoint::InsightsPanel,
        MountPoint::ReasoningTrigger,
        MountPoint::DepartmentBreakdown,
    ];

    pub fn id(self) -> &'static str {
        match self {
            MountPoint::Loading => "loading",
            MountPoint::Content => "dashboard-content",
            MountPoint::SummaryCards => "summary-cards",
            MountPoint::KpiTable => "kpi-table",
            MountPoint::AlertsPanel => "alerts-container",
            MountPoint::RecommendationsPanel => "recommendations-container",
            MountPoint::InsightsPanel => "insights-container",
            MountPoint::ReasoningTrigger => "run-reasoning",
            MountPoint::DepartmentBreakdown => "department-breakdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient toast-style message. A page shows at most one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerState {
    pub enabled: bool,
    pub label: String,
}

impl TriggerState {
    pub fn ready() -> Self {
        Self {
            enabled: true,
            label: "Run Reasoning".to_string(),
        }
    }

    pub fn busy() -> Self {
        Self {
            enabled: false,
            label: "Analyzing...".to_string(),
        }
    }
}

/// The surface the controller renders into.
pub trait DashboardPage: Send {
    fn has_mount(&self, mount: MountPoint) -> bool;

    fn set_content(&mut self, mount: MountPoint, html: String);

    fn set_visible(&mut self, mount: MountPoint, visible: bool);

    fn set_trigger(&mut self, trigger: TriggerState);

    /// Replaces the whole body; used for fatal errors.
    fn replace_body(&mut self, html: String);

    fn notify(&mut self, notice: Notice);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Region {
    html: String,
    visible: bool,
}

/// In-memory page that can be serialized to a standalone HTML document.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    title: String,
    regions: BTreeMap<MountPoint, Region>,
    trigger: TriggerState,
    notice: Option<Notice>,
    fatal_body: Option<String>,
}

impl HtmlPage {
    pub fn with_mounts(title: impl Into<String>, mounts: &[MountPoint]) -> Self {
        let regions = mounts
            .iter()
            .map(|mount| {
                let visible = *mount != MountPoint::Content;
                (
                    *mount,
                    Region {
                        html: String::new(),
                        visible,
                    },
                )
            })
            .collect();

        Self {
            title: title.into(),
            regions,
            trigger: TriggerState::ready(),
            notice: None,
            fatal_body: None,
        }
    }

    /// Page with every region, optional ones included.
    pub fn complete(title: impl Into<String>) -> Self {
        Self::with_mounts(title, &MountPoint::ALL)
    }

    pub fn content(&self, mount: MountPoint) -> Option<&str> {
        self.regions.get(&mount).map(|region| region.html.as_str())
    }

    pub fn is_visible(&self, mount: MountPoint) -> bool {
        self.regions
            .get(&mount)
            .map(|region| region.visible)
            .unwrap_or(false)
    }

    pub fn trigger(&self) -> &TriggerState {
        &self.trigger
    }

    /// The notice currently on screen, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Dismisses the current notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn fatal_body(&self) -> Option<&str> {
        self.fatal_body.as_deref()
    }

    pub fn to_document(&self) -> String {
        let title = escape_html(&self.title);
        let body = match &self.fatal_body {
            Some(body) => body.clone(),
            None => self.render_regions(),
        };
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
        )
    }

    fn render_regions(&self) -> String {
        self.regions
            .iter()
            .map(|(mount, region)| {
                let hidden = if region.visible { "" } else { " hidden" };
                if *mount == MountPoint::ReasoningTrigger {
                    let disabled = if self.trigger.enabled { "" } else { " disabled" };
                    format!(
                        "<button id=\"{}\"{hidden}{disabled}><i class=\"bi bi-gear\"></i> {}</button>",
                        mount.id(),
                        escape_html(&self.trigger.label)
                    )
                } else {
                    format!("<div id=\"{}\"{hidden}>{}</div>", mount.id(), region.html)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DashboardPage for HtmlPage {
    fn has_mount(&self, mount: MountPoint) -> bool {
        self.regions.contains_key(&mount)
    }

    fn set_content(&mut self, mount: MountPoint, html: String) {
        if let Some(region) = self.regions.get_mut(&mount) {
            region.html = html;
        }
    }

    fn set_visible(&mut self, mount: MountPoint, visible: bool) {
        if let Some(region) = self.regions.get_mut(&mount) {
            region.visible = visible;
        }
    }

    fn set_trigger(&mut self, trigger: TriggerState) {
        self.trigger = trigger;
    }

    fn replace_body(&mut self, html: String) {
        self.fatal_body = Some(html);
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}
