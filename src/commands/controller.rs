use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::commands::page::{DashboardPage, MountPoint, Notice, NoticeLevel, TriggerState};
use crate::commands::{CommandError, CommandResult};
use crate::error::{AppError, AppResult};
use crate::models::view::{kpi_table_html, AlertView, InsightView, RecommendationView};
use crate::services::dashboard_state::{DashboardState, ReasoningPhase};
use crate::services::data_client::{DashboardApi, ExecutiveSummary, HealthStatus};
use crate::services::render_engine::{
    render_alerts, render_department_breakdown, render_insights, render_kpi_table,
    render_recommendations, render_summary_cards,
};
use crate::utils::html::escape_html;

const IN_PROGRESS_HTML: &str = "<div class=\"text-center text-muted\">\
     <span class=\"spinner-border spinner-border-sm\"></span> Analyzing...</div>";

#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningOutcome {
    Completed,
    Failed(CommandError),
    /// A run was already in flight; nothing was issued.
    Skipped,
}

/// Wires page lifecycle events to the data client and the render engine.
///
/// State and page sit behind short-lived locks that are never held across an
/// await, so concurrent triggers on one task see a consistent in-flight flag.
pub struct DashboardController<A, P> {
    api: A,
    state: Mutex<DashboardState>,
    page: Mutex<P>,
    started: AtomicBool,
}

impl<A, P> DashboardController<A, P>
where
    A: DashboardApi,
    P: DashboardPage,
{
    pub fn new(api: A, page: P) -> Self {
        Self {
            api,
            state: Mutex::new(DashboardState::new()),
            page: Mutex::new(page),
            started: AtomicBool::new(false),
        }
    }

    /// One-shot startup: mount check, then the KPI and summary loads in parallel.
    /// Calls after the first are no-ops; a failed page recovers by reloading.
    pub async fn init(&self) -> CommandResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!(target: "app::controller", "dashboard already initialized; init ignored");
            return Ok(());
        }

        if let Err(err) = self.verify_mounts() {
            let failure = CommandError::from(err);
            self.page().replace_body(fatal_error_html(&failure));
            return Err(failure);
        }

        let (kpis_loaded, summary_loaded) = futures::join!(self.load_kpis(), self.load_summary());

        match kpis_loaded.and(summary_loaded) {
            Ok(()) => {
                let mut page = self.page();
                page.set_visible(MountPoint::Loading, false);
                page.set_visible(MountPoint::Content, true);
                info!(target: "app::controller", "dashboard ready");
                Ok(())
            }
            Err(err) => {
                error!(target: "app::controller", error = %err, "dashboard initialization failed");
                let failure = CommandError::from(err);
                self.page().replace_body(fatal_error_html(&failure));
                Err(failure)
            }
        }
    }

    pub async fn trigger_reasoning(&self) -> ReasoningOutcome {
        if !self.state().try_begin_reasoning() {
            debug!(target: "app::controller", "reasoning already running; trigger ignored");
            return ReasoningOutcome::Skipped;
        }
        let _run = ReasoningRun {
            state: &self.state,
            page: &self.page,
        };

        {
            let mut page = self.page();
            page.set_trigger(TriggerState::busy());
            for mount in [
                MountPoint::AlertsPanel,
                MountPoint::RecommendationsPanel,
                MountPoint::InsightsPanel,
            ] {
                page.set_content(mount, IN_PROGRESS_HTML.to_string());
            }
        }

        match self.api.fetch_reasoning().await {
            Ok(result) => {
                let alerts = render_alerts(&result.alerts);
                let recommendations = render_recommendations(&result.recommendations);
                let insights = render_insights(&result.insights);
                self.state().set_reasoning(result);

                let mut page = self.page();
                page.set_content(
                    MountPoint::AlertsPanel,
                    alerts.iter().map(AlertView::to_html).collect(),
                );
                page.set_content(
                    MountPoint::RecommendationsPanel,
                    recommendations_html(&recommendations),
                );
                page.set_content(
                    MountPoint::InsightsPanel,
                    insights.iter().map(InsightView::to_html).collect(),
                );
                page.notify(Notice {
                    level: NoticeLevel::Success,
                    message: "Reasoning analysis complete".to_string(),
                });
                info!(target: "app::controller", "reasoning run completed");
                ReasoningOutcome::Completed
            }
            Err(err) => {
                let failure = CommandError::from(err);
                let mut page = self.page();
                page.set_content(
                    MountPoint::AlertsPanel,
                    format!(
                        "<div class=\"alert alert-danger\">Failed to run reasoning engine: {}</div>",
                        escape_html(&failure.message)
                    ),
                );
                page.set_content(MountPoint::RecommendationsPanel, String::new());
                page.set_content(MountPoint::InsightsPanel, String::new());
                page.notify(Notice {
                    level: NoticeLevel::Error,
                    message: format!("Failed to run reasoning engine: {}", failure.message),
                });
                warn!(target: "app::controller", message = %failure.message, "reasoning run failed");
                ReasoningOutcome::Failed(failure)
            }
        }
    }

    /// Backend liveness probe; never part of startup.
    pub async fn check_health(&self) -> CommandResult<HealthStatus> {
        let status = self.api.fetch_health().await?;
        if !status.is_healthy() {
            warn!(target: "app::controller", status = %status.status, "backend reports unhealthy");
        }
        Ok(status)
    }

    /// Backend-computed totals; shown on demand, never part of startup.
    pub async fn executive_summary(&self) -> CommandResult<ExecutiveSummary> {
        let summary = self.api.fetch_executive_summary().await?;
        debug!(
            target: "app::controller",
            total = summary.total_kpis,
            below_target = summary.below_target,
            "executive summary fetched"
        );
        Ok(summary)
    }

    pub fn reasoning_phase(&self) -> ReasoningPhase {
        self.state().reasoning_phase()
    }

    pub fn state_snapshot(&self) -> DashboardState {
        self.state().clone()
    }

    pub fn with_page<R>(&self, inspect: impl FnOnce(&P) -> R) -> R {
        let page = self.page();
        inspect(&page)
    }

    pub fn into_page(self) -> P {
        self.page.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn verify_mounts(&self) -> AppResult<()> {
        let page = self.page();
        let missing: Vec<String> = MountPoint::REQUIRED
            .iter()
            .filter(|mount| !page.has_mount(**mount))
            .map(|mount| mount.id().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::missing_mount(missing))
        }
    }

    async fn load_kpis(&self) -> AppResult<()> {
        let kpis = self.api.fetch_kpis().await?;
        let rows = render_kpi_table(&kpis);

        {
            let mut page = self.page();
            page.set_content(MountPoint::KpiTable, kpi_table_html(&rows));
            if page.has_mount(MountPoint::DepartmentBreakdown) {
                let breakdown: String = render_department_breakdown(&kpis)
                    .iter()
                    .map(|row| row.to_html())
                    .collect();
                page.set_content(MountPoint::DepartmentBreakdown, breakdown);
            }
        }

        self.state().set_kpis(kpis);
        Ok(())
    }

    async fn load_summary(&self) -> AppResult<()> {
        let (kpis, departments) =
            futures::try_join!(self.api.fetch_kpis(), self.api.fetch_departments())?;

        let cards = render_summary_cards(&kpis, &departments);
        self.page()
            .set_content(MountPoint::SummaryCards, cards.to_html());

        let mut state = self.state();
        if state.kpis().is_none() {
            state.set_kpis(kpis);
        }
        state.set_departments(departments);
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn page(&self) -> MutexGuard<'_, P> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leaves the `Running` phase on every exit path, including a dropped future.
struct ReasoningRun<'a, P: DashboardPage> {
    state: &'a Mutex<DashboardState>,
    page: &'a Mutex<P>,
}

impl<P: DashboardPage> Drop for ReasoningRun<'_, P> {
    fn drop(&mut self) {
        self.page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_trigger(TriggerState::ready());
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish_reasoning();
    }
}

fn recommendations_html(views: &[RecommendationView]) -> String {
    if views.is_empty() {
        return "<p class=\"text-muted\">No recommendations at this time.</p>".to_string();
    }
    views.iter().map(RecommendationView::to_html).collect()
}

fn fatal_error_html(failure: &CommandError) -> String {
    format!(
        "<div class=\"container mt-5\"><div class=\"alert alert-danger\">\
         <h4 class=\"alert-heading\">Failed to load dashboard</h4>\
         <p>Error loading data: {}</p>\
         <button class=\"btn btn-outline-danger\" onclick=\"location.reload()\">Reload</button>\
         </div></div>",
        escape_html(&failure.message)
    )
}
