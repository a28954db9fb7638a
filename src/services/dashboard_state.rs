use tracing::debug;

use crate::models::kpi::{DepartmentMap, Kpi};
use crate::models::reasoning::ReasoningResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningPhase {
    Idle,
    Running,
}

/// Last successfully fetched data for one dashboard session.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    kpis: Option<Vec<Kpi>>,
    departments: Option<DepartmentMap>,
    reasoning: Option<ReasoningResult>,
    reasoning_in_flight: bool,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kpis(&self) -> Option<&[Kpi]> {
        self.kpis.as_deref()
    }

    pub fn departments(&self) -> Option<&DepartmentMap> {
        self.departments.as_ref()
    }

    pub fn reasoning(&self) -> Option<&ReasoningResult> {
        self.reasoning.as_ref()
    }

    pub fn set_kpis(&mut self, kpis: Vec<Kpi>) {
        debug!(target: "app::state", count = kpis.len(), "kpis stored");
        self.kpis = Some(kpis);
    }

    pub fn set_departments(&mut self, departments: DepartmentMap) {
        debug!(target: "app::state", count = departments.len(), "departments stored");
        self.departments = Some(departments);
    }

    /// Replaces any previous result; no history is kept.
    pub fn set_reasoning(&mut self, result: ReasoningResult) {
        debug!(
            target: "app::state",
            alerts = result.alerts.len(),
            recommendations = result.recommendations.len(),
            insights = result.insights.len(),
            "reasoning result stored"
        );
        self.reasoning = Some(result);
    }

    pub fn reasoning_phase(&self) -> ReasoningPhase {
        if self.reasoning_in_flight {
            ReasoningPhase::Running
        } else {
            ReasoningPhase::Idle
        }
    }

    /// Check-and-set of the in-flight flag. Returns `false` when a run is already active.
    pub fn try_begin_reasoning(&mut self) -> bool {
        if self.reasoning_in_flight {
            return false;
        }
        self.reasoning_in_flight = true;
        true
    }

    pub fn finish_reasoning(&mut self) {
        self.reasoning_in_flight = false;
    }
}
