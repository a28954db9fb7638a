pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tracing::warn;

use crate::commands::controller::{DashboardController, ReasoningOutcome};
use crate::commands::page::HtmlPage;
use crate::config::DashboardConfig;
use crate::error::AppResult;
use crate::services::data_client::DataClient;

pub const DASHBOARD_TITLE: &str = "Hospital KPI Ontology Dashboard";

/// Loads the dashboard against the configured backend and returns the page as a
/// standalone HTML document. Load failures are rendered into the document, not
/// returned.
pub async fn render_dashboard_document(
    config: &DashboardConfig,
    run_reasoning: bool,
) -> AppResult<String> {
    crate::utils::logger::init_logging(&config.logging)?;

    let client = DataClient::new(config)?;
    let controller = DashboardController::new(client, HtmlPage::complete(DASHBOARD_TITLE));

    if controller.init().await.is_ok() && run_reasoning {
        if let ReasoningOutcome::Failed(failure) = controller.trigger_reasoning().await {
            warn!(target: "app::controller", message = %failure.message, "snapshot rendered without reasoning");
        }
    }

    Ok(controller.into_page().to_document())
}
