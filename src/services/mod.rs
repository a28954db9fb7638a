pub mod dashboard_state;
pub mod data_client;
pub mod render_engine;
