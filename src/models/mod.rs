pub mod kpi;
pub mod reasoning;
pub mod view;
