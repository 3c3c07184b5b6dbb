// Application layer - fetch lifecycle and consumer-side state
pub mod dashboard_source;
pub mod error;
pub mod month_selection;
pub mod refresh_controller;
