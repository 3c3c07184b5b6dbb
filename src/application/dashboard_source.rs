// Source trait for dashboard snapshots
use crate::application::error::DashboardError;
use crate::domain::snapshot::DashboardSnapshot;
use async_trait::async_trait;

#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Fetch one snapshot. `None` lets the server pick the month and report it
    /// back in `selected_month`.
    async fn fetch_snapshot(&self, month: Option<&str>) -> Result<DashboardSnapshot, DashboardError>;
}
