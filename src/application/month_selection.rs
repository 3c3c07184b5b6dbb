// Month selection held by the dashboard consumer
use crate::domain::snapshot::DashboardSnapshot;

/// The month the user is looking at.
///
/// Starts empty. The first snapshot's `selected_month` is adopted only while
/// nothing has been chosen; an explicit choice is never overridden by later
/// background refreshes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthSelection {
    selected: Option<String>,
}

impl MonthSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Adopt the server default if no month is selected yet. Returns the
    /// adopted month when the selection changed.
    pub fn adopt_default(&mut self, snapshot: &DashboardSnapshot) -> Option<&str> {
        if self.selected.is_some() || snapshot.selected_month.is_empty() {
            return None;
        }
        self.selected = Some(snapshot.selected_month.clone());
        self.selected.as_deref()
    }

    /// Record an explicit choice. Returns false when it is already selected.
    pub fn select(&mut self, month: impl Into<String>) -> bool {
        let month = month.into();
        if self.selected.as_deref() == Some(month.as_str()) {
            return false;
        }
        self.selected = Some(month);
        true
    }
}
