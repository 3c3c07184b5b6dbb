// Derived metrics computed from the monthly tables
use super::snapshot::MonthlyRow;

pub const TARGET_PREFIX: &str = "目標：";
pub const ACTUAL_PREFIX: &str = "実績：";
pub const RATE_MARKER: &str = "率";

/// Rate-typed metrics hold proportions and are always shown as percentages.
pub fn is_rate_metric(metric: &str) -> bool {
    metric.contains(RATE_MARKER)
}

fn find_count_row<'a>(rows: &'a [MonthlyRow], prefix: &str) -> Option<&'a MonthlyRow> {
    rows.iter()
        .find(|r| r.metric.starts_with(prefix) && !is_rate_metric(&r.metric))
}

/// Ratio of the actual row to the target row for `month`.
///
/// Returns `None` when either row is missing, the target is absent or zero,
/// or the actual value is absent. The result is not multiplied by 100.
pub fn achievement_rate(rows: &[MonthlyRow], month: &str) -> Option<f64> {
    let target = find_count_row(rows, TARGET_PREFIX)?.value(month)?;
    let actual = find_count_row(rows, ACTUAL_PREFIX)?.value(month)?;
    if target == 0.0 {
        return None;
    }
    Some(actual / target)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementStatus {
    Achieved,
    Near,
    Behind,
}

impl AchievementStatus {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 1.0 {
            AchievementStatus::Achieved
        } else if rate >= 0.7 {
            AchievementStatus::Near
        } else {
            AchievementStatus::Behind
        }
    }
}
