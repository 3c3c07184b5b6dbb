// Metric color palette
use crate::domain::metrics::AchievementStatus;
use comfy_table::Color;

pub const APPOINTMENT_COLOR: Color = Color::Rgb { r: 0xfa, g: 0xcc, b: 0x15 };
pub const CONTACT_COLOR: Color = Color::Rgb { r: 0xff, g: 0xff, b: 0xff };
pub const DEAL_COLOR: Color = Color::Rgb { r: 0xf8, g: 0x71, b: 0x71 };
pub const LEAD_COLOR: Color = Color::Rgb { r: 0x4a, g: 0xde, b: 0x80 };
pub const DEFAULT_COLOR: Color = Color::Rgb { r: 0xff, g: 0xff, b: 0xff };
pub const BENCHMARK_COLOR: Color = Color::Rgb { r: 0x37, g: 0x41, b: 0x51 };
pub const ERROR_COLOR: Color = DEAL_COLOR;

/// Keyword categories in priority order; the first keyword found in a label wins.
const KEYWORD_COLORS: [(&str, Color); 4] = [
    ("アポ", APPOINTMENT_COLOR),
    ("通電", CONTACT_COLOR),
    ("案件", DEAL_COLOR),
    ("リード", LEAD_COLOR),
];

pub fn metric_color(label: &str) -> Color {
    KEYWORD_COLORS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

pub fn status_color(status: AchievementStatus) -> Color {
    match status {
        AchievementStatus::Achieved => LEAD_COLOR,
        AchievementStatus::Near => APPOINTMENT_COLOR,
        AchievementStatus::Behind => DEAL_COLOR,
    }
}
