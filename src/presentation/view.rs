// Text rendering of the dashboard state
use crate::application::refresh_controller::DashboardState;
use crate::domain::metrics::{achievement_rate, AchievementStatus};
use crate::domain::snapshot::{DashboardSnapshot, FunnelStage, KpiCard, MonthlyRow, Section};
use crate::presentation::colors::{metric_color, status_color, BENCHMARK_COLOR, ERROR_COLOR};
use crate::presentation::format::{
    format_badge, format_kpi_value, format_last_updated, format_metric_cell, funnel_percent,
};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};
use std::fmt::Write;

const TITLE: &str = "インサイドセールス ダッシュボード";

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub color: bool,
    pub interval_secs: u64,
}

/// Render the whole screen. An error banner is shown above the last good
/// snapshot, never instead of it.
pub fn render(state: &DashboardState, options: &ViewOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", TITLE);

    if let Some(error) = &state.error {
        let mut banner = new_table();
        banner.add_row(vec![paint(Cell::new(format!("エラー: {}", error)), ERROR_COLOR, options.color)]);
        let _ = writeln!(out, "{}", banner);
    }

    if state.show_loading_indicator() {
        let _ = writeln!(out, "データを読み込み中...");
    }

    if let Some(snapshot) = &state.snapshot {
        render_snapshot(&mut out, snapshot, options);
    }

    out
}

fn render_snapshot(out: &mut String, snapshot: &DashboardSnapshot, options: &ViewOptions) {
    let _ = writeln!(out, "{}", month_tabs(&snapshot.available_months, &snapshot.selected_month));
    let _ = writeln!(out);

    if !snapshot.kpi_cards.is_empty() {
        let _ = writeln!(out, "{}", kpi_table(&snapshot.kpi_cards, options.color));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "■ セールスファネル（実績 vs ベンチマーク）");
    if !snapshot.funnel_stages.is_empty() {
        let _ = writeln!(out, "{}", funnel_table(&snapshot.funnel_stages, options.color));
    }

    for section in Section::ALL {
        let rows = snapshot.section(section);
        let _ = writeln!(out);
        let _ = writeln!(out, "■ {}", section.title());
        let rate = achievement_rate(rows, &snapshot.selected_month);
        let _ = writeln!(
            out,
            "{}",
            section_table(rows, &snapshot.available_months, &snapshot.selected_month, rate, options.color)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "最終更新: {} （{}秒ごとに自動更新）",
        format_last_updated(&snapshot.last_updated),
        options.interval_secs
    );
}

/// `[1] 2024-05  [2] *2024-06*`; the index is what the `m` command accepts.
pub fn month_tabs(months: &[String], selected: &str) -> String {
    months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if m == selected {
                format!("[{}] *{}*", i + 1, m)
            } else {
                format!("[{}] {}", i + 1, m)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn paint(cell: Cell, color: Color, enabled: bool) -> Cell {
    if enabled { cell.fg(color) } else { cell }
}

fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn badge_cell(rate: Option<f64>, color: bool) -> Cell {
    match rate {
        Some(rate) => {
            let status = AchievementStatus::from_rate(rate);
            paint(number_cell(format_badge(rate)), status_color(status), color)
        }
        None => Cell::new(""),
    }
}

fn kpi_table(cards: &[KpiCard], color: bool) -> Table {
    let mut table = new_table();
    table.set_header(vec!["指標", "実績", "目標", "達成率"]);

    for card in cards {
        let accent = metric_color(&card.label);
        table.add_row(Row::from(vec![
            paint(Cell::new(&card.label), accent, color),
            paint(number_cell(format_kpi_value(card.actual, &card.unit)), accent, color),
            number_cell(format_kpi_value(card.target, &card.unit)),
            badge_cell(card.achievement_rate, color),
        ]));
    }
    table
}

fn funnel_table(stages: &[FunnelStage], color: bool) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ステージ", "実績", "ベンチマーク", "達成率"]);

    for stage in stages {
        let accent = metric_color(&stage.label);
        table.add_row(Row::from(vec![
            paint(Cell::new(&stage.label), accent, color),
            paint(number_cell(format!("{:.2}%", funnel_percent(stage.actual))), accent, color),
            paint(
                number_cell(format!("{:.2}%", funnel_percent(Some(stage.benchmark)))),
                BENCHMARK_COLOR,
                color,
            ),
            badge_cell(stage.achievement_rate, color),
        ]));
    }
    table
}

/// Metric rows by month. The header's first cell carries the section's
/// achievement rate for the selected month when one can be computed.
fn section_table(
    rows: &[MonthlyRow],
    months: &[String],
    selected: &str,
    rate: Option<f64>,
    color: bool,
) -> Table {
    let mut table = new_table();

    let corner = match rate {
        Some(rate) => paint(
            Cell::new(format!("指標  達成率 {}", format_badge(rate))),
            status_color(AchievementStatus::from_rate(rate)),
            color,
        ),
        None => Cell::new("指標"),
    };
    let mut header = vec![corner];
    header.extend(months.iter().map(|month| {
        let label = if month == selected {
            format!("*{}", month)
        } else {
            month.clone()
        };
        number_cell(label)
    }));
    table.set_header(header);

    for row in rows {
        let mut cells = vec![paint(Cell::new(&row.metric), metric_color(&row.metric), color)];
        cells.extend(
            months
                .iter()
                .map(|month| number_cell(format_metric_cell(&row.metric, row.value(month)))),
        );
        table.add_row(cells);
    }
    table
}
