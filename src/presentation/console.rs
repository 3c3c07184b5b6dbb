// Console front end - stdin commands and screen updates
use crate::application::month_selection::MonthSelection;
use crate::application::refresh_controller::{DashboardState, RefreshController};
use crate::domain::snapshot::DashboardSnapshot;
use crate::presentation::view::{render, ViewOptions};
use anyhow::Context;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::io::{stdout, IsTerminal};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "commands: r = refresh, m <month|number> = select month, q = quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthRef {
    /// 1-based position in `available_months`.
    Index(usize),
    Name(String),
}

impl MonthRef {
    pub fn resolve(&self, snapshot: &DashboardSnapshot) -> Option<String> {
        match self {
            MonthRef::Index(i) => i
                .checked_sub(1)
                .and_then(|i| snapshot.available_months.get(i))
                .cloned(),
            MonthRef::Name(name) if snapshot.has_month(name) => Some(name.clone()),
            MonthRef::Name(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Refresh,
    SelectMonth(MonthRef),
    Quit,
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("missing month after 'm'")]
    MissingMonth,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(ConsoleCommand::Help);
    };

    match head {
        "r" | "refresh" => Ok(ConsoleCommand::Refresh),
        "q" | "quit" | "exit" => Ok(ConsoleCommand::Quit),
        "h" | "help" | "?" => Ok(ConsoleCommand::Help),
        "m" | "month" => {
            let arg = parts.next().ok_or(CommandError::MissingMonth)?;
            let month = match arg.parse::<usize>() {
                Ok(index) => MonthRef::Index(index),
                Err(_) => MonthRef::Name(arg.to_string()),
            };
            Ok(ConsoleCommand::SelectMonth(month))
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Drive the dashboard until stdin closes or the user quits.
///
/// This is the consumer side of the controller: it adopts the server's month
/// while nothing is selected and turns commands into `refresh` /
/// `select_month` calls.
pub async fn run(controller: RefreshController, options: ViewOptions) -> anyhow::Result<()> {
    let mut selection = MonthSelection::new();
    let mut states = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut rendered: Option<u64> = None;

    println!("{}", HELP);

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                if let Some(month) = state.snapshot.as_deref().and_then(|s| selection.adopt_default(s)) {
                    tracing::info!(month, "Following server-selected month");
                    controller.select_month(month);
                }
                if should_render(&state, rendered) {
                    rendered = Some(state.generation);
                    redraw(&render(&state, &options))?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(ConsoleCommand::Refresh) => controller.refresh(),
                    Ok(ConsoleCommand::Help) => println!("{}", HELP),
                    Ok(ConsoleCommand::SelectMonth(month_ref)) => {
                        let resolved = controller
                            .state()
                            .snapshot
                            .and_then(|snapshot| month_ref.resolve(&snapshot));
                        match resolved {
                            Some(month) => {
                                if selection.select(month.clone()) {
                                    controller.select_month(month);
                                }
                            }
                            None => println!("{}", unknown_month(&month_ref, &selection)),
                        }
                    }
                    Err(e) => println!("{}\n{}", e, HELP),
                }
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

fn unknown_month(month_ref: &MonthRef, selection: &MonthSelection) -> String {
    let showing = selection.current().unwrap_or("server default");
    match month_ref {
        MonthRef::Index(i) => format!("unknown month: #{} (showing {})", i, showing),
        MonthRef::Name(name) => format!("unknown month: {} (showing {})", name, showing),
    }
}

/// Replace the previous frame on a terminal; append when piped.
fn redraw(screen: &str) -> anyhow::Result<()> {
    let mut out = stdout();
    if out.is_terminal() {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0)).context("Failed to clear screen")?;
    }
    println!("{}", screen);
    println!("{}", HELP);
    Ok(())
}

/// Redraw on every applied result and while the first load is pending;
/// skip the Loading blips of background refreshes.
fn should_render(state: &DashboardState, rendered: Option<u64>) -> bool {
    state.show_loading_indicator() || rendered != Some(state.generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::refresh_controller::Phase;
    use std::sync::Arc;

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            available_months: vec!["2024-04".into(), "2024-05".into(), "2024-06".into()],
            selected_month: "2024-06".into(),
            kpi_cards: vec![],
            funnel_stages: vec![],
            section_ankenjika: vec![],
            section_apo_kakutoku: vec![],
            section_lead_kakutoku: vec![],
            last_updated: "2024-06-30T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("r"), Ok(ConsoleCommand::Refresh));
        assert_eq!(parse_command("  refresh "), Ok(ConsoleCommand::Refresh));
        assert_eq!(parse_command("q"), Ok(ConsoleCommand::Quit));
        assert_eq!(parse_command(""), Ok(ConsoleCommand::Help));
        assert_eq!(
            parse_command("m 2"),
            Ok(ConsoleCommand::SelectMonth(MonthRef::Index(2)))
        );
        assert_eq!(
            parse_command("m 2024-04"),
            Ok(ConsoleCommand::SelectMonth(MonthRef::Name("2024-04".into())))
        );
        assert_eq!(parse_command("m"), Err(CommandError::MissingMonth));
        assert_eq!(parse_command("x"), Err(CommandError::Unknown("x".into())));
    }

    #[test]
    fn test_resolve_month() {
        let snapshot = snapshot();
        assert_eq!(MonthRef::Index(1).resolve(&snapshot), Some("2024-04".into()));
        assert_eq!(MonthRef::Index(0).resolve(&snapshot), None);
        assert_eq!(MonthRef::Index(4).resolve(&snapshot), None);
        assert_eq!(MonthRef::Name("2024-05".into()).resolve(&snapshot), Some("2024-05".into()));
        assert_eq!(MonthRef::Name("2023-01".into()).resolve(&snapshot), None);
    }

    #[test]
    fn test_unknown_month_names_current_selection() {
        let mut selection = MonthSelection::new();
        assert_eq!(
            unknown_month(&MonthRef::Index(9), &selection),
            "unknown month: #9 (showing server default)"
        );

        selection.adopt_default(&snapshot());
        assert_eq!(
            unknown_month(&MonthRef::Name("2023-01".into()), &selection),
            "unknown month: 2023-01 (showing 2024-06)"
        );
    }

    #[test]
    fn test_should_render() {
        let loading = DashboardState {
            phase: Phase::Loading,
            snapshot: None,
            error: None,
            generation: 0,
        };
        assert!(should_render(&loading, Some(0)));

        let ready = DashboardState {
            phase: Phase::Ready,
            snapshot: Some(Arc::new(snapshot())),
            error: None,
            generation: 2,
        };
        assert!(should_render(&ready, Some(1)));
        assert!(!should_render(&ready, Some(2)));

        let refreshing = DashboardState {
            phase: Phase::Loading,
            ..ready
        };
        assert!(!should_render(&refreshing, Some(2)));
    }
}
