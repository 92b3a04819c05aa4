//! Text rendering of board state and the tasks that print it on change.

use std::fmt::Write;

use tickerboard_core::{Dashboard, DetailState, Phase, TickerState};
use tickerboard_market_data::{ErrorInfo, Series};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub fn ticker_line(state: &TickerState) -> String {
    let mut line = format!("{:<6}", state.symbol.as_str());
    match &state.quote {
        Some(quote) => {
            let _ = write!(
                line,
                "{:>10.2} {} {:>+7.2}%  {}",
                quote.price,
                if quote.is_gain() { '▲' } else { '▼' },
                quote.change_percent,
                sparkline(&state.series)
            );
        }
        None => line.push_str(&format!("{:>10} {:>10}", "--", "--")),
    }
    line.push_str(&status_suffix(state.phase, state.error.as_ref()));
    if state.is_stale() {
        line.push_str(" (stale)");
    }
    line
}

pub fn detail_line(state: &DetailState) -> String {
    let Some(symbol) = state.symbol else {
        return "detail: nothing selected".to_string();
    };
    let mut line = format!("detail {}: {} points", symbol, state.series.len());
    if let Some(latest) = state.series.latest() {
        let _ = write!(line, ", last {:.2} at {}", latest.close, latest.timestamp);
    }
    line.push_str(&status_suffix(state.phase, state.error.as_ref()));
    line
}

pub fn page_error_line(error: Option<&ErrorInfo>) -> String {
    match error {
        Some(error) if error.is_rate_limited() => format!("! rate limited: {}", error),
        Some(error) => format!("! {}", error),
        None => "page error cleared".to_string(),
    }
}

pub fn board(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    for state in dashboard.tickers() {
        out.push_str(&ticker_line(&state));
        out.push('\n');
    }
    out.push_str(&detail_line(&dashboard.detail()));
    if let Some(error) = dashboard.page_error() {
        out.push('\n');
        out.push_str(&page_error_line(Some(&error)));
    }
    out
}

fn status_suffix(phase: Phase, error: Option<&ErrorInfo>) -> String {
    match (phase, error) {
        (Phase::Idle, _) => "  [idle]".to_string(),
        (Phase::Loading, _) => "  [loading]".to_string(),
        (Phase::Success, _) => String::new(),
        (Phase::Error, Some(error)) => format!("  [error: {}]", error),
        (Phase::Error, None) => "  [error]".to_string(),
    }
}

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Unicode bar chart of the closes, scaled to their own range.
fn sparkline(series: &Series) -> String {
    let (min, max) = series
        .closes()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c), hi.max(c))
        });
    let span = max - min;
    series
        .closes()
        .map(|close| {
            if span <= 0.0 {
                BARS[0]
            } else {
                let slot = ((close - min) / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[slot.min(BARS.len() - 1)]
            }
        })
        .collect()
}

/// Print every state change until aborted.
pub fn spawn_watchers(dashboard: &Dashboard) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();
    for symbol in dashboard.symbols() {
        if let Ok(rx) = dashboard.subscribe_ticker(*symbol) {
            handles.push(tokio::spawn(print_changes(rx, ticker_line)));
        }
    }
    handles.push(tokio::spawn(print_changes(
        dashboard.subscribe_detail(),
        detail_line,
    )));
    handles.push(tokio::spawn(print_changes(
        dashboard.subscribe_page_error(),
        |error: &Option<ErrorInfo>| page_error_line(error.as_ref()),
    )));
    handles
}

async fn print_changes<T, F>(mut rx: watch::Receiver<T>, render: F)
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> String + Send + 'static,
{
    let mut last = String::new();
    while rx.changed().await.is_ok() {
        let line = render(&*rx.borrow_and_update());
        if line != last {
            println!("{}", line);
            last = line;
        }
    }
}
