//! Plain-text rendering of the dashboard.

use std::fmt::Write;

use chrono::{DateTime, Local, Timelike};
use skypane_store::Theme;
use skypane_weather::{weather_code_to_emoji, weather_code_to_text, Units};

use crate::controller::Dashboard;
use crate::state::{DataSource, Tab, ViewStatus};

const HOURLY_CARDS: usize = 12;
const DAILY_CARDS: usize = 7;
const PLACEHOLDER_VALUE: &str = "—";

/// Render the whole screen as text. Writing to a `String` cannot fail.
pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let prefs = dashboard.preferences();

    let _ = writeln!(
        out,
        "Skypane Weather   [{}] [{}]",
        prefs.units.temperature_symbol(),
        prefs.theme.as_str()
    );
    let _ = writeln!(out);

    render_card(&mut out, dashboard, prefs.units);
    let _ = writeln!(out);
    render_saved(&mut out, dashboard);

    match dashboard.status() {
        ViewStatus::Loading => {
            let _ = writeln!(out, "\nLoading…");
        }
        ViewStatus::Failed(kind) => {
            let _ = writeln!(out, "\n{}", kind.user_message());
        }
        ViewStatus::Loaded {
            source: DataSource::Cached { timestamp },
            ..
        } => {
            let _ = writeln!(
                out,
                "\nOffline: showing data cached {}",
                format_timestamp(*timestamp)
            );
        }
        ViewStatus::Idle | ViewStatus::Loaded { .. } => {}
    }

    out
}

fn render_card(out: &mut String, dashboard: &Dashboard, preferred: Units) {
    let _ = writeln!(out, "{}", dashboard.location_label());

    let Some(snapshot) = dashboard.status().snapshot() else {
        let _ = writeln!(out, "{}{}", PLACEHOLDER_VALUE, preferred.temperature_symbol());
        let _ = writeln!(
            out,
            "Humidity {}% · Wind {} {}",
            PLACEHOLDER_VALUE,
            PLACEHOLDER_VALUE,
            preferred.speed_unit()
        );
        return;
    };

    // Numbers are in the snapshot's own units; a cached snapshot may predate a toggle.
    let units = snapshot.units;
    let symbol = units.temperature_symbol();
    let current = &snapshot.current;

    let _ = writeln!(out, "{}{}", current.temperature, symbol);
    let _ = writeln!(out, "{}", weather_code_to_text(current.weather_code));
    let _ = writeln!(
        out,
        "Humidity {}% · Wind {} {}",
        current.humidity_percent,
        current.wind_speed,
        units.speed_unit()
    );
    let _ = writeln!(out);

    let tab = dashboard.tab();
    let _ = writeln!(
        out,
        "{}  {}",
        tab_label("Hourly", tab == Tab::Hourly),
        tab_label("Daily", tab == Tab::Daily)
    );

    match tab {
        Tab::Hourly => {
            for point in snapshot.hourly.iter().take(HOURLY_CARDS) {
                let hour = point.time.hour();
                let _ = writeln!(
                    out,
                    "  {:02}–{:02}  {}  {}{}",
                    hour,
                    (hour + 1) % 24,
                    weather_code_to_emoji(point.weather_code),
                    point.temperature.round(),
                    symbol
                );
            }
        }
        Tab::Daily => {
            for point in snapshot.daily.iter().take(DAILY_CARDS) {
                let _ = writeln!(
                    out,
                    "  {}  {}  {}{} / {}{}",
                    point.date.format("%a"),
                    weather_code_to_emoji(point.weather_code),
                    point.max.round(),
                    symbol,
                    point.min.round(),
                    symbol
                );
            }
        }
    }
}

fn render_saved(out: &mut String, dashboard: &Dashboard) {
    let _ = writeln!(out, "Saved Areas");
    if dashboard.saved().is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for label in dashboard.saved().labels() {
        let _ = writeln!(out, "  • {}", label);
    }
}

fn tab_label(name: &str, active: bool) -> String {
    if active {
        format!("[{}]", name)
    } else {
        format!(" {} ", name)
    }
}

fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "at an unknown time".to_string())
}

/// Wrap rendered text in ANSI colors for the chosen theme.
pub fn paint(text: &str, theme: Theme) -> String {
    let (start, end) = match theme {
        Theme::Dark => ("\x1b[97;48;5;236m", "\x1b[0m"),
        Theme::Light => ("\x1b[30;48;5;254m", "\x1b[0m"),
    };
    text.lines()
        .map(|line| format!("{}{}{}", start, line, end))
        .collect::<Vec<_>>()
        .join("\n")
}
