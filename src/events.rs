use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, View};
use crate::sort::SortMetric;

/// Where the `x` key writes the live report.
pub const EXPORT_PATH: &str = "circuitwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Map a key to the sort metric it selects.
fn sort_metric_for(code: KeyCode) -> Option<SortMetric> {
    let metric = match code {
        KeyCode::Char('a') => SortMetric::Alphabetical,
        KeyCode::Char('v') => SortMetric::Volume,
        KeyCode::Char('e') => SortMetric::Error,
        KeyCode::Char('t') => SortMetric::ErrorThenVolume,
        KeyCode::Char('m') => SortMetric::LatencyMean,
        KeyCode::Char('d') => SortMetric::LatencyMedian,
        KeyCode::Char('9') => SortMetric::Latency90,
        KeyCode::Char('0') => SortMetric::Latency99,
        KeyCode::Char('.') => SortMetric::Latency995,
        _ => return None,
    };
    Some(metric)
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if let Some(metric) = sort_metric_for(key.code) {
        app.sort(metric);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Circuits),
        KeyCode::Char('2') => app.set_view(View::ThreadPools),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Scrolling through tiles
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_home(),
        KeyCode::End => app.scroll_end(),

        KeyCode::Char('c') => app.clear_dashboard(),

        KeyCode::Char('r') => {
            if !app.reload_data() {
                app.set_status_message("No new data".to_string());
            }
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('x') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(1),
        MouseEventKind::ScrollDown => app.scroll_down(1),
        _ => {}
    }
}
