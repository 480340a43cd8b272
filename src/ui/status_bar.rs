// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts, toggle indicators
// and the transient notice line (rule errors, server replies).

use crate::app::{AppState, MapBackdrop};
use crate::theme::{ALERT_PINK, DIM_GRAY, GHOST_WHITE, NEON_CYAN, SIGNAL_YELLOW};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

struct Hint {
    priority: u8,
    key: &'static str,
    desc: &'static str,
}

static HINTS: [Hint; 8] = [
    Hint { priority: 1, key: "Q:", desc: "Quit | " },
    Hint { priority: 1, key: "1-3:", desc: "Scenario | " },
    Hint { priority: 1, key: "+/-:", desc: "Threshold | " },
    Hint { priority: 1, key: "M:", desc: "Mute | " },
    Hint { priority: 2, key: "I:", desc: "Add IP | " },
    Hint { priority: 2, key: "X:", desc: "Remove | " },
    Hint { priority: 3, key: "t:", desc: "Labels | " },
    Hint { priority: 3, key: "b:", desc: "Map | " },
];

/// Hints that fit in `available_width` cells, highest priority first,
/// kept in their declared order
fn visible_hints(available_width: usize) -> Vec<&'static Hint> {
    let mut chosen = vec![false; HINTS.len()];
    let mut used = 0;
    for priority in 1..=3 {
        for (idx, hint) in HINTS.iter().enumerate() {
            if hint.priority == priority {
                let len = hint.key.len() + hint.desc.len();
                if used + len <= available_width {
                    chosen[idx] = true;
                    used += len;
                }
            }
        }
    }
    HINTS
        .iter()
        .zip(chosen)
        .filter_map(|(hint, keep)| keep.then_some(hint))
        .collect()
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let available_width = usize::from(area.width.saturating_sub(4));

    let line = match &app.notice {
        Some(notice) => {
            let color = if notice.is_error { ALERT_PINK } else { SIGNAL_YELLOW };
            Line::from(vec![
                Span::styled(" ● ", Style::default().fg(color)),
                Span::styled(
                    notice.text.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ])
        }
        None => {
            let indicators = build_toggle_indicators(app);
            let indicator_width: usize = indicators.iter().map(|s| s.width()).sum();
            let mut spans = vec![Span::styled(" ◎ ", Style::default().fg(NEON_CYAN))];
            for hint in visible_hints(available_width.saturating_sub(indicator_width + 4)) {
                spans.push(Span::styled(
                    hint.key,
                    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(hint.desc));
            }
            spans.push(Span::raw(" "));
            spans.extend(indicators);
            Line::from(spans)
        }
    };

    let status_bar = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_CYAN)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

fn indicator(key: &'static str, state: String, on: bool) -> [Span<'static>; 3] {
    let color: Color = if on { NEON_CYAN } else { DIM_GRAY };
    [
        Span::styled(key, Style::default().fg(GHOST_WHITE)),
        Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("] ", Style::default().fg(GHOST_WHITE)),
    ]
}

/// Toggle status indicators: [M:ON/OFF] [t:ON/OFF] [b:HI/LO/OFF]
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let sound_on = app.synth.is_activated() && !app.synth.is_muted();
    let labels_on = app.map_settings.labels_enabled;
    let backdrop = app.map_settings.backdrop;

    let mut spans = Vec::new();
    spans.extend(indicator("[M:", if sound_on { "ON" } else { "OFF" }.to_string(), sound_on));
    spans.extend(indicator("[t:", if labels_on { "ON" } else { "OFF" }.to_string(), labels_on));
    spans.extend(indicator(
        "[b:",
        backdrop.label().to_string(),
        backdrop != MapBackdrop::Off,
    ));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_hints_fit_when_wide() {
        assert_eq!(visible_hints(500).len(), HINTS.len());
    }

    #[test]
    fn test_low_priority_hints_dropped_first() {
        let hints = visible_hints(30);
        assert!(!hints.is_empty());
        assert!(hints.iter().all(|h| h.priority == 1));
        assert_eq!(hints[0].key, "Q:");
    }

    #[test]
    fn test_no_hints_when_narrow() {
        assert!(visible_hints(3).is_empty());
    }
}
