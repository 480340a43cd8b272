// Console (event log) rendering module
//
// Renders the buffered events as a newest-first log, capped at
// CONSOLE_MAX_LINES entries.

use crate::app::config::CONSOLE_MAX_LINES;
use crate::app::AppState;
use crate::telemetry::{EventRingBuffer, SecurityEvent, Severity};
use crate::theme::{severity_color, DIM_GRAY, GHOST_WHITE, NEON_CYAN, STEEL_BLUE};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// One rendered log entry
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleLine {
    pub timestamp: String,
    pub ip: String,
    pub live: bool,
    /// "[City, Country]" when the city is known
    pub location: Option<String>,
    pub message: String,
    pub is_attack: bool,
    pub severity: Severity,
}

impl ConsoleLine {
    fn from_event(event: &SecurityEvent) -> Self {
        let location = event
            .geo
            .as_ref()
            .filter(|g| g.has_city())
            .map(|g| format!("[{}, {}]", g.city, g.country));
        Self {
            timestamp: event.timestamp.clone(),
            ip: event.source_ip.clone(),
            live: event.is_live(),
            location,
            message: event.verdict.message.clone(),
            is_attack: event.verdict.is_attack,
            severity: event.verdict.severity,
        }
    }
}

/// Buffer entries as log lines, newest first, at most `max_lines`
pub fn console_lines(buffer: &EventRingBuffer, max_lines: usize) -> Vec<ConsoleLine> {
    buffer
        .all()
        .rev()
        .take(max_lines)
        .map(ConsoleLine::from_event)
        .collect()
}

/// Cut `text` to at most `max_width` terminal cells, marking the cut with '…'
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn render_console(f: &mut Frame, area: Rect, app: &AppState) {
    let lines = console_lines(&app.buffer, CONSOLE_MAX_LINES);
    // Borders plus the timestamp and IP columns
    let message_width = usize::from(area.width.saturating_sub(2)).saturating_sub(34);

    let items: Vec<ListItem> = if app.buffer.is_empty() {
        vec![ListItem::new(Span::styled(
            " waiting for the first event...",
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        lines
            .iter()
            .map(|line| {
                let text_color = if line.is_attack {
                    severity_color(line.severity)
                } else {
                    GHOST_WHITE
                };

                let mut spans = vec![
                    Span::styled(format!("[{}] ", line.timestamp), Style::default().fg(DIM_GRAY)),
                ];
                if line.live {
                    spans.push(Span::styled(
                        "LIVE ",
                        Style::default()
                            .fg(Color::Black)
                            .bg(NEON_CYAN)
                            .add_modifier(Modifier::BOLD),
                    ));
                }
                spans.push(Span::styled(format!("{:<15} ", line.ip), Style::default().fg(STEEL_BLUE)));

                let message = match &line.location {
                    Some(loc) => format!("{} {}", loc, line.message),
                    None => line.message.clone(),
                };
                spans.push(Span::styled(
                    truncate_to_width(&message, message_width),
                    Style::default().fg(text_color),
                ));

                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let title = format!(" EVENT LOG ({}) ", lines.len());
    let list = List::new(items).block(
        Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(NEON_CYAN)),
    );

    f.render_widget(list, area);
}
