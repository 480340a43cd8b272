// Firewall rules rendering module
//
// Renders the server-confirmed allow/deny lists and, while the user is
// typing, the IP input line.

use crate::app::{AppState, RuleInput};
use crate::telemetry::ListType;
use crate::theme::{ALERT_PINK, DIM_GRAY, GHOST_WHITE, NEON_CYAN, SIGNAL_YELLOW};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

const ALLOW_COLOR: Color = Color::Rgb(0, 230, 118);

fn list_color(list: ListType) -> Color {
    match list {
        ListType::Allow => ALLOW_COLOR,
        ListType::Deny => ALERT_PINK,
    }
}

/// Input line text: "[BLOCK] 10.0.0.▏"
pub fn input_line(input: &RuleInput) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("[{}] ", input.list.label()),
            Style::default()
                .fg(list_color(input.list))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(input.text.clone(), Style::default().fg(GHOST_WHITE)),
        Span::styled("▏", Style::default().fg(NEON_CYAN)),
    ])
}

pub fn render_firewall(f: &mut Frame, area: Rect, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if app.rule_input.is_some() {
            [Constraint::Min(0), Constraint::Length(3)]
        } else {
            [Constraint::Min(0), Constraint::Length(0)]
        })
        .split(area);

    let rules = app.rules.rules();
    let items: Vec<ListItem> = if !app.rules.is_loaded() {
        vec![ListItem::new(Span::styled(
            " loading rules...",
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        ))]
    } else if rules.is_empty() {
        vec![ListItem::new(Span::styled(
            " no rules (press i to add)",
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        ))]
    } else {
        rules
            .entries()
            .into_iter()
            .map(|(list, ip)| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!(" {:<6}", list.label()),
                        Style::default().fg(list_color(list)).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(ip.to_string(), Style::default().fg(GHOST_WHITE)),
                ]))
            })
            .collect()
    };

    let title = format!(
        " FIREWALL [{} allow | {} block] ",
        rules.allow.len(),
        rules.deny.len()
    );
    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(NEON_CYAN)),
        )
        .highlight_style(Style::default().bg(Color::Rgb(20, 40, 60)))
        .highlight_symbol("▶");

    f.render_stateful_widget(list, chunks[0], &mut app.rule_list_state);

    if let Some(input) = &app.rule_input {
        let field = Paragraph::new(input_line(input)).block(
            Block::default()
                .title(Span::styled(
                    " ADD IP (Tab: list, Enter: submit, Esc: cancel) ",
                    Style::default().fg(SIGNAL_YELLOW),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(SIGNAL_YELLOW)),
        );
        f.render_widget(field, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_line_shows_target_list() {
        let input = RuleInput {
            text: "10.0.0".to_string(),
            list: ListType::Allow,
        };
        let line = input_line(&input);
        assert_eq!(line.spans[0].content, "[ALLOW] ");
        assert_eq!(line.spans[1].content, "10.0.0");
    }
}
