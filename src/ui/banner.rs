// Banner rendering module
//
// Renders the top banner: logo, control state (scenario, threshold, sound),
// the plain metric display and the alert scope.

use crate::app::AppState;
use crate::telemetry::{Metrics, Scenario, Severity};
use crate::theme::{
    threat_level_color, ALERT_PINK, DIM_GRAY, GHOST_WHITE, NEON_CYAN, SIGNAL_YELLOW, STEEL_BLUE,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Sparkline},
    Frame,
};

/// Placeholder for metrics the service has not reported yet
const NO_VALUE: &str = "--";

/// Display strings for the metric panel, one per line
pub fn metric_lines(metrics: &Metrics) -> Vec<(&'static str, String)> {
    let count = |v: Option<u64>| v.map_or_else(|| NO_VALUE.to_string(), |n| n.to_string());
    let percent = |v: Option<f64>| v.map_or_else(|| NO_VALUE.to_string(), |n| format!("{n:.1}%"));
    vec![
        ("Requests", count(metrics.total_requests)),
        ("Blocked", count(metrics.attacks_blocked)),
        (
            "Threat",
            metrics
                .threat_level
                .clone()
                .unwrap_or_else(|| NO_VALUE.to_string()),
        ),
        ("CPU", percent(metrics.cpu)),
        ("RAM", percent(metrics.ram)),
        (
            "Net",
            metrics
                .net_mbps
                .map_or_else(|| NO_VALUE.to_string(), |n| format!("{n:.2} Mbps")),
        ),
    ]
}

pub fn render_banner(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(NEON_CYAN));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Logo + controls
            Constraint::Percentage(30), // Metrics
            Constraint::Percentage(30), // Alert scope
        ])
        .split(inner);

    render_controls(f, columns[0], app);
    render_metrics(f, columns[1], &app.metrics);
    render_alert_scope(f, columns[2], app);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let mut scenario_spans = vec![Span::styled("Scenario ", Style::default().fg(DIM_GRAY))];
    for (idx, scenario) in Scenario::ALL.iter().enumerate() {
        let style = if *scenario == app.scenario {
            Style::default()
                .fg(Color::Black)
                .bg(NEON_CYAN)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(STEEL_BLUE)
        };
        scenario_spans.push(Span::styled(format!(" {}:{} ", idx + 1, scenario.label()), style));
    }

    let sound = if !app.synth.is_activated() {
        Span::styled("press any key", Style::default().fg(DIM_GRAY))
    } else if app.synth.is_muted() {
        Span::styled("MUTED", Style::default().fg(ALERT_PINK).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("ON", Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD))
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                " THREATSCOPE",
                Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  // live security telemetry", Style::default().fg(DIM_GRAY)),
        ]),
        Line::from(""),
        Line::from(scenario_spans),
        Line::from(vec![
            Span::styled("Threshold ", Style::default().fg(DIM_GRAY)),
            Span::styled(
                format!("{:>3}%", app.threshold_percent),
                Style::default().fg(SIGNAL_YELLOW).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Sound ", Style::default().fg(DIM_GRAY)),
            sound,
        ]),
    ];

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Left), area);
}

fn render_metrics(f: &mut Frame, area: Rect, metrics: &Metrics) {
    let level_color = metrics
        .threat_level
        .as_deref()
        .map_or(GHOST_WHITE, threat_level_color);

    let lines: Vec<Line> = metric_lines(metrics)
        .into_iter()
        .map(|(label, value)| {
            let value_style = if label == "Threat" {
                Style::default().fg(level_color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(GHOST_WHITE)
            };
            Line::from(vec![
                Span::styled(format!("{label:<9}"), Style::default().fg(DIM_GRAY)),
                Span::styled(value, value_style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

/// Waveform of the most recent alert voice
fn render_alert_scope(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let (caption, data, color) = match app.synth.last_voice() {
        Some(voice) => (
            format!("alert #{} {}", voice.id, voice.severity.as_str()),
            voice.scope(usize::from(chunks[1].width)),
            if voice.severity == Severity::Critical {
                ALERT_PINK
            } else {
                SIGNAL_YELLOW
            },
        ),
        None => ("no alerts yet".to_string(), Vec::new(), DIM_GRAY),
    };

    f.render_widget(
        Paragraph::new(Span::styled(caption, Style::default().fg(DIM_GRAY))),
        chunks[0],
    );
    f.render_widget(Sparkline::default().data(&data).style(Style::default().fg(color)), chunks[1]);
}
