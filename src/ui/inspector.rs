// Event inspector rendering module
//
// Shows the verdict of the newest event in full: severity, probability,
// category and message, the recommendation and network details.

use crate::app::AppState;
use crate::telemetry::{SecurityEvent, Severity};
use crate::theme::{severity_color, DIM_GRAY, GHOST_WHITE, NEON_CYAN, STEEL_BLUE};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

/// View model for the inspector panel, extracted from the newest event
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorView {
    pub headline: String,
    pub severity: Severity,
    pub is_attack: bool,
    pub probability_percent: f64,
    pub category: Option<String>,
    pub message: String,
    pub recommendation: Option<String>,
    pub source: String,
    pub location: String,
    pub isp: Option<String>,
}

impl InspectorView {
    pub fn from_event(event: &SecurityEvent) -> Self {
        let verdict = &event.verdict;
        let headline = match &verdict.emoji {
            Some(emoji) => format!("{} {}", emoji, verdict.severity.as_str()),
            None => verdict.severity.as_str().to_string(),
        };
        let origin = if event.is_live() { "LIVE" } else { "SIM" };
        let (location, isp) = match &event.geo {
            Some(geo) => (
                match &geo.region {
                    Some(region) if geo.has_city() => format!("{}, {}, {}", geo.city, region, geo.country),
                    _ => geo.label(),
                },
                geo.isp.clone(),
            ),
            None => ("Unknown".to_string(), None),
        };

        Self {
            headline,
            severity: verdict.severity,
            is_attack: verdict.is_attack,
            probability_percent: verdict.probability * 100.0,
            category: verdict.category.clone(),
            message: verdict.message.clone(),
            recommendation: verdict.recommendation.clone(),
            source: format!("{} ({}) @ {}", event.source_ip, origin, event.timestamp),
            location,
            isp,
        }
    }
}

fn field(label: &'static str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<8}"), Style::default().fg(DIM_GRAY)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn render_inspector(f: &mut Frame, area: Rect, app: &AppState) {
    let lines: Vec<Line> = match app.buffer.newest().map(InspectorView::from_event) {
        None => vec![Line::from(Span::styled(
            "Waiting for the first event...",
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        ))],
        Some(view) => {
            let color = if view.is_attack {
                severity_color(view.severity)
            } else {
                GHOST_WHITE
            };
            let mut lines = vec![
                Line::from(Span::styled(
                    view.headline.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                field("Prob", format!("{:.1}%", view.probability_percent), color),
                field("Source", view.source.clone(), STEEL_BLUE),
                field("Where", view.location.clone(), STEEL_BLUE),
            ];
            if let Some(isp) = &view.isp {
                lines.push(field("ISP", isp.clone(), STEEL_BLUE));
            }
            if let Some(category) = &view.category {
                lines.push(field("Type", category.clone(), color));
            }
            lines.push(field("Verdict", view.message.clone(), GHOST_WHITE));
            if let Some(rec) = &view.recommendation {
                lines.push(field("Action", rec.clone(), NEON_CYAN));
            }
            lines
        }
    };

    let inspector = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    " INSPECTOR ",
                    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(NEON_CYAN)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(inspector, area);
}
