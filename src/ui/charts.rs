// Chart rendering module
//
// Attack probability as a sparkline over the sliding window, and the
// server-reported category distribution as a bar chart.

use crate::app::AppState;
use crate::telemetry::chart::{AttackCategory, ChartState};
use crate::telemetry::ChartPalette;
use crate::theme::{category_color, palette_color, DIM_GRAY, NEON_CYAN};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Sparkline},
    Frame,
};

/// Probability samples scaled to whole percent for the sparkline
pub fn probability_bars(charts: &ChartState) -> Vec<u64> {
    charts
        .series
        .samples()
        .map(|p| (p.clamp(0.0, 1.0) * 100.0).round() as u64)
        .collect()
}

pub fn render_charts(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_probability(f, chunks[0], &app.charts);
    render_distribution(f, chunks[1], &app.charts);
}

fn render_probability(f: &mut Frame, area: Rect, charts: &ChartState) {
    let palette = charts.series.palette();
    let color = palette_color(palette);
    let latest = charts.series.latest().unwrap_or(0.0);
    let marker = match palette {
        ChartPalette::Alert => " ALERT",
        ChartPalette::Normal => "",
    };

    let data = probability_bars(charts);
    // Newest samples on the right edge when the panel is narrower than the window
    let visible = usize::from(area.width.saturating_sub(2));
    let start = data.len().saturating_sub(visible);

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(Line::from(vec![
                    Span::styled(
                        " ATTACK PROBABILITY ",
                        Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{:.0}%{} ", latest * 100.0, marker),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        )
        .data(&data[start..])
        .max(100)
        .style(Style::default().fg(color));

    f.render_widget(sparkline, area);
}

fn render_distribution(f: &mut Frame, area: Rect, charts: &ChartState) {
    let bars: Vec<Bar> = AttackCategory::ALL
        .iter()
        .map(|category| {
            let count = charts.distribution.get(*category);
            Bar::default()
                .value(count)
                .label(Line::from(category.label()))
                .style(Style::default().fg(category_color(*category)))
                .value_style(Style::default().fg(DIM_GRAY).add_modifier(Modifier::REVERSED))
        })
        .collect();

    // Share the inner width between the four bars
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width.saturating_sub(3) / 4).clamp(1, 12);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" ATTACK TYPES ({}) ", charts.distribution.total()),
                    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(NEON_CYAN)),
        )
        .direction(Direction::Vertical)
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bars_scale_to_percent() {
        let mut charts = ChartState::default();
        charts.push_sample(0.42);
        charts.push_sample(1.0);
        let bars = probability_bars(&charts);
        assert_eq!(bars.len(), 50);
        assert_eq!(&bars[48..], &[42, 100]);
        assert!(bars[..48].iter().all(|&b| b == 0));
    }
}
