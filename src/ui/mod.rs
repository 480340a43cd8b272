// UI rendering module
//
// This module contains all UI rendering components for threatscope.
// The main draw() function orchestrates rendering of all UI panels.

mod banner;
mod charts;
pub mod console;
mod firewall;
mod inspector;
mod status_bar;
pub mod world_map;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use banner::render_banner;
use charts::render_charts;
use console::render_console;
use firewall::render_firewall;
use inspector::render_inspector;
use status_bar::render_status_bar;
use world_map::render_world_map;

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let size = f.area();

    // Main layout: banner, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Banner
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_banner(f, chunks[0], app);

    // Body: map + console on the left, charts and panels on the right
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Map + console
            Constraint::Percentage(35), // Right panels
        ])
        .split(chunks[1]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(65), // World map
            Constraint::Percentage(35), // Event log
        ])
        .split(body_chunks[0]);

    render_world_map(f, left_chunks[0], app);
    render_console(f, left_chunks[1], app);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40), // Charts
            Constraint::Percentage(30), // Inspector
            Constraint::Percentage(30), // Firewall
        ])
        .split(body_chunks[1]);

    render_charts(f, right_chunks[0], app);
    render_inspector(f, right_chunks[1], app);
    render_firewall(f, right_chunks[2], app);

    render_status_bar(f, chunks[2], app);
}
