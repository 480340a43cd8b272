// World map rendering module
//
// Every buffered event with a usable location becomes a line from its
// projected origin to the center of the map, plus a marker and an optional
// label. The scene is rebuilt only on redraw (after a push, a resize or a
// settings change); frames in between repaint the cached scene.

use crate::app::{AppState, MapBackdrop, MapSettings};
use crate::app::config::LABEL_PROBABILITY;
use crate::geo::{fit_rect, project, DrawRect, MAP_ASPECT_RATIO};
use crate::telemetry::{EventRingBuffer, SecurityEvent, Severity};
use crate::theme::{
    with_alpha, COASTLINE, GHOST_WHITE, NEON_CYAN, STEEL_BLUE, STROKE_CRITICAL, STROKE_HIGH,
    STROKE_LIVE, STROKE_OTHER,
};
use crate::ui::console::truncate_to_width;
use rand::Rng;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution, Points},
        Block, BorderType, Borders,
    },
    Frame,
};

/// Braille dots per terminal cell
const DOTS_PER_COLUMN: f64 = 2.0;
const DOTS_PER_ROW: f64 = 4.0;

/// Widest label drawn on the map, in terminal cells
const LABEL_MAX_WIDTH: usize = 24;

/// Glyph for markers wider than a single dot
const HEAVY_MARKER: &str = "●";

// ============================================================================
// Stroke policy
// ============================================================================

/// Colour, opacity and width of one event's line and marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub rgb: (u8, u8, u8),
    pub alpha: f32,
    pub width: f64,
}

/// Stroke for an event, first match wins:
/// live traffic, then CRITICAL, then HIGH, then everything else
pub fn stroke_style(event: &SecurityEvent) -> StrokeStyle {
    if event.is_live() {
        return StrokeStyle {
            rgb: STROKE_LIVE,
            alpha: 1.0,
            width: 1.5,
        };
    }
    let (rgb, alpha) = match event.verdict.severity {
        Severity::Critical => (STROKE_CRITICAL, 0.4),
        Severity::High => (STROKE_HIGH, 0.3),
        _ => (STROKE_OTHER, 0.1),
    };
    StrokeStyle {
        rgb,
        alpha,
        width: 1.0,
    }
}

// ============================================================================
// Scene
// ============================================================================

/// One event line, in surface pixels (y grows downward)
#[derive(Debug, Clone, PartialEq)]
pub struct MapStroke {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub style: StrokeStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub live: bool,
}

/// Everything the map draws for one buffer state
#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub viewport: (f64, f64),
    pub rect: DrawRect,
    pub backdrop: MapBackdrop,
    pub strokes: Vec<MapStroke>,
    pub labels: Vec<MapLabel>,
}

impl MapScene {
    fn empty(viewport: (f64, f64), backdrop: MapBackdrop) -> Self {
        Self {
            viewport,
            rect: fit_rect(viewport.0, viewport.1, MAP_ASPECT_RATIO),
            backdrop,
            strokes: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        self.rect.center()
    }
}

/// Build the scene for `buffer` on a `viewport_w` x `viewport_h` surface
///
/// Non-live events are labelled with probability `LABEL_PROBABILITY`, drawn
/// from `rng` once per event per call.
pub fn build_scene<R: Rng + ?Sized>(
    buffer: &EventRingBuffer,
    viewport_w: f64,
    viewport_h: f64,
    settings: &MapSettings,
    rng: &mut R,
) -> MapScene {
    let mut scene = MapScene::empty((viewport_w, viewport_h), settings.backdrop);
    if scene.rect.width <= 0.0 || scene.rect.height <= 0.0 {
        return scene;
    }
    let center = scene.center();

    for event in buffer.all() {
        let Some(geo) = event.plottable_geo() else {
            continue;
        };
        let p = project(geo.latitude, geo.longitude, viewport_w, viewport_h, MAP_ASPECT_RATIO);
        let (x, y) = (p.x, p.y);
        scene.strokes.push(MapStroke {
            from: (x, y),
            to: center,
            style: stroke_style(event),
        });

        if settings.labels_enabled && (event.is_live() || rng.gen_bool(LABEL_PROBABILITY)) {
            scene.labels.push(MapLabel {
                x,
                y,
                text: truncate_to_width(&geo.label(), LABEL_MAX_WIDTH),
                live: event.is_live(),
            });
        }
    }

    scene
}

/// Owns the cached scene and the surface size it was built for
#[derive(Debug, Clone)]
pub struct MapRenderer {
    viewport: (f64, f64),
    scene: MapScene,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            viewport: (0.0, 0.0),
            scene: MapScene::empty((0.0, 0.0), MapBackdrop::default()),
        }
    }

    /// Record the surface size; returns `true` if it changed
    pub fn set_viewport(&mut self, viewport_w: f64, viewport_h: f64) -> bool {
        if self.viewport == (viewport_w, viewport_h) {
            return false;
        }
        self.viewport = (viewport_w, viewport_h);
        true
    }

    /// Clear and rebuild the scene from the whole buffer
    pub fn redraw(&mut self, buffer: &EventRingBuffer, settings: &MapSettings) {
        self.redraw_with(buffer, settings, &mut rand::thread_rng());
    }

    pub fn redraw_with<R: Rng + ?Sized>(
        &mut self,
        buffer: &EventRingBuffer,
        settings: &MapSettings,
        rng: &mut R,
    ) {
        let (w, h) = self.viewport;
        self.scene = build_scene(buffer, w, h, settings, rng);
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Surface size in Braille dots for a cell area
pub fn viewport_for(area: Rect) -> (f64, f64) {
    (
        f64::from(area.width) * DOTS_PER_COLUMN,
        f64::from(area.height) * DOTS_PER_ROW,
    )
}

/// Cell area covering a fitted rectangle given in dots
fn cells_for(rect: &DrawRect, inner: Rect) -> Rect {
    let x = inner.x + (rect.left / DOTS_PER_COLUMN).round() as u16;
    let y = inner.y + (rect.top / DOTS_PER_ROW).round() as u16;
    let width = ((rect.width / DOTS_PER_COLUMN).round() as u16).min(inner.right().saturating_sub(x));
    let height = ((rect.height / DOTS_PER_ROW).round() as u16).min(inner.bottom().saturating_sub(y));
    Rect::new(x, y, width, height)
}

pub fn render_world_map(f: &mut Frame, area: Rect, app: &mut AppState) {
    let title = format!(
        " THREAT MAP [{}/{} events | map {}{}] ",
        app.buffer.len(),
        app.buffer.capacity(),
        app.map_settings.backdrop.label(),
        if app.map_settings.labels_enabled { "" } else { " | labels off" }
    );
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(NEON_CYAN));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let (w, h) = viewport_for(inner);
    app.resize_map(w, h);
    let scene = app.map.scene();

    // Backdrop in geographic bounds, drawn into the fitted cells
    let resolution = match scene.backdrop {
        MapBackdrop::High => Some(MapResolution::High),
        MapBackdrop::Low => Some(MapResolution::Low),
        MapBackdrop::Off => None,
    };
    if let Some(resolution) = resolution {
        let map_area = cells_for(&scene.rect, inner);
        if map_area.width > 0 && map_area.height > 0 {
            let backdrop = Canvas::default()
                .marker(Marker::Braille)
                .x_bounds([-180.0, 180.0])
                .y_bounds([-90.0, 90.0])
                .paint(move |ctx| {
                    ctx.draw(&Map {
                        resolution,
                        color: COASTLINE,
                    });
                });
            f.render_widget(backdrop, map_area);
        }
    }

    // Event overlay in surface pixels; blank cells leave the backdrop visible
    let is_empty = scene.strokes.is_empty();
    let (cx, cy) = scene.center();
    let overlay = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(move |ctx| {
            let flip = |y: f64| h - y;

            for stroke in &scene.strokes {
                let color = with_alpha(stroke.style.rgb, stroke.style.alpha);
                let (x1, y1) = stroke.from;
                let (x2, y2) = stroke.to;
                ctx.draw(&CanvasLine {
                    x1,
                    y1: flip(y1),
                    x2,
                    y2: flip(y2),
                    color,
                });
                if stroke.style.width > 1.0 {
                    ctx.draw(&CanvasLine {
                        x1: x1 + 1.0,
                        y1: flip(y1),
                        x2: x2 + 1.0,
                        y2: flip(y2),
                        color,
                    });
                }
            }

            ctx.layer();
            for stroke in &scene.strokes {
                let color = with_alpha(stroke.style.rgb, stroke.style.alpha);
                let (x, y) = stroke.from;
                if stroke.style.width > 1.0 {
                    ctx.print(x, flip(y), Span::styled(HEAVY_MARKER, Style::default().fg(color)));
                } else {
                    ctx.draw(&Points {
                        coords: &[(x, flip(y))],
                        color,
                    });
                }
            }

            for label in &scene.labels {
                let style = if label.live {
                    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(STEEL_BLUE)
                };
                ctx.print(label.x + DOTS_PER_COLUMN, flip(label.y), Span::styled(label.text.clone(), style));
            }

            if is_empty {
                let msg = "Awaiting telemetry...";
                let offset = msg.len() as f64 / 2.0 * DOTS_PER_COLUMN;
                ctx.print(
                    cx - offset,
                    flip(cy) - DOTS_PER_ROW * 2.0,
                    Span::styled(
                        msg,
                        Style::default().fg(GHOST_WHITE).add_modifier(Modifier::ITALIC),
                    ),
                );
            } else {
                ctx.print(cx, flip(cy), Span::styled("◎", Style::default().fg(NEON_CYAN)));
            }
        });
    f.render_widget(overlay, inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::fixtures::event;
    use crate::telemetry::{GeoPoint, Origin};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings(labels_enabled: bool) -> MapSettings {
        MapSettings {
            labels_enabled,
            ..MapSettings::default()
        }
    }

    fn live(n: u64) -> SecurityEvent {
        let mut e = event(n, Severity::None, false);
        e.origin = Origin::Live;
        e
    }

    fn at(mut e: SecurityEvent, lat: f64, lon: f64) -> SecurityEvent {
        e.geo = Some(GeoPoint {
            latitude: lat,
            longitude: lon,
            ..e.geo.unwrap_or_else(|| event(0, Severity::None, false).geo.unwrap())
        });
        e
    }

    #[test]
    fn test_stroke_policy_priority() {
        // Live wins over severity
        let mut e = live(1);
        e.verdict.severity = Severity::Critical;
        assert_eq!(
            stroke_style(&e),
            StrokeStyle { rgb: STROKE_LIVE, alpha: 1.0, width: 1.5 }
        );

        let crit = stroke_style(&event(2, Severity::Critical, true));
        assert_eq!((crit.rgb, crit.alpha, crit.width), (STROKE_CRITICAL, 0.4, 1.0));

        let high = stroke_style(&event(3, Severity::High, true));
        assert_eq!((high.rgb, high.alpha, high.width), (STROKE_HIGH, 0.3, 1.0));

        for sev in [Severity::Medium, Severity::Low, Severity::None] {
            let s = stroke_style(&event(4, sev, false));
            assert_eq!((s.rgb, s.alpha, s.width), (STROKE_OTHER, 0.1, 1.0));
        }
    }

    #[test]
    fn test_scene_skips_missing_and_null_island() {
        let mut buffer = EventRingBuffer::new();
        buffer.push(event(1, Severity::Low, false));
        buffer.push(at(event(2, Severity::Low, false), 0.0, 0.0));
        let mut no_geo = event(3, Severity::Low, false);
        no_geo.geo = None;
        buffer.push(no_geo);

        let scene = build_scene(&buffer, 400.0, 200.0, &settings(true), &mut StdRng::seed_from_u64(1));
        assert_eq!(scene.strokes.len(), 1);
    }

    #[test]
    fn test_lines_converge_on_center() {
        let mut buffer = EventRingBuffer::new();
        buffer.push(at(event(1, Severity::High, true), 35.0, 139.0));
        buffer.push(at(event(2, Severity::Low, false), -33.9, 151.2));
        let scene = build_scene(&buffer, 300.0, 100.0, &settings(false), &mut StdRng::seed_from_u64(1));

        // 300x100 is wider than 2:1, so the map is pillarboxed
        assert_eq!(scene.rect.width, 200.0);
        assert_eq!(scene.center(), (150.0, 50.0));
        for stroke in &scene.strokes {
            assert_eq!(stroke.to, (150.0, 50.0));
        }
        // Tokyo is north-east of the center
        let (x, y) = scene.strokes[0].from;
        assert!(x > 150.0 && y < 50.0);
    }

    #[test]
    fn test_zero_viewport_draws_nothing() {
        let mut buffer = EventRingBuffer::new();
        buffer.push(live(1));
        let scene = build_scene(&buffer, 0.0, 0.0, &settings(true), &mut StdRng::seed_from_u64(1));
        assert!(scene.strokes.is_empty());
        assert!(scene.labels.is_empty());
    }

    #[test]
    fn test_live_events_always_labelled() {
        let mut buffer = EventRingBuffer::new();
        for n in 0..10 {
            buffer.push(live(n));
        }
        let scene = build_scene(&buffer, 200.0, 100.0, &settings(true), &mut StdRng::seed_from_u64(7));
        assert_eq!(scene.labels.len(), 10);
        assert!(scene.labels.iter().all(|l| l.live && l.text == "Paris, France"));
    }

    #[test]
    fn test_labels_toggle_hides_everything() {
        let mut buffer = EventRingBuffer::new();
        buffer.push(live(1));
        let scene = build_scene(&buffer, 200.0, 100.0, &settings(false), &mut StdRng::seed_from_u64(7));
        assert!(scene.labels.is_empty());
        assert_eq!(scene.strokes.len(), 1);
    }

    #[test]
    fn test_simulated_label_rate_is_about_one_in_twenty() {
        let mut buffer = EventRingBuffer::new();
        for n in 0..50 {
            buffer.push(event(n, Severity::Low, false));
        }
        let mut rng = StdRng::seed_from_u64(42);
        let mut labelled = 0;
        let rounds = 200;
        for _ in 0..rounds {
            labelled += build_scene(&buffer, 200.0, 100.0, &settings(true), &mut rng).labels.len();
        }
        let rate = labelled as f64 / (rounds * 50) as f64;
        assert!(rate > 0.03 && rate < 0.07, "label rate {rate}");
    }

    #[test]
    fn test_renderer_rebuilds_on_resize_only() {
        let mut renderer = MapRenderer::new();
        assert!(renderer.set_viewport(200.0, 100.0));
        assert!(!renderer.set_viewport(200.0, 100.0));

        let mut buffer = EventRingBuffer::new();
        buffer.push(event(1, Severity::High, true));
        renderer.redraw(&buffer, &settings(true));
        assert_eq!(renderer.scene().strokes.len(), 1);
        assert_eq!(renderer.scene().viewport, (200.0, 100.0));
    }

    #[test]
    fn test_cells_for_fitted_rect() {
        let inner = Rect::new(1, 1, 100, 25);
        let (w, h) = viewport_for(inner);
        assert_eq!((w, h), (200.0, 100.0));
        let rect = fit_rect(w, h, MAP_ASPECT_RATIO);
        assert_eq!(cells_for(&rect, inner), inner);
    }

    proptest! {
        #[test]
        fn prop_strokes_stay_inside_fitted_rect(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
            w in 10.0f64..2000.0,
            h in 10.0f64..2000.0,
        ) {
            prop_assume!(lat != 0.0 || lon != 0.0);
            let mut buffer = EventRingBuffer::new();
            buffer.push(at(event(1, Severity::Low, false), lat, lon));
            let scene = build_scene(&buffer, w, h, &settings(false), &mut StdRng::seed_from_u64(0));
            prop_assert_eq!(scene.strokes.len(), 1);
            let (x, y) = scene.strokes[0].from;
            prop_assert!(x >= scene.rect.left - 1e-9 && x <= scene.rect.right() + 1e-9);
            prop_assert!(y >= scene.rect.top - 1e-9 && y <= scene.rect.bottom() + 1e-9);
        }
    }
}
