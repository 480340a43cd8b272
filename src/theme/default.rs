// Theme functions
//
// Colour lookups for severities, threat levels and chart palettes, plus the
// alpha emulation used by the map.

use ratatui::style::Color;

use super::{ALERT_PINK, DIM_GRAY, GHOST_WHITE, MAP_BACKGROUND, NEON_CYAN, SIGNAL_YELLOW};
use crate::telemetry::chart::AttackCategory;
use crate::telemetry::{ChartPalette, Severity};

const RED: Color = Color::Rgb(255, 59, 48);
const ORANGE: Color = Color::Rgb(255, 165, 0);
const GREEN: Color = Color::Rgb(0, 230, 118);

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
///
/// # Arguments
/// * `color1` - Starting color as (r, g, b) tuple
/// * `color2` - Ending color as (r, g, b) tuple
/// * `ratio` - Interpolation ratio (0.0 = color1, 1.0 = color2)
///
/// # Returns
/// Interpolated Color::Rgb value
pub fn interpolate_color(color1: (u8, u8, u8), color2: (u8, u8, u8), ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Composite `rgb` at opacity `alpha` over the map background
pub fn with_alpha(rgb: (u8, u8, u8), alpha: f32) -> Color {
    interpolate_color(MAP_BACKGROUND, rgb, alpha)
}

/// Console/inspector colour for a severity
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => RED,
        Severity::High => ORANGE,
        Severity::Medium => SIGNAL_YELLOW,
        Severity::Low => GREEN,
        Severity::None => DIM_GRAY,
    }
}

/// Colour for the server's current threat level string
pub fn threat_level_color(level: &str) -> Color {
    match level.to_ascii_uppercase().as_str() {
        "CRITICAL" => RED,
        "HIGH" => ORANGE,
        "MEDIUM" | "ELEVATED" => SIGNAL_YELLOW,
        "LOW" => GREEN,
        _ => GHOST_WHITE,
    }
}

pub fn palette_color(palette: ChartPalette) -> Color {
    match palette {
        ChartPalette::Normal => NEON_CYAN,
        ChartPalette::Alert => ALERT_PINK,
    }
}

/// Bar colours for the distribution chart, in category order
pub fn category_color(category: AttackCategory) -> Color {
    match category {
        AttackCategory::Ddos => ALERT_PINK,
        AttackCategory::BruteForce => SIGNAL_YELLOW,
        AttackCategory::Malware => NEON_CYAN,
        AttackCategory::Other => DIM_GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_endpoints() {
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 0.0), Color::Rgb(0, 0, 0));
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 1.0), Color::Rgb(200, 100, 50));
        // Out of range ratios clamp
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 3.0), Color::Rgb(200, 100, 50));
    }

    #[test]
    fn test_alpha_blends_toward_background() {
        let (br, bg, bb) = MAP_BACKGROUND;
        assert_eq!(with_alpha((255, 0, 0), 0.0), Color::Rgb(br, bg, bb));
        assert_eq!(with_alpha((255, 0, 0), 1.0), Color::Rgb(255, 0, 0));
        let Color::Rgb(r, _, _) = with_alpha((255, 0, 0), 0.4) else {
            panic!("expected rgb");
        };
        assert!(r > br && r < 255);
    }

    #[test]
    fn test_palette_colors_differ() {
        assert_ne!(palette_color(ChartPalette::Normal), palette_color(ChartPalette::Alert));
    }

    #[test]
    fn test_threat_level_is_case_insensitive() {
        assert_eq!(threat_level_color("critical"), threat_level_color("CRITICAL"));
        assert_eq!(threat_level_color("???"), GHOST_WHITE);
    }
}
