// Theme module - Color constants and theme re-exports
//
// Neon-on-black "security operations" palette. Map stroke colours carry the
// exact RGB of the stroke policy; alpha is applied by blending toward
// MAP_BACKGROUND since terminals have no transparency.

pub mod default;

use ratatui::style::Color;

/// Primary accent - borders, titles, live traffic, normal chart palette
/// RGB: (0, 243, 255)
pub const NEON_CYAN: Color = Color::Rgb(0, 243, 255);

/// Alert chart palette and DDoS bar
/// RGB: (255, 0, 85)
pub const ALERT_PINK: Color = Color::Rgb(255, 0, 85);

/// Brute force bar, medium severity
/// RGB: (255, 204, 0)
pub const SIGNAL_YELLOW: Color = Color::Rgb(255, 204, 0);

/// "Other" bar, inactive text
/// RGB: (136, 136, 136)
pub const DIM_GRAY: Color = Color::Rgb(136, 136, 136);

/// Axis text and secondary labels
/// RGB: (136, 170, 255)
pub const STEEL_BLUE: Color = Color::Rgb(136, 170, 255);

/// General foreground text
/// RGB: (200, 214, 229)
pub const GHOST_WHITE: Color = Color::Rgb(200, 214, 229);

/// Map stroke colours before alpha
pub const STROKE_LIVE: (u8, u8, u8) = (0, 243, 255);
pub const STROKE_CRITICAL: (u8, u8, u8) = (255, 0, 0);
pub const STROKE_HIGH: (u8, u8, u8) = (255, 165, 0);
pub const STROKE_OTHER: (u8, u8, u8) = (0, 255, 0);

/// Background the map strokes are blended toward
pub const MAP_BACKGROUND: (u8, u8, u8) = (4, 6, 18);

/// Coastline colour for the world backdrop
pub const COASTLINE: Color = Color::Rgb(28, 52, 84);

pub use default::*;
