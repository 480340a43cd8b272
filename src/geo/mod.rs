// Geospatial projection module
//
// Maps (latitude, longitude) onto drawing-surface pixels using an
// equirectangular projection letterboxed into the viewport.
// Pure functions only; recomputed on every viewport resize.

/// Default aspect ratio (width / height) of the world map backdrop
pub const MAP_ASPECT_RATIO: f64 = 2.0;

/// Largest rectangle of the map aspect ratio that fits centered in a viewport
///
/// Coordinates are in surface pixels with the origin at the top-left corner
/// and y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    #[cfg(test)]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[cfg(test)]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Center of the rectangle, where all event lines converge
    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Result of projecting one coordinate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f64,
    pub y: f64,
    pub rect: DrawRect,
}

/// Fit a rectangle of `aspect` (width / height) centered within the viewport
///
/// A viewport wider than the aspect is pillarboxed (full height, centered
/// horizontally); otherwise it is letterboxed (full width, centered vertically).
pub fn fit_rect(viewport_w: f64, viewport_h: f64, aspect: f64) -> DrawRect {
    if viewport_h <= 0.0 || viewport_w <= 0.0 {
        return DrawRect {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };
    }

    let viewport_aspect = viewport_w / viewport_h;
    if viewport_aspect > aspect {
        let height = viewport_h;
        let width = height * aspect;
        DrawRect {
            left: (viewport_w - width) / 2.0,
            top: 0.0,
            width,
            height,
        }
    } else {
        let width = viewport_w;
        let height = width / aspect;
        DrawRect {
            left: 0.0,
            top: (viewport_h - height) / 2.0,
            width,
            height,
        }
    }
}

/// Project a coordinate pair into an already fitted rectangle
///
/// Longitude [-180, 180] maps linearly onto [left, right]; latitude
/// [-90, 90] maps onto [bottom, top] so that north is drawn at the top.
pub fn project_into(lat: f64, lon: f64, rect: &DrawRect) -> (f64, f64) {
    let x = rect.left + (lon + 180.0) * (rect.width / 360.0);
    let y = rect.top + (90.0 - lat) * (rect.height / 180.0);
    (x, y)
}

/// Project (lat, lon) onto the surface of a `viewport_w` x `viewport_h` viewport
pub fn project(lat: f64, lon: f64, viewport_w: f64, viewport_h: f64, aspect: f64) -> Projection {
    let rect = fit_rect(viewport_w, viewport_h, aspect);
    let (x, y) = project_into(lat, lon, &rect);
    Projection { x, y, rect }
}
