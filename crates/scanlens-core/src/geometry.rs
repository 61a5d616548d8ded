//! Frame to display geometry for the highlight overlay.
//!
//! The video element fills the display with a "cover" fit: the frame is
//! scaled until both display axes are covered and the overflow is cropped
//! evenly on both sides. Decoder points arrive in frame pixels and have to go
//! through the same transform before they can be drawn.

use scanlens_config::overlay::OverlayConfig;
use scanlens_types::{DisplaySize, Point, Rect, ScanRegion};

/// Smallest highlight side so a point or a line stays visible
pub const MIN_RECT: f64 = 20.0;

/// Fallback square side relative to the smaller display side
pub const FALLBACK_RATIO: f64 = 0.4;

/// Map frame points into display space under a cover fit.
///
/// Returns an empty vec for degenerate input (no points, zero sized frame or
/// display). Offsets go negative when the scaled frame overflows the display
/// and are kept as is.
pub fn map_points_to_display(
    points: &[Point],
    source_width: u32,
    source_height: u32,
    display: DisplaySize,
) -> Vec<Point> {
    if points.is_empty() || source_width == 0 || source_height == 0 || display.is_empty() {
        return Vec::new();
    }

    let source_w = f64::from(source_width);
    let source_h = f64::from(source_height);

    let scale = (display.width / source_w).max(display.height / source_h);
    let offset_x = (display.width - source_w * scale) / 2.0;
    let offset_y = (display.height - source_h * scale) / 2.0;

    points
        .iter()
        .map(|p| Point::new(p.x * scale + offset_x, p.y * scale + offset_y))
        .collect()
}

/// Sizing knobs for the highlight rect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayGeometry {
    pub min_rect: f64,
    pub fallback_ratio: f64,
}

impl Default for OverlayGeometry {
    fn default() -> Self {
        Self {
            min_rect: MIN_RECT,
            fallback_ratio: FALLBACK_RATIO,
        }
    }
}

impl From<&OverlayConfig> for OverlayGeometry {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            min_rect: config.min_rect,
            fallback_ratio: config.fallback_ratio,
        }
    }
}

impl OverlayGeometry {
    /// Bounding box of display points, grown to the minimum size and kept on screen.
    ///
    /// `None` when there are no points.
    pub fn points_to_rect(&self, points: &[Point], display: DisplaySize) -> Option<Rect> {
        let first = points.first()?;

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let (x, width) = grow_axis(min_x, max_x - min_x, self.min_rect);
        let (y, height) = grow_axis(min_y, max_y - min_y, self.min_rect);

        Some(Rect {
            x: clamp_origin(x, width, display.width),
            y: clamp_origin(y, height, display.height),
            width,
            height,
        })
    }

    /// Centered square used when the decoder gave no geometry
    pub fn fallback_rect(&self, display: DisplaySize) -> Rect {
        let size = display.width.min(display.height) * self.fallback_ratio;

        Rect {
            x: (display.width - size) / 2.0,
            y: (display.height - size) / 2.0,
            width: size,
            height: size,
        }
    }

    /// Highlight for a region on the current display, `None` while the display has no size
    pub fn overlay_rect(&self, region: &ScanRegion, display: DisplaySize) -> Option<Rect> {
        if display.is_empty() {
            return None;
        }

        let mapped = match &region.points {
            Some(points) => map_points_to_display(
                points,
                region.source_width,
                region.source_height,
                display,
            ),
            None => Vec::new(),
        };

        self.points_to_rect(&mapped, display)
            .or_else(|| Some(self.fallback_rect(display)))
    }
}

fn grow_axis(start: f64, extent: f64, min: f64) -> (f64, f64) {
    if extent < min {
        (start - (min - extent) / 2.0, min)
    } else {
        (start, extent)
    }
}

// Upper bound first so an oversized rect still lands on 0
fn clamp_origin(origin: f64, extent: f64, bound: f64) -> f64 {
    origin.min(bound - extent).max(0.0)
}
