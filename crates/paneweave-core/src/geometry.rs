#![forbid(unsafe_code)]

//! Geometric primitives and drop-side detection.
//!
//! Coordinates are logical pixels with the origin at the top-left of the
//! hosting window. Sizes inside split nodes are percentages of the parent,
//! so every helper here works in `f64`.

use serde::{Deserialize, Serialize};

/// Default fraction of a pane's width/height that forms each edge drop band.
pub const DEFAULT_DROP_EDGE_BAND: f64 = 0.25;

/// A point in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coordinate of this point along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: SplitAxis) -> f64 {
        match axis {
            SplitAxis::Horizontal => self.x,
            SplitAxis::Vertical => self.y,
        }
    }
}

/// An axis-aligned rectangle used for pane bounds and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle anchored at the origin.
    #[inline]
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the rectangle has no area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Extent of the rectangle along `axis` (width for horizontal splits).
    #[inline]
    #[must_use]
    pub const fn extent(&self, axis: SplitAxis) -> f64 {
        match axis {
            SplitAxis::Horizontal => self.width,
            SplitAxis::Vertical => self.height,
        }
    }

    /// Position of `point` as fractions of this rectangle's width and height.
    ///
    /// Returns `None` for empty rectangles.
    #[must_use]
    pub fn relative(&self, point: Point) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some((
            (point.x - self.x) / self.width,
            (point.y - self.y) / self.height,
        ))
    }

    /// Partition the rectangle along `axis` by percentage shares.
    ///
    /// Shares are interpreted relative to their own sum, so slightly
    /// denormalized inputs still tile the rectangle exactly.
    #[must_use]
    pub fn split_along(&self, axis: SplitAxis, shares: &[f64]) -> Vec<Rect> {
        let total: f64 = shares.iter().copied().filter(|s| *s > 0.0).sum();
        if shares.is_empty() {
            return Vec::new();
        }
        let extent = self.extent(axis);
        let mut cursor = match axis {
            SplitAxis::Horizontal => self.x,
            SplitAxis::Vertical => self.y,
        };
        shares
            .iter()
            .map(|share| {
                let fraction = if total > 0.0 {
                    share.max(0.0) / total
                } else {
                    1.0 / shares.len() as f64
                };
                let length = extent * fraction;
                let rect = match axis {
                    SplitAxis::Horizontal => Rect::new(cursor, self.y, length, self.height),
                    SplitAxis::Vertical => Rect::new(self.x, cursor, self.width, length),
                };
                cursor += length;
                rect
            })
            .collect()
    }
}

/// Orientation of a split node.
///
/// `Horizontal` lays children out left to right; `Vertical` stacks them top
/// to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

/// Where a dragged item lands relative to a target pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSide {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

impl DropSide {
    /// All sides in hit-test order.
    pub const ALL: [Self; 5] = [
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
        Self::Center,
    ];

    /// Split axis produced by dropping on this side; `None` for center.
    #[must_use]
    pub const fn axis(self) -> Option<SplitAxis> {
        match self {
            Self::Left | Self::Right => Some(SplitAxis::Horizontal),
            Self::Top | Self::Bottom => Some(SplitAxis::Vertical),
            Self::Center => None,
        }
    }

    /// Whether the incoming pane is placed before the target.
    #[must_use]
    pub const fn inserts_before(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }

    /// Stable lowercase tag used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Center => "center",
        }
    }
}

/// Classify which drop region of `rect` the pointer is over.
///
/// Each pane exposes an inner center square and four edge bands of width
/// `edge_band` (a fraction of the pane's extent). Outside the inner square
/// the nearest edge band wins; on an exact tie between a horizontal and a
/// vertical band the top/bottom band is chosen.
#[must_use]
pub fn classify_drop_side(rect: Rect, point: Point, edge_band: f64) -> Option<DropSide> {
    if !rect.contains(point) {
        return None;
    }
    let (fx, fy) = rect.relative(point)?;
    let band = edge_band.clamp(0.0, 0.5);

    let in_center_x = fx >= band && fx <= 1.0 - band;
    let in_center_y = fy >= band && fy <= 1.0 - band;
    if in_center_x && in_center_y {
        return Some(DropSide::Center);
    }

    // Distance (as a fraction) to each edge; only edges whose band contains
    // the pointer are candidates.
    let candidates = [
        (DropSide::Top, fy),
        (DropSide::Bottom, 1.0 - fy),
        (DropSide::Left, fx),
        (DropSide::Right, 1.0 - fx),
    ];
    candidates
        .into_iter()
        .filter(|(_, distance)| *distance < band)
        .fold(None, |best: Option<(DropSide, f64)>, (side, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((side, distance)),
        })
        .map(|(side, _)| side)
        .or(Some(DropSide::Center))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane() -> Rect {
        Rect::new(100.0, 50.0, 400.0, 200.0)
    }

    #[test]
    fn outside_point_has_no_side() {
        assert_eq!(
            classify_drop_side(pane(), Point::new(10.0, 10.0), DEFAULT_DROP_EDGE_BAND),
            None
        );
    }

    #[test]
    fn center_square_is_center() {
        let side = classify_drop_side(pane(), Point::new(300.0, 150.0), DEFAULT_DROP_EDGE_BAND);
        assert_eq!(side, Some(DropSide::Center));
    }

    #[test]
    fn edge_bands_resolve_to_their_side() {
        let rect = pane();
        let band = DEFAULT_DROP_EDGE_BAND;
        assert_eq!(
            classify_drop_side(rect, Point::new(110.0, 150.0), band),
            Some(DropSide::Left)
        );
        assert_eq!(
            classify_drop_side(rect, Point::new(490.0, 150.0), band),
            Some(DropSide::Right)
        );
        assert_eq!(
            classify_drop_side(rect, Point::new(300.0, 55.0), band),
            Some(DropSide::Top)
        );
        assert_eq!(
            classify_drop_side(rect, Point::new(300.0, 245.0), band),
            Some(DropSide::Bottom)
        );
    }

    #[test]
    fn corner_prefers_nearest_edge() {
        let rect = pane();
        // 2% from the left, 20% from the top.
        assert_eq!(
            classify_drop_side(rect, Point::new(108.0, 90.0), DEFAULT_DROP_EDGE_BAND),
            Some(DropSide::Left)
        );
        // 20% from the left, 2% from the top.
        assert_eq!(
            classify_drop_side(rect, Point::new(180.0, 54.0), DEFAULT_DROP_EDGE_BAND),
            Some(DropSide::Top)
        );
    }

    #[test]
    fn exact_corner_tie_goes_to_vertical_band() {
        let rect = Rect::from_size(100.0, 100.0);
        assert_eq!(
            classify_drop_side(rect, Point::new(10.0, 10.0), DEFAULT_DROP_EDGE_BAND),
            Some(DropSide::Top)
        );
    }

    #[test]
    fn drop_side_axis_and_order() {
        assert_eq!(DropSide::Left.axis(), Some(SplitAxis::Horizontal));
        assert_eq!(DropSide::Bottom.axis(), Some(SplitAxis::Vertical));
        assert_eq!(DropSide::Center.axis(), None);
        assert!(DropSide::Top.inserts_before());
        assert!(!DropSide::Right.inserts_before());
    }

    #[test]
    fn drop_side_serializes_as_lowercase_tag() {
        assert_eq!(serde_json::to_string(&DropSide::Center).unwrap(), "\"center\"");
        let side: DropSide = serde_json::from_str("\"top\"").unwrap();
        assert_eq!(side, DropSide::Top);
        assert_eq!(
            serde_json::to_string(&SplitAxis::Vertical).unwrap(),
            "\"vertical\""
        );
    }

    #[test]
    fn split_along_tiles_the_rect() {
        let rect = Rect::from_size(300.0, 90.0);
        let parts = rect.split_along(SplitAxis::Horizontal, &[50.0, 25.0, 25.0]);
        assert_eq!(parts.len(), 3);
        assert!((parts[0].width - 150.0).abs() < 1e-9);
        assert!((parts[1].x - 150.0).abs() < 1e-9);
        assert!((parts[2].right() - 300.0).abs() < 1e-9);
        assert!(parts.iter().all(|p| (p.height - 90.0).abs() < 1e-9));
    }

    #[test]
    fn split_along_with_zero_shares_is_uniform() {
        let rect = Rect::from_size(100.0, 100.0);
        let parts = rect.split_along(SplitAxis::Vertical, &[0.0, 0.0]);
        assert!((parts[0].height - 50.0).abs() < 1e-9);
        assert!((parts[1].y - 50.0).abs() < 1e-9);
    }
}
