use crate::geometry::{Point, Rect};

/// Normalized pivot used by scale transitions, similar to a layer's
/// anchor point.
///
/// `(0, 0)` is the top-left corner of the view, `(1, 1)` the bottom-right.
/// The anchor is the point that stays fixed while the view scales.
///
/// # Example
/// ```
/// use overlay_presenter::anchor::AnchorPoint;
/// use overlay_presenter::geometry::Rect;
///
/// let pivot = AnchorPoint::TOP.resolve(Rect::new(0.0, 0.0, 200.0, 100.0));
/// assert_eq!((pivot.x, pivot.y), (100.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub x: f32,
    pub y: f32,
}

impl AnchorPoint {
    /// Center of the view (0.5, 0.5)
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Top center (0.5, 0)
    pub const TOP: Self = Self { x: 0.5, y: 0.0 };

    /// Resolve the anchor to absolute coordinates within `bounds`.
    pub fn resolve(&self, bounds: Rect) -> Point {
        Point::new(
            bounds.x + bounds.width * self.x,
            bounds.y + bounds.height * self.y,
        )
    }
}
