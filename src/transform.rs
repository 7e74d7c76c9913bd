use crate::anchor::AnchorPoint;
use crate::geometry::{Point, Rect};

/// Scale transform applied to a view around its anchor point.
///
/// Transitions only ever scale, so this is the diagonal of a 2D affine
/// matrix. Translation is expressed through the view's frame instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Transform {
    /// Identity transform (no scaling)
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Create a uniform scale transform
    pub fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    /// Create a non-uniform scale transform
    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            scale_x: sx,
            scale_y: sy,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Transform a point, scaling it about `pivot`.
    pub fn transform_point(&self, point: Point, pivot: Point) -> Point {
        Point::new(
            pivot.x + (point.x - pivot.x) * self.scale_x,
            pivot.y + (point.y - pivot.y) * self.scale_y,
        )
    }

    /// Visible rect of a view with the given frame and anchor once this
    /// transform is applied.
    pub fn apply_to_rect(&self, frame: Rect, anchor: AnchorPoint) -> Rect {
        let pivot = anchor.resolve(frame);
        let top_left = self.transform_point(frame.origin(), pivot);
        Rect::new(
            top_left.x,
            top_left.y,
            frame.width * self.scale_x,
            frame.height * self.scale_y,
        )
    }
}
