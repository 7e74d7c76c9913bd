use crate::effect::ViewState;
use crate::geometry::Rect;
use crate::transform::Transform;

/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for Rect {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Rect {
            x: f32::lerp(&from.x, &to.x, t),
            y: f32::lerp(&from.y, &to.y, t),
            width: f32::lerp(&from.width, &to.width, t),
            height: f32::lerp(&from.height, &to.height, t),
        }
    }
}

impl Animatable for Transform {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Transform {
            scale_x: f32::lerp(&from.scale_x, &to.scale_x, t),
            scale_y: f32::lerp(&from.scale_y, &to.scale_y, t),
        }
    }
}

impl Animatable for ViewState {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        ViewState {
            frame: Rect::lerp(&from.frame, &to.frame, t),
            opacity: f32::lerp(&from.opacity, &to.opacity, t),
            transform: Transform::lerp(&from.transform, &to.transform, t),
        }
    }
}
