//! Interpolation support and the fixed transition timing.

mod animatable;

use std::time::Duration;

pub use animatable::Animatable;

/// Duration of every present and dismiss animation.
///
/// Transitions do not take per-effect timing: every effect, in both phases,
/// runs for exactly this long.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(500);

/// Normalized progress of an animation that has been running for `elapsed`
/// out of `duration`, clamped to `[0, 1]`.
///
/// Zero-length animations are immediately complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}
