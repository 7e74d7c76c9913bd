//! Transition effects and the view states they imply.
//!
//! Everything here is pure: given a target frame and the container bounds,
//! an effect deterministically yields the state a view starts from when it
//! is presented ([`TransitionEffect::entry_state`]), the state it rests in
//! once presented ([`ViewState::rest`]) and the state it animates toward
//! when dismissed ([`TransitionEffect::exit_state`]).

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::anchor::AnchorPoint;
use crate::error::TransitionError;
use crate::geometry::Rect;
use crate::host::ViewProxy;
use crate::transform::Transform;

/// Scale used for the collapsed axis of scale effects.
///
/// Never exactly zero so the transform stays invertible.
pub const COLLAPSED_SCALE: f32 = 0.001;

/// Pivot of [`TransitionEffect::DownSpread`]: just below the top edge.
pub const DOWN_SPREAD_ANCHOR: AnchorPoint = AnchorPoint { x: 0.5, y: 0.01 };

bitflags! {
    /// View properties a transition writes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ViewProperties: u8 {
        const FRAME     = 0b001;
        const OPACITY   = 0b010;
        const TRANSFORM = 0b100;
    }
}

/// Edge of the container a [`TransitionEffect::MoveFrom`] view enters from
/// and leaves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            _ => Err(TransitionError::UnknownDirection(s.to_string())),
        }
    }
}

/// Visual family of a present/dismiss transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionEffect {
    /// Opacity-only transition, no transform.
    #[default]
    FadeIn,
    /// Uniform scale about the view's center.
    ScaleFromCenter,
    /// Horizontal scale about the vertical center line; full height
    /// throughout.
    OpenAxis,
    /// Vertical scale pivoting just below the top edge; full width
    /// throughout.
    DownSpread,
    /// Frame translation. The view enters from outside the container on
    /// the given side and leaves through the same side.
    MoveFrom(Direction),
}

impl TransitionEffect {
    pub const ALL: [TransitionEffect; 8] = [
        TransitionEffect::FadeIn,
        TransitionEffect::ScaleFromCenter,
        TransitionEffect::OpenAxis,
        TransitionEffect::DownSpread,
        TransitionEffect::MoveFrom(Direction::Left),
        TransitionEffect::MoveFrom(Direction::Right),
        TransitionEffect::MoveFrom(Direction::Top),
        TransitionEffect::MoveFrom(Direction::Bottom),
    ];

    /// Anchor the view must have before the animation starts, if the effect
    /// cares about its pivot.
    pub fn anchor(&self) -> Option<AnchorPoint> {
        match self {
            TransitionEffect::ScaleFromCenter => Some(AnchorPoint::CENTER),
            TransitionEffect::OpenAxis => Some(AnchorPoint::TOP),
            TransitionEffect::DownSpread => Some(DOWN_SPREAD_ANCHOR),
            TransitionEffect::FadeIn | TransitionEffect::MoveFrom(_) => None,
        }
    }

    /// Properties that differ between the entry/exit state and the rest
    /// state.
    pub fn animated_properties(&self) -> ViewProperties {
        match self {
            TransitionEffect::FadeIn => ViewProperties::OPACITY,
            TransitionEffect::ScaleFromCenter
            | TransitionEffect::OpenAxis
            | TransitionEffect::DownSpread => ViewProperties::TRANSFORM,
            TransitionEffect::MoveFrom(_) => ViewProperties::FRAME,
        }
    }

    /// State immediately before the present animation starts.
    pub fn entry_state(&self, target: Rect, bounds: Rect) -> ViewState {
        let rest = ViewState::rest(target);
        match self {
            TransitionEffect::FadeIn => rest.with_opacity(0.0),
            TransitionEffect::ScaleFromCenter => {
                rest.with_transform(Transform::scale(COLLAPSED_SCALE))
            }
            TransitionEffect::OpenAxis => {
                rest.with_transform(Transform::scale_xy(COLLAPSED_SCALE, 1.0))
            }
            TransitionEffect::DownSpread => {
                rest.with_transform(Transform::scale_xy(1.0, COLLAPSED_SCALE))
            }
            TransitionEffect::MoveFrom(direction) => {
                rest.with_frame(offscreen_frame(*direction, target, bounds))
            }
        }
    }

    /// State the dismiss animation ends in.
    ///
    /// Move exits are computed from `target`, the rest frame, never from
    /// wherever the view currently is.
    pub fn exit_state(&self, target: Rect, bounds: Rect, geometry: ExitGeometry) -> ViewState {
        match (self, geometry) {
            (TransitionEffect::MoveFrom(Direction::Top), ExitGeometry::Compatible) => {
                ViewState::rest(target).with_frame(Rect::new(
                    target.x,
                    target.y,
                    target.width,
                    -target.height,
                ))
            }
            _ => self.entry_state(target, bounds),
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, TransitionEffect::MoveFrom(_))
    }
}

/// Frame fully outside `bounds` on the `direction` side, keeping the
/// target's other coordinate.
fn offscreen_frame(direction: Direction, target: Rect, bounds: Rect) -> Rect {
    let Rect {
        x,
        y,
        width,
        height,
    } = target;
    match direction {
        Direction::Top => Rect::new(x, bounds.y - height, width, height),
        Direction::Bottom => Rect::new(x, bounds.max_y(), width, height),
        Direction::Left => Rect::new(bounds.x - width, y, width, height),
        Direction::Right => Rect::new(bounds.max_x(), y, width, height),
    }
}

impl fmt::Display for TransitionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionEffect::FadeIn => f.write_str("fade-in"),
            TransitionEffect::ScaleFromCenter => f.write_str("scale-from-center"),
            TransitionEffect::OpenAxis => f.write_str("open-axis"),
            TransitionEffect::DownSpread => f.write_str("down-spread"),
            TransitionEffect::MoveFrom(direction) => write!(f, "move-from-{}", direction),
        }
    }
}

impl FromStr for TransitionEffect {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "fade-in" => Ok(TransitionEffect::FadeIn),
            "scale-from-center" => Ok(TransitionEffect::ScaleFromCenter),
            "open-axis" => Ok(TransitionEffect::OpenAxis),
            "down-spread" => Ok(TransitionEffect::DownSpread),
            _ => match name.strip_prefix("move-from-") {
                Some(direction) => direction
                    .parse()
                    .map(TransitionEffect::MoveFrom)
                    .map_err(|_| TransitionError::UnknownEffect(s.to_string())),
                None => Err(TransitionError::UnknownEffect(s.to_string())),
            },
        }
    }
}

/// How the dismiss frame of a move transition is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitGeometry {
    /// Top exits collapse to a negative height at the rest origin, which
    /// covers the same region as the entry frame when the target sits at
    /// the top of the container. Other directions exit to their entry
    /// frame.
    #[default]
    Compatible,
    /// Every direction exits to exactly its entry frame.
    Symmetric,
}

/// Geometry and opacity of a view at one end of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub frame: Rect,
    pub opacity: f32,
    pub transform: Transform,
}

impl ViewState {
    /// The fully presented state: target frame, identity transform, full
    /// opacity. The same for every effect.
    pub fn rest(frame: Rect) -> Self {
        Self {
            frame,
            opacity: 1.0,
            transform: Transform::IDENTITY,
        }
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_rest(&self, frame: Rect) -> bool {
        *self == Self::rest(frame)
    }

    /// Write the selected properties to `view`.
    pub fn apply(&self, view: &mut dyn ViewProxy, properties: ViewProperties) {
        if properties.contains(ViewProperties::FRAME) {
            view.set_frame(self.frame);
        }
        if properties.contains(ViewProperties::OPACITY) {
            view.set_opacity(self.opacity);
        }
        if properties.contains(ViewProperties::TRANSFORM) {
            view.set_transform(self.transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 320.0, 480.0);

    #[test]
    fn test_move_from_top_entry() {
        let entry = TransitionEffect::MoveFrom(Direction::Top).entry_state(SCREEN, SCREEN);
        assert_eq!(entry.frame, Rect::new(0.0, -480.0, 320.0, 480.0));
        assert_eq!(entry.opacity, 1.0);
        assert!(entry.transform.is_identity());
    }

    #[test]
    fn test_move_entries_start_outside_container() {
        let target = Rect::new(20.0, 40.0, 200.0, 100.0);
        for direction in Direction::ALL {
            let entry = TransitionEffect::MoveFrom(direction).entry_state(target, SCREEN);
            assert!(
                !entry.frame.intersects(&SCREEN),
                "{direction} entry {:?} overlaps the container",
                entry.frame
            );
            assert_eq!(entry.frame.size(), target.size());
        }
    }

    #[test]
    fn test_move_from_top_compatible_exit_negates_height() {
        let exit = TransitionEffect::MoveFrom(Direction::Top).exit_state(
            SCREEN,
            SCREEN,
            ExitGeometry::Compatible,
        );
        assert_eq!(exit.frame, Rect::new(0.0, 0.0, 320.0, -480.0));
    }

    #[test]
    fn test_move_exit_round_trips_at_container_origin() {
        for geometry in [ExitGeometry::Compatible, ExitGeometry::Symmetric] {
            for direction in Direction::ALL {
                let effect = TransitionEffect::MoveFrom(direction);
                let exit = effect.exit_state(SCREEN, SCREEN, geometry);
                let entry = effect.entry_state(SCREEN, SCREEN);
                assert_eq!(
                    exit.frame.standardized(),
                    entry.frame,
                    "{direction} under {geometry:?}"
                );
            }
        }
    }

    #[test]
    fn test_compatible_top_exit_stays_on_screen_below_top_edge() {
        let card = Rect::new(40.0, 60.0, 240.0, 360.0);
        let effect = TransitionEffect::MoveFrom(Direction::Top);
        let entry = effect.entry_state(card, SCREEN);
        let exit = effect.exit_state(card, SCREEN, ExitGeometry::Compatible);

        assert_eq!(entry.frame, Rect::new(40.0, -360.0, 240.0, 360.0));
        assert_eq!(exit.frame, Rect::new(40.0, 60.0, 240.0, -360.0));
        assert_eq!(exit.frame.standardized(), Rect::new(40.0, -300.0, 240.0, 360.0));
        assert_ne!(exit.frame.standardized(), entry.frame);
        assert!(exit.frame.intersects(&SCREEN));
    }

    #[test]
    fn test_symmetric_exit_round_trips_for_any_target() {
        let card = Rect::new(40.0, 60.0, 240.0, 360.0);
        for direction in Direction::ALL {
            let effect = TransitionEffect::MoveFrom(direction);
            let exit = effect.exit_state(card, SCREEN, ExitGeometry::Symmetric);
            assert_eq!(exit, effect.entry_state(card, SCREEN), "{direction}");
            assert!(!exit.frame.intersects(&SCREEN), "{direction}");
        }
    }

    #[test]
    fn test_symmetric_exit_equals_entry() {
        let target = Rect::new(0.0, 100.0, 320.0, 200.0);
        let effect = TransitionEffect::MoveFrom(Direction::Top);
        let exit = effect.exit_state(target, SCREEN, ExitGeometry::Symmetric);
        assert_eq!(exit.frame, Rect::new(0.0, -200.0, 320.0, 200.0));
        assert_eq!(exit, effect.entry_state(target, SCREEN));
    }

    #[test]
    fn test_scale_effects_only_touch_transform() {
        for effect in [
            TransitionEffect::ScaleFromCenter,
            TransitionEffect::OpenAxis,
            TransitionEffect::DownSpread,
        ] {
            let entry = effect.entry_state(SCREEN, SCREEN);
            assert_eq!(entry.frame, SCREEN);
            assert_eq!(entry.opacity, 1.0);
            assert!(!entry.transform.is_identity());
            assert_eq!(effect.animated_properties(), ViewProperties::TRANSFORM);
            assert!(effect.anchor().is_some());
        }
    }

    #[test]
    fn test_open_axis_keeps_full_height() {
        let entry = TransitionEffect::OpenAxis.entry_state(SCREEN, SCREEN);
        assert_eq!(entry.transform, Transform::scale_xy(COLLAPSED_SCALE, 1.0));
        assert_eq!(TransitionEffect::OpenAxis.anchor().map(|a| a.x), Some(0.5));
    }

    #[test]
    fn test_down_spread_keeps_full_width() {
        let entry = TransitionEffect::DownSpread.entry_state(SCREEN, SCREEN);
        assert_eq!(entry.transform, Transform::scale_xy(1.0, COLLAPSED_SCALE));
        assert_eq!(TransitionEffect::DownSpread.anchor(), Some(DOWN_SPREAD_ANCHOR));
    }

    #[test]
    fn test_fade_entry() {
        let entry = TransitionEffect::FadeIn.entry_state(SCREEN, SCREEN);
        assert_eq!(entry, ViewState::rest(SCREEN).with_opacity(0.0));
        assert_eq!(TransitionEffect::FadeIn.anchor(), None);
    }

    #[test]
    fn test_non_move_exit_is_time_reverse_of_entry() {
        for effect in TransitionEffect::ALL.iter().filter(|e| !e.is_move()) {
            assert_eq!(
                effect.exit_state(SCREEN, SCREEN, ExitGeometry::Compatible),
                effect.entry_state(SCREEN, SCREEN)
            );
        }
    }

    #[test]
    fn test_effect_names_round_trip() {
        for effect in TransitionEffect::ALL {
            let parsed: TransitionEffect = effect.to_string().parse().unwrap();
            assert_eq!(parsed, effect);
        }
        assert_eq!(
            " Move-From-TOP ".parse::<TransitionEffect>(),
            Ok(TransitionEffect::MoveFrom(Direction::Top))
        );
    }

    #[test]
    fn test_unknown_effect_is_rejected() {
        assert_eq!(
            "spin".parse::<TransitionEffect>(),
            Err(TransitionError::UnknownEffect("spin".into()))
        );
        assert_eq!(
            "move-from-nowhere".parse::<TransitionEffect>(),
            Err(TransitionError::UnknownEffect("move-from-nowhere".into()))
        );
        assert_eq!(
            "up".parse::<Direction>(),
            Err(TransitionError::UnknownDirection("up".into()))
        );
    }

    #[test]
    fn test_default_effect_is_fade() {
        assert_eq!(TransitionEffect::default(), TransitionEffect::FadeIn);
        assert_eq!(ExitGeometry::default(), ExitGeometry::Compatible);
    }
}
