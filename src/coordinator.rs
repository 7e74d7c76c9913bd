//! Transition state machine and per-effect animation dispatch.
//!
//! A [`TransitionCoordinator`] is bound to one presentation and one effect.
//! The host flips it into the presenting or dismissing phase, then asks it
//! to [`animate_transition`](TransitionCoordinator::animate_transition):
//! the coordinator computes an [`AnimationPlan`] for the phase, prepares the
//! view synchronously (insertion, anchor, entry state) and hands the rest to
//! the host's [`AnimationRuntime`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::anchor::AnchorPoint;
use crate::animation::TRANSITION_DURATION;
use crate::callback::OneShot;
use crate::effect::{ExitGeometry, TransitionEffect, ViewProperties, ViewState};
use crate::error::{Result, TransitionError};
use crate::geometry::{Color, Rect};
use crate::host::{AnimationRuntime, TransitionContext, ViewHandle, ViewKey};

/// Direction of travel of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Entry state to rest state
    Presenting,
    /// Rest state to exit state
    Dismissing,
}

impl Phase {
    /// Which view of the transition context the phase animates.
    pub fn view_key(&self) -> ViewKey {
        match self {
            Phase::Presenting => ViewKey::To,
            Phase::Dismissing => ViewKey::From,
        }
    }
}

/// Lifecycle of one presentation.
///
/// `Idle → Presenting → Presented → Dismissing → Dismissed`. There is no way
/// back: a new presentation needs a new coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionState {
    #[default]
    Idle,
    Presenting,
    Presented,
    Dismissing,
    Dismissed,
}

/// Everything needed to run one transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPlan {
    pub phase: Phase,
    /// Anchor to set before the animation starts.
    pub anchor: Option<AnchorPoint>,
    /// State applied synchronously before the animation starts.
    pub initial: Option<ViewState>,
    /// State the animation interpolates to.
    pub target: ViewState,
    /// Properties of `target` written inside the animation.
    pub animated: ViewProperties,
    pub duration: Duration,
}

impl AnimationPlan {
    pub fn duration_secs(&self) -> f32 {
        self.duration.as_secs_f32()
    }
}

/// Resolve the animation for `effect` in `phase`.
///
/// Presenting starts from the effect's entry state and animates every
/// property to rest. Dismissing starts from wherever the view is and
/// animates only the effect's own properties to its exit state, which is
/// derived from `target_frame` alone.
pub fn compute_animation(
    effect: TransitionEffect,
    target_frame: Rect,
    bounds: Rect,
    phase: Phase,
    exit_geometry: ExitGeometry,
) -> AnimationPlan {
    match phase {
        Phase::Presenting => AnimationPlan {
            phase,
            anchor: effect.anchor(),
            initial: Some(effect.entry_state(target_frame, bounds)),
            target: ViewState::rest(target_frame),
            animated: ViewProperties::all(),
            duration: TRANSITION_DURATION,
        },
        Phase::Dismissing => AnimationPlan {
            phase,
            anchor: effect.anchor(),
            initial: None,
            target: effect.exit_state(target_frame, bounds, exit_geometry),
            animated: effect.animated_properties(),
            duration: TRANSITION_DURATION,
        },
    }
}

/// Drives the present and dismiss animations of one presentation.
pub struct TransitionCoordinator {
    target_frame: Rect,
    backdrop_color: Color,
    effect: TransitionEffect,
    exit_geometry: ExitGeometry,
    on_dismissed: OneShot,
    phase: Phase,
    state: Rc<Cell<TransitionState>>,
    in_flight: Rc<Cell<bool>>,
}

impl TransitionCoordinator {
    pub fn new(
        target_frame: Rect,
        backdrop_color: Color,
        effect: TransitionEffect,
        exit_geometry: ExitGeometry,
        on_dismissed: OneShot,
    ) -> Self {
        Self {
            target_frame,
            backdrop_color,
            effect,
            exit_geometry,
            on_dismissed,
            phase: Phase::Presenting,
            state: Rc::new(Cell::new(TransitionState::Idle)),
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    pub fn target_frame(&self) -> Rect {
        self.target_frame
    }

    pub fn backdrop_color(&self) -> Color {
        self.backdrop_color
    }

    pub fn effect(&self) -> TransitionEffect {
        self.effect
    }

    pub fn exit_geometry(&self) -> ExitGeometry {
        self.exit_geometry
    }

    /// Callback fired once the user dismisses the content from the
    /// backdrop. Shared with the backdrop controller.
    pub fn on_dismissed(&self) -> &OneShot {
        &self.on_dismissed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> TransitionState {
        self.state.get()
    }

    pub fn transition_duration(&self) -> Duration {
        TRANSITION_DURATION
    }

    /// Enter the presenting phase. Only valid once, before anything else.
    pub fn begin_present(&mut self) -> Result<()> {
        self.advance(TransitionState::Idle, Phase::Presenting, TransitionState::Presenting)
    }

    /// Enter the dismissing phase. Only valid once the present animation
    /// has completed.
    pub fn begin_dismiss(&mut self) -> Result<()> {
        self.advance(
            TransitionState::Presented,
            Phase::Dismissing,
            TransitionState::Dismissing,
        )
    }

    fn advance(
        &mut self,
        expected: TransitionState,
        phase: Phase,
        next: TransitionState,
    ) -> Result<()> {
        let state = self.state.get();
        if state != expected {
            return Err(TransitionError::InvalidTransition {
                state,
                requested: phase,
            });
        }
        log::debug!("{} transition: {:?} -> {:?}", self.effect, state, next);
        self.phase = phase;
        self.state.set(next);
        Ok(())
    }

    /// Plan for the current phase inside a container of the given bounds.
    pub fn plan(&self, bounds: Rect) -> AnimationPlan {
        compute_animation(
            self.effect,
            self.target_frame,
            bounds,
            self.phase,
            self.exit_geometry,
        )
    }

    /// Run the transition for the current phase.
    ///
    /// When presenting, the `To` view is added on top of the container and
    /// put in its entry state before the animation starts. When dismissing,
    /// the `From` view animates to its exit state and is detached from the
    /// container before the host is told the transition completed.
    ///
    /// A missing view is not an error: the runtime is asked for an empty,
    /// zero-length animation so the host still gets its completion.
    pub fn animate_transition(
        &self,
        ctx: Rc<dyn TransitionContext>,
        runtime: &mut dyn AnimationRuntime,
    ) -> Result<()> {
        let expected = match self.phase {
            Phase::Presenting => TransitionState::Presenting,
            Phase::Dismissing => TransitionState::Dismissing,
        };
        let state = self.state.get();
        if state != expected || self.in_flight.get() {
            return Err(TransitionError::InvalidTransition {
                state,
                requested: self.phase,
            });
        }
        self.in_flight.set(true);

        let container = ctx.container();
        let bounds = container.borrow().bounds();
        let plan = self.plan(bounds);
        let view = ctx.view(self.phase.view_key());
        let completion = self.completion(Rc::clone(&ctx), view.clone());

        let Some(view) = view else {
            log::warn!(
                "{} transition has no {:?} view, completing immediately",
                self.effect,
                self.phase.view_key()
            );
            runtime.animate(Duration::ZERO, Box::new(|| {}), completion);
            return Ok(());
        };

        if plan.phase == Phase::Presenting {
            container.borrow_mut().add_child(&view);
        }
        {
            let mut proxy = view.borrow_mut();
            if let Some(anchor) = plan.anchor {
                proxy.set_anchor_point(anchor);
            }
            if let Some(initial) = plan.initial {
                initial.apply(&mut *proxy, ViewProperties::all());
            }
        }

        log::debug!(
            "{} {:?}: animating {:?} to {:?} over {:?}",
            self.effect,
            plan.phase,
            plan.animated,
            plan.target,
            plan.duration
        );

        let AnimationPlan {
            target, animated, ..
        } = plan;
        runtime.animate(
            plan.duration,
            Box::new(move || target.apply(&mut *view.borrow_mut(), animated)),
            completion,
        );
        Ok(())
    }

    /// Completion handler: detach (dismiss only), settle the state, then
    /// signal the host. Each step tolerates the view being gone.
    fn completion(
        &self,
        ctx: Rc<dyn TransitionContext>,
        view: Option<ViewHandle>,
    ) -> Box<dyn FnOnce(bool)> {
        let phase = self.phase;
        let effect = self.effect;
        let state = Rc::clone(&self.state);
        let in_flight = Rc::clone(&self.in_flight);

        let once = OneShot::new(move |finished: bool| {
            if phase == Phase::Dismissing {
                if let Some(view) = &view {
                    view.borrow_mut().remove_from_parent();
                }
            }
            let next = match phase {
                Phase::Presenting => TransitionState::Presented,
                Phase::Dismissing => TransitionState::Dismissed,
            };
            state.set(next);
            in_flight.set(false);
            log::info!("{} {:?} complete (finished: {})", effect, phase, finished);
            ctx.complete_transition(finished);
        });
        Box::new(move |finished| {
            once.fire(finished);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Direction;
    use crate::headless::{HeadlessScene, HeadlessTransition, SteppedRuntime};
    use crate::transform::Transform;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 320.0, 480.0);

    fn coordinator(effect: TransitionEffect) -> TransitionCoordinator {
        TransitionCoordinator::new(
            SCREEN,
            Color::TRANSPARENT,
            effect,
            ExitGeometry::Compatible,
            OneShot::empty(),
        )
    }

    #[test]
    fn test_every_plan_lasts_half_a_second() {
        for effect in TransitionEffect::ALL {
            for phase in [Phase::Presenting, Phase::Dismissing] {
                let plan =
                    compute_animation(effect, SCREEN, SCREEN, phase, ExitGeometry::Compatible);
                assert_eq!(plan.duration_secs(), 0.5, "{effect} {phase:?}");
            }
        }
    }

    #[test]
    fn test_present_plan_ends_at_rest() {
        for effect in TransitionEffect::ALL {
            let plan = compute_animation(
                effect,
                SCREEN,
                SCREEN,
                Phase::Presenting,
                ExitGeometry::Compatible,
            );
            assert!(plan.target.is_rest(SCREEN));
            assert_eq!(plan.animated, ViewProperties::all());
            assert_eq!(plan.initial, Some(effect.entry_state(SCREEN, SCREEN)));
        }
    }

    #[test]
    fn test_dismiss_plan_animates_only_effect_properties() {
        let plan = compute_animation(
            TransitionEffect::MoveFrom(Direction::Top),
            SCREEN,
            SCREEN,
            Phase::Dismissing,
            ExitGeometry::Compatible,
        );
        assert_eq!(plan.animated, ViewProperties::FRAME);
        assert_eq!(plan.initial, None);
        assert_eq!(plan.target.frame, Rect::new(0.0, 0.0, 320.0, -480.0));
    }

    #[test]
    fn test_scale_anchor_is_same_in_both_phases() {
        for effect in [
            TransitionEffect::ScaleFromCenter,
            TransitionEffect::OpenAxis,
            TransitionEffect::DownSpread,
        ] {
            let present =
                compute_animation(effect, SCREEN, SCREEN, Phase::Presenting, Default::default());
            let dismiss =
                compute_animation(effect, SCREEN, SCREEN, Phase::Dismissing, Default::default());
            assert!(present.anchor.is_some());
            assert_eq!(present.anchor, dismiss.anchor);
        }
    }

    #[test]
    fn test_phase_ordering() {
        let mut c = coordinator(TransitionEffect::FadeIn);
        assert_eq!(c.state(), TransitionState::Idle);

        assert_eq!(
            c.begin_dismiss(),
            Err(TransitionError::InvalidTransition {
                state: TransitionState::Idle,
                requested: Phase::Dismissing,
            })
        );

        c.begin_present().unwrap();
        assert_eq!(c.phase(), Phase::Presenting);
        assert_eq!(c.state(), TransitionState::Presenting);
        assert!(c.begin_present().is_err());
        // Still animating: the host must queue dismissals.
        assert!(c.begin_dismiss().is_err());
    }

    #[test]
    fn test_animate_requires_begin() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let view = scene.create_view();
        let ctx = HeadlessTransition::presenting(scene.container(), view);

        let c = coordinator(TransitionEffect::FadeIn);
        assert!(c.animate_transition(ctx, &mut runtime).is_err());
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_present_sets_anchor_and_entry_state_before_animating() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let view = scene.create_view();
        let id = view.borrow().id();
        let ctx = HeadlessTransition::presenting(scene.container(), view);

        let mut c = coordinator(TransitionEffect::DownSpread);
        c.begin_present().unwrap();
        c.animate_transition(ctx.clone(), &mut runtime).unwrap();

        let record = scene.record(id).unwrap();
        assert!(record.attached);
        assert_eq!(record.anchor, crate::effect::DOWN_SPREAD_ANCHOR);
        assert_eq!(record.transform, Transform::scale_xy(1.0, crate::effect::COLLAPSED_SCALE));
        assert!(ctx.completions().is_empty());

        runtime.finish_all();
        let record = scene.record(id).unwrap();
        assert!(record.transform.is_identity());
        assert_eq!(ctx.completions(), vec![true]);
        assert_eq!(c.state(), TransitionState::Presented);
    }

    #[test]
    fn test_second_animate_while_in_flight_is_rejected() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let view = scene.create_view();
        let ctx = HeadlessTransition::presenting(scene.container(), view);

        let mut c = coordinator(TransitionEffect::ScaleFromCenter);
        c.begin_present().unwrap();
        c.animate_transition(ctx.clone(), &mut runtime).unwrap();
        assert!(c.animate_transition(ctx.clone(), &mut runtime).is_err());

        runtime.finish_all();
        assert_eq!(ctx.completions(), vec![true]);
    }

    #[test]
    fn test_missing_view_completes_without_animation() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let ctx = HeadlessTransition::new(scene.container(), None, None);

        let mut c = coordinator(TransitionEffect::OpenAxis);
        c.begin_present().unwrap();
        c.animate_transition(ctx.clone(), &mut runtime).unwrap();
        runtime.tick(Duration::ZERO);

        assert_eq!(ctx.completions(), vec![true]);
        assert_eq!(c.state(), TransitionState::Presented);
        assert!(scene.children().is_empty());
    }

    #[test]
    fn test_dismiss_detaches_before_signalling() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let view = scene.create_view();
        let id = view.borrow().id();

        let mut c = coordinator(TransitionEffect::FadeIn);
        c.begin_present().unwrap();
        let present = HeadlessTransition::presenting(scene.container(), view.clone());
        c.animate_transition(present, &mut runtime).unwrap();
        runtime.finish_all();

        c.begin_dismiss().unwrap();
        let observed = Rc::new(Cell::new(None));
        let probe = observed.clone();
        let probe_scene = scene.clone();
        let dismiss = HeadlessTransition::dismissing(scene.container(), view)
            .on_complete(move |_| probe.set(Some(probe_scene.is_attached(id))));
        c.animate_transition(dismiss.clone(), &mut runtime).unwrap();
        runtime.finish_all();

        assert_eq!(observed.get(), Some(false));
        assert_eq!(dismiss.completions(), vec![true]);
        assert_eq!(c.state(), TransitionState::Dismissed);
        assert!(c.begin_present().is_err());
    }
}
