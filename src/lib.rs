//! Custom modal presentation transitions.
//!
//! A [`Presenter`] bundles one presentation's configuration. When the host
//! presents content it asks the presenter for an animator
//! ([`Presenter::animator_for_presented`]), which runs the entry transition
//! through the host's animation runtime. The backdrop beneath the content
//! is managed by the [`BackdropController`] returned from
//! [`Presenter::presentation_controller`]; tapping it asks the host to
//! dismiss, and the dismissal runs the exit transition obtained from
//! [`Presenter::animator_for_dismissed`].
//!
//! The library talks to the platform only through the traits in [`host`].
//! [`headless`] implements all of them in memory.

pub mod anchor;
pub mod animation;
pub mod backdrop;
pub mod callback;
pub mod coordinator;
pub mod effect;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod transform;

use std::rc::Rc;

use backdrop::BackdropController;
use callback::OneShot;
use coordinator::TransitionCoordinator;
use effect::{ExitGeometry, TransitionEffect};
use error::{Result, TransitionError};
use geometry::{Color, Rect, Size};
use host::PresentationLifecycle;

pub mod prelude {
    pub use crate::anchor::AnchorPoint;
    pub use crate::backdrop::BackdropController;
    pub use crate::coordinator::{AnimationPlan, Phase, TransitionCoordinator, TransitionState};
    pub use crate::effect::{Direction, ExitGeometry, TransitionEffect, ViewState};
    pub use crate::error::{Result, TransitionError};
    pub use crate::geometry::{Color, Point, Rect, Size};
    pub use crate::host::{
        AnimationRuntime, Container, PresentationLifecycle, TransitionContext, ViewId, ViewKey,
        ViewProxy,
    };
    pub use crate::transform::Transform;
    pub use crate::{Presenter, PresenterConfig};
}

/// Called once after the user dismissed the presented content by tapping
/// the backdrop.
pub type DismissCallback = Box<dyn FnOnce()>;

pub struct PresenterConfig {
    /// Where the presented content rests
    pub target_frame: Rect,
    /// Fill color of the backdrop
    pub backdrop_color: Color,
    pub effect: TransitionEffect,
    pub exit_geometry: ExitGeometry,
    pub on_dismissed: Option<DismissCallback>,
}

impl PresenterConfig {
    /// Full-screen content fading in over a transparent backdrop.
    pub fn new(screen: Size) -> Self {
        Self {
            target_frame: Rect::from_size(screen),
            backdrop_color: Color::TRANSPARENT,
            effect: TransitionEffect::default(),
            exit_geometry: ExitGeometry::default(),
            on_dismissed: None,
        }
    }

    pub fn target_frame(mut self, frame: Rect) -> Self {
        self.target_frame = frame;
        self
    }

    pub fn backdrop_color(mut self, color: Color) -> Self {
        self.backdrop_color = color;
        self
    }

    pub fn effect(mut self, effect: TransitionEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn exit_geometry(mut self, exit_geometry: ExitGeometry) -> Self {
        self.exit_geometry = exit_geometry;
        self
    }

    /// Set the callback fired after a backdrop tap has dismissed the
    /// content.
    pub fn on_dismissed<F: FnOnce() + 'static>(mut self, callback: F) -> Self {
        self.on_dismissed = Some(Box::new(callback));
        self
    }

    pub fn validate(&self) -> Result<()> {
        let frame = self.target_frame;
        if !frame.is_finite() || frame.has_negative_size() {
            return Err(TransitionError::InvalidFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        if !self.backdrop_color.is_normalized() {
            return Err(TransitionError::InvalidColor);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PresenterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenterConfig")
            .field("target_frame", &self.target_frame)
            .field("backdrop_color", &self.backdrop_color)
            .field("effect", &self.effect)
            .field("exit_geometry", &self.exit_geometry)
            .field("on_dismissed", &self.on_dismissed.is_some())
            .finish()
    }
}

/// Transition delegate for one presentation.
pub struct Presenter {
    coordinator: TransitionCoordinator,
}

impl Presenter {
    pub fn new(config: PresenterConfig) -> Result<Self> {
        config.validate()?;
        log::debug!("creating presenter: {:?}", config);

        let on_dismissed = match config.on_dismissed {
            Some(callback) => OneShot::new(move |()| callback()),
            None => OneShot::empty(),
        };
        Ok(Self {
            coordinator: TransitionCoordinator::new(
                config.target_frame,
                config.backdrop_color,
                config.effect,
                config.exit_geometry,
                on_dismissed,
            ),
        })
    }

    /// Animator for the present transition. Fails if the content was
    /// already presented.
    pub fn animator_for_presented(&mut self) -> Result<&TransitionCoordinator> {
        self.coordinator.begin_present()?;
        Ok(&self.coordinator)
    }

    /// Animator for the dismiss transition. Fails unless the present
    /// transition has completed.
    pub fn animator_for_dismissed(&mut self) -> Result<&TransitionCoordinator> {
        self.coordinator.begin_dismiss()?;
        Ok(&self.coordinator)
    }

    /// Backdrop controller for this presentation. Backdrop taps go to
    /// `lifecycle`.
    pub fn presentation_controller(
        &self,
        lifecycle: Rc<dyn PresentationLifecycle>,
    ) -> BackdropController {
        BackdropController::new(
            self.coordinator.backdrop_color(),
            self.coordinator.target_frame(),
            self.coordinator.on_dismissed().clone(),
            lifecycle,
        )
    }

    pub fn coordinator(&self) -> &TransitionCoordinator {
        &self.coordinator
    }
}
