//! Boundary traits implemented by the host platform.
//!
//! The presenter never touches a platform view directly. Everything it does
//! to the view hierarchy goes through these traits, which keeps the
//! transition logic testable with the in-memory host in
//! [`crate::headless`].
//!
//! All handles are single-threaded (`Rc<RefCell<_>>`): transitions run on
//! the host's event loop and nothing here is `Send`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::anchor::AnchorPoint;
use crate::geometry::{Color, Rect};
use crate::transform::Transform;

/// Stable identity of a host view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// Handler invoked when a view is tapped.
pub type TapHandler = Rc<dyn Fn()>;

pub type ViewHandle = Rc<RefCell<dyn ViewProxy>>;
pub type ContainerHandle = Rc<RefCell<dyn Container>>;

/// Write-side proxy for a host view.
pub trait ViewProxy {
    fn id(&self) -> ViewId;

    fn set_frame(&mut self, frame: Rect);

    /// Opacity in `[0, 1]`.
    fn set_opacity(&mut self, opacity: f32);

    fn set_anchor_point(&mut self, anchor: AnchorPoint);

    fn set_transform(&mut self, transform: Transform);

    fn set_background_color(&mut self, color: Color);

    /// Replace the tap handler. `None` stops the view from reacting to taps.
    fn set_tap_handler(&mut self, handler: Option<TapHandler>);

    /// Detach the view from whatever container holds it. Detaching a view
    /// that has no parent does nothing.
    fn remove_from_parent(&mut self);
}

/// The host view that presented content and the backdrop live in.
pub trait Container {
    fn bounds(&self) -> Rect;

    /// Insert `view` at `index` in the sibling stack (0 is the bottom).
    /// A view that is already a child is moved to `index`.
    fn insert_child(&mut self, view: &ViewHandle, index: usize);

    /// Insert `view` on top of the sibling stack.
    fn add_child(&mut self, view: &ViewHandle);

    /// Position of a child in the sibling stack, if it is a child.
    fn index_of(&self, id: ViewId) -> Option<usize>;

    /// Create a new, detached view owned by this container's host.
    fn create_view(&mut self) -> ViewHandle;
}

/// Interpolates views from their current state to the state set by
/// `animations`.
pub trait AnimationRuntime {
    /// Run `animations` as an animation lasting `duration`.
    ///
    /// `completion` is invoked once, on the event loop, after the animation
    /// finishes (`true`) or is superseded (`false`).
    fn animate(
        &mut self,
        duration: Duration,
        animations: Box<dyn FnOnce()>,
        completion: Box<dyn FnOnce(bool)>,
    );
}

/// Which side of a transition a view belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKey {
    /// The view being dismissed
    From,
    /// The view being presented
    To,
}

/// Per-transition context handed to the coordinator by the host.
pub trait TransitionContext {
    fn container(&self) -> ContainerHandle;

    fn view(&self, key: ViewKey) -> Option<ViewHandle>;

    /// Tell the host the transition is over.
    fn complete_transition(&self, finished: bool);
}

/// The host's presentation machinery.
pub trait PresentationLifecycle {
    /// Ask the host to tear down the presented content. The host runs the
    /// dismiss transition and then calls `on_finished`.
    fn request_dismiss(&self, animated: bool, on_finished: Box<dyn FnOnce()>);
}
