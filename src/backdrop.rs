//! Backdrop management for a presentation.
//!
//! The backdrop is a plain view filling the container beneath the presented
//! content. It carries the configured backdrop color and turns taps that
//! miss the content into a dismissal request.

use std::cell::Cell;
use std::rc::Rc;

use crate::callback::OneShot;
use crate::geometry::{Color, Rect};
use crate::host::{Container, PresentationLifecycle, TapHandler, ViewHandle};

/// Owns the backdrop view of one presentation.
///
/// The backdrop is created on the first [`sync_layout`](Self::sync_layout)
/// and removed from its container when the controller is dropped.
pub struct BackdropController {
    backdrop_color: Color,
    target_frame: Rect,
    on_dismissed: OneShot,
    lifecycle: Rc<dyn PresentationLifecycle>,
    backdrop: Option<ViewHandle>,
    dismiss_requested: Rc<Cell<bool>>,
}

impl BackdropController {
    pub fn new(
        backdrop_color: Color,
        target_frame: Rect,
        on_dismissed: OneShot,
        lifecycle: Rc<dyn PresentationLifecycle>,
    ) -> Self {
        Self {
            backdrop_color,
            target_frame,
            on_dismissed,
            lifecycle,
            backdrop: None,
            dismiss_requested: Rc::new(Cell::new(false)),
        }
    }

    pub fn backdrop(&self) -> Option<&ViewHandle> {
        self.backdrop.as_ref()
    }

    pub fn backdrop_color(&self) -> Color {
        self.backdrop_color
    }

    /// Whether a tap has already asked the host to dismiss.
    pub fn dismiss_requested(&self) -> bool {
        self.dismiss_requested.get()
    }

    /// Bring the backdrop and the presented view in line with the
    /// container. Called on every layout pass of the host; repeated calls
    /// leave the hierarchy unchanged.
    ///
    /// The backdrop always ends up at index 0 of the container, filling
    /// its bounds.
    pub fn sync_layout(&mut self, container: &mut dyn Container, presented_view: Option<&ViewHandle>) {
        if let Some(view) = presented_view {
            view.borrow_mut().set_frame(self.target_frame);
        }

        let backdrop = match &self.backdrop {
            Some(view) => Rc::clone(view),
            None => {
                let view = container.create_view();
                log::debug!("created backdrop view {:?}", view.borrow().id());
                self.backdrop = Some(Rc::clone(&view));
                view
            }
        };

        let bounds = container.bounds();
        {
            let mut view = backdrop.borrow_mut();
            view.set_background_color(self.backdrop_color);
            view.set_frame(bounds);
            view.set_tap_handler(Some(self.tap_handler()));
        }
        container.insert_child(&backdrop, 0);
    }

    /// Same as tapping the backdrop.
    pub fn handle_tap(&self) {
        request_dismissal(&*self.lifecycle, &self.on_dismissed, &self.dismiss_requested);
    }

    fn tap_handler(&self) -> TapHandler {
        let lifecycle = Rc::clone(&self.lifecycle);
        let on_dismissed = self.on_dismissed.clone();
        let dismiss_requested = Rc::clone(&self.dismiss_requested);
        Rc::new(move || request_dismissal(&*lifecycle, &on_dismissed, &dismiss_requested))
    }
}

fn request_dismissal(
    lifecycle: &dyn PresentationLifecycle,
    on_dismissed: &OneShot,
    dismiss_requested: &Cell<bool>,
) {
    if dismiss_requested.replace(true) {
        log::debug!("backdrop tapped again while dismissal is pending, ignoring");
        return;
    }
    log::info!("backdrop tapped, requesting dismissal");
    let notify = on_dismissed.clone();
    lifecycle.request_dismiss(
        true,
        Box::new(move || {
            if !notify.fire(()) {
                log::debug!("dismissed without a dismiss callback");
            }
        }),
    );
}

impl Drop for BackdropController {
    fn drop(&mut self) {
        if let Some(backdrop) = self.backdrop.take() {
            match backdrop.try_borrow_mut() {
                Ok(mut view) => {
                    view.set_tap_handler(None);
                    view.remove_from_parent();
                }
                Err(_) => log::warn!("backdrop view busy while tearing down, leaving it attached"),
            }
        }
    }
}
