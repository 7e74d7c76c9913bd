//! In-memory host for running transitions without a platform.
//!
//! [`HeadlessScene`] stores every view it creates in an arena indexed by
//! [`ViewId`] and models a single container holding an ordered stack of
//! children. [`SteppedRuntime`] animates those views by snapshotting the
//! scene around the animation block and interpolating between the two
//! snapshots as time is fed to it with [`SteppedRuntime::tick`].
//!
//! [`HeadlessHost`] wires a [`Presenter`] to all of the above and plays the
//! role of the platform's presentation machinery.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::anchor::AnchorPoint;
use crate::animation::{self, Animatable};
use crate::backdrop::BackdropController;
use crate::coordinator::TransitionState;
use crate::effect::ViewState;
use crate::error::Result;
use crate::geometry::{Color, Rect};
use crate::host::{
    AnimationRuntime, Container, ContainerHandle, PresentationLifecycle, TapHandler,
    TransitionContext, ViewHandle, ViewId, ViewKey, ViewProxy,
};
use crate::transform::Transform;
use crate::{Presenter, PresenterConfig};

/// Everything the scene knows about one view.
#[derive(Clone)]
pub struct ViewRecord {
    pub frame: Rect,
    pub opacity: f32,
    pub anchor: AnchorPoint,
    pub transform: Transform,
    pub background: Color,
    /// Whether the view is a child of the container
    pub attached: bool,
    tap_handler: Option<TapHandler>,
}

impl ViewRecord {
    fn new() -> Self {
        Self {
            frame: Rect::default(),
            opacity: 1.0,
            anchor: AnchorPoint::CENTER,
            transform: Transform::IDENTITY,
            background: Color::TRANSPARENT,
            attached: false,
            tap_handler: None,
        }
    }

    pub fn state(&self) -> ViewState {
        ViewState {
            frame: self.frame,
            opacity: self.opacity,
            transform: self.transform,
        }
    }

    fn set_state(&mut self, state: ViewState) {
        self.frame = state.frame;
        self.opacity = state.opacity;
        self.transform = state.transform;
    }

    /// Region the view covers on screen once its transform is applied.
    pub fn visible_rect(&self) -> Rect {
        self.transform
            .apply_to_rect(self.frame.standardized(), self.anchor)
            .standardized()
    }
}

struct SceneState {
    bounds: Rect,
    records: Vec<ViewRecord>,
    /// Container children, bottom first
    children: Vec<ViewId>,
}

impl SceneState {
    fn record(&self, id: ViewId) -> Option<&ViewRecord> {
        self.records.get(id.0 as usize)
    }

    fn record_mut(&mut self, id: ViewId) -> Option<&mut ViewRecord> {
        self.records.get_mut(id.0 as usize)
    }

    fn detach(&mut self, id: ViewId) {
        self.children.retain(|&child| child != id);
        if let Some(record) = self.record_mut(id) {
            record.attached = false;
        }
    }

    fn insert(&mut self, id: ViewId, index: usize) {
        self.children.retain(|&child| child != id);
        let index = index.min(self.children.len());
        self.children.insert(index, id);
        if let Some(record) = self.record_mut(id) {
            record.attached = true;
        }
    }
}

/// Shared handle to an in-memory view arena with one container.
#[derive(Clone)]
pub struct HeadlessScene {
    inner: Rc<RefCell<SceneState>>,
}

impl HeadlessScene {
    pub fn new(bounds: Rect) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SceneState {
                bounds,
                records: Vec::new(),
                children: Vec::new(),
            })),
        }
    }

    /// The scene's container.
    pub fn container(&self) -> ContainerHandle {
        Rc::new(RefCell::new(HeadlessContainer {
            scene: self.clone(),
        }))
    }

    /// Create a new detached view.
    pub fn create_view(&self) -> ViewHandle {
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = ViewId(state.records.len() as u64);
            state.records.push(ViewRecord::new());
            id
        };
        Rc::new(RefCell::new(HeadlessView {
            id,
            scene: self.clone(),
        }))
    }

    pub fn bounds(&self) -> Rect {
        self.inner.borrow().bounds
    }

    /// Simulate the host resizing the container.
    pub fn set_bounds(&self, bounds: Rect) {
        self.inner.borrow_mut().bounds = bounds;
    }

    pub fn record(&self, id: ViewId) -> Option<ViewRecord> {
        self.inner.borrow().record(id).cloned()
    }

    /// Container children, bottom first.
    pub fn children(&self) -> Vec<ViewId> {
        self.inner.borrow().children.clone()
    }

    pub fn is_attached(&self, id: ViewId) -> bool {
        self.inner.borrow().children.contains(&id)
    }

    /// Tap a view directly. Returns whether an attached view handled it.
    pub fn tap(&self, id: ViewId) -> bool {
        let handler = {
            let state = self.inner.borrow();
            state
                .record(id)
                .filter(|record| record.attached)
                .and_then(|record| record.tap_handler.clone())
        };
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Tap the topmost attached view covering `(x, y)`.
    ///
    /// Views without a tap handler still swallow the tap, the way presented
    /// content shields the backdrop beneath it. Returns the view that was
    /// hit.
    pub fn tap_at(&self, x: f32, y: f32) -> Option<ViewId> {
        let (hit, handler) = {
            let state = self.inner.borrow();
            let hit = state.children.iter().rev().copied().find(|&id| {
                state
                    .record(id)
                    .is_some_and(|record| record.visible_rect().contains(x, y))
            })?;
            let handler = state.record(hit).and_then(|r| r.tap_handler.clone());
            (hit, handler)
        };
        if let Some(handler) = handler {
            handler();
        }
        Some(hit)
    }

    fn snapshot(&self) -> Vec<ViewState> {
        self.inner
            .borrow()
            .records
            .iter()
            .map(ViewRecord::state)
            .collect()
    }

    fn set_state(&self, id: ViewId, state: ViewState) {
        if let Some(record) = self.inner.borrow_mut().record_mut(id) {
            record.set_state(state);
        }
    }

    fn update(&self, id: ViewId, f: impl FnOnce(&mut ViewRecord)) {
        if let Some(record) = self.inner.borrow_mut().record_mut(id) {
            f(record);
        }
    }
}

/// A view living in a [`HeadlessScene`].
pub struct HeadlessView {
    id: ViewId,
    scene: HeadlessScene,
}

impl ViewProxy for HeadlessView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn set_frame(&mut self, frame: Rect) {
        self.scene.update(self.id, |r| r.frame = frame);
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.scene
            .update(self.id, |r| r.opacity = opacity.clamp(0.0, 1.0));
    }

    fn set_anchor_point(&mut self, anchor: AnchorPoint) {
        self.scene.update(self.id, |r| r.anchor = anchor);
    }

    fn set_transform(&mut self, transform: Transform) {
        self.scene.update(self.id, |r| r.transform = transform);
    }

    fn set_background_color(&mut self, color: Color) {
        self.scene.update(self.id, |r| r.background = color);
    }

    fn set_tap_handler(&mut self, handler: Option<TapHandler>) {
        self.scene.update(self.id, |r| r.tap_handler = handler);
    }

    fn remove_from_parent(&mut self) {
        self.scene.inner.borrow_mut().detach(self.id);
    }
}

/// The single container of a [`HeadlessScene`].
pub struct HeadlessContainer {
    scene: HeadlessScene,
}

impl Container for HeadlessContainer {
    fn bounds(&self) -> Rect {
        self.scene.bounds()
    }

    fn insert_child(&mut self, view: &ViewHandle, index: usize) {
        let id = view.borrow().id();
        self.scene.inner.borrow_mut().insert(id, index);
    }

    fn add_child(&mut self, view: &ViewHandle) {
        let id = view.borrow().id();
        let mut state = self.scene.inner.borrow_mut();
        let top = state.children.len();
        state.insert(id, top);
    }

    fn index_of(&self, id: ViewId) -> Option<usize> {
        self.scene
            .inner
            .borrow()
            .children
            .iter()
            .position(|&child| child == id)
    }

    fn create_view(&mut self) -> ViewHandle {
        self.scene.create_view()
    }
}

struct RunningAnimation {
    duration: Duration,
    elapsed: Duration,
    /// (view, start, end) for every view the animation block changed
    tracks: Vec<(ViewId, ViewState, ViewState)>,
    completion: Box<dyn FnOnce(bool)>,
}

impl RunningAnimation {
    fn apply(&self, scene: &HeadlessScene, t: f32) {
        for (id, from, to) in &self.tracks {
            let state = if t >= 1.0 {
                *to
            } else {
                ViewState::lerp(from, to, t)
            };
            scene.set_state(*id, state);
        }
    }
}

/// Animation runtime that advances only when told to.
///
/// Starting an animation while another one is running supersedes the
/// running one: it jumps to its end state and completes with `false`.
pub struct SteppedRuntime {
    scene: HeadlessScene,
    running: Vec<RunningAnimation>,
}

impl SteppedRuntime {
    pub fn new(scene: HeadlessScene) -> Self {
        Self {
            scene,
            running: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    /// Durations of the animations currently running.
    pub fn running_durations(&self) -> Vec<Duration> {
        self.running.iter().map(|a| a.duration).collect()
    }

    /// Advance every running animation by `dt`, completing the ones that
    /// reach their end.
    pub fn tick(&mut self, dt: Duration) {
        let mut finished = Vec::new();
        let mut still_running = Vec::new();
        for mut running in self.running.drain(..) {
            running.elapsed += dt;
            let t = animation::progress(running.elapsed, running.duration);
            running.apply(&self.scene, t);
            if t >= 1.0 {
                finished.push(running);
            } else {
                still_running.push(running);
            }
        }
        self.running = still_running;

        // Completions run host and user callbacks; the runtime must already
        // be consistent by then.
        for running in finished {
            (running.completion)(true);
        }
    }

    /// Run every animation to its end.
    pub fn finish_all(&mut self) {
        while !self.running.is_empty() {
            let longest = self
                .running
                .iter()
                .map(|a| a.duration.saturating_sub(a.elapsed))
                .max()
                .unwrap_or_default();
            self.tick(longest);
        }
    }

    fn supersede(&mut self) {
        for running in std::mem::take(&mut self.running) {
            log::debug!("superseding animation after {:?}", running.elapsed);
            running.apply(&self.scene, 1.0);
            (running.completion)(false);
        }
    }
}

impl AnimationRuntime for SteppedRuntime {
    fn animate(
        &mut self,
        duration: Duration,
        animations: Box<dyn FnOnce()>,
        completion: Box<dyn FnOnce(bool)>,
    ) {
        self.supersede();

        let before = self.scene.snapshot();
        animations();
        let after = self.scene.snapshot();

        let tracks: Vec<_> = after
            .into_iter()
            .enumerate()
            .filter_map(|(index, end)| {
                let start = before.get(index).copied().unwrap_or(end);
                (start != end).then_some((ViewId(index as u64), start, end))
            })
            .collect();

        // Views keep showing their start state until time passes.
        for (id, start, _) in &tracks {
            self.scene.set_state(*id, *start);
        }

        self.running.push(RunningAnimation {
            duration,
            elapsed: Duration::ZERO,
            tracks,
            completion,
        });
    }
}

/// Transition context backed by a [`HeadlessScene`] container.
pub struct HeadlessTransition {
    container: ContainerHandle,
    from: Option<ViewHandle>,
    to: Option<ViewHandle>,
    completions: RefCell<Vec<bool>>,
    on_complete: RefCell<Option<Box<dyn FnOnce(bool)>>>,
}

impl HeadlessTransition {
    pub fn new(
        container: ContainerHandle,
        from: Option<ViewHandle>,
        to: Option<ViewHandle>,
    ) -> Rc<Self> {
        Rc::new(Self {
            container,
            from,
            to,
            completions: RefCell::new(Vec::new()),
            on_complete: RefCell::new(None),
        })
    }

    pub fn presenting(container: ContainerHandle, view: ViewHandle) -> Rc<Self> {
        Self::new(container, None, Some(view))
    }

    pub fn dismissing(container: ContainerHandle, view: ViewHandle) -> Rc<Self> {
        Self::new(container, Some(view), None)
    }

    /// Run `f` when the transition completes.
    pub fn on_complete(self: Rc<Self>, f: impl FnOnce(bool) + 'static) -> Rc<Self> {
        *self.on_complete.borrow_mut() = Some(Box::new(f));
        self
    }

    /// Every `finished` flag the coordinator reported, in order.
    pub fn completions(&self) -> Vec<bool> {
        self.completions.borrow().clone()
    }
}

impl TransitionContext for HeadlessTransition {
    fn container(&self) -> ContainerHandle {
        Rc::clone(&self.container)
    }

    fn view(&self, key: ViewKey) -> Option<ViewHandle> {
        match key {
            ViewKey::From => self.from.clone(),
            ViewKey::To => self.to.clone(),
        }
    }

    fn complete_transition(&self, finished: bool) {
        self.completions.borrow_mut().push(finished);
        let callback = self.on_complete.borrow_mut().take();
        if let Some(callback) = callback {
            callback(finished);
        }
    }
}

/// A dismissal the host has been asked to perform.
pub struct DismissRequest {
    pub animated: bool,
    on_finished: Box<dyn FnOnce()>,
}

impl DismissRequest {
    /// Report the dismissal as done.
    pub fn finish(self) {
        (self.on_finished)();
    }
}

/// Presentation lifecycle that queues dismiss requests for the host loop.
#[derive(Default)]
pub struct DismissQueue {
    pending: RefCell<VecDeque<DismissRequest>>,
    total: std::cell::Cell<usize>,
}

impl DismissQueue {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pop(&self) -> Option<DismissRequest> {
        self.pending.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Requests received over the queue's lifetime.
    pub fn total_requests(&self) -> usize {
        self.total.get()
    }
}

impl PresentationLifecycle for DismissQueue {
    fn request_dismiss(&self, animated: bool, on_finished: Box<dyn FnOnce()>) {
        self.total.set(self.total.get() + 1);
        self.pending.borrow_mut().push_back(DismissRequest {
            animated,
            on_finished,
        });
    }
}

/// A complete in-memory host presenting one piece of content.
pub struct HeadlessHost {
    scene: HeadlessScene,
    container: ContainerHandle,
    runtime: SteppedRuntime,
    lifecycle: Rc<DismissQueue>,
    presenter: Presenter,
    backdrop: Option<BackdropController>,
    content: ViewHandle,
    transitions: Vec<Rc<HeadlessTransition>>,
}

impl HeadlessHost {
    pub fn new(bounds: Rect, config: PresenterConfig) -> Result<Self> {
        let presenter = Presenter::new(config)?;
        let scene = HeadlessScene::new(bounds);
        let container = scene.container();
        let content = scene.create_view();
        let runtime = SteppedRuntime::new(scene.clone());
        Ok(Self {
            scene,
            container,
            runtime,
            lifecycle: DismissQueue::new(),
            presenter,
            backdrop: None,
            content,
            transitions: Vec::new(),
        })
    }

    pub fn scene(&self) -> &HeadlessScene {
        &self.scene
    }

    pub fn runtime(&mut self) -> &mut SteppedRuntime {
        &mut self.runtime
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn lifecycle(&self) -> &Rc<DismissQueue> {
        &self.lifecycle
    }

    pub fn content(&self) -> &ViewHandle {
        &self.content
    }

    pub fn content_id(&self) -> ViewId {
        self.content.borrow().id()
    }

    pub fn backdrop_id(&self) -> Option<ViewId> {
        self.backdrop
            .as_ref()
            .and_then(BackdropController::backdrop)
            .map(|view| view.borrow().id())
    }

    /// Transitions run so far, oldest first.
    pub fn transitions(&self) -> &[Rc<HeadlessTransition>] {
        &self.transitions
    }

    /// One layout pass: keep the backdrop in place beneath the content.
    pub fn layout(&mut self) {
        if self.backdrop.is_none() {
            let lifecycle: Rc<dyn PresentationLifecycle> = self.lifecycle.clone();
            self.backdrop = Some(self.presenter.presentation_controller(lifecycle));
        }
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.sync_layout(&mut *self.container.borrow_mut(), Some(&self.content));
        }
    }

    /// Lay out and start the present transition.
    pub fn present(&mut self) -> Result<()> {
        self.layout();
        let ctx = HeadlessTransition::presenting(self.container.clone(), self.content.clone());
        let animator = self.presenter.animator_for_presented()?;
        self.transitions.push(ctx.clone());
        animator.animate_transition(ctx, &mut self.runtime)
    }

    /// Start the dismiss transition, calling `on_finished` once it is done.
    pub fn dismiss(&mut self, on_finished: Option<Box<dyn FnOnce()>>) -> Result<()> {
        let mut ctx = HeadlessTransition::dismissing(self.container.clone(), self.content.clone());
        if let Some(on_finished) = on_finished {
            ctx = ctx.on_complete(move |_| on_finished());
        }
        let animator = self.presenter.animator_for_dismissed()?;
        self.transitions.push(ctx.clone());
        animator.animate_transition(ctx, &mut self.runtime)
    }

    /// Start the dismiss transition for a queued dismiss request.
    ///
    /// Requests stay queued while the present transition is still running.
    /// Returns whether a dismissal was started.
    pub fn process_dismiss_requests(&mut self) -> Result<bool> {
        if self.presenter.coordinator().state() != TransitionState::Presented {
            return Ok(false);
        }
        let Some(request) = self.lifecycle.pop() else {
            return Ok(false);
        };
        log::debug!("processing dismiss request (animated: {})", request.animated);
        self.dismiss(Some(Box::new(move || request.finish())))?;
        Ok(true)
    }

    pub fn tick(&mut self, dt: Duration) {
        self.runtime.tick(dt);
    }

    pub fn settle(&mut self) {
        self.runtime.finish_all();
    }

    pub fn tap_at(&self, x: f32, y: f32) -> Option<ViewId> {
        self.scene.tap_at(x, y)
    }

    /// Drop the presentation's backdrop, ending the presentation.
    pub fn teardown(&mut self) {
        self.backdrop = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Direction, TransitionEffect};
    use std::cell::Cell;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 320.0, 480.0);

    fn animate_frame(runtime: &mut SteppedRuntime, view: &ViewHandle, frame: Rect) {
        let target = view.clone();
        runtime.animate(
            animation::TRANSITION_DURATION,
            Box::new(move || target.borrow_mut().set_frame(frame)),
            Box::new(|_| {}),
        );
    }

    #[test]
    fn test_runtime_interpolates_between_snapshots() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let view = scene.create_view();
        let id = view.borrow().id();
        view.borrow_mut().set_frame(Rect::new(0.0, -480.0, 320.0, 480.0));

        animate_frame(&mut runtime, &view, SCREEN);
        assert_eq!(scene.record(id).unwrap().frame.y, -480.0);

        runtime.tick(Duration::from_millis(250));
        assert_eq!(scene.record(id).unwrap().frame.y, -240.0);
        assert!(!runtime.is_idle());

        runtime.tick(Duration::from_millis(250));
        assert_eq!(scene.record(id).unwrap().frame, SCREEN);
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_new_animation_supersedes_running_one() {
        let scene = HeadlessScene::new(SCREEN);
        let mut runtime = SteppedRuntime::new(scene.clone());
        let view = scene.create_view();
        let id = view.borrow().id();

        let results = Rc::new(RefCell::new(Vec::new()));
        let first = results.clone();
        let target = view.clone();
        runtime.animate(
            animation::TRANSITION_DURATION,
            Box::new(move || target.borrow_mut().set_opacity(0.0)),
            Box::new(move |finished| first.borrow_mut().push(finished)),
        );
        runtime.tick(Duration::from_millis(100));

        let second = results.clone();
        runtime.animate(
            animation::TRANSITION_DURATION,
            Box::new(|| {}),
            Box::new(move |finished| second.borrow_mut().push(finished)),
        );
        assert_eq!(*results.borrow(), vec![false]);
        assert_eq!(scene.record(id).unwrap().opacity, 0.0);

        runtime.finish_all();
        assert_eq!(*results.borrow(), vec![false, true]);
    }

    #[test]
    fn test_container_insert_moves_existing_child() {
        let scene = HeadlessScene::new(SCREEN);
        let container = scene.container();
        let a = scene.create_view();
        let b = scene.create_view();
        container.borrow_mut().add_child(&a);
        container.borrow_mut().add_child(&b);
        container.borrow_mut().insert_child(&b, 0);

        let (a_id, b_id) = (a.borrow().id(), b.borrow().id());
        assert_eq!(scene.children(), vec![b_id, a_id]);
        assert_eq!(container.borrow().index_of(a_id), Some(1));

        a.borrow_mut().remove_from_parent();
        assert_eq!(scene.children(), vec![b_id]);
        assert!(!scene.record(a_id).unwrap().attached);
    }

    #[test]
    fn test_tap_at_hits_topmost_view() {
        let scene = HeadlessScene::new(SCREEN);
        let container = scene.container();
        let backdrop = scene.create_view();
        let content = scene.create_view();
        backdrop.borrow_mut().set_frame(SCREEN);
        content
            .borrow_mut()
            .set_frame(Rect::new(100.0, 100.0, 50.0, 50.0));
        container.borrow_mut().add_child(&backdrop);
        container.borrow_mut().add_child(&content);

        let taps = Rc::new(Cell::new(0));
        let t = taps.clone();
        backdrop
            .borrow_mut()
            .set_tap_handler(Some(Rc::new(move || t.set(t.get() + 1))));

        assert_eq!(scene.tap_at(120.0, 120.0), Some(content.borrow().id()));
        assert_eq!(taps.get(), 0);
        assert_eq!(scene.tap_at(10.0, 10.0), Some(backdrop.borrow().id()));
        assert_eq!(taps.get(), 1);
        assert_eq!(scene.tap_at(-10.0, 10.0), None);
    }

    #[test]
    fn test_host_runs_full_cycle() {
        let config = PresenterConfig::new(SCREEN.size())
            .target_frame(Rect::new(40.0, 40.0, 240.0, 400.0))
            .effect(TransitionEffect::MoveFrom(Direction::Left));
        let mut host = HeadlessHost::new(SCREEN, config).unwrap();

        host.present().unwrap();
        assert_eq!(
            host.scene().children(),
            vec![host.backdrop_id().unwrap(), host.content_id()]
        );
        host.settle();

        host.tap_at(5.0, 5.0);
        assert!(host.process_dismiss_requests().unwrap());
        host.settle();

        assert!(!host.scene().is_attached(host.content_id()));
        assert_eq!(host.transitions().len(), 2);

        let backdrop = host.backdrop_id().unwrap();
        host.teardown();
        assert!(host.scene().children().is_empty());
        assert!(!host.scene().is_attached(backdrop));
    }
}
