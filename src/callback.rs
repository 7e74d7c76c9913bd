//! At-most-once callbacks.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared callback that runs at most once, no matter how many clones of
/// it are fired.
///
/// Clones share the same slot: the first [`OneShot::fire`] takes the
/// closure, every later call is a no-op that returns `false`.
pub struct OneShot<A = ()> {
    slot: Rc<RefCell<Option<Box<dyn FnOnce(A)>>>>,
}

impl<A> OneShot<A> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(A) + 'static,
    {
        Self {
            slot: Rc::new(RefCell::new(Some(Box::new(f)))),
        }
    }

    /// A one-shot that has nothing to run.
    pub fn empty() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Run the callback if it has not run yet. Returns whether it ran.
    pub fn fire(&self, arg: A) -> bool {
        // Take before calling so the callback may re-enter this one-shot.
        let callback = self.slot.borrow_mut().take();
        match callback {
            Some(f) => {
                f(arg);
                true
            }
            None => false,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl<A> Clone for OneShot<A> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<A> fmt::Debug for OneShot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShot")
            .field("spent", &self.is_spent())
            .finish()
    }
}
