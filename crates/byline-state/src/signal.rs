//! Single-threaded observable cells.
//!
//! A [`Signal`] is a value plus an explicit watcher list. `set` notifies
//! watchers only when the value actually changed; watchers run synchronously,
//! in registration order. There is no batching and no scheduler — the cell
//! is the whole mechanism.
//!
//! Watchers usually capture a `Weak` to the component that registered them
//! and bail out when the upgrade fails; that keeps the signal graph free of
//! `Rc` cycles.

use std::cell::RefCell;
use std::rc::Rc;

type Watcher<T> = Rc<dyn Fn(&T)>;

/// An observable cell holding a value of type `T`.
///
/// Cloning a `Signal` clones the handle, not the value: both handles read
/// and write the same cell.
pub struct Signal<T> {
    inner: Rc<Inner<T>>,
}

struct Inner<T> {
    value: RefCell<T>,
    watchers: RefCell<Vec<Watcher<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Creates a cell with an initial value. No notification fires for the
    /// initial value; use [`Signal::watch_immediate`] to observe it.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                watchers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replaces the value. Watchers are notified only if the new value
    /// differs from the current one.
    pub fn set(&self, value: T) {
        let changed = {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Mutates the value in place and notifies watchers unconditionally.
    ///
    /// Used for container edits (replacing one element) where comparing the
    /// whole value would be wasteful.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.notify();
    }

    /// Registers a watcher. Watchers fire in registration order.
    pub fn watch(&self, watcher: impl Fn(&T) + 'static) {
        self.inner.watchers.borrow_mut().push(Rc::new(watcher));
    }

    /// Registers a watcher and fires it once, immediately, with the current
    /// value (no missed initial state).
    pub fn watch_immediate(&self, watcher: impl Fn(&T) + 'static) {
        watcher(&self.inner.value.borrow());
        self.watch(watcher);
    }

    /// Calls every watcher with a snapshot of the current value.
    ///
    /// Iterates by index so a watcher may register further watchers while
    /// notification is in progress; a watcher that writes back into another
    /// signal re-enters that signal's notification synchronously.
    fn notify(&self) {
        let snapshot = self.get();
        let mut index = 0;
        loop {
            let watcher = {
                let watchers = self.inner.watchers.borrow();
                watchers.get(index).map(Rc::clone)
            };
            let Some(watcher) = watcher else { break };
            watcher(&snapshot);
            index += 1;
        }
    }
}
