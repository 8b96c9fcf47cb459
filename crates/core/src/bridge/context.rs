//! Ambient execution context of the current thread.
//!
//! Holds the boundary that is active while the enhancer runs. Every change goes
//! through a [`ContextGuard`], which puts the previous value back when dropped,
//! on error paths and unwinding included.

use std::cell::Cell;
use std::marker::PhantomData;

use super::boundary::BoundaryId;

thread_local! {
    static CURRENT: Cell<Option<BoundaryId>> = const { Cell::new(None) };
}

/// Boundary currently active on this thread.
pub fn current() -> Option<BoundaryId> {
    CURRENT.with(Cell::get)
}

/// Makes `id` the active boundary until the guard is dropped.
pub fn enter(id: BoundaryId) -> ContextGuard {
    let guard = save();
    CURRENT.with(|current| current.set(Some(id)));
    guard
}

/// Snapshot of the current context, restored when the guard is dropped.
pub fn save() -> ContextGuard {
    ContextGuard {
        previous: current(),
        _not_send: PhantomData,
    }
}

#[must_use = "the context is restored when the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<BoundaryId>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous;
        CURRENT.with(|current| current.set(previous));
    }
}
