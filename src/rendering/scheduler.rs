use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::traits::{HostWindow, NullHost};

/// Whether a full recomposition is waiting for the next idle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawState {
    Idle,
    Pending,
}

/// Coalesces redraw requests into at most one idle-slot callback.
///
/// Two kinds of work are tracked: a full redraw (recompose the backing
/// surface) and a cheap expose (repaint the screen from the existing
/// surface, used while dragging). Both share one idle slot, so the host sees
/// a single `schedule_idle` no matter how many requests arrive before the
/// slot runs.
///
/// The scheduler is shared with overlay images so that property changes on
/// an image can request a redraw without access to the widget.
pub struct RedrawScheduler {
    state: Cell<RedrawState>,
    expose_pending: Cell<bool>,
    host: RefCell<Rc<dyn HostWindow>>,
}

impl RedrawScheduler {
    pub fn new(host: Rc<dyn HostWindow>) -> Rc<Self> {
        Rc::new(Self {
            state: Cell::new(RedrawState::Idle),
            expose_pending: Cell::new(false),
            host: RefCell::new(host),
        })
    }

    pub fn state(&self) -> RedrawState {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state.get() == RedrawState::Pending
    }

    pub fn is_expose_pending(&self) -> bool {
        self.expose_pending.get()
    }

    /// Schedules a full redraw. Returns `false` when one was already pending.
    pub fn request_redraw(&self) -> bool {
        if self.is_pending() {
            log::trace!("redraw already pending");
            return false;
        }
        let slot_taken = self.expose_pending.get();
        self.state.set(RedrawState::Pending);
        if !slot_taken {
            self.host().schedule_idle();
        }
        true
    }

    /// Schedules a repaint from the existing backing surface.
    pub fn request_expose(&self) -> bool {
        if self.expose_pending.get() {
            return false;
        }
        self.expose_pending.set(true);
        if !self.is_pending() {
            self.host().schedule_idle();
        }
        true
    }

    /// Consumes the pending redraw, moving back to `Idle`.
    pub fn take_redraw(&self) -> bool {
        self.state.replace(RedrawState::Idle) == RedrawState::Pending
    }

    pub fn take_expose(&self) -> bool {
        self.expose_pending.replace(false)
    }

    pub fn host(&self) -> Rc<dyn HostWindow> {
        Rc::clone(&self.host.borrow())
    }

    pub fn set_host(&self, host: Rc<dyn HostWindow>) {
        *self.host.borrow_mut() = host;
    }
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self {
            state: Cell::new(RedrawState::Idle),
            expose_pending: Cell::new(false),
            host: RefCell::new(Rc::new(NullHost)),
        }
    }
}

impl std::fmt::Debug for RedrawScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedrawScheduler")
            .field("state", &self.state.get())
            .field("expose_pending", &self.expose_pending.get())
            .finish()
    }
}
