//! Shared GPU context
//!
//! [`Gpu`] owns the active [`GraphicsApi`] and the "currently active"
//! binding identities (shader program, render target). Every GPU-resident
//! object keeps a [`GpuContext`] so it can release its handles when dropped.
//!
//! Single-threaded by construction: the context is `Rc`-shared and the
//! backend sits behind a `RefCell`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::graphics_api::GraphicsApi;

/// Shared handle to the GPU context
pub type GpuContext = Rc<Gpu>;

/// Identity used for active-binding comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

/// Graphics backend plus active-binding bookkeeping
pub struct Gpu {
    api: RefCell<Box<dyn GraphicsApi>>,
    next_id: Cell<u64>,
    active_shader: Cell<Option<BindingId>>,
    active_target: Cell<Option<BindingId>>,
}

impl Gpu {
    /// Wrap a backend in a new shared context
    pub fn new(api: impl GraphicsApi + 'static) -> GpuContext {
        Self::from_boxed(Box::new(api))
    }

    /// Wrap an already boxed backend
    pub fn from_boxed(api: Box<dyn GraphicsApi>) -> GpuContext {
        Rc::new(Self {
            api: RefCell::new(api),
            next_id: Cell::new(0),
            active_shader: Cell::new(None),
            active_target: Cell::new(None),
        })
    }

    /// Run `f` against the backend
    ///
    /// Calls must not nest; each asset operation issues its GPU work inside
    /// a single closure.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn GraphicsApi) -> R) -> R {
        let mut api = self.api.borrow_mut();
        f(api.as_mut())
    }

    /// Allocate a fresh binding identity
    pub fn next_binding_id(&self) -> BindingId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        BindingId(id)
    }

    /// Identity of the active shader program
    pub fn active_shader(&self) -> Option<BindingId> {
        self.active_shader.get()
    }

    /// Record the active shader program
    pub fn set_active_shader(&self, id: Option<BindingId>) {
        self.active_shader.set(id);
    }

    /// Identity of the active render target
    pub fn active_target(&self) -> Option<BindingId> {
        self.active_target.get()
    }

    /// Record the active render target
    pub fn set_active_target(&self, id: Option<BindingId>) {
        self.active_target.set(id);
    }

    /// Log the most recent GPU error under `tag`
    ///
    /// Purely diagnostic; the error is never propagated.
    pub fn log_error(&self, tag: &str) {
        if let Some(code) = self.with(|api| api.last_error()) {
            log::error!("GPU error [{}]: {:#06x}", tag, code);
        }
    }
}

impl std::fmt::Debug for Gpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gpu")
            .field("active_shader", &self.active_shader.get())
            .field("active_target", &self.active_target.get())
            .finish_non_exhaustive()
    }
}
