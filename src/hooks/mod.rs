//! Hook Manager - Positional local state for function components.
//!
//! While a component function runs, a render frame is installed for the
//! current thread. `use_state` reads and extends that frame:
//!
//! ```text
//! alternate.hooks:  [ count, label ]      (previous committed generation)
//!                      │       │
//! use_state #0 ───────-┘       │          seeds state, replays its queue
//! use_state #1 ────────────────┘
//! fiber.hooks:      [ count', label' ]    (generation under construction)
//! ```
//!
//! Hooks are addressed by call order only. A component must call the same
//! hooks, with the same value types, in the same order on every render.
//!
//! # Example
//!
//! ```
//! use recast::element::{Component, Props, create_element};
//! use recast::hooks::use_state;
//!
//! let counter = Component::new("Counter", |_props| {
//!     let (count, set_count) = use_state(1)?;
//!     Ok(create_element(
//!         "button",
//!         Props::new().on("onClick", move |_| set_count.set(|c| c + 1)),
//!         vec![count.into()],
//!     ))
//! });
//! # let _ = counter;
//! ```

use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{HookMismatch, RecastError, Result};

type Transition<T> = Rc<dyn Fn(&T) -> T>;

// =============================================================================
// Hook storage
// =============================================================================

/// State and pending transitions of one hook in one generation.
struct HookCell<T> {
    state: T,
    queue: RefCell<Vec<Transition<T>>>,
}

/// Type-erased hook slot stored on a component fiber.
#[derive(Clone)]
pub(crate) struct Hook {
    cell: Rc<dyn Any>,
    type_name: &'static str,
}

impl Hook {
    fn new<T: 'static>(cell: Rc<HookCell<T>>) -> Self {
        Self {
            cell,
            type_name: type_name::<T>(),
        }
    }

    fn downcast<T: 'static>(&self) -> Option<Rc<HookCell<T>>> {
        self.cell.clone().downcast::<HookCell<T>>().ok()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("type", &self.type_name).finish()
    }
}

// =============================================================================
// Update signal
// =============================================================================

/// Shared flag raised by setters and observed by the work loop.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateSignal(Rc<Cell<bool>>);

impl UpdateSignal {
    pub(crate) fn request(&self) {
        self.0.set(true);
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn clear(&self) {
        self.0.set(false);
    }
}

// =============================================================================
// Setter
// =============================================================================

/// Queues state transitions for one hook and requests a re-render.
///
/// Transitions are folded in enqueue order on the next render, each one
/// receiving the result of the previous. They may be replayed more than
/// once if a generation is abandoned, so they must be pure.
pub struct Setter<T> {
    cell: Weak<HookCell<T>>,
    signal: UpdateSignal,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            signal: self.signal.clone(),
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("type", &type_name::<T>())
            .field("live", &(self.cell.strong_count() > 0))
            .finish()
    }
}

impl<T: 'static> Setter<T> {
    /// Queue `transition` and schedule a new generation.
    pub fn set(&self, transition: impl Fn(&T) -> T + 'static) {
        let Some(cell) = self.cell.upgrade() else {
            tracing::debug!(hook = type_name::<T>(), "state update dropped: hook no longer mounted");
            return;
        };
        cell.queue.borrow_mut().push(Rc::new(transition));
        self.signal.request();
    }

    /// Number of transitions waiting for the next render.
    pub fn pending(&self) -> usize {
        self.cell.upgrade().map_or(0, |cell| cell.queue.borrow().len())
    }
}

impl<T: Clone + 'static> Setter<T> {
    /// Replace the state with `value` on the next render.
    pub fn set_value(&self, value: T) {
        self.set(move |_| value.clone());
    }
}

// =============================================================================
// Render frame
// =============================================================================

/// Hook context of the component currently rendering.
pub(crate) struct RenderFrame {
    component: String,
    previous: Option<Vec<Hook>>,
    hooks: Vec<Hook>,
    cursor: usize,
    signal: UpdateSignal,
}

impl RenderFrame {
    /// `previous` is the alternate's hook list, `None` on first mount.
    pub(crate) fn new(component: &str, previous: Option<Vec<Hook>>, signal: UpdateSignal) -> Self {
        Self {
            component: component.to_string(),
            previous,
            hooks: Vec::new(),
            cursor: 0,
            signal,
        }
    }

    fn mismatch(&self, mismatch: HookMismatch) -> RecastError {
        RecastError::InconsistentHookSequence {
            component: self.component.clone(),
            mismatch,
        }
    }

    /// Validate the final hook count and hand back the new hook list.
    pub(crate) fn finish(self) -> Result<Vec<Hook>> {
        if let Some(previous) = &self.previous {
            if previous.len() != self.hooks.len() {
                return Err(self.mismatch(HookMismatch::CountChanged {
                    expected: previous.len(),
                    found: self.hooks.len(),
                }));
            }
        }
        Ok(self.hooks)
    }
}

thread_local! {
    static ACTIVE_FRAME: RefCell<Option<RenderFrame>> = const { RefCell::new(None) };
}

/// Installs a render frame for the duration of one component call.
///
/// Dropping the scope without `finish` (e.g. on unwind) still uninstalls
/// the frame and restores whatever was active before.
pub(crate) struct RenderScope {
    outer: Option<Option<RenderFrame>>,
}

impl RenderScope {
    pub(crate) fn enter(frame: RenderFrame) -> Self {
        let outer = ACTIVE_FRAME.with(|active| active.borrow_mut().replace(frame));
        Self { outer: Some(outer) }
    }

    pub(crate) fn finish(mut self) -> Result<Vec<Hook>> {
        let frame = self.restore();
        match frame {
            Some(frame) => frame.finish(),
            None => Err(RecastError::NoActiveRenderContext),
        }
    }

    fn restore(&mut self) -> Option<RenderFrame> {
        let outer = self.outer.take()?;
        ACTIVE_FRAME.with(|active| std::mem::replace(&mut *active.borrow_mut(), outer))
    }
}

impl Drop for RenderScope {
    fn drop(&mut self) {
        self.restore();
    }
}

/// True while a component function is being invoked on this thread.
pub fn is_rendering() -> bool {
    ACTIVE_FRAME.with(|active| active.borrow().is_some())
}

// =============================================================================
// use_state
// =============================================================================

/// Declare a piece of local state for the rendering component.
///
/// On first mount the state is `initial`. On later renders it is the
/// previous generation's state with every queued transition applied in
/// order.
///
/// # Errors
///
/// - [`RecastError::NoActiveRenderContext`] outside a component render.
/// - [`RecastError::InconsistentHookSequence`] if this call has no
///   counterpart of the same type in the previous generation.
pub fn use_state<T: Clone + 'static>(initial: T) -> Result<(T, Setter<T>)> {
    // Look up the previous slot, then release the frame before running
    // user transitions.
    let (previous, signal) = ACTIVE_FRAME.with(|active| {
        let mut active = active.borrow_mut();
        let frame = active.as_mut().ok_or(RecastError::NoActiveRenderContext)?;
        let index = frame.cursor;
        frame.cursor += 1;

        let previous = match &frame.previous {
            None => None,
            Some(hooks) => {
                let hook = hooks
                    .get(index)
                    .ok_or_else(|| frame.mismatch(HookMismatch::Unexpected { index }))?;
                let cell = hook.downcast::<T>().ok_or_else(|| {
                    frame.mismatch(HookMismatch::TypeChanged {
                        index,
                        expected: hook.type_name,
                        found: type_name::<T>(),
                    })
                })?;
                Some(cell)
            }
        };
        Ok::<_, RecastError>((previous, frame.signal.clone()))
    })?;

    let state = match previous {
        None => initial,
        Some(cell) => {
            let queue: Vec<Transition<T>> = cell.queue.borrow().clone();
            queue
                .iter()
                .fold(cell.state.clone(), |state, transition| transition(&state))
        }
    };

    let cell = Rc::new(HookCell {
        state: state.clone(),
        queue: RefCell::new(Vec::new()),
    });
    let setter = Setter {
        cell: Rc::downgrade(&cell),
        signal,
    };

    ACTIVE_FRAME.with(|active| {
        let mut active = active.borrow_mut();
        let frame = active.as_mut().ok_or(RecastError::NoActiveRenderContext)?;
        frame.hooks.push(Hook::new(cell));
        Ok((state, setter))
    })
}
