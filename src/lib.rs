//! # recast
//!
//! Incremental UI reconciliation engine.
//!
//! A declarative element tree, recomputed from application state, is
//! turned into a minimal set of mutations against a persistent host tree.
//! Work is split into per-fiber units that can be interleaved with other
//! work, and function components keep local state across re-renders.
//!
//! ## Architecture
//!
//! ```text
//! state change ─▶ seed WIP generation (alternate = currentRoot)
//!              ─▶ scheduler: unit per fiber (render component / create host node,
//!                 then reconcile children), yielding between units
//!              ─▶ commit: deletions, placements, prop updates via HostAdapter
//!              ─▶ currentRoot = WIP
//! ```
//!
//! ## Modules
//!
//! - [`element`] - Elements, props, listeners, function components
//! - [`fiber`] - Generational fiber arena and effect tags
//! - [`hooks`] - `use_state` and setters
//! - [`reconciler`] - Positional child diffing
//! - [`scheduler`] - `Root`, the work loop and deadlines
//! - [`commit`] - Applying a finished generation to the host
//! - [`host`] - `HostAdapter` and the in-memory `MemoryHost`

pub mod commit;
pub mod config;
pub mod element;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;
pub mod reconciler;
pub mod scheduler;

pub use commit::CommitSummary;
pub use config::RootConfig;
pub use element::{Component, Element, ElementType, Event, Listener, PropValue, Props, create_element, text};
pub use error::{HookMismatch, HostError, HostOp, RecastError, Result};
pub use hooks::{Setter, use_state};
pub use host::{HostAdapter, MemoryHost};
pub use scheduler::{Deadline, FrameBudget, Root, SliceReport, Unbounded, UnitBudget};

/// Create a [`Root`] for `host` and schedule the first render of
/// `element` into `container`.
///
/// Work starts when the root's loop is driven, e.g. with
/// [`Root::run_until_idle`] or [`Root::work_loop`].
pub fn render<H: HostAdapter>(host: H, element: Element, container: H::Node) -> Root<H> {
    let mut root = Root::new(host);
    root.render(element, container);
    root
}
