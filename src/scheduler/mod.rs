//! Work Scheduler - Cooperative, incremental traversal of the fiber tree.
//!
//! One unit of work = one fiber: render it (component) or make sure it
//! has a host node (host/text), then reconcile its children. The loop
//! checks the slice's [`Deadline`] after every unit and yields between
//! units only, never inside one.
//!
//! ```text
//! render()/setter ──▶ seed WIP root ──▶ unit ─▶ unit ─▶ ... ─▶ commit
//!                          ▲               (yield between units)  │
//!                          └──────── currentRoot ◀────────────────┘
//! ```

mod deadline;
mod root;

pub use deadline::*;
pub use root::*;

use crate::fiber::{FiberId, FiberTree};

/// Depth-first successor of `id` within the tree rooted at `root`.
///
/// Child first, otherwise the sibling of the nearest ancestor (or self)
/// that has one. `None` once the walk climbs back to `root`.
pub fn next_unit<N>(tree: &FiberTree<N>, id: FiberId, root: FiberId) -> Option<FiberId> {
    if let Some(child) = tree[id].child {
        return Some(child);
    }

    let mut fiber = id;
    loop {
        if fiber == root {
            return None;
        }
        if let Some(sibling) = tree[fiber].sibling {
            return Some(sibling);
        }
        fiber = tree[fiber].parent?;
    }
}
