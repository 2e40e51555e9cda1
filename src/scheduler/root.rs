//! Root - Owner of one render tree and its scheduling state.
//!
//! Every `Root` is independent: its fiber arena, host adapter, cursor and
//! pending deletions live here rather than in process-wide state, so
//! several roots (and tests) never interfere.
//!
//! # Example
//!
//! ```
//! use recast::element::{Props, create_element};
//! use recast::host::MemoryHost;
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let app = create_element("h1", Props::new(), vec!["Hello".into()]);
//!
//! let mut root = recast::render(host, app, container);
//! root.run_until_idle()?;
//! assert_eq!(root.host().serialize(container), "<h1>Hello</h1>");
//! # Ok::<(), recast::RecastError>(())
//! ```

use crate::commit::{CommitSummary, apply_initial_props, commit_root};
use crate::config::RootConfig;
use crate::element::{Component, Element, NODE_VALUE, Props};
use crate::error::{HostOp, RecastError, Result};
use crate::fiber::{EffectTag, Fiber, FiberId, FiberKind, FiberTree};
use crate::hooks::{RenderFrame, RenderScope, UpdateSignal};
use crate::host::HostAdapter;
use crate::reconciler::reconcile_children;

use super::deadline::{Deadline, Unbounded};
use super::next_unit;

// =============================================================================
// Slice report
// =============================================================================

/// Outcome of one call to [`Root::work_loop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceReport {
    /// Units of work performed in this slice.
    pub units: usize,
    /// Set when the slice finished a generation and committed it.
    pub commit: Option<CommitSummary>,
    /// Whether more work is waiting for another slice.
    pub pending: bool,
}

// =============================================================================
// Root
// =============================================================================

pub struct Root<H: HostAdapter> {
    host: H,
    tree: FiberTree<H::Node>,
    config: RootConfig,
    /// Last committed generation.
    current_root: Option<FiberId>,
    /// Generation under construction.
    wip_root: Option<FiberId>,
    /// Scheduler cursor into the WIP generation.
    next_unit: Option<FiberId>,
    /// Old fibers to remove at the next commit.
    deletions: Vec<FiberId>,
    /// Host nodes attached directly to the container.
    mounted: Vec<H::Node>,
    generation: u64,
    updates: UpdateSignal,
}

impl<H: HostAdapter> Root<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, RootConfig::default())
    }

    pub fn with_config(host: H, config: RootConfig) -> Self {
        Self {
            host,
            tree: FiberTree::new(),
            config,
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            mounted: Vec::new(),
            generation: 0,
            updates: UpdateSignal::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tree(&self) -> &FiberTree<H::Node> {
        &self.tree
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    pub fn work_in_progress(&self) -> Option<FiberId> {
        self.wip_root
    }

    /// Id of the most recently seeded generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if a generation is in flight or a state update is waiting.
    pub fn has_pending_work(&self) -> bool {
        self.next_unit.is_some()
            || self.wip_root.is_some()
            || (self.updates.is_requested() && self.current_root.is_some())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Schedule a render of `element` into `container`.
    ///
    /// Nothing is computed until the work loop runs. Supersedes any
    /// generation that has not been committed yet.
    pub fn render(&mut self, element: Element, container: H::Node) {
        self.seed(container, Props::with_children(vec![element]));
    }

    /// Schedule a top-down re-render of the committed tree.
    pub fn request_update(&self) {
        self.updates.request();
    }

    /// Forget every generation. The host tree is left as is.
    pub fn reset(&mut self) {
        self.tree = FiberTree::new();
        self.current_root = None;
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();
        self.mounted.clear();
        self.updates.clear();
    }

    fn seed(&mut self, container: H::Node, props: Props) {
        if self.wip_root.take().is_some() {
            let released = self.release_uncommitted();
            tracing::debug!(generation = self.generation, released, "superseding uncommitted generation");
        }

        self.generation += 1;
        let mut fiber = Fiber::new(FiberKind::Root, props, self.generation);
        fiber.node = Some(container);
        fiber.alternate = self.current_root;
        let id = self.tree.insert(fiber);

        self.wip_root = Some(id);
        self.next_unit = Some(id);
        tracing::debug!(generation = self.generation, "generation seeded");
    }

    /// Reseed from the committed tree if a setter asked for it.
    ///
    /// Requests made before the first commit stay pending.
    fn apply_pending_update(&mut self) {
        if !self.updates.is_requested() {
            return;
        }
        let Some(current) = self.current_root else {
            return;
        };
        self.updates.clear();

        let fiber = &self.tree[current];
        let Some(container) = fiber.node.clone() else {
            return;
        };
        let props = fiber.props.clone();
        self.seed(container, props);
    }

    fn discard_deletions(&mut self) {
        for id in self.deletions.drain(..) {
            if let Some(fiber) = self.tree.get_mut(id) {
                fiber.effect = EffectTag::empty();
            }
        }
    }

    /// Drop every fiber outside the committed generation.
    fn release_uncommitted(&mut self) -> usize {
        self.discard_deletions();
        let keep = self.current_root.map(|id| self.tree[id].generation);
        self.tree.retain_generation(keep.unwrap_or(u64::MAX))
    }

    fn abandon(&mut self, err: &RecastError) {
        tracing::warn!(error = %err, generation = self.generation, "abandoning work-in-progress generation");
        self.wip_root = None;
        self.next_unit = None;
        self.release_uncommitted();
    }

    /// Drop both generations after a commit that left the host half
    /// updated.
    ///
    /// The committed tree no longer describes the host, so the next
    /// render starts from scratch and clears the container first. Local
    /// state of every component is lost.
    fn tear_down(&mut self, err: &RecastError, host_calls: usize) {
        tracing::warn!(
            error = %err,
            generation = self.generation,
            host_calls,
            mounted = self.mounted.len(),
            "commit failed part way, dropping committed tree"
        );
        self.tree = FiberTree::new();
        self.current_root = None;
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();
        self.updates.clear();
    }

    // -------------------------------------------------------------------------
    // Work loop
    // -------------------------------------------------------------------------

    /// Run units of work until the deadline asks to yield or the
    /// generation is complete, committing it in the latter case.
    ///
    /// On error the generation is abandoned and the committed tree is
    /// left untouched.
    pub fn work_loop(&mut self, deadline: impl Deadline) -> Result<SliceReport> {
        let mut report = SliceReport::default();

        loop {
            self.apply_pending_update();
            let Some(unit) = self.next_unit else {
                break;
            };
            if self.config.max_units_per_slice.is_some_and(|max| report.units >= max) {
                break;
            }

            match self.perform_unit_of_work(unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    self.abandon(&err);
                    return Err(err);
                }
            }
            report.units += 1;

            if deadline.time_remaining() < self.config.yield_threshold {
                break;
            }
        }

        if self.next_unit.is_none() && self.wip_root.is_some() {
            report.commit = Some(self.commit()?);
        }
        report.pending = self.has_pending_work();
        Ok(report)
    }

    /// Drive the loop without a deadline until nothing is pending.
    ///
    /// Returns how many generations were committed.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut commits = 0;
        loop {
            let report = self.work_loop(Unbounded)?;
            commits += usize::from(report.commit.is_some());
            if !report.pending {
                return Ok(commits);
            }
        }
    }

    /// Run one slice per deadline handed out by `next_slice`, for as long
    /// as it keeps handing them out.
    ///
    /// This is the host's idle callback: return `None` to stop.
    pub fn run_slices<D: Deadline>(&mut self, mut next_slice: impl FnMut() -> Option<D>) -> Result<usize> {
        let mut commits = 0;
        while let Some(deadline) = next_slice() {
            let report = self.work_loop(deadline)?;
            commits += usize::from(report.commit.is_some());
        }
        Ok(commits)
    }

    // -------------------------------------------------------------------------
    // Units of work
    // -------------------------------------------------------------------------

    fn perform_unit_of_work(&mut self, id: FiberId) -> Result<Option<FiberId>> {
        let kind = self.tree[id].kind.clone();
        tracing::trace!(fiber = ?id, ?kind, "unit of work");

        match kind {
            FiberKind::Component(component) => self.update_function_component(id, &component)?,
            FiberKind::Root => {
                let children = self.tree[id].props.children.clone();
                reconcile_children(&mut self.tree, &mut self.deletions, id, children)?;
            }
            FiberKind::Host(_) | FiberKind::Text => {
                self.ensure_host_node(id)?;
                let children = self.tree[id].props.children.clone();
                reconcile_children(&mut self.tree, &mut self.deletions, id, children)?;
            }
        }

        let root = self.wip_root.unwrap_or(id);
        Ok(next_unit(&self.tree, id, root))
    }

    fn update_function_component(&mut self, id: FiberId, component: &Component) -> Result<()> {
        let previous = self.tree.alternate(id).map(|alt| self.tree[alt].hooks.clone());
        let scope = RenderScope::enter(RenderFrame::new(component.name(), previous, self.updates.clone()));
        let rendered = component.call(&self.tree[id].props);
        let hooks = scope.finish();

        let element = rendered?;
        self.tree[id].hooks = hooks?;
        reconcile_children(&mut self.tree, &mut self.deletions, id, vec![element])
    }

    /// Create the host node of a host or text fiber, detached, with its
    /// initial props applied.
    fn ensure_host_node(&mut self, id: FiberId) -> Result<()> {
        let fiber = &self.tree[id];
        if fiber.node.is_some() {
            return Ok(());
        }

        let node = match &fiber.kind {
            FiberKind::Text => {
                let value = fiber.props.get(NODE_VALUE).map(ToString::to_string).unwrap_or_default();
                self.host
                    .create_text_node(&value)
                    .map_err(RecastError::host(HostOp::CreateTextNode))?
            }
            FiberKind::Host(tag) => {
                let node = self
                    .host
                    .create_node(tag)
                    .map_err(RecastError::host(HostOp::CreateNode))?;
                apply_initial_props(&mut self.host, &node, &fiber.props)?;
                node
            }
            FiberKind::Root | FiberKind::Component(_) => return Ok(()),
        };

        self.tree[id].node = Some(node);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    fn commit(&mut self) -> Result<CommitSummary> {
        let Some(root) = self.wip_root else {
            return Ok(CommitSummary::default());
        };

        let mut summary = CommitSummary::default();
        if let Err(err) = commit_root(
            &mut self.tree,
            &mut self.host,
            root,
            &self.deletions,
            &mut self.mounted,
            &mut summary,
        ) {
            match summary.host_calls {
                0 => self.abandon(&err),
                landed => self.tear_down(&err, landed),
            }
            return Err(err);
        }

        self.current_root = Some(root);
        self.wip_root = None;
        self.deletions.clear();
        let released = self.tree.retain_generation(self.tree[root].generation);

        tracing::debug!(
            generation = self.tree[root].generation,
            placements = summary.placements,
            updates = summary.updates,
            deletions = summary.deletions,
            released,
            "generation committed"
        );
        Ok(summary)
    }
}

impl<H: HostAdapter + std::fmt::Debug> std::fmt::Debug for Root<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Root")
            .field("host", &self.host)
            .field("fibers", &self.tree.len())
            .field("generation", &self.generation)
            .field("current_root", &self.current_root)
            .field("wip_root", &self.wip_root)
            .field("next_unit", &self.next_unit)
            .finish()
    }
}
