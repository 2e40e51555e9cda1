//! Commit - Apply a finished generation to the host tree.
//!
//! Runs synchronously once traversal is complete:
//!
//! 1. Deletions: every host node of every deleted subtree is removed
//!    exactly once, children before parents.
//! 2. Effects: depth-first over the new tree (child, then sibling),
//!    placing new nodes and diffing props of reused ones.
//!
//! Effect tags are cleared as they are consumed.
//!
//! A generation with no alternate owns its container outright: any node
//! still attached there (left by a commit that failed part way) is
//! removed before the new nodes go in.

mod props;

pub use props::*;

use crate::error::{HostOp, RecastError, Result};
use crate::fiber::{EffectTag, FiberId, FiberTree};
use crate::host::HostAdapter;
use crate::scheduler::next_unit;

/// What a commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
    /// Host nodes removed while processing deletions.
    pub removed_nodes: usize,
    /// Attribute and listener calls made by updates.
    pub prop_calls: usize,
    /// Host mutations that landed, prop calls included.
    pub host_calls: usize,
}

/// Apply deletions and effects of the generation rooted at `root`.
///
/// `mounted` lists the host nodes attached directly to the root's
/// container and is updated as each container-level mutation lands.
/// `summary` is filled in as the commit goes, so on error it tells how
/// much reached the host.
pub fn commit_root<H: HostAdapter>(
    tree: &mut FiberTree<H::Node>,
    host: &mut H,
    root: FiberId,
    deletions: &[FiberId],
    mounted: &mut Vec<H::Node>,
    summary: &mut CommitSummary,
) -> Result<()> {
    let Some(container) = tree[root].node.clone() else {
        tracing::warn!(fiber = ?root, "root fiber has no container");
        return Ok(());
    };
    let fresh = tree.alternate(root).is_none();
    let mut commit = Commit {
        tree,
        host,
        container,
        mounted,
        summary,
    };

    if fresh {
        commit.clear_container()?;
    }

    for &fiber in deletions {
        let Some(parent) = commit.tree.host_parent(fiber).and_then(|p| commit.tree[p].node.clone()) else {
            tracing::warn!(?fiber, "deleted fiber has no host ancestor");
            continue;
        };
        let removed = commit.deletion(fiber, &parent)?;
        commit.summary.removed_nodes += removed;
        commit.summary.deletions += 1;
    }

    let mut next = commit.tree[root].child;
    while let Some(id) = next {
        commit.work(id)?;
        next = next_unit(commit.tree, id, root);
    }

    Ok(())
}

struct Commit<'a, H: HostAdapter> {
    tree: &'a mut FiberTree<H::Node>,
    host: &'a mut H,
    container: H::Node,
    mounted: &'a mut Vec<H::Node>,
    summary: &'a mut CommitSummary,
}

impl<H: HostAdapter> Commit<'_, H> {
    fn remove(&mut self, parent: &H::Node, node: &H::Node) -> Result<()> {
        self.host
            .remove_child(parent, node)
            .map_err(RecastError::host(HostOp::RemoveChild))?;
        self.summary.host_calls += 1;
        if *parent == self.container {
            self.mounted.retain(|mounted| mounted != node);
        }
        Ok(())
    }

    fn place(&mut self, parent: &H::Node, node: &H::Node, before: Option<&H::Node>) -> Result<()> {
        match before {
            Some(before) => self
                .host
                .insert_before(parent, node, before)
                .map_err(RecastError::host(HostOp::InsertBefore))?,
            None => self
                .host
                .append_child(parent, node)
                .map_err(RecastError::host(HostOp::AppendChild))?,
        }
        self.summary.host_calls += 1;
        if *parent == self.container {
            self.mounted.push(node.clone());
        }
        Ok(())
    }

    fn clear_container(&mut self) -> Result<()> {
        if self.mounted.is_empty() {
            return Ok(());
        }
        tracing::debug!(nodes = self.mounted.len(), "clearing nodes left in the container");
        let container = self.container.clone();
        for node in self.mounted.clone() {
            self.remove(&container, &node)?;
        }
        Ok(())
    }

    /// Remove every host node below and including `fiber` from the host
    /// tree.
    ///
    /// Component boundaries own no node; their children are removed from
    /// the boundary's host parent instead.
    fn deletion(&mut self, fiber: FiberId, parent: &H::Node) -> Result<usize> {
        let children: Vec<FiberId> = self.tree.children(fiber).collect();
        let mut removed = 0;

        match self.tree[fiber].node.clone() {
            Some(node) => {
                for child in children {
                    removed += self.deletion(child, &node)?;
                }
                self.remove(parent, &node)?;
                removed += 1;
            }
            None => {
                for child in children {
                    removed += self.deletion(child, parent)?;
                }
            }
        }

        self.tree[fiber].effect = EffectTag::empty();
        Ok(removed)
    }

    fn work(&mut self, id: FiberId) -> Result<()> {
        let effect = self.tree[id].effect;

        if effect.contains(EffectTag::PLACEMENT) {
            if let Some(node) = self.tree[id].node.clone() {
                let Some(parent) = self.tree.host_parent(id).and_then(|p| self.tree[p].node.clone()) else {
                    tracing::warn!(fiber = ?id, "placed fiber has no host ancestor");
                    return Ok(());
                };
                let before = host_sibling(self.tree, id);
                self.place(&parent, &node, before.as_ref())?;
            }
            self.summary.placements += 1;
        } else if effect.contains(EffectTag::UPDATE) {
            let fiber = &self.tree[id];
            if let (Some(node), Some(alternate)) = (&fiber.node, self.tree.alternate(id)) {
                let before = self.summary.prop_calls;
                let diffed = props::diff_props(
                    &mut *self.host,
                    node,
                    &self.tree[alternate].props,
                    &fiber.props,
                    &mut self.summary.prop_calls,
                );
                self.summary.host_calls += self.summary.prop_calls - before;
                diffed?;
            }
            self.summary.updates += 1;
        }

        self.tree[id].effect = EffectTag::empty();
        Ok(())
    }
}


/// Host node that a placed fiber must be inserted before, if any.
///
/// Looks at following siblings, climbing out of component boundaries
/// and descending into them, until a mounted host node is found. Fibers
/// still waiting for placement are skipped since they are not attached.
fn host_sibling<N: Clone>(tree: &FiberTree<N>, id: FiberId) -> Option<N> {
    let mut fiber = id;

    'siblings: loop {
        loop {
            if let Some(sibling) = tree[fiber].sibling {
                fiber = sibling;
                break;
            }
            let parent = tree[fiber].parent?;
            if tree[parent].node.is_some() {
                return None;
            }
            fiber = parent;
        }

        loop {
            let current = &tree[fiber];
            if current.effect.contains(EffectTag::PLACEMENT) {
                continue 'siblings;
            }
            if let Some(node) = &current.node {
                return Some(node.clone());
            }
            match current.child {
                Some(child) => fiber = child,
                None => continue 'siblings,
            }
        }
    }
}
