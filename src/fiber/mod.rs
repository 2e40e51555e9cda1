//! Fiber Tree - Persistent, double-buffered work units.
//!
//! Fibers live in a generational arena and link to each other by key:
//!
//! ```text
//! Root ──child──▶ div ──sibling──▶ Counter ──child──▶ button
//!   ▲              │                  │
//!   └────parent────┴──────────────────┘
//! ```
//!
//! `alternate` points at the fiber in the same position of the last
//! committed generation. It is a plain lookup key, not an owning edge:
//! once that generation is swept the key simply resolves to nothing.

use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};

use crate::element::{Component, ElementType, Props};
use crate::hooks::Hook;

new_key_type! {
    /// Stable handle of a fiber in the arena.
    pub struct FiberId;
}

// =============================================================================
// Effect tags (bitflags)
// =============================================================================

bitflags! {
    /// Host mutation planned for a fiber.
    ///
    /// Reconciliation sets exactly one flag; commit clears it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EffectTag: u8 {
        const PLACEMENT = 1 << 0;
        const UPDATE = 1 << 1;
        const DELETION = 1 << 2;
    }
}

// =============================================================================
// Fiber
// =============================================================================

/// What a fiber represents.
#[derive(Debug, Clone, PartialEq)]
pub enum FiberKind {
    /// Mount point. Its host node is the container passed to `render`.
    Root,
    Host(String),
    Text,
    Component(Component),
}

impl FiberKind {
    /// Whether an element of `kind` can reuse a fiber of this kind.
    pub fn matches(&self, kind: &ElementType) -> bool {
        match (self, kind) {
            (Self::Host(a), ElementType::Host(b)) => a == b,
            (Self::Text, ElementType::Text) => true,
            (Self::Component(a), ElementType::Component(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }
}

impl From<ElementType> for FiberKind {
    fn from(kind: ElementType) -> Self {
        match kind {
            ElementType::Host(tag) => Self::Host(tag),
            ElementType::Text => Self::Text,
            ElementType::Component(c) => Self::Component(c),
        }
    }
}

/// One element instance within one generation.
#[derive(Debug)]
pub struct Fiber<N> {
    pub kind: FiberKind,
    pub props: Props,
    /// Host node owned by this fiber. Components never have one.
    pub node: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub effect: EffectTag,
    /// Local state slots, only populated on component fibers.
    pub(crate) hooks: Vec<Hook>,
    /// Generation this fiber was built in.
    pub generation: u64,
}

impl<N> Fiber<N> {
    pub fn new(kind: FiberKind, props: Props, generation: u64) -> Self {
        Self {
            kind,
            props,
            node: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::empty(),
            hooks: Vec::new(),
            generation,
        }
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

// =============================================================================
// FiberTree
// =============================================================================

/// Arena holding every live fiber of every live generation.
#[derive(Debug)]
pub struct FiberTree<N> {
    fibers: SlotMap<FiberId, Fiber<N>>,
}

impl<N> Default for FiberTree<N> {
    fn default() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }
}

impl<N> FiberTree<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id)
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Resolve a fiber's alternate, if that generation is still alive.
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.get(id)?.alternate.filter(|alt| self.contains(*alt))
    }

    /// Children of `id` in sibling order.
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        Children {
            tree: self,
            next: self.get(id).and_then(|f| f.child),
        }
    }

    /// Nearest ancestor of `id` that owns a host node.
    pub fn host_parent(&self, id: FiberId) -> Option<FiberId> {
        let mut current = self.get(id)?.parent;
        while let Some(parent) = current {
            let fiber = self.get(parent)?;
            if fiber.node.is_some() {
                return Some(parent);
            }
            current = fiber.parent;
        }
        None
    }

    /// Drop every fiber that was not built in `generation`.
    ///
    /// Returns how many fibers were released.
    pub fn retain_generation(&mut self, generation: u64) -> usize {
        let before = self.fibers.len();
        self.fibers.retain(|_, fiber| fiber.generation == generation);
        before - self.fibers.len()
    }
}

impl<N> Index<FiberId> for FiberTree<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.fibers[id]
    }
}

impl<N> IndexMut<FiberId> for FiberTree<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.fibers[id]
    }
}

/// Iterator over a fiber's children.
pub struct Children<'a, N> {
    tree: &'a FiberTree<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree.get(id).and_then(|f| f.sibling);
        Some(id)
    }
}
