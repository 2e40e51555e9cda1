//! Reconciler - Positional diff of a fiber's children.
//!
//! Walks the previous generation's children (`alternate.child` and its
//! siblings) and the new elements side by side, by index:
//!
//! ```text
//! old:  h1      p       span
//! new:  h1      div
//!       UPDATE  PLACEMENT + DELETION(p)   DELETION(span)
//! ```
//!
//! There is no key matching. Moving an element within a sibling list
//! reads as a type change at each affected index.

use crate::element::{Element, ElementType};
use crate::error::{RecastError, Result};
use crate::fiber::{EffectTag, Fiber, FiberId, FiberKind, FiberTree};

/// Build the next generation's children of `parent` from `elements`.
///
/// Old children that cannot be reused are tagged `DELETION` and pushed to
/// `deletions`; they are never linked into the new tree.
pub fn reconcile_children<N: Clone>(
    tree: &mut FiberTree<N>,
    deletions: &mut Vec<FiberId>,
    parent: FiberId,
    elements: Vec<Element>,
) -> Result<()> {
    let generation = tree[parent].generation;
    let mut old = tree.alternate(parent).and_then(|alt| tree[alt].child);
    let mut previous: Option<FiberId> = None;
    let mut elements = elements.into_iter();

    tree[parent].child = None;

    loop {
        let element = elements.next();
        if element.is_none() && old.is_none() {
            break;
        }

        if let Some(element) = &element {
            validate_type(&element.kind)?;
        }

        let same_type = match (old, &element) {
            (Some(old), Some(element)) => tree[old].kind.matches(&element.kind),
            _ => false,
        };

        let fiber = match (old, element) {
            (Some(old), Some(element)) if same_type => {
                let reused = &tree[old];
                let mut fiber = Fiber::new(reused.kind.clone(), element.props, generation);
                fiber.node = reused.node.clone();
                fiber.alternate = Some(old);
                fiber.effect = EffectTag::UPDATE;
                Some(fiber)
            }
            (_, Some(element)) => {
                let mut fiber = Fiber::new(FiberKind::from(element.kind), element.props, generation);
                fiber.effect = EffectTag::PLACEMENT;
                Some(fiber)
            }
            (_, None) => None,
        };

        if let Some(old) = old.filter(|_| !same_type) {
            tree[old].effect = EffectTag::DELETION;
            deletions.push(old);
        }

        old = old.and_then(|id| tree[id].sibling);

        if let Some(mut fiber) = fiber {
            fiber.parent = Some(parent);
            let id = tree.insert(fiber);
            match previous {
                None => tree[parent].child = Some(id),
                Some(prev) => tree[prev].sibling = Some(id),
            }
            previous = Some(id);
        }
    }

    Ok(())
}

/// Reject element types that cannot be mapped to a host node.
pub fn validate_type(kind: &ElementType) -> Result<()> {
    match kind {
        ElementType::Host(tag) if !is_valid_tag(tag) => Err(RecastError::InvalidElementType { tag: tag.clone() }),
        _ => Ok(()),
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        }
        _ => false,
    }
}
