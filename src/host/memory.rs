//! MemoryHost - Headless in-memory host.
//!
//! Keeps a node tree in a slotmap and records every mutation the engine
//! performs, in order. Useful for tests, snapshots and server-less tooling.
//!
//! The tree is strict: removing a node from a parent it is not attached to
//! is an error, so double removals surface immediately.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use slotmap::{SlotMap, new_key_type};

use super::HostAdapter;
use crate::element::{Event, Listener, NODE_VALUE, PropValue};
use crate::error::{HostError, HostOp};

new_key_type! {
    /// Handle of a node owned by a [`MemoryHost`].
    pub struct HostNodeId;
}

// =============================================================================
// Nodes + mutation log
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryNodeKind {
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub kind: MemoryNodeKind,
    pub attributes: BTreeMap<String, PropValue>,
    pub listeners: Vec<(String, Listener)>,
    pub children: Vec<HostNodeId>,
    pub parent: Option<HostNodeId>,
}

impl MemoryNode {
    fn new(kind: MemoryNodeKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateNode { node: HostNodeId, tag: String },
    CreateText { node: HostNodeId, value: String },
    SetAttribute { node: HostNodeId, name: String },
    ClearAttribute { node: HostNodeId, name: String },
    AddListener { node: HostNodeId, event: String },
    RemoveListener { node: HostNodeId, event: String },
    AppendChild { parent: HostNodeId, child: HostNodeId },
    InsertBefore { parent: HostNodeId, child: HostNodeId, before: HostNodeId },
    RemoveChild { parent: HostNodeId, child: HostNodeId },
}

impl Mutation {
    /// Attribute and listener changes, as opposed to structural ones.
    pub fn is_prop_change(&self) -> bool {
        matches!(
            self,
            Self::SetAttribute { .. }
                | Self::ClearAttribute { .. }
                | Self::AddListener { .. }
                | Self::RemoveListener { .. }
        )
    }
}

// =============================================================================
// MemoryHost
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: SlotMap<HostNodeId, MemoryNode>,
    log: Vec<Mutation>,
    failing: HashSet<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached mount point. Not recorded in the mutation log.
    pub fn create_container(&mut self, tag: &str) -> HostNodeId {
        self.nodes.insert(MemoryNode::new(MemoryNodeKind::Element(tag.to_string())))
    }

    /// Make every subsequent `op` fail until [`clear_failures`](Self::clear_failures).
    pub fn fail_on(&mut self, op: HostOp) {
        self.failing.insert(op);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn node(&self, id: HostNodeId) -> Option<&MemoryNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: HostNodeId) -> &[HostNodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn attribute(&self, id: HostNodeId, name: &str) -> Option<&PropValue> {
        self.nodes.get(id)?.attributes.get(name)
    }

    /// Text content of a text node.
    pub fn text(&self, id: HostNodeId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            MemoryNodeKind::Text(value) => Some(value),
            MemoryNodeKind::Element(_) => None,
        }
    }

    /// First element below `root` (depth-first, root excluded) with `tag`.
    pub fn find_by_tag(&self, root: HostNodeId, tag: &str) -> Option<HostNodeId> {
        for &child in self.children(root) {
            if matches!(&self.nodes[child].kind, MemoryNodeKind::Element(t) if t == tag) {
                return Some(child);
            }
            if let Some(found) = self.find_by_tag(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Invoke every `event` listener on `node`. Returns how many ran.
    pub fn dispatch(&self, node: HostNodeId, event: &Event) -> usize {
        let listeners: Vec<Listener> = self
            .nodes
            .get(node)
            .map(|n| {
                n.listeners
                    .iter()
                    .filter(|(name, _)| *name == event.name)
                    .map(|(_, l)| l.clone())
                    .collect()
            })
            .unwrap_or_default();

        for listener in &listeners {
            listener.call(event);
        }
        listeners.len()
    }

    /// Markup-like rendering of everything below `root` (root excluded).
    pub fn serialize(&self, root: HostNodeId) -> String {
        let mut out = String::new();
        for &child in self.children(root) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: HostNodeId, out: &mut String) {
        let node = &self.nodes[id];
        match &node.kind {
            MemoryNodeKind::Text(value) => out.push_str(value),
            MemoryNodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn check(&self, op: HostOp) -> Result<(), HostError> {
        if self.failing.contains(&op) {
            return Err(HostError::new(format!("injected failure in {op}")));
        }
        Ok(())
    }

    fn node_mut(&mut self, id: HostNodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| HostError::new(format!("unknown node {id:?}")))
    }

    fn detach(&mut self, child: HostNodeId) {
        if let Some(old_parent) = self.nodes.get(child).and_then(|n| n.parent) {
            if let Some(parent) = self.nodes.get_mut(old_parent) {
                parent.children.retain(|c| *c != child);
            }
        }
    }
}

impl HostAdapter for MemoryHost {
    type Node = HostNodeId;

    fn create_node(&mut self, tag: &str) -> Result<HostNodeId, HostError> {
        self.check(HostOp::CreateNode)?;
        let node = self.nodes.insert(MemoryNode::new(MemoryNodeKind::Element(tag.to_string())));
        self.log.push(Mutation::CreateNode {
            node,
            tag: tag.to_string(),
        });
        Ok(node)
    }

    fn create_text_node(&mut self, value: &str) -> Result<HostNodeId, HostError> {
        self.check(HostOp::CreateTextNode)?;
        let node = self.nodes.insert(MemoryNode::new(MemoryNodeKind::Text(value.to_string())));
        self.log.push(Mutation::CreateText {
            node,
            value: value.to_string(),
        });
        Ok(node)
    }

    fn set_attribute(&mut self, node: &HostNodeId, name: &str, value: &PropValue) -> Result<(), HostError> {
        self.check(HostOp::SetAttribute)?;
        let target = self.node_mut(*node)?;
        match &mut target.kind {
            MemoryNodeKind::Text(content) if name == NODE_VALUE => *content = value.to_string(),
            _ => {
                target.attributes.insert(name.to_string(), value.clone());
            }
        }
        self.log.push(Mutation::SetAttribute {
            node: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn clear_attribute(&mut self, node: &HostNodeId, name: &str) -> Result<(), HostError> {
        self.check(HostOp::ClearAttribute)?;
        let target = self.node_mut(*node)?;
        match &mut target.kind {
            MemoryNodeKind::Text(content) if name == NODE_VALUE => content.clear(),
            _ => {
                target.attributes.remove(name);
            }
        }
        self.log.push(Mutation::ClearAttribute {
            node: *node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_listener(&mut self, node: &HostNodeId, event: &str, listener: &Listener) -> Result<(), HostError> {
        self.check(HostOp::AddListener)?;
        self.node_mut(*node)?
            .listeners
            .push((event.to_string(), listener.clone()));
        self.log.push(Mutation::AddListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_listener(&mut self, node: &HostNodeId, event: &str, listener: &Listener) -> Result<(), HostError> {
        self.check(HostOp::RemoveListener)?;
        self.node_mut(*node)?
            .listeners
            .retain(|(name, l)| !(name == event && l == listener));
        self.log.push(Mutation::RemoveListener {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &HostNodeId, child: &HostNodeId) -> Result<(), HostError> {
        self.check(HostOp::AppendChild)?;
        self.node_mut(*child)?;
        self.node_mut(*parent)?;
        self.detach(*child);
        self.nodes[*parent].children.push(*child);
        self.nodes[*child].parent = Some(*parent);
        self.log.push(Mutation::AppendChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn insert_before(&mut self, parent: &HostNodeId, child: &HostNodeId, before: &HostNodeId) -> Result<(), HostError> {
        self.check(HostOp::InsertBefore)?;
        self.node_mut(*child)?;
        self.detach(*child);
        let position = self
            .node_mut(*parent)?
            .children
            .iter()
            .position(|c| c == before)
            .ok_or_else(|| HostError::new(format!("{before:?} is not a child of {parent:?}")))?;
        self.nodes[*parent].children.insert(position, *child);
        self.nodes[*child].parent = Some(*parent);
        self.log.push(Mutation::InsertBefore {
            parent: *parent,
            child: *child,
            before: *before,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &HostNodeId, child: &HostNodeId) -> Result<(), HostError> {
        self.check(HostOp::RemoveChild)?;
        if self.node_mut(*child)?.parent != Some(*parent) {
            return Err(HostError::new(format!("{child:?} is not a child of {parent:?}")));
        }
        self.detach(*child);
        self.nodes[*child].parent = None;
        self.log.push(Mutation::RemoveChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_tree_building_and_serialize() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let div = host.create_node("div").unwrap();
        let text = host.create_text_node("hi").unwrap();

        host.set_attribute(&div, "id", &"main".into()).unwrap();
        host.append_child(&div, &text).unwrap();
        host.append_child(&root, &div).unwrap();

        assert_eq!(host.serialize(root), "<div id=\"main\">hi</div>");
        assert_eq!(host.find_by_tag(root, "div"), Some(div));
        assert_eq!(host.mutations().len(), 5);
    }

    #[test]
    fn test_insert_before_and_strict_removal() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let a = host.create_node("a").unwrap();
        let b = host.create_node("b").unwrap();
        host.append_child(&root, &b).unwrap();
        host.insert_before(&root, &a, &b).unwrap();

        assert_eq!(host.children(root), &[a, b]);

        host.remove_child(&root, &a).unwrap();
        assert!(host.remove_child(&root, &a).is_err());
        assert_eq!(host.serialize(root), "<b></b>");
    }

    #[test]
    fn test_text_node_value_attribute() {
        let mut host = MemoryHost::new();
        let text = host.create_text_node("1").unwrap();
        host.set_attribute(&text, NODE_VALUE, &"2".into()).unwrap();
        assert_eq!(host.text(text), Some("2"));
    }

    #[test]
    fn test_dispatch_and_remove_listener() {
        let mut host = MemoryHost::new();
        let button = host.create_node("button").unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let listener = Listener::new(move |_| counter.set(counter.get() + 1));

        host.add_listener(&button, "click", &listener).unwrap();
        assert_eq!(host.dispatch(button, &Event::new("click")), 1);
        assert_eq!(host.dispatch(button, &Event::new("input")), 0);

        host.remove_listener(&button, "click", &listener).unwrap();
        assert_eq!(host.dispatch(button, &Event::new("click")), 0);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_failure_injection() {
        let mut host = MemoryHost::new();
        host.fail_on(HostOp::CreateNode);
        assert!(host.create_node("div").is_err());

        host.clear_failures();
        assert!(host.create_node("div").is_ok());
    }
}
