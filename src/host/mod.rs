//! Host Adapter - The capability set a platform provides to the engine.
//!
//! The engine never touches platform nodes directly. Node creation happens
//! while a generation is being built (nodes stay detached); every other
//! mutation happens during commit.

mod memory;

pub use memory::*;

use std::fmt::Debug;

use crate::element::{Listener, PropValue};
use crate::error::HostError;

/// Platform bindings used by the reconciler and the commit phase.
pub trait HostAdapter {
    /// Opaque node handle. Each handle is owned by exactly one fiber.
    type Node: Clone + PartialEq + Debug;

    fn create_node(&mut self, tag: &str) -> Result<Self::Node, HostError>;

    fn create_text_node(&mut self, value: &str) -> Result<Self::Node, HostError>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &PropValue) -> Result<(), HostError>;

    fn clear_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), HostError>;

    fn add_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener) -> Result<(), HostError>;

    fn remove_listener(&mut self, node: &Self::Node, event: &str, listener: &Listener) -> Result<(), HostError>;

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Insert `child` into `parent` directly before `before`.
    fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, before: &Self::Node) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
}
