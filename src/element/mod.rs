//! Elements - Immutable descriptions of the desired UI.
//!
//! Elements are rebuilt on every render and consumed by reconciliation.
//! They never own host nodes; fibers do.
//!
//! # Example
//!
//! ```
//! use recast::element::{create_element, Props};
//!
//! let el = create_element(
//!     "button",
//!     Props::new().attr("id", "inc"),
//!     vec!["Count: ".into(), 1.into()],
//! );
//! assert_eq!(el.props.children.len(), 2);
//! ```

mod props;

pub use props::*;

use std::fmt;
use std::rc::Rc;

use crate::error::Result;

// =============================================================================
// Component
// =============================================================================

type RenderFn = dyn Fn(&Props) -> Result<Element>;

/// A function component.
///
/// Identity is the shared render function: clones of one `Component`
/// match each other, two separately constructed components never do.
/// Build a component once and reuse it across renders.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(name: &str, render: impl Fn(&Props) -> Result<Element> + 'static) -> Self {
        Self {
            name: name.into(),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, props: &Props) -> Result<Element> {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

// =============================================================================
// Element
// =============================================================================

/// What an element renders to.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// A host node with the given tag.
    Host(String),
    /// A text node; content lives in the `nodeValue` prop.
    Text,
    /// A function component.
    Component(Component),
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        Self::Host(tag.to_string())
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        Self::Host(tag)
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<&Component> for ElementType {
    fn from(component: &Component) -> Self {
        Self::Component(component.clone())
    }
}

/// Immutable description of one UI node and its subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementType,
    pub props: Props,
}

impl Element {
    /// Text content for `Text` elements.
    pub fn text_value(&self) -> Option<&str> {
        match self.kind {
            ElementType::Text => self.props.get(NODE_VALUE).and_then(PropValue::as_str),
            _ => None,
        }
    }
}

/// Build an element; `children` are appended after any children already in `props`.
pub fn create_element(kind: impl Into<ElementType>, mut props: Props, children: Vec<Element>) -> Element {
    props.children.extend(children);
    Element {
        kind: kind.into(),
        props,
    }
}

/// Build a text element.
pub fn text(value: impl fmt::Display) -> Element {
    Element {
        kind: ElementType::Text,
        props: Props::new().attr(NODE_VALUE, value.to_string()),
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        text(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        text(value)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_wraps_primitives_as_text() {
        let el = create_element("h1", Props::new(), vec!["Count: ".into(), 3.into()]);

        assert_eq!(el.kind, ElementType::Host("h1".into()));
        assert_eq!(el.props.children[0].text_value(), Some("Count: "));
        assert_eq!(el.props.children[1].text_value(), Some("3"));
        assert!(el.props.children[1].props.children.is_empty());
    }

    #[test]
    fn test_component_identity() {
        let counter = Component::new("Counter", |_| Ok(text("x")));
        let other = Component::new("Counter", |_| Ok(text("x")));

        assert_eq!(ElementType::from(&counter), ElementType::from(counter.clone()));
        assert_ne!(ElementType::from(&counter), ElementType::from(&other));
    }
}
