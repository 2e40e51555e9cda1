//! Props - Attribute values, listeners and the prop map carried by elements.
//!
//! Props are split by naming convention:
//! - `on<Event>` names are listeners (`onClick` listens to `click`)
//! - everything else is a plain attribute
//!
//! Children are kept in their own field and are never diffed as attributes.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::Element;

/// Attribute name carrying a text node's content.
pub const NODE_VALUE: &str = "nodeValue";

const LISTENER_PREFIX: &str = "on";

// =============================================================================
// Event + Listener
// =============================================================================

/// Event delivered by the host to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Lowercase event name (`click`, `input`, ...).
    pub name: String,
    /// Optional host-supplied payload (e.g. the new value of an input).
    pub detail: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Event handler attached to a host node.
///
/// Two listeners are equal only if they share the same callback, so a
/// closure rebuilt on every render always counts as changed.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// PropValue
// =============================================================================

/// A single prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Listener(Listener),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Listener(_) => f.write_str("[listener]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Listener> for PropValue {
    fn from(value: Listener) -> Self {
        Self::Listener(value)
    }
}

// =============================================================================
// Naming convention
// =============================================================================

/// True for `on<Event>` prop names.
pub fn is_listener(name: &str) -> bool {
    name.len() > LISTENER_PREFIX.len() && name.starts_with(LISTENER_PREFIX)
}

/// True for plain attributes (anything that is not a listener).
pub fn is_attribute(name: &str) -> bool {
    !is_listener(name)
}

/// Event name for a listener prop: `onClick` -> `click`.
pub fn event_name(prop: &str) -> String {
    prop[LISTENER_PREFIX.len()..].to_lowercase()
}

// =============================================================================
// Props
// =============================================================================

/// Props of an element: attributes, listeners and ordered children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    values: BTreeMap<String, PropValue>,
    pub children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style listener setter. `event` is the prop name (`onClick`).
    pub fn on(mut self, event: impl Into<String>, callback: impl Fn(&Event) + 'static) -> Self {
        self.insert(event, Listener::new(callback));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All props, attributes and listeners, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.iter().filter(|(name, _)| is_attribute(name))
    }

    pub fn listeners(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.iter().filter(|(name, _)| is_listener(name))
    }

    pub fn with_children(children: Vec<Element>) -> Self {
        Self {
            values: BTreeMap::new(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_naming() {
        assert!(is_listener("onClick"));
        assert!(is_listener("oninput"));
        assert!(!is_listener("on"));
        assert!(!is_listener("id"));
        assert!(!is_listener("open"));
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onMouseDown"), "mousedown");
    }

    #[test]
    fn test_listener_identity() {
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_props_split() {
        let props = Props::new()
            .attr("id", "counter")
            .attr("tabIndex", 2)
            .on("onClick", |_| {});

        let attrs: Vec<_> = props.attributes().map(|(n, _)| n).collect();
        let listeners: Vec<_> = props.listeners().map(|(n, _)| n).collect();

        assert_eq!(attrs, vec!["id", "tabIndex"]);
        assert_eq!(listeners, vec!["onClick"]);
        assert_eq!(props.get("tabIndex"), Some(&PropValue::Int(2)));
    }
}
