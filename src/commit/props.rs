//! Host prop diffing.
//!
//! Four passes, in this order:
//! 1. remove listeners that disappeared or changed
//! 2. clear attributes that disappeared
//! 3. set attributes that are new or changed
//! 4. add listeners that are new or changed

use crate::element::{PropValue, Props, event_name};
use crate::error::{HostOp, RecastError, Result};
use crate::host::HostAdapter;

/// Apply the difference between `prev` and `next` to `node`.
///
/// Returns the number of host calls made.
pub fn update_host_props<H: HostAdapter>(host: &mut H, node: &H::Node, prev: &Props, next: &Props) -> Result<usize> {
    let mut calls = 0;
    diff_props(host, node, prev, next, &mut calls)?;
    Ok(calls)
}

/// Like [`update_host_props`], but counts into `calls` as each host call
/// lands, so a failure part way through still reports what was applied.
pub(crate) fn diff_props<H: HostAdapter>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
    calls: &mut usize,
) -> Result<()> {
    let changed = |other: &Props, name: &str, value: &PropValue| other.get(name) != Some(value);

    for (name, value) in prev.listeners() {
        if !changed(next, name, value) {
            continue;
        }
        if let Some(listener) = value.as_listener() {
            host.remove_listener(node, &event_name(name), listener)
                .map_err(RecastError::host(HostOp::RemoveListener))?;
            *calls += 1;
        }
    }

    for (name, _) in prev.attributes() {
        if !next.contains(name) {
            host.clear_attribute(node, name)
                .map_err(RecastError::host(HostOp::ClearAttribute))?;
            *calls += 1;
        }
    }

    for (name, value) in next.attributes() {
        if changed(prev, name, value) {
            host.set_attribute(node, name, value)
                .map_err(RecastError::host(HostOp::SetAttribute))?;
            *calls += 1;
        }
    }

    for (name, value) in next.listeners() {
        if !changed(prev, name, value) {
            continue;
        }
        match value.as_listener() {
            Some(listener) => {
                host.add_listener(node, &event_name(name), listener)
                    .map_err(RecastError::host(HostOp::AddListener))?;
                *calls += 1;
            }
            None => tracing::warn!(prop = name, "listener prop without a callback ignored"),
        }
    }

    Ok(())
}

/// Apply every prop of a freshly created node.
pub fn apply_initial_props<H: HostAdapter>(host: &mut H, node: &H::Node, props: &Props) -> Result<usize> {
    update_host_props(host, node, &Props::new(), props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Listener;
    use crate::host::{MemoryHost, Mutation};

    #[test]
    fn test_initial_props() {
        let mut host = MemoryHost::new();
        let node = host.create_node("input").unwrap();
        host.take_mutations();

        let props = Props::new().attr("value", "a").on("onInput", |_| {});
        assert_eq!(apply_initial_props(&mut host, &node, &props).unwrap(), 2);
        assert_eq!(host.attribute(node, "value"), Some(&PropValue::from("a")));
    }

    #[test]
    fn test_pass_order() {
        let mut host = MemoryHost::new();
        let node = host.create_node("button").unwrap();
        let prev = Props::new()
            .attr("id", "old")
            .attr("title", "gone")
            .on("onClick", |_| {});
        apply_initial_props(&mut host, &node, &prev).unwrap();
        host.take_mutations();

        let next = Props::new().attr("id", "new").on("onClick", |_| {});
        assert_eq!(update_host_props(&mut host, &node, &prev, &next).unwrap(), 4);

        assert_eq!(
            host.take_mutations(),
            vec![
                Mutation::RemoveListener { node, event: "click".into() },
                Mutation::ClearAttribute { node, name: "title".into() },
                Mutation::SetAttribute { node, name: "id".into() },
                Mutation::AddListener { node, event: "click".into() },
            ]
        );
    }

    #[test]
    fn test_identical_props_make_no_calls() {
        let mut host = MemoryHost::new();
        let node = host.create_node("a").unwrap();
        let listener = Listener::new(|_| {});
        let props = Props::new().attr("href", "/").attr("onHover", listener);

        apply_initial_props(&mut host, &node, &props).unwrap();
        host.take_mutations();

        assert_eq!(update_host_props(&mut host, &node, &props, &props.clone()).unwrap(), 0);
        assert!(host.mutations().is_empty());
    }
}
