//! End-to-end rendering against the in-memory host.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use recast::host::{HostNodeId, Mutation};
use recast::{
    Component, Element, Event, HookMismatch, Listener, MemoryHost, Props, RecastError, Root, UnitBudget,
    create_element, use_state,
};

fn mount(element: Element) -> (Root<MemoryHost>, HostNodeId) {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut root = recast::render(host, element, container);
    root.run_until_idle().unwrap();
    (root, container)
}

fn counter_markup(count: i64) -> Element {
    create_element(
        "button",
        Props::new(),
        vec![create_element("h1", Props::new(), vec!["Count:".into(), count.into()])],
    )
}

fn removals(mutations: &[Mutation]) -> Vec<HostNodeId> {
    mutations
        .iter()
        .filter_map(|m| match m {
            Mutation::RemoveChild { child, .. } => Some(*child),
            _ => None,
        })
        .collect()
}

#[test]
fn test_same_type_keeps_host_nodes() {
    let (mut root, container) = mount(counter_markup(1));
    let button = root.host().find_by_tag(container, "button").unwrap();
    let h1 = root.host().find_by_tag(container, "h1").unwrap();
    root.host_mut().take_mutations();

    root.render(counter_markup(2), container);
    root.run_until_idle().unwrap();

    assert_eq!(root.host().find_by_tag(container, "button"), Some(button));
    assert_eq!(root.host().find_by_tag(container, "h1"), Some(h1));
    let mutations = root.host_mut().take_mutations();
    assert_eq!(mutations.len(), 1);
    assert!(matches!(&mutations[0], Mutation::SetAttribute { name, .. } if name == "nodeValue"));
    assert_eq!(root.host().serialize(container), "<button><h1>Count:2</h1></button>");
}

#[test]
fn test_type_change_replaces_subtree() {
    let (mut root, container) = mount(counter_markup(1));
    let button = root.host().find_by_tag(container, "button").unwrap();
    root.host_mut().take_mutations();

    let replacement = create_element("h1", Props::new(), vec!["Count:".into(), 1.into()]);
    root.render(replacement, container);
    let report = root.run_until_idle();
    assert_eq!(report.unwrap(), 1);

    let mutations = root.host_mut().take_mutations();
    let last_removal = mutations
        .iter()
        .rposition(|m| matches!(m, Mutation::RemoveChild { .. }))
        .unwrap();
    let placement = mutations
        .iter()
        .position(|m| matches!(m, Mutation::AppendChild { parent, .. } if *parent == container))
        .unwrap();

    assert!(last_removal < placement);
    assert!(removals(&mutations).contains(&button));
    assert_eq!(root.host().children(container).len(), 1);
    assert_ne!(root.host().children(container)[0], button);
    assert_eq!(root.host().serialize(container), "<h1>Count:1</h1>");
}

#[test]
fn test_deletion_through_component_boundary_is_exactly_once() {
    let panel = Component::new("Panel", |_| {
        Ok(create_element(
            "section",
            Props::new(),
            vec![create_element("p", Props::new(), vec!["a".into()]), "b".into()],
        ))
    });
    let tree = create_element(
        "main",
        Props::new(),
        vec![create_element(&panel, Props::new(), vec![]), create_element("footer", Props::new(), vec![])],
    );
    let (mut root, container) = mount(tree);
    let main = root.host().find_by_tag(container, "main").unwrap();
    let section = root.host().find_by_tag(container, "section").unwrap();
    let p = root.host().find_by_tag(container, "p").unwrap();
    let subtree = [
        section,
        p,
        root.host().children(p)[0],
        root.host().children(section)[1],
    ];
    root.host_mut().take_mutations();

    let without_panel = create_element("main", Props::new(), vec![create_element("footer", Props::new(), vec![])]);
    root.render(without_panel, container);
    root.run_until_idle().unwrap();

    let mut removed = removals(root.host().mutations());
    let footer_old = removed.iter().filter(|id| !subtree.contains(id)).count();
    removed.retain(|id| subtree.contains(id));
    removed.sort();
    let mut expected = subtree.to_vec();
    expected.sort();

    assert_eq!(removed, expected);
    // the old footer is at index 1 and gets replaced by the one at index 0
    assert_eq!(footer_old, 1);
    assert_eq!(root.host().serialize(container), "<main><footer></footer></main>");
    assert_eq!(root.host().children(main).len(), 1);
}

#[test]
fn test_update_folding_order() {
    let setter = Rc::new(Cell::new(None));
    let slot = setter.clone();
    let seen = Rc::new(Cell::new(0));
    let out = seen.clone();

    let counter = Component::new("Counter", move |_| {
        let (count, set_count) = use_state(1_i64)?;
        slot.set(Some(set_count));
        out.set(count);
        Ok(create_element("span", Props::new(), vec![count.into()]))
    });
    let (mut root, container) = mount(create_element(&counter, Props::new(), vec![]));
    assert_eq!(seen.get(), 1);

    let set_count = setter.take().unwrap();
    set_count.set(|c| c + 1);
    set_count.set(|c| c * 2);
    root.run_until_idle().unwrap();

    assert_eq!(seen.get(), 4);
    assert_eq!(root.host().serialize(container), "<span>4</span>");
}

#[test]
fn test_identical_tree_recommits_without_prop_calls() {
    let listener = Listener::new(|_| {});
    let tree = create_element(
        "form",
        Props::new().attr("id", "login").attr("onSubmit", listener),
        vec![
            create_element("input", Props::new().attr("value", "me").attr("disabled", false), vec![]),
            "hello".into(),
        ],
    );
    let (mut root, container) = mount(tree.clone());
    root.host_mut().take_mutations();

    root.render(tree.clone(), container);
    let first = root.run_until_idle();
    root.render(tree, container);
    let second = root.run_until_idle();

    assert!(first.is_ok() && second.is_ok());
    assert!(root.host().mutations().iter().all(|m| !m.is_prop_change()));
    assert!(root.host().mutations().is_empty());
}

#[test]
fn test_yield_resumes_from_saved_cursor() {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut root = recast::render(host, counter_markup(7), container);

    let mut total = 0;
    let mut slices = 0;
    loop {
        let report = root.work_loop(UnitBudget::new(1)).unwrap();
        total += report.units;
        slices += 1;
        if report.commit.is_some() {
            break;
        }
        assert_eq!(report.units, 1);
        assert_eq!(root.host().serialize(container), "");
    }

    // root, button, h1, two text nodes
    assert_eq!(total, 5);
    assert_eq!(slices, 5);
    assert_eq!(root.host().serialize(container), "<button><h1>Count:7</h1></button>");
}

#[test]
fn test_click_during_render_restarts_generation() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let counter = Component::new("Counter", move |_| {
        let (count, set_count) = use_state(0_i64)?;
        log.borrow_mut().push(count);
        Ok(create_element(
            "div",
            Props::new(),
            vec![
                create_element("button", Props::new().on("onClick", move |_| set_count.set(|c| c + 1)), vec![]),
                create_element("span", Props::new(), vec![count.into()]),
            ],
        ))
    });
    let (mut root, container) = mount(create_element(&counter, Props::new(), vec![]));
    let button = root.host().find_by_tag(container, "button").unwrap();
    let mounted = root.generation();

    assert_eq!(root.host().dispatch(button, &Event::new("click")), 1);
    let report = root.work_loop(UnitBudget::new(1)).unwrap();
    assert_eq!(report.units, 1);
    assert!(report.commit.is_none());
    assert_eq!(root.generation(), mounted + 1);
    let interrupted = root.work_in_progress();

    // the committed listener fires again while that generation is in flight
    assert_eq!(root.host().dispatch(button, &Event::new("click")), 1);
    let report = root.work_loop(UnitBudget::new(1)).unwrap();
    assert_eq!(report.units, 1);
    assert!(report.commit.is_none());
    assert_eq!(root.generation(), mounted + 2);
    assert_ne!(root.work_in_progress(), interrupted);

    assert_eq!(root.run_until_idle().unwrap(), 1);
    assert_eq!(*seen.borrow(), vec![0, 2]);
    assert_eq!(root.host().serialize(container), "<div><button></button><span>2</span></div>");
    assert_eq!(root.host().find_by_tag(container, "button"), Some(button));
}

#[test]
fn test_middle_type_change_keeps_sibling_order() {
    let row = |tags: &[&str]| {
        let children = tags.iter().map(|t| create_element(*t, Props::new(), vec![])).collect();
        create_element("div", Props::new(), children)
    };
    let (mut root, container) = mount(row(&["a", "b", "c"]));

    root.render(row(&["a", "x", "c"]), container);
    root.run_until_idle().unwrap();

    assert_eq!(root.host().serialize(container), "<div><a></a><x></x><c></c></div>");
    assert!(
        root.host()
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::InsertBefore { .. }))
    );
}

#[test]
fn test_conditional_hook_is_reported() {
    let toggle = Rc::new(Cell::new(false));
    let flag = toggle.clone();
    let component = Component::new("Flaky", move |_| {
        let (a, _) = use_state(0)?;
        if flag.get() {
            use_state(1)?;
        }
        Ok(create_element("i", Props::new(), vec![a.into()]))
    });
    let tree = create_element(&component, Props::new(), vec![]);
    let (mut root, container) = mount(tree.clone());
    let committed = root.current_root();

    toggle.set(true);
    root.render(tree, container);
    let err = root.run_until_idle().unwrap_err();

    match err {
        RecastError::InconsistentHookSequence { component, mismatch } => {
            assert_eq!(component, "Flaky");
            assert_eq!(mismatch, HookMismatch::Unexpected { index: 1 });
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(root.current_root(), committed);
    assert_eq!(root.host().serialize(container), "<i>0</i>");
}

#[test]
fn test_use_state_outside_render() {
    assert!(matches!(use_state("x"), Err(RecastError::NoActiveRenderContext)));
}

#[test]
fn test_invalid_element_type_is_reported() {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut root = recast::render(host, create_element("", Props::new(), vec![]), container);

    let err = root.run_until_idle().unwrap_err();
    assert!(matches!(err, RecastError::InvalidElementType { .. }));
    assert!(root.current_root().is_none());
    assert!(root.tree().is_empty());
}

#[test]
fn test_independent_roots() {
    let clicks = Rc::new(Cell::new(0));
    let counter = {
        let clicks = clicks.clone();
        Component::new("Counter", move |_| {
            let (count, set_count) = use_state(0)?;
            let clicks = clicks.clone();
            Ok(create_element(
                "button",
                Props::new().on("onClick", move |_| {
                    clicks.set(clicks.get() + 1);
                    set_count.set(|c| c + 1);
                }),
                vec![count.into()],
            ))
        })
    };

    let (mut first, first_container) = mount(create_element(&counter, Props::new(), vec![]));
    let (mut second, second_container) = mount(create_element(&counter, Props::new(), vec![]));

    let button = first.host().find_by_tag(first_container, "button").unwrap();
    first.host().dispatch(button, &Event::new("click"));

    assert!(first.has_pending_work());
    assert!(!second.has_pending_work());
    first.run_until_idle().unwrap();
    second.run_until_idle().unwrap();

    assert_eq!(clicks.get(), 1);
    assert_eq!(first.host().serialize(first_container), "<button>1</button>");
    assert_eq!(second.host().serialize(second_container), "<button>0</button>");
}
