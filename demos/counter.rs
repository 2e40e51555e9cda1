//! Counter demo - a button that counts its clicks, rendered headlessly.
//!
//! Run with `RUST_LOG=recast=debug cargo run --example counter`.

use std::time::Duration;

use recast::{Component, Event, FrameBudget, MemoryHost, Props, create_element, use_state};
use tracing_subscriber::EnvFilter;

fn main() -> recast::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let counter = Component::new("Counter", |_| {
        let (count, set_count) = use_state(1)?;
        Ok(create_element(
            "button",
            Props::new().on("onClick", move |_| set_count.set(|c| c + 1)),
            vec![create_element("h1", Props::new(), vec!["Count: ".into(), count.into()])],
        ))
    });

    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut root = recast::render(host, create_element(&counter, Props::new(), vec![]), container);

    // Pretend to be an idle callback handing out 4ms slices.
    let mut slices = 0;
    root.run_slices(|| {
        slices += 1;
        (slices <= 8).then(|| FrameBudget::new(Duration::from_millis(4)))
    })?;
    println!("{}", root.host().serialize(container));

    for _ in 0..3 {
        if let Some(button) = root.host().find_by_tag(container, "button") {
            root.host().dispatch(button, &Event::new("click"));
        }
        root.run_until_idle()?;
        println!("{}", root.host().serialize(container));
    }

    Ok(())
}
