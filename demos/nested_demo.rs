//! Nested Subview Demo
//!
//! Walks a small mail app through nested navigation and prints, after every
//! action, the host stack and the rendered subview tree.
//!
//! Run with `RUST_LOG=omniflow=debug cargo run --example nested_demo` to see
//! each hook decision.

use omniflow::{
    ActivityDefinition, ActivityParams, ComponentRegistry, Composer, MemoryStack, Omniflow,
    OmniflowConfig, RenderContext, SubviewConfig,
};

const ENV: &str = "desktop";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = OmniflowConfig::new()
        .activity(ActivityDefinition::new("Mail").subview(
            ENV,
            SubviewConfig::new()
                .children(["Folder", "Compose"])
                .initial("Folder", ActivityParams::new().with("id", "inbox")),
        ))
        .activity(ActivityDefinition::new("Folder").subview(ENV, SubviewConfig::new().child("Thread")))
        .activity(ActivityDefinition::new("Thread").subview(ENV, SubviewConfig::new().child("Compose")))
        .activity(ActivityDefinition::new("Compose"))
        .activity(ActivityDefinition::new("About"));

    let plugin = Omniflow::new(&config, ENV)?;
    let composer = plugin.composer(registry());
    let mut stack = MemoryStack::new().with_plugin(plugin);

    stack.init_with("Mail", ActivityParams::new())?;
    show("start", &stack, &composer)?;

    stack.push("Thread", ActivityParams::new().with("id", 42))?;
    show("open thread 42 (depth extend)", &stack, &composer)?;

    stack.push("Thread", ActivityParams::new().with("id", 43))?;
    stack.push("Thread", ActivityParams::new().with("id", 44))?;
    show("switch to threads 43, 44 (sibling switches)", &stack, &composer)?;

    stack.push("Compose", ActivityParams::new().with("reply_to", 44))?;
    show("reply (innermost match: Thread allows Compose)", &stack, &composer)?;

    stack.push("About", ActivityParams::new())?;
    show("about (no match: new stack entry)", &stack, &composer)?;

    for label in ["back", "back", "back"] {
        stack.pop()?;
        show(label, &stack, &composer)?;
    }

    Ok(())
}

/// Each level renders as an indented line, followed by its child.
fn registry() -> ComponentRegistry<String> {
    let view = |cx: &RenderContext<'_, String>| {
        let indent = "  ".repeat(cx.depth() + 1);
        let params: Vec<String> = cx.params().iter().map(|(k, v)| format!("{k}={v}")).collect();
        let mut out = format!("{indent}{} {{{}}}", cx.name(), params.join(", "));
        if let Some(child) = cx.child().and_then(|c| c.render()) {
            out.push('\n');
            out.push_str(&child);
        }
        out
    };
    ["Mail", "Folder", "Thread", "Compose", "About"]
        .into_iter()
        .fold(ComponentRegistry::new(), |registry, name| registry.register(name, view))
}

fn show(
    label: &str,
    stack: &MemoryStack,
    composer: &Composer<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("== {label}");
    let names: Vec<&str> = stack
        .stack()
        .activities
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    println!("  stack: [{}]", names.join(", "));

    if let Some(top) = stack.top() {
        println!("  steps on '{}': {}", top.name, top.steps.len());
        if let Some(view) = composer.render(top)? {
            println!("{view}");
        }
    }
    println!();
    Ok(())
}
