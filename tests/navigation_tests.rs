//! Integration tests for subview navigation
//!
//! Drives the plugin through `MemoryStack` and checks what ends up in the
//! host's history: stack depth, step tags and the encoded chains.

mod common;

use common::*;
use omniflow::*;

// ============================================================================
// Initial state
// ============================================================================

#[test]
fn test_initial_activity_opens_with_defaults() {
    let (plugin, stack) = stack_on("Home");

    assert_eq!(stack.depth(), 1);
    assert_chain(&plugin, &stack, &["Inbox"]);

    let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
    assert_eq!(chain.get(0).unwrap().1.get_str("folder"), Some("all"));
    assert_eq!(top_steps(&stack), vec![EnteredBy::Activity]);
}

#[test]
fn test_initial_rewrite_without_defaults_is_noop() {
    let (_, stack) = stack_on("About");
    let top = stack.top().unwrap();
    assert!(top.params.is_empty());

    let events = vec![
        InitialEvent::pushed("Home", ActivityParams::new()),
        InitialEvent::pushed("About", ActivityParams::new().with("v", 1)),
    ];
    assert_eq!(plugin(DESKTOP).rewrite_initial_events(events.clone()).unwrap(), events);
}

#[test]
fn test_only_last_pushed_event_is_rewritten() {
    init_logging();
    let plugin = plugin(DESKTOP);
    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack
        .init(vec![
            InitialEvent::pushed("Home", ActivityParams::new()),
            InitialEvent::pushed("Account", ActivityParams::new()),
        ])
        .unwrap();

    assert_eq!(stack.depth(), 2);
    assert_chain(&plugin, &stack, &["Settings", "General"]);
    assert!(!stack.stack().activities[0].params.has_subview_state());
}

#[test]
fn test_restored_chain_is_kept() {
    init_logging();
    let plugin = plugin(DESKTOP);
    let mut restored = DescendantChain::new();
    restored.push("Compose", ActivityParams::new().with("to", "bob"));
    let params = restored.embedded_in(&ActivityParams::new(), plugin.codec());

    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack.init_with("Home", params).unwrap();
    assert_chain(&plugin, &stack, &["Compose"]);
}

// ============================================================================
// Push
// ============================================================================

#[test]
fn test_push_expands_default_chain() {
    let (plugin, mut stack) = stack_on("About");

    assert_eq!(stack.push("Account", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.depth(), 2);

    let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
    assert_eq!(chain.names(), ["Settings".to_string(), "General".to_string()]);
    assert_eq!(
        chain.params(),
        [ActivityParams::new().with("section", "main"), ActivityParams::new()]
    );
}

#[test]
fn test_push_explicit_chain_is_kept() {
    let (plugin, mut stack) = stack_on("About");
    let mut explicit = DescendantChain::new();
    explicit.push("Settings", ActivityParams::new());
    explicit.push("Privacy", ActivityParams::new());

    stack
        .push("Account", explicit.embedded_in(&ActivityParams::new(), plugin.codec()))
        .unwrap();
    assert_chain(&plugin, &stack, &["Settings", "Privacy"]);
}

#[test]
fn test_push_nested_child_becomes_step() {
    let (plugin, mut stack) = stack_on("Home");

    let dispatch = stack.push("Thread", ActivityParams::new().with("id", 42)).unwrap();
    assert_eq!(dispatch, Dispatch::Prevented);
    assert_eq!(stack.depth(), 1);
    assert_chain(&plugin, &stack, &["Inbox", "Thread"]);
    assert_eq!(
        top_steps(&stack),
        vec![
            EnteredBy::Activity,
            EnteredBy::Subview(StepKind::DepthExtend { depth: 1 }),
        ]
    );

    // The activity's own params are untouched; the step carries the chain.
    assert!(!stack.top().unwrap().params.contains("id"));
}

#[test]
fn test_innermost_match_wins() {
    let (plugin, mut stack) = stack_on("Home");
    stack.push("Thread", ActivityParams::new().with("id", 42)).unwrap();

    // Home and Thread both allow Compose: Thread is deeper.
    stack.push("Compose", ActivityParams::new().with("reply", true)).unwrap();
    assert_eq!(stack.depth(), 1);
    assert_chain(&plugin, &stack, &["Inbox", "Thread", "Compose", "Draft"]);

    let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
    assert_eq!(chain.get(2).unwrap().1.get_as::<bool>("reply"), Some(true));
    assert_eq!(chain.get(3).unwrap().1.get_as::<bool>("blank"), Some(true));
}

#[test]
fn test_target_reserved_keys_are_dropped() {
    let (plugin, mut stack) = stack_on("Home");
    let mut stale = DescendantChain::new();
    stale.push("Privacy", ActivityParams::new());
    let params = stale.embedded_in(&ActivityParams::new().with("id", 7), plugin.codec());

    stack.push("Thread", params).unwrap();
    stack
        .push(
            "Compose",
            ActivityParams::new()
                .with(CHILD_NAME_KEY, "junk")
                .with(CHILD_PARAMS_KEY, "junk"),
        )
        .unwrap();
    assert_eq!(stack.depth(), 1);
    assert_chain(&plugin, &stack, &["Inbox", "Thread", "Compose", "Draft"]);

    let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
    assert_eq!(chain.get(1), Some(("Thread", &ActivityParams::new().with("id", 7))));
    assert_eq!(chain.get(2), Some(("Compose", &ActivityParams::new())));
}

#[test]
fn test_unrelated_push_creates_stack_entry() {
    let (plugin, mut stack) = stack_on("Home");

    assert_eq!(stack.push("About", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.top().unwrap().name, "About");
    assert_chain(&plugin, &stack, &[]);
}

#[test]
fn test_sibling_switch_drops_deeper_levels() {
    let (plugin, mut stack) = stack_on("Home");
    stack.push("Thread", ActivityParams::new()).unwrap();

    stack.push("Settings", ActivityParams::new()).unwrap();
    assert_chain(&plugin, &stack, &["Settings", "General"]);
    assert_eq!(
        top_steps(&stack).last(),
        Some(&EnteredBy::Subview(StepKind::SiblingSwitch { depth: 0 }))
    );
}

// ============================================================================
// Pop
// ============================================================================

#[test]
fn test_sibling_switches_retire_in_one_pop() {
    let (plugin, mut stack) = stack_on("Home");

    stack.push("Settings", ActivityParams::new()).unwrap();
    stack.push("Compose", ActivityParams::new()).unwrap();
    stack.push("Inbox", ActivityParams::new().with("folder", "sent")).unwrap();
    assert_eq!(top_steps(&stack).len(), 4);

    assert_eq!(stack.pop().unwrap(), Dispatch::Prevented);
    assert_eq!(top_steps(&stack), vec![EnteredBy::Activity]);
    assert_chain(&plugin, &stack, &["Inbox"]);

    let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
    assert_eq!(chain.get(0).unwrap().1.get_str("folder"), Some("all"));
}

#[test]
fn test_switch_run_retires_with_its_opener() {
    let (plugin, mut stack) = stack_on("Home");

    stack.push("Thread", ActivityParams::new().with("id", 1)).unwrap();
    stack.push("Thread", ActivityParams::new().with("id", 2)).unwrap();
    stack.push("Thread", ActivityParams::new().with("id", 3)).unwrap();
    assert_chain(&plugin, &stack, &["Inbox", "Thread"]);

    stack.pop().unwrap();
    assert_chain(&plugin, &stack, &["Inbox"]);
    assert_eq!(top_steps(&stack), vec![EnteredBy::Activity]);
}

#[test]
fn test_depth_extensions_retire_one_level_per_pop() {
    init_logging();
    let plugin = plugin(DESKTOP);
    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack
        .init(vec![
            InitialEvent::pushed("About", ActivityParams::new()),
            InitialEvent::pushed("Home", ActivityParams::new()),
        ])
        .unwrap();

    stack.push("Thread", ActivityParams::new()).unwrap();
    stack.push("Compose", ActivityParams::new()).unwrap();
    assert_chain(&plugin, &stack, &["Inbox", "Thread", "Compose", "Draft"]);

    assert_eq!(stack.pop().unwrap(), Dispatch::Prevented);
    assert_chain(&plugin, &stack, &["Inbox", "Thread"]);

    assert_eq!(stack.pop().unwrap(), Dispatch::Prevented);
    assert_chain(&plugin, &stack, &["Inbox"]);

    // Nothing left to retire: the activity itself goes.
    assert_eq!(stack.pop().unwrap(), Dispatch::Committed);
    assert_eq!(stack.top().unwrap().name, "About");
}

#[test]
fn test_pop_after_application_step_is_left_to_host() {
    let (plugin, mut stack) = stack_on("Home");
    stack.push("Thread", ActivityParams::new()).unwrap();
    assert_eq!(stack.step_push(ActivityParams::new().with("scroll", 10)), Dispatch::Committed);

    // The application step ends the plugin's scan; the host refuses to pop
    // the only activity.
    assert_eq!(stack.pop().unwrap(), Dispatch::Ignored);
    assert_eq!(top_steps(&stack).len(), 3);

    assert_eq!(stack.step_pop(), Dispatch::Committed);
    stack.pop().unwrap();
    assert_chain(&plugin, &stack, &["Inbox"]);
}

// ============================================================================
// Replace
// ============================================================================

#[test]
fn test_replace_nested_child_rewrites_entry_step() {
    let (plugin, mut stack) = stack_on("Home");

    assert_eq!(stack.replace("Settings", ActivityParams::new()).unwrap(), Dispatch::Prevented);
    assert_eq!(stack.depth(), 1);
    assert_eq!(top_steps(&stack), vec![EnteredBy::Activity]);
    assert_chain(&plugin, &stack, &["Settings", "General"]);
}

#[test]
fn test_replace_keeps_opener_role() {
    let (plugin, mut stack) = stack_on("Home");
    stack.push("Thread", ActivityParams::new().with("id", 1)).unwrap();

    stack.replace("Thread", ActivityParams::new().with("id", 2)).unwrap();
    assert_eq!(
        top_steps(&stack),
        vec![
            EnteredBy::Activity,
            EnteredBy::Subview(StepKind::DepthExtend { depth: 1 }),
        ]
    );

    let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
    assert_eq!(chain.get(1).unwrap().1.get_as::<i64>("id"), Some(2));

    stack.pop().unwrap();
    assert_chain(&plugin, &stack, &["Inbox"]);
}

#[test]
fn test_unrelated_replace_swaps_activity() {
    let (plugin, mut stack) = stack_on("About");

    assert_eq!(stack.replace("Account", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.depth(), 1);
    assert_chain(&plugin, &stack, &["Settings", "General"]);
}

// ============================================================================
// Environments and errors
// ============================================================================

#[test]
fn test_unconfigured_environment_never_prevents() {
    init_logging();
    let plugin = plugin("tv");
    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack.init_with("Home", ActivityParams::new()).unwrap();
    assert!(!stack.top().unwrap().params.has_subview_state());

    for name in ["Inbox", "Thread", "Compose", "About"] {
        assert_eq!(stack.push(name, ActivityParams::new()).unwrap(), Dispatch::Committed);
    }
    assert_eq!(stack.replace("Settings", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.pop().unwrap(), Dispatch::Committed);

    // Hook by hook, against the same snapshot.
    let intent = NavigationIntent::new("Inbox", ActivityParams::new());
    let mut recorder = Recorder::on(stack.stack().clone());
    plugin.on_before_push(&intent, &mut recorder).unwrap();
    plugin.on_before_replace(&intent, &mut recorder).unwrap();
    plugin.on_before_pop(&mut recorder).unwrap();
    assert!(!recorder.prevented);
    assert!(recorder.overridden.is_none());
    assert!(recorder.steps.is_empty());
}

#[test]
fn test_environment_without_children() {
    init_logging();
    let plugin = plugin(MOBILE);
    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack.init_with("Home", ActivityParams::new()).unwrap();

    assert_eq!(stack.push("Inbox", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.depth(), 2);
}

/// Home hosts subviews on desktop only; Inbox allows Thread everywhere.
fn desktop_only_home() -> Omniflow {
    let config = OmniflowConfig::new()
        .activity(ActivityDefinition::new("Home").subview(
            DESKTOP,
            SubviewConfig::new()
                .child("Inbox")
                .initial("Inbox", ActivityParams::new()),
        ))
        .activity(
            ActivityDefinition::new("Inbox")
                .subview(DESKTOP, SubviewConfig::new().child("Thread"))
                .subview(MOBILE, SubviewConfig::new().child("Thread")),
        )
        .activity(ActivityDefinition::new("Thread"));
    Omniflow::new(&config, MOBILE).unwrap()
}

#[test]
fn test_restored_chain_ignored_where_activity_hosts_nothing() {
    init_logging();
    let plugin = desktop_only_home();
    assert!(!plugin.resolver().hosts_subviews("Home"));
    assert!(plugin.resolver().hosts_subviews("Inbox"));

    let mut restored = DescendantChain::new();
    restored.push("Inbox", ActivityParams::new());
    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack
        .init_with("Home", restored.embedded_in(&ActivityParams::new(), plugin.codec()))
        .unwrap();

    assert_eq!(stack.push("Thread", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.top().unwrap().name, "Thread");
    assert_eq!(top_steps(&stack), vec![EnteredBy::Activity]);
}

#[test]
fn test_junk_reserved_keys_on_non_host_pass_through() {
    init_logging();
    let plugin = desktop_only_home();
    let mut stack = MemoryStack::new().with_plugin(plugin);
    stack
        .init_with("Thread", ActivityParams::new().with(CHILD_NAME_KEY, "x"))
        .unwrap();

    assert_eq!(stack.push("Inbox", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.replace("Home", ActivityParams::new()).unwrap(), Dispatch::Committed);
    assert_eq!(stack.depth(), 2);
}

#[test]
fn test_corrupt_chain_surfaces_decode_error() {
    init_logging();
    let plugin = plugin(DESKTOP);
    let mut stack = MemoryStack::new().with_plugin(plugin);
    stack
        .init_with(
            "Home",
            ActivityParams::new()
                .with(CHILD_NAME_KEY, "Inbox")
                .with(CHILD_PARAMS_KEY, "{}"),
        )
        .unwrap();

    let err = stack.push("Thread", ActivityParams::new()).unwrap_err();
    assert!(err.is_decode(), "Expected a decode error, got {err}");
    assert_eq!(top_steps(&stack), vec![EnteredBy::Activity]);
}

#[test]
fn test_cyclic_defaults_rejected_at_construction() {
    let config = OmniflowConfig::new()
        .activity(ActivityDefinition::new("A").subview(
            DESKTOP,
            SubviewConfig::new().child("B").initial("B", ActivityParams::new()),
        ))
        .activity(ActivityDefinition::new("B").subview(
            DESKTOP,
            SubviewConfig::new().child("A").initial("A", ActivityParams::new()),
        ));

    match Omniflow::new(&config, DESKTOP) {
        Err(ConfigError::CyclicDefaults { environment, cycle }) => {
            assert_eq!(environment, DESKTOP);
            assert_eq!(cycle, vec!["A", "B", "A"]);
        }
        other => panic!("Expected CyclicDefaults, got {other:?}"),
    }

    // The whole table is validated, whichever environment is requested.
    assert!(Omniflow::new(&config, "mobile").is_err());
}
