//! Test utilities for subview navigation tests
//!
//! Provides the shared configuration table, stack fixtures and assertion
//! helpers used by the integration tests.

#![allow(dead_code)]

use omniflow::*;

pub const DESKTOP: &str = "desktop";
pub const MOBILE: &str = "mobile";

/// Route env_logger output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .parse_filters("omniflow=trace")
        .try_init();
}

/// The mail app table used across the integration tests.
///
/// ```text
/// desktop:
///   Home     children [Inbox, Settings, Compose]  initial Inbox {folder: all}
///   Inbox    children [Thread]
///   Thread   children [Compose]
///   Compose  children [Draft]                     initial Draft {blank: true}
///   Account  children [Settings]                  initial Settings {section: main}
///   Settings children [General, Privacy]          initial General {}
///   Draft, General, Privacy, About: leaves
/// mobile:
///   Home     children []
/// ```
pub fn mail_config() -> OmniflowConfig {
    OmniflowConfig::new()
        .activity(
            ActivityDefinition::new("Home")
                .subview(
                    DESKTOP,
                    SubviewConfig::new()
                        .children(["Inbox", "Settings", "Compose"])
                        .initial("Inbox", ActivityParams::new().with("folder", "all")),
                )
                .subview(MOBILE, SubviewConfig::new()),
        )
        .activity(ActivityDefinition::new("Inbox").subview(DESKTOP, SubviewConfig::new().child("Thread")))
        .activity(ActivityDefinition::new("Thread").subview(DESKTOP, SubviewConfig::new().child("Compose")))
        .activity(ActivityDefinition::new("Compose").subview(
            DESKTOP,
            SubviewConfig::new()
                .child("Draft")
                .initial("Draft", ActivityParams::new().with("blank", true)),
        ))
        .activity(ActivityDefinition::new("Account").subview(
            DESKTOP,
            SubviewConfig::new()
                .child("Settings")
                .initial("Settings", ActivityParams::new().with("section", "main")),
        ))
        .activity(ActivityDefinition::new("Settings").subview(
            DESKTOP,
            SubviewConfig::new()
                .children(["General", "Privacy"])
                .initial("General", ActivityParams::new()),
        ))
        .activity(ActivityDefinition::new("Draft"))
        .activity(ActivityDefinition::new("General"))
        .activity(ActivityDefinition::new("Privacy"))
        .activity(ActivityDefinition::new("About"))
}

/// Plugin for `environment` over [`mail_config`].
pub fn plugin(environment: &str) -> Omniflow {
    Omniflow::new(&mail_config(), environment).expect("mail config is valid")
}

/// A desktop stack started on `activity`, and the plugin driving it.
pub fn stack_on(activity: &str) -> (Omniflow, MemoryStack) {
    init_logging();
    let plugin = plugin(DESKTOP);
    let mut stack = MemoryStack::new().with_plugin(plugin.clone());
    stack
        .init_with(activity, ActivityParams::new())
        .expect("initial stack builds");
    (plugin, stack)
}

/// Names of the chain active under the top activity.
pub fn top_chain(plugin: &Omniflow, stack: &MemoryStack) -> Vec<String> {
    let top = stack.top().expect("stack has a top activity");
    plugin
        .chain_of(top)
        .expect("top chain decodes")
        .names()
        .to_vec()
}

/// Assert the chain under the top activity, outermost first.
pub fn assert_chain(plugin: &Omniflow, stack: &MemoryStack, expected: &[&str]) {
    assert_eq!(
        top_chain(plugin, stack),
        expected.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        "Unexpected chain under '{}'",
        stack.top().map(|a| a.name.as_str()).unwrap_or("<empty>")
    );
}

/// Step tags of the top activity, oldest first.
pub fn top_steps(stack: &MemoryStack) -> Vec<EnteredBy> {
    stack
        .top()
        .map(|a| a.steps.iter().map(|s| s.entered_by).collect())
        .unwrap_or_default()
}

/// [`StackActions`] that records every call against a fixed snapshot.
#[derive(Debug, Default)]
pub struct Recorder {
    pub stack: Stack,
    pub prevented: bool,
    pub overridden: Option<ActivityParams>,
    pub steps: Vec<StepAction>,
}

impl Recorder {
    pub fn on(stack: Stack) -> Self {
        Self {
            stack,
            ..Self::default()
        }
    }
}

impl StackActions for Recorder {
    fn stack(&self) -> &Stack {
        &self.stack
    }

    fn prevent_default(&mut self) {
        self.prevented = true;
    }

    fn override_action_params(&mut self, params: ActivityParams) {
        self.overridden = Some(params);
    }

    fn step_push(&mut self, step: StepRequest) {
        self.steps.push(StepAction::Push(step));
    }

    fn step_replace(&mut self, step: StepRequest) {
        self.steps.push(StepAction::Replace(step));
    }

    fn step_pop(&mut self) {
        self.steps.push(StepAction::Pop);
    }
}
