//! In-memory stack engine.
//!
//! [`MemoryStack`] is a small host for [`StackPlugin`]s: a stack of
//! activities, each with its own step history, and the four hook points.
//! It exists so the plugin can be driven end to end in tests and demos;
//! production hosts provide their own engine.
//!
//! # Dispatch
//!
//! For every intent, plugins run in registration order. Each hook gets a
//! fresh action queue; once it returns, the host:
//!
//! 1. replaces the intent's params if the hook overrode them,
//! 2. applies queued step actions in call order,
//! 3. stops dispatching (and drops the intent) if the hook prevented it.
//!
//! If no plugin prevents the intent, the activity-level action runs.

use crate::error::Result;
use crate::lifecycle::{
    Activity, EnteredBy, InitialEvent, InitialEventKind, NavigationIntent, Stack, StackActions,
    Step, StepAction, StepRequest,
};
use crate::plugin::StackPlugin;
use crate::{debug_log, info_log, trace_log, ActivityParams};
use std::sync::Arc;

/// What happened to a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The activity-level action ran.
    Committed,
    /// A plugin cancelled the action (it may have issued steps instead).
    Prevented,
    /// Nothing to act on, e.g. popping the last activity.
    Ignored,
}

impl Dispatch {
    /// Check if a plugin cancelled the request.
    pub fn is_prevented(self) -> bool {
        matches!(self, Self::Prevented)
    }
}

/// Hook being dispatched, with the intent it may rewrite.
enum Hook<'a> {
    Push(&'a mut NavigationIntent),
    Replace(&'a mut NavigationIntent),
    Pop,
}

/// Actions a single hook call queued.
#[derive(Default)]
struct Pending {
    prevented: bool,
    params: Option<ActivityParams>,
    steps: Vec<StepAction>,
}

/// [`StackActions`] handed to a hook: reads the live stack, queues writes.
struct HookActions<'a> {
    stack: &'a Stack,
    pending: Pending,
}

impl StackActions for HookActions<'_> {
    fn stack(&self) -> &Stack {
        self.stack
    }

    fn prevent_default(&mut self) {
        self.pending.prevented = true;
    }

    fn override_action_params(&mut self, params: ActivityParams) {
        self.pending.params = Some(params);
    }

    fn step_push(&mut self, step: StepRequest) {
        self.pending.steps.push(StepAction::Push(step));
    }

    fn step_replace(&mut self, step: StepRequest) {
        self.pending.steps.push(StepAction::Replace(step));
    }

    fn step_pop(&mut self) {
        self.pending.steps.push(StepAction::Pop);
    }
}

/// In-memory activity stack with plugin hooks.
#[derive(Default)]
pub struct MemoryStack {
    stack: Stack,
    plugins: Vec<Arc<dyn StackPlugin>>,
}

impl MemoryStack {
    /// Create an empty stack with no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin (builder pattern).
    pub fn with_plugin(mut self, plugin: impl StackPlugin) -> Self {
        self.add_plugin(plugin);
        self
    }

    /// Register a plugin. Plugins run in registration order.
    pub fn add_plugin(&mut self, plugin: impl StackPlugin) {
        debug_log!("Registering stack plugin '{}'", plugin.key());
        self.plugins.push(Arc::new(plugin));
    }

    /// Build the initial stack by replaying `events`, after every plugin
    /// had the chance to rewrite them.
    ///
    /// Replaces any existing state. Replayed events do not go through the
    /// push hooks.
    pub fn init(&mut self, events: Vec<InitialEvent>) -> Result<()> {
        let mut events = events;
        for plugin in &self.plugins {
            events = plugin.override_initial_events(events)?;
        }

        self.stack = Stack::default();
        for event in events {
            match event.kind {
                InitialEventKind::Pushed => {
                    self.commit_push(NavigationIntent::new(event.activity_name, event.activity_params));
                }
                InitialEventKind::StepPushed => {
                    self.push_app_step(event.activity_params);
                }
            }
        }

        info_log!("Initial stack built with {} activities", self.stack.depth());
        Ok(())
    }

    /// Start from a single activity.
    pub fn init_with(&mut self, activity_name: &str, params: ActivityParams) -> Result<()> {
        self.init(vec![InitialEvent::pushed(activity_name, params)])
    }

    /// Current stack snapshot.
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The top activity.
    pub fn top(&self) -> Option<&Activity> {
        self.stack.top()
    }

    /// Number of activities on the stack.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    // ------------------------------------------------------------------------
    // Activity-level navigation
    // ------------------------------------------------------------------------

    /// Push a new activity.
    pub fn push(&mut self, activity_name: &str, params: ActivityParams) -> Result<Dispatch> {
        let mut intent = NavigationIntent::new(activity_name, params);
        if self.run_hooks(Hook::Push(&mut intent))? {
            return Ok(Dispatch::Prevented);
        }
        self.commit_push(intent);
        Ok(Dispatch::Committed)
    }

    /// Replace the top activity.
    pub fn replace(&mut self, activity_name: &str, params: ActivityParams) -> Result<Dispatch> {
        let mut intent = NavigationIntent::new(activity_name, params);
        if self.run_hooks(Hook::Replace(&mut intent))? {
            return Ok(Dispatch::Prevented);
        }
        if self.stack.activities.pop().is_none() {
            trace_log!("Replace on an empty stack acts as push");
        }
        self.commit_push(intent);
        Ok(Dispatch::Committed)
    }

    /// Pop the top activity. The last remaining activity is never popped.
    pub fn pop(&mut self) -> Result<Dispatch> {
        if self.run_hooks(Hook::Pop)? {
            return Ok(Dispatch::Prevented);
        }
        if self.stack.depth() <= 1 {
            trace_log!("Pop ignored: nothing below the top activity");
            return Ok(Dispatch::Ignored);
        }
        if let Some(popped) = self.stack.activities.pop() {
            info_log!("Popped activity '{}' ({})", popped.name, popped.id);
        }
        self.mark_top();
        Ok(Dispatch::Committed)
    }

    // ------------------------------------------------------------------------
    // Application steps
    // ------------------------------------------------------------------------

    /// Push a step on the top activity on behalf of the application.
    pub fn step_push(&mut self, params: ActivityParams) -> Dispatch {
        if self.push_app_step(params) {
            Dispatch::Committed
        } else {
            Dispatch::Ignored
        }
    }

    /// Pop the top activity's latest step. The entry step is never removed.
    pub fn step_pop(&mut self) -> Dispatch {
        let Some(top) = self.top_mut() else {
            return Dispatch::Ignored;
        };
        if top.steps.len() <= 1 {
            return Dispatch::Ignored;
        }
        top.steps.pop();
        Dispatch::Committed
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Run `hook` on every plugin. Returns `true` if one prevented the intent.
    fn run_hooks(&mut self, mut hook: Hook<'_>) -> Result<bool> {
        let plugins = self.plugins.clone();
        for plugin in plugins {
            let mut actions = HookActions {
                stack: &self.stack,
                pending: Pending::default(),
            };
            match &mut hook {
                Hook::Push(intent) => plugin.on_before_push(&**intent, &mut actions)?,
                Hook::Replace(intent) => plugin.on_before_replace(&**intent, &mut actions)?,
                Hook::Pop => plugin.on_before_pop(&mut actions)?,
            }
            let pending = actions.pending;

            if let Some(params) = pending.params {
                match &mut hook {
                    Hook::Push(intent) | Hook::Replace(intent) => intent.activity_params = params,
                    Hook::Pop => {
                        trace_log!("'{}' overrode params of a pop, ignored", plugin.key());
                    }
                }
            }
            for step in pending.steps {
                self.apply_step(step);
            }
            if pending.prevented {
                debug_log!("'{}' prevented the intent", plugin.key());
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn apply_step(&mut self, action: StepAction) {
        let Some(top) = self.top_mut() else {
            trace_log!("Step action on an empty stack dropped");
            return;
        };
        match action {
            StepAction::Push(request) => top.steps.push(Step {
                id: request.id,
                params: request.params,
                entered_by: EnteredBy::Subview(request.kind),
            }),
            StepAction::Replace(request) => match top.steps.last_mut() {
                // The entry step keeps its role; only its state changes.
                Some(last) if last.entered_by == EnteredBy::Activity => {
                    last.id = request.id;
                    last.params = request.params;
                }
                Some(last) => {
                    *last = Step {
                        id: request.id,
                        params: request.params,
                        entered_by: EnteredBy::Subview(request.kind),
                    };
                }
                None => top.steps.push(Step {
                    id: request.id,
                    params: request.params,
                    entered_by: EnteredBy::Subview(request.kind),
                }),
            },
            StepAction::Pop => {
                if top.steps.len() > 1 {
                    top.steps.pop();
                }
            }
        }
    }

    fn commit_push(&mut self, intent: NavigationIntent) {
        let id = uuid::Uuid::new_v4().to_string();
        info_log!("Pushed activity '{}' ({})", intent.activity_name, id);

        let entry = Step {
            id: uuid::Uuid::new_v4().to_string(),
            params: intent.activity_params.clone(),
            entered_by: EnteredBy::Activity,
        };
        self.stack.activities.push(Activity {
            id,
            name: intent.activity_name,
            params: intent.activity_params,
            is_top: false,
            steps: vec![entry],
        });
        self.mark_top();
    }

    fn push_app_step(&mut self, params: ActivityParams) -> bool {
        let Some(top) = self.top_mut() else {
            return false;
        };
        top.steps.push(Step {
            id: uuid::Uuid::new_v4().to_string(),
            params,
            entered_by: EnteredBy::Application,
        });
        true
    }

    fn top_mut(&mut self) -> Option<&mut Activity> {
        self.stack.activities.iter_mut().find(|a| a.is_top)
    }

    fn mark_top(&mut self) {
        let last = self.stack.activities.len().saturating_sub(1);
        for (i, activity) in self.stack.activities.iter_mut().enumerate() {
            activity.is_top = i == last;
        }
    }
}

impl std::fmt::Debug for MemoryStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStack")
            .field("stack", &self.stack)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.key()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
