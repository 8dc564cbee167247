//! The subview synchronization plugin.
//!
//! [`Omniflow`] keeps the host stack's history consistent with the nested
//! subview hierarchy. It turns a push or replace of an activity that belongs
//! *inside* the current top activity into a step on that activity, and turns
//! a back action into the matching number of step pops.
//!
//! Each hook computes a [`HookOutcome`] from the read-only stack snapshot
//! (`plan_*` methods, pure) and then issues it against the host. The plugin
//! holds no mutable state; everything it needs to remember lives in the
//! activities' own parameters and step tags.
//!
//! # Example
//!
//! ```
//! use omniflow::{
//!     ActivityDefinition, ActivityParams, MemoryStack, Omniflow, OmniflowConfig, SubviewConfig,
//! };
//!
//! let config = OmniflowConfig::new()
//!     .activity(ActivityDefinition::new("Mail").subview(
//!         "desktop",
//!         SubviewConfig::new()
//!             .children(["Inbox", "Thread"])
//!             .initial("Inbox", ActivityParams::new()),
//!     ))
//!     .activity(ActivityDefinition::new("Inbox"))
//!     .activity(ActivityDefinition::new("Thread"));
//!
//! let plugin = Omniflow::new(&config, "desktop").unwrap();
//! let mut stack = MemoryStack::new().with_plugin(plugin.clone());
//! stack.init_with("Mail", ActivityParams::new()).unwrap();
//!
//! // Thread opens inside Mail instead of on top of it.
//! stack.push("Thread", ActivityParams::new().with("id", "42")).unwrap();
//! assert_eq!(stack.depth(), 1);
//!
//! let chain = plugin.chain_of(stack.top().unwrap()).unwrap();
//! assert_eq!(chain.names(), ["Thread".to_string()]);
//! ```

use crate::chain::DescendantChain;
use crate::codec::{EnvelopeCodec, ParamCodec};
use crate::collapse::steps_to_retire;
use crate::config::OmniflowConfig;
use crate::environment::SubviewResolver;
use crate::error::{ConfigError, DecodeError, Result};
use crate::lifecycle::{
    Activity, EnteredBy, HookOutcome, InitialEvent, InitialEventKind, NavigationIntent, Stack,
    StackActions, StepAction, StepKind, StepRequest,
};
use crate::nested::{expand_defaults, resolve_target};
use crate::params::CHILD_NAME_KEY;
use crate::plugin::StackPlugin;
use crate::resolve::{ComponentRegistry, Composer};
use crate::{debug_log, error_log, info_log, trace_log, warn_log, ActivityParams};
use std::fmt;
use std::sync::Arc;

/// Plugin key reported to the host.
pub const PLUGIN_KEY: &str = "plugin-omniflow";

/// Which activity-level action a step substitutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intercepted {
    Push,
    Replace,
}

/// Subview synchronization plugin.
///
/// Cheap to clone: the resolver and codec are shared.
#[derive(Clone)]
pub struct Omniflow {
    resolver: Arc<SubviewResolver>,
    codec: Arc<dyn ParamCodec>,
}

impl Omniflow {
    /// Create the plugin for `environment` with the default [`EnvelopeCodec`].
    ///
    /// Fails if the configuration table does not validate.
    pub fn new(config: &OmniflowConfig, environment: impl Into<String>) -> Result<Self, ConfigError> {
        let resolver = SubviewResolver::new(config, environment)?;
        info_log!(
            "{} ready for environment '{}'",
            PLUGIN_KEY,
            resolver.environment()
        );
        Ok(Self {
            resolver: Arc::new(resolver),
            codec: Arc::new(EnvelopeCodec),
        })
    }

    /// Use `codec` for the reserved parameters instead of the default.
    pub fn with_codec(mut self, codec: impl ParamCodec) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// The environment-narrowed configuration table.
    pub fn resolver(&self) -> &SubviewResolver {
        &self.resolver
    }

    /// The codec used for the reserved parameters.
    pub fn codec(&self) -> &dyn ParamCodec {
        self.codec.as_ref()
    }

    /// Build a render composer sharing this plugin's table and codec.
    pub fn composer<V>(&self, registry: ComponentRegistry<V>) -> Composer<V> {
        Composer::new(
            Arc::clone(&self.resolver),
            Arc::clone(&self.codec),
            registry,
        )
    }

    /// Decode the descendant chain currently active under `activity`.
    pub fn chain_of(&self, activity: &Activity) -> Result<DescendantChain, DecodeError> {
        DescendantChain::read(activity.current_params(), self.codec()).map_err(|err| {
            error_log!(
                "Failed to read subview chain of '{}' ({}): {}",
                activity.name,
                activity.id,
                err
            );
            err
        })
    }

    /// Parameters `activity_name` should be created with so that it opens
    /// with its default chain. Unconfigured activities get `params` back
    /// unchanged.
    pub fn params_with_defaults(
        &self,
        activity_name: &str,
        params: ActivityParams,
    ) -> Result<ActivityParams> {
        let intent = NavigationIntent::new(activity_name, params);
        match self.embed_defaults(&intent)? {
            HookOutcome::OverrideParams(params) => Ok(params),
            _ => Ok(intent.activity_params),
        }
    }

    // ------------------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------------------

    /// Embed default chains into the initial events.
    ///
    /// Only the last `Pushed` event is rewritten: it is the activity that
    /// renders first. Events whose params already carry a chain are kept.
    pub fn rewrite_initial_events(&self, mut events: Vec<InitialEvent>) -> Result<Vec<InitialEvent>> {
        let Some(index) = events
            .iter()
            .rposition(|e| e.kind == InitialEventKind::Pushed)
        else {
            trace_log!("No Pushed initial event to rewrite");
            return Ok(events);
        };
        let event = &mut events[index];

        if event.activity_params.contains(CHILD_NAME_KEY) {
            debug_log!(
                "Initial '{}' already carries a subview chain, keeping it",
                event.activity_name
            );
            return Ok(events);
        }

        if let Some(chain) = expand_defaults(&self.resolver, &event.activity_name)? {
            debug_log!(
                "Initial '{}' opens with defaults [{}]",
                event.activity_name,
                chain.names().join(" > ")
            );
            chain.write_into(&mut event.activity_params, self.codec());
        }
        Ok(events)
    }

    /// Decide what happens to a push of `intent` on `stack`.
    pub fn plan_push(&self, stack: &Stack, intent: &NavigationIntent) -> Result<HookOutcome> {
        self.plan_step(stack, intent, Intercepted::Push)
    }

    /// Decide what happens to a replace of the top activity with `intent`.
    pub fn plan_replace(&self, stack: &Stack, intent: &NavigationIntent) -> Result<HookOutcome> {
        self.plan_step(stack, intent, Intercepted::Replace)
    }

    /// Decide what happens to a pop of the top activity.
    pub fn plan_pop(&self, stack: &Stack) -> HookOutcome {
        let Some(top) = stack.top() else {
            return HookOutcome::PassThrough;
        };

        let retire = steps_to_retire(&top.steps);
        if retire == 0 {
            let trailing_app_step = top
                .steps
                .last()
                .is_some_and(|s| s.entered_by == EnteredBy::Application);
            if trailing_app_step && top.subview_step_count() > 0 {
                warn_log!(
                    "Pop on '{}' ends in an application step; subview steps below it are left to the host",
                    top.name
                );
            }
            return HookOutcome::PassThrough;
        }

        HookOutcome::Substitute(vec![StepAction::Pop; retire])
    }

    fn plan_step(
        &self,
        stack: &Stack,
        intent: &NavigationIntent,
        action: Intercepted,
    ) -> Result<HookOutcome> {
        let Some(top) = stack.top() else {
            return self.embed_defaults(intent);
        };
        // Reserved keys on an activity that hosts no subviews here are
        // never rendered, so they are not read either.
        if !self.resolver.hosts_subviews(&top.name) {
            trace_log!("'{}' hosts no subviews, letting '{}' through", top.name, intent.activity_name);
            return self.embed_defaults(intent);
        }

        let chain = self.chain_of(top)?;
        let target_params = intent.activity_params.without_subview_state();
        let Some(update) = resolve_target(
            &self.resolver,
            &top.name,
            &chain,
            &intent.activity_name,
            &target_params,
        )?
        else {
            return self.embed_defaults(intent);
        };

        let params = update.chain.embedded_in(top.current_params(), self.codec());
        let step = match action {
            Intercepted::Push => StepAction::Push(StepRequest::new(params, update.kind)),
            Intercepted::Replace => {
                let kind = keep_opener_role(top, update.kind);
                StepAction::Replace(StepRequest::new(params, kind))
            }
        };
        Ok(HookOutcome::Substitute(vec![step]))
    }

    /// Let `intent` through, embedding its default chain if it has one.
    fn embed_defaults(&self, intent: &NavigationIntent) -> Result<HookOutcome> {
        if intent.activity_params.contains(CHILD_NAME_KEY) {
            return Ok(HookOutcome::PassThrough);
        }
        let outcome = match expand_defaults(&self.resolver, &intent.activity_name)? {
            Some(chain) => {
                HookOutcome::OverrideParams(chain.embedded_in(&intent.activity_params, self.codec()))
            }
            None => HookOutcome::PassThrough,
        };
        Ok(outcome)
    }
}

/// A replace at the depth its discarded step opened stays the opener, so
/// the next pop still retires the whole depth.
fn keep_opener_role(top: &Activity, kind: StepKind) -> StepKind {
    let discarded = top.steps.last().and_then(|s| s.entered_by.subview_kind());
    match (discarded, kind) {
        (Some(StepKind::DepthExtend { depth: opened }), StepKind::SiblingSwitch { depth })
            if opened == depth =>
        {
            StepKind::DepthExtend { depth }
        }
        _ => kind,
    }
}

impl fmt::Debug for Omniflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Omniflow")
            .field("environment", &self.resolver.environment())
            .field("codec", &self.codec.name())
            .finish()
    }
}

impl StackPlugin for Omniflow {
    fn key(&self) -> &'static str {
        PLUGIN_KEY
    }

    fn override_initial_events(&self, events: Vec<InitialEvent>) -> Result<Vec<InitialEvent>> {
        self.rewrite_initial_events(events)
    }

    fn on_before_push(&self, intent: &NavigationIntent, actions: &mut dyn StackActions) -> Result<()> {
        let outcome = self.plan_push(actions.stack(), intent)?;
        debug_log!("before-push '{}': {}", intent.activity_name, describe(&outcome));
        outcome.apply(actions);
        Ok(())
    }

    fn on_before_replace(
        &self,
        intent: &NavigationIntent,
        actions: &mut dyn StackActions,
    ) -> Result<()> {
        let outcome = self.plan_replace(actions.stack(), intent)?;
        debug_log!("before-replace '{}': {}", intent.activity_name, describe(&outcome));
        outcome.apply(actions);
        Ok(())
    }

    fn on_before_pop(&self, actions: &mut dyn StackActions) -> Result<()> {
        let outcome = self.plan_pop(actions.stack());
        debug_log!("before-pop: {}", describe(&outcome));
        outcome.apply(actions);
        Ok(())
    }
}

fn describe(outcome: &HookOutcome) -> String {
    match outcome {
        HookOutcome::PassThrough => "pass through".to_string(),
        HookOutcome::OverrideParams(params) => {
            format!("override params ({} keys)", params.len())
        }
        HookOutcome::Substitute(steps) => {
            let steps: Vec<String> = steps
                .iter()
                .map(|step| match step {
                    StepAction::Push(req) => format!("step_push {:?}", req.kind),
                    StepAction::Replace(req) => format!("step_replace {:?}", req.kind),
                    StepAction::Pop => "step_pop".to_string(),
                })
                .collect();
            format!("cancel, then [{}]", steps.join(", "))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
