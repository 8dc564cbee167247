//! Host stack interface and hook outcome types.
//!
//! This module describes what the plugin reads from, and writes to, the host
//! stack engine:
//!
//! - [`Stack`] / [`Activity`] / [`Step`] — the read-only snapshot every hook
//!   receives.
//! - [`StackActions`] — the action calls a hook may issue
//!   (`prevent_default`, `override_action_params`, `step_push`,
//!   `step_replace`, `step_pop`).
//! - [`HookOutcome`] — the single decision a hook reaches for one intent:
//!   pass through, override the intent's params, or cancel the intent and
//!   substitute step actions.
//!
//! # Step tagging
//!
//! Every step records how it was entered ([`EnteredBy`]). Steps this crate
//! creates carry a [`StepKind`] fixed at creation time, so collapsing a pop
//! never has to re-read encoded parameters:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | [`EnteredBy::Activity`] | the activity-level push/replace that created the entry |
//! | [`StepKind::DepthExtend`] | a child attached below the previous innermost one |
//! | [`StepKind::SiblingSwitch`] | the subtree at an existing depth swapped out |
//! | [`EnteredBy::Application`] | a step pushed by the application itself |

use crate::ActivityParams;

// ============================================================================
// Step tags
// ============================================================================

/// How a subview step changed the descendant chain.
///
/// `depth` is the chain index of the attached child (0 = immediate child of
/// the activity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// The chain grew by attaching below its innermost entry.
    DepthExtend { depth: usize },
    /// An existing level was replaced, dropping everything below it.
    SiblingSwitch { depth: usize },
}

impl StepKind {
    /// Chain index this step attached at.
    pub fn depth(self) -> usize {
        match self {
            Self::DepthExtend { depth } | Self::SiblingSwitch { depth } => depth,
        }
    }

    /// Classify attaching at `depth` onto a chain that had `previous_len`
    /// levels.
    pub fn classify(depth: usize, previous_len: usize) -> Self {
        if depth >= previous_len {
            Self::DepthExtend { depth }
        } else {
            Self::SiblingSwitch { depth }
        }
    }

    /// Check if this step extended the chain.
    pub fn is_depth_extend(self) -> bool {
        matches!(self, Self::DepthExtend { .. })
    }

    /// Check if this step switched siblings.
    pub fn is_sibling_switch(self) -> bool {
        matches!(self, Self::SiblingSwitch { .. })
    }
}

/// What produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnteredBy {
    /// The activity-level action that created the stack entry.
    Activity,
    /// A step substituted by the subview plugin.
    Subview(StepKind),
    /// A step issued directly by the application.
    Application,
}

impl EnteredBy {
    /// The subview tag, if this step was created by the plugin.
    pub fn subview_kind(self) -> Option<StepKind> {
        match self {
            Self::Subview(kind) => Some(kind),
            _ => None,
        }
    }
}

// ============================================================================
// Stack snapshot
// ============================================================================

/// One internal history entry of an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    /// Full parameters of the activity while this step is current.
    pub params: ActivityParams,
    pub entered_by: EnteredBy,
}

/// A stack entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub name: String,
    /// Parameters the activity was created with.
    pub params: ActivityParams,
    pub is_top: bool,
    /// Step history, oldest first. The host records the creating action as
    /// the first step.
    pub steps: Vec<Step>,
}

impl Activity {
    /// Parameters currently in effect: those of the latest step, or the
    /// creation parameters if there are no steps.
    pub fn current_params(&self) -> &ActivityParams {
        self.steps.last().map_or(&self.params, |step| &step.params)
    }

    /// Number of steps created by the subview plugin.
    pub fn subview_step_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.entered_by.subview_kind().is_some())
            .count()
    }
}

/// Read-only snapshot of the host stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    /// Activities, bottom first.
    pub activities: Vec<Activity>,
}

impl Stack {
    /// The activity flagged as top, if any.
    pub fn top(&self) -> Option<&Activity> {
        self.activities.iter().find(|a| a.is_top)
    }

    /// Number of visible stack entries.
    pub fn depth(&self) -> usize {
        self.activities.len()
    }
}

// ============================================================================
// Intents and actions
// ============================================================================

/// A pending push or replace of a named activity.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationIntent {
    pub activity_name: String,
    pub activity_params: ActivityParams,
}

impl NavigationIntent {
    /// Create an intent.
    pub fn new(activity_name: impl Into<String>, activity_params: ActivityParams) -> Self {
        Self {
            activity_name: activity_name.into(),
            activity_params,
        }
    }
}

/// Kind of an event replayed when the stack computes its first state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialEventKind {
    Pushed,
    StepPushed,
}

/// An event the host replays to build its initial stack.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialEvent {
    pub kind: InitialEventKind,
    pub activity_name: String,
    pub activity_params: ActivityParams,
}

impl InitialEvent {
    /// A `Pushed` event for `activity_name`.
    pub fn pushed(activity_name: impl Into<String>, activity_params: ActivityParams) -> Self {
        Self {
            kind: InitialEventKind::Pushed,
            activity_name: activity_name.into(),
            activity_params,
        }
    }
}

/// Parameters of a step the plugin asks the host to push or replace.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRequest {
    /// Fresh step id.
    pub id: String,
    pub params: ActivityParams,
    pub kind: StepKind,
}

impl StepRequest {
    /// Create a request with a freshly generated id.
    pub fn new(params: ActivityParams, kind: StepKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            params,
            kind,
        }
    }
}

/// A step-level action substituted for a cancelled intent.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Push(StepRequest),
    Replace(StepRequest),
    Pop,
}

/// Action calls a hook may issue against the host.
///
/// Hosts queue these and apply them in call order once the hook returns.
pub trait StackActions {
    /// Current stack snapshot.
    fn stack(&self) -> &Stack;

    /// Cancel the in-flight intent.
    fn prevent_default(&mut self);

    /// Replace the in-flight intent's parameters.
    fn override_action_params(&mut self, params: ActivityParams);

    /// Append a step to the top activity.
    fn step_push(&mut self, step: StepRequest);

    /// Replace the top activity's latest step.
    fn step_replace(&mut self, step: StepRequest);

    /// Retire the top activity's latest step.
    fn step_pop(&mut self);
}

// ============================================================================
// HookOutcome
// ============================================================================

/// Decision a hook reaches for one intent.
///
/// Exactly one of the three happens per intent; a hook never both
/// overrides and cancels.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Leave the intent untouched.
    PassThrough,
    /// Let the intent proceed with these parameters instead.
    OverrideParams(ActivityParams),
    /// Cancel the intent and apply these step actions in order.
    Substitute(Vec<StepAction>),
}

impl HookOutcome {
    /// Check if the intent passes through unchanged.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::PassThrough)
    }

    /// Check if the intent's parameters are overridden.
    pub fn is_override(&self) -> bool {
        matches!(self, Self::OverrideParams(_))
    }

    /// Check if the intent is cancelled.
    pub fn cancels(&self) -> bool {
        matches!(self, Self::Substitute(_))
    }

    /// Step actions substituted for the intent (empty unless cancelled).
    pub fn step_actions(&self) -> &[StepAction] {
        match self {
            Self::Substitute(actions) => actions,
            _ => &[],
        }
    }

    /// Issue this outcome against the host.
    pub fn apply(self, actions: &mut dyn StackActions) {
        match self {
            Self::PassThrough => {}
            Self::OverrideParams(params) => actions.override_action_params(params),
            Self::Substitute(steps) => {
                actions.prevent_default();
                for step in steps {
                    match step {
                        StepAction::Push(request) => actions.step_push(request),
                        StepAction::Replace(request) => actions.step_replace(request),
                        StepAction::Pop => actions.step_pop(),
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
