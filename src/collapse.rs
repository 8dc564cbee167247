//! Pop collapsing.
//!
//! A single back action must undo one whole forward action, even when that
//! action is spread over several steps. The unit retired by one pop is:
//!
//! 1. the trailing run of [`SiblingSwitch`](StepKind::SiblingSwitch) steps
//!    at one depth, and
//! 2. the [`DepthExtend`](StepKind::DepthExtend) step that opened that depth,
//!    if it directly precedes the run (or is itself the trailing step).
//!
//! Steps not created by the plugin (the activity's own entry step and
//! application steps) end the scan and are never retired here; once nothing
//! is left to retire, the host's ordinary activity pop proceeds.
//!
//! ```text
//! steps:  [Activity] [Extend@0 X] [Switch@0 X2] [Switch@0 X3]
//! pop  →  retires 3, back to the activity's own state
//!
//! steps:  [Activity] [Extend@0 X] [Extend@1 Y]
//! pop  →  retires 1 (Y), X stays active
//! ```

use crate::lifecycle::{Step, StepKind};

/// Number of trailing steps one pop must retire. `0` means the pop is not
/// the plugin's to handle.
pub fn steps_to_retire(steps: &[Step]) -> usize {
    let mut retire = 0;
    let mut run_depth: Option<usize> = None;

    for step in steps.iter().rev() {
        let Some(kind) = step.entered_by.subview_kind() else {
            break;
        };
        if run_depth.is_some_and(|depth| depth != kind.depth()) {
            break;
        }
        retire += 1;
        match kind {
            StepKind::SiblingSwitch { depth } => run_depth = Some(depth),
            StepKind::DepthExtend { .. } => break,
        }
    }

    retire
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::EnteredBy;
    use crate::ActivityParams;

    fn step(entered_by: EnteredBy) -> Step {
        Step {
            id: String::new(),
            params: ActivityParams::new(),
            entered_by,
        }
    }

    fn extend(depth: usize) -> Step {
        step(EnteredBy::Subview(StepKind::DepthExtend { depth }))
    }

    fn switch(depth: usize) -> Step {
        step(EnteredBy::Subview(StepKind::SiblingSwitch { depth }))
    }

    fn root() -> Step {
        step(EnteredBy::Activity)
    }

    #[test]
    fn test_no_subview_steps() {
        assert_eq!(steps_to_retire(&[]), 0);
        assert_eq!(steps_to_retire(&[root()]), 0);
    }

    #[test]
    fn test_sibling_run_collapses_into_opener() {
        assert_eq!(steps_to_retire(&[root(), extend(0), switch(0), switch(0)]), 3);
    }

    #[test]
    fn test_sibling_run_on_default_child_stops_at_entry() {
        assert_eq!(steps_to_retire(&[root(), switch(0), switch(0), switch(0)]), 3);
    }

    #[test]
    fn test_depth_extensions_retire_one_at_a_time() {
        let mut steps = vec![root(), extend(0), extend(1)];
        assert_eq!(steps_to_retire(&steps), 1);
        steps.pop();
        assert_eq!(steps_to_retire(&steps), 1);
        steps.pop();
        assert_eq!(steps_to_retire(&steps), 0);
    }

    #[test]
    fn test_switch_at_shallower_depth_is_its_own_unit() {
        // X > Y opened, then Y swapped, then X swapped.
        let steps = [root(), extend(0), extend(1), switch(1), switch(0)];
        assert_eq!(steps_to_retire(&steps), 1);
        assert_eq!(steps_to_retire(&steps[..4]), 2);
    }

    #[test]
    fn test_extension_below_switch_run() {
        let steps = [root(), switch(0), switch(0), extend(1)];
        assert_eq!(steps_to_retire(&steps), 1);
        assert_eq!(steps_to_retire(&steps[..3]), 2);
    }

    #[test]
    fn test_opener_at_other_depth_is_kept() {
        assert_eq!(steps_to_retire(&[root(), extend(1), switch(0)]), 1);
    }

    #[test]
    fn test_application_step_ends_scan() {
        assert_eq!(steps_to_retire(&[root(), extend(0), step(EnteredBy::Application)]), 0);
        assert_eq!(steps_to_retire(&[root(), step(EnteredBy::Application), switch(0)]), 1);
    }
}
