//! Stack plugins.
//!
//! A [`StackPlugin`] hooks into the host stack engine at four points. The
//! host calls them for every intent, in plugin registration order, before the
//! intent reaches its history:
//!
//! | Hook | Called when |
//! |------|-------------|
//! | [`override_initial_events`](StackPlugin::override_initial_events) | the stack computes its first state |
//! | [`on_before_push`](StackPlugin::on_before_push) | an activity push is requested |
//! | [`on_before_replace`](StackPlugin::on_before_replace) | a replace of the top activity is requested |
//! | [`on_before_pop`](StackPlugin::on_before_pop) | a pop of the top activity is requested |
//!
//! Every hook has a pass-through default, so a plugin only implements what
//! it needs. All hooks are **synchronous**: intents are processed one at a
//! time and each hook runs to completion.
//!
//! # Example
//!
//! ```
//! use omniflow::{NavigationIntent, Result, StackActions, StackPlugin};
//!
//! /// Refuses to push the same activity twice in a row.
//! struct NoRepeat;
//!
//! impl StackPlugin for NoRepeat {
//!     fn key(&self) -> &'static str {
//!         "plugin-no-repeat"
//!     }
//!
//!     fn on_before_push(&self, intent: &NavigationIntent, actions: &mut dyn StackActions) -> Result<()> {
//!         let repeated = actions
//!             .stack()
//!             .top()
//!             .is_some_and(|top| top.name == intent.activity_name);
//!         if repeated {
//!             actions.prevent_default();
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::Result;
use crate::lifecycle::{InitialEvent, NavigationIntent, StackActions};

/// Plugin interface of the host stack engine.
pub trait StackPlugin: Send + Sync + 'static {
    /// Unique plugin key, for debugging.
    fn key(&self) -> &'static str {
        "StackPlugin"
    }

    /// Rewrite the events the stack replays to build its first state.
    fn override_initial_events(&self, events: Vec<InitialEvent>) -> Result<Vec<InitialEvent>> {
        Ok(events)
    }

    /// Called before an activity push.
    fn on_before_push(&self, intent: &NavigationIntent, actions: &mut dyn StackActions) -> Result<()> {
        let _ = (intent, actions);
        Ok(())
    }

    /// Called before the top activity is replaced.
    fn on_before_replace(
        &self,
        intent: &NavigationIntent,
        actions: &mut dyn StackActions,
    ) -> Result<()> {
        let _ = (intent, actions);
        Ok(())
    }

    /// Called before the top activity is popped.
    fn on_before_pop(&self, actions: &mut dyn StackActions) -> Result<()> {
        let _ = actions;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
