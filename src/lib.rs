//! # omniflow
//!
//! Nested subview navigation on top of a flat activity stack.
//!
//! A host stack engine only knows a stack of activities, each with its own
//! step history. `omniflow` lets an activity contain a chain of nested child
//! activities (`Mail > Folder > Thread`) while keeping that engine's history
//! authoritative:
//!
//! - pushing an activity that a configured ancestor accepts as a child
//!   becomes a **step** on the current top activity instead of a new stack
//!   entry;
//! - the active chain is stored **in the activity's own parameters**, under
//!   two reserved keys, so history, deep links and restoration need nothing
//!   extra;
//! - one back action undoes exactly one forward navigation, however many
//!   steps it took.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | subview table per activity and environment |
//! | [`codec`] | reserved-parameter encoding |
//! | [`chain`] | the descendant chain and its persistence |
//! | [`nested`] | default expansion and attachment search |
//! | [`collapse`] | how many steps one back action retires |
//! | [`sync`] | the [`Omniflow`] plugin |
//! | [`resolve`] | render composition with parent/child accessors |
//! | [`state`] | [`MemoryStack`], an in-memory host |
//!
//! # Quick start
//!
//! ```
//! use omniflow::{
//!     ActivityDefinition, ActivityParams, MemoryStack, Omniflow, OmniflowConfig, SubviewConfig,
//! };
//!
//! let config = OmniflowConfig::new()
//!     .activity(ActivityDefinition::new("Settings").subview(
//!         "desktop",
//!         SubviewConfig::new()
//!             .children(["General", "Privacy"])
//!             .initial("General", ActivityParams::new()),
//!     ))
//!     .activity(ActivityDefinition::new("General"))
//!     .activity(ActivityDefinition::new("Privacy"));
//!
//! let mut stack = MemoryStack::new().with_plugin(Omniflow::new(&config, "desktop").unwrap());
//! stack.init_with("Settings", ActivityParams::new()).unwrap();
//!
//! stack.push("Privacy", ActivityParams::new()).unwrap();
//! assert_eq!(stack.depth(), 1);
//!
//! stack.pop().unwrap();
//! assert_eq!(stack.top().unwrap().steps.len(), 1);
//! ```
//!
//! # Feature flags
//!
//! - `log` (default): log records through the `log` crate.
//! - `tracing`: log records through `tracing` instead.

pub mod chain;
pub mod codec;
pub mod collapse;
pub mod config;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod nested;
pub mod params;
pub mod plugin;
pub mod resolve;
pub mod state;
pub mod sync;

pub use chain::DescendantChain;
pub use codec::{decode_as, encode_as, EnvelopeCodec, ParamCodec};
pub use config::{
    ActivityDefinition, EnvironmentOptions, InitialActivity, OmniflowConfig, SubviewConfig,
};
pub use environment::SubviewResolver;
pub use error::{ConfigError, DecodeError, OmniflowError, Result};
pub use lifecycle::{
    Activity, EnteredBy, HookOutcome, InitialEvent, InitialEventKind, NavigationIntent, Stack,
    StackActions, Step, StepAction, StepKind, StepRequest,
};
pub use nested::StepUpdate;
pub use params::{ActivityParams, CHILD_NAME_KEY, CHILD_PARAMS_KEY};
pub use plugin::StackPlugin;
pub use resolve::{
    ChildSlot, ComponentRegistry, Composer, ParentRef, RenderContext, SubviewEntry, SubviewStack,
};
pub use state::{Dispatch, MemoryStack};
pub use sync::{Omniflow, PLUGIN_KEY};
