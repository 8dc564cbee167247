//! Subview resolution for rendering.
//!
//! # Architecture
//!
//! Instead of each nested view decoding its parent's parameters at render
//! time, the chain of an activity is decoded **once per render pass** into a
//! [`SubviewStack`]: one [`SubviewEntry`] per nesting level, each carrying a
//! shared [`ParentRef`] chain up to the activity.
//!
//! ```text
//! Activity "Mail"  OMNI_childName = ["Folder", "Thread"]
//!
//! [0] Mail                       parent: -
//! [1] Folder  params={id=inbox}  parent: Mail
//! [2] Thread  params={id=42}     parent: Folder -> Mail
//! ```
//!
//! A [`Composer`] renders depth 0 with the component registered under the
//! activity's name. That component reaches the next level through
//! [`RenderContext::child`], and so on down the chain, so every level
//! decides where its nested child appears.
//!
//! # Example
//!
//! ```
//! use omniflow::{
//!     ActivityDefinition, ActivityParams, ComponentRegistry, MemoryStack, Omniflow,
//!     OmniflowConfig, SubviewConfig,
//! };
//!
//! let config = OmniflowConfig::new()
//!     .activity(ActivityDefinition::new("Mail").subview(
//!         "desktop",
//!         SubviewConfig::new().child("Inbox").initial("Inbox", ActivityParams::new()),
//!     ))
//!     .activity(ActivityDefinition::new("Inbox"));
//! let plugin = Omniflow::new(&config, "desktop").unwrap();
//!
//! let registry = ComponentRegistry::<String>::new()
//!     .register("Mail", |cx| {
//!         let child = cx.child().and_then(|c| c.render()).unwrap_or_default();
//!         format!("<mail>{child}</mail>")
//!     })
//!     .register("Inbox", |cx| {
//!         let parent = cx.parent().map(|p| p.activity_name.clone()).unwrap_or_default();
//!         format!("<inbox of={parent}/>")
//!     });
//! let composer = plugin.composer(registry);
//!
//! let mut stack = MemoryStack::new().with_plugin(plugin);
//! stack.init_with("Mail", ActivityParams::new()).unwrap();
//!
//! let html = composer.render(stack.top().unwrap()).unwrap();
//! assert_eq!(html.as_deref(), Some("<mail><inbox of=Mail/></mail>"));
//! ```

use crate::chain::DescendantChain;
use crate::codec::ParamCodec;
use crate::environment::SubviewResolver;
use crate::error::{DecodeError, Result};
use crate::lifecycle::Activity;
use crate::{trace_log, warn_log, ActivityParams};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Subview Stack
// ============================================================================

/// The enclosing level of a rendered subview.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRef {
    pub activity_name: String,
    pub activity_params: ActivityParams,
    /// The parent's own parent; `None` at the activity.
    pub parent: Option<Arc<ParentRef>>,
}

impl ParentRef {
    /// Iterate from this parent outwards to the activity.
    pub fn ancestors(&self) -> impl Iterator<Item = &ParentRef> + '_ {
        std::iter::successors(Some(self), |p| p.parent.as_deref())
    }
}

/// One level of a resolved subview stack.
#[derive(Debug, Clone, PartialEq)]
pub struct SubviewEntry {
    pub name: String,
    /// Parameters of this level, without reserved keys.
    pub params: ActivityParams,
    /// 0 = the activity itself.
    pub depth: usize,
    pub parent: Option<Arc<ParentRef>>,
}

/// Every level rendered for one activity, outermost first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubviewStack {
    entries: Vec<SubviewEntry>,
}

impl SubviewStack {
    /// Get entry at a specific depth
    pub fn at_depth(&self, depth: usize) -> Option<&SubviewEntry> {
        self.entries.get(depth)
    }

    /// The activity level (depth 0)
    pub fn root(&self) -> Option<&SubviewEntry> {
        self.entries.first()
    }

    /// The deepest level
    pub fn leaf(&self) -> Option<&SubviewEntry> {
        self.entries.last()
    }

    /// Number of levels, the activity included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries as a slice
    pub fn entries(&self) -> &[SubviewEntry] {
        &self.entries
    }

    /// Pretty-print for debugging
    #[cfg(debug_assertions)]
    pub fn debug_string(&self) -> String {
        if self.entries.is_empty() {
            return "SubviewStack: (empty)".to_string();
        }

        let mut lines = vec!["SubviewStack:".to_string()];
        for entry in &self.entries {
            let indent = "  ".repeat(entry.depth);
            let params_str = if entry.params.is_empty() {
                String::new()
            } else {
                format!(
                    " params={{{}}}",
                    entry
                        .params
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, v))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            };
            lines.push(format!("{}[{}] {}{}", indent, entry.depth, entry.name, params_str));
        }
        lines.join("\n")
    }

    fn push(&mut self, name: &str, params: &ActivityParams) {
        let parent = self.entries.last().map(|up| {
            Arc::new(ParentRef {
                activity_name: up.name.clone(),
                activity_params: up.params.clone(),
                parent: up.parent.clone(),
            })
        });
        self.entries.push(SubviewEntry {
            name: name.to_string(),
            params: params.without_subview_state(),
            depth: self.entries.len(),
            parent,
        });
    }
}

/// Decode the subview stack of an activity from its current parameters.
///
/// An activity without a chain resolves to a single level.
pub fn resolve_subviews(
    activity_name: &str,
    params: &ActivityParams,
    codec: &dyn ParamCodec,
) -> Result<SubviewStack, DecodeError> {
    let chain = DescendantChain::read(params, codec)?;

    let mut stack = SubviewStack::default();
    stack.push(activity_name, params);
    for (name, child_params) in chain.iter() {
        stack.push(name, child_params);
    }

    trace_log!(
        "Resolved '{}' into {} levels: [{}]",
        activity_name,
        stack.len(),
        stack
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    );

    Ok(stack)
}

// ============================================================================
// Component Registry
// ============================================================================

/// A view function for one activity name.
pub type Component<V> = Arc<dyn Fn(&RenderContext<'_, V>) -> V + Send + Sync>;

/// Name → view function table. Built once, then read-only.
pub struct ComponentRegistry<V> {
    components: HashMap<String, Component<V>>,
}

impl<V> ComponentRegistry<V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Register the view of `name` (builder pattern). A later registration
    /// for the same name wins.
    pub fn register<F>(mut self, name: impl Into<String>, component: F) -> Self
    where
        F: Fn(&RenderContext<'_, V>) -> V + Send + Sync + 'static,
    {
        self.components.insert(name.into(), Arc::new(component));
        self
    }

    /// View function registered for `name`.
    pub fn get(&self, name: &str) -> Option<&Component<V>> {
        self.components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl<V> Default for ComponentRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for ComponentRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
        }
    }
}

impl<V> fmt::Debug for ComponentRegistry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}

// ============================================================================
// Composer
// ============================================================================

/// Renders activities together with their nested subviews.
pub struct Composer<V> {
    resolver: Arc<SubviewResolver>,
    codec: Arc<dyn ParamCodec>,
    registry: ComponentRegistry<V>,
}

impl<V> Composer<V> {
    /// Create a composer. See also [`Omniflow::composer`](crate::Omniflow::composer).
    pub fn new(
        resolver: Arc<SubviewResolver>,
        codec: Arc<dyn ParamCodec>,
        registry: ComponentRegistry<V>,
    ) -> Self {
        Self {
            resolver,
            codec,
            registry,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry<V> {
        &self.registry
    }

    /// Resolve the levels to render for `activity`.
    ///
    /// Only activities configured with children are decoded; any other
    /// activity renders as a single level.
    pub fn subviews_of(&self, activity: &Activity) -> Result<SubviewStack> {
        let params = activity.current_params();
        if !self.resolver.hosts_subviews(&activity.name) {
            let mut stack = SubviewStack::default();
            stack.push(&activity.name, params);
            return Ok(stack);
        }
        Ok(resolve_subviews(&activity.name, params, self.codec.as_ref())?)
    }

    /// Render `activity`. Returns `Ok(None)` if no component is registered
    /// for it.
    pub fn render(&self, activity: &Activity) -> Result<Option<V>> {
        let stack = self.subviews_of(activity)?;
        Ok(self.render_level(&stack, 0))
    }

    fn render_level(&self, stack: &SubviewStack, depth: usize) -> Option<V> {
        let entry = stack.at_depth(depth)?;
        let Some(component) = self.registry.get(&entry.name) else {
            warn_log!("No component registered for '{}' (depth {})", entry.name, depth);
            return None;
        };
        let cx = RenderContext {
            composer: self,
            stack,
            entry,
        };
        Some(component(&cx))
    }
}

impl<V> fmt::Debug for Composer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composer")
            .field("environment", &self.resolver.environment())
            .field("codec", &self.codec.name())
            .field("registry", &self.registry)
            .finish()
    }
}

/// What a component sees while rendering one level.
pub struct RenderContext<'a, V> {
    composer: &'a Composer<V>,
    stack: &'a SubviewStack,
    entry: &'a SubviewEntry,
}

impl<'a, V> RenderContext<'a, V> {
    /// Name of the level being rendered.
    pub fn name(&self) -> &'a str {
        &self.entry.name
    }

    /// Parameters of the level being rendered.
    pub fn params(&self) -> &'a ActivityParams {
        &self.entry.params
    }

    /// 0 for the activity, k for its k-th nested descendant.
    pub fn depth(&self) -> usize {
        self.entry.depth
    }

    /// The enclosing level, `None` at the activity.
    pub fn parent(&self) -> Option<&'a ParentRef> {
        self.entry.parent.as_deref()
    }

    /// The immediate nested child, `None` at the deepest level.
    pub fn child(&self) -> Option<ChildSlot<'a, V>> {
        let depth = self.entry.depth + 1;
        let entry = self.stack.at_depth(depth)?;
        Some(ChildSlot {
            composer: self.composer,
            stack: self.stack,
            name: &entry.name,
            depth,
        })
    }
}

/// Handle to the nested child of a level, rendered on demand.
pub struct ChildSlot<'a, V> {
    composer: &'a Composer<V>,
    stack: &'a SubviewStack,
    name: &'a str,
    depth: usize,
}

impl<'a, V> ChildSlot<'a, V> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Render the child. `None` if no component is registered for it.
    pub fn render(&self) -> Option<V> {
        self.composer.render_level(self.stack, self.depth)
    }
}

// ============================================================================
// Tests
// ============================================================================
