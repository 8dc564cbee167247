//! Nested subview resolution.
//!
//! Two operations decide what a descendant chain should look like after a
//! navigation:
//!
//! - [`expand_defaults`] follows `initialActivity` links from an activity
//!   and returns the full default chain below it.
//! - [`resolve_target`] finds where an incoming activity attaches in the
//!   chain that is already active, and returns the chain that results.
//!
//! # Attachment search
//!
//! Candidates are the top activity followed by every chain entry, searched
//! **innermost first**. The first candidate whose `children` allow the target
//! wins, so once navigation has descended into a chain, further nested
//! pushes keep extending it at the deepest eligible point instead of
//! restarting from the top.
//!
//! ```text
//! active:  Top ─ X ─ Y              (Top and Y both allow T)
//! push T:  Top ─ X ─ Y ─ T ─ T's defaults
//! ```

use crate::chain::DescendantChain;
use crate::environment::SubviewResolver;
use crate::error::ConfigError;
use crate::lifecycle::StepKind;
use crate::{debug_log, trace_log, ActivityParams};

/// The chain an intercepted navigation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepUpdate {
    /// Full descendant chain after the navigation.
    pub chain: DescendantChain,
    /// How the step changed the previous chain.
    pub kind: StepKind,
}

impl StepUpdate {
    /// Chain index the target was attached at.
    pub fn depth(&self) -> usize {
        self.kind.depth()
    }
}

/// Resolve the default descendant chain of `activity`.
///
/// Returns `Ok(None)` if `activity` declares no initial child. A chain that
/// revisits an activity fails with [`ConfigError::CyclicDefaults`]; a
/// resolver built with [`SubviewResolver::new`] has already rejected such
/// tables.
pub fn expand_defaults(
    resolver: &SubviewResolver,
    activity: &str,
) -> Result<Option<DescendantChain>, ConfigError> {
    let mut chain = DescendantChain::new();
    let mut visited = vec![activity.to_string()];
    let mut current = activity;

    while let Some(initial) = resolver
        .resolve(current)
        .and_then(|s| s.initial_activity.as_ref())
    {
        trace_log!("expand_defaults: '{}' -> '{}'", current, initial.name);
        let revisit = visited.contains(&initial.name);
        visited.push(initial.name.clone());
        if revisit {
            return Err(ConfigError::CyclicDefaults {
                environment: resolver.environment().to_string(),
                cycle: visited,
            });
        }
        chain.push(initial.name.clone(), initial.params.clone());
        current = &initial.name;
    }

    Ok((!chain.is_empty()).then_some(chain))
}

/// Find where `target` attaches under `top` given the active `chain`.
///
/// Returns `Ok(None)` if no candidate allows `target`: it is then a genuine
/// new stack entry.
pub fn resolve_target(
    resolver: &SubviewResolver,
    top: &str,
    chain: &DescendantChain,
    target: &str,
    target_params: &ActivityParams,
) -> Result<Option<StepUpdate>, ConfigError> {
    // Candidate i: 0 is `top`, i > 0 is chain entry i - 1.
    for depth in (0..=chain.len()).rev() {
        let candidate = if depth == 0 {
            top
        } else {
            chain.names()[depth - 1].as_str()
        };
        trace_log!(
            "resolve_target: is '{}' allowed under '{}' (depth {})?",
            target,
            candidate,
            depth
        );
        if !resolver.allows_child(candidate, target) {
            continue;
        }

        let mut next = chain.prefix(depth);
        next.push(target, target_params.clone());
        if let Some(defaults) = expand_defaults(resolver, target)? {
            next.extend(defaults);
        }
        let kind = StepKind::classify(depth, chain.len());

        debug_log!(
            "resolve_target: '{}' attaches under '{}' at depth {} ({:?}), chain [{}]",
            target,
            candidate,
            depth,
            kind,
            next.names().join(" > ")
        );
        return Ok(Some(StepUpdate { chain: next, kind }));
    }

    trace_log!("resolve_target: no ancestor of '{}' allows '{}'", top, target);
    Ok(None)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActivityDefinition, OmniflowConfig, SubviewConfig};

    const ENV: &str = "desktop";

    fn params(tag: &str) -> ActivityParams {
        ActivityParams::new().with("tag", tag)
    }

    /// Top allows X and T; X allows Y; Y allows T; T defaults to U.
    fn resolver() -> SubviewResolver {
        let config = OmniflowConfig::new()
            .activity(ActivityDefinition::new("Top").subview(ENV, SubviewConfig::new().children(["X", "T"])))
            .activity(ActivityDefinition::new("X").subview(ENV, SubviewConfig::new().child("Y")))
            .activity(ActivityDefinition::new("Y").subview(ENV, SubviewConfig::new().child("T")))
            .activity(ActivityDefinition::new("T").subview(
                ENV,
                SubviewConfig::new().child("U").initial("U", params("u-default")),
            ))
            .activity(ActivityDefinition::new("U"))
            .activity(ActivityDefinition::new("Elsewhere"));
        SubviewResolver::new(&config, ENV).unwrap()
    }

    fn chain(entries: &[&str]) -> DescendantChain {
        let mut chain = DescendantChain::new();
        for name in entries {
            chain.push(*name, params(name));
        }
        chain
    }

    #[test]
    fn test_expand_defaults_three_levels() {
        let config = OmniflowConfig::new()
            .activity(ActivityDefinition::new("A").subview(
                ENV,
                SubviewConfig::new().child("B").initial("B", params("b")),
            ))
            .activity(ActivityDefinition::new("B").subview(
                ENV,
                SubviewConfig::new().child("C").initial("C", params("c")),
            ))
            .activity(ActivityDefinition::new("C"));
        let resolver = SubviewResolver::new(&config, ENV).unwrap();

        let chain = expand_defaults(&resolver, "A").unwrap().unwrap();
        assert_eq!(chain.names(), ["B".to_string(), "C".to_string()]);
        assert_eq!(chain.params(), [params("b"), params("c")]);

        assert_eq!(expand_defaults(&resolver, "C").unwrap(), None);
        assert_eq!(expand_defaults(&resolver, "Unknown").unwrap(), None);
    }

    #[test]
    fn test_expand_defaults_guards_cycles() {
        let config = OmniflowConfig::new().activity(ActivityDefinition::new("A").subview(
            ENV,
            SubviewConfig::new().child("A").initial("A", ActivityParams::new()),
        ));
        let resolver = SubviewResolver::unchecked(&config, ENV);

        match expand_defaults(&resolver, "A") {
            Err(ConfigError::CyclicDefaults { cycle, .. }) => assert_eq!(cycle, vec!["A", "A"]),
            other => panic!("Expected CyclicDefaults, got {other:?}"),
        }
    }

    #[test]
    fn test_innermost_match_wins() {
        let update = resolve_target(&resolver(), "Top", &chain(&["X", "Y"]), "T", &params("t"))
            .unwrap()
            .unwrap();

        assert_eq!(
            update.chain.names(),
            ["X".to_string(), "Y".to_string(), "T".to_string(), "U".to_string()]
        );
        assert_eq!(update.chain.get(2), Some(("T", &params("t"))));
        assert_eq!(update.chain.get(3), Some(("U", &params("u-default"))));
        assert_eq!(update.kind, StepKind::DepthExtend { depth: 2 });
    }

    #[test]
    fn test_top_level_match_replaces_subtree() {
        let update = resolve_target(&resolver(), "Top", &chain(&["X", "Y"]), "X", &params("x2"))
            .unwrap()
            .unwrap();

        assert_eq!(update.chain.names(), ["X".to_string()]);
        assert_eq!(update.chain.get(0), Some(("X", &params("x2"))));
        assert_eq!(update.kind, StepKind::SiblingSwitch { depth: 0 });
    }

    #[test]
    fn test_attach_to_empty_chain() {
        let update = resolve_target(&resolver(), "Top", &DescendantChain::new(), "X", &params("x"))
            .unwrap()
            .unwrap();
        assert_eq!(update.chain.names(), ["X".to_string()]);
        assert_eq!(update.depth(), 0);
        assert!(update.kind.is_depth_extend());
    }

    #[test]
    fn test_no_match_is_none() {
        let resolver = resolver();
        assert_eq!(
            resolve_target(&resolver, "Top", &chain(&["X"]), "Elsewhere", &params("e")).unwrap(),
            None
        );
        assert_eq!(
            resolve_target(&resolver, "U", &DescendantChain::new(), "X", &params("x")).unwrap(),
            None
        );
    }
}
