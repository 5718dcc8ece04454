// src/investigator/traversal.rs

//! Traversal state of one investigation run
//!
//! The arena holds one node per distinct package name. A name is scheduled
//! at most once: it is queued, then marked in flight while its lookup runs,
//! then resolved. Because scheduling consults the arena before descending,
//! a cycle in the registry graph can never re-enter a lookup, and no node
//! ever waits on another node.
//!
//! Once every node is resolved, [`Traversal::assemble`] builds the result
//! tree synchronously from root order and declared dependency order, so the
//! output never depends on lookup completion order.

use super::ResolvedPackage;
use crate::package::{PackageKey, PackageResult};
use crate::policy::{Classification, ClassificationPolicy};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug)]
enum NodeState {
    /// Waiting for a free lookup slot
    Queued,
    /// Lookup running
    InFlight,
    Resolved(Arc<ResolvedPackage>),
}

#[derive(Debug, Default)]
pub(crate) struct Traversal {
    nodes: HashMap<PackageKey, NodeState>,
    /// Names waiting for a lookup slot, with the spelling that discovered them
    queue: VecDeque<(PackageKey, String)>,
}

impl Traversal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a package unless the arena already knows it
    ///
    /// Returns true if the package was newly scheduled.
    pub(crate) fn schedule(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let key = PackageKey::new(name);
        if self.nodes.contains_key(&key) {
            return false;
        }

        self.nodes.insert(key.clone(), NodeState::Queued);
        self.queue.push_back((key, name.to_string()));
        true
    }

    /// Take the next queued package and mark it in flight
    pub(crate) fn start_next(&mut self) -> Option<(PackageKey, String)> {
        let (key, name) = self.queue.pop_front()?;
        self.nodes.insert(key.clone(), NodeState::InFlight);
        Some((key, name))
    }

    /// Record a finished lookup and schedule its declared dependencies
    ///
    /// Returns the number of newly scheduled packages.
    pub(crate) fn complete(&mut self, resolved: Arc<ResolvedPackage>) -> usize {
        let mut scheduled = 0;
        if let Some(metadata) = resolved.outcome.metadata() {
            for dependency in &metadata.dependencies {
                if self.schedule(dependency) {
                    scheduled += 1;
                }
            }
        }
        self.nodes
            .insert(resolved.key.clone(), NodeState::Resolved(resolved));
        scheduled
    }

    pub(crate) fn is_in_flight(&self, key: &PackageKey) -> bool {
        matches!(self.nodes.get(key), Some(NodeState::InFlight))
    }

    pub(crate) fn has_queued(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of distinct packages the run has touched
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    fn resolved(&self, key: &PackageKey) -> Option<&Arc<ResolvedPackage>> {
        match self.nodes.get(key) {
            Some(NodeState::Resolved(resolved)) => Some(resolved),
            _ => None,
        }
    }

    /// Build the result tree for the given roots
    ///
    /// Each root is expanded at its own top-level position; every other
    /// package is expanded at its first position in depth-first order.
    /// Later occurrences, including cycle back-edges, become leaves with the
    /// same classification. Nodes at `max_depth` are leaves too.
    pub(crate) fn assemble(
        &self,
        roots: &[String],
        policy: &ClassificationPolicy,
        mark_targets: bool,
        max_depth: usize,
    ) -> Vec<PackageResult> {
        let root_keys: HashSet<PackageKey> = roots.iter().map(|r| PackageKey::new(r)).collect();
        let mut assembly = Assembly {
            traversal: self,
            policy,
            max_depth,
            root_keys: if mark_targets { root_keys.clone() } else { HashSet::new() },
            reserved: root_keys,
            classifications: HashMap::new(),
            expanded: HashSet::new(),
            truncated: 0,
        };

        let tree = roots.iter().map(|root| assembly.build(root)).collect();
        if assembly.truncated > 0 {
            warn!(
                "Dependency tree cut at depth {} in {} place(s)",
                max_depth, assembly.truncated
            );
        }
        tree
    }
}

struct Assembly<'a> {
    traversal: &'a Traversal,
    policy: &'a ClassificationPolicy,
    max_depth: usize,
    /// Roots eligible for the `InvestigationTarget` marker
    root_keys: HashSet<PackageKey>,
    /// Roots, expanded only at top level
    reserved: HashSet<PackageKey>,
    classifications: HashMap<PackageKey, Classification>,
    expanded: HashSet<PackageKey>,
    /// Branches ended early by the depth bound
    truncated: usize,
}

/// A node whose children are still being built
struct Frame {
    result: PackageResult,
    /// Present only if this occurrence expands its dependencies
    expand: Option<Arc<ResolvedPackage>>,
    next: usize,
    seen: HashSet<PackageKey>,
}

impl Frame {
    fn new(result: PackageResult, expand: Option<Arc<ResolvedPackage>>) -> Self {
        Self {
            result,
            expand,
            next: 0,
            seen: HashSet::new(),
        }
    }

    /// Next declared dependency, skipping blanks and repeated spellings
    fn next_dependency(&mut self) -> Option<String> {
        let metadata = self.expand.as_ref()?.outcome.metadata()?;
        while let Some(dependency) = metadata.dependencies.get(self.next) {
            self.next += 1;
            if !dependency.trim().is_empty() && self.seen.insert(PackageKey::new(dependency)) {
                return Some(dependency.clone());
            }
        }
        None
    }
}

impl Assembly<'_> {
    /// Build one root's subtree with an explicit stack
    fn build(&mut self, name: &str) -> PackageResult {
        let (result, expand) = self.node(name, 0);
        let mut root = Frame::new(result, expand);
        // Descendants of the root still being built, deepest last
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let top = match stack.last_mut() {
                Some(frame) => frame,
                None => &mut root,
            };

            match top.next_dependency() {
                Some(dependency) => {
                    let (result, expand) = self.node(&dependency, stack.len() + 1);
                    stack.push(Frame::new(result, expand));
                }
                None => match stack.pop() {
                    Some(done) => {
                        let parent = match stack.last_mut() {
                            Some(frame) => frame,
                            None => &mut root,
                        };
                        parent.result.dependencies.push(done.result);
                    }
                    None => return root.result,
                },
            }
        }
    }

    /// Classified node for one occurrence, plus its resolution if it expands
    fn node(&mut self, name: &str, depth: usize) -> (PackageResult, Option<Arc<ResolvedPackage>>) {
        let name = name.trim();
        let key = PackageKey::new(name);
        let Some(resolved) = self.traversal.resolved(&key).cloned() else {
            return (PackageResult::failed(name, "Package was never resolved"), None);
        };

        // The registry's spelling is used only if it names the same package
        let display_name = resolved
            .outcome
            .metadata()
            .map(|metadata| metadata.name.trim())
            .filter(|canonical| PackageKey::new(canonical) == key)
            .unwrap_or(name)
            .to_string();

        let classification = self.classify(&key, &display_name, &resolved);
        let result = PackageResult {
            package_name: display_name,
            support_type: classification.support_type,
            error: classification.error,
            replacement: classification.replacement,
            dependencies: Vec::new(),
        };

        let may_expand = depth == 0 || !self.reserved.contains(&key);
        if !may_expand || self.expanded.contains(&key) {
            return (result, None);
        }
        if depth >= self.max_depth {
            if resolved
                .outcome
                .metadata()
                .is_some_and(|metadata| !metadata.dependencies.is_empty())
            {
                self.truncated += 1;
            }
            return (result, None);
        }

        self.expanded.insert(key);
        (result, Some(resolved))
    }

    /// Classify once per package so every occurrence is identical
    fn classify(
        &mut self,
        key: &PackageKey,
        display_name: &str,
        resolved: &ResolvedPackage,
    ) -> Classification {
        if let Some(classification) = self.classifications.get(key) {
            return classification.clone();
        }

        let classification =
            self.policy
                .classify(display_name, &resolved.outcome, self.root_keys.contains(key));
        self.classifications
            .insert(key.clone(), classification.clone());
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::SupportType;
    use crate::policy::PolicyConfig;
    use crate::registry::{LookupOutcome, PackageMetadata};

    fn found(name: &str, deps: &[&str]) -> Arc<ResolvedPackage> {
        Arc::new(ResolvedPackage {
            key: PackageKey::new(name),
            outcome: LookupOutcome::Found(
                PackageMetadata::new(name).with_dependencies(deps.iter().copied()),
            ),
        })
    }

    /// Drive the arena to completion against a fixed graph
    fn resolve_all(traversal: &mut Traversal, graph: &[(&str, &[&str])]) {
        while let Some((key, name)) = traversal.start_next() {
            assert!(traversal.is_in_flight(&key));
            let resolved = match graph.iter().find(|(n, _)| PackageKey::new(n) == key) {
                Some((n, deps)) => found(n, deps),
                None => Arc::new(ResolvedPackage {
                    key: PackageKey::new(&name),
                    outcome: LookupOutcome::NotFound,
                }),
            };
            traversal.complete(resolved);
        }
    }

    #[test]
    fn test_schedule_is_idempotent_and_case_insensitive() {
        let mut traversal = Traversal::new();
        assert!(traversal.schedule("Foo"));
        assert!(!traversal.schedule("foo"));
        assert!(!traversal.schedule("  "));
        assert_eq!(traversal.len(), 1);
        assert!(traversal.has_queued());
    }

    #[test]
    fn test_cycle_is_scheduled_once_and_cut_in_tree() {
        let mut traversal = Traversal::new();
        traversal.schedule("A");
        resolve_all(&mut traversal, &[("A", &["B"]), ("B", &["A"])]);
        assert_eq!(traversal.len(), 2);

        let policy = ClassificationPolicy::new(&PolicyConfig::default());
        let tree = traversal.assemble(&["A".to_string()], &policy, true, 64);

        assert_eq!(tree.len(), 1);
        let a = &tree[0];
        assert_eq!(a.support_type, SupportType::InvestigationTarget);
        let b = &a.dependencies[0];
        assert_eq!(b.package_name, "B");
        let back_edge = &b.dependencies[0];
        assert_eq!(back_edge.package_name, "A");
        assert_eq!(back_edge.support_type, SupportType::InvestigationTarget);
        assert!(back_edge.dependencies.is_empty());
    }

    #[test]
    fn test_root_reached_through_another_root_is_expanded_at_top_level() {
        let mut traversal = Traversal::new();
        traversal.schedule("App");
        traversal.schedule("Lib");
        resolve_all(&mut traversal, &[("App", &["Lib"]), ("Lib", &["Core"]), ("Core", &[])]);

        let policy = ClassificationPolicy::new(&PolicyConfig::default());
        let roots = vec!["App".to_string(), "Lib".to_string()];
        let tree = traversal.assemble(&roots, &policy, true, 64);

        assert!(tree[0].dependencies[0].dependencies.is_empty());
        assert_eq!(tree[1].package_name, "Lib");
        assert_eq!(tree[1].dependencies[0].package_name, "Core");
    }

    #[test]
    fn test_missing_dependency_keeps_referenced_spelling() {
        let mut traversal = Traversal::new();
        traversal.schedule("A");
        resolve_all(&mut traversal, &[("A", &["Ghost.Package", "ghost.package"])]);

        let policy = ClassificationPolicy::new(&PolicyConfig::default());
        let tree = traversal.assemble(&["A".to_string()], &policy, false, 64);

        let a = &tree[0];
        assert_eq!(a.support_type, SupportType::Unsupported);
        assert_eq!(a.dependencies.len(), 1);
        assert_eq!(a.dependencies[0].package_name, "Ghost.Package");
        assert_eq!(a.dependencies[0].support_type, SupportType::NotFound);
    }

    #[test]
    fn test_depth_bound_leaves_package_for_shallower_expansion() {
        let mut traversal = Traversal::new();
        traversal.schedule("Root");
        resolve_all(
            &mut traversal,
            &[("Root", &["A", "X"]), ("A", &["X"]), ("X", &["Y"]), ("Y", &[])],
        );

        let policy = ClassificationPolicy::new(&PolicyConfig::default());
        let tree = traversal.assemble(&["Root".to_string()], &policy, true, 2);

        let root = &tree[0];
        // X under A sits at the bound and is cut
        let cut = &root.dependencies[0].dependencies[0];
        assert_eq!(cut.package_name, "X");
        assert!(cut.dependencies.is_empty());

        // X directly under Root is expanded
        let x = &root.dependencies[1];
        assert_eq!(x.dependencies[0].package_name, "Y");
        assert_eq!(x.support_type, cut.support_type);
    }

    #[test]
    fn test_renamed_metadata_keeps_referenced_spelling() {
        let mut traversal = Traversal::new();
        traversal.schedule("Root");
        while let Some((key, _)) = traversal.start_next() {
            let metadata = match key.as_str() {
                "root" => PackageMetadata::new("Root").with_dependencies(["alias", "blank"]),
                "alias" => PackageMetadata::new("Root"),
                _ => PackageMetadata::new(""),
            };
            traversal.complete(Arc::new(ResolvedPackage {
                key,
                outcome: LookupOutcome::Found(metadata),
            }));
        }

        let policy = ClassificationPolicy::new(&PolicyConfig::default());
        let tree = traversal.assemble(&["root".to_string()], &policy, true, 64);

        let root = &tree[0];
        assert_eq!(root.package_name, "Root");
        assert_eq!(root.support_type, SupportType::InvestigationTarget);
        assert_eq!(root.dependencies[0].package_name, "alias");
        assert_eq!(root.dependencies[0].support_type, SupportType::Unsupported);
        assert_eq!(root.dependencies[1].package_name, "blank");
    }
}
