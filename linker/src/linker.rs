//! The four-phase linker.
//!
//! Linking turns a flat list of unlinked file descriptors into a graph of
//! [`LinkedFileDescriptor`]s, bucketed by how completely each file's imports
//! could be satisfied:
//!
//!  1) Files with no imports link immediately.
//!  2) Files whose imports are all fully linked link fully, to a fixed point.
//!  3) Files with at least one linked import link partially, carrying only
//!     the dependency handles available when first visited.
//!  4) Everything left over, including whole import cycles, is kept with no
//!     dependency handles at all.
//!
//! Every input file ends up in exactly one bucket; linking never drops a
//! file. Because a file only ever points at files linked in an earlier step,
//! the resulting graph is acyclic by construction.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use protolink_schema::{FileSet, LinkedFileDescriptor, RawFileDescriptor};

use crate::error::LinkError;
use crate::validate;

/// The outcome of a link operation: three disjoint tiers that together
/// contain every input file exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedSet {
    /// Files whose entire import closure is present.
    pub resolved: FileSet,
    /// Files linked against the subset of their imports that was available.
    pub partially_resolved: FileSet,
    /// Files kept without any dependency handles.
    pub unresolved: FileSet,
}

impl LinkedSet {
    /// All files across the three tiers as one set.
    pub fn file_set(&self) -> FileSet {
        self.resolved
            .union(&self.partially_resolved)
            .union(&self.unresolved)
    }

    /// Total number of files across the three tiers.
    pub fn len(&self) -> usize {
        self.resolved.len() + self.partially_resolved.len() + self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks a file up in any tier.
    pub fn find(&self, name: &str) -> Option<&Arc<LinkedFileDescriptor>> {
        self.resolved
            .find(name)
            .or_else(|| self.partially_resolved.find(name))
            .or_else(|| self.unresolved.find(name))
    }
}

/// Links a flat list of unlinked file descriptors.
///
/// Duplicate file names are deduplicated up front, first occurrence wins.
/// Every surviving file is validated before any linking happens; a single
/// invalid file fails the whole operation.
pub fn link(files: Vec<RawFileDescriptor>) -> Result<LinkedSet, LinkError> {
    let mut pending: Vec<RawFileDescriptor> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for file in files {
        let name = file.name.clone().unwrap_or_default();
        if seen.insert(name) {
            pending.push(file);
        }
    }

    for file in &pending {
        validate::validate_file(file)?;
    }
    debug!(files = pending.len(), "linking descriptor files");

    let mut set = LinkedSet::default();

    // Phase 1: files with no imports.
    pending.retain(|file| {
        if file.dependency.is_empty() {
            set.resolved
                .add(Arc::new(LinkedFileDescriptor::new(file.clone(), Vec::new())));
            false
        } else {
            true
        }
    });
    debug!(resolved = set.resolved.len(), "link phase 1 complete");

    // Phase 2: files whose imports are all fully linked, to a fixed point.
    loop {
        let mut progressed = false;
        pending.retain(|file| {
            let deps: Vec<_> = file
                .dependency
                .iter()
                .filter_map(|name| set.resolved.find(name).cloned())
                .collect();
            if deps.len() == file.dependency.len() {
                set.resolved
                    .add(Arc::new(LinkedFileDescriptor::new(file.clone(), deps)));
                progressed = true;
                false
            } else {
                true
            }
        });
        if !progressed {
            break;
        }
    }
    debug!(resolved = set.resolved.len(), "link phase 2 complete");

    // Phase 3: files with at least one linked import, to a fixed point. The
    // dependency list is committed on first visit; handles that become
    // available in a later iteration are not retrofitted.
    loop {
        let mut progressed = false;
        pending.retain(|file| {
            let deps: Vec<_> = file
                .dependency
                .iter()
                .filter_map(|name| {
                    set.resolved
                        .find(name)
                        .or_else(|| set.partially_resolved.find(name))
                        .cloned()
                })
                .collect();
            if deps.is_empty() {
                true
            } else {
                set.partially_resolved
                    .add(Arc::new(LinkedFileDescriptor::new(file.clone(), deps)));
                progressed = true;
                false
            }
        });
        if !progressed {
            break;
        }
    }
    debug!(
        partially_resolved = set.partially_resolved.len(),
        "link phase 3 complete"
    );

    // Phase 4: whatever is left, in input order, with no dependency handles.
    for file in pending {
        set.unresolved
            .add(Arc::new(LinkedFileDescriptor::new(file, Vec::new())));
    }
    debug!(
        resolved = set.resolved.len(),
        partially_resolved = set.partially_resolved.len(),
        unresolved = set.unresolved.len(),
        "link complete"
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, deps: &[&str]) -> RawFileDescriptor {
        RawFileDescriptor {
            name: Some(name.to_owned()),
            dependency: deps.iter().map(|d| (*d).to_owned()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn standalone_file_links_fully() {
        let set = link(vec![raw("a.proto", &[])]).expect("link");
        assert_eq!(set.resolved.len(), 1);
        assert!(set.partially_resolved.is_empty());
        assert!(set.unresolved.is_empty());
        let a = set.resolved.find("a.proto").expect("a");
        assert!(a.is_fully_linked());
    }

    #[test]
    fn chain_resolves_in_any_input_order() {
        for files in [
            vec![raw("a.proto", &[]), raw("b.proto", &["a.proto"])],
            vec![raw("b.proto", &["a.proto"]), raw("a.proto", &[])],
        ] {
            let set = link(files).expect("link");
            assert_eq!(set.resolved.len(), 2);
            let b = set.resolved.find("b.proto").expect("b");
            assert_eq!(b.dependencies().len(), 1);
            assert_eq!(b.dependencies()[0].name(), "a.proto");
        }
    }

    #[test]
    fn file_with_missing_import_is_unresolved() {
        let set = link(vec![raw("b.proto", &["a.proto"])]).expect("link");
        assert!(set.resolved.is_empty());
        assert!(set.partially_resolved.is_empty());
        assert_eq!(set.unresolved.len(), 1);
        let b = set.unresolved.find("b.proto").expect("b");
        assert!(b.dependencies().is_empty());
        assert_eq!(b.missing_dependencies(), vec!["a.proto"]);
    }

    #[test]
    fn partially_satisfied_import_list_links_partially() {
        let set = link(vec![
            raw("a.proto", &[]),
            raw("c.proto", &["a.proto", "missing.proto"]),
        ])
        .expect("link");
        assert_eq!(set.resolved.len(), 1);
        assert_eq!(set.partially_resolved.len(), 1);
        let c = set.partially_resolved.find("c.proto").expect("c");
        assert!(!c.is_fully_linked());
        assert_eq!(c.dependencies().len(), 1);
        assert_eq!(c.missing_dependencies(), vec!["missing.proto"]);
    }

    #[test]
    fn every_input_lands_in_exactly_one_tier() {
        let set = link(vec![
            raw("a.proto", &[]),
            raw("b.proto", &["a.proto"]),
            raw("c.proto", &["a.proto", "missing.proto"]),
            raw("d.proto", &["missing.proto"]),
        ])
        .expect("link");
        assert_eq!(set.len(), 4);
        assert_eq!(set.resolved.len(), 2);
        assert_eq!(set.partially_resolved.len(), 1);
        assert_eq!(set.unresolved.len(), 1);
        for name in ["a.proto", "b.proto", "c.proto", "d.proto"] {
            let tiers = [
                set.resolved.contains(name),
                set.partially_resolved.contains(name),
                set.unresolved.contains(name),
            ];
            assert_eq!(tiers.iter().filter(|hit| **hit).count(), 1, "{name}");
        }
    }

    #[test]
    fn import_cycles_drain_to_unresolved() {
        let set = link(vec![
            raw("x.proto", &["y.proto"]),
            raw("y.proto", &["x.proto"]),
        ])
        .expect("link");
        assert!(set.resolved.is_empty());
        assert!(set.partially_resolved.is_empty());
        assert_eq!(set.unresolved.len(), 2);
        assert_eq!(set.unresolved.names(), vec!["x.proto", "y.proto"]);
    }

    #[test]
    fn dependency_list_is_committed_on_first_visit() {
        // c is visited before b becomes available, so c keeps only a.
        let set = link(vec![
            raw("c.proto", &["b.proto", "a.proto"]),
            raw("b.proto", &["a.proto", "missing.proto"]),
            raw("a.proto", &[]),
        ])
        .expect("link");
        let c = set.partially_resolved.find("c.proto").expect("c");
        assert_eq!(c.dependencies().len(), 1);
        assert_eq!(c.dependencies()[0].name(), "a.proto");
        assert!(set.partially_resolved.contains("b.proto"));
    }

    #[test]
    fn duplicate_input_names_are_deduplicated_first_wins() {
        let mut first = raw("a.proto", &[]);
        first.package = Some("one".to_owned());
        let mut second = raw("a.proto", &[]);
        second.package = Some("two".to_owned());
        let set = link(vec![first, second]).expect("link");
        assert_eq!(set.len(), 1);
        let a = set.resolved.find("a.proto").expect("a");
        assert_eq!(a.raw().package.as_deref(), Some("one"));
    }

    #[test]
    fn a_single_invalid_file_fails_the_whole_link() {
        let invalid = RawFileDescriptor::default();
        let err = link(vec![raw("a.proto", &[]), invalid]).expect_err("should fail");
        assert!(matches!(err, LinkError::Validation { .. }));
    }

    #[test]
    fn relinking_extracted_raws_is_idempotent() {
        let files = vec![
            raw("a.proto", &[]),
            raw("b.proto", &["a.proto"]),
            raw("c.proto", &["missing.proto"]),
        ];
        let first = link(files).expect("first link");
        let raws: Vec<_> = first
            .file_set()
            .files()
            .map(|file| file.raw().clone())
            .collect();
        let second = link(raws).expect("second link");
        assert_eq!(first.resolved.names(), second.resolved.names());
        assert_eq!(first.unresolved.names(), second.unresolved.names());
    }
}
