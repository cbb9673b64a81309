//! Linked file descriptors: raw declarations plus resolved imports.

use std::sync::Arc;

use crate::descriptor::RawFileDescriptor;

/// A [`RawFileDescriptor`] with resolved references to the linked descriptor
/// of each dependency the linker could satisfy.
///
/// Built exactly once per file and never mutated afterwards. References point
/// strictly downward (file → import); the linker's phase ordering guarantees
/// the graph is acyclic even for cyclic inputs, because every file is built
/// against files built before it.
#[derive(Clone, PartialEq)]
pub struct LinkedFileDescriptor {
    raw: RawFileDescriptor,
    dependencies: Vec<Arc<LinkedFileDescriptor>>,
}

impl LinkedFileDescriptor {
    pub fn new(raw: RawFileDescriptor, dependencies: Vec<Arc<LinkedFileDescriptor>>) -> Self {
        LinkedFileDescriptor { raw, dependencies }
    }

    /// The canonical file name, e.g. `acme/orders/order.proto`.
    pub fn name(&self) -> &str {
        self.raw.name.as_deref().unwrap_or_default()
    }

    pub fn package(&self) -> &str {
        self.raw.package.as_deref().unwrap_or_default()
    }

    pub fn raw(&self) -> &RawFileDescriptor {
        &self.raw
    }

    /// The dependencies that were actually resolved, in import order.
    pub fn dependencies(&self) -> &[Arc<LinkedFileDescriptor>] {
        &self.dependencies
    }

    pub fn dependency(&self, name: &str) -> Option<&Arc<LinkedFileDescriptor>> {
        self.dependencies.iter().find(|d| d.name() == name)
    }

    /// Whether every declared import was resolved.
    pub fn is_fully_linked(&self) -> bool {
        self.dependencies.len() == self.raw.dependency.len()
    }

    /// Declared import names that the linker could not satisfy.
    pub fn missing_dependencies(&self) -> Vec<&str> {
        self.raw
            .dependency
            .iter()
            .map(String::as_str)
            .filter(|name| self.dependency(name).is_none())
            .collect()
    }
}

impl std::fmt::Debug for LinkedFileDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedFileDescriptor")
            .field("name", &self.name())
            .field(
                "dependencies",
                &self.dependencies.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
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
    fn tracks_missing_dependencies() {
        let base = Arc::new(LinkedFileDescriptor::new(raw("base.proto", &[]), Vec::new()));
        let partial = LinkedFileDescriptor::new(
            raw("thing.proto", &["base.proto", "absent.proto"]),
            vec![base],
        );

        assert!(!partial.is_fully_linked());
        assert_eq!(partial.missing_dependencies(), vec!["absent.proto"]);
        assert!(partial.dependency("base.proto").is_some());
    }
}
