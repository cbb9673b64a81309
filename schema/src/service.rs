//! Service wrappers.

use std::sync::Arc;

use crate::descriptor::{MethodDescriptor, ServiceDescriptor};
use crate::linked::LinkedFileDescriptor;

/// A service declaration plus its owning linked file.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceType {
    file: Arc<LinkedFileDescriptor>,
    descriptor: ServiceDescriptor,
    qualified_name: String,
}

impl ServiceType {
    pub(crate) fn new(
        file: Arc<LinkedFileDescriptor>,
        descriptor: &ServiceDescriptor,
        qualified_name: String,
    ) -> Self {
        ServiceType {
            file,
            descriptor: descriptor.clone(),
            qualified_name,
        }
    }

    pub fn file(&self) -> &Arc<LinkedFileDescriptor> {
        &self.file
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn simple_name(&self) -> &str {
        self.descriptor.name.as_deref().unwrap_or_default()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Declared methods, in declaration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.descriptor.method
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.descriptor
            .method
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
    }
}
