//! Enum wrappers.

use std::sync::Arc;

use crate::descriptor::{EnumDescriptor, EnumValueDescriptor};
use crate::linked::LinkedFileDescriptor;

/// An enum declaration plus its owning linked file.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumType {
    file: Arc<LinkedFileDescriptor>,
    descriptor: EnumDescriptor,
    qualified_name: String,
}

impl EnumType {
    pub(crate) fn new(
        file: Arc<LinkedFileDescriptor>,
        descriptor: &EnumDescriptor,
        qualified_name: String,
    ) -> Self {
        EnumType {
            file,
            descriptor: descriptor.clone(),
            qualified_name,
        }
    }

    pub fn file(&self) -> &Arc<LinkedFileDescriptor> {
        &self.file
    }

    pub fn descriptor(&self) -> &EnumDescriptor {
        &self.descriptor
    }

    pub fn simple_name(&self) -> &str {
        self.descriptor.name.as_deref().unwrap_or_default()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Declared values, in declaration order.
    pub fn values(&self) -> &[EnumValueDescriptor] {
        &self.descriptor.value
    }

    pub fn value(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.descriptor
            .value
            .iter()
            .find(|v| v.name.as_deref() == Some(name))
    }
}
