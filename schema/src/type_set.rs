//! The index of types declared across a [`FileSet`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use crate::enum_type::EnumType;
use crate::file_set::FileSet;
use crate::linked::LinkedFileDescriptor;
use crate::message::MessageType;
use crate::naming;
use crate::service::ServiceType;

/// One entry of a [`TypeSet`].
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Message(MessageType),
    Enum(EnumType),
    Service(ServiceType),
}

impl Type {
    pub fn qualified_name(&self) -> &str {
        match self {
            Type::Message(m) => m.qualified_name(),
            Type::Enum(e) => e.qualified_name(),
            Type::Service(s) => s.qualified_name(),
        }
    }
}

/// Message, enum, and service types declared across a set of linked files,
/// keyed by fully-qualified type name.
///
/// Synthetic map-entry messages are not indexed. Mutation always produces a
/// new set; a name present in a set is stable for the lifetime of that set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeSet {
    messages: BTreeMap<String, MessageType>,
    enums: BTreeMap<String, EnumType>,
    services: BTreeMap<String, ServiceType>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every type declared by every file of `files`, descending into
    /// nested messages and enums at any depth.
    pub fn from_file_set(files: &FileSet) -> Self {
        let mut set = Self::new();
        for file in files.files() {
            set.index_file(file);
        }
        set
    }

    fn index_file(&mut self, file: &Arc<LinkedFileDescriptor>) {
        let package = file.package().to_owned();

        let mut queue: VecDeque<MessageType> = file
            .raw()
            .message_type
            .iter()
            .filter(|m| !m.is_map_entry())
            .map(|m| MessageType::top_level(Arc::clone(file), m))
            .collect();
        while let Some(message) = queue.pop_front() {
            for nested_enum in &message.descriptor().enum_type {
                let qualified = format!(
                    "{}.{}",
                    message.qualified_name(),
                    nested_enum.name.as_deref().unwrap_or_default()
                );
                self.enums
                    .insert(qualified.clone(), EnumType::new(Arc::clone(file), nested_enum, qualified));
            }
            queue.extend(message.immediate_nested());
            self.messages
                .insert(message.qualified_name().to_owned(), message);
        }

        for enum_descriptor in &file.raw().enum_type {
            let qualified = naming::qualify(
                &package,
                enum_descriptor.name.as_deref().unwrap_or_default(),
            );
            self.enums.insert(
                qualified.clone(),
                EnumType::new(Arc::clone(file), enum_descriptor, qualified),
            );
        }

        for service in &file.raw().service {
            let qualified =
                naming::qualify(&package, service.name.as_deref().unwrap_or_default());
            self.services.insert(
                qualified.clone(),
                ServiceType::new(Arc::clone(file), service, qualified),
            );
        }
    }

    /// A new set combining both operands kind by kind; on a name collision
    /// within a kind the operand's entry wins.
    pub fn union(&self, other: &TypeSet) -> TypeSet {
        let mut merged = self.clone();
        for (name, message) in &other.messages {
            merged.messages.insert(name.clone(), message.clone());
        }
        for (name, enum_type) in &other.enums {
            merged.enums.insert(name.clone(), enum_type.clone());
        }
        for (name, service) in &other.services {
            merged.services.insert(name.clone(), service.clone());
        }
        merged
    }

    pub fn find(&self, type_name: &str) -> Option<Type> {
        if let Some(message) = self.messages.get(type_name) {
            return Some(Type::Message(message.clone()));
        }
        if let Some(enum_type) = self.enums.get(type_name) {
            return Some(Type::Enum(enum_type.clone()));
        }
        self.services
            .get(type_name)
            .map(|service| Type::Service(service.clone()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.messages.contains_key(type_name)
            || self.enums.contains_key(type_name)
            || self.services.contains_key(type_name)
    }

    pub fn message_types(&self) -> impl Iterator<Item = &MessageType> {
        self.messages.values()
    }

    pub fn enum_types(&self) -> impl Iterator<Item = &EnumType> {
        self.enums.values()
    }

    pub fn service_types(&self) -> impl Iterator<Item = &ServiceType> {
        self.services.values()
    }

    /// Every indexed type, messages then enums then services, each kind in
    /// name order.
    pub fn all_types(&self) -> Vec<Type> {
        let mut all = Vec::with_capacity(self.size());
        all.extend(self.messages.values().cloned().map(Type::Message));
        all.extend(self.enums.values().cloned().map(Type::Enum));
        all.extend(self.services.values().cloned().map(Type::Service));
        all
    }

    pub fn size(&self) -> usize {
        self.messages.len() + self.enums.len() + self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
