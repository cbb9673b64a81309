//! Message wrappers: one declaration viewed in the context of its file.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::descriptor::MessageDescriptor;
use crate::field::FieldDeclaration;
use crate::known;
use crate::linked::LinkedFileDescriptor;
use crate::naming;
use crate::options::{EntityKind, EntityOption, ExtensionRegistry, OptionExt};

const ENTITY: OptionExt<EntityOption, MessageDescriptor> = OptionExt::new(known::ENTITY_OPTION);

/// A message declaration plus its owning linked file.
///
/// Carries the fully-qualified name and the nesting path so that nested
/// declarations can be addressed without parent back-references.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageType {
    file: Arc<LinkedFileDescriptor>,
    descriptor: MessageDescriptor,
    qualified_name: String,
    nesting_path: Vec<String>,
}

impl MessageType {
    /// Wraps a top-level message of `file`.
    pub fn top_level(file: Arc<LinkedFileDescriptor>, descriptor: &MessageDescriptor) -> Self {
        let simple = descriptor.name.clone().unwrap_or_default();
        let qualified_name = naming::qualify(file.package(), &simple);
        MessageType {
            file,
            descriptor: descriptor.clone(),
            qualified_name,
            nesting_path: vec![simple],
        }
    }

    /// Wraps a message declared directly inside `self`.
    fn child(&self, descriptor: &MessageDescriptor) -> Self {
        let simple = descriptor.name.clone().unwrap_or_default();
        let mut nesting_path = self.nesting_path.clone();
        nesting_path.push(simple.clone());
        MessageType {
            file: Arc::clone(&self.file),
            descriptor: descriptor.clone(),
            qualified_name: format!("{}.{}", self.qualified_name, simple),
            nesting_path,
        }
    }

    pub fn file(&self) -> &Arc<LinkedFileDescriptor> {
        &self.file
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    pub fn simple_name(&self) -> &str {
        self.descriptor.name.as_deref().unwrap_or_default()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Simple names from the outermost declaration down to this one.
    pub fn nesting_path(&self) -> &[String] {
        &self.nesting_path
    }

    /// The generated-class name a code generator derives for this message,
    /// nesting segments joined with dots.
    pub fn generated_class_name(&self) -> String {
        self.nesting_path.join(".")
    }

    /// The builder companion of the generated class.
    pub fn builder_name(&self) -> String {
        format!("{}.Builder", self.generated_class_name())
    }

    /// The fields declared on this message, in declaration order.
    pub fn fields(&self) -> Vec<FieldDeclaration> {
        (0..self.descriptor.field.len())
            .map(|index| FieldDeclaration::new(self.clone(), index))
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<FieldDeclaration> {
        self.descriptor
            .field
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
            .map(|index| FieldDeclaration::new(self.clone(), index))
    }

    /// Direct nested messages, excluding synthetic map-entry types.
    pub fn immediate_nested(&self) -> Vec<MessageType> {
        self.descriptor
            .nested_type
            .iter()
            .filter(|nested| !nested.is_map_entry())
            .map(|nested| self.child(nested))
            .collect()
    }

    /// All nested messages at any depth matching `predicate`, in
    /// breadth-first order. Every descendant is visited exactly once whether
    /// or not it matches.
    pub fn all_nested(&self, predicate: impl Fn(&MessageType) -> bool) -> Vec<MessageType> {
        let mut matched = Vec::new();
        let mut queue: VecDeque<MessageType> = self.immediate_nested().into();
        while let Some(nested) = queue.pop_front() {
            queue.extend(nested.immediate_nested());
            if predicate(&nested) {
                matched.push(nested);
            }
        }
        matched
    }

    /// The `(entity)` option, when explicitly set on this message.
    pub fn entity_option(&self, registry: &ExtensionRegistry) -> Option<EntityOption> {
        ENTITY.value_from(&self.descriptor, registry)
    }

    /// Whether this message carries an entity classification with a
    /// non-default kind.
    pub fn is_entity(&self, registry: &ExtensionRegistry) -> bool {
        self.entity_option(registry)
            .map(|option| option.kind_value() != EntityKind::Unspecified)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RawFileDescriptor;
    use crate::options::OptionsWriter;
    use crate::MAP_ENTRY_OPTION;

    fn message(name: &str, nested: Vec<MessageDescriptor>) -> MessageDescriptor {
        MessageDescriptor {
            name: Some(name.to_owned()),
            nested_type: nested,
            ..Default::default()
        }
    }

    fn wrap(descriptor: MessageDescriptor) -> MessageType {
        let file = Arc::new(LinkedFileDescriptor::new(
            RawFileDescriptor {
                name: Some("acme/tree.proto".to_owned()),
                package: Some("acme".to_owned()),
                message_type: vec![descriptor.clone()],
                ..Default::default()
            },
            Vec::new(),
        ));
        MessageType::top_level(file, &descriptor)
    }

    #[test]
    fn qualified_names_follow_nesting() {
        let root = wrap(message("Outer", vec![message("Inner", vec![message("Leaf", vec![])])]));
        assert_eq!(root.qualified_name(), "acme.Outer");

        let inner = &root.immediate_nested()[0];
        assert_eq!(inner.qualified_name(), "acme.Outer.Inner");
        assert_eq!(inner.generated_class_name(), "Outer.Inner");
        assert_eq!(inner.builder_name(), "Outer.Inner.Builder");
    }

    #[test]
    fn all_nested_visits_every_descendant_breadth_first() {
        let root = wrap(message(
            "Outer",
            vec![
                message("A", vec![message("Deep", vec![])]),
                message("B", vec![]),
            ],
        ));

        let all = root.all_nested(|_| true);
        let names: Vec<&str> = all.iter().map(MessageType::simple_name).collect();
        assert_eq!(names, vec!["A", "B", "Deep"]);

        // The predicate filters the result, not the walk.
        let deep_only = root.all_nested(|m| m.simple_name() == "Deep");
        assert_eq!(deep_only.len(), 1);
        assert_eq!(deep_only[0].qualified_name(), "acme.Outer.A.Deep");
    }

    #[test]
    fn immediate_nested_skips_map_entries() {
        let entry = MessageDescriptor {
            name: Some("CountsEntry".to_owned()),
            options: Some(
                OptionsWriter::new()
                    .bool_field(MAP_ENTRY_OPTION, true)
                    .finish(),
            ),
            ..Default::default()
        };
        let root = wrap(message("Holder", vec![entry, message("Real", vec![])]));
        let nested = root.immediate_nested();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].simple_name(), "Real");
    }
}
