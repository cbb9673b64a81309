//! Field wrappers and their semantic classification.

use crate::descriptor::{FieldDescriptor, FieldType};
use crate::known;
use crate::message::MessageType;
use crate::naming;
use crate::options::{ExtensionRegistry, OptionExt};
use crate::ANY_TYPE_NAME;

const COLUMN: OptionExt<bool, FieldDescriptor> = OptionExt::new(known::COLUMN_OPTION);

/// The wire category of a field, in classification priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCategory {
    /// Structurally repeated with a synthetic entry element type.
    Map,
    /// Repeated and not a map.
    Repeated,
    /// Singular reference to the well-known `Any` type.
    Any,
    /// Singular message reference.
    Message,
    /// Singular enum reference.
    Enum,
    /// Singular scalar.
    Scalar,
}

/// One field viewed in the context of its declaring message.
///
/// The declaring [`MessageType`] is fixed at construction and never
/// re-parented.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDeclaration {
    message: MessageType,
    index: usize,
}

impl FieldDeclaration {
    pub(crate) fn new(message: MessageType, index: usize) -> Self {
        FieldDeclaration { message, index }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.message.descriptor().field[self.index]
    }

    pub fn declaring_message(&self) -> &MessageType {
        &self.message
    }

    pub fn name(&self) -> &str {
        self.descriptor().name.as_deref().unwrap_or_default()
    }

    /// Zero-based declaration index within the message.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The declared field number.
    pub fn number(&self) -> i32 {
        self.descriptor().number.unwrap_or_default()
    }

    pub fn json_name(&self) -> &str {
        self.descriptor().json_name.as_deref().unwrap_or_default()
    }

    /// Whether this field is a `map<K, V>`: repeated, message-typed, and its
    /// element type is the sibling entry message generated for this field.
    pub fn is_map(&self) -> bool {
        if !self.descriptor().is_repeated() || !self.is_message_type() {
            return false;
        }
        let entry_name = naming::map_entry_name(self.name());
        let references_entry = self
            .descriptor()
            .referenced_type()
            .map(|t| naming::simple_name(t) == entry_name)
            .unwrap_or(false);
        references_entry
            && self
                .message
                .descriptor()
                .nested_type
                .iter()
                .any(|nested| nested.name.as_deref() == Some(entry_name.as_str()) && nested.is_map_entry())
    }

    /// Repeated and not a map.
    pub fn is_repeated(&self) -> bool {
        self.descriptor().is_repeated() && !self.is_map()
    }

    /// Map or repeated.
    pub fn is_collection(&self) -> bool {
        self.descriptor().is_repeated()
    }

    pub fn is_singular(&self) -> bool {
        !self.is_collection()
    }

    fn is_message_type(&self) -> bool {
        matches!(
            self.descriptor().type_kind(),
            Some(FieldType::Message) | Some(FieldType::Group)
        )
    }

    /// Singular message reference (includes `Any`).
    pub fn is_message(&self) -> bool {
        self.is_singular() && self.is_message_type()
    }

    /// Singular reference to the well-known `Any` type.
    pub fn is_any(&self) -> bool {
        self.is_message()
            && self.descriptor().referenced_type() == Some(ANY_TYPE_NAME)
    }

    pub fn is_enum(&self) -> bool {
        self.is_singular() && self.descriptor().type_kind() == Some(FieldType::Enum)
    }

    pub fn is_scalar(&self) -> bool {
        self.is_singular()
            && self
                .descriptor()
                .type_kind()
                .map(FieldType::is_scalar)
                .unwrap_or(false)
    }

    pub fn category(&self) -> FieldCategory {
        if self.is_map() {
            FieldCategory::Map
        } else if self.is_collection() {
            FieldCategory::Repeated
        } else if self.is_any() {
            FieldCategory::Any
        } else if self.is_message_type() {
            FieldCategory::Message
        } else if self.descriptor().type_kind() == Some(FieldType::Enum) {
            FieldCategory::Enum
        } else {
            FieldCategory::Scalar
        }
    }

    /// Whether this field identifies the entity its message declares: the
    /// first declared field, singular, on a message with a non-default
    /// entity kind.
    pub fn is_entity_id(&self, registry: &ExtensionRegistry) -> bool {
        self.index == 0 && self.is_singular() && self.message.is_entity(registry)
    }

    /// The broader identifier rule: an entity id, or the first singular
    /// field of a message declared in a commands file.
    pub fn is_id(&self, registry: &ExtensionRegistry) -> bool {
        if self.is_entity_id(registry) {
            return true;
        }
        self.index == 0
            && self.is_singular()
            && naming::is_commands_file(self.message.file().name())
    }

    /// Whether this field is declared as a queryable column.
    ///
    /// An identifier cannot also be a column; that combination is a schema
    /// authoring error and fails fast.
    pub fn is_column(&self, registry: &ExtensionRegistry) -> bool {
        let declared = COLUMN.value_from(self.descriptor(), registry) == Some(true);
        if declared {
            assert!(
                !self.is_entity_id(registry),
                "field `{}.{}` is declared both as the entity id and as a column",
                self.message.qualified_name(),
                self.name(),
            );
        }
        declared
    }
}
