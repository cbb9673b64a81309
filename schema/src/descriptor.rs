//! Owned descriptor structs mirroring the binary descriptor-set envelope.
//!
//! These decode directly from the wire with `prost`. Every `options` field is
//! deliberately declared as raw bytes rather than a structured message: an
//! options block may carry custom extensions that are only decodable against
//! a caller-supplied registry, and keeping the serialized block intact is
//! what makes "explicitly set" distinguishable from "happens to equal the
//! default" (see [`crate::options`]).

use crate::options;
use crate::MAP_ENTRY_OPTION;

/// The envelope: an ordered list of unlinked file declarations.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileDescriptorSet {
    #[prost(message, repeated, tag = "1")]
    pub file: Vec<RawFileDescriptor>,
}

/// One unlinked schema-file declaration, exactly as decoded from bytes.
///
/// Holds its own canonical name, declared package, the names of the files it
/// imports, and its nested type declarations. Immutable once decoded; the
/// linker turns it into a [`crate::LinkedFileDescriptor`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RawFileDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub package: Option<String>,
    /// Canonical names of imported files, in declaration order.
    #[prost(string, repeated, tag = "3")]
    pub dependency: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    pub message_type: Vec<MessageDescriptor>,
    #[prost(message, repeated, tag = "5")]
    pub enum_type: Vec<EnumDescriptor>,
    #[prost(message, repeated, tag = "6")]
    pub service: Vec<ServiceDescriptor>,
    /// Raw serialized file options block, extensions preserved.
    #[prost(bytes = "vec", optional, tag = "8")]
    pub options: Option<Vec<u8>>,
    /// Source-position metadata; absent unless the compiler was asked to
    /// retain it. Comment lookups require it.
    #[prost(message, optional, tag = "9")]
    pub source_code_info: Option<SourceCodeInfo>,
    #[prost(string, optional, tag = "12")]
    pub syntax: Option<String>,
}

/// A message declaration, possibly nested.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessageDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub field: Vec<FieldDescriptor>,
    #[prost(message, repeated, tag = "3")]
    pub nested_type: Vec<MessageDescriptor>,
    #[prost(message, repeated, tag = "4")]
    pub enum_type: Vec<EnumDescriptor>,
    /// Raw serialized message options block.
    #[prost(bytes = "vec", optional, tag = "7")]
    pub options: Option<Vec<u8>>,
    #[prost(message, repeated, tag = "8")]
    pub oneof_decl: Vec<OneofDescriptor>,
}

impl MessageDescriptor {
    /// Whether this is the synthetic wrapper type a schema compiler generates
    /// for a `map<K, V>` field, per the standard `map_entry` option bit.
    pub fn is_map_entry(&self) -> bool {
        self.options
            .as_deref()
            .and_then(|bytes| options::bool_value(bytes, MAP_ENTRY_OPTION))
            .unwrap_or(false)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OneofDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
}

/// A field declaration inside a message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(int32, optional, tag = "3")]
    pub number: Option<i32>,
    #[prost(enumeration = "FieldLabel", optional, tag = "4")]
    pub label: Option<i32>,
    #[prost(enumeration = "FieldType", optional, tag = "5")]
    pub type_: Option<i32>,
    /// For message and enum fields: the fully-qualified referenced type,
    /// with a leading dot.
    #[prost(string, optional, tag = "6")]
    pub type_name: Option<String>,
    /// Raw serialized field options block.
    #[prost(bytes = "vec", optional, tag = "8")]
    pub options: Option<Vec<u8>>,
    #[prost(int32, optional, tag = "9")]
    pub oneof_index: Option<i32>,
    #[prost(string, optional, tag = "10")]
    pub json_name: Option<String>,
    #[prost(bool, optional, tag = "17")]
    pub proto3_optional: Option<bool>,
}

impl FieldDescriptor {
    /// The declared label, if it carries a known value.
    pub fn label_kind(&self) -> Option<FieldLabel> {
        self.label.and_then(|v| FieldLabel::try_from(v).ok())
    }

    /// The declared wire type, if it carries a known value.
    pub fn type_kind(&self) -> Option<FieldType> {
        self.type_.and_then(|v| FieldType::try_from(v).ok())
    }

    pub fn is_repeated(&self) -> bool {
        self.label_kind() == Some(FieldLabel::Repeated)
    }

    /// The referenced type name without the leading dot, for message and
    /// enum fields.
    pub fn referenced_type(&self) -> Option<&str> {
        self.type_name.as_deref().map(|n| n.trim_start_matches('.'))
    }
}

/// Field cardinality labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FieldLabel {
    Optional = 1,
    Required = 2,
    Repeated = 3,
}

/// Declared wire types of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FieldType {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl FieldType {
    /// True for every type that is neither a message nor an enum reference.
    /// Groups count as messages for classification purposes.
    pub fn is_scalar(self) -> bool {
        !matches!(self, FieldType::Message | FieldType::Group | FieldType::Enum)
    }
}

/// An enum declaration, top-level or nested.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub value: Vec<EnumValueDescriptor>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub options: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EnumValueDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub number: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub options: Option<Vec<u8>>,
}

/// A service declaration with its methods.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(message, repeated, tag = "2")]
    pub method: Vec<MethodDescriptor>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub options: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MethodDescriptor {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub input_type: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub output_type: Option<String>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub options: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "5")]
    pub client_streaming: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub server_streaming: Option<bool>,
}

/// Source-position metadata attached to a file declaration.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourceCodeInfo {
    #[prost(message, repeated, tag = "1")]
    pub location: Vec<Location>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Location {
    /// Path of field numbers and indexes identifying a declaration.
    #[prost(int32, repeated, tag = "1")]
    pub path: Vec<i32>,
    #[prost(int32, repeated, tag = "2")]
    pub span: Vec<i32>,
    #[prost(string, optional, tag = "3")]
    pub leading_comments: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub trailing_comments: Option<String>,
    #[prost(string, repeated, tag = "6")]
    pub leading_detached_comments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The derives supply Default and TryFrom<i32>; the classification
    // helpers lean on both.
    #[test]
    fn enumeration_defaults_are_the_first_declared_value() {
        assert_eq!(FieldLabel::default(), FieldLabel::Optional);
        assert_eq!(FieldType::default(), FieldType::Double);
    }

    #[test]
    fn unknown_enumeration_values_read_back_as_none() {
        let field = FieldDescriptor {
            label: Some(99),
            type_: Some(-1),
            ..Default::default()
        };
        assert_eq!(field.label_kind(), None);
        assert_eq!(field.type_kind(), None);
        assert!(!field.is_repeated());

        let known = FieldDescriptor {
            label: Some(FieldLabel::Repeated as i32),
            type_: Some(FieldType::Sint64 as i32),
            ..Default::default()
        };
        assert_eq!(known.label_kind(), Some(FieldLabel::Repeated));
        assert_eq!(known.type_kind(), Some(FieldType::Sint64));
        assert!(known.is_repeated());
    }
}
