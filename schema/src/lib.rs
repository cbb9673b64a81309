//! Data model for linked protobuf descriptor sets.
//!
//! This crate holds the owned descriptor structs decoded from a binary
//! `FileDescriptorSet` envelope, the [`LinkedFileDescriptor`] produced by the
//! linker, the [`FileSet`]/[`TypeSet`] registries that index linked files and
//! the types they declare, and the message/field type model that code
//! generators query.
//!
//! ```
//! use protolink_schema::*;
//! use std::sync::Arc;
//!
//! let raw = RawFileDescriptor {
//!     name: Some("acme/thing.proto".to_owned()),
//!     package: Some("acme".to_owned()),
//!     ..Default::default()
//! };
//! let mut set = FileSet::new();
//! assert!(set.add(Arc::new(LinkedFileDescriptor::new(raw, Vec::new()))));
//! assert!(set.contains("acme/thing.proto"));
//! ```

pub mod descriptor;
pub mod enum_type;
pub mod field;
pub mod file_set;
pub mod linked;
pub mod message;
pub mod naming;
pub mod options;
pub mod service;
pub mod type_set;

pub use descriptor::*;
pub use enum_type::EnumType;
pub use field::{FieldCategory, FieldDeclaration};
pub use file_set::FileSet;
pub use linked::LinkedFileDescriptor;
pub use message::MessageType;
pub use options::{
    EntityKind, EntityOption, ExtensionDef, ExtensionRegistry, HolderKind, OptionExt,
    OptionValue, OptionsWriter, RawOptionValue,
};
pub use service::ServiceType;
pub use type_set::{Type, TypeSet};

/// Fully-qualified name of the well-known `Any` wrapper type.
pub const ANY_TYPE_NAME: &str = "google.protobuf.Any";

/// Suffix of the synthetic message a schema compiler generates per map field.
pub const MAP_ENTRY_SUFFIX: &str = "Entry";

/// Tag of the standard `map_entry` bool on a message options block.
pub const MAP_ENTRY_OPTION: u32 = 7;

/// Well-known custom option tags consumed by the type model.
///
/// These sit in the user extension range of the respective options blocks and
/// are pre-registered by [`ExtensionRegistry::with_known_options`].
pub mod known {
    /// `(entity)` on message options: structural entity classification.
    pub const ENTITY_OPTION: u32 = 56_001;
    /// `(column)` on field options: queryable non-identifier field.
    pub const COLUMN_OPTION: u32 = 56_002;
}
