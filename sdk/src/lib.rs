//! protolink
//!
//! This crate is the single entry point for consumers of the linker:
//!
//! - Loading descriptor-set files and reference catalogs from disk
//! - Linking them into `resolved` / `partially_resolved` / `unresolved` tiers
//! - Indexing the linked files into a [`TypeSet`] of messages, enums, and
//!   services
//! - Summarizing a link outcome as JSON

use std::path::Path;

use serde::Serialize;

pub use protolink_linker::error::LinkError;
pub use protolink_linker::linker::{link, LinkedSet};
pub use protolink_schema::{
    ExtensionRegistry, FieldDeclaration, FileSet, LinkedFileDescriptor, MessageType, Type, TypeSet,
};

/// Reads the given descriptor-set files and links their contents.
pub fn load_and_link<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
) -> Result<LinkedSet, LinkError> {
    let files = protolink_linker::loader::load_descriptor_sets(paths)?;
    link(files)
}

/// Reads the given reference catalogs, loads every descriptor set they
/// name, and links the union.
pub fn load_catalogs_and_link<P: AsRef<Path>>(
    catalogs: impl IntoIterator<Item = P>,
) -> Result<LinkedSet, LinkError> {
    let files = protolink_linker::catalog::load_catalogs(catalogs)?;
    link(files)
}

/// Indexes every file of a link outcome, across all three tiers, into a
/// [`TypeSet`].
pub fn type_set(linked: &LinkedSet) -> TypeSet {
    TypeSet::from_file_set(&linked.file_set())
}

/// A serializable account of one link outcome.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinkSummary {
    pub resolved: Vec<String>,
    pub partially_resolved: Vec<String>,
    pub unresolved: Vec<String>,
}

impl LinkSummary {
    pub fn of(linked: &LinkedSet) -> Self {
        let names = |set: &FileSet| set.names().iter().map(|n| (*n).to_owned()).collect();
        LinkSummary {
            resolved: names(&linked.resolved),
            partially_resolved: names(&linked.partially_resolved),
            unresolved: names(&linked.unresolved),
        }
    }
}

/// Renders a link outcome as pretty-printed JSON.
pub fn summary_json(linked: &LinkedSet) -> String {
    serde_json::to_string_pretty(&LinkSummary::of(linked)).unwrap()
}

pub mod loader {
    pub use protolink_linker::loader::{load_descriptor_sets, parse, read_descriptor_set, try_parse};
}

pub mod catalog {
    pub use protolink_linker::catalog::{append_entry, load_catalogs, CATALOG_NAME};
}

pub mod comments {
    pub use protolink_linker::comments::{
        detached_comments, leading_comment, trailing_comment, CommentPath,
    };
}

pub mod schema {
    pub use protolink_schema::known;
    pub use protolink_schema::{
        EntityKind, EntityOption, EnumDescriptor, EnumType, EnumValueDescriptor, ExtensionDef,
        ExtensionRegistry, FieldCategory, FieldDeclaration, FieldDescriptor, FileSet,
        LinkedFileDescriptor, MessageDescriptor, MessageType, OptionsWriter, RawFileDescriptor,
        ServiceDescriptor, ServiceType, Type, TypeSet,
    };
}
