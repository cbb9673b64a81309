//! Custom-option extraction from raw options blocks.
//!
//! Descriptors keep their options block as the serialized bytes the compiler
//! wrote, so an extension that was explicitly set is physically present in
//! the block even when its value equals the type's default. Extraction scans
//! the block for the extension's tag: presence of the tag is the "explicitly
//! set" bit, absence is `None`. Decoding is driven by an
//! [`ExtensionRegistry`] built once by the embedding build tool and passed in
//! by reference; an unregistered extension reads back as absent, never as an
//! error.

use std::collections::HashMap;
use std::marker::PhantomData;

use prost::bytes::{Buf, BufMut};
use prost::encoding::{decode_key, decode_varint, encode_key, encode_varint, WireType};

use crate::descriptor::{
    EnumDescriptor, EnumValueDescriptor, FieldDescriptor, MessageDescriptor, MethodDescriptor,
    RawFileDescriptor, ServiceDescriptor,
};

/// The kind of descriptor an options block is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HolderKind {
    File,
    Message,
    Field,
    Enum,
    EnumValue,
    Service,
    Method,
}

/// A registered extension: which options block it extends and under which tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionDef {
    pub holder: HolderKind,
    pub tag: u32,
    pub name: String,
}

impl ExtensionDef {
    pub fn new(holder: HolderKind, tag: u32, name: impl Into<String>) -> Self {
        ExtensionDef {
            holder,
            tag,
            name: name.into(),
        }
    }
}

/// An explicit, constructed-once registry of known extensions.
///
/// There is no process-wide registry; every consumer receives a reference to
/// the one the embedding tool assembled from its option providers.
#[derive(Clone, Debug, Default)]
pub struct ExtensionRegistry {
    defs: HashMap<(HolderKind, u32), ExtensionDef>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the options the type model consumes.
    pub fn with_known_options() -> Self {
        let mut registry = Self::new();
        registry.register(ExtensionDef::new(
            HolderKind::Message,
            crate::known::ENTITY_OPTION,
            "entity",
        ));
        registry.register(ExtensionDef::new(
            HolderKind::Field,
            crate::known::COLUMN_OPTION,
            "column",
        ));
        registry
    }

    /// Registers an extension. Returns `true` if newly inserted, `false` if
    /// an extension with the same holder and tag was already present and was
    /// left untouched.
    pub fn register(&mut self, def: ExtensionDef) -> bool {
        let key = (def.holder, def.tag);
        if self.defs.contains_key(&key) {
            return false;
        }
        self.defs.insert(key, def);
        true
    }

    pub fn contains(&self, holder: HolderKind, tag: u32) -> bool {
        self.defs.contains_key(&(holder, tag))
    }

    pub fn find(&self, holder: HolderKind, tag: u32) -> Option<&ExtensionDef> {
        self.defs.get(&(holder, tag))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Anything that carries a raw options block.
pub trait OptionHolder {
    const KIND: HolderKind;

    /// The serialized options block, if the declaration carried one.
    fn options_bytes(&self) -> Option<&[u8]>;
}

macro_rules! impl_option_holder {
    ($ty:ty, $kind:expr) => {
        impl OptionHolder for $ty {
            const KIND: HolderKind = $kind;

            fn options_bytes(&self) -> Option<&[u8]> {
                self.options.as_deref()
            }
        }
    };
}

impl_option_holder!(RawFileDescriptor, HolderKind::File);
impl_option_holder!(MessageDescriptor, HolderKind::Message);
impl_option_holder!(FieldDescriptor, HolderKind::Field);
impl_option_holder!(EnumDescriptor, HolderKind::Enum);
impl_option_holder!(EnumValueDescriptor, HolderKind::EnumValue);
impl_option_holder!(ServiceDescriptor, HolderKind::Service);
impl_option_holder!(MethodDescriptor, HolderKind::Method);

/// A single wire value found at an extension tag.
#[derive(Clone, Debug, PartialEq)]
pub enum RawOptionValue {
    Varint(u64),
    Fixed32(u32),
    Fixed64(u64),
    Bytes(Vec<u8>),
}

/// Conversion from a raw wire value into a typed option value.
pub trait OptionValue: Sized {
    fn from_raw(raw: RawOptionValue) -> Option<Self>;
}

impl OptionValue for bool {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Varint(v) => Some(v != 0),
            _ => None,
        }
    }
}

impl OptionValue for u32 {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Varint(v) => u32::try_from(v).ok(),
            RawOptionValue::Fixed32(v) => Some(v),
            _ => None,
        }
    }
}

impl OptionValue for u64 {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Varint(v) => Some(v),
            RawOptionValue::Fixed64(v) => Some(v),
            _ => None,
        }
    }
}

impl OptionValue for i32 {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Varint(v) => Some(v as i32),
            RawOptionValue::Fixed32(v) => Some(v as i32),
            _ => None,
        }
    }
}

impl OptionValue for i64 {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Varint(v) => Some(v as i64),
            RawOptionValue::Fixed64(v) => Some(v as i64),
            _ => None,
        }
    }
}

impl OptionValue for f32 {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Fixed32(v) => Some(f32::from_bits(v)),
            _ => None,
        }
    }
}

impl OptionValue for f64 {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Fixed64(v) => Some(f64::from_bits(v)),
            _ => None,
        }
    }
}

impl OptionValue for String {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Bytes(bytes) => String::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}

impl OptionValue for Vec<u8> {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        match raw {
            RawOptionValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Decodes a message-typed option payload. Message-typed extensions implement
/// [`OptionValue`] through this.
pub fn message_from_raw<M: prost::Message + Default>(raw: RawOptionValue) -> Option<M> {
    match raw {
        RawOptionValue::Bytes(bytes) => M::decode(bytes.as_slice()).ok(),
        _ => None,
    }
}

/// A stateless accessor for one extension on one kind of holder.
///
/// `value_from` yields the decoded value only when the extension bit was
/// explicitly set on the holder's options block.
pub struct OptionExt<T, H> {
    tag: u32,
    _value: PhantomData<fn() -> T>,
    _holder: PhantomData<fn() -> H>,
}

impl<T: OptionValue, H: OptionHolder> OptionExt<T, H> {
    pub const fn new(tag: u32) -> Self {
        OptionExt {
            tag,
            _value: PhantomData,
            _holder: PhantomData,
        }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Reads the extension value off the holder's options block.
    ///
    /// Absent when the holder has no options block, the extension is not in
    /// the registry, the tag is not present in the block, or the payload does
    /// not decode as `T`.
    pub fn value_from(&self, holder: &H, registry: &ExtensionRegistry) -> Option<T> {
        if !registry.contains(H::KIND, self.tag) {
            return None;
        }
        let bytes = holder.options_bytes()?;
        raw_value(bytes, self.tag).and_then(T::from_raw)
    }
}

impl<T, H> Clone for OptionExt<T, H> {
    fn clone(&self) -> Self {
        OptionExt {
            tag: self.tag,
            _value: PhantomData,
            _holder: PhantomData,
        }
    }
}

impl<T, H> Copy for OptionExt<T, H> {}

/// Scans a serialized options block for `tag` and returns the last value
/// recorded under it, following last-wins merge semantics for scalars.
///
/// Returns `None` for a malformed block; downstream a missing option and an
/// undecodable one are indistinguishable by design.
pub fn raw_value(bytes: &[u8], want: u32) -> Option<RawOptionValue> {
    let mut buf = bytes;
    let mut found = None;
    while buf.has_remaining() {
        let (tag, wire_type) = decode_key(&mut buf).ok()?;
        match wire_type {
            WireType::Varint => {
                let value = decode_varint(&mut buf).ok()?;
                if tag == want {
                    found = Some(RawOptionValue::Varint(value));
                }
            }
            WireType::ThirtyTwoBit => {
                if buf.remaining() < 4 {
                    return None;
                }
                let value = buf.get_u32_le();
                if tag == want {
                    found = Some(RawOptionValue::Fixed32(value));
                }
            }
            WireType::SixtyFourBit => {
                if buf.remaining() < 8 {
                    return None;
                }
                let value = buf.get_u64_le();
                if tag == want {
                    found = Some(RawOptionValue::Fixed64(value));
                }
            }
            WireType::LengthDelimited => {
                let len = decode_varint(&mut buf).ok()? as usize;
                if buf.remaining() < len {
                    return None;
                }
                if tag == want {
                    found = Some(RawOptionValue::Bytes(buf.chunk()[..len].to_vec()));
                }
                buf.advance(len);
            }
            // Group-encoded options do not occur in descriptor sets.
            WireType::StartGroup | WireType::EndGroup => return None,
        }
    }
    found
}

/// Convenience lookup for standard bool options such as `map_entry`.
pub fn bool_value(bytes: &[u8], tag: u32) -> Option<bool> {
    raw_value(bytes, tag).and_then(bool::from_raw)
}

/// Builds serialized options blocks, field by field.
///
/// The writing counterpart of [`raw_value`]; used by tests and by tools that
/// synthesize descriptors.
#[derive(Debug, Default)]
pub struct OptionsWriter {
    buffer: Vec<u8>,
}

impl OptionsWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool_field(mut self, tag: u32, value: bool) -> Self {
        encode_key(tag, WireType::Varint, &mut self.buffer);
        encode_varint(u64::from(value), &mut self.buffer);
        self
    }

    pub fn varint_field(mut self, tag: u32, value: u64) -> Self {
        encode_key(tag, WireType::Varint, &mut self.buffer);
        encode_varint(value, &mut self.buffer);
        self
    }

    pub fn string_field(mut self, tag: u32, value: &str) -> Self {
        encode_key(tag, WireType::LengthDelimited, &mut self.buffer);
        encode_varint(value.len() as u64, &mut self.buffer);
        self.buffer.put_slice(value.as_bytes());
        self
    }

    pub fn bytes_field(mut self, tag: u32, value: &[u8]) -> Self {
        encode_key(tag, WireType::LengthDelimited, &mut self.buffer);
        encode_varint(value.len() as u64, &mut self.buffer);
        self.buffer.put_slice(value);
        self
    }

    pub fn message_field<M: prost::Message>(mut self, tag: u32, value: &M) -> Self {
        let payload = value.encode_to_vec();
        encode_key(tag, WireType::LengthDelimited, &mut self.buffer);
        encode_varint(payload.len() as u64, &mut self.buffer);
        self.buffer.put_slice(&payload);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

/// Payload of the `(entity)` message option: the structural classification of
/// the message within its bounded context.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EntityOption {
    #[prost(enumeration = "EntityKind", optional, tag = "1")]
    pub kind: Option<i32>,
}

impl EntityOption {
    pub fn kind_value(&self) -> EntityKind {
        self.kind
            .and_then(|v| EntityKind::try_from(v).ok())
            .unwrap_or(EntityKind::Unspecified)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EntityKind {
    Unspecified = 0,
    Entity = 1,
    Aggregate = 2,
    Projection = 3,
}

impl OptionValue for EntityOption {
    fn from_raw(raw: RawOptionValue) -> Option<Self> {
        message_from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::known;

    fn field_with_options(options: Vec<u8>) -> FieldDescriptor {
        FieldDescriptor {
            name: Some("status".to_owned()),
            number: Some(2),
            options: Some(options),
            ..Default::default()
        }
    }

    #[test]
    fn explicit_false_is_present_and_unset_is_absent() {
        let registry = ExtensionRegistry::with_known_options();
        let column = OptionExt::<bool, FieldDescriptor>::new(known::COLUMN_OPTION);

        let explicit = field_with_options(
            OptionsWriter::new()
                .bool_field(known::COLUMN_OPTION, false)
                .finish(),
        );
        assert_eq!(column.value_from(&explicit, &registry), Some(false));

        let unset = FieldDescriptor::default();
        assert_eq!(column.value_from(&unset, &registry), None);
    }

    #[test]
    fn unregistered_extension_reads_as_absent() {
        let registry = ExtensionRegistry::new();
        let column = OptionExt::<bool, FieldDescriptor>::new(known::COLUMN_OPTION);
        let holder = field_with_options(
            OptionsWriter::new()
                .bool_field(known::COLUMN_OPTION, true)
                .finish(),
        );
        assert_eq!(column.value_from(&holder, &registry), None);
    }

    #[test]
    fn last_occurrence_wins() {
        let bytes = OptionsWriter::new()
            .bool_field(known::COLUMN_OPTION, true)
            .bool_field(known::COLUMN_OPTION, false)
            .finish();
        assert_eq!(
            raw_value(&bytes, known::COLUMN_OPTION),
            Some(RawOptionValue::Varint(0))
        );
    }

    #[test]
    fn malformed_block_reads_as_absent() {
        // A length-delimited key promising more bytes than the block holds.
        let bytes = vec![0x3a, 0x7f, 0x01];
        assert_eq!(raw_value(&bytes, 7), None);
    }

    #[test]
    fn message_typed_option_round_trips() {
        let registry = ExtensionRegistry::with_known_options();
        let entity = OptionExt::<EntityOption, MessageDescriptor>::new(known::ENTITY_OPTION);

        let payload = EntityOption {
            kind: Some(EntityKind::Aggregate as i32),
        };
        let holder = MessageDescriptor {
            name: Some("Order".to_owned()),
            options: Some(
                OptionsWriter::new()
                    .message_field(known::ENTITY_OPTION, &payload)
                    .finish(),
            ),
            ..Default::default()
        };

        let read = entity
            .value_from(&holder, &registry)
            .expect("entity option should be present");
        assert_eq!(read.kind_value(), EntityKind::Aggregate);
    }

    #[test]
    fn entity_kind_defaults_to_unspecified() {
        assert_eq!(EntityKind::default(), EntityKind::Unspecified);
        assert_eq!(EntityOption::default().kind_value(), EntityKind::Unspecified);
        // Out-of-range payloads also fall back to unspecified.
        assert_eq!(
            EntityOption { kind: Some(99) }.kind_value(),
            EntityKind::Unspecified
        );
    }

    #[test]
    fn registry_insert_is_if_absent() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.register(ExtensionDef::new(HolderKind::Field, 60_000, "first")));
        assert!(!registry.register(ExtensionDef::new(HolderKind::Field, 60_000, "second")));
        assert_eq!(
            registry.find(HolderKind::Field, 60_000).map(|d| d.name.as_str()),
            Some("first")
        );
    }
}
