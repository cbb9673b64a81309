//! Structural validation of unlinked file descriptors.
//!
//! Every input file is validated before linking begins; any failure aborts
//! the whole link operation, because a structurally invalid file cannot
//! safely participate in dependency resolution for other files either.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use protolink_schema::{EnumDescriptor, MessageDescriptor, RawFileDescriptor};

use crate::error::LinkError;

/// Highest assignable field number.
pub const MAX_FIELD_NUMBER: i32 = 536_870_911;
/// Field numbers reserved for the wire format itself.
pub const RESERVED_FIELD_RANGE: std::ops::RangeInclusive<i32> = 19_000..=19_999;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

fn fail(file: &str, msg: impl Into<String>) -> LinkError {
    LinkError::Validation {
        file: file.to_owned(),
        msg: msg.into(),
    }
}

/// Returns `Ok(())` if the file is structurally sound, or the first
/// violation found otherwise.
pub fn validate_file(raw: &RawFileDescriptor) -> Result<(), LinkError> {
    let file = raw
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| fail("<unnamed>", "file descriptor carries no name"))?;

    let mut imports = HashSet::new();
    for dependency in &raw.dependency {
        if !imports.insert(dependency.as_str()) {
            return Err(fail(file, format!("file imported twice: \"{dependency}\"")));
        }
    }

    // Type names must be unique across messages, enums, and services, at
    // every nesting level.
    let mut type_names: HashSet<String> = HashSet::new();
    for message in &raw.message_type {
        check_message(file, message, String::new(), &mut type_names)?;
    }
    for enum_type in &raw.enum_type {
        check_enum(file, enum_type, String::new(), &mut type_names)?;
    }
    for service in &raw.service {
        let name = named(file, service.name.as_deref(), "service")?;
        claim(file, &mut type_names, String::new(), name)?;
        let mut methods = HashSet::new();
        for method in &service.method {
            let method_name = named(file, method.name.as_deref(), "method")?;
            if !methods.insert(method_name) {
                return Err(fail(
                    file,
                    format!("method \"{method_name}\" is defined twice in service \"{name}\""),
                ));
            }
        }
    }

    Ok(())
}

fn named<'a>(file: &str, name: Option<&'a str>, what: &str) -> Result<&'a str, LinkError> {
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| fail(file, format!("{what} declaration carries no name")))?;
    if !IDENTIFIER.is_match(name) {
        return Err(fail(file, format!("invalid {what} name \"{name}\"")));
    }
    Ok(name)
}

fn claim(
    file: &str,
    type_names: &mut HashSet<String>,
    scope: String,
    name: &str,
) -> Result<String, LinkError> {
    let local = if scope.is_empty() {
        name.to_owned()
    } else {
        format!("{scope}.{name}")
    };
    if !type_names.insert(local.clone()) {
        return Err(fail(file, format!("the type \"{local}\" is defined twice")));
    }
    Ok(local)
}

fn check_message(
    file: &str,
    message: &MessageDescriptor,
    scope: String,
    type_names: &mut HashSet<String>,
) -> Result<(), LinkError> {
    let name = named(file, message.name.as_deref(), "message")?;
    let local = claim(file, type_names, scope, name)?;

    let mut field_names: HashSet<&str> = HashSet::new();
    let mut field_numbers: HashSet<i32> = HashSet::new();
    for field in &message.field {
        let field_name = named(file, field.name.as_deref(), "field")?;
        if !field_names.insert(field_name) {
            return Err(fail(
                file,
                format!("field \"{field_name}\" is defined twice in \"{local}\""),
            ));
        }

        let number = field
            .number
            .ok_or_else(|| fail(file, format!("field \"{local}.{field_name}\" has no number")))?;
        if number < 1 || number > MAX_FIELD_NUMBER {
            return Err(fail(
                file,
                format!("field \"{local}.{field_name}\" has number {number} outside 1..={MAX_FIELD_NUMBER}"),
            ));
        }
        if RESERVED_FIELD_RANGE.contains(&number) {
            return Err(fail(
                file,
                format!("field \"{local}.{field_name}\" uses reserved number {number}"),
            ));
        }
        if !field_numbers.insert(number) {
            return Err(fail(
                file,
                format!("field number {number} is used twice in \"{local}\""),
            ));
        }

        if let Some(oneof_index) = field.oneof_index {
            let declared = message.oneof_decl.len();
            if oneof_index < 0 || oneof_index as usize >= declared {
                return Err(fail(
                    file,
                    format!(
                        "field \"{local}.{field_name}\" references oneof {oneof_index} but \"{local}\" declares {declared}"
                    ),
                ));
            }
        }
    }

    for nested in &message.nested_type {
        check_message(file, nested, local.clone(), type_names)?;
    }
    for enum_type in &message.enum_type {
        check_enum(file, enum_type, local.clone(), type_names)?;
    }
    Ok(())
}

fn check_enum(
    file: &str,
    enum_type: &EnumDescriptor,
    scope: String,
    type_names: &mut HashSet<String>,
) -> Result<(), LinkError> {
    let name = named(file, enum_type.name.as_deref(), "enum")?;
    let local = claim(file, type_names, scope, name)?;

    if enum_type.value.is_empty() {
        return Err(fail(file, format!("enum \"{local}\" declares no values")));
    }
    let mut value_names: HashSet<&str> = HashSet::new();
    for value in &enum_type.value {
        let value_name = named(file, value.name.as_deref(), "enum value")?;
        if !value_names.insert(value_name) {
            return Err(fail(
                file,
                format!("enum value \"{value_name}\" is defined twice in \"{local}\""),
            ));
        }
    }
    Ok(())
}
