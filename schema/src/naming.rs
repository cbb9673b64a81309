//! Naming conventions shared by the registries and the type model.

use lazy_static::lazy_static;
use regex::Regex;

use crate::MAP_ENTRY_SUFFIX;

lazy_static! {
    /// File names that declare command messages, e.g. `commands.proto` or
    /// `orders/order_commands.proto`.
    static ref COMMANDS_FILE: Regex = Regex::new(r"(^|/)([^/]*_)?commands\.proto$").unwrap();
}

/// Joins a package and a type name into a fully-qualified name.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_owned()
    } else {
        format!("{package}.{name}")
    }
}

/// Joins a package and a nesting path into a fully-qualified name.
pub fn qualify_nested(package: &str, path: &[String]) -> String {
    qualify(package, &path.join("."))
}

/// The last dot-separated segment of a (possibly qualified) type name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Converts a snake_case field name to UpperCamelCase.
pub fn upper_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// The name of the synthetic entry message a schema compiler generates for a
/// map field, e.g. `counts` → `CountsEntry`.
pub fn map_entry_name(field_name: &str) -> String {
    format!("{}{}", upper_camel(field_name), MAP_ENTRY_SUFFIX)
}

/// Whether a file name follows the commands-file convention.
pub fn is_commands_file(file_name: &str) -> bool {
    COMMANDS_FILE.is_match(file_name)
}
