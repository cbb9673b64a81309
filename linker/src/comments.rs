//! Comment lookup over source-position metadata.
//!
//! A descriptor compiled with source positions retained carries a flat list
//! of locations, each addressed by a path of field numbers and indexes into
//! the file descriptor. [`CommentPath`] builds those addresses without the
//! caller having to remember the raw numbering.

use protolink_schema::{Location, RawFileDescriptor};

use crate::error::LinkError;

// Field numbers of the declaration lists inside a file descriptor.
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const FILE_SERVICE: i32 = 6;
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const MESSAGE_ENUM_TYPE: i32 = 4;
const ENUM_VALUE: i32 = 2;
const SERVICE_METHOD: i32 = 2;

/// An address of one declaration within a file descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPath {
    segments: Vec<i32>,
}

impl CommentPath {
    /// The `index`-th top-level message of the file.
    pub fn message(index: usize) -> Self {
        CommentPath {
            segments: vec![FILE_MESSAGE_TYPE, index as i32],
        }
    }

    /// The `index`-th top-level enum of the file.
    pub fn enum_type(index: usize) -> Self {
        CommentPath {
            segments: vec![FILE_ENUM_TYPE, index as i32],
        }
    }

    /// The `index`-th service of the file.
    pub fn service(index: usize) -> Self {
        CommentPath {
            segments: vec![FILE_SERVICE, index as i32],
        }
    }

    /// Descends to the `index`-th field of the addressed message.
    pub fn field(mut self, index: usize) -> Self {
        self.segments.extend([MESSAGE_FIELD, index as i32]);
        self
    }

    /// Descends to the `index`-th nested message of the addressed message.
    pub fn nested(mut self, index: usize) -> Self {
        self.segments.extend([MESSAGE_NESTED_TYPE, index as i32]);
        self
    }

    /// Descends to the `index`-th enum nested in the addressed message.
    pub fn nested_enum(mut self, index: usize) -> Self {
        self.segments.extend([MESSAGE_ENUM_TYPE, index as i32]);
        self
    }

    /// Descends to the `index`-th value of the addressed enum.
    pub fn value(mut self, index: usize) -> Self {
        self.segments.extend([ENUM_VALUE, index as i32]);
        self
    }

    /// Descends to the `index`-th method of the addressed service.
    pub fn method(mut self, index: usize) -> Self {
        self.segments.extend([SERVICE_METHOD, index as i32]);
        self
    }

    pub fn segments(&self) -> &[i32] {
        &self.segments
    }
}

fn location<'a>(
    file: &'a RawFileDescriptor,
    path: &CommentPath,
) -> Result<Option<&'a Location>, LinkError> {
    let info = file
        .source_code_info
        .as_ref()
        .ok_or_else(|| LinkError::MissingSourceInfo {
            file: file.name.clone().unwrap_or_default(),
        })?;
    Ok(info
        .location
        .iter()
        .find(|location| location.path == path.segments))
}

/// The leading comment attached to a declaration, if any.
///
/// Fails with [`LinkError::MissingSourceInfo`] when the file was compiled
/// without source positions; a file that has them but carries no comment at
/// the given path yields `Ok(None)`.
pub fn leading_comment(
    file: &RawFileDescriptor,
    path: &CommentPath,
) -> Result<Option<String>, LinkError> {
    Ok(location(file, path)?.and_then(|loc| loc.leading_comments.clone()))
}

/// The trailing comment attached to a declaration, if any.
pub fn trailing_comment(
    file: &RawFileDescriptor,
    path: &CommentPath,
) -> Result<Option<String>, LinkError> {
    Ok(location(file, path)?.and_then(|loc| loc.trailing_comments.clone()))
}

/// Detached comment blocks preceding a declaration.
pub fn detached_comments(
    file: &RawFileDescriptor,
    path: &CommentPath,
) -> Result<Vec<String>, LinkError> {
    Ok(location(file, path)?
        .map(|loc| loc.leading_detached_comments.clone())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protolink_schema::SourceCodeInfo;

    fn file_with_locations(locations: Vec<Location>) -> RawFileDescriptor {
        RawFileDescriptor {
            name: Some("acme/thing.proto".to_owned()),
            source_code_info: Some(SourceCodeInfo {
                location: locations,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn paths_compose_the_documented_numbering() {
        assert_eq!(CommentPath::message(2).segments(), &[4, 2]);
        assert_eq!(CommentPath::message(0).field(3).segments(), &[4, 0, 2, 3]);
        assert_eq!(
            CommentPath::message(1).nested(0).field(2).segments(),
            &[4, 1, 3, 0, 2, 2]
        );
        assert_eq!(CommentPath::enum_type(0).value(1).segments(), &[5, 0, 2, 1]);
        assert_eq!(CommentPath::service(0).method(2).segments(), &[6, 0, 2, 2]);
    }

    #[test]
    fn finds_the_comment_at_a_path() {
        let file = file_with_locations(vec![
            Location {
                path: vec![4, 0],
                leading_comments: Some(" The thing.\n".to_owned()),
                trailing_comments: Some(" trailing\n".to_owned()),
                ..Default::default()
            },
            Location {
                path: vec![4, 0, 2, 0],
                leading_detached_comments: vec![" detached\n".to_owned()],
                ..Default::default()
            },
        ]);

        let path = CommentPath::message(0);
        assert_eq!(
            leading_comment(&file, &path).expect("lookup"),
            Some(" The thing.\n".to_owned())
        );
        assert_eq!(
            trailing_comment(&file, &path).expect("lookup"),
            Some(" trailing\n".to_owned())
        );
        assert_eq!(
            detached_comments(&file, &CommentPath::message(0).field(0)).expect("lookup"),
            vec![" detached\n".to_owned()]
        );
    }

    #[test]
    fn absent_comment_is_none_but_absent_info_is_an_error() {
        let file = file_with_locations(Vec::new());
        assert_eq!(
            leading_comment(&file, &CommentPath::message(0)).expect("lookup"),
            None
        );

        let stripped = RawFileDescriptor {
            name: Some("acme/thing.proto".to_owned()),
            ..Default::default()
        };
        let err = leading_comment(&stripped, &CommentPath::message(0)).expect_err("should fail");
        assert!(matches!(err, LinkError::MissingSourceInfo { .. }));
    }
}
