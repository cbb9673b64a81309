//! Deserializing descriptor-set envelopes from bytes and files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use prost::Message;
use tracing::debug;

use protolink_schema::{FileDescriptorSet, RawFileDescriptor};

use crate::error::LinkError;

/// Decodes a binary descriptor-set envelope.
/// Returns `Err(LinkError::MalformedDescriptor)` if the bytes do not decode.
pub fn parse(bytes: &[u8]) -> Result<FileDescriptorSet, LinkError> {
    FileDescriptorSet::decode(bytes).map_err(|source| LinkError::MalformedDescriptor { source })
}

/// Decodes a binary descriptor-set envelope, returning `None` instead of
/// failing. For speculative reads where absence of a valid set is normal.
pub fn try_parse(bytes: &[u8]) -> Option<FileDescriptorSet> {
    FileDescriptorSet::decode(bytes).ok()
}

/// Reads and decodes one descriptor-set file.
pub fn read_descriptor_set(path: &Path) -> Result<FileDescriptorSet, LinkError> {
    let bytes = fs::read(path).map_err(|source| LinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = parse(&bytes)?;
    debug!(path = %path.display(), files = set.file.len(), "read descriptor set");
    Ok(set)
}

/// Reads several descriptor-set files and flattens them into one list of
/// unlinked file descriptors. Duplicate file names across sets are
/// deduplicated by name, first occurrence wins.
pub fn load_descriptor_sets<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
) -> Result<Vec<RawFileDescriptor>, LinkError> {
    let mut sets = Vec::new();
    for path in paths {
        sets.push(read_descriptor_set(path.as_ref())?);
    }
    Ok(merge_sets(sets))
}

/// Flattens decoded sets into one deduplicated file list, first wins.
pub fn merge_sets(sets: impl IntoIterator<Item = FileDescriptorSet>) -> Vec<RawFileDescriptor> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut files = Vec::new();
    for set in sets {
        for file in set.file {
            let name = file.name.clone().unwrap_or_default();
            if seen.insert(name) {
                files.push(file);
            }
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message as _;

    fn raw(name: &str, package: &str) -> RawFileDescriptor {
        RawFileDescriptor {
            name: Some(name.to_owned()),
            package: Some(package.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn parse_rejects_garbage_and_try_parse_shrugs() {
        let garbage = [0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            parse(&garbage),
            Err(LinkError::MalformedDescriptor { .. })
        ));
        assert!(try_parse(&garbage).is_none());
    }

    #[test]
    fn parse_round_trips_an_encoded_set() {
        let set = FileDescriptorSet {
            file: vec![raw("a.proto", "acme")],
        };
        let decoded = parse(&set.encode_to_vec()).expect("parse failed");
        assert_eq!(decoded.file.len(), 1);
        assert_eq!(decoded.file[0].name.as_deref(), Some("a.proto"));
    }

    #[test]
    fn merge_sets_dedupes_by_name_first_wins() {
        let first = FileDescriptorSet {
            file: vec![raw("a.proto", "one"), raw("b.proto", "one")],
        };
        let second = FileDescriptorSet {
            file: vec![raw("a.proto", "two"), raw("c.proto", "two")],
        };
        let merged = merge_sets([first, second]);
        let names: Vec<_> = merged.iter().map(|f| f.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["a.proto", "b.proto", "c.proto"]);
        assert_eq!(merged[0].package.as_deref(), Some("one"));
    }

    #[test]
    fn read_descriptor_set_reports_the_offending_path() {
        let missing = Path::new("/nonexistent/descriptors.bin");
        let err = read_descriptor_set(missing).expect_err("should fail");
        assert!(err.to_string().contains("/nonexistent/descriptors.bin"));
    }

    #[test]
    fn load_descriptor_sets_reads_files_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_one = dir.path().join("one.bin");
        let path_two = dir.path().join("two.bin");
        std::fs::write(
            &path_one,
            FileDescriptorSet {
                file: vec![raw("a.proto", "one")],
            }
            .encode_to_vec(),
        )
        .expect("write one");
        std::fs::write(
            &path_two,
            FileDescriptorSet {
                file: vec![raw("a.proto", "two"), raw("b.proto", "two")],
            }
            .encode_to_vec(),
        )
        .expect("write two");

        let files = load_descriptor_sets([&path_one, &path_two]).expect("load failed");
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].package.as_deref(), Some("one"));
    }
}
