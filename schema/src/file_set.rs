//! The name-keyed registry of linked files.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::linked::LinkedFileDescriptor;

/// An immutable-by-convention registry of linked files, keyed by canonical
/// file name. Keys are unique; [`FileSet::union`] resolves collisions
/// deterministically in favor of the operand.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileSet {
    files: BTreeMap<String, Arc<LinkedFileDescriptor>>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files(files: impl IntoIterator<Item = Arc<LinkedFileDescriptor>>) -> Self {
        let mut set = Self::new();
        for file in files {
            set.add(file);
        }
        set
    }

    /// Inserts a file if no file with that name is present yet.
    ///
    /// Returns `true` if newly inserted, `false` if the existing entry was
    /// left untouched.
    pub fn add(&mut self, file: Arc<LinkedFileDescriptor>) -> bool {
        let name = file.name().to_owned();
        if self.files.contains_key(&name) {
            return false;
        }
        self.files.insert(name, file);
        true
    }

    /// A new set holding every file of both operands. For a name present in
    /// both, the operand's entry wins.
    pub fn union(&self, other: &FileSet) -> FileSet {
        let mut files = self.files.clone();
        for (name, file) in &other.files {
            files.insert(name.clone(), Arc::clone(file));
        }
        FileSet { files }
    }

    pub fn find(&self, name: &str) -> Option<&Arc<LinkedFileDescriptor>> {
        self.files.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn contains_all<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().all(|name| self.contains(name.as_ref()))
    }

    /// File names in sorted order, for deterministic display and testing.
    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn files(&self) -> impl Iterator<Item = &Arc<LinkedFileDescriptor>> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
