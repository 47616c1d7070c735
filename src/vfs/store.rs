//! The flat path → entry map behind a `MockFileSystem`.
//!
//! Keys are canonical paths folded to lower case, so `C:\Foo` and `c:\foo`
//! always land on the same slot. The spelling used when a slot was first
//! created is kept next to the entry and is what listings report.
//!
//! Directory keys always end with a separator, file keys never do. Listings
//! come back in insertion order.

use indexmap::IndexMap;
use tracing::debug;

use super::{Entry, FileAttributes, Platform, canonical};
use crate::core::Result;
use crate::error::VfsError;

#[derive(Debug, Clone)]
pub struct Store {
    platform: Platform,
    entries: IndexMap<String, (String, Entry)>,
}

impl Store {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            entries: IndexMap::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn key(path: &str) -> String {
        path.to_lowercase()
    }

    /// Canonical directory key for `path` (adds the trailing separator).
    pub fn dir_key(&self, path: &str) -> String {
        self.platform.with_trailing_separator(path)
    }

    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries.get(&Self::key(path)).map(|(_, entry)| entry)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Entry> {
        self.entries.get_mut(&Self::key(path)).map(|(_, entry)| entry)
    }

    /// Looks `path` up as a file first, then as a directory.
    pub fn lookup(&self, path: &str) -> Option<&Entry> {
        self.get(path).or_else(|| self.get(&self.dir_key(path)))
    }

    pub fn lookup_mut(&mut self, path: &str) -> Option<&mut Entry> {
        let key = if self.entries.contains_key(&Self::key(path)) {
            path.to_string()
        } else {
            self.dir_key(path)
        };
        self.get_mut(&key)
    }

    /// True if `path` is stored as a key (file key, or directory key with its separator).
    pub fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(&Self::key(path))
    }

    pub fn directory_exists(&self, path: &str) -> bool {
        self.get(&self.dir_key(path)).is_some_and(Entry::is_dir)
    }

    /// Inserts or replaces an entry without any checks.
    ///
    /// Replacing keeps the spelling of the existing key.
    fn insert(&mut self, path: &str, entry: Entry) {
        match self.entries.get_mut(&Self::key(path)) {
            Some((_, slot)) => *slot = entry,
            None => {
                self.entries.insert(Self::key(path), (path.to_string(), entry));
            }
        }
    }

    /// Stores `entry` at `path`.
    ///
    /// Directory entries are routed through [`Store::add_directory`]. For files
    /// the missing parent chain is created first.
    ///
    /// # Errors
    /// * `UnauthorizedAccess` if the current entry at `path` is read-only or hidden,
    ///   or if a file is put at a directory path (trailing separator or an
    ///   existing directory).
    /// * `AlreadyExists` if a file occupies one of the parent segments.
    pub fn put(&mut self, path: &str, entry: Entry) -> Result<()> {
        if entry.is_file()
            && (path.ends_with(self.platform.separator()) || self.directory_exists(path))
        {
            return Err(VfsError::unauthorized(path));
        }

        if let Some(existing) = self.get(path)
            && existing.attributes().is_protected()
        {
            return Err(VfsError::unauthorized(path));
        }

        if entry.is_dir() {
            return self.add_directory_entry(path, entry);
        }

        if let Some(parent) = canonical::parent(path, self.platform)
            && !self.directory_exists(&parent)
        {
            self.add_directory(&parent)?;
        }

        debug!(path, len = entry.len(), "put file");
        self.insert(path, entry);
        Ok(())
    }

    /// Creates the directory `path` and every missing ancestor, root included.
    ///
    /// # Errors
    /// * `InvalidArgument` for a UNC path without a separator after the server
    ///   name (`\\server`).
    /// * `UnauthorizedAccess` if a read-only entry occupies `path`.
    /// * `AlreadyExists` if a file occupies `path` or one of its ancestors.
    pub fn add_directory(&mut self, path: &str) -> Result<()> {
        self.add_directory_entry(path, Entry::directory())
    }

    fn add_directory_entry(&mut self, path: &str, entry: Entry) -> Result<()> {
        let sep = self.platform.separator();

        if let Some(existing) = self.get(path)
            && existing.attributes().contains(FileAttributes::READ_ONLY)
        {
            return Err(VfsError::unauthorized(path));
        }

        let mut search_from = 0;
        if canonical::is_unc(path, self.platform) {
            // never store the bare `\\server\` segment
            search_from = match path[2..].find(sep) {
                Some(idx) => idx + 2,
                None => {
                    return Err(VfsError::invalid_argument(
                        "the UNC path should be of the form \\\\server\\share",
                    ));
                }
            };
        }

        let ancestors: Vec<usize> = path
            .char_indices()
            .filter(|(idx, c)| *idx > search_from && *c == sep)
            .map(|(idx, _)| idx)
            .collect();

        // a file and a directory never share a path
        if let Some(occupied) = ancestors
            .iter()
            .map(|&idx| &path[..idx])
            .chain([path.trim_end_matches(sep)])
            .find(|segment| self.get(segment).is_some_and(Entry::is_file))
        {
            return Err(VfsError::already_exists(format!(
                "cannot create \"{path}\" because a file already exists at \"{occupied}\""
            )));
        }

        let unix_root = self.platform.is_unix() && search_from == 0 && path.starts_with(sep);
        if unix_root && !self.directory_exists("/") {
            self.insert("/", Entry::directory());
        }
        for idx in ancestors {
            let segment = &path[..=idx];
            if !self.directory_exists(segment) {
                self.insert(segment, Entry::directory());
            }
        }

        let key = self.dir_key(path);
        debug!(path = %key, "add directory");
        self.insert(&key, entry);
        Ok(())
    }

    pub fn remove(&mut self, path: &str) -> Option<Entry> {
        let removed = self
            .entries
            .shift_remove(&Self::key(path))
            .map(|(_, entry)| entry);
        if removed.is_some() {
            debug!(path, "remove entry");
        }
        removed
    }

    /// Stored paths starting with `prefix`, compared case-insensitively.
    pub fn paths_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = Self::key(prefix);
        self.entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, (original, _))| original.clone())
            .collect()
    }

    pub fn all_paths(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|(original, _)| original.clone())
            .collect()
    }

    pub fn all_files(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|(_, entry)| entry.is_file())
            .map(|(original, _)| original.clone())
            .collect()
    }

    pub fn all_directories(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|(_, entry)| entry.is_dir())
            .map(|(original, _)| original.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> Store {
        Store::new(Platform::Windows)
    }

    mod put {
        use super::*;

        #[test]
        fn test_put_materializes_parents() -> Result<()> {
            let mut store = setup_store();
            store.put("C:\\a\\b\\c.txt", Entry::text("x"))?;
            assert_eq!(store.all_directories(), vec!["C:\\", "C:\\a\\", "C:\\a\\b\\"]);
            assert_eq!(store.all_files(), vec!["C:\\a\\b\\c.txt"]);
            Ok(())
        }

        #[test]
        fn test_keys_are_case_insensitive() -> Result<()> {
            let mut store = setup_store();
            store.put("c:\\Foo\\bar.txt", Entry::text("one"))?;
            store.put("C:\\FOO\\BAR.TXT", Entry::text("two"))?;
            assert_eq!(store.all_files(), vec!["c:\\Foo\\bar.txt"]);
            assert_eq!(store.get("c:\\foo\\bar.txt").map(Entry::text_content), Some("two".into()));
            assert!(store.directory_exists("C:\\FOO"));
            Ok(())
        }

        #[test]
        fn test_protected_entries_reject_overwrite() -> Result<()> {
            let mut store = setup_store();
            for flag in [FileAttributes::READ_ONLY, FileAttributes::HIDDEN] {
                let path = format!("c:\\{}.txt", flag.bits());
                store.put(&path, Entry::text("x").with_attributes(flag))?;
                assert!(matches!(
                    store.put(&path, Entry::text("y")),
                    Err(VfsError::UnauthorizedAccess(_))
                ));
            }
            Ok(())
        }

        #[test]
        fn test_file_never_takes_a_directory_key() -> Result<()> {
            let mut store = setup_store();
            assert!(matches!(
                store.put("c:\\x\\", Entry::text("precious")),
                Err(VfsError::UnauthorizedAccess(_))
            ));
            store.add_directory("c:\\dir")?;
            assert!(matches!(
                store.put("c:\\dir", Entry::text("x")),
                Err(VfsError::UnauthorizedAccess(_))
            ));
            assert!(store.all_files().is_empty());
            Ok(())
        }

        #[test]
        fn test_file_as_parent_is_rejected() -> Result<()> {
            let mut store = setup_store();
            store.put("c:\\f", Entry::text("x"))?;
            assert!(matches!(
                store.put("c:\\f\\child.txt", Entry::text("y")),
                Err(VfsError::AlreadyExists(_))
            ));
            assert!(matches!(store.add_directory("c:\\f\\"), Err(VfsError::AlreadyExists(_))));
            assert_eq!(store.all_paths(), vec!["c:\\", "c:\\f"]);
            Ok(())
        }

        #[test]
        fn test_insertion_order_is_kept() -> Result<()> {
            let mut store = setup_store();
            store.put("c:\\z.txt", Entry::text(""))?;
            store.put("c:\\a.txt", Entry::text(""))?;
            store.put("c:\\m.txt", Entry::text(""))?;
            assert_eq!(store.all_files(), vec!["c:\\z.txt", "c:\\a.txt", "c:\\m.txt"]);
            Ok(())
        }
    }

    mod directories {
        use super::*;

        #[test]
        fn test_add_directory_creates_ancestors() -> Result<()> {
            let mut store = setup_store();
            store.add_directory("C:\\a\\b")?;
            assert_eq!(store.all_directories(), vec!["C:\\", "C:\\a\\", "C:\\a\\b\\"]);
            assert!(store.directory_exists("c:\\a\\b\\"));
            Ok(())
        }

        #[test]
        fn test_unc_directory() -> Result<()> {
            let mut store = setup_store();
            store.add_directory("\\\\server\\share\\dir")?;
            assert_eq!(
                store.all_directories(),
                vec!["\\\\server\\share\\", "\\\\server\\share\\dir\\"]
            );
            assert!(matches!(
                store.add_directory("\\\\server"),
                Err(VfsError::InvalidArgument(_))
            ));
            Ok(())
        }

        #[test]
        fn test_unix_root_is_stored() -> Result<()> {
            let mut store = Store::new(Platform::Unix);
            store.add_directory("/a/b")?;
            assert_eq!(store.all_directories(), vec!["/", "/a/", "/a/b/"]);
            Ok(())
        }

        #[test]
        fn test_read_only_blocks_directory_overwrite() -> Result<()> {
            let mut store = setup_store();
            store.put("c:\\f", Entry::text("").with_attributes(FileAttributes::READ_ONLY))?;
            assert!(matches!(
                store.add_directory("c:\\f"),
                Err(VfsError::UnauthorizedAccess(_))
            ));
            Ok(())
        }
    }

    mod removal {
        use super::*;

        #[test]
        fn test_remove_and_prefix() -> Result<()> {
            let mut store = setup_store();
            store.put("c:\\bar\\foo.txt", Entry::text(""))?;
            store.put("c:\\barbaz\\foo.txt", Entry::text(""))?;
            assert_eq!(
                store.paths_with_prefix("C:\\BAR\\"),
                vec!["c:\\bar\\", "c:\\bar\\foo.txt"]
            );
            assert!(store.remove("C:\\Bar\\Foo.txt").is_some());
            assert!(store.remove("c:\\bar\\foo.txt").is_none());
            assert!(!store.exists("c:\\bar\\foo.txt"));
            Ok(())
        }

        #[test]
        fn test_lookup_falls_back_to_directory_key() -> Result<()> {
            let mut store = setup_store();
            store.add_directory("c:\\dir")?;
            assert!(store.lookup("c:\\dir").is_some_and(Entry::is_dir));
            assert!(store.get("c:\\dir").is_none());
            Ok(())
        }
    }
}
