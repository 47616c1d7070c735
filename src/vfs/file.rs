//! File service of the in-memory file system.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use super::entry::missing_entry_time;
use super::{Entry, FileAttributes, MockFileSystem, Store, canonical};
use crate::core::{FileBackend, Result};
use crate::error::VfsError;

/// File operations of a [`MockFileSystem`], obtained via `fs.file()`.
#[derive(Debug, Clone, Copy)]
pub struct MockFile<'a> {
    fs: &'a MockFileSystem,
}

/// Splits text on `\r\n`, `\n` and `\r`. A trailing line break does not add an empty line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(idx) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}

fn parent_exists(store: &Store, path: &str) -> bool {
    canonical::parent(path, store.platform()).is_none_or(|parent| store.directory_exists(&parent))
}

/// Error for an absent file: distinguishes a missing folder from a missing file.
fn not_found(store: &Store, resolved: &str, path: &str) -> VfsError {
    if parent_exists(store, resolved) {
        VfsError::file_not_found(path)
    } else {
        VfsError::directory_not_found(path)
    }
}

impl<'a> MockFile<'a> {
    pub fn new(fs: &'a MockFileSystem) -> Self {
        Self { fs }
    }

    /// Runs `f` on the file stored at `path`.
    fn with_file<T>(&self, path: &str, f: impl FnOnce(&Entry) -> T) -> Result<T> {
        let resolved = self.fs.resolve(path)?;
        let store = self.fs.lock();
        match store.get(&resolved) {
            Some(entry) if entry.is_file() => Ok(f(entry)),
            _ if store.directory_exists(&resolved) => Err(VfsError::unauthorized(path)),
            _ => Err(not_found(&store, &resolved, path)),
        }
    }

    /// Replaces the file at `path` with `entry`.
    fn write_entry(&self, path: &str, entry: Entry) -> Result<()> {
        let resolved = self.fs.resolve(path)?;
        let mut store = self.fs.lock();
        if store.directory_exists(&resolved) {
            return Err(VfsError::unauthorized(path));
        }
        debug!(path = %resolved, len = entry.len(), "write file");
        store.put(&resolved, entry)
    }

    fn append_bytes(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let resolved = self.fs.resolve(path)?;
        let mut store = self.fs.lock();
        if store.directory_exists(&resolved) {
            return Err(VfsError::unauthorized(path));
        }
        let protected = store.get(&resolved).map(|e| e.attributes().is_protected());
        match protected {
            Some(true) => Err(VfsError::unauthorized(path)),
            Some(false) => {
                debug!(path = %resolved, len = bytes.len(), "append to file");
                if let Some(entry) = store.get_mut(&resolved) {
                    entry.append(bytes);
                }
                Ok(())
            }
            None if !parent_exists(&store, &resolved) => Err(VfsError::directory_not_found(path)),
            None => store.put(&resolved, Entry::file(bytes)),
        }
    }

    fn lines_to_text(&self, lines: &[&str]) -> String {
        let newline = self.fs.platform().newline();
        lines.iter().map(|line| format!("{line}{newline}")).collect()
    }

    /// Creates an empty file at `path`, replacing any existing one.
    ///
    /// # Errors
    /// * `DirectoryNotFound` if the containing directory does not exist.
    /// * `UnauthorizedAccess` if `path` is a directory or a protected file.
    pub fn create(&self, path: &str) -> Result<()> {
        let resolved = self.fs.resolve(path)?;
        let mut store = self.fs.lock();
        if store.directory_exists(&resolved) {
            return Err(VfsError::unauthorized(path));
        }
        if !parent_exists(&store, &resolved) {
            return Err(VfsError::directory_not_found(path));
        }
        store.put(&resolved, Entry::file(Vec::new()))
    }

    fn get_time(
        &self,
        path: &str,
        pick: impl FnOnce(&Entry) -> DateTime<FixedOffset>,
    ) -> Result<DateTime<FixedOffset>> {
        let resolved = self.fs.resolve(path)?;
        let store = self.fs.lock();
        Ok(store.lookup(&resolved).map_or_else(missing_entry_time, pick))
    }

    fn update(&self, path: &str, apply: impl FnOnce(&mut Entry)) -> Result<()> {
        let resolved = self.fs.resolve(path)?;
        let mut store = self.fs.lock();
        match store.lookup_mut(&resolved) {
            Some(entry) => {
                apply(entry);
                Ok(())
            }
            None => Err(VfsError::file_not_found(path)),
        }
    }

    /// Creation time of the file or directory at `path`.
    ///
    /// Absent entries report 1601-01-01T00:00:00Z instead of failing.
    pub fn get_creation_time(&self, path: &str) -> Result<DateTime<FixedOffset>> {
        self.get_time(path, Entry::creation_time)
    }

    pub fn get_creation_time_utc(&self, path: &str) -> Result<DateTime<Utc>> {
        Ok(self.get_creation_time(path)?.with_timezone(&Utc))
    }

    pub fn get_last_access_time(&self, path: &str) -> Result<DateTime<FixedOffset>> {
        self.get_time(path, Entry::last_access_time)
    }

    pub fn get_last_access_time_utc(&self, path: &str) -> Result<DateTime<Utc>> {
        Ok(self.get_last_access_time(path)?.with_timezone(&Utc))
    }

    pub fn get_last_write_time(&self, path: &str) -> Result<DateTime<FixedOffset>> {
        self.get_time(path, Entry::last_write_time)
    }

    pub fn get_last_write_time_utc(&self, path: &str) -> Result<DateTime<Utc>> {
        Ok(self.get_last_write_time(path)?.with_timezone(&Utc))
    }

    /// # Errors
    /// * `FileNotFound` if nothing is stored at `path`.
    pub fn set_creation_time(&self, path: &str, time: DateTime<FixedOffset>) -> Result<()> {
        self.update(path, |e| e.set_creation_time(time))
    }

    pub fn set_creation_time_utc(&self, path: &str, time: DateTime<Utc>) -> Result<()> {
        self.set_creation_time(path, time.fixed_offset())
    }

    pub fn set_last_access_time(&self, path: &str, time: DateTime<FixedOffset>) -> Result<()> {
        self.update(path, |e| e.set_last_access_time(time))
    }

    pub fn set_last_access_time_utc(&self, path: &str, time: DateTime<Utc>) -> Result<()> {
        self.set_last_access_time(path, time.fixed_offset())
    }

    pub fn set_last_write_time(&self, path: &str, time: DateTime<FixedOffset>) -> Result<()> {
        self.update(path, |e| e.set_last_write_time(time))
    }

    pub fn set_last_write_time_utc(&self, path: &str, time: DateTime<Utc>) -> Result<()> {
        self.set_last_write_time(path, time.fixed_offset())
    }
}

impl FileBackend for MockFile<'_> {
    fn exists(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        match self.fs.resolve(path) {
            Ok(resolved) => self.fs.lock().get(&resolved).is_some_and(Entry::is_file),
            Err(_) => false,
        }
    }

    /// # Errors
    /// * `FileNotFound` / `DirectoryNotFound` if the file or its folder is absent.
    /// * `UnauthorizedAccess` if `path` is a directory.
    fn read_all_bytes(&self, path: &str) -> Result<Vec<u8>> {
        self.with_file(path, |e| e.content().to_vec())
    }

    /// Content decoded as UTF-8; a leading byte order mark is dropped.
    fn read_all_text(&self, path: &str) -> Result<String> {
        self.with_file(path, Entry::text_content)
    }

    fn read_all_lines(&self, path: &str) -> Result<Vec<String>> {
        self.with_file(path, |e| split_lines(&e.text_content()))
    }

    /// Replaces the file at `path`; missing folders are created.
    ///
    /// # Errors
    /// * `UnauthorizedAccess` if `path` is a directory, or a read-only or hidden file.
    fn write_all_bytes(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.write_entry(path, Entry::file(bytes))
    }

    fn write_all_text(&self, path: &str, text: &str) -> Result<()> {
        self.write_entry(path, Entry::text(text))
    }

    /// Writes every line followed by the platform newline.
    fn write_all_lines(&self, path: &str, lines: &[&str]) -> Result<()> {
        let text = self.lines_to_text(lines);
        self.write_entry(path, Entry::text(&text))
    }

    /// Appends to the file, creating it if needed.
    ///
    /// # Errors
    /// * `DirectoryNotFound` if the file is absent and so is its folder.
    /// * `UnauthorizedAccess` if `path` is a directory, or a read-only or hidden file.
    fn append_all_text(&self, path: &str, text: &str) -> Result<()> {
        self.append_bytes(path, text.as_bytes())
    }

    fn append_all_lines(&self, path: &str, lines: &[&str]) -> Result<()> {
        let text = self.lines_to_text(lines);
        self.append_bytes(path, text.as_bytes())
    }

    /// Copies the file with its metadata.
    ///
    /// # Errors
    /// * `FileNotFound` if `source` is not a file.
    /// * `DirectoryNotFound` if the destination folder is absent.
    /// * `AlreadyExists` if `destination` exists and `overwrite` is false.
    /// * `UnauthorizedAccess` if `destination` is protected.
    fn copy(&self, source: &str, destination: &str, overwrite: bool) -> Result<()> {
        let src = self.fs.resolve(source)?;
        let dst = self.fs.resolve(destination)?;
        let mut store = self.fs.lock();

        let entry = match store.get(&src) {
            Some(entry) if entry.is_file() => entry.clone(),
            _ => return Err(VfsError::file_not_found(source)),
        };
        if !parent_exists(&store, &dst) {
            return Err(VfsError::directory_not_found(destination));
        }
        if store.exists(&dst) && !overwrite {
            return Err(VfsError::already_exists(format!(
                "the file {destination} already exists"
            )));
        }

        debug!(from = %src, to = %dst, "copy file");
        store.put(&dst, entry)
    }

    /// Moves the file with its metadata.
    ///
    /// Moving a file onto itself is a no-op, or a rename when only the case differs.
    ///
    /// # Errors
    /// * `AlreadyExists` if `destination` is taken by a file or a directory.
    /// * `FileNotFound` if `source` is not a file.
    /// * `DirectoryNotFound` if the destination folder is absent.
    fn move_to(&self, source: &str, destination: &str) -> Result<()> {
        let src = self.fs.resolve(source)?;
        let dst = self.fs.resolve(destination)?;
        let mut store = self.fs.lock();

        if src.to_lowercase() == dst.to_lowercase() {
            if !store.get(&src).is_some_and(Entry::is_file) {
                return Err(VfsError::file_not_found(source));
            }
            if src != dst
                && let Some(entry) = store.remove(&src)
            {
                debug!(from = %src, to = %dst, "rename file");
                store.put(&dst, entry)?;
            }
            return Ok(());
        }

        if store.exists(&dst) || store.directory_exists(&dst) {
            return Err(VfsError::already_exists(
                "a file can not be created if it already exists",
            ));
        }
        if !store.get(&src).is_some_and(Entry::is_file) {
            return Err(VfsError::file_not_found(source));
        }
        if !parent_exists(&store, &dst) {
            return Err(VfsError::directory_not_found(destination));
        }

        debug!(from = %src, to = %dst, "move file");
        if let Some(entry) = store.get(&src).cloned() {
            store.put(&dst, entry)?;
            store.remove(&src);
        }
        Ok(())
    }

    /// Removes the file. Absent files are ignored.
    ///
    /// # Errors
    /// * `UnauthorizedAccess` if `path` is a directory or a read-only file.
    fn delete(&self, path: &str) -> Result<()> {
        let resolved = self.fs.resolve(path)?;
        let mut store = self.fs.lock();
        if store.directory_exists(&resolved) {
            return Err(VfsError::unauthorized(path));
        }
        if store
            .get(&resolved)
            .is_some_and(|e| e.attributes().contains(FileAttributes::READ_ONLY))
        {
            return Err(VfsError::unauthorized(path));
        }
        store.remove(&resolved);
        Ok(())
    }

    /// Attributes of the file or directory at `path`.
    ///
    /// # Errors
    /// * `FileNotFound` if the entry is absent but its folder exists.
    /// * `DirectoryNotFound` if the folder is absent too.
    fn get_attributes(&self, path: &str) -> Result<FileAttributes> {
        let resolved = self.fs.resolve(path)?;
        let store = self.fs.lock();
        store
            .lookup(&resolved)
            .map(Entry::attributes)
            .ok_or_else(|| not_found(&store, &resolved, path))
    }

    /// Replaces the attributes; read-only entries accept this too.
    fn set_attributes(&self, path: &str, attributes: FileAttributes) -> Result<()> {
        self.update(path, |e| e.set_attributes(attributes))
    }
}
