//! Directory service of the in-memory file system.

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use super::pattern::{self, Matcher};
use super::{DirectoryInfo, Entry, MockFileSystem, Platform, Store, canonical};
use crate::core::{DirectoryBackend, FileSystem, Result, SearchOption};
use crate::error::VfsError;

/// Directory operations of a [`MockFileSystem`], obtained via `fs.directory()`.
#[derive(Debug, Clone, Copy)]
pub struct MockDirectory<'a> {
    fs: &'a MockFileSystem,
}

/// Stored paths below `dir` (canonical, with trailing separator) matching `pattern`.
///
/// Searches files or directories depending on `directories`. The searched
/// directory itself never shows up in directory results.
pub(crate) fn search(
    store: &Store,
    dir: &str,
    pattern: &str,
    option: SearchOption,
    directories: bool,
) -> Result<Vec<String>> {
    let platform = store.platform();
    pattern::check_search_pattern(pattern, platform)?;
    let matcher = Matcher::compile(dir, pattern, option, platform)?;

    let candidates = if directories {
        store.all_directories()
    } else {
        store.all_files()
    };
    Ok(candidates
        .into_iter()
        .filter(|p| !(directories && same_path(p, dir)))
        .filter(|p| matcher.is_match(p))
        .collect())
}

/// Replaces the `from` prefix of `path` by `to`; `from` is matched by character count.
fn rebase(path: &str, from: &str, to: &str) -> String {
    let rest: String = path.chars().skip(from.chars().count()).collect();
    format!("{to}{rest}")
}

fn same_path(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Moves the directory tree `src` to `dst`; both canonical with trailing separators.
fn move_tree(store: &mut Store, src: &str, dst: &str) -> Result<()> {
    if !store.directory_exists(dst) {
        store.add_directory(dst)?;
    }

    for subdir in search(store, src, "*", SearchOption::TopDirectoryOnly, true)? {
        let target = rebase(&subdir, src, dst);
        move_tree(store, &subdir, &target)?;
    }

    for file in search(store, src, "*", SearchOption::TopDirectoryOnly, false)? {
        let target = rebase(&file, src, dst);
        if let Some(entry) = store.remove(&file) {
            store.put(&target, entry)?;
        }
    }

    store.remove(src);
    Ok(())
}

impl<'a> MockDirectory<'a> {
    pub fn new(fs: &'a MockFileSystem) -> Self {
        Self { fs }
    }

    fn platform(&self) -> Platform {
        self.fs.platform()
    }

    fn resolve_dir(&self, path: &str) -> Result<String> {
        let resolved = self.fs.resolve(path)?;
        Ok(self.platform().with_trailing_separator(&resolved))
    }

    fn enumerate(
        &self,
        path: &str,
        pattern: &str,
        option: SearchOption,
        directories: bool,
    ) -> Result<Vec<String>> {
        let dir = self.resolve_dir(path)?;
        let store = self.fs.lock();
        if !store.directory_exists(&dir) {
            return Err(VfsError::directory_not_found(path));
        }
        search(&store, &dir, pattern, option, directories)
    }

    /// Root of `path` (`C:\`, `\\server\share`, `/`).
    pub fn get_directory_root(&self, path: &str) -> Result<String> {
        let resolved = self.fs.resolve(path)?;
        Ok(canonical::get_root(&resolved, self.platform()))
    }

    /// Lower-cased roots of all stored directories, in order of first appearance.
    pub fn get_logical_drives(&self) -> Vec<String> {
        let platform = self.platform();
        let mut drives: Vec<String> = Vec::new();
        for dir in self.fs.all_directories() {
            let root = platform
                .with_trailing_separator(&canonical::get_root(&dir, platform))
                .to_lowercase();
            if !drives.contains(&root) {
                drives.push(root);
            }
        }
        drives
    }

    pub fn get_creation_time(&self, path: &str) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_creation_time(path)
    }

    pub fn get_creation_time_utc(&self, path: &str) -> Result<DateTime<Utc>> {
        self.fs.file().get_creation_time_utc(path)
    }

    pub fn get_last_access_time(&self, path: &str) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_last_access_time(path)
    }

    pub fn get_last_access_time_utc(&self, path: &str) -> Result<DateTime<Utc>> {
        self.fs.file().get_last_access_time_utc(path)
    }

    pub fn get_last_write_time(&self, path: &str) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_last_write_time(path)
    }

    pub fn get_last_write_time_utc(&self, path: &str) -> Result<DateTime<Utc>> {
        self.fs.file().get_last_write_time_utc(path)
    }

    pub fn set_creation_time(&self, path: &str, time: DateTime<FixedOffset>) -> Result<()> {
        self.fs.file().set_creation_time(path, time)
    }

    pub fn set_creation_time_utc(&self, path: &str, time: DateTime<Utc>) -> Result<()> {
        self.fs.file().set_creation_time_utc(path, time)
    }

    pub fn set_last_access_time(&self, path: &str, time: DateTime<FixedOffset>) -> Result<()> {
        self.fs.file().set_last_access_time(path, time)
    }

    pub fn set_last_access_time_utc(&self, path: &str, time: DateTime<Utc>) -> Result<()> {
        self.fs.file().set_last_access_time_utc(path, time)
    }

    pub fn set_last_write_time(&self, path: &str, time: DateTime<FixedOffset>) -> Result<()> {
        self.fs.file().set_last_write_time(path, time)
    }

    pub fn set_last_write_time_utc(&self, path: &str, time: DateTime<Utc>) -> Result<()> {
        self.fs.file().set_last_write_time_utc(path, time)
    }
}

impl<'a> DirectoryBackend for MockDirectory<'a> {
    type Info = DirectoryInfo<'a>;

    /// Creates the directory `path` and all its missing ancestors.
    ///
    /// # Errors
    /// * `InvalidArgument` if `path` is empty or malformed.
    /// * `AlreadyExists` if a file occupies `path` or one of its ancestors.
    fn create_directory(&self, path: &str) -> Result<DirectoryInfo<'a>> {
        if path.is_empty() {
            return Err(VfsError::invalid_argument(
                "path cannot be the empty string or all whitespace",
            ));
        }

        let resolved = self.fs.resolve(path)?;
        let dir = self.platform().with_trailing_separator(&resolved);
        {
            let mut store = self.fs.lock();
            let file_key = resolved.trim_end_matches(self.platform().separator());
            if store.get(file_key).is_some_and(|e| e.is_file()) {
                return Err(VfsError::already_exists(format!(
                    "cannot create \"{path}\" because a file or directory with the same name already exists"
                )));
            }
            if !store.directory_exists(&dir) {
                debug!(path = %dir, "create directory");
                store.add_directory(&dir)?;
            }
        }
        DirectoryInfo::new(self.fs, &dir)
    }

    /// Removes the directory `path`.
    ///
    /// Every stored path starting with `path` plus a separator counts as
    /// affected, the directory entry itself included.
    ///
    /// # Errors
    /// * `DirectoryNotFound` if nothing is stored under `path`.
    /// * `AlreadyExists` if `recursive` is false and the directory is not empty.
    fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        let dir = self.resolve_dir(path)?;
        let mut store = self.fs.lock();
        let affected = store.paths_with_prefix(&dir);

        if affected.is_empty() {
            return Err(VfsError::directory_not_found(format!(
                "{dir} does not exist or could not be found"
            )));
        }
        if !recursive && affected.len() > 1 {
            return Err(VfsError::already_exists(format!(
                "the directory specified by {dir} is read-only, or recursive is false and {dir} is not an empty directory"
            )));
        }

        debug!(path = %dir, recursive, count = affected.len(), "delete directory");
        for p in &affected {
            store.remove(p);
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.fs.directory_exists(path)
    }

    /// # Errors
    /// * `DirectoryNotFound` if `path` is not an existing directory.
    /// * `InvalidArgument` for a malformed path or search pattern.
    fn get_files(&self, path: &str, pattern: &str, option: SearchOption) -> Result<Vec<String>> {
        self.enumerate(path, pattern, option, false)
    }

    fn get_directories(&self, path: &str, pattern: &str, option: SearchOption) -> Result<Vec<String>> {
        self.enumerate(path, pattern, option, true)
    }

    fn get_file_system_entries(
        &self,
        path: &str,
        pattern: &str,
        option: SearchOption,
    ) -> Result<Vec<String>> {
        let mut entries = self.get_directories(path, pattern, option)?;
        entries.extend(self.get_files(path, pattern, option)?);
        Ok(entries)
    }

    /// Parent directory of `path`.
    ///
    /// # Returns
    /// `None` if `path` is a root.
    ///
    /// # Errors
    /// * `InvalidArgument` if `path` is empty or contains reserved characters.
    fn get_parent(&self, path: &str) -> Result<Option<DirectoryInfo<'a>>> {
        if path.is_empty() {
            return Err(VfsError::invalid_argument(
                "path cannot be the empty string or all whitespace",
            ));
        }
        if self.platform().has_illegal_characters(path) {
            return Err(VfsError::invalid_argument("path contains invalid path characters"));
        }

        let resolved = self.fs.resolve(path)?;
        canonical::parent(&resolved, self.platform())
            .map(|parent| DirectoryInfo::new(self.fs, &parent))
            .transpose()
    }

    /// Moves the directory `source` with everything below it to `destination`.
    ///
    /// The destination is created if needed; files already present there stay
    /// untouched unless they collide with a moved file, which is an error
    /// raised before anything is changed.
    ///
    /// # Errors
    /// * `SamePath` if both paths resolve to the same directory.
    /// * `CrossRoot` if the paths live under different roots.
    /// * `MoveIntoSelf` if `destination` lies inside `source`.
    /// * `DirectoryNotFound` if `source` does not exist.
    /// * `AlreadyExists` if `destination` or a moved subdirectory would land on
    ///   an existing file, or a moved file on any existing entry.
    fn move_to(&self, source: &str, destination: &str) -> Result<()> {
        let platform = self.platform();
        let src = self.resolve_dir(source)?;
        let dst = self.resolve_dir(destination)?;

        if same_path(&src, &dst) {
            return Err(VfsError::SamePath(src));
        }

        let src_root = canonical::get_root(&src, platform);
        let dst_root = canonical::get_root(&dst, platform);
        if !same_path(&src_root, &dst_root) {
            return Err(VfsError::CrossRoot { from: src, to: dst });
        }
        if dst.to_lowercase().starts_with(&src.to_lowercase()) {
            return Err(VfsError::MoveIntoSelf { from: src, to: dst });
        }

        let mut store = self.fs.lock();
        if !store.directory_exists(&src) {
            return Err(VfsError::directory_not_found(source));
        }

        let sep = platform.separator();
        let subdirs = search(&store, &src, "*", SearchOption::AllDirectories, true)?;
        let dir_taken = std::iter::once(dst.clone())
            .chain(subdirs.iter().map(|dir| rebase(dir, &src, &dst)))
            .find(|target| store.get(target.trim_end_matches(sep)).is_some_and(Entry::is_file));
        let files = search(&store, &src, "*", SearchOption::AllDirectories, false)?;
        let file_taken = files
            .iter()
            .map(|file| rebase(file, &src, &dst))
            .find(|target| store.exists(target) || store.directory_exists(target));
        if let Some(taken) = dir_taken.or(file_taken) {
            return Err(VfsError::already_exists(format!(
                "cannot move to {taken} because a file or directory with the same name already exists"
            )));
        }

        debug!(from = %src, to = %dst, "move directory");
        move_tree(&mut store, &src, &dst)
    }

    fn get_current_directory(&self) -> String {
        self.fs.current_directory()
    }

    /// Changes the directory relative paths resolve against. The target does
    /// not have to exist.
    fn set_current_directory(&self, path: &str) -> Result<()> {
        let resolved = self.fs.resolve(path)?;
        self.fs.set_cwd(resolved);
        Ok(())
    }
}
