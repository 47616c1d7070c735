//! This module provides the in-memory file system double.

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use super::{
    DirectoryInfo, DriveInfo, Entry, FileInfo, MockDirectory, MockFile, MockPath, Platform,
    Store, canonical,
};
use crate::core::{FileSystem, Result};
use crate::error::VfsError;

/// A file system that lives entirely in memory.
///
/// `MockFileSystem` emulates the semantics of a real disk on top of a flat,
/// case-insensitive map from canonical path to [`Entry`]: drive, UNC and Unix
/// roots, `.`/`..` resolution against a current directory, wildcard search and
/// cascading directory create, delete and move.
///
/// ### Internal state
///
/// * `platform` - path conventions in force (separator, roots, reserved chars).
/// * `store` - every file and directory entry. Directory keys carry a trailing
///   separator, file keys do not.
/// * `cwd` - the current directory, used only to resolve relative inputs. It is
///   not required to exist in `store`.
///
/// ### Thread Safety
///
/// The store and the current directory sit behind two separate locks. Every
/// public operation resolves its paths first (current directory lock only),
/// then takes the store lock once and holds it until the operation is done.
/// Internal helpers work on `&mut Store`, so nested steps never lock again.
///
/// ### Example
///
/// ```
/// use mockfs_kit::{Entry, FileBackend, FileSystem, MockFileSystem, Platform};
///
/// let fs = MockFileSystem::builder()
///     .platform(Platform::Windows)
///     .file("C:\\docs\\note.txt", Entry::text("Hello"))
///     .build()
///     .unwrap();
///
/// assert!(fs.directory_exists("c:\\DOCS"));
/// assert_eq!(fs.file().read_all_text("C:\\docs\\note.txt").unwrap(), "Hello");
/// ```
#[derive(Debug)]
pub struct MockFileSystem {
    platform: Platform,
    store: Mutex<Store>,
    cwd: Mutex<String>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    /// Creates an empty file system for the detected platform, rooted in its temp path.
    pub fn new() -> Self {
        Self::with_platform(Platform::detect())
    }

    pub fn with_platform(platform: Platform) -> Self {
        Self {
            platform,
            store: Mutex::new(Store::new(platform)),
            cwd: Mutex::new(platform.temp_path()),
        }
    }

    pub fn builder() -> MockFileSystemBuilder {
        MockFileSystemBuilder::default()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock()
    }

    pub(crate) fn current_directory(&self) -> String {
        self.cwd.lock().clone()
    }

    pub(crate) fn set_cwd(&self, path: String) {
        debug!(cwd = %path, "change current directory");
        *self.cwd.lock() = path;
    }

    /// Canonical absolute form of `path` against the current directory.
    pub fn resolve(&self, path: &str) -> Result<String> {
        let cwd = self.current_directory();
        canonical::resolve(path, &cwd, self.platform)
    }

    /// Stores `entry` at `path`, creating missing parent directories.
    ///
    /// # Errors
    /// * `InvalidArgument` if `path` cannot be resolved.
    /// * `UnauthorizedAccess` if the present entry at `path` is read-only or hidden.
    pub fn add_file(&self, path: &str, entry: impl Into<Entry>) -> Result<()> {
        let path = self.resolve(path)?;
        self.lock().put(&path, entry.into())
    }

    /// Creates the directory `path` together with all its ancestors.
    ///
    /// Unlike [`DirectoryBackend::create_directory`](crate::DirectoryBackend::create_directory)
    /// this accepts `\\server\share` itself, which is handy for seeding UNC shares.
    pub fn add_directory(&self, path: &str) -> Result<()> {
        let path = self.resolve(path)?;
        self.lock().add_directory(&path)
    }

    /// Drops the entry stored exactly at `path`. Absent paths are ignored.
    pub fn remove_file(&self, path: &str) -> Result<()> {
        let path = self.resolve(path)?;
        self.lock().remove(&path);
        Ok(())
    }

    /// True if an entry (file, or directory spelled with its trailing separator)
    /// is stored exactly at `path`. Invalid paths are reported as absent.
    pub fn file_exists(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        self.resolve(path)
            .map(|path| self.lock().exists(&path))
            .unwrap_or(false)
    }

    pub fn directory_exists(&self, path: &str) -> bool {
        self.resolve(path)
            .map(|path| self.lock().directory_exists(&path))
            .unwrap_or(false)
    }

    /// Snapshot of the entry stored exactly at `path`.
    pub fn get_file(&self, path: &str) -> Option<Entry> {
        let path = self.resolve(path).ok()?;
        self.lock().get(&path).cloned()
    }

    /// Applies `f` to the entry stored at `path` (file key first, then directory key).
    pub fn update_entry<T>(&self, path: &str, f: impl FnOnce(&mut Entry) -> T) -> Result<T> {
        let path = self.resolve(path)?;
        let mut store = self.lock();
        store
            .lookup_mut(&path)
            .map(f)
            .ok_or_else(|| VfsError::file_not_found(path))
    }

    pub fn all_paths(&self) -> Vec<String> {
        self.lock().all_paths()
    }

    pub fn all_files(&self) -> Vec<String> {
        self.lock().all_files()
    }

    pub fn all_directories(&self) -> Vec<String> {
        self.lock().all_directories()
    }

    pub fn directory_info(&self, path: &str) -> Result<DirectoryInfo<'_>> {
        DirectoryInfo::new(self, path)
    }

    pub fn file_info(&self, path: &str) -> Result<FileInfo<'_>> {
        FileInfo::new(self, path)
    }

    pub fn drive_info(&self, name: &str) -> Result<DriveInfo<'_>> {
        DriveInfo::new(self, name)
    }

    /// One drive per distinct drive root among all stored paths.
    pub fn drives(&self) -> Vec<DriveInfo<'_>> {
        let mut roots: Vec<String> = Vec::new();
        for path in self.all_paths() {
            let root = canonical::get_root(&path, self.platform).to_lowercase();
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
            .iter()
            .filter_map(|root| DriveInfo::new(self, root).ok())
            .collect()
    }
}

impl FileSystem for MockFileSystem {
    type Directory<'a> = MockDirectory<'a>;
    type File<'a> = MockFile<'a>;
    type Path<'a> = MockPath<'a>;

    fn directory(&self) -> MockDirectory<'_> {
        MockDirectory::new(self)
    }

    fn file(&self) -> MockFile<'_> {
        MockFile::new(self)
    }

    fn path(&self) -> MockPath<'_> {
        MockPath::new(self)
    }
}

/// Seeds a [`MockFileSystem`] before it is handed to the code under test.
#[derive(Debug, Default)]
pub struct MockFileSystemBuilder {
    platform: Option<Platform>,
    current_directory: Option<String>,
    files: Vec<(String, Entry)>,
    directories: Vec<String>,
}

impl MockFileSystemBuilder {
    /// Path conventions to emulate. Defaults to [`Platform::detect`].
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Initial current directory. Defaults to the platform temp path.
    pub fn current_directory(mut self, path: impl Into<String>) -> Self {
        self.current_directory = Some(path.into());
        self
    }

    pub fn file(mut self, path: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.files.push((path.into(), entry.into()));
        self
    }

    pub fn directory(mut self, path: impl Into<String>) -> Self {
        self.directories.push(path.into());
        self
    }

    /// Builds the file system; directories are added before files.
    ///
    /// # Errors
    /// Any error `add_directory`/`add_file` would raise for the seeded paths.
    pub fn build(self) -> Result<MockFileSystem> {
        let fs = MockFileSystem::with_platform(self.platform.unwrap_or_default());
        if let Some(cwd) = self.current_directory.filter(|cwd| !cwd.is_empty()) {
            fs.set_cwd(cwd);
        }
        for dir in &self.directories {
            fs.add_directory(dir)?;
        }
        for (path, entry) in self.files {
            fs.add_file(&path, entry)?;
        }
        Ok(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileAttributes;

    fn setup_windows() -> MockFileSystem {
        MockFileSystem::with_platform(Platform::Windows)
    }

    mod accessors {
        use super::*;

        #[test]
        fn test_add_file_creates_folders() -> Result<()> {
            let fs = setup_windows();
            fs.add_file("C:\\a\\b\\c.txt", "content")?;
            assert!(fs.directory_exists("c:\\a"));
            assert!(fs.directory_exists("C:\\A\\B\\"));
            assert!(fs.file_exists("c:\\A\\b\\C.TXT"));
            Ok(())
        }

        #[test]
        fn test_case_insensitive_identity() -> Result<()> {
            let fs = setup_windows();
            fs.add_file("c:\\foo\\bar.txt", "x")?;
            assert!(fs.directory_exists("C:\\Foo"));
            assert_eq!(fs.all_files(), vec!["c:\\foo\\bar.txt"]);
            Ok(())
        }

        #[test]
        fn test_add_file_over_read_only() -> Result<()> {
            let fs = setup_windows();
            fs.add_file("c:\\ro.txt", Entry::text("x").with_attributes(FileAttributes::READ_ONLY))?;
            assert!(matches!(
                fs.add_file("c:\\ro.txt", "y"),
                Err(VfsError::UnauthorizedAccess(_))
            ));
            Ok(())
        }

        #[test]
        fn test_remove_file() -> Result<()> {
            let fs = setup_windows();
            fs.add_file("c:\\a.txt", "x")?;
            fs.remove_file("C:\\A.TXT")?;
            assert!(!fs.file_exists("c:\\a.txt"));
            fs.remove_file("c:\\never-there.txt")?;
            Ok(())
        }

        #[test]
        fn test_file_exists_on_invalid_input() {
            let fs = setup_windows();
            assert!(!fs.file_exists(""));
            assert!(!fs.file_exists("c:\\a<b"));
            assert!(fs.get_file("\\\\server").is_none());
        }

        #[test]
        fn test_get_file_returns_snapshot() -> Result<()> {
            let fs = setup_windows();
            fs.add_file("c:\\a.txt", "x")?;
            let mut snapshot = fs.get_file("c:\\a.txt").unwrap();
            snapshot.set_content("changed");
            assert_eq!(fs.get_file("c:\\a.txt").unwrap().content(), b"x");
            Ok(())
        }

        #[test]
        fn test_update_entry() -> Result<()> {
            let fs = setup_windows();
            fs.add_directory("c:\\dir")?;
            fs.update_entry("c:\\dir", |e| e.set_attributes(FileAttributes::DIRECTORY | FileAttributes::HIDDEN))?;
            assert!(fs
                .get_file("c:\\dir\\")
                .unwrap()
                .attributes()
                .contains(FileAttributes::HIDDEN));
            assert!(matches!(
                fs.update_entry("c:\\missing", |_| ()),
                Err(VfsError::FileNotFound(_))
            ));
            Ok(())
        }

        #[test]
        fn test_relative_paths_use_current_directory() -> Result<()> {
            let fs = MockFileSystem::builder()
                .platform(Platform::Windows)
                .current_directory("C:\\work")
                .build()?;
            fs.add_file("notes\\a.txt", "x")?;
            assert_eq!(fs.all_files(), vec!["C:\\work\\notes\\a.txt"]);
            Ok(())
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn test_seeded_entries() -> Result<()> {
            let fs = MockFileSystem::builder()
                .platform(Platform::Windows)
                .directory("c:\\empty")
                .file("c:\\docs\\a.txt", "a")
                .file("c:\\docs\\b.bin", vec![1u8, 2, 3])
                .build()?;
            assert_eq!(
                fs.all_paths(),
                vec!["c:\\", "c:\\empty\\", "c:\\docs\\", "c:\\docs\\a.txt", "c:\\docs\\b.bin"]
            );
            assert_eq!(fs.get_file("c:\\docs\\b.bin").unwrap().content(), &[1, 2, 3]);
            Ok(())
        }

        #[test]
        fn test_default_current_directory_is_temp_path() {
            let fs = MockFileSystem::with_platform(Platform::Unix);
            assert!(fs.current_directory().ends_with('/'));
        }

        #[test]
        fn test_unix_platform() -> Result<()> {
            let fs = MockFileSystem::builder()
                .platform(Platform::Unix)
                .current_directory("/home/user")
                .file("docs/a.txt", "a")
                .build()?;
            assert_eq!(fs.all_directories(), vec!["/", "/home/", "/home/user/", "/home/user/docs/"]);
            assert!(fs.file_exists("/home/user/docs/a.txt"));
            Ok(())
        }

        #[test]
        fn test_invalid_seed_fails() {
            let result = MockFileSystem::builder()
                .platform(Platform::Windows)
                .directory("\\\\server")
                .build();
            assert!(matches!(result, Err(VfsError::InvalidArgument(_))));
        }
    }

    mod drives {
        use super::*;

        #[test]
        fn test_drives_are_distinct() -> Result<()> {
            let fs = setup_windows();
            fs.add_file("C:\\a.txt", "")?;
            fs.add_file("c:\\b\\c.txt", "")?;
            fs.add_file("D:\\d.txt", "")?;
            fs.add_directory("\\\\server\\share")?;
            let names: Vec<String> = fs.drives().iter().map(|d| d.name().to_string()).collect();
            assert_eq!(names, vec!["c:\\", "d:\\"]);
            Ok(())
        }
    }

    mod threads {
        use super::*;
        use crate::{DirectoryBackend, FileBackend};

        fn assert_send_sync<T: Send + Sync>() {}

        #[test]
        fn test_is_send_and_sync() {
            assert_send_sync::<MockFileSystem>();
        }

        #[test]
        fn test_shared_between_threads() -> Result<()> {
            let fs = setup_windows();
            std::thread::scope(|s| -> Result<()> {
                let handles: Vec<_> = (0..4)
                    .map(|worker| {
                        let fs = &fs;
                        s.spawn(move || -> Result<()> {
                            for i in 0..25 {
                                fs.add_file(&format!("c:\\w{worker}\\f{i}.txt"), format!("{worker}-{i}"))?;
                            }
                            fs.directory().create_directory(&format!("c:\\w{worker}\\tmp"))?;
                            fs.directory().delete(&format!("c:\\w{worker}\\tmp"), true)
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap()?;
                }
                Ok(())
            })?;

            assert_eq!(fs.all_files().len(), 100);
            for worker in 0..4 {
                assert!(!fs.directory_exists(&format!("c:\\w{worker}\\tmp")));
            }
            assert_eq!(fs.file().read_all_text("c:\\w3\\f24.txt")?, "3-24");
            Ok(())
        }
    }
}
