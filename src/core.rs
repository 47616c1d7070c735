//! Backend traits shared by every file system flavor.
//!
//! A pass-through implementation over the host file system and the in-memory
//! [`MockFileSystem`](crate::MockFileSystem) expose the same operation set
//! through these traits, so code under test can be written against
//! `impl FileSystem` and handed either one.

use crate::error::VfsError;
use crate::vfs::FileAttributes;

pub type Result<T> = std::result::Result<T, VfsError>;

/// Scope of an enumeration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SearchOption {
    /// Immediate children of the searched directory.
    #[default]
    TopDirectoryOnly,
    /// The whole subtree below the searched directory.
    AllDirectories,
}

/// Entry point handing out the directory, file and path services.
pub trait FileSystem {
    type Directory<'a>: DirectoryBackend
    where
        Self: 'a;
    type File<'a>: FileBackend
    where
        Self: 'a;
    type Path<'a>: PathBackend
    where
        Self: 'a;

    fn directory(&self) -> Self::Directory<'_>;
    fn file(&self) -> Self::File<'_>;
    fn path(&self) -> Self::Path<'_>;
}

pub trait DirectoryBackend {
    /// Handle returned for created and parent directories.
    type Info;

    /// Creates `path` and all missing ancestors. Existing directories are left alone.
    fn create_directory(&self, path: &str) -> Result<Self::Info>;

    /// Removes the directory `path`; with `recursive` also everything below it.
    fn delete(&self, path: &str, recursive: bool) -> Result<()>;

    /// True if `path` names an existing directory. Never fails.
    fn exists(&self, path: &str) -> bool;

    /// Files below `path` whose names match `pattern`.
    fn get_files(&self, path: &str, pattern: &str, option: SearchOption) -> Result<Vec<String>>;

    /// Directories below `path` whose names match `pattern`; `path` itself is excluded.
    fn get_directories(&self, path: &str, pattern: &str, option: SearchOption) -> Result<Vec<String>>;

    /// Directories followed by files.
    fn get_file_system_entries(
        &self,
        path: &str,
        pattern: &str,
        option: SearchOption,
    ) -> Result<Vec<String>>;

    /// Parent directory of `path`, `None` at a root.
    fn get_parent(&self, path: &str) -> Result<Option<Self::Info>>;

    /// Moves the directory `source` with all its content to `destination`.
    fn move_to(&self, source: &str, destination: &str) -> Result<()>;

    fn get_current_directory(&self) -> String;

    fn set_current_directory(&self, path: &str) -> Result<()>;

    /// Immediate child files of `path`.
    fn files(&self, path: &str) -> Result<Vec<String>> {
        self.get_files(path, "*", SearchOption::TopDirectoryOnly)
    }

    /// Immediate child directories of `path`.
    fn directories(&self, path: &str) -> Result<Vec<String>> {
        self.get_directories(path, "*", SearchOption::TopDirectoryOnly)
    }

    /// Immediate children of `path`, directories first.
    fn entries(&self, path: &str) -> Result<Vec<String>> {
        self.get_file_system_entries(path, "*", SearchOption::TopDirectoryOnly)
    }
}

pub trait FileBackend {
    /// True if `path` names an existing file. Never fails.
    fn exists(&self, path: &str) -> bool;
    fn read_all_bytes(&self, path: &str) -> Result<Vec<u8>>;
    fn read_all_text(&self, path: &str) -> Result<String>;
    fn read_all_lines(&self, path: &str) -> Result<Vec<String>>;
    fn write_all_bytes(&self, path: &str, bytes: &[u8]) -> Result<()>;
    fn write_all_text(&self, path: &str, text: &str) -> Result<()>;
    fn write_all_lines(&self, path: &str, lines: &[&str]) -> Result<()>;
    fn append_all_text(&self, path: &str, text: &str) -> Result<()>;
    fn append_all_lines(&self, path: &str, lines: &[&str]) -> Result<()>;
    fn copy(&self, source: &str, destination: &str, overwrite: bool) -> Result<()>;
    fn move_to(&self, source: &str, destination: &str) -> Result<()>;
    fn delete(&self, path: &str) -> Result<()>;
    fn get_attributes(&self, path: &str) -> Result<FileAttributes>;
    fn set_attributes(&self, path: &str, attributes: FileAttributes) -> Result<()>;
}

pub trait PathBackend {
    /// Absolute canonical form of `path`.
    fn get_full_path(&self, path: &str) -> Result<String>;
    fn get_path_root(&self, path: &str) -> String;
    fn get_directory_name(&self, path: &str) -> Option<String>;
    fn get_file_name(&self, path: &str) -> String;
    fn get_extension(&self, path: &str) -> String;
    fn combine(&self, parts: &[&str]) -> Result<String>;
    fn get_temp_path(&self) -> String;
}
