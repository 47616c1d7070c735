//! An in-memory file system test double for Rust.
//! Emulates directories, files and paths of a real disk without touching it,
//! so code written against the file system traits can be tested deterministically.
//!
//! ### Overview
//!
//! `mockfs-kit` defines the backend traits `FileSystem`, `DirectoryBackend`, `FileBackend`
//! and `PathBackend`, and implements them with `MockFileSystem`, a flat case-insensitive
//! store that reproduces hierarchical semantics on top of it.
//!
//! **Key ideas**:
//! - **Path semantics**: drive-rooted (`C:\`), UNC (`\\server\share`) and Unix (`/`) paths,
//!   `.`/`..` resolution against a current directory and root clamping.
//! - **Search**: `*`/`?` wildcard patterns, top-level or recursive, including the legacy
//!   three-character extension rule (`*.htm` also finds `page.html`).
//! - **Cascades**: creating a file creates its ancestors; deleting or moving a directory
//!   takes everything below it along.
//! - **Host independence**: the `Platform` is chosen per instance, so Windows behavior can be
//!   tested on Linux and vice versa.
//!
//! ### Example
//!
//! ```
//! use mockfs_kit::{DirectoryBackend, FileBackend, FileSystem, MockFileSystem, Platform, SearchOption};
//!
//! let fs = MockFileSystem::builder()
//!     .platform(Platform::Windows)
//!     .current_directory("C:\\work")
//!     .file("C:\\work\\index.htm", "<html/>")
//!     .file("C:\\work\\about.html", "<html/>")
//!     .build()
//!     .unwrap();
//!
//! let pages = fs.directory().get_files("..\\work", "*.htm", SearchOption::TopDirectoryOnly).unwrap();
//! assert_eq!(pages.len(), 2);
//! assert_eq!(fs.file().read_all_text("index.htm").unwrap(), "<html/>");
//! ```

pub mod core;
pub mod error;
pub mod vfs;

pub use crate::core::{DirectoryBackend, FileBackend, FileSystem, PathBackend, Result, SearchOption};
pub use error::VfsError;
pub use vfs::{
    DirectoryInfo, DriveInfo, DriveType, Entry, EntryType, FileAttributes, FileInfo,
    MockDirectory, MockFile, MockFileSystem, MockFileSystemBuilder, MockPath, PLATFORM_ENV_VAR,
    Platform, canonical, missing_entry_time, pattern,
};
