pub mod canonical;
pub mod pattern;

mod directory;
mod drive;
mod entry;
mod file;
mod info;
mod mock_fs;
mod path;
mod platform;
mod store;

pub use directory::MockDirectory;
pub use drive::{DriveInfo, DriveType};
pub use entry::{Entry, EntryType, FileAttributes, missing_entry_time};
pub use file::MockFile;
pub use info::{DirectoryInfo, FileInfo};
pub use mock_fs::{MockFileSystem, MockFileSystemBuilder};
pub use path::MockPath;
pub use platform::{PLATFORM_ENV_VAR, Platform};

pub(crate) use store::Store;
