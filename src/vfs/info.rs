//! Object handles over single directories and files.

use chrono::{DateTime, FixedOffset};

use super::{FileAttributes, MockFileSystem, Platform, canonical};
use crate::core::{DirectoryBackend, FileBackend, FileSystem, PathBackend, Result, SearchOption};
use crate::error::VfsError;

/// Display form of a canonical directory path: no trailing separator,
/// except for drive and Unix roots (`C:\`, `/`).
fn directory_display(path: &str, platform: Platform) -> String {
    let sep = platform.separator();
    let root = canonical::get_root(path, platform);
    let trimmed = path.trim_end_matches(sep);
    if trimmed.len() <= root.trim_end_matches(sep).len() {
        root
    } else {
        trimmed.to_string()
    }
}

/// Handle on one directory path; the directory does not have to exist.
#[derive(Debug, Clone)]
pub struct DirectoryInfo<'a> {
    fs: &'a MockFileSystem,
    full_name: String,
}

impl<'a> DirectoryInfo<'a> {
    pub fn new(fs: &'a MockFileSystem, path: &str) -> Result<Self> {
        let resolved = fs.resolve(path)?;
        Ok(Self {
            fs,
            full_name: directory_display(&resolved, fs.platform()),
        })
    }

    /// Absolute path without a trailing separator (roots keep theirs).
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last path segment, or the full name for a root.
    pub fn name(&self) -> String {
        let root = canonical::get_root(&self.full_name, self.fs.platform());
        if self.full_name.len() <= root.len() {
            return self.full_name.clone();
        }
        self.fs.path().get_file_name(&self.full_name)
    }

    pub fn exists(&self) -> bool {
        self.fs.directory_exists(&self.full_name)
    }

    pub fn parent(&self) -> Result<Option<DirectoryInfo<'a>>> {
        canonical::parent(&self.full_name, self.fs.platform())
            .map(|parent| DirectoryInfo::new(self.fs, &parent))
            .transpose()
    }

    pub fn root(&self) -> Result<DirectoryInfo<'a>> {
        let root = canonical::get_root(&self.full_name, self.fs.platform());
        DirectoryInfo::new(self.fs, &root)
    }

    pub fn create(&self) -> Result<()> {
        self.fs.directory().create_directory(&self.full_name).map(|_| ())
    }

    /// Creates `name` below this directory (and this directory if needed).
    pub fn create_subdirectory(&self, name: &str) -> Result<DirectoryInfo<'a>> {
        let path = self.fs.path().combine(&[&self.full_name, name])?;
        self.fs.directory().create_directory(&path)
    }

    pub fn delete(&self, recursive: bool) -> Result<()> {
        self.fs.directory().delete(&self.full_name, recursive)
    }

    pub fn get_files(&self, pattern: &str, option: SearchOption) -> Result<Vec<FileInfo<'a>>> {
        self.fs
            .directory()
            .get_files(&self.full_name, pattern, option)?
            .iter()
            .map(|path| FileInfo::new(self.fs, path))
            .collect()
    }

    pub fn get_directories(
        &self,
        pattern: &str,
        option: SearchOption,
    ) -> Result<Vec<DirectoryInfo<'a>>> {
        self.fs
            .directory()
            .get_directories(&self.full_name, pattern, option)?
            .iter()
            .map(|path| DirectoryInfo::new(self.fs, path))
            .collect()
    }

    /// Moves the directory and points this handle at the new location.
    pub fn move_to(&mut self, destination: &str) -> Result<()> {
        let target = DirectoryInfo::new(self.fs, destination)?;
        self.fs.directory().move_to(&self.full_name, &target.full_name)?;
        self.full_name = target.full_name;
        Ok(())
    }

    pub fn attributes(&self) -> Result<FileAttributes> {
        self.fs.file().get_attributes(&self.full_name)
    }

    pub fn creation_time(&self) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_creation_time(&self.full_name)
    }

    pub fn last_access_time(&self) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_last_access_time(&self.full_name)
    }

    pub fn last_write_time(&self) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_last_write_time(&self.full_name)
    }
}

/// Handle on one file path; the file does not have to exist.
#[derive(Debug, Clone)]
pub struct FileInfo<'a> {
    fs: &'a MockFileSystem,
    full_name: String,
}

impl<'a> FileInfo<'a> {
    pub fn new(fs: &'a MockFileSystem, path: &str) -> Result<Self> {
        Ok(Self {
            fs,
            full_name: fs.resolve(path)?,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> String {
        self.fs.path().get_file_name(&self.full_name)
    }

    pub fn extension(&self) -> String {
        self.fs.path().get_extension(&self.full_name)
    }

    pub fn directory_name(&self) -> Option<String> {
        self.fs.path().get_directory_name(&self.full_name)
    }

    pub fn directory(&self) -> Result<Option<DirectoryInfo<'a>>> {
        self.directory_name()
            .map(|dir| DirectoryInfo::new(self.fs, &dir))
            .transpose()
    }

    pub fn exists(&self) -> bool {
        self.fs.file().exists(&self.full_name)
    }

    /// Size of the content in bytes.
    ///
    /// # Errors
    /// * `FileNotFound` if the file does not exist.
    pub fn length(&self) -> Result<u64> {
        match self.fs.get_file(&self.full_name) {
            Some(entry) if entry.is_file() => Ok(entry.len()),
            _ => Err(VfsError::file_not_found(self.full_name.as_str())),
        }
    }

    pub fn attributes(&self) -> Result<FileAttributes> {
        self.fs.file().get_attributes(&self.full_name)
    }

    pub fn is_read_only(&self) -> Result<bool> {
        Ok(self.attributes()?.contains(FileAttributes::READ_ONLY))
    }

    pub fn set_read_only(&self, read_only: bool) -> Result<()> {
        let mut attributes = self.attributes()?;
        if read_only {
            attributes.insert(FileAttributes::READ_ONLY);
        } else {
            attributes.remove(FileAttributes::READ_ONLY);
        }
        self.fs.file().set_attributes(&self.full_name, attributes)
    }

    pub fn copy_to(&self, destination: &str, overwrite: bool) -> Result<FileInfo<'a>> {
        self.fs.file().copy(&self.full_name, destination, overwrite)?;
        FileInfo::new(self.fs, destination)
    }

    /// Moves the file and points this handle at the new location.
    pub fn move_to(&mut self, destination: &str) -> Result<()> {
        let target = self.fs.resolve(destination)?;
        self.fs.file().move_to(&self.full_name, &target)?;
        self.full_name = target;
        Ok(())
    }

    pub fn delete(&self) -> Result<()> {
        self.fs.file().delete(&self.full_name)
    }

    pub fn creation_time(&self) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_creation_time(&self.full_name)
    }

    pub fn last_access_time(&self) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_last_access_time(&self.full_name)
    }

    pub fn last_write_time(&self) -> Result<DateTime<FixedOffset>> {
        self.fs.file().get_last_write_time(&self.full_name)
    }

    pub fn set_last_write_time(&self, time: DateTime<FixedOffset>) -> Result<()> {
        self.fs.file().set_last_write_time(&self.full_name, time)
    }
}
