//! Path string helpers bound to a `MockFileSystem`.
//!
//! Apart from [`PathBackend::get_full_path`] and [`MockPath::get_temp_file_name`]
//! everything here is pure string manipulation under the file system's
//! [`Platform`] rules; the store is never consulted.

use uuid::Uuid;

use super::{Entry, MockFileSystem, Platform, canonical};
use crate::core::{PathBackend, Result};
use crate::error::VfsError;

/// Path helpers of a [`MockFileSystem`], obtained via `fs.path()`.
#[derive(Debug, Clone, Copy)]
pub struct MockPath<'a> {
    fs: &'a MockFileSystem,
}

impl<'a> MockPath<'a> {
    pub fn new(fs: &'a MockFileSystem) -> Self {
        Self { fs }
    }

    fn platform(&self) -> Platform {
        self.fs.platform()
    }

    fn last_separator(&self, path: &str) -> Option<usize> {
        let platform = self.platform();
        path.rfind(|c| platform.is_separator(c))
    }

    pub fn directory_separator_char(&self) -> char {
        self.platform().separator()
    }

    pub fn alt_directory_separator_char(&self) -> char {
        self.platform().alt_separator()
    }

    /// Separator between entries of a `PATH`-like variable.
    pub fn path_separator(&self) -> char {
        if self.platform().is_unix() { ':' } else { ';' }
    }

    pub fn get_invalid_path_chars(&self) -> Vec<char> {
        self.platform().invalid_path_chars()
    }

    /// Characters a single file name may not contain.
    pub fn get_invalid_file_name_chars(&self) -> Vec<char> {
        let mut chars = self.get_invalid_path_chars();
        match self.platform() {
            Platform::Windows => chars.extend([':', '*', '?', '\\', '/']),
            Platform::Unix => chars.push('/'),
        }
        chars
    }

    /// True if `path` names a root (`C:`, `\`, `\\server\share`, `/`) at its start.
    pub fn is_path_rooted(&self, path: &str) -> bool {
        !canonical::get_root(path, self.platform()).is_empty()
    }

    pub fn has_extension(&self, path: &str) -> bool {
        !self.get_extension(path).is_empty()
    }

    pub fn get_file_name_without_extension(&self, path: &str) -> String {
        let name = self.get_file_name(path);
        match name.rfind('.') {
            Some(idx) => name[..idx].to_string(),
            None => name,
        }
    }

    /// Replaces the extension of `path`; `None` removes it.
    ///
    /// The new extension may be given with or without its leading dot.
    pub fn change_extension(&self, path: &str, extension: Option<&str>) -> String {
        let name_start = self.last_separator(path).map_or(0, |idx| idx + 1);
        let stem = match path[name_start..].rfind('.') {
            Some(idx) => &path[..name_start + idx],
            None => path,
        };
        match extension {
            None => stem.to_string(),
            Some(ext) if ext.starts_with('.') => format!("{stem}{ext}"),
            Some(ext) => format!("{stem}.{ext}"),
        }
    }

    /// Random 8.3 file name, e.g. `k3m1zq0a.v5d`. Nothing is created.
    pub fn get_random_file_name(&self) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("{}.{}", &hex[..8], &hex[8..11])
    }

    /// Creates an empty file with a random name in the temp path and returns its path.
    pub fn get_temp_file_name(&self) -> Result<String> {
        let path = self.combine(&[&self.get_temp_path(), &self.get_random_file_name()])?;
        self.fs.add_file(&path, Entry::file(Vec::new()))?;
        Ok(path)
    }
}

impl PathBackend for MockPath<'_> {
    fn get_full_path(&self, path: &str) -> Result<String> {
        self.fs.resolve(path)
    }

    fn get_path_root(&self, path: &str) -> String {
        let platform = self.platform();
        canonical::get_root(&platform.fix_separators(path), platform)
    }

    /// Everything before the last separator, `None` for a root or an empty path.
    fn get_directory_name(&self, path: &str) -> Option<String> {
        let platform = self.platform();
        let path = platform.fix_separators(path);
        let root = canonical::get_root(&path, platform);
        if path.len() <= root.len() {
            return None;
        }
        match self.last_separator(&path) {
            Some(idx) if idx >= root.len() => Some(path[..idx].to_string()),
            _ => Some(root),
        }
    }

    fn get_file_name(&self, path: &str) -> String {
        let start = self.last_separator(path).map_or(0, |idx| idx + 1);
        let name = &path[start..];
        // `C:name` on Windows
        match (self.platform(), name.char_indices().nth(1)) {
            (Platform::Windows, Some((1, ':'))) if start == 0 => name[2..].to_string(),
            _ => name.to_string(),
        }
    }

    /// Extension with its dot, or an empty string.
    fn get_extension(&self, path: &str) -> String {
        let name = self.get_file_name(path);
        match name.rfind('.') {
            Some(idx) if idx + 1 < name.len() => name[idx..].to_string(),
            _ => String::new(),
        }
    }

    /// Joins `parts` with the separator. A rooted part discards everything before it.
    ///
    /// # Errors
    /// * `InvalidArgument` if a part contains reserved characters.
    fn combine(&self, parts: &[&str]) -> Result<String> {
        let platform = self.platform();
        let mut combined = String::new();
        for part in parts {
            if platform.has_illegal_characters(part) {
                return Err(VfsError::invalid_argument(format!(
                    "illegal characters in path: {part:?}"
                )));
            }
            if part.is_empty() {
                continue;
            }
            if self.is_path_rooted(part) {
                combined = part.to_string();
                continue;
            }
            let needs_separator = combined
                .chars()
                .last()
                .is_some_and(|c| !platform.is_separator(c) && !(c == ':' && !platform.is_unix()));
            if needs_separator {
                combined.push(platform.separator());
            }
            combined.push_str(part);
        }
        Ok(combined)
    }

    fn get_temp_path(&self) -> String {
        self.platform().temp_path()
    }
}
