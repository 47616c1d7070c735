//! Platform path conventions of the simulated file system.

use std::env;

/// Environment variable that overrides the host-derived default platform.
pub const PLATFORM_ENV_VAR: &str = "MOCKFS_PLATFORM";

/// Path semantics a `MockFileSystem` emulates.
///
/// The platform is configuration, not behavior: it only selects separators,
/// root shapes and reserved characters. Tests pin it explicitly to get the
/// same results on every host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `\` separator, drive-rooted (`C:\`) and UNC (`\\server\share`) paths.
    Windows,
    /// `/` separator, single root.
    Unix,
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

impl Platform {
    /// The platform of the machine running the code.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Host platform unless `MOCKFS_PLATFORM` names another one.
    pub fn detect() -> Self {
        env::var(PLATFORM_ENV_VAR)
            .ok()
            .and_then(|name| Self::from_name(&name))
            .unwrap_or_else(Self::host)
    }

    /// Parses `windows` / `unix` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Some(Self::Windows),
            "unix" | "linux" | "macos" | "posix" => Some(Self::Unix),
            _ => None,
        }
    }

    pub fn is_unix(self) -> bool {
        self == Self::Unix
    }

    pub fn separator(self) -> char {
        match self {
            Self::Windows => '\\',
            Self::Unix => '/',
        }
    }

    pub fn alt_separator(self) -> char {
        '/'
    }

    pub fn separator_str(self) -> &'static str {
        match self {
            Self::Windows => "\\",
            Self::Unix => "/",
        }
    }

    pub fn is_separator(self, c: char) -> bool {
        c == self.separator() || c == self.alt_separator()
    }

    pub fn newline(self) -> &'static str {
        match self {
            Self::Windows => "\r\n",
            Self::Unix => "\n",
        }
    }

    /// Characters that may never appear in a path.
    pub fn invalid_path_chars(self) -> Vec<char> {
        match self {
            Self::Windows => {
                let mut chars = vec!['"', '<', '>', '|'];
                chars.extend((0u8..32).map(char::from));
                chars
            }
            Self::Unix => vec!['\0'],
        }
    }

    pub fn has_illegal_characters(self, path: &str) -> bool {
        match self {
            Self::Windows => path
                .chars()
                .any(|c| matches!(c, '"' | '<' | '>' | '|') || (c as u32) < 32),
            Self::Unix => path.contains('\0'),
        }
    }

    /// Default current directory of a fresh file system.
    ///
    /// Uses the real temp directory when the emulated platform is the host one,
    /// a fixed path otherwise. Always ends with a separator.
    pub fn temp_path(self) -> String {
        let path = if self == Self::host() {
            env::temp_dir().to_string_lossy().into_owned()
        } else {
            match self {
                Self::Windows => String::from("C:\\Temp"),
                Self::Unix => String::from("/tmp"),
            }
        };
        self.with_trailing_separator(&path)
    }

    /// Converts a Windows-style literal into this platform's native form.
    ///
    /// On Unix the drive prefix is dropped and backslashes become slashes,
    /// so `C:\a\b.txt` turns into `/a/b.txt`.
    pub fn native(self, path: &str) -> String {
        match self {
            Self::Windows => path.to_string(),
            Self::Unix => {
                let mut chars = path.chars();
                let stripped = match (chars.next(), chars.next()) {
                    (Some(d), Some(':')) if d.is_ascii_alphabetic() => &path[2..],
                    _ => path,
                };
                stripped.replace('\\', "/")
            }
        }
    }

    pub fn with_trailing_separator(self, path: &str) -> String {
        if path.ends_with(self.separator()) {
            path.to_string()
        } else {
            format!("{path}{}", self.separator())
        }
    }

    /// Replaces the alternate separator with the canonical one.
    pub fn fix_separators(self, path: &str) -> String {
        path.replace(self.alt_separator(), self.separator_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Platform::from_name("Windows"), Some(Platform::Windows));
        assert_eq!(Platform::from_name(" unix "), Some(Platform::Unix));
        assert_eq!(Platform::from_name("amiga"), None);
    }

    #[test]
    fn test_separators() {
        assert_eq!(Platform::Windows.separator(), '\\');
        assert_eq!(Platform::Unix.separator(), '/');
        assert!(Platform::Windows.is_separator('/'));
        assert!(!Platform::Unix.is_separator('\\'));
        assert_eq!(Platform::Windows.fix_separators("c:/a/b"), "c:\\a\\b");
        assert_eq!(Platform::Unix.fix_separators("/a/b"), "/a/b");
    }

    #[test]
    fn test_illegal_characters() {
        assert!(Platform::Windows.has_illegal_characters("c:\\a<b"));
        assert!(Platform::Windows.has_illegal_characters("aa\t"));
        assert!(Platform::Windows.has_illegal_characters("\"quoted\""));
        assert!(!Platform::Windows.has_illegal_characters("c:\\a\\b*.txt"));
        assert!(!Platform::Unix.has_illegal_characters("/a<b>|"));
        assert!(Platform::Unix.has_illegal_characters("/a\0b"));
    }

    #[test]
    fn test_native() {
        assert_eq!(Platform::Windows.native("C:\\a\\b.txt"), "C:\\a\\b.txt");
        assert_eq!(Platform::Unix.native("C:\\a\\b.txt"), "/a/b.txt");
        assert_eq!(Platform::Unix.native("a\\b"), "a/b");
        assert_eq!(Platform::Unix.native("\\\\server\\share"), "//server/share");
    }

    #[test]
    fn test_temp_path_ends_with_separator() {
        for platform in [Platform::Windows, Platform::Unix] {
            let temp = platform.temp_path();
            assert!(temp.ends_with(platform.separator()), "{temp}");
        }
    }
}
