use super::{DirectoryInfo, MockFileSystem, Platform, canonical};
use crate::core::Result;
use crate::error::VfsError;

/// Kind of drive reported by [`DriveInfo::drive_type`]. Mock drives are always fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveType {
    Fixed,
}

/// A drive (or the Unix root) of a [`MockFileSystem`].
#[derive(Debug, Clone)]
pub struct DriveInfo<'a> {
    fs: &'a MockFileSystem,
    name: String,
}

impl<'a> DriveInfo<'a> {
    /// Accepts a drive letter (`c`), a drive (`c:`), a drive root (`c:\`) or any
    /// path rooted on a drive. On Unix only paths rooted at `/` are accepted.
    ///
    /// # Errors
    /// * `InvalidArgument` if `name` is empty, UNC, has no drive root or
    ///   contains reserved characters.
    pub fn new(fs: &'a MockFileSystem, name: &str) -> Result<Self> {
        let name = normalize(name, fs.platform())?;
        Ok(Self { fs, name })
    }

    /// Drive root with its separator, in the case it was given (`c:\`, `/`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_directory(&self) -> Result<DirectoryInfo<'a>> {
        DirectoryInfo::new(self.fs, &self.name)
    }

    /// True if anything is stored below this drive.
    pub fn is_ready(&self) -> bool {
        let key = self.name.to_lowercase();
        self.fs
            .all_paths()
            .iter()
            .any(|path| path.to_lowercase().starts_with(&key))
    }

    pub fn drive_type(&self) -> DriveType {
        DriveType::Fixed
    }

    pub fn drive_format(&self) -> &'static str {
        match self.fs.platform() {
            Platform::Windows => "NTFS",
            Platform::Unix => "ext4",
        }
    }

    pub fn volume_label(&self) -> String {
        String::new()
    }
}

fn invalid(name: &str) -> VfsError {
    VfsError::invalid_argument(format!("not a drive name: {name:?}"))
}

fn normalize(name: &str, platform: Platform) -> Result<String> {
    if name.is_empty() || platform.has_illegal_characters(name) {
        return Err(invalid(name));
    }
    if platform.is_unix() {
        return match canonical::get_root(name, platform).as_str() {
            "/" => Ok("/".to_string()),
            _ => Err(invalid(name)),
        };
    }

    let mut chars = name.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic);
    match (letter, chars.next(), chars.next()) {
        (Some(_), None, _) => return Ok(format!("{name}:\\")),
        (Some(_), Some(':'), None) => return Ok(format!("{name}\\")),
        _ => {}
    }

    let path = platform.fix_separators(name);
    if canonical::is_unc(&path, platform) {
        return Err(invalid(name));
    }
    let root = canonical::get_root(&path, platform);
    let is_drive = root.len() >= 2
        && root.as_bytes()[0].is_ascii_alphabetic()
        && root.as_bytes()[1] == b':';
    if !is_drive {
        return Err(invalid(name));
    }
    Ok(platform.with_trailing_separator(&root))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_fs() -> MockFileSystem {
        MockFileSystem::builder()
            .platform(Platform::Windows)
            .current_directory("c:\\")
            .file("c:\\a.txt", "a")
            .build()
            .unwrap()
    }

    mod names {
        use super::*;

        #[test]
        fn test_accepted_forms() -> Result<()> {
            let fs = setup_fs();
            assert_eq!(fs.drive_info("c")?.name(), "c:\\");
            assert_eq!(fs.drive_info("D:")?.name(), "D:\\");
            assert_eq!(fs.drive_info("c:\\")?.name(), "c:\\");
            assert_eq!(fs.drive_info("e:\\x\\y.txt")?.name(), "e:\\");
            assert_eq!(fs.drive_info("f:/x")?.name(), "f:\\");
            Ok(())
        }

        #[test]
        fn test_rejected_forms() {
            let fs = setup_fs();
            for name in ["", "\\\\server\\share", "relative\\path", "\\rooted", "1", "c:\\a|b"] {
                assert!(
                    matches!(fs.drive_info(name), Err(VfsError::InvalidArgument(_))),
                    "{name:?} should be rejected"
                );
            }
        }

        #[test]
        fn test_unix_root() -> Result<()> {
            let fs = MockFileSystem::with_platform(Platform::Unix);
            assert_eq!(fs.drive_info("/home/user")?.name(), "/");
            assert!(fs.drive_info("c").is_err());
            Ok(())
        }
    }

    mod properties {
        use super::*;

        #[test]
        fn test_root_directory_and_ready() -> Result<()> {
            let fs = setup_fs();
            let c = fs.drive_info("C")?;
            assert_eq!(c.root_directory()?.full_name(), "C:\\");
            assert!(c.is_ready());
            assert!(!fs.drive_info("z")?.is_ready());
            assert_eq!(c.drive_type(), DriveType::Fixed);
            assert_eq!(c.drive_format(), "NTFS");
            assert_eq!(c.volume_label(), "");
            Ok(())
        }
    }
}
