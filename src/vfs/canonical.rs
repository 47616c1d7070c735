//! Path canonicalization.
//!
//! Every public operation of the virtual file system funnels its path
//! arguments through [`resolve`] before touching the store, so the store only
//! ever sees one spelling per location:
//!
//! - a single separator kind (the alternate one is rewritten),
//! - no `.` segments and no `..` segments beyond the root,
//! - a definite root: UNC (`\\server\share\...`), drive (`C:\...`) or Unix (`/...`),
//! - a trailing separator only when the input had one.
//!
//! `..` never climbs above the structural minimum of a path: the drive segment
//! for drive-rooted paths, `server` + `share` for UNC paths and the bare root
//! for Unix paths. Extra `..` segments are silently dropped, just like the
//! native API does, so `C:\a\b\c` + `..\..\..\..\..\d` resolves to `C:\d`.

use tracing::trace;

use super::Platform;
use crate::core::Result;
use crate::error::VfsError;

/// Returns the root portion of `path`, or an empty string for relative paths.
///
/// * Windows: `\\server\share`, `C:\`, `C:` or `\`.
/// * Unix: `/`.
pub fn get_root(path: &str, platform: Platform) -> String {
    let sep = |c: char| platform.is_separator(c);
    let chars: Vec<(usize, char)> = path.char_indices().collect();

    if platform.is_unix() {
        return match chars.first() {
            Some((_, c)) if sep(*c) => String::from("/"),
            _ => String::new(),
        };
    }

    match chars.as_slice() {
        [(_, a), (_, b), ..] if sep(*a) && sep(*b) => {
            // \\server\share: the root ends before the separator following the share
            let mut separators = chars.iter().skip(2).filter(|(_, c)| sep(*c));
            match (separators.next(), separators.next()) {
                (Some(_), Some((end, _))) => path[..*end].to_string(),
                _ => path.to_string(),
            }
        }
        [(_, d), (_, ':'), (_, s), ..] if d.is_ascii_alphabetic() && sep(*s) => path[..3].to_string(),
        [(_, d), (_, ':'), ..] if d.is_ascii_alphabetic() => path[..2].to_string(),
        [(_, s), ..] if sep(*s) => platform.separator_str().to_string(),
        _ => String::new(),
    }
}

/// True if `path` starts with two separators (`\\server\share` or `//server/share`).
pub fn is_unc(path: &str, platform: Platform) -> bool {
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(a), Some(b)) if platform.is_separator(a) && platform.is_separator(b)
    )
}

fn is_drive_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(d), Some(':'), None) if d.is_ascii_alphabetic()
    )
}

/// Resolves `input` against `cwd` into its canonical absolute form.
///
/// # Errors
/// * `InvalidArgument` if `input` is empty, contains a reserved character, or
///   is a UNC path without a share (`\\server`).
///
/// # Examples
/// ```
/// use mockfs_kit::{Platform, canonical};
///
/// let p = canonical::resolve("..\\c", "c:\\a\\b", Platform::Windows).unwrap();
/// assert_eq!(p, "c:\\a\\c");
/// ```
pub fn resolve(input: &str, cwd: &str, platform: Platform) -> Result<String> {
    if input.is_empty() {
        return Err(VfsError::invalid_argument("the path is not of a legal form: empty"));
    }
    if platform.has_illegal_characters(input) {
        return Err(VfsError::invalid_argument(format!(
            "illegal characters in path: {input:?}"
        )));
    }

    let sep = platform.separator();
    let path = platform.fix_separators(input);
    let has_trailing_separator = path.chars().count() > 1 && path.ends_with(sep);
    let root = get_root(&path, platform);

    let absolute = if is_unc(&path, platform) {
        path
    } else if root.is_empty() {
        // relative to the current directory
        format!("{}{sep}{path}", platform.fix_separators(cwd))
    } else if !platform.is_unix() && root == platform.separator_str() {
        // rooted on the current drive or share
        let cwd_root = get_root(&platform.fix_separators(cwd), platform);
        if cwd_root.is_empty() || cwd_root == platform.separator_str() {
            path
        } else {
            format!("{}{path}", cwd_root.trim_end_matches(sep))
        }
    } else {
        path
    };

    let unc = is_unc(&absolute, platform);
    let unix_rooted = !unc && absolute.starts_with(sep);
    let segments: Vec<&str> = absolute.split(sep).filter(|s| !s.is_empty()).collect();

    if unc && segments.len() < 2 {
        return Err(VfsError::invalid_argument(
            "the UNC path should be of the form \\\\server\\share",
        ));
    }

    let min_segments = if unc {
        2
    } else if unix_rooted {
        0
    } else {
        1
    };

    let mut stack: Vec<&str> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            "." => {}
            ".." => {
                if stack.len() > min_segments {
                    stack.pop();
                }
            }
            _ => stack.push(segment),
        }
    }

    let joined = stack.join(platform.separator_str());
    let mut resolved = if unc {
        format!("{sep}{sep}{joined}")
    } else if unix_rooted {
        format!("{sep}{joined}")
    } else {
        joined
    };

    let bare_drive = !platform.is_unix()
        && !unc
        && !unix_rooted
        && stack.len() == 1
        && is_drive_segment(stack[0]);
    if (has_trailing_separator || bare_drive) && !resolved.ends_with(sep) {
        resolved.push(sep);
    }

    trace!(input, %resolved, "canonicalized path");
    Ok(resolved)
}

/// Structural parent of an already canonical path.
///
/// Returns `None` when `canonical` is a root. The parent of a path directly
/// below a root is the root itself (`C:\`, `/` or `\\server\share`).
pub fn parent(canonical: &str, platform: Platform) -> Option<String> {
    let sep = platform.separator();
    let root = get_root(canonical, platform);
    let root_trimmed = root.trim_end_matches(sep);
    let trimmed = canonical.trim_end_matches(sep);

    if trimmed.len() <= root_trimmed.len() {
        return None;
    }

    let idx = trimmed.rfind(sep)?;
    let parent = &trimmed[..idx];
    if parent.len() <= root_trimmed.len() {
        if root.is_empty() {
            return (!parent.is_empty()).then(|| parent.to_string());
        }
        return Some(root);
    }
    Some(parent.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIN: Platform = Platform::Windows;
    const UNIX: Platform = Platform::Unix;

    mod roots {
        use super::*;

        #[test]
        fn test_get_root_windows() {
            assert_eq!(get_root("C:\\foo\\bar", WIN), "C:\\");
            assert_eq!(get_root("C:foo", WIN), "C:");
            assert_eq!(get_root("\\foo", WIN), "\\");
            assert_eq!(get_root("\\\\server\\share\\x", WIN), "\\\\server\\share");
            assert_eq!(get_root("\\\\server\\share", WIN), "\\\\server\\share");
            assert_eq!(get_root("\\\\server", WIN), "\\\\server");
            assert_eq!(get_root("foo\\bar", WIN), "");
        }

        #[test]
        fn test_get_root_unix() {
            assert_eq!(get_root("/foo/bar", UNIX), "/");
            assert_eq!(get_root("foo/bar", UNIX), "");
            assert_eq!(get_root("C:\\foo", UNIX), "");
        }

        #[test]
        fn test_is_unc() {
            assert!(is_unc("\\\\server\\share", WIN));
            assert!(is_unc("//server/share", WIN));
            assert!(!is_unc("\\server", WIN));
            assert!(is_unc("//server/share", UNIX));
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn test_relative_paths() -> Result<()> {
            let cases = [
                ("c:\\a", "b", "c:\\a\\b"),
                ("c:\\a\\b", "c", "c:\\a\\b\\c"),
                ("c:\\a\\b", "c\\", "c:\\a\\b\\c\\"),
                ("c:\\a\\b", "..\\c", "c:\\a\\c"),
                ("c:\\a\\b\\c", "..\\c\\..\\", "c:\\a\\b\\"),
                ("c:\\a\\b\\c", "..\\..\\..\\..\\..\\d", "c:\\d"),
                ("c:\\a\\b\\c", "..\\..\\..\\..\\..\\d\\", "c:\\d\\"),
            ];
            for (cwd, input, expected) in cases {
                assert_eq!(resolve(input, cwd, WIN)?, expected, "{cwd} + {input}");
            }
            Ok(())
        }

        #[test]
        fn test_rooted_paths_with_relative_segments() -> Result<()> {
            let cases = [
                ("c:\\a\\b\\..\\c", "c:\\a\\c"),
                ("c:\\a\\b\\.\\.\\..\\.\\c", "c:\\a\\c"),
                ("c:\\a\\b\\.\\c", "c:\\a\\b\\c"),
                ("c:\\a\\b\\.\\.\\.\\.\\c", "c:\\a\\b\\c"),
                ("c:\\a\\..\\..\\c", "c:\\c"),
            ];
            for (input, expected) in cases {
                assert_eq!(resolve(input, "c:\\", WIN)?, expected, "{input}");
            }
            Ok(())
        }

        #[test]
        fn test_absolute_paths() -> Result<()> {
            let cases = [
                ("c:\\a", "/b", "c:\\b"),
                ("c:\\a", "/b\\", "c:\\b\\"),
                ("c:\\a", "\\b", "c:\\b"),
                ("c:\\a", "\\b\\..\\c", "c:\\c"),
                ("z:\\a", "\\b\\..\\c", "z:\\c"),
                ("z:\\a", "\\\\computer\\share\\c", "\\\\computer\\share\\c"),
                ("z:\\a", "\\\\computer\\share\\c\\..\\d", "\\\\computer\\share\\d"),
                ("z:\\a", "\\\\computer\\share\\c\\..\\..\\d", "\\\\computer\\share\\d"),
            ];
            for (cwd, input, expected) in cases {
                assert_eq!(resolve(input, cwd, WIN)?, expected, "{cwd} + {input}");
            }
            Ok(())
        }

        #[test]
        fn test_unix_paths() -> Result<()> {
            assert_eq!(resolve("b", "/a", UNIX)?, "/a/b");
            assert_eq!(resolve("../c", "/a/b", UNIX)?, "/a/c");
            assert_eq!(resolve("../../../../d/", "/a/b", UNIX)?, "/d/");
            assert_eq!(resolve("/x/./y/../z", "/a", UNIX)?, "/x/z");
            assert_eq!(resolve("/..", "/a", UNIX)?, "/");
            assert_eq!(resolve("/a/../", "/a", UNIX)?, "/");
            assert_eq!(resolve("/", "/a", UNIX)?, "/");
            Ok(())
        }

        #[test]
        fn test_drive_root_keeps_separator() -> Result<()> {
            assert_eq!(resolve("C:\\", "c:\\", WIN)?, "C:\\");
            assert_eq!(resolve("C:", "c:\\", WIN)?, "C:\\");
            assert_eq!(resolve("C:\\a\\..", "c:\\", WIN)?, "C:\\");
            Ok(())
        }

        #[test]
        fn test_multiple_separators_are_collapsed() -> Result<()> {
            assert_eq!(
                resolve("c:\\foo\\\\//bar\\file.dat", "c:\\", WIN)?,
                "c:\\foo\\bar\\file.dat"
            );
            assert_eq!(resolve("/foo//bar///file.dat", "/", UNIX)?, "/foo/bar/file.dat");
            Ok(())
        }

        #[test]
        fn test_relative_to_unc_current_directory() -> Result<()> {
            let cwd = "\\\\server\\share\\dir";
            assert_eq!(resolve("x", cwd, WIN)?, "\\\\server\\share\\dir\\x");
            assert_eq!(resolve("..\\..\\..\\x", cwd, WIN)?, "\\\\server\\share\\x");
            assert_eq!(resolve("\\x", cwd, WIN)?, "\\\\server\\share\\x");
            Ok(())
        }

        #[test]
        fn test_invalid_inputs() {
            assert!(matches!(resolve("", "c:\\", WIN), Err(VfsError::InvalidArgument(_))));
            assert!(matches!(
                resolve("\\\\shareZ", "c:\\", WIN),
                Err(VfsError::InvalidArgument(_))
            ));
            assert!(matches!(
                resolve("c:\\a<b", "c:\\", WIN),
                Err(VfsError::InvalidArgument(_))
            ));
            assert!(matches!(
                resolve("c:\\director\ty", "c:\\", WIN),
                Err(VfsError::InvalidArgument(_))
            ));
        }

        #[test]
        fn test_idempotence() -> Result<()> {
            let inputs = [
                "c:\\a\\b\\..\\c",
                "c:\\a\\b\\",
                "C:",
                "\\\\server\\share\\x\\..\\y\\",
                "relative\\..\\..\\path",
                "/b\\",
            ];
            for input in inputs {
                let once = resolve(input, "c:\\cwd", WIN)?;
                assert_eq!(resolve(&once, "c:\\cwd", WIN)?, once, "{input}");
            }
            for input in ["/a/./b/../c/", "x/y", "/", "../../.."] {
                let once = resolve(input, "/home/user", UNIX)?;
                assert_eq!(resolve(&once, "/home/user", UNIX)?, once, "{input}");
            }
            Ok(())
        }
    }

    mod parents {
        use super::*;

        #[test]
        fn test_parent_windows() {
            assert_eq!(parent("c:\\a\\b\\c\\d", WIN).as_deref(), Some("c:\\a\\b\\c"));
            assert_eq!(parent("c:\\a\\b\\c\\d\\", WIN).as_deref(), Some("c:\\a\\b\\c"));
            assert_eq!(parent("c:\\a", WIN).as_deref(), Some("c:\\"));
            assert_eq!(parent("c:\\", WIN), None);
        }

        #[test]
        fn test_parent_unc() {
            assert_eq!(
                parent("\\\\server\\share\\a\\b", WIN).as_deref(),
                Some("\\\\server\\share\\a")
            );
            assert_eq!(
                parent("\\\\server\\share\\a", WIN).as_deref(),
                Some("\\\\server\\share")
            );
            assert_eq!(parent("\\\\server\\share\\", WIN), None);
        }

        #[test]
        fn test_parent_unix() {
            assert_eq!(parent("/a/b", UNIX).as_deref(), Some("/a"));
            assert_eq!(parent("/a", UNIX).as_deref(), Some("/"));
            assert_eq!(parent("/", UNIX), None);
        }
    }
}
