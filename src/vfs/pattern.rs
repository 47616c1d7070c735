//! Wildcard search patterns.
//!
//! A search pattern (`*`, `?`, literals) plus a [`SearchOption`] is compiled
//! into an anchored, case-insensitive regular expression over canonical
//! paths below one directory.
//!
//! Patterns with a three letter extension (`*.gif`) get a second expression
//! that also admits one extra non-dot character after the extension, so
//! `*.gif` finds `c.gifx` the way the native 8.3 short-name search does.

use regex::Regex;
use tracing::trace;

use super::Platform;
use crate::core::{Result, SearchOption};
use crate::error::VfsError;

/// Rejects patterns that are empty, traverse upwards or carry reserved characters.
///
/// `foo..r\*` is fine, `..\foo` and `foo..` are not.
pub fn check_search_pattern(pattern: &str, platform: Platform) -> Result<()> {
    if pattern.is_empty() {
        return Err(VfsError::invalid_argument("search pattern cannot be empty"));
    }
    if pattern.ends_with("..") {
        return Err(VfsError::invalid_argument(format!(
            "search pattern cannot end with \"..\": {pattern}"
        )));
    }

    let sep = platform.separator();
    let alt = platform.alt_separator();
    let traverses = pattern.match_indices("..").any(|(idx, _)| {
        matches!(pattern[idx + 2..].chars().next(), Some(c) if c == sep || c == alt)
    });
    if traverses {
        return Err(VfsError::invalid_argument(format!(
            "search pattern cannot contain \"..\" followed by a separator: {pattern}"
        )));
    }

    if platform.has_illegal_characters(pattern) {
        return Err(VfsError::invalid_argument(format!(
            "illegal characters in search pattern: {pattern:?}"
        )));
    }
    Ok(())
}

/// Extension of the last path segment including the dot, or "".
fn extension_of(name: &str, platform: Platform) -> &str {
    let start = name
        .rfind(|c| platform.is_separator(c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &name[start..];
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => &name[i..],
        _ => "",
    }
}

/// Compiled form of one search.
#[derive(Debug, Clone)]
pub struct Matcher {
    prefix: String,
    primary: Regex,
    legacy: Option<Regex>,
}

impl Matcher {
    /// Compiles `pattern` for entries below `directory`.
    ///
    /// # Arguments
    /// * `directory` - canonical directory path ending with a separator
    /// * `pattern` - wildcard pattern, already validated with [`check_search_pattern`]
    /// * `option` - immediate children only, or the whole subtree
    pub fn compile(
        directory: &str,
        pattern: &str,
        option: SearchOption,
        platform: Platform,
    ) -> Result<Self> {
        let (name_char, all_dirs, any_name, tail) = if platform.is_unix() {
            (r#"[^<>:"/|?*]"#, r#"([^<>:"/|?*]*/)*"#, r"[^/]*?/?", r"(?:/?)")
        } else {
            (
                r#"[^<>:"/\\|?*]"#,
                r#"([^<>:"/\\|?*]*\\)*"#,
                r"[^\\]*?\\?",
                r"(?:\\?)",
            )
        };

        let name_pattern = if pattern == "*" {
            any_name.to_string()
        } else {
            pattern
                .chars()
                .map(|c| match c {
                    '*' => format!("{name_char}*?"),
                    '?' => format!("{name_char}?"),
                    other => regex::escape(other.encode_utf8(&mut [0; 4])),
                })
                .collect()
        };

        let infix = match option {
            SearchOption::AllDirectories => all_dirs,
            SearchOption::TopDirectoryOnly => "",
        };
        let anchored = |name: &str| {
            format!("(?i:^{}{infix}{name}{tail}$)", regex::escape(directory))
        };

        let primary_src = anchored(&name_pattern);
        let ext = extension_of(pattern, platform);
        let legacy_src = (pattern != "*"
            && ext.chars().count() == 4
            && !ext.contains(['*', '?']))
        .then(|| anchored(&format!("{name_pattern}[^.]")));

        trace!(pattern, primary = %primary_src, legacy = ?legacy_src, "compiled search pattern");

        let build = |src: &str| {
            Regex::new(src).map_err(|e| {
                VfsError::invalid_argument(format!("invalid search pattern {pattern:?}: {e}"))
            })
        };

        Ok(Self {
            prefix: directory.to_lowercase(),
            primary: build(&primary_src)?,
            legacy: legacy_src.as_deref().map(build).transpose()?,
        })
    }

    /// True if `path` lies under the search directory and satisfies either expression.
    pub fn is_match(&self, path: &str) -> bool {
        if !path.to_lowercase().starts_with(&self.prefix) {
            return false;
        }
        self.primary.is_match(path) || self.legacy.as_ref().is_some_and(|re| re.is_match(path))
    }

    pub fn has_legacy_branch(&self) -> bool {
        self.legacy.is_some()
    }
}
