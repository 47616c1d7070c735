use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Attribute bit set of an entry.
///
/// Bit values follow the native file attribute constants, so values coming
/// from real metadata can be stored unchanged.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FileAttributes(u32);

impl FileAttributes {
    pub const READ_ONLY: Self = Self(0x1);
    pub const HIDDEN: Self = Self(0x2);
    pub const SYSTEM: Self = Self(0x4);
    pub const DIRECTORY: Self = Self(0x10);
    pub const ARCHIVE: Self = Self(0x20);
    pub const DEVICE: Self = Self(0x40);
    pub const NORMAL: Self = Self(0x80);
    pub const TEMPORARY: Self = Self(0x100);
    pub const SPARSE_FILE: Self = Self(0x200);
    pub const REPARSE_POINT: Self = Self(0x400);
    pub const COMPRESSED: Self = Self(0x800);
    pub const OFFLINE: Self = Self(0x1000);
    pub const NOT_CONTENT_INDEXED: Self = Self(0x2000);
    pub const ENCRYPTED: Self = Self(0x4000);

    const NAMES: [(Self, &'static str); 14] = [
        (Self::READ_ONLY, "ReadOnly"),
        (Self::HIDDEN, "Hidden"),
        (Self::SYSTEM, "System"),
        (Self::DIRECTORY, "Directory"),
        (Self::ARCHIVE, "Archive"),
        (Self::DEVICE, "Device"),
        (Self::NORMAL, "Normal"),
        (Self::TEMPORARY, "Temporary"),
        (Self::SPARSE_FILE, "SparseFile"),
        (Self::REPARSE_POINT, "ReparsePoint"),
        (Self::COMPRESSED, "Compressed"),
        (Self::OFFLINE, "Offline"),
        (Self::NOT_CONTENT_INDEXED, "NotContentIndexed"),
        (Self::ENCRYPTED, "Encrypted"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Entries carrying either of these flags refuse to be overwritten.
    pub const fn is_protected(self) -> bool {
        self.contains(Self::READ_ONLY) || self.contains(Self::HIDDEN)
    }
}

impl BitOr for FileAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FileAttributes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FileAttributes {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for FileAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "FileAttributes({:#x})", self.0)
        } else {
            write!(f, "FileAttributes({})", names.join(" | "))
        }
    }
}

/// Timestamp reported for entries that do not exist.
pub fn missing_entry_time() -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(-11_644_473_600, 0)
        .unwrap_or_default()
        .fixed_offset()
}

fn default_time(year: i32, month: u32, day: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(4 * 3600)
        .and_then(|tz| tz.with_ymd_and_hms(year, month, day, 0, 0, 0).single())
        .unwrap_or_else(missing_entry_time)
}

/// Content and metadata stored for one path.
///
/// Fresh entries carry fixed timestamps (created 2010-01-02, written
/// 2010-01-04, accessed 2010-02-04, all at +04:00) so tests that compare
/// times get the same values on every machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    entry_type: EntryType,
    content: Vec<u8>,
    attributes: FileAttributes,
    creation_time: DateTime<FixedOffset>,
    last_access_time: DateTime<FixedOffset>,
    last_write_time: DateTime<FixedOffset>,
}

impl Entry {
    fn with_type(entry_type: EntryType, content: Vec<u8>, attributes: FileAttributes) -> Self {
        Self {
            entry_type,
            content,
            attributes,
            creation_time: default_time(2010, 1, 2),
            last_access_time: default_time(2010, 2, 4),
            last_write_time: default_time(2010, 1, 4),
        }
    }

    /// A file holding `content`, with `Normal` attributes.
    pub fn file(content: impl Into<Vec<u8>>) -> Self {
        Self::with_type(EntryType::File, content.into(), FileAttributes::NORMAL)
    }

    /// A file holding `text` encoded as UTF-8 without a byte order mark.
    pub fn text(text: &str) -> Self {
        Self::file(text.as_bytes())
    }

    /// A file holding `text` encoded as UTF-8 and prefixed with the UTF-8 byte order mark.
    pub fn text_with_bom(text: &str) -> Self {
        let mut content = vec![0xEF, 0xBB, 0xBF];
        content.extend_from_slice(text.as_bytes());
        Self::file(content)
    }

    /// A directory; the `Directory` attribute is set.
    pub fn directory() -> Self {
        Self::with_type(EntryType::Directory, Vec::new(), FileAttributes::DIRECTORY)
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.content.extend_from_slice(bytes);
    }

    /// Content decoded as UTF-8, lossy, without a leading byte order mark.
    pub fn text_content(&self) -> String {
        let bytes = self
            .content
            .strip_prefix(&[0xEF, 0xBB, 0xBF])
            .unwrap_or(&self.content);
        String::from_utf8_lossy(bytes).into_owned()
    }

    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn attributes(&self) -> FileAttributes {
        self.attributes
    }

    pub fn set_attributes(&mut self, attributes: FileAttributes) {
        self.attributes = attributes;
    }

    pub fn with_attributes(mut self, attributes: FileAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn creation_time(&self) -> DateTime<FixedOffset> {
        self.creation_time
    }

    pub fn set_creation_time(&mut self, time: DateTime<FixedOffset>) {
        self.creation_time = time;
    }

    pub fn last_access_time(&self) -> DateTime<FixedOffset> {
        self.last_access_time
    }

    pub fn set_last_access_time(&mut self, time: DateTime<FixedOffset>) {
        self.last_access_time = time;
    }

    pub fn last_write_time(&self) -> DateTime<FixedOffset> {
        self.last_write_time
    }

    pub fn set_last_write_time(&mut self, time: DateTime<FixedOffset>) {
        self.last_write_time = time;
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Self::file(text.into_bytes())
    }
}

impl From<Vec<u8>> for Entry {
    fn from(content: Vec<u8>) -> Self {
        Self::file(content)
    }
}

impl From<&[u8]> for Entry {
    fn from(content: &[u8]) -> Self {
        Self::file(content)
    }
}
