use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

/// The default upper bound on attachment size (5 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// A file attached to a new change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// The original filename, sent with the file part.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
    /// The file contents, when loaded.
    #[serde(skip)]
    pub content: Option<Vec<u8>>,
}

impl Attachment {
    /// Describes a file without its contents.
    #[must_use]
    pub fn new(file_name: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size,
            content: None,
        }
    }

    /// Reads a file from disk, including its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let content = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            file_name,
            size: content.len() as u64,
            content: Some(content),
        })
    }

    /// The lower-cased extension including the dot, e.g. `.zip`.
    ///
    /// A name without a dot yields the whole name, mirroring how the upload
    /// widget splits on the last `.`.
    #[must_use]
    pub fn extension(&self) -> String {
        let last = self
            .file_name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        format!(".{last}")
    }
}

/// Limits applied to attachments before they are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    /// The largest accepted file, in bytes.
    pub max_bytes: u64,
    /// Accepted extensions, lower-case and including the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_extensions: vec![".zip".to_string()],
        }
    }
}

impl AttachmentPolicy {
    /// Checks a candidate attachment.
    ///
    /// `already_attached` reflects whether the form already holds a file;
    /// only one attachment is allowed per request.
    ///
    /// # Errors
    ///
    /// Returns the first rule the attachment breaks.
    pub fn validate(
        &self,
        attachment: &Attachment,
        already_attached: bool,
    ) -> Result<(), AttachmentError> {
        let extension = attachment.extension();
        if !self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            return Err(AttachmentError::Extension {
                file_name: attachment.file_name.clone(),
                allowed: self.allowed_extensions.join(", "),
            });
        }
        if attachment.size > self.max_bytes {
            return Err(AttachmentError::TooLarge {
                size: attachment.size,
                max: self.max_bytes,
            });
        }
        if already_attached {
            return Err(AttachmentError::AlreadyAttached);
        }
        Ok(())
    }
}

/// Reasons an attachment is refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AttachmentError {
    /// The extension is not on the allow-list.
    #[error("File type not allowed for '{file_name}': only {allowed} files are accepted")]
    Extension {
        /// The offending filename.
        file_name: String,
        /// The accepted extensions.
        allowed: String,
    },

    /// The file exceeds the size limit.
    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// The file's size in bytes.
        size: u64,
        /// The limit in bytes.
        max: u64,
    },

    /// A file is already attached.
    #[error("Only one archive may be attached per request")]
    AlreadyAttached,
}

/// Formats a byte count for display, e.g. `1.5 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test_case("bundle.zip", ".zip"; "simple")]
    #[test_case("BUNDLE.ZIP", ".zip"; "upper case")]
    #[test_case("release.tar.gz", ".gz"; "last segment")]
    #[test_case("README", ".readme"; "no dot")]
    fn extension(name: &str, expected: &str) {
        assert_eq!(Attachment::new(name, 1).extension(), expected);
    }

    #[test]
    fn accepts_small_zip() {
        let policy = AttachmentPolicy::default();
        assert_eq!(policy.validate(&Attachment::new("a.zip", 1024), false), Ok(()));
        assert_eq!(
            policy.validate(&Attachment::new("a.zip", DEFAULT_MAX_BYTES), false),
            Ok(())
        );
    }

    #[test]
    fn rejects_other_extensions() {
        let policy = AttachmentPolicy::default();
        let error = policy
            .validate(&Attachment::new("plan.pdf", 10), false)
            .unwrap_err();
        assert!(matches!(error, AttachmentError::Extension { .. }));
    }

    #[test]
    fn rejects_oversize() {
        let policy = AttachmentPolicy::default();
        let error = policy
            .validate(&Attachment::new("a.zip", DEFAULT_MAX_BYTES + 1), false)
            .unwrap_err();
        assert_eq!(
            error,
            AttachmentError::TooLarge {
                size: DEFAULT_MAX_BYTES + 1,
                max: DEFAULT_MAX_BYTES
            }
        );
        assert!(error.to_string().contains("5242880 byte limit"));
    }

    #[test]
    fn rejects_second_file() {
        let policy = AttachmentPolicy::default();
        assert_eq!(
            policy.validate(&Attachment::new("b.zip", 1), true),
            Err(AttachmentError::AlreadyAttached)
        );
    }

    #[test_case(0, "0 Bytes"; "zero")]
    #[test_case(512, "512 Bytes"; "bytes")]
    #[test_case(1536, "1.5 KB"; "kilobytes")]
    #[test_case(5 * 1024 * 1024, "5 MB"; "megabytes")]
    #[test_case(1_288_490_189, "1.2 GB"; "gigabytes")]
    fn sizes(bytes: u64, expected: &str) {
        assert_eq!(human_size(bytes), expected);
    }

    #[test]
    fn from_path_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evidence.zip");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"PK\x03\x04").unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.file_name, "evidence.zip");
        assert_eq!(attachment.size, 4);
        assert_eq!(attachment.content.as_deref(), Some(&b"PK\x03\x04"[..]));
    }
}
