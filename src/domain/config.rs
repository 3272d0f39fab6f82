use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::domain::{AttachmentPolicy, attachment::DEFAULT_MAX_BYTES};

/// Configuration for talking to the change-request backend.
///
/// This struct holds the settings that vary between deployments: where the
/// API lives, which UTC offset local date-times are entered in, and what
/// attachments are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the backend, without a trailing slash.
    ///
    /// For example, `http://rdm.internal:8080`.
    pub api_base_url: String,

    /// Offset of the users' local time from UTC, in minutes.
    ///
    /// Local `YYYY-MM-DDTHH:mm` values are interpreted in this offset, and
    /// the backend's UTC timestamps are shown in it. Defaults to `-180`
    /// (UTC-03:00).
    utc_offset_minutes: i32,

    /// The largest attachment accepted, in bytes.
    pub max_attachment_bytes: u64,

    /// Accepted attachment extensions, including the dot.
    allowed_attachment_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            utc_offset_minutes: default_utc_offset_minutes(),
            max_attachment_bytes: DEFAULT_MAX_BYTES,
            allowed_attachment_extensions: default_extensions(),
        }
    }
}

impl Config {
    /// The directory, relative to a project root, that holds the configuration.
    pub const DIR: &str = ".rdm";

    /// Where the configuration file lives under `root`.
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(Self::DIR).join("config.toml")
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// An empty extension list is replaced by the default (`.zip` only), and
    /// an offset that names no valid time zone is reported before
    /// [`Config::offset`] falls back to UTC.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| format!("Invalid configuration in {}: {e}", path.display()))?;

        if config.allowed_attachment_extensions.is_empty() {
            tracing::warn!("No attachment extensions configured, accepting {:?}", default_extensions());
            config.allowed_attachment_extensions = default_extensions();
        }
        if config.checked_offset().is_none() {
            tracing::warn!(
                minutes = config.utc_offset_minutes,
                "utc_offset_minutes is out of range, dates will be read as UTC"
            );
        }
        Ok(config)
    }

    /// Loads the configuration, falling back to defaults when it is missing
    /// or unreadable.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Using default configuration: {e}");
            Self::default()
        })
    }

    /// Writes the configuration to `path`, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is out of range, or if the file cannot
    /// be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if self.checked_offset().is_none() {
            return Err(format!(
                "utc_offset_minutes = {} is not a valid offset",
                self.utc_offset_minutes
            ));
        }
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize configuration: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }

    /// The configured local offset.
    ///
    /// An out-of-range offset falls back to UTC.
    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.checked_offset().unwrap_or_else(|| {
            tracing::debug!(
                minutes = self.utc_offset_minutes,
                "UTC offset out of range, using UTC"
            );
            FixedOffset::east_opt(0).unwrap_or_else(|| unreachable!("zero is a valid offset"))
        })
    }

    fn checked_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Sets the local offset, in minutes east of UTC.
    pub const fn set_utc_offset_minutes(&mut self, minutes: i32) {
        self.utc_offset_minutes = minutes;
    }

    /// Returns the accepted attachment extensions.
    #[must_use]
    pub fn allowed_attachment_extensions(&self) -> &[String] {
        &self.allowed_attachment_extensions
    }

    /// Adds an accepted extension.
    ///
    /// Extensions are normalized to lower case with a leading dot.
    ///
    /// Returns `true` if the extension was added, `false` if it already existed.
    pub fn add_attachment_extension(&mut self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        if self.allowed_attachment_extensions.contains(&extension) {
            false
        } else {
            self.allowed_attachment_extensions.push(extension);
            true
        }
    }

    /// The attachment rules derived from this configuration.
    #[must_use]
    pub fn attachment_policy(&self) -> AttachmentPolicy {
        AttachmentPolicy {
            max_bytes: self.max_attachment_bytes,
            allowed_extensions: self.allowed_attachment_extensions.clone(),
        }
    }

    /// Joins an API path onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url.trim_end_matches('/'))
    }
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_utc_offset_minutes() -> i32 {
    -180
}

const fn default_max_attachment_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_extensions() -> Vec<String> {
    vec![".zip".to_string()]
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_api_base_url")]
        api_base_url: String,

        #[serde(default = "default_utc_offset_minutes")]
        utc_offset_minutes: i32,

        #[serde(default = "default_max_attachment_bytes")]
        max_attachment_bytes: u64,

        #[serde(default = "default_extensions")]
        allowed_attachment_extensions: Vec<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                api_base_url,
                utc_offset_minutes,
                max_attachment_bytes,
                allowed_attachment_extensions,
            } => Self {
                api_base_url,
                utc_offset_minutes,
                max_attachment_bytes,
                allowed_attachment_extensions: allowed_attachment_extensions
                    .iter()
                    .map(|ext| normalize_extension(ext))
                    .collect(),
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            api_base_url: config.api_base_url,
            utc_offset_minutes: config.utc_offset_minutes,
            max_attachment_bytes: config.max_attachment_bytes,
            allowed_attachment_extensions: config.allowed_attachment_extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\napi_base_url = \"http://rdm.example:8080\"\nutc_offset_minutes = 60\nmax_attachment_bytes = 1024\nallowed_attachment_extensions = [\"ZIP\", \".7z\"]\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.api_base_url, "http://rdm.example:8080");
        assert_eq!(config.offset(), FixedOffset::east_opt(3600).unwrap());
        assert_eq!(config.max_attachment_bytes, 1024);
        assert_eq!(
            config.allowed_attachment_extensions(),
            &[".zip".to_string(), ".7z".to_string()]
        );
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read "));
        assert_eq!(Config::load_or_default(&missing), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nutc_offset_minutes = \"minus three\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Invalid configuration in "));
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_utc_offset_minutes(0);
        assert!(config.add_attachment_extension("7Z"));
        assert!(!config.add_attachment_extension(".zip"));
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn default_offset_is_minus_three_hours() {
        assert_eq!(
            Config::default().offset(),
            FixedOffset::west_opt(3 * 3600).unwrap()
        );
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let mut config = Config::default();
        config.set_utc_offset_minutes(24 * 60);
        assert_eq!(config.offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn overflowing_offset_falls_back_to_utc() {
        let mut config = Config::default();
        config.set_utc_offset_minutes(40_000_000);
        assert_eq!(config.offset(), FixedOffset::east_opt(0).unwrap());

        config.set_utc_offset_minutes(i32::MIN);
        assert_eq!(config.offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn load_restores_default_extensions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nallowed_attachment_extensions = []\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.allowed_attachment_extensions(), &[".zip".to_string()]);
    }

    #[test]
    fn load_keeps_out_of_range_offset_as_utc() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nutc_offset_minutes = 40000000\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn save_creates_directory_and_refuses_bad_offset() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Config::path(tmp.path());

        Config::default().save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.set_utc_offset_minutes(24 * 60);
        assert!(config.save(&path).unwrap_err().contains("not a valid offset"));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let mut config = Config::default();
        config.api_base_url = "http://rdm.example/".to_string();
        assert_eq!(config.url("/api/RDM"), "http://rdm.example/api/RDM");
    }

    #[test]
    fn path_is_under_project_root() {
        assert_eq!(
            Config::path(Path::new("/work")),
            Path::new("/work/.rdm/config.toml")
        );
    }

    #[test]
    fn attachment_policy_mirrors_config() {
        let policy = Config::default().attachment_policy();
        assert_eq!(policy, AttachmentPolicy::default());
    }
}
