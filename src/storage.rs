use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::constants::{COOKIE_FILE_NAME, LOGOUT_MARKER_FILE};

// Keeps `now + ttl` far away from chrono's range limits.
const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 3600;

/// Cross-instance "logged out" flag.
///
/// A small file holding the instant the logout stops counting. Any running
/// client that bootstraps while the file is present and unexpired starts on
/// the login screen without trying to renew its token.
#[derive(Clone, Debug)]
pub struct LogoutMarker {
    path: PathBuf,
    ttl: Duration,
}

impl LogoutMarker {
    pub fn new(dir: &Path, ttl_secs: u64) -> Self {
        LogoutMarker {
            path: dir.join(LOGOUT_MARKER_FILE),
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(MAX_TTL_SECS).min(MAX_TTL_SECS)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raise the marker for the configured lifetime
    pub fn set(&self) -> Result<()> {
        self.set_at(Utc::now())
    }

    pub fn set_at(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let expires = now + self.ttl;
        fs::write(&self.path, expires.to_rfc3339())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn is_present(&self) -> bool {
        self.is_present_at(Utc::now())
    }

    /// Unreadable or garbled markers count as absent
    pub fn is_present_at(&self, now: DateTime<Utc>) -> bool {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|expires| now < expires.with_timezone(&Utc))
            .unwrap_or(false)
    }
}

/// The renewal cookie as a `Cookie` header value (`name=value; ...`),
/// so a restarted client can renew its token like a reloaded browser tab.
#[derive(Clone, Debug)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new(dir: &Path) -> Self {
        CookieFile {
            path: dir.join(COOKIE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored header value; missing or blank files yield `None`
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Replace the stored value. The file is readable by the owner only.
    pub fn save(&self, header: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(header.as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Local files written by the client (PDF downloads)
pub struct Storage {
    download_dir: PathBuf,
}

impl Storage {
    pub fn new(download_dir: PathBuf) -> Self {
        Storage { download_dir }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Ensure download directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.download_dir.exists() {
            fs::create_dir_all(&self.download_dir).with_context(|| {
                format!("Failed to create {}", self.download_dir.display())
            })?;
        }
        Ok(())
    }

    /// Write a downloaded file, returning where it landed
    pub fn save_download(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_dir()?;
        let safe: String = file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        let path = self.download_dir.join(safe);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
