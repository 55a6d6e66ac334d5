//! Credential store (§4.A): loads a browser-exported cookie jar and caches
//! the name→value mapping in memory, invalidating on age or on-disk mutation.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Domains whose cookies are relevant to the platform's endpoints.
const PLATFORM_DOMAINS: &[&str] = &[".x.com", "x.com", ".twitter.com", "twitter.com"];

pub type Mapping = HashMap<String, String>;

struct Cached {
    mapping: Mapping,
    loaded_at: Instant,
    file_mtime: SystemTime,
}

/// Loads and caches session credentials from a cookie-jar file.
pub struct CredentialStore {
    path: PathBuf,
    ttl: Duration,
    cached: Option<Cached>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { path: path.into(), ttl, cached: None }
    }

    /// Returns the cached mapping, reloading if the age or mtime invariants
    /// have been violated.
    pub fn load(&mut self) -> Result<Mapping> {
        let mtime = self.file_mtime()?;

        let stale = match &self.cached {
            None => true,
            Some(c) => c.loaded_at.elapsed() >= self.ttl || c.file_mtime != mtime,
        };

        if stale {
            self.reload(mtime)?;
        }

        Ok(self.cached.as_ref().expect("just reloaded").mapping.clone())
    }

    /// Forces the next `load()` to re-read the file regardless of age/mtime.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Blocks until the file's modification time advances past the one
    /// observed at the last successful load, or `timeout` elapses. Returns
    /// `true` if a refresh was observed.
    pub fn wait_for_refresh(&mut self, timeout: Duration) -> Result<bool> {
        let baseline = self.cached.as_ref().map(|c| c.file_mtime).unwrap_or(SystemTime::UNIX_EPOCH);
        let deadline = Instant::now() + timeout;

        loop {
            if let Ok(mtime) = self.file_mtime() {
                if mtime > baseline {
                    self.reload(mtime)?;
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            std::thread::sleep(Duration::from_millis(500));
        }
    }

    fn file_mtime(&self) -> Result<SystemTime> {
        let meta = fs::metadata(&self.path);
        match meta {
            Ok(m) => Ok(m.modified()?),
            Err(_) => bail!("credentials_missing: {}", self.path.display()),
        }
    }

    fn reload(&mut self, mtime: SystemTime) -> Result<()> {
        if !self.path.exists() {
            bail!("credentials_missing: {}", self.path.display());
        }
        let contents = fs::read_to_string(&self.path)?;
        let records: Vec<CookieRecordRaw> = serde_json::from_str(&contents)?;

        let mapping = records
            .into_iter()
            .filter(|r| PLATFORM_DOMAINS.iter().any(|d| r.domain == *d))
            .map(|r| (r.name, r.value))
            .collect();

        self.cached = Some(Cached { mapping, loaded_at: Instant::now(), file_mtime: mtime });
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct CookieRecordRaw {
    name: String,
    value: String,
    domain: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_cookies(file: &mut NamedTempFile, pairs: &[(&str, &str, &str)]) {
        let records: Vec<_> = pairs
            .iter()
            .map(|(n, v, d)| serde_json::json!({"name": n, "value": v, "domain": d}))
            .collect();
        let body = serde_json::to_string(&records).unwrap();
        file.as_file_mut().set_len(0).unwrap();
        use std::io::Seek;
        file.as_file_mut().seek(std::io::SeekFrom::Start(0)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[test]
    fn filters_to_platform_domains() {
        let mut file = NamedTempFile::new().unwrap();
        write_cookies(&mut file, &[("auth_token", "abc", ".x.com"), ("unrelated", "xyz", "example.com")]);

        let mut store = CredentialStore::new(file.path(), Duration::from_secs(30));
        let mapping = store.load().unwrap();

        assert_eq!(mapping.get("auth_token"), Some(&"abc".to_string()));
        assert!(!mapping.contains_key("unrelated"));
    }

    #[test]
    fn missing_file_errors() {
        let mut store = CredentialStore::new("/nonexistent/path/cookies.json", Duration::from_secs(30));
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("credentials_missing"));
    }

    #[test]
    fn reloads_on_mtime_change() {
        let mut file = NamedTempFile::new().unwrap();
        write_cookies(&mut file, &[("auth_token", "first", ".x.com")]);

        let mut store = CredentialStore::new(file.path(), Duration::from_secs(600));
        let mapping = store.load().unwrap();
        assert_eq!(mapping.get("auth_token"), Some(&"first".to_string()));

        std::thread::sleep(Duration::from_millis(1100));
        write_cookies(&mut file, &[("auth_token", "second", ".x.com")]);

        let mapping = store.load().unwrap();
        assert_eq!(mapping.get("auth_token"), Some(&"second".to_string()));
    }

    #[test]
    fn invalidate_forces_reload_even_within_ttl() {
        let mut file = NamedTempFile::new().unwrap();
        write_cookies(&mut file, &[("auth_token", "first", ".x.com")]);

        let mut store = CredentialStore::new(file.path(), Duration::from_secs(600));
        store.load().unwrap();
        store.invalidate();

        std::thread::sleep(Duration::from_millis(1100));
        write_cookies(&mut file, &[("auth_token", "second", ".x.com")]);
        let mapping = store.load().unwrap();
        assert_eq!(mapping.get("auth_token"), Some(&"second".to_string()));
    }
}
