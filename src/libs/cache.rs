//! Identifier cache (§4.E): three on-disk partitions — handle→id lookup,
//! id→profile, and id→relationship (partitioned per session owner) — each
//! with a 30-day TTL driven by file modification time at read.

use crate::model::{Profile, Relationship};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Strips every character outside `[A-Za-z0-9._-]` from a raw identifier to
/// produce a safe on-disk filename stem.
pub fn safe_name(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')).collect()
}

/// Derives a session-owner partition key from the credential mapping:
/// prefers a numeric id cookie, falls back to a stable hash of another
/// cookie when that id is absent.
pub fn owner_id_from(credentials: &std::collections::HashMap<String, String>) -> String {
    if let Some(id) = credentials.get("twid").and_then(|v| v.split('=').last()) {
        return safe_name(id);
    }
    if let Some(fallback) = credentials.get("auth_token").or_else(|| credentials.get("ct0")) {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        fallback.hash(&mut hasher);
        return format!("{:x}", hasher.finish());
    }
    "unknown_owner".to_string()
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct LookupEntry {
    handle: String,
    id: String,
}

pub struct IdentifierCache {
    root: PathBuf,
    owner: String,
}

impl IdentifierCache {
    pub fn new(root: impl Into<PathBuf>, owner: impl Into<String>) -> Self {
        Self { root: root.into(), owner: owner.into() }
    }

    fn lookup_dir(&self) -> PathBuf {
        self.root.join("lookup")
    }
    fn profile_dir(&self) -> PathBuf {
        self.root.join("profile")
    }
    fn relationship_dir(&self) -> PathBuf {
        self.root.join("relationship").join(&self.owner)
    }

    /// Reads and deletes a file if it is expired, returning its contents
    /// only when still fresh. Unparseable files are treated as misses and
    /// removed.
    fn read_fresh(path: &Path) -> Option<String> {
        let meta = fs::metadata(path).ok()?;
        let modified = meta.modified().ok()?;
        if SystemTime::now().duration_since(modified).unwrap_or_default() > TTL {
            let _ = fs::remove_file(path);
            return None;
        }
        match fs::read_to_string(path) {
            Ok(s) => Some(s),
            Err(_) => {
                let _ = fs::remove_file(path);
                None
            }
        }
    }

    pub fn lookup_handle(&self, handle: &str) -> Option<String> {
        let path = self.lookup_dir().join(format!("{}.json", safe_name(handle)));
        let raw = Self::read_fresh(&path)?;
        match serde_json::from_str::<LookupEntry>(&raw) {
            Ok(entry) => Some(entry.id),
            Err(_) => {
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    pub fn write_lookup(&self, handle: &str, id: &str) -> Result<()> {
        let dir = self.lookup_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", safe_name(handle)));
        let body = serde_json::to_string(&LookupEntry { handle: handle.to_string(), id: id.to_string() })?;
        fs::write(path, body)?;
        Ok(())
    }

    pub fn profile(&self, id: &str) -> Option<Profile> {
        let path = self.profile_dir().join(format!("{}.json", safe_name(id)));
        let raw = Self::read_fresh(&path)?;
        match serde_json::from_str(&raw) {
            Ok(p) => Some(p),
            Err(_) => {
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    pub fn write_profile(&self, profile: &Profile) -> Result<()> {
        let dir = self.profile_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", safe_name(&profile.id)));
        fs::write(path, serde_json::to_string(profile)?)?;
        Ok(())
    }

    pub fn relationship(&self, id: &str) -> Option<Relationship> {
        let path = self.relationship_dir().join(format!("{}.json", safe_name(id)));
        let raw = Self::read_fresh(&path)?;
        match serde_json::from_str(&raw) {
            Ok(r) => Some(r),
            Err(_) => {
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    pub fn write_relationship(&self, id: &str, relationship: &Relationship) -> Result<()> {
        let dir = self.relationship_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", safe_name(id)));
        fs::write(path, serde_json::to_string(relationship)?)?;
        Ok(())
    }

    /// Composite read: null if profile is absent or expired, merging in
    /// relationship data when present (defaulting to all-false otherwise).
    pub fn full_user(&self, id: &str) -> Option<(Profile, Relationship)> {
        let profile = self.profile(id)?;
        let relationship = self.relationship(id).unwrap_or_default();
        Some((profile, relationship))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Availability;
    use std::time::{Duration as StdDuration};

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            handle: "someone".to_string(),
            display_name: "Someone".to_string(),
            availability: Availability::Active,
        }
    }

    #[test]
    fn writes_and_reads_profile() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IdentifierCache::new(dir.path(), "owner1");
        cache.write_profile(&profile("42")).unwrap();

        let read = cache.profile("42").unwrap();
        assert_eq!(read.id, "42");
    }

    #[test]
    fn lookup_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IdentifierCache::new(dir.path(), "owner1");
        cache.write_lookup("somehandle", "99").unwrap();
        assert_eq!(cache.lookup_handle("somehandle"), Some("99".to_string()));
    }

    #[test]
    fn relationship_is_partitioned_per_owner() {
        let dir = tempfile::tempdir().unwrap();
        let cache_a = IdentifierCache::new(dir.path(), "owner_a");
        let cache_b = IdentifierCache::new(dir.path(), "owner_b");

        cache_a.write_relationship("7", &Relationship { following: true, ..Default::default() }).unwrap();

        assert!(cache_a.relationship("7").unwrap().following);
        assert!(cache_b.relationship("7").is_none());
    }

    #[test]
    fn expired_profile_is_treated_as_miss_and_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IdentifierCache::new(dir.path(), "owner1");
        cache.write_profile(&profile("1")).unwrap();

        let path = cache.profile_dir().join("1.json");
        let old = SystemTime::now() - StdDuration::from_secs(31 * 24 * 60 * 60);
        let file = fs::File::open(&path).unwrap();
        file.set_modified(old).unwrap();

        assert!(cache.profile("1").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn safe_name_strips_disallowed_characters() {
        assert_eq!(safe_name("user@name!123"), "username123");
        assert_eq!(safe_name("a.b_c-d"), "a.b_c-d");
    }
}
