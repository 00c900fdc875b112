use std::path::PathBuf;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{FileStorage, StorageError};

type HmacSha256 = Hmac<Sha256>;

/// Disk-backed storage under a single root directory.
///
/// Keys are flat (uuid + sanitized extension), so a URL maps to exactly one
/// file and key extraction is pure string work. Presigned URLs carry an
/// expiry and an HMAC-SHA256 signature over `key:expires`.
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: String,
    signing_key: Vec<u8>,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str, signing_key: &[u8]) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_key: signing_key.to_vec(),
        }
    }

    fn sign(&self, key: &str, expires: i64) -> Result<String, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SignError(e.to_string()))?;
        mac.update(format!("{key}:{expires}").as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a presigned URL against the signing key and the given clock.
    pub fn verify_presigned(&self, url: &str, now: i64) -> Result<bool, StorageError> {
        let key = self.extract_key(url)?;
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        let mut expires: Option<i64> = None;
        let mut sig: Option<&str> = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse().ok(),
                Some(("sig", v)) => sig = Some(v),
                _ => {}
            }
        }
        let (Some(expires), Some(sig)) = (expires, sig) else {
            return Ok(false);
        };
        if expires < now {
            return Ok(false);
        }
        let raw = match hex::decode(sig) {
            Ok(raw) => raw,
            Err(_) => return Ok(false),
        };
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SignError(e.to_string()))?;
        mac.update(format!("{key}:{expires}").as_bytes());
        Ok(mac.verify_slice(&raw).is_ok())
    }
}

/// Keep only a short alphanumeric extension; anything else is dropped so the
/// key can never escape the storage root.
fn sanitize_extension(original_name: &str) -> Option<String> {
    let ext = original_name.rsplit_once('.')?.1;
    let cleaned: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(&self, bytes: &[u8], original_name: &str) -> Result<String, StorageError> {
        let key = match sanitize_extension(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
            None => Uuid::new_v4().simple().to_string(),
        };
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::write(self.root.join(&key), bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        debug!(%key, size = bytes.len(), "stored file");
        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = self.extract_key(url)?;
        match fs::remove_file(self.root.join(&key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(key)),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    fn presigned_url(&self, url: &str, ttl_secs: i64) -> Result<String, StorageError> {
        let key = self.extract_key(url)?;
        let expires = chrono::Utc::now().timestamp() + ttl_secs;
        let sig = self.sign(&key, expires)?;
        Ok(format!("{}/{}?expires={}&sig={}", self.base_url, key, expires, sig))
    }

    fn extract_key(&self, url: &str) -> Result<String, StorageError> {
        let rest = url
            .strip_prefix(&self.base_url)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| StorageError::InvalidUrl(url.to_string()))?;
        let key = rest.split('?').next().unwrap_or("");
        if key.is_empty() || key.contains('/') || key.contains("..") {
            return Err(StorageError::InvalidUrl(url.to_string()));
        }
        Ok(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_at(root: PathBuf) -> LocalFileStorage {
        LocalFileStorage::new(root, "http://files.test/files", b"test-signing-key")
    }

    fn tmp_root() -> PathBuf {
        std::env::temp_dir().join(format!("local_storage_{}", Uuid::new_v4()))
    }

    #[test]
    fn extract_key_roundtrip() {
        let s = storage_at(tmp_root());
        let key = s.extract_key("http://files.test/files/abc123.png").expect("key");
        assert_eq!(key, "abc123.png");
        // Query strings are ignored
        let key = s.extract_key("http://files.test/files/abc123.png?expires=1&sig=ff").expect("key");
        assert_eq!(key, "abc123.png");
    }

    #[test]
    fn extract_key_rejects_foreign_and_malformed_urls() {
        let s = storage_at(tmp_root());
        assert!(matches!(s.extract_key("http://other.host/files/a.png"), Err(StorageError::InvalidUrl(_))));
        assert!(matches!(s.extract_key("http://files.test/files/"), Err(StorageError::InvalidUrl(_))));
        assert!(matches!(s.extract_key("http://files.test/files/../etc/passwd"), Err(StorageError::InvalidUrl(_))));
        assert!(matches!(s.extract_key("http://files.test/files/a/b.png"), Err(StorageError::InvalidUrl(_))));
    }

    #[test]
    fn presign_verifies_until_expiry() {
        let s = storage_at(tmp_root());
        let url = "http://files.test/files/doc.pdf";
        let signed = s.presigned_url(url, 600).expect("sign");
        let now = chrono::Utc::now().timestamp();
        assert!(s.verify_presigned(&signed, now).expect("verify"));
        // Same URL is rejected once the expiry has passed
        assert!(!s.verify_presigned(&signed, now + 601).expect("verify"));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let s = storage_at(tmp_root());
        let signed = s.presigned_url("http://files.test/files/doc.pdf", 600).expect("sign");
        let tampered = signed.replace("doc.pdf", "other.pdf");
        let now = chrono::Utc::now().timestamp();
        assert!(!s.verify_presigned(&tampered, now).expect("verify"));
        // Unsigned URL never verifies
        assert!(!s.verify_presigned("http://files.test/files/doc.pdf", now).expect("verify"));
    }

    #[tokio::test]
    async fn upload_then_delete() {
        let root = tmp_root();
        let s = storage_at(root.clone());

        let url = s.upload(b"ho so hoc vien", "ho-so.PDF").await.expect("upload");
        assert!(url.starts_with("http://files.test/files/"));
        assert!(url.ends_with(".pdf"));

        let key = s.extract_key(&url).expect("key");
        let on_disk = tokio::fs::read(root.join(&key)).await.expect("read back");
        assert_eq!(on_disk, b"ho so hoc vien");

        s.delete(&url).await.expect("delete");
        assert!(matches!(s.delete(&url).await, Err(StorageError::NotFound(_))));

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn upload_without_extension() {
        let root = tmp_root();
        let s = storage_at(root.clone());
        let url = s.upload(b"x", "blob").await.expect("upload");
        let key = s.extract_key(&url).expect("key");
        assert!(!key.contains('.'));
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
