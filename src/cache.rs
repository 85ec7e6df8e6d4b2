//! Content-addressed document cache.
//!
//! Maps a SHA-256 fingerprint of a document's bytes to its extracted text,
//! together with the source path, modification time, and size observed at
//! extraction. Lookups short-circuit on an unchanged mtime so large files
//! are not re-hashed on every run; when the mtime has advanced the bytes are
//! fingerprinted again, which catches in-place edits and lets identical
//! content under different names share one entry.
//!
//! Storage failures never fail a run: they degrade to a direct, uncached
//! load with a warning. A failed extraction is never cached.

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::db;
use crate::error::{CacheError, ExtractionError};

/// Read-only view of one cache entry, for `apply cache info`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheEntrySummary {
    pub fingerprint: String,
    pub source_path: String,
    pub source_mtime: i64,
    pub file_size: i64,
    pub created_at: i64,
}

/// mtime and size observed from filesystem metadata.
struct FileStamp {
    mtime: i64,
    size: i64,
}

enum Lookup {
    Hit(String),
    Miss { fingerprint: String, stamp: FileStamp },
}

/// SQLite-backed cache store. Constructed once per run and injected into
/// the pipeline; single-writer discipline per source path is the caller's
/// responsibility.
pub struct DocumentCache {
    pool: SqlitePool,
}

impl DocumentCache {
    /// Open (and create if needed) the cache database at `path`.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        let pool = db::connect(path).await?;
        db::ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Return the cached text for `path` if a valid entry exists, otherwise
    /// invoke `loader`, cache its result, and return it.
    ///
    /// Loader failures propagate uncached and leave any pre-existing entry
    /// for the path untouched. Cache storage failures degrade to calling
    /// `loader` directly.
    pub async fn get_or_load<F>(&self, path: &Path, loader: F) -> Result<String, ExtractionError>
    where
        F: FnOnce(&Path) -> Result<String, ExtractionError>,
    {
        let miss = match self.lookup(path).await {
            Ok(Lookup::Hit(text)) => {
                info!(path = %path.display(), "cache hit");
                return Ok(text);
            }
            Ok(Lookup::Miss { fingerprint, stamp }) => Some((fingerprint, stamp)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache lookup failed, loading directly");
                None
            }
        };

        let text = loader(path)?;

        match miss {
            Some((fingerprint, stamp)) => {
                if let Err(e) = self.store(path, &fingerprint, &stamp, &text).await {
                    warn!(path = %path.display(), error = %e, "cache write failed, result not cached");
                } else {
                    info!(path = %path.display(), fingerprint = %&fingerprint[..12], "cached extracted text");
                }
            }
            None => {
                // Lookup already failed; don't compound it with a write.
                debug!(path = %path.display(), "skipping cache write after lookup failure");
            }
        }

        Ok(text)
    }

    async fn lookup(&self, path: &Path) -> Result<Lookup, CacheError> {
        let stamp = stat(path)?;
        let path_str = path.to_string_lossy().to_string();

        // mtime short-circuit: an entry for this path whose recorded mtime
        // is not older than the live file needs no re-hashing.
        let row = sqlx::query(
            "SELECT extracted_text, source_mtime FROM cache_entries \
             WHERE source_path = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&path_str)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            let source_mtime: i64 = row.get("source_mtime");
            if source_mtime >= stamp.mtime {
                return Ok(Lookup::Hit(row.get("extracted_text")));
            }
        }

        // mtime advanced or no entry for this path: fingerprint the bytes.
        // A match means the content is already cached (touched file, or the
        // same document under another name); refresh the path mapping so
        // the next run short-circuits again.
        let fingerprint = fingerprint_file(path)?;

        let row = sqlx::query("SELECT extracted_text FROM cache_entries WHERE fingerprint = ?")
            .bind(&fingerprint)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            sqlx::query(
                "UPDATE cache_entries SET source_path = ?, source_mtime = ?, file_size = ? \
                 WHERE fingerprint = ?",
            )
            .bind(&path_str)
            .bind(stamp.mtime)
            .bind(stamp.size)
            .bind(&fingerprint)
            .execute(&self.pool)
            .await?;

            return Ok(Lookup::Hit(row.get("extracted_text")));
        }

        Ok(Lookup::Miss { fingerprint, stamp })
    }

    async fn store(
        &self,
        path: &Path,
        fingerprint: &str,
        stamp: &FileStamp,
        text: &str,
    ) -> Result<(), CacheError> {
        let path_str = path.to_string_lossy().to_string();
        let now = Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        // A fresher entry for the same path supersedes older fingerprints.
        sqlx::query("DELETE FROM cache_entries WHERE source_path = ? AND fingerprint != ?")
            .bind(&path_str)
            .bind(fingerprint)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO cache_entries (fingerprint, source_path, extracted_text, source_mtime, file_size, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(fingerprint) DO UPDATE SET
                source_path = excluded.source_path,
                extracted_text = excluded.extracted_text,
                source_mtime = excluded.source_mtime,
                file_size = excluded.file_size
            "#,
        )
        .bind(fingerprint)
        .bind(&path_str)
        .bind(text)
        .bind(stamp.mtime)
        .bind(stamp.size)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Enumerate all entries, newest first.
    pub async fn info(&self) -> Result<Vec<CacheEntrySummary>, CacheError> {
        let rows = sqlx::query(
            "SELECT fingerprint, source_path, source_mtime, file_size, created_at \
             FROM cache_entries ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CacheEntrySummary {
                fingerprint: row.get("fingerprint"),
                source_path: row.get("source_path"),
                source_mtime: row.get("source_mtime"),
                file_size: row.get("file_size"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Remove all entries. Idempotent; an empty store is not an error.
    pub async fn clear(&self) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM cache_entries")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn stat(path: &Path) -> Result<FileStamp, CacheError> {
    let metadata = std::fs::metadata(path).map_err(|source| CacheError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::SystemTime::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Ok(FileStamp {
        mtime,
        size: metadata.len() as i64,
    })
}

fn fingerprint_file(path: &Path) -> Result<String, CacheError> {
    let bytes = std::fs::read(path).map_err(|source| CacheError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    async fn open_cache(tmp: &tempfile::TempDir) -> DocumentCache {
        DocumentCache::open(&tmp.path().join("cache.sqlite"))
            .await
            .unwrap()
    }

    fn write_doc(tmp: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = tmp.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_second_lookup_skips_loader() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = open_cache(&tmp).await;
        let doc = write_doc(&tmp, "resume.txt", "some resume body");

        let calls = Cell::new(0u32);
        let text1 = cache
            .get_or_load(&doc, |_| {
                calls.set(calls.get() + 1);
                Ok("extracted".to_string())
            })
            .await
            .unwrap();
        let text2 = cache
            .get_or_load(&doc, |_| {
                calls.set(calls.get() + 1);
                Ok("should not run".to_string())
            })
            .await
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(text1, "extracted");
        assert_eq!(text2, "extracted");
    }

    #[tokio::test]
    async fn test_changed_content_reloads_and_supersedes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = open_cache(&tmp).await;
        let doc = write_doc(&tmp, "resume.txt", "version one");

        cache
            .get_or_load(&doc, |_| Ok("text one".to_string()))
            .await
            .unwrap();

        // Rewrite with new content and a strictly newer mtime.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        std::fs::write(&doc, "version two").unwrap();

        let text = cache
            .get_or_load(&doc, |_| Ok("text two".to_string()))
            .await
            .unwrap();
        assert_eq!(text, "text two");

        // The stale entry for this path is gone.
        let entries = cache.info().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_path, doc.to_string_lossy());
    }

    #[tokio::test]
    async fn test_identical_content_under_new_name_hits() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = open_cache(&tmp).await;
        let a = write_doc(&tmp, "a.txt", "shared content here");
        let b = write_doc(&tmp, "b.txt", "shared content here");

        cache
            .get_or_load(&a, |_| Ok("extracted once".to_string()))
            .await
            .unwrap();

        let text = cache
            .get_or_load(&b, |_| panic!("loader must not run for identical content"))
            .await
            .unwrap();
        assert_eq!(text, "extracted once");

        let entries = cache.info().await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_loader_failure_not_cached() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = open_cache(&tmp).await;
        let doc = write_doc(&tmp, "bad.txt", "broken document");

        let err = cache
            .get_or_load(&doc, |p| Err(ExtractionError::Empty(p.to_path_buf())))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Empty(_)));
        assert!(cache.info().await.unwrap().is_empty());

        // The next call tries the loader again.
        let text = cache
            .get_or_load(&doc, |_| Ok("recovered".to_string()))
            .await
            .unwrap();
        assert_eq!(text, "recovered");
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = open_cache(&tmp).await;
        let doc = write_doc(&tmp, "resume.txt", "body text for clearing");

        cache
            .get_or_load(&doc, |_| Ok("text".to_string()))
            .await
            .unwrap();
        assert_eq!(cache.info().await.unwrap().len(), 1);

        cache.clear().await.unwrap();
        assert!(cache.info().await.unwrap().is_empty());

        // Clearing an already-empty store succeeds.
        cache.clear().await.unwrap();
        assert!(cache.info().await.unwrap().is_empty());
    }
}
