use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_and_enrich;
use super::model::BookingTable;
use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// Source signature
// ---------------------------------------------------------------------------

/// Identity of a source file at a point in time. A change in either field
/// invalidates any table memoized from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSignature {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceSignature {
    fn probe(path: &Path) -> DataResult<Self> {
        let meta = fs::metadata(path).map_err(|e| DataError::SourceNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(SourceSignature {
            len: meta.len(),
            // Some filesystems do not report mtime; length alone still
            // catches most rewrites.
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetCache
// ---------------------------------------------------------------------------

/// Memoizes the enriched table for a source file.
///
/// The cache is an explicit object the caller owns, not process-global
/// state. A hit requires the same path and an unchanged modification
/// signature; anything else re-reads the file. The table is handed out as
/// an `Arc` so queries can share it read-only.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    signature: SourceSignature,
    table: Arc<BookingTable>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the enriched table for `path`, reloading only when the cache
    /// is cold or the file changed since the last load.
    pub fn load(&mut self, path: &Path) -> DataResult<Arc<BookingTable>> {
        let signature = SourceSignature::probe(path)?;

        if let Some(entry) = &self.entry {
            if entry.path.as_path() == path && entry.signature == signature {
                log::debug!("dataset cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.table));
            }
        }

        log::info!("dataset cache miss for {}", path.display());
        let table = Arc::new(load_and_enrich(path)?);
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            signature,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    /// Drop any memoized table; the next [`load`](Self::load) re-reads the
    /// file regardless of its signature.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
