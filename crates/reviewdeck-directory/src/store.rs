//! App directory store and resolution

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{Result, StorageError};
use reviewdeck_core::{AppRecord, Vendor};

/// Result of resolving an app query for a vendor API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// The identifier to send on the wire: the native id for the App Store,
    /// the package id for Google Play
    pub api_identifier: String,

    /// Which vendor owns the app
    pub vendor: Vendor,

    /// The matched directory record
    pub record: AppRecord,
}

/// Durable cache of known apps plus local metadata overlay.
///
/// Records are kept sorted by (vendor, name, key) at all times, so the
/// "first enumerated" substring match in [`resolve`](AppDirectory::resolve)
/// is deterministic across runs.
#[derive(Debug)]
pub struct AppDirectory {
    path: PathBuf,
    records: Vec<AppRecord>,
    loaded: bool,
}

impl AppDirectory {
    /// Create a store backed by the given document path. Nothing is read
    /// until [`load`](AppDirectory::load) or
    /// [`ensure_loaded`](AppDirectory::ensure_loaded).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            loaded: false,
        }
    }

    /// The backing document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records, including hidden ones
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the directory holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read the persisted document, replacing any in-memory state.
    ///
    /// A missing file initializes an empty store. An unreadable or corrupt
    /// file is a [`StorageError`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&mut self) -> Result<()> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no directory document, starting empty");
                self.records = Vec::new();
                self.loaded = true;
                return Ok(());
            }
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        self.records = serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;
        sort_records(&mut self.records);
        self.loaded = true;

        debug!(count = self.records.len(), "loaded app directory");
        Ok(())
    }

    /// Load the document once; later calls are no-ops
    pub async fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        self.load().await
    }

    /// Persist all records, sorted by (vendor, name).
    ///
    /// Writes to `<path>.tmp` then renames over the target, so the document
    /// is never left half-written. Parent directories are created as needed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn save(&self) -> Result<()> {
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.records).map_err(|e| {
            StorageError::Write {
                path: self.path.clone(),
                source: std::io::Error::other(e),
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, content).await.map_err(write_err)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(write_err)?;

        debug!(count = self.records.len(), "saved app directory");
        Ok(())
    }

    /// Merge one vendor's listing into the directory.
    ///
    /// Existing records get vendor-provided fields overlaid while the
    /// local-only fields (project_url, is_hidden, notes) are preserved;
    /// unknown records are inserted with the vendor stamped. Listings never
    /// delete: an app temporarily absent from a listing call, or one the
    /// vendor API cannot enumerate, keeps its entry.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn merge_from_vendor_listing(&mut self, records: Vec<AppRecord>, vendor: Vendor) {
        let mut inserted = 0usize;
        let mut updated = 0usize;

        for mut incoming in records {
            incoming.vendor = vendor;
            let key = record_key(&incoming);

            match self.records.iter_mut().find(|r| record_key(r) == key) {
                Some(existing) => {
                    overlay_vendor_fields(existing, incoming);
                    updated += 1;
                }
                None => {
                    self.records.push(incoming);
                    inserted += 1;
                }
            }
        }

        sort_records(&mut self.records);
        info!(vendor = %vendor, inserted, updated, "merged vendor listing");
    }

    /// Insert or replace a record wholesale (manual mutation)
    pub fn add_or_update(&mut self, record: AppRecord) {
        let key = record_key(&record);
        match self.records.iter_mut().find(|r| record_key(r) == key) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
        sort_records(&mut self.records);
    }

    /// Remove a record by vendor and native or bundle id, case-insensitively.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, vendor: Vendor, id_or_bundle: &str) -> bool {
        let needle = id_or_bundle.to_lowercase();
        let before = self.records.len();
        self.records.retain(|r| {
            !(r.vendor == vendor
                && (r.native_id.to_lowercase() == needle || r.key_id().to_lowercase() == needle))
        });
        before != self.records.len()
    }

    /// Sorted snapshot of all records, optionally without hidden ones
    pub fn get_all(&self, include_hidden: bool) -> Vec<AppRecord> {
        self.records
            .iter()
            .filter(|r| include_hidden || !r.is_hidden)
            .cloned()
            .collect()
    }

    /// Resolve a free-form query to a record.
    ///
    /// Tiered case-insensitive match: exact native id, exact bundle/package
    /// id, exact name, substring name - first hit in that priority order.
    /// When several names share a substring the first enumerated record wins;
    /// this imprecision is documented behavior.
    pub fn resolve(&self, query: &str, include_hidden: bool) -> Option<&AppRecord> {
        let needle = query.to_lowercase();
        let candidates = || {
            self.records
                .iter()
                .filter(move |r| include_hidden || !r.is_hidden)
        };

        candidates()
            .find(|r| r.native_id.to_lowercase() == needle)
            .or_else(|| {
                candidates().find(|r| {
                    r.bundle_id
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase() == needle)
                })
            })
            .or_else(|| candidates().find(|r| r.name.to_lowercase() == needle))
            .or_else(|| candidates().find(|r| r.name.to_lowercase().contains(&needle)))
    }

    /// Resolve a query and derive the identifier to send on the wire:
    /// the native id for the App Store, the package id for Google Play.
    pub fn resolve_for_api(&self, query: &str, include_hidden: bool) -> Option<ResolvedTarget> {
        let record = self.resolve(query, include_hidden)?;
        let api_identifier = match record.vendor {
            Vendor::AppStore => record.native_id.clone(),
            Vendor::GooglePlay => record.key_id().to_string(),
        };
        Some(ResolvedTarget {
            api_identifier,
            vendor: record.vendor,
            record: record.clone(),
        })
    }
}

/// Directory key: (vendor, bundle/package id falling back to native id),
/// case-insensitive
fn record_key(record: &AppRecord) -> (Vendor, String) {
    (record.vendor, record.key_id().to_lowercase())
}

fn sort_records(records: &mut [AppRecord]) {
    records.sort_by(|a, b| {
        (a.vendor, a.name.to_lowercase(), a.key_id().to_lowercase()).cmp(&(
            b.vendor,
            b.name.to_lowercase(),
            b.key_id().to_lowercase(),
        ))
    });
}

/// Overlay vendor-provided fields, preserving the local-only ones.
///
/// Optional vendor fields only overwrite when the listing carries a value,
/// so a partial listing does not blank out what an earlier sync learned.
fn overlay_vendor_fields(existing: &mut AppRecord, incoming: AppRecord) {
    existing.name = incoming.name;
    existing.native_id = incoming.native_id;
    existing.vendor = incoming.vendor;
    if incoming.bundle_id.is_some() {
        existing.bundle_id = incoming.bundle_id;
    }
    if incoming.sku.is_some() {
        existing.sku = incoming.sku;
    }
    if !incoming.platforms.is_empty() {
        existing.platforms = incoming.platforms;
    }
    if incoming.primary_locale.is_some() {
        existing.primary_locale = incoming.primary_locale;
    }
    if incoming.is_available.is_some() {
        existing.is_available = incoming.is_available;
    }
    if incoming.current_version.is_some() {
        existing.current_version = incoming.current_version;
    }
    // project_url, is_hidden and notes are local-only and untouched
}
