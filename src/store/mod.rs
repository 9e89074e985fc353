//! Asset store module
//!
//! A read-only, path-keyed view over the files embedded into the binary.
//! The store is fully indexed before the listener starts accepting
//! connections and is never mutated afterwards, so concurrent lookups need
//! no synchronization.

use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;

/// A single embedded asset with precomputed response metadata.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Immutable file content.
    pub content: Bytes,
    /// Content length in bytes.
    pub size: usize,
    /// Modification time used for conditional-request validation.
    pub modtime: DateTime<Utc>,
    /// MIME type inferred from the file extension at index time.
    pub content_type: String,
    /// Strong `ETag` derived from the embedded file's content hash.
    pub etag: String,
}

/// Errors raised while building the store. All of these are fatal at
/// startup; none can occur once the server is accepting connections.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("embedded bundle contains no assets")]
    EmptyBundle,
    #[error("asset root '{0}' does not exist in the embedded bundle")]
    RootNotFound(String),
}

/// Read-only mapping from logical path to asset.
#[derive(Debug)]
pub struct AssetStore {
    assets: HashMap<String, Asset>,
}

impl AssetStore {
    /// Index every file of an embedded bundle into an in-memory store.
    ///
    /// Files without an embedded modification time fall back to the store
    /// construction time, which stays constant for the process lifetime.
    pub fn from_embedded<E: RustEmbed>() -> Result<Self, StoreError> {
        let fallback_modtime = Utc::now();
        let mut assets = HashMap::new();

        for key in E::iter() {
            let Some(file) = E::get(&key) else {
                continue;
            };

            let modtime = file
                .metadata
                .last_modified()
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .unwrap_or(fallback_modtime);

            let content = match file.data {
                Cow::Borrowed(bytes) => Bytes::from_static(bytes),
                Cow::Owned(bytes) => Bytes::from(bytes),
            };

            let asset = Asset {
                size: content.len(),
                modtime,
                content_type: mime_guess::from_path(key.as_ref())
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string(),
                etag: quoted_hex(file.metadata.sha256_hash().as_ref()),
                content,
            };

            assets.insert(key.into_owned(), asset);
        }

        if assets.is_empty() {
            return Err(StoreError::EmptyBundle);
        }

        Ok(Self { assets })
    }

    /// Re-root the store at `subdirectory`, stripping the prefix from every
    /// key so that internal packaging structure is not visible in URLs.
    ///
    /// Fails if no asset lives under the subdirectory, which would leave the
    /// server with nothing to serve.
    pub fn rooted(self, subdirectory: &str) -> Result<Self, StoreError> {
        let prefix = format!("{}/", subdirectory.trim_matches('/'));

        let assets: HashMap<String, Asset> = self
            .assets
            .into_iter()
            .filter_map(|(key, asset)| {
                key.strip_prefix(&prefix)
                    .map(|rest| (rest.to_string(), asset))
            })
            .collect();

        if assets.is_empty() {
            return Err(StoreError::RootNotFound(subdirectory.to_string()));
        }

        Ok(Self { assets })
    }

    /// Look up an asset by its normalized logical path.
    ///
    /// The path must already be normalized (no leading slash, no `.`/`..`
    /// segments); keys never contain traversal segments, so a non-normalized
    /// path simply misses.
    pub fn open(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Whether `path` names a directory, i.e. some asset lives under it.
    pub fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{path}/");
        self.assets.keys().any(|key| key.starts_with(&prefix))
    }

    /// Number of assets in the store.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_assets(assets: HashMap<String, Asset>) -> Self {
        Self { assets }
    }
}

/// Hex-encode a hash into a quoted strong `ETag` value.
fn quoted_hex(hash: &[u8]) -> String {
    let mut tag = String::with_capacity(hash.len() * 2 + 2);
    tag.push('"');
    for byte in hash {
        let _ = write!(tag, "{byte:02x}");
    }
    tag.push('"');
    tag
}
