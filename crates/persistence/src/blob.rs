// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! File-system blob storage for attachments.

use crate::error::PersistenceError;
use registrar::{BlobStore, RequestContext, StoreError};
use registrar_domain::BlobRef;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::debug;

/// Attempts at finding an unused file name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Longest sanitized suggested name kept in a blob file name.
const MAX_SUGGESTED_NAME_LEN: usize = 96;

/// Stores attachment bytes as files under one directory.
///
/// Blob references are bare file names of the form
/// `<millis>_<random>_<sanitized-name>`; files are created exclusively and
/// never overwritten.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates the store, creating `root` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, PersistenceError> {
        let root: PathBuf = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory blobs are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a blob back.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not a plain file name or the
    /// file cannot be read.
    pub fn read(&self, blob: &BlobRef) -> Result<Vec<u8>, PersistenceError> {
        let path: PathBuf = self
            .path_of(blob)
            .ok_or_else(|| PersistenceError::Io(format!("invalid blob reference '{blob}'")))?;
        Ok(std::fs::read(path)?)
    }

    fn path_of(&self, blob: &BlobRef) -> Option<PathBuf> {
        let name: &str = blob.as_str();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.root.join(name))
    }

    fn write_new(
        &self,
        ctx: &RequestContext,
        bytes: &[u8],
        safe_name: &str,
    ) -> Result<BlobRef, StoreError> {
        let millis: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

        for _ in 0..MAX_NAME_ATTEMPTS {
            ctx.check_store()?;
            let name: String = format!("{millis}_{:08x}_{safe_name}", rand::random::<u32>());
            let path: PathBuf = self.root.join(&name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .and_then(|()| file.sync_all())
                        .map_err(PersistenceError::from)?;
                    debug!(blob = %name, size = bytes.len(), "Stored blob");
                    return Ok(BlobRef::new(name));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(PersistenceError::from(e).into()),
            }
        }

        Err(PersistenceError::Io(format!(
            "no free blob name for '{safe_name}' after {MAX_NAME_ATTEMPTS} attempts"
        ))
        .into())
    }
}

impl BlobStore for FsBlobStore {
    fn save(
        &self,
        ctx: &RequestContext,
        bytes: &[u8],
        suggested_name: &str,
    ) -> Result<BlobRef, StoreError> {
        self.write_new(ctx, bytes, &sanitize_name(suggested_name))
    }

    fn exists(&self, ctx: &RequestContext, blob: &BlobRef) -> Result<bool, StoreError> {
        ctx.check_store()?;
        Ok(self.path_of(blob).is_some_and(|path| path.is_file()))
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; replaces everything else.
fn sanitize_name(suggested: &str) -> String {
    let base: &str = suggested.rsplit(['/', '\\']).next().unwrap_or(suggested);
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_SUGGESTED_NAME_LEN)
        .collect();

    let trimmed: &str = safe.trim_start_matches('.');
    if trimmed.is_empty() {
        String::from("blob")
    } else {
        trimmed.to_string()
    }
}
