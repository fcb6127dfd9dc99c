// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::FsBlobStore;
use registrar::{BlobStore, RequestContext, StoreError};
use registrar_domain::BlobRef;
use tempfile::TempDir;

#[test]
fn test_save_and_read_blob() {
    let dir: TempDir = TempDir::new().unwrap();
    let ctx: RequestContext = RequestContext::new();
    let blobs: FsBlobStore = FsBlobStore::new(dir.path().join("attachments")).unwrap();

    let blob: BlobRef = blobs.save(&ctx, b"%PDF-1.7", "surat keputusan.pdf").unwrap();

    assert!(blob.as_str().ends_with("_surat_keputusan.pdf"));
    assert!(blobs.exists(&ctx, &blob).unwrap());
    assert_eq!(blobs.read(&blob).unwrap(), b"%PDF-1.7".to_vec());
    assert!(dir.path().join("attachments").join(blob.as_str()).is_file());
}

#[test]
fn test_same_name_never_overwrites() {
    let dir: TempDir = TempDir::new().unwrap();
    let ctx: RequestContext = RequestContext::new();
    let blobs: FsBlobStore = FsBlobStore::new(dir.path()).unwrap();

    let first: BlobRef = blobs.save(&ctx, b"first", "sk.pdf").unwrap();
    let second: BlobRef = blobs.save(&ctx, b"second", "sk.pdf").unwrap();

    assert_ne!(first, second);
    assert_eq!(blobs.read(&first).unwrap(), b"first".to_vec());
    assert_eq!(blobs.read(&second).unwrap(), b"second".to_vec());
}

#[test]
fn test_exists_rejects_paths_outside_root() {
    let dir: TempDir = TempDir::new().unwrap();
    let ctx: RequestContext = RequestContext::new();
    let blobs: FsBlobStore = FsBlobStore::new(dir.path().join("inner")).unwrap();
    std::fs::write(dir.path().join("outside.pdf"), b"x").unwrap();

    assert!(!blobs.exists(&ctx, &BlobRef::new("../outside.pdf")).unwrap());
    assert!(!blobs.exists(&ctx, &BlobRef::new("missing.pdf")).unwrap());
    assert!(!blobs.exists(&ctx, &BlobRef::new("")).unwrap());
    assert!(blobs.read(&BlobRef::new("../outside.pdf")).is_err());
}

#[test]
fn test_cancelled_save_writes_nothing() {
    let dir: TempDir = TempDir::new().unwrap();
    let blobs: FsBlobStore = FsBlobStore::new(dir.path()).unwrap();
    let ctx: RequestContext = RequestContext::new();
    ctx.cancel();

    let result: Result<BlobRef, StoreError> = blobs.save(&ctx, b"late", "sk.pdf");

    assert_eq!(result, Err(StoreError::Cancelled));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
