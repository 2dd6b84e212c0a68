//! Integration tests for file deletion.

mod helpers;

use chunkvault::{BlobBackend, ErrorKind, FileId, FileQuery, GroupId};
use helpers::{Faults, Options, TestVault, pattern};

#[tokio::test]
async fn test_delete_removes_blobs_and_rows() {
    let t = TestVault::new().await;
    let path = t.write_source("gone.bin", &pattern(60)).await;
    let file = t.vault.upload(&path, GroupId::ROOT).await.unwrap();
    assert_eq!(t.blobs.len().await, 3);

    let removed = t.vault.delete(file.id).await.unwrap();

    assert_eq!(removed, 3);
    assert!(t.blobs.is_empty().await);
    assert!(t.vault.files().parts(file.id).await.unwrap().is_empty());
    let err = t.vault.files().get(file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_leaves_other_files_alone() {
    let t = TestVault::new().await;
    let a = t.write_source("a.bin", &pattern(30)).await;
    let b = t.write_source("b.bin", &pattern(40)).await;
    let first = t.vault.upload(&a, GroupId::ROOT).await.unwrap();
    let second = t.vault.upload(&b, GroupId::ROOT).await.unwrap();

    t.vault.delete(first.id).await.unwrap();

    let remaining = t.vault.files().search(&FileQuery::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
    assert_eq!(t.blobs.len().await, 2);

    let outcome = t.vault.download(second.id, "b.out").await.unwrap();
    assert_eq!(outcome.bytes_written, 40);
}

#[tokio::test]
async fn test_failed_removal_stops_and_can_be_retried() {
    let t = TestVault::with_options(Options {
        faults: Faults {
            remove_on: Some(2),
            ..Faults::default()
        },
        ..Options::default()
    })
    .await;
    let path = t.write_source("stuck.bin", &pattern(60)).await;
    let file = t.vault.upload(&path, GroupId::ROOT).await.unwrap();
    let parts = t.vault.files().parts(file.id).await.unwrap();

    let err = t.vault.delete(file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Backend);
    assert!(err.message.contains(parts[1].id.as_str()), "{}", err.message);

    // The first part is gone, the rest and the file row are untouched.
    let left = t.vault.files().parts(file.id).await.unwrap();
    assert_eq!(
        left.iter().map(|p| p.seq).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(!t.blobs.contains(&parts[0].id).await);
    assert!(t.blobs.contains(&parts[1].id).await);
    assert!(t.blobs.contains(&parts[2].id).await);
    assert!(t.vault.files().get(file.id).await.is_ok());

    let removed = t.vault.delete(file.id).await.unwrap();
    assert_eq!(removed, 2);
    assert!(t.blobs.is_empty().await);
    assert!(t.vault.files().get(file.id).await.is_err());
}

#[tokio::test]
async fn test_delete_skips_blobs_already_gone() {
    let t = TestVault::new().await;
    let path = t.write_source("half.bin", &pattern(60)).await;
    let file = t.vault.upload(&path, GroupId::ROOT).await.unwrap();
    let parts = t.vault.files().parts(file.id).await.unwrap();

    // A blob removed from the backend whose row was never dropped.
    t.blobs.remove(&parts[0].id).await.unwrap();

    let removed = t.vault.delete(file.id).await.unwrap();

    assert_eq!(removed, 3);
    assert!(t.blobs.is_empty().await);
    assert!(t.vault.files().parts(file.id).await.unwrap().is_empty());
    assert!(t.vault.files().get(file.id).await.is_err());
}

#[tokio::test]
async fn test_delete_empty_file() {
    let t = TestVault::new().await;
    let path = t.write_source("empty.txt", b"").await;
    let file = t.vault.upload(&path, GroupId::ROOT).await.unwrap();

    assert_eq!(t.vault.delete(file.id).await.unwrap(), 0);
    assert!(t.vault.files().get(file.id).await.is_err());
}

#[tokio::test]
async fn test_delete_unknown_file() {
    let t = TestVault::new().await;

    let err = t.vault.delete(FileId::new(999)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
}
