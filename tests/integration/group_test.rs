//! Integration tests for the group hierarchy.

mod helpers;

use chunkvault::{ErrorKind, GroupId};
use chunkvault_entity::group::ROOT_GROUP_NAME;
use helpers::{TestVault, pattern};

#[tokio::test]
async fn test_root_group_exists() {
    let t = TestVault::new().await;

    let root = t.vault.groups().get(ROOT_GROUP_NAME).await.unwrap();

    assert_eq!(root.id, GroupId::ROOT);
    assert!(root.parent_id.is_none());
}

#[tokio::test]
async fn test_create_and_list_groups() {
    let t = TestVault::new().await;
    let books = t.vault.groups().create("Books", None).await.unwrap();
    let math = t.vault.groups().create("  Math ", Some("Books")).await.unwrap();

    assert_eq!(math.name, "Math");
    assert_eq!(math.parent_id, Some(books.id));

    let listing = t.vault.groups().list().await.unwrap();
    let labels: Vec<(String, String)> = listing
        .iter()
        .map(|g| (g.name.clone(), g.parent_label().to_string()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (ROOT_GROUP_NAME.to_string(), "root".to_string()),
            ("Books".to_string(), "root".to_string()),
            ("Math".to_string(), "Books".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let t = TestVault::new().await;
    t.vault.groups().create("Books", None).await.unwrap();

    let dup = t.vault.groups().create("Books", None).await.unwrap_err();
    assert_eq!(dup.kind, ErrorKind::Conflict);

    let empty = t.vault.groups().create("   ", None).await.unwrap_err();
    assert_eq!(empty.kind, ErrorKind::Validation);

    let own_parent = t.vault.groups().create("Loop", Some("Loop")).await.unwrap_err();
    assert_eq!(own_parent.kind, ErrorKind::Validation);

    let orphan = t.vault.groups().create("Orphan", Some("Nowhere")).await.unwrap_err();
    assert_eq!(orphan.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_subtree_reassigns_files_to_root() {
    let t = TestVault::new().await;
    t.vault.groups().create("Books", None).await.unwrap();
    let math = t.vault.groups().create("Math", Some("Books")).await.unwrap();
    let keep = t.vault.groups().create("Music", None).await.unwrap();

    let a = t.write_source("algebra.pdf", &pattern(40)).await;
    let b = t.write_source("song.mp3", &pattern(10)).await;
    let algebra = t.vault.upload(&a, math.id).await.unwrap();
    let song = t.vault.upload(&b, keep.id).await.unwrap();

    let deletion = t.vault.groups().delete("Books").await.unwrap();

    assert_eq!(deletion.removed, vec!["Math".to_string(), "Books".to_string()]);
    assert_eq!(deletion.reassigned_files, 1);

    let algebra = t.vault.files().get(algebra.id).await.unwrap();
    assert_eq!(algebra.group_id, GroupId::ROOT);
    let song = t.vault.files().get(song.id).await.unwrap();
    assert_eq!(song.group_id, keep.id);

    for gone in ["Books", "Math"] {
        let err = t.vault.groups().get(gone).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    // Reassigned files keep their parts.
    let outcome = t.vault.download(algebra.id, "algebra.out").await.unwrap();
    assert_eq!(outcome.bytes_written, 40);
}

#[tokio::test]
async fn test_delete_deep_subtree() {
    let t = TestVault::new().await;
    t.vault.groups().create("a", None).await.unwrap();
    t.vault.groups().create("b", Some("a")).await.unwrap();
    t.vault.groups().create("c", Some("b")).await.unwrap();
    t.vault.groups().create("d", Some("a")).await.unwrap();

    let deletion = t.vault.groups().delete("a").await.unwrap();

    assert_eq!(deletion.removed.len(), 4);
    assert_eq!(deletion.removed.last().map(String::as_str), Some("a"));
    let pos = |n: &str| deletion.removed.iter().position(|r| r == n).unwrap();
    assert!(pos("c") < pos("b"));

    let listing = t.vault.groups().list().await.unwrap();
    assert_eq!(listing.len(), 1);
}

#[tokio::test]
async fn test_delete_unknown_and_root() {
    let t = TestVault::new().await;

    let missing = t.vault.groups().delete("missing").await.unwrap_err();
    assert_eq!(missing.kind, ErrorKind::NotFound);

    let root = t.vault.groups().delete(ROOT_GROUP_NAME).await.unwrap_err();
    assert_eq!(root.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_cyclic_hierarchy_is_refused_without_changes() {
    let t = TestVault::new().await;
    let books = t.vault.groups().create("Books", None).await.unwrap();
    let math = t.vault.groups().create("Math", Some("Books")).await.unwrap();

    let path = t.write_source("proof.txt", b"qed").await;
    let file = t.vault.upload(&path, math.id).await.unwrap();

    sqlx::query("UPDATE groups SET parent_id = ? WHERE id = ?")
        .bind(math.id.get())
        .bind(books.id.get())
        .execute(t.vault.database().pool())
        .await
        .unwrap();

    let err = t.vault.groups().delete("Books").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Internal);

    assert!(t.vault.groups().get("Books").await.is_ok());
    assert!(t.vault.groups().get("Math").await.is_ok());
    let file = t.vault.files().get(file.id).await.unwrap();
    assert_eq!(file.group_id, math.id);
}

#[tokio::test]
async fn test_names_are_trimmed_on_lookup() {
    let t = TestVault::new().await;
    let math = t.vault.groups().create("  Math ", None).await.unwrap();

    assert_eq!(t.vault.groups().get(" Math").await.unwrap().id, math.id);

    let dup = t.vault.groups().create("Math  ", None).await.unwrap_err();
    assert_eq!(dup.kind, ErrorKind::Conflict);

    let deletion = t.vault.groups().delete("  Math ").await.unwrap();
    assert_eq!(deletion.removed, vec!["Math".to_string()]);
}

#[tokio::test]
async fn test_get_by_id() {
    let t = TestVault::new().await;
    let books = t.vault.groups().create("Books", None).await.unwrap();

    let found = t.vault.groups().get_by_id(books.id).await.unwrap();
    assert_eq!(found.name, "Books");

    let root = t.vault.groups().get_by_id(GroupId::ROOT).await.unwrap();
    assert_eq!(root.name, ROOT_GROUP_NAME);

    let err = t.vault.groups().get_by_id(GroupId::new(404)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_validate_exists() {
    let t = TestVault::new().await;
    let books = t.vault.groups().create("Books", None).await.unwrap();

    assert!(t.vault.groups().validate_exists(books.id).await.is_ok());
    let err = t.vault.groups().validate_exists(GroupId::new(77)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
