//! Integration tests for file search and lookup.

mod helpers;

use chunkvault::{ErrorKind, FileId, FileQuery, GroupId};
use chunkvault_entity::file::FILE_LIST_LIMIT;
use chunkvault_entity::group::ROOT_GROUP_NAME;
use helpers::{TestVault, pattern};

#[tokio::test]
async fn test_listing_is_capped() {
    let t = TestVault::new().await;
    let path = t.write_source("tiny.txt", b"x").await;
    for _ in 0..(FILE_LIST_LIMIT + 5) {
        t.vault.upload(&path, GroupId::ROOT).await.unwrap();
    }

    let all = t.vault.files().search(&FileQuery::default()).await.unwrap();

    assert_eq!(all.len() as i64, FILE_LIST_LIMIT);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn test_search_by_name_fragment() {
    let t = TestVault::new().await;
    for name in ["Holiday.JPG", "holiday-2.png", "notes.txt"] {
        let path = t.write_source(name, b"data").await;
        t.vault.upload(&path, GroupId::ROOT).await.unwrap();
    }

    let hits = t.vault.files().search(&FileQuery::by_name("HOLIDAY")).await.unwrap();
    let names: Vec<&str> = hits.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Holiday.JPG", "holiday-2.png"]);

    let none = t.vault.files().search(&FileQuery::by_name("%")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_search_by_id_and_group() {
    let t = TestVault::new().await;
    let docs = t.vault.groups().create("Docs", None).await.unwrap();
    let a = t.write_source("a.txt", b"aaaa").await;
    let b = t.write_source("b.txt", b"bbbb").await;
    let first = t.vault.upload(&a, GroupId::ROOT).await.unwrap();
    let second = t.vault.upload(&b, docs.id).await.unwrap();

    let by_id = t.vault.files().search(&FileQuery::by_id(first.id)).await.unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].group_name, ROOT_GROUP_NAME);

    let in_docs = t.vault.files().search(&FileQuery::in_group(docs.id)).await.unwrap();
    assert_eq!(in_docs.len(), 1);
    assert_eq!(in_docs[0].id, second.id);
    assert_eq!(in_docs[0].group_name, "Docs");

    let combined = FileQuery {
        name_contains: Some("a".to_string()),
        group_id: Some(docs.id),
        ..FileQuery::default()
    };
    assert!(t.vault.files().search(&combined).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_unknown_group() {
    let t = TestVault::new().await;

    let err = t
        .vault
        .files()
        .search(&FileQuery::in_group(GroupId::new(55)))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_listing_sizes_are_human_readable() {
    let t = TestVault::new().await;
    let path = t.write_source("kb.bin", &pattern(2048)).await;
    t.vault.upload(&path, GroupId::ROOT).await.unwrap();

    let listing = t.vault.files().search(&FileQuery::by_name("kb")).await.unwrap();

    assert_eq!(listing[0].size, 2048);
    assert_eq!(listing[0].human_size(), "2.00 KB");
    assert_eq!(listing[0].total_parts, 82);
}

#[tokio::test]
async fn test_get_and_parts() {
    let t = TestVault::new().await;
    let path = t.write_source("doc.txt", &pattern(30)).await;
    let file = t.vault.upload(&path, GroupId::ROOT).await.unwrap();

    let fetched = t.vault.files().get(file.id).await.unwrap();
    assert_eq!(fetched, file);
    assert_eq!(fetched.extension().as_deref(), Some("txt"));

    let parts = t.vault.files().parts(file.id).await.unwrap();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|p| p.file_id == file.id));

    let err = t.vault.files().get(FileId::new(12345)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
