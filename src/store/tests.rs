//! Tests for the in-memory store

use super::*;
use chrono::DateTime;
use pretty_assertions::assert_eq;

fn post(id: &str, collection: &str, position: u64) -> Post {
    Post {
        id: id.to_string(),
        title: format!("post {id}"),
        author: "someone".to_string(),
        score: 10,
        collection: collection.to_string(),
        created_at: DateTime::UNIX_EPOCH,
        position,
    }
}

#[test]
fn test_next_position_starts_at_zero() {
    let store = MemoryPostStore::new();
    store
        .run_atomically(&mut |tx| {
            assert_eq!(tx.next_position("tech")?, 0);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_insert_and_read_ordered() {
    let store = MemoryPostStore::new();
    store
        .run_atomically(&mut |tx| {
            tx.insert(vec![post("b", "tech", 1), post("a", "tech", 0)])
        })
        .unwrap();

    let posts = store.read_ordered("tech").unwrap();
    let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_next_position_after_insert() {
    let store = MemoryPostStore::new();
    store
        .run_atomically(&mut |tx| tx.insert(vec![post("a", "tech", 0), post("b", "tech", 1)]))
        .unwrap();

    store
        .run_atomically(&mut |tx| {
            assert_eq!(tx.next_position("tech")?, 2);
            assert_eq!(tx.next_position("cooking")?, 0);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_collections_are_isolated() {
    let store = MemoryPostStore::new();
    store
        .run_atomically(&mut |tx| tx.insert(vec![post("a", "tech", 0), post("x", "cooking", 0)]))
        .unwrap();

    assert_eq!(store.read_ordered("tech").unwrap().len(), 1);
    assert_eq!(store.read_ordered("cooking").unwrap().len(), 1);

    store
        .run_atomically(&mut |tx| tx.delete_all("tech"))
        .unwrap();
    assert!(store.read_ordered("tech").unwrap().is_empty());
    assert_eq!(store.read_ordered("cooking").unwrap().len(), 1);
}

#[test]
fn test_failed_transaction_is_invisible() {
    let store = MemoryPostStore::new();
    let result = store.run_atomically(&mut |tx| {
        tx.insert(vec![post("a", "tech", 0)])?;
        Err(crate::error::Error::store("simulated failure"))
    });

    assert!(result.is_err());
    assert!(store.read_ordered("tech").unwrap().is_empty());
    // A failed transaction must not fire the invalidation signal either.
    assert_eq!(*store.watch().borrow(), 0);
}

#[test]
fn test_committed_write_bumps_version() {
    let store = MemoryPostStore::new();
    let watch = store.watch();
    assert_eq!(*watch.borrow(), 0);

    store
        .run_atomically(&mut |tx| tx.insert(vec![post("a", "tech", 0)]))
        .unwrap();
    assert_eq!(*watch.borrow(), 1);

    store
        .run_atomically(&mut |tx| {
            tx.delete_all("tech")?;
            tx.insert(vec![post("b", "tech", 0)])
        })
        .unwrap();
    // Delete + reinsert committed as one transaction, one invalidation.
    assert_eq!(*watch.borrow(), 2);
}

#[test]
fn test_read_only_transaction_does_not_invalidate() {
    let store = MemoryPostStore::new();
    store
        .run_atomically(&mut |tx| {
            let _ = tx.next_position("tech")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(*store.watch().borrow(), 0);
}
