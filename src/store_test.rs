use super::*;

fn bodies(store: &MessageStore) -> Vec<&str> {
    store.all().iter().map(Message::body).collect()
}

#[test]
fn new_store_is_empty() {
    let store = MessageStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.last().is_none());
}

#[test]
fn append_preserves_arrival_order() {
    let mut store = MessageStore::new();
    store.append("first");
    store.append(String::from("second"));
    store.append("third");
    assert_eq!(bodies(&store), vec!["first", "second", "third"]);
    assert_eq!(store.last().map(Message::body), Some("third"));
}

#[test]
fn duplicate_bodies_are_kept() {
    let mut store = MessageStore::new();
    store.append("same");
    store.append("same");
    assert_eq!(store.len(), 2);
}

#[test]
fn clear_empties_the_log() {
    let mut store = MessageStore::new();
    store.append("gone");
    store.clear();
    assert!(store.is_empty());
}
