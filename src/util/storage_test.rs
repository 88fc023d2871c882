use super::*;
use serde_json::json;

fn sample_user() -> User {
    serde_json::from_value(json!({ "id": 1, "name": "A" })).unwrap()
}

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").as_deref(), Some("v"));
    store.remove("k");
    assert_eq!(store.get("k"), None);
    store.remove("missing");
    assert!(store.is_empty());
}

#[test]
fn memory_store_collects_from_pairs() {
    let store: MemoryStore = [(TOKEN_KEY, "T"), ("theme", "dark")].into_iter().collect();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("T"));
}

#[test]
fn load_credentials_needs_both_keys() {
    let token_only: MemoryStore = [(TOKEN_KEY, "T")].into_iter().collect();
    assert_eq!(load_credentials(&token_only), None);

    let user_only: MemoryStore = [(USER_KEY, "{}")].into_iter().collect();
    assert_eq!(load_credentials(&user_only), None);
}

#[test]
fn persist_then_load_round_trips() {
    let store = MemoryStore::new();
    persist_credentials(&store, "T1", &sample_user()).unwrap();

    let stored = load_credentials(&store).unwrap();
    assert_eq!(stored.token, "T1");
    let user: User = serde_json::from_str(&stored.user).unwrap();
    assert_eq!(user, sample_user());
}

#[test]
fn clear_credentials_leaves_unrelated_keys() {
    let store: MemoryStore = [(TOKEN_KEY, "T"), (USER_KEY, "{}"), ("theme", "dark")]
        .into_iter()
        .collect();
    clear_credentials(&store);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("theme").as_deref(), Some("dark"));
}
