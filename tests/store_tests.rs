use portal_shell::{
    AppShell, Frame, MockSessionVerifier, RouteTable,
    store::{KeyValueStore, MemoryStore, RECENT_SEARCHES_KEY, RecentSearches},
    views,
};
use std::sync::Arc;

#[test]
fn test_memory_store_get_set_remove_clear() {
    let store = MemoryStore::new();
    assert_eq!(store.get("theme"), None);

    store.set("theme", "dark".to_string());
    store.set("lang", "en".to_string());
    assert_eq!(store.get("theme").as_deref(), Some("dark"));

    store.remove("theme");
    assert_eq!(store.get("theme"), None);
    assert_eq!(store.get("lang").as_deref(), Some("en"));

    store.clear();
    assert_eq!(store.get("lang"), None);
}

#[test]
fn test_recent_searches_are_most_recent_first_and_deduplicated() {
    let store = MemoryStore::new();
    let recent = RecentSearches::new(&store);

    recent.record("CERT-1");
    recent.record("CERT-2");
    recent.record("CERT-1");

    assert_eq!(recent.list(), vec!["CERT-1", "CERT-2"]);
}

#[test]
fn test_recent_searches_keep_five() {
    let store = MemoryStore::new();
    let recent = RecentSearches::new(&store);

    for i in 1..=7 {
        recent.record(&format!("CERT-{i}"));
    }

    assert_eq!(
        recent.list(),
        vec!["CERT-7", "CERT-6", "CERT-5", "CERT-4", "CERT-3"]
    );
}

#[test]
fn test_recent_searches_ignore_blank_terms_and_corrupt_values() {
    let store = MemoryStore::new();
    let recent = RecentSearches::new(&store);

    recent.record("   ");
    assert!(recent.list().is_empty());

    store.set(RECENT_SEARCHES_KEY, "{not json".to_string());
    assert!(recent.list().is_empty());
    assert_eq!(recent.record("CERT-9"), vec!["CERT-9"]);

    recent.clear();
    assert_eq!(store.get(RECENT_SEARCHES_KEY), None);
}

#[tokio::test]
async fn test_certificate_lookup_records_visited_ids() {
    let store = Arc::new(MemoryStore::new());
    let loader = Arc::new(views::catalog());
    let verifier = Arc::new(MockSessionVerifier::unauthenticated());

    let mut shell = AppShell::new(
        RouteTable::portal(),
        loader,
        verifier.clone(),
        store.clone(),
        "/verify-certificate/CERT-<1>",
    );
    shell.settle().await;
    shell.navigate("/verify-certificate/CERT-2");
    shell.settle().await;
    shell.navigate("/verify-certificate");

    match shell.settle().await {
        Frame::View { markup, .. } => {
            assert!(markup.contains("<li>CERT-2</li><li>CERT-&lt;1&gt;</li>"));
        }
        other => panic!("expected lookup view, got {other:?}"),
    }
    assert_eq!(RecentSearches::new(&*store).list(), vec!["CERT-2", "CERT-<1>"]);
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn test_certificate_lookup_records_decoded_ids() {
    let store = Arc::new(MemoryStore::new());
    let mut shell = AppShell::new(
        RouteTable::portal(),
        Arc::new(views::catalog()),
        Arc::new(MockSessionVerifier::unauthenticated()),
        store.clone(),
        "/verify-certificate/a%20b",
    );

    match shell.settle().await {
        Frame::View { markup, .. } => {
            assert!(markup.contains(r#"data-certificate="a b""#));
            assert!(markup.contains("<li>a b</li>"));
        }
        other => panic!("expected lookup view, got {other:?}"),
    }
    assert_eq!(RecentSearches::new(&*store).list(), vec!["a b"]);
}
