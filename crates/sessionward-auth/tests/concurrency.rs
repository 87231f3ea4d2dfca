//! Concurrent rotation and issuance against a shared store.

use std::sync::Arc;

use futures_util::future::join_all;
use sessionward_auth::{
    BundleStore, InMemoryBundleStore, OwnerId, Rotator, SecretGenerator, TokenConfig, TokenIssuer,
};

fn setup() -> (Arc<InMemoryBundleStore>, TokenIssuer, Rotator) {
    let store = Arc::new(InMemoryBundleStore::new());
    let issuer = TokenIssuer::new(SecretGenerator::new(), TokenConfig::default());
    let rotator = Rotator::new(store.clone(), issuer.clone());
    (store, issuer, rotator)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rotations_leave_one_consistent_bundle() {
    let (store, issuer, rotator) = setup();
    let owner = OwnerId::new();
    let issued = issuer.issue(owner).unwrap();
    store.upsert(&issued).await.unwrap();

    let tasks = (0..2).map(|_| {
        let rotator = rotator.clone();
        let refresh = issued.refresh_secret.clone();
        tokio::spawn(async move { rotator.rotate(&refresh, owner).await })
    });
    let produced: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(store.len().await, 1);
    let stored = store.find_by_owner(owner).await.unwrap().unwrap();
    assert!(produced.contains(&stored));

    // The stored access secret resolves back to the same bundle.
    let by_access = store
        .find_by_access_secret(&stored.access_secret)
        .await
        .unwrap();
    assert_eq!(by_access, Some(stored.clone()));
    assert_eq!(stored.refresh_secret, issued.refresh_secret);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_rotations_never_empty_the_store() {
    let (store, issuer, rotator) = setup();
    let owner = OwnerId::new();
    let issued = issuer.issue(owner).unwrap();
    store.upsert(&issued).await.unwrap();

    let tasks = (0..32).map(|_| {
        let rotator = rotator.clone();
        let store = store.clone();
        let refresh = issued.refresh_secret.clone();
        tokio::spawn(async move {
            let rotated = rotator.rotate(&refresh, owner).await.unwrap();
            assert!(store.find_by_owner(owner).await.unwrap().is_some());
            rotated
        })
    });
    let produced: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let stored = store.find_by_owner(owner).await.unwrap().unwrap();
    assert!(produced.contains(&stored));
    assert_eq!(store.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_issuance_for_distinct_owners() {
    let (store, issuer, _) = setup();

    let tasks = (0..64).map(|_| {
        let store = store.clone();
        let issuer = issuer.clone();
        tokio::spawn(async move {
            let bundle = issuer.issue(OwnerId::new()).unwrap();
            store.upsert(&bundle).await.unwrap();
            bundle
        })
    });
    let bundles: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(store.len().await, 64);
    for bundle in &bundles {
        let found = store
            .find_by_access_secret(&bundle.access_secret)
            .await
            .unwrap();
        assert_eq!(found.as_ref(), Some(bundle));
    }
}
