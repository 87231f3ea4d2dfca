//! End-to-end credential lifecycle against the in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use sessionward_auth::{
    AuthError, Authorizer, BundleStore, InMemoryBundleStore, OwnerId, Rotator, SecretGenerator,
    TokenConfig, TokenIssuer,
};

struct Harness {
    store: Arc<InMemoryBundleStore>,
    issuer: TokenIssuer,
    authorizer: Authorizer,
    rotator: Rotator,
}

fn harness(config: TokenConfig) -> Harness {
    let store = Arc::new(InMemoryBundleStore::new());
    let issuer = TokenIssuer::new(SecretGenerator::new(), config);
    Harness {
        authorizer: Authorizer::new(store.clone()),
        rotator: Rotator::new(store.clone(), issuer.clone()),
        store,
        issuer,
    }
}

#[tokio::test]
async fn issue_authorize_rotate_logout() {
    let h = harness(TokenConfig::default());
    let owner = OwnerId::new();

    let issued = h.issuer.issue(owner).unwrap();
    h.store.upsert(&issued).await.unwrap();
    assert_eq!(
        h.authorizer
            .authorize(&issued.access_secret, &issued.anti_forgery_secret)
            .await
            .unwrap(),
        owner
    );

    tokio::time::sleep(Duration::from_millis(5)).await;
    let rotated = h.rotator.rotate(&issued.refresh_secret, owner).await.unwrap();
    assert_eq!(rotated.refresh_secret, issued.refresh_secret);
    assert!(rotated.expires_at > issued.expires_at);
    assert_eq!(
        rotated.expires_at - rotated.created_at,
        time::Duration::minutes(15)
    );

    // The previous access secret no longer resolves.
    let err = h
        .authorizer
        .authorize(&issued.access_secret, &issued.anti_forgery_secret)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));

    // The new pair works, and the old anti-forgery secret does not pair with it.
    assert!(
        h.authorizer
            .authorize(&rotated.access_secret, &rotated.anti_forgery_secret)
            .await
            .is_ok()
    );
    let err = h
        .authorizer
        .authorize(&rotated.access_secret, &issued.anti_forgery_secret)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));

    h.store.delete(owner).await.unwrap();
    let err = h
        .authorizer
        .authorize(&rotated.access_secret, &rotated.anti_forgery_secret)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));
    let err = h
        .rotator
        .rotate(&rotated.refresh_secret, owner)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));
}

#[tokio::test]
async fn reissue_replaces_previous_bundle() {
    let h = harness(TokenConfig::default());
    let owner = OwnerId::new();

    let first = h.issuer.issue(owner).unwrap();
    h.store.upsert(&first).await.unwrap();
    let second = h.issuer.issue(owner).unwrap();
    h.store.upsert(&second).await.unwrap();

    assert_eq!(h.store.len().await, 1);
    assert!(
        h.store
            .find_by_access_secret(&first.access_secret)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        h.store
            .find_by_refresh_secret(&first.refresh_secret)
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(h.store.find_by_owner(owner).await.unwrap(), Some(second));
}

#[tokio::test]
async fn rotation_honours_expired_access() {
    let h = harness(TokenConfig::default().with_access_token_lifetime(Duration::from_secs(1)));
    let owner = OwnerId::new();

    let issued = h.issuer.issue(owner).unwrap();
    h.store.upsert(&issued).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let err = h
        .authorizer
        .authorize(&issued.access_secret, &issued.anti_forgery_secret)
        .await
        .unwrap_err();
    assert!(err.needs_refresh());

    // An expired access secret does not block the refresh flow.
    let rotated = h.rotator.rotate(&issued.refresh_secret, owner).await.unwrap();
    assert_eq!(
        h.authorizer
            .authorize(&rotated.access_secret, &rotated.anti_forgery_secret)
            .await
            .unwrap(),
        owner
    );
}

#[tokio::test]
async fn short_lifetime_expires_in_real_time() {
    let h = harness(TokenConfig::default().with_access_token_lifetime(Duration::from_secs(1)));
    let issued = h.issuer.issue(OwnerId::new()).unwrap();
    h.store.upsert(&issued).await.unwrap();

    assert!(
        h.authorizer
            .authorize(&issued.access_secret, &issued.anti_forgery_secret)
            .await
            .is_ok()
    );

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let err = h
        .authorizer
        .authorize(&issued.access_secret, &issued.anti_forgery_secret)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::CredentialExpired));
}

#[tokio::test]
async fn bundles_are_isolated_between_owners() {
    let h = harness(TokenConfig::default());
    let alice = h.issuer.issue(OwnerId::new()).unwrap();
    let bob = h.issuer.issue(OwnerId::new()).unwrap();
    h.store.upsert(&alice).await.unwrap();
    h.store.upsert(&bob).await.unwrap();

    let err = h
        .authorizer
        .authorize(&alice.access_secret, &bob.anti_forgery_secret)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));

    let err = h
        .rotator
        .rotate(&alice.refresh_secret, bob.owner_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential));

    h.store.delete(alice.owner_id).await.unwrap();
    assert!(
        h.authorizer
            .authorize(&bob.access_secret, &bob.anti_forgery_secret)
            .await
            .is_ok()
    );
}
