//! End-to-end resolution tests over the in-memory store and cache.

mod common;

use std::time::Duration;

use chrono::Utc;
use linklet::application::services::{ClickContext, Resolution};

use common::{build_app, create_expiring_link, create_test_link};

#[tokio::test]
async fn test_active_link_redirects_to_stored_target() {
    let mut app = build_app();
    create_test_link(&app.store, "abc123", "https://example.com").await;

    let result = app
        .state
        .resolver
        .resolve("abc123", ClickContext::default())
        .await
        .unwrap();

    assert_eq!(
        result,
        Resolution::Redirect("https://example.com".to_string())
    );

    let event = app.click_rx.try_recv().unwrap();
    assert_eq!(event.code, "abc123");
}

#[tokio::test]
async fn test_cache_and_store_agree_on_target() {
    let app = build_app();
    create_test_link(&app.store, "agree1", "https://example.com/target").await;

    // First resolve fills the cache from the store.
    let from_store = app
        .state
        .resolver
        .resolve("agree1", ClickContext::default())
        .await
        .unwrap();

    // The cache write is fire-and-forget; give it a beat to land.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let from_cache = app
        .state
        .resolver
        .resolve("agree1", ClickContext::default())
        .await
        .unwrap();

    assert_eq!(from_store, from_cache);
    assert_eq!(
        from_cache,
        Resolution::Redirect("https://example.com/target".to_string())
    );
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let app = build_app();

    let result = app
        .state
        .resolver
        .resolve("ghost", ClickContext::default())
        .await
        .unwrap();

    assert_eq!(result, Resolution::NotFound);
}

#[tokio::test]
async fn test_expired_link_is_gone() {
    let app = build_app();
    create_expiring_link(
        &app.store,
        "exp1",
        "https://example.com",
        Utc::now() - chrono::Duration::days(1),
    )
    .await;

    let result = app
        .state
        .resolver
        .resolve("exp1", ClickContext::default())
        .await
        .unwrap();

    assert_eq!(result, Resolution::Gone);
}

#[tokio::test]
async fn test_cached_snapshot_expires_live() {
    let app = build_app();

    // Valid now, expired in 150ms.
    create_expiring_link(
        &app.store,
        "fuse",
        "https://example.com",
        Utc::now() + chrono::Duration::milliseconds(150),
    )
    .await;

    let before = app
        .state
        .resolver
        .resolve("fuse", ClickContext::default())
        .await
        .unwrap();
    assert!(matches!(before, Resolution::Redirect(_)));

    // Wait past the expiry; the pre-expiry snapshot is still cached, but
    // expiry must be re-evaluated on every resolution.
    tokio::time::sleep(Duration::from_millis(250)).await;

    let after = app
        .state
        .resolver
        .resolve("fuse", ClickContext::default())
        .await
        .unwrap();
    assert_eq!(after, Resolution::Gone);
}

#[tokio::test]
async fn test_soft_delete_takes_effect_immediately() {
    let app = build_app();
    create_test_link(&app.store, "dying", "https://example.com").await;

    // Warm the cache.
    let live = app
        .state
        .resolver
        .resolve("dying", ClickContext::default())
        .await
        .unwrap();
    assert!(matches!(live, Resolution::Redirect(_)));
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Soft delete invalidates the cache entry before returning.
    assert!(app.state.link_service.soft_delete("dying").await.unwrap());

    let dead = app
        .state
        .resolver
        .resolve("dying", ClickContext::default())
        .await
        .unwrap();
    assert_eq!(dead, Resolution::NotFound);
}

#[tokio::test]
async fn test_update_invalidates_cached_target() {
    let app = build_app();
    create_test_link(&app.store, "moving", "https://old.example.com").await;

    let first = app
        .state
        .resolver
        .resolve("moving", ClickContext::default())
        .await
        .unwrap();
    assert_eq!(
        first,
        Resolution::Redirect("https://old.example.com".to_string())
    );
    tokio::time::sleep(Duration::from_millis(20)).await;

    app.state
        .link_service
        .update_link(
            "moving",
            linklet::domain::entities::LinkPatch {
                target_url: Some("https://new.example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let second = app
        .state
        .resolver
        .resolve("moving", ClickContext::default())
        .await
        .unwrap();
    assert_eq!(
        second,
        Resolution::Redirect("https://new.example.com".to_string())
    );
}
