//! Request logging, unseen tracking and the polling feed.

mod common;

use common::spawn_app;
use contact_card::model::NewRequest;

#[tokio::test]
async fn test_non_exempt_request_is_recorded_once() {
    let app = spawn_app().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);

    let records = app.state.requests.all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path, "/");
    assert_eq!(records[0].method, "GET");
    assert_eq!(records[0].user, None);
    assert!(records[0].unseen);
    assert_eq!(records[0].priority, 0);
}

#[tokio::test]
async fn test_exempt_requests_are_not_recorded() {
    let app = spawn_app().await;

    assert_eq!(app.get("/request").await.status(), 200);
    assert_eq!(app.get("/request/ajax").await.status(), 200);
    app.feed().await;
    assert_eq!(app.get_signed_in("/form").await.status(), 200);
    // Redirected to the login page, still exempt.
    assert_eq!(app.get("/form").await.status(), 302);

    assert_eq!(app.recorded(), 0);
}

#[tokio::test]
async fn test_unresolved_requests_are_not_recorded() {
    let app = spawn_app().await;

    assert_eq!(app.get("/missing").await.status(), 404);
    let response = app.client.delete(app.url("/")).send().await.unwrap();
    assert_eq!(response.status(), 405);

    assert_eq!(app.recorded(), 0);
}

#[tokio::test]
async fn test_signed_in_request_records_user() {
    let app = spawn_app().await;

    app.get_signed_in("/").await;

    let records = app.state.requests.all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user, Some(1));
}

#[tokio::test]
async fn test_unseen_count_is_live() {
    let app = spawn_app().await;

    app.get("/").await;
    app.get("/").await;
    assert_eq!(app.feed().await.0, 2);

    app.get("/").await;
    assert_eq!(app.feed().await.0, 3);
}

#[tokio::test]
async fn test_signed_in_profile_view_clears_unseen() {
    let app = spawn_app().await;

    app.get("/").await;
    app.get("/").await;
    assert_eq!(app.unseen(), 2);

    // Anonymous views never clear.
    app.get("/").await;
    assert_eq!(app.unseen(), 3);

    app.get_signed_in("/").await;
    assert_eq!(app.unseen(), 0);
    let (unseen, records) = app.feed().await;
    assert_eq!(unseen, 0);
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.fields.new_request == 0));

    // Cleared records stay cleared; only new ones count.
    app.get("/").await;
    let (unseen, records) = app.feed().await;
    assert_eq!(unseen, 1);
    assert_eq!(records[0].fields.new_request, 1);
    assert!(records[1..].iter().all(|r| r.fields.new_request == 0));
}

#[tokio::test]
async fn test_feed_returns_newest_ten() {
    let app = spawn_app().await;
    for i in 0..15 {
        app.state
            .requests
            .record(&NewRequest::new(format!("/test{}", i), "GET", None))
            .unwrap();
    }

    let (unseen, records) = app.feed().await;
    assert_eq!(unseen, 15);
    assert_eq!(records.len(), 10);

    let paths: Vec<&str> = records.iter().map(|r| r.fields.path.as_str()).collect();
    for i in 5..15 {
        assert!(paths.contains(&format!("/test{}", i).as_str()));
    }
    for i in 0..5 {
        assert!(!paths.contains(&format!("/test{}", i).as_str()));
    }
    assert_eq!(paths[0], "/test14");
    assert!(records.iter().all(|r| r.model == "contact.requestrecord"));
}

#[tokio::test]
async fn test_empty_feed() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/request/ajax"))
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!([0, "[]"]));
}

#[tokio::test]
async fn test_feed_without_polling_marker_is_empty_object() {
    let app = spawn_app().await;
    app.get("/").await;

    let response = app.get("/request/ajax").await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn test_media_requests_are_not_recorded() {
    let app = spawn_app().await;
    std::fs::write(app.media.path().join("note.txt"), b"hello").unwrap();

    let response = app.get("/media/note.txt").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "hello");
    assert_eq!(app.recorded(), 0);
}
