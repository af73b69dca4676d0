//! Profile page, edit form and the audit trail.

mod common;

use std::io::Cursor;

use common::{sample_draft, spawn_app, TestApp, API_KEY};
use contact_card::model::AuditAction;
use image::{DynamicImage, ImageFormat, RgbImage};
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::multipart::{Form, Part};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn photo_part(width: u32, height: u32) -> Part {
    Part::bytes(png(width, height))
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap()
}

fn person_form(name: &str, email: &str) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("surname", "Woronow")
        .text("date_of_birth", "1990-05-01")
        .text("bio", "Rust developer")
        .text("email", email.to_string())
        .text("jabber", "42cc@khavr.com")
        .text("skype_id", "aleks.woronow")
        .text("other", "")
}

async fn post_form(app: &TestApp, form: Form, ajax: bool) -> reqwest::Response {
    let mut request = app
        .client
        .post(app.url("/form"))
        .header(AUTHORIZATION, format!("Bearer {}", API_KEY))
        .multipart(form);
    if ajax {
        request = request.header("X-Requested-With", "XMLHttpRequest");
    }
    request.send().await.unwrap()
}

fn actions(app: &TestApp) -> Vec<AuditAction> {
    app.state
        .audit
        .list()
        .unwrap()
        .into_iter()
        .map(|n| n.action)
        .collect()
}

#[tokio::test]
async fn test_profile_page_renders_person() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Visiting Card</title>"));
    assert!(html.contains("42 Coffee Cups Test Assignment"));
    assert!(html.contains("Aleks"));
    assert!(html.contains("Woronow"));
    assert!(html.contains("Aug. 22, 2015"));
    assert!(html.contains("aleks.woronow@yandex.ru"));
}

#[tokio::test]
async fn test_profile_page_without_person() {
    let app = spawn_app().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("<title>Visiting Card</title>"));
    assert!(html.contains("No contact information yet."));
}

#[tokio::test]
async fn test_anonymous_form_redirects_to_login() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = app.get("/form").await;
    assert_eq!(response.status(), 302);
    assert_eq!(response.headers()[LOCATION], "/login?next=%2Fform");

    let response = app
        .client
        .post(app.url("/form"))
        .multipart(person_form("Mallory", "mallory@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 302);

    let person = app.state.people.first().unwrap().unwrap();
    assert_eq!(person.name, "Aleks");
    assert_eq!(actions(&app), vec![AuditAction::Created]);
}

#[tokio::test]
async fn test_first_save_creates_person() {
    let app = spawn_app().await;

    let response = post_form(&app, person_form("Aleks", "aleks@example.com"), false).await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Changes have been saved"));

    assert_eq!(app.state.people.first().unwrap().unwrap().name, "Aleks");
    assert_eq!(actions(&app), vec![AuditAction::Created]);
}

#[tokio::test]
async fn test_signed_in_post_updates_person() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = post_form(&app, person_form("Alexander", "alexander@example.com"), false).await;
    assert_eq!(response.status(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Alexander"));
    assert!(html.contains("alexander@example.com"));
    assert!(!html.contains("aleks.woronow@yandex.ru"));

    let html = app.get("/").await.text().await.unwrap();
    assert!(html.contains("Alexander"));
    assert!(html.contains("May 1, 1990"));
    assert!(!html.contains("Aug. 22, 2015"));
    assert!(!html.contains("aleks.woronow@yandex.ru"));

    assert_eq!(actions(&app), vec![AuditAction::Created, AuditAction::Updated]);
    let notes = app.state.audit.list().unwrap();
    assert_eq!(notes[1].entity_type, "Person");
    assert_eq!(notes[1].entity_repr, "Woronow Alexander");
}

#[tokio::test]
async fn test_ajax_save_returns_message() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = post_form(&app, person_form("Alex", "alex@example.com"), true).await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "msg": "Changes have been saved" }));
}

#[tokio::test]
async fn test_ajax_validation_errors() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = post_form(&app, person_form("", "not-an-email"), true).await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"][0], "This field is required.");
    assert_eq!(body["email"][0], "Enter a valid email address.");

    assert_eq!(app.state.people.first().unwrap().unwrap().name, "Aleks");
    assert_eq!(actions(&app), vec![AuditAction::Created]);
}

#[tokio::test]
async fn test_html_validation_errors_rerender_form() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = post_form(&app, person_form("Alex", "alex@"), false).await;
    assert_eq!(response.status(), 400);
    let html = response.text().await.unwrap();
    assert!(html.contains("Enter a valid email address."));
    assert!(html.contains("value=\"alex@\""));
    assert_eq!(actions(&app), vec![AuditAction::Created]);
}

#[tokio::test]
async fn test_image_upload_replace_and_clear() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let form = person_form("Aleks", "aleks@example.com").part("image", photo_part(320, 240));
    let response = post_form(&app, form, false).await;
    assert_eq!(response.status(), 200);

    // Stored as a JPEG thumbnail within 200x200.
    let image = app.state.people.first().unwrap().unwrap().image.unwrap();
    assert!(image.path.starts_with("photo/"));
    assert!(image.path.ends_with(".jpg"));
    assert_eq!((image.width, image.height), (Some(200), Some(150)));
    let stored = app.media.path().join(&image.path);
    let thumbnail = image::open(&stored).unwrap();
    assert_eq!((thumbnail.width(), thumbnail.height()), (200, 150));

    let response = app.get(&format!("/media/{}", image.path)).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.bytes().await.unwrap().to_vec(), std::fs::read(&stored).unwrap());

    // Submitting without a file keeps the photo.
    post_form(&app, person_form("Aleks", "aleks@example.com"), true).await;
    assert_eq!(app.state.people.first().unwrap().unwrap().image, Some(image.clone()));

    // Upload plus clear is contradictory.
    let form = person_form("Aleks", "aleks@example.com")
        .part("image", photo_part(10, 10))
        .text("image-clear", "on");
    let response = post_form(&app, form, true).await;
    assert_eq!(response.status(), 400);

    let form = person_form("Aleks", "aleks@example.com").text("image-clear", "on");
    let response = post_form(&app, form, true).await;
    assert_eq!(response.status(), 200);
    assert_eq!(app.state.people.first().unwrap().unwrap().image, None);
    assert!(!stored.exists());
}

#[tokio::test]
async fn test_rejects_non_image_upload() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let upload = Part::bytes(b"plain text".to_vec()).file_name("notes.txt");
    let response = post_form(&app, person_form("Aleks", "aleks@example.com").part("image", upload), true).await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["image"][0].as_str().unwrap().starts_with("Upload a valid image."));
}

#[tokio::test]
async fn test_rejects_truncated_image() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    // A valid PNG cut short after its header.
    let mut truncated = png(320, 240);
    truncated.truncate(33);
    let upload = Part::bytes(truncated).file_name("me.png");
    let response = post_form(&app, person_form("Aleks", "aleks@example.com").part("image", upload), true).await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["image"][0].as_str().unwrap().starts_with("Upload a valid image."));

    assert_eq!(app.state.people.first().unwrap().unwrap().image, None);
    assert!(!app.media.path().join("photo").exists());
}

#[tokio::test]
async fn test_method_override_put() {
    let app = spawn_app().await;
    app.state.people.create(sample_draft(), None).unwrap();

    let response = app
        .client
        .post(app.url("/form"))
        .header(AUTHORIZATION, format!("Bearer {}", API_KEY))
        .header("X-HTTP-Method-Override", "PUT")
        .header("X-Requested-With", "XMLHttpRequest")
        .form(&[
            ("name", "Put"),
            ("surname", "Woronow"),
            ("date_of_birth", "2015-08-22"),
            ("email", "put@example.com"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let person = app.state.people.first().unwrap().unwrap();
    assert_eq!(person.name, "Put");
    assert_eq!(person.email, "put@example.com");
    assert_eq!(actions(&app), vec![AuditAction::Created, AuditAction::Updated]);
    assert_eq!(app.recorded(), 0);
}

#[tokio::test]
async fn test_delete_writes_note() {
    let app = spawn_app().await;

    let form = person_form("Aleks", "aleks@example.com").part("image", photo_part(64, 48));
    assert_eq!(post_form(&app, form, true).await.status(), 200);
    let person = app.state.people.first().unwrap().unwrap();
    let stored = app.media.path().join(&person.image.as_ref().unwrap().path);
    assert!(stored.exists());

    app.state.people.delete(person.id).unwrap();

    assert_eq!(actions(&app), vec![AuditAction::Created, AuditAction::Deleted]);
    assert!(!stored.exists());
    assert_eq!(app.get("/").await.status(), 200);
}

#[tokio::test]
async fn test_request_logging_writes_no_audit_notes() {
    let app = spawn_app().await;

    app.get("/").await;
    app.get("/").await;
    app.get_signed_in("/").await;

    assert_eq!(app.recorded(), 3);
    assert_eq!(app.state.audit.count().unwrap(), 0);
}
