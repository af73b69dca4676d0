//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use contact_card::http::handlers::feed::FeedRecord;
use contact_card::http::{AppState, XML_HTTP_REQUEST, X_REQUESTED_WITH};
use contact_card::model::{PersonDraft, PersonForm};
use contact_card::{AppConfig, HttpServer, Shutdown};
use reqwest::header::AUTHORIZATION;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// A running server on an ephemeral port with private storage.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState,
    pub client: reqwest::Client,
    pub media: TempDir,
    shutdown: Shutdown,
}

/// Start a server backed by an in-memory database and a temporary media root.
pub async fn spawn_app() -> TestApp {
    let media = tempfile::tempdir().unwrap();

    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.database.path = ":memory:".into();
    config.media.root = media.path().to_string_lossy().into_owned();

    let server = HttpServer::new(config).unwrap();
    let state = server.state().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        state,
        client,
        media,
        shutdown,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn get_signed_in(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(AUTHORIZATION, format!("Bearer {}", API_KEY))
            .send()
            .await
            .unwrap()
    }

    /// Poll the feed and decode both elements.
    pub async fn feed(&self) -> (u64, Vec<FeedRecord>) {
        let response = self
            .client
            .get(self.url("/request/ajax"))
            .header(X_REQUESTED_WITH, XML_HTTP_REQUEST)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let (unseen, records): (u64, String) = response.json().await.unwrap();
        (unseen, serde_json::from_str(&records).unwrap())
    }

    pub fn unseen(&self) -> u64 {
        self.state.requests.unseen_count().unwrap()
    }

    pub fn recorded(&self) -> usize {
        self.state.requests.all().unwrap().len()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A valid draft for seeding the profile.
pub fn sample_draft() -> PersonDraft {
    let form = PersonForm {
        name: "Aleks".into(),
        surname: "Woronow".into(),
        date_of_birth: "2015-08-22".into(),
        bio: "I was born ...".into(),
        email: "aleks.woronow@yandex.ru".into(),
        jabber: "42cc@khavr.com".into(),
        skype_id: "aleks.woronow".into(),
        other: String::new(),
    };
    form.clean().unwrap()
}
