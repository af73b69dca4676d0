//! Request feed: the polling page and its JSON endpoint.
//!
//! # Wire format
//! ```text
//! [unseen_count, "[{\"model\": \"contact.requestrecord\", \"pk\": 7, \"fields\": {...}}, ...]"]
//! ```
//! The second element is a JSON array encoded as a string.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::http::blocking::run_blocking;
use crate::http::error::AppError;
use crate::http::pages;
use crate::http::request::is_polling;
use crate::http::server::AppState;
use crate::model::{RequestRecord, UserId};
use crate::store::StoreResult;

pub const FEED_MODEL: &str = "contact.requestrecord";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFields {
    pub path: String,
    pub method: String,
    pub user: Option<UserId>,
    pub date: String,
    /// 1 while unseen, 0 afterwards.
    pub new_request: u8,
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub model: String,
    pub pk: i64,
    pub fields: FeedFields,
}

impl From<&RequestRecord> for FeedRecord {
    fn from(record: &RequestRecord) -> Self {
        Self {
            model: FEED_MODEL.to_string(),
            pk: record.id,
            fields: FeedFields {
                path: record.path.clone(),
                method: record.method.clone(),
                user: record.user,
                date: record.date.to_rfc3339_opts(SecondsFormat::Millis, true),
                new_request: u8::from(record.unseen),
                priority: record.priority,
            },
        }
    }
}

/// Serialize records into the string element of the feed.
pub fn records_json(records: &[RequestRecord]) -> Result<String, serde_json::Error> {
    let records: Vec<FeedRecord> = records.iter().map(FeedRecord::from).collect();
    serde_json::to_string(&records)
}

/// `GET /request`.
pub async fn request_page() -> Html<String> {
    Html(pages::request_page())
}

/// `GET /request/ajax`.
///
/// Only polling calls get the feed; anything else gets an empty object.
pub async fn request_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if !is_polling(&headers) {
        return Ok(Json(serde_json::json!({})).into_response());
    }

    let requests = state.requests.clone();
    let limit = state.config.feed.limit;
    let (unseen, records) = run_blocking(move || -> StoreResult<_> {
        Ok((requests.unseen_count()?, requests.recent(limit)?))
    })
    .await?;
    let payload = records_json(&records)?;

    Ok(Json((unseen, payload)).into_response())
}
