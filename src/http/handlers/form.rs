//! Profile edit form.
//!
//! # Data Flow
//! ```text
//! POST multipart ─┐
//!                 ├→ Submission → clean() + ImageChange → save_person → respond
//! PUT (override) ─┘
//! ```
//!
//! Validation, photo decoding and both writes run on the blocking pool.
//! A new photo is written before the row; a failed row write deletes it again.
//! The replaced or cleared photo is removed only after the row is saved.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};

use crate::http::blocking::run_blocking;
use crate::http::error::AppError;
use crate::http::middleware::{MaybeUser, PutForm};
use crate::http::pages;
use crate::http::request::is_polling;
use crate::http::server::AppState;
use crate::media::{ImageChange, Upload};
use crate::model::{FieldErrors, Person, PersonForm};

pub const SAVED_MSG: &str = "Changes have been saved";

const IMAGE_FIELD: &str = "image";
const IMAGE_CLEAR_FIELD: &str = "image-clear";

/// Everything a client submitted, before validation.
#[derive(Debug, Default)]
struct Submission {
    form: PersonForm,
    upload: Option<Upload>,
    clear: bool,
}

impl Submission {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut submission = Submission::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                IMAGE_FIELD => {
                    let file_name = field.file_name().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(malformed)?;
                    submission.upload = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                IMAGE_CLEAR_FIELD => submission.clear = true,
                _ => {
                    let value = field.text().await.map_err(malformed)?;
                    submission.form.set(&name, value);
                }
            }
        }

        Ok(submission)
    }

    fn from_put(put: &PutForm) -> Self {
        let mut submission = Submission::default();
        for (name, value) in put.iter() {
            if name == IMAGE_CLEAR_FIELD {
                submission.clear = true;
            } else {
                submission.form.set(name, value.to_string());
            }
        }
        submission
    }
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("malformed multipart body: {}", e))
}

/// `GET /form`.
pub async fn form_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let people = state.people.clone();
    let person = run_blocking(move || people.first()).await?;
    let form = person
        .as_ref()
        .map(PersonForm::from_person)
        .unwrap_or_default();
    let image = person.as_ref().and_then(|p| p.image.as_ref());

    Ok(Html(pages::form_page(&form, image, &FieldErrors::new(), false)))
}

/// `POST /form` with a `multipart/form-data` body.
pub async fn submit_form(
    State(state): State<AppState>,
    user: MaybeUser,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let submission = Submission::from_multipart(multipart).await?;
    respond(state, &user, &headers, submission).await
}

/// `PUT /form`, usually reached through the method override.
pub async fn put_form(
    State(state): State<AppState>,
    user: MaybeUser,
    headers: HeaderMap,
    put: Option<Extension<PutForm>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let put = match put {
        Some(Extension(put)) => put,
        None => PutForm::parse(&body),
    };
    respond(state, &user, &headers, Submission::from_put(&put)).await
}

async fn respond(
    state: AppState,
    user: &MaybeUser,
    headers: &HeaderMap,
    submission: Submission,
) -> Result<Response, AppError> {
    let ajax = is_polling(headers);
    let echo = submission.form.clone();

    let people = state.people.clone();
    match run_blocking(move || save_person(&state, submission)).await {
        Ok(person) => {
            tracing::info!(
                person_id = person.id,
                user_id = ?user.0.as_ref().map(|u| u.id),
                "Profile saved"
            );
            if ajax {
                return Ok(Json(serde_json::json!({ "msg": SAVED_MSG })).into_response());
            }
            let page = pages::form_page(
                &PersonForm::from_person(&person),
                person.image.as_ref(),
                &FieldErrors::new(),
                true,
            );
            Ok(Html(page).into_response())
        }
        Err(AppError::Validation(errors)) if !ajax => {
            tracing::debug!(fields = errors.len(), "Profile form rejected");
            let image = run_blocking(move || people.first()).await?.and_then(|p| p.image);
            let page = pages::form_page(&echo, image.as_ref(), &errors, false);
            Ok((StatusCode::BAD_REQUEST, Html(page)).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Validate the submission and create or update the single stored person.
fn save_person(state: &AppState, submission: Submission) -> Result<Person, AppError> {
    let (draft, change) = match (
        submission.form.clean(),
        ImageChange::from_parts(submission.upload, submission.clear),
    ) {
        (Ok(draft), Ok(change)) => (draft, change),
        (draft, change) => {
            let mut errors = FieldErrors::new();
            if let Err(e) = draft {
                errors.merge(e);
            }
            if let Err(e) = change {
                errors.merge(e);
            }
            return Err(AppError::Validation(errors));
        }
    };

    let existing = state.people.first()?;
    let old_image = existing.as_ref().and_then(|p| p.image.clone());

    let new_image = match &change {
        ImageChange::Replace(photo) => Some(state.media.save(photo)?),
        ImageChange::Keep | ImageChange::Clear => None,
    };
    let image = match change {
        ImageChange::Keep => old_image.clone(),
        ImageChange::Clear => None,
        ImageChange::Replace(_) => new_image.clone(),
    };

    let saved = match existing {
        Some(mut person) => {
            person.apply(draft);
            person.image = image;
            state.people.update(&person).map(|()| person)
        }
        None => state.people.create(draft, image),
    };

    match saved {
        Ok(person) => {
            if let Some(old) = old_image.filter(|old| person.image.as_ref() != Some(old)) {
                if let Err(e) = state.media.remove(&old) {
                    tracing::warn!(file = %old.path, error = %e, "Failed to remove old image");
                }
            }
            Ok(person)
        }
        Err(e) => {
            if let Some(new) = &new_image {
                if let Err(remove_err) = state.media.remove(new) {
                    tracing::warn!(file = %new.path, error = %remove_err, "Failed to remove orphaned image");
                }
            }
            Err(e.into())
        }
    }
}
