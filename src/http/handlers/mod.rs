//! Request handlers.
//!
//! # Endpoints
//! ```text
//! GET  /              profile.rs  profile page, clears unseen for signed-in users
//! GET  /request       feed.rs     page shell that polls the feed      (exempt)
//! GET  /request/ajax  feed.rs     unseen count + newest records       (exempt)
//! GET  /form          form.rs     edit form                  (exempt, login)
//! POST /form          form.rs     multipart save             (exempt, login)
//! PUT  /form          form.rs     overridden form save       (exempt, login)
//! ```

pub mod feed;
pub mod form;
pub mod profile;
