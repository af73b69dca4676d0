//! Durable log of observed requests.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::Database;
use crate::model::{FieldErrors, NewRequest, RequestRecord};
use crate::store::{StoreError, StoreResult};

const SELECT_SQL: &str = "SELECT id, path, method, user_id, date, unseen, priority FROM request_log";

/// Request log repository.
#[derive(Clone)]
pub struct RequestStore {
    db: Database,
}

impl RequestStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert one record with `unseen = true` and `priority = 0`.
    pub fn record(&self, request: &NewRequest) -> StoreResult<RequestRecord> {
        let mut errors = FieldErrors::new();
        if request.path.is_empty() {
            errors.add("path", "must not be empty");
        }
        if request.method.is_empty() {
            errors.add("method", "must not be empty");
        }
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let date = now_millis();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO request_log (path, method, user_id, date, unseen, priority)
                 VALUES (?1, ?2, ?3, ?4, 1, 0);",
                params![
                    request.path,
                    request.method,
                    request.user,
                    date.timestamp_millis()
                ],
            )?;

            Ok(RequestRecord {
                id: conn.last_insert_rowid(),
                path: request.path.clone(),
                method: request.method.clone(),
                user: request.user,
                date,
                unseen: true,
                priority: 0,
            })
        })
    }

    /// Live number of records not yet seen by an authenticated user.
    pub fn unseen_count(&self) -> StoreResult<u64> {
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM request_log WHERE unseen = 1;",
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: u32) -> StoreResult<Vec<RequestRecord>> {
        self.query(
            &format!("{SELECT_SQL} ORDER BY date DESC, id DESC LIMIT ?1;"),
            Some(limit),
        )
    }

    /// Every record, newest first.
    pub fn all(&self) -> StoreResult<Vec<RequestRecord>> {
        self.query(&format!("{SELECT_SQL} ORDER BY date DESC, id DESC;"), None)
    }

    /// Mark every unseen record as seen in one statement.
    ///
    /// Returns the number of rows that flipped.
    pub fn clear_unseen(&self) -> StoreResult<usize> {
        self.db.with_conn(|conn| {
            let changed = conn.execute("UPDATE request_log SET unseen = 0 WHERE unseen = 1;", [])?;
            Ok(changed)
        })
    }

    fn query(&self, sql: &str, limit: Option<u32>) -> StoreResult<Vec<RequestRecord>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let mut rows = match limit {
                Some(limit) => stmt.query(params![i64::from(limit)])?,
                None => stmt.query([])?,
            };

            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(parse_row(row)?);
            }
            Ok(records)
        })
    }
}

fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

fn parse_row(row: &Row<'_>) -> StoreResult<RequestRecord> {
    let millis: i64 = row.get("date")?;
    let date = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid timestamp `{millis}` in request_log.date"))
    })?;

    let unseen = match row.get::<_, i64>("unseen")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid unseen value `{other}` in request_log.unseen"
            )));
        }
    };

    let priority: i64 = row.get("priority")?;
    let priority = u32::try_from(priority).map_err(|_| {
        StoreError::InvalidData(format!("invalid priority `{priority}` in request_log.priority"))
    })?;

    Ok(RequestRecord {
        id: row.get("id")?,
        path: row.get("path")?,
        method: row.get("method")?,
        user: row.get("user_id")?,
        date,
        unseen,
        priority,
    })
}
