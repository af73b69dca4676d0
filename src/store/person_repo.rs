//! Person repository. Every successful write is reported to the change notifier.
//!
//! Deleting a person also removes their stored photo.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use crate::audit::ChangeNotifier;
use crate::db::Database;
use crate::media::MediaStore;
use crate::model::{AuditAction, EntityKind, ImageRef, Person, PersonDraft, PersonId};
use crate::store::{StoreError, StoreResult};

const SELECT_SQL: &str = "SELECT
    id, name, surname, date_of_birth, bio, email, jabber, skype_id, other,
    image_path, image_width, image_height
FROM person";

#[derive(Clone)]
pub struct PersonRepository {
    db: Database,
    notifier: ChangeNotifier,
    media: MediaStore,
}

impl PersonRepository {
    pub fn new(db: Database, notifier: ChangeNotifier, media: MediaStore) -> Self {
        Self { db, notifier, media }
    }

    /// The profile shown on the home page: the person with the lowest id.
    pub fn first(&self) -> StoreResult<Option<Person>> {
        self.fetch_one(&format!("{SELECT_SQL} ORDER BY id ASC LIMIT 1;"), None)
    }

    pub fn get(&self, id: PersonId) -> StoreResult<Option<Person>> {
        self.fetch_one(&format!("{SELECT_SQL} WHERE id = ?1;"), Some(id))
    }

    pub fn create(&self, draft: PersonDraft, image: Option<ImageRef>) -> StoreResult<Person> {
        let mut person = Person {
            id: 0,
            name: draft.name,
            surname: draft.surname,
            date_of_birth: draft.date_of_birth,
            bio: draft.bio,
            email: draft.email,
            jabber: draft.jabber,
            skype_id: draft.skype_id,
            other: draft.other,
            image,
        };
        person.validate()?;

        person.id = self.db.with_conn(|conn| -> StoreResult<PersonId> {
            conn.execute(
                "INSERT INTO person (
                    name, surname, date_of_birth, bio, email, jabber, skype_id, other,
                    image_path, image_width, image_height
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    person.name,
                    person.surname,
                    date_to_db(person.date_of_birth),
                    person.bio,
                    person.email,
                    person.jabber,
                    person.skype_id,
                    person.other,
                    person.image.as_ref().map(|i| i.path.as_str()),
                    person.image.as_ref().and_then(|i| i.width),
                    person.image.as_ref().and_then(|i| i.height),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        self.notifier.on_mutation(
            EntityKind::Person,
            person.id,
            &person.to_string(),
            AuditAction::Created,
        )?;
        Ok(person)
    }

    pub fn update(&self, person: &Person) -> StoreResult<()> {
        person.validate()?;

        let changed = self.db.with_conn(|conn| -> StoreResult<usize> {
            let changed = conn.execute(
                "UPDATE person
                 SET
                    name = ?1,
                    surname = ?2,
                    date_of_birth = ?3,
                    bio = ?4,
                    email = ?5,
                    jabber = ?6,
                    skype_id = ?7,
                    other = ?8,
                    image_path = ?9,
                    image_width = ?10,
                    image_height = ?11
                 WHERE id = ?12;",
                params![
                    person.name,
                    person.surname,
                    date_to_db(person.date_of_birth),
                    person.bio,
                    person.email,
                    person.jabber,
                    person.skype_id,
                    person.other,
                    person.image.as_ref().map(|i| i.path.as_str()),
                    person.image.as_ref().and_then(|i| i.width),
                    person.image.as_ref().and_then(|i| i.height),
                    person.id,
                ],
            )?;
            Ok(changed)
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: EntityKind::Person,
                id: person.id,
            });
        }

        self.notifier.on_mutation(
            EntityKind::Person,
            person.id,
            &person.to_string(),
            AuditAction::Updated,
        )?;
        Ok(())
    }

    /// Delete a person and their photo, returning the removed row.
    ///
    /// The file goes only after the row and its note are written. A file that
    /// cannot be removed is logged and left behind.
    pub fn delete(&self, id: PersonId) -> StoreResult<Person> {
        let person = self.get(id)?.ok_or(StoreError::NotFound {
            kind: EntityKind::Person,
            id,
        })?;

        let changed = self.db.with_conn(|conn| -> StoreResult<usize> {
            Ok(conn.execute("DELETE FROM person WHERE id = ?1;", [id])?)
        })?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                kind: EntityKind::Person,
                id,
            });
        }

        self.notifier.on_mutation(
            EntityKind::Person,
            id,
            &person.to_string(),
            AuditAction::Deleted,
        )?;

        if let Some(image) = &person.image {
            if let Err(e) = self.media.remove(image) {
                tracing::warn!(
                    person_id = id,
                    file = %image.path,
                    error = %e,
                    "Failed to remove photo of deleted person"
                );
            }
        }
        Ok(person)
    }

    fn fetch_one(&self, sql: &str, id: Option<PersonId>) -> StoreResult<Option<Person>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let row = match id {
                Some(id) => stmt.query_row([id], read_row).optional()?,
                None => stmt.query_row([], read_row).optional()?,
            };
            row.map(RawPerson::into_person).transpose()
        })
    }
}

struct RawPerson {
    id: PersonId,
    name: String,
    surname: String,
    date_of_birth: String,
    bio: String,
    email: String,
    jabber: String,
    skype_id: String,
    other: String,
    image_path: Option<String>,
    image_width: Option<u32>,
    image_height: Option<u32>,
}

impl RawPerson {
    fn into_person(self) -> StoreResult<Person> {
        let date_of_birth = NaiveDate::parse_from_str(&self.date_of_birth, "%Y-%m-%d").map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid date `{}` in person.date_of_birth",
                self.date_of_birth
            ))
        })?;

        Ok(Person {
            id: self.id,
            name: self.name,
            surname: self.surname,
            date_of_birth,
            bio: self.bio,
            email: self.email,
            jabber: self.jabber,
            skype_id: self.skype_id,
            other: self.other,
            image: self.image_path.map(|path| ImageRef {
                path,
                width: self.image_width,
                height: self.image_height,
            }),
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawPerson> {
    Ok(RawPerson {
        id: row.get("id")?,
        name: row.get("name")?,
        surname: row.get("surname")?,
        date_of_birth: row.get("date_of_birth")?,
        bio: row.get("bio")?,
        email: row.get("email")?,
        jabber: row.get("jabber")?,
        skype_id: row.get("skype_id")?,
        other: row.get("other")?,
        image_path: row.get("image_path")?,
        image_width: row.get("image_width")?,
        image_height: row.get("image_height")?,
    })
}

fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
