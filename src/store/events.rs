//! Event storage and registrations.

use crate::store::{map_constraint, StoreError};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_deadline: Option<NaiveDate>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct EventInput {
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_deadline: Option<NaiveDate>,
}

pub struct EventStore {
    db_path: String,
}

impl EventStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                event_id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                registration_deadline TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS event_registrations (
                registration_id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                event_id INTEGER NOT NULL REFERENCES events(event_id),
                registered_at TEXT NOT NULL,
                UNIQUE(account_id, event_id)
            )",
            [],
        )?;

        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
        let start: String = row.get(3)?;
        let end: String = row.get(4)?;
        let deadline: Option<String> = row.get(5)?;

        Ok(Event {
            event_id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            start_date: start.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
            end_date: end.parse().map_err(|_| rusqlite::Error::InvalidQuery)?,
            registration_deadline: deadline.and_then(|d| d.parse().ok()),
            created_at: row.get(6)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "event_id, title, description, start_date, end_date, registration_deadline, created_at";

    pub fn list(&self) -> Result<Vec<Event>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM events ORDER BY start_date",
            Self::SELECT_COLUMNS
        ))?;
        let events = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    pub fn find_by_id(&self, event_id: i64) -> Result<Option<Event>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM events WHERE event_id = ?1",
            Self::SELECT_COLUMNS
        ))?;
        match stmt.query_row(params![event_id], Self::from_row) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, input: &EventInput) -> Result<Event, StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO events
                (title, description, start_date, end_date, registration_deadline, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.title,
                input.description,
                input.start_date.to_string(),
                input.end_date.to_string(),
                input.registration_deadline.map(|d| d.to_string()),
                now,
            ],
        )?;

        let event_id = conn.last_insert_rowid();
        info!("Created event {} ({})", event_id, input.title);

        self.find_by_id(event_id)?
            .ok_or(StoreError::NotFound("Event"))
    }

    pub fn update(&self, event_id: i64, input: &EventInput) -> Result<Event, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE events SET title = ?1, description = ?2, start_date = ?3,
                 end_date = ?4, registration_deadline = ?5
             WHERE event_id = ?6",
            params![
                input.title,
                input.description,
                input.start_date.to_string(),
                input.end_date.to_string(),
                input.registration_deadline.map(|d| d.to_string()),
                event_id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Event"));
        }

        self.find_by_id(event_id)?
            .ok_or(StoreError::NotFound("Event"))
    }

    pub fn delete(&self, event_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "DELETE FROM event_registrations WHERE event_id = ?1",
            params![event_id],
        )?;
        let rows = conn.execute("DELETE FROM events WHERE event_id = ?1", params![event_id])?;

        if rows == 0 {
            return Err(StoreError::NotFound("Event"));
        }
        Ok(())
    }

    pub fn register(&self, event_id: i64, account_id: i64) -> Result<(), StoreError> {
        if self.find_by_id(event_id)?.is_none() {
            return Err(StoreError::NotFound("Event"));
        }

        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO event_registrations (account_id, event_id, registered_at)
             VALUES (?1, ?2, ?3)",
            params![account_id, event_id, now],
        )
        .map_err(map_constraint)?;

        Ok(())
    }

    pub fn unregister(&self, event_id: i64, account_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM event_registrations WHERE event_id = ?1 AND account_id = ?2",
            params![event_id, account_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Registration"));
        }
        Ok(())
    }

    /// Drop every registration held by an account. Part of the account
    /// deletion cascade; missing registrations are not an error here.
    pub fn remove_registrations_for_account(&self, account_id: i64) -> Result<usize, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM event_registrations WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(rows)
    }

    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<Event>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT e.event_id, e.title, e.description, e.start_date, e.end_date,
                    e.registration_deadline, e.created_at
             FROM events e
             JOIN event_registrations r ON r.event_id = e.event_id
             WHERE r.account_id = ?1
             ORDER BY e.start_date",
        )?;
        let events = stmt
            .query_map(params![account_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }
}
