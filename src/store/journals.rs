//! Journal storage. Journals belong to an account and are private unless
//! marked public.

use crate::store::StoreError;
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Journal {
    pub journal_id: i64,
    pub account_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_public: bool,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct JournalInput {
    pub title: String,
    pub content: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

pub struct JournalStore {
    db_path: String,
}

impl JournalStore {
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
            "CREATE TABLE IF NOT EXISTS journals (
                journal_id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                title TEXT NOT NULL,
                content TEXT,
                thumbnail_url TEXT,
                is_public INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Journal> {
        Ok(Journal {
            journal_id: row.get(0)?,
            account_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            thumbnail_url: row.get(4)?,
            is_public: row.get::<_, i64>(5)? != 0,
            created_at: row.get(6)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "journal_id, account_id, title, content, thumbnail_url, is_public, created_at";

    pub fn list(&self) -> Result<Vec<Journal>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM journals ORDER BY journal_id DESC",
            Self::SELECT_COLUMNS
        ))?;
        let journals = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(journals)
    }

    pub fn list_public(&self) -> Result<Vec<Journal>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM journals WHERE is_public = 1 ORDER BY journal_id DESC",
            Self::SELECT_COLUMNS
        ))?;
        let journals = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(journals)
    }

    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<Journal>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM journals WHERE account_id = ?1 ORDER BY journal_id DESC",
            Self::SELECT_COLUMNS
        ))?;
        let journals = stmt
            .query_map(params![account_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(journals)
    }

    pub fn find_by_id(&self, journal_id: i64) -> Result<Option<Journal>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM journals WHERE journal_id = ?1",
            Self::SELECT_COLUMNS
        ))?;
        match stmt.query_row(params![journal_id], Self::from_row) {
            Ok(journal) => Ok(Some(journal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, account_id: i64, input: &JournalInput) -> Result<Journal, StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO journals (account_id, title, content, thumbnail_url, is_public, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account_id,
                input.title,
                input.content,
                input.thumbnail_url,
                input.is_public as i64,
                now,
            ],
        )?;

        let journal_id = conn.last_insert_rowid();
        info!("Created journal {} for account {}", journal_id, account_id);

        self.find_by_id(journal_id)?
            .ok_or(StoreError::NotFound("Journal"))
    }

    pub fn update(&self, journal_id: i64, input: &JournalInput) -> Result<Journal, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE journals SET title = ?1, content = ?2, thumbnail_url = ?3, is_public = ?4
             WHERE journal_id = ?5",
            params![
                input.title,
                input.content,
                input.thumbnail_url,
                input.is_public as i64,
                journal_id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Journal"));
        }

        self.find_by_id(journal_id)?
            .ok_or(StoreError::NotFound("Journal"))
    }

    /// Drop every journal owned by an account. Part of the account deletion
    /// cascade; owning no journals is not an error here.
    pub fn delete_for_account(&self, account_id: i64) -> Result<usize, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM journals WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(rows)
    }

    pub fn delete(&self, journal_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM journals WHERE journal_id = ?1",
            params![journal_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Journal"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (JournalStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        crate::store::test_support::seed_stub_accounts(path);
        let store = JournalStore::new(path).unwrap();
        (store, temp_file)
    }

    fn input(title: &str, is_public: bool) -> JournalInput {
        JournalInput {
            title: title.to_string(),
            content: Some("entry body".to_string()),
            thumbnail_url: None,
            is_public,
        }
    }

    #[test]
    fn test_create_and_ownership() {
        let (store, _temp) = create_test_store();

        let journal = store.create(7, &input("My week", false)).unwrap();
        assert_eq!(journal.account_id, 7);
        assert!(!journal.is_public);

        assert_eq!(store.list_for_account(7).unwrap().len(), 1);
        assert!(store.list_for_account(8).unwrap().is_empty());
    }

    #[test]
    fn test_public_listing_excludes_private() {
        let (store, _temp) = create_test_store();

        store.create(7, &input("private", false)).unwrap();
        store.create(7, &input("public", true)).unwrap();

        let public = store.list_public().unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "public");

        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_update_and_delete() {
        let (store, _temp) = create_test_store();
        let journal = store.create(7, &input("draft", false)).unwrap();

        let updated = store.update(journal.journal_id, &input("final", true)).unwrap();
        assert_eq!(updated.title, "final");
        assert!(updated.is_public);

        store.delete(journal.journal_id).unwrap();
        let result = store.delete(journal.journal_id);
        assert!(matches!(result, Err(StoreError::NotFound("Journal"))));
    }
}
