//! Submission storage with a small status workflow.

use crate::store::StoreError;
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[serde(rename = "submitted")]
    Submitted,
    #[serde(rename = "under_review")]
    UnderReview,
    #[serde(rename = "accepted")]
    Accepted,
    #[serde(rename = "rejected")]
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "submitted" => Some(SubmissionStatus::Submitted),
            "under_review" => Some(SubmissionStatus::UnderReview),
            "accepted" => Some(SubmissionStatus::Accepted),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub submission_id: i64,
    pub account_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionInput {
    pub title: String,
    pub description: Option<String>,
    pub file_url: Option<String>,
}

pub struct SubmissionStore {
    db_path: String,
}

impl SubmissionStore {
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
            "CREATE TABLE IF NOT EXISTS submissions (
                submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                title TEXT NOT NULL,
                description TEXT,
                file_url TEXT,
                status TEXT NOT NULL DEFAULT 'submitted',
                submitted_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
        let status: String = row.get(5)?;
        Ok(Submission {
            submission_id: row.get(0)?,
            account_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            file_url: row.get(4)?,
            status: SubmissionStatus::from_str(&status).unwrap_or(SubmissionStatus::Submitted),
            submitted_at: row.get(6)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "submission_id, account_id, title, description, file_url, status, submitted_at";

    pub fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM submissions ORDER BY submission_id DESC",
            Self::SELECT_COLUMNS
        ))?;
        let submissions = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(submissions)
    }

    pub fn list_by_status(&self, status: SubmissionStatus) -> Result<Vec<Submission>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM submissions WHERE status = ?1 ORDER BY submission_id DESC",
            Self::SELECT_COLUMNS
        ))?;
        let submissions = stmt
            .query_map(params![status.as_str()], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(submissions)
    }

    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<Submission>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM submissions WHERE account_id = ?1 ORDER BY submission_id DESC",
            Self::SELECT_COLUMNS
        ))?;
        let submissions = stmt
            .query_map(params![account_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(submissions)
    }

    pub fn find_by_id(&self, submission_id: i64) -> Result<Option<Submission>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM submissions WHERE submission_id = ?1",
            Self::SELECT_COLUMNS
        ))?;
        match stmt.query_row(params![submission_id], Self::from_row) {
            Ok(submission) => Ok(Some(submission)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// New submissions always start in `submitted`.
    pub fn create(
        &self,
        account_id: i64,
        input: &SubmissionInput,
    ) -> Result<Submission, StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO submissions (account_id, title, description, file_url, status, submitted_at)
             VALUES (?1, ?2, ?3, ?4, 'submitted', ?5)",
            params![account_id, input.title, input.description, input.file_url, now],
        )?;

        let submission_id = conn.last_insert_rowid();
        info!(
            "Created submission {} for account {}",
            submission_id, account_id
        );

        self.find_by_id(submission_id)?
            .ok_or(StoreError::NotFound("Submission"))
    }

    pub fn update(
        &self,
        submission_id: i64,
        input: &SubmissionInput,
    ) -> Result<Submission, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE submissions SET title = ?1, description = ?2, file_url = ?3
             WHERE submission_id = ?4",
            params![input.title, input.description, input.file_url, submission_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Submission"));
        }

        self.find_by_id(submission_id)?
            .ok_or(StoreError::NotFound("Submission"))
    }

    pub fn update_status(
        &self,
        submission_id: i64,
        status: SubmissionStatus,
    ) -> Result<Submission, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE submissions SET status = ?1 WHERE submission_id = ?2",
            params![status.as_str(), submission_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Submission"));
        }

        self.find_by_id(submission_id)?
            .ok_or(StoreError::NotFound("Submission"))
    }

    /// Drop every submission owned by an account. Part of the account
    /// deletion cascade; owning no submissions is not an error here.
    pub fn delete_for_account(&self, account_id: i64) -> Result<usize, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM submissions WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(rows)
    }

    pub fn delete(&self, submission_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM submissions WHERE submission_id = ?1",
            params![submission_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Submission"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (SubmissionStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        crate::store::test_support::seed_stub_accounts(path);
        let store = SubmissionStore::new(path).unwrap();
        (store, temp_file)
    }

    fn input(title: &str) -> SubmissionInput {
        SubmissionInput {
            title: title.to_string(),
            description: Some("abstract".to_string()),
            file_url: None,
        }
    }

    #[test]
    fn test_new_submission_starts_submitted() {
        let (store, _temp) = create_test_store();
        let submission = store.create(7, &input("Paper")).unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);
        assert_eq!(submission.account_id, 7);
    }

    #[test]
    fn test_status_workflow() {
        let (store, _temp) = create_test_store();
        let submission = store.create(7, &input("Paper")).unwrap();

        let reviewed = store
            .update_status(submission.submission_id, SubmissionStatus::UnderReview)
            .unwrap();
        assert_eq!(reviewed.status, SubmissionStatus::UnderReview);

        let by_status = store.list_by_status(SubmissionStatus::UnderReview).unwrap();
        assert_eq!(by_status.len(), 1);
        assert!(store
            .list_by_status(SubmissionStatus::Accepted)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_list_for_account_and_delete() {
        let (store, _temp) = create_test_store();
        store.create(7, &input("Paper A")).unwrap();
        let b = store.create(8, &input("Paper B")).unwrap();

        assert_eq!(store.list_for_account(7).unwrap().len(), 1);
        assert_eq!(store.list().unwrap().len(), 2);

        store.delete(b.submission_id).unwrap();
        assert!(store.find_by_id(b.submission_id).unwrap().is_none());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            SubmissionStatus::Submitted,
            SubmissionStatus::UnderReview,
            SubmissionStatus::Accepted,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(SubmissionStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(SubmissionStatus::from_str("shredded"), None);
    }
}
