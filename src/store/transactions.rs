//! Transaction storage. Each transaction belongs to an account and records
//! a type (payment, donation, fee, ...), an amount, and a status.

use crate::store::StoreError;
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub transaction_id: i64,
    pub account_id: i64,
    pub transaction_type: String,
    pub amount: f64,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub transaction_date: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionInput {
    pub transaction_type: String,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TransactionStatus,
}

pub struct TransactionStore {
    db_path: String,
}

impl TransactionStore {
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
            "CREATE TABLE IF NOT EXISTS transactions (
                transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                transaction_type TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                transaction_date TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
        let status: String = row.get(5)?;
        Ok(Transaction {
            transaction_id: row.get(0)?,
            account_id: row.get(1)?,
            transaction_type: row.get(2)?,
            amount: row.get(3)?,
            description: row.get(4)?,
            status: TransactionStatus::from_str(&status).unwrap_or(TransactionStatus::Pending),
            transaction_date: row.get(6)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "transaction_id, account_id, transaction_type, amount, description, status, transaction_date";

    pub fn list(&self) -> Result<Vec<Transaction>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY transaction_date DESC",
            Self::SELECT_COLUMNS
        ))?;
        let transactions = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE account_id = ?1 ORDER BY transaction_date DESC",
            Self::SELECT_COLUMNS
        ))?;
        let transactions = stmt
            .query_map(params![account_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    pub fn find_by_id(&self, transaction_id: i64) -> Result<Option<Transaction>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions WHERE transaction_id = ?1",
            Self::SELECT_COLUMNS
        ))?;
        match stmt.query_row(params![transaction_id], Self::from_row) {
            Ok(transaction) => Ok(Some(transaction)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The transaction date is set at creation and never changed by updates.
    pub fn create(
        &self,
        account_id: i64,
        input: &TransactionInput,
    ) -> Result<Transaction, StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO transactions
                (account_id, transaction_type, amount, description, status, transaction_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account_id,
                input.transaction_type,
                input.amount,
                input.description,
                input.status.as_str(),
                now,
            ],
        )?;

        let transaction_id = conn.last_insert_rowid();
        info!(
            "Created transaction {} for account {}",
            transaction_id, account_id
        );

        self.find_by_id(transaction_id)?
            .ok_or(StoreError::NotFound("Transaction"))
    }

    pub fn update(
        &self,
        transaction_id: i64,
        input: &TransactionInput,
    ) -> Result<Transaction, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE transactions SET transaction_type = ?1, amount = ?2, description = ?3,
                 status = ?4
             WHERE transaction_id = ?5",
            params![
                input.transaction_type,
                input.amount,
                input.description,
                input.status.as_str(),
                transaction_id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Transaction"));
        }

        self.find_by_id(transaction_id)?
            .ok_or(StoreError::NotFound("Transaction"))
    }

    pub fn delete(&self, transaction_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM transactions WHERE transaction_id = ?1",
            params![transaction_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Transaction"));
        }
        Ok(())
    }

    /// Drop every transaction owned by an account. Part of the account
    /// deletion cascade; owning no transactions is not an error here.
    pub fn delete_for_account(&self, account_id: i64) -> Result<usize, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM transactions WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (TransactionStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        crate::store::test_support::seed_stub_accounts(path);
        let store = TransactionStore::new(path).unwrap();
        (store, temp_file)
    }

    fn input(transaction_type: &str, amount: f64) -> TransactionInput {
        TransactionInput {
            transaction_type: transaction_type.to_string(),
            amount,
            description: Some("membership dues".to_string()),
            status: TransactionStatus::Pending,
        }
    }

    #[test]
    fn test_create_defaults_and_ownership() {
        let (store, _temp) = create_test_store();

        let transaction = store.create(7, &input("payment", 150_000.0)).unwrap();
        assert_eq!(transaction.account_id, 7);
        assert_eq!(transaction.transaction_type, "payment");
        assert_eq!(transaction.status, TransactionStatus::Pending);
        assert!(!transaction.transaction_date.is_empty());

        assert_eq!(store.list_for_account(7).unwrap().len(), 1);
        assert!(store.list_for_account(8).unwrap().is_empty());
    }

    #[test]
    fn test_update_changes_status_but_not_date() {
        let (store, _temp) = create_test_store();
        let created = store.create(7, &input("donation", 50.0)).unwrap();

        let mut changed = input("donation", 50.0);
        changed.status = TransactionStatus::Completed;
        let updated = store.update(created.transaction_id, &changed).unwrap();

        assert_eq!(updated.status, TransactionStatus::Completed);
        assert_eq!(updated.transaction_date, created.transaction_date);
    }

    #[test]
    fn test_missing_transaction_is_not_found() {
        let (store, _temp) = create_test_store();

        let result = store.update(99, &input("fee", 10.0));
        assert!(matches!(result, Err(StoreError::NotFound("Transaction"))));

        let result = store.delete(99);
        assert!(matches!(result, Err(StoreError::NotFound("Transaction"))));
    }

    #[test]
    fn test_delete_for_account_removes_all() {
        let (store, _temp) = create_test_store();
        store.create(7, &input("payment", 10.0)).unwrap();
        store.create(7, &input("fee", 5.0)).unwrap();
        store.create(8, &input("donation", 1.0)).unwrap();

        assert_eq!(store.delete_for_account(7).unwrap(), 2);
        assert!(store.list_for_account(7).unwrap().is_empty());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Completed,
            TransactionStatus::Failed,
        ] {
            assert_eq!(TransactionStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TransactionStatus::from_str("reversed"), None);
    }
}
