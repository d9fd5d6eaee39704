//! SQLite-backed storage.
//!
//! One store per aggregate, all sharing the same database file. Each store
//! opens a connection per call and creates its own schema on construction.
//! Uniqueness (email, member id, memberships) is enforced with UNIQUE
//! indexes at this layer so concurrent inserts cannot both succeed.

pub mod accounts;
pub mod communities;
pub mod events;
pub mod journals;
pub mod submissions;
pub mod transactions;

pub use accounts::AccountStore;
pub use communities::CommunityStore;
pub use events::EventStore;
pub use journals::JournalStore;
pub use submissions::SubmissionStore;
pub use transactions::TransactionStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("member id already registered")]
    DuplicateMemberId,
    #[error("already a member of this community")]
    AlreadyJoined,
    #[error("already registered for this event")]
    AlreadyRegistered,
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::AccountStore;
    use rusqlite::{params, Connection};

    /// The bundled SQLite enforces foreign keys, and every per-store table
    /// references `accounts(account_id)`. Create the accounts schema on the
    /// test database and insert the stub accounts (ids 7 and 8) that the
    /// per-store unit tests reference.
    pub(crate) fn seed_stub_accounts(db_path: &str) {
        AccountStore::new(db_path).unwrap();
        let conn = Connection::open(db_path).unwrap();
        for id in [7i64, 8] {
            conn.execute(
                "INSERT INTO accounts
                    (account_id, name, email, password_hash, role_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 'not-a-real-hash',
                         (SELECT role_id FROM roles WHERE name = 'USER'),
                         '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
                params![id, format!("Stub {id}"), format!("stub{id}@test.local")],
            )
            .unwrap();
        }
    }
}

/// Translate a UNIQUE-constraint failure on a known column into its typed
/// duplicate variant; everything else passes through as a database error.
pub(crate) fn map_constraint(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, Some(ref msg)) = err {
        if e.code == rusqlite::ErrorCode::ConstraintViolation {
            if msg.contains("accounts.email") {
                return StoreError::DuplicateEmail;
            }
            if msg.contains("accounts.member_id") {
                return StoreError::DuplicateMemberId;
            }
            if msg.contains("community_members") {
                return StoreError::AlreadyJoined;
            }
            if msg.contains("event_registrations") {
                return StoreError::AlreadyRegistered;
            }
        }
    }
    StoreError::Db(err)
}
