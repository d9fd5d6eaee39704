//! Community storage and membership.

use crate::store::{map_constraint, StoreError};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct Community {
    pub community_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CommunityInput {
    pub name: String,
    pub description: Option<String>,
}

pub struct CommunityStore {
    db_path: String,
}

impl CommunityStore {
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
            "CREATE TABLE IF NOT EXISTS communities (
                community_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // One membership row per (account, community) pair.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS community_members (
                membership_id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(account_id),
                community_id INTEGER NOT NULL REFERENCES communities(community_id),
                joined_at TEXT NOT NULL,
                UNIQUE(account_id, community_id)
            )",
            [],
        )?;

        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Community> {
        Ok(Community {
            community_id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    pub fn list(&self) -> Result<Vec<Community>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT community_id, name, description, created_at
             FROM communities ORDER BY community_id",
        )?;
        let communities = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(communities)
    }

    pub fn find_by_id(&self, community_id: i64) -> Result<Option<Community>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT community_id, name, description, created_at
             FROM communities WHERE community_id = ?1",
        )?;
        match stmt.query_row(params![community_id], Self::from_row) {
            Ok(community) => Ok(Some(community)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create(&self, input: &CommunityInput) -> Result<Community, StoreError> {
        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO communities (name, description, created_at) VALUES (?1, ?2, ?3)",
            params![input.name, input.description, now],
        )?;

        let community_id = conn.last_insert_rowid();
        info!("Created community {} ({})", community_id, input.name);

        self.find_by_id(community_id)?
            .ok_or(StoreError::NotFound("Community"))
    }

    pub fn update(&self, community_id: i64, input: &CommunityInput) -> Result<Community, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE communities SET name = ?1, description = ?2 WHERE community_id = ?3",
            params![input.name, input.description, community_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Community"));
        }

        self.find_by_id(community_id)?
            .ok_or(StoreError::NotFound("Community"))
    }

    pub fn delete(&self, community_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "DELETE FROM community_members WHERE community_id = ?1",
            params![community_id],
        )?;
        let rows = conn.execute(
            "DELETE FROM communities WHERE community_id = ?1",
            params![community_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Community"));
        }
        Ok(())
    }

    pub fn join(&self, community_id: i64, account_id: i64) -> Result<(), StoreError> {
        if self.find_by_id(community_id)?.is_none() {
            return Err(StoreError::NotFound("Community"));
        }

        let now = Utc::now().to_rfc3339();
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO community_members (account_id, community_id, joined_at)
             VALUES (?1, ?2, ?3)",
            params![account_id, community_id, now],
        )
        .map_err(map_constraint)?;

        Ok(())
    }

    pub fn leave(&self, community_id: i64, account_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM community_members WHERE community_id = ?1 AND account_id = ?2",
            params![community_id, account_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Membership"));
        }
        Ok(())
    }

    /// Drop every membership held by an account. Part of the account
    /// deletion cascade; missing memberships are not an error here.
    pub fn remove_memberships_for_account(&self, account_id: i64) -> Result<usize, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM community_members WHERE account_id = ?1",
            params![account_id],
        )?;
        Ok(rows)
    }

    pub fn list_for_account(&self, account_id: i64) -> Result<Vec<Community>, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT c.community_id, c.name, c.description, c.created_at
             FROM communities c
             JOIN community_members m ON m.community_id = c.community_id
             WHERE m.account_id = ?1
             ORDER BY c.community_id",
        )?;
        let communities = stmt
            .query_map(params![account_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(communities)
    }
}
