//! Account and role storage.
//!
//! Owns the `roles` and `accounts` tables. Passwords are stored only as
//! bcrypt hashes; the plaintext never leaves `create_account` /
//! `verify_credentials` and is never logged.

use crate::auth::models::{Account, Gender, Role, RoleName, UpdateProfileRequest};
use crate::store::{map_constraint, StoreError};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{info, warn};

// bcrypt hash of an arbitrary string, verified against on the unknown-email
// branch so that path costs the same as a real password check.
const DUMMY_HASH: &str = "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Fields for a new account. The password arrives in plaintext and is
/// hashed before it touches the database.
#[derive(Debug)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub member_id: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub role: RoleName,
}

pub struct AccountStore {
    db_path: String,
}

impl AccountStore {
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
            "CREATE TABLE IF NOT EXISTS roles (
                role_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                description TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                account_id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                member_id TEXT UNIQUE,
                phone TEXT,
                birth_date TEXT,
                gender TEXT,
                province TEXT,
                city TEXT,
                role_id INTEGER NOT NULL REFERENCES roles(role_id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.seed_roles(&conn)?;
        self.seed_default_admin(&conn)?;

        Ok(())
    }

    /// Roles are seeded once at first boot and treated as immutable.
    fn seed_roles(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))
            .context("Failed to count roles")?;

        if count == 0 {
            conn.execute(
                "INSERT INTO roles (name, description) VALUES
                    ('ADMIN', 'Administrator role with full access'),
                    ('USER', 'Regular user role')",
                [],
            )
            .context("Failed to seed roles")?;
            info!("Default roles created (ADMIN, USER)");
        }

        Ok(())
    }

    /// Create a default administrator account if none exists so the service
    /// is never locked out on a fresh database.
    fn seed_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM accounts a
                 JOIN roles r ON r.role_id = a.role_id
                 WHERE r.name = 'ADMIN'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin accounts")?;

        if count == 0 {
            let email = std::env::var("SEED_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@communitas.local".to_string());
            let password =
                std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

            let password_hash = hash(&password, DEFAULT_COST).context("Failed to hash password")?;
            let now = Utc::now().to_rfc3339();

            conn.execute(
                "INSERT INTO accounts (name, email, password_hash, role_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, (SELECT role_id FROM roles WHERE name = 'ADMIN'), ?4, ?4)",
                params!["Administrator", email, password_hash, now],
            )
            .context("Failed to insert admin account")?;

            info!("Default admin account created ({})", email);
            warn!("Change the default admin password before production use");
        }

        Ok(())
    }

    fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
        let role_str: String = row.get(10)?;
        let birth_date: Option<String> = row.get(5)?;
        let gender: Option<String> = row.get(6)?;

        Ok(Account {
            account_id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            member_id: row.get(4)?,
            birth_date: birth_date.and_then(|d| d.parse().ok()),
            gender: gender.as_deref().and_then(Gender::from_str),
            phone: row.get(7)?,
            province: row.get(8)?,
            city: row.get(9)?,
            role: RoleName::from_str(&role_str).unwrap_or(RoleName::User),
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "a.account_id, a.name, a.email, a.password_hash, a.member_id, a.birth_date,
         a.gender, a.phone, a.province, a.city, r.name, a.created_at, a.updated_at";

    pub fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts a JOIN roles r ON r.role_id = a.role_id
             WHERE a.email = ?1",
            Self::SELECT_COLUMNS
        ))?;

        match stmt.query_row(params![email], Self::account_from_row) {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_by_id(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts a JOIN roles r ON r.role_id = a.role_id
             WHERE a.account_id = ?1",
            Self::SELECT_COLUMNS
        ))?;

        match stmt.query_row(params![account_id], Self::account_from_row) {
            Ok(account) => Ok(Some(account)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn exists_by_member_id(&self, member_id: &str) -> Result<bool, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE member_id = ?1",
            params![member_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt =
            conn.prepare("SELECT role_id, name, description FROM roles WHERE name = ?1")?;

        match stmt.query_row(params![name.as_str()], |row| {
            let name_str: String = row.get(1)?;
            Ok(Role {
                role_id: row.get(0)?,
                name: RoleName::from_str(&name_str).unwrap_or(RoleName::User),
                description: row.get(2)?,
            })
        }) {
            Ok(role) => Ok(Some(role)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a new account. Duplicate email / member id surfaces as the
    /// typed variant via the UNIQUE indexes, so two concurrent registrations
    /// of the same email can never both succeed.
    pub fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let password_hash = hash(&new.password, DEFAULT_COST)?;
        let now = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO accounts
                (name, email, password_hash, member_id, phone, birth_date, gender,
                 province, city, role_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                     (SELECT role_id FROM roles WHERE name = ?10), ?11, ?11)",
            params![
                new.name,
                new.email,
                password_hash,
                new.member_id,
                new.phone,
                new.birth_date.map(|d| d.to_string()),
                new.gender.map(|g| g.as_str()),
                new.province,
                new.city,
                new.role.as_str(),
                now,
            ],
        )
        .map_err(map_constraint)?;

        let account_id = conn.last_insert_rowid();
        info!("Created account {} ({})", account_id, new.role.as_str());

        self.find_by_id(account_id)?
            .ok_or(StoreError::NotFound("Account"))
    }

    /// Verify an (email, password) pair. Returns the account on success and
    /// `None` for both unknown email and wrong password; the caller maps
    /// both to the same uniform error. The unknown-email branch still pays
    /// the bcrypt cost so response timing does not reveal whether the email
    /// is registered.
    pub fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, StoreError> {
        match self.find_by_email(email)? {
            Some(account) => {
                if verify(password, &account.password_hash)? {
                    Ok(Some(account))
                } else {
                    Ok(None)
                }
            }
            None => {
                let _ = verify(password, DUMMY_HASH);
                Ok(None)
            }
        }
    }

    pub fn list(&self) -> Result<Vec<Account>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts a JOIN roles r ON r.role_id = a.role_id
             ORDER BY a.account_id",
            Self::SELECT_COLUMNS
        ))?;

        let accounts = stmt
            .query_map([], Self::account_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Apply a partial profile update; absent fields keep their value.
    pub fn update_profile(
        &self,
        account_id: i64,
        update: &UpdateProfileRequest,
    ) -> Result<Account, StoreError> {
        let current = self
            .find_by_id(account_id)?
            .ok_or(StoreError::NotFound("Account"))?;

        let name = update.name.clone().unwrap_or(current.name);
        let phone = update.phone.clone().or(current.phone);
        let birth_date = update.birth_date.or(current.birth_date);
        let gender = update.gender.or(current.gender);
        let province = update.province.clone().or(current.province);
        let city = update.city.clone().or(current.city);
        let now = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE accounts SET name = ?1, phone = ?2, birth_date = ?3, gender = ?4,
                 province = ?5, city = ?6, updated_at = ?7
             WHERE account_id = ?8",
            params![
                name,
                phone,
                birth_date.map(|d| d.to_string()),
                gender.map(|g| g.as_str()),
                province,
                city,
                now,
                account_id,
            ],
        )?;

        self.find_by_id(account_id)?
            .ok_or(StoreError::NotFound("Account"))
    }

    pub fn delete(&self, account_id: i64) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "DELETE FROM accounts WHERE account_id = ?1",
            params![account_id],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound("Account"));
        }

        info!("Deleted account {}", account_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (AccountStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = AccountStore::new(db_path).unwrap();
        (store, temp_file)
    }

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Ana".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            member_id: None,
            phone: None,
            birth_date: None,
            gender: None,
            province: None,
            city: None,
            role: RoleName::User,
        }
    }

    #[test]
    fn test_roles_and_default_admin_seeded() {
        let (store, _temp) = create_test_store();

        let admin_role = store.find_role_by_name(RoleName::Admin).unwrap().unwrap();
        assert_eq!(admin_role.name, RoleName::Admin);
        assert!(store.find_role_by_name(RoleName::User).unwrap().is_some());

        let accounts = store.list().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, RoleName::Admin);
    }

    #[test]
    fn test_create_and_find_account() {
        let (store, _temp) = create_test_store();

        let created = store.create_account(new_account("ana@x.com")).unwrap();
        assert_eq!(created.email, "ana@x.com");
        assert_eq!(created.role, RoleName::User);
        assert_ne!(created.password_hash, "secret1"); // stored hashed

        let found = store.find_by_email("ana@x.com").unwrap().unwrap();
        assert_eq!(found.account_id, created.account_id);

        assert!(store.exists_by_email("ana@x.com").unwrap());
        assert!(!store.exists_by_email("nobody@x.com").unwrap());
    }

    #[test]
    fn test_duplicate_email_rejected_by_unique_index() {
        let (store, _temp) = create_test_store();

        store.create_account(new_account("ana@x.com")).unwrap();
        let result = store.create_account(new_account("ana@x.com"));
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
    }

    #[test]
    fn test_duplicate_member_id_rejected() {
        let (store, _temp) = create_test_store();

        let mut first = new_account("a@x.com");
        first.member_id = Some("M001".to_string());
        store.create_account(first).unwrap();

        let mut second = new_account("b@x.com");
        second.member_id = Some("M001".to_string());
        let result = store.create_account(second);
        assert!(matches!(result, Err(StoreError::DuplicateMemberId)));

        assert!(store.exists_by_member_id("M001").unwrap());
    }

    #[test]
    fn test_verify_credentials_uniform_outcomes() {
        let (store, _temp) = create_test_store();
        store.create_account(new_account("ana@x.com")).unwrap();

        // Correct pair
        let account = store.verify_credentials("ana@x.com", "secret1").unwrap();
        assert!(account.is_some());

        // Wrong password and unknown email both come back as None
        assert!(store
            .verify_credentials("ana@x.com", "wrong")
            .unwrap()
            .is_none());
        assert!(store
            .verify_credentials("nobody@x.com", "secret1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_profile_keeps_absent_fields() {
        let (store, _temp) = create_test_store();
        let created = store.create_account(new_account("ana@x.com")).unwrap();

        let update = UpdateProfileRequest {
            name: Some("Ana Maria".to_string()),
            phone: Some("0812000".to_string()),
            birth_date: None,
            gender: None,
            province: None,
            city: None,
        };
        let updated = store.update_profile(created.account_id, &update).unwrap();

        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.phone.as_deref(), Some("0812000"));
        assert_eq!(updated.email, "ana@x.com");
    }

    #[test]
    fn test_delete_account() {
        let (store, _temp) = create_test_store();
        let created = store.create_account(new_account("ana@x.com")).unwrap();

        store.delete(created.account_id).unwrap();
        assert!(store.find_by_id(created.account_id).unwrap().is_none());

        let result = store.delete(created.account_id);
        assert!(matches!(result, Err(StoreError::NotFound("Account"))));
    }
}
