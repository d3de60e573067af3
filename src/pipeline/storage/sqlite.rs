use crate::app::ports::{ContactStore, ContactStoreOpener};
use crate::error::{EtlError, Result};
use crate::types::{ContactDetails, NaturalKey, RunId, StoredContact};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &str = r#"
    PRAGMA journal_mode=WAL;
    CREATE TABLE IF NOT EXISTS business_contacts (
        company           TEXT NOT NULL,
        email             TEXT NOT NULL,
        given_name        TEXT NOT NULL,
        family_name       TEXT NOT NULL,
        title             TEXT NOT NULL,
        first_contact_at  TEXT NOT NULL,
        inserted_at       TEXT NOT NULL,
        run_id            TEXT NOT NULL,
        PRIMARY KEY (company, email)
    );
    CREATE INDEX IF NOT EXISTS idx_business_contacts_run ON business_contacts (run_id);
"#;

/// SQLite-backed contact store. The connection closes when the store is dropped.
pub struct SqliteContactStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteContactStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA)?;
        debug!("Opened contact store at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path.to_path_buf(),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EtlError::StoreUnavailable("SQLite connection lock poisoned".into()))
    }

    pub fn find(&self, key: &NaturalKey) -> Result<Option<StoredContact>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT company, email, given_name, family_name, title, first_contact_at, inserted_at, run_id
             FROM business_contacts WHERE company = ?1 AND email = ?2",
        )?;
        let row = stmt
            .query_row(params![key.company, key.email], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })
            .optional()?;

        let Some((company, email, given_name, family_name, title, first_contact_at, inserted_at, run_id)) =
            row
        else {
            return Ok(None);
        };

        Ok(Some(StoredContact {
            company,
            contact: ContactDetails {
                given_name,
                family_name,
                title,
                email,
            },
            first_contact_at: parse_stored_time(&first_contact_at)?,
            inserted_at: parse_stored_time(&inserted_at)?,
            run_id: Uuid::parse_str(&run_id)
                .map(RunId::from)
                .map_err(|e| EtlError::StoreUnavailable(format!("Corrupt run_id '{run_id}': {e}")))?,
        }))
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM business_contacts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn count_for_run(&self, run_id: RunId) -> Result<usize> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM business_contacts WHERE run_id = ?1",
            params![run_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}

impl Drop for SqliteContactStore {
    fn drop(&mut self) {
        debug!("Released contact store at {}", self.path.display());
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn contains(&self, key: &NaturalKey) -> Result<bool> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT 1 FROM business_contacts WHERE company = ?1 AND email = ?2")?;
        Ok(stmt.exists(params![key.company, key.email])?)
    }

    async fn insert_if_absent(&self, contact: &StoredContact) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "INSERT INTO business_contacts
                (company, email, given_name, family_name, title, first_contact_at, inserted_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(company, email) DO NOTHING",
            params![
                contact.company,
                contact.contact.email,
                contact.contact.given_name,
                contact.contact.family_name,
                contact.contact.title,
                contact.first_contact_at.to_rfc3339(),
                contact.inserted_at.to_rfc3339(),
                contact.run_id.to_string(),
            ],
        )?;
        Ok(changed == 1)
    }
}

fn parse_stored_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EtlError::StoreUnavailable(format!("Corrupt timestamp '{value}': {e}")))
}

/// Opens a fresh SQLite connection per run
#[derive(Debug, Clone)]
pub struct SqliteStoreOpener {
    db_path: PathBuf,
}

impl SqliteStoreOpener {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

#[async_trait]
impl ContactStoreOpener for SqliteStoreOpener {
    async fn open(&self) -> Result<Box<dyn ContactStore>> {
        let store = SqliteContactStore::open(&self.db_path).map_err(|e| {
            EtlError::StoreUnavailable(format!(
                "Failed to open contact store at {}: {}",
                self.db_path.display(),
                e
            ))
        })?;
        Ok(Box::new(store))
    }
}
