use crate::error::StoreError;
use crate::model::Note;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use rand::{Rng, distributions::Alphanumeric};
use sha2::{Digest, Sha256};
use std::path::Path;

const ID_LEN: usize = 12;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_notes.sql", include_str!("migrations/001_notes.sql"))];

/// Persistence contract for notes. Notes are write-once: there is no update,
/// delete or listing, so an id is the only way back to a note.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persists the note and returns its freshly assigned id.
    async fn save(&self, note: &Note) -> Result<String, StoreError>;

    async fn load(&self, id: &str) -> Result<Note, StoreError>;
}

pub struct Database {
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub async fn open(path: &Path) -> Result<Self> {
        tracing::info!(path = ?path, "[db] opening local database");
        let db = Builder::new_local(path).build().await?;
        Self::setup(db).await
    }

    pub async fn in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::setup(db).await
    }

    async fn setup(db: LibsqlDatabase) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { _db: db, conn })
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for Database {
    async fn save(&self, note: &Note) -> Result<String, StoreError> {
        let id = generate_id();
        let password = note.password.as_deref().map(hash_password);
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let query = "INSERT INTO notes (id, text, password, created_at) VALUES (?, ?, ?, ?)";
        self.conn
            .execute(
                query,
                libsql::params![id.as_str(), note.text.as_str(), password, created_at.as_str()],
            )
            .await?;

        Ok(id)
    }

    async fn load(&self, id: &str) -> Result<Note, StoreError> {
        let query = "SELECT id, text, password, created_at FROM notes WHERE id = ?";
        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        let Some(row) = rows.next().await? else {
            return Err(StoreError::NotFound(id.to_owned()));
        };

        let created_at: String = row.get(3)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StoreError::Corrupt {
                id: id.to_owned(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Note {
            id: row.get(0)?,
            text: row.get(1)?,
            password: row.get::<Option<String>>(2)?,
            created_at: Some(created_at),
            ..Default::default()
        })
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
