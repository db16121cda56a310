use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration io error for {path}: {message}")]
    Io { path: String, message: String },
    #[error("migration {name} failed: {message}")]
    Sql { name: String, message: String },
    #[error("migration ledger error: {0}")]
    Ledger(String),
}

pub trait MigrationRunner: Send + Sync {
    /// Applies pending migrations from the directory, returning how many ran.
    fn run(&self, path: &Path) -> Result<usize, MigrationError>;
}

/// Applies the directory's `.sql` files in lexical filename order and
/// records each applied name so a re-run applies nothing.
pub struct SqliteMigrationRunner {
    conn: Mutex<Connection>,
}

impl SqliteMigrationRunner {
    pub fn open(path: &str) -> Result<Self, MigrationError> {
        let conn = Connection::open(path).map_err(|err| MigrationError::Io {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, MigrationError> {
        let conn = Connection::open_in_memory()
            .map_err(|err| MigrationError::Ledger(err.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn applied(&self) -> Result<Vec<String>, MigrationError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT name FROM chassis_migrations ORDER BY name")
            .map_err(|err| MigrationError::Ledger(err.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|err| MigrationError::Ledger(err.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| MigrationError::Ledger(err.to_string()))?;
        Ok(names)
    }

    fn ensure_ledger(conn: &Connection) -> Result<(), MigrationError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chassis_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .map_err(|err| MigrationError::Ledger(err.to_string()))
    }

    fn is_applied(conn: &Connection, name: &str) -> Result<bool, MigrationError> {
        let mut stmt = conn
            .prepare("SELECT 1 FROM chassis_migrations WHERE name = ?1")
            .map_err(|err| MigrationError::Ledger(err.to_string()))?;
        let mut rows = stmt
            .query(params![name])
            .map_err(|err| MigrationError::Ledger(err.to_string()))?;
        Ok(rows
            .next()
            .map_err(|err| MigrationError::Ledger(err.to_string()))?
            .is_some())
    }
}

impl MigrationRunner for SqliteMigrationRunner {
    fn run(&self, path: &Path) -> Result<usize, MigrationError> {
        let mut files = Vec::new();
        let entries = std::fs::read_dir(path).map_err(|err| MigrationError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        for entry in entries {
            let entry = entry.map_err(|err| MigrationError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            let file_path = entry.path();
            if file_path.extension().and_then(|ext| ext.to_str()) == Some("sql") {
                files.push(file_path);
            }
        }
        files.sort();

        let conn = self.conn.lock();
        Self::ensure_ledger(&conn)?;

        let mut applied = 0;
        for file_path in files {
            let name = file_path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            if Self::is_applied(&conn, &name)? {
                continue;
            }
            let sql = std::fs::read_to_string(&file_path).map_err(|err| MigrationError::Io {
                path: file_path.display().to_string(),
                message: err.to_string(),
            })?;
            conn.execute_batch(&sql).map_err(|err| MigrationError::Sql {
                name: name.clone(),
                message: err.to_string(),
            })?;
            conn.execute(
                "INSERT INTO chassis_migrations (name) VALUES (?1)",
                params![name],
            )
            .map_err(|err| MigrationError::Ledger(err.to_string()))?;
            debug!(migration = %name, "applied migration");
            applied += 1;
        }
        Ok(applied)
    }
}
