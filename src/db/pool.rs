use r2d2::{CustomizeConnection, Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fmt, fs};

use tracing::debug;

use crate::db::schema::init_schema;
use crate::error::AppError;

/// Conexión prestada por `DbPool`; vuelve al pool al soltarse.
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Ajustes aplicados a cada conexión nueva.
#[derive(Debug, Clone, Copy)]
struct SqliteCustomizer {
    busy_timeout: Duration,
}

impl CustomizeConnection<Connection, rusqlite::Error> for SqliteCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    }
}

/// Pool de conexiones SQLite (r2d2) con a lo sumo `max_size` conexiones abiertas.
///
/// `busy_timeout_ms` acota tanto la espera por bloqueos de SQLite como la
/// espera por una conexión libre.
#[derive(Clone)]
pub struct DbPool {
    path: PathBuf,
    inner: Pool<SqliteConnectionManager>,
}

impl fmt::Debug for DbPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbPool")
            .field("path", &self.path)
            .field("max_size", &self.inner.max_size())
            .finish()
    }
}

impl DbPool {
    /// Abre (o crea) la base en `path` y asegura el esquema.
    pub fn open<P: AsRef<Path>>(path: P, max_size: usize, busy_timeout_ms: u64) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        // r2d2 exige tamaño y timeout positivos
        let max_size = u32::try_from(max_size.max(1)).unwrap_or(u32::MAX);
        let timeout = Duration::from_millis(busy_timeout_ms.max(1));
        let inner = Pool::builder()
            .max_size(max_size)
            .connection_timeout(timeout)
            .connection_customizer(Box::new(SqliteCustomizer { busy_timeout: timeout }))
            .build(SqliteConnectionManager::file(&path))?;

        let pool = DbPool { path, inner };
        {
            let conn = pool.get()?;
            init_schema(&conn)?;
        }
        debug!(path = %pool.path.display(), max_size, "base de datos lista");
        Ok(pool)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Toma una conexión; espera hasta el timeout si las `max_size` están en uso.
    pub fn get(&self) -> Result<PooledConn, AppError> {
        Ok(self.inner.get()?)
    }

    pub fn max_size(&self) -> u32 {
        self.inner.max_size()
    }

    /// Conexiones abiertas en este momento (en uso + ociosas).
    pub fn open_connections(&self) -> u32 {
        self.inner.state().connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_caps_open_connections() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DbPool::open(dir.path().join("pool.db"), 2, 200).unwrap();
        assert_eq!(pool.max_size(), 2);

        let a = pool.get().unwrap();
        let _b = pool.get().unwrap();
        // la tercera espera el timeout y falla en vez de abrir otra conexión
        assert!(matches!(pool.get(), Err(AppError::Pool(_))));
        assert!(pool.open_connections() <= 2);

        drop(a);
        let c = pool.get().unwrap();
        let n: i64 = c.query_row("SELECT 1", [], |r| r.get(0)).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn connections_enforce_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DbPool::open(dir.path().join("pool.db"), 1, 1000).unwrap();
        let conn = pool.get().unwrap();
        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0)).unwrap();
        assert_eq!(fk, 1);
        assert!(conn.execute("INSERT INTO turmas (name, course_id) VALUES ('TI27', 99)", []).is_err());
    }
}
